use thiserror::Error;

/// A single failed exchange with the server, before any retry decision.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// The cause of an attempt that may succeed when repeated.
#[derive(Debug, Clone, Error)]
pub enum TransientFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Server responded with status {0}")]
    ServerStatus(reqwest::StatusCode),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Refusing to fetch '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Giving up on {url} after {attempts} attempt(s)")]
    Network {
        url: String,
        attempts: u32,
        #[source]
        source: TransientFailure,
    },

    #[error("Request to {url} was rejected with status {status}")]
    Client {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Network { url, .. }
            | FetchError::Client { url, .. } => url,
        }
    }
}
