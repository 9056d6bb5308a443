use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Unusable archive at {url}: {message}")]
    Format { url: String, message: String },

    #[error("Corrupt ZIP archive at {url}")]
    CorruptZip {
        url: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to decompress {url}")]
    Decompress {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Archive {url} has no member '{requested}' (members: {members:?})")]
    NoMatchingMember {
        url: String,
        requested: String,
        members: Vec<String>,
    },

    #[error("Archive {url} holds several data files, choose one of {candidates:?}")]
    AmbiguousSelection { url: String, candidates: Vec<String> },

    #[error("Failed to parse data file '{member}'")]
    TableRead {
        member: String,
        #[source]
        source: PolarsError,
    },

    #[error("Cannot resolve link '{href}': {reason}")]
    InvalidHref { href: String, reason: String },

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
