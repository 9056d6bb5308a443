//! Retry-aware HTTP GET used by every network-facing component.

pub mod error;
pub mod retry;
pub mod transport;

use crate::config::ImgwConfig;
use crate::fetcher::error::{FetchError, TransientFailure};
use crate::fetcher::retry::RetryPolicy;
use crate::fetcher::transport::{Sleeper, Transport};
use log::{debug, info, warn};
use reqwest::Url;
use std::time::Duration;

/// Downloads resources with bounded, exponentially backed-off retries.
///
/// Connection failures, timeouts, body read failures and every non-success status
/// outside the 4xx range are retried. A 4xx response fails at once. Responses are
/// never cached.
#[derive(Debug, Clone)]
pub struct RetryingFetcher<T, S> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
    default_timeout: Duration,
    allowed_hosts: Vec<String>,
}

impl<T: Transport, S: Sleeper> RetryingFetcher<T, S> {
    pub fn new(config: &ImgwConfig, transport: T, sleeper: S) -> Self {
        Self {
            transport,
            sleeper,
            policy: RetryPolicy::from_config(config),
            default_timeout: config.request_timeout,
            allowed_hosts: config.allowed_hosts.clone(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `url` with the given query parameters and returns the response body.
    ///
    /// `timeout` overrides the configured per-attempt timeout for this call only.
    ///
    /// # Errors
    ///
    /// * [`FetchError::InvalidUrl`] if the URL is malformed, not HTTP(S) or its host is not
    ///   allowed. No request is made.
    /// * [`FetchError::Client`] on the first 4xx response.
    /// * [`FetchError::Network`] once every attempt has failed transiently. It carries the last
    ///   failure and the number of attempts made.
    pub async fn fetch(
        &self,
        url: &str,
        params: &[(&str, String)],
        timeout: Option<Duration>,
    ) -> Result<Vec<u8>, FetchError> {
        let parsed = self.validate_url(url)?;
        let timeout = timeout.unwrap_or(self.default_timeout);
        info!("Fetching {} ({} param(s))", parsed, params.len());

        let mut attempt = 1;
        loop {
            let failure = match self.transport.get(&parsed, params, timeout).await {
                Ok(response) if response.status.is_success() => {
                    debug!(
                        "Fetched {} bytes from {} on attempt {}",
                        response.body.len(),
                        parsed,
                        attempt
                    );
                    return Ok(response.body);
                }
                Ok(response) if response.status.is_client_error() => {
                    warn!("Client error {} for {}", response.status, parsed);
                    return Err(FetchError::Client {
                        url: url.to_string(),
                        status: response.status,
                    });
                }
                Ok(response) => TransientFailure::ServerStatus(response.status),
                Err(err) => TransientFailure::Transport(err),
            };

            warn!(
                "Attempt {}/{} for {} failed: {}",
                attempt, self.policy.max_attempts, parsed, failure
            );
            if attempt >= self.policy.max_attempts {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    attempts: attempt,
                    source: failure,
                });
            }

            attempt += 1;
            let delay = self.policy.delay_before(attempt);
            debug!("Retrying {} after {:?}", parsed, delay);
            self.sleeper.sleep(delay).await;
        }
    }

    fn validate_url(&self, url: &str) -> Result<Url, FetchError> {
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
        }
        let host = parsed
            .host_str()
            .ok_or_else(|| invalid("missing host".to_string()))?;
        if !self.allowed_hosts.is_empty()
            && !self
                .allowed_hosts
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(host))
        {
            return Err(invalid(format!("host '{host}' is not allowed")));
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::error::TransportError;
    use crate::test_support::{FakeTransport, RecordingSleeper};
    use reqwest::StatusCode;

    const URL: &str = "https://danepubliczne.imgw.pl/api/data/synop";

    fn fetcher(
        transport: &FakeTransport,
        sleeper: &RecordingSleeper,
    ) -> RetryingFetcher<FakeTransport, RecordingSleeper> {
        RetryingFetcher::new(&ImgwConfig::default(), transport.clone(), sleeper.clone())
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let transport = FakeTransport::new();
        let sleeper = RecordingSleeper::default();
        transport.respond_ok(URL, "[]");

        let body = fetcher(&transport, &sleeper).fetch(URL, &[], None).await.unwrap();

        assert_eq!(body, b"[]");
        assert_eq!(transport.request_count(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let transport = FakeTransport::new();
        let sleeper = RecordingSleeper::default();
        transport
            .fail(URL, TransportError::Timeout("slow".into()))
            .respond_status(URL, StatusCode::SERVICE_UNAVAILABLE)
            .fail(URL, TransportError::Connect("refused".into()))
            .respond_ok(URL, "[]");

        let err = fetcher(&transport, &sleeper)
            .fetch(URL, &[], None)
            .await
            .unwrap_err();

        match err {
            FetchError::Network {
                attempts, source, ..
            } => {
                assert_eq!(attempts, 3);
                assert!(matches!(
                    source,
                    TransientFailure::Transport(TransportError::Connect(_))
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.request_count(), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let transport = FakeTransport::new();
        let sleeper = RecordingSleeper::default();
        transport
            .respond_status(URL, StatusCode::BAD_GATEWAY)
            .fail(URL, TransportError::Body("reset".into()))
            .respond_ok(URL, "ok");

        let body = fetcher(&transport, &sleeper).fetch(URL, &[], None).await.unwrap();

        assert_eq!(body, b"ok");
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let transport = FakeTransport::new();
        let sleeper = RecordingSleeper::default();
        transport
            .respond_status(URL, StatusCode::NOT_FOUND)
            .respond_ok(URL, "[]");

        let err = fetcher(&transport, &sleeper)
            .fetch(URL, &[], None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Client {
                status: StatusCode::NOT_FOUND,
                ..
            }
        ));
        assert_eq!(transport.request_count(), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_disallowed_host_makes_no_request() {
        let transport = FakeTransport::new();
        let sleeper = RecordingSleeper::default();
        let fetcher = fetcher(&transport, &sleeper);

        for url in [
            "https://example.com/api/data/synop",
            "ftp://danepubliczne.imgw.pl/data",
            "not a url",
        ] {
            let err = fetcher.fetch(url, &[], None).await.unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl { .. }), "{url}");
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_and_params_are_passed_through() {
        let transport = FakeTransport::new();
        let sleeper = RecordingSleeper::default();
        transport.respond_ok(URL, "[]").respond_ok(URL, "[]");
        let fetcher = fetcher(&transport, &sleeper);

        fetcher.fetch(URL, &[], None).await.unwrap();
        fetcher
            .fetch(URL, &[("lang", "pl".to_string())], Some(Duration::from_secs(5)))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].timeout, Duration::from_secs(60));
        assert_eq!(requests[1].timeout, Duration::from_secs(5));
        assert_eq!(requests[1].params, vec![("lang".to_string(), "pl".to_string())]);
    }
}
