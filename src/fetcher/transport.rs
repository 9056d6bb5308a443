//! The network and clock seams of the fetcher.
//!
//! [`RetryingFetcher`](crate::fetcher::RetryingFetcher) only talks to the outside world through
//! these two traits, so tests can script responses and observe backoff delays without waiting.

use crate::fetcher::error::TransportError;
use reqwest::{Client, StatusCode, Url};
use std::future::Future;
use std::time::Duration;

/// A complete response, whatever its status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

/// Performs one HTTP GET. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &Url,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Waits between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &Url,
        params: &[(&str, String)],
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url.clone())
            .query(params)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
