//! Fetching release archives.
//!
//! The pipeline only needs "give me every byte at this URL". [`Fetcher`] is
//! that seam; [`HttpFetcher`] is the reqwest-backed implementation. A fetch
//! either returns the complete body or fails: a body shorter than the
//! advertised `Content-Length` is an error, never a partial buffer.
//!
//! No retries are attempted here. Retrying is the invoking tool's policy.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;

use crate::{NullReporter, Reporter};

/// Upper bound on what an advertised `Content-Length` may pre-allocate.
const PREALLOC_LIMIT: u64 = 64 << 20;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The body ended before `Content-Length` bytes arrived. reqwest usually
    /// reports this itself as `Http`; this covers transports that do not.
    #[error("incomplete download of {url}: expected {expected} bytes, received {received}")]
    Incomplete {
        url: String,
        expected: u64,
        received: u64,
    },
}

/// Retrieves the complete byte content at a URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, NetworkError>;
}

/// Fetches over HTTP(S), reporting progress as the body streams in.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher").finish_non_exhaustive()
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            reporter: Arc::new(NullReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, NetworkError> {
        let http = |source| NetworkError::Http {
            url: url.to_string(),
            source,
        };

        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
            .send()
            .await
            .map_err(http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                url: url.to_string(),
                status,
            });
        }

        let total = response.content_length();
        let capacity = total.map_or(0, |t| t.min(PREALLOC_LIMIT));
        let mut buffer = BytesMut::with_capacity(capacity as usize);
        let mut stream = response.bytes_stream();
        self.reporter.downloading(url, 0, total);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(http)?;
            buffer.extend_from_slice(&chunk);
            self.reporter
                .downloading(url, buffer.len() as u64, total);
        }

        let received = buffer.len() as u64;
        if let Some(expected) = total {
            if received != expected {
                return Err(NetworkError::Incomplete {
                    url: url.to_string(),
                    expected,
                    received,
                });
            }
        }

        tracing::debug!("Fetched {received} bytes from {url}");
        Ok(buffer.freeze())
    }
}
