//! Remote retrieval with ordered fallback strategies.
//!
//! Each strategy is an (endpoint, timeout) pair. The plan is walked in order
//! and stops at the first success; an attempt that outlives its timeout
//! counts as a failed attempt.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::PipelineEvents;

pub const DEFAULT_RELAY_1: &str = "https://corsproxy.io/?";
pub const DEFAULT_RELAY_2: &str = "https://api.allorigins.win/raw?url=";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    Status(u16),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("All {0} retrieval strategies failed")]
    Exhausted(usize),

    #[error("{0}")]
    Other(String),
}

/// Byte source for remote images. `HttpFetcher` in production.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("offerdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            return Err(FetchError::Status(res.status().as_u16()));
        }
        Ok(res.bytes().await?.to_vec())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Direct,
    /// URL-rewriting relay; the target URL is appended percent-encoded.
    Relay { prefix: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalStrategy {
    pub label: String,
    pub target: Target,
    pub timeout: Duration,
}

impl RetrievalStrategy {
    pub fn url_for(&self, url: &str) -> String {
        match &self.target {
            Target::Direct => url.to_string(),
            Target::Relay { prefix } => format!("{}{}", prefix, urlencoding::encode(url)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalPlan {
    pub strategies: Vec<RetrievalStrategy>,
}

impl RetrievalPlan {
    pub fn with_relays(relay_1: &str, relay_2: &str) -> Self {
        Self {
            strategies: vec![
                RetrievalStrategy {
                    label: "Direct download...".to_string(),
                    target: Target::Direct,
                    timeout: Duration::from_secs(5),
                },
                RetrievalStrategy {
                    label: "Download via relay #1...".to_string(),
                    target: Target::Relay { prefix: relay_1.to_string() },
                    timeout: Duration::from_secs(8),
                },
                RetrievalStrategy {
                    label: "Download via relay #2...".to_string(),
                    target: Target::Relay { prefix: relay_2.to_string() },
                    timeout: Duration::from_secs(10),
                },
            ],
        }
    }

    /// Same plan with every timeout replaced, mostly for tests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        for strategy in &mut self.strategies {
            strategy.timeout = timeout;
        }
        self
    }
}

impl Default for RetrievalPlan {
    fn default() -> Self {
        Self::with_relays(DEFAULT_RELAY_1, DEFAULT_RELAY_2)
    }
}

#[derive(Debug)]
pub struct Retrieved {
    pub bytes: Vec<u8>,
    pub strategy: String,
}

/// Walks the plan until one strategy returns bytes.
pub async fn retrieve(
    fetcher: &dyn Fetcher,
    url: &str,
    label: &str,
    plan: &RetrievalPlan,
    events: &dyn PipelineEvents,
) -> Result<Retrieved, FetchError> {
    for strategy in &plan.strategies {
        events.status(&strategy.label);
        let target = strategy.url_for(url);

        let outcome = match tokio::time::timeout(strategy.timeout, fetcher.get(&target)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(strategy.timeout)),
        };

        match outcome {
            Ok(bytes) => {
                debug!(slot = label, strategy = %strategy.label, size = bytes.len(), "Retrieved image");
                return Ok(Retrieved { bytes, strategy: strategy.label.clone() });
            }
            Err(e) => {
                warn!(slot = label, strategy = %strategy.label, error = %e, "Retrieval attempt failed");
                events.log(&format!("{}: {} failed ({})", label, strategy.label.trim_end_matches('.'), e));
            }
        }
    }

    Err(FetchError::Exhausted(plan.strategies.len()))
}
