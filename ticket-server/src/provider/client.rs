//! Ticket provider HTTP client.
//!
//! One GET per query, no retries: a failed fetch fails only the leg that
//! asked for it, and retry policy (there is none) belongs to the caller.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::domain::{Segment, TrainType};

use super::convert::convert_segments;
use super::error::ProviderError;
use super::types::TicketResponse;

/// Default base URL for the ticket query API.
const DEFAULT_BASE_URL: &str = "https://api.pearktrue.cn/api/highspeedticket";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Default request budget in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the ticket client.
#[derive(Debug, Clone, Deserialize)]
pub struct TicketClientConfig {
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum concurrent requests.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl TicketClientConfig {
    /// Create a config with defaults.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for TicketClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticket provider API client.
///
/// Uses a semaphore to limit concurrent requests; transfer routing fans
/// out over several hubs at once and the provider rate-limits aggressively.
#[derive(Debug, Clone)]
pub struct TicketClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl TicketClient {
    /// Create a new client with the given configuration.
    pub fn new(config: TicketClientConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Fetch direct-segment candidates for a route on a date.
    ///
    /// The provider's `time` query parameter carries the date; clock-level
    /// filtering happens locally, not at the provider.
    pub async fn fetch_segments(
        &self,
        train_type: TrainType,
        from: &str,
        to: &str,
        date: NaiveDate,
    ) -> Result<Vec<Segment>, ProviderError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ProviderError::Api {
                status: 0,
                message: "semaphore closed".to_string(),
            })?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("from", from),
                ("to", to),
                ("time", &date.format("%Y-%m-%d").to_string()),
                ("type", train_type.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let envelope: TicketResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Json {
                message: e.to_string(),
                body: Some(body.chars().take(500).collect()),
            })?;

        match envelope.code {
            Some(200) => Ok(convert_segments(envelope.data.unwrap_or_default())),
            code => Err(ProviderError::Api {
                status: code.and_then(|c| u16::try_from(c).ok()).unwrap_or(0),
                message: envelope.msg.unwrap_or_else(|| "unknown error".to_string()),
            }),
        }
    }
}
