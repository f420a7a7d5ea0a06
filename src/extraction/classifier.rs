//! Editorial-use classification
//!
//! Fetches a candidate link's target page and looks for the licensing
//! marker in its visible text.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::extraction::content::ContentExtractor;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Classification of one candidate link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The target page carries the marker
    Confirmed,
    /// The target page loaded but has no marker
    NotConfirmed,
    /// The target answered with a non-200 status
    FetchFailed {
        /// HTTP status code
        status: u16,
    },
    /// The request failed at the transport level
    NetworkError {
        /// Error message
        message: String,
    },
}

impl Verdict {
    /// Only `Confirmed` counts
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Verdict::Confirmed)
    }

    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "editorial use only",
            Verdict::NotConfirmed => "not editorial",
            Verdict::FetchFailed { .. } => "failed to retrieve",
            Verdict::NetworkError { .. } => "error fetching",
        }
    }
}

/// Checks candidate links for the editorial-use marker
pub struct EditorialClassifier {
    client: reqwest::Client,
    marker: String,
    timeout: Duration,
}

impl EditorialClassifier {
    /// Create a classifier from the run configuration
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            marker: config.marker.to_lowercase(),
            timeout: config.classify_timeout,
        })
    }

    /// Fetch `url` and classify it. Never fails; each call is independent.
    #[instrument(skip(self))]
    pub async fn classify(&self, url: &str) -> Verdict {
        let response = match self.client.get(url).timeout(self.timeout).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Request failed: {}", e);
                return Verdict::NetworkError {
                    message: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!("Target answered {}", status);
            return Verdict::FetchFailed {
                status: status.as_u16(),
            };
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Verdict::NetworkError {
                    message: e.to_string(),
                }
            }
        };

        if self.page_matches(&body) {
            Verdict::Confirmed
        } else {
            Verdict::NotConfirmed
        }
    }

    /// Whether an already fetched page carries the marker
    pub fn page_matches(&self, html: &str) -> bool {
        ContentExtractor::contains_marker(html, &self.marker)
    }
}
