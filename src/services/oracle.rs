// Zero-Shot Oracle Boundary
// The NLI inference engine is an external collaborator; this module defines
// the capability interface the pipeline consumes plus the HTTP implementation
// that talks to a hosted zero-shot classification endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

use crate::models::ScoreEntry;

const ORACLE_DEFAULT_URL: &str = "http://127.0.0.1:8000/zero-shot";
const ORACLE_DEFAULT_TIMEOUT_SECS: u64 = 80;

/// Hypothesis template the oracle interpolates each candidate into.
pub const HYPOTHESIS_TEMPLATE: &str = "This text contains {}.";

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("oracle error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("oracle returned mismatched labels/scores lengths")]
    MismatchedResponse,
    #[error("oracle returned score {0} outside [0,1]")]
    ScoreOutOfRange(f64),
}

/// Capability interface for the zero-shot classification oracle.
///
/// For one chunk of text and an ordered set of hypothesis sentences the
/// oracle returns an independent score in [0,1] per hypothesis. Scores need
/// not sum to 1; this is multi-label, not single-label, classification.
#[async_trait]
pub trait ZeroShotOracle: Send + Sync {
    async fn score(
        &self,
        text: &str,
        hypotheses: &[String],
    ) -> Result<Vec<ScoreEntry>, OracleError>;
}

#[derive(Debug, Clone, Serialize)]
struct ZeroShotRequest<'a> {
    sequence: &'a str,
    candidate_labels: &'a [String],
    multi_label: bool,
    hypothesis_template: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// HTTP client for a zero-shot inference service.
pub struct HttpOracle {
    client: Client,
    endpoint: String,
}

impl HttpOracle {
    pub fn new() -> Self {
        Self::with_timeout(ORACLE_DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        let endpoint =
            env::var("SENSISCAN_ORACLE_URL").unwrap_or_else(|_| ORACLE_DEFAULT_URL.to_string());

        Self { client, endpoint }
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl Default for HttpOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZeroShotOracle for HttpOracle {
    async fn score(
        &self,
        text: &str,
        hypotheses: &[String],
    ) -> Result<Vec<ScoreEntry>, OracleError> {
        let request = ZeroShotRequest {
            sequence: text,
            candidate_labels: hypotheses,
            multi_label: true,
            hypothesis_template: HYPOTHESIS_TEMPLATE,
        };

        let started = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ZeroShotResponse = response.json().await?;
        debug!(
            candidates = hypotheses.len(),
            latency_ms = started.elapsed().as_millis() as i64,
            "oracle scored chunk"
        );

        if parsed.labels.len() != parsed.scores.len() {
            return Err(OracleError::MismatchedResponse);
        }
        for &score in &parsed.scores {
            if !(0.0..=1.0).contains(&score) {
                return Err(OracleError::ScoreOutOfRange(score));
            }
        }

        Ok(parsed
            .labels
            .into_iter()
            .zip(parsed.scores)
            .map(|(label, score)| ScoreEntry { label, score })
            .collect())
    }
}
