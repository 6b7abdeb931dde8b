// SensiScan Data Models
// Request/response shapes of the classification service surface

use serde::{Deserialize, Serialize};

// ============ Classification Requests ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
    /// Caller-supplied candidate label keys; `None` means the catalog default.
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardRequest {
    pub text: String,
    /// Compliance standard identifier (e.g. "Financial-Info"); unrecognized
    /// values fall back to the full default candidate set.
    #[serde(default)]
    pub standard: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
}

// ============ Scores ============

/// One (label key, probability-like score) pair emitted for a single chunk.
/// Scores are independent across labels within a chunk (multi-label).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub label: String,
    pub score: f64,
}

impl ScoreEntry {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

// ============ Classification Result ============

/// Final output of the pipeline. `labels` and `scores` are parallel vectors
/// sorted by descending score and are never empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Echo of the source text, truncated to 2000 characters.
    pub sequence: String,
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
    /// Number of chunks the segmenter produced for this document.
    pub chunks: usize,
    /// Detected dominant language, diagnostics only ("unknown" on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Provenance tag, present only when a rule-based override fired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ClassificationResult {
    pub fn top_label(&self) -> Option<&str> {
        self.labels.first().map(|s| s.as_str())
    }
}
