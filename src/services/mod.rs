// SensiScan Core Services

pub mod classification;
pub mod config_store;
pub mod language_probe;
pub mod oracle;
pub mod text_segmenter;

pub use config_store::*;
pub use language_probe::probe_language;
pub use oracle::{HttpOracle, OracleError, ZeroShotOracle, HYPOTHESIS_TEMPLATE};
pub use text_segmenter::split_words;

// Re-export classification module surface
pub use classification::{
    decide, merge_chunk_scores, Classifier, ClassifyError, LabelCatalog, RuleVerdict,
    DEFAULT_THRESHOLD, HIGH_CONFIDENCE_BOUND, NON_SENSITIVE_LABEL, TECHNICAL_CONTENT_LABEL,
};
