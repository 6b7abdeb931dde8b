// Classification Module
// Sensitive-data classification core organized into specialized submodules:
// - label_catalog: label keys and the hypothesis sentences they prompt with
// - technical_filter: rule-based short-circuit for technical content
// - aggregation: per-label max-merge across a document's chunks
// - decision: threshold and tie-break policy over the merged scores
// - pipeline: per-document flow wiring the pieces together

pub mod aggregation;
pub mod decision;
pub mod label_catalog;
pub mod pipeline;
pub mod technical_filter;

pub use aggregation::merge_chunk_scores;
pub use decision::{decide, DEFAULT_THRESHOLD, HIGH_CONFIDENCE_BOUND};
pub use label_catalog::{LabelCatalog, NON_SENSITIVE_LABEL, TECHNICAL_CONTENT_LABEL};
pub use pipeline::{Classifier, ClassifyError};
pub use technical_filter::{RuleVerdict, RULE_CONFIDENCE, RULE_SOURCE_CODE, RULE_SOURCE_NARRATIVE};
