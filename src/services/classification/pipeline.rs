// Classification Pipeline
// Wires the filter, probe, segmenter, oracle, aggregator, and decision
// policy into the per-document flow, and assembles the public result.

use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{BatchRequest, ClassificationResult, ScoreEntry, StandardRequest, TextRequest};
use crate::services::config_store::ClassificationConfig;
use crate::services::language_probe::probe_language;
use crate::services::oracle::{OracleError, ZeroShotOracle};
use crate::services::text_segmenter::split_words;

use super::aggregation::merge_chunk_scores;
use super::decision::decide;
use super::label_catalog::LabelCatalog;
use super::technical_filter;

/// Maximum characters of source text echoed back in the result.
const SEQUENCE_ECHO_LIMIT: usize = 2000;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("unknown label key: {0}")]
    UnknownLabel(String),
    #[error("candidate label set is empty")]
    EmptyCandidates,
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Sensitive-data classifier. The catalog and configuration are immutable
/// for the lifetime of the value; the oracle is the only effectful
/// collaborator.
pub struct Classifier {
    catalog: LabelCatalog,
    config: ClassificationConfig,
    oracle: Box<dyn ZeroShotOracle>,
}

impl Classifier {
    pub fn new(
        catalog: LabelCatalog,
        config: ClassificationConfig,
        oracle: Box<dyn ZeroShotOracle>,
    ) -> Self {
        Self {
            catalog,
            config,
            oracle,
        }
    }

    pub fn catalog(&self) -> &LabelCatalog {
        &self.catalog
    }

    /// Classify with the catalog's default candidate set.
    pub async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let candidates = self.catalog.default_candidates();
        self.classify_with_labels(text, &candidates).await
    }

    /// Service entry point for a single-document request.
    pub async fn handle_text(
        &self,
        request: &TextRequest,
    ) -> Result<ClassificationResult, ClassifyError> {
        match &request.labels {
            Some(keys) => self.classify_with_labels(&request.text, keys).await,
            None => self.classify(&request.text).await,
        }
    }

    /// Service entry point for a per-standard request.
    pub async fn handle_standard(
        &self,
        request: &StandardRequest,
    ) -> Result<ClassificationResult, ClassifyError> {
        self.classify_by_standard(&request.text, request.standard.as_deref())
            .await
    }

    /// Service entry point for a batch request.
    pub async fn handle_batch(
        &self,
        request: &BatchRequest,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        self.classify_batch(&request.texts, request.labels.as_deref())
            .await
    }

    /// Classify against a caller-supplied candidate set. Every key must
    /// exist in the catalog and the set must be non-empty.
    pub async fn classify_with_labels(
        &self,
        text: &str,
        label_keys: &[String],
    ) -> Result<ClassificationResult, ClassifyError> {
        if label_keys.is_empty() {
            return Err(ClassifyError::EmptyCandidates);
        }

        let request_id = Uuid::new_v4();
        let started = Instant::now();

        // Rule-based short-circuit: never pay for an oracle call on content
        // the patterns already recognize.
        if self.config.enable_technical_filter {
            if let Some(verdict) = technical_filter::inspect(text) {
                info!(
                    request_id = %request_id,
                    source = verdict.source,
                    "classification short-circuited by rule"
                );
                return Ok(assemble(
                    text,
                    vec![(verdict.label, verdict.score)],
                    1,
                    None,
                    Some(verdict.source.to_string()),
                ));
            }
        }

        let language = probe_language(text);

        let hypotheses = self
            .catalog
            .resolve(label_keys)
            .map_err(ClassifyError::UnknownLabel)?;

        let chunks = split_words(text, self.config.chunk_size_words);
        let chunk_count = chunks.len();

        // Chunks are scored sequentially, in order; the oracle serializes on
        // one model instance anyway.
        let mut per_chunk: Vec<Vec<ScoreEntry>> = Vec::with_capacity(chunk_count);
        for (idx, chunk) in chunks.iter().enumerate() {
            let entries = match self.oracle.score(chunk, &hypotheses).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(
                        request_id = %request_id,
                        chunk = idx,
                        error = %e,
                        "oracle call failed"
                    );
                    return Err(e.into());
                }
            };
            let mapped = entries
                .into_iter()
                .map(|entry| ScoreEntry {
                    label: self.catalog.key_for_hypothesis(&entry.label).to_string(),
                    score: entry.score,
                })
                .collect();
            per_chunk.push(mapped);
        }

        let merged = merge_chunk_scores(per_chunk.iter().map(|v| v.as_slice()));
        let final_labels = decide(&merged, self.config.threshold);

        info!(
            request_id = %request_id,
            language = %language,
            chunks = chunk_count,
            top_label = %final_labels[0].0,
            top_score = final_labels[0].1,
            latency_ms = started.elapsed().as_millis() as i64,
            "document classified"
        );

        Ok(assemble(text, final_labels, chunk_count, Some(language), None))
    }

    /// Per-standard classification: a recognized standard collapses the
    /// candidate set to that label plus Non-sensitive.
    pub async fn classify_by_standard(
        &self,
        text: &str,
        standard: Option<&str>,
    ) -> Result<ClassificationResult, ClassifyError> {
        let candidates = self.catalog.candidates_for_standard(standard);
        self.classify_with_labels(text, &candidates).await
    }

    /// Classify a batch of independent documents, one at a time. Each
    /// document is fully aggregated before its decision is taken.
    pub async fn classify_batch(
        &self,
        texts: &[String],
        label_keys: Option<&[String]>,
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        let default_candidates;
        let keys = match label_keys {
            Some(keys) => keys,
            None => {
                default_candidates = self.catalog.default_candidates();
                &default_candidates
            }
        };

        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.classify_with_labels(text, keys).await?);
        }
        Ok(results)
    }
}

/// Build the public result: truncated echo, parallel label/score vectors,
/// chunk count, and optional diagnostics.
fn assemble(
    text: &str,
    final_labels: Vec<(String, f64)>,
    chunks: usize,
    language: Option<String>,
    source: Option<String>,
) -> ClassificationResult {
    let (labels, scores) = final_labels.into_iter().unzip();
    ClassificationResult {
        sequence: truncate_echo(text),
        labels,
        scores,
        chunks,
        language,
        source,
    }
}

fn truncate_echo(text: &str) -> String {
    let mut echo: String = text.chars().take(SEQUENCE_ECHO_LIMIT).collect();
    if text.chars().count() > SEQUENCE_ECHO_LIMIT {
        echo.push_str("...");
    }
    echo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classification::decision::DEFAULT_THRESHOLD;
    use crate::services::classification::label_catalog::NON_SENSITIVE_LABEL;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Deterministic oracle: scores each hypothesis by substring triggers in
    /// the chunk text, and counts how often it is called. Cloning shares the
    /// call counter, so a test can keep a handle after handing the oracle to
    /// the classifier.
    #[derive(Clone)]
    struct FakeOracle {
        /// hypothesis -> [(trigger substring, score)]
        rules: HashMap<String, Vec<(String, f64)>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeOracle {
        fn new(rules: &[(&str, &[(&str, f64)])]) -> Self {
            let rules = rules
                .iter()
                .map(|(h, pairs)| {
                    (
                        h.to_string(),
                        pairs.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
                    )
                })
                .collect();
            Self {
                rules,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ZeroShotOracle for FakeOracle {
        async fn score(
            &self,
            text: &str,
            hypotheses: &[String],
        ) -> Result<Vec<ScoreEntry>, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(hypotheses
                .iter()
                .map(|h| {
                    let score = self
                        .rules
                        .get(h)
                        .map(|pairs| {
                            pairs
                                .iter()
                                .filter(|(trigger, _)| text.contains(trigger.as_str()))
                                .map(|(_, s)| *s)
                                .fold(0.01, f64::max)
                        })
                        .unwrap_or(0.01);
                    ScoreEntry::new(h.clone(), score)
                })
                .collect())
        }
    }

    fn classifier_with(oracle: FakeOracle, config: ClassificationConfig) -> Classifier {
        Classifier::new(LabelCatalog::builtin(), config, Box::new(oracle))
    }

    fn financial_hypothesis() -> String {
        LabelCatalog::builtin()
            .hypothesis("Financial-Info")
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_rule_short_circuit_makes_no_oracle_call() {
        let oracle = FakeOracle::new(&[]);
        let counter = oracle.clone();
        let classifier = classifier_with(oracle, ClassificationConfig::default());

        let result = classifier
            .classify("sudo apt install python3")
            .await
            .unwrap();
        assert_eq!(result.labels, vec!["Technical-Content"]);
        assert_eq!(result.scores, vec![technical_filter::RULE_CONFIDENCE]);
        assert_eq!(result.source.as_deref(), Some("rule-based-code"));
        assert_eq!(result.chunks, 1);
        assert_eq!(counter.call_count(), 0);
    }

    #[tokio::test]
    async fn test_disabled_filter_sends_technical_text_to_oracle() {
        let oracle = FakeOracle::new(&[]);
        let config = ClassificationConfig {
            enable_technical_filter: false,
            ..ClassificationConfig::default()
        };
        let classifier = classifier_with(oracle, config);

        let result = classifier
            .classify("sudo apt install python3")
            .await
            .unwrap();
        // All fake scores sit at 0.01, so the policy falls through to
        // Non-sensitive; the point is that inference ran instead of a rule.
        assert_eq!(result.labels, vec![NON_SENSITIVE_LABEL]);
        assert!(result.source.is_none());
        assert!(result.language.is_some());
    }

    #[tokio::test]
    async fn test_chunked_document_merges_by_maximum() {
        // 700 words with a trigger in the first half only: chunk 1 scores
        // 0.9, chunk 2 scores low, merged score must be 0.9.
        let hypothesis = financial_hypothesis();
        let oracle = FakeOracle::new(&[(hypothesis.as_str(), &[("4111", 0.9)][..])]);

        let mut words: Vec<String> = vec!["card 4111".to_string()];
        words.extend((0..698).map(|i| format!("filler{}", i)));
        let text = words.join(" ");
        assert_eq!(text.split_whitespace().count(), 700);

        let classifier = classifier_with(oracle, ClassificationConfig::default());
        let result = classifier.classify(&text).await.unwrap();

        assert_eq!(result.chunks, 2);
        assert_eq!(result.labels, vec!["Financial-Info"]);
        assert_eq!(result.scores, vec![0.9]);
    }

    #[tokio::test]
    async fn test_oracle_called_once_per_chunk() {
        let oracle = FakeOracle::new(&[]);
        let counter = oracle.clone();
        let config = ClassificationConfig {
            enable_technical_filter: false,
            ..ClassificationConfig::default()
        };
        let classifier = classifier_with(oracle, config);

        let text = (0..700).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let result = classifier.classify(&text).await.unwrap();

        assert_eq!(result.chunks, 2);
        assert_eq!(counter.call_count(), 2);
    }

    #[tokio::test]
    async fn test_idempotent_classification() {
        let hypothesis = financial_hypothesis();
        let oracle = FakeOracle::new(&[(hypothesis.as_str(), &[("account", 0.91)][..])]);
        let classifier = classifier_with(oracle, ClassificationConfig::default());

        let text = "transfer from my bank account 0123456789";
        let first = classifier.classify(text).await.unwrap();
        let second = classifier.classify(text).await.unwrap();
        assert_eq!(first.labels, second.labels);
        assert_eq!(first.scores, second.scores);
        assert_eq!(first.chunks, second.chunks);
    }

    #[tokio::test]
    async fn test_result_invariants_hold() {
        let classifier = classifier_with(
            FakeOracle::new(&[]),
            ClassificationConfig {
                enable_technical_filter: false,
                ..ClassificationConfig::default()
            },
        );

        let result = classifier.classify("just a quiet afternoon note").await.unwrap();
        assert!(!result.labels.is_empty());
        assert_eq!(result.labels.len(), result.scores.len());
        assert!(result.scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!(result
            .scores
            .windows(2)
            .all(|w| w[0] >= w[1]));
    }

    #[tokio::test]
    async fn test_empty_text_degrades_to_single_chunk() {
        let classifier = classifier_with(
            FakeOracle::new(&[]),
            ClassificationConfig {
                enable_technical_filter: false,
                ..ClassificationConfig::default()
            },
        );

        let result = classifier.classify("").await.unwrap();
        assert_eq!(result.chunks, 1);
        assert_eq!(result.labels, vec![NON_SENSITIVE_LABEL]);
    }

    #[tokio::test]
    async fn test_classify_by_standard_restricts_candidates() {
        let hypothesis = financial_hypothesis();
        let oracle = FakeOracle::new(&[(hypothesis.as_str(), &[("card", 0.93)][..])]);
        let classifier = classifier_with(oracle, ClassificationConfig::default());

        let result = classifier
            .classify_by_standard("my card is 4111 1111 1111 1111", Some("Financial-Info"))
            .await
            .unwrap();
        assert_eq!(result.labels, vec!["Financial-Info"]);
        assert_eq!(result.scores, vec![0.93]);
    }

    #[tokio::test]
    async fn test_unknown_standard_uses_full_catalog() {
        let hypothesis = financial_hypothesis();
        let oracle = FakeOracle::new(&[(hypothesis.as_str(), &[("card", 0.93)][..])]);
        let classifier = classifier_with(oracle, ClassificationConfig::default());

        let result = classifier
            .classify_by_standard("my card is 4111", Some("NOT_A_STANDARD"))
            .await
            .unwrap();
        assert_eq!(result.labels, vec!["Financial-Info"]);
    }

    #[tokio::test]
    async fn test_empty_candidate_set_is_rejected() {
        let classifier = classifier_with(FakeOracle::new(&[]), ClassificationConfig::default());
        let err = classifier.classify_with_labels("text", &[]).await.unwrap_err();
        assert!(matches!(err, ClassifyError::EmptyCandidates));
    }

    #[tokio::test]
    async fn test_unknown_label_key_is_rejected() {
        let classifier = classifier_with(FakeOracle::new(&[]), ClassificationConfig::default());
        let err = classifier
            .classify_with_labels("plain text", &["Made-Up".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::UnknownLabel(k) if k == "Made-Up"));
    }

    #[tokio::test]
    async fn test_batch_processes_documents_independently() {
        let hypothesis = financial_hypothesis();
        let oracle = FakeOracle::new(&[(hypothesis.as_str(), &[("invoice", 0.9)][..])]);
        let classifier = classifier_with(oracle, ClassificationConfig::default());

        let texts = vec![
            "the invoice total was charged to the corporate card".to_string(),
            "a walk in the park".to_string(),
        ];
        let results = classifier.classify_batch(&texts, None).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].labels, vec!["Financial-Info"]);
        assert_eq!(results[1].labels, vec![NON_SENSITIVE_LABEL]);
    }

    #[tokio::test]
    async fn test_long_text_echo_is_truncated() {
        let classifier = classifier_with(
            FakeOracle::new(&[]),
            ClassificationConfig {
                enable_technical_filter: false,
                ..ClassificationConfig::default()
            },
        );

        let text = "word ".repeat(1000);
        let result = classifier.classify(&text).await.unwrap();
        assert_eq!(result.sequence.chars().count(), SEQUENCE_ECHO_LIMIT + 3);
        assert!(result.sequence.ends_with("..."));
    }

    #[tokio::test]
    async fn test_request_handlers_dispatch_to_pipeline() {
        let hypothesis = financial_hypothesis();
        let oracle = FakeOracle::new(&[(hypothesis.as_str(), &[("card", 0.93)][..])]);
        let classifier = classifier_with(oracle, ClassificationConfig::default());

        let text_req = TextRequest {
            text: "my card is 4111 1111 1111 1111".to_string(),
            labels: Some(vec![
                "Financial-Info".to_string(),
                NON_SENSITIVE_LABEL.to_string(),
            ]),
        };
        let result = classifier.handle_text(&text_req).await.unwrap();
        assert_eq!(result.labels, vec!["Financial-Info"]);

        let standard_req = StandardRequest {
            text: "my card is 4111".to_string(),
            standard: Some("Financial-Info".to_string()),
        };
        let result = classifier.handle_standard(&standard_req).await.unwrap();
        assert_eq!(result.labels, vec!["Financial-Info"]);

        let batch_req = BatchRequest {
            texts: vec!["charged to the card".to_string(), "a quiet day".to_string()],
            labels: None,
        };
        let results = classifier.handle_batch(&batch_req).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].labels, vec!["Financial-Info"]);
        assert_eq!(results[1].labels, vec![NON_SENSITIVE_LABEL]);
    }

    #[test]
    fn test_threshold_default_matches_policy() {
        assert_eq!(ClassificationConfig::default().threshold, DEFAULT_THRESHOLD);
    }
}
