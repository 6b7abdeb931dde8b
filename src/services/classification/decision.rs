// Decision Policy
// Turns the merged score map into the final label set. Two thresholds
// interact here: the inclusion threshold admits labels into the candidate
// result, and the fixed high-confidence bound decides whether a sensitive
// label may dominate Non-sensitive. The bound was tightened across revisions
// of this policy; both guards below are intentional and must stay.

use std::collections::HashMap;

use super::label_catalog::NON_SENSITIVE_LABEL;

/// Absolute confidence a sensitive label must reach before it can displace
/// Non-sensitive. Fixed by policy, not configurable.
pub const HIGH_CONFIDENCE_BOUND: f64 = 0.85;

/// Default inclusion threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.18;

/// Apply the threshold and tie-break rules to the merged score map,
/// returning the final (label, score) list sorted by descending score.
/// The result is never empty.
pub fn decide(merged: &HashMap<String, f64>, threshold: f64) -> Vec<(String, f64)> {
    // Step 1: inclusion threshold.
    let mut result: Vec<(String, f64)> = merged
        .iter()
        .filter(|(_, &score)| score >= threshold)
        .map(|(label, &score)| (label.clone(), score))
        .collect();

    // Step 2: nothing qualified, fall back to the single best entry of the
    // full map, or Non-sensitive at 0.0 when the map itself is empty.
    if result.is_empty() {
        result = match best_entry(merged) {
            Some((label, score)) => vec![(label, score)],
            None => vec![(NON_SENSITIVE_LABEL.to_string(), 0.0)],
        };
    }

    // Step 3: partition into the Non-sensitive score and sensitive entries.
    let non_sensitive = result
        .iter()
        .find(|(label, _)| label == NON_SENSITIVE_LABEL)
        .map(|(_, score)| *score);
    let sensitive: Vec<(String, f64)> = result
        .iter()
        .filter(|(label, _)| label != NON_SENSITIVE_LABEL)
        .cloned()
        .collect();

    // Step 4: high-confidence override. Non-sensitive wins when it scores at
    // least as high as the best sensitive label, or when no sensitive label
    // clears the absolute bound.
    let max_sensitive = sensitive
        .iter()
        .map(|(_, score)| *score)
        .fold(0.0_f64, f64::max);
    let non_sensitive_score = non_sensitive.unwrap_or(0.0);

    result = if (non_sensitive.is_some() && non_sensitive_score >= max_sensitive)
        || max_sensitive < HIGH_CONFIDENCE_BOUND
    {
        vec![(NON_SENSITIVE_LABEL.to_string(), non_sensitive_score)]
    } else {
        sensitive
    };

    // Step 5: safety net. Re-checks the bound on whatever survived; overlaps
    // step 4 on purpose. Equal scores fall back to label order so repeated
    // runs agree on the ordering.
    result.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    let collapse = match result.first() {
        None => Some(0.0),
        Some((label, score)) if label != NON_SENSITIVE_LABEL && *score < HIGH_CONFIDENCE_BOUND => {
            Some(*score)
        }
        _ => None,
    };
    if let Some(score) = collapse {
        result = vec![(NON_SENSITIVE_LABEL.to_string(), score)];
    }

    // Step 6: descending order (already sorted; collapse paths are single
    // entries).
    result
}

fn best_entry(merged: &HashMap<String, f64>) -> Option<(String, f64)> {
    merged
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(label, &score)| (label.clone(), score))
}
