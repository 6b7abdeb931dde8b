// Score Aggregation
// Merges per-chunk, per-label scores into one document-level score per label.

use std::collections::HashMap;

use crate::models::ScoreEntry;

/// Merge the score entries of all chunks of one document by per-label
/// maximum. A long document is sensitive in a category if any part of it is;
/// summing or averaging would dilute a short sensitive passage inside a long
/// neutral document.
pub fn merge_chunk_scores<'a, I>(chunks: I) -> HashMap<String, f64>
where
    I: IntoIterator<Item = &'a [ScoreEntry]>,
{
    let mut merged: HashMap<String, f64> = HashMap::new();
    for entries in chunks {
        for entry in entries {
            merged
                .entry(entry.label.clone())
                .and_modify(|s| {
                    if entry.score > *s {
                        *s = entry.score;
                    }
                })
                .or_insert(entry.score);
        }
    }
    merged
}
