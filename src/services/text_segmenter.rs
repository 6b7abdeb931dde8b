// Text Segmenter
// Splits long documents into word-bounded chunks for per-chunk inference

/// Split `text` into chunks of at most `max_words` whitespace-delimited
/// tokens, preserving token order. Chunks are rebuilt by single-space
/// joining, so original punctuation spacing does not round-trip exactly.
///
/// Empty or whitespace-only input yields exactly one empty chunk, so every
/// document produces at least one chunk and `chunks >= 1` holds downstream.
pub fn split_words(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return vec![String::new()];
    }

    let max_words = max_words.max(1);
    words
        .chunks(max_words)
        .map(|chunk| chunk.join(" "))
        .collect()
}
