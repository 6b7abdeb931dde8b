// Language Probe
// Best-effort language identification, used for diagnostics only.
// Detection failures degrade to "unknown" and never affect classification.

use tracing::debug;
use whatlang::detect;

pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Detect the dominant language of `text`, returning an ISO 639-1 style code
/// ("en", "vi", ...) or "unknown" when the text is too short or carries no
/// linguistic signal. Never fails.
pub fn probe_language(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return UNKNOWN_LANGUAGE.to_string();
    }

    match detect(trimmed) {
        Some(info) => {
            let code = iso639_1(info.lang().code()).to_string();
            debug!(
                lang = %code,
                confidence = info.confidence(),
                "language probe"
            );
            code
        }
        None => UNKNOWN_LANGUAGE.to_string(),
    }
}

/// whatlang reports ISO 639-3 codes; map the languages this service actually
/// sees to the two-letter codes the original logs used, and pass the rest
/// through unchanged.
fn iso639_1(code: &str) -> &str {
    match code {
        "eng" => "en",
        "vie" => "vi",
        "cmn" => "zh",
        "fra" => "fr",
        "deu" => "de",
        "spa" => "es",
        "jpn" => "ja",
        "kor" => "ko",
        "rus" => "ru",
        other => other,
    }
}
