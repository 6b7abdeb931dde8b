// Rule-Based Technical Content Filter
// Pattern short-circuit for obviously technical/code-like text. A match
// bypasses the oracle entirely; the patterns are a precision guard, not a
// detector, and can be disabled via configuration.

use regex::Regex;
use std::sync::OnceLock;
use tracing::info;

use super::label_catalog::TECHNICAL_CONTENT_LABEL;

/// Confidence assigned to every rule-based verdict.
pub const RULE_CONFIDENCE: f64 = 0.95;

pub const RULE_SOURCE_CODE: &str = "rule-based-code";
pub const RULE_SOURCE_NARRATIVE: &str = "rule-based-narrative";

/// Short-circuit verdict: which label fired and under which provenance tag.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleVerdict {
    pub label: String,
    pub score: f64,
    pub source: &'static str,
}

struct Rule {
    source: &'static str,
    pattern: Regex,
}

static RULES: OnceLock<Vec<Rule>> = OnceLock::new();

fn rules() -> &'static [Rule] {
    RULES.get_or_init(|| {
        // Literal technical markers, then narrative command mentions in
        // Vietnamese. First match wins; confidences are never combined.
        let specs: [(&'static str, &str); 9] = [
            // Dollar prompt at line start: "$ ls -la".
            (RULE_SOURCE_CODE, r"(?m)^\s*\$\s+\S+"),
            // Hash prompt at line start, only when followed by a known
            // command; a bare "# " opens Markdown headings and comments.
            (
                RULE_SOURCE_CODE,
                r"(?m)^\s*#\s+(sudo|apt|yum|dnf|systemctl|cd|ls|cat|chmod|chown|grep)\b",
            ),
            // Script shebang.
            (RULE_SOURCE_CODE, r"(?m)^#!\s*/(usr/)?(local/)?bin/\S+"),
            // Package-manager invocations. "go" is handled separately below:
            // "go get" is ordinary English unless the argument looks like a
            // module path.
            (
                RULE_SOURCE_CODE,
                r"(?i)\b(sudo\s+)?(apt(-get)?|yum|dnf|pacman|apk|brew|pip3?|npm|pnpm|yarn|cargo|gem|composer)\s+(install|update|upgrade|remove|uninstall|add|get)\b",
            ),
            (
                RULE_SOURCE_CODE,
                r"(?i)\bgo\s+(get|install)\s+\S*[./]\S*",
            ),
            // Executable / script file extensions.
            (
                RULE_SOURCE_CODE,
                r"(?i)\b[\w./-]+\.(sh|bash|zsh|bat|cmd|ps1|exe|msi|py|rb|pl|js)\b",
            ),
            // Command chaining operators between shell-looking tokens.
            (RULE_SOURCE_CODE, r"\S+\s*(&&|\|\||\s\|\s|;\s*sudo\b)\s*\S+"),
            // Bare URLs.
            (RULE_SOURCE_CODE, r"(?i)\bhttps?://\S+"),
            // Narrative mentions of running commands in Vietnamese:
            // "chạy lệnh", "gõ lệnh", "cài đặt", "thực thi câu lệnh", ...
            (
                RULE_SOURCE_NARRATIVE,
                r"(?i)\b(chạy\s+lệnh|gõ\s+lệnh|nhập\s+lệnh|thực\s+thi\s+(câu\s+)?lệnh|câu\s+lệnh|dòng\s+lệnh|cài\s+đặt\s+(gói|phần\s+mềm|thư\s+viện))\b",
            ),
        ];

        specs
            .into_iter()
            .map(|(source, pattern)| Rule {
                source,
                pattern: Regex::new(pattern).expect("technical filter pattern"),
            })
            .collect()
    })
}

/// Inspect `text` against the ordered rule list. Returns a verdict for the
/// first matching rule, or `None` when normal inference should proceed.
pub fn inspect(text: &str) -> Option<RuleVerdict> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    for rule in rules() {
        if rule.pattern.is_match(trimmed) {
            info!(source = rule.source, "technical content rule fired");
            return Some(RuleVerdict {
                label: TECHNICAL_CONTENT_LABEL.to_string(),
                score: RULE_CONFIDENCE,
                source: rule.source,
            });
        }
    }

    None
}
