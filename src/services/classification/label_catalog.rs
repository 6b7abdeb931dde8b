// Label Catalog
// Maps label keys to the natural-language hypothesis sentences the zero-shot
// oracle is prompted with. Built once at startup and passed to the pipeline
// as an immutable value, so several differently configured catalogs can
// coexist in one process.

use std::collections::HashMap;

pub const NON_SENSITIVE_LABEL: &str = "Non-sensitive";
pub const TECHNICAL_CONTENT_LABEL: &str = "Technical-Content";

#[derive(Debug, Clone)]
pub struct LabelCatalog {
    /// Key -> hypothesis, in catalog order. Order defines the default
    /// candidate set.
    entries: Vec<(String, String)>,
    by_key: HashMap<String, usize>,
    by_hypothesis: HashMap<String, String>,
}

impl LabelCatalog {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        let mut by_key = HashMap::new();
        let mut by_hypothesis = HashMap::new();
        for (idx, (key, hypothesis)) in entries.iter().enumerate() {
            by_key.insert(key.clone(), idx);
            by_hypothesis.insert(hypothesis.clone(), key.clone());
        }
        Self {
            entries,
            by_key,
            by_hypothesis,
        }
    }

    /// The built-in sensitive-data catalog.
    pub fn builtin() -> Self {
        let entries = [
            (
                "Personal-Identity",
                "Personal identity information such as full name, national ID, CCCD/CMND, driver's license, or passport number.",
            ),
            (
                "Contact-Info",
                "Contact information such as phone number, email address, home address.",
            ),
            (
                "Financial-Info",
                "Financial information such as bank account, credit card number, SWIFT code, routing number, or transactions.",
            ),
            (
                "Health-Info",
                "Medical or health-related information such as diseases, medical results, prescriptions, medication, hospital visits, or treatment records.",
            ),
            (
                "Credentials",
                "Authentication credentials such as passwords, OTP codes, API keys, session tokens, encryption keys, or login tokens.",
            ),
            (
                "Location-Info",
                "Location or tracking information such as GPS coordinates, real-time location, or movement history.",
            ),
            (
                "Biometric-Info",
                "Biometric identifiers such as fingerprints, facial data, retina scan, DNA, biometric templates, or voice patterns.",
            ),
            (
                "System-Info",
                "System or device identifiers such as IP addresses, IPv6 addresses, MAC addresses, IMEI numbers, or hostnames.",
            ),
            (
                TECHNICAL_CONTENT_LABEL,
                "Technical content such as source code, shell commands, compilation output, or deployment instructions.",
            ),
            (
                NON_SENSITIVE_LABEL,
                "The text does not contain any sensitive information.",
            ),
        ];

        Self::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn hypothesis(&self, key: &str) -> Option<&str> {
        self.by_key
            .get(key)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Default candidate set: every catalog key, in catalog order.
    pub fn default_candidates(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Per-standard candidate selection: a recognized standard collapses the
    /// set to exactly that label plus Non-sensitive; anything else falls back
    /// to the full default catalog.
    pub fn candidates_for_standard(&self, standard: Option<&str>) -> Vec<String> {
        match standard {
            Some(s) if self.contains(s) && s != NON_SENSITIVE_LABEL => {
                vec![s.to_string(), NON_SENSITIVE_LABEL.to_string()]
            }
            _ => self.default_candidates(),
        }
    }

    /// Resolve candidate keys to their hypothesis sentences, preserving
    /// order. Every key must exist in the catalog.
    pub fn resolve(&self, keys: &[String]) -> Result<Vec<String>, String> {
        keys.iter()
            .map(|k| {
                self.hypothesis(k)
                    .map(|h| h.to_string())
                    .ok_or_else(|| k.clone())
            })
            .collect()
    }

    /// Map a hypothesis returned by the oracle back to its label key. An
    /// unmapped hypothesis degrades to the raw hypothesis text rather than
    /// failing the document.
    pub fn key_for_hypothesis<'a>(&'a self, hypothesis: &'a str) -> &'a str {
        self.by_hypothesis
            .get(hypothesis)
            .map(|k| k.as_str())
            .unwrap_or(hypothesis)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LabelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
