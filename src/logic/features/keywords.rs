//! Suspicious Keyword Features
//!
//! Fixed vocabulary, matched case-insensitively as substrings. Each keyword
//! contributes at most 1 to a count (presence, not occurrences), matched
//! independently against the whole URL and against the authority.

use super::vector::{FeatureExtractor, FeatureVector};

/// The fixed phishing vocabulary. Order is irrelevant; membership is not.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "secure", "login", "verify", "account", "update", "free", "bonus",
];

/// Keyword presence counts for URL and authority
#[derive(Debug, Clone, Default)]
pub struct KeywordFeatures {
    pub url_keyword_count: usize,
    pub domain_keyword_count: usize,
}

impl KeywordFeatures {
    pub fn measure(url: &str, authority: &str) -> Self {
        Self {
            url_keyword_count: count_keywords(url),
            domain_keyword_count: count_keywords(authority),
        }
    }
}

/// How many vocabulary entries occur in `text` (case-insensitive substring)
fn count_keywords(text: &str) -> usize {
    let lower = text.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count()
}

impl FeatureExtractor for KeywordFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[12] = self.url_keyword_count as f32;    // keyword_count
        vector.values[39] = self.domain_keyword_count as f32; // domain_keyword_count
    }
}
