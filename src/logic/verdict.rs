//! Verdict Types - the classifier's output contract
//!
//! Class 1 means Phishing, class 0 means Legit. This mapping is fixed by
//! the fitted model and must never be inferred dynamically.

use serde::{Deserialize, Serialize};

/// Binary classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Phishing,
    Legit,
}

impl Label {
    /// Map the model's raw class to a label. 1 → Phishing, 0 → Legit.
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Label::Phishing
        } else {
            Label::Legit
        }
    }

    /// The persisted string form (ledger and batch-output column)
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "Phishing",
            Label::Legit => "Legit",
        }
    }

    /// Parse the persisted string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Phishing" => Some(Label::Phishing),
            "Legit" => Some(Label::Legit),
            _ => None,
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classification outcome: label plus optional confidence in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: Option<f32>,
}

impl Verdict {
    pub fn new(label: Label, confidence: Option<f32>) -> Self {
        Self { label, confidence }
    }

    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.confidence {
            Some(c) => write!(f, "{} ({:.1}%)", self.label, c * 100.0),
            None => write!(f, "{}", self.label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_mapping_is_fixed() {
        assert_eq!(Label::from_class(1), Label::Phishing);
        assert_eq!(Label::from_class(0), Label::Legit);
    }

    #[test]
    fn test_string_round_trip() {
        assert_eq!(Label::parse("Phishing"), Some(Label::Phishing));
        assert_eq!(Label::parse("Legit"), Some(Label::Legit));
        assert_eq!(Label::parse("phishing"), None);
        assert_eq!(Label::parse(Label::Phishing.as_str()), Some(Label::Phishing));
    }

    #[test]
    fn test_display() {
        let v = Verdict::new(Label::Phishing, Some(0.875));
        assert_eq!(v.to_string(), "Phishing (87.5%)");

        let v = Verdict::new(Label::Legit, None);
        assert_eq!(v.to_string(), "Legit");
    }
}
