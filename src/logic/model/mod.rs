//! Model Module - Pre-Fitted Scaler & Classifier
//!
//! Both artifacts are opaque, fitted offline, and immutable after load.
//! There is no in-process fallback: a missing or corrupt artifact is fatal
//! at startup.
//!
//! - `scaler.rs` - Standard (z-score) scaler
//! - `classifier.rs` - Decision-tree ensemble
//! - `artifact.rs` - Signed JSON envelope load/save

pub mod artifact;
pub mod classifier;
pub mod scaler;

// Re-export common types
pub use artifact::{
    load_classifier, load_classifier_from_bytes, load_scaler, load_scaler_from_bytes,
    ArtifactError, ArtifactKind,
};
pub use classifier::{Classifier, ForestClassifier};
pub use scaler::{Scaler, StandardScaler};

// ============================================================================
// DIMENSION CONTRACT
// ============================================================================

/// Error when a scaler or classifier is invoked with a vector whose width
/// differs from the width it was fitted on. Always a contract violation;
/// never silently truncated or padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionMismatchError {
    pub expected: usize,
    pub actual: usize,
}

impl std::fmt::Display for DimensionMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Dimension mismatch: fitted for {} features, got {}",
            self.expected, self.actual
        )
    }
}

impl std::error::Error for DimensionMismatchError {}
