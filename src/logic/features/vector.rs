//! Feature Vector - Core data structure for classifier input
//!
//! **Versioned feature vector with layout validation**
//!
//! Uses centralized layout from `layout.rs` for:
//! - Consistent feature ordering
//! - Version tracking
//! - Layout hash for compatibility checks

use super::layout::{
    layout_hash, validate_layout, LayoutMismatchError, FEATURE_COUNT, FEATURE_LAYOUT,
    FEATURE_VERSION,
};

// ============================================================================
// ERRORS
// ============================================================================

/// Error converting raw numbers into a feature vector
#[derive(Debug, Clone, PartialEq)]
pub enum VectorError {
    /// Input has the wrong number of entries
    WidthMismatch { expected: usize, actual: usize },
    /// Entry at `index` is NaN or infinite
    NonFinite { index: usize },
}

impl std::fmt::Display for VectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WidthMismatch { expected, actual } => {
                write!(f, "Expected {} features, got {}", expected, actual)
            }
            Self::NonFinite { index } => {
                write!(f, "Feature {} is not a finite number", index)
            }
        }
    }
}

impl std::error::Error for VectorError {}

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Versioned Feature Vector with layout metadata
///
/// This struct MUST be used for all feature data to ensure compatibility.
/// Never pass raw `Vec<f32>` between pipeline stages!
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create a new zeroed feature vector with current version
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [0.0; FEATURE_COUNT],
        }
    }

    /// Create from raw values with current version
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    /// Create from a Vec<f32>, rejecting wrong widths and non-finite entries.
    ///
    /// Width mismatches are contract errors, never silently truncated or
    /// zero-padded.
    pub fn try_from_vec(values: Vec<f32>) -> Result<Self, VectorError> {
        if values.len() != FEATURE_COUNT {
            return Err(VectorError::WidthMismatch {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }

        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(VectorError::NonFinite { index });
        }

        let mut array = [0.0f32; FEATURE_COUNT];
        array.copy_from_slice(&values);
        Ok(Self::from_values(array))
    }

    /// Get values as array reference
    pub fn as_array(&self) -> &[f32; FEATURE_COUNT] {
        &self.values
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Get feature by index
    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Get feature by name
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).and_then(|i| self.get(i))
    }

    /// Set feature by index
    pub fn set(&mut self, index: usize, value: f32) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Set feature by name
    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        if let Some(index) = super::layout::feature_index(name) {
            self.set(index, value);
            true
        } else {
            false
        }
    }

    /// Validate that this vector is compatible with current layout
    pub fn validate(&self) -> Result<(), LayoutMismatchError> {
        validate_layout(self.version, self.layout_hash)
    }

    /// Check if this vector is compatible with current layout
    pub fn is_compatible(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get feature names for this vector
    pub fn feature_names(&self) -> &'static [&'static str] {
        FEATURE_LAYOUT
    }

    /// Serialize the raw values as a JSON array string (ledger form)
    pub fn to_json_values(&self) -> String {
        serde_json::to_string(self.as_slice()).unwrap_or_else(|_| "[]".to_string())
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

impl From<[f32; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f32; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

// ============================================================================
// FEATURE EXTRACTOR TRAIT
// ============================================================================

/// Trait for per-family feature measurements
pub trait FeatureExtractor {
    /// Write this family's slots into the vector
    fn extract(&self, vector: &mut FeatureVector);
}

// ============================================================================
// TESTS
// ============================================================================
