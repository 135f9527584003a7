//! Standard Scaler - z-score normalization with fitted parameters
//!
//! Applies `(x - mean) / scale` per slot using parameters fitted offline.
//! Pure and stateless from the caller's perspective.

use serde::{Deserialize, Serialize};

use super::DimensionMismatchError;

/// Normalizes a raw feature vector into the distribution the classifier
/// was trained on. Implementations are read-only after load and safe to
/// share across concurrent predictions.
pub trait Scaler: Send + Sync {
    /// Transform a raw vector. Same width in and out; a width differing
    /// from the fitted width is an error, never coerced.
    fn transform(&self, values: &[f32]) -> Result<Vec<f32>, DimensionMismatchError>;

    /// Width this scaler was fitted on
    fn width(&self) -> usize;
}

/// Fitted parameters of a standard (z-score) scaler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

/// Concrete scaler backed by fitted mean/scale arrays
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl StandardScaler {
    /// Build from fitted parameters. Rejects inconsistent or degenerate
    /// parameter arrays (the artifact would be unusable).
    pub fn from_params(params: ScalerParams) -> Result<Self, String> {
        if params.mean.len() != params.scale.len() {
            return Err(format!(
                "Scaler mean/scale length mismatch: {} vs {}",
                params.mean.len(),
                params.scale.len()
            ));
        }
        if params.mean.is_empty() {
            return Err("Scaler parameters are empty".to_string());
        }
        if params.mean.iter().chain(params.scale.iter()).any(|v| !v.is_finite()) {
            return Err("Scaler parameters contain non-finite values".to_string());
        }
        if params.scale.iter().any(|&s| s == 0.0) {
            return Err("Scaler scale contains zero".to_string());
        }

        Ok(Self {
            mean: params.mean,
            scale: params.scale,
        })
    }

    pub fn params(&self) -> ScalerParams {
        ScalerParams {
            mean: self.mean.clone(),
            scale: self.scale.clone(),
        }
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, values: &[f32]) -> Result<Vec<f32>, DimensionMismatchError> {
        if values.len() != self.mean.len() {
            return Err(DimensionMismatchError {
                expected: self.mean.len(),
                actual: values.len(),
            });
        }

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    fn width(&self) -> usize {
        self.mean.len()
    }
}
