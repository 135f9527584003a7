//! Prediction Pipeline - validate → extract → scale → classify → log
//!
//! One invocation walks Received → Validated → FeatureExtracted → Scaled →
//! Classified → Logged → Returned. A ledger-write failure does NOT turn
//! into an error for the caller: the verdict is still returned, with the
//! failure carried distinctly in `LedgerStatus` and reported on the log.
//!
//! Construction is explicit: the pipeline takes already-loaded, immutable
//! artifacts and a ledger handle, so every collaborator can be a test
//! double. No global state.

use std::sync::Arc;

use crate::logic::features::{self, FeatureVector, VectorError, FEATURE_COUNT};
use crate::logic::ledger::{LedgerError, LogRecord, PredictionLedger};
use crate::logic::model::{Classifier, DimensionMismatchError, Scaler};
use crate::logic::verdict::Verdict;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone)]
pub enum PipelineError {
    /// Caller input is deterministically bad (wrong-width vector,
    /// non-finite entries, unparsable batch schema). Never retried.
    InputValidation(String),
    /// Scaler/Classifier invoked with the wrong width - a contract error
    Dimension(DimensionMismatchError),
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputValidation(e) => write!(f, "Input validation failed: {}", e),
            Self::Dimension(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<DimensionMismatchError> for PipelineError {
    fn from(e: DimensionMismatchError) -> Self {
        Self::Dimension(e)
    }
}

impl From<VectorError> for PipelineError {
    fn from(e: VectorError) -> Self {
        Self::InputValidation(e.to_string())
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of the ledger write for a prediction
#[derive(Debug, Clone)]
pub enum LedgerStatus {
    Recorded,
    /// The verdict is valid but was not durably recorded
    Failed(LedgerError),
}

impl LedgerStatus {
    pub fn is_recorded(&self) -> bool {
        matches!(self, Self::Recorded)
    }
}

/// A returned verdict plus the fate of its ledger record
#[derive(Debug, Clone)]
pub struct Prediction {
    pub verdict: Verdict,
    pub ledger: LedgerStatus,
}

/// Batch result: per-row verdicts share one ledger status, because the
/// batch is appended as a single atomic block.
#[derive(Debug, Clone)]
pub struct BatchPrediction {
    pub verdicts: Vec<Verdict>,
    pub ledger: LedgerStatus,
}

/// One row of a batch: either a raw URL or a pre-computed vector
#[derive(Debug, Clone)]
pub enum BatchInput {
    Url(String),
    Vector(Vec<f32>),
}

// ============================================================================
// PIPELINE
// ============================================================================

pub struct Pipeline {
    scaler: Arc<dyn Scaler>,
    classifier: Arc<dyn Classifier>,
    ledger: Arc<dyn PredictionLedger>,
}

impl Pipeline {
    pub fn new(
        scaler: Arc<dyn Scaler>,
        classifier: Arc<dyn Classifier>,
        ledger: Arc<dyn PredictionLedger>,
    ) -> Self {
        Self {
            scaler,
            classifier,
            ledger,
        }
    }

    /// Classify a single URL and record the verdict.
    pub fn predict_url(&self, url: &str) -> Result<Prediction, PipelineError> {
        let vector = features::extract(url);
        let verdict = self.classify(&vector)?;
        let ledger = self.log_one(LogRecord::now(url.to_string(), verdict.label));
        Ok(Prediction { verdict, ledger })
    }

    /// Classify a pre-computed feature row. Width must equal the canonical
    /// count exactly; a mismatch is an input error, never auto-corrected.
    pub fn predict_vector(&self, values: Vec<f32>) -> Result<Prediction, PipelineError> {
        let vector = FeatureVector::try_from_vec(values)?;
        let verdict = self.classify(&vector)?;
        let ledger = self.log_one(LogRecord::now(vector.to_json_values(), verdict.label));
        Ok(Prediction { verdict, ledger })
    }

    /// Classify a batch. Every row is validated up front; any malformed row
    /// fails the whole batch before anything is classified or logged. The
    /// ledger append is one atomic block.
    pub fn predict_batch(&self, inputs: &[BatchInput]) -> Result<BatchPrediction, PipelineError> {
        // Validate all rows first
        let mut vectors = Vec::with_capacity(inputs.len());
        for (row, input) in inputs.iter().enumerate() {
            let vector = match input {
                BatchInput::Url(url) => features::extract(url),
                BatchInput::Vector(values) => FeatureVector::try_from_vec(values.clone())
                    .map_err(|e| PipelineError::InputValidation(format!("row {}: {}", row, e)))?,
            };
            vectors.push(vector);
        }

        // Classify all rows
        let mut verdicts = Vec::with_capacity(vectors.len());
        for vector in &vectors {
            verdicts.push(self.classify(vector)?);
        }

        // One contiguous ledger block for the whole batch
        let records: Vec<LogRecord> = inputs
            .iter()
            .zip(vectors.iter().zip(verdicts.iter()))
            .map(|(input, (vector, verdict))| {
                let features = match input {
                    BatchInput::Url(url) => url.clone(),
                    BatchInput::Vector(_) => vector.to_json_values(),
                };
                LogRecord::now(features, verdict.label)
            })
            .collect();

        let ledger = match self.ledger.append_batch(&records) {
            Ok(()) => LedgerStatus::Recorded,
            Err(e) => {
                log::error!("Ledger batch append failed ({} rows): {}", records.len(), e);
                LedgerStatus::Failed(e)
            }
        };

        Ok(BatchPrediction { verdicts, ledger })
    }

    /// Scale then classify one vector.
    fn classify(&self, vector: &FeatureVector) -> Result<Verdict, PipelineError> {
        let scaled = self.scaler.transform(vector.as_slice())?;
        let verdict = self.classifier.classify(&scaled)?;
        log::debug!("Classified: {}", verdict);
        Ok(verdict)
    }

    fn log_one(&self, record: LogRecord) -> LedgerStatus {
        match self.ledger.append(&record) {
            Ok(()) => LedgerStatus::Recorded,
            Err(e) => {
                log::error!("Ledger append failed: {}", e);
                LedgerStatus::Failed(e)
            }
        }
    }

    pub fn ledger(&self) -> &Arc<dyn PredictionLedger> {
        &self.ledger
    }

    /// Canonical vector width this pipeline accepts
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }
}

// ============================================================================
// TESTS
// ============================================================================
