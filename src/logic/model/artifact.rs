//! Artifact Envelope - checksummed storage for fitted parameters
//!
//! Scaler and classifier parameters are persisted as JSON envelopes:
//! `{format_version, kind, data: base64(params-json), checksum: hex(sha256(data))}`.
//! The checksum covers the base64 payload, so any byte flip in the stored
//! parameters is detected at load time. Loading failure is fatal to the
//! process: there is no fallback to an untrained model.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::classifier::{ForestClassifier, ForestParams};
use super::scaler::{Scaler as _, ScalerParams, StandardScaler};

/// Envelope format version
const FORMAT_VERSION: u32 = 1;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone)]
pub enum ArtifactError {
    /// Artifact file does not exist
    Missing(PathBuf),
    /// File I/O error
    Io(String),
    /// Envelope or payload is not valid JSON/base64
    Parse(String),
    /// Stored checksum does not match the payload (file tampered/corrupt)
    ChecksumMismatch,
    /// Envelope holds a different artifact kind than requested
    KindMismatch { expected: String, actual: String },
    /// Parameters parsed but are structurally unusable
    Invalid(String),
}

impl std::fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(path) => write!(f, "Artifact not found: {}", path.display()),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Parse(e) => write!(f, "Parse error: {}", e),
            Self::ChecksumMismatch => write!(f, "Checksum mismatch (artifact tampered or corrupt)"),
            Self::KindMismatch { expected, actual } => {
                write!(f, "Artifact kind mismatch: expected {}, got {}", expected, actual)
            }
            Self::Invalid(e) => write!(f, "Invalid artifact parameters: {}", e),
        }
    }
}

impl std::error::Error for ArtifactError {}

// ============================================================================
// ENVELOPE
// ============================================================================

/// What an envelope claims to contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Scaler,
    Classifier,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scaler => "scaler",
            Self::Classifier => "classifier",
        }
    }
}

/// On-disk envelope format
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactFile {
    format_version: u32,
    kind: String,
    /// base64-encoded parameter JSON
    data: String,
    /// hex(sha256(data))
    checksum: String,
}

fn checksum_of(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}

// ============================================================================
// SAVE / LOAD
// ============================================================================

/// Write fitted parameters into a checksummed envelope.
pub fn save_artifact<T: Serialize>(
    path: &Path,
    kind: ArtifactKind,
    params: &T,
) -> Result<(), ArtifactError> {
    let payload = serde_json::to_vec(params).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    let data = BASE64.encode(&payload);
    let checksum = checksum_of(&data);

    let file = ArtifactFile {
        format_version: FORMAT_VERSION,
        kind: kind.as_str().to_string(),
        data,
        checksum,
    };

    let content =
        serde_json::to_string_pretty(&file).map_err(|e| ArtifactError::Parse(e.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ArtifactError::Io(e.to_string()))?;
    }
    fs::write(path, content).map_err(|e| ArtifactError::Io(e.to_string()))?;

    log::info!("Artifact saved: kind={} path={}", kind.as_str(), path.display());
    Ok(())
}

/// Read, verify, and decode the payload of an on-disk envelope.
fn read_payload(path: &Path, kind: ArtifactKind) -> Result<Vec<u8>, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|e| ArtifactError::Io(e.to_string()))?;
    decode_payload(&content, kind)
}

/// Verify and decode the payload of an envelope already in memory.
fn decode_payload(content: &str, kind: ArtifactKind) -> Result<Vec<u8>, ArtifactError> {
    let file: ArtifactFile =
        serde_json::from_str(content).map_err(|e| ArtifactError::Parse(e.to_string()))?;

    if file.format_version != FORMAT_VERSION {
        return Err(ArtifactError::Parse(format!(
            "Unsupported envelope format version {}",
            file.format_version
        )));
    }

    // Verify checksum before trusting the payload
    if checksum_of(&file.data) != file.checksum {
        return Err(ArtifactError::ChecksumMismatch);
    }

    if file.kind != kind.as_str() {
        return Err(ArtifactError::KindMismatch {
            expected: kind.as_str().to_string(),
            actual: file.kind,
        });
    }

    BASE64
        .decode(&file.data)
        .map_err(|e| ArtifactError::Parse(e.to_string()))
}

fn scaler_from_payload(payload: &[u8]) -> Result<StandardScaler, ArtifactError> {
    let params: ScalerParams =
        serde_json::from_slice(payload).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    StandardScaler::from_params(params).map_err(ArtifactError::Invalid)
}

fn classifier_from_payload(payload: &[u8]) -> Result<ForestClassifier, ArtifactError> {
    let params: ForestParams =
        serde_json::from_slice(payload).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    ForestClassifier::from_params(params).map_err(ArtifactError::Invalid)
}

/// Load the fitted scaler from its envelope.
pub fn load_scaler(path: &Path) -> Result<StandardScaler, ArtifactError> {
    let payload = read_payload(path, ArtifactKind::Scaler)?;
    let scaler = scaler_from_payload(&payload)?;
    log::info!("Scaler loaded: width={} path={}", scaler.width(), path.display());
    Ok(scaler)
}

/// Load the fitted classifier from its envelope.
pub fn load_classifier(path: &Path) -> Result<ForestClassifier, ArtifactError> {
    let payload = read_payload(path, ArtifactKind::Classifier)?;
    let classifier = classifier_from_payload(&payload)?;
    log::info!("Classifier loaded: path={}", path.display());
    Ok(classifier)
}

/// Load the fitted scaler from an envelope already in memory, for builds
/// that embed the artifacts instead of shipping a models directory.
pub fn load_scaler_from_bytes(bytes: &[u8]) -> Result<StandardScaler, ArtifactError> {
    let content =
        std::str::from_utf8(bytes).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    scaler_from_payload(&decode_payload(content, ArtifactKind::Scaler)?)
}

/// In-memory counterpart of `load_classifier`.
pub fn load_classifier_from_bytes(bytes: &[u8]) -> Result<ForestClassifier, ArtifactError> {
    let content =
        std::str::from_utf8(bytes).map_err(|e| ArtifactError::Parse(e.to_string()))?;
    classifier_from_payload(&decode_payload(content, ArtifactKind::Classifier)?)
}

// ============================================================================
// TESTS
// ============================================================================
