//! Features Module - URL Feature Extraction Engine
//!
//! Pure lexical/structural analysis: no network access, no external
//! lookups. The extractor is total (malformed URLs still produce a vector)
//! and deterministic.
//!
//! ## Structure
//! - `layout.rs` - Versioned 48-slot feature schema (single source of truth)
//! - `vector.rs` - Versioned FeatureVector + extractor trait
//! - `url.rs` - Best-effort URL decomposition
//! - `lexical.rs` / `domain.rs` / `path.rs` / `keywords.rs` / `entropy.rs`
//!   - One measuring struct per feature family
//! - `extract.rs` - Composes the families into `extract()`

pub mod domain;
pub mod entropy;
pub mod extract;
pub mod keywords;
pub mod layout;
pub mod lexical;
pub mod path;
pub mod url;
pub mod vector;


// Re-export common types
pub use extract::extract;
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};
pub use vector::{FeatureExtractor, FeatureVector, VectorError};
