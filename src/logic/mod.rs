//! Logic Module - Classification Engines
//!
//! - `features/` - Lexical URL feature extraction (48-slot vector)
//! - `model/` - Pre-fitted scaler + classifier artifacts
//! - `ledger/` - Durable append-only prediction store
//! - `pipeline.rs` - Orchestration: validate, extract, scale, classify, log
//! - `batch.rs` - CSV batch mode
//! - `verdict.rs` - Label/Verdict contract

pub mod batch;
pub mod features;
pub mod ledger;
pub mod model;
pub mod pipeline;
pub mod verdict;
