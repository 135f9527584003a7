//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The deployed scaler and classifier were fitted against this exact
//! 48-slot order. Slots 41-47 are reserved padding: they keep the vector
//! width stable and must never be silently repurposed.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
/// This is the SINGLE SOURCE OF TRUTH for feature layout
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Whole-URL lexical (0-5) ===
    "url_len",              // 0: Characters in the whole URL
    "dot_count",            // 1: '.' occurrences in URL
    "hyphen_count",         // 2: '-' occurrences in URL
    "digit_count",          // 3: Numeric characters in URL
    "has_at",               // 4: 1 if '@' occurs anywhere
    "https_scheme",         // 5: 1 if the raw URL starts with "https"

    // === Query / authority structure (6-9) ===
    "query_param_count",    // 6: 0 if query empty, else 1 + '&' separators
    "domain_len",           // 7: Characters in the authority
    "subdomain_count",      // 8: Dot-separated authority labels minus 1
    "ip_authority",         // 9: 1 if the authority is a literal IPv4

    // === Path structure (10-11) ===
    "path_len",             // 10: Characters in the path
    "path_dir_count",       // 11: '/' occurrences in the path

    // === Risk signals (12-16) ===
    "keyword_count",        // 12: Suspicious keywords present in the URL
    "special_char_count",   // 13: Total of ? = & % $ #
    "digit_letter_ratio",   // 14: digits / letters, 0 when letters == 0
    "double_slash_path",    // 15: 1 if "//" occurs in the path
    "suspicious_tld",       // 16: 1 if the authority ends with a flagged TLD

    // === Character counts (17-31) ===
    "at_count",             // 17: '@' occurrences
    "path_subdir_count",    // 18: '/' occurrences in the path (fitted twin of 11)
    "domain_hyphen",        // 19: 1 if '-' occurs in the authority
    "underscore_count",     // 20: '_' occurrences
    "tld_len",              // 21: Characters in the last authority label
    "fragment_count",       // 22: '#' occurrences
    "equals_count",         // 23: '=' occurrences
    "question_count",       // 24: '?' occurrences
    "ampersand_count",      // 25: '&' occurrences
    "percent_count",        // 26: '%' occurrences
    "dollar_count",         // 27: '$' occurrences
    "upper_count",          // 28: Uppercase characters in URL
    "lower_count",          // 29: Lowercase characters in URL
    "domain_digit_count",   // 30: Numeric characters in the authority
    "domain_letter_count",  // 31: Alphabetic characters in the authority

    // === Path details (32-38) ===
    "last_segment_len",     // 32: Characters in the final path segment
    "ip_in_path",           // 33: 1 if an IPv4 literal occurs in the path
    "has_port",             // 34: 1 if ':' occurs in the authority
    "path_dot_count",       // 35: '.' occurrences in the path
    "repeat_char_count",    // 36: Adjacent identical character pairs in URL
    "numeric_segment_count",// 37: Path segments consisting entirely of digits
    "has_encoded",          // 38: 1 if '%' occurs in the URL

    // === Domain risk (39-40) ===
    "domain_keyword_count", // 39: Suspicious keywords present in the authority
    "domain_entropy",       // 40: Shannon entropy of the registrable domain

    // === Reserved (41-47) ===
    "reserved_0",           // 41: Always 0
    "reserved_1",           // 42: Always 0
    "reserved_2",           // 43: Always 0
    "reserved_3",           // 44: Always 0
    "reserved_4",           // 45: Always 0
    "reserved_5",           // 46: Always 0
    "reserved_6",           // 47: Always 0
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 48;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of the feature layout
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash() -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[FEATURE_VERSION]);

    // Hash all feature names in order
    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (cached for performance)
pub fn layout_hash() -> u32 {
    // Computed at compile time effectively since inputs are const
    compute_layout_hash()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when feature layout doesn't match expected
#[derive(Debug, Clone)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

impl std::fmt::Display for LayoutMismatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Feature layout mismatch: expected v{} (hash: {:08x}), got v{} (hash: {:08x})",
            self.expected_version,
            self.expected_hash,
            self.actual_version,
            self.actual_hash
        )
    }
}

impl std::error::Error for LayoutMismatchError {}

/// Validate that incoming data matches current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Check if layout is compatible (same version, same hash)
pub fn is_layout_compatible(version: u8, hash: u32) -> bool {
    version == FEATURE_VERSION && hash == layout_hash()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================
