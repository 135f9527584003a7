//! Domain Randomness Signal
//!
//! Shannon entropy (base 2) of the registrable domain. High entropy is a
//! signal for algorithmically generated domains.

use std::collections::BTreeMap;

use super::vector::{FeatureExtractor, FeatureVector};

/// Shannon entropy (base 2) of a string's character distribution.
///
/// Empty strings and single-symbol alphabets are defined as 0. Uses an
/// ordered map so summation order, and therefore the float result, is
/// deterministic for a given input.
pub fn shannon_entropy(s: &str) -> f32 {
    let total = s.chars().count();
    if total == 0 {
        return 0.0;
    }

    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
    }

    let total = total as f64;
    let entropy: f64 = counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();

    // -0.0 normalizes to 0.0
    (entropy.max(0.0)) as f32
}

/// Entropy measurement of the registrable domain
#[derive(Debug, Clone, Default)]
pub struct EntropyFeatures {
    pub domain_entropy: f32,
}

impl EntropyFeatures {
    pub fn measure(registrable_domain: &str) -> Self {
        Self {
            domain_entropy: shannon_entropy(registrable_domain),
        }
    }
}

impl FeatureExtractor for EntropyFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[40] = self.domain_entropy; // domain_entropy
    }
}
