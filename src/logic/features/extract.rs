//! Feature Extraction Entry Point
//!
//! Composes the per-family measurements into the canonical 48-slot vector.
//! Total and deterministic: any string, malformed or not, yields a vector;
//! the same string always yields bit-identical output.

use super::domain::DomainFeatures;
use super::entropy::EntropyFeatures;
use super::keywords::KeywordFeatures;
use super::lexical::LexicalFeatures;
use super::path::PathFeatures;
use super::url;
use super::vector::{FeatureExtractor, FeatureVector};

/// Extract the canonical feature vector from a URL string.
///
/// Components that cannot be isolated behave as empty strings; reserved
/// slots stay at their neutral 0.
pub fn extract(url_str: &str) -> FeatureVector {
    let parts = url::parse(url_str);

    let lexical = LexicalFeatures::measure(url_str);
    let domain = DomainFeatures::measure(&parts.authority);
    let path = PathFeatures::measure(&parts.path, &parts.query);
    let keywords = KeywordFeatures::measure(url_str, &parts.authority);
    let entropy = EntropyFeatures::measure(&parts.registrable_domain());

    let mut vector = FeatureVector::new();
    lexical.extract(&mut vector);
    domain.extract(&mut vector);
    path.extract(&mut vector);
    keywords.extract(&mut vector);
    entropy.extract(&mut vector);

    vector
}
