//! Authority (Domain) Features
//!
//! Measurements over the raw authority string: label structure, literal
//! IPv4 detection, suspicious TLD membership, character counts.

use once_cell::sync::Lazy;
use regex::Regex;

use super::vector::{FeatureExtractor, FeatureVector};

/// TLD suffixes flagged as suspicious (exact suffix match on the authority)
pub const SUSPICIOUS_TLDS: &[&str] = &[".xyz", ".top", ".club", ".info", ".review"];

/// Matches an authority that is nothing but a dotted IPv4 literal
static IPV4_AUTHORITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").expect("valid IPv4 regex"));

/// Measurements over the authority component
#[derive(Debug, Clone, Default)]
pub struct DomainFeatures {
    pub domain_len: usize,
    pub subdomain_count: usize,
    pub is_ip: bool,
    pub suspicious_tld: bool,
    pub has_hyphen: bool,
    pub tld_len: usize,
    pub digit_count: usize,
    pub letter_count: usize,
    pub has_port: bool,
}

impl DomainFeatures {
    pub fn measure(authority: &str) -> Self {
        let subdomain_count = if authority.is_empty() {
            0
        } else {
            authority.split('.').count() - 1
        };

        // Last dot-separated label; 0 length when the authority has no '.'
        let tld_len = if authority.contains('.') {
            authority.rsplit('.').next().map_or(0, |t| t.chars().count())
        } else {
            0
        };

        Self {
            domain_len: authority.chars().count(),
            subdomain_count,
            is_ip: IPV4_AUTHORITY_RE.is_match(authority),
            suspicious_tld: SUSPICIOUS_TLDS.iter().any(|tld| authority.ends_with(tld)),
            has_hyphen: authority.contains('-'),
            tld_len,
            digit_count: authority.chars().filter(|c| c.is_numeric()).count(),
            letter_count: authority.chars().filter(|c| c.is_alphabetic()).count(),
            has_port: authority.contains(':'),
        }
    }
}

impl FeatureExtractor for DomainFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[7] = self.domain_len as f32;            // domain_len
        vector.values[8] = self.subdomain_count as f32;       // subdomain_count
        vector.values[9] = self.is_ip as u8 as f32;           // ip_authority
        vector.values[16] = self.suspicious_tld as u8 as f32; // suspicious_tld
        vector.values[19] = self.has_hyphen as u8 as f32;     // domain_hyphen
        vector.values[21] = self.tld_len as f32;              // tld_len
        vector.values[30] = self.digit_count as f32;          // domain_digit_count
        vector.values[31] = self.letter_count as f32;         // domain_letter_count
        vector.values[34] = self.has_port as u8 as f32;       // has_port
    }
}
