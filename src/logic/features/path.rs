//! Path & Query Structure Features
//!
//! Directory separators, segment shapes, embedded IPv4 literals, and the
//! query parameter count. An empty path yields 0 for every slot here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::vector::{FeatureExtractor, FeatureVector};

/// Matches a dotted IPv4 literal anywhere in the path
static IPV4_ANYWHERE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,3}(\.\d{1,3}){3}").expect("valid IPv4 regex"));

/// Measurements over the path and query components
#[derive(Debug, Clone, Default)]
pub struct PathFeatures {
    pub path_len: usize,
    pub dir_count: usize,
    pub double_slash: bool,
    pub last_segment_len: usize,
    pub ip_in_path: bool,
    pub dot_count: usize,
    pub numeric_segment_count: usize,
    pub query_param_count: usize,
}

impl PathFeatures {
    pub fn measure(path: &str, query: &str) -> Self {
        // Final '/'-separated segment; empty path has no segments at all.
        let last_segment_len = if path.is_empty() {
            0
        } else {
            path.rsplit('/').next().map_or(0, |s| s.chars().count())
        };

        let numeric_segment_count = path
            .split('/')
            .filter(|seg| !seg.is_empty() && seg.chars().all(|c| c.is_numeric()))
            .count();

        let query_param_count = if query.is_empty() {
            0
        } else {
            query.matches('&').count() + 1
        };

        Self {
            path_len: path.chars().count(),
            dir_count: path.matches('/').count(),
            double_slash: path.contains("//"),
            last_segment_len,
            ip_in_path: IPV4_ANYWHERE_RE.is_match(path),
            dot_count: path.matches('.').count(),
            numeric_segment_count,
            query_param_count,
        }
    }
}

impl FeatureExtractor for PathFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[6] = self.query_param_count as f32;       // query_param_count
        vector.values[10] = self.path_len as f32;               // path_len
        vector.values[11] = self.dir_count as f32;              // path_dir_count
        vector.values[15] = self.double_slash as u8 as f32;     // double_slash_path
        vector.values[18] = self.dir_count as f32;              // path_subdir_count
        vector.values[32] = self.last_segment_len as f32;       // last_segment_len
        vector.values[33] = self.ip_in_path as u8 as f32;       // ip_in_path
        vector.values[35] = self.dot_count as f32;              // path_dot_count
        vector.values[37] = self.numeric_segment_count as f32;  // numeric_segment_count
    }
}
