//! Whole-URL Lexical Features
//!
//! Single-pass character scan over the raw URL string. Counts are
//! Unicode-aware (`char::is_numeric` / `is_alphabetic`).

use super::vector::{FeatureExtractor, FeatureVector};

/// Character-level measurements over the whole URL
#[derive(Debug, Clone, Default)]
pub struct LexicalFeatures {
    pub url_len: usize,
    pub dot_count: usize,
    pub hyphen_count: usize,
    pub digit_count: usize,
    pub letter_count: usize,
    pub upper_count: usize,
    pub lower_count: usize,
    pub at_count: usize,
    pub underscore_count: usize,
    pub hash_count: usize,
    pub equals_count: usize,
    pub question_count: usize,
    pub ampersand_count: usize,
    pub percent_count: usize,
    pub dollar_count: usize,
    pub repeat_pair_count: usize,
    pub https_prefix: bool,
}

impl LexicalFeatures {
    /// Scan the URL once and collect every character-level count.
    pub fn measure(url: &str) -> Self {
        let mut m = Self {
            https_prefix: url.starts_with("https"),
            ..Self::default()
        };

        let mut prev: Option<char> = None;
        for c in url.chars() {
            m.url_len += 1;

            if c.is_numeric() {
                m.digit_count += 1;
            }
            if c.is_alphabetic() {
                m.letter_count += 1;
            }
            if c.is_uppercase() {
                m.upper_count += 1;
            }
            if c.is_lowercase() {
                m.lower_count += 1;
            }

            match c {
                '.' => m.dot_count += 1,
                '-' => m.hyphen_count += 1,
                '@' => m.at_count += 1,
                '_' => m.underscore_count += 1,
                '#' => m.hash_count += 1,
                '=' => m.equals_count += 1,
                '?' => m.question_count += 1,
                '&' => m.ampersand_count += 1,
                '%' => m.percent_count += 1,
                '$' => m.dollar_count += 1,
                _ => {}
            }

            if prev == Some(c) {
                m.repeat_pair_count += 1;
            }
            prev = Some(c);
        }

        m
    }

    /// Total occurrences of `? = & % $ #`
    pub fn special_char_count(&self) -> usize {
        self.question_count
            + self.equals_count
            + self.ampersand_count
            + self.percent_count
            + self.dollar_count
            + self.hash_count
    }

    /// digits / letters, defined as 0 when there are no letters
    pub fn digit_letter_ratio(&self) -> f32 {
        if self.letter_count > 0 {
            self.digit_count as f32 / self.letter_count as f32
        } else {
            0.0
        }
    }
}

impl FeatureExtractor for LexicalFeatures {
    fn extract(&self, vector: &mut FeatureVector) {
        vector.values[0] = self.url_len as f32;                    // url_len
        vector.values[1] = self.dot_count as f32;                  // dot_count
        vector.values[2] = self.hyphen_count as f32;               // hyphen_count
        vector.values[3] = self.digit_count as f32;                // digit_count
        vector.values[4] = (self.at_count > 0) as u8 as f32;       // has_at
        vector.values[5] = self.https_prefix as u8 as f32;         // https_scheme
        vector.values[13] = self.special_char_count() as f32;      // special_char_count
        vector.values[14] = self.digit_letter_ratio();             // digit_letter_ratio
        vector.values[17] = self.at_count as f32;                  // at_count
        vector.values[20] = self.underscore_count as f32;          // underscore_count
        vector.values[22] = self.hash_count as f32;                // fragment_count
        vector.values[23] = self.equals_count as f32;              // equals_count
        vector.values[24] = self.question_count as f32;            // question_count
        vector.values[25] = self.ampersand_count as f32;           // ampersand_count
        vector.values[26] = self.percent_count as f32;             // percent_count
        vector.values[27] = self.dollar_count as f32;              // dollar_count
        vector.values[28] = self.upper_count as f32;               // upper_count
        vector.values[29] = self.lower_count as f32;               // lower_count
        vector.values[36] = self.repeat_pair_count as f32;         // repeat_char_count
        vector.values[38] = (self.percent_count > 0) as u8 as f32; // has_encoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_counts() {
        let m = LexicalFeatures::measure("https://ex-ample.com/a_b?x=1&y=2%20#f");
        assert_eq!(m.dot_count, 1);
        assert_eq!(m.hyphen_count, 1);
        assert_eq!(m.underscore_count, 1);
        assert_eq!(m.question_count, 1);
        assert_eq!(m.equals_count, 2);
        assert_eq!(m.ampersand_count, 1);
        assert_eq!(m.percent_count, 1);
        assert_eq!(m.hash_count, 1);
        assert!(m.https_prefix);
    }

    #[test]
    fn test_digit_letter_ratio_zero_letters() {
        let m = LexicalFeatures::measure("1234://999");
        assert_eq!(m.letter_count, 0);
        assert_eq!(m.digit_letter_ratio(), 0.0);
    }

    #[test]
    fn test_digit_letter_ratio() {
        let m = LexicalFeatures::measure("ab12");
        assert_eq!(m.digit_letter_ratio(), 1.0);
    }

    #[test]
    fn test_repeat_pairs() {
        let m = LexicalFeatures::measure("aabbcc");
        assert_eq!(m.repeat_pair_count, 3);

        let m = LexicalFeatures::measure("aaa");
        assert_eq!(m.repeat_pair_count, 2);

        let m = LexicalFeatures::measure("abc");
        assert_eq!(m.repeat_pair_count, 0);
    }

    #[test]
    fn test_unicode_counts() {
        let m = LexicalFeatures::measure("héllo");
        assert_eq!(m.url_len, 5);
        assert_eq!(m.letter_count, 5);
        assert_eq!(m.lower_count, 5);
    }

    #[test]
    fn test_empty() {
        let m = LexicalFeatures::measure("");
        assert_eq!(m.url_len, 0);
        assert_eq!(m.digit_letter_ratio(), 0.0);
        assert!(!m.https_prefix);
    }
}
