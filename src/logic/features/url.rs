//! URL Decomposition - best-effort, total syntactic split
//!
//! Splits an arbitrary string into scheme / authority / path / query /
//! fragment. Never fails: components that cannot be isolated come back as
//! empty strings. The split rules deliberately match the parser the
//! deployed classifier was fitted against, so malformed inputs degrade the
//! same way at inference time as they did at training time.

/// Syntactic components of a URL-shaped string.
///
/// All fields are raw substrings of the input. The authority keeps userinfo
/// and port text; feature slots are computed over the raw authority string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UrlParts {
    pub scheme: String,
    pub authority: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

/// Multi-part public suffixes recognized when reducing a host to its
/// registrable domain. Purely lexical; no Public Suffix List fetch.
const MULTI_PART_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "co.jp", "co.nz", "com.au", "com.br",
];

/// Split a string into URL components. Total: any input yields a result.
pub fn parse(url: &str) -> UrlParts {
    // Fragment first, then query, mirroring the training-time parser.
    let (rest, fragment) = match url.split_once('#') {
        Some((r, f)) => (r, f),
        None => (url, ""),
    };
    let (rest, query) = match rest.split_once('?') {
        Some((r, q)) => (r, q),
        None => (rest, ""),
    };

    let (scheme, rest) = split_scheme(rest);

    // An authority is only present when the remainder starts with "//".
    let (authority, path) = match rest.strip_prefix("//") {
        Some(after) => match after.find('/') {
            Some(idx) => (&after[..idx], &after[idx..]),
            None => (after, ""),
        },
        None => ("", rest),
    };

    UrlParts {
        scheme: scheme.to_string(),
        authority: authority.to_string(),
        path: path.to_string(),
        query: query.to_string(),
        fragment: fragment.to_string(),
    }
}

/// Isolate a leading `scheme:` if the candidate is syntactically valid
/// (`[A-Za-z][A-Za-z0-9+.-]*`). Otherwise the whole string is the remainder.
fn split_scheme(s: &str) -> (&str, &str) {
    if let Some(idx) = s.find(':') {
        let candidate = &s[..idx];
        let mut chars = candidate.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
            }
            _ => false,
        };
        if valid {
            return (candidate, &s[idx + 1..]);
        }
    }
    ("", s)
}

impl UrlParts {
    /// Host portion of the authority: userinfo and port stripped.
    pub fn host(&self) -> &str {
        let after_userinfo = match self.authority.rsplit_once('@') {
            Some((_, host_port)) => host_port,
            None => &self.authority,
        };
        match after_userinfo.split_once(':') {
            Some((host, _)) => host,
            None => after_userinfo,
        }
    }

    /// Registrable domain: the host reduced to its last two labels, or three
    /// when the trailing pair is a known multi-part suffix. Single-label and
    /// empty hosts pass through unchanged.
    pub fn registrable_domain(&self) -> String {
        let host = self.host();
        let labels: Vec<&str> = host.split('.').collect();
        if labels.len() < 2 {
            return host.to_string();
        }

        let tail_two = labels[labels.len() - 2..].join(".");
        let keep = if labels.len() >= 3
            && MULTI_PART_SUFFIXES
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&tail_two))
        {
            3
        } else {
            2
        };
        labels[labels.len() - keep..].join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_url() {
        let p = parse("https://user@sub.example.com:8080/a/b?x=1&y=2#frag");
        assert_eq!(p.scheme, "https");
        assert_eq!(p.authority, "user@sub.example.com:8080");
        assert_eq!(p.path, "/a/b");
        assert_eq!(p.query, "x=1&y=2");
        assert_eq!(p.fragment, "frag");
    }

    #[test]
    fn test_no_path_after_authority() {
        let p = parse("https://example.com");
        assert_eq!(p.authority, "example.com");
        assert_eq!(p.path, "");
        assert_eq!(p.query, "");
    }

    #[test]
    fn test_schemeless_is_all_path() {
        let p = parse("example.com/login");
        assert_eq!(p.scheme, "");
        assert_eq!(p.authority, "");
        assert_eq!(p.path, "example.com/login");
    }

    #[test]
    fn test_protocol_relative() {
        let p = parse("//cdn.example.com/lib.js");
        assert_eq!(p.scheme, "");
        assert_eq!(p.authority, "cdn.example.com");
        assert_eq!(p.path, "/lib.js");
    }

    #[test]
    fn test_invalid_scheme_not_split() {
        // A scheme cannot start with a digit.
        let p = parse("1234://999");
        assert_eq!(p.scheme, "");
        assert_eq!(p.authority, "");
        assert_eq!(p.path, "1234://999");
    }

    #[test]
    fn test_empty_string() {
        let p = parse("");
        assert_eq!(p, UrlParts::default());
    }

    #[test]
    fn test_fragment_before_query_char() {
        // '#' cuts first; a '?' inside the fragment is not a query.
        let p = parse("http://a.com/p#frag?notquery");
        assert_eq!(p.path, "/p");
        assert_eq!(p.query, "");
        assert_eq!(p.fragment, "frag?notquery");
    }

    #[test]
    fn test_host_strips_userinfo_and_port() {
        let p = parse("http://user:pw@example.com:8080/x");
        assert_eq!(p.host(), "example.com");
    }

    #[test]
    fn test_registrable_domain() {
        assert_eq!(
            parse("http://a.b.example.com/x").registrable_domain(),
            "example.com"
        );
        assert_eq!(
            parse("http://www.example.co.uk/x").registrable_domain(),
            "example.co.uk"
        );
        assert_eq!(parse("http://localhost/x").registrable_domain(), "localhost");
        assert_eq!(parse("").registrable_domain(), "");
    }

    #[test]
    fn test_registrable_domain_ignores_port() {
        assert_eq!(
            parse("http://sub.example.com:9090/").registrable_domain(),
            "example.com"
        );
    }
}
