//! Ant-style path pattern compiler: `?`, `*`, `**` against a compiled regex.
//!
//! Mirrors the teacher's `utils::route_matcher` (compile once, match many,
//! sort by specificity), generalized from exact-segment routes to glob
//! patterns.

use regex::Regex;

/// A compiled ant pattern: its source text, the regex it matches with, a
/// specificity score used to break ties between overlapping patterns, and
/// whether it captures a downstream path (patterns ending in `/**`).
#[derive(Debug, Clone)]
pub struct AntPattern {
    pub source: String,
    regex: Regex,
    pub specificity: i64,
    pub captures_downstream: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern {0:?} failed to compile: {1}")]
    RegexCompile(String, regex::Error),
}

impl AntPattern {
    /// Compiles an ant-style glob into a matcher.
    ///
    /// A trailing literal `/**` is special-cased into a capturing group so
    /// the downstream path can be recovered without re-matching: `/**`
    /// alone becomes prefix `""` with the whole path as downstream, and
    /// `/hello/**` matches `/hello` (downstream `""`) and `/hello/world`
    /// (downstream `/world`).
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if !pattern.starts_with('/') {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        }

        let (prefix, captures_downstream) = match pattern.strip_suffix("/**") {
            Some(rest) => (rest, true),
            None if pattern == "/**" => ("", true),
            _ => (pattern, false),
        };

        let mut specificity: i64 = 0;
        let mut body = String::new();

        if captures_downstream {
            body.push_str(&translate_prefix(prefix, &mut specificity));
            body.push_str("(/.*)?");
            // A trailing `/**` is the least specific thing a pattern can
            // end in; weight it accordingly relative to a fully literal
            // pattern of the same prefix length.
            specificity -= 1;
        } else {
            body.push_str(&translate_prefix(prefix, &mut specificity));
        }

        let anchored = format!("^{}$", body);
        let regex = Regex::new(&anchored)
            .map_err(|e| PatternError::RegexCompile(pattern.to_string(), e))?;

        Ok(AntPattern {
            source: pattern.to_string(),
            regex,
            specificity,
            captures_downstream,
        })
    }

    /// Returns the downstream path suffix when this pattern matches `path`.
    ///
    /// For non-capturing patterns this is always `Some("")` on a match.
    /// For `/**`-suffixed patterns it is the portion of `path` past the
    /// literal prefix (e.g. `/world` for `/hello/**` against
    /// `/hello/world`, or `""` against exactly `/hello`).
    pub fn match_downstream<'a>(&self, path: &'a str) -> Option<&'a str> {
        let captures = self.regex.captures(path)?;
        if self.captures_downstream {
            Some(captures.get(1).map(|m| m.as_str()).unwrap_or(""))
        } else {
            Some("")
        }
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Translates the literal (non-`/**`-suffix) part of a pattern into a regex
/// body, segment by segment, and accumulates a specificity score as it goes.
fn translate_prefix(prefix: &str, specificity: &mut i64) -> String {
    if prefix.is_empty() {
        return String::new();
    }

    let segments: Vec<&str> = prefix.split('/').collect();
    let mut out = String::new();

    for segment in segments {
        if segment.is_empty() {
            // The pattern's own leading slash (and any internal `//`)
            // produces an empty split element; every other branch below
            // already emits its own leading slash, so this contributes
            // nothing rather than doubling it.
            continue;
        }
        if segment == "**" {
            out.push_str("(?:/[^/]+)*");
            *specificity -= 10;
            continue;
        }
        out.push('/');
        out.push_str(&translate_segment(segment, specificity));
    }

    out
}

fn translate_segment(segment: &str, specificity: &mut i64) -> String {
    let mut out = String::new();
    for ch in segment.chars() {
        match ch {
            '*' => {
                out.push_str("[^/]*");
                *specificity -= 3;
            }
            '?' => {
                out.push_str("[^/]");
                *specificity -= 1;
            }
            other => {
                out.push_str(&regex::escape(&other.to_string()));
                *specificity += 2;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_double_star_matches_root_and_everything() {
        let p = AntPattern::compile("/**").unwrap();
        assert_eq!(p.match_downstream("/"), Some("/"));
        assert_eq!(p.match_downstream("/anything/at/all"), Some("/anything/at/all"));
    }

    #[test]
    fn trailing_double_star_captures_downstream() {
        let p = AntPattern::compile("/hello/**").unwrap();
        assert_eq!(p.match_downstream("/hello"), Some(""));
        assert_eq!(p.match_downstream("/hello/world"), Some("/world"));
        assert_eq!(p.match_downstream("/helloworld"), None);
    }

    #[test]
    fn embedded_double_star_spans_segments() {
        let p = AntPattern::compile("/a/**/b").unwrap();
        assert!(p.is_match("/a/b"));
        assert!(p.is_match("/a/x/b"));
        assert!(p.is_match("/a/x/y/b"));
        assert!(!p.is_match("/a/b/c"));
    }

    #[test]
    fn double_star_leading_the_pattern_still_matches() {
        let p = AntPattern::compile("/**/health").unwrap();
        assert!(p.is_match("/health"));
        assert!(p.is_match("/a/health"));
        assert!(p.is_match("/a/b/health"));
    }

    #[test]
    fn multi_segment_literal_prefix_matches_without_doubling_the_slash() {
        let p = AntPattern::compile("/api/users").unwrap();
        assert!(p.is_match("/api/users"));
        assert!(!p.is_match("//api/users"));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        let p = AntPattern::compile("/api/*/status").unwrap();
        assert!(p.is_match("/api/v1/status"));
        assert!(!p.is_match("/api/v1/v2/status"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let p = AntPattern::compile("/item-?").unwrap();
        assert!(p.is_match("/item-1"));
        assert!(!p.is_match("/item-12"));
    }

    #[test]
    fn rejects_pattern_without_leading_slash() {
        assert!(matches!(
            AntPattern::compile("hello/**"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
    }

    #[test]
    fn literal_pattern_outranks_wildcard_pattern() {
        let literal = AntPattern::compile("/api/users/**").unwrap();
        let wildcard = AntPattern::compile("/api/**").unwrap();
        assert!(literal.specificity > wildcard.specificity);
    }
}
