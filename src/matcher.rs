//! String matcher for targeting-rule operators.
//!
//! Evaluates one `(haystack, operator, needle)` triple. Absent values are
//! passed in as empty strings by the callers; nothing here panics or
//! returns an error. An invalid regex or an unrecognized operator simply
//! never matches.

use std::num::NonZeroUsize;

use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;

use crate::types::MatchOp;

/// Compiled-pattern cache shared by all regex/wildcard conditions.
///
/// Rule sets are re-evaluated on every page view, so the same handful of
/// patterns comes back over and over. Failed compilations are cached too,
/// as `None`.
static PATTERN_CACHE: Lazy<Mutex<LruCache<String, Option<Regex>>>> = Lazy::new(|| {
    Mutex::new(LruCache::new(
        NonZeroUsize::new(PATTERN_CACHE_SIZE).expect("PATTERN_CACHE_SIZE is non-zero"),
    ))
});

const PATTERN_CACHE_SIZE: usize = 64;

/// Evaluate one match operator.
pub fn matches(haystack: &str, op: MatchOp, needle: &str) -> bool {
    match op {
        MatchOp::Equals => haystack == needle,
        MatchOp::IsNotEqualTo => haystack != needle,
        MatchOp::Contains => haystack.contains(needle),
        MatchOp::DoesNotContain => !haystack.contains(needle),
        MatchOp::StartsWith => haystack.starts_with(needle),
        MatchOp::MatchesRegex => regex_match(haystack, needle),
        MatchOp::MatchesWildcard => regex_match(haystack, &wildcard_to_regex(needle)),
        MatchOp::Unknown => false,
    }
}

/// Translate a `*` glob into an anchored regex, escaping everything else.
fn wildcard_to_regex(pattern: &str) -> String {
    let escaped = regex::escape(pattern).replace(r"\*", ".*");
    format!("^{}$", escaped)
}

fn regex_match(haystack: &str, pattern: &str) -> bool {
    let mut cache = PATTERN_CACHE.lock();
    if let Some(entry) = cache.get(pattern) {
        return entry.as_ref().is_some_and(|re| re.is_match(haystack));
    }

    let compiled = Regex::new(pattern).ok();
    let matched = compiled.as_ref().is_some_and(|re| re.is_match(haystack));
    cache.put(pattern.to_string(), compiled);
    matched
}
