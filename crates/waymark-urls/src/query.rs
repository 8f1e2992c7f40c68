//! Query string and fragment helpers.

use crate::error::{RouterError, RouterResult};

/// Leading character of a query string.
pub const QUERY_SENTINEL: char = '?';

/// Leading character of a fragment.
pub const FRAGMENT_SENTINEL: char = '#';

/// Normalizes a raw query string to exactly one leading `?`.
///
/// Returns `None` when nothing but sentinels is left.
///
/// ```
/// use waymark_urls::query::normalize_search;
///
/// assert_eq!(normalize_search("a=1").as_deref(), Some("?a=1"));
/// assert_eq!(normalize_search("??a=1").as_deref(), Some("?a=1"));
/// assert_eq!(normalize_search("?"), None);
/// ```
pub fn normalize_search(raw: &str) -> Option<String> {
	normalize(raw, QUERY_SENTINEL)
}

/// Normalizes a fragment to exactly one leading `#`.
pub fn normalize_hash(raw: &str) -> Option<String> {
	normalize(raw, FRAGMENT_SENTINEL)
}

fn normalize(raw: &str, sentinel: char) -> Option<String> {
	let body = raw.trim_start_matches(sentinel);
	if body.is_empty() {
		None
	} else {
		Some(format!("{}{}", sentinel, body))
	}
}

/// Serializes ordered pairs as `application/x-www-form-urlencoded`.
///
/// Pairs keep their order; spaces become `+`.
///
/// ```
/// use waymark_urls::query::serialize_pairs;
///
/// let query = serialize_pairs(&[("q".to_string(), "a b".to_string())]).unwrap();
/// assert_eq!(query, "q=a+b");
/// ```
pub fn serialize_pairs(pairs: &[(String, String)]) -> RouterResult<String> {
	serde_urlencoded::to_string(pairs).map_err(|e| RouterError::InvalidQuery(e.to_string()))
}

/// Parses a query string into ordered pairs.
///
/// A leading `?` is tolerated; an empty query yields no pairs.
pub fn parse_search(search: &str) -> RouterResult<Vec<(String, String)>> {
	let body = search.strip_prefix(QUERY_SENTINEL).unwrap_or(search);
	serde_urlencoded::from_str(body).map_err(|e| RouterError::InvalidQuery(e.to_string()))
}
