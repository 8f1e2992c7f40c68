//! Location snapshots.

use serde::{Deserialize, Serialize};
use url::Url;
use waymark_urls::query::{self, normalize_hash, normalize_search};
use waymark_urls::{RouterError, RouterResult};

/// Immutable view of the current address.
///
/// Snapshots are replaced wholesale on every change, never mutated, so a
/// snapshot held by an observer keeps describing the address it was read at.
///
/// # Example
///
/// ```
/// use waymark_pages::LocationSnapshot;
///
/// let location = LocationSnapshot::parse("https://app.test/users/1?tab=posts#top").unwrap();
/// assert_eq!(location.origin(), "https://app.test");
/// assert_eq!(location.pathname(), "/users/1");
/// assert_eq!(location.search(), "?tab=posts");
/// assert_eq!(location.hash(), "#top");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationSnapshot {
	origin: String,
	href: String,
	pathname: String,
	search: String,
	hash: String,
}

impl LocationSnapshot {
	/// Parses an absolute URL.
	///
	/// # Errors
	///
	/// Returns [`RouterError::InvalidLocation`] if `href` is not an absolute URL.
	pub fn parse(href: &str) -> RouterResult<Self> {
		Url::parse(href)
			.map(|url| Self::from_url(&url))
			.map_err(|e| RouterError::InvalidLocation {
				href: href.to_string(),
				reason: e.to_string(),
			})
	}

	/// Resolves `target` against this location, the way a link would.
	pub fn join(&self, target: &str) -> RouterResult<Self> {
		Url::parse(&self.href)
			.and_then(|base| base.join(target))
			.map(|url| Self::from_url(&url))
			.map_err(|e| RouterError::InvalidLocation {
				href: target.to_string(),
				reason: e.to_string(),
			})
	}

	pub(crate) fn from_url(url: &Url) -> Self {
		Self {
			origin: url.origin().ascii_serialization(),
			href: url.as_str().to_string(),
			pathname: url.path().to_string(),
			search: url.query().and_then(normalize_search).unwrap_or_default(),
			hash: url.fragment().and_then(normalize_hash).unwrap_or_default(),
		}
	}

	/// Scheme, host and port, e.g. `https://app.test`.
	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// The full address.
	pub fn href(&self) -> &str {
		&self.href
	}

	/// The path, always starting with `/`.
	pub fn pathname(&self) -> &str {
		&self.pathname
	}

	/// The query string including its leading `?`, or empty.
	pub fn search(&self) -> &str {
		&self.search
	}

	/// The fragment including its leading `#`, or empty.
	pub fn hash(&self) -> &str {
		&self.hash
	}

	/// Pathname, query and fragment, without the origin.
	pub fn path(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}

	/// Decoded query pairs, in order.
	pub fn search_params(&self) -> RouterResult<Vec<(String, String)>> {
		query::parse_search(&self.search)
	}
}
