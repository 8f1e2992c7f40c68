//! Reverse path building.
//!
//! Turns a [`CompiledPattern`] plus concrete parameter values back into a
//! path, optionally followed by a query string and a fragment.

use crate::error::{RouterError, RouterResult};
use crate::params::RouteParams;
use crate::pattern::{CompiledPattern, SEPARATOR, Segment};
use crate::query::{self, FRAGMENT_SENTINEL, QUERY_SENTINEL};
use std::fmt;

/// A path produced by the path builder.
///
/// Only the builder creates values of this type, so code that accepts a
/// `RoutePath` only ever receives paths derived from a registered template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct RoutePath(String);

impl RoutePath {
	/// Returns the path as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Consumes the path, returning the inner string.
	pub fn into_string(self) -> String {
		self.0
	}
}

impl AsRef<str> for RoutePath {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for RoutePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl PartialEq<&str> for RoutePath {
	fn eq(&self, other: &&str) -> bool {
		self.0 == *other
	}
}

/// Query part of a built path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Search {
	/// Pre-formed query, with or without its leading `?`.
	Raw(String),
	/// Ordered key/value pairs, form-urlencoded on build.
	Pairs(Vec<(String, String)>),
}

impl From<&str> for Search {
	fn from(raw: &str) -> Self {
		Self::Raw(raw.to_string())
	}
}

impl From<String> for Search {
	fn from(raw: String) -> Self {
		Self::Raw(raw)
	}
}

impl<K, V> From<Vec<(K, V)>> for Search
where
	K: Into<String>,
	V: ToString,
{
	fn from(pairs: Vec<(K, V)>) -> Self {
		Self::Pairs(
			pairs
				.into_iter()
				.map(|(k, v)| (k.into(), v.to_string()))
				.collect(),
		)
	}
}

impl<K, V, const N: usize> From<[(K, V); N]> for Search
where
	K: Into<String>,
	V: ToString,
{
	fn from(pairs: [(K, V); N]) -> Self {
		Self::from(Vec::from(pairs))
	}
}

/// Optional query and fragment appended after the pathname.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchAndHash {
	/// Query string or pairs.
	pub search: Option<Search>,
	/// Fragment, with or without its leading `#`.
	pub hash: Option<String>,
}

impl SearchAndHash {
	/// Creates an empty value.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the query.
	pub fn with_search(mut self, search: impl Into<Search>) -> Self {
		self.search = Some(search.into());
		self
	}

	/// Sets the fragment.
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = Some(hash.into());
		self
	}

	fn append_to(&self, path: &mut String) -> RouterResult<()> {
		match &self.search {
			Some(Search::Raw(raw)) => {
				if let Some(search) = query::normalize_search(raw) {
					path.push_str(&search);
				}
			}
			Some(Search::Pairs(pairs)) if !pairs.is_empty() => {
				path.push(QUERY_SENTINEL);
				path.push_str(&query::serialize_pairs(pairs)?);
			}
			_ => {}
		}

		if let Some(hash) = self.hash.as_deref().and_then(query::normalize_hash) {
			path.push_str(&hash);
		}

		Ok(())
	}
}

impl CompiledPattern {
	/// Builds a concrete path from this template.
	///
	/// `params` is required when the template declares parameters. Every
	/// declared name must be supplied and no other name may be.
	///
	/// # Errors
	///
	/// - [`RouterError::MissingRouteParams`] listing every absent declared name
	/// - [`RouterError::UnknownRouteParam`] listing every undeclared name
	/// - [`RouterError::InvalidRouteParam`] for a value that is empty, is a
	///   dot segment (`.`, `..` or a percent-encoded form) or contains `/`,
	///   `?` or `#`
	/// - [`RouterError::InvalidQuery`] if the query pairs cannot be encoded
	///
	/// # Example
	///
	/// ```
	/// use waymark_urls::{CompiledPattern, RouteParams, SearchAndHash};
	///
	/// let pattern = CompiledPattern::compile("/users/:id").unwrap();
	/// let params = RouteParams::new().with("id", 42);
	/// let extras = SearchAndHash::new().with_search([("tab", "posts")]).with_hash("top");
	///
	/// let path = pattern.build(Some(&params), Some(&extras)).unwrap();
	/// assert_eq!(path.as_str(), "/users/42?tab=posts#top");
	/// ```
	pub fn build(
		&self,
		params: Option<&RouteParams>,
		extras: Option<&SearchAndHash>,
	) -> RouterResult<RoutePath> {
		let empty = RouteParams::new();
		let params = match params {
			Some(params) => params,
			None if !self.has_params() => &empty,
			None => {
				return Err(RouterError::MissingRouteParams {
					template: self.template().to_string(),
					missing: self.param_names().to_vec(),
				});
			}
		};

		let missing: Vec<String> = self
			.param_names()
			.iter()
			.filter(|name| !params.contains(name))
			.cloned()
			.collect();
		if !missing.is_empty() {
			return Err(RouterError::MissingRouteParams {
				template: self.template().to_string(),
				missing,
			});
		}

		let unknown: Vec<String> = params
			.names()
			.filter(|name| !self.param_names().iter().any(|declared| declared.as_str() == *name))
			.map(str::to_string)
			.collect();
		if !unknown.is_empty() {
			return Err(RouterError::UnknownRouteParam {
				template: self.template().to_string(),
				unknown,
			});
		}

		let mut path = String::new();
		for segment in self.segments() {
			path.push(SEPARATOR);
			match segment {
				Segment::Literal(text) => path.push_str(text),
				Segment::Dynamic(name) => {
					// Presence was checked above.
					let value = params.get(name).unwrap_or_default();
					if !is_substitutable(value) {
						return Err(RouterError::InvalidRouteParam {
							template: self.template().to_string(),
							name: name.clone(),
							value: value.to_string(),
						});
					}
					path.push_str(value);
				}
			}
		}
		if path.is_empty() || self.has_trailing_slash() {
			path.push(SEPARATOR);
		}

		if let Some(extras) = extras {
			extras.append_to(&mut path)?;
		}

		tracing::trace!(template = self.template(), path = %path, "built route path");
		Ok(RoutePath(path))
	}

	/// Starts a fluent path builder for this template.
	pub fn path(&self) -> PathBuilder<'_> {
		PathBuilder {
			pattern: self,
			params: RouteParams::new(),
			extras: SearchAndHash::new(),
		}
	}
}

/// A value can fill a dynamic segment only if it matches back as one segment.
fn is_substitutable(value: &str) -> bool {
	!value.is_empty()
		&& !is_dot_segment(value)
		&& !value.contains(SEPARATOR)
		&& !value.contains(QUERY_SENTINEL)
		&& !value.contains(FRAGMENT_SENTINEL)
}

/// URL resolution collapses these, so they never reach the matcher.
fn is_dot_segment(value: &str) -> bool {
	matches!(
		value.to_ascii_lowercase().as_str(),
		"." | "%2e" | ".." | ".%2e" | "%2e." | "%2e%2e"
	)
}

/// Fluent builder returned by [`CompiledPattern::path`].
///
/// ```
/// use waymark_urls::CompiledPattern;
///
/// let pattern = CompiledPattern::compile("/search").unwrap();
/// let path = pattern.path().search([("q", "a b")]).build().unwrap();
/// assert_eq!(path.as_str(), "/search?q=a+b");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct PathBuilder<'a> {
	pattern: &'a CompiledPattern,
	params: RouteParams,
	extras: SearchAndHash,
}

impl PathBuilder<'_> {
	/// Supplies a parameter value.
	pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.params.insert(name, value);
		self
	}

	/// Supplies several parameter values.
	pub fn params(mut self, params: &RouteParams) -> Self {
		for (name, value) in params.iter() {
			self.params.insert(name, value);
		}
		self
	}

	/// Sets the query.
	pub fn search(mut self, search: impl Into<Search>) -> Self {
		self.extras.search = Some(search.into());
		self
	}

	/// Sets the fragment.
	pub fn hash(mut self, hash: impl Into<String>) -> Self {
		self.extras.hash = Some(hash.into());
		self
	}

	/// Builds the path. See [`CompiledPattern::build`] for the error cases.
	pub fn build(self) -> RouterResult<RoutePath> {
		let params = (!self.params.is_empty()).then_some(&self.params);
		self.pattern.build(params, Some(&self.extras))
	}
}
