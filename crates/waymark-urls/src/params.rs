//! Route parameter mapping.
//!
//! Parameters keep the order in which the template declares them, so
//! positional and named access agree.

use crate::error::{RouterError, RouterResult};
use std::fmt;
use std::str::FromStr;

/// Ordered mapping from parameter name to raw string value.
///
/// # Example
///
/// ```
/// use waymark_urls::RouteParams;
///
/// let params = RouteParams::new().with("user", "ada").with("id", 42);
/// assert_eq!(params.get("id"), Some("42"));
/// assert_eq!(params.get_as::<u32>("id").unwrap(), 42);
/// assert_eq!(params.names().collect::<Vec<_>>(), ["user", "id"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RouteParams {
	entries: Vec<(String, String)>,
}

impl RouteParams {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts or replaces a value, keeping the position of an existing name.
	pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
		let name = name.into();
		let value = value.to_string();
		match self.entries.iter_mut().find(|(k, _)| *k == name) {
			Some(entry) => entry.1 = value,
			None => self.entries.push((name, value)),
		}
	}

	/// Returns the raw value for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.entries
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	/// Parses the value for `name` into `T`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::MissingRouteParams`] when the name is absent and
	/// [`RouterError::ParamParse`] when parsing fails.
	pub fn get_as<T>(&self, name: &str) -> RouterResult<T>
	where
		T: FromStr,
		T::Err: fmt::Display,
	{
		let value = self
			.get(name)
			.ok_or_else(|| RouterError::MissingRouteParams {
				template: String::new(),
				missing: vec![name.to_string()],
			})?;
		value.parse::<T>().map_err(|e| RouterError::ParamParse {
			name: name.to_string(),
			value: value.to_string(),
			target: std::any::type_name::<T>(),
			source_message: e.to_string(),
		})
	}

	/// Returns whether `name` is present.
	pub fn contains(&self, name: &str) -> bool {
		self.get(name).is_some()
	}

	/// Iterates `(name, value)` pairs in order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Iterates names in order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(k, _)| k.as_str())
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the mapping is empty.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
	K: Into<String>,
	V: ToString,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::new();
		for (name, value) in iter {
			params.insert(name, value);
		}
		params
	}
}

impl<K, V, const N: usize> From<[(K, V); N]> for RouteParams
where
	K: Into<String>,
	V: ToString,
{
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}
