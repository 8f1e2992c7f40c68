//! Path resolution.
//!
//! Every registered pattern is tried against the pathname. Among the
//! successful matches the one with the fewest dynamic segments wins, so
//! `/users/new` beats `/users/:id` regardless of registration order. Two
//! different patterns tied at the lowest count are a modeling error and are
//! reported as [`RouterError::AmbiguityConflict`].

use crate::error::{RouterError, RouterResult};
use crate::params::RouteParams;
use crate::pattern::CompiledPattern;
use crate::tree::RouteTree;
use std::sync::Arc;

/// A pattern together with the parameters extracted from a pathname.
#[derive(Debug, Clone)]
pub struct MatchedRoute {
	pattern: Arc<CompiledPattern>,
	params: RouteParams,
}

impl MatchedRoute {
	/// Creates a match from its parts.
	pub fn new(pattern: Arc<CompiledPattern>, params: RouteParams) -> Self {
		Self { pattern, params }
	}

	/// The matched pattern.
	pub fn pattern(&self) -> &Arc<CompiledPattern> {
		&self.pattern
	}

	/// The matched template string.
	pub fn template(&self) -> &str {
		self.pattern.template()
	}

	/// Parameters extracted from the pathname.
	pub fn params(&self) -> &RouteParams {
		&self.params
	}

	/// Returns whether the matched pattern is one of the filter's patterns.
	pub fn matches(&self, filter: &RouteFilter) -> bool {
		filter.contains(&self.pattern)
	}
}

/// Same pattern object and the same value for every declared parameter.
impl PartialEq for MatchedRoute {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.pattern, &other.pattern)
			&& self
				.pattern
				.param_names()
				.iter()
				.all(|name| self.params.get(name) == other.params.get(name))
	}
}

impl Eq for MatchedRoute {}

/// Resolves `path` against `patterns`.
///
/// Returns `Ok(None)` when nothing matches. The result only depends on the
/// set of patterns, never on their order.
///
/// # Errors
///
/// [`RouterError::AmbiguityConflict`] when several distinct patterns share
/// the lowest specificity among the matches.
pub fn resolve(path: &str, patterns: &[Arc<CompiledPattern>]) -> RouterResult<Option<MatchedRoute>> {
	let mut best: Vec<MatchedRoute> = Vec::new();
	let mut best_specificity = usize::MAX;

	for pattern in patterns {
		if best.iter().any(|m| Arc::ptr_eq(&m.pattern, pattern)) {
			continue;
		}
		let Some(params) = pattern.extract(path) else {
			continue;
		};

		let specificity = pattern.specificity();
		if specificity < best_specificity {
			best_specificity = specificity;
			best.clear();
		}
		if specificity == best_specificity {
			best.push(MatchedRoute::new(Arc::clone(pattern), params));
		}
	}

	match best.len() {
		0 => {
			tracing::debug!(path, "no route matched");
			Ok(None)
		}
		1 => {
			let matched = best.pop();
			if let Some(m) = &matched {
				tracing::debug!(path, template = m.template(), "route matched");
			}
			Ok(matched)
		}
		_ => {
			let templates: Vec<String> = best.iter().map(|m| m.template().to_string()).collect();
			tracing::warn!(path, ?templates, "ambiguous route match");
			Err(RouterError::AmbiguityConflict {
				path: path.to_string(),
				templates,
			})
		}
	}
}

/// Owns a flattened pattern list and resolves paths against it.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
	patterns: Vec<Arc<CompiledPattern>>,
}

impl Resolver {
	/// Creates a resolver over `patterns`.
	pub fn new(patterns: Vec<Arc<CompiledPattern>>) -> Self {
		Self { patterns }
	}

	/// Creates a resolver over every leaf of `tree`.
	pub fn from_tree(tree: &RouteTree) -> Self {
		Self::new(tree.flatten())
	}

	/// Resolves `path`, see [`resolve`].
	pub fn resolve(&self, path: &str) -> RouterResult<Option<MatchedRoute>> {
		resolve(path, &self.patterns)
	}

	/// The patterns tried by this resolver.
	pub fn patterns(&self) -> &[Arc<CompiledPattern>] {
		&self.patterns
	}
}

/// Set of patterns a matched route is checked against.
///
/// Built from a single pattern, a list, or a whole group, which contributes
/// every leaf below it.
#[derive(Debug, Clone, Default)]
pub struct RouteFilter {
	patterns: Vec<Arc<CompiledPattern>>,
}

impl RouteFilter {
	/// Returns whether `pattern` is part of this filter, by identity.
	pub fn contains(&self, pattern: &Arc<CompiledPattern>) -> bool {
		self.patterns.iter().any(|p| Arc::ptr_eq(p, pattern))
	}

	/// Number of patterns in the filter.
	pub fn len(&self) -> usize {
		self.patterns.len()
	}

	/// Returns whether the filter accepts nothing.
	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}
}

impl From<&Arc<CompiledPattern>> for RouteFilter {
	fn from(pattern: &Arc<CompiledPattern>) -> Self {
		Self {
			patterns: vec![Arc::clone(pattern)],
		}
	}
}

impl From<Vec<Arc<CompiledPattern>>> for RouteFilter {
	fn from(patterns: Vec<Arc<CompiledPattern>>) -> Self {
		Self { patterns }
	}
}

impl From<&[Arc<CompiledPattern>]> for RouteFilter {
	fn from(patterns: &[Arc<CompiledPattern>]) -> Self {
		Self {
			patterns: patterns.to_vec(),
		}
	}
}

impl From<&RouteTree> for RouteFilter {
	fn from(tree: &RouteTree) -> Self {
		Self {
			patterns: tree.flatten(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tree::RawRoutes;
	use rstest::rstest;

	fn compile(templates: &[&str]) -> Vec<Arc<CompiledPattern>> {
		templates
			.iter()
			.map(|t| Arc::new(CompiledPattern::compile(t).unwrap()))
			.collect()
	}

	#[rstest]
	#[case("/missing")]
	#[case("/about/team")]
	fn test_no_match(#[case] path: &str) {
		assert_eq!(resolve(path, &compile(&["/", "/about"])).unwrap(), None);
	}

	#[rstest]
	fn test_empty_pattern_list() {
		assert_eq!(resolve("/", &[]).unwrap(), None);
	}

	#[rstest]
	fn test_single_match_extracts_params() {
		let patterns = compile(&["/", "/users/:id"]);
		let matched = resolve("/users/42", &patterns).unwrap().unwrap();

		assert!(Arc::ptr_eq(matched.pattern(), &patterns[1]));
		assert_eq!(matched.params().get("id"), Some("42"));
	}

	#[rstest]
	#[case(["/users/:id", "/users/new"])]
	#[case(["/users/new", "/users/:id"])]
	fn test_fewer_dynamic_segments_win(#[case] templates: [&str; 2]) {
		let matched = resolve("/users/new", &compile(&templates)).unwrap().unwrap();
		assert_eq!(matched.template(), "/users/new");
		assert!(matched.params().is_empty());
	}

	#[rstest]
	fn test_tie_is_a_conflict() {
		// Arrange
		let patterns = compile(&["/a/:x", "/:y/b"]);

		// Act
		let err = resolve("/a/b", &patterns).unwrap_err();

		// Assert
		assert_eq!(
			err,
			RouterError::AmbiguityConflict {
				path: "/a/b".to_string(),
				templates: vec!["/a/:x".to_string(), "/:y/b".to_string()],
			}
		);
	}

	#[rstest]
	fn test_tie_above_best_is_ignored() {
		let patterns = compile(&["/a/:x", "/:y/b", "/a/b"]);
		let matched = resolve("/a/b", &patterns).unwrap().unwrap();
		assert_eq!(matched.template(), "/a/b");
	}

	#[rstest]
	fn test_same_pattern_twice_is_not_a_conflict() {
		let pattern = Arc::new(CompiledPattern::compile("/users/:id").unwrap());
		let patterns = vec![Arc::clone(&pattern), Arc::clone(&pattern)];

		let matched = resolve("/users/1", &patterns).unwrap().unwrap();
		assert!(Arc::ptr_eq(matched.pattern(), &pattern));
	}

	#[rstest]
	fn test_matched_route_equality() {
		// Arrange
		let patterns = compile(&["/users/:id", "/users/:id"]);

		// Act
		let a = MatchedRoute::new(Arc::clone(&patterns[0]), RouteParams::from([("id", "1")]));
		let same = MatchedRoute::new(Arc::clone(&patterns[0]), RouteParams::from([("id", "1")]));
		let other_value = MatchedRoute::new(Arc::clone(&patterns[0]), RouteParams::from([("id", "2")]));
		let other_pattern = MatchedRoute::new(Arc::clone(&patterns[1]), RouteParams::from([("id", "1")]));

		// Assert
		assert_eq!(a, same);
		assert_ne!(a, other_value);
		assert_ne!(a, other_pattern);
	}

	#[rstest]
	fn test_route_filter_from_group() {
		// Arrange
		let tree = RouteTree::define(
			&RawRoutes::new().route("home", "/").group(
				"users",
				RawRoutes::new()
					.route("detail", "/users/:id")
					.group("admin", RawRoutes::new().route("edit", "/users/:id/edit")),
			),
		)
		.unwrap();
		let resolver = Resolver::from_tree(&tree);
		let users = RouteFilter::from(tree.group("users").unwrap());

		// Act
		let edit = resolver.resolve("/users/7/edit").unwrap().unwrap();
		let home = resolver.resolve("/").unwrap().unwrap();

		// Assert
		assert_eq!(users.len(), 2);
		assert!(edit.matches(&users));
		assert!(!home.matches(&users));
		assert!(home.matches(&RouteFilter::from(tree.route("home").unwrap())));
	}
}
