//! Named, nested route definitions.
//!
//! Routes are declared as a tree of names whose leaves are templates:
//!
//! ```
//! use waymark_urls::{RawRoutes, RouteTree};
//!
//! let routes = RouteTree::define(
//! 	&RawRoutes::new()
//! 		.route("home", "/")
//! 		.group(
//! 			"users",
//! 			RawRoutes::new()
//! 				.route("list", "/users/list")
//! 				.route("detail", "/users/:id"),
//! 		),
//! )
//! .unwrap();
//!
//! assert_eq!(routes.route("users:detail").unwrap().template(), "/users/:id");
//! assert_eq!(routes.flatten().len(), 3);
//! ```
//!
//! Leaves are addressed by their colon-separated name path. Flattening walks
//! the tree depth-first in definition order; matching never depends on that
//! order (see [`crate::resolver`]).

use crate::builder::{RoutePath, SearchAndHash};
use crate::config::{ConfigError, RouterConfig};
use crate::error::{RouterError, RouterResult};
use crate::params::RouteParams;
use crate::pattern::CompiledPattern;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Separates the components of a name path (`"api:users:detail"`).
pub const NAME_SEPARATOR: char = ':';

/// An uncompiled route definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawNode {
	/// A template leaf.
	Template(String),
	/// A nested group.
	Group(RawRoutes),
}

/// Uncompiled routes, in definition order.
///
/// Built fluently or loaded from TOML, where tables are groups and strings
/// are templates:
///
/// ```
/// use waymark_urls::RawRoutes;
///
/// let raw = RawRoutes::from_toml(r#"
/// home = "/"
///
/// [users]
/// list = "/users/list"
/// detail = "/users/:id"
/// "#).unwrap();
/// assert_eq!(raw.len(), 2);
/// ```
///
/// TOML tables carry no order, so loaded entries are sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, RawNode>")]
pub struct RawRoutes {
	entries: Vec<(String, RawNode)>,
}

impl From<BTreeMap<String, RawNode>> for RawRoutes {
	fn from(map: BTreeMap<String, RawNode>) -> Self {
		Self {
			entries: map.into_iter().collect(),
		}
	}
}

impl RawRoutes {
	/// Creates an empty definition.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a template leaf.
	pub fn route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
		self.entries
			.push((name.into(), RawNode::Template(template.into())));
		self
	}

	/// Adds a nested group.
	pub fn group(mut self, name: impl Into<String>, routes: RawRoutes) -> Self {
		self.entries.push((name.into(), RawNode::Group(routes)));
		self
	}

	/// Number of direct entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether there are no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Parses route definitions from a TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::ParseError {
			message: e.to_string(),
		})
	}

	/// Loads route definitions from a TOML file.
	pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::IoError {
			path: path.as_ref().to_path_buf(),
			message: e.to_string(),
		})?;

		Self::from_toml(&content)
	}
}

/// A compiled route tree node.
#[derive(Debug, Clone)]
pub enum RouteNode {
	/// A compiled template.
	Leaf(Arc<CompiledPattern>),
	/// A nested group of routes.
	Group(RouteTree),
}

/// Compiled routes, preserving the shape and names of their definition.
#[derive(Debug, Clone, Default)]
pub struct RouteTree {
	entries: Vec<(String, RouteNode)>,
}

impl RouteTree {
	/// Compiles every template of `raw` with the default [`RouterConfig`].
	///
	/// # Errors
	///
	/// Fails on the first invalid template, invalid or duplicated name, or
	/// group nested deeper than the configured bound.
	pub fn define(raw: &RawRoutes) -> RouterResult<Self> {
		Self::define_with(raw, &RouterConfig::default())
	}

	/// Compiles every template of `raw` with explicit limits.
	pub fn define_with(raw: &RawRoutes, config: &RouterConfig) -> RouterResult<Self> {
		let tree = Self::define_level(raw, config, "", 1)?;
		tracing::debug!(routes = tree.flatten().len(), "defined route tree");
		Ok(tree)
	}

	fn define_level(
		raw: &RawRoutes,
		config: &RouterConfig,
		prefix: &str,
		depth: usize,
	) -> RouterResult<Self> {
		if depth > config.max_nesting_depth {
			return Err(RouterError::NestingTooDeep {
				name: prefix.to_string(),
				depth,
				max: config.max_nesting_depth,
			});
		}

		let mut entries: Vec<(String, RouteNode)> = Vec::with_capacity(raw.entries.len());
		for (name, node) in &raw.entries {
			let full_name = join_name(prefix, name);
			let invalid = |reason: &str| RouterError::InvalidRouteName {
				name: full_name.clone(),
				reason: reason.to_string(),
			};

			if name.is_empty() {
				return Err(invalid("name is empty"));
			}
			if name.contains(NAME_SEPARATOR) {
				return Err(invalid("name contains ':'"));
			}
			if entries.iter().any(|(existing, _)| existing == name) {
				return Err(invalid("name is defined twice in the same group"));
			}

			let compiled = match node {
				RawNode::Template(template) => {
					RouteNode::Leaf(Arc::new(CompiledPattern::compile_with(template, config)?))
				}
				RawNode::Group(group) => {
					RouteNode::Group(Self::define_level(group, config, &full_name, depth + 1)?)
				}
			};
			entries.push((name.clone(), compiled));
		}

		Ok(Self { entries })
	}

	/// Iterates direct children in definition order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteNode)> {
		self.entries.iter().map(|(name, node)| (name.as_str(), node))
	}

	/// Returns the node at `name_path`.
	pub fn node(&self, name_path: &str) -> Option<&RouteNode> {
		let mut components = name_path.split(NAME_SEPARATOR);
		let first = components.next()?;
		let mut node = self.child(first)?;
		for component in components {
			node = match node {
				RouteNode::Group(group) => group.child(component)?,
				RouteNode::Leaf(_) => return None,
			};
		}
		Some(node)
	}

	fn child(&self, name: &str) -> Option<&RouteNode> {
		self.entries
			.iter()
			.find(|(existing, _)| existing == name)
			.map(|(_, node)| node)
	}

	/// Returns the compiled template at `name_path`, if it is a leaf.
	pub fn get(&self, name_path: &str) -> Option<&Arc<CompiledPattern>> {
		match self.node(name_path)? {
			RouteNode::Leaf(pattern) => Some(pattern),
			RouteNode::Group(_) => None,
		}
	}

	/// Returns the group at `name_path`.
	pub fn group(&self, name_path: &str) -> Option<&RouteTree> {
		match self.node(name_path)? {
			RouteNode::Group(group) => Some(group),
			RouteNode::Leaf(_) => None,
		}
	}

	/// Like [`get`](Self::get), but reports an unknown name as an error.
	pub fn route(&self, name_path: &str) -> RouterResult<&Arc<CompiledPattern>> {
		self.get(name_path)
			.ok_or_else(|| RouterError::UnknownRouteName(name_path.to_string()))
	}

	/// Builds a path for the template registered at `name_path`.
	pub fn reverse(
		&self,
		name_path: &str,
		params: Option<&RouteParams>,
		extras: Option<&SearchAndHash>,
	) -> RouterResult<RoutePath> {
		self.route(name_path)?.build(params, extras)
	}

	/// Every compiled template, depth-first in definition order.
	pub fn flatten(&self) -> Vec<Arc<CompiledPattern>> {
		self.flatten_named()
			.into_iter()
			.map(|(_, pattern)| pattern)
			.collect()
	}

	/// Every compiled template with its name path, depth-first.
	pub fn flatten_named(&self) -> Vec<(String, Arc<CompiledPattern>)> {
		let mut out = Vec::new();
		self.collect_into("", &mut out);
		out
	}

	fn collect_into(&self, prefix: &str, out: &mut Vec<(String, Arc<CompiledPattern>)>) {
		for (name, node) in &self.entries {
			let full_name = join_name(prefix, name);
			match node {
				RouteNode::Leaf(pattern) => out.push((full_name, Arc::clone(pattern))),
				RouteNode::Group(group) => group.collect_into(&full_name, out),
			}
		}
	}

	/// Name paths of every leaf, depth-first.
	pub fn names(&self) -> Vec<String> {
		self.flatten_named().into_iter().map(|(name, _)| name).collect()
	}

	/// Name path of `pattern`, compared by identity.
	pub fn name_of(&self, pattern: &Arc<CompiledPattern>) -> Option<String> {
		self.flatten_named()
			.into_iter()
			.find(|(_, candidate)| Arc::ptr_eq(candidate, pattern))
			.map(|(name, _)| name)
	}

	/// Number of direct children.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the tree has no children.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn join_name(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_string()
	} else {
		format!("{}{}{}", prefix, NAME_SEPARATOR, name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	#[fixture]
	fn app_routes() -> RouteTree {
		RouteTree::define(
			&RawRoutes::new()
				.route("home", "/")
				.route("about", "/about")
				.group(
					"users",
					RawRoutes::new()
						.route("list", "/users/list")
						.route("detail", "/users/:id")
						.group("posts", RawRoutes::new().route("detail", "/users/:id/posts/:post")),
				),
		)
		.unwrap()
	}

	fn nested(depth: usize) -> RawRoutes {
		let mut raw = RawRoutes::new().route("leaf", "/leaf");
		for _ in 1..depth {
			raw = RawRoutes::new().group("g", raw);
		}
		raw
	}

	#[rstest]
	fn test_define_preserves_shape(app_routes: RouteTree) {
		let names: Vec<&str> = app_routes.iter().map(|(name, _)| name).collect();
		assert_eq!(names, ["home", "about", "users"]);
		assert!(app_routes.group("users").is_some());
		assert!(app_routes.group("users:posts").is_some());
		assert!(app_routes.get("users").is_none());
	}

	#[rstest]
	#[case("home", "/")]
	#[case("users:detail", "/users/:id")]
	#[case("users:posts:detail", "/users/:id/posts/:post")]
	fn test_lookup_by_name_path(app_routes: RouteTree, #[case] name: &str, #[case] template: &str) {
		assert_eq!(app_routes.route(name).unwrap().template(), template);
	}

	#[rstest]
	#[case("missing")]
	#[case("users:missing")]
	#[case("home:extra")]
	#[case("")]
	fn test_unknown_name(app_routes: RouteTree, #[case] name: &str) {
		assert_eq!(
			app_routes.route(name).unwrap_err(),
			RouterError::UnknownRouteName(name.to_string())
		);
	}

	#[rstest]
	fn test_flatten_is_depth_first(app_routes: RouteTree) {
		let templates: Vec<String> = app_routes
			.flatten()
			.iter()
			.map(|p| p.template().to_string())
			.collect();
		assert_eq!(
			templates,
			["/", "/about", "/users/list", "/users/:id", "/users/:id/posts/:post"]
		);
	}

	#[rstest]
	fn test_flatten_named(app_routes: RouteTree) {
		let names = app_routes.names();
		assert_eq!(
			names,
			["home", "about", "users:list", "users:detail", "users:posts:detail"]
		);
	}

	#[rstest]
	fn test_name_of_uses_identity(app_routes: RouteTree) {
		let detail = app_routes.route("users:detail").unwrap();
		let lookalike = Arc::new(CompiledPattern::compile("/users/:id").unwrap());

		assert_eq!(app_routes.name_of(detail).as_deref(), Some("users:detail"));
		assert_eq!(app_routes.name_of(&lookalike), None);
	}

	#[rstest]
	fn test_reverse(app_routes: RouteTree) {
		let params = RouteParams::new().with("id", 42).with("post", 7);
		let path = app_routes
			.reverse("users:posts:detail", Some(&params), None)
			.unwrap();
		assert_eq!(path, "/users/42/posts/7");
	}

	#[rstest]
	fn test_invalid_template_is_fatal() {
		let result = RouteTree::define(&RawRoutes::new().route("bad", "bad"));
		assert!(matches!(result, Err(RouterError::InvalidTemplate { .. })));
	}

	#[rstest]
	#[case(RawRoutes::new().route("", "/"))]
	#[case(RawRoutes::new().route("a:b", "/"))]
	#[case(RawRoutes::new().route("a", "/a").route("a", "/b"))]
	fn test_invalid_names(#[case] raw: RawRoutes) {
		assert!(matches!(
			RouteTree::define(&raw),
			Err(RouterError::InvalidRouteName { .. })
		));
	}

	#[rstest]
	fn test_nesting_at_bound_is_accepted() {
		let tree = RouteTree::define(&nested(10)).unwrap();
		assert_eq!(tree.flatten().len(), 1);
	}

	#[rstest]
	fn test_nesting_beyond_bound_is_rejected() {
		let err = RouteTree::define(&nested(11)).unwrap_err();
		assert!(matches!(err, RouterError::NestingTooDeep { depth: 11, max: 10, .. }));
	}

	#[rstest]
	fn test_nesting_bound_is_configurable() {
		let config = RouterConfig::default().with_max_nesting_depth(2);
		assert!(RouteTree::define_with(&nested(2), &config).is_ok());
		assert!(RouteTree::define_with(&nested(3), &config).is_err());
	}

	#[rstest]
	fn test_raw_routes_from_toml() {
		// Arrange
		let content = r#"
home = "/"

[users]
detail = "/users/:id"

[users.posts]
detail = "/users/:id/posts/:post"
"#;

		// Act
		let raw = RawRoutes::from_toml(content).unwrap();
		let tree = RouteTree::define(&raw).unwrap();

		// Assert
		assert_eq!(tree.route("home").unwrap().template(), "/");
		assert_eq!(
			tree.route("users:posts:detail").unwrap().template(),
			"/users/:id/posts/:post"
		);
	}

	#[rstest]
	fn test_raw_routes_from_toml_rejects_non_string_leaf() {
		let result = RawRoutes::from_toml("home = 1");
		assert!(matches!(result, Err(ConfigError::ParseError { .. })));
	}
}
