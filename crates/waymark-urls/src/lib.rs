//! Route templates, reverse path building and route matching.
//!
//! This crate is the side-effect free half of Waymark:
//!
//! - [`pattern`]: compiles `/users/:id` style templates
//! - [`tree`]: named, nested route definitions
//! - [`builder`]: turns a template and parameters back into a path
//! - [`resolver`]: picks the most specific template for a pathname
//!
//! ## Quick Start
//!
//! ```
//! use waymark_urls::{RawRoutes, Resolver, RouteParams, RouteTree, SearchAndHash};
//!
//! let routes = RouteTree::define(
//! 	&RawRoutes::new()
//! 		.route("new_user", "/users/new")
//! 		.route("user", "/users/:id"),
//! )
//! .unwrap();
//!
//! let resolver = Resolver::from_tree(&routes);
//! let matched = resolver.resolve("/users/42").unwrap().unwrap();
//! assert_eq!(matched.params().get("id"), Some("42"));
//!
//! let path = routes
//! 	.route("user")
//! 	.unwrap()
//! 	.build(
//! 		Some(&RouteParams::new().with("id", 7)),
//! 		Some(&SearchAndHash::new().with_search([("tab", "posts")])),
//! 	)
//! 	.unwrap();
//! assert_eq!(path, "/users/7?tab=posts");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod builder;
pub mod config;
pub mod error;
pub mod params;
pub mod pattern;
pub mod query;
pub mod resolver;
pub mod tree;

pub use builder::{PathBuilder, RoutePath, Search, SearchAndHash};
pub use config::{ConfigError, RouterConfig};
pub use error::{RouterError, RouterResult};
pub use params::RouteParams;
pub use pattern::{CompiledPattern, Segment};
pub use query::parse_search;
pub use resolver::{MatchedRoute, Resolver, RouteFilter, resolve};
pub use tree::{RawNode, RawRoutes, RouteNode, RouteTree};
