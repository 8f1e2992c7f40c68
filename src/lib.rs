//! # Waymark
//!
//! Named route templates, reverse path building and observable navigation
//! state for single-page applications and other hosts that own a session
//! history.
//!
//! ## Feature Flags
//!
//! - `urls` (default) - route templates, path building and matching
//! - `pages` (default) - navigation state machine, history and blockers
//!
//! ## Quick Example
//!
//! ```
//! # #[cfg(feature = "pages")]
//! # {
//! use std::sync::Arc;
//! use waymark::prelude::*;
//!
//! let routes = RouteTree::define(
//! 	&RawRoutes::new()
//! 		.route("home", "/")
//! 		.group("users", RawRoutes::new().route("detail", "/users/:id")),
//! )
//! .unwrap();
//! let router = Router::new(routes, Arc::new(MemoryHistory::new("/").unwrap())).unwrap();
//!
//! let path = router
//! 	.reverse("users:detail", Some(&RouteParams::new().with("id", 1)), None)
//! 	.unwrap();
//! assert_eq!(router.navigate(&path, NavigateAction::Push).unwrap(), NavigationOutcome::Committed);
//! assert_eq!(router.current_route().unwrap().params().get("id"), Some("1"));
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(feature = "urls")]
#[cfg_attr(docsrs, doc(cfg(feature = "urls")))]
pub use waymark_urls as urls;

#[cfg(feature = "pages")]
#[cfg_attr(docsrs, doc(cfg(feature = "pages")))]
pub use waymark_pages as pages;

#[cfg(feature = "urls")]
pub use waymark_urls::{
	CompiledPattern, MatchedRoute, RawRoutes, Resolver, RouteFilter, RouteParams, RoutePath,
	RouteTree, RouterConfig, RouterError, RouterResult, SearchAndHash, resolve,
};

#[cfg(feature = "pages")]
pub use waymark_pages::{
	GuardedHistory, HistoryState, LocationSnapshot, LocationSource, MemoryHistory, NavigateAction,
	NavigationOutcome, Router, Subscription,
};

/// Commonly used types.
pub mod prelude {
	#[cfg(feature = "urls")]
	pub use crate::{
		CompiledPattern, MatchedRoute, RawRoutes, Resolver, RouteFilter, RouteParams, RoutePath,
		RouteTree, RouterConfig, RouterError, RouterResult, SearchAndHash,
	};

	#[cfg(feature = "pages")]
	pub use crate::{
		GuardedHistory, HistoryState, LocationSnapshot, LocationSource, MemoryHistory,
		NavigateAction, NavigationOutcome, Router, Subscription,
	};
}
