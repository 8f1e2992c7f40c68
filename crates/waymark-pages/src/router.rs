//! Navigation state.
//!
//! [`Router`] keeps the current location and the route it resolves to in
//! sync with a [`LocationSource`], and notifies two independent observer
//! sets:
//!
//! - location observers run on every change of the address
//! - route observers run only when the resolved route actually changes
//!   (another template, or other values for its parameters)
//!
//! Navigation goes through a [`GuardedHistory`], so registered blockers can
//! veto it.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use waymark_pages::{MemoryHistory, NavigateAction, Router};
//! use waymark_urls::{RawRoutes, RouteParams, RouteTree};
//!
//! let routes = RouteTree::define(
//! 	&RawRoutes::new()
//! 		.route("home", "/")
//! 		.route("user", "/users/:id"),
//! )
//! .unwrap();
//! let router = Router::new(routes, Arc::new(MemoryHistory::new("/").unwrap())).unwrap();
//!
//! let path = router.reverse("user", Some(&RouteParams::new().with("id", 7)), None).unwrap();
//! router.navigate(&path, NavigateAction::Push).unwrap();
//!
//! let current = router.current_route().unwrap();
//! assert_eq!(current.template(), "/users/:id");
//! assert_eq!(current.params().get("id"), Some("7"));
//! ```

use crate::blocker::{Blocker, GuardedHistory};
use crate::history::{HistoryState, LocationSource, NavigateAction, NavigationOutcome};
use crate::location::LocationSnapshot;
use crate::subscriber::{Callback, SubscriberSet, Subscription};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use waymark_urls::{
	MatchedRoute, Resolver, RouteFilter, RouteParams, RoutePath, RouteTree, RouterError,
	RouterResult, SearchAndHash,
};

struct RouterState {
	location: Arc<LocationSnapshot>,
	route: Option<Arc<MatchedRoute>>,
}

struct RouterInner {
	routes: RouteTree,
	resolver: Resolver,
	history: GuardedHistory,
	state: Mutex<RouterState>,
	location_observers: SubscriberSet,
	route_observers: SubscriberSet,
	source_subscription: Mutex<Option<Subscription>>,
	sync_error: Mutex<Option<RouterError>>,
}

impl Drop for RouterInner {
	fn drop(&mut self) {
		if let Some(subscription) = self.source_subscription.get_mut().take() {
			subscription.unsubscribe();
		}
	}
}

/// Shared navigation state for one application.
///
/// Cloning is cheap and every clone observes the same state.
#[derive(Clone)]
pub struct Router {
	inner: Arc<RouterInner>,
}

impl Router {
	/// Creates a router over `routes`, reading the initial location from
	/// `source`.
	///
	/// No observer runs during construction.
	///
	/// # Errors
	///
	/// [`RouterError::AmbiguityConflict`] if the initial location matches
	/// several equally specific routes.
	pub fn new(routes: RouteTree, source: Arc<dyn LocationSource>) -> RouterResult<Self> {
		let resolver = Resolver::from_tree(&routes);
		let location = Arc::new(source.location());
		let route = resolver.resolve(location.pathname())?.map(Arc::new);

		let router = Self {
			inner: Arc::new(RouterInner {
				routes,
				resolver,
				history: GuardedHistory::new(Arc::clone(&source)),
				state: Mutex::new(RouterState { location, route }),
				location_observers: SubscriberSet::new(),
				route_observers: SubscriberSet::new(),
				source_subscription: Mutex::new(None),
				sync_error: Mutex::new(None),
			}),
		};

		let weak: Weak<RouterInner> = Arc::downgrade(&router.inner);
		let subscription = source.subscribe(Arc::new(move || {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			let router = Router { inner };
			if let Err(e) = router.sync() {
				tracing::error!(error = %e, "failed to synchronize router");
				*router.inner.sync_error.lock() = Some(e);
			}
		}));
		*router.inner.source_subscription.lock() = Some(subscription);

		tracing::debug!(
			location = %router.location().href(),
			route = ?router.current_route().map(|r| r.template().to_string()),
			"router initialized"
		);
		Ok(router)
	}

	/// Reconciles the router with the source's current location.
	///
	/// Called automatically on every source change. Location observers always
	/// run; route observers run only if the resolved route changed.
	///
	/// # Errors
	///
	/// [`RouterError::AmbiguityConflict`] if the new location matches several
	/// equally specific routes. The location is updated regardless and the
	/// previous route is kept. When the sync was triggered by the source, the
	/// error is kept for [`take_sync_error`](Self::take_sync_error).
	pub fn sync(&self) -> RouterResult<()> {
		let snapshot = self.inner.history.source().location();
		{
			let mut state = self.inner.state.lock();
			if *state.location != snapshot {
				state.location = Arc::new(snapshot);
			}
		}
		self.inner.location_observers.notify();

		// Observers may have navigated; only the latest location counts.
		let latest = self.location();
		let matched = self
			.inner
			.resolver
			.resolve(latest.pathname())?
			.map(Arc::new);

		let changed = {
			let mut state = self.inner.state.lock();
			if !Arc::ptr_eq(&state.location, &latest) || state.route.as_deref() == matched.as_deref() {
				false
			} else {
				state.route = matched;
				true
			}
		};

		if changed {
			tracing::debug!(
				path = latest.pathname(),
				route = ?self.current_route().map(|r| r.template().to_string()),
				"current route changed"
			);
			self.inner.route_observers.notify();
		}
		Ok(())
	}

	/// Takes the error of the last failed sync triggered by the source.
	///
	/// The error stays stored until it is taken.
	pub fn take_sync_error(&self) -> Option<RouterError> {
		self.inner.sync_error.lock().take()
	}

	/// The current location. The same `Arc` is returned until it changes.
	pub fn location(&self) -> Arc<LocationSnapshot> {
		Arc::clone(&self.inner.state.lock().location)
	}

	/// The current route, `None` when nothing matches.
	pub fn current_route(&self) -> Option<Arc<MatchedRoute>> {
		self.inner.state.lock().route.clone()
	}

	/// Returns whether the current location matches no route.
	pub fn is_not_found(&self) -> bool {
		self.inner.state.lock().route.is_none()
	}

	/// Decoded query pairs of the current location.
	pub fn search_params(&self) -> RouterResult<Vec<(String, String)>> {
		self.location().search_params()
	}

	/// Runs `callback` on every location change.
	pub fn subscribe_location(&self, callback: Arc<Callback>) -> Subscription {
		self.inner.location_observers.subscribe(callback)
	}

	/// Runs `callback` whenever the current route changes.
	pub fn subscribe_route(&self, callback: Arc<Callback>) -> Subscription {
		self.inner.route_observers.subscribe(callback)
	}

	/// The current route, if it is one of the filter's routes.
	///
	/// With `strict`, a current route outside the filter (or no route at all)
	/// is reported as [`RouterError::RouteMismatch`].
	pub fn lookup(
		&self,
		filter: &RouteFilter,
		strict: bool,
	) -> RouterResult<Option<Arc<MatchedRoute>>> {
		let current = self.current_route();
		if let Some(route) = current.as_ref().filter(|route| route.matches(filter)) {
			return Ok(Some(Arc::clone(route)));
		}

		if strict {
			Err(RouterError::RouteMismatch {
				current: current.map(|route| route.template().to_string()),
			})
		} else {
			Ok(None)
		}
	}

	/// Strict lookup: the current route must be one of the filter's routes.
	pub fn route(&self, filter: impl Into<RouteFilter>) -> RouterResult<Arc<MatchedRoute>> {
		self.lookup(&filter.into(), true)?
			.ok_or(RouterError::RouteMismatch { current: None })
	}

	/// Non-strict lookup.
	pub fn try_route(&self, filter: impl Into<RouteFilter>) -> Option<Arc<MatchedRoute>> {
		self.lookup(&filter.into(), false).ok().flatten()
	}

	/// The route definitions.
	pub fn routes(&self) -> &RouteTree {
		&self.inner.routes
	}

	/// Builds a path for the route registered at `name_path`.
	pub fn reverse(
		&self,
		name_path: &str,
		params: Option<&RouteParams>,
		extras: Option<&SearchAndHash>,
	) -> RouterResult<RoutePath> {
		self.inner.routes.reverse(name_path, params, extras)
	}

	/// Navigates to a path produced by the path builder.
	///
	/// # Errors
	///
	/// See [`navigate_unchecked`](Self::navigate_unchecked).
	pub fn navigate(&self, path: &RoutePath, action: NavigateAction) -> RouterResult<NavigationOutcome> {
		self.navigate_unchecked(path.as_str(), action)
	}

	/// Navigates to an arbitrary path.
	///
	/// The path is not checked against the route definitions; an unknown path
	/// simply leaves the router without a current route.
	///
	/// # Errors
	///
	/// - [`RouterError::InvalidLocation`] if `path` cannot be resolved against
	///   the current location
	/// - [`RouterError::AmbiguityConflict`] if the target matches several
	///   equally specific routes; nothing is navigated
	/// - any error of the location source
	pub fn navigate_unchecked(&self, path: &str, action: NavigateAction) -> RouterResult<NavigationOutcome> {
		let state = self.history_state(path)?;
		let outcome = match action {
			NavigateAction::Push => self.inner.history.push(state, path)?,
			NavigateAction::Replace => self.inner.history.replace(state, path)?,
		};
		tracing::debug!(path, ?action, ?outcome, "navigation requested");
		Ok(outcome)
	}

	fn history_state(&self, path: &str) -> RouterResult<HistoryState> {
		let state = HistoryState::new(path);
		let target = self.location().join(path)?;
		let Some(matched) = self.inner.resolver.resolve(target.pathname())? else {
			return Ok(state);
		};

		let state = state.with_params(matched.params().clone());
		Ok(match self.inner.routes.name_of(matched.pattern()) {
			Some(name) => state.with_route_name(name),
			None => state,
		})
	}

	/// Moves `delta` entries through the history.
	pub fn go(&self, delta: isize) -> NavigationOutcome {
		self.inner.history.go(delta)
	}

	/// Moves one entry back.
	pub fn back(&self) -> NavigationOutcome {
		self.inner.history.back()
	}

	/// Moves one entry forward.
	pub fn forward(&self) -> NavigationOutcome {
		self.inner.history.forward()
	}

	/// Registers a navigation blocker.
	pub fn add_blocker(&self, blocker: Arc<Blocker>) -> Subscription {
		self.inner.history.blockers().add_blocker(blocker)
	}

	/// Stops following the location source.
	///
	/// The router keeps its last state; further source changes are ignored.
	pub fn detach(&self) {
		if let Some(subscription) = self.inner.source_subscription.lock().take() {
			subscription.unsubscribe();
		}
	}
}

impl fmt::Debug for Router {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Router")
			.field("location", &state.location.href())
			.field("route", &state.route.as_ref().map(|r| r.template()))
			.finish_non_exhaustive()
	}
}
