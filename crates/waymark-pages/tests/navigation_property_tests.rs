//! Property-based tests for router synchronization
//!
//! Uses proptest to verify that the router always agrees with its location
//! source, whatever sequence of navigations is applied.

use proptest::prelude::*;
use proptest::proptest;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use waymark_pages::{Callback, LocationSource, MemoryHistory, NavigateAction, Router};
use waymark_urls::{RawRoutes, Resolver, RouteTree};

#[derive(Debug, Clone)]
enum Step {
	Navigate(String, NavigateAction),
	Go(isize),
}

fn routes() -> RouteTree {
	RouteTree::define(
		&RawRoutes::new()
			.route("home", "/")
			.route("list", "/users/list")
			.route("detail", "/users/:id")
			.route("posts", "/users/:id/posts"),
	)
	.unwrap()
}

fn step_strategy() -> impl Strategy<Value = Step> {
	let path = prop::sample::select(vec![
		"/", "/users/list", "/users/1", "/users/2", "/users/1/posts", "/missing", "/users/1?x=1",
	])
	.prop_map(str::to_string);
	let action = prop_oneof![Just(NavigateAction::Push), Just(NavigateAction::Replace)];

	prop_oneof![
		(path, action).prop_map(|(path, action)| Step::Navigate(path, action)),
		(-3isize..=3).prop_map(Step::Go),
	]
}

proptest! {
	/// Property: after every step the router mirrors the source
	#[test]
	fn prop_router_tracks_source(steps in prop::collection::vec(step_strategy(), 1..20)) {
		let history = Arc::new(MemoryHistory::new("/").unwrap());
		let router = Router::new(routes(), history.clone()).unwrap();
		let resolver = Resolver::from_tree(router.routes());

		for step in steps {
			match step {
				Step::Navigate(path, action) => {
					router.navigate_unchecked(&path, action).unwrap();
				}
				Step::Go(delta) => {
					router.go(delta);
				}
			}

			let source_location = history.location();
			let expected = resolver.resolve(source_location.pathname()).unwrap();
			let location = router.location();
			let current = router.current_route();
			prop_assert_eq!(location.as_ref(), &source_location);
			prop_assert_eq!(current.as_deref(), expected.as_ref());
		}
	}

	/// Property: route observers fire exactly when the matched route changes
	#[test]
	fn prop_route_observers_fire_on_change_only(steps in prop::collection::vec(step_strategy(), 1..20)) {
		let history = Arc::new(MemoryHistory::new("/").unwrap());
		let router = Router::new(routes(), history.clone()).unwrap();
		let fired = Arc::new(AtomicUsize::new(0));
		let observed = Arc::clone(&fired);
		let on_route: Arc<Callback> = Arc::new(move || {
			observed.fetch_add(1, Ordering::SeqCst);
		});
		let _subscription = router.subscribe_route(on_route);

		for step in steps {
			let before = router.current_route();
			let fired_before = fired.load(Ordering::SeqCst);

			match step {
				Step::Navigate(path, action) => {
					router.navigate_unchecked(&path, action).unwrap();
				}
				Step::Go(delta) => {
					router.go(delta);
				}
			}

			let changed = before.as_deref() != router.current_route().as_deref();
			let fired_now = fired.load(Ordering::SeqCst) - fired_before;
			prop_assert_eq!(fired_now, usize::from(changed));
		}
	}
}
