//! Integration tests for the router, its observers and navigation blockers

use rstest::{fixture, rstest};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use waymark_pages::{
	Callback, HistoryState, LocationSource, MemoryHistory, NavigateAction, NavigationOutcome,
	Router, Subscription,
};
use waymark_urls::{RawRoutes, RouteTree, RouterError};

struct App {
	history: Arc<MemoryHistory>,
	router: Router,
}

#[fixture]
fn app() -> App {
	let routes = RouteTree::define(
		&RawRoutes::new()
			.route("home", "/")
			.route("a", "/a")
			.route("b", "/b")
			.route("old", "/old")
			.route("new", "/new")
			.route("by_section", "/docs/:section/intro")
			.route("by_page", "/docs/guide/:page"),
	)
	.unwrap();
	let history = Arc::new(MemoryHistory::new("/a?x=1").unwrap());
	let router = Router::new(routes, history.clone()).unwrap();
	App { history, router }
}

fn counter() -> (Arc<AtomicUsize>, Arc<Callback>) {
	let count = Arc::new(AtomicUsize::new(0));
	let observed = Arc::clone(&count);
	let callback: Arc<Callback> = Arc::new(move || {
		observed.fetch_add(1, Ordering::SeqCst);
	});
	(count, callback)
}

fn failing_observer() {
	panic!("observer failure");
}

#[rstest]
fn test_query_change_notifies_location_only(app: App) {
	// Arrange
	let (location_changes, on_location) = counter();
	let (route_changes, on_route) = counter();
	let _location = app.router.subscribe_location(on_location);
	let _route = app.router.subscribe_route(on_route);
	let route_before = app.router.current_route().unwrap();

	// Act
	app.router
		.navigate_unchecked("/a?x=2", NavigateAction::Push)
		.unwrap();

	// Assert
	assert_eq!(location_changes.load(Ordering::SeqCst), 1);
	assert_eq!(route_changes.load(Ordering::SeqCst), 0);
	assert_eq!(app.router.location().search(), "?x=2");
	assert!(Arc::ptr_eq(&route_before, &app.router.current_route().unwrap()));
}

#[rstest]
fn test_route_change_notifies_both_once(app: App) {
	// Arrange
	let (location_changes, on_location) = counter();
	let (route_changes, on_route) = counter();
	let _location = app.router.subscribe_location(on_location);
	let _route = app.router.subscribe_route(on_route);

	// Act
	let path = app.router.reverse("b", None, None).unwrap();
	app.router.navigate(&path, NavigateAction::Push).unwrap();

	// Assert
	assert_eq!(location_changes.load(Ordering::SeqCst), 1);
	assert_eq!(route_changes.load(Ordering::SeqCst), 1);
	assert_eq!(app.router.current_route().unwrap().template(), "/b");
}

#[rstest]
fn test_vetoed_back_then_retry(app: App) {
	// Arrange
	app.router.navigate_unchecked("/b", NavigateAction::Push).unwrap();
	let blocker = app.router.add_blocker(Arc::new(|_: bool| true));

	// Act
	let blocked = app.router.back();
	let location_while_blocked = app.router.location().path();
	blocker.unsubscribe();
	let retried = app.router.back();

	// Assert
	assert_eq!(blocked, NavigationOutcome::Blocked);
	assert_eq!(location_while_blocked, "/b");
	assert_eq!(retried, NavigationOutcome::Committed);
	assert_eq!(app.router.location().path(), "/a?x=1");
	assert_eq!(app.router.current_route().unwrap().template(), "/a");
}

#[rstest]
fn test_vetoed_navigate_changes_nothing(app: App) {
	// Arrange
	let (location_changes, on_location) = counter();
	let _location = app.router.subscribe_location(on_location);
	let _blocker = app.router.add_blocker(Arc::new(|_: bool| true));

	// Act
	let outcome = app
		.router
		.navigate_unchecked("/b", NavigateAction::Replace)
		.unwrap();

	// Assert
	assert_eq!(outcome, NavigationOutcome::Blocked);
	assert_eq!(location_changes.load(Ordering::SeqCst), 0);
	assert_eq!(app.history.location().path(), "/a?x=1");
}

#[rstest]
fn test_unload_confirmation_follows_blockers(app: App) {
	// Arrange
	let dirty = Arc::new(AtomicBool::new(true));
	let flag = Arc::clone(&dirty);
	let blocker = app
		.router
		.add_blocker(Arc::new(move |_: bool| flag.load(Ordering::SeqCst)));

	// Act & Assert
	assert!(app.history.request_unload());
	dirty.store(false, Ordering::SeqCst);
	assert!(!app.history.request_unload());
	dirty.store(true, Ordering::SeqCst);
	blocker.unsubscribe();
	assert!(!app.history.request_unload());
}

#[rstest]
fn test_panicking_observer_does_not_stop_others(app: App) {
	// Arrange
	let _failing = app.router.subscribe_route(Arc::new(failing_observer));
	let (route_changes, on_route) = counter();
	let _route = app.router.subscribe_route(on_route);

	// Act
	app.router.navigate_unchecked("/b", NavigateAction::Push).unwrap();

	// Assert
	assert_eq!(route_changes.load(Ordering::SeqCst), 1);
	assert_eq!(app.router.current_route().unwrap().template(), "/b");
}

#[rstest]
fn test_redirect_from_location_observer(app: App) {
	// Arrange
	let router = app.router.clone();
	let _redirect = app.router.subscribe_location(Arc::new(move || {
		if router.location().pathname() == "/old" {
			router
				.navigate_unchecked("/new", NavigateAction::Replace)
				.unwrap();
		}
	}));
	let (route_changes, on_route) = counter();
	let _route = app.router.subscribe_route(on_route);

	// Act
	app.router.navigate_unchecked("/old", NavigateAction::Push).unwrap();

	// Assert
	assert_eq!(app.router.location().pathname(), "/new");
	assert_eq!(app.router.current_route().unwrap().template(), "/new");
	assert_eq!(route_changes.load(Ordering::SeqCst), 1);
	assert_eq!(app.history.len(), 2);
}

#[rstest]
fn test_ambiguous_navigation_is_rejected(app: App) {
	// Arrange
	let (location_changes, on_location) = counter();
	let _location = app.router.subscribe_location(on_location);

	// Act
	let result = app
		.router
		.navigate_unchecked("/docs/guide/intro", NavigateAction::Push);

	// Assert
	match result {
		Err(RouterError::AmbiguityConflict { path, templates }) => {
			assert_eq!(path, "/docs/guide/intro");
			assert_eq!(templates.len(), 2);
		}
		other => panic!("expected an ambiguity conflict, got {other:?}"),
	}
	assert_eq!(location_changes.load(Ordering::SeqCst), 0);
	assert_eq!(app.history.len(), 1);
	assert_eq!(app.router.location().pathname(), "/a");
	assert_eq!(app.router.take_sync_error(), None);
}

#[rstest]
fn test_ambiguity_behind_the_router_is_kept_for_the_caller(app: App) {
	// Arrange
	let (location_changes, on_location) = counter();
	let _location = app.router.subscribe_location(on_location);

	// Act
	app.history
		.push(HistoryState::new("/docs/guide/intro"), "/docs/guide/intro")
		.unwrap();
	let stored = app.router.take_sync_error();
	let direct = app.router.sync();

	// Assert
	assert!(matches!(stored, Some(RouterError::AmbiguityConflict { .. })));
	assert!(matches!(direct, Err(RouterError::AmbiguityConflict { .. })));
	assert_eq!(app.router.take_sync_error(), None);
	assert_eq!(location_changes.load(Ordering::SeqCst), 2);
	assert_eq!(app.router.location().pathname(), "/docs/guide/intro");
	assert_eq!(app.router.current_route().unwrap().template(), "/a");
}

#[rstest]
fn test_changes_made_behind_the_router_are_observed(app: App) {
	app.history
		.push(HistoryState::new("/missing"), "/missing")
		.unwrap();

	assert!(app.router.is_not_found());

	app.history.back();

	assert_eq!(app.router.current_route().unwrap().template(), "/a");
}

#[rstest]
fn test_unsubscribed_observer_stops(app: App) {
	let (route_changes, on_route) = counter();
	let subscription: Subscription = app.router.subscribe_route(on_route);

	app.router.navigate_unchecked("/b", NavigateAction::Push).unwrap();
	subscription.unsubscribe();
	app.router.navigate_unchecked("/a", NavigateAction::Push).unwrap();

	assert_eq!(route_changes.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_router_is_shared_across_threads(app: App) {
	// Arrange
	let router = app.router.clone();

	// Act
	std::thread::spawn(move || {
		router.navigate_unchecked("/b", NavigateAction::Push).unwrap();
	})
	.join()
	.unwrap();

	// Assert
	assert_eq!(app.router.current_route().unwrap().template(), "/b");
}
