//! Navigation blockers.
//!
//! A blocker is a predicate consulted before every navigation. It receives
//! `is_cancelable`: `true` for in-app navigations, which a veto cancels, and
//! `false` when the host is unloading, where a veto can only ask the user to
//! confirm.

use crate::history::{HistoryState, LocationSource, NavigationOutcome, UnloadHandler};
use crate::subscriber::Subscription;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use waymark_urls::RouterResult;

/// Blocker predicate; returns `true` to veto.
pub type Blocker = dyn Fn(bool) -> bool + Send + Sync;

struct BlockerState {
	next_id: u64,
	blockers: Vec<(u64, Arc<Blocker>)>,
	unload: Option<Subscription>,
	attaching: bool,
}

struct CoordinatorInner {
	source: Arc<dyn LocationSource>,
	state: Mutex<BlockerState>,
}

/// Ordered blocker chain for one location source.
///
/// While at least one blocker is registered, an unload handler is attached
/// to the source; it is detached again when the last blocker is removed.
#[derive(Clone)]
pub struct BlockerCoordinator {
	inner: Arc<CoordinatorInner>,
}

impl BlockerCoordinator {
	/// Creates an empty chain for `source`.
	pub fn new(source: Arc<dyn LocationSource>) -> Self {
		Self {
			inner: Arc::new(CoordinatorInner {
				source,
				state: Mutex::new(BlockerState {
					next_id: 0,
					blockers: Vec::new(),
					unload: None,
					attaching: false,
				}),
			}),
		}
	}

	/// Appends `blocker` to the chain.
	///
	/// The source is never called while the chain is locked, so a source may
	/// run unload handlers under its own locks.
	pub fn add_blocker(&self, blocker: Arc<Blocker>) -> Subscription {
		let (id, attach) = {
			let mut state = self.inner.state.lock();
			let id = state.next_id;
			state.next_id += 1;
			state.blockers.push((id, blocker));
			let attach = state.unload.is_none() && !state.attaching;
			if attach {
				state.attaching = true;
			}
			(id, attach)
		};
		tracing::debug!(id, "navigation blocker added");

		if attach {
			self.attach_unload();
		}

		let inner = Arc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = inner.upgrade() {
				Self::remove(&inner, id);
			}
		})
	}

	fn attach_unload(&self) {
		let inner: Weak<CoordinatorInner> = Arc::downgrade(&self.inner);
		let handler: Arc<UnloadHandler> = Arc::new(move || {
			inner
				.upgrade()
				.is_some_and(|inner| Self::run(&inner, false))
		});
		let subscription = self.inner.source.subscribe_unload(handler);

		// The chain may have emptied while the source was being called.
		let stale = {
			let mut state = self.inner.state.lock();
			state.attaching = false;
			if state.blockers.is_empty() {
				Some(subscription)
			} else {
				state.unload = Some(subscription);
				None
			}
		};

		match stale {
			Some(subscription) => subscription.unsubscribe(),
			None => tracing::debug!("unload handler attached"),
		}
	}

	fn remove(inner: &CoordinatorInner, id: u64) {
		let detached = {
			let mut state = inner.state.lock();
			state.blockers.retain(|(existing, _)| *existing != id);
			if state.blockers.is_empty() {
				state.unload.take()
			} else {
				None
			}
		};
		tracing::debug!(id, "navigation blocker removed");

		if let Some(unload) = detached {
			unload.unsubscribe();
			tracing::debug!("unload handler detached");
		}
	}

	/// Runs blockers in registration order, stopping at the first veto.
	///
	/// Returns whether the navigation was vetoed.
	pub fn run_blockers(&self, is_cancelable: bool) -> bool {
		Self::run(&self.inner, is_cancelable)
	}

	fn run(inner: &CoordinatorInner, is_cancelable: bool) -> bool {
		let blockers: Vec<Arc<Blocker>> = inner
			.state
			.lock()
			.blockers
			.iter()
			.map(|(_, blocker)| Arc::clone(blocker))
			.collect();
		blockers.iter().any(|blocker| blocker(is_cancelable))
	}

	/// Number of registered blockers.
	pub fn len(&self) -> usize {
		self.inner.state.lock().blockers.len()
	}

	/// Returns whether no blocker is registered.
	pub fn is_empty(&self) -> bool {
		self.inner.state.lock().blockers.is_empty()
	}

	/// Returns whether the unload handler is currently attached.
	pub fn is_unload_attached(&self) -> bool {
		self.inner.state.lock().unload.is_some()
	}
}

impl fmt::Debug for BlockerCoordinator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BlockerCoordinator")
			.field("blockers", &self.len())
			.field("unload_attached", &self.is_unload_attached())
			.finish()
	}
}

/// Location source wrapper that consults the blocker chain first.
///
/// Every mutating call runs the blockers with `is_cancelable = true`; a veto
/// returns [`NavigationOutcome::Blocked`] without touching the source.
#[derive(Clone)]
pub struct GuardedHistory {
	source: Arc<dyn LocationSource>,
	blockers: BlockerCoordinator,
}

impl GuardedHistory {
	/// Wraps `source` with a fresh blocker chain.
	pub fn new(source: Arc<dyn LocationSource>) -> Self {
		Self {
			blockers: BlockerCoordinator::new(Arc::clone(&source)),
			source,
		}
	}

	/// The wrapped source.
	pub fn source(&self) -> &Arc<dyn LocationSource> {
		&self.source
	}

	/// The blocker chain.
	pub fn blockers(&self) -> &BlockerCoordinator {
		&self.blockers
	}

	fn guard(&self, operation: &str) -> bool {
		let vetoed = self.blockers.run_blockers(true);
		if vetoed {
			tracing::warn!(operation, "navigation blocked");
		}
		vetoed
	}

	/// Pushes `path` unless vetoed.
	pub fn push(&self, state: HistoryState, path: &str) -> RouterResult<NavigationOutcome> {
		if self.guard("push") {
			return Ok(NavigationOutcome::Blocked);
		}
		self.source.push(state, path)?;
		Ok(NavigationOutcome::Committed)
	}

	/// Replaces the current entry with `path` unless vetoed.
	pub fn replace(&self, state: HistoryState, path: &str) -> RouterResult<NavigationOutcome> {
		if self.guard("replace") {
			return Ok(NavigationOutcome::Blocked);
		}
		self.source.replace(state, path)?;
		Ok(NavigationOutcome::Committed)
	}

	/// Moves through the history unless vetoed.
	pub fn go(&self, delta: isize) -> NavigationOutcome {
		if self.guard("go") {
			return NavigationOutcome::Blocked;
		}
		self.source.go(delta);
		NavigationOutcome::Committed
	}

	/// Moves one entry back unless vetoed.
	pub fn back(&self) -> NavigationOutcome {
		if self.guard("back") {
			return NavigationOutcome::Blocked;
		}
		self.source.back();
		NavigationOutcome::Committed
	}

	/// Moves one entry forward unless vetoed.
	pub fn forward(&self) -> NavigationOutcome {
		if self.guard("forward") {
			return NavigationOutcome::Blocked;
		}
		self.source.forward();
		NavigationOutcome::Committed
	}
}

impl fmt::Debug for GuardedHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GuardedHistory")
			.field("blockers", &self.blockers)
			.finish_non_exhaustive()
	}
}
