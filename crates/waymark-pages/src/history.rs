//! Location sources.
//!
//! A [`LocationSource`] owns the current address and the session history.
//! Browsers provide one natively; [`MemoryHistory`] keeps the history in
//! memory for servers, tests and other non-browser hosts.

use crate::location::LocationSnapshot;
use crate::subscriber::{Callback, Registry, SubscriberSet, Subscription};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use waymark_urls::{RouteParams, RouterResult};

/// Unload handler; returns `true` to ask the host for confirmation.
pub type UnloadHandler = dyn Fn() -> bool + Send + Sync;

/// Origin used by [`MemoryHistory::new`].
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// How a navigation records its target in the session history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigateAction {
	/// Adds a new entry after the current one.
	#[default]
	Push,
	/// Overwrites the current entry.
	Replace,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationOutcome {
	/// The location source performed the navigation.
	Committed,
	/// A blocker vetoed it; nothing changed.
	Blocked,
}

impl NavigationOutcome {
	/// Returns whether the navigation was performed.
	pub fn is_committed(self) -> bool {
		matches!(self, Self::Committed)
	}
}

/// State stored with each pushed or replaced history entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
	/// Path that was navigated to.
	pub path: String,
	/// Name path of the matched route, if any.
	pub route_name: Option<String>,
	/// Parameters of the matched route.
	pub params: RouteParams,
}

impl HistoryState {
	/// Creates state for `path` without route information.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Self::default()
		}
	}

	/// Sets the matched route parameters.
	pub fn with_params(mut self, params: RouteParams) -> Self {
		self.params = params;
		self
	}

	/// Sets the matched route name.
	pub fn with_route_name(mut self, name: impl Into<String>) -> Self {
		self.route_name = Some(name.into());
		self
	}
}

/// Source of the current location and of session history.
///
/// Implementations must notify `subscribe` callbacks after every committed
/// change, including `push` and `replace`, and must not hold internal locks
/// while doing so.
///
/// Unload handlers may be run while the implementation holds its own locks.
/// Such a handler must not call back into the source, and callers must not
/// hold a lock that a handler takes while calling `subscribe_unload`.
pub trait LocationSource: Send + Sync {
	/// The current location.
	fn location(&self) -> LocationSnapshot;

	/// Registers a change callback.
	fn subscribe(&self, callback: Arc<Callback>) -> Subscription;

	/// Adds an entry for `path` (resolved against the current location).
	fn push(&self, state: HistoryState, path: &str) -> RouterResult<()>;

	/// Overwrites the current entry with `path`.
	fn replace(&self, state: HistoryState, path: &str) -> RouterResult<()>;

	/// Moves `delta` entries through the history. Out of range is a no-op.
	fn go(&self, delta: isize);

	/// Moves one entry back.
	fn back(&self) {
		self.go(-1);
	}

	/// Moves one entry forward.
	fn forward(&self) {
		self.go(1);
	}

	/// Registers a handler run when the host is about to unload.
	///
	/// The handler returns `true` to ask the host for confirmation.
	fn subscribe_unload(&self, handler: Arc<UnloadHandler>) -> Subscription;
}

#[derive(Debug, Clone)]
struct HistoryEntry {
	location: LocationSnapshot,
	state: Option<HistoryState>,
}

#[derive(Debug)]
struct HistoryStack {
	entries: Vec<HistoryEntry>,
	index: usize,
}

impl HistoryStack {
	fn current(&self) -> &HistoryEntry {
		// `entries` is never empty and `index` always points into it.
		&self.entries[self.index]
	}
}

/// In-memory session history.
///
/// # Example
///
/// ```
/// use waymark_pages::{HistoryState, LocationSource, MemoryHistory};
///
/// let history = MemoryHistory::new("/").unwrap();
/// history.push(HistoryState::new("/about"), "/about").unwrap();
/// assert_eq!(history.location().pathname(), "/about");
///
/// history.back();
/// assert_eq!(history.location().pathname(), "/");
/// ```
#[derive(Debug)]
pub struct MemoryHistory {
	stack: Mutex<HistoryStack>,
	listeners: SubscriberSet,
	unload_handlers: Registry<UnloadHandler>,
}

impl MemoryHistory {
	/// Starts a history at `initial_path` under [`DEFAULT_ORIGIN`].
	pub fn new(initial_path: &str) -> RouterResult<Self> {
		Self::with_origin(DEFAULT_ORIGIN, initial_path)
	}

	/// Starts a history at `initial_path` under `origin`.
	pub fn with_origin(origin: &str, initial_path: &str) -> RouterResult<Self> {
		let location = LocationSnapshot::parse(origin)?.join(initial_path)?;
		Ok(Self {
			stack: Mutex::new(HistoryStack {
				entries: vec![HistoryEntry {
					location,
					state: None,
				}],
				index: 0,
			}),
			listeners: SubscriberSet::new(),
			unload_handlers: Registry::new(),
		})
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.stack.lock().entries.len()
	}

	/// Always `false`; a history has at least its initial entry.
	pub fn is_empty(&self) -> bool {
		self.stack.lock().entries.is_empty()
	}

	/// Position of the current entry.
	pub fn index(&self) -> usize {
		self.stack.lock().index
	}

	/// Number of registered change callbacks.
	pub fn listener_count(&self) -> usize {
		self.listeners.len()
	}

	/// State recorded with the current entry.
	pub fn state(&self) -> Option<HistoryState> {
		self.stack.lock().current().state.clone()
	}

	/// Simulates the host closing or reloading.
	///
	/// Runs every unload handler and returns whether any of them asked for
	/// confirmation.
	pub fn request_unload(&self) -> bool {
		self.unload_handlers.snapshot().iter().any(|handler| handler())
	}

	fn commit(&self, state: HistoryState, path: &str, action: NavigateAction) -> RouterResult<()> {
		{
			let mut stack = self.stack.lock();
			let location = stack.current().location.join(path)?;
			let entry = HistoryEntry {
				location,
				state: Some(state),
			};
			match action {
				NavigateAction::Push => {
					let next = stack.index + 1;
					stack.entries.truncate(next);
					stack.entries.push(entry);
					stack.index = next;
				}
				NavigateAction::Replace => {
					let index = stack.index;
					stack.entries[index] = entry;
				}
			}
		}

		tracing::debug!(path, ?action, "memory history committed");
		self.listeners.notify();
		Ok(())
	}
}

impl LocationSource for MemoryHistory {
	fn location(&self) -> LocationSnapshot {
		self.stack.lock().current().location.clone()
	}

	fn subscribe(&self, callback: Arc<Callback>) -> Subscription {
		self.listeners.subscribe(callback)
	}

	fn push(&self, state: HistoryState, path: &str) -> RouterResult<()> {
		self.commit(state, path, NavigateAction::Push)
	}

	fn replace(&self, state: HistoryState, path: &str) -> RouterResult<()> {
		self.commit(state, path, NavigateAction::Replace)
	}

	fn go(&self, delta: isize) {
		if delta == 0 {
			return;
		}

		let moved = {
			let mut stack = self.stack.lock();
			match stack.index.checked_add_signed(delta) {
				Some(target) if target < stack.entries.len() => {
					stack.index = target;
					true
				}
				_ => false,
			}
		};

		if moved {
			tracing::debug!(delta, "memory history traversed");
			self.listeners.notify();
		}
	}

	fn subscribe_unload(&self, handler: Arc<UnloadHandler>) -> Subscription {
		self.unload_handlers.subscribe(handler)
	}
}
