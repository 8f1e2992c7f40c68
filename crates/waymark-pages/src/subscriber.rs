//! Observer registration.
//!
//! A [`Registry`] holds callbacks behind a `parking_lot::RwLock`. Callers
//! always take a snapshot and run callbacks with the lock released, so a
//! callback may subscribe, unsubscribe or navigate without deadlocking.

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Zero-argument observer.
pub type Callback = dyn Fn() + Send + Sync;

/// Callback list keyed by registration id.
pub struct Registry<F: ?Sized> {
	entries: Arc<RwLock<Entries<F>>>,
}

struct Entries<F: ?Sized> {
	next_id: u64,
	callbacks: Vec<(u64, Arc<F>)>,
}

/// Set of zero-argument observers.
pub type SubscriberSet = Registry<Callback>;

impl<F: ?Sized> Registry<F> {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			entries: Arc::new(RwLock::new(Entries {
				next_id: 0,
				callbacks: Vec::new(),
			})),
		}
	}

	/// Number of registered callbacks.
	pub fn len(&self) -> usize {
		self.entries.read().callbacks.len()
	}

	/// Returns whether nothing is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.read().callbacks.is_empty()
	}

	/// Callbacks registered right now, in registration order.
	pub fn snapshot(&self) -> Vec<Arc<F>> {
		self.entries
			.read()
			.callbacks
			.iter()
			.map(|(_, callback)| Arc::clone(callback))
			.collect()
	}
}

impl<F: ?Sized + Send + Sync + 'static> Registry<F> {
	/// Registers `callback`; the returned handle removes it again.
	pub fn subscribe(&self, callback: Arc<F>) -> Subscription {
		let id = {
			let mut entries = self.entries.write();
			let id = entries.next_id;
			entries.next_id += 1;
			entries.callbacks.push((id, callback));
			id
		};

		let entries = Arc::downgrade(&self.entries);
		Subscription::new(move || {
			if let Some(entries) = entries.upgrade() {
				entries.write().callbacks.retain(|(existing, _)| *existing != id);
			}
		})
	}
}

impl Registry<Callback> {
	/// Runs every observer registered at call time.
	///
	/// A panicking observer is logged and skipped; the rest still run.
	pub fn notify(&self) {
		for callback in self.snapshot() {
			if let Err(payload) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| callback())) {
				tracing::error!(panic = %panic_message(payload.as_ref()), "observer panicked");
			}
		}
	}
}

impl<F: ?Sized> Default for Registry<F> {
	fn default() -> Self {
		Self::new()
	}
}

impl<F: ?Sized> Clone for Registry<F> {
	fn clone(&self) -> Self {
		Self {
			entries: Arc::clone(&self.entries),
		}
	}
}

impl<F: ?Sized> fmt::Debug for Registry<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Registry").field("len", &self.len()).finish()
	}
}

/// Handle to a registration.
///
/// Call [`unsubscribe`](Self::unsubscribe) to remove the registration.
/// Dropping the handle leaves the registration in place.
#[must_use = "dropping a Subscription keeps the callback registered; call unsubscribe() to remove it"]
pub struct Subscription {
	cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
	/// Wraps the removal action of a registration.
	pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
		Self {
			cancel: Some(Box::new(cancel)),
		}
	}

	/// Removes the registration.
	pub fn unsubscribe(mut self) {
		if let Some(cancel) = self.cancel.take() {
			cancel();
		}
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.cancel.is_some())
			.finish()
	}
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		(*message).to_string()
	} else if let Some(message) = payload.downcast_ref::<String>() {
		message.clone()
	} else {
		"non-string panic payload".to_string()
	}
}
