//! Navigation state, session history and navigation blockers.
//!
//! This crate connects the route definitions of `waymark-urls` to a
//! location source:
//!
//! - [`location`]: immutable location snapshots
//! - [`history`]: the [`LocationSource`] boundary and [`MemoryHistory`]
//! - [`blocker`]: blocker chain and the [`GuardedHistory`] wrapper
//! - [`subscriber`]: observer registries and [`Subscription`] handles
//! - [`router`]: the [`Router`] state machine
//!
//! Callbacks are never run while an internal lock is held, so observers and
//! blockers may navigate, subscribe or unsubscribe from inside a callback.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod blocker;
pub mod history;
pub mod location;
pub mod router;
pub mod subscriber;

pub use blocker::{Blocker, BlockerCoordinator, GuardedHistory};
pub use history::{
	DEFAULT_ORIGIN, HistoryState, LocationSource, MemoryHistory, NavigateAction, NavigationOutcome,
	UnloadHandler,
};
pub use location::LocationSnapshot;
pub use router::Router;
pub use subscriber::{Callback, Registry, SubscriberSet, Subscription};
