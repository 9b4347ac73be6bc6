//! Typed, branch-scoped preference store.
//!
//! [`PrefService`] wraps a [`PrefBackend`](prefs_types::backend::PrefBackend)
//! and hands out [`Preferences`] rooted at a key prefix. Values are strings,
//! 32-bit integers or booleans; numbers are coerced on write. Observers watch
//! a branch and are called synchronously for every change below it.

#![forbid(unsafe_code)]

pub mod adapter;
pub mod coerce;
pub mod observer;
pub mod prelude;
pub mod registry;
pub mod service;
pub mod store;

pub use coerce::{Coercion, CoercionKind};
pub use observer::{Callback, PREF_CHANGED_TOPIC, PrefChange, PrefObserver, Receiver};
pub use registry::{ObserverHandle, ObserverRegistry};
pub use service::PrefService;
pub use store::Preferences;

pub use prefs_types::error::{Error, PrefResult};
pub use prefs_types::value::{PrefKind, PrefValue};

// vim: ts=4
