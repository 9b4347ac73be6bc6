//! Preference Backend
//!
//! Trait for the low-level key/value service the store sits in front of.
//! A backend owns persistence, locking and change broadcast; the store only
//! adds typing, branch scoping and observer bookkeeping on top.
//!
//! Keys passed to a backend are always fully qualified. Each backend
//! implementation provides its own constructor handling backend-specific
//! initialization.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::prelude::*;

/// Callback a backend invokes with the full key of a changed pref
pub type ChangeSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Opaque cancellation token for a backend subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionToken(pub u64);

impl fmt::Display for SubscriptionToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sub-{}", self.0)
	}
}

/// A preference backend.
///
/// Implementations must invoke subscription sinks synchronously, inside the
/// call that changed the value, and without holding any internal lock, so a
/// sink may call back into the backend.
pub trait PrefBackend: Debug + Send + Sync {
	/// Effective value of a pref (user value, else default), `None` if unset.
	fn get(&self, key: &str) -> PrefResult<Option<PrefValue>>;

	fn set_string(&self, key: &str, value: &str) -> PrefResult<()>;

	fn set_int(&self, key: &str, value: i32) -> PrefResult<()>;

	fn set_bool(&self, key: &str, value: bool) -> PrefResult<()>;

	/// Remove the user value of a pref, reverting it to its default.
	///
	/// Returns whether a user value was removed. Clearing a pref that has no
	/// user value, or does not exist at all, is not an error.
	fn clear(&self, key: &str) -> PrefResult<bool>;

	fn has_user_value(&self, key: &str) -> PrefResult<bool>;

	fn is_locked(&self, key: &str) -> PrefResult<bool>;

	fn lock(&self, key: &str) -> PrefResult<()>;

	fn unlock(&self, key: &str) -> PrefResult<()>;

	/// All known keys (default or user) starting with `prefix`, sorted.
	fn child_keys(&self, prefix: &str) -> PrefResult<Vec<Box<str>>>;

	/// Clear every user value under `prefix` in one call.
	///
	/// Optional: backends without a native implementation keep this default,
	/// and callers fall back to `child_keys` + `clear`.
	fn reset_branch(&self, _prefix: &str) -> PrefResult<()> {
		Err(Error::Unsupported("reset_branch"))
	}

	/// Register a sink for changes to any key starting with `prefix`.
	fn subscribe(&self, prefix: &str, sink: ChangeSink) -> PrefResult<SubscriptionToken>;

	/// Cancel a subscription. Returns `false` if the token was not active.
	fn unsubscribe(&self, token: SubscriptionToken) -> PrefResult<bool>;
}

// vim: ts=4
