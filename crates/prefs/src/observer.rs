//! Observer callbacks
//!
//! A callback is either a function (optionally run as a method of a bound
//! receiver) or an object implementing [`PrefObserver`]. The variant is fixed
//! when the callback is built, never probed at dispatch time.
//!
//! Callbacks are compared by identity: two clones of the same `Callback`
//! are the same callback, two callbacks built from identical closures are not.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::prelude::*;

/// Topic passed to [`PrefObserver::notify`] for value changes
pub const PREF_CHANGED_TOPIC: &str = "pref-changed";

/// Object a function callback is bound to, compared by identity
pub type Receiver = Arc<dyn Any + Send + Sync>;

type FunctionCallback = Arc<dyn Fn(Option<&Receiver>) + Send + Sync>;

/// Change context handed to a [`PrefObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefChange<'a> {
	/// Fully qualified branch the observer watches
	pub subject: &'a str,
	pub topic: &'static str,
	/// Fully qualified key that changed
	pub key: &'a str,
}

/// Generic notification handler
pub trait PrefObserver: Send + Sync {
	fn notify(&self, change: &PrefChange<'_>);
}

#[derive(Clone)]
pub enum Callback {
	Function(FunctionCallback),
	Observer(Arc<dyn PrefObserver>),
}

impl fmt::Debug for Callback {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Callback::Function(cb) => write!(f, "Callback::Function({:p})", Arc::as_ptr(cb)),
			Callback::Observer(obs) => write!(f, "Callback::Observer({:p})", Arc::as_ptr(obs)),
		}
	}
}

impl Callback {
	/// Plain function, called with no arguments
	pub fn function<F>(f: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		Callback::Function(Arc::new(move |_receiver: Option<&Receiver>| f()))
	}

	/// Function run as a method of the receiver bound at registration.
	///
	/// The receiver must be a `T`; otherwise the call is skipped with a warning.
	pub fn method<T, F>(f: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn(&T) + Send + Sync + 'static,
	{
		Callback::Function(Arc::new(move |receiver: Option<&Receiver>| {
			match receiver.and_then(|r| r.downcast_ref::<T>()) {
				Some(this) => f(this),
				None => warn!("Method callback skipped: no receiver of type {}", type_name::<T>()),
			}
		}))
	}

	pub fn observer(observer: Arc<dyn PrefObserver>) -> Self {
		Callback::Observer(observer)
	}

	/// Identity comparison
	pub fn same(&self, other: &Callback) -> bool {
		match (self, other) {
			(Callback::Function(a), Callback::Function(b)) => {
				std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
			}
			(Callback::Observer(a), Callback::Observer(b)) => {
				std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
			}
			_ => false,
		}
	}

	pub(crate) fn invoke(&self, receiver: Option<&Receiver>, change: &PrefChange<'_>) {
		match self {
			Callback::Function(f) => f(receiver),
			Callback::Observer(observer) => observer.notify(change),
		}
	}
}

/// Identity comparison of optional receivers
pub(crate) fn same_receiver(a: Option<&Receiver>, b: Option<&Receiver>) -> bool {
	match (a, b) {
		(None, None) => true,
		(Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
		_ => false,
	}
}


// vim: ts=4
