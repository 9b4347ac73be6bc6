//! Observer registry
//!
//! Every entry owns exactly one backend subscription. The backend only holds a
//! sink with a weak reference back to the registry, and the sink looks its
//! entry up by handle each time it fires, so an observer removed earlier in
//! the same dispatch is skipped.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use prefs_types::backend::{ChangeSink, SubscriptionToken};
use prefs_types::branch;

use crate::adapter::BranchAdapter;
use crate::observer::{Callback, PREF_CHANGED_TOPIC, PrefChange, Receiver, same_receiver};
use crate::prelude::*;

/// Opaque id of an observer registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverHandle(u64);

impl fmt::Display for ObserverHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "observer-{}", self.0)
	}
}

struct Entry {
	prefix: Box<str>,
	callback: Callback,
	receiver: Option<Receiver>,
	token: SubscriptionToken,
	adapter: BranchAdapter,
}

impl Entry {
	fn matches(&self, prefix: &str, callback: &Callback, receiver: Option<&Receiver>) -> bool {
		&*self.prefix == prefix
			&& self.callback.same(callback)
			&& same_receiver(self.receiver.as_ref(), receiver)
	}
}

pub struct ObserverRegistry {
	entries: Mutex<BTreeMap<ObserverHandle, Entry>>,
	next_id: AtomicU64,
	/// Set by `shutdown` while holding the entries lock
	closed: AtomicBool,
}

impl fmt::Debug for ObserverRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObserverRegistry")
			.field("entries", &self.len())
			.field("closed", &self.is_closed())
			.finish()
	}
}

impl ObserverRegistry {
	pub(crate) fn new() -> Self {
		Self {
			entries: Mutex::new(BTreeMap::new()),
			next_id: AtomicU64::new(1),
			closed: AtomicBool::new(false),
		}
	}

	/// Register an observer on a fully qualified branch prefix.
	///
	/// Fails with `Error::Closed` once the registry has been shut down.
	pub fn add(
		self: &Arc<Self>,
		adapter: &BranchAdapter,
		full_prefix: &str,
		callback: &Callback,
		receiver: Option<&Receiver>,
	) -> PrefResult<ObserverHandle> {
		if self.is_closed() {
			return Err(Error::Closed);
		}

		let handle = ObserverHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
		let registry = Arc::downgrade(self);
		let watched: Box<str> = full_prefix.into();

		// The backend matches plain string prefixes; the dot boundary is checked here
		let sink: ChangeSink = Arc::new(move |key: &str| {
			if !branch::in_branch(&watched, key) {
				return;
			}
			if let Some(registry) = registry.upgrade() {
				registry.dispatch(handle, key);
			}
		});

		let token = adapter.subscribe(full_prefix, sink)?;
		{
			let mut entries = self.entries.lock();
			if !self.is_closed() {
				entries.insert(
					handle,
					Entry {
						prefix: full_prefix.into(),
						callback: callback.clone(),
						receiver: receiver.cloned(),
						token,
						adapter: adapter.clone(),
					},
				);
				debug!("Observing '{}' as {} ({})", full_prefix, handle, token);
				return Ok(handle);
			}
		}

		// Shut down while subscribing
		adapter.unsubscribe(token)?;
		Err(Error::Closed)
	}

	/// Remove the registration with this exact prefix, callback and receiver
	pub fn remove_matching(
		&self,
		full_prefix: &str,
		callback: &Callback,
		receiver: Option<&Receiver>,
	) -> PrefResult<bool> {
		let handle = self
			.entries
			.lock()
			.iter()
			.find(|(_, entry)| entry.matches(full_prefix, callback, receiver))
			.map(|(handle, _)| *handle);

		match handle {
			Some(handle) => self.remove(handle),
			None => {
				debug!("No observer registered on '{}' for this callback", full_prefix);
				Ok(false)
			}
		}
	}

	/// Cancel the backend subscription, then drop the entry.
	///
	/// If the backend fails to cancel, the entry stays registered so the
	/// removal can be retried.
	pub fn remove(&self, handle: ObserverHandle) -> PrefResult<bool> {
		let target = self
			.entries
			.lock()
			.get(&handle)
			.map(|entry| (entry.adapter.clone(), entry.token, entry.prefix.clone()));
		let Some((adapter, token, prefix)) = target else {
			return Ok(false);
		};

		Self::cancel(handle, &adapter, token)?;
		// Another caller may have removed it meanwhile
		let removed = self.entries.lock().remove(&handle).is_some();
		if removed {
			debug!("Ignoring '{}' ({})", prefix, handle);
		}
		Ok(removed)
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::Acquire)
	}

	/// Refuse new registrations, cancel every backend subscription and empty
	/// the registry.
	///
	/// Returns the number of registrations removed. A registration whose
	/// subscription the backend fails to cancel is logged and kept, so a later
	/// `shutdown` or `remove` can retry it.
	pub fn shutdown(&self) -> usize {
		let entries = {
			let mut entries = self.entries.lock();
			self.closed.store(true, Ordering::Release);
			std::mem::take(&mut *entries)
		};

		let mut removed = 0;
		let mut failed = Vec::new();
		for (handle, entry) in entries {
			match Self::cancel(handle, &entry.adapter, entry.token) {
				Ok(()) => removed += 1,
				Err(err) => {
					warn!("Failed to cancel {} on '{}': {}", handle, entry.prefix, err);
					failed.push((handle, entry));
				}
			}
		}

		if !failed.is_empty() {
			self.entries.lock().extend(failed);
		}
		removed
	}

	fn cancel(
		handle: ObserverHandle,
		adapter: &BranchAdapter,
		token: SubscriptionToken,
	) -> PrefResult<()> {
		if !adapter.unsubscribe(token)? {
			warn!("{} had no backend subscription {}", handle, token);
		}
		Ok(())
	}

	fn dispatch(&self, handle: ObserverHandle, key: &str) {
		// Clone out so the callback runs without the registry lock
		let target = self
			.entries
			.lock()
			.get(&handle)
			.map(|entry| (entry.prefix.clone(), entry.callback.clone(), entry.receiver.clone()));
		let Some((prefix, callback, receiver)) = target else {
			return;
		};

		let change = PrefChange { subject: &prefix, topic: PREF_CHANGED_TOPIC, key };
		callback.invoke(receiver.as_ref(), &change);
	}
}


// vim: ts=4
