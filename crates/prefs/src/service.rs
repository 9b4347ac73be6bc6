//! Process-scoped preference context
//!
//! Owns the backend handle and the observer registry shared by every
//! [`Preferences`] it hands out.

use std::sync::Arc;

use prefs_types::backend::PrefBackend;

use crate::adapter::BranchAdapter;
use crate::prelude::*;
use crate::registry::ObserverRegistry;
use crate::store::Preferences;

/// Shared context for a set of [`Preferences`].
///
/// Stores handed out keep working after the service is shut down or dropped,
/// but their `observe` calls fail with `Error::Closed`.
#[derive(Debug)]
pub struct PrefService {
	backend: Arc<dyn PrefBackend>,
	registry: Arc<ObserverRegistry>,
}

impl PrefService {
	pub fn new(backend: Arc<dyn PrefBackend>) -> Self {
		Self { backend, registry: Arc::new(ObserverRegistry::new()) }
	}

	/// Store over the whole key space
	pub fn root(&self) -> Preferences {
		self.branch("")
	}

	/// Store rooted at `prefix`
	pub fn branch(&self, prefix: &str) -> Preferences {
		Preferences::new(
			BranchAdapter::new(Arc::clone(&self.backend), prefix),
			Arc::clone(&self.registry),
		)
	}

	pub fn observer_count(&self) -> usize {
		self.registry.len()
	}

	/// Remove every observer, cancel its backend subscription and refuse
	/// new ones
	pub fn shutdown(&self) {
		let removed = self.registry.shutdown();
		if removed > 0 {
			info!("Pref service shut down, removed {} observers", removed);
		}
	}
}

impl Drop for PrefService {
	fn drop(&mut self) {
		self.shutdown();
	}
}

// vim: ts=4
