//! Backend adapter scoped to a root prefix
//!
//! Translates relative keys into full backend keys. Subscription prefixes are
//! passed through as-is: the observer registry resolves them before calling.

use std::fmt;
use std::sync::Arc;

use prefs_types::backend::{ChangeSink, PrefBackend, SubscriptionToken};
use prefs_types::branch;

use crate::prelude::*;

#[derive(Clone)]
pub struct BranchAdapter {
	backend: Arc<dyn PrefBackend>,
	root: Box<str>,
}

impl fmt::Debug for BranchAdapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BranchAdapter").field("root", &self.root).finish_non_exhaustive()
	}
}

impl BranchAdapter {
	pub fn new(backend: Arc<dyn PrefBackend>, root: impl Into<Box<str>>) -> Self {
		Self { backend, root: root.into() }
	}

	/// Adapter for a sub-branch of this one
	pub fn with_suffix(&self, suffix: &str) -> Self {
		Self { backend: Arc::clone(&self.backend), root: branch::join(&self.root, suffix).into() }
	}

	pub fn root(&self) -> &str {
		&self.root
	}

	pub fn full_key(&self, key: &str) -> String {
		branch::join(&self.root, key)
	}

	pub fn get_raw(&self, key: &str) -> PrefResult<Option<PrefValue>> {
		self.backend.get(&self.full_key(key))
	}

	pub fn set_string(&self, key: &str, value: &str) -> PrefResult<()> {
		self.backend.set_string(&self.full_key(key), value)
	}

	pub fn set_int(&self, key: &str, value: i32) -> PrefResult<()> {
		self.backend.set_int(&self.full_key(key), value)
	}

	pub fn set_bool(&self, key: &str, value: bool) -> PrefResult<()> {
		self.backend.set_bool(&self.full_key(key), value)
	}

	pub fn set_value(&self, key: &str, value: &PrefValue) -> PrefResult<()> {
		match value {
			PrefValue::String(s) => self.set_string(key, s),
			PrefValue::Int(i) => self.set_int(key, *i),
			PrefValue::Bool(b) => self.set_bool(key, *b),
		}
	}

	/// Clear the user value; a key without one, or with no entry at all, is a no-op
	pub fn clear(&self, key: &str) -> PrefResult<()> {
		let full = self.full_key(key);
		if !self.backend.clear(&full)? {
			debug!("Reset of '{}' had no user value to clear", full);
		}
		Ok(())
	}

	pub fn has_user_value(&self, key: &str) -> PrefResult<bool> {
		self.backend.has_user_value(&self.full_key(key))
	}

	pub fn is_locked(&self, key: &str) -> PrefResult<bool> {
		self.backend.is_locked(&self.full_key(key))
	}

	pub fn lock(&self, key: &str) -> PrefResult<()> {
		self.backend.lock(&self.full_key(key))
	}

	pub fn unlock(&self, key: &str) -> PrefResult<()> {
		self.backend.unlock(&self.full_key(key))
	}

	/// Keys under `branch`, relative to this adapter's root
	pub fn enumerate_children(&self, branch: &str) -> PrefResult<Vec<Box<str>>> {
		let keys = self.backend.child_keys(&self.full_key(branch))?;
		Ok(keys.iter().filter_map(|key| key.strip_prefix(&*self.root)).map(Box::from).collect())
	}

	pub fn reset_branch_native(&self, branch: &str) -> PrefResult<()> {
		self.backend.reset_branch(&self.full_key(branch))
	}

	/// Subscribe on a fully qualified prefix
	pub fn subscribe(&self, full_prefix: &str, sink: ChangeSink) -> PrefResult<SubscriptionToken> {
		self.backend.subscribe(full_prefix, sink)
	}

	pub fn unsubscribe(&self, token: SubscriptionToken) -> PrefResult<bool> {
		self.backend.unsubscribe(token)
	}
}


// vim: ts=4
