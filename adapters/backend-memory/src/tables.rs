use std::collections::{BTreeSet, HashMap, HashSet};

use prefs_types::prelude::*;

/// Default and user value tables plus the lock set.
///
/// Mutators return whether the effective value of the touched key changed,
/// so the caller knows whom to notify once the lock is released.
#[derive(Debug, Default)]
pub(crate) struct Tables {
	pub(crate) defaults: HashMap<Box<str>, PrefValue>,
	pub(crate) user: HashMap<Box<str>, PrefValue>,
	pub(crate) locked: HashSet<Box<str>>,
}

impl Tables {
	/// Value a reader sees: a locked pref always reads its default
	pub(crate) fn effective(&self, key: &str) -> Option<&PrefValue> {
		if self.locked.contains(key) {
			return self.defaults.get(key);
		}
		self.user.get(key).or_else(|| self.defaults.get(key))
	}

	pub(crate) fn put_default(&mut self, key: &str, value: PrefValue) -> bool {
		let before = self.effective(key).cloned();
		self.defaults.insert(key.into(), value);
		before.as_ref() != self.effective(key)
	}

	pub(crate) fn put_user(&mut self, key: &str, value: PrefValue) -> PrefResult<bool> {
		if self.locked.contains(key) {
			return Err(Error::Locked(key.into()));
		}
		let before = self.effective(key).cloned();
		self.user.insert(key.into(), value);
		Ok(before.as_ref() != self.effective(key))
	}

	/// Returns (user value removed, effective value changed)
	pub(crate) fn clear_user(&mut self, key: &str) -> (bool, bool) {
		let before = self.effective(key).cloned();
		let removed = self.user.remove(key).is_some();
		(removed, before.as_ref() != self.effective(key))
	}

	/// Clear all user values under a prefix, returning the keys that changed
	pub(crate) fn clear_user_prefix(&mut self, prefix: &str) -> Vec<Box<str>> {
		let keys: Vec<Box<str>> =
			self.user.keys().filter(|k| k.starts_with(prefix)).cloned().collect();

		let mut changed = Vec::new();
		for key in keys {
			if self.clear_user(&key).1 {
				changed.push(key);
			}
		}
		changed.sort();
		changed
	}

	pub(crate) fn set_locked(&mut self, key: &str, locked: bool) -> bool {
		let before = self.effective(key).cloned();
		if locked {
			self.locked.insert(key.into());
		} else {
			self.locked.remove(key);
		}
		before.as_ref() != self.effective(key)
	}

	pub(crate) fn keys_with_prefix(&self, prefix: &str) -> Vec<Box<str>> {
		self.defaults
			.keys()
			.chain(self.user.keys())
			.filter(|k| k.starts_with(prefix))
			.cloned()
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}
}


// vim: ts=4
