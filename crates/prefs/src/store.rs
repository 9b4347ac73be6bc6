//! Typed preference store scoped to a branch

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::adapter::BranchAdapter;
use crate::coerce::{self, Coercion};
use crate::observer::{Callback, Receiver};
use crate::prelude::*;
use crate::registry::{ObserverHandle, ObserverRegistry};

/// Preference store rooted at a prefix.
///
/// Every key passed in is relative to [`Preferences::root`]. Clones and
/// nested branches share the observer registry of the service they came from.
#[derive(Debug, Clone)]
pub struct Preferences {
	adapter: BranchAdapter,
	registry: Arc<ObserverRegistry>,
}

impl Preferences {
	pub(crate) fn new(adapter: BranchAdapter, registry: Arc<ObserverRegistry>) -> Self {
		Self { adapter, registry }
	}

	pub fn root(&self) -> &str {
		self.adapter.root()
	}

	/// Store rooted at `root + suffix`
	pub fn branch(&self, suffix: &str) -> Preferences {
		Self { adapter: self.adapter.with_suffix(suffix), registry: Arc::clone(&self.registry) }
	}

	fn check_key(&self, key: &str) -> PrefResult<()> {
		if key.is_empty() {
			return Err(Error::InvalidKey(self.adapter.root().into()));
		}
		Ok(())
	}

	// Getters //
	//*********//

	pub fn get(&self, key: &str) -> PrefResult<Option<PrefValue>> {
		self.check_key(key)?;
		self.adapter.get_raw(key)
	}

	pub fn get_or(&self, key: &str, default: impl Into<PrefValue>) -> PrefResult<PrefValue> {
		Ok(self.get(key)?.unwrap_or_else(|| default.into()))
	}

	/// Read several keys; the result is in the same order as `keys`
	pub fn get_many<K: AsRef<str>>(
		&self,
		keys: impl IntoIterator<Item = K>,
	) -> PrefResult<Vec<Option<PrefValue>>> {
		keys.into_iter().map(|key| self.get(key.as_ref())).collect()
	}

	fn get_typed<T>(
		&self,
		key: &str,
		expected: PrefKind,
		extract: impl FnOnce(PrefValue) -> Option<T>,
	) -> PrefResult<Option<T>> {
		let Some(value) = self.get(key)? else {
			return Ok(None);
		};
		let actual = value.kind();
		extract(value).map(Some).ok_or_else(|| Error::TypeMismatch {
			key: self.adapter.full_key(key).into(),
			expected,
			actual,
		})
	}

	fn require<T>(&self, key: &str, value: Option<T>) -> PrefResult<T> {
		value.ok_or_else(|| Error::NotFound(self.adapter.full_key(key).into()))
	}

	pub fn get_string(&self, key: &str) -> PrefResult<String> {
		self.require(key, self.get_string_opt(key)?)
	}

	pub fn get_int(&self, key: &str) -> PrefResult<i32> {
		self.require(key, self.get_int_opt(key)?)
	}

	pub fn get_bool(&self, key: &str) -> PrefResult<bool> {
		self.require(key, self.get_bool_opt(key)?)
	}

	pub fn get_string_opt(&self, key: &str) -> PrefResult<Option<String>> {
		self.get_typed(key, PrefKind::String, |value| match value {
			PrefValue::String(s) => Some(s),
			_ => None,
		})
	}

	pub fn get_int_opt(&self, key: &str) -> PrefResult<Option<i32>> {
		self.get_typed(key, PrefKind::Int, |value| value.as_int())
	}

	pub fn get_bool_opt(&self, key: &str) -> PrefResult<Option<bool>> {
		self.get_typed(key, PrefKind::Bool, |value| value.as_bool())
	}

	pub fn has(&self, key: &str) -> PrefResult<bool> {
		Ok(self.get(key)?.is_some())
	}

	/// Whether the pref exists and holds a user value
	pub fn modified(&self, key: &str) -> PrefResult<bool> {
		Ok(self.has(key)? && self.adapter.has_user_value(key)?)
	}

	pub fn locked(&self, key: &str) -> PrefResult<bool> {
		self.check_key(key)?;
		self.adapter.is_locked(key)
	}

	// Setters //
	//*********//

	/// Store a JSON string, boolean or number.
	///
	/// Numbers are coerced to 32-bit integers; the coercions applied are
	/// logged once the value is stored and returned. Any other kind is
	/// rejected before the backend is touched.
	pub fn set(&self, key: &str, value: impl Into<Value>) -> PrefResult<Vec<Coercion>> {
		self.check_key(key)?;
		let (value, coercions) = coerce::to_pref_value(&self.adapter.full_key(key), &value.into())?;
		self.adapter.set_value(key, &value)?;
		for coercion in &coercions {
			warn!("{}", coercion);
		}
		Ok(coercions)
	}

	pub fn set_value(&self, key: &str, value: &PrefValue) -> PrefResult<()> {
		self.check_key(key)?;
		self.adapter.set_value(key, value)
	}

	/// Apply `set` to each entry in order.
	///
	/// Not atomic: on error the entries before the failing one stay written.
	pub fn set_many<K, V>(
		&self,
		entries: impl IntoIterator<Item = (K, V)>,
	) -> PrefResult<Vec<Coercion>>
	where
		K: AsRef<str>,
		V: Into<Value>,
	{
		let mut coercions = Vec::new();
		for (key, value) in entries {
			coercions.extend(self.set(key.as_ref(), value)?);
		}
		Ok(coercions)
	}

	/// Apply `set` to each member of a JSON object, in insertion order
	pub fn set_object(&self, object: &Map<String, Value>) -> PrefResult<Vec<Coercion>> {
		self.set_many(object.iter().map(|(key, value)| (key, value.clone())))
	}

	/// Drop the user value, reverting to the default if there is one
	pub fn reset(&self, key: &str) -> PrefResult<()> {
		self.check_key(key)?;
		self.adapter.clear(key)
	}

	pub fn reset_many<K: AsRef<str>>(&self, keys: impl IntoIterator<Item = K>) -> PrefResult<()> {
		for key in keys {
			self.reset(key.as_ref())?;
		}
		Ok(())
	}

	/// Reset every pref whose key starts with `root + branch`
	pub fn reset_branch(&self, branch: &str) -> PrefResult<()> {
		match self.adapter.reset_branch_native(branch) {
			Err(Error::Unsupported(_)) => {
				let keys = self.adapter.enumerate_children(branch)?;
				debug!(
					"Backend has no native branch reset, clearing {} prefs under '{}'",
					keys.len(),
					self.adapter.full_key(branch)
				);
				for key in &keys {
					self.adapter.clear(key)?;
				}
				Ok(())
			}
			res => res,
		}
	}

	pub fn lock(&self, key: &str) -> PrefResult<()> {
		self.check_key(key)?;
		self.adapter.lock(key)
	}

	pub fn unlock(&self, key: &str) -> PrefResult<()> {
		self.check_key(key)?;
		self.adapter.unlock(key)
	}

	// Observers //
	//***********//

	/// Call `callback` whenever a pref in `root + branch` changes.
	///
	/// `receiver` is handed to method callbacks and is part of the
	/// registration's identity.
	pub fn observe(
		&self,
		branch: &str,
		callback: &Callback,
		receiver: Option<&Receiver>,
	) -> PrefResult<ObserverHandle> {
		self.registry.add(&self.adapter, &self.adapter.full_key(branch), callback, receiver)
	}

	/// Remove a registration made with the same branch, callback and receiver.
	///
	/// Returns `false` if there was none.
	pub fn ignore(
		&self,
		branch: &str,
		callback: &Callback,
		receiver: Option<&Receiver>,
	) -> PrefResult<bool> {
		self.registry.remove_matching(&self.adapter.full_key(branch), callback, receiver)
	}

	pub fn ignore_handle(&self, handle: ObserverHandle) -> PrefResult<bool> {
		self.registry.remove(handle)
	}
}

// vim: ts=4
