#![forbid(unsafe_code)]

mod config;
mod tables;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use prefs_types::backend::{ChangeSink, PrefBackend, SubscriptionToken};
use prefs_types::prelude::*;

pub use config::MemoryBackendConfig;

use tables::Tables;

/// A registered change sink
struct Subscriber {
	prefix: Box<str>,
	sink: ChangeSink,
}

/// In-memory implementation of PrefBackend.
///
/// Keeps default and user values in separate tables. Sinks are invoked
/// synchronously from the writing call, after all internal locks have been
/// released.
pub struct MemoryBackend {
	tables: RwLock<Tables>,
	subscribers: RwLock<BTreeMap<SubscriptionToken, Subscriber>>,
	next_token: AtomicU64,
	config: MemoryBackendConfig,
}

impl fmt::Debug for MemoryBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tables = self.tables.read();
		f.debug_struct("MemoryBackend")
			.field("defaults", &tables.defaults.len())
			.field("user_values", &tables.user.len())
			.field("locked", &tables.locked.len())
			.field("subscribers", &self.subscribers.read().len())
			.field("config", &self.config.native_reset_branch)
			.finish()
	}
}

impl MemoryBackend {
	fn empty(config: MemoryBackendConfig) -> Self {
		Self {
			tables: RwLock::new(Tables::default()),
			subscribers: RwLock::new(BTreeMap::new()),
			next_token: AtomicU64::new(1),
			config,
		}
	}

	/// Create an empty backend with default configuration
	pub fn new() -> Self {
		Self::empty(MemoryBackendConfig::default())
	}

	/// Create a backend and seed the configured defaults
	pub fn with_config(config: MemoryBackendConfig) -> PrefResult<Self> {
		let defaults = config.defaults.clone();
		let backend = Self::empty(config);
		backend.load_defaults(&defaults)?;
		Ok(backend)
	}

	/// Set the default value of a pref
	pub fn set_default(&self, key: &str, value: impl Into<PrefValue>) {
		let changed = self.tables.write().put_default(key, value.into());
		if changed {
			self.notify(key);
		}
	}

	/// Seed default values from a JSON object.
	///
	/// Every value must be a string, boolean or an integer that fits 32 bits.
	/// Values are validated before anything is written.
	pub fn load_defaults(&self, defaults: &Map<String, Value>) -> PrefResult<usize> {
		let values = defaults
			.iter()
			.map(|(key, value)| Ok((key.as_str(), default_value(key, value)?)))
			.collect::<PrefResult<Vec<_>>>()?;

		for (key, value) in &values {
			self.set_default(key, value.clone());
		}
		debug!("Loaded {} default prefs", values.len());
		Ok(values.len())
	}

	/// Number of active subscriptions
	pub fn subscription_count(&self) -> usize {
		self.subscribers.read().len()
	}

	/// Invoke every sink whose prefix matches `key`.
	///
	/// Sinks are collected first so none runs while the subscriber lock is
	/// held; a sink may subscribe or unsubscribe.
	fn notify(&self, key: &str) {
		let sinks: Vec<ChangeSink> = self
			.subscribers
			.read()
			.values()
			.filter(|sub| key.starts_with(&*sub.prefix))
			.map(|sub| ChangeSink::clone(&sub.sink))
			.collect();

		for sink in sinks {
			sink(key);
		}
	}

	fn write_user(&self, key: &str, value: PrefValue) -> PrefResult<()> {
		let changed = self.tables.write().put_user(key, value)?;
		if changed {
			self.notify(key);
		}
		Ok(())
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		Self::new()
	}
}

/// Strict JSON to value conversion for seeded defaults
fn default_value(key: &str, value: &Value) -> PrefResult<PrefValue> {
	match value {
		Value::String(s) => Ok(PrefValue::String(s.clone())),
		Value::Bool(b) => Ok(PrefValue::Bool(*b)),
		Value::Number(n) => n
			.as_i64()
			.and_then(|i| i32::try_from(i).ok())
			.map(PrefValue::Int)
			.ok_or_else(|| {
				Error::Backend(format!("default for {} is not a 32-bit integer: {}", key, n))
			}),
		other => Err(Error::UnsupportedValueKind {
			key: key.into(),
			kind: prefs_types::value::json_kind_name(other),
		}),
	}
}

impl PrefBackend for MemoryBackend {
	fn get(&self, key: &str) -> PrefResult<Option<PrefValue>> {
		Ok(self.tables.read().effective(key).cloned())
	}

	fn set_string(&self, key: &str, value: &str) -> PrefResult<()> {
		self.write_user(key, PrefValue::String(value.to_string()))
	}

	fn set_int(&self, key: &str, value: i32) -> PrefResult<()> {
		self.write_user(key, PrefValue::Int(value))
	}

	fn set_bool(&self, key: &str, value: bool) -> PrefResult<()> {
		self.write_user(key, PrefValue::Bool(value))
	}

	fn clear(&self, key: &str) -> PrefResult<bool> {
		let (removed, changed) = self.tables.write().clear_user(key);
		if changed {
			self.notify(key);
		}
		Ok(removed)
	}

	fn has_user_value(&self, key: &str) -> PrefResult<bool> {
		Ok(self.tables.read().user.contains_key(key))
	}

	fn is_locked(&self, key: &str) -> PrefResult<bool> {
		Ok(self.tables.read().locked.contains(key))
	}

	fn lock(&self, key: &str) -> PrefResult<()> {
		let changed = self.tables.write().set_locked(key, true);
		if changed {
			self.notify(key);
		}
		Ok(())
	}

	fn unlock(&self, key: &str) -> PrefResult<()> {
		let changed = self.tables.write().set_locked(key, false);
		if changed {
			self.notify(key);
		}
		Ok(())
	}

	fn child_keys(&self, prefix: &str) -> PrefResult<Vec<Box<str>>> {
		Ok(self.tables.read().keys_with_prefix(prefix))
	}

	fn reset_branch(&self, prefix: &str) -> PrefResult<()> {
		if !self.config.native_reset_branch {
			return Err(Error::Unsupported("reset_branch"));
		}

		let changed = self.tables.write().clear_user_prefix(prefix);
		debug!("Reset branch '{}': {} prefs changed", prefix, changed.len());
		for key in &changed {
			self.notify(key);
		}
		Ok(())
	}

	fn subscribe(&self, prefix: &str, sink: ChangeSink) -> PrefResult<SubscriptionToken> {
		let token = SubscriptionToken(self.next_token.fetch_add(1, Ordering::Relaxed));
		self.subscribers.write().insert(token, Subscriber { prefix: prefix.into(), sink });
		debug!("Subscribed {} on '{}'", token, prefix);
		Ok(token)
	}

	fn unsubscribe(&self, token: SubscriptionToken) -> PrefResult<bool> {
		let removed = self.subscribers.write().remove(&token).is_some();
		if removed {
			debug!("Unsubscribed {}", token);
		}
		Ok(removed)
	}
}

// vim: ts=4
