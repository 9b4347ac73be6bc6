use serde::Deserialize;
use serde_json::{Map, Value};

/// Backend configuration options
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryBackendConfig {
	/// Implement `reset_branch` natively. When false the backend reports the
	/// operation as unsupported and callers clear keys one by one.
	pub native_reset_branch: bool,

	/// Default values seeded at construction, keyed by full pref name
	pub defaults: Map<String, Value>,
}

impl Default for MemoryBackendConfig {
	fn default() -> Self {
		Self { native_reset_branch: true, defaults: Map::new() }
	}
}

// vim: ts=4
