//! Pref value types
//!
//! A pref holds exactly one of three kinds of value. Nothing else can be
//! stored; callers with richer data serialize it into a string first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefKind {
	#[serde(rename = "string")]
	String,
	#[serde(rename = "int")]
	Int,
	#[serde(rename = "bool")]
	Bool,
}

impl fmt::Display for PrefKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			PrefKind::String => "string",
			PrefKind::Int => "int",
			PrefKind::Bool => "bool",
		})
	}
}

/// Pref value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
	Bool(bool), // Must be before Int to avoid bool -> int coercion
	Int(i32),
	String(String),
}

impl PrefValue {
	pub fn kind(&self) -> PrefKind {
		match self {
			PrefValue::String(_) => PrefKind::String,
			PrefValue::Int(_) => PrefKind::Int,
			PrefValue::Bool(_) => PrefKind::Bool,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			PrefValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i32> {
		match self {
			PrefValue::Int(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			PrefValue::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl fmt::Display for PrefValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PrefValue::String(s) => f.write_str(s),
			PrefValue::Int(i) => write!(f, "{}", i),
			PrefValue::Bool(b) => write!(f, "{}", b),
		}
	}
}

impl From<&str> for PrefValue {
	fn from(s: &str) -> Self {
		PrefValue::String(s.to_string())
	}
}

impl From<String> for PrefValue {
	fn from(s: String) -> Self {
		PrefValue::String(s)
	}
}

impl From<i32> for PrefValue {
	fn from(i: i32) -> Self {
		PrefValue::Int(i)
	}
}

impl From<bool> for PrefValue {
	fn from(b: bool) -> Self {
		PrefValue::Bool(b)
	}
}

impl From<PrefValue> for serde_json::Value {
	fn from(value: PrefValue) -> Self {
		match value {
			PrefValue::String(s) => serde_json::Value::String(s),
			PrefValue::Int(i) => serde_json::Value::from(i),
			PrefValue::Bool(b) => serde_json::Value::Bool(b),
		}
	}
}

/// Name of a JSON value's shape, for error messages
pub fn json_kind_name(value: &serde_json::Value) -> &'static str {
	match value {
		serde_json::Value::Null => "null",
		serde_json::Value::Bool(_) => "boolean",
		serde_json::Value::Number(_) => "number",
		serde_json::Value::String(_) => "string",
		serde_json::Value::Array(_) => "array",
		serde_json::Value::Object(_) => "object",
	}
}


// vim: ts=4
