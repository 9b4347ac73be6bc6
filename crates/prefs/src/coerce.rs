//! Input value validation and integer coercion
//!
//! Callers hand the store a JSON value. Strings and booleans are stored as
//! they are. Numbers are stored as 32-bit integers: fractions are truncated
//! toward zero and out-of-range values saturate. Each lossy step is reported
//! back to the caller, but never fails the write.

use serde_json::{Number, Value};
use std::fmt;

use prefs_types::value::json_kind_name;

use crate::prelude::*;

/// What a coercion did to the requested number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
	/// Fractional part dropped
	NonIntegral,
	/// Clamped into the i32 range
	OutOfRange,
}

/// A lossy conversion performed while storing a number
#[derive(Debug, Clone, PartialEq)]
pub struct Coercion {
	pub key: Box<str>,
	pub kind: CoercionKind,
	pub requested: Number,
	pub stored: i32,
}

impl fmt::Display for Coercion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.kind {
			CoercionKind::NonIntegral => write!(
				f,
				"setting the {} pref to the non-integer number {} converted it to the integer number {}; \
				 to retain fractional precision, store non-integer numbers as strings",
				self.key, self.requested, self.stored
			),
			CoercionKind::OutOfRange => write!(
				f,
				"setting the {} pref to the large number {} corrupted it to the number {}, \
				 as it is outside the 32-bit range; to retain the original value, store it as a string",
				self.key, self.requested, self.stored
			),
		}
	}
}

/// Validate a JSON value and convert it into a storable value.
///
/// `Null`, arrays and objects are rejected with `UnsupportedValueKind`.
pub fn to_pref_value(key: &str, value: &Value) -> PrefResult<(PrefValue, Vec<Coercion>)> {
	match value {
		Value::String(s) => Ok((PrefValue::String(s.clone()), Vec::new())),
		Value::Bool(b) => Ok((PrefValue::Bool(*b), Vec::new())),
		Value::Number(n) => {
			let (stored, coercions) = coerce_number(key, n);
			Ok((PrefValue::Int(stored), coercions))
		}
		other => {
			Err(Error::UnsupportedValueKind { key: key.into(), kind: json_kind_name(other) })
		}
	}
}

fn coerce_number(key: &str, n: &Number) -> (i32, Vec<Coercion>) {
	let report = |kind, stored| Coercion { key: key.into(), kind, requested: n.clone(), stored };

	if let Some(i) = n.as_i64() {
		let stored = i.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
		if i64::from(stored) == i {
			return (stored, Vec::new());
		}
		return (stored, vec![report(CoercionKind::OutOfRange, stored)]);
	}

	if n.is_u64() {
		// Only integers above i64::MAX end up here
		return (i32::MAX, vec![report(CoercionKind::OutOfRange, i32::MAX)]);
	}

	let f = n.as_f64().unwrap_or_default();
	let truncated = f.trunc();
	let out_of_range = truncated > f64::from(i32::MAX) || truncated < f64::from(i32::MIN);
	// Float to int casts saturate
	let stored = truncated as i32;

	let mut coercions = Vec::new();
	if f.fract().abs() > 0.0 {
		coercions.push(report(CoercionKind::NonIntegral, stored));
	}
	if out_of_range {
		coercions.push(report(CoercionKind::OutOfRange, stored));
	}
	(stored, coercions)
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn kinds(coercions: &[Coercion]) -> Vec<CoercionKind> {
		coercions.iter().map(|c| c.kind).collect()
	}

	#[test]
	fn test_plain_values() {
		assert_eq!(to_pref_value("k", &json!("foo")).unwrap(), ("foo".into(), vec![]));
		assert_eq!(to_pref_value("k", &json!(true)).unwrap(), (true.into(), vec![]));
		assert_eq!(to_pref_value("k", &json!(5)).unwrap(), (5.into(), vec![]));
		assert_eq!(to_pref_value("k", &json!(-5)).unwrap(), ((-5).into(), vec![]));
		// Integral float is not a coercion
		assert_eq!(to_pref_value("k", &json!(5.0)).unwrap(), (5.into(), vec![]));
	}

	#[test]
	#[allow(clippy::approx_constant)]
	fn test_non_integral_truncates() {
		let (value, coercions) = to_pref_value("pi", &json!(3.14159)).unwrap();
		assert_eq!(value, PrefValue::Int(3));
		assert_eq!(kinds(&coercions), vec![CoercionKind::NonIntegral]);
		assert_eq!(&*coercions[0].key, "pi");
		assert_eq!(coercions[0].stored, 3);

		let (value, _) = to_pref_value("neg", &json!(-2.7)).unwrap();
		assert_eq!(value, PrefValue::Int(-2));
	}

	#[test]
	fn test_out_of_range_clamps() {
		let (value, coercions) = to_pref_value("big", &json!(2_147_483_648_i64)).unwrap();
		assert_eq!(value, PrefValue::Int(i32::MAX));
		assert_eq!(kinds(&coercions), vec![CoercionKind::OutOfRange]);

		let (value, _) = to_pref_value("small", &json!(-2_147_483_649_i64)).unwrap();
		assert_eq!(value, PrefValue::Int(i32::MIN));

		let (value, coercions) = to_pref_value("huge", &json!(u64::MAX)).unwrap();
		assert_eq!(value, PrefValue::Int(i32::MAX));
		assert_eq!(kinds(&coercions), vec![CoercionKind::OutOfRange]);
	}

	#[test]
	fn test_both_coercions() {
		let (value, coercions) = to_pref_value("k", &json!(1e12 + 0.5)).unwrap();
		assert_eq!(value, PrefValue::Int(i32::MAX));
		assert_eq!(kinds(&coercions), vec![CoercionKind::NonIntegral, CoercionKind::OutOfRange]);
	}

	#[test]
	fn test_unsupported_kinds() {
		for (input, kind) in
			[(json!(null), "null"), (json!([1, 2]), "array"), (json!({ "a": 1 }), "object")]
		{
			assert_eq!(
				to_pref_value("k", &input),
				Err(Error::UnsupportedValueKind { key: "k".into(), kind })
			);
		}
	}

	#[test]
	fn test_coercion_message() {
		let (_, coercions) = to_pref_value("pi", &json!(3.5)).unwrap();
		assert!(coercions[0].to_string().contains("non-integer number 3.5"));
	}
}

// vim: ts=4
