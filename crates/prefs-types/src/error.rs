//! Error types shared by the store and its backends.

use std::fmt;

use crate::value::PrefKind;

pub type PrefResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
	/// A value outside {string, number, boolean} was passed to a write
	UnsupportedValueKind { key: Box<str>, kind: &'static str },
	/// The backend does not implement an optional operation
	Unsupported(&'static str),
	/// The backend refused to write a locked key
	Locked(Box<str>),
	/// A typed getter found a value of another kind
	TypeMismatch { key: Box<str>, expected: PrefKind, actual: PrefKind },
	/// A required typed getter found no value
	NotFound(Box<str>),
	InvalidKey(Box<str>),
	/// The observer registry has been shut down
	Closed,

	// externals
	Backend(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Error::UnsupportedValueKind { key, kind } => write!(
				f,
				"can't set pref {} to a value of kind '{}'; it isn't a string, number, or boolean",
				key, kind
			),
			Error::Unsupported(op) => write!(f, "operation not supported by backend: {}", op),
			Error::Locked(key) => write!(f, "pref {} is locked", key),
			Error::TypeMismatch { key, expected, actual } => {
				write!(f, "pref {} is not {}, got {}", key, expected, actual)
			}
			Error::NotFound(key) => write!(f, "pref {} has no value", key),
			Error::InvalidKey(key) => write!(f, "invalid pref key: '{}'", key),
			Error::Closed => write!(f, "pref service is shut down"),
			Error::Backend(msg) => write!(f, "backend error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}


// vim: ts=4
