//! Branch path helpers
//!
//! A branch is every key under a prefix. Observer matching is dot-bounded:
//! observing `"foo"` covers `"foo"` and `"foo.bar"`, never `"foobar"`.

/// Key path separator
pub const SEPARATOR: char = '.';

/// Check whether `key` belongs to the branch rooted at `prefix`
pub fn in_branch(prefix: &str, key: &str) -> bool {
	// Empty prefix observes everything
	if prefix.is_empty() || key == prefix {
		return true;
	}

	let Some(rest) = key.strip_prefix(prefix) else {
		return false;
	};

	// "foo." already ends on a boundary
	prefix.ends_with(SEPARATOR) || rest.starts_with(SEPARATOR)
}

/// Concatenate a root prefix and a relative key
pub fn join(root: &str, key: &str) -> String {
	let mut full = String::with_capacity(root.len() + key.len());
	full.push_str(root);
	full.push_str(key);
	full
}


// vim: ts=4
