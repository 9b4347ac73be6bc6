//! Shared types, the backend trait, and core utilities for the prefs store.
//!
//! This crate contains the foundational types that are shared between the
//! store crate and all backend implementations, so backend crates do not
//! depend on the store itself.

#![forbid(unsafe_code)]

pub mod backend;
pub mod branch;
pub mod error;
pub mod prelude;
pub mod value;

// vim: ts=4
