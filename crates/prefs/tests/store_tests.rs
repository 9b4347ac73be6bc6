//! Store tests over the in-memory backend
//!
//! Typed reads and writes, coercion, batch operations, reset and branch
//! scoping.

use parking_lot::Mutex;
use serde_json::json;
use std::io;
use std::sync::Arc;

use prefs::{CoercionKind, Error, PrefKind, PrefService, PrefValue, Preferences};
use prefs_backend_memory::{MemoryBackend, MemoryBackendConfig};

/// Helper to create a service over a fresh backend
fn create_test_service(native_reset_branch: bool) -> (PrefService, Arc<MemoryBackend>) {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();

	let config = MemoryBackendConfig { native_reset_branch, ..Default::default() };
	let backend = Arc::new(MemoryBackend::with_config(config).expect("Failed to create backend"));
	(PrefService::new(backend.clone()), backend)
}

/// Log sink collecting formatted output in memory
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
	fn contents(&self) -> String {
		String::from_utf8_lossy(&self.0.lock()).into_owned()
	}
}

impl io::Write for LogCapture {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().extend_from_slice(buf);
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

fn root_prefs() -> (Preferences, Arc<MemoryBackend>, PrefService) {
	let (service, backend) = create_test_service(true);
	(service.root(), backend, service)
}

#[test]
fn test_set_then_get() {
	let (prefs, _backend, _service) = root_prefs();

	assert!(prefs.set("app.name", "demo").expect("Failed to set string").is_empty());
	prefs.set("app.retries", 3).expect("Failed to set int");
	prefs.set("app.enabled", true).expect("Failed to set bool");

	assert_eq!(prefs.get("app.name").unwrap(), Some(PrefValue::String("demo".into())));
	assert_eq!(prefs.get_int("app.retries").unwrap(), 3);
	assert!(prefs.get_bool("app.enabled").unwrap());
	assert_eq!(prefs.get("app.missing").unwrap(), None);
}

#[test]
fn test_get_or_after_reset() {
	let (prefs, _backend, _service) = root_prefs();

	prefs.set("k", "v").unwrap();
	prefs.reset("k").unwrap();
	assert_eq!(prefs.get_or("k", "fallback").unwrap(), PrefValue::String("fallback".into()));

	// Never set and reset twice
	prefs.reset("never.set").unwrap();
	prefs.reset("never.set").unwrap();
	assert_eq!(prefs.get_or("never.set", 7).unwrap(), PrefValue::Int(7));
}

#[test]
fn test_reset_reverts_to_default() {
	let (prefs, backend, _service) = root_prefs();
	backend.set_default("ui.zoom", 100);

	prefs.set("ui.zoom", 150).unwrap();
	assert!(prefs.modified("ui.zoom").unwrap());

	prefs.reset("ui.zoom").unwrap();
	assert_eq!(prefs.get_int("ui.zoom").unwrap(), 100);
	assert!(prefs.has("ui.zoom").unwrap());
	assert!(!prefs.modified("ui.zoom").unwrap());
}

#[test]
fn test_batch_set_and_get_keep_order() {
	let (prefs, _backend, _service) = root_prefs();

	let object = json!({ "a": 1, "b": "x", "c": true });
	prefs.set_object(object.as_object().expect("object")).expect("Failed to set object");

	let values = prefs.get_many(["a", "b", "c"]).unwrap();
	assert_eq!(
		values,
		vec![
			Some(PrefValue::Int(1)),
			Some(PrefValue::String("x".into())),
			Some(PrefValue::Bool(true)),
		]
	);

	let values = prefs.get_many(["c", "missing", "a"]).unwrap();
	assert_eq!(values, vec![Some(PrefValue::Bool(true)), None, Some(PrefValue::Int(1))]);
}

#[test]
fn test_set_many_stops_at_first_failure() {
	let (prefs, _backend, _service) = root_prefs();

	let result =
		prefs.set_many([("first", json!(1)), ("second", json!(null)), ("third", json!(3))]);
	assert!(matches!(result, Err(Error::UnsupportedValueKind { kind: "null", .. })));

	assert_eq!(prefs.get("first").unwrap(), Some(PrefValue::Int(1)));
	assert_eq!(prefs.get("second").unwrap(), None);
	assert_eq!(prefs.get("third").unwrap(), None);
}

#[test]
fn test_reset_many() {
	let (prefs, _backend, _service) = root_prefs();
	prefs.set_many([("a", 1), ("b", 2)]).unwrap();

	prefs.reset_many(["a", "b", "c"]).unwrap();
	assert_eq!(prefs.get_many(["a", "b"]).unwrap(), vec![None, None]);
}

#[test]
fn test_large_number_is_clamped() {
	let (prefs, _backend, _service) = root_prefs();

	let coercions = prefs.set("big", 2_147_483_648_i64).expect("Large number must not fail");
	assert_eq!(coercions.len(), 1);
	assert_eq!(coercions[0].kind, CoercionKind::OutOfRange);
	assert_eq!(prefs.get_int("big").unwrap(), i32::MAX);

	prefs.set("small", -3_000_000_000_i64).unwrap();
	assert_eq!(prefs.get_int("small").unwrap(), i32::MIN);
}

#[test]
#[allow(clippy::approx_constant)]
fn test_fraction_is_truncated() {
	let (prefs, _backend, _service) = root_prefs();

	let coercions = prefs.set("pi", 3.14159).unwrap();
	assert_eq!(coercions.len(), 1);
	assert_eq!(coercions[0].kind, CoercionKind::NonIntegral);
	assert_eq!(&*coercions[0].key, "pi");
	assert_eq!(prefs.get_int("pi").unwrap(), 3);
}

#[test]
fn test_unsupported_values_leave_state_alone() {
	let (prefs, _backend, _service) = root_prefs();
	prefs.set("k", "before").unwrap();

	for value in [json!(null), json!([1, 2, 3]), json!({ "nested": true })] {
		let result = prefs.set("k", value);
		assert!(matches!(result, Err(Error::UnsupportedValueKind { .. })));
	}
	assert_eq!(prefs.get_string("k").unwrap(), "before");
}

#[test]
fn test_typed_getters() {
	let (prefs, _backend, _service) = root_prefs();
	prefs.set("s", "text").unwrap();

	assert_eq!(prefs.get_string_opt("s").unwrap(), Some("text".to_string()));
	assert_eq!(prefs.get_int_opt("missing").unwrap(), None);
	assert_eq!(prefs.get_int("missing"), Err(Error::NotFound("missing".into())));
	assert_eq!(
		prefs.get_int("s"),
		Err(Error::TypeMismatch { key: "s".into(), expected: PrefKind::Int, actual: PrefKind::String })
	);
	assert!(matches!(prefs.get_bool_opt("s"), Err(Error::TypeMismatch { .. })));
}

#[test]
fn test_set_value_overwrites_kind() {
	let (prefs, _backend, _service) = root_prefs();
	prefs.set_value("k", &PrefValue::Int(1)).unwrap();
	prefs.set_value("k", &PrefValue::Bool(false)).unwrap();
	assert_eq!(prefs.get("k").unwrap(), Some(PrefValue::Bool(false)));
}

#[test]
fn test_copy_value_between_branches() {
	let (service, _backend) = create_test_service(true);
	let from = service.branch("profile.old.");
	let to = service.branch("profile.new.");
	from.set("name", "alice").unwrap();

	let value = from.get("name").unwrap().expect("value was set");
	assert!(to.set("name", value).unwrap().is_empty());
	assert_eq!(to.get_string("name").unwrap(), "alice");
}

#[test]
fn test_empty_key_is_rejected() {
	let (prefs, _backend, _service) = root_prefs();
	assert!(matches!(prefs.get(""), Err(Error::InvalidKey(_))));
	assert!(matches!(prefs.set("", 1), Err(Error::InvalidKey(_))));
	assert!(matches!(prefs.reset(""), Err(Error::InvalidKey(_))));
}

#[test]
fn test_branch_scopes_keys() {
	let (service, _backend) = create_test_service(true);
	let sync = service.branch("extensions.sync.");

	sync.set("interval", 60).unwrap();
	assert_eq!(sync.root(), "extensions.sync.");
	assert_eq!(service.root().get_int("extensions.sync.interval").unwrap(), 60);

	let nested = service.branch("extensions.").branch("sync.");
	assert_eq!(nested.root(), "extensions.sync.");
	assert_eq!(nested.get_int("interval").unwrap(), 60);

	// Errors name the full key
	assert_eq!(sync.get_bool("absent"), Err(Error::NotFound("extensions.sync.absent".into())));
}

#[test]
fn test_reset_branch_native() {
	let (service, backend) = create_test_service(true);
	backend.set_default("p.foo", "default-foo");
	let prefs = service.root();

	prefs.set("p.foo", "a").unwrap();
	prefs.set("p.bar", "b").unwrap();
	prefs.set("q.foo", "c").unwrap();

	prefs.reset_branch("p.").unwrap();
	assert_eq!(prefs.get_string("p.foo").unwrap(), "default-foo");
	assert_eq!(prefs.get("p.bar").unwrap(), None);
	assert_eq!(prefs.get_string("q.foo").unwrap(), "c");
}

#[test]
fn test_reset_branch_fallback() {
	let (service, backend) = create_test_service(false);
	backend.set_default("p.foo", "default-foo");
	let prefs = service.root();

	prefs.set("p.foo", "a").unwrap();
	prefs.set("p.bar", "b").unwrap();
	prefs.set("q.foo", "c").unwrap();

	prefs.reset_branch("p.").unwrap();
	assert_eq!(prefs.get_string("p.foo").unwrap(), "default-foo");
	assert_eq!(prefs.get("p.bar").unwrap(), None);
	assert_eq!(prefs.get_string("q.foo").unwrap(), "c");
}

#[test]
fn test_reset_branch_relative_to_root() {
	let (service, _backend) = create_test_service(false);
	let branch = service.branch("root.");
	branch.set("p.a", 1).unwrap();
	service.root().set("p.a", 2).unwrap();

	branch.reset_branch("p.").unwrap();
	assert_eq!(branch.get("p.a").unwrap(), None);
	assert_eq!(service.root().get_int("p.a").unwrap(), 2);
}

#[test]
fn test_reset_missing_branch() {
	for native in [true, false] {
		let (service, _backend) = create_test_service(native);
		service.root().reset_branch("does.not.exist.").expect("Empty branch reset must succeed");
	}
}

#[test]
fn test_locked_pref() {
	let (service, backend) = create_test_service(true);
	backend.set_default("policy.update", true);
	let prefs = service.root();

	prefs.lock("policy.update").unwrap();
	assert!(prefs.locked("policy.update").unwrap());
	assert_eq!(prefs.set("policy.update", false), Err(Error::Locked("policy.update".into())));
	assert!(prefs.get_bool("policy.update").unwrap());

	prefs.unlock("policy.update").unwrap();
	assert!(!prefs.locked("policy.update").unwrap());
	prefs.set("policy.update", false).unwrap();
	assert!(!prefs.get_bool("policy.update").unwrap());
}

#[test]
fn test_coercion_logged_only_when_stored() {
	let (service, backend) = create_test_service(true);
	backend.set_default("ratio", 1);
	let prefs = service.root();
	prefs.lock("ratio").unwrap();

	let logs = LogCapture::default();
	let writer = logs.clone();
	let subscriber = tracing_subscriber::fmt()
		.with_writer(move || writer.clone())
		.with_ansi(false)
		.finish();

	tracing::subscriber::with_default(subscriber, || {
		assert_eq!(prefs.set("ratio", 2.5), Err(Error::Locked("ratio".into())));
		assert!(!logs.contents().contains("non-integer number 2.5"));

		prefs.unlock("ratio").unwrap();
		let coercions = prefs.set("ratio", 2.5).unwrap();
		assert_eq!(coercions.len(), 1);
		assert!(logs.contents().contains("non-integer number 2.5"));
	});
}

// vim: ts=4
