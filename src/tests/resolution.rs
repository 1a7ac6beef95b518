use super::fake::{FakeLoader, RecordingSink, FAKE_PATH};
use crate::error::{DiagnosticSink, Error};
use crate::state::{resolve_library, LoadedLibraryState};
use crate::symbols::LIBRARY_PATH_CAPACITY;
use std::path::PathBuf;
use std::sync::Mutex;

#[test]
fn primary_names() {
	let loader = FakeLoader::modern();
	let lib = resolve_library(&loader).unwrap();
	assert_eq!(lib.version_num_symbol().to_str().unwrap(), "OpenSSL_version_num");
	assert_eq!(lib.version_text_symbol().to_str().unwrap(), "OpenSSL_version");
	assert!(!lib.is_legacy());
	assert_eq!(lib.version_number(), 0x1010100f);
	assert_eq!(lib.path().as_c_str().to_str().unwrap(), FAKE_PATH);
	assert_eq!(loader.resolves(), 2);
}

#[test]
fn fallback_names() {
	let loader = FakeLoader::legacy();
	let lib = resolve_library(&loader).unwrap();
	assert_eq!(lib.version_num_symbol().to_str().unwrap(), "SSLeay");
	assert_eq!(lib.version_text_symbol().to_str().unwrap(), "SSLeay_version");
	assert!(lib.is_legacy());
	assert_eq!(lib.version_number(), 0x100020bf);
	assert_eq!(
		lib.version_text(0).unwrap().to_str().unwrap(),
		"OpenSSL 1.0.2k-fips  26 Jan 2017"
	);
	assert_eq!(loader.resolves(), 4);
}

#[test]
fn primary_name_wins() {
	let loader = FakeLoader::both();
	let lib = resolve_library(&loader).unwrap();
	assert_eq!(lib.version_num_symbol().to_str().unwrap(), "OpenSSL_version_num");
	assert_eq!(lib.version_number(), 0x1010100f);
	assert_eq!(lib.version_text(0).unwrap().to_str().unwrap(), "OpenSSL 1.1.1");
}

#[test]
fn unknown_selector() {
	let loader = FakeLoader::modern();
	let lib = resolve_library(&loader).unwrap();
	assert!(lib.version_text(42).is_none());
}

#[test]
fn missing_version_text() {
	let loader = FakeLoader::without_version_text();
	let res = resolve_library(&loader);
	assert_eq!(
		res.err(),
		Some(Error::SymbolNotFound {
			tried: vec!["OpenSSL_version".to_string(), "SSLeay_version".to_string()],
		})
	);
}

#[test]
fn no_introspection() {
	let loader = FakeLoader::modern().with_path(None);
	let lib = resolve_library(&loader).unwrap();
	assert!(lib.path().is_empty());
	assert_eq!(lib.version_number(), 0x1010100f);
}

#[test]
fn long_path() {
	let long = PathBuf::from(format!("/opt/{}/libcrypto.so.3", "x".repeat(150)));
	let loader = FakeLoader::modern().with_path(Some(long.clone()));
	let lib = resolve_library(&loader).unwrap();
	let stored = lib.path().as_c_str().to_bytes();
	assert_eq!(stored.len(), LIBRARY_PATH_CAPACITY - 1);
	assert!(long.to_str().unwrap().as_bytes().starts_with(stored));
}

#[test]
fn state_resolves_once() {
	let loader = FakeLoader::modern();
	let sink = RecordingSink::default();
	let state = LoadedLibraryState::new();
	let first = state.resolve_once(&loader, &sink).unwrap() as *const _;
	for _ in 0..10 {
		let next = state.resolve_once(&loader, &sink).unwrap() as *const _;
		assert_eq!(first, next);
	}
	assert_eq!(loader.opens(), 1);
	assert_eq!(loader.resolves(), 2);
	assert_eq!(state.attempts(), 1);
	assert!(state.last_error().is_none());
	assert!(sink.errors().is_empty());
}

#[test]
fn state_stays_empty_on_failure() {
	let loader = FakeLoader::without_version_text();
	let sink = RecordingSink::default();
	let state = LoadedLibraryState::new();
	assert!(state.resolve_once(&loader, &sink).is_err());
	assert!(state.get().is_none());
	assert!(matches!(
		state.last_error(),
		Some(Error::SymbolNotFound { .. })
	));
}

#[test]
fn state_retries_after_failure() {
	let loader = FakeLoader::broken();
	let sink = RecordingSink::default();
	let state = LoadedLibraryState::new();
	assert!(state.resolve_once(&loader, &sink).is_err());
	assert!(state.resolve_once(&loader, &sink).is_err());
	assert_eq!(sink.errors().len(), 1);
	loader.set_failing(false);
	let lib = state.resolve_once(&loader, &sink).unwrap();
	assert_eq!(lib.version_number(), 0x1010100f);
	assert!(state.last_error().is_none());
	assert_eq!(state.attempts(), 3);
	assert_eq!(loader.opens(), 3);
}

/// Looks at the state it reports for.
struct InspectingSink<'a> {
	state: &'a LoadedLibraryState<()>,
	seen: Mutex<Vec<(bool, Option<Error>)>>,
}

impl DiagnosticSink for InspectingSink<'_> {
	fn report(&self, _error: &Error) {
		let seen = (self.state.get().is_some(), self.state.last_error());
		self.seen.lock().unwrap().push(seen);
	}
}

#[test]
fn sink_may_query_state() {
	let loader = FakeLoader::broken();
	let state = LoadedLibraryState::new();
	let sink = InspectingSink {
		state: &state,
		seen: Mutex::new(Vec::new()),
	};
	assert!(state.resolve_once(&loader, &sink).is_err());
	let seen = sink.seen.lock().unwrap().clone();
	assert_eq!(seen.len(), 1);
	assert!(!seen[0].0);
	assert!(matches!(seen[0].1, Some(Error::LibraryNotFound { .. })));
}

#[test]
fn concurrent_first_calls() {
	let loader = FakeLoader::modern();
	let sink = RecordingSink::default();
	let state = LoadedLibraryState::new();
	std::thread::scope(|s| {
		for _ in 0..8 {
			s.spawn(|| {
				let lib = state.resolve_once(&loader, &sink).unwrap();
				assert_eq!(lib.version_number(), 0x1010100f);
			});
		}
	});
	assert_eq!(loader.opens(), 1);
	assert_eq!(state.attempts(), 1);
}
