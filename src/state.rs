use crate::error::{DiagnosticSink, Error, Result};
use crate::loader::LibraryLoader;
use crate::symbols::{
	LibraryPath, VersionNumFn, VersionTextFn, VERSION_NUM, VERSION_TEXT,
};
use std::ffi::{c_int, CStr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

/// A library whose two version symbols have been resolved.
///
/// The handle is held for as long as this value lives, so the function
/// pointers stay valid.
pub struct LoadedLibrary<H> {
	_handle: H,
	version_num: VersionNumFn,
	version_text: VersionTextFn,
	version_num_symbol: &'static CStr,
	version_text_symbol: &'static CStr,
	legacy: bool,
	path: LibraryPath,
}

impl<H> LoadedLibrary<H> {
	pub fn version_number(&self) -> u64 {
		// SAFETY: resolved from `OpenSSL_version_num` or `SSLeay`, both take
		// no argument and return an unsigned long.
		u64::from(unsafe { (self.version_num)() })
	}

	pub fn version_text(&self, selector: c_int) -> Option<&CStr> {
		// SAFETY: `OpenSSL_version` and `SSLeay_version` return either NULL
		// or a static string owned by the library.
		let ptr = unsafe { (self.version_text)(selector) };
		if ptr.is_null() {
			return None;
		}
		Some(unsafe { CStr::from_ptr(ptr) })
	}

	pub fn path(&self) -> &LibraryPath {
		&self.path
	}

	pub fn version_num_symbol(&self) -> &'static CStr {
		self.version_num_symbol
	}

	pub fn version_text_symbol(&self) -> &'static CStr {
		self.version_text_symbol
	}

	/// True when the version strings are served by `SSLeay_version`.
	pub fn is_legacy(&self) -> bool {
		self.legacy
	}
}

#[tracing::instrument(skip_all, level = "debug")]
pub fn resolve_library<L: LibraryLoader>(loader: &L) -> Result<LoadedLibrary<L::Handle>> {
	let handle = loader.open()?;
	let num = VERSION_NUM.resolve(loader, &handle)?;
	let path = match loader.describe(&handle, num.addr) {
		Some(p) => {
			tracing::debug!("crypto library file: {}", p.display());
			LibraryPath::from_path(&p)
		}
		None => {
			let e = Error::PathIntrospectionFailed {
				symbol: num.name.to_string_lossy().into_owned(),
			};
			tracing::debug!("{e}");
			LibraryPath::empty()
		}
	};
	let text = VERSION_TEXT.resolve(loader, &handle)?;
	let legacy = text.is_fallback(&VERSION_TEXT);
	// SAFETY: both addresses come from symbols whose C prototypes match the
	// function pointer types.
	let (version_num, version_text) = unsafe {
		(
			std::mem::transmute::<*const std::ffi::c_void, VersionNumFn>(num.addr.as_ptr()),
			std::mem::transmute::<*const std::ffi::c_void, VersionTextFn>(text.addr.as_ptr()),
		)
	};
	Ok(LoadedLibrary {
		_handle: handle,
		version_num,
		version_text,
		version_num_symbol: num.name,
		version_text_symbol: text.name,
		legacy,
		path,
	})
}

/// One-shot resolution state.
///
/// The first successful resolution is kept for the lifetime of the state;
/// a failed attempt leaves it empty so that the next caller retries.
/// Concurrent first callers are serialised.
pub struct LoadedLibraryState<H> {
	loaded: OnceLock<LoadedLibrary<H>>,
	last_error: Mutex<Option<Error>>,
	attempts: AtomicUsize,
}

impl<H: Send + Sync> LoadedLibraryState<H> {
	pub const fn new() -> Self {
		Self {
			loaded: OnceLock::new(),
			last_error: Mutex::new(None),
			attempts: AtomicUsize::new(0),
		}
	}

	pub fn get(&self) -> Option<&LoadedLibrary<H>> {
		self.loaded.get()
	}

	pub fn resolve_once<L>(&self, loader: &L, sink: &dyn DiagnosticSink) -> Result<&LoadedLibrary<H>>
	where
		L: LibraryLoader<Handle = H>,
	{
		if let Some(lib) = self.loaded.get() {
			return Ok(lib);
		}
		let mut last_error = self
			.last_error
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		if let Some(lib) = self.loaded.get() {
			return Ok(lib);
		}
		self.attempts.fetch_add(1, Ordering::Relaxed);
		match resolve_library(loader) {
			Ok(lib) => {
				*last_error = None;
				Ok(self.loaded.get_or_init(|| lib))
			}
			Err(e) => {
				let repeated = last_error.as_ref() == Some(&e);
				*last_error = Some(e.clone());
				// The sink may query this state again.
				drop(last_error);
				if repeated {
					tracing::debug!("crypto library still unavailable: {e}");
				} else {
					sink.report(&e);
				}
				Err(e)
			}
		}
	}

	pub fn last_error(&self) -> Option<Error> {
		self.last_error
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	/// Number of times the resolution work actually ran.
	pub fn attempts(&self) -> usize {
		self.attempts.load(Ordering::Relaxed)
	}
}

impl<H: Send + Sync> Default for LoadedLibraryState<H> {
	fn default() -> Self {
		Self::new()
	}
}
