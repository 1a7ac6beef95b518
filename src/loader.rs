use crate::config::LibraryOptions;
use crate::error::{Error, Result};
use libloading::Library;
use std::ffi::{c_void, CStr};
use std::path::PathBuf;
use std::ptr::NonNull;

/// Non-null address of a symbol exported by an open library.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SymbolAddr(NonNull<c_void>);

// The address is only ever turned into a function pointer; the library it
// points into is kept open by whoever holds the handle.
unsafe impl Send for SymbolAddr {}
unsafe impl Sync for SymbolAddr {}

impl SymbolAddr {
	pub fn new(ptr: *const c_void) -> Option<Self> {
		NonNull::new(ptr as *mut c_void).map(Self)
	}

	pub fn as_ptr(&self) -> *const c_void {
		self.0.as_ptr()
	}
}

/// Platform capabilities the symbol table relies on.
pub trait LibraryLoader: Send + Sync {
	type Handle: Send + Sync;

	fn open(&self) -> Result<Self::Handle>;

	fn resolve(&self, handle: &Self::Handle, name: &CStr) -> Option<SymbolAddr>;

	/// Path of the file backing the module that contains `addr`.
	fn describe(&self, handle: &Self::Handle, addr: SymbolAddr) -> Option<PathBuf>;
}

#[derive(Clone, Debug)]
pub struct SystemLoader {
	options: LibraryOptions,
}

impl SystemLoader {
	pub fn new(options: LibraryOptions) -> Self {
		Self { options }
	}

	pub fn candidates(&self) -> Vec<String> {
		match self.options.path {
			Some(ref p) => vec![p.display().to_string()],
			None => self.options.names.clone(),
		}
	}
}

impl LibraryLoader for SystemLoader {
	type Handle = Library;

	#[tracing::instrument(skip(self), level = "debug")]
	fn open(&self) -> Result<Library> {
		let tried = self.candidates();
		let mut reason = String::from("no candidate configured");
		for name in tried.iter() {
			// SAFETY: libcrypto has no initialisation routine with
			// preconditions on the loading thread.
			match unsafe { Library::new(name) } {
				Ok(lib) => {
					tracing::info!("crypto library loaded: {name}");
					return Ok(lib);
				}
				Err(e) => {
					tracing::debug!("unable to load {name}: {e}");
					reason = e.to_string();
				}
			}
		}
		Err(Error::LibraryNotFound { tried, reason })
	}

	fn resolve(&self, handle: &Library, name: &CStr) -> Option<SymbolAddr> {
		// SAFETY: the symbol is read as an untyped address, it is only cast
		// to its function type by the symbol table.
		let sym = unsafe { handle.get::<*const c_void>(name.to_bytes_with_nul()) }.ok()?;
		SymbolAddr::new(*sym)
	}

	fn describe(&self, _handle: &Library, addr: SymbolAddr) -> Option<PathBuf> {
		module_path(addr)
	}
}

#[cfg(unix)]
fn module_path(addr: SymbolAddr) -> Option<PathBuf> {
	use std::ffi::OsStr;
	use std::os::unix::ffi::OsStrExt;

	let mut info: libc::Dl_info = unsafe { std::mem::zeroed() };
	// SAFETY: `addr` belongs to a library that is still loaded and `info` is
	// a valid out-parameter.
	let found = unsafe { libc::dladdr(addr.as_ptr(), &mut info) };
	if found == 0 || info.dli_fname.is_null() {
		return None;
	}
	let name = unsafe { CStr::from_ptr(info.dli_fname) };
	if name.to_bytes().is_empty() {
		return None;
	}
	Some(PathBuf::from(OsStr::from_bytes(name.to_bytes())))
}

#[cfg(windows)]
fn module_path(addr: SymbolAddr) -> Option<PathBuf> {
	use std::ffi::OsString;
	use std::os::windows::ffi::OsStringExt;

	const GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS: u32 = 0x4;
	const GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT: u32 = 0x2;
	const MAX_PATH_LEN: usize = 32_768;

	extern "system" {
		fn GetModuleHandleExW(flags: u32, name: *const c_void, module: *mut *mut c_void) -> i32;
		fn GetModuleFileNameW(module: *mut c_void, filename: *mut u16, size: u32) -> u32;
	}

	let mut module: *mut c_void = std::ptr::null_mut();
	let flags = GET_MODULE_HANDLE_EX_FLAG_FROM_ADDRESS | GET_MODULE_HANDLE_EX_FLAG_UNCHANGED_REFCOUNT;
	// SAFETY: with FROM_ADDRESS the name parameter is an address inside the
	// module, and the refcount is left unchanged.
	if unsafe { GetModuleHandleExW(flags, addr.as_ptr(), &mut module) } == 0 || module.is_null() {
		return None;
	}
	let mut buf = vec![0u16; MAX_PATH_LEN];
	let len = unsafe { GetModuleFileNameW(module, buf.as_mut_ptr(), buf.len() as u32) } as usize;
	if len == 0 || len >= buf.len() {
		return None;
	}
	Some(PathBuf::from(OsString::from_wide(&buf[..len])))
}

#[cfg(not(any(unix, windows)))]
fn module_path(_addr: SymbolAddr) -> Option<PathBuf> {
	None
}
