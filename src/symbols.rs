use crate::error::{Error, Result};
use crate::loader::{LibraryLoader, SymbolAddr};
use std::ffi::{c_char, c_int, c_ulong, CStr};
use std::fmt;
use std::path::Path;

pub type VersionNumFn = unsafe extern "C" fn() -> c_ulong;
pub type VersionTextFn = unsafe extern "C" fn(c_int) -> *const c_char;

/// Size of the library path buffer, terminating NUL included.
pub const LIBRARY_PATH_CAPACITY: usize = 80;

const fn c_str(bytes: &'static [u8]) -> &'static CStr {
	match CStr::from_bytes_with_nul(bytes) {
		Ok(s) => s,
		Err(_) => panic!("invalid symbol name"),
	}
}

/// Ordered list of names under which a logical symbol may be exported.
#[derive(Clone, Copy, Debug)]
pub struct SymbolCandidates {
	pub names: &'static [&'static CStr],
}

pub const VERSION_NUM: SymbolCandidates = SymbolCandidates {
	names: &[c_str(b"OpenSSL_version_num\0"), c_str(b"SSLeay\0")],
};

pub const VERSION_TEXT: SymbolCandidates = SymbolCandidates {
	names: &[c_str(b"OpenSSL_version\0"), c_str(b"SSLeay_version\0")],
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedSymbol {
	pub name: &'static CStr,
	pub addr: SymbolAddr,
}

impl ResolvedSymbol {
	/// True when a name other than the first candidate matched.
	pub fn is_fallback(&self, candidates: &SymbolCandidates) -> bool {
		candidates.names.first().map_or(false, |n| *n != self.name)
	}
}

impl SymbolCandidates {
	pub fn resolve<L: LibraryLoader>(&self, loader: &L, handle: &L::Handle) -> Result<ResolvedSymbol> {
		for name in self.names {
			match loader.resolve(handle, name) {
				Some(addr) => {
					tracing::debug!("symbol resolved: {}", name.to_string_lossy());
					return Ok(ResolvedSymbol { name, addr });
				}
				None => tracing::trace!("symbol not exported: {}", name.to_string_lossy()),
			}
		}
		Err(Error::SymbolNotFound {
			tried: self
				.names
				.iter()
				.map(|n| n.to_string_lossy().into_owned())
				.collect(),
		})
	}
}

/// Fixed-size, always NUL-terminated copy of the loaded library's path.
///
/// Longer paths are silently truncated to `LIBRARY_PATH_CAPACITY - 1` bytes.
#[derive(Clone, Copy, Eq, PartialEq)]
pub struct LibraryPath {
	buf: [u8; LIBRARY_PATH_CAPACITY],
}

impl LibraryPath {
	pub const fn empty() -> Self {
		Self {
			buf: [0; LIBRARY_PATH_CAPACITY],
		}
	}

	pub fn from_bytes(bytes: &[u8]) -> Self {
		let mut ret = Self::empty();
		let bytes = match bytes.iter().position(|&b| b == 0) {
			Some(nul) => &bytes[..nul],
			None => bytes,
		};
		let len = bytes.len().min(LIBRARY_PATH_CAPACITY - 1);
		ret.buf[..len].copy_from_slice(&bytes[..len]);
		ret
	}

	pub fn from_path(path: &Path) -> Self {
		#[cfg(unix)]
		{
			use std::os::unix::ffi::OsStrExt;
			Self::from_bytes(path.as_os_str().as_bytes())
		}
		#[cfg(not(unix))]
		{
			Self::from_bytes(path.to_string_lossy().as_bytes())
		}
	}

	pub fn as_c_str(&self) -> &CStr {
		// The last byte is never written, a NUL is always present.
		CStr::from_bytes_until_nul(&self.buf).unwrap_or_default()
	}

	pub fn is_empty(&self) -> bool {
		self.buf[0] == 0
	}
}

impl Default for LibraryPath {
	fn default() -> Self {
		Self::empty()
	}
}

impl fmt::Debug for LibraryPath {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "LibraryPath({:?})", self.as_c_str())
	}
}

/// Version component strings the library can report.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VersionSelector {
	Version,
	CFlags,
	BuiltOn,
	Platform,
	Dir,
	EnginesDir,
}

impl VersionSelector {
	pub const ALL: [VersionSelector; 6] = [
		VersionSelector::Version,
		VersionSelector::CFlags,
		VersionSelector::BuiltOn,
		VersionSelector::Platform,
		VersionSelector::Dir,
		VersionSelector::EnginesDir,
	];

	/// Raw selector value; `SSLeay_version` uses a different numbering and
	/// has no engines directory.
	pub fn to_raw(self, legacy: bool) -> Option<c_int> {
		let v = match (self, legacy) {
			(Self::Version, _) => 0,
			(Self::CFlags, false) => 1,
			(Self::BuiltOn, false) => 2,
			(Self::Platform, false) => 3,
			(Self::Dir, false) => 4,
			(Self::EnginesDir, false) => 5,
			(Self::CFlags, true) => 2,
			(Self::BuiltOn, true) => 3,
			(Self::Platform, true) => 4,
			(Self::Dir, true) => 5,
			(Self::EnginesDir, true) => return None,
		};
		Some(v)
	}

	pub fn name(self) -> &'static str {
		match self {
			Self::Version => "version",
			Self::CFlags => "cflags",
			Self::BuiltOn => "built_on",
			Self::Platform => "platform",
			Self::Dir => "dir",
			Self::EnginesDir => "engines_dir",
		}
	}
}
