//! Values fixed when this crate was built.
//!
//! The header version is read from the `opensslv.h` the build found (or the
//! `CRYPTO_INFO_HEADER_VERSION_*` build variables), so it describes the
//! library this crate was built against, not the one loaded at runtime.

use std::ffi::CStr;

const fn c_str(bytes: &'static [u8]) -> &'static CStr {
	match CStr::from_bytes_with_nul(bytes) {
		Ok(s) => s,
		Err(_) => panic!("build value contains a NUL byte"),
	}
}

const fn parse_decimal(s: &str) -> u64 {
	let b = s.as_bytes();
	let mut i = 0;
	let mut n: u64 = 0;
	while i < b.len() {
		n = n * 10 + (b[i] - b'0') as u64;
		i += 1;
	}
	n
}

pub const TARGET: Option<&str> = option_env!("CRYPTO_INFO_TARGET");
pub const LOADER_AGENT: Option<&str> = option_env!("CRYPTO_INFO_LOADER_AGENT");

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BuildInfo {
	pub native_version: &'static CStr,
	/// Build date alone, like the C `__DATE__`.
	pub native_date: &'static CStr,
	pub native_timestamp: &'static CStr,
	pub native_name: &'static CStr,
	pub header_version_text: &'static CStr,
	pub header_version_number: u64,
	pub dll_name: &'static CStr,
}

impl BuildInfo {
	pub const CURRENT: BuildInfo = BuildInfo {
		native_version: c_str(concat!(env!("CRYPTO_INFO_NATIVE_VERSION"), "\0").as_bytes()),
		native_date: c_str(concat!(env!("CRYPTO_INFO_NATIVE_DATE"), "\0").as_bytes()),
		native_timestamp: c_str(concat!(env!("CRYPTO_INFO_NATIVE_TIMESTAMP"), "\0").as_bytes()),
		native_name: c_str(concat!(env!("CRYPTO_INFO_NATIVE_NAME"), "\0").as_bytes()),
		header_version_text: c_str(
			concat!(env!("CRYPTO_INFO_HEADER_VERSION_TEXT"), "\0").as_bytes(),
		),
		header_version_number: parse_decimal(env!("CRYPTO_INFO_HEADER_VERSION_NUMBER")),
		dll_name: c_str(concat!(env!("CRYPTO_INFO_DLL_NAME"), "\0").as_bytes()),
	};
}

impl Default for BuildInfo {
	fn default() -> Self {
		Self::CURRENT
	}
}
