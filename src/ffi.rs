//! C ABI of the process-wide reporter.
//!
//! Every returned string is NUL-terminated and lives until the process
//! exits: callers must neither free nor modify it. Runtime accessors return
//! NULL or 0 when the crypto library could not be loaded; the cause is sent
//! to the log once.

use crate::reporter::global;
use std::ffi::{c_char, c_int, CStr};
use std::ptr;

fn c_ptr(s: Option<&CStr>) -> *const c_char {
	s.map_or(ptr::null(), CStr::as_ptr)
}

#[no_mangle]
pub extern "C" fn crypto_info_native_version() -> *const c_char {
	global().native_version().as_ptr()
}

#[no_mangle]
pub extern "C" fn crypto_info_native_date() -> *const c_char {
	global().native_date().as_ptr()
}

#[no_mangle]
pub extern "C" fn crypto_info_native_timestamp() -> *const c_char {
	global().native_timestamp().as_ptr()
}

#[no_mangle]
pub extern "C" fn crypto_info_native_name() -> *const c_char {
	global().native_name().as_ptr()
}

#[no_mangle]
pub extern "C" fn crypto_info_header_version_text() -> *const c_char {
	global().header_version_text().as_ptr()
}

#[no_mangle]
pub extern "C" fn crypto_info_header_version_number() -> u64 {
	global().header_version_number()
}

#[no_mangle]
pub extern "C" fn crypto_info_dll_name() -> *const c_char {
	global().dll_name().as_ptr()
}

/// Version number of the loaded library, or 0.
#[no_mangle]
pub extern "C" fn crypto_info_openssl() -> u64 {
	global().openssl()
}

/// Version string for `selector`, or NULL.
#[no_mangle]
pub extern "C" fn crypto_info_openssl_version(selector: c_int) -> *const c_char {
	c_ptr(global().openssl_version(selector))
}

/// Path of the loaded library file (at most 79 bytes), or NULL.
#[no_mangle]
pub extern "C" fn crypto_info_dll_path() -> *const c_char {
	c_ptr(global().dll_path())
}

/// 1 if the library is loaded, 0 otherwise.
#[no_mangle]
pub extern "C" fn crypto_info_is_loaded() -> c_int {
	c_int::from(global().is_loaded())
}
