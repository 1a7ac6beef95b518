extern crate serde;
extern crate toml;

use serde::Deserialize;
use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

include!("src/build_support.rs");

const UNKNOWN_VERSION_TEXT: &str = "unknown";

macro_rules! set_rustc_env_var {
	($name: expr, $value: expr) => {{
		println!("cargo:rustc-env={}={}", $name, $value);
	}};
}

macro_rules! set_env_var_or_default {
	($name: expr, $default_value: expr) => {{
		println!("cargo:rerun-if-env-changed={}", $name);
		match env::var($name) {
			Ok(v) => set_rustc_env_var!($name, v),
			Err(_) => set_rustc_env_var!($name, $default_value),
		}
	}};
}

#[derive(Deserialize)]
pub struct LockFile {
	package: Vec<Package>,
}

#[derive(Deserialize)]
struct Package {
	name: String,
	version: String,
}

struct Error;

impl From<std::io::Error> for Error {
	fn from(_error: std::io::Error) -> Self {
		Error {}
	}
}

impl From<toml::de::Error> for Error {
	fn from(_error: toml::de::Error) -> Self {
		Error {}
	}
}

fn get_lock_file() -> Result<LockFile, Error> {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	path.push("Cargo.lock");
	let mut file = File::open(path)?;
	let mut contents = String::new();
	file.read_to_string(&mut contents)?;
	let ret: LockFile = toml::from_str(&contents)?;
	Ok(ret)
}

fn set_loader_agent() {
	let lock = match get_lock_file() {
		Ok(l) => l,
		Err(_) => {
			return;
		}
	};
	for p in lock.package.iter() {
		if p.name == "libloading" {
			let agent = format!("{}/{}", p.name, p.version);
			set_rustc_env_var!("CRYPTO_INFO_LOADER_AGENT", agent);
			return;
		}
	}
}

fn set_target() {
	if let Ok(target) = env::var("TARGET") {
		set_rustc_env_var!("CRYPTO_INFO_TARGET", target);
	};
}

fn default_dll_name() -> &'static str {
	match env::var("CARGO_CFG_TARGET_OS").as_deref() {
		Ok("windows") => match env::var("CARGO_CFG_TARGET_POINTER_WIDTH").as_deref() {
			Ok("64") => "libcrypto-3-x64.dll",
			_ => "libcrypto-3.dll",
		},
		Ok("macos") | Ok("ios") => "libcrypto.3.dylib",
		_ => "libcrypto.so.3",
	}
}

fn set_native_info() {
	set_env_var_or_default!("CRYPTO_INFO_NATIVE_VERSION", env!("CARGO_PKG_VERSION"));
	set_env_var_or_default!("CRYPTO_INFO_NATIVE_NAME", env!("CARGO_PKG_NAME"));
	set_env_var_or_default!("CRYPTO_INFO_DLL_NAME", default_dll_name());
}

fn set_timestamp() {
	println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
	let secs = match env::var("SOURCE_DATE_EPOCH") {
		Ok(v) => v.trim().parse::<u64>().ok(),
		Err(_) => None,
	};
	let secs = secs.unwrap_or_else(|| {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or(0)
	});
	set_rustc_env_var!("CRYPTO_INFO_NATIVE_DATE", format_date(secs));
	set_rustc_env_var!("CRYPTO_INFO_NATIVE_TIMESTAMP", format_timestamp(secs));
}

fn get_include_dirs() -> Vec<PathBuf> {
	let mut dirs = Vec::new();
	if let Ok(d) = env::var("OPENSSL_INCLUDE_DIR") {
		dirs.push(PathBuf::from(d));
	}
	if let Ok(d) = env::var("OPENSSL_DIR") {
		dirs.push(Path::new(&d).join("include"));
	}
	for d in ["/usr/include", "/usr/local/include", "/opt/homebrew/include"] {
		dirs.push(PathBuf::from(d));
	}
	dirs
}

fn find_header_version() -> HeaderVersion {
	for dir in get_include_dirs() {
		let path = dir.join("openssl").join("opensslv.h");
		if let Ok(contents) = std::fs::read_to_string(&path) {
			println!("cargo:rerun-if-changed={}", path.display());
			return parse_opensslv(&contents);
		}
	}
	HeaderVersion::default()
}

fn set_header_version() {
	for name in [
		"CRYPTO_INFO_HEADER_VERSION_TEXT",
		"CRYPTO_INFO_HEADER_VERSION_NUMBER",
		"OPENSSL_INCLUDE_DIR",
		"OPENSSL_DIR",
	] {
		println!("cargo:rerun-if-env-changed={}", name);
	}
	let found = find_header_version();
	let text = env::var("CRYPTO_INFO_HEADER_VERSION_TEXT")
		.ok()
		.or(found.text.clone())
		.unwrap_or_else(|| UNKNOWN_VERSION_TEXT.to_string());
	let number = env::var("CRYPTO_INFO_HEADER_VERSION_NUMBER")
		.ok()
		.and_then(|v| parse_c_integer(&v))
		.or_else(|| found.number())
		.unwrap_or(0);
	set_rustc_env_var!("CRYPTO_INFO_HEADER_VERSION_TEXT", text);
	set_rustc_env_var!("CRYPTO_INFO_HEADER_VERSION_NUMBER", number);
}

fn main() {
	println!("cargo:rerun-if-changed=src/build_support.rs");
	set_target();
	set_loader_agent();
	set_native_info();
	set_timestamp();
	set_header_version();
}
