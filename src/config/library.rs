use crate::build_info::BuildInfo;
use serde::{de, Deserialize, Deserializer};
use std::path::PathBuf;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(remote = "Self")]
#[serde(deny_unknown_fields)]
pub struct LibraryOptions {
	/// Explicit file to load; when set, no other candidate is tried.
	pub path: Option<PathBuf>,
	/// File names handed to the system loader, in order.
	#[serde(default = "default_library_names")]
	pub names: Vec<String>,
}

impl Default for LibraryOptions {
	fn default() -> Self {
		Self {
			path: None,
			names: default_library_names(),
		}
	}
}

impl<'de> Deserialize<'de> for LibraryOptions {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let unchecked = LibraryOptions::deserialize(deserializer)?;
		if let Some(ref p) = unchecked.path {
			if p.components().count() == 0 {
				return Err(de::Error::custom("the library path must not be empty"));
			}
		}
		if unchecked.path.is_none() && unchecked.names.is_empty() {
			return Err(de::Error::custom(
				"at least one library name must be specified",
			));
		}
		if unchecked.names.iter().any(|n| n.is_empty()) {
			return Err(de::Error::custom("library names must not be empty"));
		}
		Ok(unchecked)
	}
}

fn platform_library_names() -> &'static [&'static str] {
	if cfg!(target_os = "windows") {
		if cfg!(target_pointer_width = "64") {
			&["libcrypto-3-x64.dll", "libcrypto-1_1-x64.dll", "libeay32.dll"]
		} else {
			&["libcrypto-3.dll", "libcrypto-1_1.dll", "libeay32.dll"]
		}
	} else if cfg!(target_os = "macos") {
		&[
			"libcrypto.3.dylib",
			"libcrypto.1.1.dylib",
			"libcrypto.dylib",
		]
	} else {
		&[
			"libcrypto.so.3",
			"libcrypto.so.1.1",
			"libcrypto.so.1.0.0",
			"libcrypto.so",
		]
	}
}

/// The expected library file name first, then the usual names on this
/// platform.
pub fn default_library_names() -> Vec<String> {
	let expected = BuildInfo::CURRENT.dll_name.to_string_lossy().into_owned();
	let mut names = vec![expected];
	for name in platform_library_names() {
		if !names.iter().any(|n| n == name) {
			names.push(name.to_string());
		}
	}
	names
}
