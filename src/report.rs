use crate::loader::LibraryLoader;
use crate::reporter::Reporter;
use crate::symbols::VersionSelector;
use crate::version::{VersionInfo, VersionSkew};
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::CStr;
use std::fmt;

fn lossy(s: &CStr) -> String {
	s.to_string_lossy().into_owned()
}

#[derive(Clone, Debug, Serialize)]
pub struct BuildSection {
	pub native_version: String,
	pub native_name: String,
	pub native_date: String,
	pub native_timestamp: String,
	pub header_version_text: String,
	pub header_version_number: u64,
	pub header_version: Option<VersionInfo>,
	pub dll_name: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct RuntimeSection {
	pub version_number: u64,
	pub version: Option<VersionInfo>,
	pub dll_path: Option<String>,
	pub version_num_symbol: String,
	pub version_text_symbol: String,
	pub strings: BTreeMap<&'static str, String>,
}

/// Everything the reporter knows, as owned values.
#[derive(Clone, Debug, Serialize)]
pub struct Report {
	pub build: BuildSection,
	pub runtime: Option<RuntimeSection>,
	pub skew: Option<VersionSkew>,
	pub error: Option<String>,
}

impl Report {
	pub fn collect<L: LibraryLoader>(reporter: &Reporter<L>) -> Self {
		let header_number = reporter.header_version_number();
		let build = BuildSection {
			native_version: lossy(reporter.native_version()),
			native_name: lossy(reporter.native_name()),
			native_date: lossy(reporter.native_date()),
			native_timestamp: lossy(reporter.native_timestamp()),
			header_version_text: lossy(reporter.header_version_text()),
			header_version_number: header_number,
			header_version: VersionInfo::detect(
				header_number,
				reporter.header_version_text().to_str().ok(),
			),
			dll_name: lossy(reporter.dll_name()),
		};
		let runtime = reporter.matched_symbols().map(|(num_sym, text_sym)| {
			let number = reporter.openssl();
			let strings: BTreeMap<&'static str, String> = VersionSelector::ALL
				.iter()
				.filter_map(|s| reporter.openssl_version_of(*s).map(|v| (s.name(), lossy(v))))
				.collect();
			RuntimeSection {
				version_number: number,
				version: VersionInfo::detect(
					number,
					strings.get(VersionSelector::Version.name()).map(String::as_str),
				),
				dll_path: reporter
					.dll_path()
					.filter(|p| !p.to_bytes().is_empty())
					.map(lossy),
				version_num_symbol: lossy(num_sym),
				version_text_symbol: lossy(text_sym),
				strings,
			}
		});
		let skew = match (&build.header_version, runtime.as_ref().and_then(|r| r.version.as_ref())) {
			(Some(header), Some(running)) => header.skew_with(running),
			_ => None,
		};
		let error = reporter.init_error().map(|e| e.to_string());
		Self {
			build,
			runtime,
			skew,
			error,
		}
	}

	pub fn is_available(&self) -> bool {
		self.runtime.is_some()
	}
}

impl fmt::Display for Report {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let b = &self.build;
		writeln!(f, "{} {} (built {})", b.native_name, b.native_version, b.native_timestamp)?;
		writeln!(f, "Headers:")?;
		writeln!(f, " - text: {}", b.header_version_text)?;
		write!(f, " - number: {:#x}", b.header_version_number)?;
		if let Some(ref v) = b.header_version {
			write!(f, " ({v})")?;
		}
		writeln!(f)?;
		writeln!(f, " - library: {}", b.dll_name)?;
		match self.runtime {
			Some(ref r) => {
				writeln!(f, "Runtime:")?;
				write!(f, " - number: {:#x}", r.version_number)?;
				if let Some(ref v) = r.version {
					write!(f, " ({v})")?;
				}
				writeln!(f)?;
				writeln!(
					f,
					" - path: {}",
					r.dll_path.as_deref().unwrap_or("unknown")
				)?;
				writeln!(
					f,
					" - symbols: {}, {}",
					r.version_num_symbol, r.version_text_symbol
				)?;
				for (name, value) in r.strings.iter() {
					writeln!(f, " - {name}: {value}")?;
				}
			}
			None => {
				writeln!(f, "Runtime: unavailable")?;
				if let Some(ref e) = self.error {
					writeln!(f, " - error: {e}")?;
				}
			}
		}
		if let Some(ref s) = self.skew {
			writeln!(f, "Warning: {s}")?;
		}
		Ok(())
	}
}
