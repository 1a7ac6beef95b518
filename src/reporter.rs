use crate::build_info::BuildInfo;
use crate::config;
use crate::error::{DiagnosticSink, Error, LogSink};
use crate::loader::{LibraryLoader, SystemLoader};
use crate::report::Report;
use crate::state::{LoadedLibrary, LoadedLibraryState};
use crate::symbols::VersionSelector;
use std::ffi::{c_int, CStr};
use std::sync::OnceLock;

/// Build and runtime metadata of the crypto library.
///
/// Build-time accessors never touch the library. Runtime accessors load it
/// on first use and return `0` or `None` when it is unavailable.
pub struct Reporter<L: LibraryLoader> {
	loader: L,
	build: BuildInfo,
	state: LoadedLibraryState<L::Handle>,
	sink: Box<dyn DiagnosticSink>,
}

impl<L: LibraryLoader> Reporter<L> {
	pub fn new(loader: L) -> Self {
		Self {
			loader,
			build: BuildInfo::CURRENT,
			state: LoadedLibraryState::new(),
			sink: Box::new(LogSink),
		}
	}

	pub fn with_build_info(mut self, build: BuildInfo) -> Self {
		self.build = build;
		self
	}

	pub fn with_diagnostic_sink<S: DiagnosticSink + 'static>(mut self, sink: S) -> Self {
		self.sink = Box::new(sink);
		self
	}

	pub fn loader(&self) -> &L {
		&self.loader
	}

	fn library(&self) -> Option<&LoadedLibrary<L::Handle>> {
		self.state.resolve_once(&self.loader, self.sink.as_ref()).ok()
	}

	pub fn native_version(&self) -> &'static CStr {
		self.build.native_version
	}

	pub fn native_date(&self) -> &'static CStr {
		self.build.native_date
	}

	pub fn native_timestamp(&self) -> &'static CStr {
		self.build.native_timestamp
	}

	pub fn native_name(&self) -> &'static CStr {
		self.build.native_name
	}

	pub fn header_version_text(&self) -> &'static CStr {
		self.build.header_version_text
	}

	pub fn header_version_number(&self) -> u64 {
		self.build.header_version_number
	}

	pub fn dll_name(&self) -> &'static CStr {
		self.build.dll_name
	}

	/// Version number reported by the loaded library, 0 if unavailable.
	pub fn openssl(&self) -> u64 {
		self.library().map_or(0, |lib| lib.version_number())
	}

	/// Version string for a raw selector, passed as is to the library.
	pub fn openssl_version(&self, selector: c_int) -> Option<&CStr> {
		self.library()?.version_text(selector)
	}

	/// Version string for a selector, numbered according to the symbol that
	/// was actually resolved.
	pub fn openssl_version_of(&self, selector: VersionSelector) -> Option<&CStr> {
		let lib = self.library()?;
		let raw = selector.to_raw(lib.is_legacy())?;
		lib.version_text(raw)
	}

	/// Path of the loaded file, empty if it could not be determined.
	pub fn dll_path(&self) -> Option<&CStr> {
		self.library().map(|lib| lib.path().as_c_str())
	}

	/// Loads the library if needed and tells whether it is usable.
	pub fn is_loaded(&self) -> bool {
		self.library().is_some()
	}

	/// Error of the last failed load, if the library is not loaded.
	pub fn init_error(&self) -> Option<Error> {
		if self.state.get().is_some() {
			return None;
		}
		self.state.last_error()
	}

	/// Names of the version number and version string symbols that matched.
	pub fn matched_symbols(&self) -> Option<(&'static CStr, &'static CStr)> {
		self.library()
			.map(|lib| (lib.version_num_symbol(), lib.version_text_symbol()))
	}

	pub fn resolution_attempts(&self) -> usize {
		self.state.attempts()
	}

	pub fn report(&self) -> Report {
		Report::collect(self)
	}
}

static GLOBAL: OnceLock<Reporter<SystemLoader>> = OnceLock::new();

/// The process-wide reporter, configured from the environment.
pub fn global() -> &'static Reporter<SystemLoader> {
	GLOBAL.get_or_init(|| {
		let cfg = match config::load_from_env() {
			Ok(cfg) => cfg,
			Err(e) => {
				tracing::warn!("{e}, using the default configuration");
				config::CryptoInfoConfig::default()
			}
		};
		Reporter::new(SystemLoader::new(cfg.library))
	})
}
