use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
	/// None of the candidate files could be opened.
	#[error("unable to load the crypto library (tried: {}): {reason}", .tried.join(", "))]
	LibraryNotFound { tried: Vec<String>, reason: String },

	/// Neither the primary nor the fallback name of a required symbol resolved.
	#[error("symbol not found in the crypto library (tried: {})", .tried.join(", "))]
	SymbolNotFound { tried: Vec<String> },

	/// The path of the module backing a symbol could not be determined.
	#[error("unable to find the file backing symbol {symbol}")]
	PathIntrospectionFailed { symbol: String },

	#[error("invalid configuration: {0}")]
	Config(String),
}

impl From<config::ConfigError> for Error {
	fn from(error: config::ConfigError) -> Self {
		Error::Config(error.to_string())
	}
}

impl From<walkdir::Error> for Error {
	fn from(error: walkdir::Error) -> Self {
		let path = error
			.path()
			.map(|p| p.to_path_buf())
			.unwrap_or_else(PathBuf::new);
		Error::Config(format!("{}: {error}", path.display()))
	}
}

/// Host-side channel receiving the failures of the resolution step.
pub trait DiagnosticSink: Send + Sync {
	fn report(&self, error: &Error);
}

/// Default sink: forwards the diagnostic to the `tracing` subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
	fn report(&self, error: &Error) {
		tracing::error!("{error}");
	}
}
