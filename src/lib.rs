//! Version and build metadata of the OpenSSL `libcrypto` loaded at runtime.
//!
//! Values fixed at build time (see [`BuildInfo`]) are kept apart from the
//! values queried from whichever library file the system loader actually
//! opened, so that a mismatch between the two can be detected.
//!
//! ```no_run
//! let info = crypto_info::global();
//! println!("{:#x}", info.openssl());
//! ```

pub mod build_info;
pub mod config;
pub mod error;
pub mod ffi;
pub mod loader;
pub mod report;
pub mod reporter;
pub mod state;
pub mod symbols;
pub mod version;

#[cfg(test)]
mod build_support;

pub use build_info::BuildInfo;
pub use error::{DiagnosticSink, Error, LogSink, Result};
pub use loader::{LibraryLoader, SymbolAddr, SystemLoader};
pub use report::Report;
pub use reporter::{global, Reporter};
pub use symbols::{LibraryPath, VersionSelector, LIBRARY_PATH_CAPACITY};
pub use version::{detect_skew, OpenSslVersion, VersionInfo, VersionSkew, VersionText};
