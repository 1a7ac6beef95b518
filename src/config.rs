mod library;

pub use library::*;

use crate::error::{Error, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const ALLOWED_FILE_EXT: &[&str] = &["toml"];

/// Location of the configuration, used when no explicit path is given.
pub const CONFIG_ENV_VAR: &str = "CRYPTO_INFO_CONFIG";
/// Overrides `library.path`.
pub const LIBRARY_ENV_VAR: &str = "CRYPTO_INFO_LIBRARY";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CryptoInfoConfig {
	#[serde(default)]
	pub library: LibraryOptions,
}

/// Loads every TOML file under `config_path` (a file or a directory).
pub fn load<P: AsRef<Path>>(config_path: P) -> Result<CryptoInfoConfig> {
	let config_path = config_path.as_ref();
	tracing::debug!("loading configuration: {config_path:?}");
	let settings = Config::builder()
		.add_source(
			get_files(config_path)?
				.iter()
				.map(|path| File::from(path.as_path()))
				.collect::<Vec<_>>(),
		)
		.set_override_option("library.path", std::env::var(LIBRARY_ENV_VAR).ok())?
		.build()?;
	tracing::trace!("loaded config: {settings:?}");
	let config: CryptoInfoConfig = settings.try_deserialize()?;
	tracing::debug!("computed config: {config:?}");
	Ok(config)
}

/// Configuration for the process-wide reporter: `CRYPTO_INFO_CONFIG` when
/// set, the defaults otherwise.
pub fn load_from_env() -> Result<CryptoInfoConfig> {
	match std::env::var_os(CONFIG_ENV_VAR) {
		Some(path) => load(PathBuf::from(path)),
		None => {
			let mut cfg = CryptoInfoConfig::default();
			if let Ok(path) = std::env::var(LIBRARY_ENV_VAR) {
				cfg.library.path = Some(PathBuf::from(path));
			}
			Ok(cfg)
		}
	}
}

fn get_files(config_path: &Path) -> Result<Vec<PathBuf>> {
	let mut file_lst = Vec::new();
	for entry in WalkDir::new(config_path).follow_links(true) {
		let path = entry?.path().to_path_buf();
		if path.is_file() {
			if let Some(ext) = path.extension() {
				if ALLOWED_FILE_EXT.iter().any(|&e| e == ext) {
					std::fs::File::open(&path)
						.map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
					file_lst.push(path);
				}
			}
		}
	}
	file_lst.sort();
	tracing::debug!("configuration files found: {file_lst:?}");
	Ok(file_lst)
}

#[cfg(test)]
fn load_str<'de, T: serde::de::Deserialize<'de>>(config_str: &str) -> Result<T> {
	let settings = Config::builder()
		.add_source(File::from_str(config_str, config::FileFormat::Toml))
		.build()?;
	let config: T = settings.try_deserialize()?;
	Ok(config)
}
