use crate::log::Level;
use clap::{Args, Parser, ValueEnum};
use crypto_info::BuildInfo;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, long_version = get_long_version(), about, long_about = None)]
pub struct CliArgs {
	/// Path to the configuration file or directory (default: $CRYPTO_INFO_CONFIG)
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Load this library file instead of searching for one
	#[arg(short, long, value_name = "FILE")]
	pub library: Option<PathBuf>,

	/// Output format
	#[arg(long, value_name = "FORMAT", value_enum, default_value_t = Format::Text)]
	pub format: Format,

	/// Specify the log level
	#[arg(long, value_name = "LEVEL", value_enum, default_value_t = crate::DEFAULT_LOG_LEVEL)]
	pub log_level: Level,

	#[command(flatten)]
	pub log: Log,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
	Text,
	Json,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
pub struct Log {
	/// Sends log messages via syslog
	#[arg(long)]
	pub log_syslog: bool,

	/// Prints log messages to the standard error output
	#[arg(long)]
	pub log_stderr: bool,
}

fn get_long_version() -> String {
	let build = BuildInfo::CURRENT;
	let mut version = format!(
		"{} built for {}\n\nCryptographic library:\n - headers: {}\n - expected file: {}",
		env!("CARGO_PKG_VERSION"),
		crypto_info::build_info::TARGET.unwrap_or("an unknown target"),
		build.header_version_text.to_string_lossy(),
		build.dll_name.to_string_lossy(),
	);
	if let Some(agent) = crypto_info::build_info::LOADER_AGENT {
		version.push_str(&format!("\nDynamic loader library:\n - {agent}"));
	}
	version
}
