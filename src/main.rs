mod cli;
mod log;

use crate::cli::{CliArgs, Format};
use anyhow::{Context, Result};
use clap::Parser;
use crypto_info::config::{self, CryptoInfoConfig};
use crypto_info::{Report, Reporter, SystemLoader};
use std::ffi::CStr;
use std::io::Write;
use std::process;

pub const APP_IDENTITY: &CStr = c"crypto-info";
pub const DEFAULT_LOG_LEVEL: log::Level = log::Level::Warn;

fn main() {
	// Load the command-line interface
	let args = CliArgs::parse();

	// Initialize the logging system
	let output = log::Output::from_flags(args.log.log_syslog);
	if let Err(e) = log::init(args.log_level, output, APP_IDENTITY) {
		eprintln!("error while initializing the logging system: {e:#}");
		process::exit(3)
	}

	// Load the configuration
	let cfg = match load_config(&args) {
		Ok(cfg) => cfg,
		Err(e) => {
			eprintln!("error while loading the configuration: {e:#}");
			process::exit(2)
		}
	};

	let reporter = Reporter::new(SystemLoader::new(cfg.library));
	let report = reporter.report();
	if let Err(e) = print_report(&report, args.format) {
		eprintln!("error while printing the report: {e:#}");
		process::exit(3)
	}
	if !report.is_available() {
		process::exit(1)
	}
}

fn load_config(args: &CliArgs) -> Result<CryptoInfoConfig> {
	let mut cfg = match args.config {
		Some(ref path) => config::load(path)
			.with_context(|| format!("{}", path.display()))?,
		None => config::load_from_env()?,
	};
	if let Some(ref library) = args.library {
		cfg.library.path = Some(library.clone());
	}
	Ok(cfg)
}

#[tracing::instrument(skip(report), err)]
fn print_report(report: &Report, format: Format) -> Result<()> {
	let mut stdout = std::io::stdout().lock();
	match format {
		Format::Text => write!(stdout, "{report}")?,
		Format::Json => {
			serde_json::to_writer_pretty(&mut stdout, report)?;
			writeln!(stdout)?;
		}
	}
	stdout.flush()?;
	Ok(())
}
