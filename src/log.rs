use anyhow::{Context, Result};
use clap::ValueEnum;
use std::ffi::CStr;
use tracing_subscriber::FmtSubscriber;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Level {
	Error,
	Warn,
	Info,
	Debug,
	Trace,
}

impl From<Level> for tracing::Level {
	fn from(level: Level) -> Self {
		match level {
			Level::Error => tracing::Level::ERROR,
			Level::Warn => tracing::Level::WARN,
			Level::Info => tracing::Level::INFO,
			Level::Debug => tracing::Level::DEBUG,
			Level::Trace => tracing::Level::TRACE,
		}
	}
}

/// Where log messages go. The report itself always goes to stdout.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Output {
	Stderr,
	Syslog,
}

impl Output {
	pub fn from_flags(is_syslog: bool) -> Self {
		if is_syslog {
			Self::Syslog
		} else {
			Self::Stderr
		}
	}
}

pub fn init(level: Level, output: Output, identity: &'static CStr) -> Result<()> {
	let max_level = tracing::Level::from(level);
	let installed = match output {
		Output::Syslog => {
			let (options, facility) = Default::default();
			let syslog = syslog_tracing::Syslog::new(identity, options, facility)
				.context("unable to connect to syslog")?;
			let subscriber = FmtSubscriber::builder()
				.with_max_level(max_level)
				.with_ansi(false)
				.without_time()
				.with_writer(syslog)
				.finish();
			tracing::subscriber::set_global_default(subscriber)
		}
		Output::Stderr => {
			let subscriber = FmtSubscriber::builder()
				.with_max_level(max_level)
				.with_target(false)
				.with_writer(std::io::stderr)
				.finish();
			tracing::subscriber::set_global_default(subscriber)
		}
	};
	installed.context("a logger is already installed")
}
