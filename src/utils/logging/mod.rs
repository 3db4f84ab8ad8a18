//! Logging setup driven by environment variables.
//!
//! | Variable       | Meaning                                             | Default  |
//! |----------------|-----------------------------------------------------|----------|
//! | `LOG_MODE`     | `stdout` or `file`                                  | `stdout` |
//! | `LOG_LEVEL`    | `trace`, `debug`, `info`, `warn` or `error`         | `info`   |
//! | `LOG_DATA_DIR` | directory of the log files, ignored in a container  | `logs/`  |
//! | `LOG_MAX_SIZE` | bytes after which a new file of the day is started  | 1 GiB    |
//! | `IN_DOCKER`    | `true` inside the container image                   | `false`  |
//!
//! File logs are named `watcher-<date>.<n>.log`. The first file of the day that
//! is still below `LOG_MAX_SIZE` is appended to.

pub mod error;

use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::{
	env, fs,
	path::{Path, PathBuf},
};
use tracing::{Level, Subscriber};
use tracing_subscriber::{
	filter::EnvFilter,
	fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
	prelude::*,
	registry::LookupSpan,
};

const LOG_FILE_STEM: &str = "watcher";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_MAX_SIZE: u64 = 1024 * 1024 * 1024;

lazy_static! {
	static ref ANSI_ESCAPE: Regex = Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").unwrap();
}

/// Formats with the wrapped formatter, then drops colour codes
///
/// Field values such as addresses coming from remote nodes may carry escape
/// sequences even when the formatter itself has ANSI output disabled.
struct PlainText<F>(F);

impl<S, N, F> FormatEvent<S, N> for PlainText<F>
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> FormatFields<'a> + 'static,
	F: FormatEvent<S, N>,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &tracing::Event<'_>,
	) -> std::fmt::Result {
		let mut line = String::new();
		self.0.format_event(ctx, Writer::new(&mut line), event)?;
		writer.write_str(&ANSI_ESCAPE.replace_all(&line, ""))
	}
}

/// Logging settings read from the environment
#[derive(Debug, Clone, PartialEq)]
struct LogSettings {
	to_file: bool,
	level: Level,
	dir: PathBuf,
	max_size: u64,
}

impl LogSettings {
	fn from_env() -> Result<Self, String> {
		let to_file = env::var("LOG_MODE").is_ok_and(|mode| mode.eq_ignore_ascii_case("file"));
		let level = env::var("LOG_LEVEL")
			.ok()
			.and_then(|level| level.parse().ok())
			.unwrap_or(Level::INFO);

		let in_docker = env::var("IN_DOCKER").is_ok_and(|value| value == "true");
		let dir = match env::var("LOG_DATA_DIR") {
			Ok(dir) if !in_docker && !dir.trim().is_empty() => PathBuf::from(dir),
			_ => PathBuf::from(DEFAULT_LOG_DIR),
		};

		let max_size = match env::var("LOG_MAX_SIZE") {
			Ok(size) => size
				.parse()
				.map_err(|e| format!("LOG_MAX_SIZE must be a number of bytes: {}", e))?,
			Err(_) => DEFAULT_LOG_MAX_SIZE,
		};

		Ok(Self {
			to_file,
			level,
			dir,
			max_size,
		})
	}

	/// The file of `date` to append to: the first one not above `max_size`
	fn log_file(&self, date: &str) -> PathBuf {
		(1..)
			.map(|index| day_file(&self.dir, date, index))
			.find(|path| fs::metadata(path).map_or(true, |meta| meta.len() <= self.max_size))
			.unwrap_or_else(|| day_file(&self.dir, date, 1))
	}
}

fn day_file(dir: &Path, date: &str, index: u32) -> PathBuf {
	dir.join(format!("{}-{}.{}.log", LOG_FILE_STEM, date, index))
}

/// Installs the global subscriber described by the environment
pub fn setup_logging() -> Result<(), Box<dyn std::error::Error>> {
	let settings = LogSettings::from_env()?;
	let subscriber = tracing_subscriber::registry().with(EnvFilter::new(settings.level.to_string()));
	let format = fmt::format()
		.with_target(true)
		.with_thread_ids(false)
		.with_ansi(!settings.to_file)
		.compact();

	if !settings.to_file {
		subscriber
			.with(
				fmt::layer()
					.event_format(format)
					.fmt_fields(fmt::format::PrettyFields::new()),
			)
			.try_init()?;
		return Ok(());
	}

	fs::create_dir_all(&settings.dir)?;
	let path = settings.log_file(&Utc::now().format("%Y-%m-%d").to_string());
	let file_name = path.file_name().unwrap_or_default();
	let appender = tracing_appender::rolling::never(&settings.dir, file_name);

	subscriber
		.with(
			fmt::layer()
				.event_format(PlainText(format))
				.with_writer(appender)
				.fmt_fields(fmt::format::PrettyFields::new()),
		)
		.try_init()?;

	tracing::info!("Logging to file: {}", path.display());
	Ok(())
}
