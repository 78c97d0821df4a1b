//! Initialisation of the program logger.
//!
//! Info and debug messages go to stdout and warnings to stderr, coloured on a terminal. Runs
//! which have an output folder also log to `episim_info.log` and `episim_error.log` there.
use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Log level used when neither `EPISIM_LOG_LEVEL` nor `settings.toml` gives one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable which takes precedence over the configured log level
const LOG_LEVEL_ENV_VAR: &str = "EPISIM_LOG_LEVEL";

const LOG_INFO_FILE_NAME: &str = "episim_info.log";
const LOG_ERROR_FILE_NAME: &str = "episim_error.log";

/// Whether [`init`] has already succeeded
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Set up the global logger.
///
/// `configured_level` comes from `settings.toml`. Log files are only written when `output_dir`
/// is given.
pub fn init(configured_level: Option<&str>, output_dir: Option<&Path>) -> Result<()> {
    let level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(level) => level,
        Err(_) => configured_level.unwrap_or(DEFAULT_LOG_LEVEL).to_string(),
    };
    let level = parse_log_level(&level)?;

    let mut dispatch = Dispatch::new()
        .chain(console_dispatch(level, std::io::stdout().is_terminal()))
        .chain(
            Dispatch::new()
                .format(colour_formatter(std::io::stderr().is_terminal()))
                .level(level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        );

    if let Some(output_dir) = output_dir {
        let create = |name| {
            let path = output_dir.join(name);
            File::create(&path).with_context(|| format!("Could not create {}", path.display()))
        };
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .filter(|metadata| metadata.level() > LevelFilter::Warn)
                    .format(write_log_plain)
                    .level(level.max(LevelFilter::Info))
                    .chain(create(LOG_INFO_FILE_NAME)?),
            )
            .chain(
                Dispatch::new()
                    .format(write_log_plain)
                    .level(LevelFilter::Warn)
                    .chain(create(LOG_ERROR_FILE_NAME)?),
            );
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT.get_or_init(|| ());

    Ok(())
}

/// Parse a level name such as `warn` or `TRACE`
fn parse_log_level(level: &str) -> Result<LevelFilter> {
    level
        .parse()
        .with_context(|| format!("Unknown log level: {level}"))
}

/// Messages below warning level, written to stdout
fn console_dispatch(level: LevelFilter, use_colour: bool) -> Dispatch {
    Dispatch::new()
        .filter(|metadata| metadata.level() > LevelFilter::Warn)
        .format(colour_formatter(use_colour))
        .level(level)
        .chain(std::io::stdout())
}

fn colour_formatter(
    use_colour: bool,
) -> impl Fn(FormatCallback, &Arguments, &Record) + Sync + Send + 'static {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    move |out, message, record| {
        if use_colour {
            write_log(out, colours.color(record.level()), record.target(), message);
        } else {
            write_log_plain(out, message, record);
        }
    }
}

fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");
    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("warn", LevelFilter::Warn)]
    #[case("INFO", LevelFilter::Info)]
    #[case("Trace", LevelFilter::Trace)]
    fn test_parse_log_level(#[case] input: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_log_level_unknown() {
        assert_eq!(
            parse_log_level("loud").unwrap_err().to_string(),
            "Unknown log level: loud"
        );
    }
}
