//! Logging initialization for the `botctl` binary.
//!
//! File output goes to `./botctl.log` in the current working directory.

use std::fs::File;
use std::path::PathBuf;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

const LOG_FILENAME: &str = "botctl.log";

/// Where log records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// Only ./botctl.log; keeps the console panel clean.
    File,
    /// Only stderr.
    Terminal,
    Both,
}

impl LogDestination {
    pub fn to_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    pub fn to_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

/// Installs the global logger. Does nothing if no sink could be opened.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_allow_str("botctl")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if destination.to_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if destination.to_file() {
        if let Some(file_logger) = open_log_file(level, config) {
            loggers.push(file_logger);
        }
    }

    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn open_log_file(level: LevelFilter, config: Config) -> Option<Box<WriteLogger<File>>> {
    let path = PathBuf::from(".").join(LOG_FILENAME);
    File::create(&path)
        .map(|file| WriteLogger::new(level, config, file))
        .map_err(|err| eprintln!("botctl: log file {path:?} unavailable: {err}"))
        .ok()
}
