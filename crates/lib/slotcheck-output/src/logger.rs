use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;

use crate::error::OutputError;

#[derive(Deserialize, Debug, Clone)]
pub struct LogSettings {
    pub log_path: String,
    pub log_level: String,
    pub log_file_name: String,
    pub log_overwrite: bool,
}

pub fn setup_logging(log_level: &str, log_file_path: PathBuf) -> Result<Config, OutputError> {
    let log_level = get_logging_level(log_level);
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y.%m.%d %H:%M:%S)} | {({l}):5.5} | {({f}:{L}):>40.40} — {m}{n}",
        )))
        .build(&log_file_path)
        .map_err(|source| OutputError::Io {
            path: log_file_path,
            source,
        })?;

    Config::builder()
        .appender(Appender::builder().build("x", Box::new(log_file)))
        .build(Root::builder().appender("x").build(log_level))
        .map_err(|e| OutputError::Logger(e.to_string()))
}

fn get_logging_level(log_level: &str) -> LevelFilter {
    match log_level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Picks the file to log into. An existing log is kept and a timestamped file is used instead,
/// unless the settings ask for it to be overwritten.
pub fn log_file_path(log_path: &Path, log_settings: &LogSettings) -> Result<PathBuf, OutputError> {
    let log_file_path = log_path.join(&log_settings.log_file_name);
    if !log_file_path.exists() {
        return Ok(log_file_path);
    }
    if log_settings.log_overwrite {
        fs::remove_file(&log_file_path).map_err(|source| OutputError::Io {
            path: log_file_path.clone(),
            source,
        })?;
        return Ok(log_file_path);
    }

    let time_now = Utc::now();
    let stamp = time_now.format("_%d%m%Y_%H%M%S").to_string();
    let stem = log_settings
        .log_file_name
        .split('.')
        .next()
        .unwrap_or(log_settings.log_file_name.as_str());
    Ok(log_path.join(format!("{}{}.log", stem, stamp)))
}

/// Starts logging into `<config_dir>/<log_path>/logs`.
pub fn initiate_logger(config_dir: &Path, log_settings: &LogSettings) -> Result<(), OutputError> {
    let log_path = config_dir.join(&log_settings.log_path).join("logs");
    if !log_path.exists() {
        fs::create_dir_all(&log_path).map_err(|source| OutputError::Io {
            path: log_path.clone(),
            source,
        })?;
    }

    let log_file_path = log_file_path(&log_path, log_settings)?;
    let logger_config = setup_logging(&log_settings.log_level, log_file_path)?;
    log4rs::init_config(logger_config).map_err(|e| OutputError::Logger(e.to_string()))?;
    Ok(())
}
