use std::path::{Path, PathBuf};

use serde::Deserialize;

use slotcheck_models::run::SentCountPolicy;
use slotcheck_models::stats::StdDevKind;
use slotcheck_output::logger::LogSettings;
use slotcheck_output::result::OutputSettings;

use crate::error::AnalysisError;

fn default_topology_file() -> String {
    "TDMA.csc".to_string()
}

#[derive(Deserialize, Debug, Clone)]
pub struct AnalysisSettings {
    pub results_root: String,
    #[serde(default = "default_topology_file")]
    pub topology_file: String,
    #[serde(default)]
    pub sent_policy: SentCountPolicy,
    #[serde(default)]
    pub std_dev: StdDevKind,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub log_settings: LogSettings,
    pub analysis_settings: AnalysisSettings,
    pub output_settings: OutputSettings,
}

impl Config {
    /// Root of the experiment tree. Relative paths start at the directory of the config file.
    pub fn results_root(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.analysis_settings.results_root)
    }
}

pub fn read_config(file_path: &Path) -> Result<Config, AnalysisError> {
    let input_toml =
        std::fs::read_to_string(file_path).map_err(|source| AnalysisError::ConfigRead {
            path: file_path.to_path_buf(),
            source,
        })?;
    parse_config(&input_toml)
}

pub fn parse_config(input_toml: &str) -> Result<Config, AnalysisError> {
    let config: Config = toml::from_str(input_toml)?;
    Ok(config)
}

/// Directory the paths of a config file are relative to.
pub fn config_dir(file_path: &Path) -> PathBuf {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
