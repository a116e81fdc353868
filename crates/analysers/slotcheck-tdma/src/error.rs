use std::path::PathBuf;

use thiserror::Error;

use slotcheck_input::error::InputError;
use slotcheck_models::error::ModelError;
use slotcheck_output::error::OutputError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read configuration {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("Failed to list {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Output(#[from] OutputError),
}
