use std::path::PathBuf;

use thiserror::Error;

use slotcheck_core::error::CoreError;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Error reading file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed topology: {0}")]
    MalformedTopology(String),
    #[error("Malformed run log: {0}")]
    MalformedLog(String),
    #[error("Invalid run log JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
}
