use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use slotcheck_models::aggregate::ConfigKey;
use slotcheck_models::run::RunResult;

use crate::error::OutputError;

/// Network wide total of one energy counter in one analysed run log.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct EnergyRecord {
    pub algorithm: String,
    pub distribution: String,
    pub size: u32,
    pub period: String,
    pub log_file: String,
    pub field: String,
    pub total: i64,
}

impl EnergyRecord {
    /// One record per energy counter of the run, ordered by counter name.
    pub fn of_run(key: &ConfigKey, log_file: &str, run: &RunResult) -> Vec<EnergyRecord> {
        run.energy_total
            .iter()
            .map(|(field, total)| EnergyRecord {
                algorithm: key.algorithm.clone(),
                distribution: key.distribution.clone(),
                size: key.network_size,
                period: key.period.clone(),
                log_file: log_file.to_string(),
                field: field.clone(),
                total: *total,
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct EnergyWriter {
    writer: Writer<File>,
}

impl EnergyWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        let file = File::create(output_file).map_err(|source| OutputError::Io {
            path: output_file.to_path_buf(),
            source,
        })?;
        let writer = WriterBuilder::new().has_headers(true).from_writer(file);
        Ok(Self { writer })
    }

    pub fn add_data(&mut self, records: &[EnergyRecord]) -> Result<(), OutputError> {
        for record in records.iter() {
            self.writer.serialize(record)?;
        }
        Ok(())
    }

    pub fn close_file(mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
