use std::fs::File;
use std::path::Path;

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use typed_builder::TypedBuilder;

use slotcheck_models::aggregate::ConfigKey;
use slotcheck_models::run::RunResult;

use crate::error::OutputError;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrialStatus {
    Included,
    Excluded,
}

/// One analysed run log, as listed in the per-trial file.
#[derive(Serialize, Clone, Debug, PartialEq, TypedBuilder)]
pub struct TrialRecord {
    #[builder(setter(into))]
    pub algorithm: String,
    #[builder(setter(into))]
    pub distribution: String,
    pub size: u32,
    #[builder(setter(into))]
    pub period: String,
    #[builder(setter(into))]
    pub log_file: String,
    pub status: TrialStatus,
    #[builder(default)]
    pub reason: Option<String>,
    #[builder(default)]
    pub predicates: Option<u64>,
    #[builder(default)]
    pub reached_origin: Option<f64>,
    #[builder(default)]
    pub success_rate: Option<f64>,
    #[builder(default)]
    pub failure_rate: Option<f64>,
    #[builder(default)]
    pub correctly_evaluated: Option<f64>,
    #[builder(default)]
    pub dropped_records: Option<usize>,
}

impl TrialRecord {
    pub fn included(key: &ConfigKey, log_file: &str, run: &RunResult) -> Self {
        TrialRecord::builder()
            .algorithm(key.algorithm.as_str())
            .distribution(key.distribution.as_str())
            .size(key.network_size)
            .period(key.period.as_str())
            .log_file(log_file)
            .status(TrialStatus::Included)
            .predicates(Some(run.tally.total))
            .reached_origin(run.reached_origin.value())
            .success_rate(run.success_rate.value())
            .failure_rate(run.failure_rate.value())
            .correctly_evaluated(run.correctly_evaluated.value())
            .dropped_records(Some(run.dropped_records))
            .build()
    }

    pub fn excluded(key: &ConfigKey, log_file: &str, reason: &str) -> Self {
        TrialRecord::builder()
            .algorithm(key.algorithm.as_str())
            .distribution(key.distribution.as_str())
            .size(key.network_size)
            .period(key.period.as_str())
            .log_file(log_file)
            .status(TrialStatus::Excluded)
            .reason(Some(reason.to_string()))
            .build()
    }
}

#[derive(Debug)]
pub struct TrialWriter {
    writer: Writer<File>,
}

impl TrialWriter {
    pub fn new(output_file: &Path) -> Result<Self, OutputError> {
        let file = File::create(output_file).map_err(|source| OutputError::Io {
            path: output_file.to_path_buf(),
            source,
        })?;
        let writer = WriterBuilder::new().has_headers(true).from_writer(file);
        Ok(Self { writer })
    }

    pub fn add_data(&mut self, record: &TrialRecord) -> Result<(), OutputError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn close_file(mut self) -> Result<(), OutputError> {
        self.writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
