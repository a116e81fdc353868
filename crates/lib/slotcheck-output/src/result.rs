use std::fs;
use std::fs::File;
use std::path::Path;

use arrow::csv::Writer;
use arrow::datatypes::{Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchWriter};
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use serde::Deserialize;

use slotcheck_models::aggregate::AggregateResult;
use slotcheck_models::stats::StdDevKind;

use crate::error::OutputError;
use crate::tables::energy::{EnergyRecord, EnergyWriter};
use crate::tables::summary::SummaryWriter;
use crate::tables::trials::{TrialRecord, TrialWriter};

#[derive(Deserialize, Debug, Clone)]
pub struct OutputSettings {
    pub output_path: String,
    pub summary_file: String,
    pub trials_file: Option<String>,
    pub energy_file: Option<String>,
}

pub trait ResultWriter {
    fn schema() -> Schema;
    fn write_to_file(&mut self) -> Result<(), OutputError>;
    fn close_file(self) -> Result<(), OutputError>;
}

#[derive(Debug)]
pub enum WriterType {
    Parquet(WriterParquet),
    Csv(WriterCsv),
}

impl WriterType {
    /// Opens a writer for the format given by the file extension, replacing an existing file.
    pub fn new(file_name: &Path, schema: Schema) -> Result<Self, OutputError> {
        let writer = match file_name.extension().and_then(|ext| ext.to_str()) {
            Some("parquet") => WriterType::Parquet(WriterParquet::new(file_name, schema)?),
            Some("csv") => WriterType::Csv(WriterCsv::new(file_name)?),
            _ => return Err(OutputError::UnsupportedFormat(file_name.to_path_buf())),
        };
        Ok(writer)
    }

    pub fn write(&mut self, record_batch: &RecordBatch) -> Result<(), OutputError> {
        match self {
            WriterType::Parquet(to_output) => to_output.writer.write(record_batch)?,
            WriterType::Csv(to_output) => to_output.writer.write(record_batch)?,
        }
        Ok(())
    }

    pub fn close(self) -> Result<(), OutputError> {
        match self {
            WriterType::Parquet(to_output) => to_output.close(),
            WriterType::Csv(to_output) => to_output.close(),
        }
    }
}

fn create_file(file_name: &Path) -> Result<File, OutputError> {
    File::create(file_name).map_err(|source| OutputError::Io {
        path: file_name.to_path_buf(),
        source,
    })
}

#[derive(Debug)]
pub struct WriterParquet {
    pub writer: ArrowWriter<File>,
}

impl WriterParquet {
    fn new(file_name: &Path, schema: Schema) -> Result<Self, OutputError> {
        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let output_file = create_file(file_name)?;
        let writer = ArrowWriter::try_new(output_file, SchemaRef::from(schema), Some(props))?;
        Ok(Self { writer })
    }

    pub fn close(self) -> Result<(), OutputError> {
        self.writer.close()?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct WriterCsv {
    pub writer: Writer<File>,
}

impl WriterCsv {
    fn new(file_name: &Path) -> Result<Self, OutputError> {
        let writer = Writer::new(create_file(file_name)?);
        Ok(Self { writer })
    }

    pub fn close(self) -> Result<(), OutputError> {
        self.writer.close()?;
        Ok(())
    }
}

/// All output files of one batch analysis.
#[derive(Debug)]
pub struct Results {
    pub summary: SummaryWriter,
    pub trials: Option<TrialWriter>,
    pub energy: Option<EnergyWriter>,
}

impl Results {
    pub fn new(
        output_settings: &OutputSettings,
        base_dir: &Path,
        std_dev: StdDevKind,
    ) -> Result<Self, OutputError> {
        let output_path = base_dir.join(&output_settings.output_path);
        if !output_path.exists() {
            fs::create_dir_all(&output_path).map_err(|source| OutputError::Io {
                path: output_path.clone(),
                source,
            })?;
        }

        let summary_file = output_path.join(&output_settings.summary_file);
        let summary = SummaryWriter::new(&summary_file, std_dev)?;
        let trials = match &output_settings.trials_file {
            Some(file_name) => Some(TrialWriter::new(&output_path.join(file_name))?),
            None => None,
        };
        let energy = match &output_settings.energy_file {
            Some(file_name) => Some(EnergyWriter::new(&output_path.join(file_name))?),
            None => None,
        };
        Ok(Self {
            summary,
            trials,
            energy,
        })
    }

    pub fn add_trial(&mut self, record: &TrialRecord) -> Result<(), OutputError> {
        if let Some(writer) = &mut self.trials {
            writer.add_data(record)?;
        }
        Ok(())
    }

    pub fn add_energy(&mut self, records: &[EnergyRecord]) -> Result<(), OutputError> {
        if let Some(writer) = &mut self.energy {
            writer.add_data(records)?;
        }
        Ok(())
    }

    pub fn write_summary(&mut self, aggregate: &AggregateResult) -> Result<(), OutputError> {
        for (key, summary) in aggregate.iter() {
            self.summary.add_data(key, summary);
        }
        self.summary.write_to_file()?;
        info!("Summary of {} configurations written", aggregate.len());
        Ok(())
    }

    pub fn close_files(self) -> Result<(), OutputError> {
        self.summary.close_file()?;
        if let Some(writer) = self.trials {
            writer.close_file()?;
        }
        if let Some(writer) = self.energy {
            writer.close_file()?;
        }
        Ok(())
    }
}
