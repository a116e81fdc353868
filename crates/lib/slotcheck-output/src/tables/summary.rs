use std::path::Path;
use std::sync::Arc;

use slotcheck_models::aggregate::{ConfigKey, GroupSummary, Metric};
use slotcheck_models::stats::StdDevKind;

use crate::arrow::array::{
    ArrayRef, Float64Array, RecordBatch, StringArray, UInt32Array, UInt64Array,
};
use crate::arrow::datatypes::{DataType, Field, Schema};
use crate::error::OutputError;
use crate::result::{ResultWriter, WriterType};

/// Mean and standard deviation column of one metric.
#[derive(Debug, Default)]
struct MetricColumns {
    mean: Vec<Option<f64>>,
    std: Vec<Option<f64>>,
}

/// One row per experiment configuration with the trial counts and the statistics of every
/// metric. Statistics that are not defined for a configuration are written as nulls.
#[derive(Debug)]
pub struct SummaryWriter {
    algorithm: Vec<String>,
    distribution: Vec<String>,
    network_size: Vec<u32>,
    period: Vec<String>,
    included: Vec<u64>,
    excluded: Vec<u64>,
    metrics: Vec<MetricColumns>,
    std_dev: StdDevKind,
    to_output: WriterType,
}

impl SummaryWriter {
    pub fn new(output_file: &Path, std_dev: StdDevKind) -> Result<Self, OutputError> {
        Ok(Self {
            to_output: WriterType::new(output_file, Self::schema())?,
            algorithm: Vec::new(),
            distribution: Vec::new(),
            network_size: Vec::new(),
            period: Vec::new(),
            included: Vec::new(),
            excluded: Vec::new(),
            metrics: Metric::ALL.iter().map(|_| MetricColumns::default()).collect(),
            std_dev,
        })
    }

    pub fn add_data(&mut self, key: &ConfigKey, summary: &GroupSummary) {
        self.algorithm.push(key.algorithm.clone());
        self.distribution.push(key.distribution.clone());
        self.network_size.push(key.network_size);
        self.period.push(key.period.clone());
        self.included.push(summary.included as u64);
        self.excluded.push(summary.excluded as u64);
        let kind = self.std_dev;
        for (metric, columns) in Metric::ALL.iter().zip(self.metrics.iter_mut()) {
            let stats = summary.stats(*metric);
            columns.mean.push(stats.map(|stats| stats.mean()));
            columns.std.push(stats.and_then(|stats| stats.std_dev(kind)));
        }
    }
}

impl ResultWriter for SummaryWriter {
    fn schema() -> Schema {
        let mut fields = vec![
            Field::new("algorithm", DataType::Utf8, false),
            Field::new("distribution", DataType::Utf8, false),
            Field::new("size", DataType::UInt32, false),
            Field::new("period", DataType::Utf8, false),
            Field::new("included", DataType::UInt64, false),
            Field::new("excluded", DataType::UInt64, false),
        ];
        for metric in Metric::ALL {
            fields.push(Field::new(format!("{}_mean", metric), DataType::Float64, true));
            fields.push(Field::new(format!("{}_std", metric), DataType::Float64, true));
        }
        Schema::new(fields)
    }

    fn write_to_file(&mut self) -> Result<(), OutputError> {
        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(std::mem::take(&mut self.algorithm))),
            Arc::new(StringArray::from(std::mem::take(&mut self.distribution))),
            Arc::new(UInt32Array::from(std::mem::take(&mut self.network_size))),
            Arc::new(StringArray::from(std::mem::take(&mut self.period))),
            Arc::new(UInt64Array::from(std::mem::take(&mut self.included))),
            Arc::new(UInt64Array::from(std::mem::take(&mut self.excluded))),
        ];
        for metric_columns in self.metrics.iter_mut() {
            columns.push(Arc::new(Float64Array::from(std::mem::take(
                &mut metric_columns.mean,
            ))));
            columns.push(Arc::new(Float64Array::from(std::mem::take(
                &mut metric_columns.std,
            ))));
        }
        let record_batch = RecordBatch::try_new(Arc::new(Self::schema()), columns)?;
        self.to_output.write(&record_batch)
    }

    fn close_file(self) -> Result<(), OutputError> {
        self.to_output.close()
    }
}
