use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use slotcheck_models::aggregate::ConfigKey;

use crate::error::AnalysisError;

/// Run logs collected for one reporting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodRuns {
    pub period: String,
    pub logs: Vec<PathBuf>,
}

/// One simulated network: an algorithm and distribution at a certain size, sharing a topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSetup {
    pub algorithm: String,
    pub distribution: String,
    pub network_size: u32,
    pub dir: PathBuf,
    pub periods: Vec<PeriodRuns>,
}

impl NetworkSetup {
    pub fn key(&self, period: &str) -> ConfigKey {
        ConfigKey::builder()
            .algorithm(self.algorithm.as_str())
            .distribution(self.distribution.as_str())
            .network_size(self.network_size)
            .period(period)
            .build()
    }

    pub fn topology_path(&self, topology_file: &str) -> PathBuf {
        self.dir.join(topology_file)
    }
}

/// Walks `<root>/<algorithm>/<distribution>/<size>/<period>/<log>` in sorted order.
///
/// Files next to the period directories, such as the topology, are not periods. Size
/// directories whose name is not a number are skipped with a warning.
pub fn discover(root: &Path) -> Result<Vec<NetworkSetup>, AnalysisError> {
    let mut setups = Vec::new();
    for algorithm_dir in sub_dirs(root)? {
        for distribution_dir in sub_dirs(&algorithm_dir)? {
            for size_dir in sub_dirs(&distribution_dir)? {
                let size_name = file_name(&size_dir);
                let network_size = match size_name.parse::<u32>() {
                    Ok(size) => size,
                    Err(_) => {
                        warn!("Skipping {}, not a network size", size_dir.display());
                        continue;
                    }
                };

                let mut periods = Vec::new();
                for period_dir in sub_dirs(&size_dir)? {
                    let logs: Vec<PathBuf> = sorted_entries(&period_dir)?
                        .into_iter()
                        .filter(|path| path.is_file())
                        .collect();
                    periods.push(PeriodRuns {
                        period: file_name(&period_dir),
                        logs,
                    });
                }
                debug!(
                    "Found {} periods under {}",
                    periods.len(),
                    size_dir.display()
                );
                setups.push(NetworkSetup {
                    algorithm: file_name(&algorithm_dir),
                    distribution: file_name(&distribution_dir),
                    network_size,
                    dir: size_dir,
                    periods,
                });
            }
        }
    }
    Ok(setups)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    let listing_error = |source| AnalysisError::Listing {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(listing_error)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<Result<Vec<PathBuf>, _>>()
        .map_err(listing_error)?;
    entries.sort();
    Ok(entries)
}

fn sub_dirs(dir: &Path) -> Result<Vec<PathBuf>, AnalysisError> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect())
}
