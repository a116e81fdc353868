use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use slotcheck_core::neighbours::NeighbourGraph;
use slotcheck_input::runlog::read_run_log;
use slotcheck_input::topology::read_topology;
use slotcheck_models::aggregate::{AggregateResult, Aggregator};
use slotcheck_models::run::{RunAnalyser, RunResult};
use slotcheck_output::logger::initiate_logger;
use slotcheck_output::result::Results;
use slotcheck_output::tables::energy::EnergyRecord;
use slotcheck_output::tables::trials::TrialRecord;

use crate::analysis::config::Config;
use crate::analysis::tree::{discover, NetworkSetup};
use crate::error::AnalysisError;

/// Analyses every run of an experiment tree and writes the per-configuration summary.
pub struct BatchAnalyser {
    config: Config,
    config_dir: PathBuf,
}

impl BatchAnalyser {
    pub fn new(config: Config, config_dir: PathBuf) -> Self {
        Self { config, config_dir }
    }

    pub fn initialize(&self) -> Result<(), AnalysisError> {
        initiate_logger(&self.config_dir, &self.config.log_settings)?;
        Ok(())
    }

    pub fn run(&self) -> Result<AggregateResult, AnalysisError> {
        let root = self.config.results_root(&self.config_dir);
        info!("Analysing experiments under {}", root.display());
        let setups = discover(&root)?;

        let mut results = Results::new(
            &self.config.output_settings,
            &self.config_dir,
            self.config.analysis_settings.std_dev,
        )?;
        let mut aggregator = Aggregator::new();
        for setup in setups.iter() {
            self.analyse_setup(setup, &mut aggregator, &mut results)?;
        }

        let aggregate = aggregator.aggregate();
        results.write_summary(&aggregate)?;
        results.close_files()?;
        Ok(aggregate)
    }

    fn analyse_setup(
        &self,
        setup: &NetworkSetup,
        aggregator: &mut Aggregator,
        results: &mut Results,
    ) -> Result<(), AnalysisError> {
        for period in setup.periods.iter() {
            aggregator.register(&setup.key(&period.period));
        }

        let topology_path = setup.topology_path(&self.config.analysis_settings.topology_file);
        let graph = match read_neighbours(&topology_path) {
            Ok(graph) => graph,
            Err(e) => {
                error!(
                    "No trials of {} analysed, topology is unusable: {}",
                    setup.dir.display(),
                    e
                );
                let reason = e.to_string();
                for period in setup.periods.iter() {
                    let key = setup.key(&period.period);
                    for log in period.logs.iter() {
                        aggregator.add_excluded(&key);
                        let record = TrialRecord::excluded(&key, &log_name(log), &reason);
                        results.add_trial(&record)?;
                    }
                }
                return Ok(());
            }
        };

        let analyser =
            RunAnalyser::new(&graph).with_policy(self.config.analysis_settings.sent_policy);
        for period in setup.periods.iter() {
            let key = setup.key(&period.period);
            for log in period.logs.iter() {
                let outcome = analyse_log(&analyser, log);
                let record = match &outcome {
                    Ok(run) => {
                        if run.dropped_records > 0 {
                            let dropped = run.dropped_records;
                            warn!("{} records dropped from {}", dropped, log.display());
                        }
                        debug!("Analysed {}", log.display());
                        results.add_energy(&EnergyRecord::of_run(&key, &log_name(log), run))?;
                        TrialRecord::included(&key, &log_name(log), run)
                    }
                    Err(e) => {
                        warn!("Excluding {}: {}", log.display(), e);
                        TrialRecord::excluded(&key, &log_name(log), &e.to_string())
                    }
                };
                aggregator.record(&key, &outcome);
                results.add_trial(&record)?;
            }
            info!("Analysed {} runs of {}", period.logs.len(), key);
        }
        Ok(())
    }
}

fn read_neighbours(topology_path: &Path) -> Result<NeighbourGraph, AnalysisError> {
    let topology = read_topology(topology_path)?;
    Ok(topology.neighbour_graph()?)
}

fn analyse_log(analyser: &RunAnalyser, log: &Path) -> Result<RunResult, AnalysisError> {
    let run = read_run_log(log)?;
    Ok(analyser.analyse(&run)?)
}

fn log_name(log: &Path) -> String {
    log.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
