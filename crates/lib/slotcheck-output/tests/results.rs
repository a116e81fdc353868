use std::fs;
use std::path::PathBuf;

use slotcheck_core::event::TxRx;
use slotcheck_models::aggregate::{Aggregator, ConfigKey};
use slotcheck_models::ratio::Ratio;
use slotcheck_models::run::{PredicateTally, RunResult};
use slotcheck_models::stats::StdDevKind;
use slotcheck_output::error::OutputError;
use slotcheck_output::result::{OutputSettings, Results};
use slotcheck_output::tables::energy::EnergyRecord;
use slotcheck_output::tables::trials::TrialRecord;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join("slotcheck-output-tests")
        .join(name);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn key(period: &str) -> ConfigKey {
    ConfigKey::builder()
        .algorithm("tdma")
        .distribution("grid")
        .network_size(16)
        .period(period)
        .build()
}

fn run(reached: Ratio) -> RunResult {
    let counts = TxRx::builder().tx(40).rx(60).build();
    RunResult::builder()
        .rime_total(counts)
        .tdma_total(counts)
        .app_total(TxRx::default())
        .tally(PredicateTally::default())
        .reached_origin(reached)
        .success_rate(Ratio::Defined(0.5))
        .failure_rate(Ratio::Defined(0.5))
        .correctly_evaluated(Ratio::Defined(1.0))
        .build()
}

fn settings(summary_file: &str, trials_file: Option<&str>) -> OutputSettings {
    OutputSettings {
        output_path: "out".to_string(),
        summary_file: summary_file.to_string(),
        trials_file: trials_file.map(str::to_string),
        energy_file: None,
    }
}

#[test]
fn csv_summary_has_a_row_per_configuration() {
    let base_dir = scratch_dir("csv");
    let mut aggregator = Aggregator::new();
    aggregator.add_result(&key("60"), &run(Ratio::Defined(0.25)));
    aggregator.add_result(&key("60"), &run(Ratio::Defined(0.75)));
    aggregator.add_excluded(&key("120"));

    let mut results = Results::new(
        &settings("summary.csv", Some("trials.csv")),
        &base_dir,
        StdDevKind::Population,
    )
    .unwrap();
    results
        .add_trial(&TrialRecord::included(&key("60"), "1.log.gz", &run(Ratio::Undefined)))
        .unwrap();
    results
        .add_trial(&TrialRecord::excluded(&key("120"), "2.log.gz", "no slot for mote 3"))
        .unwrap();
    results.write_summary(&aggregator.aggregate()).unwrap();
    results.close_files().unwrap();

    let summary = fs::read_to_string(base_dir.join("out").join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("algorithm,distribution,size,period,included,excluded"));
    assert!(lines[0].contains("reached_origin_mean,reached_origin_std"));
    assert!(lines[1].starts_with("tdma,grid,16,60,2,0,0.5,0.25"));
    assert!(lines[2].starts_with("tdma,grid,16,120,0,1,,"));

    let trials = fs::read_to_string(base_dir.join("out").join("trials.csv")).unwrap();
    let lines: Vec<&str> = trials.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("included"));
    assert!(lines[2].contains("no slot for mote 3"));
}

#[test]
fn parquet_summary_is_written() {
    let base_dir = scratch_dir("parquet");
    let mut aggregator = Aggregator::new();
    aggregator.add_result(&key("60"), &run(Ratio::Defined(1.0)));

    let mut results =
        Results::new(&settings("summary.parquet", None), &base_dir, StdDevKind::Sample).unwrap();
    results.write_summary(&aggregator.aggregate()).unwrap();
    results.close_files().unwrap();

    let written = fs::metadata(base_dir.join("out").join("summary.parquet")).unwrap();
    assert!(written.len() > 0);
}

#[test]
fn unknown_extension_is_rejected() {
    let base_dir = scratch_dir("unknown");
    let result = Results::new(&settings("summary.xlsx", None), &base_dir, StdDevKind::Sample);
    assert!(matches!(result, Err(OutputError::UnsupportedFormat(_))));
}

#[test]
fn energy_totals_are_listed_per_counter() {
    let base_dir = scratch_dir("energy");
    let mut output_settings = settings("summary.csv", None);
    output_settings.energy_file = Some("energy.csv".to_string());
    let mut included = run(Ratio::Defined(1.0));
    included.energy_total.insert("cpu".to_string(), 250);
    included.energy_total.insert("lpm".to_string(), 1700);

    let mut results = Results::new(&output_settings, &base_dir, StdDevKind::Sample).unwrap();
    results
        .add_energy(&EnergyRecord::of_run(&key("60"), "1.log", &included))
        .unwrap();
    results.write_summary(&Aggregator::new().aggregate()).unwrap();
    results.close_files().unwrap();

    let energy = fs::read_to_string(base_dir.join("out").join("energy.csv")).unwrap();
    let lines: Vec<&str> = energy.lines().collect();
    assert_eq!(
        lines,
        vec![
            "algorithm,distribution,size,period,log_file,field,total",
            "tdma,grid,16,60,1.log,cpu,250",
            "tdma,grid,16,60,1.log,lpm,1700",
        ]
    );
}
