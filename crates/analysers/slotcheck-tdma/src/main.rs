use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use slotcheck_tdma::analysis::batch::BatchAnalyser;
use slotcheck_tdma::analysis::config::{config_dir, read_config};
use slotcheck_tdma::error::AnalysisError;

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    #[arg(short = 'c', long, value_name = "Analysis Configuration File")]
    config: String,
}

fn main() -> ExitCode {
    let config_file: String = CliArgs::parse().config;
    let start = std::time::Instant::now();
    match analyse(PathBuf::from(config_file)) {
        Ok(configurations) => {
            let elapsed = start.elapsed();
            println!(
                "Analysed {} configurations in {} ms.",
                configurations,
                elapsed.as_millis()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn analyse(file_path: PathBuf) -> Result<usize, AnalysisError> {
    let config = read_config(&file_path)?;
    let analyser = BatchAnalyser::new(config, config_dir(&file_path));
    analyser.initialize()?;
    let aggregate = analyser.run()?;
    info!("Batch analysis finished");
    Ok(aggregate.len())
}
