//! Train a random forest on preprocessed trip data and report validation RMSE
//!
//! Usage: cargo run --bin train -- --data-path ./output

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use trip_ml::models::ForestConfig;
use trip_ml::tracking::{ExperimentTracker, MetricSink, RunStatus};
use trip_ml::trainer::{train_and_report, TrainConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train a random forest on preprocessed trip data")]
struct Args {
    /// Location where the processed trip data was saved
    #[arg(long, default_value = "./output")]
    data_path: PathBuf,

    /// Number of trees
    #[arg(long, default_value_t = 100)]
    trees: usize,

    /// Max tree depth
    #[arg(long, default_value_t = 10)]
    max_depth: usize,

    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Root directory for experiment run records
    #[arg(long, default_value = "./experiments")]
    tracking_dir: PathBuf,

    /// Experiment name
    #[arg(long, default_value = "trip-duration")]
    experiment: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("trip_ml=info,train=info")
        .init();

    let args = Args::parse();

    let config = TrainConfig {
        data_path: args.data_path,
        forest: ForestConfig {
            n_trees: args.trees,
            max_depth: args.max_depth,
            seed: args.seed,
            ..Default::default()
        },
    };

    let tracker = ExperimentTracker::new(&args.tracking_dir, &args.experiment);
    let mut run = tracker.start_run().context("failed to start tracking run")?;

    run.log_param("trees", &args.trees.to_string());
    run.log_param("max_depth", &args.max_depth.to_string());
    run.log_param("seed", &args.seed.to_string());

    info!(run_id = run.run_id(), experiment = %args.experiment, "started tracking run");

    match train_and_report(&config, &mut run) {
        Ok(rmse) => {
            info!(rmse, "training run complete");
            run.finish(RunStatus::Finished)
                .context("failed to close tracking run")?;
            Ok(())
        }
        Err(err) => {
            error!(%err, "training run failed");
            run.finish(RunStatus::Failed)
                .context("failed to close tracking run")?;
            Err(err.into())
        }
    }
}
