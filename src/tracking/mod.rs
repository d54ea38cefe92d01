//! Experiment tracking module
//!
//! Records training runs, their parameters and metrics as local run records.

mod tracker;

pub use tracker::{load_record, ExperimentTracker, MetricSink, RunHandle, RunRecord, RunStatus};
