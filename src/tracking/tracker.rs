//! Experiment tracker implementation
//!
//! A run is opened by the caller, passed into the training routine as an
//! explicit sink handle, and finished by the caller. Each run persists as a
//! JSON record under `<root>/<experiment>/<run_id>/run.json`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ReportError;

/// Capability to record named values into an open tracking run
pub trait MetricSink {
    /// Record a named metric value
    fn record_metric(&mut self, name: &str, value: f64) -> Result<(), ReportError>;

    /// Record a named parameter
    fn log_param(&mut self, key: &str, value: &str);
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run is currently running
    Running,
    /// Run completed successfully
    Finished,
    /// Run failed
    Failed,
}

/// Persisted record of a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Run ID
    pub run_id: String,
    /// Experiment this run belongs to
    pub experiment: String,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time (None while running)
    pub ended_at: Option<DateTime<Utc>>,
    /// Status
    pub status: RunStatus,
    /// Parameters
    pub params: BTreeMap<String, String>,
    /// Latest metric values
    pub metrics: BTreeMap<String, f64>,
}

/// Experiment tracker rooted at a local directory
pub struct ExperimentTracker {
    root: PathBuf,
    experiment: String,
}

impl ExperimentTracker {
    /// Create a tracker for an experiment under the given root directory
    pub fn new(root: impl Into<PathBuf>, experiment: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            experiment: experiment.into(),
        }
    }

    /// Start a new run and return its handle
    pub fn start_run(&self) -> Result<RunHandle, ReportError> {
        let record = RunRecord {
            run_id: generate_run_id(),
            experiment: self.experiment.clone(),
            started_at: Utc::now(),
            ended_at: None,
            status: RunStatus::Running,
            params: BTreeMap::new(),
            metrics: BTreeMap::new(),
        };

        let dir = self.root.join(&self.experiment).join(&record.run_id);
        fs::create_dir_all(&dir)?;

        debug!(run_id = %record.run_id, dir = %dir.display(), "started run");

        let handle = RunHandle { dir, record };
        handle.persist()?;
        Ok(handle)
    }
}

/// Handle to an open run
pub struct RunHandle {
    dir: PathBuf,
    record: RunRecord,
}

impl RunHandle {
    /// Run ID
    pub fn run_id(&self) -> &str {
        &self.record.run_id
    }

    /// Path of the persisted run record
    pub fn record_path(&self) -> PathBuf {
        self.dir.join("run.json")
    }

    /// Close the run with the given status and persist the final record
    pub fn finish(mut self, status: RunStatus) -> Result<(), ReportError> {
        self.record.status = status;
        self.record.ended_at = Some(Utc::now());
        self.persist()
    }

    fn persist(&self) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(&self.record)?;
        fs::write(self.record_path(), json)?;
        Ok(())
    }
}

impl MetricSink for RunHandle {
    fn record_metric(&mut self, name: &str, value: f64) -> Result<(), ReportError> {
        if !value.is_finite() {
            return Err(ReportError::Rejected(format!(
                "metric {name} is not finite"
            )));
        }

        self.record.metrics.insert(name.to_string(), value);
        // Write-through so recorded metrics survive an aborted run
        self.persist()
    }

    fn log_param(&mut self, key: &str, value: &str) {
        self.record.params.insert(key.to_string(), value.to_string());
    }
}

/// Load a persisted run record
pub fn load_record(path: &Path) -> Result<RunRecord, ReportError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn generate_run_id() -> String {
    let ts = Utc::now().format("%Y%m%d%H%M%S");
    let suffix: u32 = rand::random::<u32>() & 0xff_ffff;
    format!("run-{ts}-{suffix:06x}")
}
