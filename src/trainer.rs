//! End-to-end training pipeline
//!
//! Loads the train and validation splits, fits a random forest, scores the
//! validation predictions and reports the RMSE to the tracking sink. The
//! pipeline is a straight line: load, fit, predict, score, report.

use ndarray::Array1;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use crate::data::Dataset;
use crate::error::{FitError, TrainError, TrainResult};
use crate::metrics::Metrics;
use crate::models::{ForestConfig, RandomForest};
use crate::tracking::MetricSink;

/// File name of the training split under the data path
pub const TRAIN_SPLIT_FILE: &str = "train.pkl";
/// File name of the validation split under the data path
pub const VAL_SPLIT_FILE: &str = "val.pkl";
/// Name under which the validation error is reported
pub const VALIDATION_RMSE: &str = "validation_rmse";

/// Configuration for a training run
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Directory holding the preprocessed split files
    pub data_path: PathBuf,
    /// Forest hyperparameters
    pub forest: ForestConfig,
}

impl TrainConfig {
    /// Config with default hyperparameters for the given data directory
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            forest: ForestConfig::default(),
        }
    }
}

/// Train on the training split, score on the validation split and report
/// the validation RMSE into the sink. Returns the RMSE.
pub fn train_and_report(config: &TrainConfig, sink: &mut dyn MetricSink) -> TrainResult<f64> {
    let train = Dataset::load(&config.data_path.join(TRAIN_SPLIT_FILE))?;
    let val = Dataset::load(&config.data_path.join(VAL_SPLIT_FILE))?;

    validate_split(&train, "training")?;
    validate_split(&val, "validation")?;
    if val.n_features() != train.n_features() {
        return Err(TrainError::Fit(FitError::FeatureWidthMismatch {
            train: train.n_features(),
            val: val.n_features(),
        }));
    }

    info!(
        train_samples = train.n_samples(),
        val_samples = val.n_samples(),
        n_features = train.n_features(),
        "loaded dataset splits"
    );

    let mut forest = RandomForest::new(config.forest.clone());

    let started = Instant::now();
    forest.fit(&train);
    info!(
        trees = forest.n_trees(),
        elapsed_secs = format!("{:.2}", started.elapsed().as_secs_f64()),
        "trained random forest"
    );

    for (idx, importance) in forest.feature_importance_ranking().into_iter().take(5) {
        info!(feature = idx, importance = format!("{importance:.4}"), "feature importance");
    }

    let predictions = Array1::from_vec(forest.predict(&val));
    let targets = val.targets_array();

    let rmse = Metrics::rmse(&targets, &predictions);
    let mae = Metrics::mae(&targets, &predictions);
    let r2 = Metrics::r2_score(&targets, &predictions);
    info!(rmse, mae, r2, "validation scores");

    sink.record_metric(VALIDATION_RMSE, rmse)?;

    Ok(rmse)
}

fn validate_split(split: &Dataset, name: &'static str) -> Result<(), FitError> {
    if split.n_samples() == 0 {
        return Err(FitError::EmptySplit(name));
    }
    if split.features.len() != split.targets.len() {
        return Err(FitError::ShapeMismatch {
            rows: split.features.len(),
            targets: split.targets.len(),
        });
    }
    if split.features.iter().flatten().any(|v| !v.is_finite())
        || split.targets.iter().any(|v| !v.is_finite())
    {
        return Err(FitError::NonFinite(name));
    }
    Ok(())
}
