//! Dataset structure for machine learning

use crate::error::DataLoadError;
use anyhow::{Context, Result};
use ndarray::Array1;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A dataset split with a feature matrix and aligned regression targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Target values, aligned by row index
    pub targets: Vec<f64>,
}

impl Dataset {
    /// Create a dataset from raw data
    pub fn new(features: Vec<Vec<f64>>, targets: Vec<f64>) -> Self {
        Self { features, targets }
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features per row
    pub fn n_features(&self) -> usize {
        self.features.first().map_or(0, Vec::len)
    }

    /// Get targets as ndarray
    pub fn targets_array(&self) -> Array1<f64> {
        Array1::from_vec(self.targets.clone())
    }

    /// Create a subset of the dataset by indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Bootstrap sample (random sample with replacement)
    pub fn bootstrap_sample(&self, seed: u64) -> Dataset {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = self.n_samples();

        let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();

        self.subset(&indices)
    }

    /// Load a split from a binary file holding a (features, targets) pair
    pub fn load(path: &Path) -> Result<Self, DataLoadError> {
        if !path.exists() {
            return Err(DataLoadError::Missing(path.to_path_buf()));
        }

        let bytes = std::fs::read(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (features, targets): (Vec<Vec<f64>>, Vec<f64>) = bincode::deserialize(&bytes)
            .map_err(|e| DataLoadError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let width = features.first().map_or(0, Vec::len);
        if features.iter().any(|row| row.len() != width) {
            return Err(DataLoadError::Malformed {
                path: path.to_path_buf(),
                reason: "ragged feature matrix".to_string(),
            });
        }

        Ok(Dataset { features, targets })
    }

    /// Save the split as a binary (features, targets) pair
    pub fn save(&self, path: &Path) -> Result<()> {
        let encoded = bincode::serialize(&(&self.features, &self.targets))
            .context("failed to serialize dataset")?;
        std::fs::write(path, encoded)
            .with_context(|| format!("failed to write split file: {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_dataset_dimensions() {
        let dataset = Dataset::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![0.5, 0.7]);

        assert_eq!(dataset.n_samples(), 2);
        assert_eq!(dataset.n_features(), 2);
        assert_eq!(dataset.targets_array().len(), 2);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dataset = Dataset::new(
            vec![vec![1.0], vec![2.0], vec![3.0]],
            vec![10.0, 20.0, 30.0],
        );

        let dir = tempdir().unwrap();
        let path = dir.path().join("train.pkl");

        dataset.save(&path).unwrap();
        let loaded = Dataset::load(&path).unwrap();

        assert_eq!(loaded.features, dataset.features);
        assert_eq!(loaded.targets, dataset.targets);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let err = Dataset::load(&dir.path().join("train.pkl")).unwrap_err();

        assert!(matches!(err, DataLoadError::Missing(_)));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("train.pkl");
        std::fs::write(&path, b"not a split file").unwrap();

        let err = Dataset::load(&path).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { .. }));
    }

    #[test]
    fn test_bootstrap_sample_is_deterministic() {
        let dataset = Dataset::new(
            (0..50).map(|i| vec![i as f64]).collect(),
            (0..50).map(|i| i as f64).collect(),
        );

        let a = dataset.bootstrap_sample(7);
        let b = dataset.bootstrap_sample(7);

        assert_eq!(a.features, b.features);
        assert_eq!(a.n_samples(), dataset.n_samples());
    }
}
