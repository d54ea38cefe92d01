//! Data structures module
//!
//! Provides the dataset split type and split-file (de)serialization.

mod dataset;

pub use dataset::Dataset;
