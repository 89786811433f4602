//! Mock feature engine for testing consumers.
//!
//! Returns pre-configured statistics for every threshold without building
//! any graph or running the null models.

use std::sync::Mutex;

use super::engine::FeatureEngine;
use super::models::{CorrelationMatrix, FeatureMap, GraphStatistics};
use super::naming::name_features;
use crate::error::Result;

/// Mock implementation of `FeatureEngine` for testing.
///
/// Records the valid-region set and label of every call.
pub struct MockFeatureEngine {
    thresholds: Vec<f64>,
    statistics: GraphStatistics,
    pub calls: Mutex<Vec<(Vec<usize>, String)>>,
}

impl MockFeatureEngine {
    /// Mock engine returning all-zero statistics at the given thresholds.
    pub fn new(thresholds: Vec<f64>) -> Self {
        Self::with_statistics(thresholds, GraphStatistics::default())
    }

    /// Mock engine returning `statistics` at every threshold.
    pub fn with_statistics(thresholds: Vec<f64>, statistics: GraphStatistics) -> Self {
        Self {
            thresholds,
            statistics,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FeatureEngine for MockFeatureEngine {
    fn graph_features(
        &self,
        _matrix: &CorrelationMatrix,
        valid_regions: &[usize],
        label: &str,
    ) -> Result<FeatureMap> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((valid_regions.to_vec(), label.to_string()));
        }
        let mut features = FeatureMap::new();
        for &threshold in &self.thresholds {
            features.extend(name_features(&self.statistics, threshold, label));
        }
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::models::FeatureValue;

    #[test]
    fn test_mock_returns_zeros_by_default() {
        let mock = MockFeatureEngine::new(vec![0.25]);
        let matrix = CorrelationMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let features = mock.graph_features(&matrix, &[], "ICA").unwrap();
        assert_eq!(
            features["ICA Subgraphs at Threshold 0.25"],
            FeatureValue::Count(0)
        );
    }

    #[test]
    fn test_mock_records_calls() {
        let stats = GraphStatistics {
            subgraphs: 4,
            ..GraphStatistics::default()
        };
        let mock = MockFeatureEngine::with_statistics(vec![0.3, 0.4], stats);
        let matrix = CorrelationMatrix::from_rows(vec![vec![1.0]]).unwrap();
        let features = mock.graph_features(&matrix, &[0, 2], "").unwrap();

        assert_eq!(features["Subgraphs at Threshold 0.4"], FeatureValue::Count(4));
        let calls = mock.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(vec![0, 2], String::new())]);
    }
}
