//! Regional signal time series and the extraction presets built on them.
//!
//! A [`TimeSeries`] holds one signal per region. Two text layouts are read:
//! - **columns**: one row per time point, one column per region (ICA exports),
//!   regions labelled by column index;
//! - **labelled**: one row per region, first field the region label (atlas
//!   exports).
//!
//! Fields are separated by commas, tabs, or runs of spaces.

use crate::error::{FeatureError, Result};
use crate::graph::engine::FeatureEngine;
use crate::graph::models::{CorrelationMatrix, ExtractionConfig, FeatureMap, FeatureValue};

/// Label prefix of the ICA graph features.
pub const ICA_LABEL: &str = "ICA";
/// Label prefix of the atlas graph features.
pub const ATLAS_LABEL: &str = "Brainnetome Gyri";
/// Region prefix of ICA correlation features.
pub const ICA_CORRELATION_PREFIX: &str = "ICA Regions: ";
/// Region prefix of plain time-series correlation features.
pub const REGION_CORRELATION_PREFIX: &str = "Regions: ";

// ============================================================================
// TimeSeries
// ============================================================================

/// Signals of equal length, one per region.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    labels: Vec<String>,
    signals: Vec<Vec<f64>>,
}

fn split_fields(line: &str) -> Vec<&str> {
    if line.contains(',') {
        line.split(',').map(str::trim).collect()
    } else if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_value(field: &str, line_no: usize) -> Result<f64> {
    field.parse::<f64>().map_err(|_| {
        FeatureError::invalid_input(format!(
            "line {}: '{}' is not a number",
            line_no, field
        ))
    })
}

impl TimeSeries {
    /// Build from labelled signals, checking they are non-empty, of equal
    /// length and finite.
    pub fn from_signals(labels: Vec<String>, signals: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != signals.len() {
            return Err(FeatureError::invalid_input(format!(
                "{} labels for {} signals",
                labels.len(),
                signals.len()
            )));
        }
        if signals.is_empty() {
            return Err(FeatureError::invalid_input("time series has no regions"));
        }
        let len = signals[0].len();
        for (label, signal) in labels.iter().zip(&signals) {
            if signal.len() != len {
                return Err(FeatureError::invalid_input(format!(
                    "region '{}' has {} samples, expected {}",
                    label,
                    signal.len(),
                    len
                )));
            }
            if signal.iter().any(|v| !v.is_finite()) {
                return Err(FeatureError::invalid_input(format!(
                    "region '{}' has a non-finite sample",
                    label
                )));
            }
        }
        if len < 2 {
            return Err(FeatureError::invalid_input(
                "time series needs at least two time points",
            ));
        }
        Ok(Self { labels, signals })
    }

    /// Parse a table with one row per time point and one column per region.
    pub fn parse_columns(text: &str) -> Result<Self> {
        let mut signals: Vec<Vec<f64>> = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_fields(line);
            if signals.is_empty() {
                signals = vec![Vec::new(); fields.len()];
            } else if fields.len() != signals.len() {
                return Err(FeatureError::invalid_input(format!(
                    "line {}: {} columns, expected {}",
                    line_no,
                    fields.len(),
                    signals.len()
                )));
            }
            for (signal, field) in signals.iter_mut().zip(fields) {
                signal.push(parse_value(field, line_no)?);
            }
        }
        let labels = (0..signals.len()).map(|i| i.to_string()).collect();
        Self::from_signals(labels, signals)
    }

    /// Parse a table with one row per region, the first field its label.
    pub fn parse_labelled(text: &str) -> Result<Self> {
        let mut labels = Vec::new();
        let mut signals = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_fields(line);
            let (label, values) = fields.split_first().ok_or_else(|| {
                FeatureError::invalid_input(format!("line {}: missing region label", line_no))
            })?;
            let signal = values
                .iter()
                .map(|f| parse_value(f, line_no))
                .collect::<Result<Vec<f64>>>()?;
            labels.push(label.trim().to_string());
            signals.push(signal);
        }
        Self::from_signals(labels, signals)
    }

    pub fn region_count(&self) -> usize {
        self.signals.len()
    }

    /// Number of time points per signal.
    pub fn len(&self) -> usize {
        self.signals.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn signal(&self, region: usize) -> &[f64] {
        &self.signals[region]
    }

    /// Population variance of every region's signal.
    pub fn variances(&self) -> Vec<f64> {
        self.signals.iter().map(|s| variance(s)).collect()
    }

    /// Regions whose signal is constant, so their correlation is undefined.
    pub fn constant_regions(&self) -> Vec<usize> {
        self.signals
            .iter()
            .enumerate()
            .filter(|(_, s)| variance(s) == 0.0)
            .map(|(region, _)| region)
            .collect()
    }

    /// Pearson correlation between every pair of regions.
    ///
    /// Fails when a signal is constant, since its correlation is undefined.
    pub fn correlation_matrix(&self) -> Result<CorrelationMatrix> {
        self.correlation_matrix_over(&[])
    }

    /// Pearson correlation where only `analysed` regions (every region when
    /// empty) must have a defined correlation.
    ///
    /// A constant region outside `analysed` gets 0 off the diagonal, which
    /// never forms an edge.
    pub fn correlation_matrix_over(&self, analysed: &[usize]) -> Result<CorrelationMatrix> {
        let n = self.region_count();
        let centered: Vec<Vec<f64>> = self.signals.iter().map(|s| center(s)).collect();
        let norms: Vec<f64> = centered
            .iter()
            .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
            .collect();
        let constant: Vec<usize> = (0..n).filter(|&r| norms[r] == 0.0).collect();
        if let Some(&region) = constant
            .iter()
            .find(|r| analysed.is_empty() || analysed.contains(*r))
        {
            return Err(FeatureError::invalid_input(format!(
                "region '{}' has a constant signal, correlation is undefined",
                self.labels[region]
            )));
        }
        if !constant.is_empty() {
            tracing::debug!(
                "Constant regions {:?} are outside the analysed set, left unconnected",
                constant
            );
        }

        let mut rows = vec![vec![0.0; n]; n];
        for i in 0..n {
            rows[i][i] = 1.0;
            if norms[i] == 0.0 {
                continue;
            }
            for j in 0..i {
                if norms[j] == 0.0 {
                    continue;
                }
                let dot: f64 = centered[i]
                    .iter()
                    .zip(&centered[j])
                    .map(|(a, b)| a * b)
                    .sum();
                let r = (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0);
                rows[i][j] = r;
                rows[j][i] = r;
            }
        }
        CorrelationMatrix::from_rows(rows)
    }
}

/// Regions whose correlations a preset actually reads: every region when
/// correlation features are emitted, otherwise the configured valid set.
fn analysed_regions(config: &ExtractionConfig) -> &[usize] {
    if config.add_correlation_features {
        &[]
    } else {
        config.valid_regions.as_slice()
    }
}

fn mean(signal: &[f64]) -> f64 {
    signal.iter().sum::<f64>() / signal.len() as f64
}

fn center(signal: &[f64]) -> Vec<f64> {
    let m = mean(signal);
    signal.iter().map(|v| v - m).collect()
}

/// Population variance (mean squared deviation); 0 for an empty signal.
pub fn variance(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    center(signal).iter().map(|v| v * v).sum::<f64>() / signal.len() as f64
}

// ============================================================================
// Feature helpers
// ============================================================================

/// `"ICA region <i> Signal Variance"` for every column.
pub fn ica_variance_features(series: &TimeSeries) -> FeatureMap {
    series
        .variances()
        .into_iter()
        .enumerate()
        .map(|(i, v)| (format!("ICA region {} Signal Variance", i), FeatureValue::Real(v)))
        .collect()
}

/// `"<label> Signal Variance"` for every labelled region.
pub fn labelled_variance_features(series: &TimeSeries) -> FeatureMap {
    series
        .labels()
        .iter()
        .zip(series.variances())
        .map(|(label, v)| (format!("{} Signal Variance", label.trim()), FeatureValue::Real(v)))
        .collect()
}

/// One feature per region pair below the diagonal:
/// `"Correlation <prefix><row label> vs <column label>"`.
pub fn correlation_features(matrix: &CorrelationMatrix, labels: &[String], prefix: &str) -> FeatureMap {
    let mut features = FeatureMap::new();
    for row in 0..matrix.size() {
        for col in 0..row {
            let key = format!("Correlation {}{} vs {}", prefix, labels[row], labels[col]);
            features.insert(key.trim().to_string(), FeatureValue::Real(matrix.get(row, col)));
        }
    }
    features
}

// ============================================================================
// Extraction presets
// ============================================================================

/// ICA export: signal variances, optional correlations, and graph features
/// over the configured valid regions labelled `"ICA"`.
pub fn ica_graph_features(
    series: &TimeSeries,
    config: &ExtractionConfig,
    engine: &dyn FeatureEngine,
) -> Result<FeatureMap> {
    let mut features = ica_variance_features(series);
    let matrix = series.correlation_matrix_over(analysed_regions(config))?;
    if config.add_correlation_features {
        features.extend(correlation_features(&matrix, series.labels(), ICA_CORRELATION_PREFIX));
    }
    features.extend(engine.graph_features(&matrix, &config.valid_regions, ICA_LABEL)?);
    tracing::debug!(
        "ICA extraction over {} regions produced {} features",
        series.region_count(),
        features.len()
    );
    Ok(features)
}

/// Generic time series: optional correlations and unlabelled graph features
/// over the configured valid regions.
pub fn time_series_graph_features(
    series: &TimeSeries,
    config: &ExtractionConfig,
    engine: &dyn FeatureEngine,
) -> Result<FeatureMap> {
    let matrix = series.correlation_matrix_over(analysed_regions(config))?;
    let mut features = FeatureMap::new();
    if config.add_correlation_features {
        features.extend(correlation_features(
            &matrix,
            series.labels(),
            REGION_CORRELATION_PREFIX,
        ));
    }
    features.extend(engine.graph_features(&matrix, &config.valid_regions, "")?);
    Ok(features)
}

/// Atlas regions: signal variances, optional correlations, and optional
/// graph features over every region labelled `"Brainnetome Gyri"`.
pub fn atlas_time_series_features(
    series: &TimeSeries,
    config: &ExtractionConfig,
    add_network_features: bool,
    engine: &dyn FeatureEngine,
) -> Result<FeatureMap> {
    let mut features = labelled_variance_features(series);
    if !(add_network_features || config.add_correlation_features) {
        return Ok(features);
    }

    let matrix = series.correlation_matrix()?;
    if config.add_correlation_features {
        features.extend(correlation_features(&matrix, series.labels(), ""));
    }
    if add_network_features {
        let all_regions: Vec<usize> = (0..series.region_count()).collect();
        features.extend(engine.graph_features(&matrix, &all_regions, ATLAS_LABEL)?);
    }
    Ok(features)
}

// ============================================================================
// Tests
// ============================================================================
