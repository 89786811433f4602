//! Feature key formatting.

use super::models::{FeatureMap, GraphStatistics};

/// Render a threshold the way the feature dictionaries always have:
/// shortest round-trip decimal, with `.0` kept on integral values, and
/// exponent form (`1e-05`, `1e+16`) below 1e-4 or from 1e16 in magnitude.
pub fn format_threshold(threshold: f64) -> String {
    if threshold.is_nan() {
        return "nan".to_string();
    }
    let magnitude = threshold.abs();
    if threshold.is_finite() && magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let text = format!("{:e}", threshold);
        if let Some((mantissa, exponent)) = text.split_once('e') {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            return format!("{}e{}{:0>2}", mantissa, sign, digits);
        }
    }
    let text = threshold.to_string();
    if threshold.is_finite() && !text.contains('.') {
        format!("{}.0", text)
    } else {
        text
    }
}

/// `"<label> <statistic> at Threshold <threshold>"`, or without the label
/// prefix when `label` is empty.
pub fn feature_key(label: &str, statistic: &str, threshold: f64) -> String {
    let label = label.trim();
    if label.is_empty() {
        format!("{} at Threshold {}", statistic, format_threshold(threshold))
    } else {
        format!(
            "{} {} at Threshold {}",
            label,
            statistic,
            format_threshold(threshold)
        )
    }
}

/// Flatten one threshold's statistics into named features.
///
/// Every statistic of the vocabulary is emitted, zero or not.
pub fn name_features(statistics: &GraphStatistics, threshold: f64, label: &str) -> FeatureMap {
    statistics
        .entries()
        .into_iter()
        .map(|(statistic, value)| (feature_key(label, statistic.name(), threshold), value))
        .collect()
}
