//! Uneven-ness Metrics
//!
//! Statistical dispersion measures over a snapshot of per-port
//! bandwidth utilization. A larger value means a less evenly loaded
//! network. Used both as a standalone health metric and as the
//! load-balance objective during secure path selection.
//!
//! Every calculator is a pure function of the snapshot: safe to call
//! repeatedly and concurrently, including speculatively once per
//! candidate path. Rx and tx samples feed one combined distribution.

use sdn_topology::BandwidthSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum UnevenError {
    #[error("Not recognized uneven metric: {0}")]
    UnrecognizedMetric(String),
}

pub type Result<T> = std::result::Result<T, UnevenError>;

/// The available dispersion measures.
///
/// `GapPercent` is a reserved tag: it is not computable yet and always
/// yields 0.0, and it cannot be selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnevenMetric {
    Gap,
    GapPercent,
    Variance,
    VariationCoefficient,
}

impl Default for UnevenMetric {
    /// Variation coefficient is the default: being scale-invariant it
    /// compares meaningfully across links of different capacities.
    fn default() -> Self {
        UnevenMetric::VariationCoefficient
    }
}

impl fmt::Display for UnevenMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnevenMetric::Gap => "gap",
            UnevenMetric::GapPercent => "gap-percent",
            UnevenMetric::Variance => "variance",
            UnevenMetric::VariationCoefficient => "variation-coefficient",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for UnevenMetric {
    type Err = UnevenError;

    /// Parse a configured metric name. Only the selectable metrics are
    /// accepted; anything else is a configuration error.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gap" => Ok(UnevenMetric::Gap),
            "variance" => Ok(UnevenMetric::Variance),
            "variation-coefficient" => Ok(UnevenMetric::VariationCoefficient),
            other => Err(UnevenError::UnrecognizedMetric(other.to_string())),
        }
    }
}

/// Max minus min utilization. 0.0 for fewer than two samples.
pub fn gap(snapshot: &BandwidthSnapshot) -> f64 {
    gap_of(&snapshot.utilizations())
}

/// Population variance of the utilization values.
pub fn variance(snapshot: &BandwidthSnapshot) -> f64 {
    variance_of(&snapshot.utilizations())
}

/// Standard deviation divided by the mean; 0.0 when the mean is zero.
pub fn variation_coefficient(snapshot: &BandwidthSnapshot) -> f64 {
    variation_coefficient_of(&snapshot.utilizations())
}

/// Compute the given metric over the snapshot.
pub fn uneven(metric: UnevenMetric, snapshot: &BandwidthSnapshot) -> f64 {
    match metric {
        UnevenMetric::Gap => gap(snapshot),
        UnevenMetric::GapPercent => 0.0,
        UnevenMetric::Variance => variance(snapshot),
        UnevenMetric::VariationCoefficient => variation_coefficient(snapshot),
    }
}

/// All computable metrics at once, for the network-health report.
pub fn all_unevens(snapshot: &BandwidthSnapshot) -> HashMap<UnevenMetric, f64> {
    debug!("Calculating uneven use of resources");
    let mut unevens = HashMap::new();
    unevens.insert(UnevenMetric::Gap, gap(snapshot));
    unevens.insert(UnevenMetric::Variance, variance(snapshot));
    unevens.insert(
        UnevenMetric::VariationCoefficient,
        variation_coefficient(snapshot),
    );
    unevens
}

fn gap_of(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    max - min
}

fn mean_of(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn variance_of(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_of(values);
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

fn variation_coefficient_of(values: &[f64]) -> f64 {
    let mean = mean_of(values);
    if mean == 0.0 {
        return 0.0;
    }
    variance_of(values).sqrt() / mean
}
