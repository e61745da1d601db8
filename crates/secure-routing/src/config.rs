//! Routing configuration, validated at startup.
//!
//! The raw `RoutingConfig` mirrors what the operator writes; `validate`
//! turns it into `SolverSettings` or refuses to start. Ambiguous
//! configuration is always fatal: a missing solver strategy, a missing
//! `choose_min_uneven` flag, or an unrecognized metric name stop the
//! service rather than run with a silently picked policy.

use crate::ksp::LinkCost;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uneven_metrics::{UnevenError, UnevenMetric};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Solver not configured")]
    SolverNotConfigured,
    #[error("Unrecognized solver configured: {0}")]
    UnrecognizedSolver(String),
    #[error("Choose min uneven option not set")]
    ChooseMinUnevenNotSet,
    #[error(transparent)]
    UnrecognizedMetric(#[from] UnevenError),
    #[error("Unrecognized link cost configured: {0}")]
    UnrecognizedLinkCost(String),
}

/// The closed set of solver strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStrategy {
    KShortestPaths,
}

/// Raw configuration as loaded from the operator's file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub solver: Option<String>,
    pub k: Option<usize>,
    pub max_paths: Option<usize>,
    pub choose_min_uneven: Option<bool>,
    pub uneven_metric: Option<String>,
    pub link_cost: Option<String>,
}

/// Validated settings the solver is constructed from.
#[derive(Debug, Clone)]
pub struct SolverSettings {
    pub strategy: SolverStrategy,
    /// Number of candidate paths to yield; `usize::MAX` when unbounded.
    pub k: usize,
    /// Candidates considered overall; `usize::MAX` when unbounded.
    pub max_paths: usize,
    pub choose_min_uneven: bool,
    pub uneven_metric: UnevenMetric,
    pub link_cost: LinkCost,
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<SolverSettings, ConfigError> {
        let strategy = match self.solver.as_deref() {
            None | Some("") => return Err(ConfigError::SolverNotConfigured),
            Some("k-shortest-paths") => {
                info!("Configured to use the k-shortest-paths solver");
                SolverStrategy::KShortestPaths
            }
            Some(other) => return Err(ConfigError::UnrecognizedSolver(other.to_string())),
        };

        let k = match self.k {
            Some(k) => {
                info!("K shortest paths set to {}", k);
                k
            }
            None => {
                info!("K shortest paths not set. Defaulting to unbounded");
                usize::MAX
            }
        };

        let max_paths = match self.max_paths {
            Some(max) => {
                info!("Max paths set to {}", max);
                max
            }
            None => {
                info!("Max paths not set. Defaulting to unbounded");
                usize::MAX
            }
        };

        let choose_min_uneven = self
            .choose_min_uneven
            .ok_or(ConfigError::ChooseMinUnevenNotSet)?;
        info!("Choose min uneven option set to {}", choose_min_uneven);

        let uneven_metric = match self.uneven_metric.as_deref() {
            Some(name) => {
                let metric: UnevenMetric = name.parse()?;
                info!("Uneven metric set to {}", metric);
                metric
            }
            None => {
                let metric = UnevenMetric::default();
                info!("Uneven metric not set. Defaulting to {}", metric);
                metric
            }
        };

        let link_cost = match self.link_cost.as_deref() {
            None | Some("hops") => LinkCost::Hops,
            Some("inverse-speed") => LinkCost::InverseSpeed,
            Some(other) => return Err(ConfigError::UnrecognizedLinkCost(other.to_string())),
        };

        Ok(SolverSettings {
            strategy,
            k,
            max_paths,
            choose_min_uneven,
            uneven_metric,
            link_cost,
        })
    }
}

impl SolverSettings {
    /// Settings for tests and embedders that skip file configuration:
    /// unbounded enumeration, first-qualifier selection, default metric.
    pub fn basic() -> Self {
        Self {
            strategy: SolverStrategy::KShortestPaths,
            k: usize::MAX,
            max_paths: usize::MAX,
            choose_min_uneven: false,
            uneven_metric: UnevenMetric::default(),
            link_cost: LinkCost::Hops,
        }
    }
}
