//! Policy and risk evaluation of aggregated path properties.

use crate::{Dtsp, SecurityDimension, SecurityVector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of evaluating one candidate path against a DTSP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyVerdict {
    /// Whether the path satisfies the policy on every dimension.
    pub within_policy: bool,
    /// Diagnostic risk value per dimension, surfaced on the decision.
    pub risk: SecurityVector,
}

/// The policy/risk collaborator consumed by the solver. Implementations
/// decide whether aggregated path properties satisfy a DTSP and score
/// the residual risk; the solver treats this as a black box.
pub trait RiskEvaluator: Send + Sync {
    fn evaluate(&self, properties: &SecurityVector, dtsp: &Dtsp) -> PolicyVerdict;
}

/// Threshold evaluator shipped with the core.
///
/// A dimension's risk is its consequence-weighted insecurity,
/// `(1 - value) * consequence`. The path is within policy when every
/// dimension meets the DTSP requirement and its risk stays inside the
/// acceptable-risk-increase budget; the two gates reject independently.
#[derive(Debug, Clone, Default)]
pub struct ThresholdRiskEvaluator;

impl ThresholdRiskEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl RiskEvaluator for ThresholdRiskEvaluator {
    fn evaluate(&self, properties: &SecurityVector, dtsp: &Dtsp) -> PolicyVerdict {
        let mut within_policy = true;
        let mut risk = SecurityVector::zero();

        for dimension in SecurityDimension::ALL {
            let value = properties.get(dimension);
            let required = dtsp.requirements.get(dimension);
            let consequence = dtsp.consequences.get(dimension);
            let budget = dtsp.acceptable_risk_increase.get(dimension);

            let dimension_risk = (1.0 - value).max(0.0) * consequence;
            risk.set(dimension, dimension_risk);

            if value < required {
                debug!(
                    "Requirement violated on {}: {:.3} < {:.3}",
                    dimension, value, required
                );
                within_policy = false;
            }
            if dimension_risk > budget {
                debug!(
                    "Risk budget exceeded on {}: {:.3} > {:.3}",
                    dimension, dimension_risk, budget
                );
                within_policy = false;
            }
        }

        PolicyVerdict {
            within_policy,
            risk,
        }
    }
}
