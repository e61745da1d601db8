//! The result object of one path-selection request.

use crate::{Path, User};
use chrono::{DateTime, Utc};
use sdn_topology::SwitchPort;
use security_model::{SecurityVector, ServiceId};
use serde::{Deserialize, Serialize};

/// Outcome of one solve. Created fresh per request; the routing
/// manager backfills the elapsed time and forwards the decision to the
/// statistics archive. An unsolved decision always carries an empty
/// path, never a partial one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub user: User,
    pub service: ServiceId,
    pub path: Path,
    /// Aggregated path security properties: the winning path's when
    /// solved, the best-ranked rejected candidate's as diagnostics when
    /// not, absent when the graph offered no candidate at all.
    pub properties: Option<SecurityVector>,
    /// Per-dimension risk values reported by the policy evaluator.
    pub risk: Option<SecurityVector>,
    pub solved: bool,
    /// Load-balance score of the winning candidate, when the solver
    /// selected by minimum uneven-ness.
    pub uneven: Option<f64>,
    /// Wall-clock solve time in milliseconds, recorded by the manager.
    pub time_ms: u64,
    pub decided_at: DateTime<Utc>,
}

impl Decision {
    pub fn solved(
        user: User,
        service: ServiceId,
        path: Path,
        properties: SecurityVector,
        risk: Option<SecurityVector>,
        uneven: Option<f64>,
    ) -> Self {
        Self {
            user,
            service,
            path,
            properties: Some(properties),
            risk,
            solved: true,
            uneven,
            time_ms: 0,
            decided_at: Utc::now(),
        }
    }

    pub fn unsolved(
        user: User,
        service: ServiceId,
        src: SwitchPort,
        dst: SwitchPort,
        properties: Option<SecurityVector>,
        risk: Option<SecurityVector>,
    ) -> Self {
        Self {
            user,
            service,
            path: Path::empty(src, dst),
            properties,
            risk,
            solved: false,
            uneven: None,
            time_ms: 0,
            decided_at: Utc::now(),
        }
    }

    /// Replace the path with the canonical empty path, keeping the
    /// endpoints.
    pub fn clear_path(&mut self) {
        self.path = Path::empty(self.path.src, self.path.dst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdn_topology::{Link, PortNo, SwitchId, SwitchPort};

    fn port(switch: u64, port: u32) -> SwitchPort {
        SwitchPort::new(SwitchId(switch), PortNo(port))
    }

    #[test]
    fn test_unsolved_carries_empty_path() {
        let decision = Decision::unsolved(
            User::new("u1", "alice"),
            ServiceId::new("svc"),
            port(1, 1),
            port(2, 1),
            None,
            None,
        );
        assert!(!decision.solved);
        assert!(decision.path.is_empty());
        assert_eq!(decision.path.src, port(1, 1));
    }

    #[test]
    fn test_clear_path_keeps_endpoints() {
        let link = Link::new(port(1, 2), port(2, 1), 1_000_000_000);
        let path = Path::new(
            port(1, 1),
            port(2, 2),
            vec![SwitchId(1), SwitchId(2)],
            vec![link],
        );
        let mut decision = Decision::solved(
            User::new("u1", "alice"),
            ServiceId::new("svc"),
            path,
            SecurityVector::default(),
            None,
            None,
        );

        decision.clear_path();
        assert!(decision.path.is_empty());
        assert_eq!(decision.path.src, port(1, 1));
        assert_eq!(decision.path.dst, port(2, 2));
    }
}
