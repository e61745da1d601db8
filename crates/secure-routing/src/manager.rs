//! Per-request orchestration around the solver.

use crate::providers::DecisionArchive;
use crate::solver::Solver;
use crate::{Decision, Result, RouteRequest};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Entry point for routing requests: times the solve, enforces the
/// empty-path invariant on unsolved decisions, and forwards every
/// decision to the statistics archive.
pub struct SecureRoutingManager {
    solver: Solver,
    archive: Arc<dyn DecisionArchive>,
}

impl SecureRoutingManager {
    pub fn new(solver: Solver, archive: Arc<dyn DecisionArchive>) -> Self {
        Self { solver, archive }
    }

    pub fn get_secure_decision(&self, request: &RouteRequest) -> Result<Decision> {
        self.timed(request, false)
    }

    pub fn get_secure_shortest_decision(&self, request: &RouteRequest) -> Result<Decision> {
        self.timed(request, true)
    }

    fn timed(&self, request: &RouteRequest, shortest: bool) -> Result<Decision> {
        let start = Instant::now();
        let mut decision = if shortest {
            self.solver.solve_shortest(request)?
        } else {
            self.solver.solve(request)?
        };
        decision.time_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Solved request for service {} in {} ms (solved={})",
            request.service, decision.time_ms, decision.solved
        );

        // An unsolved decision never leaves with a partial path.
        if !decision.solved {
            decision.clear_path();
        }

        self.archive.record(&decision);
        Ok(decision)
    }
}
