//! The secure path solver.
//!
//! Candidates are enumerated in ascending cost order, reduced to
//! path-level security properties, filtered through the service's
//! DTSP by the risk evaluator, and the winner picked either as the
//! first qualifier (the shortest, by construction) or as the qualifier
//! whose projected load leaves the network most evenly used.

use crate::config::{SolverSettings, SolverStrategy};
use crate::decision::Decision;
use crate::ksp::{k_shortest_paths, CandidatePath};
use crate::providers::{BandwidthProvider, DtspDirectory, TopologyProvider};
use crate::{Path, Result, RouteRequest, RoutingError};
use sdn_topology::{Switch, TopologyGraph};
use security_model::{aggregate_path_properties, RiskEvaluator, SecurityVector};
use std::sync::Arc;
use tracing::{debug, info};
use uneven_metrics::uneven;

/// Solver working over up-to-k shortest candidates.
pub struct KShortestPathSolver {
    topology: Arc<dyn TopologyProvider>,
    bandwidth: Arc<dyn BandwidthProvider>,
    dtsps: Arc<dyn DtspDirectory>,
    risk: Arc<dyn RiskEvaluator>,
    settings: SolverSettings,
}

impl KShortestPathSolver {
    pub fn new(
        topology: Arc<dyn TopologyProvider>,
        bandwidth: Arc<dyn BandwidthProvider>,
        dtsps: Arc<dyn DtspDirectory>,
        risk: Arc<dyn RiskEvaluator>,
        settings: SolverSettings,
    ) -> Self {
        Self {
            topology,
            bandwidth,
            dtsps,
            risk,
            settings,
        }
    }

    /// Pick a path satisfying the service's DTSP, balancing load when
    /// configured to. No qualifying path is a normal unsolved decision.
    pub fn solve(&self, request: &RouteRequest) -> Result<Decision> {
        let graph = self.topology.topology();
        validate_endpoints(&graph, request)?;

        let dtsp = self
            .dtsps
            .dtsp_for(&request.service)
            .ok_or_else(|| RoutingError::MissingPolicy(request.service.clone()))?;
        let service = self
            .dtsps
            .service(&request.service)
            .ok_or_else(|| RoutingError::UnknownService(request.service.clone()))?;

        let candidates = k_shortest_paths(
            &graph,
            request.src.switch,
            request.dst.switch,
            self.settings.k,
            self.settings.max_paths,
            self.settings.link_cost,
        );
        debug!(
            "{} candidate paths between {} and {}",
            candidates.len(),
            request.src,
            request.dst
        );

        let mut rejected_diag: Option<(SecurityVector, SecurityVector)> = None;
        let mut qualifying: Vec<(CandidatePath, SecurityVector, SecurityVector)> = Vec::new();

        for candidate in candidates {
            let properties = aggregate_candidate(&graph, &candidate);
            let verdict = self.risk.evaluate(&properties, &dtsp);
            if verdict.within_policy {
                qualifying.push((candidate, properties, verdict.risk));
                if !self.settings.choose_min_uneven {
                    break; // The first qualifier is also the shortest
                }
            } else if rejected_diag.is_none() {
                rejected_diag = Some((properties, verdict.risk));
            }
        }

        let selected = if self.settings.choose_min_uneven {
            let snapshot = self.bandwidth.bandwidth();
            let mut best: Option<(CandidatePath, SecurityVector, SecurityVector)> = None;
            let mut best_score = f64::INFINITY;
            for (candidate, properties, risk) in qualifying {
                let ports: Vec<_> = candidate.links.iter().map(|l| (l.src, l.dst)).collect();
                let projected = snapshot.project_flow(&ports, service.demand_bps);
                let score = uneven(self.settings.uneven_metric, &projected);
                debug!(
                    "Candidate via {:?} scores {} = {:.6}",
                    candidate.switches, self.settings.uneven_metric, score
                );
                if score < best_score {
                    best_score = score;
                    best = Some((candidate, properties, risk));
                }
            }
            best.map(|(candidate, properties, risk)| (candidate, properties, risk, Some(best_score)))
        } else {
            qualifying
                .into_iter()
                .next()
                .map(|(candidate, properties, risk)| (candidate, properties, risk, None))
        };

        match selected {
            Some((candidate, properties, risk, uneven_score)) => {
                let path = Path::new(
                    request.src,
                    request.dst,
                    candidate.switches,
                    candidate.links,
                );
                Ok(Decision::solved(
                    request.user.clone(),
                    request.service.clone(),
                    path,
                    properties,
                    Some(risk),
                    uneven_score,
                ))
            }
            None => {
                info!(
                    "No candidate path satisfies the policy for service {}",
                    request.service
                );
                let (properties, risk) = match rejected_diag {
                    Some((properties, risk)) => (Some(properties), Some(risk)),
                    None => (None, None),
                };
                Ok(Decision::unsolved(
                    request.user.clone(),
                    request.service.clone(),
                    request.src,
                    request.dst,
                    properties,
                    risk,
                ))
            }
        }
    }

    /// Plain shortest path: no policy filtering, no load balancing.
    pub fn solve_shortest(&self, request: &RouteRequest) -> Result<Decision> {
        let graph = self.topology.topology();
        validate_endpoints(&graph, request)?;

        let mut paths = k_shortest_paths(
            &graph,
            request.src.switch,
            request.dst.switch,
            1,
            1,
            self.settings.link_cost,
        );

        match paths.pop() {
            Some(candidate) => {
                let properties = aggregate_candidate(&graph, &candidate);
                let path = Path::new(
                    request.src,
                    request.dst,
                    candidate.switches,
                    candidate.links,
                );
                Ok(Decision::solved(
                    request.user.clone(),
                    request.service.clone(),
                    path,
                    properties,
                    None,
                    None,
                ))
            }
            None => Ok(Decision::unsolved(
                request.user.clone(),
                request.service.clone(),
                request.src,
                request.dst,
                None,
                None,
            )),
        }
    }
}

/// The closed set of solvers, chosen at construction from validated
/// configuration.
pub enum Solver {
    KShortestPaths(KShortestPathSolver),
}

impl Solver {
    pub fn from_settings(
        settings: SolverSettings,
        topology: Arc<dyn TopologyProvider>,
        bandwidth: Arc<dyn BandwidthProvider>,
        dtsps: Arc<dyn DtspDirectory>,
        risk: Arc<dyn RiskEvaluator>,
    ) -> Self {
        match settings.strategy {
            SolverStrategy::KShortestPaths => Solver::KShortestPaths(KShortestPathSolver::new(
                topology, bandwidth, dtsps, risk, settings,
            )),
        }
    }

    pub fn solve(&self, request: &RouteRequest) -> Result<Decision> {
        match self {
            Solver::KShortestPaths(solver) => solver.solve(request),
        }
    }

    pub fn solve_shortest(&self, request: &RouteRequest) -> Result<Decision> {
        match self {
            Solver::KShortestPaths(solver) => solver.solve_shortest(request),
        }
    }
}

fn validate_endpoints(graph: &TopologyGraph, request: &RouteRequest) -> Result<()> {
    if !graph.contains(request.src.switch) {
        return Err(RoutingError::UnknownEndpoint(request.src));
    }
    if !graph.contains(request.dst.switch) {
        return Err(RoutingError::UnknownEndpoint(request.dst));
    }
    Ok(())
}

fn aggregate_candidate(graph: &TopologyGraph, candidate: &CandidatePath) -> SecurityVector {
    let switches: Vec<&Switch> = candidate
        .switches
        .iter()
        .filter_map(|id| graph.switch(*id))
        .collect();
    let links: Vec<_> = candidate.links.iter().collect();
    aggregate_path_properties(&switches, &links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverSettings;
    use crate::providers::{InMemoryDtsps, StaticBandwidth, StaticTopology};
    use crate::User;
    use sdn_topology::{
        BandwidthSnapshot, Link, PortBandwidth, PortNo, Switch, SwitchId, SwitchPort,
    };
    use security_model::{Dtsp, SecurityVector, Service, ServiceId, ThresholdRiskEvaluator};
    use uneven_metrics::UnevenMetric;

    fn port(switch: u64, port: u32) -> SwitchPort {
        SwitchPort::new(SwitchId(switch), PortNo(port))
    }

    fn dtsp_requiring(requirements: SecurityVector) -> Dtsp {
        Dtsp::new(
            ServiceId::new("svc"),
            requirements,
            SecurityVector::uniform(1.0),
            SecurityVector::uniform(1.0),
        )
    }

    fn make_solver(
        graph: TopologyGraph,
        snapshot: BandwidthSnapshot,
        dtsp: Dtsp,
        demand_bps: u64,
        settings: SolverSettings,
    ) -> KShortestPathSolver {
        let mut dtsps = InMemoryDtsps::new();
        dtsps.insert(Service::new("svc", "test service", demand_bps), dtsp);
        KShortestPathSolver::new(
            Arc::new(StaticTopology::new(graph)),
            Arc::new(StaticBandwidth::new(snapshot)),
            Arc::new(dtsps),
            Arc::new(ThresholdRiskEvaluator::new()),
            settings,
        )
    }

    fn request(src: SwitchPort, dst: SwitchPort) -> RouteRequest {
        RouteRequest {
            user: User::new("u1", "alice"),
            service: ServiceId::new("svc"),
            src,
            dst,
        }
    }

    /// 1 -(c=0.9)-> 2, single link.
    fn single_path_graph() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_switch(Switch::new(SwitchId(1)));
        graph.add_switch(Switch::new(SwitchId(2)));
        let link = Link::with_security(port(1, 2), port(2, 1), 1_000_000_000, 0.9, 0.99, 0.99);
        graph.add_duplex_link(link).unwrap();
        graph
    }

    /// Diamond 1 -> {2, 3} -> 4; switch 2 has trust 0.5, the rest 0.9.
    fn diamond_graph() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_switch(Switch::with_trust(SwitchId(1), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(2), 0.5));
        graph.add_switch(Switch::with_trust(SwitchId(3), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(4), 0.9));
        for (a, b) in [(1u64, 2u64), (2, 4), (1, 3), (3, 4)] {
            graph
                .add_duplex_link(Link::new(port(a, b as u32), port(b, a as u32), 1_000_000_000))
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_single_path_satisfies_policy() {
        let mut requirements = SecurityVector::uniform(0.0);
        requirements.confidentiality = 0.5;
        let solver = make_solver(
            single_path_graph(),
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            SolverSettings::basic(),
        );

        let decision = solver.solve(&request(port(1, 1), port(2, 2))).unwrap();
        assert!(decision.solved);
        assert_eq!(decision.path.hop_count(), 1);
        let properties = decision.properties.unwrap();
        assert!((properties.confidentiality - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_trust_requirement_selects_trusted_branch() {
        let mut requirements = SecurityVector::uniform(0.0);
        requirements.trust = 0.8;
        let solver = make_solver(
            diamond_graph(),
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            SolverSettings::basic(),
        );

        let decision = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        assert!(decision.solved);
        assert_eq!(
            decision.path.switches,
            vec![SwitchId(1), SwitchId(3), SwitchId(4)]
        );
        let properties = decision.properties.unwrap();
        assert!((properties.trust - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_all_candidates_failing_yields_unsolved() {
        let mut requirements = SecurityVector::uniform(0.0);
        requirements.trust = 0.95;
        let solver = make_solver(
            diamond_graph(),
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            SolverSettings::basic(),
        );

        let decision = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        assert!(!decision.solved);
        assert!(decision.path.is_empty());
        // Diagnostics from the best-ranked rejected candidate
        assert!(decision.properties.is_some());
        assert!(decision.risk.is_some());
    }

    #[test]
    fn test_no_route_yields_unsolved_without_diagnostics() {
        let mut graph = diamond_graph();
        graph.add_switch(Switch::new(SwitchId(9)));
        let solver = make_solver(
            graph,
            BandwidthSnapshot::new(),
            dtsp_requiring(SecurityVector::uniform(0.0)),
            0,
            SolverSettings::basic(),
        );

        let decision = solver.solve(&request(port(1, 1), port(9, 1))).unwrap();
        assert!(!decision.solved);
        assert!(decision.path.is_empty());
        assert!(decision.properties.is_none());
        assert!(decision.risk.is_none());
    }

    #[test]
    fn test_min_uneven_prefers_even_projection() {
        // Branch via switch 2 is cool (0.1), branch via switch 3 is
        // already hot (0.9). Routing onto the hot branch spreads the
        // distribution further apart.
        let graph = diamond_graph();
        let mut snapshot = BandwidthSnapshot::new();
        for (a, b) in [(1u64, 2u32), (2, 1), (2, 4), (4, 2)] {
            snapshot.insert(PortBandwidth::new(
                port(a, b),
                1_000_000_000,
                100_000_000,
                100_000_000,
            ));
        }
        for (a, b) in [(1u64, 3u32), (3, 1), (3, 4), (4, 3)] {
            snapshot.insert(PortBandwidth::new(
                port(a, b),
                1_000_000_000,
                900_000_000,
                900_000_000,
            ));
        }

        let mut settings = SolverSettings::basic();
        settings.choose_min_uneven = true;
        settings.uneven_metric = UnevenMetric::VariationCoefficient;

        let solver = make_solver(
            graph,
            snapshot,
            dtsp_requiring(SecurityVector::uniform(0.0)),
            50_000_000,
            settings,
        );

        let decision = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        assert!(decision.solved);
        assert_eq!(
            decision.path.switches,
            vec![SwitchId(1), SwitchId(2), SwitchId(4)]
        );
        assert!(decision.uneven.unwrap() >= 0.0);
    }

    #[test]
    fn test_solve_shortest_ignores_policy() {
        // The only path fails a trust requirement that solve enforces.
        let mut graph = TopologyGraph::new();
        graph.add_switch(Switch::with_trust(SwitchId(1), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(2), 0.2));
        graph
            .add_duplex_link(Link::new(port(1, 2), port(2, 1), 1_000_000_000))
            .unwrap();

        let mut requirements = SecurityVector::uniform(0.0);
        requirements.trust = 0.8;
        let solver = make_solver(
            graph,
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            SolverSettings::basic(),
        );

        let secure = solver.solve(&request(port(1, 1), port(2, 2))).unwrap();
        assert!(!secure.solved);

        let shortest = solver
            .solve_shortest(&request(port(1, 1), port(2, 2)))
            .unwrap();
        assert!(shortest.solved);
        assert_eq!(shortest.path.hop_count(), 1);
        assert!(shortest.risk.is_none());
        assert!(shortest.uneven.is_none());
    }

    #[test]
    fn test_k_bound_limits_considered_candidates() {
        // Shortest path fails the policy; a longer one would pass, but
        // k = 1 stops the enumeration before reaching it.
        let mut graph = TopologyGraph::new();
        graph.add_switch(Switch::with_trust(SwitchId(1), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(2), 0.2));
        graph.add_switch(Switch::with_trust(SwitchId(3), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(4), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(5), 0.9));
        for (a, b) in [(1u64, 2u64), (2, 4), (1, 3), (3, 5), (5, 4)] {
            graph
                .add_duplex_link(Link::new(port(a, b as u32), port(b, a as u32), 1_000_000_000))
                .unwrap();
        }

        let mut requirements = SecurityVector::uniform(0.0);
        requirements.trust = 0.8;

        let mut bounded = SolverSettings::basic();
        bounded.k = 1;
        let solver = make_solver(
            graph,
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            bounded,
        );
        let decision = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        assert!(!decision.solved);
    }

    #[test]
    fn test_unbounded_finds_longer_qualifying_path() {
        let mut graph = TopologyGraph::new();
        graph.add_switch(Switch::with_trust(SwitchId(1), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(2), 0.2));
        graph.add_switch(Switch::with_trust(SwitchId(3), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(4), 0.9));
        graph.add_switch(Switch::with_trust(SwitchId(5), 0.9));
        for (a, b) in [(1u64, 2u64), (2, 4), (1, 3), (3, 5), (5, 4)] {
            graph
                .add_duplex_link(Link::new(port(a, b as u32), port(b, a as u32), 1_000_000_000))
                .unwrap();
        }

        let mut requirements = SecurityVector::uniform(0.0);
        requirements.trust = 0.8;
        let solver = make_solver(
            graph,
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            SolverSettings::basic(),
        );
        let decision = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        assert!(decision.solved);
        assert_eq!(
            decision.path.switches,
            vec![SwitchId(1), SwitchId(3), SwitchId(5), SwitchId(4)]
        );
    }

    #[test]
    fn test_unknown_endpoint_is_a_caller_error() {
        let solver = make_solver(
            single_path_graph(),
            BandwidthSnapshot::new(),
            dtsp_requiring(SecurityVector::uniform(0.0)),
            0,
            SolverSettings::basic(),
        );
        let result = solver.solve(&request(port(99, 1), port(2, 1)));
        assert!(matches!(result, Err(RoutingError::UnknownEndpoint(_))));
    }

    #[test]
    fn test_missing_dtsp_is_a_caller_error() {
        let solver = KShortestPathSolver::new(
            Arc::new(StaticTopology::new(single_path_graph())),
            Arc::new(StaticBandwidth::new(BandwidthSnapshot::new())),
            Arc::new(InMemoryDtsps::new()),
            Arc::new(ThresholdRiskEvaluator::new()),
            SolverSettings::basic(),
        );
        let result = solver.solve(&request(port(1, 1), port(2, 1)));
        assert!(matches!(result, Err(RoutingError::MissingPolicy(_))));
    }

    #[test]
    fn test_repeated_solves_are_identical() {
        let mut requirements = SecurityVector::uniform(0.0);
        requirements.trust = 0.8;
        let solver = make_solver(
            diamond_graph(),
            BandwidthSnapshot::new(),
            dtsp_requiring(requirements),
            0,
            SolverSettings::basic(),
        );

        let first = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        let second = solver.solve(&request(port(1, 1), port(4, 1))).unwrap();
        assert_eq!(first.solved, second.solved);
        assert_eq!(first.path.switches, second.path.switches);
        assert_eq!(first.properties, second.properties);
    }
}
