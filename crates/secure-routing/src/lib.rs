//! Secure Routing
//!
//! Multi-criteria path selection for SDN flows. For a requested flow
//! between two attachment points the solver enumerates shortest-path
//! candidates, aggregates per-hop security attributes into path
//! properties, filters candidates through the service's DTSP policy,
//! and picks the winner by load balance when configured to.
//!
//! Finding no qualifying path is a normal outcome, returned as an
//! unsolved decision with an explicitly empty path. Only malformed
//! requests and invalid configuration are errors.

use sdn_topology::{Link, SwitchId, SwitchPort, TopologyError};
use security_model::ServiceId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod decision;
pub mod flows;
pub mod ksp;
pub mod loader;
pub mod manager;
pub mod providers;
pub mod solver;

pub use config::{ConfigError, RoutingConfig, SolverSettings, SolverStrategy};
pub use decision::Decision;
pub use flows::{FlowEndpoints, SecureFlowRepository};
pub use ksp::LinkCost;
pub use manager::SecureRoutingManager;
pub use providers::{
    BandwidthProvider, DecisionArchive, DtspDirectory, InMemoryArchive, InMemoryDtsps,
    StaticBandwidth, StaticTopology, TopologyProvider,
};
pub use solver::{KShortestPathSolver, Solver};

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(SwitchPort),
    #[error("No DTSP configured for service {0}")]
    MissingPolicy(ServiceId),
    #[error("Unknown service: {0}")]
    UnknownService(ServiceId),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

pub type Result<T> = std::result::Result<T, RoutingError>;

/// The principal requesting a flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One routing request: a user asks for a path carrying a service's
/// flow between two attachment points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub user: User,
    pub service: ServiceId,
    pub src: SwitchPort,
    pub dst: SwitchPort,
}

/// An ordered path through the topology. The empty path is the
/// canonical representation of "no route": endpoints are kept but no
/// switches or links are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub src: SwitchPort,
    pub dst: SwitchPort,
    pub switches: Vec<SwitchId>,
    pub links: Vec<Link>,
}

impl Path {
    pub fn new(src: SwitchPort, dst: SwitchPort, switches: Vec<SwitchId>, links: Vec<Link>) -> Self {
        Self {
            src,
            dst,
            switches,
            links,
        }
    }

    /// The unsolved path between two endpoints.
    pub fn empty(src: SwitchPort, dst: SwitchPort) -> Self {
        Self {
            src,
            dst,
            switches: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }

    pub fn hop_count(&self) -> usize {
        self.links.len()
    }

    /// The (egress, ingress) port pairs the flow would cross, for load
    /// projection.
    pub fn link_ports(&self) -> Vec<(SwitchPort, SwitchPort)> {
        self.links.iter().map(|l| (l.src, l.dst)).collect()
    }
}
