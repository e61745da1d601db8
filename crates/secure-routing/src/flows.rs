//! Active secure-flow projection.
//!
//! Tracks which path currently carries each solved flow, keyed by its
//! attachment-point pair. Served read-only to operators; the REST
//! transport lives outside the core.

use crate::{Decision, Path};
use sdn_topology::SwitchPort;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The attachment-point pair identifying one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlowEndpoints {
    pub src: SwitchPort,
    pub dst: SwitchPort,
}

/// In-memory registry of active secure flows.
#[derive(Default)]
pub struct SecureFlowRepository {
    flows: HashMap<FlowEndpoints, Path>,
}

impl SecureFlowRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the path of a solved decision. Unsolved decisions carry
    /// no route and are ignored.
    pub fn register(&mut self, decision: &Decision) {
        if !decision.solved || decision.path.is_empty() {
            return;
        }
        let endpoints = FlowEndpoints {
            src: decision.path.src,
            dst: decision.path.dst,
        };
        self.flows.insert(endpoints, decision.path.clone());
    }

    pub fn remove(&mut self, endpoints: &FlowEndpoints) -> Option<Path> {
        self.flows.remove(endpoints)
    }

    /// All active flows, ordered by endpoints.
    pub fn flows(&self) -> Vec<(FlowEndpoints, Path)> {
        let mut flows: Vec<_> = self
            .flows
            .iter()
            .map(|(endpoints, path)| (*endpoints, path.clone()))
            .collect();
        flows.sort_by_key(|(endpoints, _)| *endpoints);
        flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
