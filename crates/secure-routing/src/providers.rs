//! Boundary contracts of the decision core.
//!
//! Topology discovery, bandwidth collection, policy storage and the
//! statistics archive live outside the core. Each is injected as a
//! narrow capability at construction time; the in-memory
//! implementations below back tests and the CLI.

use crate::Decision;
use sdn_topology::{BandwidthSnapshot, TopologyGraph};
use security_model::{Dtsp, Service, ServiceId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Source of topology snapshots. A returned snapshot must be
/// internally consistent; publishing a fresh `Arc` per change keeps
/// concurrent solves from observing partial updates.
pub trait TopologyProvider: Send + Sync {
    fn topology(&self) -> Arc<TopologyGraph>;
}

/// Source of the latest per-port bandwidth snapshot.
pub trait BandwidthProvider: Send + Sync {
    fn bandwidth(&self) -> BandwidthSnapshot;
}

/// Lookup of services and their DTSP policies.
pub trait DtspDirectory: Send + Sync {
    fn dtsp_for(&self, service: &ServiceId) -> Option<Dtsp>;
    fn service(&self, service: &ServiceId) -> Option<Service>;
}

/// Sink for completed decisions. Fire-and-forget: the core never reads
/// anything back.
pub trait DecisionArchive: Send + Sync {
    fn record(&self, decision: &Decision);
}

/// A fixed topology snapshot.
pub struct StaticTopology {
    graph: Arc<TopologyGraph>,
}

impl StaticTopology {
    pub fn new(graph: TopologyGraph) -> Self {
        Self {
            graph: Arc::new(graph),
        }
    }
}

impl TopologyProvider for StaticTopology {
    fn topology(&self) -> Arc<TopologyGraph> {
        Arc::clone(&self.graph)
    }
}

/// A fixed bandwidth snapshot.
pub struct StaticBandwidth {
    snapshot: BandwidthSnapshot,
}

impl StaticBandwidth {
    pub fn new(snapshot: BandwidthSnapshot) -> Self {
        Self { snapshot }
    }
}

impl BandwidthProvider for StaticBandwidth {
    fn bandwidth(&self) -> BandwidthSnapshot {
        self.snapshot.clone()
    }
}

/// Service and policy directory held in memory.
#[derive(Default)]
pub struct InMemoryDtsps {
    services: HashMap<ServiceId, Service>,
    dtsps: HashMap<ServiceId, Dtsp>,
}

impl InMemoryDtsps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, service: Service, dtsp: Dtsp) {
        self.dtsps.insert(service.id.clone(), dtsp);
        self.services.insert(service.id.clone(), service);
    }
}

impl DtspDirectory for InMemoryDtsps {
    fn dtsp_for(&self, service: &ServiceId) -> Option<Dtsp> {
        self.dtsps.get(service).cloned()
    }

    fn service(&self, service: &ServiceId) -> Option<Service> {
        self.services.get(service).cloned()
    }
}

/// Archive keeping recorded decisions in memory, for tests and the CLI
/// summary.
#[derive(Default)]
pub struct InMemoryArchive {
    decisions: Mutex<Vec<Decision>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<Decision> {
        self.decisions.lock().expect("archive lock poisoned").clone()
    }
}

impl DecisionArchive for InMemoryArchive {
    fn record(&self, decision: &Decision) {
        self.decisions
            .lock()
            .expect("archive lock poisoned")
            .push(decision.clone());
    }
}
