//! SDN Topology Model
//!
//! Read-only topology snapshots consumed by the secure routing core:
//! switches carrying a trust attribute, directed links carrying
//! confidentiality/integrity/availability attributes and a link speed,
//! plus per-port bandwidth samples.
//!
//! The graph is owned by an external discovery module; the routing core
//! only reads a published snapshot. Nothing here locks: a snapshot must
//! be internally consistent when handed over.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod bandwidth;

pub use bandwidth::{BandwidthSnapshot, PortBandwidth};

/// Trust assigned to a freshly discovered switch. Kept below 1.0: no
/// device is ever treated as perfectly trusted.
pub const DEFAULT_TRUST: f64 = 0.99;

/// Confidentiality/integrity/availability assigned to a freshly
/// discovered link.
pub const DEFAULT_LINK_SECURITY: f64 = 0.99;

#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("Switch not found: {0}")]
    UnknownSwitch(SwitchId),
    #[error("Link not found: {0} -> {1}")]
    UnknownLink(SwitchPort, SwitchPort),
}

pub type Result<T> = std::result::Result<T, TopologyError>;

/// Datapath identity of a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwitchId(pub u64);

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Port number on a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortNo(pub u32);

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An attachment point: one port on one switch. Used both as flow
/// endpoint identity and as the key for bandwidth samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SwitchPort {
    pub switch: SwitchId,
    pub port: PortNo,
}

impl SwitchPort {
    pub fn new(switch: SwitchId, port: PortNo) -> Self {
        Self { switch, port }
    }
}

impl fmt::Display for SwitchPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.switch, self.port)
    }
}

/// A switch node. Trust is mutated over time by the external security
/// attribute feed; the routing core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    pub id: SwitchId,
    /// Trust level in [0, 1].
    pub trust: f64,
}

impl Switch {
    pub fn new(id: SwitchId) -> Self {
        Self {
            id,
            trust: DEFAULT_TRUST,
        }
    }

    pub fn with_trust(id: SwitchId, trust: f64) -> Self {
        Self { id, trust }
    }
}

/// A directed link between two attachment points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub src: SwitchPort,
    pub dst: SwitchPort,
    /// Confidentiality level in [0, 1].
    pub confidentiality: f64,
    /// Integrity level in [0, 1].
    pub integrity: f64,
    /// Availability level in [0, 1].
    pub availability: f64,
    /// Nominal link speed in bits per second.
    pub speed_bps: u64,
}

impl Link {
    pub fn new(src: SwitchPort, dst: SwitchPort, speed_bps: u64) -> Self {
        Self {
            src,
            dst,
            confidentiality: DEFAULT_LINK_SECURITY,
            integrity: DEFAULT_LINK_SECURITY,
            availability: DEFAULT_LINK_SECURITY,
            speed_bps,
        }
    }

    pub fn with_security(
        src: SwitchPort,
        dst: SwitchPort,
        speed_bps: u64,
        confidentiality: f64,
        integrity: f64,
        availability: f64,
    ) -> Self {
        Self {
            src,
            dst,
            confidentiality,
            integrity,
            availability,
            speed_bps,
        }
    }

    /// The link with src and dst swapped, carrying the same attributes.
    pub fn reversed(&self) -> Self {
        Self {
            src: self.dst,
            dst: self.src,
            ..self.clone()
        }
    }
}

/// The topology graph: switches as nodes, links as directed edges.
pub struct TopologyGraph {
    graph: DiGraph<Switch, Link>,
    index: HashMap<SwitchId, NodeIndex>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a switch to the graph.
    pub fn add_switch(&mut self, switch: Switch) -> NodeIndex {
        let id = switch.id;
        let idx = self.graph.add_node(switch);
        self.index.insert(id, idx);
        idx
    }

    /// Add a directed link. Both endpoints must already be present.
    pub fn add_link(&mut self, link: Link) -> Result<()> {
        let from = self.require_index(link.src.switch)?;
        let to = self.require_index(link.dst.switch)?;
        self.graph.add_edge(from, to, link);
        Ok(())
    }

    /// Add a link in both directions with the same attributes.
    pub fn add_duplex_link(&mut self, link: Link) -> Result<()> {
        self.add_link(link.reversed())?;
        self.add_link(link)
    }

    pub fn contains(&self, id: SwitchId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn switch(&self, id: SwitchId) -> Option<&Switch> {
        self.index.get(&id).map(|idx| &self.graph[*idx])
    }

    pub fn switch_mut(&mut self, id: SwitchId) -> Option<&mut Switch> {
        let idx = *self.index.get(&id)?;
        Some(&mut self.graph[idx])
    }

    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.graph.node_weights()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.graph.edge_weights()
    }

    /// Links leaving the given switch.
    pub fn links_from(&self, id: SwitchId) -> impl Iterator<Item = &Link> + '_ {
        self.index
            .get(&id)
            .into_iter()
            .flat_map(move |idx| self.graph.edges(*idx).map(|e| e.weight()))
    }

    /// Find the link between two attachment points.
    pub fn link(&self, src: SwitchPort, dst: SwitchPort) -> Option<&Link> {
        self.links_from(src.switch)
            .find(|l| l.src == src && l.dst == dst)
    }

    /// Mutable lookup of a link by its attachment points.
    pub fn link_mut(&mut self, src: SwitchPort, dst: SwitchPort) -> Result<&mut Link> {
        let from = self.require_index(src.switch)?;
        let edge = self
            .graph
            .edges(from)
            .find(|e| {
                let l = e.weight();
                l.src == src && l.dst == dst
            })
            .map(|e| e.id())
            .ok_or(TopologyError::UnknownLink(src, dst))?;
        Ok(&mut self.graph[edge])
    }

    pub fn switch_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn require_index(&self, id: SwitchId) -> Result<NodeIndex> {
        self.index
            .get(&id)
            .copied()
            .ok_or(TopologyError::UnknownSwitch(id))
    }
}

impl Default for TopologyGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(switch: u64, port: u32) -> SwitchPort {
        SwitchPort::new(SwitchId(switch), PortNo(port))
    }

    fn create_test_graph() -> TopologyGraph {
        let mut graph = TopologyGraph::new();
        graph.add_switch(Switch::new(SwitchId(1)));
        graph.add_switch(Switch::new(SwitchId(2)));
        graph.add_switch(Switch::new(SwitchId(3)));

        graph
            .add_duplex_link(Link::new(port(1, 2), port(2, 1), 1_000_000_000))
            .unwrap();
        graph
            .add_duplex_link(Link::new(port(2, 2), port(3, 1), 1_000_000_000))
            .unwrap();

        graph
    }

    #[test]
    fn test_add_switches_and_links() {
        let graph = create_test_graph();
        assert_eq!(graph.switch_count(), 3);
        assert_eq!(graph.link_count(), 4); // Two duplex links

        let s = graph.switch(SwitchId(1)).unwrap();
        assert!((s.trust - DEFAULT_TRUST).abs() < 1e-9);
    }

    #[test]
    fn test_link_requires_known_endpoints() {
        let mut graph = create_test_graph();
        let result = graph.add_link(Link::new(port(1, 9), port(99, 1), 1_000_000_000));
        assert!(matches!(result, Err(TopologyError::UnknownSwitch(_))));
    }

    #[test]
    fn test_link_lookup() {
        let graph = create_test_graph();
        let link = graph.link(port(1, 2), port(2, 1)).unwrap();
        assert_eq!(link.speed_bps, 1_000_000_000);
        assert!((link.confidentiality - DEFAULT_LINK_SECURITY).abs() < 1e-9);

        // Reverse direction exists too
        assert!(graph.link(port(2, 1), port(1, 2)).is_some());
        // Unknown pairing does not
        assert!(graph.link(port(1, 2), port(3, 1)).is_none());
    }

    #[test]
    fn test_link_mut_updates_attributes() {
        let mut graph = create_test_graph();
        graph.link_mut(port(1, 2), port(2, 1)).unwrap().confidentiality = 0.4;
        assert!((graph.link(port(1, 2), port(2, 1)).unwrap().confidentiality - 0.4).abs() < 1e-9);
        // The reverse link is a distinct edge and keeps its own value
        assert!(
            (graph.link(port(2, 1), port(1, 2)).unwrap().confidentiality - DEFAULT_LINK_SECURITY)
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_links_from() {
        let graph = create_test_graph();
        let out: Vec<_> = graph.links_from(SwitchId(2)).collect();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|l| l.src.switch == SwitchId(2)));
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(SwitchId(0x1a).to_string(), "000000000000001a");
        assert_eq!(port(0x1a, 3).to_string(), "000000000000001a:3");
    }
}
