//! Path property aggregation and security read projections.

use crate::SecurityVector;
use sdn_topology::{Link, Switch, SwitchId, SwitchPort, TopologyGraph};
use serde::{Deserialize, Serialize};

/// Reduce a path's per-hop attributes to path-level security properties
/// using the bottleneck rule: the weakest hop dominates.
///
/// Trust is the minimum trust of any switch on the path; each of
/// confidentiality, integrity and availability is the minimum of the
/// corresponding link attribute. All dimensions start from 1.0, so a
/// single-node path keeps 1.0 on the edge-based dimensions.
pub fn aggregate_path_properties(switches: &[&Switch], links: &[&Link]) -> SecurityVector {
    let mut properties = SecurityVector::default();

    for switch in switches {
        if switch.trust < properties.trust {
            properties.trust = switch.trust;
        }
    }

    for link in links {
        if link.confidentiality < properties.confidentiality {
            properties.confidentiality = link.confidentiality;
        }
        if link.integrity < properties.integrity {
            properties.integrity = link.integrity;
        }
        if link.availability < properties.availability {
            properties.availability = link.availability;
        }
    }

    properties
}

/// Current security attributes of one switch, as served to operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchSecurityView {
    pub switch: SwitchId,
    pub trust: f64,
}

/// Current security attributes of one link, as served to operators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSecurityView {
    pub src: SwitchPort,
    pub dst: SwitchPort,
    pub confidentiality: f64,
    pub integrity: f64,
    pub availability: f64,
}

/// Per-switch security rows, ordered by switch id.
pub fn switch_security_views(graph: &TopologyGraph) -> Vec<SwitchSecurityView> {
    let mut views: Vec<_> = graph
        .switches()
        .map(|s| SwitchSecurityView {
            switch: s.id,
            trust: s.trust,
        })
        .collect();
    views.sort_by_key(|v| v.switch);
    views
}

/// Per-link security rows, ordered by attachment points.
pub fn link_security_views(graph: &TopologyGraph) -> Vec<LinkSecurityView> {
    let mut views: Vec<_> = graph
        .links()
        .map(|l| LinkSecurityView {
            src: l.src,
            dst: l.dst,
            confidentiality: l.confidentiality,
            integrity: l.integrity,
            availability: l.availability,
        })
        .collect();
    views.sort_by_key(|v| (v.src, v.dst));
    views
}
