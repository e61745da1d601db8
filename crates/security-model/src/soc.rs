//! Application of SOC (security operations center) threat updates to
//! the topology.
//!
//! A threat activation lowers the affected attributes by the reported
//! difference; a threat end restores them. Arithmetic saturates into
//! [0.0, SECURITY_CEILING]: a difference larger than the current value
//! floors at 0.0, and a restoration past the ceiling caps at 0.99. Both
//! saturations log a warning; neither is an error.

use crate::{SecurityVector, SECURITY_CEILING};
use sdn_topology::{Result, SwitchId, SwitchPort, TopologyError, TopologyGraph};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// An incremental security update pushed by the SOC event feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SocUpdate {
    ThreatActivatedSwitch {
        switch: SwitchId,
        trust_difference: f64,
    },
    ThreatEndedSwitch {
        switch: SwitchId,
        trust_difference: f64,
    },
    ThreatActivatedLink {
        src: SwitchPort,
        dst: SwitchPort,
        difference: SecurityVector,
    },
    ThreatEndedLink {
        src: SwitchPort,
        dst: SwitchPort,
        difference: SecurityVector,
    },
}

/// Apply one SOC update to the topology. Unknown targets are a caller
/// error; saturation is not.
pub fn apply_soc_update(graph: &mut TopologyGraph, update: &SocUpdate) -> Result<()> {
    match update {
        SocUpdate::ThreatActivatedSwitch {
            switch,
            trust_difference,
        } => {
            let s = graph
                .switch_mut(*switch)
                .ok_or(TopologyError::UnknownSwitch(*switch))?;
            s.trust = lower(s.trust, *trust_difference, "TRUST", &switch.to_string());
            info!("Trust for switch {} set to {:.3}", switch, s.trust);
        }
        SocUpdate::ThreatEndedSwitch {
            switch,
            trust_difference,
        } => {
            let s = graph
                .switch_mut(*switch)
                .ok_or(TopologyError::UnknownSwitch(*switch))?;
            s.trust = raise(s.trust, *trust_difference, "TRUST", &switch.to_string());
            info!("Trust for switch {} set to {:.3}", switch, s.trust);
        }
        SocUpdate::ThreatActivatedLink {
            src,
            dst,
            difference,
        } => {
            let target = format!("{} -> {}", src, dst);
            let link = graph.link_mut(*src, *dst)?;
            link.confidentiality = lower(
                link.confidentiality,
                difference.confidentiality,
                "CONFIDENTIALITY",
                &target,
            );
            link.integrity = lower(link.integrity, difference.integrity, "INTEGRITY", &target);
            link.availability = lower(
                link.availability,
                difference.availability,
                "AVAILABILITY",
                &target,
            );
            info!(
                "Set C={:.3} I={:.3} A={:.3} for link {}",
                link.confidentiality, link.integrity, link.availability, target
            );
        }
        SocUpdate::ThreatEndedLink {
            src,
            dst,
            difference,
        } => {
            let target = format!("{} -> {}", src, dst);
            let link = graph.link_mut(*src, *dst)?;
            link.confidentiality = raise(
                link.confidentiality,
                difference.confidentiality,
                "CONFIDENTIALITY",
                &target,
            );
            link.integrity = raise(link.integrity, difference.integrity, "INTEGRITY", &target);
            link.availability = raise(
                link.availability,
                difference.availability,
                "AVAILABILITY",
                &target,
            );
            info!(
                "Set C={:.3} I={:.3} A={:.3} for link {}",
                link.confidentiality, link.integrity, link.availability, target
            );
        }
    }
    Ok(())
}

fn lower(actual: f64, difference: f64, dimension: &str, target: &str) -> f64 {
    if difference > actual {
        warn!(
            "Threat {} difference {:.3} exceeds current {:.3} for {}. Flooring at 0.",
            dimension, difference, actual, target
        );
        0.0
    } else {
        actual - difference
    }
}

fn raise(actual: f64, difference: f64, dimension: &str, target: &str) -> f64 {
    if actual + difference > SECURITY_CEILING {
        warn!(
            "Threat end {} restore past ceiling for {}. Capping at {:.2}.",
            dimension, target, SECURITY_CEILING
        );
        SECURITY_CEILING
    } else {
        actual + difference
    }
}
