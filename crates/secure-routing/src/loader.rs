//! JSON loaders for operator-supplied inputs: topology, bandwidth
//! samples, service policies and routing configuration.

use crate::config::RoutingConfig;
use crate::providers::InMemoryDtsps;
use crate::Result;
use sdn_topology::{
    BandwidthSnapshot, Link, PortBandwidth, Switch, SwitchPort, TopologyGraph,
};
use security_model::{Dtsp, SecurityVector, Service};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct TopologyFile {
    pub switches: Vec<Switch>,
    pub links: Vec<Link>,
    /// When set, every listed link is added in both directions.
    #[serde(default)]
    pub duplex: bool,
}

pub fn load_topology(path: &Path) -> Result<TopologyGraph> {
    let file = File::open(path)?;
    let parsed: TopologyFile = serde_json::from_reader(BufReader::new(file))?;

    let mut graph = TopologyGraph::new();
    for switch in parsed.switches {
        graph.add_switch(switch);
    }
    for link in parsed.links {
        if parsed.duplex {
            graph.add_duplex_link(link)?;
        } else {
            graph.add_link(link)?;
        }
    }

    info!(
        "Loaded topology: {} switches, {} links",
        graph.switch_count(),
        graph.link_count()
    );
    Ok(graph)
}

#[derive(Debug, Deserialize)]
struct BandwidthSample {
    port: SwitchPort,
    speed_bps: u64,
    rx_bps: u64,
    tx_bps: u64,
}

pub fn load_bandwidth(path: &Path) -> Result<BandwidthSnapshot> {
    let file = File::open(path)?;
    let samples: Vec<BandwidthSample> = serde_json::from_reader(BufReader::new(file))?;

    let mut snapshot = BandwidthSnapshot::new();
    for sample in samples {
        snapshot.insert(PortBandwidth::new(
            sample.port,
            sample.speed_bps,
            sample.rx_bps,
            sample.tx_bps,
        ));
    }

    info!("Loaded bandwidth samples for {} ports", snapshot.len());
    Ok(snapshot)
}

#[derive(Debug, Deserialize)]
struct DtspEntry {
    service: Service,
    requirements: SecurityVector,
    consequences: SecurityVector,
    acceptable_risk_increase: SecurityVector,
}

pub fn load_dtsps(path: &Path) -> Result<InMemoryDtsps> {
    let file = File::open(path)?;
    let entries: Vec<DtspEntry> = serde_json::from_reader(BufReader::new(file))?;

    let mut directory = InMemoryDtsps::new();
    let count = entries.len();
    for entry in entries {
        let dtsp = Dtsp::new(
            entry.service.id.clone(),
            entry.requirements,
            entry.consequences,
            entry.acceptable_risk_increase,
        );
        directory.insert(entry.service, dtsp);
    }

    info!("Loaded {} service policies", count);
    Ok(directory)
}

pub fn load_config(path: &Path) -> Result<RoutingConfig> {
    let file = File::open(path)?;
    let config: RoutingConfig = serde_json::from_reader(BufReader::new(file))?;
    Ok(config)
}
