//! Per-port bandwidth samples and snapshot projections.
//!
//! Samples are produced by an external statistics collector; the routing
//! core only reads the latest snapshot. Utilization is the measured
//! bits-per-second rate divided by the nominal link speed.

use crate::SwitchPort;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// The latest bandwidth sample for one port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortBandwidth {
    pub port: SwitchPort,
    pub speed_bps: u64,
    pub rx_bps: u64,
    pub tx_bps: u64,
    /// Receive utilization fraction in [0, 1].
    pub rx_utilization: f64,
    /// Transmit utilization fraction in [0, 1].
    pub tx_utilization: f64,
    pub sampled_at: DateTime<Utc>,
}

impl PortBandwidth {
    pub fn new(port: SwitchPort, speed_bps: u64, rx_bps: u64, tx_bps: u64) -> Self {
        let (rx_utilization, tx_utilization) = utilization(speed_bps, rx_bps, tx_bps);
        Self {
            port,
            speed_bps,
            rx_bps,
            tx_bps,
            rx_utilization,
            tx_utilization,
            sampled_at: Utc::now(),
        }
    }

    /// The sample with additional load applied, utilization recomputed.
    pub fn with_added(&self, rx_extra_bps: u64, tx_extra_bps: u64) -> Self {
        let rx_bps = self.rx_bps.saturating_add(rx_extra_bps);
        let tx_bps = self.tx_bps.saturating_add(tx_extra_bps);
        let (rx_utilization, tx_utilization) = utilization(self.speed_bps, rx_bps, tx_bps);
        Self {
            rx_bps,
            tx_bps,
            rx_utilization,
            tx_utilization,
            ..self.clone()
        }
    }

    /// The larger of the rx/tx rates, used for ranking ports by load.
    pub fn peak_bps(&self) -> u64 {
        self.rx_bps.max(self.tx_bps)
    }
}

fn utilization(speed_bps: u64, rx_bps: u64, tx_bps: u64) -> (f64, f64) {
    if speed_bps == 0 {
        return (0.0, 0.0);
    }
    (
        rx_bps as f64 / speed_bps as f64,
        tx_bps as f64 / speed_bps as f64,
    )
}

/// A consistent snapshot of the latest sample per port.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandwidthSnapshot {
    ports: HashMap<SwitchPort, PortBandwidth>,
}

impl BandwidthSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: PortBandwidth) {
        self.ports.insert(sample.port, sample);
    }

    pub fn get(&self, port: &SwitchPort) -> Option<&PortBandwidth> {
        self.ports.get(port)
    }

    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PortBandwidth> {
        self.ports.values()
    }

    /// The combined rx+tx utilization distribution over all sampled ports.
    pub fn utilizations(&self) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.ports.len() * 2);
        for sample in self.ports.values() {
            values.push(sample.rx_utilization);
            values.push(sample.tx_utilization);
        }
        values
    }

    /// The snapshot as it would look after routing a flow of `demand_bps`
    /// over the given links: each egress port gains tx load, each ingress
    /// port gains rx load. Ports with no sample are left out of the
    /// projection; their load is unknown.
    pub fn project_flow(
        &self,
        links: &[(SwitchPort, SwitchPort)],
        demand_bps: u64,
    ) -> BandwidthSnapshot {
        let mut projected = self.clone();
        for (egress, ingress) in links {
            match projected.ports.get(egress) {
                Some(sample) => {
                    let bumped = sample.with_added(0, demand_bps);
                    projected.ports.insert(*egress, bumped);
                }
                None => debug!("No bandwidth sample for egress port {}", egress),
            }
            match projected.ports.get(ingress) {
                Some(sample) => {
                    let bumped = sample.with_added(demand_bps, 0);
                    projected.ports.insert(*ingress, bumped);
                }
                None => debug!("No bandwidth sample for ingress port {}", ingress),
            }
        }
        projected
    }

    /// The `n` highest-loaded ports, by peak rate, busiest first.
    pub fn top_by_bandwidth(&self, n: usize) -> Vec<PortBandwidth> {
        let mut samples: Vec<_> = self.ports.values().cloned().collect();
        samples.sort_by(|a, b| b.peak_bps().cmp(&a.peak_bps()).then(a.port.cmp(&b.port)));
        samples.truncate(n);
        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PortNo, SwitchId};

    fn port(switch: u64, port: u32) -> SwitchPort {
        SwitchPort::new(SwitchId(switch), PortNo(port))
    }

    #[test]
    fn test_utilization_computed() {
        let sample = PortBandwidth::new(port(1, 1), 1_000_000_000, 250_000_000, 500_000_000);
        assert!((sample.rx_utilization - 0.25).abs() < 1e-9);
        assert!((sample.tx_utilization - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_speed_guard() {
        let sample = PortBandwidth::new(port(1, 1), 0, 250_000_000, 500_000_000);
        assert_eq!(sample.rx_utilization, 0.0);
        assert_eq!(sample.tx_utilization, 0.0);
    }

    #[test]
    fn test_project_flow_adds_load() {
        let mut snapshot = BandwidthSnapshot::new();
        snapshot.insert(PortBandwidth::new(port(1, 2), 1_000_000_000, 0, 0));
        snapshot.insert(PortBandwidth::new(port(2, 1), 1_000_000_000, 0, 0));

        let projected = snapshot.project_flow(&[(port(1, 2), port(2, 1))], 100_000_000);

        let egress = projected.get(&port(1, 2)).unwrap();
        assert!((egress.tx_utilization - 0.1).abs() < 1e-9);
        assert_eq!(egress.rx_utilization, 0.0);

        let ingress = projected.get(&port(2, 1)).unwrap();
        assert!((ingress.rx_utilization - 0.1).abs() < 1e-9);

        // Original snapshot untouched
        assert_eq!(snapshot.get(&port(1, 2)).unwrap().tx_bps, 0);
    }

    #[test]
    fn test_project_flow_skips_unsampled_ports() {
        let mut snapshot = BandwidthSnapshot::new();
        snapshot.insert(PortBandwidth::new(port(1, 2), 1_000_000_000, 0, 0));

        let projected = snapshot.project_flow(&[(port(1, 2), port(9, 9))], 100_000_000);
        assert_eq!(projected.len(), 1);
        assert!(projected.get(&port(9, 9)).is_none());
    }

    #[test]
    fn test_top_by_bandwidth() {
        let mut snapshot = BandwidthSnapshot::new();
        snapshot.insert(PortBandwidth::new(port(1, 1), 1_000_000_000, 100, 200));
        snapshot.insert(PortBandwidth::new(port(2, 1), 1_000_000_000, 900, 50));
        snapshot.insert(PortBandwidth::new(port(3, 1), 1_000_000_000, 300, 400));

        let top = snapshot.top_by_bandwidth(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].port, port(2, 1));
        assert_eq!(top[1].port, port(3, 1));
    }

    #[test]
    fn test_utilizations_combines_rx_and_tx() {
        let mut snapshot = BandwidthSnapshot::new();
        snapshot.insert(PortBandwidth::new(port(1, 1), 1_000_000_000, 250_000_000, 500_000_000));
        let mut values = snapshot.utilizations();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(values.len(), 2);
        assert!((values[0] - 0.25).abs() < 1e-9);
        assert!((values[1] - 0.5).abs() < 1e-9);
    }
}
