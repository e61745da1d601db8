//! Secure Flow Solver CLI
//!
//! Solves one secure routing request against operator-supplied
//! topology, bandwidth, policy and configuration files.
//!
//! Usage:
//!   solve-flow --topology data/topology.json \
//!              --bandwidth data/bandwidth.json \
//!              --dtsps data/dtsps.json \
//!              --config data/routing.json \
//!              --service svc-1 \
//!              --src-switch 1 --src-port 1 --dst-switch 4 --dst-port 1

use anyhow::Result;
use clap::Parser;
use secure_routing::{
    loader, InMemoryArchive, RouteRequest, SecureRoutingManager, Solver, StaticBandwidth,
    StaticTopology, User,
};
use sdn_topology::{PortNo, SwitchId, SwitchPort};
use security_model::{ServiceId, ThresholdRiskEvaluator};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "solve-flow", about = "Solve one secure routing request")]
struct Args {
    /// Path to topology JSON file
    #[arg(long, default_value = "data/topology.json")]
    topology: PathBuf,

    /// Path to bandwidth samples JSON file
    #[arg(long, default_value = "data/bandwidth.json")]
    bandwidth: PathBuf,

    /// Path to service policies JSON file
    #[arg(long, default_value = "data/dtsps.json")]
    dtsps: PathBuf,

    /// Path to routing configuration JSON file
    #[arg(long, default_value = "data/routing.json")]
    config: PathBuf,

    /// Requesting user id
    #[arg(long, default_value = "cli")]
    user: String,

    /// Service whose DTSP applies
    #[arg(long)]
    service: String,

    #[arg(long)]
    src_switch: u64,

    #[arg(long)]
    src_port: u32,

    #[arg(long)]
    dst_switch: u64,

    #[arg(long)]
    dst_port: u32,

    /// Plain shortest path, bypassing policy and load balance
    #[arg(long)]
    shortest: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let graph = loader::load_topology(&args.topology)?;
    let snapshot = loader::load_bandwidth(&args.bandwidth)?;
    let dtsps = loader::load_dtsps(&args.dtsps)?;

    // Invalid or ambiguous configuration refuses to start.
    let settings = loader::load_config(&args.config)?.validate()?;

    let archive = Arc::new(InMemoryArchive::new());
    let solver = Solver::from_settings(
        settings,
        Arc::new(StaticTopology::new(graph)),
        Arc::new(StaticBandwidth::new(snapshot)),
        Arc::new(dtsps),
        Arc::new(ThresholdRiskEvaluator::new()),
    );
    let manager = SecureRoutingManager::new(solver, archive);

    let request = RouteRequest {
        user: User::new(args.user.clone(), args.user.clone()),
        service: ServiceId::new(args.service.clone()),
        src: SwitchPort::new(SwitchId(args.src_switch), PortNo(args.src_port)),
        dst: SwitchPort::new(SwitchId(args.dst_switch), PortNo(args.dst_port)),
    };

    let decision = if args.shortest {
        manager.get_secure_shortest_decision(&request)?
    } else {
        manager.get_secure_decision(&request)?
    };

    if decision.solved {
        info!(
            "Solved in {} ms: {} hops via {:?}",
            decision.time_ms,
            decision.path.hop_count(),
            decision.path.switches
        );
    } else {
        info!(
            "No qualifying path for service {} ({} ms)",
            request.service, decision.time_ms
        );
    }

    println!("{}", serde_json::to_string_pretty(&decision)?);

    Ok(())
}
