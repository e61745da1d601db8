//! Bounded k-shortest-path enumeration.
//!
//! Best-first search over loop-free paths: a priority queue holds
//! partial paths ordered by accumulated cost, the cheapest is popped
//! and either yielded (it reached the destination) or extended by one
//! link. `k` bounds the number of yielded paths, `max_paths` bounds the
//! candidates considered, and a pop cap derived from both keeps dense
//! meshes from enumerating forever. Equal-cost paths come out in
//! insertion order, so enumeration is deterministic for a snapshot.

use sdn_topology::{Link, SwitchId, TopologyGraph};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Link weighting used to order candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkCost {
    /// Every link costs 1: candidates ordered by hop count.
    Hops,
    /// Faster links are cheaper: cost is 1 Gbps over the link speed.
    InverseSpeed,
}

impl LinkCost {
    pub fn cost(&self, link: &Link) -> f64 {
        match self {
            LinkCost::Hops => 1.0,
            LinkCost::InverseSpeed => 1_000_000_000.0 / link.speed_bps.max(1) as f64,
        }
    }
}

/// A complete candidate path produced by the enumeration.
#[derive(Debug, Clone)]
pub struct CandidatePath {
    pub switches: Vec<SwitchId>,
    pub links: Vec<Link>,
    pub cost: f64,
}

struct Partial {
    cost: f64,
    seq: u64,
    switches: Vec<SwitchId>,
    links: Vec<Link>,
}

impl PartialEq for Partial {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}

impl Eq for Partial {}

impl PartialOrd for Partial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Partial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Enumerate up to `k` loop-free paths from `src` to `dst` in ascending
/// cost order, considering at most `max_paths` candidates. A request
/// with `src == dst` yields the single-node path.
pub fn k_shortest_paths(
    graph: &TopologyGraph,
    src: SwitchId,
    dst: SwitchId,
    k: usize,
    max_paths: usize,
    link_cost: LinkCost,
) -> Vec<CandidatePath> {
    let yield_bound = k.min(max_paths);
    if yield_bound == 0 || !graph.contains(src) || !graph.contains(dst) {
        return Vec::new();
    }

    // Backstop against pathological meshes when the bounds are
    // effectively unbounded: loop-free paths are finite, but the heap
    // should not outlive the graph's own scale.
    let pop_cap = max_paths
        .saturating_mul(graph.link_count().max(1))
        .max(graph.switch_count());

    let mut heap: BinaryHeap<Reverse<Partial>> = BinaryHeap::new();
    let mut seq: u64 = 0;
    heap.push(Reverse(Partial {
        cost: 0.0,
        seq,
        switches: vec![src],
        links: Vec::new(),
    }));

    let mut found = Vec::new();
    let mut pops: usize = 0;

    while let Some(Reverse(partial)) = heap.pop() {
        pops += 1;
        if pops > pop_cap {
            break;
        }

        let last = *partial.switches.last().expect("partial path is never empty");
        if last == dst {
            found.push(CandidatePath {
                switches: partial.switches,
                links: partial.links,
                cost: partial.cost,
            });
            if found.len() >= yield_bound {
                break;
            }
            continue;
        }

        for link in graph.links_from(last) {
            let next = link.dst.switch;
            if partial.switches.contains(&next) {
                continue; // Loop-free paths only
            }
            seq += 1;
            let mut switches = partial.switches.clone();
            switches.push(next);
            let mut links = partial.links.clone();
            links.push(link.clone());
            heap.push(Reverse(Partial {
                cost: partial.cost + link_cost.cost(link),
                seq,
                switches,
                links,
            }));
        }
    }

    found
}
