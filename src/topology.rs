use core::fmt;
use std::collections::HashMap;

use itertools::Itertools;
use log::debug;
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::datastructures::{Error, Result, TreeParams};

const LINK_CAPACITY_STEP: u32 = 2;
const IDLE_POWER_STEP: u32 = 5;
const DYN_POWER_STEP: u32 = 1;

/// An immutable fat-tree instance.
///
/// Switches occupy node ids `[0, switches)` in breadth-first level order,
/// servers occupy `[switches, nodes)`. Every switch at level `l` is connected
/// to every switch at level `l + 1` (folded-Clos fabric); each last-level
/// switch additionally connects to exactly two servers.
#[derive(Debug, Clone)]
pub struct Topology {
    pub depth: usize,
    pub servers: usize,
    pub switches: usize,
    pub vms: usize,
    pub flows: usize,
    pub nodes: usize,
    pub links: usize,
    /// Symmetric with zero diagonal.
    pub adjacency: Array2<bool>,
    /// Per-node neighbor lists, ascending node ids.
    pub neighbors: Vec<Vec<usize>>,
    /// Both orderings of every adjacent pair map to the same link id.
    pub link_index: HashMap<(usize, usize), usize>,
    /// Link id to canonical endpoint pair, `n1 < n2`. `n1` is always a switch.
    pub link_endpoints: Vec<(usize, usize)>,
    pub server_capacity: Array1<f64>,
    pub link_capacity: Array1<f64>,
    pub idle_power: Array1<f64>,
    pub dyn_power: Array1<f64>,
    pub cpu_util: Array1<f64>,
    pub data_rate: Array1<f64>,
    /// Per flow: (source vm, destination vm). A partition of the vm ids.
    pub src_dst: Vec<(usize, usize)>,
}

impl Topology {
    /// Builds the topology for the given parameters.
    ///
    /// Fails with [`Error::InvalidParameter`] for zero parameters, a
    /// randomization band that would be empty, or a gradient that would
    /// drive a capacity/power value negative. No partial topology is ever
    /// returned.
    pub fn generate(params: &TreeParams) -> Result<Topology> {
        validate(params)?;
        let depth = params.depth as usize;
        let servers = 1 << depth;
        let switches = (1 << depth) - 1;
        let vms = servers;
        let flows = vms / 2;
        let nodes = servers + switches;
        let links = (0..depth.saturating_sub(1))
            .map(|l| (1 << l) * (1 << (l + 1)))
            .sum::<usize>()
            + servers;

        let mut adjacency = Array2::from_elem((nodes, nodes), false);
        let mut link_index = HashMap::new();
        let mut link_endpoints = Vec::with_capacity(links);
        let mut connect = |a: usize, b: usize| {
            adjacency[(a, b)] = true;
            adjacency[(b, a)] = true;
            let id = link_endpoints.len();
            link_index.insert((a, b), id);
            link_index.insert((b, a), id);
            link_endpoints.push((a, b));
        };
        // Full bipartite wiring between adjacent switch levels, parent-major.
        for lvl in 0..depth - 1 {
            for parent in level_range(lvl) {
                for child in level_range(lvl + 1) {
                    connect(parent, child);
                }
            }
        }
        // Each last-level switch fans out to two servers.
        for leaf in level_range(depth - 1) {
            for i in 0..2 {
                connect(leaf, leaf * 2 + 1 + i);
            }
        }
        debug_assert_eq!(link_endpoints.len(), links);

        let neighbors = (0..nodes)
            .map(|n| (0..nodes).filter(|&m| adjacency[(n, m)]).collect_vec())
            .collect_vec();

        let link_capacity = link_capacity_gradient(params, depth, links);
        let (idle_power, dyn_power) = power_gradients(params, depth, nodes);
        let server_capacity =
            Array1::from_elem(servers, f64::from(params.server_capacity));

        let (cpu_util, data_rate, src_dst) = if params.randomize {
            let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
            let cap = params.server_capacity;
            let rate = params.avg_data_rate;
            let cpu_util = Array1::from_shape_fn(vms, |_| {
                f64::from(rng.gen_range(cap / 2 + 1..=cap - 1))
            });
            let data_rate = Array1::from_shape_fn(flows, |_| {
                f64::from(rng.gen_range(rate.saturating_sub(1)..=rate + 1))
            });
            let mut index_list = (0..vms).collect_vec();
            index_list.shuffle(&mut rng);
            (cpu_util, data_rate, pair_up(&index_list))
        } else {
            let cpu_util = Array1::from_elem(
                vms,
                f64::from(params.server_capacity / 2 + 1),
            );
            let data_rate =
                Array1::from_elem(flows, f64::from(params.avg_data_rate));
            let index_list = (0..vms).collect_vec();
            (cpu_util, data_rate, pair_up(&index_list))
        };

        let topology = Topology {
            depth,
            servers,
            switches,
            vms,
            flows,
            nodes,
            links,
            adjacency,
            neighbors,
            link_index,
            link_endpoints,
            server_capacity,
            link_capacity,
            idle_power,
            dyn_power,
            cpu_util,
            data_rate,
            src_dst,
        };
        debug!(
            "generated topology: depth {}, {} servers, {} switches, {} flows, {} links",
            topology.depth, topology.servers, topology.switches,
            topology.flows, topology.links
        );
        Ok(topology)
    }

    pub fn is_switch(&self, node: usize) -> bool {
        node < self.switches
    }

    /// Node id of server `s`.
    pub fn node_of_server(&self, s: usize) -> usize {
        self.switches + s
    }

    /// Server index of a server node id.
    pub fn server_of_node(&self, node: usize) -> usize {
        node - self.switches
    }

    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.neighbors[node]
    }

    /// Node ids of all server nodes.
    pub fn server_nodes(&self) -> std::ops::Range<usize> {
        self.switches..self.nodes
    }
}

/// Node ids of switch level `l`, breadth-first numbering.
pub fn level_range(l: usize) -> std::ops::Range<usize> {
    ((1 << l) - 1)..((1 << (l + 1)) - 1)
}

fn validate(params: &TreeParams) -> Result<()> {
    if params.depth < 1 {
        return Err(Error::InvalidParameter(format!(
            "depth must be >= 1, got {}",
            params.depth
        )));
    }
    for (name, value) in [
        ("server_capacity", params.server_capacity),
        ("link_capacity", params.link_capacity),
        ("idle_power", params.idle_power),
        ("dyn_power", params.dyn_power),
        ("avg_data_rate", params.avg_data_rate),
    ] {
        if value == 0 {
            return Err(Error::InvalidParameter(format!(
                "{name} must be positive"
            )));
        }
    }
    if params.randomize && params.server_capacity < 3 {
        return Err(Error::InvalidParameter(format!(
            "randomized cpu band is empty for server_capacity {}",
            params.server_capacity
        )));
    }
    let depth = i64::from(params.depth);
    let lowest = [
        (
            "link_capacity",
            i64::from(params.link_capacity) * depth
                - i64::from(LINK_CAPACITY_STEP) * (depth - 1),
        ),
        (
            "idle_power",
            i64::from(params.idle_power) * depth
                - i64::from(IDLE_POWER_STEP) * depth,
        ),
        (
            "dyn_power",
            i64::from(params.dyn_power) * depth
                - i64::from(DYN_POWER_STEP) * depth,
        ),
    ];
    for (name, value) in lowest {
        if value < 0 {
            return Err(Error::InvalidParameter(format!(
                "{name} gradient goes negative at the leaf level ({value})"
            )));
        }
    }
    Ok(())
}

/// Link capacities start at `base * depth` at the root level and decrease by
/// a fixed step per switch level; server links get the most-decremented
/// value. Link ids are level-ordered, so the gradient maps level by level.
fn link_capacity_gradient(
    params: &TreeParams,
    depth: usize,
    links: usize,
) -> Array1<f64> {
    let mut capacity = Vec::with_capacity(links);
    // In f64: the product of two u32 parameters can exceed u32::MAX.
    let mut current =
        f64::from(params.link_capacity) * f64::from(params.depth);
    for lvl in 0..depth - 1 {
        for _ in 0..(1 << (2 * lvl + 1)) {
            capacity.push(current);
        }
        current -= f64::from(LINK_CAPACITY_STEP);
    }
    for _ in 0..(1 << depth) {
        capacity.push(current);
    }
    Array1::from_vec(capacity)
}

/// Idle/dynamic power per node over the `depth + 1` node levels (servers are
/// the last level), decreasing from `base * depth` towards the leaves.
fn power_gradients(
    params: &TreeParams,
    depth: usize,
    nodes: usize,
) -> (Array1<f64>, Array1<f64>) {
    let mut idle = Vec::with_capacity(nodes);
    let mut dyn_ = Vec::with_capacity(nodes);
    let mut current_idle =
        f64::from(params.idle_power) * f64::from(params.depth);
    let mut current_dyn =
        f64::from(params.dyn_power) * f64::from(params.depth);
    for lvl in 0..=depth {
        for _ in 0..(1 << lvl) {
            idle.push(current_idle);
            dyn_.push(current_dyn);
        }
        current_idle -= f64::from(IDLE_POWER_STEP);
        current_dyn -= f64::from(DYN_POWER_STEP);
    }
    (Array1::from_vec(idle), Array1::from_vec(dyn_))
}

fn pair_up(index_list: &[usize]) -> Vec<(usize, usize)> {
    index_list.iter().copied().tuples().collect_vec()
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "fat-tree: depth {}, {} switches, {} servers, {} vms, {} flows, {} links",
            self.depth, self.switches, self.servers, self.vms, self.flows,
            self.links
        )?;
        writeln!(f, "server capacity: {}", self.server_capacity)?;
        writeln!(f, "link capacity: {}", self.link_capacity)?;
        writeln!(f, "idle power: {}", self.idle_power)?;
        writeln!(f, "dynamic power: {}", self.dyn_power)?;
        writeln!(f, "vm cpu utilization: {}", self.cpu_util)?;
        writeln!(f, "flow data rate: {}", self.data_rate)?;
        for n in 0..self.nodes {
            let connections = self
                .neighbors(n)
                .iter()
                .map(|&m| format!("{m} (link {})", self.link_index[&(n, m)]))
                .join("\t");
            writeln!(f, "node {n}: {connections}")?;
        }
        for (i, (src, dst)) in self.src_dst.iter().enumerate() {
            writeln!(f, "flow {i}: vm {src} -> vm {dst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
