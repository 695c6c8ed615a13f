//! Maximum flow between two nodes (Edmonds-Karp)
//!
//! Residual capacities are seeded from edge capacities. When several edges
//! join the same ordered pair of nodes, the last one in table order wins;
//! capacities are not summed.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::debug;

use super::error::Result;
use super::network::Network;
use super::types::{EdgeId, NodeId};

/// Storage for residual capacities between node pairs
pub trait ResidualGraph {
    /// Remaining capacity on the arc `from -> to`
    fn residual(&self, from: usize, to: usize) -> u64;

    /// Overwrite the capacity of `from -> to`
    fn seed(&mut self, from: usize, to: usize, capacity: u64);

    /// Arcs leaving `from` with positive residual capacity, by ascending target
    fn arcs_from(&self, from: usize) -> impl Iterator<Item = (usize, u64)> + '_;

    /// Push `amount` along `from -> to`, opening the reverse arc
    fn augment(&mut self, from: usize, to: usize, amount: u64);
}

/// Dense `n x n` residual matrix
pub struct DenseResidual {
    size: usize,
    cells: Vec<u64>,
}

impl DenseResidual {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![0; size * size],
        }
    }
}

impl ResidualGraph for DenseResidual {
    fn residual(&self, from: usize, to: usize) -> u64 {
        self.cells[from * self.size + to]
    }

    fn seed(&mut self, from: usize, to: usize, capacity: u64) {
        self.cells[from * self.size + to] = capacity;
    }

    fn arcs_from(&self, from: usize) -> impl Iterator<Item = (usize, u64)> + '_ {
        let row = &self.cells[from * self.size..(from + 1) * self.size];
        row.iter()
            .enumerate()
            .filter(|(_, capacity)| **capacity > 0)
            .map(|(to, capacity)| (to, *capacity))
    }

    fn augment(&mut self, from: usize, to: usize, amount: u64) {
        self.cells[from * self.size + to] -= amount;
        self.cells[to * self.size + from] += amount;
    }
}

/// Adjacency-keyed residual capacities for sparse networks
#[derive(Default)]
pub struct SparseResidual {
    arcs: BTreeMap<usize, BTreeMap<usize, u64>>,
}

impl ResidualGraph for SparseResidual {
    fn residual(&self, from: usize, to: usize) -> u64 {
        self.arcs
            .get(&from)
            .and_then(|targets| targets.get(&to))
            .copied()
            .unwrap_or(0)
    }

    fn seed(&mut self, from: usize, to: usize, capacity: u64) {
        self.arcs.entry(from).or_default().insert(to, capacity);
    }

    fn arcs_from(&self, from: usize) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.arcs
            .get(&from)
            .into_iter()
            .flat_map(|targets| targets.iter())
            .filter(|(_, capacity)| **capacity > 0)
            .map(|(to, capacity)| (*to, *capacity))
    }

    fn augment(&mut self, from: usize, to: usize, amount: u64) {
        if let Some(capacity) = self.arcs.get_mut(&from).and_then(|t| t.get_mut(&to)) {
            *capacity -= amount;
        }
        *self.arcs.entry(to).or_default().entry(from).or_insert(0) += amount;
    }
}

/// Result of a max-flow query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSolution {
    /// Total flow from source to sink
    pub value: u64,
    /// Flow carried by each edge slot, indexed by edge id
    pub edge_flows: Vec<u64>,
}

impl FlowSolution {
    pub fn flow_on(&self, edge: EdgeId) -> u64 {
        self.edge_flows.get(edge.0).copied().unwrap_or(0)
    }
}

/// Maximum flow using a dense residual matrix
pub fn max_flow(network: &Network, source: NodeId, sink: NodeId) -> Result<FlowSolution> {
    let mut residual = DenseResidual::new(network.node_count());
    solve(network, source, sink, &mut residual)
}

/// Maximum flow using adjacency-keyed residual capacities
pub fn max_flow_sparse(network: &Network, source: NodeId, sink: NodeId) -> Result<FlowSolution> {
    let mut residual = SparseResidual::default();
    solve(network, source, sink, &mut residual)
}

fn solve<R: ResidualGraph>(
    network: &Network,
    source: NodeId,
    sink: NodeId,
    residual: &mut R,
) -> Result<FlowSolution> {
    network.check_node(source)?;
    network.check_node(sink)?;

    // Last edge in table order owns each node pair
    let mut owners: HashMap<(usize, usize), (EdgeId, u64)> = HashMap::new();
    for (id, edge) in network.edges() {
        let pair = (edge.source.0, edge.destination.0);
        residual.seed(pair.0, pair.1, edge.capacity);
        owners.insert(pair, (id, edge.capacity));
    }

    let value = if source == sink {
        0
    } else {
        edmonds_karp(residual, network.node_count(), source.0, sink.0)
    };

    let mut edge_flows = vec![0; network.edge_count()];
    for (&(from, to), &(id, capacity)) in &owners {
        let net = capacity.saturating_sub(residual.residual(from, to));
        edge_flows[id.0] = net.min(capacity);
    }

    debug!("max flow {} -> {}: {}", source, sink, value);
    Ok(FlowSolution { value, edge_flows })
}

fn edmonds_karp<R: ResidualGraph>(residual: &mut R, size: usize, source: usize, sink: usize) -> u64 {
    let mut total = 0;
    let mut parent = vec![None; size];

    while augmenting_path(residual, size, source, sink, &mut parent) {
        let mut bottleneck = u64::MAX;
        let mut v = sink;
        while let Some(u) = parent[v] {
            bottleneck = bottleneck.min(residual.residual(u, v));
            v = u;
        }

        let mut v = sink;
        while let Some(u) = parent[v] {
            residual.augment(u, v, bottleneck);
            v = u;
        }

        total += bottleneck;
    }

    total
}

/// Breadth-first search for the shortest augmenting path
fn augmenting_path<R: ResidualGraph>(
    residual: &R,
    size: usize,
    source: usize,
    sink: usize,
    parent: &mut [Option<usize>],
) -> bool {
    let mut visited = vec![false; size];
    let mut queue = VecDeque::new();
    parent.fill(None);
    visited[source] = true;
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        for (v, _) in residual.arcs_from(u) {
            if visited[v] {
                continue;
            }
            visited[v] = true;
            parent[v] = Some(u);
            if v == sink {
                return true;
            }
            queue.push_back(v);
        }
    }

    false
}
