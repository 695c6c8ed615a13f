//! Shortest-path queries over the transport network
//!
//! All three planners scan nodes in ascending id order when picking the next
//! node to settle, so ties always go to the lowest id. Edges are relaxed in
//! edge-table order.

use log::debug;
use ordered_float::OrderedFloat;

use super::error::{NetworkError, Result};
use super::network::{Edge, Network};
use super::types::NodeId;

/// An ordered route from source to target (both inclusive) and its cost
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult<C> {
    pub nodes: Vec<NodeId>,
    pub cost: C,
}

impl<C> PathResult<C> {
    pub fn source(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn target(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Number of edges traversed
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Selects one of the interchangeable planners
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
    Dijkstra,
    PriorityDijkstra { reduction_factor: f64 },
    AStar,
}

/// Run the selected planner, reporting the cost as a real number
pub fn plan(
    network: &Network,
    source: NodeId,
    target: NodeId,
    algorithm: Algorithm,
) -> Result<Option<PathResult<f64>>> {
    let widen = |path: PathResult<i64>| PathResult {
        nodes: path.nodes,
        cost: path.cost as f64,
    };
    match algorithm {
        Algorithm::Dijkstra => Ok(dijkstra(network, source, target)?.map(widen)),
        Algorithm::PriorityDijkstra { reduction_factor } => {
            Ok(priority_dijkstra(network, source, target, reduction_factor)?.map(widen))
        }
        Algorithm::AStar => astar(network, source, target),
    }
}

/// Plain Dijkstra with edge distances truncated to integers
pub fn dijkstra(
    network: &Network,
    source: NodeId,
    target: NodeId,
) -> Result<Option<PathResult<i64>>> {
    network.check_node(source)?;
    network.check_node(target)?;

    let result = label_setting(network, source, target, |edge| edge.distance);
    debug!("dijkstra {} -> {}: {:?}", source, target, result);
    Ok(result)
}

/// Dijkstra where priority edges cost `distance * reduction_factor`
pub fn priority_dijkstra(
    network: &Network,
    source: NodeId,
    target: NodeId,
    reduction_factor: f64,
) -> Result<Option<PathResult<i64>>> {
    if !(reduction_factor > 0.0 && reduction_factor <= 1.0) {
        return Err(NetworkError::InvalidParameter {
            name: "reduction_factor",
            value: reduction_factor.to_string(),
        });
    }
    network.check_node(source)?;
    network.check_node(target)?;

    let result = label_setting(network, source, target, |edge| {
        if edge.priority {
            edge.distance * reduction_factor
        } else {
            edge.distance
        }
    });
    debug!(
        "priority dijkstra {} -> {} (factor {}): {:?}",
        source, target, reduction_factor, result
    );
    Ok(result)
}

fn label_setting(
    network: &Network,
    source: NodeId,
    target: NodeId,
    weight: impl Fn(&Edge) -> f64,
) -> Option<PathResult<i64>> {
    let n = network.node_count();
    let mut dist: Vec<Option<i64>> = vec![None; n];
    let mut prev: Vec<Option<NodeId>> = vec![None; n];
    let mut visited = vec![false; n];
    dist[source.0] = Some(0);

    // min_by_key keeps the first minimum, which is the lowest id
    while let Some((u, du)) = (0..n)
        .filter(|&i| !visited[i])
        .filter_map(|i| dist[i].map(|d| (i, d)))
        .min_by_key(|&(_, d)| d)
    {
        visited[u] = true;
        if u == target.0 {
            break;
        }

        for (_, edge) in network.outgoing(NodeId(u)) {
            let v = edge.destination.0;
            if visited[v] {
                continue;
            }
            // `as` saturates huge weights; sums saturate at i64::MAX too
            let alt = du.saturating_add(weight(edge) as i64);
            if dist[v].map_or(true, |dv| alt < dv) {
                dist[v] = Some(alt);
                prev[v] = Some(NodeId(u));
            }
        }
    }

    let cost = dist[target.0]?;
    Some(PathResult {
        nodes: reconstruct(&prev, target),
        cost,
    })
}

/// A* with the straight-line distance to the target as heuristic
pub fn astar(
    network: &Network,
    source: NodeId,
    target: NodeId,
) -> Result<Option<PathResult<f64>>> {
    network.check_node(source)?;
    network.check_node(target)?;

    let nodes = network.nodes();
    let goal = nodes[target.0].position;
    let heuristic = |i: usize| nodes[i].position.distance(&goal);

    let n = nodes.len();
    let mut g = vec![f64::INFINITY; n];
    let mut f = vec![OrderedFloat(f64::INFINITY); n];
    let mut prev: Vec<Option<NodeId>> = vec![None; n];
    let mut open = vec![false; n];
    let mut closed = vec![false; n];

    g[source.0] = 0.0;
    f[source.0] = OrderedFloat(heuristic(source.0));
    open[source.0] = true;

    while let Some(current) = (0..n).filter(|&i| open[i]).min_by_key(|&i| f[i]) {
        if current == target.0 {
            let result = PathResult {
                nodes: reconstruct(&prev, target),
                cost: g[current],
            };
            debug!("astar {} -> {}: {:?}", source, target, result);
            return Ok(Some(result));
        }

        open[current] = false;
        closed[current] = true;

        for (_, edge) in network.outgoing(NodeId(current)) {
            let neighbor = edge.destination.0;
            if closed[neighbor] {
                continue;
            }
            let tentative = g[current] + edge.distance;
            if !open[neighbor] {
                open[neighbor] = true;
            } else if tentative >= g[neighbor] {
                continue;
            }
            prev[neighbor] = Some(NodeId(current));
            g[neighbor] = tentative;
            f[neighbor] = OrderedFloat(tentative + heuristic(neighbor));
        }
    }

    debug!("astar {} -> {}: unreachable", source, target);
    Ok(None)
}

/// Walk predecessor links back from `target`, then reverse
fn reconstruct(prev: &[Option<NodeId>], target: NodeId) -> Vec<NodeId> {
    let mut path = vec![target];
    let mut current = target;
    while let Some(previous) = prev[current.0] {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
