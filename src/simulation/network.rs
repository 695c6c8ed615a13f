//! Transport network graph
//!
//! Nodes, edges and signals live in fixed-size tables sized when the
//! network is created. Slots are written in place; nothing is ever removed.

use log::warn;
use petgraph::algo::{has_path_connecting, kosaraju_scc};
use petgraph::graph::{DiGraph, NodeIndex};

use super::error::{NetworkError, Result};
use super::signal::{Phase, Signal};
use super::types::{EdgeId, NodeId, Position, SignalId};

/// A stop or intersection
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub category: String,
    pub position: Position,
}

impl Node {
    fn blank(id: usize) -> Self {
        Self {
            id: NodeId(id),
            name: String::new(),
            category: String::new(),
            position: Position::default(),
        }
    }
}

/// Independent per-edge condition flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeConditions {
    pub traffic_light_present: bool,
    pub congested: bool,
    pub passenger_stop: bool,
}

/// A directed, weighted connection between two nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: NodeId,
    pub destination: NodeId,
    pub distance: f64,
    pub priority: bool,
    /// Zero means no flow is modeled on this edge
    pub capacity: u64,
    pub conditions: EdgeConditions,
}

/// Counts reported for a network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkSummary {
    pub nodes: usize,
    pub edges: usize,
    pub signals: usize,
    pub strongly_connected_components: usize,
}

/// The transport network
#[derive(Debug, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    edges: Vec<Option<Edge>>,
    signals: Vec<Option<Signal>>,
}

fn allocate<T>(what: &'static str, len: usize, fill: impl FnMut(usize) -> T) -> Result<Vec<T>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|_| NetworkError::Allocation {
            what,
            requested: len,
        })?;
    slots.extend((0..len).map(fill));
    Ok(slots)
}

fn out_of_range(kind: &'static str, index: usize, len: usize) -> NetworkError {
    warn!("{} index {} out of range (table holds {})", kind, index, len);
    NetworkError::IndexOutOfRange { kind, index, len }
}

impl Network {
    /// Allocate the node, edge and signal tables.
    ///
    /// Any table already allocated is dropped before an allocation failure
    /// is returned.
    pub fn create(node_count: usize, edge_count: usize, signal_count: usize) -> Result<Self> {
        let nodes = allocate("node", node_count, Node::blank)?;
        let edges = allocate("edge", edge_count, |_| None)?;
        let signals = allocate("signal", signal_count, |_| None)?;
        Ok(Self {
            nodes,
            edges,
            signals,
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Size of the edge table, including unset slots
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn signal_count(&self) -> usize {
        self.signals.len()
    }

    pub(crate) fn check_node(&self, node: NodeId) -> Result<()> {
        if node.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(out_of_range("node", node.0, self.nodes.len()))
        }
    }

    fn check_edge(&self, edge: EdgeId) -> Result<()> {
        if edge.0 < self.edges.len() {
            Ok(())
        } else {
            Err(out_of_range("edge", edge.0, self.edges.len()))
        }
    }

    /// Initialise the node at `id`
    pub fn set_node(
        &mut self,
        id: NodeId,
        name: &str,
        category: &str,
        x: f64,
        y: f64,
    ) -> Result<()> {
        self.check_node(id)?;
        self.nodes[id.0] = Node {
            id,
            name: name.to_string(),
            category: category.to_string(),
            position: Position::new(x, y),
        };
        Ok(())
    }

    /// Write an edge without capacity into slot `index`
    pub fn set_edge(
        &mut self,
        index: EdgeId,
        source: NodeId,
        destination: NodeId,
        distance: f64,
        priority: bool,
    ) -> Result<()> {
        self.set_flow_edge(index, source, destination, distance, priority, 0)
    }

    /// Write a capacity-bearing edge into slot `index`
    pub fn set_flow_edge(
        &mut self,
        index: EdgeId,
        source: NodeId,
        destination: NodeId,
        distance: f64,
        priority: bool,
        capacity: i64,
    ) -> Result<()> {
        self.check_edge(index)?;
        self.check_node(source)?;
        self.check_node(destination)?;
        if !distance.is_finite() || distance < 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "distance",
                value: distance.to_string(),
            });
        }
        let capacity = u64::try_from(capacity).map_err(|_| NetworkError::InvalidParameter {
            name: "capacity",
            value: capacity.to_string(),
        })?;

        self.edges[index.0] = Some(Edge {
            source,
            destination,
            distance,
            priority,
            capacity,
            conditions: EdgeConditions::default(),
        });
        Ok(())
    }

    /// Set the condition flags of an already written edge
    pub fn set_edge_conditions(&mut self, index: EdgeId, conditions: EdgeConditions) -> Result<()> {
        self.check_edge(index)?;
        match self.edges[index.0].as_mut() {
            Some(edge) => {
                edge.conditions = conditions;
                Ok(())
            }
            None => Err(NetworkError::InvalidParameter {
                name: "edge",
                value: format!("slot {} is not set", index.0),
            }),
        }
    }

    /// Install a signal at `node`
    pub fn set_signal(
        &mut self,
        id: SignalId,
        node: NodeId,
        initial_phase: Phase,
        red_duration: f64,
        green_duration: f64,
    ) -> Result<()> {
        if id.0 >= self.signals.len() {
            return Err(out_of_range("signal", id.0, self.signals.len()));
        }
        self.check_node(node)?;
        for (name, value) in [("red_duration", red_duration), ("green_duration", green_duration)] {
            if !value.is_finite() || value < 0.0 {
                return Err(NetworkError::InvalidParameter {
                    name,
                    value: value.to_string(),
                });
            }
        }

        self.signals[id.0] = Some(Signal::new(
            id,
            node,
            initial_phase,
            red_duration,
            green_duration,
        ));
        Ok(())
    }

    /// Multiply an edge's distance by `factor`, returning the new distance.
    ///
    /// The change is permanent.
    pub fn scale_edge_distance(&mut self, index: EdgeId, factor: f64) -> Result<f64> {
        self.check_edge(index)?;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(NetworkError::InvalidParameter {
                name: "congestion_factor",
                value: factor.to_string(),
            });
        }
        let edge = self.edges[index.0]
            .as_mut()
            .ok_or_else(|| NetworkError::InvalidParameter {
                name: "edge",
                value: format!("slot {} is not set", index.0),
            })?;
        let scaled = edge.distance * factor;
        if !scaled.is_finite() {
            return Err(NetworkError::InvalidParameter {
                name: "distance",
                value: scaled.to_string(),
            });
        }
        edge.distance = scaled;
        Ok(scaled)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0).and_then(Option::as_ref)
    }

    /// Written edges in table order
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|edge| (EdgeId(index), edge)))
    }

    /// Edges leaving `node`, in table order
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges().filter(move |(_, edge)| edge.source == node)
    }

    /// First edge leaving `node` in table order
    pub fn first_outgoing(&self, node: NodeId) -> Option<(EdgeId, &Edge)> {
        self.outgoing(node).next()
    }

    /// First edge from `source` to `destination` in table order
    pub fn find_edge_between(&self, source: NodeId, destination: NodeId) -> Option<(EdgeId, &Edge)> {
        self.outgoing(source)
            .find(|(_, edge)| edge.destination == destination)
    }

    pub fn signal(&self, id: SignalId) -> Option<&Signal> {
        self.signals.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn signal_mut(&mut self, id: SignalId) -> Option<&mut Signal> {
        self.signals.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Installed signals in table order
    pub fn signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals.iter().flatten()
    }

    /// Signals governing `node`, in table order
    pub fn signals_at(&self, node: NodeId) -> impl Iterator<Item = &Signal> {
        self.signals().filter(move |signal| signal.node() == node)
    }

    /// First signal in table order governing `node`
    pub fn signal_at(&self, node: NodeId) -> Option<&Signal> {
        self.signals_at(node).next()
    }

    /// First red signal governing `node`
    pub fn red_signal_at(&self, node: NodeId) -> Option<&Signal> {
        self.signals_at(node).find(|signal| signal.is_red())
    }

    /// Snapshot of the network as a petgraph graph.
    ///
    /// Node indices match node ids; edge weights are the edge slot ids.
    pub fn to_digraph(&self) -> DiGraph<NodeId, EdgeId> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        for node in &self.nodes {
            graph.add_node(node.id);
        }
        for (id, edge) in self.edges() {
            graph.add_edge(
                NodeIndex::new(edge.source.0),
                NodeIndex::new(edge.destination.0),
                id,
            );
        }
        graph
    }

    /// Whether any directed route leads from `source` to `target`
    pub fn is_reachable(&self, source: NodeId, target: NodeId) -> Result<bool> {
        self.check_node(source)?;
        self.check_node(target)?;
        let graph = self.to_digraph();
        Ok(has_path_connecting(
            &graph,
            NodeIndex::new(source.0),
            NodeIndex::new(target.0),
            None,
        ))
    }

    pub fn strongly_connected_components(&self) -> usize {
        kosaraju_scc(&self.to_digraph()).len()
    }

    pub fn summary(&self) -> NetworkSummary {
        NetworkSummary {
            nodes: self.nodes.len(),
            edges: self.edges().count(),
            signals: self.signals().count(),
            strongly_connected_components: self.strongly_connected_components(),
        }
    }
}
