//! Maximum flow tests

use transit_sim::simulation::{
    max_flow, max_flow_sparse, EdgeId, FlowSolution, Network, NetworkError, NodeId, TransitWorld,
};

fn flow_network(nodes: usize, edges: &[(usize, usize, i64)]) -> Network {
    let mut network = Network::create(nodes, edges.len(), 0).unwrap();
    for (i, (from, to, capacity)) in edges.iter().enumerate() {
        network
            .set_flow_edge(EdgeId(i), NodeId(*from), NodeId(*to), 1.0, false, *capacity)
            .unwrap();
    }
    network
}

fn textbook_network() -> Network {
    flow_network(
        6,
        &[
            (0, 1, 16),
            (0, 2, 13),
            (1, 3, 12),
            (2, 1, 4),
            (2, 4, 14),
            (3, 2, 9),
            (3, 5, 20),
            (4, 3, 7),
            (4, 5, 4),
        ],
    )
}

fn assert_conserved(network: &Network, solution: &FlowSolution, source: NodeId, sink: NodeId) {
    for node in 0..network.node_count() {
        let node = NodeId(node);
        let inflow: u64 = network
            .edges()
            .filter(|(_, e)| e.destination == node)
            .map(|(id, _)| solution.flow_on(id))
            .sum();
        let outflow: u64 = network
            .edges()
            .filter(|(_, e)| e.source == node)
            .map(|(id, _)| solution.flow_on(id))
            .sum();
        if node == source {
            assert_eq!(outflow - inflow, solution.value);
        } else if node == sink {
            assert_eq!(inflow - outflow, solution.value);
        } else {
            assert_eq!(inflow, outflow, "flow not conserved at {}", node);
        }
    }
    for (id, edge) in network.edges() {
        assert!(solution.flow_on(id) <= edge.capacity);
    }
}

#[test]
fn test_bottleneck_limits_flow() {
    let network = flow_network(3, &[(0, 1, 5), (1, 2, 3)]);
    let solution = max_flow(&network, NodeId(0), NodeId(2)).unwrap();
    assert_eq!(solution.value, 3);
    assert_eq!(solution.edge_flows, vec![3, 3]);
}

#[test]
fn test_textbook_network() {
    let network = textbook_network();
    let solution = max_flow(&network, NodeId(0), NodeId(5)).unwrap();
    assert_eq!(solution.value, 23);
    assert_conserved(&network, &solution, NodeId(0), NodeId(5));
}

#[test]
fn test_dense_and_sparse_backends_agree() {
    let network = textbook_network();
    for source in 0..6 {
        for sink in 0..6 {
            let dense = max_flow(&network, NodeId(source), NodeId(sink)).unwrap();
            let sparse = max_flow_sparse(&network, NodeId(source), NodeId(sink)).unwrap();
            assert_eq!(dense.value, sparse.value, "{} -> {}", source, sink);
        }
    }
}

#[test]
fn test_later_parallel_edge_overwrites_capacity() {
    let network = flow_network(2, &[(0, 1, 5), (0, 1, 2)]);
    let solution = max_flow(&network, NodeId(0), NodeId(1)).unwrap();
    assert_eq!(solution.value, 2);
    assert_eq!(solution.flow_on(EdgeId(0)), 0);
    assert_eq!(solution.flow_on(EdgeId(1)), 2);

    let sparse = max_flow_sparse(&network, NodeId(0), NodeId(1)).unwrap();
    assert_eq!(sparse.value, 2);
}

#[test]
fn test_source_equals_sink_is_zero() {
    let network = textbook_network();
    let solution = max_flow(&network, NodeId(2), NodeId(2)).unwrap();
    assert_eq!(solution.value, 0);
    assert!(solution.edge_flows.iter().all(|&f| f == 0));
}

#[test]
fn test_disconnected_sink_is_zero() {
    let network = flow_network(4, &[(0, 1, 5), (2, 3, 5)]);
    assert_eq!(max_flow(&network, NodeId(0), NodeId(3)).unwrap().value, 0);
    assert_eq!(max_flow_sparse(&network, NodeId(0), NodeId(3)).unwrap().value, 0);
}

#[test]
fn test_plain_edges_carry_no_flow() {
    let mut network = Network::create(2, 1, 0).unwrap();
    network
        .set_edge(EdgeId(0), NodeId(0), NodeId(1), 4.0, true)
        .unwrap();
    assert_eq!(max_flow(&network, NodeId(0), NodeId(1)).unwrap().value, 0);
}

#[test]
fn test_flow_rejects_unknown_nodes() {
    let network = textbook_network();
    assert!(matches!(
        max_flow(&network, NodeId(0), NodeId(6)),
        Err(NetworkError::IndexOutOfRange { kind: "node", .. })
    ));
    assert!(max_flow_sparse(&network, NodeId(10), NodeId(0)).is_err());
}

#[test]
fn test_demo_network_flow() {
    let world = TransitWorld::create_demo_world(7, 0).unwrap();
    let network = world.network();
    let solution = max_flow(network, NodeId(0), NodeId(5)).unwrap();
    assert_eq!(solution.value, 9);
    assert_conserved(network, &solution, NodeId(0), NodeId(5));
    assert_eq!(
        max_flow_sparse(network, NodeId(0), NodeId(5)).unwrap().value,
        9
    );
}
