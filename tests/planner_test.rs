//! Shortest-path planner tests

use petgraph::algo::dijkstra as petgraph_dijkstra;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use transit_sim::simulation::{
    astar, dijkstra, plan, priority_dijkstra, Algorithm, EdgeId, Network, NetworkError, NodeId,
    TransitWorld,
};

fn build(nodes: &[(f64, f64)], edges: &[(usize, usize, f64, bool)]) -> Network {
    let mut network = Network::create(nodes.len(), edges.len(), 0).unwrap();
    for (i, (x, y)) in nodes.iter().enumerate() {
        network
            .set_node(NodeId(i), &format!("Stop {}", i), "Bus", *x, *y)
            .unwrap();
    }
    for (i, (from, to, distance, priority)) in edges.iter().enumerate() {
        network
            .set_edge(EdgeId(i), NodeId(*from), NodeId(*to), *distance, *priority)
            .unwrap();
    }
    network
}

fn ids(nodes: &[NodeId]) -> Vec<usize> {
    nodes.iter().map(|n| n.0).collect()
}

fn line_of_four() -> Vec<(usize, usize, f64, bool)> {
    vec![(0, 1, 1.0, false), (1, 2, 1.0, false), (2, 3, 1.0, false)]
}

#[test]
fn test_dijkstra_follows_chain() {
    let network = build(&[(0.0, 0.0); 4], &line_of_four());
    let path = dijkstra(&network, NodeId(0), NodeId(3)).unwrap().unwrap();
    assert_eq!(ids(&path.nodes), vec![0, 1, 2, 3]);
    assert_eq!(path.cost, 3);
    assert_eq!(path.hops(), 3);
}

#[test]
fn test_dijkstra_takes_direct_edge() {
    let mut edges = line_of_four();
    edges.push((0, 3, 2.0, false));
    let network = build(&[(0.0, 0.0); 4], &edges);

    let path = dijkstra(&network, NodeId(0), NodeId(3)).unwrap().unwrap();
    assert_eq!(ids(&path.nodes), vec![0, 3]);
    assert_eq!(path.cost, 2);
}

#[test]
fn test_dijkstra_unreachable_target() {
    let network = build(&[(0.0, 0.0); 3], &[(0, 1, 1.0, false)]);
    assert_eq!(dijkstra(&network, NodeId(0), NodeId(2)).unwrap(), None);
    assert_eq!(astar(&network, NodeId(0), NodeId(2)).unwrap(), None);
    assert_eq!(
        priority_dijkstra(&network, NodeId(0), NodeId(2), 0.5).unwrap(),
        None
    );
}

#[test]
fn test_source_equals_target() {
    let network = build(&[(0.0, 0.0); 2], &[(0, 1, 1.0, false)]);
    let path = dijkstra(&network, NodeId(1), NodeId(1)).unwrap().unwrap();
    assert_eq!(ids(&path.nodes), vec![1]);
    assert_eq!(path.cost, 0);
}

#[test]
fn test_out_of_range_nodes_are_rejected() {
    let network = build(&[(0.0, 0.0); 2], &[(0, 1, 1.0, false)]);
    assert!(matches!(
        dijkstra(&network, NodeId(0), NodeId(5)),
        Err(NetworkError::IndexOutOfRange { kind: "node", .. })
    ));
    assert!(astar(&network, NodeId(9), NodeId(0)).is_err());
}

#[test]
fn test_ties_go_to_lowest_node_id() {
    let network = build(
        &[(0.0, 0.0); 4],
        &[
            (0, 2, 1.0, false),
            (0, 1, 1.0, false),
            (1, 3, 1.0, false),
            (2, 3, 1.0, false),
        ],
    );
    let path = dijkstra(&network, NodeId(0), NodeId(3)).unwrap().unwrap();
    assert_eq!(ids(&path.nodes), vec![0, 1, 3]);
    assert_eq!(path.cost, 2);
}

#[test]
fn test_dijkstra_truncates_distances_but_astar_does_not() {
    let network = build(
        &[(0.0, 0.0); 3],
        &[(0, 1, 1.9, false), (1, 2, 1.9, false), (0, 2, 3.5, false)],
    );

    let truncated = dijkstra(&network, NodeId(0), NodeId(2)).unwrap().unwrap();
    assert_eq!(ids(&truncated.nodes), vec![0, 1, 2]);
    assert_eq!(truncated.cost, 2);

    let real = astar(&network, NodeId(0), NodeId(2)).unwrap().unwrap();
    assert_eq!(ids(&real.nodes), vec![0, 2]);
    assert!((real.cost - 3.5).abs() < 1e-9);
}

#[test]
fn test_huge_distances_saturate_instead_of_overflowing() {
    let network = build(
        &[(0.0, 0.0); 3],
        &[(0, 1, 1e19, false), (1, 2, 1e19, false)],
    );
    let path = dijkstra(&network, NodeId(0), NodeId(2)).unwrap().unwrap();
    assert_eq!(ids(&path.nodes), vec![0, 1, 2]);
    assert_eq!(path.cost, i64::MAX);

    let favoured = priority_dijkstra(&network, NodeId(0), NodeId(2), 1.0)
        .unwrap()
        .unwrap();
    assert_eq!(favoured.cost, i64::MAX);

    let mut edges = vec![(0, 1, 1e19, false), (1, 2, 1e19, false)];
    edges.push((0, 2, 4.0, false));
    let network = build(&[(0.0, 0.0); 3], &edges);
    let path = dijkstra(&network, NodeId(0), NodeId(2)).unwrap().unwrap();
    assert_eq!(ids(&path.nodes), vec![0, 2]);
    assert_eq!(path.cost, 4);
}

#[test]
fn test_priority_route_is_never_more_expensive() {
    let network = build(
        &[(0.0, 0.0); 3],
        &[(0, 1, 10.0, false), (1, 2, 10.0, false), (0, 2, 15.0, true)],
    );

    let plain = dijkstra(&network, NodeId(0), NodeId(2)).unwrap().unwrap();
    let favoured = priority_dijkstra(&network, NodeId(0), NodeId(2), 0.5)
        .unwrap()
        .unwrap();
    assert_eq!(ids(&plain.nodes), vec![0, 2]);
    assert_eq!(plain.cost, 15);
    assert_eq!(favoured.cost, 7);
    assert!(favoured.cost <= plain.cost);
}

#[test]
fn test_priority_corridor_changes_route() {
    let network = build(
        &[(0.0, 0.0); 3],
        &[(0, 1, 10.0, true), (1, 2, 10.0, true), (0, 2, 15.0, false)],
    );

    let plain = dijkstra(&network, NodeId(0), NodeId(2)).unwrap().unwrap();
    assert_eq!(ids(&plain.nodes), vec![0, 2]);

    let favoured = priority_dijkstra(&network, NodeId(0), NodeId(2), 0.5)
        .unwrap()
        .unwrap();
    assert_eq!(ids(&favoured.nodes), vec![0, 1, 2]);
    assert_eq!(favoured.cost, 10);

    let neutral = priority_dijkstra(&network, NodeId(0), NodeId(2), 1.0)
        .unwrap()
        .unwrap();
    assert_eq!(neutral, plain);
}

#[test]
fn test_reduction_factor_must_be_in_unit_interval() {
    let network = build(&[(0.0, 0.0); 2], &[(0, 1, 1.0, true)]);
    for factor in [0.0, -0.5, 1.5, f64::NAN] {
        assert!(matches!(
            priority_dijkstra(&network, NodeId(0), NodeId(1), factor),
            Err(NetworkError::InvalidParameter {
                name: "reduction_factor",
                ..
            })
        ));
    }
}

#[test]
fn test_astar_matches_dijkstra_cost() {
    // Integer weights never shorter than the straight line between stops
    let network = build(
        &[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0), (6.0, 4.0)],
        &[
            (0, 1, 3.0, false),
            (1, 2, 4.0, false),
            (0, 2, 6.0, false),
            (2, 3, 3.0, false),
            (1, 3, 6.0, false),
        ],
    );

    for target in 1..4 {
        let plain = dijkstra(&network, NodeId(0), NodeId(target)).unwrap().unwrap();
        let guided = astar(&network, NodeId(0), NodeId(target)).unwrap().unwrap();
        assert_eq!(plain.cost as f64, guided.cost);
    }
}

#[test]
fn test_paths_start_at_source_end_at_target_and_follow_edges() {
    let world = TransitWorld::create_demo_world(1, 0).unwrap();
    let network = world.network();

    for source in 0..network.node_count() {
        for target in 0..network.node_count() {
            let (source, target) = (NodeId(source), NodeId(target));
            for algorithm in [
                Algorithm::Dijkstra,
                Algorithm::PriorityDijkstra {
                    reduction_factor: 0.5,
                },
                Algorithm::AStar,
            ] {
                let Some(path) = plan(network, source, target, algorithm).unwrap() else {
                    continue;
                };
                assert_eq!(path.source(), Some(source));
                assert_eq!(path.target(), Some(target));
                for pair in path.nodes.windows(2) {
                    assert!(
                        network.find_edge_between(pair[0], pair[1]).is_some(),
                        "no edge {:?} -> {:?} in {:?}",
                        pair[0],
                        pair[1],
                        path.nodes
                    );
                }
            }
        }
    }
}

#[test]
fn test_dijkstra_costs_agree_with_petgraph() {
    let world = TransitWorld::create_demo_world(1, 0).unwrap();
    let network = world.network();
    let graph = network.to_digraph();

    for source in 0..network.node_count() {
        let expected = petgraph_dijkstra(&graph, NodeIndex::new(source), None, |edge| {
            network.edge(*edge.weight()).map_or(0, |e| e.distance as i64)
        });
        for target in 0..network.node_count() {
            let found = dijkstra(network, NodeId(source), NodeId(target)).unwrap();
            assert_eq!(
                found.map(|p| p.cost),
                expected.get(&NodeIndex::new(target)).copied()
            );
        }
    }
}

#[test]
fn test_demo_network_routes() {
    let world = TransitWorld::create_demo_world(1, 0).unwrap();
    let network = world.network();

    let plain = dijkstra(network, NodeId(0), NodeId(5)).unwrap().unwrap();
    // 0 -> 2 directly ties with 0 -> 1 -> 2 and is found first
    assert_eq!(ids(&plain.nodes), vec![0, 2, 4, 5]);
    assert_eq!(plain.cost, 17);

    let favoured = priority_dijkstra(network, NodeId(0), NodeId(5), 0.5)
        .unwrap()
        .unwrap();
    assert!(favoured.cost <= plain.cost);
}
