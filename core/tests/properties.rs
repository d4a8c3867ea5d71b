//! Property tests for the algorithm engine.
//!
//! Random small graphs are checked against Floyd-Warshall
//! ([`Graph::distance_matrix`]) and against each other.

use std::collections::HashSet;

use graph_steps_core::{
    astar, bellman_ford, bfs, dfs, dijkstra, Edge, EngineConfig, Graph, Node, StepKind,
};
use proptest::{
    collection::vec,
    prelude::{any, prop_assert, prop_assert_eq, Strategy},
    proptest,
    test_runner::Config as ProptestConfig,
};

const PROP_CASES: u32 = 128;
const MAX_NODES: usize = 7;
const MAX_EDGES: usize = 14;

fn engine_proptest_config() -> ProptestConfig {
    ProptestConfig {
        cases: PROP_CASES,
        max_shrink_iters: 1024,
        ..ProptestConfig::default()
    }
}

/// Node count, directedness and raw `(from, to, weight)` triples. Triples
/// are cleaned up by [`build`].
type RawGraph = (usize, bool, Vec<(usize, usize, i32)>);

fn raw_graph(weights: std::ops::RangeInclusive<i32>) -> impl Strategy<Value = RawGraph> {
    (1..=MAX_NODES, any::<bool>()).prop_flat_map(move |(n, directed)| {
        let edges = vec((0..n, 0..n, weights.clone()), 0..=MAX_EDGES);
        (
            proptest::strategy::Just(n),
            proptest::strategy::Just(directed),
            edges,
        )
    })
}

fn node_id(i: usize) -> String {
    format!("n{i}")
}

/// Build a valid graph: self-loops and repeated connections are dropped.
fn build((n, directed, raw): &RawGraph) -> Graph {
    let nodes = (0..*n)
        .map(|i| Node {
            id: node_id(i),
            x: i as f64 * 10.0,
            y: (i % 3) as f64 * 10.0,
            label: format!("N{i}"),
        })
        .collect();

    let mut seen = HashSet::new();
    let mut edges = Vec::new();
    for &(a, b, w) in raw {
        if a == b {
            continue;
        }
        let key = if *directed || a < b { (a, b) } else { (b, a) };
        if !seen.insert(key) {
            continue;
        }
        edges.push(Edge {
            id: format!("e{}", edges.len() + 1),
            source: node_id(a),
            target: node_id(b),
            weight: f64::from(w),
        });
    }

    match Graph::from_parts(nodes, edges, *directed, true) {
        Ok(graph) => graph,
        Err(err) => panic!("generated graph rejected: {err}"),
    }
}

/// Same shape with every weight set to 1.
fn unit_weights(graph: &Graph) -> Graph {
    let edges = graph
        .edges()
        .iter()
        .map(|e| Edge {
            weight: 1.0,
            ..e.clone()
        })
        .collect();
    Graph::from_parts(graph.nodes().to_vec(), edges, graph.is_directed(), false)
        .unwrap_or_default()
}

fn index_of(graph: &Graph, id: &str) -> usize {
    graph
        .nodes()
        .iter()
        .position(|n| n.id == id)
        .unwrap_or(usize::MAX)
}

fn visits(steps: &[graph_steps_core::AlgorithmStep]) -> Vec<String> {
    steps
        .iter()
        .filter(|s| s.kind == StepKind::Visit)
        .filter_map(|s| s.node_id.clone())
        .collect()
}

proptest! {
    #![proptest_config(engine_proptest_config())]

    #[test]
    fn test_bfs_visits_reachable_nodes_by_hop_distance(raw in raw_graph(1..=9)) {
        let graph = build(&raw);
        let hops = unit_weights(&graph).distance_matrix().matrix;
        let result = bfs(&graph, "n0", None, &EngineConfig::default());
        let order = visits(&result.steps);

        let reachable: Vec<String> = graph
            .nodes()
            .iter()
            .enumerate()
            .filter(|(i, _)| hops[0][*i].is_some())
            .map(|(_, n)| n.id.clone())
            .collect();
        prop_assert_eq!(order.len(), reachable.len());
        let unique: HashSet<&String> = order.iter().collect();
        prop_assert_eq!(unique.len(), order.len());

        let depth: Vec<f64> = order
            .iter()
            .map(|id| hops[0][index_of(&graph, id)].unwrap_or(f64::INFINITY))
            .collect();
        prop_assert!(depth.windows(2).all(|w| w[0] <= w[1]), "hop order {:?}", depth);
    }

    #[test]
    fn test_bfs_path_has_minimum_hops(raw in raw_graph(1..=9), target in 0..MAX_NODES) {
        let graph = build(&raw);
        let end = node_id(target % graph.node_count());
        let hops = unit_weights(&graph).distance_matrix().matrix;
        let result = bfs(&graph, "n0", Some(&end), &EngineConfig::default());

        match hops[0][index_of(&graph, &end)] {
            Some(h) => {
                let path = result.shortest_path.unwrap_or_default();
                prop_assert_eq!((path.len() - 1) as f64, h);
                prop_assert!(graph.path_cost(&path).is_some());
            }
            None => prop_assert!(result.shortest_path.is_none()),
        }
    }

    #[test]
    fn test_dijkstra_and_bellman_ford_match_floyd(raw in raw_graph(1..=9)) {
        let graph = build(&raw);
        let floyd = graph.distance_matrix().matrix;
        let config = EngineConfig::default();
        let dj = dijkstra(&graph, "n0", None, &config);
        let bf = bellman_ford(&graph, "n0", None, &config);

        prop_assert_eq!(bf.has_negative_cycle, Some(false));
        for (i, node) in graph.nodes().iter().enumerate() {
            let expected = floyd[0][i].unwrap_or(f64::INFINITY);
            prop_assert_eq!(dj.distance(&node.id), Some(expected));
            prop_assert_eq!(bf.distance(&node.id), Some(expected));
        }
    }

    #[test]
    fn test_shortest_paths_are_valid_and_optimal(raw in raw_graph(1..=9), target in 0..MAX_NODES) {
        let graph = build(&raw);
        let end = node_id(target % graph.node_count());
        let expected = graph.distance_matrix().matrix[0][index_of(&graph, &end)];
        // a vanishing heuristic keeps A* optimal on any layout
        let flat = EngineConfig::default().with_heuristic_scale(1e12);
        let start = node_id(0);

        let runs = [
            dijkstra(&graph, "n0", Some(&end), &flat),
            bellman_ford(&graph, "n0", Some(&end), &flat),
            astar(&graph, "n0", &end, &flat),
        ];
        for result in runs {
            match expected {
                Some(cost) => {
                    let path = result.shortest_path.unwrap_or_default();
                    prop_assert_eq!(path.first(), Some(&start));
                    prop_assert_eq!(path.last(), Some(&end));
                    prop_assert_eq!(graph.path_cost(&path), Some(cost));
                }
                None => prop_assert!(result.shortest_path.is_none()),
            }
        }
    }

    #[test]
    fn test_negative_cycle_detected_iff_reachable(raw in raw_graph(-3..=9)) {
        let graph = build(&raw);
        let floyd = graph.distance_matrix().matrix;
        let reachable_negative_cycle = (0..graph.node_count())
            .any(|v| floyd[0][v].is_some() && floyd[v][v].is_some_and(|d| d < 0.0));

        let result = bellman_ford(&graph, "n0", None, &EngineConfig::default());
        prop_assert_eq!(result.has_negative_cycle, Some(reachable_negative_cycle));
        prop_assert_eq!(
            result.count(StepKind::CycleDetected),
            usize::from(reachable_negative_cycle)
        );
    }

    #[test]
    fn test_dfs_cycle_flag_matches_structure(raw in raw_graph(1..=9)) {
        let graph = build(&raw);
        let reach = unit_weights(&graph).distance_matrix().matrix;
        let n = graph.node_count();
        let reachable = |v: usize| reach[0][v].is_some();

        let expected = if graph.is_directed() {
            // some reachable edge u -> v whose head can get back to u
            graph.edges().iter().any(|e| {
                let (u, v) = (index_of(&graph, &e.source), index_of(&graph, &e.target));
                reachable(u) && reach[v][u].is_some()
            })
        } else {
            // the start's component is not a tree
            let nodes = (0..n).filter(|&v| reachable(v)).count();
            let edges = graph
                .edges()
                .iter()
                .filter(|e| reachable(index_of(&graph, &e.source)))
                .count();
            edges >= nodes
        };

        let result = dfs(&graph, "n0", None, &EngineConfig::default());
        prop_assert_eq!(result.has_cycle, Some(expected));
        prop_assert_eq!(visits(&result.steps).len(), (0..n).filter(|&v| reachable(v)).count());
    }

    #[test]
    fn test_undirected_distance_matrix_symmetric(raw in raw_graph(1..=9)) {
        let (n, _, edges) = raw;
        let graph = build(&(n, false, edges));
        let m = graph.distance_matrix().matrix;
        for i in 0..n {
            for j in 0..n {
                prop_assert_eq!(m[i][j], m[j][i]);
            }
        }
    }

    #[test]
    fn test_snapshot_opt_out_keeps_step_sequence(raw in raw_graph(1..=9)) {
        let graph = build(&raw);
        let end = node_id(graph.node_count() - 1);
        let full = EngineConfig::default();
        let lean = EngineConfig::default().with_snapshots(false);

        for (a, b) in [
            (bfs(&graph, "n0", None, &full), bfs(&graph, "n0", None, &lean)),
            (dfs(&graph, "n0", None, &full), dfs(&graph, "n0", None, &lean)),
            (dijkstra(&graph, "n0", None, &full), dijkstra(&graph, "n0", None, &lean)),
            (astar(&graph, "n0", &end, &full), astar(&graph, "n0", &end, &lean)),
        ] {
            prop_assert_eq!(a.steps.len(), b.steps.len());
            for (x, y) in a.steps.iter().zip(&b.steps) {
                prop_assert_eq!(x.kind, y.kind);
                prop_assert_eq!(&x.node_id, &y.node_id);
                prop_assert_eq!(&x.edge_id, &y.edge_id);
                prop_assert_eq!(&x.message, &y.message);
                prop_assert_eq!(&x.current_path, &y.current_path);
                prop_assert!(y.distances.is_none() && y.visited.is_none());
                prop_assert!(y.queue.is_none() && y.stack.is_none());
            }
            prop_assert_eq!(a.shortest_path, b.shortest_path);
        }
    }

    #[test]
    fn test_runs_are_deterministic(raw in raw_graph(-3..=9)) {
        let graph = build(&raw);
        let config = EngineConfig::default();
        prop_assert_eq!(
            bellman_ford(&graph, "n0", None, &config),
            bellman_ford(&graph, "n0", None, &config)
        );
        prop_assert_eq!(dfs(&graph, "n0", None, &config), dfs(&graph, "n0", None, &config));
    }
}
