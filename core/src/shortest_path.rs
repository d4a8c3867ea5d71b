use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::frontier::MinQueue;
use crate::graph::{Adjacency, Edge, Graph, Node, NodeId};
use crate::step::{
    fmt_distance, AlgorithmResult, DistanceMap, StepKind, StepRecorder, VisitedSet,
};
use crate::traversal::{describe_path, label, reconstruct_path, record_path, ParentMap};

/// Start at 0, every other node unreachable, in graph node order.
fn initial_distances(graph: &Graph, start: &str) -> DistanceMap {
    graph
        .nodes()
        .iter()
        .map(|n| {
            let d = if n.id == start { 0.0 } else { f64::INFINITY };
            (n.id.clone(), d)
        })
        .collect()
}

fn distance_of(distances: &DistanceMap, id: &str) -> f64 {
    distances.get(id).copied().unwrap_or(f64::INFINITY)
}

/// Record the `path` steps and the terminal step for a found path.
fn complete_with_path(
    rec: &mut StepRecorder,
    adj: &Adjacency<'_>,
    parent: &ParentMap,
    end: &str,
    distances: &DistanceMap,
    visited: Option<&VisitedSet>,
) -> Vec<NodeId> {
    let path = reconstruct_path(parent, end);
    record_path(rec, adj, &path);
    let message = format!(
        "Shortest path to {} (distance {}): {}",
        label(adj, end),
        fmt_distance(distance_of(distances, end)),
        describe_path(adj, &path)
    );
    let mut step = rec
        .step(StepKind::Complete, message)
        .node(end)
        .distances(distances)
        .path(&path);
    if let Some(visited) = visited {
        step = step.visited(visited);
    }
    step.record();
    path
}

/// Terminal step when the run ends without producing a path.
fn complete_without_path(
    rec: &mut StepRecorder,
    adj: &Adjacency<'_>,
    start: &str,
    end: Option<&str>,
    distances: &DistanceMap,
    visited: Option<&VisitedSet>,
) {
    let message = match end {
        Some(end) => format!(
            "No path from {} to {}",
            label(adj, start),
            label(adj, end)
        ),
        None => format!("All shortest paths from {} computed", label(adj, start)),
    };
    let mut step = rec.step(StepKind::Complete, message).distances(distances);
    if let Some(visited) = visited {
        step = step.visited(visited);
    }
    step.record();
}

/// Dijkstra's single-source shortest paths.
///
/// Every node starts on the frontier (start at 0, others at ∞). The minimum
/// entry is popped each round, ties going to the earlier push; entries for
/// already-visited nodes are skipped, and popping ∞ ends the run because
/// nothing left is reachable. Weights are used as stored; negative weights
/// give undefined (but deterministic) results.
pub fn dijkstra(
    graph: &Graph,
    start: &str,
    end: Option<&str>,
    config: &EngineConfig,
) -> AlgorithmResult {
    if graph.has_negative_weight() {
        tracing::warn!(start, "dijkstra run over a graph with negative weights");
    }

    let adj = Adjacency::build(graph);
    let mut rec = StepRecorder::new(config.record_snapshots);

    let mut distances = initial_distances(graph, start);
    let mut parent: ParentMap = HashMap::new();
    parent.insert(start.to_string(), None);
    let mut visited = VisitedSet::new();

    let mut frontier = MinQueue::new();
    for (id, &d) in &distances {
        frontier.push(id.clone(), d);
    }

    while let Some((current, _)) = frontier.pop() {
        if visited.contains(&current) {
            continue;
        }
        let current_dist = distance_of(&distances, &current);
        if current_dist == f64::INFINITY {
            break;
        }
        visited.insert(current.clone());

        rec.step(
            StepKind::Visit,
            format!(
                "Visit {} (distance {})",
                label(&adj, &current),
                fmt_distance(current_dist)
            ),
        )
        .node(&current)
        .distances(&distances)
        .visited(&visited)
        .queue(&frontier)
        .record();

        if end == Some(current.as_str()) {
            let path = complete_with_path(
                &mut rec,
                &adj,
                &parent,
                &current,
                &distances,
                Some(&visited),
            );
            return AlgorithmResult {
                steps: rec.into_steps(),
                shortest_path: Some(path),
                distances: Some(distances),
                ..AlgorithmResult::default()
            };
        }

        for neighbor in adj.neighbors(&current) {
            let id = &neighbor.node.id;
            if visited.contains(id) {
                continue;
            }
            let known = distance_of(&distances, id);
            let candidate = current_dist + neighbor.weight;

            rec.step(
                StepKind::Explore,
                format!(
                    "Check {} → {}: current {}, via {} {}",
                    label(&adj, &current),
                    neighbor.node.label,
                    fmt_distance(known),
                    label(&adj, &current),
                    fmt_distance(candidate)
                ),
            )
            .node(id)
            .edge(&neighbor.edge.id)
            .distances(&distances)
            .visited(&visited)
            .record();

            if candidate < known {
                distances.insert(id.clone(), candidate);
                parent.insert(id.clone(), Some(current.clone()));
                frontier.push(id.clone(), candidate);

                rec.step(
                    StepKind::Relax,
                    format!(
                        "Relax {}: {} → {}",
                        neighbor.node.label,
                        fmt_distance(known),
                        fmt_distance(candidate)
                    ),
                )
                .node(id)
                .edge(&neighbor.edge.id)
                .distances(&distances)
                .visited(&visited)
                .queue(&frontier)
                .record();
            }
        }
    }

    complete_without_path(&mut rec, &adj, start, end, &distances, Some(&visited));
    AlgorithmResult {
        steps: rec.into_steps(),
        distances: Some(distances),
        ..AlgorithmResult::default()
    }
}

/// Edges as `(edge, from, to)` in the order Bellman-Ford relaxes them:
/// edge-list order, and on undirected graphs both directions back to back.
fn relaxation_order(graph: &Graph) -> Vec<(&Edge, &str, &str)> {
    let mut order = Vec::with_capacity(graph.edge_count() * 2);
    for edge in graph.edges() {
        order.push((edge, edge.source.as_str(), edge.target.as_str()));
        if !graph.is_directed() {
            order.push((edge, edge.target.as_str(), edge.source.as_str()));
        }
    }
    order
}

/// Bellman-Ford single-source shortest paths with negative-cycle detection.
///
/// Runs up to `n - 1` passes over every edge, stopping early after a pass
/// with no update, then one extra pass: if any edge still relaxes, a
/// negative cycle is reachable from `start` and no path is reported.
pub fn bellman_ford(
    graph: &Graph,
    start: &str,
    end: Option<&str>,
    config: &EngineConfig,
) -> AlgorithmResult {
    let adj = Adjacency::build(graph);
    let mut rec = StepRecorder::new(config.record_snapshots);

    let mut distances = initial_distances(graph, start);
    let mut parent: ParentMap = HashMap::new();
    parent.insert(start.to_string(), None);
    let edges = relaxation_order(graph);
    let passes = graph.node_count().saturating_sub(1);

    for pass in 1..=passes {
        rec.step(StepKind::Visit, format!("Iteration {pass} of {passes}"))
            .distances(&distances)
            .record();

        let mut updated = false;
        for &(edge, from, to) in &edges {
            let from_dist = distance_of(&distances, from);
            if from_dist == f64::INFINITY {
                continue;
            }
            let known = distance_of(&distances, to);
            let candidate = from_dist + edge.weight;
            if candidate < known {
                distances.insert(to.to_string(), candidate);
                parent.insert(to.to_string(), Some(from.to_string()));
                updated = true;

                rec.step(
                    StepKind::Relax,
                    format!(
                        "Relax {} via {}: {} → {}",
                        label(&adj, to),
                        label(&adj, from),
                        fmt_distance(known),
                        fmt_distance(candidate)
                    ),
                )
                .node(to)
                .edge(&edge.id)
                .distances(&distances)
                .record();
            }
        }

        if !updated {
            tracing::trace!(pass, "bellman-ford converged early");
            break;
        }
    }

    let still_relaxes = edges.iter().find(|&&(edge, from, to)| {
        let from_dist = distance_of(&distances, from);
        from_dist != f64::INFINITY && from_dist + edge.weight < distance_of(&distances, to)
    });
    if let Some(&(edge, from, to)) = still_relaxes {
        rec.step(
            StepKind::CycleDetected,
            format!(
                "Negative cycle detected: edge {} → {} can still be relaxed",
                label(&adj, from),
                label(&adj, to)
            ),
        )
        .node(to)
        .edge(&edge.id)
        .distances(&distances)
        .record();
        rec.step(
            StepKind::Complete,
            "Negative cycle reachable from start: shortest paths are undefined",
        )
        .distances(&distances)
        .record();

        return AlgorithmResult {
            steps: rec.into_steps(),
            distances: Some(distances),
            has_negative_cycle: Some(true),
            ..AlgorithmResult::default()
        };
    }

    let reached = end.filter(|e| distance_of(&distances, e) != f64::INFINITY);
    let shortest_path = match reached {
        Some(end) => Some(complete_with_path(
            &mut rec, &adj, &parent, end, &distances, None,
        )),
        None => {
            complete_without_path(&mut rec, &adj, start, end, &distances, None);
            None
        }
    };

    AlgorithmResult {
        steps: rec.into_steps(),
        shortest_path,
        distances: Some(distances),
        has_negative_cycle: Some(false),
        ..AlgorithmResult::default()
    }
}

/// Euclidean canvas distance between two nodes, divided by `scale`.
fn heuristic(from: &Node, to: &Node, scale: f64) -> f64 {
    (from.x - to.x).hypot(from.y - to.y) / scale
}

/// A* search from `start` to `end`.
///
/// The open set is a list stably re-sorted by f-score before every pop, so
/// ties go to list order. The heuristic is canvas distance divided by
/// [`EngineConfig::heuristic_scale`]; it is admissible only when every edge
/// weight is at least the scaled length of the edge, so the path found is
/// not guaranteed optimal in general.
pub fn astar(graph: &Graph, start: &str, end: &str, config: &EngineConfig) -> AlgorithmResult {
    if graph.has_negative_weight() {
        tracing::warn!(start, end, "astar run over a graph with negative weights");
    }

    let adj = Adjacency::build(graph);
    let mut rec = StepRecorder::new(config.record_snapshots);
    let goal = adj.node(end);
    let h = |id: &str| match (adj.node(id), goal) {
        (Some(node), Some(goal)) => heuristic(node, goal, config.heuristic_scale),
        _ => 0.0,
    };

    let mut g_score = initial_distances(graph, start);
    let mut f_score: HashMap<NodeId, f64> = HashMap::new();
    f_score.insert(start.to_string(), h(start));
    let mut parent: ParentMap = HashMap::new();
    parent.insert(start.to_string(), None);

    let mut open: Vec<NodeId> = vec![start.to_string()];
    let mut closed = VisitedSet::new();

    while !open.is_empty() {
        open.sort_by(|a, b| {
            let fa = f_score.get(a).copied().unwrap_or(f64::INFINITY);
            let fb = f_score.get(b).copied().unwrap_or(f64::INFINITY);
            fa.total_cmp(&fb)
        });
        let current = open.remove(0);
        if closed.contains(&current) {
            continue;
        }
        closed.insert(current.clone());

        let current_g = distance_of(&g_score, &current);
        rec.step(
            StepKind::Visit,
            format!(
                "Visit {} (g {}, f {})",
                label(&adj, &current),
                fmt_distance(current_g),
                fmt_distance(f_score.get(&current).copied().unwrap_or(f64::INFINITY))
            ),
        )
        .node(&current)
        .distances(&g_score)
        .visited(&closed)
        .queue(&open)
        .record();

        if current == end {
            let path = complete_with_path(&mut rec, &adj, &parent, end, &g_score, Some(&closed));
            return AlgorithmResult {
                steps: rec.into_steps(),
                shortest_path: Some(path),
                distances: Some(g_score),
                ..AlgorithmResult::default()
            };
        }

        for neighbor in adj.neighbors(&current) {
            let id = &neighbor.node.id;
            if closed.contains(id) {
                continue;
            }
            let known = distance_of(&g_score, id);
            let tentative = current_g + neighbor.weight;

            rec.step(
                StepKind::Explore,
                format!(
                    "Check {} → {}: g {}, via {} {}",
                    label(&adj, &current),
                    neighbor.node.label,
                    fmt_distance(known),
                    label(&adj, &current),
                    fmt_distance(tentative)
                ),
            )
            .node(id)
            .edge(&neighbor.edge.id)
            .distances(&g_score)
            .visited(&closed)
            .record();

            if tentative < known {
                parent.insert(id.clone(), Some(current.clone()));
                g_score.insert(id.clone(), tentative);
                let f = tentative + h(id.as_str());
                f_score.insert(id.clone(), f);
                if !open.contains(id) {
                    open.push(id.clone());
                }

                rec.step(
                    StepKind::Relax,
                    format!(
                        "Relax {}: g {} → {}, f {}",
                        neighbor.node.label,
                        fmt_distance(known),
                        fmt_distance(tentative),
                        fmt_distance(f)
                    ),
                )
                .node(id)
                .edge(&neighbor.edge.id)
                .distances(&g_score)
                .visited(&closed)
                .queue(&open)
                .record();
            }
        }
    }

    complete_without_path(&mut rec, &adj, start, Some(end), &g_score, Some(&closed));
    AlgorithmResult {
        steps: rec.into_steps(),
        distances: Some(g_score),
        ..AlgorithmResult::default()
    }
}
