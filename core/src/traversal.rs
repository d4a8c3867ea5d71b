use std::collections::{HashMap, VecDeque};

use indexmap::IndexSet;

use crate::config::EngineConfig;
use crate::graph::{Adjacency, Graph, Neighbor, NodeId};
use crate::step::{AlgorithmResult, StepKind, StepRecorder, VisitedSet};

/// node → predecessor on the best known route. The start maps to `None`.
pub(crate) type ParentMap = HashMap<NodeId, Option<NodeId>>;

/// Walk parent pointers from `end` back to the start.
///
/// Stops after `parent.len()` hops so a corrupted (cyclic) parent chain
/// cannot loop forever.
pub(crate) fn reconstruct_path(parent: &ParentMap, end: &str) -> Vec<NodeId> {
    let mut path = vec![end.to_string()];
    let mut current = end;

    while let Some(Some(prev)) = parent.get(current) {
        if path.len() > parent.len() {
            break;
        }
        path.push(prev.clone());
        current = prev;
    }

    path.reverse();
    path
}

/// Display label of a node, falling back to its id.
pub(crate) fn label(adj: &Adjacency<'_>, id: &str) -> String {
    adj.node(id)
        .map(|n| n.label.clone())
        .unwrap_or_else(|| id.to_string())
}

pub(crate) fn describe_path(adj: &Adjacency<'_>, path: &[NodeId]) -> String {
    path.iter()
        .map(|id| label(adj, id))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Emit one `path` step per edge of `path`, start to end.
pub(crate) fn record_path(rec: &mut StepRecorder, adj: &Adjacency<'_>, path: &[NodeId]) {
    for pair in path.windows(2) {
        let mut step = rec
            .step(
                StepKind::Path,
                format!("Path: {} → {}", label(adj, &pair[0]), label(adj, &pair[1])),
            )
            .node(&pair[1]);
        if let Some(hop) = adj.neighbors(&pair[0]).iter().find(|n| n.node.id == pair[1]) {
            step = step.edge(&hop.edge.id);
        }
        step.record();
    }
}

fn edge_message(verb: &str, adj: &Adjacency<'_>, from: &str, neighbor: &Neighbor<'_>) -> String {
    format!("{verb} edge {} → {}", label(adj, from), neighbor.node.label)
}

/// Breadth-first search from `start`, stopping early at `end` if given.
///
/// Nodes are visited in non-decreasing hop distance; within a layer, in
/// discovery order (edge-list order). A node is enqueued the first time it
/// is discovered and visited exactly once, when dequeued.
pub fn bfs(
    graph: &Graph,
    start: &str,
    end: Option<&str>,
    config: &EngineConfig,
) -> AlgorithmResult {
    let adj = Adjacency::build(graph);
    let mut rec = StepRecorder::new(config.record_snapshots);

    let mut visited = VisitedSet::new();
    let mut parent: ParentMap = HashMap::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    parent.insert(start.to_string(), None);
    queue.push_back(start.to_string());

    while let Some(current) = queue.pop_front() {
        if visited.contains(&current) {
            continue;
        }
        visited.insert(current.clone());

        let message = if current == start {
            format!("Start BFS at {}", label(&adj, &current))
        } else {
            format!("Visit {}", label(&adj, &current))
        };
        rec.step(StepKind::Visit, message)
            .node(&current)
            .visited(&visited)
            .queue(&queue)
            .record();

        if end == Some(current.as_str()) {
            let path = reconstruct_path(&parent, &current);
            record_path(&mut rec, &adj, &path);
            rec.step(
                StepKind::Complete,
                format!(
                    "Reached {} in {} edge(s): {}",
                    label(&adj, &current),
                    path.len() - 1,
                    describe_path(&adj, &path)
                ),
            )
            .node(&current)
            .visited(&visited)
            .path(&path)
            .record();

            return AlgorithmResult {
                steps: rec.into_steps(),
                shortest_path: Some(path),
                ..AlgorithmResult::default()
            };
        }

        for neighbor in adj.neighbors(&current) {
            let id = &neighbor.node.id;
            if visited.contains(id) {
                continue;
            }
            if !parent.contains_key(id) {
                parent.insert(id.clone(), Some(current.clone()));
                queue.push_back(id.clone());
            }
            rec.step(StepKind::Explore, edge_message("Explore", &adj, &current, neighbor))
                .node(id)
                .edge(&neighbor.edge.id)
                .visited(&visited)
                .queue(&queue)
                .record();
        }
    }

    let message = match end {
        Some(end) => format!(
            "{} is not reachable from {}",
            label(&adj, end),
            label(&adj, start)
        ),
        None => format!("BFS traversal complete: visited {} node(s)", visited.len()),
    };
    rec.step(StepKind::Complete, message).visited(&visited).record();

    AlgorithmResult {
        steps: rec.into_steps(),
        ..AlgorithmResult::default()
    }
}

/// One level of the DFS recursion, kept on an explicit stack.
struct Frame<'a> {
    node: NodeId,
    parent: Option<NodeId>,
    neighbors: &'a [Neighbor<'a>],
    next: usize,
}

struct Dfs<'a> {
    adj: &'a Adjacency<'a>,
    end: Option<&'a str>,
    rec: StepRecorder,
    visited: VisitedSet,
    /// Nodes on the current recursion path, bottom first.
    on_path: IndexSet<NodeId>,
    parent: ParentMap,
    frames: Vec<Frame<'a>>,
    has_cycle: bool,
    found: Option<Vec<NodeId>>,
}

impl<'a> Dfs<'a> {
    /// Enter `node`. Returns true if it is the requested end node, in which
    /// case the terminal step has been recorded.
    fn enter(&mut self, node: &str, parent: Option<NodeId>, is_start: bool) -> bool {
        self.visited.insert(node.to_string());
        self.on_path.insert(node.to_string());
        self.parent.insert(node.to_string(), parent.clone());

        let message = if is_start {
            format!("Start DFS at {}", label(self.adj, node))
        } else {
            format!("Visit {}", label(self.adj, node))
        };
        self.rec
            .step(StepKind::Visit, message)
            .node(node)
            .visited(&self.visited)
            .stack(&self.on_path)
            .record();

        if self.end == Some(node) {
            let path = reconstruct_path(&self.parent, node);
            record_path(&mut self.rec, self.adj, &path);
            self.rec
                .step(
                    StepKind::Complete,
                    format!(
                        "Found {}: {}",
                        label(self.adj, node),
                        describe_path(self.adj, &path)
                    ),
                )
                .node(node)
                .visited(&self.visited)
                .stack(&self.on_path)
                .path(&path)
                .record();
            self.found = Some(path);
            return true;
        }

        self.frames.push(Frame {
            node: node.to_string(),
            parent,
            neighbors: self.adj.neighbors(node),
            next: 0,
        });
        false
    }

    fn run(&mut self, start: &str) {
        if self.enter(start, None, true) {
            return;
        }
        let undirected = !self.adj.graph().is_directed();

        while let Some(frame) = self.frames.last_mut() {
            if frame.next == frame.neighbors.len() {
                self.on_path.pop();
                self.frames.pop();
                continue;
            }
            let neighbor = frame.neighbors[frame.next];
            frame.next += 1;
            let current = frame.node.clone();
            let came_from = frame.parent.clone();
            let id = neighbor.node.id.as_str();

            self.rec
                .step(
                    StepKind::Explore,
                    edge_message("Explore", self.adj, &current, &neighbor),
                )
                .node(id)
                .edge(&neighbor.edge.id)
                .visited(&self.visited)
                .stack(&self.on_path)
                .record();

            // The edge back to the parent is the tree edge itself.
            if undirected && came_from.as_deref() == Some(id) {
                continue;
            }

            if self.on_path.contains(id) {
                self.has_cycle = true;
                self.rec
                    .step(
                        StepKind::CycleDetected,
                        format!(
                            "Cycle detected: back edge {} → {}",
                            label(self.adj, &current),
                            neighbor.node.label
                        ),
                    )
                    .node(id)
                    .edge(&neighbor.edge.id)
                    .visited(&self.visited)
                    .stack(&self.on_path)
                    .record();
            } else if !self.visited.contains(id) && self.enter(id, Some(current), false) {
                return;
            }
        }
    }
}

/// Depth-first search from `start` with back-edge cycle detection.
///
/// Every edge out of a visited node is explored, in edge-list order. An
/// edge to a node still on the recursion path is a back edge and flags a
/// cycle, except on undirected graphs where the edge leads straight back
/// to the parent. Reaching `end` stops the search immediately.
pub fn dfs(
    graph: &Graph,
    start: &str,
    end: Option<&str>,
    config: &EngineConfig,
) -> AlgorithmResult {
    let adj = Adjacency::build(graph);
    let mut state = Dfs {
        adj: &adj,
        end,
        rec: StepRecorder::new(config.record_snapshots),
        visited: VisitedSet::new(),
        on_path: IndexSet::new(),
        parent: HashMap::new(),
        frames: Vec::new(),
        has_cycle: false,
        found: None,
    };
    state.run(start);

    let Dfs {
        mut rec,
        visited,
        has_cycle,
        found,
        ..
    } = state;

    if found.is_none() {
        let message = match (end, has_cycle) {
            (Some(end), _) => format!(
                "{} is not reachable from {}",
                label(&adj, end),
                label(&adj, start)
            ),
            (None, true) => format!(
                "DFS traversal complete: visited {} node(s), cycle detected",
                visited.len()
            ),
            (None, false) => format!(
                "DFS traversal complete: visited {} node(s), no cycle found",
                visited.len()
            ),
        };
        rec.step(StepKind::Complete, message).visited(&visited).record();
    }

    AlgorithmResult {
        steps: rec.into_steps(),
        shortest_path: found,
        has_cycle: Some(has_cycle),
        ..AlgorithmResult::default()
    }
}
