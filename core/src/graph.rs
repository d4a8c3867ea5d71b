use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stable, unique node identifier.
pub type NodeId = String;

/// Stable, unique edge identifier.
pub type EdgeId = String;

/// A node with its canvas position. Position only matters to A*'s heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// An edge between two nodes.
///
/// Directionality is a graph-level flag: on an undirected graph `source`
/// and `target` are interchangeable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

/// Partial node update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub label: Option<String>,
}

/// A node reachable from another over one edge.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    pub node: &'a Node,
    pub edge: &'a Edge,
    pub weight: f64,
}

/// Square matrix indexed by node position, with node labels as headers.
///
/// `None` marks a missing edge (adjacency) or an unreachable pair (distances).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    pub matrix: Vec<Vec<Option<f64>>>,
    pub labels: Vec<String>,
}

/// In-memory graph: node list, edge list and the directed/weighted flags.
///
/// Mutators never modify `self`; they return an updated copy, or an
/// unchanged copy when the request would break an invariant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    is_directed: bool,
    is_weighted: bool,
}

impl Graph {
    /// Empty graph with the given flags.
    pub fn new(is_directed: bool, is_weighted: bool) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            is_directed,
            is_weighted,
        }
    }

    /// Build a graph from prepared node and edge lists, rejecting anything
    /// the mutators would have refused.
    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        is_directed: bool,
        is_weighted: bool,
    ) -> Result<Self> {
        let graph = Self {
            nodes,
            edges,
            is_directed,
            is_weighted,
        };
        graph.validate()?;
        Ok(graph)
    }

    /// The six-node A–F demo graph (undirected, weighted).
    ///
    /// ```text
    ///   A --4-- B --3-- C
    ///   |       |       |
    ///   2       1       5
    ///   |       |       |
    ///   D --3-- E --2-- F
    /// ```
    pub fn sample() -> Self {
        let node = |id: &str, x: f64, y: f64| Node {
            id: id.to_string(),
            x,
            y,
            label: id.to_string(),
        };
        let edge = |id: &str, source: &str, target: &str, weight: f64| Edge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            weight,
        };
        Self {
            nodes: vec![
                node("A", 100.0, 100.0),
                node("B", 300.0, 100.0),
                node("C", 500.0, 100.0),
                node("D", 100.0, 300.0),
                node("E", 300.0, 300.0),
                node("F", 500.0, 300.0),
            ],
            edges: vec![
                edge("e1", "A", "B", 4.0),
                edge("e2", "A", "D", 2.0),
                edge("e3", "B", "C", 3.0),
                edge("e4", "B", "E", 1.0),
                edge("e5", "C", "F", 5.0),
                edge("e6", "D", "E", 3.0),
                edge("e7", "E", "F", 2.0),
            ],
            is_directed: false,
            is_weighted: true,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn is_directed(&self) -> bool {
        self.is_directed
    }

    pub fn is_weighted(&self) -> bool {
        self.is_weighted
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// True if any stored weight is negative.
    pub fn has_negative_weight(&self) -> bool {
        self.edges.iter().any(|e| e.weight < 0.0)
    }

    /// Add a node with a generated id. Without a label, the node is named
    /// spreadsheet-style after its position (A, B, ..., Z, AA, ...).
    #[must_use]
    pub fn add_node(&self, x: f64, y: f64, label: Option<&str>) -> Self {
        let id = self.next_id('n', |candidate| self.contains_node(candidate), self.nodes.len());
        self.add_node_with_id(&id, x, y, label)
    }

    /// Add a node with a caller-chosen id. No-op if the id is taken.
    #[must_use]
    pub fn add_node_with_id(&self, id: &str, x: f64, y: f64, label: Option<&str>) -> Self {
        if self.contains_node(id) {
            tracing::debug!(node = id, "add_node ignored: id already in use");
            return self.clone();
        }
        let mut next = self.clone();
        next.nodes.push(Node {
            id: id.to_string(),
            x,
            y,
            label: label
                .map(str::to_string)
                .unwrap_or_else(|| default_label(self.nodes.len())),
        });
        next
    }

    /// Add an edge with a generated id.
    ///
    /// No-op when `source == target`, when either endpoint is missing, when
    /// `weight` is not finite, or when an equivalent edge exists. On undirected graphs (a, b) and
    /// (b, a) are equivalent.
    #[must_use]
    pub fn add_edge(&self, source: &str, target: &str, weight: f64) -> Self {
        if source == target {
            tracing::debug!(node = source, "add_edge ignored: self-loop");
            return self.clone();
        }
        if !self.contains_node(source) || !self.contains_node(target) {
            tracing::debug!(source, target, "add_edge ignored: unknown endpoint");
            return self.clone();
        }
        if !weight.is_finite() {
            tracing::debug!(source, target, weight, "add_edge ignored: non-finite weight");
            return self.clone();
        }
        if self.find_edge(source, target).is_some() {
            tracing::debug!(source, target, "add_edge ignored: edge already exists");
            return self.clone();
        }

        let id = self.next_id('e', |candidate| self.edge(candidate).is_some(), self.edges.len());
        let mut next = self.clone();
        next.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            weight,
        });
        next
    }

    /// Remove a node and every edge touching it.
    #[must_use]
    pub fn remove_node(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.nodes.retain(|n| n.id != id);
        next.edges.retain(|e| e.source != id && e.target != id);
        next
    }

    #[must_use]
    pub fn remove_edge(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.edges.retain(|e| e.id != id);
        next
    }

    #[must_use]
    pub fn update_node(&self, id: &str, update: NodeUpdate) -> Self {
        let mut next = self.clone();
        if let Some(node) = next.nodes.iter_mut().find(|n| n.id == id) {
            if let Some(x) = update.x {
                node.x = x;
            }
            if let Some(y) = update.y {
                node.y = y;
            }
            if let Some(label) = update.label {
                node.label = label;
            }
        }
        next
    }

    /// No-op when `weight` is NaN or infinite.
    #[must_use]
    pub fn update_edge_weight(&self, id: &str, weight: f64) -> Self {
        if !weight.is_finite() {
            tracing::debug!(edge = id, weight, "update_edge_weight ignored: non-finite weight");
            return self.clone();
        }
        let mut next = self.clone();
        if let Some(edge) = next.edges.iter_mut().find(|e| e.id == id) {
            edge.weight = weight;
        }
        next
    }

    /// The edge joining `from` to `to`, respecting directedness.
    pub fn find_edge(&self, from: &str, to: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| {
            (e.source == from && e.target == to)
                || (!self.is_directed && e.source == to && e.target == from)
        })
    }

    /// Neighbors of `id` in edge-list order.
    ///
    /// Directed graphs follow outgoing edges only; undirected graphs follow
    /// every edge the node is an endpoint of.
    pub fn get_neighbors(&self, id: &str) -> Vec<Neighbor<'_>> {
        self.edges
            .iter()
            .filter_map(|edge| {
                let other = if edge.source == id {
                    &edge.target
                } else if !self.is_directed && edge.target == id {
                    &edge.source
                } else {
                    return None;
                };
                self.node(other).map(|node| Neighbor {
                    node,
                    edge,
                    weight: edge.weight,
                })
            })
            .collect()
    }

    /// Summed weight along `path`, or `None` if some consecutive pair is
    /// not joined by an edge. An empty or single-node path costs 0.
    pub fn path_cost(&self, path: &[NodeId]) -> Option<f64> {
        path.windows(2)
            .map(|pair| self.find_edge(&pair[0], &pair[1]).map(|e| e.weight))
            .sum()
    }

    /// `matrix[i][j]` is the edge weight from node i to node j, `Some(0)` on
    /// the diagonal and `None` where no edge exists.
    pub fn adjacency_matrix(&self) -> WeightMatrix {
        let n = self.nodes.len();
        let index: HashMap<&str, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut matrix = vec![vec![None; n]; n];
        for (i, row) in matrix.iter_mut().enumerate() {
            row[i] = Some(0.0);
        }
        for edge in &self.edges {
            let (Some(&i), Some(&j)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            matrix[i][j] = Some(edge.weight);
            if !self.is_directed {
                matrix[j][i] = Some(edge.weight);
            }
        }

        WeightMatrix {
            matrix,
            labels: self.nodes.iter().map(|n| n.label.clone()).collect(),
        }
    }

    /// All-pairs shortest distances (Floyd–Warshall over the adjacency
    /// matrix). Unreachable pairs are `None`.
    pub fn distance_matrix(&self) -> WeightMatrix {
        let WeightMatrix { matrix, labels } = self.adjacency_matrix();
        let n = matrix.len();

        let mut dist: Vec<Vec<f64>> = matrix
            .into_iter()
            .map(|row| row.into_iter().map(|w| w.unwrap_or(f64::INFINITY)).collect())
            .collect();

        for k in 0..n {
            for i in 0..n {
                if dist[i][k] == f64::INFINITY {
                    continue;
                }
                for j in 0..n {
                    let through = dist[i][k] + dist[k][j];
                    if through < dist[i][j] {
                        dist[i][j] = through;
                    }
                }
            }
        }

        WeightMatrix {
            matrix: dist
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|d| if d == f64::INFINITY { None } else { Some(d) })
                        .collect()
                })
                .collect(),
            labels,
        }
    }

    /// Check the structural invariants: unique node ids, edges between
    /// existing distinct nodes, unique edge ids, no repeated connections.
    pub fn validate(&self) -> Result<()> {
        let mut node_ids: HashSet<&str> = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !node_ids.insert(node.id.as_str()) {
                return Err(Error::DuplicateNode(node.id.clone()));
            }
        }

        let mut edge_ids: HashSet<&str> = HashSet::with_capacity(self.edges.len());
        let mut pairs: HashSet<(&str, &str)> = HashSet::with_capacity(self.edges.len());
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(Error::DanglingEdge {
                        edge: edge.id.clone(),
                        node: endpoint.clone(),
                    });
                }
            }
            if edge.source == edge.target {
                return Err(Error::SelfLoop(edge.id.clone()));
            }
            if !edge.weight.is_finite() {
                return Err(Error::InvalidWeight(edge.id.clone()));
            }
            let (a, b) = (edge.source.as_str(), edge.target.as_str());
            let pair = if self.is_directed || a < b { (a, b) } else { (b, a) };
            if !edge_ids.insert(edge.id.as_str()) || !pairs.insert(pair) {
                return Err(Error::DuplicateEdge(edge.id.clone()));
            }
        }
        Ok(())
    }

    /// Smallest unused `<prefix><k>` with `k` above the current count.
    fn next_id(&self, prefix: char, taken: impl Fn(&str) -> bool, count: usize) -> String {
        (count + 1..)
            .map(|k| format!("{prefix}{k}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_default()
    }
}

/// Spreadsheet-style label for the node at `index`: A..Z, AA, AB, ...
fn default_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Per-run neighbor index over a borrowed graph.
///
/// Built once in O(V + E); `neighbors` yields exactly the order of
/// [`Graph::get_neighbors`] without rescanning the edge list.
pub struct Adjacency<'a> {
    graph: &'a Graph,
    nodes: HashMap<&'a str, &'a Node>,
    lists: HashMap<&'a str, Vec<Neighbor<'a>>>,
}

impl<'a> Adjacency<'a> {
    pub fn build(graph: &'a Graph) -> Self {
        let nodes: HashMap<&'a str, &'a Node> =
            graph.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let mut lists: HashMap<&'a str, Vec<Neighbor<'a>>> =
            graph.nodes.iter().map(|n| (n.id.as_str(), Vec::new())).collect();

        for edge in &graph.edges {
            let (Some(&source), Some(&target)) =
                (nodes.get(edge.source.as_str()), nodes.get(edge.target.as_str()))
            else {
                continue;
            };
            if let Some(list) = lists.get_mut(source.id.as_str()) {
                list.push(Neighbor {
                    node: target,
                    edge,
                    weight: edge.weight,
                });
            }
            if !graph.is_directed {
                if let Some(list) = lists.get_mut(target.id.as_str()) {
                    list.push(Neighbor {
                        node: source,
                        edge,
                        weight: edge.weight,
                    });
                }
            }
        }

        Self { graph, nodes, lists }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub fn neighbors(&self, id: &str) -> &[Neighbor<'a>] {
        self.lists.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }
}
