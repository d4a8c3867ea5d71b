//! Deterministic synthetic graphs, laid out on a canvas.
//!
//! Every generator is seeded, so the same node count always produces the
//! same graph. Edge weights follow on-canvas length (divided by the default
//! heuristic scale, rounded up) plus a little noise, which keeps the A*
//! heuristic admissible on these layouts.

use std::collections::HashSet;
use std::f64::consts::TAU;

use graph_steps_core::{Edge, Graph, Node, Result, DEFAULT_HEURISTIC_SCALE};

/// Simple LCG for deterministic, fast pseudo-random numbers.
pub struct FastRng(u64);

impl FastRng {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Collects nodes and edges, dropping self-loops and repeated connections
/// so the result always passes [`Graph::validate`].
struct Builder {
    directed: bool,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    seen: HashSet<(usize, usize)>,
}

impl Builder {
    fn new(directed: bool, capacity: usize) -> Self {
        Self {
            directed,
            nodes: Vec::with_capacity(capacity),
            edges: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn node(&mut self, x: f64, y: f64) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            id: format!("n{}", index + 1),
            x,
            y,
            label: format!("{}", index + 1),
        });
        index
    }

    fn edge(&mut self, from: usize, to: usize, rng: &mut FastRng) {
        if from == to || from >= self.nodes.len() || to >= self.nodes.len() {
            return;
        }
        let key = if self.directed || from < to { (from, to) } else { (to, from) };
        if !self.seen.insert(key) {
            return;
        }
        let (a, b) = (&self.nodes[from], &self.nodes[to]);
        let length = (a.x - b.x).hypot(a.y - b.y) / DEFAULT_HEURISTIC_SCALE;
        let weight = length.ceil().max(1.0) + rng.next(3) as f64;
        self.edges.push(Edge {
            id: format!("e{}", self.edges.len() + 1),
            source: a.id.clone(),
            target: b.id.clone(),
            weight,
        });
    }

    fn finish(self) -> Result<Graph> {
        Graph::from_parts(self.nodes, self.edges, self.directed, true)
    }
}

const SPACING: f64 = 100.0;

/// Square lattice with a few diagonal shortcuts. The layout A* is made for.
pub fn grid(node_count: usize) -> Result<Graph> {
    let side = (node_count as f64).sqrt().ceil().max(1.0) as usize;
    let mut b = Builder::new(false, node_count);
    let mut rng = FastRng::new(4242);

    for i in 0..node_count {
        b.node((i % side) as f64 * SPACING, (i / side) as f64 * SPACING);
    }
    for i in 0..node_count {
        if (i + 1) % side != 0 {
            b.edge(i, i + 1, &mut rng);
        }
        b.edge(i, i + side, &mut rng);
        if rng.next(10) == 0 && (i + 1) % side != 0 {
            b.edge(i, i + side + 1, &mut rng);
        }
    }
    b.finish()
}

/// Erdos-Renyi: uniform random directed edges, about three per node.
///
/// Baseline topology with no structure; directed so DFS sees real back
/// edges rather than every undirected loop.
pub fn random(node_count: usize) -> Result<Graph> {
    let n = node_count.max(1) as u64;
    let mut b = Builder::new(true, node_count);
    let mut rng = FastRng::new(54321);

    for _ in 0..node_count {
        let (x, y) = (rng.next_f64() * 2000.0, rng.next_f64() * 2000.0);
        b.node(x, y);
    }
    for _ in 0..node_count * 3 {
        let from = rng.next(n) as usize;
        let to = rng.next(n) as usize;
        b.edge(from, to, &mut rng);
    }
    b.finish()
}

/// Small-world (Watts-Strogatz): ring lattice plus random rewiring.
///
/// Nodes sit on a circle; each links to its `K` clockwise neighbours, and
/// with probability `P` a link is rewired to a random node instead.
pub fn small_world(node_count: usize) -> Result<Graph> {
    const K: usize = 3;
    const P: f64 = 0.05;
    let mut b = Builder::new(false, node_count);
    let mut rng = FastRng::new(67890);
    let radius = node_count as f64 * SPACING / TAU;

    for i in 0..node_count {
        let angle = TAU * i as f64 / node_count.max(1) as f64;
        b.node(radius * angle.cos(), radius * angle.sin());
    }
    for i in 0..node_count {
        for j in 1..=K {
            let neighbor = (i + j) % node_count;
            if rng.next_f64() < P {
                let rewired = rng.next(node_count as u64) as usize;
                b.edge(i, rewired, &mut rng);
            } else {
                b.edge(i, neighbor, &mut rng);
            }
        }
    }
    b.finish()
}

/// Barbell: two dense clusters joined by a thin bridge.
///
/// Worst case for "find the path through the bottleneck": every search
/// from one cluster to the other has to drain its own cluster first.
pub fn barbell(node_count: usize) -> Result<Graph> {
    let bridge_len = 5.min(node_count);
    let left_size = (node_count - bridge_len) / 2;
    let right_size = node_count - bridge_len - left_size;
    let mut b = Builder::new(false, node_count);
    let mut rng = FastRng::new(99999);

    let cluster_at = |b: &mut Builder, size: usize, cx: f64, rng: &mut FastRng| {
        let first = b.nodes.len();
        for _ in 0..size {
            let (dx, dy) = (rng.next_f64() * 400.0, rng.next_f64() * 400.0);
            b.node(cx + dx, dy);
        }
        for i in 0..size {
            for _ in 0..4.min(size.saturating_sub(1)) {
                let j = rng.next(size as u64) as usize;
                b.edge(first + i, first + j, rng);
            }
        }
        first
    };

    let left = cluster_at(&mut b, left_size, 0.0, &mut rng);
    let bridge_start = b.nodes.len();
    for i in 0..bridge_len {
        b.node(500.0 + i as f64 * SPACING, 200.0);
        if i > 0 {
            b.edge(bridge_start + i - 1, bridge_start + i, &mut rng);
        }
    }
    let right = cluster_at(&mut b, right_size, 600.0 + bridge_len as f64 * SPACING, &mut rng);

    if left_size > 0 && bridge_len > 0 {
        b.edge(left + left_size - 1, bridge_start, &mut rng);
    }
    if right_size > 0 && bridge_len > 0 {
        b.edge(bridge_start + bridge_len - 1, right, &mut rng);
    }
    b.finish()
}

/// L-system style branching tree: each node spawns three children one
/// level down. Deep, acyclic, and every node has exactly one path to it.
pub fn tree(node_count: usize) -> Result<Graph> {
    const BRANCHING: usize = 3;
    let mut b = Builder::new(true, node_count);
    let mut rng = FastRng::new(42);

    if node_count == 0 {
        return b.finish();
    }
    b.node(0.0, 0.0);
    let mut frontier = vec![0usize];
    let mut depth = 1.0;

    while b.nodes.len() < node_count && !frontier.is_empty() {
        let mut next = Vec::with_capacity(frontier.len() * BRANCHING);
        for &parent in &frontier {
            for _ in 0..BRANCHING {
                if b.nodes.len() >= node_count {
                    break;
                }
                let x = b.nodes[parent].x * BRANCHING as f64 + next.len() as f64 * SPACING;
                let child = b.node(x, depth * SPACING);
                b.edge(parent, child, &mut rng);
                next.push(child);
            }
        }
        frontier = next;
        depth += 1.0;
    }
    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_rng_is_deterministic() {
        let mut a = FastRng::new(7);
        let mut b = FastRng::new(7);
        for _ in 0..100 {
            assert_eq!(a.next(1000), b.next(1000));
        }
        let f = FastRng::new(1).next_f64();
        assert!((0.0..1.0).contains(&f));
    }

    #[test]
    fn test_generators_produce_requested_size() {
        for generator in [grid, random, small_world, barbell, tree] {
            let g = generator(60).unwrap();
            assert_eq!(g.node_count(), 60);
            assert!(g.validate().is_ok());
            assert!(!g.has_negative_weight());
        }
    }

    #[test]
    fn test_generators_are_deterministic() {
        assert_eq!(grid(50).unwrap(), grid(50).unwrap());
        assert_eq!(barbell(50).unwrap(), barbell(50).unwrap());
    }

    #[test]
    fn test_grid_is_connected() {
        let g = grid(49).unwrap();
        let reach = g.distance_matrix().matrix;
        assert!(reach[0].iter().all(Option::is_some));
    }

    #[test]
    fn test_tree_has_one_edge_per_child() {
        let g = tree(40).unwrap();
        assert_eq!(g.edge_count(), 39);
        assert!(g.is_directed());
    }

    #[test]
    fn test_weights_cover_canvas_length() {
        let g = grid(25).unwrap();
        for e in g.edges() {
            let (a, b) = (g.node(&e.source).unwrap(), g.node(&e.target).unwrap());
            let length = (a.x - b.x).hypot(a.y - b.y) / DEFAULT_HEURISTIC_SCALE;
            assert!(e.weight >= length, "{} shorter than its layout", e.id);
        }
    }

    #[test]
    fn test_empty_graphs() {
        assert_eq!(tree(0).unwrap().node_count(), 0);
        assert_eq!(grid(0).unwrap().node_count(), 0);
    }
}
