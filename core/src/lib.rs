//! graph-steps-core: step-recording graph algorithm engine.
//!
//! Runs BFS, DFS (with cycle detection), Dijkstra, Bellman-Ford and A*
//! over a small in-memory graph and returns the full, ordered list of
//! steps each run took, ready to be replayed by a front end.
//! The crate performs no I/O and keeps no state between runs.

mod config;
mod dispatch;
mod error;
mod frontier;
mod graph;
mod shortest_path;
mod step;
mod traversal;

pub use config::{EngineConfig, DEFAULT_HEURISTIC_SCALE};
pub use dispatch::{run_algorithm, Algorithm, Engine};
pub use error::{Error, Result};
pub use frontier::MinQueue;
pub use graph::{
    Adjacency, Edge, EdgeId, Graph, Neighbor, Node, NodeId, NodeUpdate, WeightMatrix,
};
pub use shortest_path::{astar, bellman_ford, dijkstra};
pub use step::{
    AlgorithmResult, AlgorithmStep, DistanceMap, StepBuilder, StepKind, StepRecorder, VisitedSet,
};
pub use traversal::{bfs, dfs};
