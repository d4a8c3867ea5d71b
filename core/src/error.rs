//! Error types for graph-steps-core.

use thiserror::Error;

use crate::dispatch::Algorithm;
use crate::graph::{EdgeId, NodeId};

/// Errors raised before an algorithm runs.
///
/// Unreachable targets and negative cycles are reported through the
/// step log and [`crate::AlgorithmResult`], never as errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Algorithm name is not one of the supported five.
    #[error("unknown algorithm '{0}' (expected bfs, dfs, dijkstra, bellman-ford or astar)")]
    UnknownAlgorithm(String),

    /// The algorithm needs an end node and none was given.
    #[error("{0} requires an end node")]
    MissingEndNode(Algorithm),

    /// A referenced node is not in the graph.
    #[error("node '{0}' not found in graph")]
    NodeNotFound(NodeId),

    /// Two nodes share an id.
    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    /// An edge references a node that does not exist.
    #[error("edge '{edge}' references missing node '{node}'")]
    DanglingEdge { edge: EdgeId, node: NodeId },

    /// An edge connects a node to itself.
    #[error("edge '{0}' is a self-loop")]
    SelfLoop(EdgeId),

    /// An edge id is reused, or an edge repeats an existing connection.
    #[error("duplicate edge '{0}'")]
    DuplicateEdge(EdgeId),

    /// An edge weight is NaN or infinite.
    #[error("edge '{0}' has a non-finite weight")]
    InvalidWeight(EdgeId),

    /// Engine configuration is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingEndNode(Algorithm::AStar);
        assert_eq!(err.to_string(), "astar requires an end node");

        let err = Error::DanglingEdge {
            edge: "e1".into(),
            node: "ghost".into(),
        };
        assert_eq!(err.to_string(), "edge 'e1' references missing node 'ghost'");
    }
}
