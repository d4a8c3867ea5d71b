//! Algorithm Dispatcher: one entry point for all five algorithms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::shortest_path::{astar, bellman_ford, dijkstra};
use crate::step::AlgorithmResult;
use crate::traversal::{bfs, dfs};

/// The supported algorithms, keyed by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Bfs,
    Dfs,
    Dijkstra,
    BellmanFord,
    #[serde(rename = "astar")]
    AStar,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Bfs,
        Algorithm::Dfs,
        Algorithm::Dijkstra,
        Algorithm::BellmanFord,
        Algorithm::AStar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::BellmanFord => "bellman-ford",
            Algorithm::AStar => "astar",
        }
    }

    /// Whether a run is rejected without an end node.
    pub fn requires_end(self) -> bool {
        matches!(self, Algorithm::AStar)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::UnknownAlgorithm(s.to_string()))
    }
}

/// Runs algorithms under one configuration.
///
/// Holds no state between runs; every call builds its own working sets and
/// only reads the graph.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate the invocation, then run `algorithm` to completion.
    ///
    /// Checks happen in this order: end node present when required, graph
    /// well-formed, start exists, end exists. Nothing is recorded when a
    /// check fails.
    pub fn run(
        &self,
        algorithm: Algorithm,
        graph: &Graph,
        start: &str,
        end: Option<&str>,
    ) -> Result<AlgorithmResult> {
        if algorithm.requires_end() && end.is_none() {
            return Err(Error::MissingEndNode(algorithm));
        }
        graph.validate()?;
        if !graph.contains_node(start) {
            return Err(Error::NodeNotFound(start.to_string()));
        }
        if let Some(end) = end {
            if !graph.contains_node(end) {
                return Err(Error::NodeNotFound(end.to_string()));
            }
        }

        tracing::debug!(%algorithm, start, ?end, nodes = graph.node_count(), "running algorithm");

        let result = match algorithm {
            Algorithm::Bfs => bfs(graph, start, end, &self.config),
            Algorithm::Dfs => dfs(graph, start, end, &self.config),
            Algorithm::Dijkstra => dijkstra(graph, start, end, &self.config),
            Algorithm::BellmanFord => bellman_ford(graph, start, end, &self.config),
            Algorithm::AStar => {
                let Some(end) = end else {
                    return Err(Error::MissingEndNode(algorithm));
                };
                astar(graph, start, end, &self.config)
            }
        };

        tracing::debug!(
            %algorithm,
            steps = result.steps.len(),
            path_len = result.shortest_path.as_ref().map_or(0, Vec::len),
            "algorithm finished"
        );
        Ok(result)
    }

    /// Like [`Engine::run`], keyed by algorithm name.
    pub fn run_named(
        &self,
        name: &str,
        graph: &Graph,
        start: &str,
        end: Option<&str>,
    ) -> Result<AlgorithmResult> {
        let algorithm: Algorithm = name.parse()?;
        self.run(algorithm, graph, start, end)
    }
}

/// Run the algorithm called `name` with the default configuration.
pub fn run_algorithm(
    name: &str,
    graph: &Graph,
    start: &str,
    end: Option<&str>,
) -> Result<AlgorithmResult> {
    Engine::default().run_named(name, graph, start, end)
}
