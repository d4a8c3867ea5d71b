//! Step log shared by every algorithm.
//!
//! Each state change an algorithm makes is paired with exactly one
//! [`AlgorithmStep`], appended in the order the change happened. Snapshot
//! fields are deep copies taken when the step is built, so later changes to
//! the live working sets never reach steps already recorded.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Best-known distance per node, in graph node order.
pub type DistanceMap = IndexMap<NodeId, f64>;

/// Visited nodes in the order they were visited.
pub type VisitedSet = IndexSet<NodeId>;

/// What a step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    /// A node was taken off the frontier and processed.
    Visit,
    /// An edge out of the current node was considered.
    Explore,
    /// A node's best-known distance improved.
    Relax,
    /// One edge of the final path, emitted while the path is laid out.
    Path,
    /// Terminal step.
    Complete,
    /// A back edge (DFS) or a still-relaxable edge (Bellman-Ford).
    CycleDetected,
}

/// One entry of an execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmStep {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<String>,
    pub message: String,
    #[serde(default, with = "unreached_as_null", skip_serializing_if = "Option::is_none")]
    pub distances: Option<DistanceMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visited: Option<VisitedSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<Vec<NodeId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<Vec<NodeId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_path: Option<Vec<NodeId>>,
}

impl AlgorithmStep {
    fn new(kind: StepKind, message: String) -> Self {
        Self {
            kind,
            node_id: None,
            edge_id: None,
            message,
            distances: None,
            visited: None,
            queue: None,
            stack: None,
            current_path: None,
        }
    }
}

/// Everything one algorithm run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmResult {
    pub steps: Vec<AlgorithmStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortest_path: Option<Vec<NodeId>>,
    #[serde(default, with = "unreached_as_null", skip_serializing_if = "Option::is_none")]
    pub distances: Option<DistanceMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_cycle: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_negative_cycle: Option<bool>,
}

impl AlgorithmResult {
    /// The terminal step, if any steps were recorded.
    pub fn final_step(&self) -> Option<&AlgorithmStep> {
        self.steps.last()
    }

    /// Number of steps of the given kind.
    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }

    /// Distance recorded for `node`, if distances were computed.
    pub fn distance(&self, node: &str) -> Option<f64> {
        self.distances.as_ref().and_then(|d| d.get(node).copied())
    }
}

/// Append-only step log for a single run.
#[derive(Debug)]
pub struct StepRecorder {
    steps: Vec<AlgorithmStep>,
    snapshots: bool,
}

impl StepRecorder {
    /// With `snapshots` off, the `distances`, `visited`, `queue` and
    /// `stack` fields are left empty. `currentPath` is always kept.
    pub fn new(snapshots: bool) -> Self {
        Self {
            steps: Vec::new(),
            snapshots,
        }
    }

    /// Start building a step. Nothing is appended until
    /// [`StepBuilder::record`] is called.
    pub fn step(&mut self, kind: StepKind, message: impl Into<String>) -> StepBuilder<'_> {
        StepBuilder {
            step: AlgorithmStep::new(kind, message.into()),
            recorder: self,
        }
    }

    pub fn steps(&self) -> &[AlgorithmStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn into_steps(self) -> Vec<AlgorithmStep> {
        self.steps
    }
}

/// A step under construction, borrowed from its recorder.
#[must_use = "a step is only appended when record() is called"]
pub struct StepBuilder<'r> {
    recorder: &'r mut StepRecorder,
    step: AlgorithmStep,
}

impl StepBuilder<'_> {
    pub fn node(mut self, id: &str) -> Self {
        self.step.node_id = Some(id.to_string());
        self
    }

    pub fn edge(mut self, id: &str) -> Self {
        self.step.edge_id = Some(id.to_string());
        self
    }

    pub fn distances(mut self, distances: &DistanceMap) -> Self {
        if self.recorder.snapshots {
            self.step.distances = Some(distances.clone());
        }
        self
    }

    pub fn visited(mut self, visited: &VisitedSet) -> Self {
        if self.recorder.snapshots {
            self.step.visited = Some(visited.clone());
        }
        self
    }

    /// Frontier snapshot in pop order. The iterator is only consumed when
    /// snapshots are on.
    pub fn queue<I>(mut self, frontier: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.recorder.snapshots {
            self.step.queue = Some(collect_ids(frontier));
        }
        self
    }

    /// Recursion stack snapshot, bottom first.
    pub fn stack<I>(mut self, stack: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.recorder.snapshots {
            self.step.stack = Some(collect_ids(stack));
        }
        self
    }

    pub fn path(mut self, path: &[NodeId]) -> Self {
        self.step.current_path = Some(path.to_vec());
        self
    }

    pub fn record(self) {
        self.recorder.steps.push(self.step);
    }
}

fn collect_ids<I>(ids: I) -> Vec<NodeId>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    ids.into_iter().map(|id| id.as_ref().to_string()).collect()
}

/// Render a distance for step messages; unreachable prints as ∞.
pub(crate) fn fmt_distance(d: f64) -> String {
    if d.is_infinite() && d > 0.0 {
        "∞".to_string()
    } else {
        format!("{d}")
    }
}

/// Distance maps on the wire: an unreached node's ∞ is written as `null`
/// and read back from `null`, since JSON has no infinity.
mod unreached_as_null {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::DistanceMap;
    use crate::graph::NodeId;

    pub fn serialize<S: Serializer>(
        distances: &Option<DistanceMap>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let wire: Option<IndexMap<&NodeId, Option<f64>>> = distances.as_ref().map(|map| {
            map.iter()
                .map(|(id, &d)| (id, (d != f64::INFINITY).then_some(d)))
                .collect()
        });
        wire.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DistanceMap>, D::Error> {
        let wire = Option::<IndexMap<NodeId, Option<f64>>>::deserialize(deserializer)?;
        Ok(wire.map(|map| {
            map.into_iter()
                .map(|(id, d)| (id, d.unwrap_or(f64::INFINITY)))
                .collect()
        }))
    }
}
