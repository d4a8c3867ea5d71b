use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Euclidean canvas distance is divided by this to estimate remaining cost
/// in A*. It only keeps A* optimal when edge weights are at least
/// `distance / scale` for every edge; nothing enforces that.
pub const DEFAULT_HEURISTIC_SCALE: f64 = 50.0;

/// Engine tuning knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Divisor applied to the A* Euclidean heuristic.
    pub heuristic_scale: f64,
    /// Deep-copy distances, visited set and frontier into every step.
    /// Memory grows as O(steps × nodes); turn off for large graphs.
    pub record_snapshots: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heuristic_scale: DEFAULT_HEURISTIC_SCALE,
            record_snapshots: true,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_heuristic_scale(mut self, scale: f64) -> Self {
        self.heuristic_scale = scale;
        self
    }

    #[must_use]
    pub fn with_snapshots(mut self, enabled: bool) -> Self {
        self.record_snapshots = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.heuristic_scale.is_finite() || self.heuristic_scale <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "heuristic_scale must be a positive finite number, got {}",
                self.heuristic_scale
            )));
        }
        Ok(())
    }
}
