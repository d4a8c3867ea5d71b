//! Engine configuration for the driver.
//!
//! Sources, lowest priority first: built-in defaults, the TOML file, then
//! `GRAPH_STEPS_*` environment variables, then command-line flags.
//! A missing TOML file is not an error.

use std::path::Path;

use anyhow::Context;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use graph_steps_core::EngineConfig;
use serde::Serialize;

pub const ENV_PREFIX: &str = "GRAPH_STEPS_";

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heuristic_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_snapshots: Option<bool>,
}

pub fn figment(path: &Path, overrides: &Overrides) -> Figment {
    Figment::from(Serialized::defaults(EngineConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
        .merge(Serialized::defaults(overrides))
}

pub fn load(path: &Path, overrides: &Overrides) -> anyhow::Result<EngineConfig> {
    let config: EngineConfig = figment(path, overrides)
        .extract()
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
