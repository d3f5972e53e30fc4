//! Demo configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use irqhook_sim::MachineConfig;
use serde::Deserialize;

/// Contents of the `--config` file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Simulated machine.
    pub machine: MachineConfig,
    /// Scenario timing.
    pub run: RunConfig,
}

/// The `[run]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Frames the `isr` scenario runs its own handler for.
    pub frames: u64,
    /// Seconds between steps of the hook script.
    pub step_seconds: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            step_seconds: 10,
        }
    }
}

/// Reads `path`, or returns the defaults when no file is given.
pub fn load(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse(content: &str) -> Result<DemoConfig> {
    Ok(toml::from_str(content)?)
}
