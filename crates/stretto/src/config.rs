use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use stretto_core::params::InputParameter;

/// Highest axis count the command line front-end instantiates.
pub const MAX_AXES: usize = 8;

/// A motion job: cycle time plus one block per axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Control cycle period in seconds.
    #[serde(default = "default_delta_time")]
    pub delta_time: f64,

    /// Optional floor on the synchronized duration in seconds.
    #[serde(default)]
    pub minimum_duration: Option<f64>,

    /// Per-axis states and limits.
    pub axes: Vec<AxisConfig>,
}

/// One axis' boundary states and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisConfig {
    #[serde(default)]
    pub current_position: f64,
    #[serde(default)]
    pub current_velocity: f64,
    #[serde(default)]
    pub current_acceleration: f64,

    pub target_position: f64,
    #[serde(default)]
    pub target_velocity: f64,
    #[serde(default)]
    pub target_acceleration: f64,

    pub max_velocity: f64,
    pub max_acceleration: f64,
    pub max_jerk: f64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_delta_time() -> f64 {
    0.001
}

fn default_enabled() -> bool {
    true
}

impl JobConfig {
    /// Load a job from a file, auto-detecting TOML or JSON format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read job file {}", path.display()))?;

        let extension = path.extension().and_then(|s| s.to_str());
        match extension {
            Some("toml") => Self::from_toml(&content),
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content).or_else(|_| Self::from_json(&content)),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse job as TOML")
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("failed to parse job as JSON")
    }

    /// Structural validation; kinematic limits are validated by the
    /// generator itself.
    pub fn validate(&self) -> Result<()> {
        if self.delta_time <= 0.0 {
            anyhow::bail!("delta_time must be positive");
        }
        if self.axes.is_empty() {
            anyhow::bail!("job needs at least one axis");
        }
        if self.axes.len() > MAX_AXES {
            anyhow::bail!("job has {} axes, at most {MAX_AXES} supported", self.axes.len());
        }
        if let Some(floor) = self.minimum_duration {
            if floor < 0.0 {
                anyhow::bail!("minimum_duration must not be negative");
            }
        }
        Ok(())
    }

    /// Build the generator input. `DOFS` must equal the axis count.
    pub fn input<const DOFS: usize>(&self) -> InputParameter<DOFS> {
        assert_eq!(self.axes.len(), DOFS);
        let mut input = InputParameter::<DOFS>::default();
        for (dof, axis) in self.axes.iter().enumerate() {
            input.current_position[dof] = axis.current_position;
            input.current_velocity[dof] = axis.current_velocity;
            input.current_acceleration[dof] = axis.current_acceleration;
            input.target_position[dof] = axis.target_position;
            input.target_velocity[dof] = axis.target_velocity;
            input.target_acceleration[dof] = axis.target_acceleration;
            input.max_velocity[dof] = axis.max_velocity;
            input.max_acceleration[dof] = axis.max_acceleration;
            input.max_jerk[dof] = axis.max_jerk;
            input.enabled[dof] = axis.enabled;
        }
        input.minimum_duration = self.minimum_duration;
        input
    }
}
