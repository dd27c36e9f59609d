use serde::{Deserialize, Serialize};
use simple_error::SimpleError;

use crate::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub tick_ms: f64,
    pub duration_ms: f64,
    pub seed: u64,
}

impl SimConfig {
    pub fn num_ticks(&self) -> usize {
        (self.duration_ms / self.tick_ms) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub template: Template,
    pub sim: SimConfig,
    pub analysis_delay_ms: f64,
    pub clamp_node_id: Option<String>,
    pub clamp_value: u8,
}

impl SimulationParams {
    /// Analysis lag in ticks. Floors to the tick grid, never below one tick.
    pub fn analysis_delay_steps(&self) -> usize {
        ((self.analysis_delay_ms / self.sim.tick_ms) as usize).max(1)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1.0,
            duration_ms: 12000.0,
            seed: 42,
        }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            template: Template::Maier3,
            sim: SimConfig::default(),
            analysis_delay_ms: 8.0,
            clamp_node_id: Some("N0".to_string()),
            clamp_value: 1,
        }
    }
}

pub fn validate_simulation_params(params: &SimulationParams) -> Result<(), SimpleError> {
    validate_sim_config(&params.sim)?;

    if params.analysis_delay_ms < 0.0 {
        return Err(SimpleError::new(
            "analysis_delay_ms must not be negative",
        ));
    }

    if params.clamp_value > 1 {
        return Err(SimpleError::new("clamp_value must be 0 or 1"));
    }

    Ok(())
}

pub fn validate_sim_config(cfg: &SimConfig) -> Result<(), SimpleError> {
    if !(cfg.tick_ms > 0.0) {
        return Err(SimpleError::new("tick_ms must be strictly positive"));
    }

    if cfg.duration_ms < cfg.tick_ms {
        return Err(SimpleError::new(
            "duration_ms must cover at least one tick",
        ));
    }

    Ok(())
}
