use beep_core::{EngineConfig, MutationConfig};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Settings for a population run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Agents per generation
    pub population: usize,
    /// Genes in every freshly generated genome
    pub genes_per_genome: usize,
    /// Internal nodes in the shared pool
    pub internal_nodes: usize,
    /// Ticks each agent gets per generation
    pub steps_per_generation: usize,
    /// RNG seed; a random seed is drawn when absent
    pub seed: Option<u64>,
    pub engine: EngineConfig,
    pub mutation: MutationConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_size: 128,
            population: 100,
            genes_per_genome: 5,
            internal_nodes: 3,
            steps_per_generation: 20,
            seed: None,
            engine: EngineConfig::default(),
            mutation: MutationConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.grid_size == 0 {
            return Err(SimError::InvalidConfig("grid_size must be positive".into()));
        }
        if self.population == 0 {
            return Err(SimError::InvalidConfig("population must be positive".into()));
        }
        let cells = self.grid_size.saturating_mul(self.grid_size);
        if self.population > cells {
            return Err(SimError::InvalidConfig(format!(
                "population {} does not fit a {}x{} grid",
                self.population, self.grid_size, self.grid_size
            )));
        }
        if self.engine.max_steps_per_tick == 0 {
            return Err(SimError::InvalidConfig(
                "engine.max_steps_per_tick must be positive".into(),
            ));
        }
        if !self.mutation.is_valid() {
            return Err(SimError::InvalidConfig(
                "mutation rates must be within [0, 1] and jitter non-negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn overcrowded_grid_is_rejected() {
        let cfg = SimConfig {
            grid_size: 3,
            population: 10,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{"grid_size":16,"engine":{"max_steps_per_tick":50}}"#)
                .unwrap();
        assert_eq!(cfg.grid_size, 16);
        assert_eq!(cfg.population, 100);
        assert_eq!(cfg.engine.max_steps_per_tick, 50);
        assert_eq!(cfg.mutation, MutationConfig::default());
    }
}
