use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::Args;

/// Propagation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum worklist dequeues per tick before the tick is aborted
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 10_000))]
    pub max_steps_per_tick: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps_per_tick: 10_000,
        }
    }
}

/// Per-gene mutation probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
#[serde(default)]
pub struct MutationConfig {
    /// Probability of perturbing a gene's weight
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0.1))]
    pub weight_rate: f64,

    /// Probability of resampling a gene's source node
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0.1))]
    pub source_rate: f64,

    /// Probability of resampling a gene's target node
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0.1))]
    pub target_rate: f64,

    /// Weight perturbation is uniform in [-jitter, +jitter)
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0.5))]
    pub weight_jitter: f32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            weight_rate: 0.1,
            source_rate: 0.1,
            target_rate: 0.1,
            weight_jitter: 0.5,
        }
    }
}

impl MutationConfig {
    /// Rates must be probabilities and jitter must be finite and non-negative
    pub fn is_valid(&self) -> bool {
        let rate_ok = |r: f64| (0.0..=1.0).contains(&r);
        rate_ok(self.weight_rate)
            && rate_ok(self.source_rate)
            && rate_ok(self.target_rate)
            && self.weight_jitter.is_finite()
            && self.weight_jitter >= 0.0
    }
}
