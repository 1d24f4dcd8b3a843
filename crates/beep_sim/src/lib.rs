//! Simulation layer around the Beep evaluation engine
//!
//! Provides the grid world agents live in, the standard sensor/effector pool
//! wired against it, and the generation loop (evaluate, select, mutate).
pub mod config;
pub mod error;
pub mod nodes;
pub mod population;
pub mod stats;
pub mod world;

pub use config::SimConfig;
pub use error::SimError;
pub use nodes::{standard_pool, StandardNodes};
pub use population::{Agent, Simulation};
pub use stats::GenerationStats;
pub use world::{Position, WorldState};
