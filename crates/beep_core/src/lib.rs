//! Beep graph-evaluation engine
//!
//! Each Beep agent is driven by a small weighted directed graph whose wiring is
//! encoded by a [`Genome`]. This crate turns a genome plus a shared
//! [`NodePool`] into a wired [`Graph`] and evaluates it once per simulation tick:
//!
//! 1. Reset per-tick accumulators and cached sensor readings
//! 2. Seed every sensor from its reading function
//! 3. Breadth-first propagate through internal nodes, gating delivery into
//!    effectors on the sender being ready
//! 4. Fire every effector exactly once with its accumulated sum
//!
//! Design constraints:
//! - No std: all types use core::* and alloc (enable `std` for `std::error::Error`)
//! - Nodes are stable arena indices; no shared mutable node objects
//! - Randomness is always an explicit `Rng` parameter
#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate alloc;

pub mod config;
pub mod engine;
pub mod error;
pub mod genome;
pub mod graph;
pub mod mutation;
pub mod node;

pub use config::{EngineConfig, MutationConfig};
pub use engine::{EffectorOutput, PropagationEngine, TickReport};
pub use error::{BeepError, MalformedGenome};
pub use genome::{Gene, Genome};
pub use graph::{Graph, GraphBuilder, Link};
pub use mutation::GenomeMutator;
pub use node::{Accumulator, NodeId, NodeKind, NodePool};
