use alloc::string::String;
use core::fmt;

use crate::node::{NodeId, NodeKind};

/// Structural problems found while wiring a genome into a graph
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedGenome {
    /// Gene references a node id the pool does not contain
    UnknownNode { gene: usize, node: NodeId },
    /// Effectors are sinks and may never emit
    EffectorAsSource { gene: usize, node: NodeId },
    /// Sensors are sources and may never receive
    SensorAsTarget { gene: usize, node: NodeId },
    /// A second gene for an already wired (source, target) pair
    DuplicateLink {
        gene: usize,
        source: NodeId,
        target: NodeId,
    },
}

impl fmt::Display for MalformedGenome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedGenome::UnknownNode { gene, node } => {
                write!(f, "gene {} references unknown node {}", gene, node)
            }
            MalformedGenome::EffectorAsSource { gene, node } => {
                write!(f, "gene {} uses effector {} as source", gene, node)
            }
            MalformedGenome::SensorAsTarget { gene, node } => {
                write!(f, "gene {} uses sensor {} as target", gene, node)
            }
            MalformedGenome::DuplicateLink {
                gene,
                source,
                target,
            } => write!(
                f,
                "gene {} duplicates link {} -> {}",
                gene, source, target
            ),
        }
    }
}

/// Errors raised while building or evaluating a Beep graph
#[derive(Debug, Clone, PartialEq)]
pub enum BeepError {
    /// Build-time structural violation; the genome is not viable
    MalformedGenome(MalformedGenome),
    /// Traversal met a category pairing the builder should have rejected
    InvalidTraversal {
        source: NodeId,
        source_kind: NodeKind,
        target: NodeId,
        target_kind: NodeKind,
    },
    /// Effectors never became ready within the configured step budget
    TraversalBudgetExceeded { max_steps: usize, queued: usize },
    /// Sensor output was requested before the sensor was seeded this tick
    SensorNotReady { node: NodeId },
    /// Genome JSON could not be decoded or encoded
    GenomeFormat(String),
    /// Mutation rates outside [0, 1] or a negative or non-finite jitter
    InvalidMutationConfig,
}

impl BeepError {
    /// Budget errors are a per-tick safety net; everything else is structural or a bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BeepError::TraversalBudgetExceeded { .. })
    }
}

impl From<MalformedGenome> for BeepError {
    fn from(err: MalformedGenome) -> Self {
        BeepError::MalformedGenome(err)
    }
}

impl fmt::Display for BeepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeepError::MalformedGenome(inner) => write!(f, "Malformed genome: {}", inner),
            BeepError::InvalidTraversal {
                source,
                source_kind,
                target,
                target_kind,
            } => write!(
                f,
                "Invalid traversal from {:?} {} to {:?} {}",
                source_kind, source, target_kind, target
            ),
            BeepError::TraversalBudgetExceeded { max_steps, queued } => write!(
                f,
                "Traversal budget of {} steps exceeded with {} nodes still queued",
                max_steps, queued
            ),
            BeepError::SensorNotReady { node } => {
                write!(f, "Sensor {} read before it was seeded this tick", node)
            }
            BeepError::GenomeFormat(msg) => write!(f, "Genome format error: {}", msg),
            BeepError::InvalidMutationConfig => write!(
                f,
                "Mutation rates must be within [0, 1] and jitter finite and non-negative"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MalformedGenome {}
#[cfg(feature = "std")]
impl std::error::Error for BeepError {}
