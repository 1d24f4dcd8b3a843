use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of a node inside a [`NodePool`]
///
/// Genes refer to nodes by this id, so genomes stay valid across every graph
/// built from pools with the same shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Category of a node, fixed for the node's lifetime
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Graph source: reads one scalar from the agent context per tick
    Sensor,
    /// Emits tanh of whatever it has accumulated so far
    Internal,
    /// Graph sink: fires a side effect with its accumulated sum
    Effector,
}

impl NodeKind {
    /// Whether nodes of this kind may appear as a gene source
    pub fn can_emit(self) -> bool {
        !matches!(self, NodeKind::Effector)
    }

    /// Whether nodes of this kind may appear as a gene target
    pub fn can_receive(self) -> bool {
        !matches!(self, NodeKind::Sensor)
    }
}

/// Reads a sensor value from the agent context
pub type SensorFn<C> = Arc<dyn Fn(&C) -> f32 + Send + Sync>;

/// Applies an effector's summed input to the agent context
pub type EffectorFn<C> = Arc<dyn Fn(&mut C, f32) + Send + Sync>;

enum Behavior<C> {
    Sensor(SensorFn<C>),
    Internal,
    Effector(EffectorFn<C>),
}

impl<C> Behavior<C> {
    fn kind(&self) -> NodeKind {
        match self {
            Behavior::Sensor(_) => NodeKind::Sensor,
            Behavior::Internal => NodeKind::Internal,
            Behavior::Effector(_) => NodeKind::Effector,
        }
    }
}

struct PoolNode<C> {
    name: String,
    behavior: Behavior<C>,
}

/// Fixed set of node identities shared by every genome of a population
///
/// `C` is the agent context handed to sensor reads and effector callbacks.
/// Graphs hold the pool behind an `Arc`, so the callbacks are never copied.
pub struct NodePool<C> {
    nodes: Vec<PoolNode<C>>,
}

impl<C> Default for NodePool<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for NodePool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.nodes
                    .iter()
                    .map(|n| (n.name.as_str(), n.behavior.kind())),
            )
            .finish()
    }
}

impl<C> NodePool<C> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, name: impl Into<String>, behavior: Behavior<C>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(PoolNode {
            name: name.into(),
            behavior,
        });
        id
    }

    /// Register a sensor with its reading function
    pub fn add_sensor<F>(&mut self, name: impl Into<String>, read: F) -> NodeId
    where
        F: Fn(&C) -> f32 + Send + Sync + 'static,
    {
        self.push(name, Behavior::Sensor(Arc::new(read)))
    }

    pub fn add_internal(&mut self, name: impl Into<String>) -> NodeId {
        self.push(name, Behavior::Internal)
    }

    /// Register an effector with its side-effect callback
    pub fn add_effector<F>(&mut self, name: impl Into<String>, effect: F) -> NodeId
    where
        F: Fn(&mut C, f32) + Send + Sync + 'static,
    {
        self.push(name, Behavior::Effector(Arc::new(effect)))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(id.index()).map(|n| n.behavior.kind())
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.index()).map(|n| n.name.as_str())
    }

    /// Look up a node id by its registered name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.name == name)
            .map(|i| NodeId(i as u32))
    }

    /// All ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(|i| NodeId(i as u32))
    }

    /// Ids allowed as a gene source (everything but effectors)
    pub fn emitters(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.nodes[id.index()].behavior.kind().can_emit())
            .collect()
    }

    /// Ids allowed as a gene target (everything but sensors)
    pub fn receivers(&self) -> Vec<NodeId> {
        self.ids()
            .filter(|&id| self.nodes[id.index()].behavior.kind().can_receive())
            .collect()
    }

    /// Invoke a sensor's reading function; `None` if `id` is not a sensor
    pub(crate) fn read_sensor(&self, id: NodeId, ctx: &C) -> Option<f32> {
        match &self.nodes.get(id.index())?.behavior {
            Behavior::Sensor(read) => Some(read(ctx)),
            _ => None,
        }
    }

    /// Invoke an effector's callback; returns `false` if `id` is not an effector
    pub(crate) fn fire_effector(&self, id: NodeId, ctx: &mut C, value: f32) -> bool {
        match self.nodes.get(id.index()).map(|n| &n.behavior) {
            Some(Behavior::Effector(effect)) => {
                effect(ctx, value);
                true
            }
            _ => false,
        }
    }
}

/// Per-tick input buffer of a node
///
/// Keyed by contributing source (graph arena index). Re-delivery from the same
/// source overwrites the previous value; insertion order is kept so sums are
/// reproducible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Accumulator {
    inputs: Vec<(usize, f32)>,
}

impl Accumulator {
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    pub fn deliver(&mut self, source: usize, value: f32) {
        match self.inputs.iter_mut().find(|(s, _)| *s == source) {
            Some(slot) => slot.1 = value,
            None => self.inputs.push((source, value)),
        }
    }

    /// Number of distinct sources heard from this tick
    pub fn distinct_sources(&self) -> usize {
        self.inputs.len()
    }

    pub fn sum(&self) -> f32 {
        self.inputs.iter().map(|&(_, v)| v).sum()
    }

    /// Ready once every expected incoming link has delivered at least once
    pub fn is_complete(&self, expected: usize) -> bool {
        self.inputs.len() == expected
    }

    /// Output of an internal node holding this accumulator
    pub fn activation(&self) -> f32 {
        libm::tanhf(self.sum())
    }
}
