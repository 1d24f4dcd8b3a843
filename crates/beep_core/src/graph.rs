use alloc::collections::{BTreeMap, BTreeSet};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::error::{BeepError, MalformedGenome};
use crate::genome::Genome;
use crate::node::{Accumulator, NodeId, NodeKind, NodePool};

/// One end of a directed, weighted link
///
/// `peer` is an index into the owning graph's node arena: the target for an
/// outgoing link, the source for an incoming one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub peer: usize,
    pub weight: f32,
}

#[derive(Clone, Debug)]
pub(crate) struct GraphNode {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) outgoing: Vec<Link>,
    pub(crate) incoming: Vec<Link>,
}

/// Transient per-tick state; the only part of a graph a tick mutates
#[derive(Clone, Debug, Default)]
pub(crate) struct TickState {
    pub(crate) accumulators: Vec<Accumulator>,
    pub(crate) sensor_values: Vec<Option<f32>>,
}

impl TickState {
    fn with_len(len: usize) -> Self {
        TickState {
            accumulators: alloc::vec![Accumulator::default(); len],
            sensor_values: alloc::vec![None; len],
        }
    }

    pub(crate) fn reset(&mut self) {
        for acc in &mut self.accumulators {
            acc.clear();
        }
        for value in &mut self.sensor_values {
            *value = None;
        }
    }
}

/// A genome wired against a shared node pool
///
/// Nodes live in an arena in first-appearance order of the genome; only nodes
/// referenced by at least one gene take part. Wiring is immutable after
/// [`GraphBuilder::build`]; evaluation only touches the per-tick state.
pub struct Graph<C> {
    pub(crate) pool: Arc<NodePool<C>>,
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) sensors: Vec<usize>,
    pub(crate) effectors: Vec<usize>,
    pub(crate) state: TickState,
}

impl<C> Clone for Graph<C> {
    fn clone(&self) -> Self {
        Graph {
            pool: Arc::clone(&self.pool),
            nodes: self.nodes.clone(),
            sensors: self.sensors.clone(),
            effectors: self.effectors.clone(),
            state: self.state.clone(),
        }
    }
}

impl<C> core::fmt::Debug for Graph<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.nodes)
            .field("sensors", &self.sensors)
            .field("effectors", &self.effectors)
            .finish()
    }
}

impl<C> Graph<C> {
    pub fn pool(&self) -> &Arc<NodePool<C>> {
        &self.pool
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|n| n.outgoing.len()).sum()
    }

    /// Pool ids of every participating node, in arena order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Sensor ids in seeding order
    pub fn sensor_ids(&self) -> Vec<NodeId> {
        self.sensors.iter().map(|&i| self.nodes[i].id).collect()
    }

    /// Effector ids in firing order
    pub fn effector_ids(&self) -> Vec<NodeId> {
        self.effectors.iter().map(|&i| self.nodes[i].id).collect()
    }

    pub(crate) fn slot(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    /// Outgoing links of a node as (target id, weight), in registration order
    pub fn outgoing(&self, id: NodeId) -> Vec<(NodeId, f32)> {
        self.slot(id)
            .map(|i| {
                self.nodes[i]
                    .outgoing
                    .iter()
                    .map(|l| (self.nodes[l.peer].id, l.weight))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of links a node waits on before it counts as ready
    pub fn expected_inputs(&self, id: NodeId) -> Option<usize> {
        self.slot(id).map(|i| self.nodes[i].incoming.len())
    }

    /// Accumulated sum of a node as left by the last tick (possibly partial)
    pub fn accumulated(&self, id: NodeId) -> Option<f32> {
        self.slot(id).map(|i| self.state.accumulators[i].sum())
    }

    pub(crate) fn is_ready(&self, slot: usize) -> bool {
        self.state.accumulators[slot].is_complete(self.nodes[slot].incoming.len())
    }

    pub(crate) fn all_effectors_ready(&self) -> bool {
        self.effectors.iter().all(|&e| self.is_ready(e))
    }
}

/// Turns genomes into wired graphs against one shared node pool
pub struct GraphBuilder<C> {
    pool: Arc<NodePool<C>>,
}

impl<C> Clone for GraphBuilder<C> {
    fn clone(&self) -> Self {
        GraphBuilder {
            pool: Arc::clone(&self.pool),
        }
    }
}

impl<C> GraphBuilder<C> {
    pub fn new(pool: Arc<NodePool<C>>) -> Self {
        GraphBuilder { pool }
    }

    pub fn pool(&self) -> &Arc<NodePool<C>> {
        &self.pool
    }

    /// Wire `genome` into a graph, enforcing the category and duplicate rules
    pub fn build(&self, genome: &Genome) -> Result<Graph<C>, BeepError> {
        let mut nodes: Vec<GraphNode> = Vec::new();
        let mut slots: BTreeMap<NodeId, usize> = BTreeMap::new();
        let mut wired: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();

        for (index, gene) in genome.iter().enumerate() {
            let source_kind = self.kind_of(index, gene.source)?;
            let target_kind = self.kind_of(index, gene.target)?;

            if !source_kind.can_emit() {
                return Err(MalformedGenome::EffectorAsSource {
                    gene: index,
                    node: gene.source,
                }
                .into());
            }
            if !target_kind.can_receive() {
                return Err(MalformedGenome::SensorAsTarget {
                    gene: index,
                    node: gene.target,
                }
                .into());
            }
            if !wired.insert(gene.endpoints()) {
                return Err(MalformedGenome::DuplicateLink {
                    gene: index,
                    source: gene.source,
                    target: gene.target,
                }
                .into());
            }

            let source = slot_for(&mut nodes, &mut slots, gene.source, source_kind);
            let target = slot_for(&mut nodes, &mut slots, gene.target, target_kind);

            nodes[source].outgoing.push(Link {
                peer: target,
                weight: gene.weight,
            });
            nodes[target].incoming.push(Link {
                peer: source,
                weight: gene.weight,
            });
        }

        let sensors = slots_of_kind(&nodes, NodeKind::Sensor);
        let effectors = slots_of_kind(&nodes, NodeKind::Effector);
        let state = TickState::with_len(nodes.len());

        Ok(Graph {
            pool: Arc::clone(&self.pool),
            nodes,
            sensors,
            effectors,
            state,
        })
    }

    fn kind_of(&self, gene: usize, node: NodeId) -> Result<NodeKind, MalformedGenome> {
        self.pool
            .kind(node)
            .ok_or(MalformedGenome::UnknownNode { gene, node })
    }
}

fn slot_for(
    nodes: &mut Vec<GraphNode>,
    slots: &mut BTreeMap<NodeId, usize>,
    id: NodeId,
    kind: NodeKind,
) -> usize {
    *slots.entry(id).or_insert_with(|| {
        nodes.push(GraphNode {
            id,
            kind,
            outgoing: Vec::new(),
            incoming: Vec::new(),
        });
        nodes.len() - 1
    })
}

fn slots_of_kind(nodes: &[GraphNode], kind: NodeKind) -> Vec<usize> {
    nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.kind == kind)
        .map(|(i, _)| i)
        .collect()
}
