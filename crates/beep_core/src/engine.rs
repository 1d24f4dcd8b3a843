use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::config::EngineConfig;
use crate::error::BeepError;
use crate::graph::Graph;
use crate::node::{NodeId, NodeKind};

/// Value handed to one effector at the end of a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectorOutput {
    pub node: NodeId,
    pub value: f32,
    /// Whether every incoming link delivered before firing
    pub complete: bool,
}

/// Outcome of one evaluation pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Worklist dequeues spent this tick
    pub steps: usize,
    /// Traversal stopped because every effector was ready (not because the queue drained)
    pub settled: bool,
    /// Fired effectors in firing order
    pub outputs: Vec<EffectorOutput>,
}

impl TickReport {
    pub fn output(&self, node: NodeId) -> Option<f32> {
        self.outputs.iter().find(|o| o.node == node).map(|o| o.value)
    }
}

/// Readiness-gated breadth-first evaluator
///
/// Stateless apart from its configuration; all per-tick state lives in the
/// graph, so one engine can drive any number of graphs.
#[derive(Debug, Clone, Default)]
pub struct PropagationEngine {
    config: EngineConfig,
}

impl PropagationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one tick: reset, seed sensors, propagate, fire effectors
    ///
    /// Traversal stops as soon as every effector is ready or the queue drains.
    /// Internal nodes forward whatever they hold so far; only delivery into an
    /// effector waits for the sender to be ready. Effectors always fire, with a
    /// partial sum if their inputs never completed.
    ///
    /// On error no effector fires; the partial accumulators stay inspectable
    /// through [`Graph::accumulated`] until the next tick.
    pub fn evaluate<C>(&self, graph: &mut Graph<C>, ctx: &mut C) -> Result<TickReport, BeepError> {
        graph.state.reset();
        self.seed(graph, ctx)?;

        let (steps, settled) = self.propagate(graph)?;

        let mut outputs = Vec::with_capacity(graph.effectors.len());
        for &slot in &graph.effectors {
            let node = graph.nodes[slot].id;
            let value = graph.state.accumulators[slot].sum();
            let complete = graph.is_ready(slot);
            graph.pool.fire_effector(node, ctx, value);
            outputs.push(EffectorOutput {
                node,
                value,
                complete,
            });
        }

        log::trace!(
            "tick finished: steps={} settled={} effectors={}",
            steps,
            settled,
            outputs.len()
        );

        Ok(TickReport {
            steps,
            settled,
            outputs,
        })
    }

    fn seed<C>(&self, graph: &mut Graph<C>, ctx: &C) -> Result<(), BeepError> {
        for &slot in &graph.sensors {
            let node = graph.nodes[slot].id;
            let value = graph
                .pool
                .read_sensor(node, ctx)
                .ok_or(BeepError::SensorNotReady { node })?;
            graph.state.sensor_values[slot] = Some(value);
        }
        Ok(())
    }

    /// Output a node emits right now
    fn output<C>(graph: &Graph<C>, slot: usize) -> Result<f32, BeepError> {
        let node = &graph.nodes[slot];
        match node.kind {
            NodeKind::Sensor => graph.state.sensor_values[slot]
                .ok_or(BeepError::SensorNotReady { node: node.id }),
            _ => Ok(graph.state.accumulators[slot].activation()),
        }
    }

    fn propagate<C>(&self, graph: &mut Graph<C>) -> Result<(usize, bool), BeepError> {
        let max_steps = self.config.max_steps_per_tick;
        let mut queue: VecDeque<usize> = graph.sensors.iter().copied().collect();
        let mut steps = 0usize;

        loop {
            if graph.all_effectors_ready() {
                return Ok((steps, true));
            }
            if queue.is_empty() {
                return Ok((steps, false));
            }
            if steps >= max_steps {
                log::debug!(
                    "traversal budget of {} steps exhausted with {} queued",
                    max_steps,
                    queue.len()
                );
                return Err(BeepError::TraversalBudgetExceeded {
                    max_steps,
                    queued: queue.len(),
                });
            }

            let Some(current) = queue.pop_front() else {
                return Ok((steps, false));
            };
            steps += 1;

            let current_kind = graph.nodes[current].kind;
            for link_index in 0..graph.nodes[current].outgoing.len() {
                let link = graph.nodes[current].outgoing[link_index];
                let target = link.peer;
                let target_kind = graph.nodes[target].kind;

                match (current_kind, target_kind) {
                    (NodeKind::Sensor, NodeKind::Internal | NodeKind::Effector) => {
                        let value = Self::output(graph, current)? * link.weight;
                        graph.state.accumulators[target].deliver(current, value);
                        if target_kind != NodeKind::Effector {
                            queue.push_back(target);
                        }
                    }
                    (NodeKind::Internal, NodeKind::Effector) => {
                        if graph.is_ready(current) {
                            let value = Self::output(graph, current)? * link.weight;
                            graph.state.accumulators[target].deliver(current, value);
                        } else {
                            queue.push_back(current);
                        }
                    }
                    (NodeKind::Internal, NodeKind::Internal) => {
                        let value = Self::output(graph, current)? * link.weight;
                        graph.state.accumulators[target].deliver(current, value);
                        queue.push_back(target);
                    }
                    _ => {
                        return Err(BeepError::InvalidTraversal {
                            source: graph.nodes[current].id,
                            source_kind: current_kind,
                            target: graph.nodes[target].id,
                            target_kind,
                        })
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Gene, Genome};
    use crate::graph::{GraphBuilder, Link};
    use crate::node::NodePool;
    use alloc::sync::Arc;

    #[test]
    fn sensor_read_before_seeding_is_reported() {
        let mut pool: NodePool<()> = NodePool::new();
        let s = pool.add_sensor("s", |_| 1.0);
        let e = pool.add_effector("e", |_, _| {});
        let graph = GraphBuilder::new(Arc::new(pool))
            .build(&Genome::new(vec![Gene::new(s, e, 1.0)]))
            .unwrap();

        assert_eq!(
            PropagationEngine::output(&graph, 0),
            Err(BeepError::SensorNotReady { node: s })
        );
    }

    #[test]
    fn corrupted_wiring_is_an_invalid_traversal() {
        let mut pool: NodePool<()> = NodePool::new();
        let s = pool.add_sensor("s", |_| 1.0);
        let n = pool.add_internal("n");
        let e = pool.add_effector("e", |_, _| {});
        let mut graph = GraphBuilder::new(Arc::new(pool))
            .build(&Genome::new(vec![Gene::new(s, n, 1.0), Gene::new(n, e, 1.0)]))
            .unwrap();

        // Hand-wire an internal -> sensor link the builder would never produce
        graph.nodes[1].outgoing.insert(0, Link { peer: 0, weight: 1.0 });

        let err = PropagationEngine::default()
            .evaluate(&mut graph, &mut ())
            .unwrap_err();
        assert_eq!(
            err,
            BeepError::InvalidTraversal {
                source: n,
                source_kind: NodeKind::Internal,
                target: s,
                target_kind: NodeKind::Sensor,
            }
        );
    }

    #[test]
    fn empty_graph_settles_immediately() {
        let pool: NodePool<()> = NodePool::new();
        let mut graph = GraphBuilder::new(Arc::new(pool))
            .build(&Genome::default())
            .unwrap();

        let report = PropagationEngine::default()
            .evaluate(&mut graph, &mut ())
            .unwrap();
        assert_eq!(report.steps, 0);
        assert!(report.settled);
        assert!(report.outputs.is_empty());
    }
}
