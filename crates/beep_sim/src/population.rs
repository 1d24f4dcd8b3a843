use std::sync::Arc;

use beep_core::{Genome, GenomeMutator, Graph, GraphBuilder, PropagationEngine};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::nodes::{standard_pool, StandardNodes};
use crate::stats::GenerationStats;
use crate::world::WorldState;

/// One Beep: its genome and, if the genome wired cleanly, its graph
#[derive(Debug, Clone)]
pub struct Agent {
    genome: Genome,
    graph: Option<Graph<WorldState>>,
    viable: bool,
}

impl Agent {
    fn new(builder: &GraphBuilder<WorldState>, genome: Genome) -> Self {
        match builder.build(&genome) {
            Ok(graph) => Agent {
                genome,
                graph: Some(graph),
                viable: true,
            },
            Err(e) => {
                warn!(error = %e, "genome failed to build, agent is not viable");
                Agent {
                    genome,
                    graph: None,
                    viable: false,
                }
            }
        }
    }

    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn graph(&self) -> Option<&Graph<WorldState>> {
        self.graph.as_ref()
    }

    /// False once the genome failed to build or a tick exhausted its budget
    pub fn is_viable(&self) -> bool {
        self.viable
    }
}

/// A population of Beeps on one grid, advanced generation by generation
///
/// Agents are evaluated sequentially in index order because effectors move
/// agents on the shared grid; with a fixed seed a run is fully reproducible.
pub struct Simulation {
    config: SimConfig,
    seed: u64,
    nodes: StandardNodes,
    builder: GraphBuilder<WorldState>,
    engine: PropagationEngine,
    mutator: GenomeMutator,
    agents: Vec<Agent>,
    world: WorldState,
    rng: ChaCha8Rng,
    generation: u64,
}

impl Simulation {
    /// Random initial population as described by `config`
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        Self::build(config, None)
    }

    /// Start from explicit genomes; the population size follows `genomes.len()`
    pub fn from_genomes(mut config: SimConfig, genomes: Vec<Genome>) -> Result<Self, SimError> {
        config.population = genomes.len();
        Self::build(config, Some(genomes))
    }

    fn build(config: SimConfig, genomes: Option<Vec<Genome>>) -> Result<Self, SimError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let (pool, nodes) = standard_pool(config.internal_nodes);
        let pool = Arc::new(pool);
        let mutator = GenomeMutator::new(&*pool, config.mutation.clone())?;
        let builder = GraphBuilder::new(Arc::clone(&pool));
        let engine = PropagationEngine::new(config.engine.clone());

        let genomes = match genomes {
            Some(genomes) => genomes,
            None => (0..config.population)
                .map(|_| mutator.random_genome(&mut rng, config.genes_per_genome))
                .collect(),
        };
        let agents: Vec<Agent> = genomes
            .into_iter()
            .map(|g| Agent::new(&builder, g))
            .collect();

        let mut world = WorldState::new(config.grid_size, agents.len());
        world.scatter(&mut rng);

        info!(
            seed,
            population = agents.len(),
            grid_size = config.grid_size,
            pool_size = pool.len(),
            "Simulation initialised"
        );

        Ok(Self {
            config,
            seed,
            nodes,
            builder,
            engine,
            mutator,
            agents,
            world,
            rng,
            generation: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn nodes(&self) -> &StandardNodes {
        &self.nodes
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Evaluate every viable agent `steps` times; returns the traversal steps spent
    ///
    /// A budget failure makes that agent non-viable for the rest of the
    /// generation; any other engine error aborts the run.
    pub fn run_steps(&mut self, steps: usize) -> Result<u64, SimError> {
        let mut traversal_steps = 0u64;

        for _ in 0..steps {
            for (index, agent) in self.agents.iter_mut().enumerate() {
                if !agent.viable {
                    continue;
                }
                let Some(graph) = agent.graph.as_mut() else {
                    continue;
                };

                self.world.set_current(index);
                match self.engine.evaluate(graph, &mut self.world) {
                    Ok(report) => traversal_steps += report.steps as u64,
                    Err(e) if e.is_recoverable() => {
                        warn!(agent = index, error = %e, "tick failed, agent marked non-viable");
                        agent.viable = false;
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }
        Ok(traversal_steps)
    }

    /// Indices of viable agents east of the grid's midline
    pub fn survivors(&self) -> Vec<usize> {
        let midline = self.config.grid_size / 2;
        self.agents
            .iter()
            .enumerate()
            .filter(|(i, a)| {
                a.viable && self.world.position(*i).is_some_and(|p| p.x > midline)
            })
            .map(|(i, _)| i)
            .collect()
    }

    fn summarize(&self, traversal_steps: u64) -> GenerationStats {
        let population = self.agents.len();
        let size = self.world.size() as f32;
        let x_sum: f32 = (0..population)
            .filter_map(|i| self.world.position(i))
            .map(|p| p.x as f32 / size)
            .sum();

        GenerationStats {
            generation: self.generation,
            population,
            survivors: self.survivors().len(),
            non_viable: self.agents.iter().filter(|a| !a.viable).count(),
            mean_x: if population == 0 {
                0.0
            } else {
                x_sum / population as f32
            },
            traversal_steps,
        }
    }

    /// Replace the population with mutated offspring of the survivors
    fn next_generation(&mut self) {
        let survivors = self.survivors();
        let genomes: Vec<Genome> = if survivors.is_empty() {
            warn!(
                generation = self.generation,
                "No survivors, reseeding population"
            );
            (0..self.agents.len())
                .map(|_| {
                    self.mutator
                        .random_genome(&mut self.rng, self.config.genes_per_genome)
                })
                .collect()
        } else {
            (0..self.agents.len())
                .map(|_| {
                    let parent = survivors[self.rng.gen_range(0..survivors.len())];
                    self.mutator
                        .mutate(&self.agents[parent].genome, &mut self.rng)
                })
                .collect()
        };

        self.agents = genomes
            .into_iter()
            .map(|g| Agent::new(&self.builder, g))
            .collect();
        self.world.scatter(&mut self.rng);
        self.generation += 1;
        debug!(generation = self.generation, "Next generation placed");
    }

    /// Run one full generation: ticks, statistics, then selection and mutation
    pub fn run_generation(&mut self) -> Result<GenerationStats, SimError> {
        let traversal_steps = self.run_steps(self.config.steps_per_generation)?;
        let stats = self.summarize(traversal_steps);

        info!(
            generation = stats.generation,
            survivors = stats.survivors,
            non_viable = stats.non_viable,
            mean_x = stats.mean_x,
            "Generation complete"
        );

        self.next_generation();
        Ok(stats)
    }

    pub fn run(&mut self, generations: u64) -> Result<Vec<GenerationStats>, SimError> {
        (0..generations).map(|_| self.run_generation()).collect()
    }
}
