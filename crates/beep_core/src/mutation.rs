use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use rand::Rng;

use crate::config::MutationConfig;
use crate::error::BeepError;
use crate::genome::{Gene, Genome};
use crate::node::{NodeId, NodePool};

/// Random genome generation and per-gene mutation against one node pool
///
/// Every genome produced here satisfies the builder's rules: sources are never
/// effectors, targets are never sensors, and (source, target) pairs are unique.
/// The random source is always passed in, so seeded runs are reproducible.
#[derive(Debug, Clone)]
pub struct GenomeMutator {
    config: MutationConfig,
    emitters: Vec<NodeId>,
    receivers: Vec<NodeId>,
}

impl GenomeMutator {
    /// Fails with [`BeepError::InvalidMutationConfig`] unless `config.is_valid()`
    pub fn new<C>(pool: &NodePool<C>, config: MutationConfig) -> Result<Self, BeepError> {
        if !config.is_valid() {
            return Err(BeepError::InvalidMutationConfig);
        }
        Ok(Self {
            config,
            emitters: pool.emitters(),
            receivers: pool.receivers(),
        })
    }

    pub fn config(&self) -> &MutationConfig {
        &self.config
    }

    /// Number of distinct (source, target) pairs the pool allows
    pub fn link_capacity(&self) -> usize {
        self.emitters.len() * self.receivers.len()
    }

    fn pick<R: Rng + ?Sized>(rng: &mut R, from: &[NodeId]) -> NodeId {
        from[rng.gen_range(0..from.len())]
    }

    /// A gene with uniformly chosen endpoints and weight in [-1, 1)
    ///
    /// `None` when the pool has no possible source or no possible target.
    pub fn random_gene<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Gene> {
        if self.emitters.is_empty() || self.receivers.is_empty() {
            return None;
        }
        let source = Self::pick(rng, &self.emitters);
        let target = Self::pick(rng, &self.receivers);
        let weight = rng.gen::<f32>() * 2.0 - 1.0;
        Some(Gene::new(source, target, weight))
    }

    /// Up to `gene_count` random genes with distinct endpoint pairs
    ///
    /// The count is capped by [`Self::link_capacity`].
    pub fn random_genome<R: Rng + ?Sized>(&self, rng: &mut R, gene_count: usize) -> Genome {
        let wanted = gene_count.min(self.link_capacity());
        let mut used = BTreeSet::new();
        let mut genes = Vec::with_capacity(wanted);

        while genes.len() < wanted {
            let Some(gene) = self.random_gene(rng) else {
                break;
            };
            if used.insert(gene.endpoints()) {
                genes.push(gene);
            }
        }
        Genome::new(genes)
    }

    /// Copy `genome`, independently perturbing each gene's weight, source and target
    ///
    /// A mutated pair that is already present in the child falls back to the
    /// parent gene's pair; if that one is taken too, the gene is dropped.
    pub fn mutate<R: Rng + ?Sized>(&self, genome: &Genome, rng: &mut R) -> Genome {
        let mut used = BTreeSet::new();
        let mut genes = Vec::with_capacity(genome.len());

        for parent in genome.iter() {
            let mut child = *parent;
            if rng.gen_bool(self.config.weight_rate) {
                let jitter = self.config.weight_jitter;
                child.weight += (rng.gen::<f32>() * 2.0 - 1.0) * jitter;
            }
            if !self.emitters.is_empty() && rng.gen_bool(self.config.source_rate) {
                child.source = Self::pick(rng, &self.emitters);
            }
            if !self.receivers.is_empty() && rng.gen_bool(self.config.target_rate) {
                child.target = Self::pick(rng, &self.receivers);
            }

            if used.insert(child.endpoints()) {
                genes.push(child);
            } else if used.insert(parent.endpoints()) {
                child.source = parent.source;
                child.target = parent.target;
                genes.push(child);
            }
        }
        Genome::new(genes)
    }
}
