use alloc::collections::BTreeSet;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::error::BeepError;
use crate::node::NodeId;

/// One weighted, directed link descriptor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f32,
}

impl Gene {
    pub fn new(source: NodeId, target: NodeId, weight: f32) -> Self {
        Gene {
            source,
            target,
            weight,
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

/// Ordered gene list defining one agent's wiring
///
/// Pure data. Gene order is significant: it fixes link registration order and
/// therefore traversal order inside the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Genome {
    genes: Vec<Gene>,
}

impl Genome {
    pub fn new(genes: Vec<Gene>) -> Self {
        Genome { genes }
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn push(&mut self, gene: Gene) {
        self.genes.push(gene);
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Gene> {
        self.genes.iter()
    }

    pub fn contains_link(&self, source: NodeId, target: NodeId) -> bool {
        self.genes
            .iter()
            .any(|g| g.source == source && g.target == target)
    }

    /// Index of the first gene repeating an earlier (source, target) pair
    pub fn first_duplicate(&self) -> Option<usize> {
        let mut seen = BTreeSet::new();
        self.genes.iter().position(|g| !seen.insert(g.endpoints()))
    }

    pub fn to_json(&self) -> Result<String, BeepError> {
        serde_json::to_string(self).map_err(|e| BeepError::GenomeFormat(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, BeepError> {
        serde_json::from_str(json).map_err(|e| BeepError::GenomeFormat(e.to_string()))
    }

    pub fn into_genes(self) -> Vec<Gene> {
        self.genes
    }
}

impl FromIterator<Gene> for Genome {
    fn from_iter<I: IntoIterator<Item = Gene>>(iter: I) -> Self {
        Genome {
            genes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Genome {
    type Item = &'a Gene;
    type IntoIter = core::slice::Iter<'a, Gene>;

    fn into_iter(self) -> Self::IntoIter {
        self.genes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_is_a_plain_gene_array() {
        let genome = Genome::new(vec![Gene::new(NodeId(0), NodeId(2), 0.5)]);
        let json = genome.to_json().unwrap();
        assert_eq!(json, r#"[{"source":0,"target":2,"weight":0.5}]"#);
        assert_eq!(Genome::from_json(&json).unwrap(), genome);
    }

    #[test]
    fn bad_json_reports_format_error() {
        let err = Genome::from_json("{not json").unwrap_err();
        assert!(matches!(err, BeepError::GenomeFormat(_)));
    }

    #[test]
    fn detects_first_duplicate_pair() {
        let genome: Genome = [
            Gene::new(NodeId(0), NodeId(1), 0.1),
            Gene::new(NodeId(1), NodeId(2), 0.2),
            Gene::new(NodeId(0), NodeId(1), -0.4),
        ]
        .into_iter()
        .collect();

        assert_eq!(genome.first_duplicate(), Some(2));
        assert!(genome.contains_link(NodeId(1), NodeId(2)));
        assert!(!genome.contains_link(NodeId(2), NodeId(1)));
    }
}
