use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::SimError;

/// Summary of one finished generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub population: usize,
    /// Agents past the survival line when the generation ended
    pub survivors: usize,
    /// Agents whose genome failed to build or whose tick failed
    pub non_viable: usize,
    /// Mean normalized x position at the end of the generation
    pub mean_x: f32,
    /// Worklist steps spent across every tick of the generation
    pub traversal_steps: u64,
}

impl GenerationStats {
    pub fn survival_rate(&self) -> f32 {
        if self.population == 0 {
            0.0
        } else {
            self.survivors as f32 / self.population as f32
        }
    }
}

/// Write one CSV row per generation, with a header
pub fn write_csv<W: Write>(writer: W, stats: &[GenerationStats]) -> Result<(), SimError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in stats {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, stats: &[GenerationStats]) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_csv(file, stats)
}
