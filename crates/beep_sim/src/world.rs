use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

/// Square grid holding at most one agent per cell
///
/// This is also the agent context handed to sensors and effectors: `current`
/// names the agent whose graph is being evaluated.
#[derive(Clone, Debug)]
pub struct WorldState {
    size: usize,
    cells: Vec<Option<usize>>,
    positions: Vec<Option<Position>>,
    current: usize,
}

impl WorldState {
    pub fn new(size: usize, agents: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
            positions: vec![None; agents],
            current: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn agent_count(&self) -> usize {
        self.positions.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn set_current(&mut self, agent: usize) {
        self.current = agent;
    }

    pub fn position(&self, agent: usize) -> Option<Position> {
        self.positions.get(agent).copied().flatten()
    }

    pub fn current_position(&self) -> Option<Position> {
        self.position(self.current)
    }

    pub fn occupant(&self, x: usize, y: usize) -> Option<usize> {
        if x >= self.size || y >= self.size {
            return None;
        }
        self.cells[y * self.size + x]
    }

    /// Move (or first place) `agent` onto cell (x, y)
    ///
    /// Fails outside the grid or onto an occupied cell; on success the old
    /// cell is vacated.
    pub fn try_move(&mut self, agent: usize, x: usize, y: usize) -> bool {
        if agent >= self.positions.len() || x >= self.size || y >= self.size {
            return false;
        }
        let cell = y * self.size + x;
        if self.cells[cell].is_some() {
            return false;
        }
        if let Some(old) = self.positions[agent] {
            self.cells[old.y * self.size + old.x] = None;
        }
        self.cells[cell] = Some(agent);
        self.positions[agent] = Some(Position { x, y });
        true
    }

    /// Clear the grid and drop every agent onto a random free cell
    ///
    /// The caller guarantees the agents fit (`agents <= size * size`).
    pub fn scatter<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.positions.iter_mut().for_each(|p| *p = None);

        for agent in 0..self.positions.len() {
            loop {
                let x = rng.gen_range(0..self.size);
                let y = rng.gen_range(0..self.size);
                if self.try_move(agent, x, y) {
                    break;
                }
            }
        }
    }
}
