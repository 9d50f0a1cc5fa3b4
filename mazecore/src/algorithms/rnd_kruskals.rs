use rand::Rng as _;

use super::{MazeGenerator, Random, Step};
use crate::{
    dims::Pos,
    disjoint_set::DisjointSet,
    grid::{CellWall, Grid, GridError},
};

/// Randomized Kruskal's algorithm over the grid's inner walls.
#[derive(Debug)]
pub struct RndKruskals {
    walls: Vec<(Pos, Pos)>,
    sets: DisjointSet,
    accepted: usize,
    discarded: usize,
    total: usize,
}

impl RndKruskals {
    pub fn new(grid: &Grid) -> Self {
        let mut walls = Vec::with_capacity(grid.size().inner_wall_count());
        for pos in grid.size().iter_fill() {
            for wall in [CellWall::Right, CellWall::Bottom] {
                if let Some(other) = grid.neighbor(pos, wall) {
                    walls.push((pos, other));
                }
            }
        }

        Self {
            walls,
            sets: DisjointSet::new(grid.cell_count()),
            accepted: 0,
            discarded: 0,
            total: grid.cell_count(),
        }
    }

    /// Walls that were not considered yet.
    pub fn remaining(&self) -> usize {
        self.walls.len()
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Walls kept because removing them would have closed a cycle.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    fn finish(grid: &mut Grid) -> Result<Step, GridError> {
        for pos in grid.size().iter_fill() {
            grid.set_visited(pos, true)?;
        }
        Ok(Step::Done)
    }
}

impl MazeGenerator for RndKruskals {
    fn name(&self) -> &'static str {
        "kruskal"
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<Step, GridError> {
        if self.walls.is_empty() {
            return Self::finish(grid);
        }

        let (from, to) = self.walls.swap_remove(rng.gen_range(0..self.walls.len()));
        let (from_idx, to_idx) = (grid.index_of(from), grid.index_of(to));

        if self.sets.same_set(from_idx, to_idx) {
            self.discarded += 1;
        } else {
            grid.remove_wall(from, to)?;
            self.sets.union(from_idx, to_idx);
            grid.set_visited(from, true)?;
            grid.set_visited(to, true)?;
            self.accepted += 1;
        }

        if self.walls.is_empty() {
            Self::finish(grid)
        } else {
            Ok(Step::Continue)
        }
    }

    fn progress(&self) -> usize {
        (self.accepted + 1).min(self.total)
    }
}
