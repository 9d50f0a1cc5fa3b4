use rand::seq::SliceRandom as _;

use super::{MazeGenerator, Random, Step};
use crate::{
    dims::Pos,
    grid::{Grid, GridError},
};

/// Recursive backtracker with an explicit stack.
#[derive(Debug)]
pub struct DepthFirstSearch {
    start: Pos,
    stack: Vec<Pos>,
    visited: usize,
    dead_ends: usize,
}

impl DepthFirstSearch {
    pub fn new(start: Pos) -> Self {
        Self {
            start,
            stack: Vec::new(),
            visited: 0,
            dead_ends: 0,
        }
    }

    /// Cell currently on top of the stack.
    pub fn current(&self) -> Option<Pos> {
        self.stack.last().copied()
    }

    pub fn dead_ends(&self) -> usize {
        self.dead_ends
    }
}

impl MazeGenerator for DepthFirstSearch {
    fn name(&self) -> &'static str {
        "depth-first"
    }

    fn init(&mut self, grid: &mut Grid, _rng: &mut Random) -> Result<(), GridError> {
        grid.set_visited(self.start, true)?;
        self.stack = Vec::with_capacity(grid.cell_count());
        self.stack.push(self.start);
        self.visited = 1;
        self.dead_ends = 0;
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<Step, GridError> {
        let Some(current) = self.current() else {
            return Ok(Step::Done);
        };

        let unvisited_neighbors = grid.unvisited_neighbors(current);
        if let Some(&next) = unvisited_neighbors.choose(rng) {
            grid.remove_wall(current, next)?;
            grid.set_visited(next, true)?;
            self.visited += 1;
            self.stack.push(next);
        } else {
            self.stack.pop();
            self.dead_ends += 1;
        }

        Ok(if self.stack.is_empty() {
            Step::Done
        } else {
            Step::Continue
        })
    }

    fn progress(&self) -> usize {
        self.visited
    }
}
