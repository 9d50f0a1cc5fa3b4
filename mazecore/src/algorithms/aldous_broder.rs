use super::{MazeGenerator, Random, Step};
use crate::{
    dims::Pos,
    grid::{Grid, GridError},
};

/// Unbiased random walk, carving into every cell on its first visit.
///
/// Produces uniform spanning trees. Running time is unbounded, but the walk finishes with
/// probability 1.
#[derive(Debug)]
pub struct AldousBroder {
    start: Option<Pos>,
    current: Pos,
    visited: usize,
    total: usize,
    moves: usize,
}

impl AldousBroder {
    pub fn new(grid: &Grid, start: Option<Pos>) -> Self {
        Self {
            start,
            current: start.unwrap_or(Pos::ZERO),
            visited: 0,
            total: grid.cell_count(),
            moves: 0,
        }
    }

    pub fn current(&self) -> Pos {
        self.current
    }

    /// Length of the walk so far, including moves into already visited cells.
    pub fn moves(&self) -> usize {
        self.moves
    }
}

impl MazeGenerator for AldousBroder {
    fn name(&self) -> &'static str {
        "aldous-broder"
    }

    fn init(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<(), GridError> {
        self.current = match self.start {
            Some(start) => start,
            None => grid.random_cell(rng),
        };
        grid.set_visited(self.current, true)?;
        self.visited = 1;
        self.moves = 0;
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<Step, GridError> {
        if self.visited >= self.total {
            return Ok(Step::Done);
        }

        let Some(next) = grid.random_neighbor(self.current, &[], rng) else {
            return Ok(Step::Done);
        };

        if !grid.is_visited(next) {
            grid.remove_wall(self.current, next)?;
            grid.set_visited(next, true)?;
            self.visited += 1;
        }
        self.current = next;
        self.moves += 1;

        Ok(if self.visited >= self.total {
            Step::Done
        } else {
            Step::Continue
        })
    }

    fn progress(&self) -> usize {
        self.visited
    }
}
