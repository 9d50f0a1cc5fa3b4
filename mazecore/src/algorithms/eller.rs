use hashbrown::HashMap;
use rand::{seq::SliceRandom as _, Rng as _};
use smallvec::SmallVec;

use super::{MazeGenerator, Params, Random, Step};
use crate::{
    dims::Pos,
    grid::{Grid, GridError},
};

/// Eller's algorithm, one row per step.
///
/// Only the set ids of the current row are kept. Params:
/// - `merge_chance`: probability of joining two distinct neighboring sets in a row, default `0.5`
/// - `down_chance`: probability of an extra downward passage per cell, default `0.0`
#[derive(Debug)]
pub struct Eller {
    row: usize,
    rows: usize,
    cols: usize,
    sets: Vec<usize>,
    next_set: usize,
    merge_chance: f64,
    down_chance: f64,
    visited: usize,
    done: bool,
}

impl Eller {
    pub fn new(grid: &Grid, params: &Params) -> Self {
        let cols = grid.cols();
        Self {
            row: 0,
            rows: grid.rows(),
            cols,
            sets: (0..cols).collect(),
            next_set: cols,
            merge_chance: params.chance_or_warn("merge_chance", 0.5),
            down_chance: params.chance_or_warn("down_chance", 0.0),
            visited: 0,
            done: false,
        }
    }

    /// Row that will be processed by the next step.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Set ids of the current row, indexed by column.
    pub fn sets(&self) -> &[usize] {
        &self.sets
    }

    /// Joins neighboring cells of different sets, always when `force` is set.
    fn merge_row(
        &mut self,
        grid: &mut Grid,
        rng: &mut Random,
        row: usize,
        force: bool,
    ) -> Result<(), GridError> {
        for col in 0..self.cols.saturating_sub(1) {
            if self.sets[col] == self.sets[col + 1] {
                continue;
            }
            if !force && !rng.gen_bool(self.merge_chance) {
                continue;
            }

            grid.remove_wall(Pos::new(row, col), Pos::new(row, col + 1))?;
            let (old, new) = (self.sets[col + 1], self.sets[col]);
            for set in self.sets.iter_mut().filter(|set| **set == old) {
                *set = new;
            }
        }
        Ok(())
    }

    /// Opens at least one passage down from every set and returns set ids of the next row.
    fn carry_down(
        &mut self,
        grid: &mut Grid,
        rng: &mut Random,
        row: usize,
    ) -> Result<Vec<usize>, GridError> {
        // groups in order of first appearance, so a seed always gives the same maze
        let mut group_of: HashMap<usize, usize> = HashMap::new();
        let mut groups: Vec<(usize, SmallVec<[usize; 8]>)> = Vec::new();
        for (col, &set) in self.sets.iter().enumerate() {
            let group = *group_of.entry(set).or_insert_with(|| {
                groups.push((set, SmallVec::new()));
                groups.len() - 1
            });
            groups[group].1.push(col);
        }

        let mut next: Vec<Option<usize>> = vec![None; self.cols];
        for (set, cols) in &groups {
            let Some(&chosen) = cols.choose(rng) else {
                continue;
            };
            for &col in cols {
                if col == chosen || rng.gen_bool(self.down_chance) {
                    grid.remove_wall(Pos::new(row, col), Pos::new(row + 1, col))?;
                    next[col] = Some(*set);
                }
            }
        }

        Ok(next
            .into_iter()
            .map(|set| {
                set.unwrap_or_else(|| {
                    self.next_set += 1;
                    self.next_set - 1
                })
            })
            .collect())
    }

    fn mark_row(&mut self, grid: &mut Grid, row: usize) -> Result<(), GridError> {
        for col in 0..self.cols {
            grid.set_visited(Pos::new(row, col), true)?;
        }
        self.visited = (row + 1) * self.cols;
        Ok(())
    }
}

impl MazeGenerator for Eller {
    fn name(&self) -> &'static str {
        "eller"
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<Step, GridError> {
        if self.done {
            return Ok(Step::Done);
        }

        let row = self.row;
        if row + 1 >= self.rows {
            self.merge_row(grid, rng, row, true)?;
            self.mark_row(grid, row)?;
            self.done = true;
            return Ok(Step::Done);
        }

        self.merge_row(grid, rng, row, false)?;
        self.sets = self.carry_down(grid, rng, row)?;
        self.mark_row(grid, row)?;
        self.row += 1;

        Ok(Step::Continue)
    }

    fn progress(&self) -> usize {
        self.visited
    }
}
