use hashbrown::HashMap;
use rand::seq::SliceRandom as _;

use super::{MazeGenerator, Random, Step};
use crate::{
    dims::Pos,
    grid::{Grid, GridError},
};

/// Walk path that erases loops as soon as they are closed.
#[derive(Debug, Clone)]
pub struct LoopErasedPath {
    path: Vec<Pos>,
    index: HashMap<Pos, usize>,
}

impl LoopErasedPath {
    pub fn new(start: Pos) -> Self {
        let mut index = HashMap::new();
        index.insert(start, 0);
        Self {
            path: vec![start],
            index,
        }
    }

    /// Extends the path by `pos`.
    ///
    /// If `pos` is already on the path, everything after its first occurrence is erased instead
    /// and `true` is returned.
    pub fn push(&mut self, pos: Pos) -> bool {
        if let Some(&first) = self.index.get(&pos) {
            for erased in self.path.drain(first + 1..) {
                self.index.remove(&erased);
            }
            true
        } else {
            self.index.insert(pos, self.path.len());
            self.path.push(pos);
            false
        }
    }

    pub fn last(&self) -> Pos {
        // the path is never empty, it always contains the start
        self.path[self.path.len() - 1]
    }

    /// Cell the walk came from, `None` right at the start.
    pub fn previous(&self) -> Option<Pos> {
        self.path.len().checked_sub(2).map(|i| self.path[i])
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.index.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn as_slice(&self) -> &[Pos] {
        &self.path
    }
}

/// Wilson's algorithm: loop-erased random walks from unvisited cells until they hit the tree.
#[derive(Debug)]
pub struct Wilson {
    root: Option<Pos>,
    walk: Option<LoopErasedPath>,
    // indices of cells outside of the tree, `slots` maps an index to its place in `unvisited`
    unvisited: Vec<usize>,
    slots: Vec<Option<usize>>,
    visited: usize,
    total: usize,
    erased_loops: usize,
}

impl Wilson {
    pub fn new(grid: &Grid, root: Option<Pos>) -> Self {
        Self {
            root,
            walk: None,
            unvisited: Vec::new(),
            slots: Vec::new(),
            visited: 0,
            total: grid.cell_count(),
            erased_loops: 0,
        }
    }

    /// The walk currently in progress.
    pub fn walk(&self) -> Option<&LoopErasedPath> {
        self.walk.as_ref()
    }

    pub fn erased_loops(&self) -> usize {
        self.erased_loops
    }

    fn commit(&mut self, grid: &mut Grid, walk: &LoopErasedPath) -> Result<(), GridError> {
        for pair in walk.as_slice().windows(2) {
            grid.remove_wall(pair[0], pair[1])?;
        }
        for &pos in walk.as_slice() {
            if !grid.is_visited(pos) {
                grid.set_visited(pos, true)?;
                self.join_tree(grid.index_of(pos));
                self.visited += 1;
            }
        }
        Ok(())
    }

    fn join_tree(&mut self, index: usize) {
        let Some(slot) = self.slots.get_mut(index).and_then(Option::take) else {
            return;
        };
        self.unvisited.swap_remove(slot);
        if let Some(&moved) = self.unvisited.get(slot) {
            self.slots[moved] = Some(slot);
        }
    }

    fn done_or_continue(&self) -> Step {
        if self.visited >= self.total {
            Step::Done
        } else {
            Step::Continue
        }
    }
}

impl MazeGenerator for Wilson {
    fn name(&self) -> &'static str {
        "wilson"
    }

    fn init(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<(), GridError> {
        let root = match self.root {
            Some(root) => root,
            None => grid.random_cell(rng),
        };
        grid.set_visited(root, true)?;

        let root_index = grid.index_of(root);
        self.unvisited = (0..grid.cell_count())
            .filter(|&index| index != root_index)
            .collect();
        self.slots = vec![None; grid.cell_count()];
        for (slot, &index) in self.unvisited.iter().enumerate() {
            self.slots[index] = Some(slot);
        }

        self.walk = None;
        self.visited = 1;
        self.erased_loops = 0;
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<Step, GridError> {
        if self.visited >= self.total {
            return Ok(Step::Done);
        }

        let Some(mut walk) = self.walk.take() else {
            let Some(&start) = self.unvisited.choose(rng) else {
                return Ok(Step::Done);
            };
            self.walk = Some(LoopErasedPath::new(grid.pos_of(start)));
            return Ok(Step::Continue);
        };

        let current = walk.last();
        if grid.is_visited(current) {
            self.commit(grid, &walk)?;
            return Ok(self.done_or_continue());
        }

        // don't step straight back, unless it's the only way out of a dead end
        let previous: Vec<Pos> = walk.previous().into_iter().collect();
        let next = grid
            .random_neighbor(current, &previous, rng)
            .or_else(|| grid.random_neighbor(current, &[], rng));
        let Some(next) = next else {
            return Ok(Step::Done);
        };

        if walk.push(next) {
            self.erased_loops += 1;
        }
        self.walk = Some(walk);

        Ok(Step::Continue)
    }

    fn progress(&self) -> usize {
        self.visited
    }
}
