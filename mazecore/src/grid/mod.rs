pub mod cell;

pub use cell::{Cell, CellWall, Walls};

use rand::{seq::SliceRandom as _, Rng};
use smallvec::SmallVec;
use thiserror::Error;

use crate::dims::{Dims, Pos};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid size {rows}x{cols}, both dimensions must be at least 1")]
    InvalidSize { rows: usize, cols: usize },
    #[error("position {0} is outside of the grid")]
    OutOfBounds(Pos),
    #[error("cells {0} and {1} are not adjacent")]
    NotAdjacent(Pos, Pos),
    #[error("expected {expected} cells, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Neighbor positions of a cell, never more than four.
pub type Neighbors = SmallVec<[Pos; 4]>;

/// Rectangular matrix of cells together with their wall state.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
    rows: usize,
    cols: usize,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        let size = Dims::new(rows, cols);
        if !size.all_positive() {
            return Err(GridError::InvalidSize { rows, cols });
        }

        let cells = (0..rows)
            .map(|row| (0..cols).map(|col| Cell::new(Pos::new(row, col))).collect())
            .collect();

        Ok(Grid { cells, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn size(&self) -> Dims {
        Dims::new(self.rows, self.cols)
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_in_bounds(&self, pos: Pos) -> bool {
        self.size().contains(pos)
    }

    /// Row-major index of the position, used as the cell's identity in index arenas.
    pub fn index_of(&self, pos: Pos) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn pos_of(&self, index: usize) -> Pos {
        Pos::new(index / self.cols, index % self.cols)
    }

    pub fn get_cell(&self, pos: Pos) -> Result<&Cell, GridError> {
        self.cell(pos).ok_or(GridError::OutOfBounds(pos))
    }

    pub fn cell(&self, pos: Pos) -> Option<&Cell> {
        self.cells.get(pos.row).and_then(|row| row.get(pos.col))
    }

    fn cell_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        self.cells.get_mut(pos.row).and_then(|row| row.get_mut(pos.col))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    /// Position of the neighbor behind `wall`, if it's inside of the grid.
    pub fn neighbor(&self, pos: Pos, wall: CellWall) -> Option<Pos> {
        pos.offset(wall.to_offset())
            .filter(|&n| self.is_in_bounds(pos) && self.is_in_bounds(n))
    }

    /// In-bounds neighbors in the order up, right, down, left.
    pub fn neighbors(&self, pos: Pos) -> Neighbors {
        CellWall::get_in_order()
            .into_iter()
            .filter_map(|wall| self.neighbor(pos, wall))
            .collect()
    }

    pub fn unvisited_neighbors(&self, pos: Pos) -> Neighbors {
        self.neighbors(pos)
            .into_iter()
            .filter(|&n| !self.is_visited(n))
            .collect()
    }

    /// Uniformly random neighbor not contained in `exclude`.
    ///
    /// Returns `None` when every neighbor is excluded, which callers treat as a normal outcome.
    pub fn random_neighbor<R: Rng + ?Sized>(
        &self,
        pos: Pos,
        exclude: &[Pos],
        rng: &mut R,
    ) -> Option<Pos> {
        let candidates: Neighbors = self
            .neighbors(pos)
            .into_iter()
            .filter(|n| !exclude.contains(n))
            .collect();
        candidates.choose(rng).copied()
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Pos {
        Pos::new(rng.gen_range(0..self.rows), rng.gen_range(0..self.cols))
    }

    /// Returns the wall of `cell` facing `cell2`, if they are adjacent.
    pub fn which_wall_between(cell: Pos, cell2: Pos) -> Option<CellWall> {
        CellWall::get_in_order()
            .into_iter()
            .find(|wall| cell.offset(wall.to_offset()) == Some(cell2))
    }

    /// Clears the wall pair between two adjacent cells.
    pub fn remove_wall(&mut self, a: Pos, b: Pos) -> Result<(), GridError> {
        let wall = Self::which_wall_between(a, b)
            .filter(|_| self.is_in_bounds(a) && self.is_in_bounds(b))
            .ok_or_else(|| {
                log::error!("Tried to remove wall between non-adjacent cells {a} and {b}");
                GridError::NotAdjacent(a, b)
            })?;

        log::trace!("Removing wall {wall:?} of {a}");

        if let Some(cell) = self.cell_mut(a) {
            cell.remove_wall(wall);
        }
        if let Some(cell) = self.cell_mut(b) {
            cell.remove_wall(wall.reverse_wall());
        }

        Ok(())
    }

    /// Whether the wall between two adjacent cells is still standing.
    pub fn has_wall_between(&self, a: Pos, b: Pos) -> Result<bool, GridError> {
        let wall = Self::which_wall_between(a, b)
            .filter(|_| self.is_in_bounds(a) && self.is_in_bounds(b))
            .ok_or(GridError::NotAdjacent(a, b))?;
        Ok(self.get_cell(a)?.get_wall(wall))
    }

    pub fn is_visited(&self, pos: Pos) -> bool {
        self.cell(pos).is_some_and(Cell::is_visited)
    }

    pub fn set_visited(&mut self, pos: Pos, visited: bool) -> Result<(), GridError> {
        self.cell_mut(pos)
            .ok_or(GridError::OutOfBounds(pos))?
            .set_visited(visited);
        Ok(())
    }

    pub fn visited_count(&self) -> usize {
        self.iter().filter(|cell| cell.is_visited()).count()
    }

    /// Restores every cell to the freshly created state, keeping the dimensions.
    pub fn reset(&mut self) {
        for (row, cells) in self.cells.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                cell.reset(Pos::new(row, col));
            }
        }
    }

    /// Appends a row at the bottom. Supplied cells are moved to their new positions and reset.
    pub fn append_row(&mut self, cells: Vec<Cell>) -> Result<(), GridError> {
        if cells.len() != self.cols {
            return Err(GridError::DimensionMismatch {
                expected: self.cols,
                got: cells.len(),
            });
        }

        let row = self.rows;
        let mut cells = cells;
        for (col, cell) in cells.iter_mut().enumerate() {
            cell.reset(Pos::new(row, col));
        }
        self.cells.push(cells);
        self.rows += 1;

        Ok(())
    }

    /// Appends a column on the right, one cell per existing row.
    pub fn append_column(&mut self, cells: Vec<Cell>) -> Result<(), GridError> {
        if cells.len() != self.rows {
            return Err(GridError::DimensionMismatch {
                expected: self.rows,
                got: cells.len(),
            });
        }

        let col = self.cols;
        for ((row, cells), mut cell) in self.cells.iter_mut().enumerate().zip(cells) {
            cell.reset(Pos::new(row, col));
            cells.push(cell);
        }
        self.cols += 1;

        Ok(())
    }

    /// Number of removed inner walls, i.e. edges of the passage graph.
    pub fn passage_count(&self) -> usize {
        self.iter()
            .map(|cell| {
                [CellWall::Right, CellWall::Bottom]
                    .into_iter()
                    .filter(|&w| !cell.get_wall(w) && self.neighbor(cell.pos(), w).is_some())
                    .count()
            })
            .sum()
    }

    /// Whether every cell can be reached from `(0, 0)` through removed walls.
    pub fn is_connected(&self) -> bool {
        let mut seen = vec![false; self.cell_count()];
        let mut stack = vec![Pos::ZERO];
        seen[0] = true;
        let mut reached = 1;

        while let Some(pos) = stack.pop() {
            let Some(cell) = self.cell(pos) else {
                continue;
            };
            for wall in CellWall::get_in_order() {
                if cell.get_wall(wall) {
                    continue;
                }
                if let Some(next) = self.neighbor(pos, wall) {
                    let idx = self.index_of(next);
                    if !seen[idx] {
                        seen[idx] = true;
                        reached += 1;
                        stack.push(next);
                    }
                }
            }
        }

        reached == self.cell_count()
    }

    /// Connected and acyclic, so exactly one path between any two cells.
    pub fn is_perfect(&self) -> bool {
        self.passage_count() + 1 == self.cell_count() && self.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;
    use crate::algorithms::Random;

    fn grid(rows: usize, cols: usize) -> Grid {
        Grid::new(rows, cols).unwrap()
    }

    #[test]
    fn invalid_size() {
        assert_eq!(
            Grid::new(0, 3).unwrap_err(),
            GridError::InvalidSize { rows: 0, cols: 3 }
        );
        assert!(Grid::new(3, 0).is_err());
        assert!(Grid::new(1, 1).is_ok());
    }

    #[test]
    fn get_cell_bounds() {
        let g = grid(2, 3);
        assert_eq!(g.get_cell(Pos::new(1, 2)).unwrap().pos(), Pos::new(1, 2));
        assert_eq!(
            g.get_cell(Pos::new(2, 0)).unwrap_err(),
            GridError::OutOfBounds(Pos::new(2, 0))
        );
        assert!(g.get_cell(Pos::new(0, 3)).is_err());
    }

    #[test]
    fn neighbor_order() {
        let g = grid(3, 3);
        let center = g.neighbors(Pos::new(1, 1));
        assert_eq!(
            center.as_slice(),
            &[Pos::new(0, 1), Pos::new(1, 2), Pos::new(2, 1), Pos::new(1, 0)]
        );

        let corner = g.neighbors(Pos::new(0, 0));
        assert_eq!(corner.as_slice(), &[Pos::new(0, 1), Pos::new(1, 0)]);

        assert!(grid(1, 1).neighbors(Pos::ZERO).is_empty());
    }

    #[test]
    fn unvisited_neighbors_filters() {
        let mut g = grid(3, 3);
        g.set_visited(Pos::new(0, 1), true).unwrap();
        let n = g.unvisited_neighbors(Pos::new(1, 1));
        assert_eq!(n.len(), 3);
        assert!(!n.contains(&Pos::new(0, 1)));
    }

    #[test]
    fn random_neighbor_exclusion() {
        let g = grid(1, 3);
        let mut rng = Random::seed_from_u64(7);
        let middle = Pos::new(0, 1);

        for _ in 0..20 {
            let n = g.random_neighbor(middle, &[Pos::new(0, 0)], &mut rng);
            assert_eq!(n, Some(Pos::new(0, 2)));
        }
        assert_eq!(
            g.random_neighbor(middle, &[Pos::new(0, 0), Pos::new(0, 2)], &mut rng),
            None
        );
    }

    #[test]
    fn remove_wall_is_symmetric() {
        let mut g = grid(2, 2);
        let (a, b) = (Pos::new(0, 0), Pos::new(1, 0));
        g.remove_wall(a, b).unwrap();

        assert!(!g.get_cell(a).unwrap().get_wall(CellWall::Bottom));
        assert!(!g.get_cell(b).unwrap().get_wall(CellWall::Top));
        assert!(!g.has_wall_between(b, a).unwrap());
        assert!(g.has_wall_between(a, Pos::new(0, 1)).unwrap());
        assert_eq!(g.passage_count(), 1);
    }

    #[test]
    fn remove_wall_not_adjacent() {
        let mut g = grid(3, 3);
        let diagonal = g.remove_wall(Pos::new(0, 0), Pos::new(1, 1));
        assert_eq!(
            diagonal,
            Err(GridError::NotAdjacent(Pos::new(0, 0), Pos::new(1, 1)))
        );
        assert!(g.remove_wall(Pos::new(0, 0), Pos::new(0, 0)).is_err());
        assert!(g.remove_wall(Pos::new(2, 2), Pos::new(2, 3)).is_err());
        assert_eq!(g.passage_count(), 0);
    }

    #[test]
    fn wall_queries_agree_with_removal() {
        let g = grid(3, 3);
        let outside = [
            (Pos::new(2, 2), Pos::new(2, 3)),
            (Pos::new(2, 3), Pos::new(2, 2)),
            (Pos::new(2, 1), Pos::new(3, 1)),
        ];
        for (a, b) in outside {
            assert_eq!(g.has_wall_between(a, b), Err(GridError::NotAdjacent(a, b)));
            assert_eq!(g.clone().remove_wall(a, b), Err(GridError::NotAdjacent(a, b)));
        }
        assert_eq!(g.has_wall_between(Pos::new(2, 1), Pos::new(2, 2)), Ok(true));
    }

    #[test]
    fn reset_restores_walls() {
        let mut g = grid(2, 2);
        g.remove_wall(Pos::new(0, 0), Pos::new(0, 1)).unwrap();
        g.set_visited(Pos::new(0, 0), true).unwrap();
        g.reset();

        assert_eq!(g.size(), Dims::new(2, 2));
        assert_eq!(g.passage_count(), 0);
        assert_eq!(g.visited_count(), 0);
        assert!(g.iter().all(|c| c.walls() == Walls::ALL));
    }

    #[test]
    fn append_row_and_column() {
        let mut g = grid(2, 3);
        assert_eq!(
            g.append_row(vec![Cell::new(Pos::ZERO); 2]),
            Err(GridError::DimensionMismatch {
                expected: 3,
                got: 2
            })
        );

        g.append_row(vec![Cell::new(Pos::ZERO); 3]).unwrap();
        assert_eq!(g.size(), Dims::new(3, 3));
        assert_eq!(g.get_cell(Pos::new(2, 1)).unwrap().pos(), Pos::new(2, 1));

        assert!(g.append_column(vec![Cell::new(Pos::ZERO); 2]).is_err());
        g.append_column(vec![Cell::new(Pos::ZERO); 3]).unwrap();
        assert_eq!(g.size(), Dims::new(3, 4));
        assert_eq!(g.get_cell(Pos::new(1, 3)).unwrap().pos(), Pos::new(1, 3));
        assert_eq!(g.neighbors(Pos::new(2, 3)).len(), 2);
    }

    #[test]
    fn connectivity_checks() {
        let mut g = grid(2, 2);
        assert!(!g.is_connected());
        g.remove_wall(Pos::new(0, 0), Pos::new(0, 1)).unwrap();
        g.remove_wall(Pos::new(0, 1), Pos::new(1, 1)).unwrap();
        g.remove_wall(Pos::new(1, 1), Pos::new(1, 0)).unwrap();
        assert!(g.is_perfect());

        g.remove_wall(Pos::new(1, 0), Pos::new(0, 0)).unwrap();
        assert!(g.is_connected());
        assert!(!g.is_perfect());

        assert!(grid(1, 1).is_perfect());
    }

    #[test]
    fn index_roundtrip() {
        let g = grid(3, 5);
        for pos in g.size().iter_fill() {
            assert_eq!(g.pos_of(g.index_of(pos)), pos);
        }
    }
}
