use serde::{Deserialize, Serialize};

use crate::dims::Pos;

use CellWall::*;

/// One side of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellWall {
    Top,
    Right,
    Bottom,
    Left,
}

impl CellWall {
    /// Walls in the order neighbors are reported: up, right, down, left.
    pub const fn get_in_order() -> [CellWall; 4] {
        [Top, Right, Bottom, Left]
    }

    /// Offset `(row, col)` of the neighbor behind this wall.
    pub const fn to_offset(self) -> (isize, isize) {
        match self {
            Top => (-1, 0),
            Right => (0, 1),
            Bottom => (1, 0),
            Left => (0, -1),
        }
    }

    pub const fn reverse_wall(self) -> CellWall {
        match self {
            Top => Bottom,
            Right => Left,
            Bottom => Top,
            Left => Right,
        }
    }
}

/// Wall flags of a single cell, `true` means the wall is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Walls {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Walls {
    pub const ALL: Walls = Walls {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub const fn get(&self, wall: CellWall) -> bool {
        match wall {
            Top => self.top,
            Right => self.right,
            Bottom => self.bottom,
            Left => self.left,
        }
    }

    fn set(&mut self, wall: CellWall, value: bool) {
        match wall {
            Top => self.top = value,
            Right => self.right = value,
            Bottom => self.bottom = value,
            Left => self.left = value,
        }
    }

    pub fn count(&self) -> usize {
        CellWall::get_in_order()
            .into_iter()
            .filter(|&w| self.get(w))
            .count()
    }
}

impl Default for Walls {
    fn default() -> Self {
        Self::ALL
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pos: Pos,
    walls: Walls,
    visited: bool,
}

impl Cell {
    pub fn new(pos: Pos) -> Cell {
        Cell {
            pos,
            walls: Walls::ALL,
            visited: false,
        }
    }

    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn walls(&self) -> Walls {
        self.walls
    }

    pub fn get_wall(&self, wall: CellWall) -> bool {
        self.walls.get(wall)
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    /// Number of open sides, `1` means a dead end.
    pub fn passage_count(&self) -> usize {
        4 - self.walls.count()
    }

    pub(crate) fn remove_wall(&mut self, wall: CellWall) {
        self.walls.set(wall, false);
    }

    pub(crate) fn set_visited(&mut self, visited: bool) {
        self.visited = visited;
    }

    pub(crate) fn reset(&mut self, pos: Pos) {
        *self = Cell::new(pos);
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
    }
}

impl Eq for Cell {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_is_involution() {
        for wall in CellWall::get_in_order() {
            assert_eq!(wall.reverse_wall().reverse_wall(), wall);
            let (r, c) = wall.to_offset();
            let (rr, rc) = wall.reverse_wall().to_offset();
            assert_eq!((r + rr, c + rc), (0, 0));
        }
    }

    #[test]
    fn new_cell_is_closed() {
        let mut cell = Cell::new(Pos::new(2, 3));
        assert_eq!(cell.walls(), Walls::ALL);
        assert!(!cell.is_visited());
        assert_eq!(cell.passage_count(), 0);

        cell.remove_wall(Left);
        cell.set_visited(true);
        assert!(!cell.get_wall(Left));
        assert_eq!(cell.passage_count(), 1);

        cell.reset(Pos::new(2, 3));
        assert_eq!(cell.walls(), Walls::ALL);
        assert!(!cell.is_visited());
    }
}
