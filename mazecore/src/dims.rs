use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a cell in the grid, `row` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const ZERO: Pos = Pos { row: 0, col: 0 };

    pub const fn new(row: usize, col: usize) -> Self {
        Pos { row, col }
    }

    /// Moves the position by the given signed offset, `None` if it would underflow.
    pub fn offset(self, (d_row, d_col): (isize, isize)) -> Option<Pos> {
        Some(Pos {
            row: self.row.checked_add_signed(d_row)?,
            col: self.col.checked_add_signed(d_col)?,
        })
    }

    /// Manhattan distance between two positions.
    pub fn distance(self, other: Pos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn is_adjacent(self, other: Pos) -> bool {
        self.distance(other) == 1
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Pos {
    fn from((row, col): (usize, usize)) -> Self {
        Pos { row, col }
    }
}

impl From<Pos> for (usize, usize) {
    fn from(pos: Pos) -> Self {
        (pos.row, pos.col)
    }
}

/// Size of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dims {
    pub rows: usize,
    pub cols: usize,
}

impl Dims {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Dims { rows, cols }
    }

    pub const fn product(&self) -> usize {
        self.rows * self.cols
    }

    pub const fn all_positive(&self) -> bool {
        self.rows > 0 && self.cols > 0
    }

    pub const fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Number of walls shared by two cells, i.e. edges of the grid graph.
    pub const fn inner_wall_count(&self) -> usize {
        if !self.all_positive() {
            return 0;
        }
        self.rows * (self.cols - 1) + self.cols * (self.rows - 1)
    }

    /// Iterates all positions in row-major order.
    pub fn iter_fill(self) -> impl Iterator<Item = Pos> {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Pos { row, col }))
    }
}

impl fmt::Display for Dims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
