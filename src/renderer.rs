use std::io::{self, Write};

use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use mazecore::{
    dims::Pos,
    grid::{CellWall, Grid},
    progress::StepEvent,
};

const UNVISITED: char = '░';

pub fn double_line_corner(left: bool, top: bool, right: bool, bottom: bool) -> char {
    match (left, top, right, bottom) {
        (false, false, false, false) => '▪',
        (false, false, false, true) => '▪',
        (false, false, true, false) => '▪',
        (false, false, true, true) => '╔',
        (false, true, false, false) => '▪',
        (false, true, false, true) => '║',
        (false, true, true, false) => '╚',
        (false, true, true, true) => '╠',
        (true, false, false, false) => '▪',
        (true, false, false, true) => '╗',
        (true, false, true, false) => '═',
        (true, false, true, true) => '╦',
        (true, true, false, false) => '╝',
        (true, true, false, true) => '╣',
        (true, true, true, false) => '╩',
        (true, true, true, true) => '╬',
    }
}

/// Terminal size needed to show the whole grid, `(width, height)`.
pub fn render_size(grid: &Grid) -> (usize, usize) {
    (grid.cols() * 2 + 1, grid.rows() * 2 + 1)
}

fn wall(grid: &Grid, row: usize, col: usize, wall: CellWall) -> bool {
    grid.cell(Pos::new(row, col))
        .map_or(false, |cell| cell.get_wall(wall))
}

/// Wall on horizontal line `line` above column `col`.
fn horizontal(grid: &Grid, line: usize, col: usize) -> bool {
    if line < grid.rows() {
        wall(grid, line, col, CellWall::Top)
    } else {
        wall(grid, line - 1, col, CellWall::Bottom)
    }
}

/// Wall on vertical line `line` left of row `row`.
fn vertical(grid: &Grid, row: usize, line: usize) -> bool {
    if line < grid.cols() {
        wall(grid, row, line, CellWall::Left)
    } else {
        wall(grid, row, line - 1, CellWall::Right)
    }
}

/// Draws the grid with box drawing characters, unvisited cells are shaded.
pub fn render(grid: &Grid) -> Vec<String> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut lines = Vec::with_capacity(rows * 2 + 1);

    for line in 0..=rows {
        let mut corners = String::with_capacity(cols * 2 + 1);
        for col in 0..=cols {
            corners.push(double_line_corner(
                col > 0 && horizontal(grid, line, col - 1),
                line > 0 && vertical(grid, line - 1, col),
                col < cols && horizontal(grid, line, col),
                line < rows && vertical(grid, line, col),
            ));
            if col < cols {
                corners.push(if horizontal(grid, line, col) { '═' } else { ' ' });
            }
        }
        lines.push(corners);

        if line == rows {
            break;
        }

        let mut cells = String::with_capacity(cols * 2 + 1);
        for col in 0..=cols {
            cells.push(if vertical(grid, line, col) { '║' } else { ' ' });
            if col < cols {
                let visited = grid.is_visited(Pos::new(line, col));
                cells.push(if visited { ' ' } else { UNVISITED });
            }
        }
        lines.push(cells);
    }

    lines
}

/// Redraws the whole screen: the grid, the generator name and the status lines of `event`.
pub fn draw(
    out: &mut impl Write,
    grid: &Grid,
    generator: &str,
    event: Option<&StepEvent>,
) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for line in render(grid) {
        queue!(out, Print(line), Print("\n"))?;
    }
    queue!(out, Print(format!("{} {}", generator, grid.size())), Print("\n"))?;
    for message in event.map(StepEvent::messages).unwrap_or_default() {
        queue!(out, Print(message), Print("\n"))?;
    }
    out.flush()
}

/// Whether the grid fits into the terminal, `true` when the size can't be determined.
pub fn fits_terminal(grid: &Grid) -> bool {
    let (width, height) = render_size(grid);
    match terminal::size() {
        Ok((cols, rows)) => width <= cols as usize && height < rows as usize,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use mazecore::algorithms::{GeneratorKind, Params, Random};
    use rand::SeedableRng as _;

    use super::*;

    #[test]
    fn fresh_grid() {
        let grid = Grid::new(2, 3).unwrap();
        let lines = render(&grid);
        assert_eq!(
            lines,
            [
                "╔═╦═╦═╗",
                "║░║░║░║",
                "╠═╬═╬═╣",
                "║░║░║░║",
                "╚═╩═╩═╝",
            ]
        );
    }

    #[test]
    fn shape_matches_render_size() {
        let mut grid = Grid::new(5, 8).unwrap();
        let mut rng = Random::seed_from_u64(1);
        GeneratorKind::Wilson
            .build(&grid, None, &Params::default())
            .run(&mut grid, &mut rng)
            .unwrap();

        let lines = render(&grid);
        let (width, height) = render_size(&grid);
        assert_eq!(lines.len(), height);
        assert!(lines.iter().all(|line| line.chars().count() == width));
        assert!(lines.iter().all(|line| !line.contains(UNVISITED)));
    }

    #[test]
    fn corridor_has_no_inner_walls() {
        let mut grid = Grid::new(1, 3).unwrap();
        let mut rng = Random::seed_from_u64(0);
        GeneratorKind::DepthFirst
            .build(&grid, None, &Params::default())
            .run(&mut grid, &mut rng)
            .unwrap();

        assert_eq!(render(&grid), ["╔═════╗", "║     ║", "╚═════╝"]);
    }

    #[test]
    fn draw_writes_status() {
        let grid = Grid::new(1, 1).unwrap();
        let mut out = Vec::new();
        draw(&mut out, &grid, "eller", None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("╔═╗"));
        assert!(text.contains("eller 1x1"));
        assert!(!text.contains("visited:"));
    }
}
