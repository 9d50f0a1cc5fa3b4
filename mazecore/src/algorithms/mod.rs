mod aldous_broder;
mod depth_first_search;
mod eller;
mod params;
mod rnd_kruskals;
mod wilson;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    dims::Pos,
    grid::{Grid, GridError},
};

pub use aldous_broder::AldousBroder;
pub use depth_first_search::DepthFirstSearch;
pub use eller::Eller;
pub use params::Params;
pub use rnd_kruskals::RndKruskals;
pub use wilson::{LoopErasedPath, Wilson};

/// Random number generator used for anything, where determinism is required.
pub type Random = rand_xoshiro::Xoshiro256StarStar;

/// Outcome of a single generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Done,
}

impl Step {
    pub fn is_done(self) -> bool {
        self == Step::Done
    }
}

/// A maze generation algorithm, driven one step at a time.
///
/// Grid state is only mutated inside [`MazeGenerator::init`] and [`MazeGenerator::step`], so the
/// grid is structurally consistent between calls.
pub trait MazeGenerator: fmt::Debug + Send {
    fn name(&self) -> &'static str;

    /// Prepares the run, e.g. marks the starting cell.
    fn init(&mut self, _grid: &mut Grid, _rng: &mut Random) -> Result<(), GridError> {
        Ok(())
    }

    /// Performs one unit of work: one wall removal, one union, one walk move or one row.
    fn step(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<Step, GridError>;

    /// Number of cells considered done so far.
    fn progress(&self) -> usize;

    /// Runs the generator to completion without any reporting.
    fn run(&mut self, grid: &mut Grid, rng: &mut Random) -> Result<(), GridError> {
        self.init(grid, rng)?;
        while !self.step(grid, rng)?.is_done() {}
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown generator '{0}', expected one of: depth-first, kruskal, aldous-broder, wilson, eller")]
pub struct UnknownGeneratorError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
    #[default]
    DepthFirst,
    Kruskal,
    AldousBroder,
    Wilson,
    Eller,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 5] = [
        GeneratorKind::DepthFirst,
        GeneratorKind::Kruskal,
        GeneratorKind::AldousBroder,
        GeneratorKind::Wilson,
        GeneratorKind::Eller,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GeneratorKind::DepthFirst => "depth-first",
            GeneratorKind::Kruskal => "kruskal",
            GeneratorKind::AldousBroder => "aldous-broder",
            GeneratorKind::Wilson => "wilson",
            GeneratorKind::Eller => "eller",
        }
    }

    /// Whether the configured start cell affects this algorithm.
    pub fn uses_start(&self) -> bool {
        !matches!(self, GeneratorKind::Kruskal | GeneratorKind::Eller)
    }

    /// Creates a fresh generator for `grid`.
    ///
    /// `start` is ignored by Kruskal and Eller. Aldous-Broder and Wilson pick a random cell when
    /// it's `None`, depth-first search starts in the top left corner.
    pub fn build(&self, grid: &Grid, start: Option<Pos>, params: &Params) -> Box<dyn MazeGenerator> {
        match self {
            GeneratorKind::DepthFirst => Box::new(DepthFirstSearch::new(start.unwrap_or(Pos::ZERO))),
            GeneratorKind::Kruskal => Box::new(RndKruskals::new(grid)),
            GeneratorKind::AldousBroder => Box::new(AldousBroder::new(grid, start)),
            GeneratorKind::Wilson => Box::new(Wilson::new(grid, start)),
            GeneratorKind::Eller => Box::new(Eller::new(grid, params)),
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GeneratorKind {
    type Err = UnknownGeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        GeneratorKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .or(match normalized.as_str() {
                "dfs" | "backtracker" => Some(GeneratorKind::DepthFirst),
                "ab" => Some(GeneratorKind::AldousBroder),
                _ => None,
            })
            .ok_or_else(|| UnknownGeneratorError(s.to_string()))
    }
}
