use std::{thread, time::Duration};

use rand::{Rng as _, SeedableRng as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    algorithms::{GeneratorKind, MazeGenerator, Params, Random},
    dims::Pos,
    grid::{Cell, Grid, GridError},
    progress::{Flag, ProgressSink, StepEvent, StepReporter},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("start position {0} is outside of the grid")]
    StartOutOfBounds(Pos),
    #[error("a generation is already in progress on this grid")]
    AlreadyGenerating,
}

/// Everything needed to run one generation, except the grid size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub generator: GeneratorKind,
    pub start: Option<Pos>,
    pub delay: Duration,
    pub seed: Option<u64>,
    pub params: Params,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GenerationState {
    NotStarted,
    Running,
    Paused,
    Finished,
}

/// Owns a grid and makes sure only one generation runs on it at a time.
#[derive(Debug)]
pub struct Driver {
    grid: Grid,
    in_progress: Flag,
}

impl Driver {
    pub fn new(rows: usize, cols: usize) -> Result<Self, GridError> {
        Ok(Self::from_grid(Grid::new(rows, cols)?))
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self {
            grid,
            in_progress: Flag::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn append_row(&mut self, cells: Vec<Cell>) -> Result<(), GridError> {
        self.grid.append_row(cells)
    }

    pub fn append_column(&mut self, cells: Vec<Cell>) -> Result<(), GridError> {
        self.grid.append_column(cells)
    }

    /// Handle to the in-progress flag, e.g. for a UI that disables its controls.
    pub fn in_progress(&self) -> Flag {
        self.in_progress.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.in_progress.is_set()
    }

    /// Resets the grid and prepares a generation. Nothing is carved until the first step.
    pub fn start(&mut self, config: &GenerationConfig) -> Result<Generation<'_>, ConfigError> {
        if let Some(start) = config.start {
            if !self.grid.is_in_bounds(start) {
                return Err(ConfigError::StartOutOfBounds(start));
            }
        }
        if !self.in_progress.try_set() {
            return Err(ConfigError::AlreadyGenerating);
        }

        self.grid.reset();

        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let generator = config
            .generator
            .build(&self.grid, config.start, &config.params);

        log::debug!(
            "Starting {} on {} grid, seed {}",
            generator.name(),
            self.grid.size(),
            seed
        );

        Ok(Generation {
            reporter: StepReporter::new(self.grid.cell_count()),
            grid: &mut self.grid,
            generator,
            rng: Random::seed_from_u64(seed),
            flag: self.in_progress.clone(),
            delay: config.delay,
            state: GenerationState::NotStarted,
        })
    }
}

/// A single generation in progress. Dropping it releases the grid.
pub struct Generation<'a> {
    grid: &'a mut Grid,
    generator: Box<dyn MazeGenerator>,
    rng: Random,
    reporter: StepReporter,
    flag: Flag,
    delay: Duration,
    state: GenerationState,
}

impl Generation<'_> {
    /// Grid as of the last finished step.
    pub fn grid(&self) -> &Grid {
        self.grid
    }

    pub fn state(&self) -> GenerationState {
        self.state
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    pub fn elapsed(&self) -> Duration {
        self.reporter.elapsed()
    }

    /// Advances the generation by one step and reports the resulting event.
    ///
    /// The first call only initializes the generator and emits the start event. Returns `None`
    /// once the generation is finished or while it is paused.
    pub fn step(
        &mut self,
        sink: &mut dyn ProgressSink,
    ) -> Result<Option<StepEvent>, GridError> {
        match self.state {
            GenerationState::Finished | GenerationState::Paused => Ok(None),
            GenerationState::NotStarted => {
                self.guarded(|gen| gen.generator.init(gen.grid, &mut gen.rng))?;
                self.state = GenerationState::Running;
                Ok(Some(self.reporter.start(sink)))
            }
            GenerationState::Running => {
                let step = self.guarded(|gen| gen.generator.step(gen.grid, &mut gen.rng))?;
                if step.is_done() {
                    self.state = GenerationState::Finished;
                    let event = self.reporter.finish(sink);
                    log::debug!(
                        "{} finished in {}ms",
                        self.generator.name(),
                        event.elapsed_millis
                    );
                    Ok(Some(event))
                } else {
                    Ok(Some(self.reporter.step(self.generator.progress(), sink)))
                }
            }
        }
    }

    /// Steps until the maze is done, sleeping the configured delay in between.
    /// Returns the last event, `None` if there was nothing left to do.
    pub fn run(&mut self, sink: &mut dyn ProgressSink) -> Result<Option<StepEvent>, GridError> {
        let mut last = None;
        while let Some(event) = self.step(sink)? {
            let done = event.is_done();
            last = Some(event);
            if done {
                break;
            }
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        Ok(last)
    }

    /// Stops the clock, no steps are taken until [`Generation::resume`].
    pub fn pause(&mut self) -> bool {
        if self.state != GenerationState::Running {
            return false;
        }
        self.state = GenerationState::Paused;
        self.reporter.pause();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != GenerationState::Paused {
            return false;
        }
        self.state = GenerationState::Running;
        self.reporter.resume();
        true
    }

    fn guarded<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, GridError>,
    ) -> Result<T, GridError> {
        f(self).map_err(|err| {
            log::error!("{} failed: {}", self.generator.name(), err);
            self.state = GenerationState::Finished;
            err
        })
    }
}

impl Iterator for Generation<'_> {
    type Item = Result<StepEvent, GridError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.step(&mut |_: &StepEvent| {}).transpose()
    }
}

impl Drop for Generation<'_> {
    fn drop(&mut self) {
        self.flag.clear();
    }
}
