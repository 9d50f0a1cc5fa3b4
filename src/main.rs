mod logging;
mod renderer;
mod settings;

use std::{
    io::{self, stdout, Write},
    thread,
    time::Duration,
};

use clap::Parser;
use crossterm::{cursor, execute};
use mazecore::{
    algorithms::{GeneratorKind, UnknownGeneratorError},
    dims::Pos,
    driver::{ConfigError, Driver, Generation, GenerationConfig},
    grid::GridError,
    progress::{LogSink, Phase, ProgressSink, StepEvent},
};
use settings::{Settings, SettingsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    UnknownGenerator(#[from] UnknownGeneratorError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Logger(#[from] log::SetLoggerError),
}

fn parse_pos(s: &str) -> Result<Pos, String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<usize>()
            .map_err(|err| format!("invalid coordinate '{}': {}", v, err))
    };
    Ok(Pos::new(parse(row)?, parse(col)?))
}

#[derive(Parser, Debug)]
#[clap(version, about, name = "mazegen")]
struct Args {
    #[clap(long, help = "Number of rows")]
    rows: Option<usize>,
    #[clap(long, help = "Number of columns")]
    cols: Option<usize>,
    #[clap(
        short,
        long,
        help = "depth-first, kruskal, aldous-broder, wilson or eller"
    )]
    algorithm: Option<GeneratorKind>,
    #[clap(long, value_parser = parse_pos, value_name = "ROW,COL", help = "Starting cell")]
    start: Option<Pos>,
    #[clap(short, long, value_name = "MS", help = "Delay between steps in milliseconds")]
    delay: Option<u64>,
    #[clap(long, help = "Seed of the random generator")]
    seed: Option<u64>,
    #[clap(long, action, help = "Only print the finished maze")]
    no_animate: bool,
    #[clap(short, long, action = clap::ArgAction::Count, help = "More logging, can be repeated")]
    verbose: u8,
    #[clap(short, long, action, help = "Reset config to default and quit")]
    reset_config: bool,
    #[clap(short, long, action, help = "Show config path and quit")]
    show_config_path: bool,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();
    logging::init(args.verbose)?;

    let settings_path = Settings::default_path()?;

    if args.reset_config {
        Settings::reset_config(&settings_path)?;
        return Ok(());
    }

    if args.show_config_path {
        if let Some(s) = settings_path.to_str() {
            println!("{}", s);
        } else {
            println!("{:?}", settings_path);
        }
        return Ok(());
    }

    better_panic::install();

    let settings = Settings::load(&settings_path)?;
    let mut config = settings.generation_config()?;
    if let Some(algorithm) = args.algorithm {
        config.generator = algorithm;
    }
    config.start = args.start.or(config.start);
    config.seed = args.seed.or(config.seed);
    if let Some(delay) = args.delay {
        config.delay = Duration::from_millis(delay);
    }
    if config.start.is_some() && !config.generator.uses_start() {
        log::warn!("{} ignores the start position", config.generator);
    }

    let mut driver = Driver::new(
        args.rows.unwrap_or(settings.rows),
        args.cols.unwrap_or(settings.cols),
    )?;

    // start and finish go to the log, the rest is only drawn
    let mut log_sink = LogSink;
    let mut sink = |event: &StepEvent| {
        if event.phase != Phase::Running {
            log_sink.report(event);
        }
    };

    let mut out = stdout();
    if args.no_animate {
        print_finished(&mut driver, &config, &mut sink, &mut out)?;
        return Ok(());
    }

    if !renderer::fits_terminal(driver.grid()) {
        log::warn!("Maze doesn't fit into the terminal");
    }

    let mut generation = driver.start(&config)?;
    execute!(out, cursor::Hide)?;
    let result = animate(&mut generation, &mut sink, &mut out, config.delay);
    execute!(out, cursor::Show)?;
    result
}

/// Generates without any delay and draws only the finished maze with its final status.
fn print_finished(
    driver: &mut Driver,
    config: &GenerationConfig,
    sink: &mut dyn ProgressSink,
    out: &mut impl Write,
) -> Result<Option<StepEvent>, AppError> {
    let config = GenerationConfig {
        delay: Duration::ZERO,
        ..config.clone()
    };
    let mut generation = driver.start(&config)?;
    let last = generation.run(sink)?;
    renderer::draw(
        out,
        generation.grid(),
        generation.generator_name(),
        last.as_ref(),
    )?;
    Ok(last)
}

fn animate(
    generation: &mut Generation<'_>,
    sink: &mut dyn ProgressSink,
    out: &mut impl Write,
    delay: Duration,
) -> Result<(), AppError> {
    while let Some(event) = generation.step(sink)? {
        renderer::draw(
            out,
            generation.grid(),
            generation.generator_name(),
            Some(&event),
        )?;
        if event.is_done() {
            break;
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    Ok(())
}
