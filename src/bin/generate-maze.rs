//! CLI for maze generation

use std::{io, thread, time::Duration};

use anyhow::{bail, ensure, Context};
use clap::Parser;
use monster_maze::{Board, Configuration, Game, Pace, Signal};
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, registry::Registry, EnvFilter};

/// Carve a maze and print it as text
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of rows
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Number of columns, same as rows if not given
    #[arg(long)]
    columns: Option<usize>,

    /// Minimum distance between start and finish
    #[arg(long, default_value_t = 16)]
    min_start_distance: usize,

    /// Monsters to place in the finished maze
    #[arg(long, default_value_t = 0)]
    monsters: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// How many times to try again after generation stalls
    #[arg(long, default_value_t = 3)]
    attempts: u64,

    /// Show the carving step by step on the terminal
    #[arg(short, long)]
    playback: bool,

    /// Playback frame length in milliseconds
    #[arg(short, long, default_value_t = 30)]
    frame_length: u64,
}

impl Args {
    fn configuration(&self, attempt: u64) -> Configuration {
        let rows = self.rows;
        Configuration {
            columns: self.columns.unwrap_or(rows),
            monsters: self.monsters,
            min_start_distance: self.min_start_distance,
            slow: self.playback,
            seed: self.seed.map(|seed| seed.wrapping_add(attempt)),
            ..Configuration::square(rows)
        }
    }
}

fn print_board(board: &Board) {
    print!("\x1B[2J\x1B[1;1H");
    println!("{}", board);
}

/// Generate a maze, print output
fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("off,monster_maze=info"))?;
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    Registry::default()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    for attempt in 0..args.attempts {
        let config = args.configuration(attempt);
        let board = Board::new(config.rows, config.columns);
        let mut game = Game::new(config, board).context("invalid maze settings")?;
        let pace = Pace::from_config(game.config());
        game.start_generation(pace)?;

        let signal = loop {
            if let Some(signal) = game.generation_tick() {
                break signal;
            }
            if args.playback {
                print_board(game.render());
                thread::sleep(Duration::from_millis(args.frame_length));
            }
        };

        match signal {
            Signal::GenerationComplete => {
                let maze = game.maze();
                ensure!(maze.is_solvable(), "finish cannot be reached from start");
                info!(
                    attempt,
                    start = %maze.start(),
                    finish = %maze.finish(),
                    connected = maze.grid().is_connected(),
                    "maze ready"
                );
                if args.playback {
                    print_board(game.render());
                } else {
                    println!("{}", game.render());
                }
                return Ok(());
            }
            other => warn!(attempt, ?other, "generation failed, trying again"),
        }
    }
    bail!("no maze after {} attempts", args.attempts)
}
