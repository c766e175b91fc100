//! Carve a maze, then escape it before the monsters find you
//!
//! A [Game] lays out a grid, digs a maze into it one cell at a time and
//! populates it with a player and wandering monsters. Everything visible is
//! reported through the [Render] trait; [render::Board] draws the maze as
//! text.
//!
//! # Examples
//! ```
//! use monster_maze::{Board, Configuration, Game, Pace, Signal, State};
//!
//! let config = Configuration {
//!     monsters: 3,
//!     min_start_distance: 6,
//!     seed: Some(2024),
//!     ..Configuration::square(6)
//! };
//! let mut game = Game::new(config, Board::new(6, 6)).unwrap();
//! game.start_generation(Pace::Fast).unwrap();
//! assert_eq!(game.generation_tick(), Some(Signal::GenerationComplete));
//! assert!(game.maze().is_solvable());
//! assert_eq!(game.monsters().len(), 3);
//!
//! game.begin_play().unwrap();
//! assert_eq!(game.state(), State::Exploring);
//! println!("{}", game.render());
//! ```
//!
//! Mazes can also be written by hand:
//! ```
//! use monster_maze::{Maze, Point};
//!
//! let maze: Maze = "
//!     +--+--+
//!     |S |  |
//!     +  +  +
//!     |   E |
//!     +--+--+"
//!     .parse()
//!     .unwrap();
//! assert_eq!(maze.finish(), Point::new(1, 1));
//! assert!(maze.is_solvable());
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod maze;
pub mod maze_generator;
pub mod monster;
pub mod player;
pub mod render;

pub use config::Configuration;
pub use error::MazeError;
pub use game::{Game, Pace, Signal, State};
pub use grid::{Point, Side, Wall};
pub use maze::Maze;
pub use render::{Board, NullRender, Render};
