//! Errors raised by the maze library

use thiserror::Error;

use crate::game::State;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MazeError {
    #[error("unknown side `{0}`, expected one of top, bottom, left, right")]
    UnknownSide(String),
    #[error("a maze needs at least two cells, got {rows}x{columns}")]
    GridTooSmall { rows: usize, columns: usize },
    #[error("a {rows}x{columns} grid has more cells than can be counted")]
    GridTooLarge { rows: usize, columns: usize },
    #[error("start and finish can be at most {max} apart, {requested} requested")]
    UnreachableStartDistance { requested: usize, max: usize },
    #[error("line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },
    #[error("cannot {action} while the game is {state:?}")]
    InvalidState { action: &'static str, state: State },
}
