//! The display side of the maze
//!
//! The core never draws anything itself. Every visible change (a wall
//! resolved, a cell carved, an agent stepping) is reported to a [Render]
//! implementation, which owns the presentation.

use std::fmt;

use itertools::Itertools;

use crate::grid::{Point, Side, Wall};

/// Fixed markers of a maze
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    Start,
    Finish,
}

/// Whatever currently sits in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupant {
    Landmark(Landmark),
    /// The player, facing the side it last moved through
    Person { facing: Option<Side> },
    Monster { id: usize, facing: Option<Side> },
    /// Remains of a caught player
    Splat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Good,
    Bad,
}

/// Display collaborator
pub trait Render {
    /// Forget the previous board and prepare an empty one
    fn reset(&mut self, _rows: usize, _columns: usize) {}

    fn wall(&mut self, at: Point, side: Side, wall: Wall);

    /// Mark a cell carved (`true`) or unused (`false`)
    fn visited(&mut self, at: Point, visited: bool);

    fn occupy(&mut self, at: Point, occupant: Occupant);

    /// Return a cell to its unoccupied appearance. Calling this twice is the
    /// same as calling it once.
    fn restore(&mut self, at: Point, landmark: Option<Landmark>);

    /// Show a message anchored at a cell
    fn message(&mut self, _at: Point, _text: &str, _mood: Mood) {}
}

/// Renderer that draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRender;

impl Render for NullRender {
    fn wall(&mut self, _at: Point, _side: Side, _wall: Wall) {}
    fn visited(&mut self, _at: Point, _visited: bool) {}
    fn occupy(&mut self, _at: Point, _occupant: Occupant) {}
    fn restore(&mut self, _at: Point, _landmark: Option<Landmark>) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub at: Point,
    pub text: String,
    pub mood: Mood,
}

#[derive(Debug, Clone, Default)]
struct Tile {
    walls: [Wall; 4],
    visited: bool,
    occupant: Option<Occupant>,
}

/// Text picture of the maze, built purely from render calls
///
/// Each cell is two characters wide, framed by `+` corners, `--`/`|`
/// closed walls, blanks for open walls and `.` for undecided ones. Unused
/// cells are shaded. The same layout is read back by `Maze::from_str`.
#[derive(Debug, Clone)]
pub struct Board {
    rows: usize,
    columns: usize,
    tiles: Vec<Tile>,
    notice: Option<Notice>,
}

impl Board {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            tiles: vec![Tile::default(); rows * columns],
            notice: None,
        }
    }

    /// Latest message, if any
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn lines(&self) -> Vec<String> {
        if self.rows == 0 || self.columns == 0 {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(self.rows * 2 + 1);
        for row in 0..self.rows {
            lines.push(self.horizontal(row, Side::Top));
            lines.push(self.body(row));
        }
        lines.push(self.horizontal(self.rows - 1, Side::Bottom));
        lines
    }

    fn horizontal(&self, row: usize, side: Side) -> String {
        let segments = (0..self.columns).map(|column| {
            match self.tile(Point::new(row, column)).walls[side.index()] {
                Wall::Closed => "--",
                Wall::Open => "  ",
                Wall::Undecided => "..",
            }
        });
        format!("+{}+", segments.format("+"))
    }

    fn body(&self, row: usize) -> String {
        let mut line = String::with_capacity(self.columns * 3 + 1);
        for column in 0..self.columns {
            let tile = self.tile(Point::new(row, column));
            line.push(vertical(tile.walls[Side::Left.index()]));
            line.push_str(glyph(tile));
        }
        let last = self.tile(Point::new(row, self.columns - 1));
        line.push(vertical(last.walls[Side::Right.index()]));
        line
    }

    fn tile(&self, at: Point) -> &Tile {
        &self.tiles[at.row * self.columns + at.column]
    }

    fn tile_mut(&mut self, at: Point) -> Option<&mut Tile> {
        if at.row < self.rows && at.column < self.columns {
            self.tiles.get_mut(at.row * self.columns + at.column)
        } else {
            None
        }
    }
}

fn vertical(wall: Wall) -> char {
    match wall {
        Wall::Closed => '|',
        Wall::Open => ' ',
        Wall::Undecided => '.',
    }
}

fn glyph(tile: &Tile) -> &'static str {
    match tile.occupant {
        Some(Occupant::Landmark(Landmark::Start)) => "S ",
        Some(Occupant::Landmark(Landmark::Finish)) => "E ",
        Some(Occupant::Person { .. }) => "@ ",
        Some(Occupant::Monster { .. }) => "M ",
        Some(Occupant::Splat) => "**",
        None if tile.visited => "  ",
        None => "░░",
    }
}

impl Render for Board {
    fn reset(&mut self, rows: usize, columns: usize) {
        *self = Board::new(rows, columns);
    }

    fn wall(&mut self, at: Point, side: Side, wall: Wall) {
        if let Some(tile) = self.tile_mut(at) {
            tile.walls[side.index()] = wall;
        }
    }

    fn visited(&mut self, at: Point, visited: bool) {
        if let Some(tile) = self.tile_mut(at) {
            tile.visited = visited;
        }
    }

    fn occupy(&mut self, at: Point, occupant: Occupant) {
        if let Some(tile) = self.tile_mut(at) {
            tile.occupant = Some(occupant);
        }
    }

    fn restore(&mut self, at: Point, landmark: Option<Landmark>) {
        if let Some(tile) = self.tile_mut(at) {
            tile.occupant = landmark.map(Occupant::Landmark);
        }
    }

    fn message(&mut self, at: Point, text: &str, mood: Mood) {
        self.notice = Some(Notice {
            at,
            text: text.to_string(),
            mood,
        });
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lines().iter().join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_board_is_unused_and_undecided() {
        let board = Board::new(1, 2);
        assert_eq!(board.lines(), vec!["+..+..+", ".░░.░░.", "+..+..+"]);
    }

    #[test]
    fn draws_walls_and_occupants() {
        let mut board = Board::new(1, 2);
        for column in 0..2 {
            let at = Point::new(0, column);
            board.visited(at, true);
            board.wall(at, Side::Top, Wall::Closed);
            board.wall(at, Side::Bottom, Wall::Closed);
        }
        board.wall(Point::new(0, 0), Side::Left, Wall::Closed);
        board.wall(Point::new(0, 0), Side::Right, Wall::Open);
        board.wall(Point::new(0, 1), Side::Left, Wall::Open);
        board.wall(Point::new(0, 1), Side::Right, Wall::Closed);
        board.occupy(Point::new(0, 0), Occupant::Landmark(Landmark::Start));
        board.occupy(
            Point::new(0, 1),
            Occupant::Monster {
                id: 0,
                facing: None,
            },
        );

        assert_eq!(board.to_string(), "+--+--+\n|S  M |\n+--+--+");

        board.restore(Point::new(0, 1), None);
        board.restore(Point::new(0, 1), None);
        assert_eq!(board.lines()[1], "|S    |");
    }

    #[test]
    fn keeps_latest_message() {
        let mut board = Board::new(2, 2);
        board.message(Point::new(1, 1), "w00t!", Mood::Good);
        let notice = board.notice().unwrap();
        assert_eq!(notice.text, "w00t!");
        assert_eq!(notice.mood, Mood::Good);
        assert_eq!(notice.at, Point::new(1, 1));
    }
}
