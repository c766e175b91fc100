//! A grid with a way in and a way out

use std::str::FromStr;

use rand::{seq::SliceRandom, Rng};
use tracing::info;

use crate::config::Configuration;
use crate::error::MazeError;
use crate::grid::{Grid, Point, Side, Wall};
use crate::render::{Landmark, Occupant, Render};

/// Generation progress of a maze
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Walls undecided, nothing carved yet
    Idle,
    Tunneling,
    /// Carving finished, every cell reachable from the start
    Ready,
    /// Carving stopped on an internal inconsistency, retry with a new maze
    Stalled,
}

/// Representation of the maze: its grid plus start and finish
#[derive(Debug, Clone)]
pub struct Maze {
    grid: Grid,
    start: Point,
    finish: Point,
    lifecycle: Lifecycle,
}

impl Maze {
    /// Lay out an uncarved maze.
    ///
    /// The start is a random cell that has some cell at least
    /// `config.min_start_distance` away; the finish is a random one of those
    /// (and never the start itself). The renderer receives the sealed boundary, the unused
    /// cells and both landmarks.
    pub fn new<G: Rng, R: Render>(
        config: &Configuration,
        rng: &mut G,
        render: &mut R,
    ) -> Result<Self, MazeError> {
        config.validate()?;

        let grid = Grid::new(config.rows, config.columns);
        render.reset(grid.rows(), grid.columns());
        for cell in grid.cells() {
            render.visited(cell.point(), false);
            for side in Side::ALL {
                if cell.is_closed(side) {
                    render.wall(cell.point(), side, Wall::Closed);
                }
            }
        }

        let distance = config.min_start_distance.max(1);
        let unreachable = || MazeError::UnreachableStartDistance {
            requested: config.min_start_distance,
            max: config.max_start_distance(),
        };
        let starts: Vec<Point> = grid
            .points()
            .filter(|point| farthest_distance(&grid, *point) >= distance)
            .collect();
        let start = *starts.choose(rng).ok_or_else(unreachable)?;
        let finishes: Vec<Point> = grid
            .points()
            .filter(|point| point.manhattan_distance(&start) >= distance)
            .collect();
        let finish = *finishes.choose(rng).ok_or_else(unreachable)?;
        render.occupy(start, Occupant::Landmark(Landmark::Start));
        render.occupy(finish, Occupant::Landmark(Landmark::Finish));
        info!(%start, %finish, rows = grid.rows(), columns = grid.columns(), "new maze");

        Ok(Self {
            grid,
            start,
            finish,
            lifecycle: Lifecycle::Idle,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn finish(&self) -> Point {
        self.finish
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Landmark drawn at `point` when nobody stands there
    pub fn landmark(&self, point: Point) -> Option<Landmark> {
        if point == self.start {
            Some(Landmark::Start)
        } else if point == self.finish {
            Some(Landmark::Finish)
        } else {
            None
        }
    }

    /// Whether open passages lead from start to finish
    pub fn is_solvable(&self) -> bool {
        self.grid.connects(self.start, self.finish)
    }

    pub(crate) fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }
}

/// Distance from `point` to the farthest cell, always a corner
fn farthest_distance(grid: &Grid, point: Point) -> usize {
    let rows = grid.rows().saturating_sub(1);
    let columns = grid.columns().saturating_sub(1);
    point.row.max(rows - point.row) + point.column.max(columns - point.column)
}

/// Parse the text picture drawn by [crate::render::Board].
///
/// `S ` and `E ` mark start and finish, exactly one of each. Cells drawn as `░░` stay unvisited,
/// every other cell counts as carved. The outer boundary must be closed.
impl FromStr for Maze {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<Vec<char>> = s.trim().lines().map(|l| l.trim().chars().collect()).collect();

        let parse_error = |line: usize, column: usize, message: &str| MazeError::Parse {
            line: line + 1,
            column: column + 1,
            message: message.to_string(),
        };

        if lines.len() < 3 || lines.len() % 2 == 0 {
            return Err(parse_error(0, 0, "expected an odd number of lines, at least 3"));
        }
        let width = lines[0].len();
        if width < 4 || (width - 1) % 3 != 0 {
            return Err(parse_error(0, 0, "line width must be 3 * columns + 1"));
        }
        if let Some(y) = lines.iter().position(|l| l.len() != width) {
            return Err(parse_error(y, 0, "all lines must have the same width"));
        }

        let rows = (lines.len() - 1) / 2;
        let columns = (width - 1) / 3;
        let mut grid = Grid::new(rows, columns);
        let mut start = None;
        let mut finish = None;

        for row in 0..=rows {
            let y = row * 2;
            if let Some(column) = (0..=columns).find(|column| lines[y][column * 3] != '+') {
                return Err(parse_error(y, column * 3, "expected `+` corner"));
            }
            for column in 0..columns {
                let x = column * 3 + 1;
                let wall = match (lines[y][x], lines[y][x + 1]) {
                    ('-', '-') => Wall::Closed,
                    (' ', ' ') => Wall::Open,
                    ('.', '.') => Wall::Undecided,
                    _ => return Err(parse_error(y, x, "unexpected horizontal wall")),
                };
                let (point, side) = if row < rows {
                    (Point::new(row, column), Side::Top)
                } else {
                    (Point::new(rows - 1, column), Side::Bottom)
                };
                if grid.boundary_sides(point).contains(&side) {
                    if wall != Wall::Closed {
                        return Err(parse_error(y, x, "outer wall must be closed"));
                    }
                } else {
                    grid.set_wall(point, side, wall);
                }
            }
        }

        for row in 0..rows {
            let y = row * 2 + 1;
            for column in 0..=columns {
                let x = column * 3;
                let wall = match lines[y][x] {
                    '|' => Wall::Closed,
                    ' ' => Wall::Open,
                    '.' => Wall::Undecided,
                    _ => return Err(parse_error(y, x, "unexpected vertical wall")),
                };
                if column == 0 || column == columns {
                    if wall != Wall::Closed {
                        return Err(parse_error(y, x, "outer wall must be closed"));
                    }
                    continue;
                }
                grid.set_wall(Point::new(row, column), Side::Left, wall);
            }

            for column in 0..columns {
                let x = column * 3 + 1;
                let point = Point::new(row, column);
                match (lines[y][x], lines[y][x + 1]) {
                    ('S', ' ') if start.is_some() => {
                        return Err(parse_error(y, x, "second start in maze"))
                    }
                    ('E', ' ') if finish.is_some() => {
                        return Err(parse_error(y, x, "second finish in maze"))
                    }
                    ('S', ' ') => start = Some(point),
                    ('E', ' ') => finish = Some(point),
                    ('░', '░') => continue,
                    (' ', ' ') | ('@', ' ') | ('M', ' ') | ('*', '*') => (),
                    _ => return Err(parse_error(y, x, "unexpected cell content")),
                }
                grid.mark_visited(point);
            }
        }

        let start = start.ok_or_else(|| parse_error(0, 0, "start not found in maze"))?;
        let finish = finish.ok_or_else(|| parse_error(0, 0, "finish not found in maze"))?;
        let lifecycle = if grid.is_fully_carved() {
            Lifecycle::Ready
        } else {
            Lifecycle::Idle
        };
        Ok(Self {
            grid,
            start,
            finish,
            lifecycle,
        })
    }
}
