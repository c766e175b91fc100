//! Cells, walls, and the lattice that holds them

use std::fmt;
use std::str::FromStr;

use petgraph::algo::{connected_components, has_path_connecting};
use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;

use crate::error::MazeError;

/// One of the four sides of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The two sides at right angles to this one
    pub fn perpendicular(self) -> [Side; 2] {
        match self {
            Side::Top | Side::Bottom => [Side::Left, Side::Right],
            Side::Left | Side::Right => [Side::Top, Side::Bottom],
        }
    }

    /// Keyboard mapping: `wasd` and the vi-ish `ijkl` cluster
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'w' | 'i' => Some(Side::Top),
            's' | 'k' => Some(Side::Bottom),
            'a' | 'j' => Some(Side::Left),
            'd' | 'l' => Some(Side::Right),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Top => 0,
            Side::Bottom => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }

    fn delta(self) -> (isize, isize) {
        match self {
            Side::Top => (-1, 0),
            Side::Bottom => (1, 0),
            Side::Left => (0, -1),
            Side::Right => (0, 1),
        }
    }
}

impl FromStr for Side {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(MazeError::UnknownSide(other.to_string())),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        };
        f.write_str(name)
    }
}

/// State of the boundary between two cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Wall {
    /// Not yet resolved by the generator
    #[default]
    Undecided,
    Open,
    Closed,
}

/// Location in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub row: usize,
    pub column: usize,
}

impl Point {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    pub fn manhattan_distance(&self, other: &Point) -> usize {
        self.row.abs_diff(other.row) + self.column.abs_diff(other.column)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    point: Point,
    walls: [Wall; 4],
    visited: bool,
}

impl Cell {
    fn new(point: Point) -> Self {
        Self {
            point,
            walls: [Wall::Undecided; 4],
            visited: false,
        }
    }

    pub fn point(&self) -> Point {
        self.point
    }

    pub fn wall(&self, side: Side) -> Wall {
        self.walls[side.index()]
    }

    pub fn is_closed(&self, side: Side) -> bool {
        self.wall(side) == Wall::Closed
    }

    /// Whether the generator has carved this cell
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn undecided_sides(&self) -> Vec<Side> {
        self.sides_with(Wall::Undecided)
    }

    pub fn open_sides(&self) -> Vec<Side> {
        self.sides_with(Wall::Open)
    }

    fn sides_with(&self, wall: Wall) -> Vec<Side> {
        Side::ALL
            .into_iter()
            .filter(|side| self.wall(*side) == wall)
            .collect()
    }
}

/// Row-major lattice of cells
///
/// Walls are stored on both cells sharing them; every mutation goes through
/// [Grid::set_wall], which keeps the two copies identical.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create a grid of undecided cells with the outer boundary sealed
    pub fn new(rows: usize, columns: usize) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..columns).map(move |column| Cell::new(Point::new(row, column))))
            .collect();
        let mut grid = Self {
            rows,
            columns,
            cells,
        };
        let points: Vec<Point> = grid.points().collect();
        for point in points {
            for side in grid.boundary_sides(point) {
                grid.set_wall(point, side, Wall::Closed);
            }
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, point: Point) -> Option<&Cell> {
        if point.row < self.rows && point.column < self.columns {
            self.cells.get(self.index(point))
        } else {
            None
        }
    }

    /// Cell at `point`.
    ///
    /// Panics if `point` lies outside the grid.
    pub fn cell(&self, point: Point) -> &Cell {
        match self.get(point) {
            Some(cell) => cell,
            None => panic!("{point} is outside the {}x{} grid", self.rows, self.columns),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.cells.iter().map(Cell::point)
    }

    /// Adjacent location across `side`, `None` at the grid boundary
    pub fn neighbor(&self, point: Point, side: Side) -> Option<Point> {
        let (dr, dc) = side.delta();
        let row = point.row.checked_add_signed(dr)?;
        let column = point.column.checked_add_signed(dc)?;
        (row < self.rows && column < self.columns).then(|| Point::new(row, column))
    }

    pub fn random_cell<R: Rng>(&self, rng: &mut R) -> Point {
        Point::new(rng.gen_range(0..self.rows), rng.gen_range(0..self.columns))
    }

    pub fn is_top_row(&self, point: Point) -> bool {
        point.row == 0
    }

    pub fn is_bottom_row(&self, point: Point) -> bool {
        point.row + 1 == self.rows
    }

    pub fn is_left_column(&self, point: Point) -> bool {
        point.column == 0
    }

    pub fn is_right_column(&self, point: Point) -> bool {
        point.column + 1 == self.columns
    }

    /// Sides of `point` lying on the outer edge of the grid
    pub fn boundary_sides(&self, point: Point) -> Vec<Side> {
        let mut sides = Vec::new();
        if self.is_top_row(point) {
            sides.push(Side::Top);
        }
        if self.is_bottom_row(point) {
            sides.push(Side::Bottom);
        }
        if self.is_left_column(point) {
            sides.push(Side::Left);
        }
        if self.is_right_column(point) {
            sides.push(Side::Right);
        }
        sides
    }

    /// Destination of a move through `side`, if the wall is open
    pub fn passable(&self, point: Point, side: Side) -> Option<Point> {
        if self.cell(point).wall(side) == Wall::Open {
            self.neighbor(point, side)
        } else {
            None
        }
    }

    /// Every cell carved and every wall resolved
    pub fn is_fully_carved(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.is_visited() && cell.undecided_sides().is_empty())
    }

    /// Undirected graph of the open passages
    ///
    /// Node weights are the cell locations; node `i` is the `i`th cell in
    /// row-major order.
    pub fn passage_graph(&self) -> UnGraph<Point, ()> {
        let mut graph = UnGraph::with_capacity(self.cells.len(), self.cells.len() * 2);
        for cell in &self.cells {
            graph.add_node(cell.point());
        }
        for cell in &self.cells {
            // Each passage is seen from both ends, keep only one
            for side in [Side::Bottom, Side::Right] {
                if let Some(other) = self.passable(cell.point(), side) {
                    graph.add_edge(self.node(cell.point()), self.node(other), ());
                }
            }
        }
        graph
    }

    /// Whether open passages join `from` and `to`
    pub fn connects(&self, from: Point, to: Point) -> bool {
        let graph = self.passage_graph();
        has_path_connecting(&graph, self.node(from), self.node(to), None)
    }

    /// Whether every cell can be reached from every other
    pub fn is_connected(&self) -> bool {
        connected_components(&self.passage_graph()) == 1
    }

    /// Set the wall on `side` of `point` and the matching wall of its
    /// neighbor. Returns the neighbor, if there is one.
    pub(crate) fn set_wall(&mut self, point: Point, side: Side, wall: Wall) -> Option<Point> {
        let index = self.index(point);
        self.cells[index].walls[side.index()] = wall;
        let other = self.neighbor(point, side)?;
        let index = self.index(other);
        self.cells[index].walls[side.opposite().index()] = wall;
        Some(other)
    }

    pub(crate) fn mark_visited(&mut self, point: Point) {
        let index = self.index(point);
        self.cells[index].visited = true;
    }

    #[cfg(test)]
    pub(crate) fn clear_visited(&mut self, point: Point) {
        let index = self.index(point);
        self.cells[index].visited = false;
    }

    fn index(&self, point: Point) -> usize {
        point.row * self.columns + point.column
    }

    fn node(&self, point: Point) -> NodeIndex {
        NodeIndex::new(self.index(point))
    }
}
