//! Movement shared by everything that walks the maze

use crate::grid::{Grid, Point, Side};
use crate::render::Occupant;

/// A single move from one cell to its neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub from: Point,
    pub to: Point,
    pub side: Side,
}

/// Something occupying a cell of the maze
///
/// Agents only refer to cells by location; the grid owns the cells.
pub trait Agent {
    fn position(&self) -> Point;

    /// Direction of travel, `None` when standing still
    fn heading(&self) -> Option<Side>;

    /// How the agent is drawn
    fn occupant(&self) -> Occupant;

    /// Take a step that has already been checked against the walls
    fn relocate(&mut self, step: &Step);
}

/// Move `agent` through `side`.
///
/// Walls and the grid edge are not errors, the agent just stays put and
/// `None` is returned.
pub fn travel<A: Agent>(agent: &mut A, grid: &Grid, side: Side) -> Option<Step> {
    let from = agent.position();
    let to = grid.passable(from, side)?;
    let step = Step { from, to, side };
    agent.relocate(&step);
    Some(step)
}

/// Side openings an agent walks past when crossing `at` along `heading`.
///
/// A perpendicular side counts only if it is open and it looks like a real
/// opening: the cell behind or the cell ahead is walled on that side, or the
/// cell beside is a corridor running across the direction of travel.
pub fn temptations(grid: &Grid, at: Point, heading: Option<Side>) -> Vec<Side> {
    let Some(forward) = heading else {
        return Vec::new();
    };
    let cell = grid.cell(at);
    if cell.is_closed(forward) {
        return Vec::new();
    }
    let backward = forward.opposite();
    let behind = grid.neighbor(at, backward).map(|p| grid.cell(p));
    let ahead = grid.neighbor(at, forward).map(|p| grid.cell(p));

    forward
        .perpendicular()
        .into_iter()
        .filter(|side| !cell.is_closed(*side))
        .filter(|side| {
            if behind.is_some_and(|c| c.is_closed(*side)) || ahead.is_some_and(|c| c.is_closed(*side)) {
                return true;
            }
            if behind.is_none() || ahead.is_none() {
                return false;
            }
            grid.neighbor(at, *side)
                .map(|p| grid.cell(p))
                .is_some_and(|beside| beside.is_closed(forward) && beside.is_closed(backward))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Maze;

    struct Walker {
        at: Point,
        heading: Option<Side>,
    }

    impl Agent for Walker {
        fn position(&self) -> Point {
            self.at
        }

        fn heading(&self) -> Option<Side> {
            self.heading
        }

        fn occupant(&self) -> Occupant {
            Occupant::Person {
                facing: self.heading,
            }
        }

        fn relocate(&mut self, step: &Step) {
            self.at = step.to;
            self.heading = Some(step.side);
        }
    }

    fn corridor_with_side_opening() -> Maze {
        "
        +--+--+--+
        |S |  |E |
        +--+  +--+
        |        |
        +--+--+--+"
            .parse()
            .unwrap()
    }

    #[test]
    fn travel_refuses_walls_and_edges() {
        let maze = corridor_with_side_opening();
        let mut walker = Walker {
            at: Point::new(1, 0),
            heading: None,
        };
        assert_eq!(travel(&mut walker, maze.grid(), Side::Top), None);
        assert_eq!(travel(&mut walker, maze.grid(), Side::Left), None);
        assert_eq!(walker.position(), Point::new(1, 0));

        let step = travel(&mut walker, maze.grid(), Side::Right).unwrap();
        assert_eq!(step.from, Point::new(1, 0));
        assert_eq!(step.to, Point::new(1, 1));
        assert_eq!(walker.position(), Point::new(1, 1));
        assert_eq!(walker.heading(), Some(Side::Right));
    }

    #[test]
    fn passing_a_gap_is_tempting() {
        let maze = corridor_with_side_opening();
        let at = Point::new(1, 1);
        assert_eq!(temptations(maze.grid(), at, Some(Side::Right)), vec![Side::Top]);
        assert_eq!(temptations(maze.grid(), at, Some(Side::Left)), vec![Side::Top]);
    }

    #[test]
    fn nothing_tempts_without_heading_or_when_blocked() {
        let maze = corridor_with_side_opening();
        assert!(temptations(maze.grid(), Point::new(1, 1), None).is_empty());
        // Heading into the wall at the end of the corridor
        assert!(temptations(maze.grid(), Point::new(1, 2), Some(Side::Right)).is_empty());
        // No perpendicular openings here
        assert!(temptations(maze.grid(), Point::new(1, 0), Some(Side::Right)).is_empty());
    }

    #[test]
    fn open_room_is_not_tempting() {
        // In a 3x3 room every side is open, so there is no gap to notice
        let maze: Maze = "
            +--+--+--+
            |S       |
            +  +  +  +
            |        |
            +  +  +  +
            |      E |
            +--+--+--+"
            .parse()
            .unwrap();
        assert!(temptations(maze.grid(), Point::new(1, 1), Some(Side::Right)).is_empty());
    }

    #[test]
    fn crossing_tunnel_is_tempting() {
        // Walking down the middle column past a horizontal tunnel on the left:
        // behind and ahead are open on that side, but the cell beside is a
        // corridor crossing the path
        let maze: Maze = "
            +--+--+--+
            |S    |E |
            +--+  +  +
            |     |  |
            +--+  +  +
            |     |  |
            +--+--+--+"
            .parse()
            .unwrap();
        let at = Point::new(1, 1);
        assert_eq!(temptations(maze.grid(), at, Some(Side::Bottom)), vec![Side::Left]);
    }
}
