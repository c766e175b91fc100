//! The avatar steered from the keyboard

use crate::agent::{self, Agent, Step};
use crate::grid::{Grid, Point, Side};
use crate::render::Occupant;

#[derive(Debug, Clone)]
pub struct Player {
    position: Point,
    heading: Option<Side>,
}

impl Player {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            heading: None,
        }
    }

    /// Move through `side` unless a wall is in the way
    pub fn travel(&mut self, grid: &Grid, side: Side) -> Option<Step> {
        agent::travel(self, grid, side)
    }
}

impl Agent for Player {
    fn position(&self) -> Point {
        self.position
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
        self.position = step.to;
        self.heading = Some(step.side);
    }
}
