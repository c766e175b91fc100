//! Wandering monsters

use std::ops::Range;

use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::agent::{temptations, travel, Agent, Step};
use crate::grid::{Grid, Point, Side};
use crate::render::Occupant;

/// Autonomous agent that walks straight until something better turns up
///
/// A monster keeps its heading through corridors. When it passes a side
/// opening it turns into it with probability `curiosity`; when it runs into a
/// wall it picks a new heading among the open sides not blocked by other
/// monsters.
#[derive(Debug, Clone)]
pub struct Monster {
    id: usize,
    position: Point,
    heading: Option<Side>,
    curiosity: f64,
}

impl Monster {
    /// Range sampled for [Monster::curiosity]
    pub const CURIOSITY: Range<f64> = 0.2..1.2;

    pub fn new<R: Rng>(id: usize, position: Point, rng: &mut R) -> Self {
        Self::with_curiosity(id, position, rng.gen_range(Self::CURIOSITY))
    }

    pub fn with_curiosity(id: usize, position: Point, curiosity: f64) -> Self {
        Self {
            id,
            position,
            heading: None,
            curiosity,
        }
    }

    pub fn with_heading(mut self, heading: Side) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Chance of turning into a side opening; values of 1 or more always turn
    pub fn curiosity(&self) -> f64 {
        self.curiosity
    }

    /// Choose a new heading among the open sides whose neighbor holds none
    /// of the `monsters`. The heading becomes `None` when there is no choice.
    pub fn pick_heading<R: Rng>(&mut self, grid: &Grid, monsters: &[Point], rng: &mut R) -> Option<Side> {
        let options: Vec<Side> = Side::ALL
            .into_iter()
            .filter(|side| {
                grid.passable(self.position, *side)
                    .is_some_and(|to| !monsters.contains(&to))
            })
            .collect();
        self.heading = options.choose(rng).copied();
        self.heading
    }

    /// Move one cell, if possible.
    ///
    /// `monsters` holds the locations of every monster in the maze. Only a
    /// fresh heading avoids them; a monster keeping its heading may walk into
    /// a cell already taken.
    pub fn advance<R: Rng>(&mut self, grid: &Grid, monsters: &[Point], rng: &mut R) -> Option<Step> {
        let tempting = temptations(grid, self.position, self.heading);
        if !tempting.is_empty() && rng.gen::<f64>() < self.curiosity {
            self.heading = tempting.choose(rng).copied();
            debug!(id = self.id, at = %self.position, heading = ?self.heading, "tempted");
        }

        if let Some(side) = self.heading {
            if let Some(step) = travel(self, grid, side) {
                return Some(step);
            }
        }
        let side = self.pick_heading(grid, monsters, rng)?;
        travel(self, grid, side)
    }
}

impl Agent for Monster {
    fn position(&self) -> Point {
        self.position
    }

    fn heading(&self) -> Option<Side> {
        self.heading
    }

    fn occupant(&self) -> Occupant {
        Occupant::Monster {
            id: self.id,
            facing: self.heading,
        }
    }

    fn relocate(&mut self, step: &Step) {
        self.position = step.to;
        self.heading = Some(step.side);
    }
}
