//! Maze generation
//!
//! Depth-first carving with a backtrack stack. Each newly visited cell opens
//! a random number of its undecided walls and seals the rest; when the stack
//! runs dry the generator looks for carved cells bordering unvisited ones and
//! tunnels through, until every cell has been carved.
//!
//! Generation is a plain state machine advanced by [MazeGenerator::step], so a
//! caller can draw between steps.

use rand::{seq::SliceRandom, Rng};
use tracing::{debug, error, info};

use crate::grid::{Grid, Point, Side, Wall};
use crate::maze::{Lifecycle, Maze};
use crate::render::Render;

/// Branchiness of one maze
///
/// Three nested thresholds decide how many walls a freshly carved cell opens:
/// a draw below the first gives 2, below the second 3, below the third 4,
/// anything else 1.
#[derive(Debug, Clone, PartialEq)]
pub struct HoleProfile {
    thresholds: [f64; 3],
}

impl HoleProfile {
    /// Fixed thresholds, which must be ascending
    pub fn new(t1: f64, t2: f64, t3: f64) -> Self {
        debug_assert!(t1 <= t2 && t2 <= t3, "thresholds must be ascending");
        Self {
            thresholds: [t1, t2, t3],
        }
    }

    /// Sample a profile, once per maze
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        let mut t1: f64 = rng.gen();
        // Two openings get an extra helping of probability
        t1 += (1.0 - t1) * rng.gen::<f64>();
        let t2 = t1 + (1.0 - t1) * rng.gen::<f64>();
        let t3 = t2 + (1.0 - t2) * rng.gen::<f64>();
        Self::new(t1, t2, t3)
    }

    pub fn thresholds(&self) -> [f64; 3] {
        self.thresholds
    }

    /// Number of openings wanted for the next carved cell
    pub fn hole_count<R: Rng>(&self, rng: &mut R) -> usize {
        let p: f64 = rng.gen();
        match self.thresholds.iter().position(|t| p < *t) {
            Some(i) => i + 2,
            None => 1,
        }
    }
}

/// Result of a generation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A cell was carved, more to come
    Carving,
    Complete,
    /// Gave up on an internal inconsistency
    Stalled,
}

/// Resumable maze carver
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    profile: HoleProfile,
    stack: Vec<Point>,
    seeded: bool,
    outcome: Option<Progress>,
}

impl MazeGenerator {
    pub fn new<R: Rng>(rng: &mut R) -> Self {
        Self::with_profile(HoleProfile::sample(rng))
    }

    pub fn with_profile(profile: HoleProfile) -> Self {
        Self {
            profile,
            stack: Vec::new(),
            seeded: false,
            outcome: None,
        }
    }

    pub fn profile(&self) -> &HoleProfile {
        &self.profile
    }

    /// Carve until one more cell has been visited, or until carving ends.
    ///
    /// Once [Progress::Complete] or [Progress::Stalled] is returned, further
    /// calls return the same value without touching the maze.
    pub fn step<G: Rng, R: Render>(
        &mut self,
        maze: &mut Maze,
        rng: &mut G,
        render: &mut R,
    ) -> Progress {
        if let Some(outcome) = self.outcome {
            return outcome;
        }

        if !self.seeded {
            self.seeded = true;
            maze.set_lifecycle(Lifecycle::Tunneling);
            let start = maze.start();
            self.knock_out_walls(maze.grid_mut(), start, rng, render);
            self.stack.push(start);
            return Progress::Carving;
        }

        loop {
            while let Some(&head) = self.stack.last() {
                if let Some(next) = pick_next_cell(maze.grid(), head, rng) {
                    self.knock_out_walls(maze.grid_mut(), next, rng, render);
                    self.stack.push(next);
                    return Progress::Carving;
                }
                self.stack.pop();
            }

            if maze.grid().cells().all(|cell| cell.is_visited()) {
                return self.conclude(maze, Progress::Complete);
            }

            let finish = maze.finish();
            if is_walled_in(maze.grid(), finish) {
                let sides: Vec<Side> = Side::ALL
                    .into_iter()
                    .filter(|side| maze.grid().neighbor(finish, *side).is_some())
                    .collect();
                let Some(&side) = sides.choose(rng) else {
                    error!(%finish, "finish has no neighbors");
                    return self.conclude(maze, Progress::Stalled);
                };
                debug!(%finish, %side, "breaking into walled-in finish");
                let grid = maze.grid_mut();
                resolve_wall(grid, finish, side, Wall::Open, render);
                grid.mark_visited(finish);
                render.visited(finish, true);
                continue;
            }

            // The walk left some region behind, tunnel into it from its edge
            let candidates = frontier(maze.grid());
            let Some(&candidate) = candidates.choose(rng) else {
                error!("no carved cell borders the unvisited ones");
                return self.conclude(maze, Progress::Stalled);
            };
            let sides = unvisited_sides(maze.grid(), candidate, |wall| wall != Wall::Open);
            let Some(&side) = sides.choose(rng) else {
                error!(%candidate, "could not find a way to connect start to finish");
                return self.conclude(maze, Progress::Stalled);
            };
            debug!(%candidate, %side, "tunneling into unvisited region");
            resolve_wall(maze.grid_mut(), candidate, side, Wall::Open, render);
            self.stack.push(candidate);
        }
    }

    /// Step until carving ends
    pub fn run<G: Rng, R: Render>(&mut self, maze: &mut Maze, rng: &mut G, render: &mut R) -> Progress {
        loop {
            match self.step(maze, rng, render) {
                Progress::Carving => continue,
                outcome => return outcome,
            }
        }
    }

    fn conclude(&mut self, maze: &mut Maze, outcome: Progress) -> Progress {
        self.outcome = Some(outcome);
        self.stack.clear();
        match outcome {
            Progress::Stalled => maze.set_lifecycle(Lifecycle::Stalled),
            _ => {
                info!(start = %maze.start(), finish = %maze.finish(), "maze carved");
                maze.set_lifecycle(Lifecycle::Ready)
            }
        }
        outcome
    }

    /// Mark `at` visited and resolve its undecided walls.
    ///
    /// Openings already present count towards the wanted number of holes.
    /// When exactly as many walls are undecided as holes are wanted, all of
    /// them open.
    fn knock_out_walls<G: Rng, R: Render>(
        &self,
        grid: &mut Grid,
        at: Point,
        rng: &mut G,
        render: &mut R,
    ) {
        let wanted = self.profile.hole_count(rng);
        grid.mark_visited(at);
        render.visited(at, true);

        let cell = grid.cell(at);
        let mut available = cell.undecided_sides();
        let mut holes = cell.open_sides().len();
        debug!(%at, wanted, available = available.len(), "carving");

        if available.len() == wanted {
            for side in available {
                resolve_wall(grid, at, side, Wall::Open, render);
            }
            return;
        }
        while !available.is_empty() && holes < wanted {
            let side = available.remove(rng.gen_range(0..available.len()));
            resolve_wall(grid, at, side, Wall::Open, render);
            holes += 1;
        }
        for side in available {
            resolve_wall(grid, at, side, Wall::Closed, render);
        }
    }
}

/// Set a wall on both of its cells and tell the renderer
fn resolve_wall<R: Render>(grid: &mut Grid, at: Point, side: Side, wall: Wall, render: &mut R) {
    render.wall(at, side, wall);
    if let Some(other) = grid.set_wall(at, side, wall) {
        render.wall(other, side.opposite(), wall);
    }
}

/// Random unvisited neighbor reachable through a wall that is not closed
fn pick_next_cell<G: Rng>(grid: &Grid, at: Point, rng: &mut G) -> Option<Point> {
    let sides = unvisited_sides(grid, at, |wall| wall != Wall::Closed);
    let side = sides.choose(rng)?;
    grid.neighbor(at, *side)
}

/// Sides of `at` leading to an unvisited neighbor through a wall accepted
/// by `through`
fn unvisited_sides(grid: &Grid, at: Point, through: impl Fn(Wall) -> bool) -> Vec<Side> {
    let cell = grid.cell(at);
    Side::ALL
        .into_iter()
        .filter(|side| through(cell.wall(*side)))
        .filter(|side| {
            grid.neighbor(at, *side)
                .is_some_and(|other| !grid.cell(other).is_visited())
        })
        .collect()
}

/// Unvisited cell closed off on every side
fn is_walled_in(grid: &Grid, at: Point) -> bool {
    let cell = grid.cell(at);
    !cell.is_visited() && Side::ALL.into_iter().all(|side| cell.is_closed(side))
}

/// Carved cells with at least one unvisited neighbor
fn frontier(grid: &Grid) -> Vec<Point> {
    grid.cells()
        .filter(|cell| cell.is_visited())
        .map(|cell| cell.point())
        .filter(|at| !unvisited_sides(grid, *at, |_| true).is_empty())
        .collect()
}
