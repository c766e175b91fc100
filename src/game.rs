//! One maze session: carving, then a chase
//!
//! [Game] owns the maze, the agents and the renderer. It never sleeps or
//! reads input itself; the host calls [Game::generation_tick] and
//! [Game::tick] at its own cadence and forwards key presses to
//! [Game::direction]. Terminal outcomes come back as [Signal]s.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::config::Configuration;
use crate::error::MazeError;
use crate::grid::{Point, Side};
use crate::maze::{Lifecycle, Maze};
use crate::maze_generator::{MazeGenerator, Progress};
use crate::monster::Monster;
use crate::player::Player;
use crate::render::{Mood, Occupant, Render};

/// Where a session is in its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Maze laid out, nothing carved yet
    Idle,
    Tunneling,
    /// Carved and populated, waiting for [Game::begin_play]
    Ready,
    Exploring,
    Paused,
    Dead,
    Escaped,
    /// Generation gave up, only [Game::reset] helps
    Stalled,
}

/// Notification raised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    GenerationComplete,
    GenerationStalled,
    PlayerEscaped,
    PlayerCaught,
}

/// How much carving happens per [Game::generation_tick]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    /// One cell per tick
    Slow,
    /// Everything in the first tick
    Fast,
}

impl Pace {
    pub fn from_config(config: &Configuration) -> Self {
        if config.slow {
            Pace::Slow
        } else {
            Pace::Fast
        }
    }
}

pub struct Game<R: Render> {
    config: Configuration,
    rng: StdRng,
    render: R,
    maze: Maze,
    generator: Option<MazeGenerator>,
    pace: Pace,
    player: Option<Player>,
    monsters: Vec<Monster>,
    state: State,
}

impl<R: Render> Game<R> {
    /// Lay out a fresh, uncarved maze
    pub fn new(config: Configuration, mut render: R) -> Result<Self, MazeError> {
        let mut rng = seeded_rng(&config);
        let maze = Maze::new(&config, &mut rng, &mut render)?;
        Ok(Self {
            pace: Pace::from_config(&config),
            config,
            rng,
            render,
            maze,
            generator: None,
            player: None,
            monsters: Vec::new(),
            state: State::Idle,
        })
    }

    /// Assemble a session from a maze and agents placed by hand. The whole
    /// board is drawn to `render`.
    ///
    /// A fully carved maze is ready to play. Otherwise the session starts
    /// idle, the agents are dropped, and carving picks up where the maze
    /// left off.
    pub fn from_parts(
        config: Configuration,
        maze: Maze,
        player: Point,
        monsters: Vec<Monster>,
        render: R,
    ) -> Self {
        let carved = maze.lifecycle() == Lifecycle::Ready;
        let mut game = Self {
            rng: seeded_rng(&config),
            pace: Pace::from_config(&config),
            config,
            render,
            maze,
            generator: None,
            player: carved.then(|| Player::new(player)),
            monsters: if carved { monsters } else { Vec::new() },
            state: if carved { State::Ready } else { State::Idle },
        };
        game.redraw();
        game
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }

    /// Begin carving; progress is made by [Game::generation_tick]
    pub fn start_generation(&mut self, pace: Pace) -> Result<(), MazeError> {
        self.require(State::Idle, "start generation")?;
        self.generator = Some(MazeGenerator::new(&mut self.rng));
        self.pace = pace;
        self.state = State::Tunneling;
        info!(?pace, "tunneling");
        Ok(())
    }

    /// Carve some more. Returns a signal once carving has ended.
    pub fn generation_tick(&mut self) -> Option<Signal> {
        if self.state != State::Tunneling {
            return None;
        }
        let generator = self.generator.as_mut()?;
        let progress = match self.pace {
            Pace::Slow => generator.step(&mut self.maze, &mut self.rng, &mut self.render),
            Pace::Fast => generator.run(&mut self.maze, &mut self.rng, &mut self.render),
        };
        match progress {
            Progress::Carving => None,
            Progress::Complete => {
                self.generator = None;
                self.place_agents();
                self.state = State::Ready;
                Some(Signal::GenerationComplete)
            }
            Progress::Stalled => {
                self.generator = None;
                self.state = State::Stalled;
                warn!("generation stalled, reset to try again");
                Some(Signal::GenerationStalled)
            }
        }
    }

    pub fn begin_play(&mut self) -> Result<(), MazeError> {
        self.require(State::Ready, "begin play")?;
        self.state = State::Exploring;
        info!("exploring");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), MazeError> {
        self.require(State::Exploring, "pause")?;
        self.state = State::Paused;
        debug!("paused");
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), MazeError> {
        self.require(State::Paused, "resume")?;
        self.state = State::Exploring;
        debug!("resumed");
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<(), MazeError> {
        match self.state {
            State::Paused => self.resume(),
            _ => self.pause(),
        }
    }

    /// Move the player one cell.
    ///
    /// Ignored unless exploring. Walking into a wall does nothing; walking
    /// into a monster gets the player caught, reaching the finish ends the
    /// game as escaped.
    pub fn direction(&mut self, side: Side) -> Option<Signal> {
        if self.state != State::Exploring {
            return None;
        }
        let (step, occupant) = {
            let player = self.player.as_mut()?;
            let step = player.travel(self.maze.grid(), side)?;
            (step, player.occupant())
        };
        debug!(from = %step.from, to = %step.to, "player moved");
        self.vacate(step.from);
        self.render.occupy(step.to, occupant);

        if self.monsters.iter().any(|monster| monster.position() == step.to) {
            Some(self.caught(step.to))
        } else if step.to == self.maze.finish() {
            Some(self.escaped(step.to))
        } else {
            None
        }
    }

    /// Move every monster once, in order, then check for a catch
    pub fn tick(&mut self) -> Option<Signal> {
        if self.state != State::Exploring {
            return None;
        }
        let target = self.player.as_ref()?.position();

        let mut hit = false;
        for index in 0..self.monsters.len() {
            let occupied: Vec<Point> = self.monsters.iter().map(Monster::position).collect();
            let Some(step) =
                self.monsters[index].advance(self.maze.grid(), &occupied, &mut self.rng)
            else {
                continue;
            };
            let occupant = self.monsters[index].occupant();
            self.vacate(step.from);
            self.render.occupy(step.to, occupant);
            hit |= step.to == target;
        }

        hit.then(|| self.caught(target))
    }

    /// Throw the session away and lay out a new maze with the same settings
    pub fn reset(&mut self) -> Result<(), MazeError> {
        self.generator = None;
        self.player = None;
        self.monsters.clear();
        self.maze = Maze::new(&self.config, &mut self.rng, &mut self.render)?;
        self.pace = Pace::from_config(&self.config);
        self.state = State::Idle;
        info!("reset");
        Ok(())
    }

    /// Send the complete board to the renderer again
    pub fn redraw(&mut self) {
        let grid = self.maze.grid();
        self.render.reset(grid.rows(), grid.columns());
        for cell in grid.cells() {
            self.render.visited(cell.point(), cell.is_visited());
            for side in Side::ALL {
                self.render.wall(cell.point(), side, cell.wall(side));
            }
        }
        for point in [self.maze.start(), self.maze.finish()] {
            self.render.restore(point, self.maze.landmark(point));
        }
        for monster in &self.monsters {
            self.render.occupy(monster.position(), monster.occupant());
        }
        if let Some(player) = &self.player {
            let occupant = match self.state {
                State::Dead => Occupant::Splat,
                _ => player.occupant(),
            };
            self.render.occupy(player.position(), occupant);
        }
    }

    fn require(&self, state: State, action: &'static str) -> Result<(), MazeError> {
        if self.state == state {
            return Ok(());
        }
        warn!(action, state = ?self.state, "command rejected");
        Err(MazeError::InvalidState {
            action,
            state: self.state,
        })
    }

    /// Player on the start, monsters on distinct carved cells away from it
    fn place_agents(&mut self) {
        let start = self.maze.start();
        let player = Player::new(start);
        self.render.occupy(start, player.occupant());
        self.player = Some(player);

        let mut available: Vec<Point> = self
            .maze
            .grid()
            .cells()
            .filter(|cell| cell.is_visited() && cell.point() != start)
            .map(|cell| cell.point())
            .collect();
        self.monsters.clear();
        for id in 0..self.config.monsters {
            if available.is_empty() {
                warn!(placed = id, wanted = self.config.monsters, "out of room for monsters");
                break;
            }
            let at = available.swap_remove(self.rng.gen_range(0..available.len()));
            let mut monster = Monster::new(id, at, &mut self.rng);
            let occupied: Vec<Point> = self.monsters.iter().map(Monster::position).collect();
            monster.pick_heading(self.maze.grid(), &occupied, &mut self.rng);
            self.render.occupy(at, monster.occupant());
            self.monsters.push(monster);
        }
        info!(monsters = self.monsters.len(), "agents placed");
    }

    /// Redraw a cell someone just left
    fn vacate(&mut self, at: Point) {
        self.render.restore(at, self.maze.landmark(at));
        if let Some(monster) = self.monsters.iter().find(|monster| monster.position() == at) {
            self.render.occupy(at, monster.occupant());
        } else if let Some(player) = self.player.as_ref().filter(|player| player.position() == at) {
            self.render.occupy(at, player.occupant());
        }
    }

    fn caught(&mut self, at: Point) -> Signal {
        self.state = State::Dead;
        self.render.occupy(at, Occupant::Splat);
        self.render.message(at, "Oh, noes!", Mood::Bad);
        info!(%at, "caught");
        Signal::PlayerCaught
    }

    fn escaped(&mut self, at: Point) -> Signal {
        self.state = State::Escaped;
        self.render.message(at, "w00t!", Mood::Good);
        info!(%at, "escaped");
        Signal::PlayerEscaped
    }
}

fn seeded_rng(config: &Configuration) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Board, NullRender};

    fn corridor() -> Maze {
        "
        +--+--+--+--+
        |S        E |
        +--+--+--+--+"
            .parse()
            .unwrap()
    }

    fn quiet_config() -> Configuration {
        Configuration {
            rows: 1,
            columns: 4,
            monsters: 0,
            min_start_distance: 3,
            seed: Some(5),
            ..Configuration::default()
        }
    }

    fn playing<R: Render>(maze: Maze, player: Point, monsters: Vec<Monster>, render: R) -> Game<R> {
        let mut game = Game::from_parts(quiet_config(), maze, player, monsters, render);
        game.begin_play().unwrap();
        game
    }

    fn position(game: &Game<impl Render>) -> Point {
        game.player().unwrap().position()
    }

    #[test]
    fn fast_generation_populates_the_maze() {
        let config = Configuration {
            monsters: 5,
            min_start_distance: 6,
            seed: Some(3),
            ..Configuration::square(8)
        };
        let mut game = Game::new(config, NullRender).unwrap();
        assert_eq!(game.state(), State::Idle);
        game.start_generation(Pace::Fast).unwrap();
        assert_eq!(game.generation_tick(), Some(Signal::GenerationComplete));
        assert_eq!(game.state(), State::Ready);
        assert_eq!(game.maze().lifecycle(), Lifecycle::Ready);

        let start = game.maze().start();
        assert_eq!(position(&game), start);
        let mut spots: Vec<Point> = game.monsters().iter().map(Monster::position).collect();
        assert_eq!(spots.len(), 5);
        assert!(spots.iter().all(|spot| *spot != start));
        assert!(spots.iter().all(|spot| game.maze().grid().cell(*spot).is_visited()));
        spots.sort_by_key(|p| (p.row, p.column));
        spots.dedup();
        assert_eq!(spots.len(), 5);

        // Nothing left to carve
        assert_eq!(game.generation_tick(), None);
    }

    #[test]
    fn slow_generation_takes_many_ticks() {
        let config = Configuration {
            monsters: 2,
            min_start_distance: 4,
            seed: Some(8),
            ..Configuration::square(5)
        };
        let mut game = Game::new(config, NullRender).unwrap();
        game.start_generation(Pace::Slow).unwrap();
        let mut ticks = 1;
        while game.generation_tick().is_none() {
            assert_eq!(game.state(), State::Tunneling);
            ticks += 1;
        }
        assert_eq!(game.state(), State::Ready);
        assert!(ticks >= 25);
    }

    #[test]
    fn commands_out_of_order_are_rejected() {
        let mut game = Game::new(quiet_config(), NullRender).unwrap();
        assert_eq!(
            game.begin_play(),
            Err(MazeError::InvalidState {
                action: "begin play",
                state: State::Idle
            })
        );
        assert!(game.pause().is_err());
        assert_eq!(game.tick(), None);
        assert_eq!(game.direction(Side::Right), None);

        game.start_generation(Pace::Fast).unwrap();
        assert!(game.start_generation(Pace::Fast).is_err());
    }

    #[test]
    fn walking_into_a_wall_does_nothing() {
        let mut game = playing(corridor(), Point::new(0, 0), Vec::new(), NullRender);
        assert_eq!(game.direction(Side::Top), None);
        assert_eq!(game.direction(Side::Left), None);
        assert_eq!(position(&game), Point::new(0, 0));
        assert_eq!(game.state(), State::Exploring);
    }

    #[test]
    fn reaching_the_finish_escapes_once() {
        let mut game = playing(corridor(), Point::new(0, 0), Vec::new(), NullRender);
        assert_eq!(game.direction(Side::Right), None);
        assert_eq!(game.direction(Side::Right), None);
        assert_eq!(game.direction(Side::Right), Some(Signal::PlayerEscaped));
        assert_eq!(game.state(), State::Escaped);

        assert_eq!(game.direction(Side::Left), None);
        assert_eq!(game.tick(), None);
        assert_eq!(position(&game), Point::new(0, 3));
    }

    #[test]
    fn monster_catches_player_once() {
        let monster = Monster::with_curiosity(0, Point::new(0, 1), 0.0).with_heading(Side::Left);
        let mut game = playing(corridor(), Point::new(0, 0), vec![monster], Board::new(1, 4));

        assert_eq!(game.tick(), Some(Signal::PlayerCaught));
        assert_eq!(game.state(), State::Dead);
        assert_eq!(game.monsters()[0].position(), Point::new(0, 0));
        let notice = game.render().notice().unwrap();
        assert_eq!(notice.text, "Oh, noes!");
        assert_eq!(notice.mood, Mood::Bad);
        assert_eq!(game.render().lines()[1], "|**       E |");

        let before: Vec<Point> = game.monsters().iter().map(Monster::position).collect();
        for _ in 0..5 {
            assert_eq!(game.tick(), None);
        }
        let after: Vec<Point> = game.monsters().iter().map(Monster::position).collect();
        assert_eq!(before, after);
        assert_eq!(game.direction(Side::Right), None);
    }

    #[test]
    fn walking_into_a_monster_is_fatal() {
        let monster = Monster::with_curiosity(0, Point::new(0, 1), 0.0);
        let mut game = playing(corridor(), Point::new(0, 0), vec![monster], NullRender);
        assert_eq!(game.direction(Side::Right), Some(Signal::PlayerCaught));
        assert_eq!(game.state(), State::Dead);
    }

    #[test]
    fn pause_freezes_everything() {
        let monster = Monster::with_curiosity(0, Point::new(0, 3), 0.0).with_heading(Side::Left);
        let mut game = playing(corridor(), Point::new(0, 0), vec![monster], NullRender);

        game.toggle_pause().unwrap();
        assert_eq!(game.state(), State::Paused);
        for _ in 0..3 {
            assert_eq!(game.tick(), None);
        }
        assert_eq!(game.direction(Side::Right), None);
        assert_eq!(game.monsters()[0].position(), Point::new(0, 3));
        assert_eq!(position(&game), Point::new(0, 0));

        game.toggle_pause().unwrap();
        assert_eq!(game.state(), State::Exploring);
        assert_eq!(game.tick(), None);
        assert_eq!(game.monsters()[0].position(), Point::new(0, 2));
    }

    #[test]
    fn board_follows_the_player() {
        let mut game = playing(corridor(), Point::new(0, 0), Vec::new(), Board::new(1, 4));
        assert_eq!(game.render().lines()[1], "|@        E |");
        game.direction(Side::Right);
        assert_eq!(game.render().lines()[1], "|S  @     E |");
        game.direction(Side::Right);
        game.direction(Side::Right);
        assert_eq!(game.render().lines()[1], "|S        @ |");
        assert_eq!(game.render().notice().unwrap().text, "w00t!");
    }

    #[test]
    fn monsters_only_use_open_walls() {
        let config = Configuration {
            monsters: 6,
            min_start_distance: 8,
            seed: Some(21),
            ..Configuration::square(10)
        };
        let mut game = Game::new(config, NullRender).unwrap();
        game.start_generation(Pace::Fast).unwrap();
        assert_eq!(game.generation_tick(), Some(Signal::GenerationComplete));
        game.begin_play().unwrap();

        let mut previous: Vec<Point> = game.monsters().iter().map(Monster::position).collect();
        for _ in 0..300 {
            let signal = game.tick();
            let current: Vec<Point> = game.monsters().iter().map(Monster::position).collect();
            for (from, to) in previous.iter().zip(&current) {
                let legal = from == to
                    || Side::ALL
                        .into_iter()
                        .any(|side| game.maze().grid().passable(*from, side) == Some(*to));
                assert!(legal, "monster jumped {} -> {}", from, to);
            }
            previous = current;
            if signal.is_some() {
                assert_eq!(signal, Some(Signal::PlayerCaught));
                assert_eq!(game.state(), State::Dead);
                break;
            }
        }
    }

    /// Carved cell on the right is cut off from the start, yet its only wall
    /// towards the uncarved corner is already open
    fn dead_end_maze() -> Maze {
        "
        +--+--+
        |S |  |
        +  +  +
        |E  ░░|
        +--+--+"
            .parse()
            .unwrap()
    }

    #[test]
    fn stalled_generation_waits_for_reset() {
        let config = Configuration {
            rows: 2,
            columns: 2,
            monsters: 1,
            min_start_distance: 1,
            seed: Some(4),
            ..Configuration::default()
        };
        let mut game = Game::from_parts(config, dead_end_maze(), Point::new(0, 0), Vec::new(), NullRender);
        assert_eq!(game.state(), State::Idle);
        assert!(game.player().is_none());

        game.start_generation(Pace::Fast).unwrap();
        assert_eq!(game.generation_tick(), Some(Signal::GenerationStalled));
        assert_eq!(game.state(), State::Stalled);
        assert_eq!(game.maze().lifecycle(), Lifecycle::Stalled);
        assert_eq!(game.generation_tick(), None);
        assert_eq!(
            game.begin_play(),
            Err(MazeError::InvalidState {
                action: "begin play",
                state: State::Stalled
            })
        );
        assert!(game.start_generation(Pace::Fast).is_err());

        game.reset().unwrap();
        assert_eq!(game.state(), State::Idle);
        assert_eq!(game.maze().lifecycle(), Lifecycle::Idle);
        game.start_generation(Pace::Fast).unwrap();
        assert_eq!(game.generation_tick(), Some(Signal::GenerationComplete));
        assert_eq!(game.monsters().len(), 1);
    }

    #[test]
    fn reset_discards_the_session() {
        let config = Configuration {
            monsters: 3,
            min_start_distance: 4,
            seed: Some(13),
            ..Configuration::square(6)
        };
        let mut game = Game::new(config, Board::new(6, 6)).unwrap();
        game.start_generation(Pace::Fast).unwrap();
        game.generation_tick();
        game.begin_play().unwrap();

        game.reset().unwrap();
        assert_eq!(game.state(), State::Idle);
        assert!(game.player().is_none());
        assert!(game.monsters().is_empty());
        assert_eq!(game.maze().lifecycle(), Lifecycle::Idle);
        assert!(!game.maze().grid().cells().any(|cell| cell.is_visited()));
        assert!(game.render().lines()[1].contains("░░"));
    }
}
