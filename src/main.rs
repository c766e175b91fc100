//! Terminal front end: carve a maze, then run from the monsters

use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use itertools::Itertools;
use monster_maze::render::Mood;
use monster_maze::{Board, Configuration, Game, MazeError, Pace, Side, Signal, State};
use tracing_subscriber::{prelude::*, registry::Registry, EnvFilter};

const FRAME_TIME: Duration = Duration::from_millis(16);

/// Escape the maze before the monsters get you
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of rows
    #[arg(long, default_value_t = 40)]
    rows: usize,

    /// Number of columns, same as rows if not given
    #[arg(long)]
    columns: Option<usize>,

    /// Number of monsters
    #[arg(short, long, default_value_t = 10)]
    monsters: usize,

    /// Milliseconds between monster moves
    #[arg(short, long, default_value_t = 250)]
    speed: u64,

    /// Minimum distance between start and finish
    #[arg(long, default_value_t = 16)]
    min_start_distance: usize,

    /// Milliseconds between carving steps when tunneling slowly
    #[arg(long, default_value_t = 10)]
    tunnel_speed: u64,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn configuration(&self) -> Configuration {
        let rows = self.rows;
        Configuration {
            columns: self.columns.unwrap_or(rows),
            monsters: self.monsters,
            speed: Duration::from_millis(self.speed),
            min_start_distance: self.min_start_distance,
            seed: self.seed,
            ..Configuration::square(rows)
        }
    }
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    NewMaze,
    Tunnel(Pace),
    Go,
    Pause,
    Move(Side),
}

fn command(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('n') => Some(Command::NewMaze),
        KeyCode::Char('t') => Some(Command::Tunnel(Pace::Slow)),
        KeyCode::Char('f') => Some(Command::Tunnel(Pace::Fast)),
        KeyCode::Char('g') => Some(Command::Go),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(Command::Pause),
        KeyCode::Up => Some(Command::Move(Side::Top)),
        KeyCode::Down => Some(Command::Move(Side::Bottom)),
        KeyCode::Left => Some(Command::Move(Side::Left)),
        KeyCode::Right => Some(Command::Move(Side::Right)),
        KeyCode::Char(key) => Side::from_key(key).map(Command::Move),
        _ => None,
    }
}

/// Session state owned by the frame loop
struct Session {
    game: Game<Board>,
    pace: Pace,
    hint: String,
}

impl Session {
    fn apply(&mut self, command: Command) -> Result<(), MazeError> {
        match command {
            Command::Quit => Ok(()),
            Command::NewMaze => self.game.reset(),
            Command::Tunnel(pace) => {
                if self.game.state() != State::Idle && self.game.state() != State::Tunneling {
                    self.game.reset()?;
                }
                self.pace = pace;
                self.game.start_generation(pace)
            }
            Command::Go => self.game.begin_play(),
            Command::Pause => self.game.toggle_pause(),
            Command::Move(side) => {
                if let Some(signal) = self.game.direction(side) {
                    self.signal(signal)?;
                }
                Ok(())
            }
        }
    }

    fn signal(&mut self, signal: Signal) -> Result<(), MazeError> {
        match signal {
            Signal::GenerationComplete => self.hint = "g to go".to_string(),
            Signal::GenerationStalled => {
                self.game.reset()?;
                self.game.start_generation(self.pace)?;
            }
            Signal::PlayerEscaped | Signal::PlayerCaught => self.hint = "n for a new maze".to_string(),
        }
        Ok(())
    }

    /// Advance whatever runs on its own
    fn tick(&mut self) -> Result<(), MazeError> {
        let signal = match self.game.state() {
            State::Tunneling => self.game.generation_tick(),
            State::Exploring => self.game.tick(),
            _ => None,
        };
        match signal {
            Some(signal) => self.signal(signal),
            None => Ok(()),
        }
    }

    fn cadence(&self, tunnel_speed: Duration) -> Duration {
        match self.game.state() {
            State::Tunneling => tunnel_speed,
            _ => self.game.config().speed,
        }
    }
}

/// Draws the board, repainting only the lines that changed
#[derive(Default)]
struct Painter {
    last: Vec<String>,
    last_hud: String,
    last_notice: String,
    origin: (u16, u16),
    needs_full: bool,
}

impl Painter {
    fn paint(&mut self, stdout: &mut Stdout, session: &Session) -> io::Result<()> {
        let board = session.game.render();
        let lines = board.lines();
        let needed_w = lines.first().map_or(0, |line| line.chars().count()) as u16;
        let needed_h = lines.len() as u16 + 2;

        stdout.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin = ((term_w - needed_w) / 2, (term_h - needed_h) / 2 + 1);
        if origin != self.origin || lines.len() != self.last.len() {
            self.origin = origin;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
            self.last = vec![String::new(); lines.len()];
        }
        let (x, y) = self.origin;

        let hud = format!(
            "{:?}  monsters: {}  {}  (n new, t tunnel, f fast, g go, p pause, q quit)",
            session.game.state(),
            session.game.monsters().len(),
            session.hint,
        );
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(0, y - 1))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for (row, line) in lines.iter().enumerate() {
            if self.last[row] == *line {
                continue;
            }
            stdout.queue(MoveTo(x, y + row as u16))?;
            for (color, run) in &line.chars().chunk_by(|c| color_for(*c)) {
                stdout.queue(SetForegroundColor(color))?;
                stdout.queue(Print(run.collect::<String>()))?;
            }
            stdout.queue(ResetColor)?;
            self.last[row].clone_from(line);
        }

        let (notice, color) = match board.notice() {
            Some(notice) if notice.mood == Mood::Good => (notice.text.clone(), Color::Green),
            Some(notice) => (notice.text.clone(), Color::Red),
            None => (String::new(), Color::White),
        };
        if self.needs_full || notice != self.last_notice {
            stdout.queue(MoveTo(x, y + lines.len() as u16))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(SetForegroundColor(color))?;
            stdout.queue(Print(&notice))?;
            stdout.queue(ResetColor)?;
            self.last_notice = notice;
        }
        self.needs_full = false;

        stdout.flush()
    }
}

fn color_for(c: char) -> Color {
    match c {
        '@' => Color::Yellow,
        'M' | '*' => Color::Red,
        'S' | 'E' => Color::Green,
        '░' | '.' => Color::DarkGrey,
        _ => Color::Blue,
    }
}

fn run(stdout: &mut Stdout, args: &Args) -> anyhow::Result<()> {
    let config = args.configuration();
    let board = Board::new(config.rows, config.columns);
    let mut session = Session {
        game: Game::new(config, board)?,
        pace: Pace::Slow,
        hint: "t or f to carve".to_string(),
    };
    let tunnel_speed = Duration::from_millis(args.tunnel_speed);
    let mut painter = Painter::default();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match command(key.code) {
                Some(Command::Quit) => return Ok(()),
                Some(command) => {
                    if let Err(err) = session.apply(command) {
                        session.hint = err.to_string();
                    }
                }
                None => {}
            }
        }

        if last_tick.elapsed() >= session.cadence(tunnel_speed) {
            last_tick = Instant::now();
            session.tick()?;
        }
        painter.paint(stdout, &session)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_TIME {
            thread::sleep(FRAME_TIME - elapsed);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.configuration().validate()?;

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("off"))?;
    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(io::stderr);
    Registry::default()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &args);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}
