use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};
use tracing::{error, info, warn};

use crate::{
    config,
    core::{Simulation, StepContext},
    render,
    settings::Settings,
    types::{BodySnapshot, Viewport},
};

type Term = Terminal<CrosstermBackend<Stdout>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    KeyPress,
    MouseButton,
    PointerMoved,
}

/// Decides when user input should end the screensaver.
#[derive(Debug)]
pub struct ExitMonitor {
    started: Instant,
    grace: Duration,
    min_distance: u16,
    last_pointer: Option<(u16, u16)>,
}

impl ExitMonitor {
    pub fn new(started: Instant, grace: Duration, min_distance: u16) -> Self {
        Self {
            started,
            grace,
            min_distance,
            last_pointer: None,
        }
    }

    pub fn observe(&mut self, event: &Event, now: Instant) -> Option<ExitReason> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(ExitReason::KeyPress),
            Event::Paste(_) => Some(ExitReason::KeyPress),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(_) => Some(ExitReason::MouseButton),
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    self.pointer_moved(mouse.column, mouse.row, now)
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn pointer_moved(&mut self, column: u16, row: u16, now: Instant) -> Option<ExitReason> {
        let (last_col, last_row) = self.last_pointer.replace((column, row))?;
        if now.saturating_duration_since(self.started) <= self.grace {
            return None;
        }
        let moved = column.abs_diff(last_col) > self.min_distance
            || row.abs_diff(last_row) > self.min_distance;
        moved.then_some(ExitReason::PointerMoved)
    }
}

/// Counts frames and reports a rate about once a second.
#[derive(Debug)]
struct FpsMeter {
    frames: u32,
    since: Instant,
    fps: f64,
}

impl FpsMeter {
    fn new(now: Instant) -> Self {
        Self {
            frames: 0,
            since: now,
            fps: 0.0,
        }
    }

    fn tick(&mut self, now: Instant) {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.since);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f64 / elapsed.as_secs_f64();
            self.frames = 0;
            self.since = now;
        }
    }
}

pub fn run(settings: Settings) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &settings);
    teardown_terminal(&mut terminal);

    let reason = result?;
    info!(?reason, "screensaver closed");
    Ok(())
}

/// Takes over the terminal. Whatever already succeeded is undone if a later
/// step fails.
fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(err) = enter_screen(&mut stdout) {
        restore_raw_mode();
        return Err(err).context("failed to enter alternate screen");
    }
    match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(mut terminal) => {
            if let Err(err) = terminal.hide_cursor() {
                warn!(?err, "failed to hide cursor");
            }
            Ok(terminal)
        }
        Err(err) => {
            leave_screen(&mut io::stdout());
            restore_raw_mode();
            Err(err).context("failed to build terminal backend")
        }
    }
}

fn teardown_terminal(terminal: &mut Term) {
    if let Err(err) = terminal.show_cursor() {
        error!(?err, "failed to show cursor");
    }
    restore_raw_mode();
    leave_screen(terminal.backend_mut());
}

fn enter_screen(out: &mut impl Write) -> io::Result<()> {
    let entered = execute!(out, EnterAlternateScreen, EnableMouseCapture);
    if entered.is_err() {
        leave_screen(out);
    }
    entered
}

fn leave_screen(out: &mut impl Write) {
    if let Err(err) = execute!(out, DisableMouseCapture, LeaveAlternateScreen) {
        error!(?err, "failed to leave alternate screen");
    }
}

fn restore_raw_mode() {
    if let Err(err) = disable_raw_mode() {
        error!(?err, "failed to disable raw mode");
    }
}

fn run_loop(terminal: &mut Term, settings: &Settings) -> Result<ExitReason> {
    let frame_interval = Duration::from_secs_f64(1.0 / settings.fps);
    let (canvas_area, _) = split(terminal.size()?, settings.show_stats);
    let viewport = render::viewport_for(canvas_area);
    let sim = match settings.seed {
        Some(seed) => Simulation::with_seed(settings.sim.clone(), viewport, seed),
        None => Simulation::new(settings.sim.clone(), viewport),
    }
    .context("cannot start simulation in this terminal")?;

    let started = Instant::now();
    let mut state = UiState {
        sim,
        snapshot: Vec::with_capacity(settings.sim.body_count + 1),
        paused: false,
        fps: FpsMeter::new(started),
    };
    let mut exit = ExitMonitor::new(
        started,
        Duration::from_secs_f64(config::EXIT_DELAY_SECS),
        config::MIN_POINTER_DISTANCE,
    );
    let mut last_tick: Option<Instant> = None;

    loop {
        let now = Instant::now();
        let dt = last_tick.map_or(frame_interval, |last| now - last);
        last_tick = Some(now);

        let (canvas_area, stats_area) = split(terminal.size()?, settings.show_stats);
        state.advance(render::viewport_for(canvas_area), dt)?;
        state.fps.tick(now);
        terminal.draw(|frame| state.draw(frame, settings, canvas_area, stats_area))?;

        let next_frame = now + frame_interval;
        loop {
            let timeout = next_frame.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            let event = event::read()?;
            if let Some(reason) = exit.observe(&event, Instant::now()) {
                return Ok(reason);
            }
        }
    }
}

/// Canvas area plus an optional one-line stats footer.
fn split(area: Rect, show_stats: bool) -> (Rect, Option<Rect>) {
    if !show_stats || area.height < 2 {
        return (area, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    (chunks[0], Some(chunks[1]))
}

struct UiState {
    sim: Simulation,
    snapshot: Vec<BodySnapshot>,
    paused: bool,
    fps: FpsMeter,
}

impl UiState {
    /// Steps the simulation against the current terminal size. Pauses while the
    /// terminal cannot hold the largest body and reseeds once it can again.
    fn advance(&mut self, viewport: Viewport, dt: Duration) -> Result<()> {
        if !self.sim.config().fits(viewport) {
            if !self.paused {
                warn!(
                    width = viewport.width,
                    height = viewport.height,
                    "terminal too small, pausing"
                );
                self.paused = true;
            }
            return Ok(());
        }
        if self.paused {
            self.sim.restart(viewport)?;
            self.paused = false;
        }
        self.sim.step(StepContext { viewport, dt });
        self.sim.snapshot(&mut self.snapshot);
        Ok(())
    }

    fn draw(
        &self,
        frame: &mut Frame,
        settings: &Settings,
        canvas_area: Rect,
        stats_area: Option<Rect>,
    ) {
        if self.paused {
            let notice = Paragraph::new("terminal too small")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray).bg(Color::Black));
            frame.render_widget(notice, canvas_area);
        } else {
            frame.render_widget(
                render::canvas(&self.snapshot, self.sim.viewport(), settings.style),
                canvas_area,
            );
        }

        if let Some(area) = stats_area {
            let stats = self.sim.stats();
            let line = format!(
                "frame {} | bodies {} | collisions {} | wall hits {} | fps {:.1}",
                stats.frame, stats.bodies, stats.collisions, stats.wall_hits, self.fps.fps
            );
            let footer =
                Paragraph::new(line).style(Style::default().fg(Color::Gray).bg(Color::Black));
            frame.render_widget(footer, area);
        }
    }
}
