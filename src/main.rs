use std::{
    io::{self, stdout, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use blockfall::board::CellState;
use blockfall::config::{
    DriverConfig, GameConfig, GRID_HEIGHT, GRID_WIDTH, RELEASE_TIMEOUT_MS, REPEAT_MS, TICK_MS,
};
use blockfall::driver::{Command, Driver};
use blockfall::game::{Game, GameEvent, GameSnapshot, GameState};
use blockfall::high_score::{HighScore, HighScoreStore};
use blockfall::shape::TetrominoType;
use blockfall::spawner::{PieceProvider, RandomPieceProvider};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "blockfall")]
#[command(about = "Falling-block puzzle game for the terminal")]
struct Cli {
    /// Board width in columns
    #[arg(long, default_value_t = GRID_WIDTH)]
    width: usize,
    /// Board height in rows
    #[arg(long, default_value_t = GRID_HEIGHT)]
    height: usize,
    /// Gravity period in milliseconds
    #[arg(long, default_value_t = TICK_MS)]
    tick_ms: u64,
    /// Repeat period for held keys in milliseconds
    #[arg(long, default_value_t = REPEAT_MS)]
    repeat_ms: u64,
    /// Seed for a reproducible piece sequence
    #[arg(long)]
    seed: Option<u64>,
    /// Where the high score is kept
    #[arg(long)]
    high_score_file: Option<PathBuf>,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const INFO_WIDTH: u16 = 18;

// ============================================================================
// Color Mapping
// ============================================================================

fn tetromino_color(t: TetrominoType) -> Color {
    match t {
        TetrominoType::I => Color::Cyan,
        TetrominoType::O => Color::Yellow,
        TetrominoType::T => Color::Magenta,
        TetrominoType::S => Color::Green,
        TetrominoType::Z => Color::Red,
        TetrominoType::L => Color::Rgb(255, 165, 0),
        TetrominoType::J => Color::Blue,
    }
}

// ============================================================================
// App
// ============================================================================

#[derive(Debug, Default)]
struct Session {
    pieces_locked: u32,
    games_played: u32,
}

struct App {
    driver: Driver,
    high_score: HighScore,
    store: HighScoreStore,
    save_error: Option<String>,
    session: Session,
}

impl App {
    /// Drains engine events and persists a beaten high score.
    fn after_step(&mut self) {
        for event in self.driver.take_events() {
            match event {
                GameEvent::PieceLocked => self.session.pieces_locked += 1,
                GameEvent::GameStarted => self.session.games_played += 1,
                _ => {}
            }
        }

        if self.high_score.observe(self.driver.game().score()) {
            self.save_error = self
                .store
                .save(self.high_score.best())
                .err()
                .map(|err| format!("{:#}", anyhow::Error::new(err)));
        }
    }
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

fn command_for(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::MoveRight),
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Command::Rotate),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::SoftDrop),
        KeyCode::Char(' ') => Some(Command::HardDrop),
        _ => None,
    }
}

fn handle_press(app: &mut App, code: KeyCode) -> Flow {
    match code {
        // Always allow quit
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => return Flow::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') => app.driver.toggle_pause(),
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
            // Start or restart only from the title or game-over screen
            if app.driver.game().state() != GameState::Running {
                app.driver.press(Command::Reset);
            }
        }
        _ => {
            if let Some(command) = command_for(code) {
                app.driver.press(command);
            }
        }
    }
    Flow::Continue
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, app: &App) {
    let area = frame.size();
    let snapshot = app.driver.snapshot();

    match snapshot.state {
        GameState::Ready => render_title(frame, app, area),
        GameState::Running => {
            render_game(frame, app, &snapshot, area);
            if app.driver.is_paused() {
                render_paused(frame, area);
            }
        }
        GameState::GameOver => {
            render_game(frame, app, &snapshot, area);
            render_game_over(frame, app, &snapshot, area);
        }
    }
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("BLOCKFALL", Style::default().fg(Color::Cyan))),
        Line::from(""),
        Line::from(format!("High Score: {}", app.high_score.best())),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, centered_rect(30, 10, area));
}

fn render_game(frame: &mut Frame, app: &App, snapshot: &GameSnapshot, area: Rect) {
    let columns = snapshot.cells.first().map_or(0, Vec::len) as u16;
    let grid_display_width = (columns * CELL_WIDTH) + 2;
    let grid_display_height = snapshot.cells.len() as u16 + 2;
    let total_width = grid_display_width + INFO_WIDTH;
    let total_height = grid_display_height + 2;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(INFO_WIDTH),
    ])
    .split(game_row);

    render_grid(frame, snapshot, horizontal[0]);
    render_info(frame, app, snapshot, horizontal[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→/AD: Move | ↑/W: Rotate | ↓/S: Drop | Space: Hard drop | P: Pause | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = snapshot
        .cells
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(piece_type) => Span::styled(
                        BLOCK_CHAR,
                        Style::default().fg(tetromino_color(*piece_type)),
                    ),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, app: &App, snapshot: &GameSnapshot, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Green))),
        Line::from(format!("{}", snapshot.score)),
        Line::from(""),
        Line::from(Span::styled("High Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", app.high_score.best())),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", snapshot.lines_cleared)),
    ];

    if app.save_error.is_some() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "High score",
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(Span::styled(
            "not saved",
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, app: &App, snapshot: &GameSnapshot, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", snapshot.score)),
        Line::from(format!("High Score: {}", app.high_score.best())),
        Line::from(""),
        Line::from(Span::styled(
            "Press R to restart",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 11, area);
    frame.render_widget(paragraph, popup_area);
}

fn render_paused(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to continue",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(24, 10, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn run(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let mut last_step = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, app))?;

        // Wake for whichever comes first: gravity or a held-key repeat
        let timeout = app
            .driver
            .until_next_tick()
            .min(app.driver.config().repeat_interval);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        if handle_press(app, key.code) == Flow::Quit {
                            return Ok(());
                        }
                    }
                    KeyEventKind::Release => {
                        if let Some(command) = command_for(key.code) {
                            app.driver.release(command);
                        }
                    }
                }
            }
        }

        let now = Instant::now();
        app.driver.advance(now.duration_since(last_step));
        last_step = now;
        app.after_step();
    }
}

fn enter_terminal(enhanced_keys: bool) -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    if enhanced_keys {
        stdout().execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))?;
    }
    Terminal::new(CrosstermBackend::new(stdout()))
}

fn leave_terminal(enhanced_keys: bool) -> io::Result<()> {
    if enhanced_keys {
        stdout().execute(PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let game_config = GameConfig {
        width: cli.width,
        height: cli.height,
    }
    .validate()
    .context("invalid board size")?;
    let driver_config = DriverConfig {
        tick_interval: Duration::from_millis(cli.tick_ms),
        repeat_interval: Duration::from_millis(cli.repeat_ms),
        release_timeout: Duration::from_millis(RELEASE_TIMEOUT_MS),
    }
    .validate()
    .context("invalid timing")?;

    let store = cli
        .high_score_file
        .map(HighScoreStore::new)
        .unwrap_or_else(HighScoreStore::from_env);

    let provider: Box<dyn PieceProvider> = match cli.seed {
        Some(seed) => Box::new(RandomPieceProvider::seeded(seed)),
        None => Box::new(RandomPieceProvider::new()),
    };

    let mut app = App {
        driver: Driver::new(Game::with_provider(game_config, provider), driver_config),
        high_score: HighScore::new(store.load()),
        store,
        save_error: None,
        session: Session::default(),
    };

    let enhanced_keys = matches!(supports_keyboard_enhancement(), Ok(true));
    let mut terminal = enter_terminal(enhanced_keys).context("failed to set up terminal")?;

    let result = run(&mut terminal, &mut app);

    // Always try to restore terminal state.
    leave_terminal(enhanced_keys).context("failed to restore terminal")?;
    result?;

    eprintln!(
        "[blockfall] games {} | pieces {} | last score {} | high score {} ({})",
        app.session.games_played,
        app.session.pieces_locked,
        app.driver.game().score(),
        app.high_score.best(),
        app.store.path().display(),
    );
    if let Some(err) = &app.save_error {
        eprintln!("[blockfall] high score not saved: {err}");
    }

    Ok(())
}
