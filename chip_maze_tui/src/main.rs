use anyhow::{Context, Result};
use chip_maze_core::{
    Direction, Inventory, Item, KeyColor, Position,
    board::{Board, Feature, Terrain},
    session::{GameSession, Phase},
};
use clap::Parser;
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    io::{self, Stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Level file to load
    #[arg(short, long, value_name = "LEVEL_FILE")]
    level: Option<PathBuf>,
}

struct App {
    /// The core game session.
    session: GameSession,
    /// Flag to control the main loop.
    should_quit: bool,
}

impl App {
    fn new(level_file: &PathBuf) -> Result<Self> {
        let level_text = std::fs::read_to_string(level_file)
            .with_context(|| format!("Failed to read level file {}", level_file.display()))?;
        let session = GameSession::new(1, &level_text)
            .with_context(|| format!("Failed to load level {}", level_file.display()))?;
        Ok(App {
            session,
            should_quit: false,
        })
    }

    /// Routes one key press to the session.
    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.session.start(),
            KeyCode::Char('p') => self.session.toggle_pause(),
            KeyCode::Char('r') => {
                self.session.restart()?;
            }
            KeyCode::Up | KeyCode::Char('w') => {
                self.session.handle_move(Direction::Up);
            }
            KeyCode::Down | KeyCode::Char('s') => {
                self.session.handle_move(Direction::Down);
            }
            KeyCode::Left | KeyCode::Char('a') => {
                self.session.handle_move(Direction::Left);
            }
            KeyCode::Right | KeyCode::Char('d') => {
                self.session.handle_move(Direction::Right);
            }
            _ => {}
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    // If no level file is provided, use the default level
    let level_file = args.level.unwrap_or(PathBuf::from("levels/level01.txt"));

    // Create the application state before touching the terminal, so load
    // errors print normally.
    let mut app = App::new(&level_file)?;

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app);

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    let poll_interval = Duration::from_millis(100);
    let mut last_second = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        // Poll for events (keyboard, mouse, etc.)
        if crossterm::event::poll(poll_interval)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code)?;
            }
        }

        // Advance the countdown once per elapsed wall-clock second. The
        // session itself ignores ticks while paused or in the menu.
        if last_second.elapsed() >= Duration::from_secs(1) {
            app.session.tick_second();
            last_second = Instant::now();
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Min(10),    // Area for the board
            Constraint::Length(4),  // Area for the HUD
            Constraint::Length(2),  // Area for status/help
        ])
        .split(frame.area());

    if app.session.phase() == Phase::Menu {
        render_menu(frame, main_layout[0]);
    } else {
        render_board(frame, main_layout[0], app.session.board());
    }

    render_hud(frame, main_layout[1], &app.session);

    let help_text = Paragraph::new(status_line(&app.session))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Phase-dependent help line at the bottom of the screen.
fn status_line(session: &GameSession) -> &'static str {
    match session.phase() {
        Phase::Menu => "Press Enter to start. 'q' quits.",
        Phase::Playing => "Arrows/WASD move. 'p' pauses, 'r' restarts, 'q' quits.",
        Phase::Paused => "PAUSED. 'p' resumes, 'r' restarts, 'q' quits.",
        Phase::GameOver => "GAME OVER. 'r' restarts, 'q' quits.",
    }
}

/// Renders the start menu.
fn render_menu(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "CHIP MAZE",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from("Collect every chip (*) before the water gets you."),
        Line::from("Gold and blue keys open doors of the same color."),
        Line::from(""),
        Line::from(Span::styled("Press Enter to start", Style::default().bold())),
    ];
    let menu = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title("Chip Maze").borders(Borders::ALL));
    frame.render_widget(menu, area);
}

/// Renders the HUD: chips left, time left, and the inventory slots.
fn render_hud(frame: &mut Frame, area: Rect, session: &GameSession) {
    let mut counters = vec![Span::raw(format!(
        "Level {}  Chips left: {}  Time: {}",
        session.level(),
        session.chips_left(),
        session.time_left(),
    ))];
    if session.all_chips_collected() {
        counters.push(Span::styled(
            "  All chips collected!",
            Style::default().fg(Color::Green).bold(),
        ));
    }
    if session.is_game_over() {
        counters.push(Span::styled(
            "  GAME OVER",
            Style::default().fg(Color::Red).bold(),
        ));
    }
    if session.is_paused() {
        counters.push(Span::styled(
            "  PAUSED",
            Style::default().fg(Color::Yellow).bold(),
        ));
    }

    let mut slots = vec![Span::raw("Inventory: ")];
    slots.extend(inventory_spans(session.inventory()));

    let hud = Paragraph::new(vec![Line::from(counters), Line::from(slots)])
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(hud, area);
}

/// One span per held item, colored like its board tile.
fn inventory_spans(inventory: &Inventory) -> Vec<Span<'static>> {
    inventory
        .iter()
        .map(|item| match item {
            Item::Key { color } => Span::styled("k ", Style::default().fg(key_color(*color))),
            Item::Block => Span::styled("{ ", Style::default().fg(Color::Gray)),
        })
        .collect()
}

fn key_color(color: KeyColor) -> Color {
    match color {
        KeyColor::Gold => Color::Yellow,
        KeyColor::Blue => Color::Blue,
    }
}

/// Renders the level board onto the frame.
fn render_board(frame: &mut Frame, area: Rect, board: &Board) {
    let mut lines: Vec<Line> = Vec::with_capacity(board.height());

    for y in 0..board.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(board.width());
        for x in 0..board.width() {
            let position = Position::new(x, y);
            if board.player() == position {
                spans.push(Span::styled("@", Style::default().fg(Color::Red).bold()));
                continue;
            }
            if let Some(feature) = board.feature_at(position) {
                spans.push(feature_span(feature));
                continue;
            }
            spans.push(terrain_span(board.terrain()[position]));
        }
        lines.push(Line::from(spans));
    }

    let board_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Chip Maze").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(board_paragraph, area);
}

fn feature_span(feature: Feature) -> Span<'static> {
    match feature {
        Feature::Key { color } => Span::styled("k", Style::default().fg(key_color(color))),
        Feature::Door { color } => Span::styled("+", Style::default().fg(key_color(color))),
        Feature::Chip => Span::styled("*", Style::default().fg(Color::Green)),
        Feature::Block => Span::styled("{", Style::default().fg(Color::Gray)),
    }
}

fn terrain_span(terrain: Terrain) -> Span<'static> {
    match terrain {
        Terrain::Empty => Span::raw(" "),
        Terrain::Floor => Span::styled(".", Style::default().fg(Color::DarkGray)),
        Terrain::Wall => Span::styled("#", Style::default().fg(Color::DarkGray).bold()),
        Terrain::Water => Span::styled("~", Style::default().fg(Color::Cyan)),
    }
}
