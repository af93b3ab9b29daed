use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::{
    io::{stdout, Stdout},
    time::{Duration, Instant},
};

use blockdrop::game::{Game, GameEvent, GameState};
use blockdrop::game_loop::{GameLoop, Phase, SystemClock};
use blockdrop::grid::{CellState, GRID_HEIGHT, GRID_WIDTH};
use blockdrop::input::map_key;
use blockdrop::piece::{PieceType, RandomPieceProvider};

#[derive(Debug, Parser)]
#[command(author, version, about = "Falling-block puzzle game for the terminal", long_about = None)]
struct Cli {
    /// Seed for the piece sequence (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Frames per second of the game loop
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..=1000))]
    fps: u32,
}

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

fn piece_color(piece_type: PieceType) -> Color {
    let (r, g, b) = piece_type.color();
    Color::Rgb(r, g, b)
}

// ============================================================================
// Rendering
// ============================================================================

/// What the info panel needs besides the engine itself.
struct Hud<'a> {
    control_label: &'a str,
    control_enabled: bool,
    message: Option<&'a str>,
}

fn render(frame: &mut Frame, game_loop: &GameLoop<SystemClock>, message: Option<&str>) {
    let area = frame.size();
    let control = game_loop.control();
    let hud = Hud {
        control_label: control.label,
        control_enabled: control.enabled,
        message,
    };
    let game = game_loop.game();

    if game_loop.phase() == Phase::Idle {
        render_game(frame, game, &hud, area, false);
        render_popup(frame, area, " Ready ", "Press Enter to start", Color::White);
        return;
    }

    render_game(frame, game, &hud, area, true);
    match game.state {
        GameState::Playing => {}
        GameState::Paused => {
            render_popup(frame, area, " Paused ", "PAUSED", Color::Yellow);
        }
        GameState::GameOver => {
            render_popup(frame, area, " Game Over ", "GAME OVER", Color::Red);
        }
    }
}

fn render_game(frame: &mut Frame, game: &Game, hud: &Hud, area: Rect, show_pieces: bool) {
    let grid_display_width = (GRID_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = GRID_HEIGHT as u16 + 2;
    let side_width = 16;
    let total_width = grid_display_width + side_width + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // Layout: [Grid][Side panel]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    let side = Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).split(horizontal[1]);

    render_grid(frame, game, horizontal[0], show_pieces);
    render_preview(frame, game, side[0], show_pieces);
    render_info(frame, game, hud, side[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Drop | ↑: Rotate | Space: Hard drop | P: Pause | Enter: Start | Q: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect, show_pieces: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockdrop ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual_grid = if show_pieces {
        game.render_grid()
    } else {
        *game.grid.rows()
    };

    let lines: Vec<Line> = visual_grid
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match *cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(piece_type) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(piece_color(piece_type)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect, show_pieces: bool) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if !show_pieces {
        return;
    }

    // Center the next piece inside the box
    let shape = game.next_piece.shape;
    let color = piece_color(game.next_piece.piece_type);
    let shape_width = shape.cols() as u16 * CELL_WIDTH;
    let pad_x = usize::from(inner.width.saturating_sub(shape_width) / 2);
    let pad_y = usize::from(inner.height.saturating_sub(shape.rows() as u16) / 2);

    let mut lines: Vec<Line> = vec![Line::from(""); pad_y];
    for row in 0..shape.rows() {
        let mut spans: Vec<Span> = vec![Span::raw(" ".repeat(pad_x))];
        for col in 0..shape.cols() {
            if shape.get(row, col) != 0 {
                spans.push(Span::styled(BLOCK_CHAR, Style::default().fg(color)));
            } else {
                spans.push(Span::raw(EMPTY_CHAR));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, game: &Game, hud: &Hud, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = game.stats();
    let control_style = if hud.control_enabled {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", stats.score)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", stats.lines)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", stats.level)),
        Line::from(""),
        Line::from(Span::styled(format!("[ {} ]", hud.control_label), control_style)),
        Line::from(""),
        Line::from(Span::styled(
            hud.message.unwrap_or_default().to_string(),
            Style::default().fg(Color::Magenta),
        )),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_popup(frame: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(text.to_string(), Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled(
            "Press Q or ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 8, area);
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

fn describe(event: &GameEvent) -> Option<String> {
    match event {
        GameEvent::LinesCleared(1) => Some("Single!".to_string()),
        GameEvent::LinesCleared(n) => Some(format!("{n} lines!")),
        GameEvent::LevelUp(level) => Some(format!("Level {level}!")),
        GameEvent::GameRestarted => Some("Good luck!".to_string()),
        _ => None,
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;

    let result = run(&cli);

    // Always try to restore terminal state.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    result
}

fn run(cli: &Cli) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let provider = match cli.seed {
        Some(seed) => RandomPieceProvider::seeded(seed),
        None => RandomPieceProvider::new(),
    };
    let game = Game::with_provider(Box::new(provider));
    let mut game_loop = GameLoop::new(game, SystemClock::new());

    let frame_duration = Duration::from_secs(1) / cli.fps;
    let mut last_frame = Instant::now();
    let mut message: Option<String> = None;

    loop {
        draw(&mut terminal, &game_loop, message.as_deref())?;

        let timeout = frame_duration
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(command) = map_key(key) {
                        if !game_loop.handle(command) {
                            break;
                        }
                    }
                }
            }
        }

        if last_frame.elapsed() >= frame_duration {
            game_loop.tick();
            last_frame = Instant::now();
        }

        for event in game_loop.game_mut().take_events() {
            if let Some(text) = describe(&event) {
                message = Some(text);
            }
        }
    }

    Ok(())
}

fn draw(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game_loop: &GameLoop<SystemClock>,
    message: Option<&str>,
) -> Result<()> {
    terminal.draw(|frame| render(frame, game_loop, message))?;
    Ok(())
}
