//! Terminal UI rendering with ratatui

use crate::board::{BOARD_WIDTH, BUFFER_HEIGHT, TOTAL_HEIGHT};
use crate::game::{Phase, TickView};
use crate::menu::{Menu, MenuItemType, MenuScreen};
use crate::settings::Settings;
use crate::tetromino::{Rotation, ShapeKind};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";

/// Total width needed: hold(12) + board(22) + next/stats(16) = 50
const GAME_WIDTH: u16 = 50;
/// Total height needed: 22 grid rows + 2 for borders = 24
const GAME_HEIGHT: u16 = 24;

/// Render the main menu
pub fn render_menu(frame: &mut Frame, menu: &Menu) {
    let area = frame.area();

    // Determine menu size based on screen type
    let (menu_width, menu_height) = match menu.screen {
        MenuScreen::Main => (44u16, 18u16),
        MenuScreen::HighScores => (50u16, 20u16),
        MenuScreen::Settings => (44u16, 16u16),
        MenuScreen::SettingsKeys => (50u16, 26u16),
        MenuScreen::SettingsVisual | MenuScreen::SettingsGameplay => (50u16, 14u16),
    };

    let menu_area = center_rect(area, menu_width, menu_height);

    // Title area height depends on screen
    let show_big_title = menu.screen == MenuScreen::Main;
    let title_height = if show_big_title { 4u16 } else { 3u16 };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(title_height), Constraint::Min(8)])
        .split(menu_area);

    // Render title
    if show_big_title {
        let title_lines = vec![
            Line::raw(""),
            Line::styled(
                "█▄▄ █   █▀█ █▀▀ █▄▀ █▀▀ ▄▀█ █   █  ",
                Style::default().fg(Color::Cyan),
            ),
            Line::styled(
                "█▄█ █▄▄ █▄█ █▄▄ █ █ █▀  █▀█ █▄▄ █▄▄",
                Style::default().fg(Color::Cyan),
            ),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    } else {
        // Smaller title for the inner screens
        let screen_title = match menu.screen {
            MenuScreen::HighScores => "HIGH SCORES",
            MenuScreen::Settings => "SETTINGS",
            MenuScreen::SettingsKeys => "KEY BINDINGS",
            MenuScreen::SettingsVisual => "VISUAL SETTINGS",
            MenuScreen::SettingsGameplay => "GAMEPLAY SETTINGS",
            MenuScreen::Main => "BLOCKFALL",
        };
        let title_lines = vec![
            Line::raw(""),
            Line::styled(screen_title, Style::default().fg(Color::Cyan).bold()),
        ];
        let title = Paragraph::new(title_lines).alignment(Alignment::Center);
        frame.render_widget(title, layout[0]);
    }

    // Menu items
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);

    let mut lines = Vec::new();
    lines.push(Line::raw("")); // Spacing

    for (i, item) in menu.items.iter().enumerate() {
        let is_selected = i == menu.selected;
        let is_rebinding = menu.rebinding == Some(i);

        let line = render_menu_item(item, is_selected, is_rebinding);
        lines.push(line);
        if menu.screen != MenuScreen::HighScores {
            lines.push(Line::raw("")); // Spacing between items
        }
    }

    // Controls hint based on screen and current item type
    lines.push(Line::raw(""));
    let hint = get_controls_hint(menu);
    lines.push(Line::styled(hint, Style::default().fg(Color::DarkGray)));

    let menu_text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(menu_text, inner);
}

/// Render a single menu item based on its type
fn render_menu_item(item: &crate::menu::MenuItem, is_selected: bool, is_rebinding: bool) -> Line<'static> {
    let prefix = if is_selected { "▶ " } else { "  " };

    let base_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };

    match &item.item_type {
        MenuItemType::Button(_) => Line::styled(format!("{}{}", prefix, item.label), base_style),
        MenuItemType::Toggle { value, .. } => {
            let value_str = if *value { "ON" } else { "OFF" };
            let value_color = if *value { Color::Green } else { Color::Red };
            Line::from(vec![
                Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                Span::styled(
                    format!("< {} >", value_str),
                    Style::default().fg(value_color).bold(),
                ),
            ])
        }
        MenuItemType::Cycle { options, current, .. } => {
            let value_str = &options[*current];
            Line::from(vec![
                Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                Span::styled(format!("< {} >", value_str), Style::default().fg(Color::Cyan)),
            ])
        }
        MenuItemType::Number { value, .. } => Line::from(vec![
            Span::styled(format!("{}{}: ", prefix, item.label), base_style),
            Span::styled(format!("< {} >", value), Style::default().fg(Color::Cyan)),
        ]),
        MenuItemType::KeyBind { keys, .. } => {
            if is_rebinding {
                Line::from(vec![
                    Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                    Span::styled("Press a key...", Style::default().fg(Color::Yellow).bold()),
                ])
            } else {
                let keys_str = if keys.is_empty() {
                    "None".to_string()
                } else {
                    keys.join(", ")
                };
                Line::from(vec![
                    Span::styled(format!("{}{}: ", prefix, item.label), base_style),
                    Span::styled(format!("[{}]", keys_str), Style::default().fg(Color::Magenta)),
                ])
            }
        }
        MenuItemType::Label { text } => {
            if text.is_empty() {
                Line::styled(format!("  {}", item.label), Style::default().fg(Color::Gray))
            } else {
                Line::from(vec![
                    Span::styled(format!("  {}  ", item.label), Style::default().fg(Color::Gray)),
                    Span::styled(text.clone(), Style::default().fg(Color::Cyan)),
                ])
            }
        }
    }
}

/// Get the controls hint based on current menu state
fn get_controls_hint(menu: &Menu) -> String {
    if menu.rebinding.is_some() {
        return "Key=Set | Shift+Key=Add more | Enter=Done | Esc=Cancel".to_string();
    }

    if let Some(item) = menu.items.get(menu.selected) {
        match &item.item_type {
            MenuItemType::Toggle { .. }
            | MenuItemType::Cycle { .. }
            | MenuItemType::Number { .. } => "↑↓ Select  ←→ Adjust  Esc Back".to_string(),
            MenuItemType::KeyBind { .. } => "↑↓ Select  Enter Rebind  Esc Back".to_string(),
            MenuItemType::Label { .. } => "↑↓ Select  Esc Back".to_string(),
            MenuItemType::Button(_) => "↑↓ Select  Enter Confirm  Esc Back".to_string(),
        }
    } else {
        "↑↓ Select  Enter Confirm  Esc Back".to_string()
    }
}

/// Render the entire game UI from one tick's snapshot
pub fn render_game(frame: &mut Frame, view: &TickView, settings: &Settings) {
    let area = frame.area();
    let (block_char, _) = settings.visual.block_chars();

    // Center the game area
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    // Create main layout: hold | board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(12), // Hold box
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(16), // Next queue + stats
        ])
        .split(game_area);

    // Render hold piece
    render_hold(frame, main_layout[0], view.held, block_char);

    // Render main board
    render_board(frame, main_layout[1], view, settings);

    // Right side: next queue and stats
    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(17), // Next queue
            Constraint::Min(6),     // Stats
        ])
        .split(main_layout[2]);

    render_next_queue(frame, right_layout[0], view.preview, block_char);
    render_stats(frame, right_layout[1], view);
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the hold piece box
fn render_hold(frame: &mut Frame, area: Rect, hold: Option<ShapeKind>, block_char: &str) {
    let block = Block::default()
        .title(" HOLD ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(kind) = hold {
        render_mini_piece(frame, inner, kind, block_char);
    }
}

/// Render the next piece queue
fn render_next_queue(frame: &mut Frame, area: Rect, queue: &[ShapeKind], block_char: &str) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if queue.is_empty() {
        return;
    }

    let piece_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); queue.len()])
        .split(inner);

    for (i, &kind) in queue.iter().enumerate() {
        render_mini_piece(frame, piece_areas[i], kind, block_char);
    }
}

/// Render a small piece preview (for hold and next queue)
fn render_mini_piece(frame: &mut Frame, area: Rect, kind: ShapeKind, block_char: &str) {
    if area.height < 1 || area.width < 4 {
        return;
    }

    let color = kind.color();
    let cells = kind.offsets(Rotation::North);

    // Normalize into a 4x2 box; rows grow downward, same as the screen
    let min_col = cells.iter().map(|(x, _)| *x).min().unwrap_or(0);
    let min_row = cells.iter().map(|(_, y)| *y).min().unwrap_or(0);

    let mut lines: Vec<Line> = Vec::new();
    for row_offset in 0..2 {
        let mut spans = Vec::new();
        for col_offset in 0..4 {
            let target = (min_col + col_offset, min_row + row_offset);
            if cells.contains(&target) {
                spans.push(Span::styled(block_char, Style::default().fg(color)));
            } else {
                spans.push(Span::raw(EMPTY));
            }
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Render the playfield
fn render_board(frame: &mut Frame, area: Rect, view: &TickView, settings: &Settings) {
    let (block_char, ghost_char) = settings.visual.block_chars();
    let show_ghost = settings.visual.show_ghost;

    let block = Block::default()
        .title(" BLOCKFALL ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let piece_cells = view.piece.map(|piece| piece.cells());
    let piece_color = view.piece.map(|piece| piece.kind.color());
    let ghost_cells = view.piece.filter(|_| show_ghost).map(|piece| {
        piece
            .cells()
            .map(|(col, row)| (col, row + view.ghost_drop))
    });
    // Rows mid-removal flash for the one tick they linger
    let flashing = if view.phase == Phase::LineClear {
        view.grid.full_rows()
    } else {
        Vec::new()
    };

    let mut lines: Vec<Line> = Vec::new();
    for row in 0..TOTAL_HEIGHT {
        let is_buffer_row = row < BUFFER_HEIGHT;
        let mut spans = Vec::new();

        for col in 0..BOARD_WIDTH {
            let at = (col as i32, row as i32);

            let (text, style) = if piece_cells.is_some_and(|cells| cells.contains(&at)) {
                (block_char, Style::default().fg(piece_color.unwrap_or(Color::White)))
            } else if !is_buffer_row && ghost_cells.is_some_and(|cells| cells.contains(&at)) {
                (
                    ghost_char,
                    Style::default().fg(piece_color.unwrap_or(Color::White)).dim(),
                )
            } else if is_buffer_row {
                // Hidden rows show only the falling piece
                (EMPTY, Style::default())
            } else if flashing.contains(&row) {
                (block_char, Style::default().fg(Color::White).bold())
            } else {
                match view.grid.cell(at.0, at.1) {
                    Some(kind) => (block_char, Style::default().fg(kind.color())),
                    None => (EMPTY, Style::default()),
                }
            };

            spans.push(Span::styled(text, style));
        }

        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, view: &TickView) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", view.score),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LEVEL", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", view.level),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", view.lines),
            Style::default().fg(Color::Green),
        )),
    ];

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render the pause overlay on top of the frozen game
pub fn render_pause(frame: &mut Frame) {
    render_overlay(frame, frame.area(), "PAUSED", "Press P to resume");
}

/// Render the game-over popup, with name entry while the score
/// qualifies for the book
pub fn render_game_over(
    frame: &mut Frame,
    score: u64,
    lines_cleared: u32,
    qualifies: bool,
    name: &str,
    blocked: bool,
) {
    let area = frame.area();
    let popup_height = if qualifies { 12u16 } else { 8u16 };
    let popup_area = center_rect(area, 34, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![
        Line::styled("GAME OVER", Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Score ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{}", score), Style::default().fg(Color::Yellow).bold()),
            Span::styled("   Lines ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{}", lines_cleared), Style::default().fg(Color::Green)),
        ]),
        Line::raw(""),
    ];

    if qualifies {
        lines.push(Line::styled(
            "You made the top ten!",
            Style::default().fg(Color::Green).bold(),
        ));
        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::styled("Name: ", Style::default().fg(Color::Gray)),
            Span::styled(name.to_string(), Style::default().fg(Color::White).bold()),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]));
        if blocked {
            lines.push(Line::styled(
                "That name is not allowed",
                Style::default().fg(Color::Red),
            ));
        } else {
            lines.push(Line::raw(""));
        }
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Enter Save  Esc Skip",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        lines.push(Line::styled(
            "Enter Menu  Q Quit",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 24u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
