//! BLOCKFALL - a terminal stacker
//!
//! Stack blocks, clear lines, chase the top ten.

mod bag;
mod board;
mod game;
mod input;
mod menu;
mod piece;
mod records;
mod score;
mod settings;
mod srs;
mod tetromino;
mod ui;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::{AutoShift, Game};
use input::{Control, InputTracker};
use menu::{Menu, MenuAction, MenuItemType, MenuScreen};
use ratatui::{backend::CrosstermBackend, Terminal};
use records::{NameFilter, ScoreBook, MAX_NAME_LEN};
use settings::Settings;
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate; the session advances one tick per frame
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Input grace after a session ends, so keys mashed in the final
/// moments do not leak into the game-over prompt
const GAME_OVER_INPUT_DELAY: Duration = Duration::from_secs(1);

/// Application state
enum AppState {
    Menu(Menu),
    Playing(Game, InputTracker),
    /// The finished session stays on screen behind the popup
    Over(Game, Postgame),
}

/// Game-over popup state: the final numbers plus any name being typed
struct Postgame {
    score: u64,
    lines: u32,
    qualifies: bool,
    name: String,
    /// The last submitted name was rejected by the filter
    blocked: bool,
    since: Instant,
}

/// Get the blockfall temp directory for logs, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // A session id keeps concurrent instances out of each other's logs
    let session_id: u32 = rand::random();
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "blockfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();
    let mut book = ScoreBook::load();
    let filter = NameFilter::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut settings, &mut book, &filter);

    // Restore the terminal before reporting anything
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: could not save settings: {}", e);
    }

    match &result {
        Ok(Some((score, lines))) => {
            println!("\nThanks for playing BLOCKFALL!");
            println!("Final score: {}  Lines: {}", score, lines);
        }
        Ok(None) => {
            println!("\nThanks for playing BLOCKFALL!");
        }
        Err(_) => {}
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
    book: &mut ScoreBook,
    filter: &NameFilter,
) -> io::Result<Option<(u64, u32)>> {
    let mut state = AppState::Menu(Menu::new());
    let mut paused = false;
    let mut last_score: Option<(u64, u32)> = None;
    let mut last_tick = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| match &state {
            AppState::Menu(menu) => ui::render_menu(frame, menu),
            AppState::Playing(game, _) => {
                ui::render_game(frame, &game.view(), settings);
                if paused {
                    ui::render_pause(frame);
                }
            }
            AppState::Over(game, post) => {
                ui::render_game(frame, &game.view(), settings);
                ui::render_game_over(
                    frame,
                    post.score,
                    post.lines,
                    post.qualifies,
                    &post.name,
                    post.blocked,
                );
            }
        })?;

        // Handle input, leaving enough of the frame budget to hit the
        // next tick on time
        let timeout = FRAME_DURATION.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let event = event::read()?;
            let mut next: Option<AppState> = None;

            if let Event::Key(key) = event {
                if key.kind == KeyEventKind::Release {
                    // Only some terminals report releases; the tracker
                    // also times held keys out on its own
                    if let AppState::Playing(_, input) = &mut state {
                        input.key_up(key);
                    }
                } else if key.kind == KeyEventKind::Press {
                    match &mut state {
                        AppState::Menu(menu) => {
                            match handle_menu_key(menu, key, settings, book) {
                                Some(MenuAction::StartGame) => {
                                    let mut game = Game::new();
                                    game.auto_shift = AutoShift {
                                        delay: settings.gameplay.das_ticks,
                                        repeat: settings.gameplay.arr_ticks,
                                    };
                                    tracing::info!(
                                        das = game.auto_shift.delay,
                                        arr = game.auto_shift.repeat,
                                        "starting session"
                                    );
                                    paused = false;
                                    next = Some(AppState::Playing(
                                        game,
                                        InputTracker::from_settings(settings),
                                    ));
                                }
                                Some(MenuAction::Quit) => return Ok(last_score),
                                _ => {}
                            }
                        }
                        AppState::Playing(_, input) => match input.key_down(key) {
                            Some(Control::Pause) => {
                                paused = !paused;
                                // Nothing buffered fires across the boundary
                                input.clear();
                            }
                            Some(Control::Quit) => {
                                tracing::info!("session abandoned");
                                next = Some(AppState::Menu(Menu::new()));
                            }
                            None => {}
                        },
                        AppState::Over(_, post) => {
                            if post.since.elapsed() >= GAME_OVER_INPUT_DELAY {
                                if post.qualifies {
                                    match key.code {
                                        KeyCode::Enter => {
                                            let name = post.name.trim();
                                            let name =
                                                if name.is_empty() { "ANON" } else { name };
                                            if filter.is_clean(name) {
                                                book.record(name, post.score, post.lines);
                                                if let Err(e) = book.save() {
                                                    tracing::warn!(
                                                        "could not save scores: {}",
                                                        e
                                                    );
                                                }
                                                tracing::info!(
                                                    name,
                                                    score = post.score,
                                                    "score recorded"
                                                );
                                                next = Some(AppState::Menu(Menu::new()));
                                            } else {
                                                post.blocked = true;
                                            }
                                        }
                                        KeyCode::Esc => {
                                            next = Some(AppState::Menu(Menu::new()));
                                        }
                                        KeyCode::Backspace => {
                                            post.name.pop();
                                            post.blocked = false;
                                        }
                                        KeyCode::Char(c) => {
                                            if post.name.len() < MAX_NAME_LEN
                                                && (c.is_ascii_graphic() || c == ' ')
                                            {
                                                post.name.push(c);
                                                post.blocked = false;
                                            }
                                        }
                                        _ => {}
                                    }
                                } else {
                                    match key.code {
                                        KeyCode::Enter | KeyCode::Esc => {
                                            next = Some(AppState::Menu(Menu::new()));
                                        }
                                        KeyCode::Char('q') => return Ok(last_score),
                                        _ => {}
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if let Some(next_state) = next {
                state = next_state;
            }
        }

        // Advance the session on the frame cadence
        if last_tick.elapsed() >= FRAME_DURATION {
            last_tick = Instant::now();
            let mut ended: Option<(Game, Postgame)> = None;

            if let AppState::Playing(game, input) = &mut state {
                if !paused {
                    let snapshot = input.snapshot();
                    game.tick(&snapshot);
                    if game.is_over() {
                        let view = game.view();
                        let (score, lines) = (view.score, view.lines);
                        let qualifies = book.qualifies(score);
                        tracing::info!(score, lines, qualifies, "session over");
                        last_score = Some((score, lines));
                        ended = Some((
                            std::mem::take(game),
                            Postgame {
                                score,
                                lines,
                                qualifies,
                                name: String::new(),
                                blocked: false,
                                since: Instant::now(),
                            },
                        ));
                    }
                }
            }

            if let Some((game, post)) = ended {
                state = AppState::Over(game, post);
            }
        }
    }
}

/// Drive the menu with one key press. Screen navigation is handled
/// here; actions the app itself must take are returned.
fn handle_menu_key(
    menu: &mut Menu,
    key: KeyEvent,
    settings: &mut Settings,
    book: &ScoreBook,
) -> Option<MenuAction> {
    // A rebinding row captures every key until it is done
    if menu.rebinding.is_some() {
        match key.code {
            KeyCode::Esc => menu.cancel_rebind(),
            KeyCode::Enter => menu.finish_rebind(),
            // Bare modifier presses are not bindable on their own
            KeyCode::Modifier(_) => {}
            code => {
                let key_str = key_to_string(code);
                // Keys with no string form cannot be stored
                if key_str != "Unknown" {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        // Shift+key adds to the binding and stays armed
                        menu.add_key(key_str, settings);
                    } else {
                        menu.set_key(key_str, settings);
                    }
                }
            }
        }
        return None;
    }

    match key.code {
        KeyCode::Up => menu.move_up(),
        KeyCode::Down => menu.move_down(),
        KeyCode::Left => menu.adjust_left(settings),
        KeyCode::Right => menu.adjust_right(settings),
        KeyCode::Enter => {
            // Keybind rows arm the rebind flow instead of acting
            if let Some(item) = menu.items.get(menu.selected) {
                if matches!(item.item_type, MenuItemType::KeyBind { .. }) {
                    menu.start_rebind();
                    return None;
                }
            }
            if let Some(action) = menu.select().cloned() {
                match action {
                    MenuAction::GoToScreen(screen) => {
                        save_on_leave(menu, settings);
                        menu.go_to(screen, settings, book);
                    }
                    MenuAction::Back => {
                        save_on_leave(menu, settings);
                        menu.go_back(settings, book);
                    }
                    action => return Some(action),
                }
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => {
            if menu.screen == MenuScreen::Main {
                return Some(MenuAction::Quit);
            }
            save_on_leave(menu, settings);
            menu.go_back(settings, book);
        }
        _ => {}
    }
    None
}

/// Settings screens persist on the way out, not on every adjustment
fn save_on_leave(menu: &Menu, settings: &Settings) {
    let on_settings = matches!(
        menu.screen,
        MenuScreen::Settings
            | MenuScreen::SettingsKeys
            | MenuScreen::SettingsVisual
            | MenuScreen::SettingsGameplay
    );
    if on_settings {
        if let Err(e) = settings.save() {
            tracing::warn!("could not save settings: {}", e);
        }
    }
}

/// Convert a key code to the string form used in settings
fn key_to_string(code: KeyCode) -> String {
    match code {
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Insert => "Insert".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Modifier(m) => match m {
            crossterm::event::ModifierKeyCode::LeftShift
            | crossterm::event::ModifierKeyCode::RightShift => "Shift".to_string(),
            crossterm::event::ModifierKeyCode::LeftControl
            | crossterm::event::ModifierKeyCode::RightControl => "Ctrl".to_string(),
            crossterm::event::ModifierKeyCode::LeftAlt
            | crossterm::event::ModifierKeyCode::RightAlt => "Alt".to_string(),
            _ => "Unknown".to_string(),
        },
        _ => "Unknown".to_string(),
    }
}
