//! Keyboard tracking between ticks
//!
//! Terminals on Linux rarely deliver key release events, so held keys
//! are inferred from repeat events drying up. Each tick the tracker is
//! drained into an [`InputSnapshot`]; auto-repeat for held directions
//! happens inside the session, not here.

use crate::game::InputSnapshot;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Keys the session never sees; the app loop reacts to these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Pause,
    Quit,
}

/// Accumulates key events until the next tick drains them.
pub struct InputTracker {
    bindings: KeyBindings,
    /// Last repeat event per held direction
    left_seen: Option<Instant>,
    right_seen: Option<Instant>,
    down_seen: Option<Instant>,
    pending: Pending,
}

/// One-shot presses waiting for the next snapshot
#[derive(Debug, Default, Clone, Copy)]
struct Pending {
    rotate_cw: bool,
    rotate_ccw: bool,
    rotate_half: bool,
    hard_drop: bool,
    hold: bool,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub rotate_ccw: Vec<KeyCode>,
    pub rotate_half: Vec<KeyCode>,
    pub hold: Vec<KeyCode>,
    pub pause: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        match s.to_lowercase().as_str() {
            "left" => Some(KeyCode::Left),
            "right" => Some(KeyCode::Right),
            "up" => Some(KeyCode::Up),
            "down" => Some(KeyCode::Down),
            "space" => Some(KeyCode::Char(' ')),
            "enter" => Some(KeyCode::Enter),
            "tab" => Some(KeyCode::Tab),
            "esc" | "escape" => Some(KeyCode::Esc),
            "backspace" => Some(KeyCode::Backspace),
            "delete" => Some(KeyCode::Delete),
            "home" => Some(KeyCode::Home),
            "end" => Some(KeyCode::End),
            "pageup" => Some(KeyCode::PageUp),
            "pagedown" => Some(KeyCode::PageDown),
            "insert" => Some(KeyCode::Insert),
            "shift" => Some(KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftShift)),
            "ctrl" | "control" => Some(KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftControl)),
            "alt" => Some(KeyCode::Modifier(crossterm::event::ModifierKeyCode::LeftAlt)),
            s if s.len() == 1 => s.chars().next().map(KeyCode::Char),
            s if s.starts_with('f') && s[1..].chars().all(|c| c.is_ascii_digit()) => {
                s[1..].parse().ok().map(KeyCode::F)
            }
            _ => None,
        }
    }

    /// Parse a list of key strings into KeyCodes. Unrecognized strings
    /// are dropped with a warning rather than guessed at.
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!("ignoring unknown key binding {s:?}");
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate_cw: Self::parse_keys(&settings.keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&settings.keys.rotate_ccw),
            rotate_half: Self::parse_keys(&settings.keys.rotate_half),
            hold: Self::parse_keys(&settings.keys.hold),
            pause: Self::parse_keys(&settings.keys.pause),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    /// Create the tracker from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            bindings: KeyBindings::from_settings(settings),
            left_seen: None,
            right_seen: None,
            down_seen: None,
            pending: Pending::default(),
        }
    }

    /// Handle a key press event. Gameplay keys accumulate until the
    /// next snapshot; pause and quit surface immediately.
    pub fn key_down(&mut self, key: KeyEvent) -> Option<Control> {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Control::Quit);
        }

        let now = Instant::now();
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_seen = Some(now);
            // Cancel opposite direction
            self.right_seen = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_seen = Some(now);
            self.left_seen = None;
        } else if self.bindings.soft_drop.contains(&code) {
            self.down_seen = Some(now);
        } else if self.bindings.hard_drop.contains(&code) {
            self.pending.hard_drop = true;
        } else if self.bindings.rotate_cw.contains(&code) {
            self.pending.rotate_cw = true;
        } else if self.bindings.rotate_ccw.contains(&code) {
            self.pending.rotate_ccw = true;
        } else if self.bindings.rotate_half.contains(&code) {
            self.pending.rotate_half = true;
        } else if self.bindings.hold.contains(&code) {
            self.pending.hold = true;
        } else if self.bindings.pause.contains(&code) {
            return Some(Control::Pause);
        } else if self.bindings.quit.contains(&code) {
            return Some(Control::Quit);
        }

        None
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_seen = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_seen = None;
        } else if self.bindings.soft_drop.contains(&code) {
            self.down_seen = None;
        }
    }

    /// Drain what accumulated since the last tick into one snapshot.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let now = Instant::now();
        expire(&mut self.left_seen, now);
        expire(&mut self.right_seen, now);
        expire(&mut self.down_seen, now);

        let pending = std::mem::take(&mut self.pending);
        InputSnapshot {
            rotate_cw: pending.rotate_cw,
            rotate_ccw: pending.rotate_ccw,
            rotate_half: pending.rotate_half,
            hard_drop: pending.hard_drop,
            hold: pending.hold,
            left: self.left_seen.is_some(),
            right: self.right_seen.is_some(),
            soft_drop: self.down_seen.is_some(),
        }
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left_seen = None;
        self.right_seen = None;
        self.down_seen = None;
        self.pending = Pending::default();
    }
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn expire(seen: &mut Option<Instant>, now: Instant) {
    if seen.is_some_and(|at| now.duration_since(at) > KEY_TIMEOUT) {
        *seen = None;
    }
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn one_shot_keys_fire_exactly_once() {
        let mut tracker = InputTracker::new();
        assert_eq!(tracker.key_down(press(KeyCode::Char('z'))), None);
        assert_eq!(tracker.key_down(press(KeyCode::Char(' '))), None);

        let snapshot = tracker.snapshot();
        assert!(snapshot.rotate_ccw);
        assert!(snapshot.hard_drop);

        let snapshot = tracker.snapshot();
        assert!(!snapshot.rotate_ccw);
        assert!(!snapshot.hard_drop);
    }

    #[test]
    fn opposite_direction_cancels_the_held_one() {
        let mut tracker = InputTracker::new();
        tracker.key_down(press(KeyCode::Left));
        assert!(tracker.snapshot().left);

        tracker.key_down(press(KeyCode::Right));
        let snapshot = tracker.snapshot();
        assert!(!snapshot.left);
        assert!(snapshot.right);
    }

    #[test]
    fn control_keys_surface_instead_of_accumulating() {
        let mut tracker = InputTracker::new();
        assert_eq!(tracker.key_down(press(KeyCode::Char('p'))), Some(Control::Pause));
        assert_eq!(tracker.key_down(press(KeyCode::Char('q'))), Some(Control::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(tracker.key_down(ctrl_c), Some(Control::Quit));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot, InputSnapshot::default());
    }

    #[test]
    fn uppercase_letters_match_lowercase_bindings() {
        let mut tracker = InputTracker::new();
        tracker.key_down(press(KeyCode::Char('Z')));
        assert!(tracker.snapshot().rotate_ccw);
    }

    #[test]
    fn unknown_binding_strings_are_dropped() {
        let parsed = KeyBindings::parse_keys(&[
            "left".to_string(),
            "f5".to_string(),
            "turbo".to_string(),
        ]);
        assert_eq!(parsed, vec![KeyCode::Left, KeyCode::F(5)]);
    }
}
