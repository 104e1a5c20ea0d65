//! Main menu system with settings configuration

use crate::records::ScoreBook;
use crate::settings::Settings;

/// Menu screens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuScreen {
    Main,
    HighScores,
    Settings,
    SettingsKeys,
    SettingsVisual,
    SettingsGameplay,
}

/// Menu state
#[derive(Debug, Clone)]
pub struct Menu {
    pub screen: MenuScreen,
    pub selected: usize,
    pub items: Vec<MenuItem>,
    /// For key rebinding: which action is waiting for input
    pub rebinding: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub label: String,
    pub item_type: MenuItemType,
}

#[derive(Debug, Clone)]
pub enum MenuItemType {
    /// Simple button that triggers an action
    Button(MenuAction),
    /// Toggle boolean setting
    Toggle { key: SettingKey, value: bool },
    /// Cycle through options
    Cycle { key: SettingKey, options: Vec<String>, current: usize },
    /// Numeric value with increment/decrement
    Number { key: SettingKey, value: u64, min: u64, max: u64, step: u64 },
    /// Key binding (shows current keys, can rebind)
    KeyBind { action: String, keys: Vec<String> },
    /// Display-only label (not selectable)
    Label { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    StartGame,
    GoToScreen(MenuScreen),
    Back,
    Quit,
}

/// Setting keys for identifying which setting to modify
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKey {
    ShowGhost,
    BlockStyle,
    DasTicks,
    ArrTicks,
}

impl Menu {
    pub fn new() -> Self {
        Self::main_menu()
    }

    pub fn main_menu() -> Self {
        Self {
            screen: MenuScreen::Main,
            selected: 0,
            rebinding: None,
            items: vec![
                MenuItem {
                    label: "Play".to_string(),
                    item_type: MenuItemType::Button(MenuAction::StartGame),
                },
                MenuItem {
                    label: "High Scores".to_string(),
                    item_type: MenuItemType::Button(MenuAction::GoToScreen(
                        MenuScreen::HighScores,
                    )),
                },
                MenuItem {
                    label: "Settings".to_string(),
                    item_type: MenuItemType::Button(MenuAction::GoToScreen(MenuScreen::Settings)),
                },
                MenuItem {
                    label: "Quit".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Quit),
                },
            ],
        }
    }

    pub fn high_scores(book: &ScoreBook) -> Self {
        let mut items: Vec<MenuItem> = book
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| MenuItem {
                label: format!("{:2}. {:<12} {:>7}", i + 1, entry.name, entry.score),
                item_type: MenuItemType::Label {
                    text: format!("{:>3} lines  {}", entry.lines, entry.date),
                },
            })
            .collect();

        if items.is_empty() {
            items.push(MenuItem {
                label: "Nothing here yet - go stack some lines".to_string(),
                item_type: MenuItemType::Label { text: String::new() },
            });
        }
        items.push(MenuItem {
            label: "Back".to_string(),
            item_type: MenuItemType::Button(MenuAction::Back),
        });

        // Labels are not actionable, so land on Back
        let selected = items.len() - 1;
        Self {
            screen: MenuScreen::HighScores,
            selected,
            rebinding: None,
            items,
        }
    }

    pub fn settings_menu() -> Self {
        Self {
            screen: MenuScreen::Settings,
            selected: 0,
            rebinding: None,
            items: vec![
                MenuItem {
                    label: "Key Bindings".to_string(),
                    item_type: MenuItemType::Button(MenuAction::GoToScreen(
                        MenuScreen::SettingsKeys,
                    )),
                },
                MenuItem {
                    label: "Visual".to_string(),
                    item_type: MenuItemType::Button(MenuAction::GoToScreen(
                        MenuScreen::SettingsVisual,
                    )),
                },
                MenuItem {
                    label: "Gameplay".to_string(),
                    item_type: MenuItemType::Button(MenuAction::GoToScreen(
                        MenuScreen::SettingsGameplay,
                    )),
                },
                MenuItem {
                    label: "Back".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Back),
                },
            ],
        }
    }

    pub fn settings_keys(settings: &Settings) -> Self {
        let bind = |label: &str, action: &str, keys: &[String]| MenuItem {
            label: label.to_string(),
            item_type: MenuItemType::KeyBind {
                action: action.to_string(),
                keys: keys.to_vec(),
            },
        };

        Self {
            screen: MenuScreen::SettingsKeys,
            selected: 0,
            rebinding: None,
            items: vec![
                bind("Move Left", "move_left", &settings.keys.move_left),
                bind("Move Right", "move_right", &settings.keys.move_right),
                bind("Soft Drop", "soft_drop", &settings.keys.soft_drop),
                bind("Hard Drop", "hard_drop", &settings.keys.hard_drop),
                bind("Rotate CW", "rotate_cw", &settings.keys.rotate_cw),
                bind("Rotate CCW", "rotate_ccw", &settings.keys.rotate_ccw),
                bind("Rotate 180", "rotate_half", &settings.keys.rotate_half),
                bind("Hold", "hold", &settings.keys.hold),
                bind("Pause", "pause", &settings.keys.pause),
                MenuItem {
                    label: "Back".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Back),
                },
            ],
        }
    }

    pub fn settings_visual(settings: &Settings) -> Self {
        let block_styles = vec![
            "solid".to_string(),
            "bracket".to_string(),
            "round".to_string(),
        ];
        let current_style = block_styles
            .iter()
            .position(|s| s == &settings.visual.block_style)
            .unwrap_or(0);

        Self {
            screen: MenuScreen::SettingsVisual,
            selected: 0,
            rebinding: None,
            items: vec![
                MenuItem {
                    label: "Ghost Piece".to_string(),
                    item_type: MenuItemType::Toggle {
                        key: SettingKey::ShowGhost,
                        value: settings.visual.show_ghost,
                    },
                },
                MenuItem {
                    label: "Block Style".to_string(),
                    item_type: MenuItemType::Cycle {
                        key: SettingKey::BlockStyle,
                        options: block_styles,
                        current: current_style,
                    },
                },
                MenuItem {
                    label: "Back".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Back),
                },
            ],
        }
    }

    pub fn settings_gameplay(settings: &Settings) -> Self {
        Self {
            screen: MenuScreen::SettingsGameplay,
            selected: 0,
            rebinding: None,
            items: vec![
                MenuItem {
                    label: "DAS (ticks)".to_string(),
                    item_type: MenuItemType::Number {
                        key: SettingKey::DasTicks,
                        value: settings.gameplay.das_ticks as u64,
                        min: 0,
                        max: 30,
                        step: 1,
                    },
                },
                MenuItem {
                    label: "ARR (ticks)".to_string(),
                    item_type: MenuItemType::Number {
                        key: SettingKey::ArrTicks,
                        value: settings.gameplay.arr_ticks as u64,
                        min: 0,
                        max: 20,
                        step: 1,
                    },
                },
                MenuItem {
                    label: "Back".to_string(),
                    item_type: MenuItemType::Button(MenuAction::Back),
                },
            ],
        }
    }

    pub fn move_up(&mut self) {
        if self.rebinding.is_some() {
            return; // Don't move while rebinding
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn move_down(&mut self) {
        if self.rebinding.is_some() {
            return;
        }
        if self.selected < self.items.len() - 1 {
            self.selected += 1;
        } else {
            self.selected = 0;
        }
    }

    /// Handle left/right for cycling options and numbers
    pub fn adjust_left(&mut self, settings: &mut Settings) {
        if self.rebinding.is_some() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected) {
            match &mut item.item_type {
                MenuItemType::Toggle { key, value } => {
                    *value = !*value;
                    apply_setting(settings, key, &SettingValue::Bool(*value));
                }
                MenuItemType::Cycle { key, options, current } => {
                    *current = if *current == 0 {
                        options.len() - 1
                    } else {
                        *current - 1
                    };
                    apply_setting(settings, key, &SettingValue::String(options[*current].clone()));
                }
                MenuItemType::Number { key, value, min, step, .. } => {
                    *value = value.saturating_sub(*step).max(*min);
                    apply_setting(settings, key, &SettingValue::Number(*value));
                }
                _ => {}
            }
        }
    }

    pub fn adjust_right(&mut self, settings: &mut Settings) {
        if self.rebinding.is_some() {
            return;
        }
        if let Some(item) = self.items.get_mut(self.selected) {
            match &mut item.item_type {
                MenuItemType::Toggle { key, value } => {
                    *value = !*value;
                    apply_setting(settings, key, &SettingValue::Bool(*value));
                }
                MenuItemType::Cycle { key, options, current } => {
                    *current = (*current + 1) % options.len();
                    apply_setting(settings, key, &SettingValue::String(options[*current].clone()));
                }
                MenuItemType::Number { key, value, max, step, .. } => {
                    *value = (*value + *step).min(*max);
                    apply_setting(settings, key, &SettingValue::Number(*value));
                }
                _ => {}
            }
        }
    }

    /// Get the action for the current selection (for Button types)
    pub fn select(&self) -> Option<&MenuAction> {
        if self.rebinding.is_some() {
            return None;
        }
        if let Some(item) = self.items.get(self.selected) {
            if let MenuItemType::Button(action) = &item.item_type {
                return Some(action);
            }
        }
        None
    }

    /// Start rebinding a key
    pub fn start_rebind(&mut self) {
        if let Some(item) = self.items.get(self.selected) {
            if matches!(item.item_type, MenuItemType::KeyBind { .. }) {
                self.rebinding = Some(self.selected);
            }
        }
    }

    /// Cancel rebinding
    pub fn cancel_rebind(&mut self) {
        self.rebinding = None;
    }

    /// Add a key to the current rebinding action (stays in rebind mode)
    pub fn add_key(&mut self, key_str: String, settings: &mut Settings) {
        if let Some(idx) = self.rebinding {
            if let Some(item) = self.items.get_mut(idx) {
                if let MenuItemType::KeyBind { action, keys } = &mut item.item_type {
                    // Add key if not already present
                    if !keys.contains(&key_str) {
                        keys.push(key_str);
                        update_key_binding(settings, action, keys.clone());
                    }
                }
            }
        }
        // Stay in rebinding mode to allow adding more keys
    }

    /// Clear keys for current rebinding action and set new key
    pub fn set_key(&mut self, key_str: String, settings: &mut Settings) {
        if let Some(idx) = self.rebinding {
            if let Some(item) = self.items.get_mut(idx) {
                if let MenuItemType::KeyBind { action, keys } = &mut item.item_type {
                    keys.clear();
                    keys.push(key_str);
                    update_key_binding(settings, action, keys.clone());
                }
            }
        }
        self.rebinding = None;
    }

    /// Finish adding keys and exit rebind mode
    pub fn finish_rebind(&mut self) {
        self.rebinding = None;
    }

    pub fn go_to(&mut self, screen: MenuScreen, settings: &Settings, book: &ScoreBook) {
        *self = match screen {
            MenuScreen::Main => Self::main_menu(),
            MenuScreen::HighScores => Self::high_scores(book),
            MenuScreen::Settings => Self::settings_menu(),
            MenuScreen::SettingsKeys => Self::settings_keys(settings),
            MenuScreen::SettingsVisual => Self::settings_visual(settings),
            MenuScreen::SettingsGameplay => Self::settings_gameplay(settings),
        };
    }

    /// Go back to previous screen
    pub fn go_back(&mut self, settings: &Settings, book: &ScoreBook) {
        let prev = match self.screen {
            MenuScreen::Main => MenuScreen::Main,
            MenuScreen::HighScores => MenuScreen::Main,
            MenuScreen::Settings => MenuScreen::Main,
            MenuScreen::SettingsKeys => MenuScreen::Settings,
            MenuScreen::SettingsVisual => MenuScreen::Settings,
            MenuScreen::SettingsGameplay => MenuScreen::Settings,
        };
        self.go_to(prev, settings, book);
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper enum for setting values
enum SettingValue {
    Bool(bool),
    String(String),
    Number(u64),
}

/// Apply a setting change to the Settings struct
fn apply_setting(settings: &mut Settings, key: &SettingKey, value: &SettingValue) {
    match (key, value) {
        (SettingKey::ShowGhost, SettingValue::Bool(v)) => {
            settings.visual.show_ghost = *v;
        }
        (SettingKey::BlockStyle, SettingValue::String(v)) => {
            settings.visual.block_style = v.clone();
        }
        (SettingKey::DasTicks, SettingValue::Number(v)) => {
            settings.gameplay.das_ticks = *v as u32;
        }
        (SettingKey::ArrTicks, SettingValue::Number(v)) => {
            settings.gameplay.arr_ticks = *v as u32;
        }
        _ => {}
    }
}

/// Update a key binding in settings
fn update_key_binding(settings: &mut Settings, action: &str, keys: Vec<String>) {
    match action {
        "move_left" => settings.keys.move_left = keys,
        "move_right" => settings.keys.move_right = keys,
        "soft_drop" => settings.keys.soft_drop = keys,
        "hard_drop" => settings.keys.hard_drop = keys,
        "rotate_cw" => settings.keys.rotate_cw = keys,
        "rotate_ccw" => settings.keys.rotate_ccw = keys,
        "rotate_half" => settings.keys.rotate_half = keys,
        "hold" => settings.keys.hold = keys,
        "pause" => settings.keys.pause = keys,
        "quit" => settings.keys.quit = keys,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut menu = Menu::main_menu();
        menu.move_up();
        assert_eq!(menu.selected, menu.items.len() - 1);
        menu.move_down();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn number_adjustments_stay_clamped_and_sync_settings() {
        let mut settings = Settings::default();
        let mut menu = Menu::settings_gameplay(&settings);

        // DAS is first; hammer it below its minimum
        for _ in 0..50 {
            menu.adjust_left(&mut settings);
        }
        assert_eq!(settings.gameplay.das_ticks, 0);
        for _ in 0..50 {
            menu.adjust_right(&mut settings);
        }
        assert_eq!(settings.gameplay.das_ticks, 30);
    }

    #[test]
    fn set_key_replaces_the_whole_binding() {
        let mut settings = Settings::default();
        let mut menu = Menu::settings_keys(&settings);
        // Rotate CW starts with two keys bound
        menu.selected = 4;
        menu.start_rebind();
        assert_eq!(menu.rebinding, Some(4));

        menu.set_key("w".to_string(), &mut settings);
        assert_eq!(settings.keys.rotate_cw, vec!["w"]);
        assert_eq!(menu.rebinding, None);
    }

    #[test]
    fn add_key_appends_without_duplicates() {
        let mut settings = Settings::default();
        let mut menu = Menu::settings_keys(&settings);
        menu.selected = 0;
        menu.start_rebind();

        menu.add_key("h".to_string(), &mut settings);
        menu.add_key("h".to_string(), &mut settings);
        assert_eq!(settings.keys.move_left, vec!["Left", "h"]);
        // Still rebinding until finished explicitly
        assert_eq!(menu.rebinding, Some(0));
        menu.finish_rebind();
        assert_eq!(menu.rebinding, None);
    }

    #[test]
    fn empty_book_still_offers_a_way_back() {
        let menu = Menu::high_scores(&ScoreBook::default());
        assert!(matches!(
            menu.items.last().unwrap().item_type,
            MenuItemType::Button(MenuAction::Back)
        ));
        assert_eq!(menu.selected, menu.items.len() - 1);
    }
}
