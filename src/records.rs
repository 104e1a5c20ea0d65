//! High-score table and name filtering
//!
//! The score book lives next to the settings as
//! ~/.config/blockfall/scores.toml; an optional banned_names.txt in the
//! same directory vets what players may call themselves.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::settings::Settings;

/// Entries kept in the book.
pub const MAX_ENTRIES: usize = 10;
/// Longest player name accepted at entry.
pub const MAX_NAME_LEN: usize = 12;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
    pub lines: u32,
    /// Date as ISO string
    pub date: String,
}

/// The persisted top-ten, best first.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ScoreBook {
    pub entries: Vec<ScoreEntry>,
}

impl ScoreBook {
    fn path() -> Option<PathBuf> {
        Settings::config_dir().map(|dir| dir.join("scores.toml"))
    }

    /// Load the book from disk, or start empty
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Save the book to file
    pub fn save(&self) -> Result<(), String> {
        let Some(dir) = Settings::config_dir() else {
            return Err("Could not determine config directory".to_string());
        };
        let Some(path) = Self::path() else {
            return Err("Could not determine scores path".to_string());
        };

        fs::create_dir_all(&dir).map_err(|e| format!("Failed to create config dir: {}", e))?;
        let contents =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize: {}", e))?;
        fs::write(&path, contents).map_err(|e| format!("Failed to write scores: {}", e))?;

        Ok(())
    }

    /// Whether a finished session earns a slot in the book.
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        self.entries.len() < MAX_ENTRIES
            || self.entries.last().is_some_and(|worst| score > worst.score)
    }

    /// Insert an entry dated today, keeping the book sorted and capped.
    /// Equal scores rank the older entry first.
    pub fn record(&mut self, name: &str, score: u64, lines: u32) {
        let entry = ScoreEntry {
            name: name.to_string(),
            score,
            lines,
            date: Local::now().format("%Y-%m-%d").to_string(),
        };
        self.entries.push(entry);
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_ENTRIES);
    }

    pub fn best(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Case-insensitive substring filter for player names, fed from an
/// operator-editable word list. No list means everything passes.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    banned: Vec<String>,
}

/// Seed list written on first run. Players can edit the file freely;
/// emptying it (but keeping it) allows every name.
const DEFAULT_BANNED: &str = "\
# One banned substring per line, matched case-insensitively.
ass
sex
fuck
shit
nazi
";

impl NameFilter {
    fn path() -> Option<PathBuf> {
        Settings::config_dir().map(|dir| dir.join("banned_names.txt"))
    }

    /// Load the word list, one entry per line; `#` starts a comment.
    /// A missing file is seeded with the default list.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(contents) => Self::from_lines(&contents),
            Err(_) => {
                if let Some(dir) = Settings::config_dir() {
                    let _ = fs::create_dir_all(&dir);
                    if let Err(e) = fs::write(&path, DEFAULT_BANNED) {
                        tracing::warn!("could not seed the ban list: {}", e);
                    }
                }
                Self::from_lines(DEFAULT_BANNED)
            }
        }
    }

    fn from_lines(contents: &str) -> Self {
        let banned = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();
        Self { banned }
    }

    pub fn is_clean(&self, name: &str) -> bool {
        let lowered = name.to_lowercase();
        !self.banned.iter().any(|word| lowered.contains(word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_book() -> ScoreBook {
        let mut book = ScoreBook::default();
        for n in 1..=MAX_ENTRIES as u64 {
            book.record("player", n * 100, n as u32);
        }
        book
    }

    #[test]
    fn qualifies_until_the_book_fills() {
        let mut book = ScoreBook::default();
        assert!(book.qualifies(40));
        assert!(!book.qualifies(0));

        book = full_book();
        // Worst entry holds 100 points
        assert!(!book.qualifies(100));
        assert!(book.qualifies(101));
    }

    #[test]
    fn record_keeps_the_book_sorted_and_capped() {
        let mut book = full_book();
        book.record("ace", 2500, 30);
        assert_eq!(book.entries.len(), MAX_ENTRIES);
        assert_eq!(book.best(), Some(2500));
        assert_eq!(book.entries[0].name, "ace");
        // The old worst fell off the end
        assert_eq!(book.entries.last().unwrap().score, 200);
    }

    #[test]
    fn ties_rank_the_older_entry_first() {
        let mut book = ScoreBook::default();
        book.record("early", 300, 4);
        book.record("late", 300, 3);
        assert_eq!(book.entries[0].name, "early");
        assert_eq!(book.entries[1].name, "late");
    }

    #[test]
    fn filter_matches_substrings_case_insensitively() {
        let filter = NameFilter::from_lines("# comment\nrude\n  Wort  \n");
        assert!(!filter.is_clean("RuDeBoy"));
        assert!(!filter.is_clean("antwort"));
        assert!(filter.is_clean("polite"));
    }

    #[test]
    fn empty_list_allows_everything() {
        let filter = NameFilter::from_lines("# nothing banned\n\n");
        assert!(filter.is_clean("anything goes"));
    }

    #[test]
    fn shipped_list_blocks_its_words() {
        let filter = NameFilter::from_lines(DEFAULT_BANNED);
        assert!(!filter.is_clean("GrASShopper"));
        assert!(filter.is_clean("stacker"));
    }
}
