//! High score leaderboard
//!
//! Tracks the top 10 scores, sorted descending. Backends hold the list either
//! in memory (a shared scoreboard for the process) or persisted as JSON in a
//! key-value store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::LEADERBOARD_SIZE;
use crate::error::ScoreError;
use crate::platform::KeyValueStore;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScore {
    pub player_name: String,
    pub score: u64,
    /// When the run ended
    pub date: DateTime<Utc>,
}

impl HighScore {
    pub fn new(player_name: impl Into<String>, score: u64, now_ms: f64) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            date: timestamp_to_date(now_ms),
        }
    }
}

/// Unix milliseconds to a UTC date; out-of-range values map to the epoch
pub fn timestamp_to_date(ms: f64) -> DateTime<Utc> {
    if !ms.is_finite() {
        return DateTime::default();
    }
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

/// Top scores, sorted descending
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(transparent)]
pub struct Leaderboard {
    pub entries: Vec<HighScore>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from arbitrary entries, restoring order and size
    pub fn from_entries(mut entries: Vec<HighScore>) -> Self {
        // Stable: equal scores keep arrival order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEADERBOARD_SIZE);
        Self { entries }
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < LEADERBOARD_SIZE {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score; returns the rank achieved (1-indexed) or None if it fell off
    pub fn add(&mut self, entry: HighScore) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }

        // Later arrivals rank below equal scores
        let pos = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(LEADERBOARD_SIZE);

        Some(pos + 1)
    }

    pub fn top(&self, limit: usize) -> Vec<HighScore> {
        self.entries.iter().take(limit).cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Where finished runs are reported and the leaderboard is read from
pub trait ScoreBackend {
    fn submit_score(&mut self, entry: HighScore) -> Result<(), ScoreError>;
    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<HighScore>, ScoreError>;
}

/// Process-local scoreboard
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreBackend {
    board: Leaderboard,
}

impl MemoryScoreBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Leaderboard {
        &self.board
    }
}

impl ScoreBackend for MemoryScoreBackend {
    fn submit_score(&mut self, entry: HighScore) -> Result<(), ScoreError> {
        validate_entry(&entry)?;
        self.board.add(entry);
        Ok(())
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<HighScore>, ScoreError> {
        Ok(self.board.top(limit))
    }
}

/// Leaderboard persisted as a JSON array in a key-value store
#[derive(Debug)]
pub struct StoredScoreBackend<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> StoredScoreBackend<S> {
    pub const STORAGE_KEY: &'static str = "cursor_chase_highscores";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn load(&self) -> Result<Leaderboard, ScoreError> {
        match self.store.get_item(Self::STORAGE_KEY)? {
            Some(json) => Ok(Leaderboard::from_entries(parse_leaderboard(&json)?)),
            None => Ok(Leaderboard::new()),
        }
    }
}

impl<S: KeyValueStore> ScoreBackend for StoredScoreBackend<S> {
    fn submit_score(&mut self, entry: HighScore) -> Result<(), ScoreError> {
        validate_entry(&entry)?;
        let mut board = match self.load() {
            Ok(board) => board,
            Err(ScoreError::Malformed(reason)) => {
                log::warn!("Stored leaderboard is corrupt ({}), starting over", reason);
                Leaderboard::new()
            }
            Err(e) => return Err(e),
        };

        if let Some(rank) = board.add(entry) {
            log::info!("Score entered the leaderboard at #{}", rank);
        }
        let json = serde_json::to_string(&board)
            .map_err(|e| ScoreError::Malformed(e.to_string()))?;
        self.store.set_item(Self::STORAGE_KEY, &json)?;
        Ok(())
    }

    fn fetch_top_scores(&self, limit: usize) -> Result<Vec<HighScore>, ScoreError> {
        Ok(self.load()?.top(limit))
    }
}

fn validate_entry(entry: &HighScore) -> Result<(), ScoreError> {
    if entry.player_name.trim().is_empty() {
        return Err(ScoreError::Malformed("entry without a player name".into()));
    }
    Ok(())
}

/// Decode a leaderboard payload, rejecting anything that is not a list of
/// named entries
pub fn parse_leaderboard(json: &str) -> Result<Vec<HighScore>, ScoreError> {
    let entries: Vec<HighScore> =
        serde_json::from_str(json).map_err(|e| ScoreError::Malformed(e.to_string()))?;
    for entry in &entries {
        validate_entry(entry)?;
    }
    Ok(entries)
}

/// Format a date relative to `now`
pub fn format_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(date);
    let days = diff.num_days();
    let hours = diff.num_hours();
    let mins = diff.num_minutes();

    if days >= 1 {
        if days == 1 {
            "Yesterday".to_string()
        } else if days < 7 {
            format!("{} days ago", days)
        } else {
            date.format("%-m/%-d/%y").to_string()
        }
    } else if hours >= 1 {
        if hours == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", hours)
        }
    } else if mins >= 1 {
        if mins == 1 {
            "1 min ago".to_string()
        } else {
            format!("{} mins ago", mins)
        }
    } else {
        "Just now".to_string()
    }
}
