//! Game-over flow
//!
//! Reports the finished run to the score backend exactly once per
//! (player, score) pair and builds the leaderboard shown afterwards. Backend
//! trouble never reaches the simulation: transport failures show an empty
//! board, malformed payloads add a notice.

use chrono::{DateTime, Utc};

use crate::consts::LEADERBOARD_SIZE;
use crate::error::ScoreError;
use crate::highscores::{HighScore, ScoreBackend, timestamp_to_date};
use crate::platform::KeyValueStore;

/// Marker remembering that a (player, score) pair was already reported
pub fn submitted_marker_key(player_name: &str, score: u64) -> String {
    format!("saved_score_{}_{}", player_name, score)
}

/// What happened to the finished run's score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    /// The same pair was reported before; nothing sent
    AlreadySubmitted,
    /// The backend refused or was unreachable; may be retried
    Failed,
}

/// Submit the score unless this pair was submitted already.
///
/// The marker is written only after the backend accepted the entry, so a
/// failed submission is retried the next time the screen opens.
pub fn submit_once(
    backend: &mut impl ScoreBackend,
    store: &mut impl KeyValueStore,
    player_name: &str,
    score: u64,
    now_ms: f64,
) -> SubmitOutcome {
    let key = submitted_marker_key(player_name, score);
    match store.get_item(&key) {
        Ok(Some(_)) => return SubmitOutcome::AlreadySubmitted,
        Ok(None) => {}
        Err(e) => log::warn!("Could not read submit marker: {}", e),
    }

    match backend.submit_score(HighScore::new(player_name, score, now_ms)) {
        Ok(()) => {
            log::info!("Submitted score {} for {}", score, player_name);
            if let Err(e) = store.set_item(&key, "true") {
                log::warn!("Could not store submit marker: {}", e);
            }
            SubmitOutcome::Submitted
        }
        Err(e) => {
            log::warn!("Failed to save score: {}", e);
            SubmitOutcome::Failed
        }
    }
}

/// Leaderboard position a score would hold: one more than the number of
/// strictly better entries
pub fn rank_for(entries: &[HighScore], score: u64) -> usize {
    1 + entries.iter().filter(|e| e.score > score).count()
}

/// Leaderboard as shown on the game-over screen
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardView {
    pub entries: Vec<HighScore>,
    pub player_name: String,
    pub score: u64,
    pub player_rank: usize,
    /// User-visible problem with the payload
    pub notice: Option<String>,
}

impl LeaderboardView {
    pub const LOAD_FAILED: &'static str = "Failed to load leaderboard";

    pub fn load(backend: &impl ScoreBackend, player_name: &str, score: u64) -> Self {
        let (entries, notice) = match backend.fetch_top_scores(LEADERBOARD_SIZE) {
            Ok(entries) => (entries, None),
            Err(ScoreError::Malformed(reason)) => {
                log::warn!("Rejected leaderboard payload: {}", reason);
                (Vec::new(), Some(Self::LOAD_FAILED.to_string()))
            }
            Err(e) => {
                log::warn!("Could not fetch leaderboard: {}", e);
                (Vec::new(), None)
            }
        };

        Self {
            player_rank: rank_for(&entries, score),
            entries,
            player_name: player_name.to_string(),
            score,
            notice,
        }
    }

    /// Entries belonging to this run are highlighted
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| e.player_name == self.player_name && e.score == self.score)
    }

    pub fn made_top_ten(&self) -> bool {
        self.player_rank <= LEADERBOARD_SIZE
    }

    pub fn lines(&self, now: DateTime<Utc>) -> Vec<String> {
        if let Some(notice) = &self.notice {
            return vec![notice.clone()];
        }

        let mut lines = vec!["High Scores".to_string()];
        let badge = if self.made_top_ten() { " !" } else { "" };
        lines.push(format!("Your rank: #{}{}", self.player_rank, badge));

        if self.entries.is_empty() {
            lines.push("Be the first to set a high score!".to_string());
        }
        for (i, e) in self.entries.iter().enumerate() {
            let mark = if self.is_highlighted(i) { '>' } else { ' ' };
            lines.push(format!(
                "{}{:>2}. {:<20} {:>6}  {}",
                mark,
                i + 1,
                e.player_name,
                e.score,
                crate::highscores::format_date(e.date, now)
            ));
        }
        lines
    }
}

/// Everything the game-over screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverScreen {
    pub player_name: String,
    pub score: u64,
    pub submit: SubmitOutcome,
    pub leaderboard: LeaderboardView,
    pub opened_at: DateTime<Utc>,
}

impl GameOverScreen {
    /// Report the run (once) and load the board
    pub fn open(
        backend: &mut impl ScoreBackend,
        store: &mut impl KeyValueStore,
        player_name: &str,
        score: u64,
        now_ms: f64,
    ) -> Self {
        let submit = submit_once(backend, store, player_name, score, now_ms);
        let leaderboard = LeaderboardView::load(backend, player_name, score);
        Self {
            player_name: player_name.to_string(),
            score,
            submit,
            leaderboard,
            opened_at: timestamp_to_date(now_ms),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "Game Over!".to_string(),
            format!("Player: {}", self.player_name),
            format!("Final score: {}", self.score),
        ];
        if self.submit == SubmitOutcome::Failed {
            lines.push("Score could not be saved".to_string());
        }
        lines.push(String::new());
        lines.extend(self.leaderboard.lines(self.opened_at));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::MemoryScoreBackend;
    use crate::platform::MemoryStorage;

    const NOW: f64 = 1_700_000_000_000.0;

    /// Backend that always fails the same way
    struct BrokenBackend(fn() -> ScoreError);

    impl ScoreBackend for BrokenBackend {
        fn submit_score(&mut self, _entry: HighScore) -> Result<(), ScoreError> {
            Err((self.0)())
        }

        fn fetch_top_scores(&self, _limit: usize) -> Result<Vec<HighScore>, ScoreError> {
            Err((self.0)())
        }
    }

    fn offline() -> ScoreError {
        ScoreError::Transport("offline".into())
    }

    fn garbage() -> ScoreError {
        ScoreError::Malformed("expected a list".into())
    }

    #[test]
    fn test_same_pair_submitted_once() {
        let mut backend = MemoryScoreBackend::new();
        let mut store = MemoryStorage::new();

        assert_eq!(
            submit_once(&mut backend, &mut store, "ana", 42, NOW),
            SubmitOutcome::Submitted
        );
        assert_eq!(
            submit_once(&mut backend, &mut store, "ana", 42, NOW + 10.0),
            SubmitOutcome::AlreadySubmitted
        );
        assert_eq!(backend.board().len(), 1);

        // A different score is a new pair
        submit_once(&mut backend, &mut store, "ana", 43, NOW);
        assert_eq!(backend.board().len(), 2);
        assert!(store.get_item("saved_score_ana_42").unwrap().is_some());
    }

    #[test]
    fn test_failed_submit_leaves_no_marker() {
        let mut store = MemoryStorage::new();
        let outcome = submit_once(&mut BrokenBackend(offline), &mut store, "bo", 7, NOW);
        assert_eq!(outcome, SubmitOutcome::Failed);
        assert!(store.is_empty());

        let mut backend = MemoryScoreBackend::new();
        assert_eq!(
            submit_once(&mut backend, &mut store, "bo", 7, NOW),
            SubmitOutcome::Submitted
        );
    }

    #[test]
    fn test_rank_counts_strictly_better() {
        let entries: Vec<HighScore> = [90, 50, 50, 10]
            .iter()
            .map(|&s| HighScore::new("x", s, NOW))
            .collect();
        assert_eq!(rank_for(&entries, 100), 1);
        assert_eq!(rank_for(&entries, 50), 2);
        assert_eq!(rank_for(&entries, 0), 5);
        assert_eq!(rank_for(&[], 0), 1);
    }

    #[test]
    fn test_view_highlights_own_entry() {
        let mut backend = MemoryScoreBackend::new();
        let mut store = MemoryStorage::new();
        submit_once(&mut backend, &mut store, "cy", 80, NOW);
        submit_once(&mut backend, &mut store, "ana", 30, NOW);

        let view = LeaderboardView::load(&backend, "ana", 30);
        assert_eq!(view.player_rank, 2);
        assert!(!view.is_highlighted(0));
        assert!(view.is_highlighted(1));
        assert!(view.notice.is_none());
    }

    #[test]
    fn test_transport_error_shows_empty_board() {
        let view = LeaderboardView::load(&BrokenBackend(offline), "ana", 5);
        assert!(view.entries.is_empty());
        assert_eq!(view.player_rank, 1);
        assert!(view.notice.is_none());
        let lines = view.lines(timestamp_to_date(NOW));
        assert!(lines.iter().any(|l| l.starts_with("Be the first")));
    }

    #[test]
    fn test_malformed_payload_shows_notice() {
        let view = LeaderboardView::load(&BrokenBackend(garbage), "ana", 5);
        assert!(view.entries.is_empty());
        assert_eq!(view.notice.as_deref(), Some(LeaderboardView::LOAD_FAILED));
        assert_eq!(view.lines(timestamp_to_date(NOW)), vec![LeaderboardView::LOAD_FAILED]);
    }

    #[test]
    fn test_screen_reports_and_lists() {
        let mut backend = MemoryScoreBackend::new();
        let mut store = MemoryStorage::new();
        let screen = GameOverScreen::open(&mut backend, &mut store, "dee", 12, NOW);
        assert_eq!(screen.submit, SubmitOutcome::Submitted);
        assert_eq!(screen.leaderboard.entries.len(), 1);

        let lines = screen.lines();
        assert_eq!(lines[0], "Game Over!");
        assert!(lines.iter().any(|l| l.contains("Final score: 12")));
        assert!(lines.iter().any(|l| l.starts_with("> 1. dee")));

        let again = GameOverScreen::open(&mut backend, &mut store, "dee", 12, NOW);
        assert_eq!(again.submit, SubmitOutcome::AlreadySubmitted);
        assert_eq!(again.leaderboard.entries.len(), 1);
    }
}
