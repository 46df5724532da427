use serde::{Deserialize, Serialize};

use super::{Difficulty, RoundOutcome};

/// Every correct answer earns this much before the time bonus
pub const BASE_SCORE: f64 = 100.0;
/// Seconds within which a correct answer still earns a time bonus
pub const BONUS_WINDOW_SECS: f64 = 60.0;
pub const BONUS_PER_SECOND: f64 = 2.0;

/// Cumulative results across every round the player has finished.
///
/// Stored as camelCase JSON. Deserializing demands every field with the right
/// numeric type; see [`SessionStats::from_json`] for the extra sanity checks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_attempts: u64,
    pub correct_guesses: u64,
    pub average_time_seconds: f64,
    pub high_score: u64,
    pub best_streak: u64,
    pub current_streak: u64,
}

/// Stats after a round was recorded, plus what that round scored
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedRound {
    pub stats: SessionStats,
    pub score: u64,
}

/// Points for a correct answer given after `elapsed_seconds`
pub fn round_score(elapsed_seconds: f64, difficulty: Difficulty) -> u64 {
    let elapsed = elapsed_seconds.max(0.0);
    let time_bonus = (BONUS_WINDOW_SECS - elapsed).max(0.0) * BONUS_PER_SECOND;
    ((BASE_SCORE + time_bonus) * difficulty.score_multiplier()).round() as u64
}

impl SessionStats {
    pub fn record_outcome(&self, outcome: &RoundOutcome) -> RecordedRound {
        let elapsed = outcome.elapsed_seconds.max(0.0);
        let mut next = *self;

        let previous_count = self.total_attempts as f64;
        next.average_time_seconds =
            (self.average_time_seconds * previous_count + elapsed) / (previous_count + 1.0);
        next.total_attempts = next.total_attempts.saturating_add(1);

        let score = if outcome.correct {
            let score = round_score(elapsed, outcome.difficulty);
            next.correct_guesses = next.correct_guesses.saturating_add(1);
            next.high_score = next.high_score.max(score);
            next.current_streak = next.current_streak.saturating_add(1);
            next.best_streak = next.best_streak.max(next.current_streak);
            score
        } else {
            next.current_streak = 0;
            0
        };

        RecordedRound { stats: next, score }
    }

    /// Percentage of attempts answered correctly
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            self.correct_guesses as f64 / self.total_attempts as f64 * 100.0
        }
    }

    /// Relationships between fields that any genuinely recorded history satisfies
    pub fn is_consistent(&self) -> bool {
        self.correct_guesses <= self.total_attempts
            && self.average_time_seconds.is_finite()
            && self.average_time_seconds >= 0.0
            && self.current_streak <= self.best_streak
            && self.best_streak <= self.correct_guesses
    }

    /// Parse stored stats, refusing anything partial, mistyped or inconsistent
    pub fn from_json(contents: &str) -> Option<SessionStats> {
        serde_json::from_str::<SessionStats>(contents)
            .ok()
            .filter(SessionStats::is_consistent)
    }
}
