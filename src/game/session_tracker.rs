use log::{debug, info, warn};
use std::rc::Rc;

use crate::error::StorageError;
use crate::model::{RecordedRound, RoundOutcome, SessionStats};
use crate::storage::KeyValueStore;

pub const STATS_KEY: &str = "light-switch-puzzle-stats";

/// Cumulative statistics for the session, mirrored into a key-value store.
/// Storage trouble is logged and otherwise ignored; gameplay never sees it.
pub struct SessionTracker {
    store: Rc<dyn KeyValueStore>,
    stats: SessionStats,
    auto_save: bool,
}

impl SessionTracker {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        let stats = Self::load(store.as_ref());
        Self {
            store,
            stats,
            auto_save: true,
        }
    }

    /// Stored stats, or zeroed stats when nothing usable is stored
    pub fn load(store: &dyn KeyValueStore) -> SessionStats {
        match store.get(STATS_KEY) {
            Ok(Some(contents)) => match SessionStats::from_json(&contents) {
                Some(stats) => {
                    debug!(target: "session", "Loaded stats: {:?}", stats);
                    stats
                }
                None => {
                    warn!(target: "session", "Discarding invalid stored stats");
                    SessionStats::default()
                }
            },
            Ok(None) => SessionStats::default(),
            Err(e) => {
                warn!(target: "session", "Failed to load stats: {}", e);
                SessionStats::default()
            }
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn auto_save(&self) -> bool {
        self.auto_save
    }

    pub fn set_auto_save(&mut self, auto_save: bool) {
        self.auto_save = auto_save;
    }

    pub fn record(&mut self, outcome: &RoundOutcome) -> RecordedRound {
        let recorded = self.stats.record_outcome(outcome);
        self.stats = recorded.stats;
        info!(
            target: "session",
            "Round {} finished; correct: {}; score: {}; streak: {}",
            outcome.round_id, outcome.correct, recorded.score, self.stats.current_streak
        );
        if self.auto_save {
            self.persist();
        }
        recorded
    }

    pub fn try_persist(&self) -> Result<(), StorageError> {
        let contents = serde_json::to_string(&self.stats)?;
        self.store.set(STATS_KEY, &contents)
    }

    pub fn persist(&self) {
        if let Err(e) = self.try_persist() {
            warn!(target: "session", "Failed to save stats: {}", e);
        }
    }

    pub fn clear(&mut self) {
        self.stats = SessionStats::default();
        if let Err(e) = self.store.remove(STATS_KEY) {
            warn!(target: "session", "Failed to clear stored stats: {}", e);
        }
    }
}
