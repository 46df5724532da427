use std::time::Duration;

use uuid::Uuid;

use super::{BulbState, Difficulty, RoundOutcome, RoundPhase, SessionStats, SWITCH_COUNT};
use crate::game::settings::Settings;

#[derive(Debug, Clone, PartialEq)]
pub struct RoundCompletion {
    pub outcome: RoundOutcome,
    pub score: u64,
    pub stats: SessionStats,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    RoundStarted {
        round_id: Uuid,
        difficulty: Difficulty,
    },
    SwitchesChanged([bool; SWITCH_COUNT]),
    BulbChanged(BulbState),
    PhaseChanged(RoundPhase),
    WarmTimerStarted {
        round_id: Uuid,
        interval: Duration,
    },
    WarmTimerStopped {
        round_id: Uuid,
    },
    RoundCompleted(RoundCompletion),
    StatsChanged(SessionStats),
    SettingsChanged(Settings),
    HelpRequested,
    InvalidCommand(String),
}
