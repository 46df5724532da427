use uuid::Uuid;

use super::Difficulty;

/// Result of the single guess a round allows
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub round_id: Uuid,
    pub difficulty: Difficulty,
    pub selected_switch: usize,
    pub answer_switch: usize,
    pub correct: bool,
    pub elapsed_seconds: f64,
}
