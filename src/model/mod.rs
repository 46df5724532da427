mod bulb_state;
mod difficulty;
mod input_event;
mod round_command;
mod round_event;
mod round_outcome;
mod round_phase;
mod round_state;
pub mod session_stats;
mod stats_projection;
mod theme;
mod timer_state;

pub use bulb_state::BulbState;
pub use difficulty::{Difficulty, DifficultySettings};
pub use input_event::InputEvent;
pub use round_command::RoundCommand;
pub use round_event::{RoundCompletion, RoundEvent};
pub use round_outcome::RoundOutcome;
pub use round_phase::RoundPhase;
pub use round_state::{RoundState, SWITCH_COUNT};
pub use session_stats::{round_score, RecordedRound, SessionStats};
pub use stats_projection::StatsProjection;
pub use theme::Theme;
pub use timer_state::TimerState;
