use uuid::Uuid;

use super::Difficulty;
use crate::game::settings::SettingsChange;

#[derive(Debug, Clone)]
pub enum RoundCommand {
    ToggleSwitch(usize),
    Reveal,
    Guess(usize),
    Tick(Uuid), // id of the round the timer was started for
    NewRound(Option<Difficulty>, Option<u64>), // difficulty, seed
    Restart,
    ShowHelp,
    ClearStats,
    ChangeSettings(SettingsChange),
}
