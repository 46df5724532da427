use std::fmt;

/// Rounds only ever move forward: Playing, then Revealed, then Completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RoundPhase {
    /// Cover down, switches can be flipped
    #[default]
    Playing,
    /// Cover lifted, the bulb is frozen and a guess is expected
    Revealed,
    /// Guess made. Terminal until the next round is created.
    Completed,
}

impl RoundPhase {
    pub fn can_advance_to(&self, next: RoundPhase) -> bool {
        matches!(
            (self, next),
            (RoundPhase::Playing, RoundPhase::Revealed)
                | (RoundPhase::Revealed, RoundPhase::Completed)
        )
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundPhase::Playing => "playing",
            RoundPhase::Revealed => "revealed",
            RoundPhase::Completed => "completed",
        };
        f.write_str(name)
    }
}
