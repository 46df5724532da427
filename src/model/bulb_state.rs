/// What the player would see if the cover were lifted right now
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BulbState {
    #[default]
    Off,
    On,
    /// Switched off recently enough that the filament still glows
    Warm { remaining_secs: f64 },
}

impl BulbState {
    pub fn is_on(&self) -> bool {
        matches!(self, BulbState::On)
    }

    pub fn is_warm(&self) -> bool {
        matches!(self, BulbState::Warm { .. })
    }

    pub fn is_off(&self) -> bool {
        matches!(self, BulbState::Off)
    }

    pub fn remaining_secs(&self) -> f64 {
        match self {
            BulbState::Warm { remaining_secs } => *remaining_secs,
            _ => 0.0,
        }
    }

    /// Share of the difficulty's full afterglow still left, in `0.0..=1.0`.
    /// Drives the progress ring around a warm bulb.
    pub fn warm_fraction(&self, warm_time_secs: f64) -> f64 {
        if warm_time_secs <= 0.0 {
            return 0.0;
        }
        (self.remaining_secs() / warm_time_secs).clamp(0.0, 1.0)
    }
}
