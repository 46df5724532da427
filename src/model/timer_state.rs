use crate::clock::{elapsed_ms, Millis};

/// Wall-clock span of a round. Stops advancing once ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerState {
    pub started_at: Millis,
    pub ended_at: Option<Millis>,
}

impl TimerState {
    pub fn started(now: Millis) -> Self {
        Self {
            started_at: now,
            ended_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ended_at.is_none()
    }

    pub fn elapsed_ms(&self, now: Millis) -> Millis {
        let until = self.ended_at.unwrap_or(now);
        elapsed_ms(self.started_at, until)
    }

    pub fn elapsed_secs(&self, now: Millis) -> f64 {
        self.elapsed_ms(now) as f64 / 1000.0
    }

    /// The whole-second counter shown while a round is being played
    pub fn whole_seconds(&self, now: Millis) -> u64 {
        self.elapsed_ms(now) / 1000
    }

    pub fn ended(&self, now: Millis) -> TimerState {
        let mut new_state = *self;
        if new_state.ended_at.is_none() {
            new_state.ended_at = Some(now);
        }
        new_state
    }
}
