use log::debug;
use std::time::Duration;
use uuid::Uuid;

use crate::events::EventEmitter;
use crate::model::RoundEvent;

/// How often a host should send `RoundCommand::Tick` while a timer is held
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Lease on the host's periodic tick source for one round's afterglow.
/// Announces itself on creation and announces its release when dropped, so
/// the host can never be left ticking for a round that moved on.
pub struct WarmTimer {
    round_id: Uuid,
    event_emitter: EventEmitter<RoundEvent>,
}

impl WarmTimer {
    pub fn start(round_id: Uuid, event_emitter: EventEmitter<RoundEvent>) -> Self {
        debug!(target: "round", "Warm timer started for round {}", round_id);
        event_emitter.emit(RoundEvent::WarmTimerStarted {
            round_id,
            interval: TICK_INTERVAL,
        });
        Self {
            round_id,
            event_emitter,
        }
    }

    pub fn round_id(&self) -> Uuid {
        self.round_id
    }
}

impl Drop for WarmTimer {
    fn drop(&mut self) {
        debug!(target: "round", "Warm timer stopped for round {}", self.round_id);
        self.event_emitter.emit(RoundEvent::WarmTimerStopped {
            round_id: self.round_id,
        });
    }
}
