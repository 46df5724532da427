use crate::destroyable::Destroyable;
use crate::events::EventHandler;
use crate::model::{RoundEvent, SessionStats};
use std::cell::RefCell;
use std::rc::Rc;

/// Latest statistics and last round score, for a stats panel
pub struct StatsProjection {
    stats: SessionStats,
    last_score: Option<u64>,
}

impl Destroyable for StatsProjection {
    fn destroy(&mut self) {
        // No-op: handled centrally
    }
}

impl StatsProjection {
    pub fn new(initial: &SessionStats) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            stats: *initial,
            last_score: None,
        }))
    }

    pub fn current_stats(&self) -> SessionStats {
        self.stats
    }

    pub fn last_score(&self) -> Option<u64> {
        self.last_score
    }
}

impl EventHandler<RoundEvent> for StatsProjection {
    fn handle_event(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::StatsChanged(stats) => {
                self.stats = *stats;
            }
            RoundEvent::RoundCompleted(completion) => {
                self.stats = completion.stats;
                self.last_score = Some(completion.score);
            }
            RoundEvent::RoundStarted { .. } => {
                self.last_score = None;
            }
            _ => {}
        }
    }
}
