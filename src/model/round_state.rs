use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use uuid::Uuid;

use super::{BulbState, Difficulty, RoundOutcome, RoundPhase, TimerState};
use crate::clock::{elapsed_ms, Millis};
use crate::error::RoundError;

pub const SWITCH_COUNT: usize = 3;

/// Afterglow bookkeeping. Remaining time is always recomputed from the release
/// instant so repeated ticks cannot accumulate rounding drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Afterglow {
    released_at: Millis,
    initial_ms: Millis,
    last_tick_at: Millis,
}

impl Afterglow {
    fn remaining_ms(&self) -> Millis {
        self.initial_ms
            .saturating_sub(elapsed_ms(self.released_at, self.last_tick_at))
    }
}

/// One puzzle attempt. Transitions return a new state and leave `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    id: Uuid,
    seed: u64,
    difficulty: Difficulty,
    answer_switch: usize,
    switch_on: [bool; SWITCH_COUNT],
    bulb: BulbState,
    phase: RoundPhase,
    correct_switch_on_at: Option<Millis>,
    afterglow: Option<Afterglow>,
    selected_switch: Option<usize>,
    timer: TimerState,
}

impl RoundState {
    /// Start a round with a hidden answer drawn uniformly from the switches.
    /// Passing the same seed replays the same answer.
    pub fn new(difficulty: Difficulty, seed: Option<u64>, now: Millis) -> Self {
        let seed = seed.unwrap_or_else(|| rand::rng().next_u64());
        let mut rng = StdRng::seed_from_u64(seed);
        let answer_switch = rng.random_range(0..SWITCH_COUNT);
        let round = Self::build(difficulty, seed, answer_switch, now);
        debug!(
            target: "round",
            "Created round {}; difficulty: {}; seed: {}",
            round.id, difficulty, seed
        );
        round
    }

    /// Start a round whose answer is already known, e.g. a replay or a tutorial
    pub fn with_answer(
        difficulty: Difficulty,
        answer_switch: usize,
        now: Millis,
    ) -> Result<Self, RoundError> {
        if answer_switch >= SWITCH_COUNT {
            return Err(RoundError::SwitchOutOfRange(answer_switch));
        }
        Ok(Self::build(difficulty, 0, answer_switch, now))
    }

    /// A fresh attempt at the same puzzle: same difficulty, seed and answer
    pub fn restarted(&self, now: Millis) -> Self {
        let round = Self::build(self.difficulty, self.seed, self.answer_switch, now);
        debug!(target: "round", "Restarted round {} as {}", self.id, round.id);
        round
    }

    fn build(difficulty: Difficulty, seed: u64, answer_switch: usize, now: Millis) -> Self {
        Self {
            id: Uuid::new_v4(),
            seed,
            difficulty,
            answer_switch,
            switch_on: [false; SWITCH_COUNT],
            bulb: BulbState::Off,
            phase: RoundPhase::Playing,
            correct_switch_on_at: None,
            afterglow: None,
            selected_switch: None,
            timer: TimerState::started(now),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn answer_switch(&self) -> usize {
        self.answer_switch
    }

    pub fn switch_states(&self) -> [bool; SWITCH_COUNT] {
        self.switch_on
    }

    pub fn bulb(&self) -> BulbState {
        self.bulb
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn correct_switch_on_at(&self) -> Option<Millis> {
        self.correct_switch_on_at
    }

    pub fn selected_switch(&self) -> Option<usize> {
        self.selected_switch
    }

    pub fn started_at(&self) -> Millis {
        self.timer.started_at
    }

    pub fn timer(&self) -> TimerState {
        self.timer
    }

    /// True while the bulb is counting down and something should keep ticking
    pub fn needs_ticks(&self) -> bool {
        self.phase == RoundPhase::Playing && self.bulb.is_warm()
    }

    pub fn warm_fraction(&self) -> f64 {
        self.bulb.warm_fraction(self.difficulty.warm_time_secs())
    }

    /// Flip one switch. A toggle that arrives after the cover was lifted is a
    /// harmless UI race and leaves the round unchanged.
    pub fn toggled(&self, index: usize, now: Millis) -> Result<RoundState, RoundError> {
        if index >= SWITCH_COUNT {
            return Err(RoundError::SwitchOutOfRange(index));
        }
        if self.phase != RoundPhase::Playing {
            trace!(target: "round", "Ignoring toggle of switch {} while {}", index, self.phase);
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.switch_on[index] = !next.switch_on[index];

        // only the answer switch is wired to the bulb
        if index == self.answer_switch {
            if next.switch_on[index] {
                next.bulb = BulbState::On;
                next.correct_switch_on_at = Some(now);
                next.afterglow = None;
            } else {
                next.release_answer_switch(now);
            }
        }
        Ok(next)
    }

    fn release_answer_switch(&mut self, now: Millis) {
        let held_ms = self
            .correct_switch_on_at
            .take()
            .map(|on_at| elapsed_ms(on_at, now))
            .unwrap_or(0);
        let settings = self.difficulty.settings();

        if held_ms < settings.min_on_time_ms {
            debug!(
                target: "round",
                "Answer switch held {}ms (< {}ms); no afterglow",
                held_ms, settings.min_on_time_ms
            );
            self.bulb = BulbState::Off;
            self.afterglow = None;
            return;
        }

        let cap_ms = (settings.warm_time_secs * 1000.0).round() as Millis;
        let initial_ms = held_ms.min(cap_ms);
        self.afterglow = Some(Afterglow {
            released_at: now,
            initial_ms,
            last_tick_at: now,
        });
        self.bulb = BulbState::Warm {
            remaining_secs: initial_ms as f64 / 1000.0,
        };
        debug!(
            target: "round",
            "Answer switch held {}ms; warm for {}ms",
            held_ms, initial_ms
        );
    }

    /// Let the afterglow decay up to `now`. Safe to call as often as wanted:
    /// only the wall-clock time since release matters, never the call count.
    pub fn ticked(&self, now: Millis) -> RoundState {
        if !self.needs_ticks() {
            return self.clone();
        }
        let Some(afterglow) = self.afterglow else {
            return self.clone();
        };

        let mut next = self.clone();
        let ticked = Afterglow {
            last_tick_at: afterglow.last_tick_at.max(now),
            ..afterglow
        };
        let remaining_ms = ticked.remaining_ms();
        if remaining_ms == 0 {
            trace!(target: "round", "Afterglow faded in round {}", self.id);
            next.bulb = BulbState::Off;
            next.afterglow = None;
        } else {
            next.bulb = BulbState::Warm {
                remaining_secs: remaining_ms as f64 / 1000.0,
            };
            next.afterglow = Some(ticked);
        }
        next
    }

    /// Lift the cover. Whatever the bulb shows at `now` is frozen for the guess.
    pub fn revealed(&self, now: Millis) -> RoundState {
        if self.phase != RoundPhase::Playing {
            trace!(target: "round", "Ignoring reveal while {}", self.phase);
            return self.clone();
        }
        let mut next = self.ticked(now);
        next.phase = RoundPhase::Revealed;
        debug!(target: "round", "Round {} revealed with bulb {:?}", self.id, next.bulb);
        next
    }

    /// Make the one guess a round allows
    pub fn guessed(
        &self,
        switch_index: usize,
        now: Millis,
    ) -> Result<(RoundState, RoundOutcome), RoundError> {
        match self.phase {
            RoundPhase::Playing => return Err(RoundError::GuessBeforeReveal),
            RoundPhase::Completed => return Err(RoundError::AlreadyCompleted),
            RoundPhase::Revealed => {}
        }
        if switch_index >= SWITCH_COUNT {
            return Err(RoundError::SwitchOutOfRange(switch_index));
        }

        let mut next = self.clone();
        next.selected_switch = Some(switch_index);
        next.phase = RoundPhase::Completed;
        next.correct_switch_on_at = None;
        next.afterglow = None;
        next.timer = self.timer.ended(now);

        let outcome = RoundOutcome {
            round_id: self.id,
            difficulty: self.difficulty,
            selected_switch: switch_index,
            answer_switch: self.answer_switch,
            correct: switch_index == self.answer_switch,
            elapsed_seconds: next.timer.elapsed_secs(now),
        };
        Ok((next, outcome))
    }
}
