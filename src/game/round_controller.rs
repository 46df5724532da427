use log::{info, trace, warn};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use uuid::Uuid;

use super::session_tracker::SessionTracker;
use super::settings::{Settings, SettingsChange};
use super::warm_timer::WarmTimer;
use crate::clock::{Clock, Millis};
use crate::destroyable::Destroyable;
use crate::error::RoundError;
use crate::events::{EventEmitter, EventObserver, Unsubscriber};
use crate::model::{
    Difficulty, RoundCommand, RoundCompletion, RoundEvent, RoundPhase, RoundState, SessionStats,
};
use crate::storage::KeyValueStore;

/// Drives one player's session: turns commands into round transitions, keeps
/// the afterglow timer lease, and hands finished rounds to the tracker.
pub struct RoundController {
    round: RoundState,
    clock: Rc<dyn Clock>,
    store: Rc<dyn KeyValueStore>,
    tracker: SessionTracker,
    settings: Settings,
    warm_timer: Option<WarmTimer>,
    subscription: Option<Unsubscriber<RoundCommand>>,
    round_event_emitter: EventEmitter<RoundEvent>,
}

impl Destroyable for RoundController {
    fn destroy(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.warm_timer = None;
    }
}

impl RoundController {
    /// Settings and stats are read from `store`. No round events are emitted
    /// until the first `NewRound`.
    pub fn new(
        round_command_observer: EventObserver<RoundCommand>,
        round_event_emitter: EventEmitter<RoundEvent>,
        clock: Rc<dyn Clock>,
        store: Rc<dyn KeyValueStore>,
    ) -> Rc<RefCell<Self>> {
        let settings = Settings::load(store.as_ref());
        let mut tracker = SessionTracker::new(store.clone());
        tracker.set_auto_save(settings.auto_save);
        let round = RoundState::new(settings.difficulty, None, clock.now());

        let controller = Self {
            round,
            clock,
            store,
            tracker,
            settings,
            warm_timer: None,
            subscription: None,
            round_event_emitter,
        };
        let refcell = Rc::new(RefCell::new(controller));
        RoundController::wire_subscription(refcell.clone(), round_command_observer);
        refcell
    }

    fn wire_subscription(
        controller: Rc<RefCell<Self>>,
        round_command_observer: EventObserver<RoundCommand>,
    ) {
        let handler = controller.clone();
        let pending = Rc::new(RefCell::new(VecDeque::new()));
        let subscription = round_command_observer.subscribe(move |command| {
            pending.borrow_mut().push_back(command.clone());
            // a listener answering one of our events lands here while the
            // controller is still busy; the outer call drains the queue
            let Ok(mut controller) = handler.try_borrow_mut() else {
                trace!(target: "round", "Deferring command: {:?}", command);
                return;
            };
            loop {
                let next = pending.borrow_mut().pop_front();
                match next {
                    Some(command) => controller.handle_command(command),
                    None => break,
                }
            }
        });
        controller.borrow_mut().subscription = Some(subscription);
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> SessionStats {
        self.tracker.stats()
    }

    pub fn has_warm_timer(&self) -> bool {
        self.warm_timer.is_some()
    }

    fn handle_command(&mut self, command: RoundCommand) {
        trace!(target: "round", "Handling command: {:?}", command);
        let now = self.clock.now();
        match command {
            RoundCommand::ToggleSwitch(index) => match self.round.toggled(index, now) {
                Ok(next) => self.set_round(next),
                Err(e) => self.reject(e),
            },
            RoundCommand::Reveal => {
                let next = self.round.revealed(now);
                self.set_round(next);
            }
            RoundCommand::Guess(index) => self.guess(index, now),
            RoundCommand::Tick(round_id) => self.tick(round_id, now),
            RoundCommand::NewRound(difficulty, seed) => {
                let difficulty = difficulty.unwrap_or(self.settings.difficulty);
                self.start_round(RoundState::new(difficulty, seed, now));
            }
            RoundCommand::Restart => {
                let next = self.round.restarted(now);
                self.start_round(next);
            }
            RoundCommand::ShowHelp => {
                self.round_event_emitter.emit(RoundEvent::HelpRequested);
            }
            RoundCommand::ClearStats => {
                self.tracker.clear();
                self.round_event_emitter
                    .emit(RoundEvent::StatsChanged(self.tracker.stats()));
            }
            RoundCommand::ChangeSettings(change) => self.change_settings(&change),
        }
    }

    fn tick(&mut self, round_id: Uuid, now: Millis) {
        if round_id != self.round.id() {
            trace!(target: "round", "Ignoring tick for stale round {}", round_id);
            return;
        }
        let next = self.round.ticked(now);
        self.set_round(next);
    }

    fn guess(&mut self, index: usize, now: Millis) {
        let (next, outcome) = match self.round.guessed(index, now) {
            Ok(result) => result,
            Err(e) => return self.reject(e),
        };
        self.set_round(next);

        let recorded = self.tracker.record(&outcome);
        self.round_event_emitter
            .emit(RoundEvent::RoundCompleted(RoundCompletion {
                outcome,
                score: recorded.score,
                stats: recorded.stats,
            }));
        self.round_event_emitter
            .emit(RoundEvent::StatsChanged(recorded.stats));
    }

    fn reject(&self, error: RoundError) {
        warn!(target: "round", "Rejected command in round {}: {}", self.round.id(), error);
        self.round_event_emitter
            .emit(RoundEvent::InvalidCommand(error.to_string()));
    }

    fn start_round(&mut self, round: RoundState) {
        // abandons the previous round and its countdown
        self.warm_timer = None;
        self.round = round;
        info!(
            target: "round",
            "New round {}; difficulty: {}; seed: {}",
            self.round.id(), self.round.difficulty(), self.round.seed()
        );
        self.round_event_emitter.emit(RoundEvent::RoundStarted {
            round_id: self.round.id(),
            difficulty: self.round.difficulty(),
        });
        self.round_event_emitter
            .emit(RoundEvent::SwitchesChanged(self.round.switch_states()));
        self.round_event_emitter
            .emit(RoundEvent::BulbChanged(self.round.bulb()));
        self.round_event_emitter
            .emit(RoundEvent::PhaseChanged(self.round.phase()));
    }

    fn set_round(&mut self, next: RoundState) {
        let previous = std::mem::replace(&mut self.round, next);
        if previous.switch_states() != self.round.switch_states() {
            self.round_event_emitter
                .emit(RoundEvent::SwitchesChanged(self.round.switch_states()));
        }
        if previous.bulb() != self.round.bulb() {
            self.round_event_emitter
                .emit(RoundEvent::BulbChanged(self.round.bulb()));
        }
        if previous.phase() != self.round.phase() {
            self.round_event_emitter
                .emit(RoundEvent::PhaseChanged(self.round.phase()));
        }
        self.sync_warm_timer();
    }

    fn sync_warm_timer(&mut self) {
        let needs_ticks = self.round.needs_ticks();
        match &self.warm_timer {
            Some(timer) if needs_ticks && timer.round_id() == self.round.id() => {}
            _ if needs_ticks => {
                self.warm_timer = Some(WarmTimer::start(
                    self.round.id(),
                    self.round_event_emitter.clone(),
                ));
            }
            _ => self.warm_timer = None,
        }
    }

    fn change_settings(&mut self, change: &SettingsChange) {
        let settings = self.settings.applied(change);
        self.update_settings(settings);
    }

    fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.tracker.set_auto_save(self.settings.auto_save);
        if let Err(e) = self.settings.save(self.store.as_ref()) {
            warn!(target: "settings", "Failed to save settings: {}", e);
        }
        self.round_event_emitter
            .emit(RoundEvent::SettingsChanged(self.settings.clone()));
    }

    pub fn export_settings(&self) -> String {
        self.settings.export()
    }

    /// Returns false, changing nothing, when `contents` is not a JSON object
    pub fn import_settings(&mut self, contents: &str) -> bool {
        let mut settings = self.settings.clone();
        if !settings.import(contents) {
            return false;
        }
        self.update_settings(settings);
        true
    }

    pub fn reset_settings(&mut self) {
        self.update_settings(Settings::default());
    }

    pub fn current_difficulty(&self) -> Difficulty {
        self.round.difficulty()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::events::Channel;
    use crate::game::session_tracker::STATS_KEY;
    use crate::game::settings::SETTINGS_KEY;
    use crate::model::BulbState;
    use crate::storage::MemoryStore;
    use crate::tests::UsingLogger;
    use test_context::test_context;

    struct Harness {
        commands: EventEmitter<RoundCommand>,
        events: Rc<RefCell<Vec<RoundEvent>>>,
        event_observer: EventObserver<RoundEvent>,
        controller: Rc<RefCell<RoundController>>,
        clock: ManualClock,
        store: MemoryStore,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore) -> Self {
            let (commands, command_observer) = Channel::<RoundCommand>::new();
            let (event_emitter, event_observer) = Channel::<RoundEvent>::new();
            let events = Rc::new(RefCell::new(Vec::new()));
            let sink = events.clone();
            event_observer.subscribe(move |event: &RoundEvent| sink.borrow_mut().push(event.clone()));

            let clock = ManualClock::new(1_000_000);
            let controller = RoundController::new(
                command_observer,
                event_emitter,
                Rc::new(clock.clone()),
                Rc::new(store.clone()),
            );
            Self {
                commands,
                events,
                event_observer,
                controller,
                clock,
                store,
            }
        }

        fn send(&self, command: RoundCommand) {
            self.commands.emit(command);
        }

        fn take_events(&self) -> Vec<RoundEvent> {
            std::mem::take(&mut *self.events.borrow_mut())
        }

        fn answer(&self) -> usize {
            self.controller.borrow().round().answer_switch()
        }

        fn round_id(&self) -> Uuid {
            self.controller.borrow().round().id()
        }

        fn bulb(&self) -> BulbState {
            self.controller.borrow().round().bulb()
        }
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_new_round_announces_fresh_state(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Hard), Some(7)));

        let round_id = h.round_id();
        assert_eq!(
            h.take_events(),
            vec![
                RoundEvent::RoundStarted {
                    round_id,
                    difficulty: Difficulty::Hard,
                },
                RoundEvent::SwitchesChanged([false; 3]),
                RoundEvent::BulbChanged(BulbState::Off),
                RoundEvent::PhaseChanged(RoundPhase::Playing),
            ]
        );
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_new_round_defaults_to_configured_difficulty(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::ChangeSettings(SettingsChange {
            difficulty: Some(Difficulty::Expert),
            ..Default::default()
        }));
        h.send(RoundCommand::NewRound(None, None));
        assert_eq!(h.controller.borrow().current_difficulty(), Difficulty::Expert);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_full_round_with_afterglow(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Medium), Some(42)));
        let answer = h.answer();
        let round_id = h.round_id();
        h.take_events();

        h.send(RoundCommand::ToggleSwitch(answer));
        assert_eq!(h.bulb(), BulbState::On);
        h.clock.advance(3000);
        h.send(RoundCommand::ToggleSwitch(answer));
        assert_eq!(h.bulb(), BulbState::Warm { remaining_secs: 3.0 });

        let events = h.take_events();
        assert!(events.contains(&RoundEvent::WarmTimerStarted {
            round_id,
            interval: std::time::Duration::from_millis(100),
        }));
        assert!(h.controller.borrow().has_warm_timer());

        for _ in 0..3 {
            h.clock.advance(1000);
            h.send(RoundCommand::Tick(round_id));
        }
        assert_eq!(h.bulb(), BulbState::Off);
        assert!(!h.controller.borrow().has_warm_timer());
        assert!(h
            .take_events()
            .contains(&RoundEvent::WarmTimerStopped { round_id }));

        h.send(RoundCommand::Reveal);
        h.send(RoundCommand::Guess(answer));
        assert_eq!(h.controller.borrow().phase(), RoundPhase::Completed);

        let events = h.take_events();
        let completion = events
            .iter()
            .find_map(|event| match event {
                RoundEvent::RoundCompleted(completion) => Some(completion.clone()),
                _ => None,
            })
            .unwrap();
        assert!(completion.outcome.correct);
        assert_eq!(completion.outcome.elapsed_seconds, 6.0);
        // (100 + 54 * 2) * 1.5
        assert_eq!(completion.score, 312);
        assert_eq!(completion.stats.current_streak, 1);
        assert_eq!(events.last(), Some(&RoundEvent::StatsChanged(completion.stats)));
        assert!(h.store.get(STATS_KEY).unwrap().is_some());
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_easy_correct_guess_at_ten_seconds(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Easy), Some(3)));
        let answer = h.answer();

        h.clock.advance(10_000);
        h.send(RoundCommand::Reveal);
        h.send(RoundCommand::Guess(answer));

        let stats = h.controller.borrow().stats();
        assert_eq!(stats.high_score, 200);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.correct_guesses, 1);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_stale_ticks_are_ignored(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Medium), Some(1)));
        let answer = h.answer();
        let first_round = h.round_id();

        h.send(RoundCommand::ToggleSwitch(answer));
        h.clock.advance(5000);
        h.send(RoundCommand::ToggleSwitch(answer));
        h.take_events();

        h.send(RoundCommand::NewRound(None, Some(2)));
        let events = h.take_events();
        assert_eq!(
            events.first(),
            Some(&RoundEvent::WarmTimerStopped {
                round_id: first_round
            })
        );
        assert!(!h.controller.borrow().has_warm_timer());

        h.clock.advance(1000);
        h.send(RoundCommand::Tick(first_round));
        assert!(h.take_events().is_empty());
        assert_eq!(h.bulb(), BulbState::Off);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_reveal_freezes_warm_bulb(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Easy), Some(9)));
        let answer = h.answer();
        let round_id = h.round_id();

        h.send(RoundCommand::ToggleSwitch(answer));
        h.clock.advance(8000);
        h.send(RoundCommand::ToggleSwitch(answer));
        h.clock.advance(2500);
        h.send(RoundCommand::Reveal);
        assert_eq!(h.bulb(), BulbState::Warm { remaining_secs: 5.5 });
        assert!(!h.controller.borrow().has_warm_timer());
        h.take_events();

        h.clock.advance(10_000);
        h.send(RoundCommand::Tick(round_id));
        h.send(RoundCommand::ToggleSwitch(answer));
        assert_eq!(h.bulb(), BulbState::Warm { remaining_secs: 5.5 });
        assert!(h.take_events().is_empty());
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_rejected_commands_report_and_do_not_mutate(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Medium), Some(5)));
        h.take_events();

        h.send(RoundCommand::Guess(0));
        h.send(RoundCommand::ToggleSwitch(3));
        assert_eq!(
            h.take_events(),
            vec![
                RoundEvent::InvalidCommand(RoundError::GuessBeforeReveal.to_string()),
                RoundEvent::InvalidCommand(RoundError::SwitchOutOfRange(3).to_string()),
            ]
        );
        assert_eq!(h.controller.borrow().phase(), RoundPhase::Playing);
        assert_eq!(h.controller.borrow().stats().total_attempts, 0);

        h.send(RoundCommand::Reveal);
        h.send(RoundCommand::Guess(1));
        h.take_events();
        h.send(RoundCommand::Guess(2));
        assert_eq!(
            h.take_events(),
            vec![RoundEvent::InvalidCommand(
                RoundError::AlreadyCompleted.to_string()
            )]
        );
        assert_eq!(h.controller.borrow().stats().total_attempts, 1);
        assert_eq!(h.controller.borrow().round().selected_switch(), Some(1));
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_listener_may_answer_warm_timer_with_tick(_: &mut UsingLogger) {
        let h = Harness::new();
        let commands = h.commands.clone();
        let ticks = Rc::new(RefCell::new(0));
        let tick_count = ticks.clone();
        h.event_observer.subscribe(move |event: &RoundEvent| {
            if let RoundEvent::WarmTimerStarted { round_id, .. } = event {
                *tick_count.borrow_mut() += 1;
                commands.emit(RoundCommand::Tick(*round_id));
            }
        });

        h.send(RoundCommand::NewRound(Some(Difficulty::Easy), Some(8)));
        let answer = h.answer();
        h.send(RoundCommand::ToggleSwitch(answer));
        h.clock.advance(3000);
        h.send(RoundCommand::ToggleSwitch(answer));

        assert_eq!(*ticks.borrow(), 1);
        assert_eq!(h.bulb(), BulbState::Warm { remaining_secs: 3.0 });
        assert!(h.controller.borrow().has_warm_timer());

        h.clock.advance(3000);
        let round_id = h.round_id();
        h.send(RoundCommand::Tick(round_id));
        assert_eq!(h.bulb(), BulbState::Off);
        assert!(!h.controller.borrow().has_warm_timer());
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_commands_sent_by_listeners_run_in_order(_: &mut UsingLogger) {
        let h = Harness::new();
        let commands = h.commands.clone();
        h.event_observer.subscribe(move |event: &RoundEvent| {
            if let RoundEvent::PhaseChanged(RoundPhase::Revealed) = event {
                commands.emit(RoundCommand::Guess(0));
            }
        });

        h.send(RoundCommand::NewRound(Some(Difficulty::Medium), Some(4)));
        h.send(RoundCommand::Reveal);
        assert_eq!(h.controller.borrow().phase(), RoundPhase::Completed);
        assert_eq!(h.controller.borrow().round().selected_switch(), Some(0));
        assert_eq!(h.controller.borrow().stats().total_attempts, 1);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_help_key_command_is_forwarded(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::ShowHelp);
        assert_eq!(h.take_events(), vec![RoundEvent::HelpRequested]);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_restart_replays_answer(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(Some(Difficulty::Hard), Some(1234)));
        let answer = h.answer();
        let first_round = h.round_id();

        h.send(RoundCommand::Restart);
        assert_eq!(h.answer(), answer);
        assert_ne!(h.round_id(), first_round);
        assert_eq!(h.controller.borrow().current_difficulty(), Difficulty::Hard);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_clear_stats(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(None, Some(11)));
        h.send(RoundCommand::Reveal);
        h.send(RoundCommand::Guess(0));
        assert_eq!(h.controller.borrow().stats().total_attempts, 1);
        h.take_events();

        h.send(RoundCommand::ClearStats);
        assert_eq!(
            h.take_events(),
            vec![RoundEvent::StatsChanged(SessionStats::default())]
        );
        assert_eq!(h.store.get(STATS_KEY).unwrap(), None);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_auto_save_off_skips_persisting_stats(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::ChangeSettings(SettingsChange {
            auto_save: Some(false),
            ..Default::default()
        }));
        assert!(h
            .store
            .get(SETTINGS_KEY)
            .unwrap()
            .unwrap()
            .contains("\"autoSave\":false"));

        h.send(RoundCommand::NewRound(None, Some(11)));
        h.send(RoundCommand::Reveal);
        h.send(RoundCommand::Guess(0));
        assert_eq!(h.controller.borrow().stats().total_attempts, 1);
        assert_eq!(h.store.get(STATS_KEY).unwrap(), None);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_settings_and_stats_restored_from_store(_: &mut UsingLogger) {
        let store = MemoryStore::new();
        {
            let h = Harness::with_store(store.clone());
            h.send(RoundCommand::ChangeSettings(SettingsChange {
                difficulty: Some(Difficulty::Easy),
                enable_sound: Some(false),
                ..Default::default()
            }));
            h.send(RoundCommand::NewRound(None, Some(11)));
            h.send(RoundCommand::Reveal);
            h.send(RoundCommand::Guess(0));
            h.controller.borrow_mut().destroy();
        }

        let h = Harness::with_store(store);
        let controller = h.controller.borrow();
        assert_eq!(controller.settings().difficulty, Difficulty::Easy);
        assert!(!controller.settings().enable_sound);
        assert_eq!(controller.stats().total_attempts, 1);
        assert_eq!(controller.current_difficulty(), Difficulty::Easy);
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_import_export_reset_settings(_: &mut UsingLogger) {
        let h = Harness::new();
        let exported = {
            let mut controller = h.controller.borrow_mut();
            assert!(controller.import_settings(r#"{"theme": "quantum", "showTimer": false}"#));
            assert!(!controller.import_settings("[]"));
            controller.export_settings()
        };
        assert!(exported.contains("\"theme\": \"quantum\""));
        assert!(matches!(
            h.take_events().as_slice(),
            [RoundEvent::SettingsChanged(settings)] if !settings.show_timer
        ));

        h.controller.borrow_mut().reset_settings();
        assert_eq!(h.controller.borrow().settings(), &Settings::default());
    }

    #[test_context(UsingLogger)]
    #[test]
    fn test_destroy_unsubscribes(_: &mut UsingLogger) {
        let h = Harness::new();
        h.send(RoundCommand::NewRound(None, Some(1)));
        let round_id = h.round_id();

        h.controller.borrow_mut().destroy();
        h.take_events();
        h.send(RoundCommand::NewRound(None, Some(2)));
        assert_eq!(h.round_id(), round_id);
        assert!(h.take_events().is_empty());
    }
}
