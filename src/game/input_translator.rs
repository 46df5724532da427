use log::trace;
use std::{cell::RefCell, rc::Rc};

use super::settings::{Settings, SettingsChange};
use crate::{
    destroyable::Destroyable,
    events::{EventEmitter, EventObserver, Unsubscriber},
    model::{InputEvent, RoundCommand, RoundEvent, RoundPhase},
};

/// Maps key presses onto round commands while keyboard controls are enabled
pub struct InputTranslator {
    round_command_emitter: EventEmitter<RoundCommand>,
    settings: Settings,
    phase: RoundPhase,
    input_subscription: Option<Unsubscriber<InputEvent>>,
    round_subscription: Option<Unsubscriber<RoundEvent>>,
}

impl Destroyable for InputTranslator {
    fn destroy(&mut self) {
        if let Some(subscription) = self.input_subscription.take() {
            subscription.unsubscribe();
        }
        if let Some(subscription) = self.round_subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl InputTranslator {
    pub fn new(
        round_command_emitter: EventEmitter<RoundCommand>,
        input_event_observer: EventObserver<InputEvent>,
        round_event_observer: EventObserver<RoundEvent>,
        settings: &Settings,
    ) -> Rc<RefCell<Self>> {
        let input_translator = Rc::new(RefCell::new(Self {
            round_command_emitter,
            settings: settings.clone(),
            phase: RoundPhase::Playing,
            input_subscription: None,
            round_subscription: None,
        }));

        InputTranslator::bind_input_observer(input_translator.clone(), input_event_observer);
        InputTranslator::bind_round_observer(input_translator.clone(), round_event_observer);

        input_translator
    }

    fn bind_input_observer(
        input_translator: Rc<RefCell<Self>>,
        input_event_observer: EventObserver<InputEvent>,
    ) {
        let subscription = {
            let input_translator = input_translator.clone();
            input_event_observer.subscribe(move |event| {
                // the borrow must end before emitting; the controller answers
                // with round events that this translator also listens to
                let (command, emitter) = {
                    let translator = input_translator.borrow();
                    (
                        translator.translate(event),
                        translator.round_command_emitter.clone(),
                    )
                };
                if let Some(command) = command {
                    emitter.emit(command);
                }
            })
        };

        input_translator.borrow_mut().input_subscription = Some(subscription);
    }

    fn bind_round_observer(
        input_translator: Rc<RefCell<Self>>,
        round_event_observer: EventObserver<RoundEvent>,
    ) {
        let subscription = {
            let input_translator = input_translator.clone();
            round_event_observer.subscribe(move |event| {
                input_translator.borrow_mut().handle_round_event(event);
            })
        };

        input_translator.borrow_mut().round_subscription = Some(subscription);
    }

    pub fn translate(&self, event: &InputEvent) -> Option<RoundCommand> {
        if !self.settings.keyboard_controls {
            trace!(target: "input", "Keyboard controls disabled; ignoring {:?}", event);
            return None;
        }
        let command = match (event.key(), self.phase) {
            (key @ '1'..='3', phase) => {
                let index = key as usize - '1' as usize;
                match phase {
                    RoundPhase::Playing => Some(RoundCommand::ToggleSwitch(index)),
                    RoundPhase::Revealed => Some(RoundCommand::Guess(index)),
                    RoundPhase::Completed => None,
                }
            }
            (' ', RoundPhase::Playing) => Some(RoundCommand::Reveal),
            ('r', _) => Some(RoundCommand::NewRound(None, None)),
            ('h', _) => Some(RoundCommand::ShowHelp),
            ('m', _) => Some(RoundCommand::ChangeSettings(SettingsChange {
                enable_sound: Some(!self.settings.enable_sound),
                ..Default::default()
            })),
            _ => None,
        };
        trace!(target: "input", "Key {:?} -> {:?}", event, command);
        command
    }

    fn handle_round_event(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::SettingsChanged(settings) => {
                self.settings = settings.clone();
            }
            RoundEvent::PhaseChanged(phase) => {
                self.phase = *phase;
            }
            _ => (),
        }
    }
}
