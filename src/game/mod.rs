mod input_translator;
mod round_controller;
pub mod session_tracker;
pub mod settings;
mod warm_timer;

pub use input_translator::InputTranslator;
pub use round_controller::RoundController;
pub use session_tracker::{SessionTracker, STATS_KEY};
pub use settings::{Settings, SettingsChange, SETTINGS_KEY};
pub use warm_timer::{WarmTimer, TICK_INTERVAL};
