use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnError};

use crate::error::StorageError;
use crate::model::{Difficulty, Theme};
use crate::storage::KeyValueStore;

pub const SETTINGS_KEY: &str = "light-switch-puzzle-config";

const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    version: u32,
    pub difficulty: Difficulty,
    pub theme: Theme,
    pub enable_sound: bool,
    pub enable_animations: bool,
    pub show_timer: bool,
    pub show_statistics: bool,
    /// When off, finished rounds update the in-memory stats only
    pub auto_save: bool,
    pub keyboard_controls: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            version: CURRENT_VERSION,
            difficulty: Difficulty::default(),
            theme: Theme::default(),
            enable_sound: true,
            enable_animations: true,
            show_timer: true,
            show_statistics: true,
            auto_save: true,
            keyboard_controls: true,
        }
    }
}

/// A partial settings update. Also the shape stored settings are read
/// through: a field that is missing or has the wrong type comes out as `None`
/// and keeps its current value, without spoiling its neighbours.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsChange {
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_sound: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_animations: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_timer: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_statistics: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save: Option<bool>,
    #[serde_as(as = "DefaultOnError")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyboard_controls: Option<bool>,
}

impl SettingsChange {
    /// Read a change out of JSON text. Only JSON objects qualify.
    pub fn from_json(contents: &str) -> Option<SettingsChange> {
        let value = serde_json::from_str::<serde_json::Value>(contents).ok()?;
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

impl Settings {
    /// Stored settings merged over the defaults. Never fails.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(contents)) => Self::from_stored(&contents).unwrap_or_else(|| {
                warn!(target: "settings", "Stored settings are not a JSON object; using defaults");
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(target: "settings", "Failed to load settings: {}", e);
                Settings::default()
            }
        }
    }

    // Settings written before versioning carry no `version` and count as 0
    fn from_stored(contents: &str) -> Option<Settings> {
        let value = serde_json::from_str::<serde_json::Value>(contents).ok()?;
        if !value.is_object() {
            return None;
        }
        let version = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);
        let change = serde_json::from_value::<SettingsChange>(value).ok()?;

        let mut settings = Settings::default().applied(&change);
        settings.version = version;
        settings.migrate();
        Some(settings)
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        let contents = serde_json::to_string(self)?;
        store.set(SETTINGS_KEY, &contents)
    }

    pub fn applied(&self, change: &SettingsChange) -> Settings {
        let mut next = self.clone();
        if let Some(difficulty) = change.difficulty {
            next.difficulty = difficulty;
        }
        if let Some(theme) = change.theme {
            next.theme = theme;
        }
        if let Some(v) = change.enable_sound {
            next.enable_sound = v;
        }
        if let Some(v) = change.enable_animations {
            next.enable_animations = v;
        }
        if let Some(v) = change.show_timer {
            next.show_timer = v;
        }
        if let Some(v) = change.show_statistics {
            next.show_statistics = v;
        }
        if let Some(v) = change.auto_save {
            next.auto_save = v;
        }
        if let Some(v) = change.keyboard_controls {
            next.keyboard_controls = v;
        }
        next
    }

    /// Pretty JSON suitable for copying between installs
    pub fn export(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Merge settings previously produced by [`Settings::export`] (or any JSON
    /// object with some of its fields). Returns false and changes nothing for
    /// anything that is not a JSON object.
    pub fn import(&mut self, contents: &str) -> bool {
        match SettingsChange::from_json(contents) {
            Some(change) => {
                *self = self.applied(&change);
                debug!(target: "settings", "Imported settings: {:?}", self);
                true
            }
            None => {
                warn!(target: "settings", "Rejected settings import");
                false
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Settings::default();
    }

    /// Forget stored settings entirely
    pub fn clear(store: &dyn KeyValueStore) -> Result<(), StorageError> {
        store.remove(SETTINGS_KEY)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    fn migrate(&mut self) {
        match self.version {
            0 => {
                self.version = CURRENT_VERSION;
            }
            _ => (),
        }
    }
}
