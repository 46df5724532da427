use serde::{Deserialize, Serialize};

/// Cosmetic skin. The game rules are identical under every theme; only the
/// presentation layer reads this.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Classic,
    Incandescent,
    Quantum,
}

impl Theme {
    pub fn all() -> Vec<Theme> {
        vec![Theme::Classic, Theme::Incandescent, Theme::Quantum]
    }
}
