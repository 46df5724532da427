use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

/// Timing and scoring rules for one difficulty
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    /// Longest afterglow, in seconds, a bulb can keep after being switched off
    pub warm_time_secs: f64,
    /// How long, in milliseconds, the answer switch must be held on before any afterglow
    pub min_on_time_ms: u64,
    pub score_multiplier: f64,
    pub name: &'static str,
}

const EASY: DifficultySettings = DifficultySettings {
    warm_time_secs: 15.0,
    min_on_time_ms: 1000,
    score_multiplier: 1.0,
    name: "Beginner",
};

const MEDIUM: DifficultySettings = DifficultySettings {
    warm_time_secs: 10.0,
    min_on_time_ms: 2000,
    score_multiplier: 1.5,
    name: "Intermediate",
};

const HARD: DifficultySettings = DifficultySettings {
    warm_time_secs: 6.0,
    min_on_time_ms: 3000,
    score_multiplier: 2.0,
    name: "Advanced",
};

const EXPERT: DifficultySettings = DifficultySettings {
    warm_time_secs: 4.0,
    min_on_time_ms: 4000,
    score_multiplier: 3.0,
    name: "Expert",
};

impl Difficulty {
    pub fn all() -> Vec<Difficulty> {
        vec![
            Difficulty::Easy,
            Difficulty::Medium,
            Difficulty::Hard,
            Difficulty::Expert,
        ]
    }

    pub fn index(&self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
            Difficulty::Expert => 3,
        }
    }

    pub fn from_index(index: usize) -> Difficulty {
        match index {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            2 => Difficulty::Hard,
            3 => Difficulty::Expert,
            _ => Difficulty::Medium,
        }
    }

    pub fn settings(&self) -> &'static DifficultySettings {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
            Difficulty::Expert => &EXPERT,
        }
    }

    pub fn warm_time_secs(&self) -> f64 {
        self.settings().warm_time_secs
    }

    pub fn min_on_time_ms(&self) -> u64 {
        self.settings().min_on_time_ms
    }

    pub fn score_multiplier(&self) -> f64 {
        self.settings().score_multiplier
    }

    /// Player-facing name, e.g. "Intermediate" for medium
    pub fn display_name(&self) -> &'static str {
        self.settings().name
    }

    fn key(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::all()
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown difficulty: {s}"))
    }
}
