//! Canonical topic labels used for cross-producer deduplication.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A canonical notification topic.
///
/// Producers may also tag records with free-form theme strings; this enum
/// covers the labels the classifier can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Sleep,
    Recovery,
    Exercise,
    Nutrition,
    Stress,
    Work,
    Social,
    Music,
    Achievement,
    Streak,
    Goal,
    /// Nothing matched.
    General,
}

impl Theme {
    /// Return the theme label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Recovery => "recovery",
            Self::Exercise => "exercise",
            Self::Nutrition => "nutrition",
            Self::Stress => "stress",
            Self::Work => "work",
            Self::Social => "social",
            Self::Music => "music",
            Self::Achievement => "achievement",
            Self::Streak => "streak",
            Self::Goal => "goal",
            Self::General => "general",
        }
    }

    /// Whether this is the fallback label.
    pub fn is_general(&self) -> bool {
        matches!(self, Self::General)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
