//! Grouping policy: fine-grained label → coarse group → polarity score
//!
//! Pure and total over arbitrary strings, so it can be re-applied to stored
//! labels at read time to check that a persisted group still matches.

use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse sentiment group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    #[serde(rename = "Positivo")]
    Positive,
    #[serde(rename = "Negativo")]
    Negative,
    #[serde(rename = "Neutro")]
    Neutral,
    /// Anything outside the six known labels
    #[serde(rename = "Outro")]
    Other,
}

impl Group {
    /// Display name, as persisted and returned over HTTP
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positivo",
            Self::Negative => "Negativo",
            Self::Neutral => "Neutro",
            Self::Other => "Outro",
        }
    }

    /// Polarity score: +1, -1, or 0 for neutral and unknown groups
    pub fn score(self) -> i32 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Neutral | Self::Other => 0,
        }
    }

    /// Look up a group by display name
    pub fn parse(name: &str) -> Option<Self> {
        [Self::Positive, Self::Negative, Self::Neutral, Self::Other]
            .into_iter()
            .find(|group| group.as_str() == name)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group for a label name; unknown names map to [`Group::Other`]
pub fn classify_group(label: &str) -> Group {
    Label::parse(label).map_or(Group::Other, Label::group)
}

/// Group and polarity score for a label name
pub fn grouping(label: &str) -> (Group, i32) {
    let group = classify_group(label);
    (group, group.score())
}
