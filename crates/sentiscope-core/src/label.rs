//! The fixed sentiment label table
//!
//! The classification head emits six scores; index `i` of that output maps to
//! `LABELS[i]`. The order is part of the model artifact and must not change.

use crate::error::Error;
use crate::grouping::Group;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six fine-grained sentiment categories produced by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "Satisfação")]
    Satisfaction,
    #[serde(rename = "Frustração")]
    Frustration,
    #[serde(rename = "Confusão")]
    Confusion,
    #[serde(rename = "Urgência/Pressão")]
    Urgency,
    #[serde(rename = "Raiva/Irritação")]
    Anger,
    #[serde(rename = "Neutro")]
    Neutral,
}

/// Labels in model output order
pub const LABELS: [Label; Label::COUNT] = [
    Label::Satisfaction,
    Label::Frustration,
    Label::Confusion,
    Label::Urgency,
    Label::Anger,
    Label::Neutral,
];

impl Label {
    /// Size of the model's output layer
    pub const COUNT: usize = 6;

    /// Map a raw model output index to its label
    pub fn from_index(index: usize) -> Option<Self> {
        LABELS.get(index).copied()
    }

    /// Position of this label in the model output
    pub fn index(self) -> usize {
        match self {
            Self::Satisfaction => 0,
            Self::Frustration => 1,
            Self::Confusion => 2,
            Self::Urgency => 3,
            Self::Anger => 4,
            Self::Neutral => 5,
        }
    }

    /// Display name, as persisted and returned over HTTP
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Satisfaction => "Satisfação",
            Self::Frustration => "Frustração",
            Self::Confusion => "Confusão",
            Self::Urgency => "Urgência/Pressão",
            Self::Anger => "Raiva/Irritação",
            Self::Neutral => "Neutro",
        }
    }

    /// Look up a label by its display name (exact match)
    pub fn parse(name: &str) -> Option<Self> {
        LABELS.iter().copied().find(|label| label.as_str() == name)
    }

    /// Coarse group of this label
    pub fn group(self) -> Group {
        match self {
            Self::Satisfaction => Group::Positive,
            Self::Frustration | Self::Anger => Group::Negative,
            Self::Confusion | Self::Urgency | Self::Neutral => Group::Neutral,
        }
    }

    /// Polarity score of this label's group
    pub fn score(self) -> i32 {
        self.group().score()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::validation(format!("unknown sentiment label '{s}'")))
    }
}

/// Display names of every label, in model output order
pub fn label_names() -> [&'static str; Label::COUNT] {
    LABELS.map(Label::as_str)
}
