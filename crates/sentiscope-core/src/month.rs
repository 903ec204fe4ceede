//! Calendar months as persisted on sentiment records

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Month {
    Janeiro,
    Fevereiro,
    #[serde(rename = "Março")]
    Marco,
    Abril,
    Maio,
    Junho,
    Julho,
    Agosto,
    Setembro,
    Outubro,
    Novembro,
    Dezembro,
}

/// Months in calendar order
pub const MONTHS: [Month; 12] = [
    Month::Janeiro,
    Month::Fevereiro,
    Month::Marco,
    Month::Abril,
    Month::Maio,
    Month::Junho,
    Month::Julho,
    Month::Agosto,
    Month::Setembro,
    Month::Outubro,
    Month::Novembro,
    Month::Dezembro,
];

impl Month {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Janeiro => "Janeiro",
            Self::Fevereiro => "Fevereiro",
            Self::Marco => "Março",
            Self::Abril => "Abril",
            Self::Maio => "Maio",
            Self::Junho => "Junho",
            Self::Julho => "Julho",
            Self::Agosto => "Agosto",
            Self::Setembro => "Setembro",
            Self::Outubro => "Outubro",
            Self::Novembro => "Novembro",
            Self::Dezembro => "Dezembro",
        }
    }

    /// Zero-based position in the calendar
    pub fn index(self) -> usize {
        MONTHS.iter().position(|m| *m == self).unwrap_or_default()
    }

    /// Month for a 1-based calendar number
    pub fn from_number(number: u32) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|idx| MONTHS.get(idx as usize).copied())
    }

    pub fn parse(name: &str) -> Option<Self> {
        MONTHS.iter().copied().find(|m| m.as_str() == name)
    }

    /// Month of the given date
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self::from_number(date.month()).unwrap_or(Self::Janeiro)
    }

    /// Current month in local time
    pub fn current() -> Self {
        Self::of(&chrono::Local::now())
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display names of every month, in calendar order
pub fn month_names() -> [&'static str; 12] {
    MONTHS.map(Month::as_str)
}
