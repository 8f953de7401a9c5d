//! Period keys, start periods and the rules deciding which periods a
//! resident owes.

use crate::utils::{month_abbreviation, month_from_name};
use chrono::{Datelike, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordinals above this value are special levies rather than calendar months.
pub const LAST_MONTH_ORDINAL: u32 = 12;

/// A calendar month, ordered by `(year, month)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=LAST_MONTH_ORDINAL)
            .contains(&month)
            .then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }
}

impl FromStr for YearMonth {
    type Err = String;

    /// Accepts `"2024-06"` or `"2024/6"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = s
            .split_once(|c: char| c == '-' || c == '/')
            .ok_or_else(|| format!("expected 'YYYY-MM', got '{}'", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        Self::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// First month from which a resident's dues are tracked.
///
/// The canonical spelling is `"2023/1"`. The older `"2023 Jan"` spelling
/// (English or Indonesian month names) is accepted and normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StartPeriod {
    pub year: i32,
    pub month: u32,
}

impl StartPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=LAST_MONTH_ORDINAL)
            .contains(&month)
            .then_some(Self { year, month })
    }

    /// Reads an optional start-period cell. Blank cells mean "track
    /// everything"; unreadable cells are treated the same way.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "-" {
            return None;
        }

        match raw.parse() {
            Ok(period) => Some(period),
            Err(e) => {
                warn!("Ignoring start period '{}': {}", raw, e);
                None
            }
        }
    }

    pub fn as_year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }
}

impl FromStr for StartPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((year, month)) = s.split_once('/') {
            let year: i32 = year
                .trim()
                .parse()
                .map_err(|_| format!("invalid year in '{}'", s))?;
            let month: u32 = month
                .trim()
                .parse()
                .map_err(|_| format!("invalid month in '{}'", s))?;
            return Self::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s));
        }

        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(year), Some(month), None) => {
                let year: i32 = year
                    .parse()
                    .map_err(|_| format!("invalid year in '{}'", s))?;
                let month = month_from_name(month)
                    .ok_or_else(|| format!("unknown month name in '{}'", s))?;
                Ok(Self { year, month })
            }
            _ => Err(format!(
                "unrecognised start period '{}'. Expected 'YYYY/M' or 'YYYY Mon'",
                s
            )),
        }
    }
}

impl TryFrom<String> for StartPeriod {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StartPeriod> for String {
    fn from(value: StartPeriod) -> Self {
        value.to_string()
    }
}

impl fmt::Display for StartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.month)
    }
}

/// A payment slot: a calendar month (`ordinal` 1-12) or a special levy for
/// the year (`ordinal` > 12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodKey {
    pub year: i32,
    pub ordinal: u32,
}

impl PeriodKey {
    /// Parses a bare `"year/ordinal"` key. Anything else is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, ordinal) = raw.trim().split_once('/')?;
        let year: i32 = year.trim().parse().ok()?;
        let ordinal: u32 = ordinal.trim().parse().ok()?;
        (ordinal >= 1).then_some(Self { year, ordinal })
    }

    pub fn is_special(&self) -> bool {
        self.ordinal > LAST_MONTH_ORDINAL
    }

    pub fn month(&self) -> Option<YearMonth> {
        YearMonth::new(self.year, self.ordinal)
    }

    /// Human label: `"Mar 2024"` for months, the levy label for specials.
    pub fn label(&self, special_label: Option<&str>) -> String {
        match month_abbreviation(self.ordinal) {
            Some(month) if !self.is_special() => format!("{} {}", month, self.year),
            _ => match special_label {
                Some(label) => format!("{} {}", label, self.year),
                None => format!("Levy #{} {}", self.ordinal, self.year),
            },
        }
    }

    pub fn evaluate(&self, start: Option<StartPeriod>, today: YearMonth) -> PeriodEvaluation {
        if self.is_special() {
            let is_future = self.year > today.year;
            let counts_toward_total = !is_future
                && match start {
                    Some(start) => self.year >= start.year,
                    None => self.year <= today.year,
                };
            return PeriodEvaluation {
                counts_toward_total,
                is_future,
            };
        }

        let slot = (self.year, self.ordinal);
        let is_future = slot > (today.year, today.month);
        let counts_toward_total = !is_future
            && match start {
                Some(start) => slot >= (start.year, start.month),
                None => true,
            };

        PeriodEvaluation {
            counts_toward_total,
            is_future,
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.ordinal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEvaluation {
    pub counts_toward_total: bool,
    pub is_future: bool,
}

/// Evaluates a raw period key against a start period and the current month.
/// Malformed keys are excluded by returning `None`.
pub fn evaluate(
    period_key: &str,
    start: Option<StartPeriod>,
    current_year: i32,
    current_month: u32,
) -> Option<PeriodEvaluation> {
    let key = PeriodKey::parse(period_key)?;
    Some(key.evaluate(
        start,
        YearMonth {
            year: current_year,
            month: current_month,
        },
    ))
}
