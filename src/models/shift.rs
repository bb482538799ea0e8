//! Shift model.
//!
//! A shift is one (date, category) slot that needs exactly one assignee.
//! The day type of its date decides its point value and whether
//! public-holiday rules apply.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::TeamCategory;

/// Shift category.
///
/// Declaration order is the within-day ordering of shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftCategory {
    /// Open to every team.
    Org,
    /// Reserved for `Type C` teams.
    #[serde(rename = "Type C")]
    TypeC,
    /// Reserved for `Type O` teams.
    #[serde(rename = "Type O")]
    TypeO,
}

impl ShiftCategory {
    /// All categories in within-day order.
    pub const ALL: [ShiftCategory; 3] = [ShiftCategory::Org, ShiftCategory::TypeC, ShiftCategory::TypeO];

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            ShiftCategory::Org => "Org",
            ShiftCategory::TypeC => "Type C",
            ShiftCategory::TypeO => "Type O",
        }
    }

    /// Whether a member of a team with `team` category may cover this shift.
    #[inline]
    pub fn accepts(self, team: TeamCategory) -> bool {
        match self {
            ShiftCategory::Org => true,
            other => other == team.shift_category(),
        }
    }
}

impl fmt::Display for ShiftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Day classification used for point values.
///
/// A public holiday takes precedence over a weekend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
    PublicHoliday,
}

impl DayType {
    /// Classifies a date.
    pub fn classify(date: NaiveDate, is_public_holiday: bool) -> Self {
        if is_public_holiday {
            DayType::PublicHoliday
        } else if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            DayType::Weekend
        } else {
            DayType::Weekday
        }
    }
}

/// A single duty slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Shift {
    /// Calendar date.
    pub date: NaiveDate,
    /// Shift category.
    pub category: ShiftCategory,
    /// Day type of `date`.
    pub day_type: DayType,
}

impl Shift {
    /// Creates a shift.
    pub fn new(date: NaiveDate, category: ShiftCategory, day_type: DayType) -> Self {
        Self {
            date,
            category,
            day_type,
        }
    }

    /// Whether the shift falls on a public holiday.
    #[inline]
    pub fn is_public_holiday(&self) -> bool {
        self.day_type == DayType::PublicHoliday
    }

    /// Stable label, e.g. `2026-01-05 Type C`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.category)
    }
}
