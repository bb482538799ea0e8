//! Resolved roster period.
//!
//! Expands a start/end date pair, the holiday list, and the shift layout
//! into the full, ordered list of shifts to cover.
//!
//! # Ordering
//! Shifts are sorted by date, then by category (`Org`, `Type C`, `Type O`).
//! Shift indices into [`RosterPeriod::shifts`] are the identifiers used by
//! the eligibility table, the CP builder, and the projector.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{DayType, Holiday, Shift, ShiftCategory};
use crate::config::ShiftLayout;

/// All shifts of one roster period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterPeriod {
    /// First date (inclusive).
    pub start: NaiveDate,
    /// Last date (inclusive).
    pub end: NaiveDate,
    /// Public holidays falling inside the period.
    pub holidays: BTreeSet<NaiveDate>,
    /// Shifts in date/category order.
    pub shifts: Vec<Shift>,
}

impl RosterPeriod {
    /// Resolves the period.
    ///
    /// An inverted range (`start > end`) yields a period without dates;
    /// input validation reports it separately.
    pub fn resolve(
        start: NaiveDate,
        end: NaiveDate,
        holidays: &[Holiday],
        layout: &ShiftLayout,
    ) -> Self {
        let holidays: BTreeSet<NaiveDate> = holidays
            .iter()
            .map(|h| h.date)
            .filter(|d| *d >= start && *d <= end)
            .collect();

        let mut shifts = Vec::new();
        for date in date_range(start, end) {
            let day_type = DayType::classify(date, holidays.contains(&date));
            let categories: BTreeSet<ShiftCategory> =
                layout.categories_for(day_type).iter().copied().collect();
            for category in categories {
                shifts.push(Shift::new(date, category, day_type));
            }
        }

        Self {
            start,
            end,
            holidays,
            shifts,
        }
    }

    /// Number of calendar days in the period.
    pub fn day_count(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).num_days() as usize + 1
        }
    }

    /// Dates of the period in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        date_range(self.start, self.end)
    }

    /// Zero-based day offset of `date` within the period.
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start || date > self.end {
            return None;
        }
        Some((date - self.start).num_days() as usize)
    }

    /// Whether `date` is a public holiday inside the period.
    #[inline]
    pub fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Number of shifts to cover.
    #[inline]
    pub fn shift_count(&self) -> usize {
        self.shifts.len()
    }

    /// Indices of the shifts on `date`.
    pub fn shifts_on(&self, date: NaiveDate) -> Vec<usize> {
        self.shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.date == date)
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the shifts of `category`, in chronological order.
    pub fn shifts_of(&self, category: ShiftCategory) -> Vec<usize> {
        self.shifts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.category == category)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the shift at (`date`, `category`).
    pub fn find(&self, date: NaiveDate, category: ShiftCategory) -> Option<usize> {
        self.shifts
            .iter()
            .position(|s| s.date == date && s.category == category)
    }
}

fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), |d| d.checked_add_days(Days::new(1)))
        .take_while(move |d| *d <= end)
}
