//! Employee model.
//!
//! Employees are the assignable entities of a roster. Each belongs to
//! exactly one team, carries a role that determines its shift cap, and
//! brings year-to-date points plus personal date preferences into the
//! optimization run.
//!
//! Employee records are read-only during a solve. Updated points and
//! public-holiday history are returned as new values by the projector.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Employee role.
///
/// Roles are looked up in the role-cap mapping to bound the number of
/// shifts an employee can take in one roster period. Serialized as the
/// plain role name; unknown names load as [`Role::Custom`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Regular duty personnel.
    #[default]
    Standard,
    /// Personnel rostered mainly for weekend cover.
    WeekendOnly,
    /// Site-specific role.
    Custom(String),
}

impl Role {
    /// Display name of the role.
    pub fn name(&self) -> &str {
        match self {
            Role::Standard => "Standard",
            Role::WeekendOnly => "Weekend-Only",
            Role::Custom(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "Standard" => Role::Standard,
            "Weekend-Only" => Role::WeekendOnly,
            _ => Role::Custom(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Custom(name) => name,
            other => other.name().to_string(),
        }
    }
}

/// A person who can be assigned to duty shifts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique employee identifier (also the deterministic tie-break key).
    pub id: String,
    /// Name of the team this employee belongs to.
    pub team: String,
    /// Role (determines the shift cap).
    #[serde(default)]
    pub role: Role,
    /// Points accumulated before this roster period.
    #[serde(default)]
    pub ytd_points: f64,
    /// Dates on which the employee cannot work.
    #[serde(default)]
    pub blackout_dates: BTreeSet<NaiveDate>,
    /// Public-holiday dates the employee volunteered for.
    #[serde(default)]
    pub ph_bids: BTreeSet<NaiveDate>,
    /// Most recent public holiday worked.
    #[serde(default)]
    pub last_ph_date: Option<NaiveDate>,
}

impl Employee {
    /// Creates a standard-role employee with no history.
    pub fn new(id: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            team: team.into(),
            role: Role::Standard,
            ytd_points: 0.0,
            blackout_dates: BTreeSet::new(),
            ph_bids: BTreeSet::new(),
            last_ph_date: None,
        }
    }

    /// Sets the role.
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Sets the year-to-date points.
    pub fn with_ytd_points(mut self, points: f64) -> Self {
        self.ytd_points = points;
        self
    }

    /// Adds a blackout date.
    pub fn with_blackout(mut self, date: NaiveDate) -> Self {
        self.blackout_dates.insert(date);
        self
    }

    /// Adds several blackout dates.
    pub fn with_blackouts(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.blackout_dates.extend(dates);
        self
    }

    /// Adds a public-holiday bid.
    pub fn with_ph_bid(mut self, date: NaiveDate) -> Self {
        self.ph_bids.insert(date);
        self
    }

    /// Sets the last public holiday worked.
    pub fn with_last_ph_date(mut self, date: NaiveDate) -> Self {
        self.last_ph_date = Some(date);
        self
    }

    /// Whether `date` is one of the employee's blackout dates.
    #[inline]
    pub fn is_blacked_out(&self, date: NaiveDate) -> bool {
        self.blackout_dates.contains(&date)
    }

    /// Whether the employee bid for the public holiday on `date`.
    #[inline]
    pub fn has_bid(&self, date: NaiveDate) -> bool {
        self.ph_bids.contains(&date)
    }

    /// Whether public-holiday immunity is active on `date`.
    ///
    /// Immunity lasts `window_years` from the last public holiday worked.
    /// A last date of Feb 29 expires on Feb 28 of a non-leap target year.
    /// A window of zero years never grants immunity.
    pub fn is_immune(&self, date: NaiveDate, window_years: u32) -> bool {
        let Some(last) = self.last_ph_date else {
            return false;
        };
        match last.checked_add_months(Months::new(window_years.saturating_mul(12))) {
            Some(expires) => date < expires,
            None => true,
        }
    }
}
