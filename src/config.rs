//! Roster configuration.
//!
//! Point values per day type, per-role shift caps, the shift layout
//! (which categories are active on which day types), the public-holiday
//! immunity window, and the search budget.
//!
//! All types implement `Default` and deserialize with missing fields
//! filled from defaults, so an IO layer can load partial JSON documents.
//!
//! # Points
//! Point values are decimals. The optimizer works in integer units of
//! 1 / [`POINT_SCALE`] point so that the fairness objective is exact.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::cp::SolverConfig;
use crate::models::{DayType, Role, ShiftCategory};

/// Integer units per point.
pub const POINT_SCALE: f64 = 10.0;

/// Converts decimal points to integer units (rounded).
#[inline]
pub fn to_units(points: f64) -> i64 {
    (points * POINT_SCALE).round() as i64
}

/// Converts integer units back to decimal points.
#[inline]
pub fn from_units(units: i64) -> f64 {
    units as f64 / POINT_SCALE
}

/// Point value earned per shift, by day type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointsConfig {
    /// Monday to Friday.
    pub weekday: f64,
    /// Saturday and Sunday.
    pub weekend: f64,
    /// Public holidays (overrides weekend).
    pub public_holiday: f64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            weekday: 1.0,
            weekend: 1.5,
            public_holiday: 2.0,
        }
    }
}

impl PointsConfig {
    /// Creates a points table.
    pub fn new(weekday: f64, weekend: f64, public_holiday: f64) -> Self {
        Self {
            weekday,
            weekend,
            public_holiday,
        }
    }

    /// Point value of a day type.
    pub fn value(&self, day_type: DayType) -> f64 {
        match day_type {
            DayType::Weekday => self.weekday,
            DayType::Weekend => self.weekend,
            DayType::PublicHoliday => self.public_holiday,
        }
    }

    /// Point value of a day type in integer units.
    #[inline]
    pub fn units(&self, day_type: DayType) -> i64 {
        to_units(self.value(day_type))
    }

    /// Whether every value is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        [self.weekday, self.weekend, self.public_holiday]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Maximum shifts for one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCap {
    /// Role the cap applies to.
    pub role: Role,
    /// Maximum number of shifts in the period.
    pub max_shifts: u32,
}

/// Per-role shift caps.
///
/// Roles without an entry are uncapped. Listing a role twice with
/// different caps is a configuration error (see
/// [`RoleCapConfig::contradictions`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCapConfig {
    caps: Vec<RoleCap>,
}

impl RoleCapConfig {
    /// Creates an empty mapping (all roles uncapped).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cap entry.
    pub fn with_cap(mut self, role: Role, max_shifts: u32) -> Self {
        self.caps.push(RoleCap { role, max_shifts });
        self
    }

    /// Cap for `role` (first entry wins), `None` if uncapped.
    pub fn cap_for(&self, role: &Role) -> Option<u32> {
        self.caps
            .iter()
            .find(|c| &c.role == role)
            .map(|c| c.max_shifts)
    }

    /// Roles listed more than once with different caps.
    pub fn contradictions(&self) -> Vec<&Role> {
        let mut found: Vec<&Role> = Vec::new();
        for (i, a) in self.caps.iter().enumerate() {
            let conflicting = self.caps[i + 1..]
                .iter()
                .any(|b| b.role == a.role && b.max_shifts != a.max_shifts);
            if conflicting && !found.contains(&&a.role) {
                found.push(&a.role);
            }
        }
        found
    }

    /// All entries.
    pub fn entries(&self) -> &[RoleCap] {
        &self.caps
    }
}

/// Shift categories active on each day type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftLayout {
    pub weekday: Vec<ShiftCategory>,
    pub weekend: Vec<ShiftCategory>,
    pub public_holiday: Vec<ShiftCategory>,
}

impl Default for ShiftLayout {
    fn default() -> Self {
        let team_shifts = vec![ShiftCategory::TypeC, ShiftCategory::TypeO];
        Self {
            weekday: team_shifts.clone(),
            weekend: team_shifts.clone(),
            public_holiday: team_shifts,
        }
    }
}

impl ShiftLayout {
    /// Layout with every category on every day type.
    pub fn all() -> Self {
        Self {
            weekday: ShiftCategory::ALL.to_vec(),
            weekend: ShiftCategory::ALL.to_vec(),
            public_holiday: ShiftCategory::ALL.to_vec(),
        }
    }

    /// Adds the `Org` shift to every day type.
    pub fn with_org(mut self) -> Self {
        for day in [&mut self.weekday, &mut self.weekend, &mut self.public_holiday] {
            if !day.contains(&ShiftCategory::Org) {
                day.push(ShiftCategory::Org);
            }
        }
        self
    }

    /// Replaces the categories of one day type.
    pub fn with_day(mut self, day_type: DayType, categories: Vec<ShiftCategory>) -> Self {
        match day_type {
            DayType::Weekday => self.weekday = categories,
            DayType::Weekend => self.weekend = categories,
            DayType::PublicHoliday => self.public_holiday = categories,
        }
        self
    }

    /// Categories active on a day type.
    pub fn categories_for(&self, day_type: DayType) -> &[ShiftCategory] {
        match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Weekend => &self.weekend,
            DayType::PublicHoliday => &self.public_holiday,
        }
    }
}

/// Complete configuration of one optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Point values per day type.
    pub points: PointsConfig,
    /// Per-role shift caps.
    pub role_caps: RoleCapConfig,
    /// Active shift categories per day type.
    pub layout: ShiftLayout,
    /// Years of public-holiday immunity after working one.
    pub ph_immunity_years: u32,
    /// Wall-clock search budget in milliseconds (`None` = unlimited).
    pub time_limit_ms: Option<u64>,
    /// Search node budget (`None` = unlimited).
    pub node_limit: Option<u64>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            points: PointsConfig::default(),
            role_caps: RoleCapConfig::default(),
            layout: ShiftLayout::default(),
            ph_immunity_years: 2,
            time_limit_ms: Some(10_000),
            node_limit: None,
        }
    }
}

impl RosterConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the point values.
    pub fn with_points(mut self, points: PointsConfig) -> Self {
        self.points = points;
        self
    }

    /// Sets the role caps.
    pub fn with_role_caps(mut self, caps: RoleCapConfig) -> Self {
        self.role_caps = caps;
        self
    }

    /// Sets the shift layout.
    pub fn with_layout(mut self, layout: ShiftLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the immunity window.
    pub fn with_ph_immunity_years(mut self, years: u32) -> Self {
        self.ph_immunity_years = years;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Sets the node budget.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Removes both budgets (search runs to completion).
    pub fn unbounded(mut self) -> Self {
        self.time_limit_ms = None;
        self.node_limit = None;
        self
    }

    /// Solver settings derived from the budgets.
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            time_limit: self.time_limit_ms.map(Duration::from_millis),
            node_limit: self.node_limit,
        }
    }
}
