//! Schedule (solution) model.
//!
//! A schedule is the projected result of one solve: the assignee of every
//! shift plus each employee's updated point total and public-holiday
//! history. Audits of a schedule produce [`Violation`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DayType, ShiftCategory};

/// A complete roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// One entry per shift, in period order.
    pub assignments: Vec<ShiftAssignment>,
    /// One entry per employee, in input order.
    pub summaries: Vec<EmployeeSummary>,
}

/// The assignee of one shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// Shift date.
    pub date: NaiveDate,
    /// Shift category.
    pub category: ShiftCategory,
    /// Day type of the date.
    pub day_type: DayType,
    /// Assigned employee ID.
    pub employee_id: String,
    /// Team of the assigned employee (denormalized for reporting).
    pub team: String,
    /// Points earned for this shift.
    pub points: f64,
    /// Whether the assignee had bid for this public holiday.
    pub bid_honored: bool,
}

/// Per-employee projection of the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeSummary {
    /// Employee ID.
    pub employee_id: String,
    /// Team name.
    pub team: String,
    /// Year-to-date points before the period.
    pub starting_points: f64,
    /// Points earned in the period.
    pub points_earned: f64,
    /// `starting_points + points_earned`.
    pub total_points: f64,
    /// Number of shifts worked.
    pub shifts_worked: usize,
    /// Latest public holiday worked (updated if one was assigned).
    pub last_ph_date: Option<NaiveDate>,
}

/// A rule violation found when auditing a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (employee ID or shift label).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
    /// Severity (0-100, higher = worse).
    pub severity: i32,
}

/// Classification of roster rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A shift has no assignee.
    Uncovered,
    /// A shift has more than one assignee.
    Overstaffed,
    /// An employee works two shifts on one date.
    DoubleBooked,
    /// An employee works two consecutive dates.
    RestViolation,
    /// An employee exceeds the role cap.
    CapExceeded,
    /// An employee works on a blackout date.
    Blackout,
    /// The employee's team does not serve the shift category.
    CategoryMismatch,
    /// An immune employee works a public holiday without bidding.
    PhImmunity,
    /// Two adjacent shifts of a category went to the same team.
    TeamRepeat,
    /// The assignee is not part of the request.
    UnknownEmployee,
}

impl ShiftAssignment {
    /// Whether this assignment is on a public holiday.
    #[inline]
    pub fn is_public_holiday(&self) -> bool {
        self.day_type == DayType::PublicHoliday
    }
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let severity = match violation_type {
            ViolationType::Uncovered | ViolationType::Overstaffed => 100,
            ViolationType::DoubleBooked | ViolationType::UnknownEmployee => 95,
            ViolationType::CategoryMismatch | ViolationType::Blackout => 90,
            ViolationType::RestViolation | ViolationType::CapExceeded => 80,
            ViolationType::PhImmunity => 60,
            ViolationType::TeamRepeat => 50,
        };
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
            severity,
        }
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: ShiftAssignment) {
        self.assignments.push(assignment);
    }

    /// Adds an employee summary.
    pub fn add_summary(&mut self, summary: EmployeeSummary) {
        self.summaries.push(summary);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Assignee of the shift at (`date`, `category`).
    pub fn assignee(&self, date: NaiveDate, category: ShiftCategory) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| a.date == date && a.category == category)
            .map(|a| a.employee_id.as_str())
    }

    /// All assignments on `date`.
    pub fn assignments_on(&self, date: NaiveDate) -> Vec<&ShiftAssignment> {
        self.assignments.iter().filter(|a| a.date == date).collect()
    }

    /// All assignments of an employee.
    pub fn assignments_for_employee(&self, employee_id: &str) -> Vec<&ShiftAssignment> {
        self.assignments
            .iter()
            .filter(|a| a.employee_id == employee_id)
            .collect()
    }

    /// Summary of an employee.
    pub fn summary_for(&self, employee_id: &str) -> Option<&EmployeeSummary> {
        self.summaries.iter().find(|s| s.employee_id == employee_id)
    }

    /// Highest total points across employees.
    pub fn max_total(&self) -> Option<f64> {
        self.summaries.iter().map(|s| s.total_points).reduce(f64::max)
    }

    /// Lowest total points across employees.
    pub fn min_total(&self) -> Option<f64> {
        self.summaries.iter().map(|s| s.total_points).reduce(f64::min)
    }

    /// Fairness spread: max total minus min total (0 when empty).
    pub fn spread(&self) -> f64 {
        match (self.max_total(), self.min_total()) {
            (Some(max), Some(min)) => max - min,
            _ => 0.0,
        }
    }

    /// Number of public-holiday shifts given to a bidder.
    pub fn bids_honored(&self) -> usize {
        self.assignments.iter().filter(|a| a.bid_honored).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn assignment(date: NaiveDate, category: ShiftCategory, emp: &str, points: f64) -> ShiftAssignment {
        ShiftAssignment {
            date,
            category,
            day_type: DayType::Weekday,
            employee_id: emp.into(),
            team: "Blue".into(),
            points,
            bid_honored: false,
        }
    }

    fn summary(emp: &str, start: f64, earned: f64) -> EmployeeSummary {
        EmployeeSummary {
            employee_id: emp.into(),
            team: "Blue".into(),
            starting_points: start,
            points_earned: earned,
            total_points: start + earned,
            shifts_worked: 1,
            last_ph_date: None,
        }
    }

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_assignment(assignment(d(2026, 1, 5), ShiftCategory::TypeC, "A", 1.0));
        s.add_assignment(assignment(d(2026, 1, 5), ShiftCategory::TypeO, "B", 1.0));
        s.add_assignment(assignment(d(2026, 1, 6), ShiftCategory::TypeC, "C", 1.0));
        s.add_summary(summary("A", 2.0, 1.0));
        s.add_summary(summary("B", 0.0, 1.0));
        s.add_summary(summary("C", 1.5, 1.0));
        s
    }

    #[test]
    fn test_lookup() {
        let s = sample_schedule();
        assert_eq!(s.assignment_count(), 3);
        assert_eq!(s.assignee(d(2026, 1, 5), ShiftCategory::TypeO), Some("B"));
        assert_eq!(s.assignee(d(2026, 1, 6), ShiftCategory::TypeO), None);
        assert_eq!(s.assignments_on(d(2026, 1, 5)).len(), 2);
        assert_eq!(s.assignments_for_employee("C").len(), 1);
        assert!(s.summary_for("A").is_some());
        assert!(s.summary_for("Z").is_none());
    }

    #[test]
    fn test_spread() {
        let s = sample_schedule();
        assert!((s.max_total().unwrap() - 3.0).abs() < 1e-10);
        assert!((s.min_total().unwrap() - 1.0).abs() < 1e-10);
        assert!((s.spread() - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new();
        assert_eq!(s.assignment_count(), 0);
        assert_eq!(s.spread(), 0.0);
        assert_eq!(s.bids_honored(), 0);
    }

    #[test]
    fn test_violation_severity() {
        let v = Violation::new(ViolationType::Uncovered, "2026-01-05 Type C", "no assignee");
        assert_eq!(v.severity, 100);
        let v = Violation::new(ViolationType::TeamRepeat, "Blue", "repeat");
        assert_eq!(v.violation_type, ViolationType::TeamRepeat);
        assert!(v.severity < 100);
    }
}
