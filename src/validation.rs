//! Input validation for roster requests.
//!
//! Checks structural integrity of a request before any model is built.
//! Detects:
//! - Empty employee lists and inverted periods
//! - Duplicate employee IDs and team names
//! - Employees referencing unknown teams
//! - Roles listed with contradictory caps
//! - Negative or non-finite point values
//! - Shifts without any eligible employee
//!
//! Every check runs; all problems are returned together so the caller can
//! report them at once.

use std::collections::HashSet;
use std::fmt;

use crate::eligibility::EligibilityTable;
use crate::models::RosterPeriod;
use crate::scheduler::RosterRequest;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The request has no employees.
    EmptyRoster,
    /// The start date is after the end date.
    InvalidPeriod,
    /// Two employees or two teams share the same identifier.
    DuplicateId,
    /// An employee references a team that doesn't exist.
    UnknownTeam,
    /// A role is listed more than once with different caps.
    ContradictoryRoleCap,
    /// A point value or YTD total is negative or not finite.
    InvalidPoints,
    /// A shift has no eligible employee.
    UnfillableShift,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the structure of a roster request.
///
/// Checks:
/// 1. At least one employee
/// 2. `start <= end`
/// 3. No duplicate employee IDs or team names
/// 4. Every employee's team exists
/// 5. No role with contradictory caps
/// 6. Point values and YTD points are finite and non-negative
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &RosterRequest) -> ValidationResult {
    let mut errors = Vec::new();

    if request.employees.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyRoster,
            "Roster has no employees",
        ));
    }

    if request.start > request.end {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidPeriod,
            format!(
                "Roster start {} is after roster end {}",
                request.start, request.end
            ),
        ));
    }

    let mut team_names = HashSet::new();
    for team in &request.teams {
        if !team_names.insert(team.name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate team name: {}", team.name),
            ));
        }
    }

    let mut employee_ids = HashSet::new();
    for employee in &request.employees {
        if !employee_ids.insert(employee.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate employee ID: {}", employee.id),
            ));
        }
        if !team_names.contains(employee.team.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownTeam,
                format!(
                    "Employee '{}' references unknown team '{}'",
                    employee.id, employee.team
                ),
            ));
        }
        if !employee.ytd_points.is_finite() || employee.ytd_points < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidPoints,
                format!(
                    "Employee '{}' has invalid YTD points {}",
                    employee.id, employee.ytd_points
                ),
            ));
        }
    }

    for role in request.config.role_caps.contradictions() {
        errors.push(ValidationError::new(
            ValidationErrorKind::ContradictoryRoleCap,
            format!("Role '{}' is listed with different caps", role.name()),
        ));
    }

    if !request.config.points.is_valid() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidPoints,
            "Point values must be finite and non-negative",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reports every shift that no employee can cover.
///
/// An unfillable shift is never skipped: the request is rejected before
/// the search starts.
pub fn validate_coverage(period: &RosterPeriod, table: &EligibilityTable) -> ValidationResult {
    let errors: Vec<ValidationError> = table
        .unfillable()
        .into_iter()
        .filter_map(|s| period.shifts.get(s))
        .map(|shift| {
            ValidationError::new(
                ValidationErrorKind::UnfillableShift,
                format!("No eligible employee for shift {}", shift.label()),
            )
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
