//! Schedule audit.
//!
//! Re-checks a schedule against every hard rule of the roster model.
//! Useful for verifying solver output and for hand-edited rosters loaded
//! back from the IO layer.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::RosterRequest;
use crate::eligibility::{Eligibility, EligibilityEvaluator, IneligibleReason};
use crate::models::{Schedule, ShiftCategory, Violation, ViolationType};

/// Audits a schedule. An empty result means every hard rule holds.
///
/// Team rotation follows the model: repeats are only reported for
/// categories served by more than one team (see [`RosterRequest::rotates`]).
pub fn audit_schedule(request: &RosterRequest, schedule: &Schedule) -> Vec<Violation> {
    let mut violations = Vec::new();
    let period = request.period();
    let evaluator = EligibilityEvaluator::new(&request.config);

    let mut assignees: Vec<Vec<usize>> = vec![Vec::new(); period.shift_count()];
    let mut worked: BTreeMap<usize, Vec<NaiveDate>> = BTreeMap::new();

    for assignment in &schedule.assignments {
        let Some(e) = request
            .employees
            .iter()
            .position(|emp| emp.id == assignment.employee_id)
        else {
            violations.push(Violation::new(
                ViolationType::UnknownEmployee,
                &assignment.employee_id,
                format!("Unknown employee on {} {}", assignment.date, assignment.category),
            ));
            continue;
        };
        let employee = &request.employees[e];
        worked.entry(e).or_default().push(assignment.date);

        let Some(s) = period.find(assignment.date, assignment.category) else {
            violations.push(Violation::new(
                ViolationType::Overstaffed,
                &employee.id,
                format!(
                    "Assignment on {} {} is not a roster shift",
                    assignment.date, assignment.category
                ),
            ));
            continue;
        };
        let shift = &period.shifts[s];
        assignees[s].push(e);

        let Some(team) = request.team(&employee.team) else {
            continue;
        };
        let violation_type = match evaluator.check(employee, team.category, shift) {
            Eligibility::Eligible | Eligibility::Ineligible(IneligibleReason::ZeroCap) => None,
            Eligibility::Ineligible(IneligibleReason::CategoryMismatch) => {
                Some(ViolationType::CategoryMismatch)
            }
            Eligibility::Ineligible(IneligibleReason::Blackout) => Some(ViolationType::Blackout),
            Eligibility::Ineligible(IneligibleReason::PhImmunity) => Some(ViolationType::PhImmunity),
        };
        if let Some(violation_type) = violation_type {
            violations.push(Violation::new(
                violation_type,
                &employee.id,
                format!("'{}' is not eligible for {}", employee.id, shift.label()),
            ));
        }
    }

    for (s, shift) in period.shifts.iter().enumerate() {
        match assignees[s].len() {
            1 => {}
            0 => violations.push(Violation::new(
                ViolationType::Uncovered,
                shift.label(),
                format!("Shift {} has no assignee", shift.label()),
            )),
            n => violations.push(Violation::new(
                ViolationType::Overstaffed,
                shift.label(),
                format!("Shift {} has {n} assignees", shift.label()),
            )),
        }
    }

    for (&e, dates) in &mut worked {
        let employee = &request.employees[e];
        dates.sort();
        for pair in dates.windows(2) {
            let gap = (pair[1] - pair[0]).num_days();
            if gap == 0 {
                violations.push(Violation::new(
                    ViolationType::DoubleBooked,
                    &employee.id,
                    format!("'{}' works twice on {}", employee.id, pair[0]),
                ));
            } else if gap == 1 {
                violations.push(Violation::new(
                    ViolationType::RestViolation,
                    &employee.id,
                    format!("'{}' works {} and {}", employee.id, pair[0], pair[1]),
                ));
            }
        }
        if let Some(cap) = request.config.role_caps.cap_for(&employee.role) {
            if dates.len() > cap as usize {
                violations.push(Violation::new(
                    ViolationType::CapExceeded,
                    &employee.id,
                    format!(
                        "'{}' works {} shifts, cap for {} is {cap}",
                        employee.id,
                        dates.len(),
                        employee.role.name()
                    ),
                ));
            }
        }
    }

    for category in ShiftCategory::ALL {
        if !request.rotates(category) {
            continue;
        }
        for pair in period.shifts_of(category).windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let ([ea], [eb]) = (assignees[a].as_slice(), assignees[b].as_slice()) else {
                continue;
            };
            let team = &request.employees[*ea].team;
            if *team != request.employees[*eb].team {
                continue;
            }
            violations.push(Violation::new(
                ViolationType::TeamRepeat,
                team,
                format!(
                    "Team '{team}' covers both {} and {}",
                    period.shifts[a].label(),
                    period.shifts[b].label()
                ),
            ));
        }
    }

    violations
}
