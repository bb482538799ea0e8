//! Result projection.
//!
//! Turns a solver [`Assignment`] into a [`Schedule`]: the assignee of every
//! shift plus each employee's new point total and public-holiday history.
//! Inputs are never mutated; [`updated_employees`] returns new records for
//! the IO layer to persist.

use chrono::NaiveDate;

use crate::config::{from_units, to_units};
use crate::cp::Assignment;
use crate::models::{Employee, EmployeeSummary, RosterPeriod, Schedule, ShiftAssignment};
use crate::scheduler::RosterRequest;

/// Projects an assignment onto the request.
///
/// Totals are computed in point units, so `total_points` is exact to one
/// decimal. `last_ph_date` becomes the latest public holiday worked,
/// whether from history or from this roster.
pub fn project_schedule(
    request: &RosterRequest,
    period: &RosterPeriod,
    assignment: &Assignment,
) -> Schedule {
    let points = &request.config.points;
    let mut schedule = Schedule::new();
    let mut earned = vec![0i64; request.employees.len()];
    let mut worked = vec![0usize; request.employees.len()];
    let mut latest_ph: Vec<Option<NaiveDate>> = request
        .employees
        .iter()
        .map(|e| e.last_ph_date)
        .collect();

    for (s, e) in assignment.iter() {
        let (Some(shift), Some(employee)) = (period.shifts.get(s), request.employees.get(e)) else {
            continue;
        };
        let units = points.units(shift.day_type);
        earned[e] += units;
        worked[e] += 1;
        if shift.is_public_holiday() {
            latest_ph[e] = latest_ph[e].max(Some(shift.date));
        }
        schedule.add_assignment(ShiftAssignment {
            date: shift.date,
            category: shift.category,
            day_type: shift.day_type,
            employee_id: employee.id.clone(),
            team: employee.team.clone(),
            points: from_units(units),
            bid_honored: shift.is_public_holiday() && employee.has_bid(shift.date),
        });
    }

    for (e, employee) in request.employees.iter().enumerate() {
        schedule.add_summary(EmployeeSummary {
            employee_id: employee.id.clone(),
            team: employee.team.clone(),
            starting_points: employee.ytd_points,
            points_earned: from_units(earned[e]),
            total_points: from_units(to_units(employee.ytd_points) + earned[e]),
            shifts_worked: worked[e],
            last_ph_date: latest_ph[e],
        });
    }

    schedule
}

/// Employee records carried forward into the next roster period.
///
/// YTD points become the projected total and `last_ph_date` the projected
/// history. Employees without a summary are returned unchanged.
pub fn updated_employees(request: &RosterRequest, schedule: &Schedule) -> Vec<Employee> {
    request
        .employees
        .iter()
        .map(|employee| {
            let mut next = employee.clone();
            if let Some(summary) = schedule.summary_for(&employee.id) {
                next.ytd_points = summary.total_points;
                next.last_ph_date = summary.last_ph_date;
            }
            next
        })
        .collect()
}
