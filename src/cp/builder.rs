//! Roster → CP model translation.
//!
//! # Variables
//! One boolean per eligible (employee, shift) pair, created in shift order
//! and, within a shift, in employee-id order. This fixes the search order
//! and makes solves reproducible.
//!
//! # Constraints
//! | Rule | Encoding |
//! |------|----------|
//! | Coverage | `ExactlyOne` over the pairs of each shift |
//! | One shift per day | `AtMost(1)` over an employee's pairs on a date |
//! | Rest day | `AtMost(1)` over an employee's pairs on `d` and `d + 1` |
//! | Role cap | `AtMost(cap)` over all pairs of an employee |
//! | Team rotation | `AtMost(1)` over a team's pairs on two adjacent shifts of a category |
//!
//! # Objective
//! One load per employee (`YTD + Σ shift points`, in point units) whose
//! spread is minimized. Pairs on public holidays the employee bid for are
//! bonus variables (tie-break only).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::model::{CpModel, ModelError, VarId};
use super::solver::{CpSolution, CpSolver, SolverConfig};
use crate::config::to_units;
use crate::eligibility::EligibilityTable;
use crate::error::InfeasibleModelError;
use crate::models::{RosterPeriod, ShiftCategory};
use crate::scheduler::RosterRequest;

/// Assignee of every shift, as indices into the request's employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    assignees: Vec<usize>,
}

impl Assignment {
    /// Creates an assignment from one employee index per shift.
    pub fn new(assignees: Vec<usize>) -> Self {
        Self { assignees }
    }

    /// Employee assigned to `shift`.
    pub fn assignee(&self, shift: usize) -> Option<usize> {
        self.assignees.get(shift).copied()
    }

    /// Number of shifts.
    pub fn len(&self) -> usize {
        self.assignees.len()
    }

    /// Whether there are no shifts.
    pub fn is_empty(&self) -> bool {
        self.assignees.is_empty()
    }

    /// `(shift, employee)` pairs in shift order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.assignees.iter().copied().enumerate()
    }

    /// Shifts assigned to `employee`.
    pub fn shifts_of(&self, employee: usize) -> Vec<usize> {
        self.iter()
            .filter(|&(_, e)| e == employee)
            .map(|(s, _)| s)
            .collect()
    }
}

/// A built model plus the mapping from variables to pairs.
#[derive(Debug, Clone)]
pub struct RosterModel {
    /// The CP model.
    pub model: CpModel,
    /// `(shift, employee)` of each variable, indexed by `VarId`.
    pub pairs: Vec<(usize, usize)>,
    shift_labels: Vec<String>,
}

impl RosterModel {
    /// Variable of the pair, if the pair is eligible.
    pub fn var_for(&self, shift: usize, employee: usize) -> Option<VarId> {
        self.pairs
            .iter()
            .position(|&p| p == (shift, employee))
            .map(VarId)
    }

    /// Decodes solver values into an assignment.
    ///
    /// Fails if a shift has no assignee or more than one.
    pub fn decode(&self, values: &[bool]) -> Result<Assignment, ModelError> {
        let mut assignees: Vec<Option<usize>> = vec![None; self.shift_labels.len()];
        for (&(shift, employee), _) in self.pairs.iter().zip(values).filter(|&(_, &v)| v) {
            if assignees[shift].replace(employee).is_some() {
                return Err(ModelError::IncompleteSolution {
                    label: self.shift_labels[shift].clone(),
                });
            }
        }
        assignees
            .into_iter()
            .enumerate()
            .map(|(shift, employee)| {
                employee.ok_or_else(|| ModelError::IncompleteSolution {
                    label: self.shift_labels[shift].clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Assignment::new)
    }
}

/// Builds a CP model from a roster request.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_roster::cp::{BranchAndBoundSolver, RosterCpBuilder, SolverConfig};
/// use u_roster::eligibility::EligibilityEvaluator;
/// use u_roster::models::{Employee, Team};
/// use u_roster::scheduler::RosterRequest;
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// let request = RosterRequest::new(day, day)
///     .with_team(Team::type_c("Blue"))
///     .with_team(Team::type_o("Black"))
///     .with_employee(Employee::new("c1", "Blue"))
///     .with_employee(Employee::new("o1", "Black"));
/// let period = request.period();
/// let table = EligibilityEvaluator::new(&request.config).table(&request, &period);
///
/// let builder = RosterCpBuilder::new(&request, &period, &table);
/// let (assignment, solution) = builder
///     .solve(&BranchAndBoundSolver::new(), &SolverConfig::default())
///     .unwrap();
/// assert!(solution.is_solution_found());
/// assert_eq!(assignment.unwrap().assignee(0), Some(0));
/// ```
pub struct RosterCpBuilder<'a> {
    request: &'a RosterRequest,
    period: &'a RosterPeriod,
    table: &'a EligibilityTable,
}

impl<'a> RosterCpBuilder<'a> {
    /// Creates a builder.
    pub fn new(
        request: &'a RosterRequest,
        period: &'a RosterPeriod,
        table: &'a EligibilityTable,
    ) -> Self {
        Self {
            request,
            period,
            table,
        }
    }

    /// Capacity checks that prove infeasibility without searching.
    ///
    /// An employee can cover at most `min(role cap, spaced dates)` shifts,
    /// where spaced dates is the largest set of eligible dates with no two
    /// consecutive. Checked per date, per category, then overall.
    pub fn precheck(&self) -> Result<(), InfeasibleModelError> {
        for date in self.period.dates() {
            let shifts = self.period.shifts_on(date);
            let staff: BTreeSet<usize> = shifts
                .iter()
                .flat_map(|&s| self.table.eligible(s).iter().copied())
                .collect();
            if staff.len() < shifts.len() {
                return Err(InfeasibleModelError::new(
                    Some(date.to_string()),
                    format!(
                        "{} shifts but only {} eligible employees",
                        shifts.len(),
                        staff.len()
                    ),
                ));
            }
        }

        for category in ShiftCategory::ALL {
            let shifts = self.period.shifts_of(category);
            if shifts.is_empty() {
                continue;
            }
            let capacity: usize = (0..self.request.employees.len())
                .map(|e| self.capacity(e, &shifts))
                .sum();
            debug!(%category, shifts = shifts.len(), capacity, "category capacity");
            if capacity < shifts.len() {
                return Err(InfeasibleModelError::new(
                    Some(category.to_string()),
                    format!(
                        "{} shifts exceed the combined capacity {} of eligible employees",
                        shifts.len(),
                        capacity
                    ),
                ));
            }
        }

        let all: Vec<usize> = (0..self.period.shift_count()).collect();
        let capacity: usize = (0..self.request.employees.len())
            .map(|e| self.capacity(e, &all))
            .sum();
        if capacity < all.len() {
            return Err(InfeasibleModelError::new(
                Some("role caps".into()),
                format!(
                    "{} shifts exceed the combined capacity {} of all employees",
                    all.len(),
                    capacity
                ),
            ));
        }
        Ok(())
    }

    /// Builds the CP model.
    pub fn build(&self) -> Result<RosterModel, ModelError> {
        let employees = &self.request.employees;
        let points = &self.request.config.points;
        let mut model = CpModel::new("roster");
        let mut pairs = Vec::with_capacity(self.table.pair_count());
        let mut shift_vars: Vec<Vec<(usize, VarId)>> = Vec::with_capacity(self.period.shift_count());
        let mut day_vars: Vec<BTreeMap<NaiveDate, Vec<VarId>>> = vec![BTreeMap::new(); employees.len()];
        let mut loads: Vec<Vec<(VarId, i64)>> = vec![Vec::new(); employees.len()];

        for (s, shift) in self.period.shifts.iter().enumerate() {
            let label = shift.label();
            let mut vars = Vec::with_capacity(self.table.eligible(s).len());
            for &e in self.table.eligible(s) {
                let employee = &employees[e];
                let var = model.new_bool_var(format!("{}@{}", employee.id, label));
                pairs.push((s, e));
                vars.push((e, var));
                day_vars[e].entry(shift.date).or_default().push(var);
                loads[e].push((var, points.units(shift.day_type)));
                if shift.is_public_holiday() && employee.has_bid(shift.date) {
                    model.add_bonus(var)?;
                }
            }
            model.add_exactly_one(label, vars.iter().map(|&(_, v)| v).collect())?;
            shift_vars.push(vars);
        }

        for (e, employee) in employees.iter().enumerate() {
            for (date, vars) in &day_vars[e] {
                if vars.len() > 1 {
                    model.add_at_most(format!("{} one shift on {date}", employee.id), vars.clone(), 1)?;
                }
                let next = date.succ_opt().and_then(|d| day_vars[e].get(&d));
                if let Some(next) = next {
                    let window = vars.iter().chain(next).copied().collect();
                    model.add_at_most(format!("{} rest after {date}", employee.id), window, 1)?;
                }
            }

            let count: usize = day_vars[e].values().map(Vec::len).sum();
            if let Some(cap) = self.request.config.role_caps.cap_for(&employee.role) {
                if count > cap as usize {
                    let all = day_vars[e].values().flatten().copied().collect();
                    model.add_at_most(
                        format!("{} cap {}", employee.id, employee.role.name()),
                        all,
                        cap,
                    )?;
                }
            }
        }

        for category in ShiftCategory::ALL {
            if !self.request.rotates(category) {
                continue;
            }
            for pair in self.period.shifts_of(category).windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let mut by_team: BTreeMap<&str, (Vec<VarId>, Vec<VarId>)> = BTreeMap::new();
                for &(e, var) in &shift_vars[a] {
                    by_team.entry(employees[e].team.as_str()).or_default().0.push(var);
                }
                for &(e, var) in &shift_vars[b] {
                    by_team.entry(employees[e].team.as_str()).or_default().1.push(var);
                }
                for (team, (first, second)) in by_team {
                    if first.is_empty() || second.is_empty() {
                        continue;
                    }
                    let vars = first.into_iter().chain(second).collect();
                    model.add_at_most(
                        format!(
                            "{team} rotation {} / {}",
                            self.period.shifts[a].label(),
                            self.period.shifts[b].label()
                        ),
                        vars,
                        1,
                    )?;
                }
            }
        }

        for (employee, terms) in employees.iter().zip(loads) {
            model.add_load(employee.id.clone(), to_units(employee.ytd_points), terms)?;
        }

        debug!(
            vars = model.var_count(),
            constraints = model.constraint_count(),
            bonus = model.objective().bonus.len(),
            "roster model built"
        );

        Ok(RosterModel {
            model,
            pairs,
            shift_labels: self.period.shifts.iter().map(|s| s.label()).collect(),
        })
    }

    /// Builds and solves the model.
    ///
    /// The assignment is `None` when the solver found no solution.
    pub fn solve<S: CpSolver>(
        &self,
        solver: &S,
        config: &SolverConfig,
    ) -> Result<(Option<Assignment>, CpSolution), ModelError> {
        let roster = self.build()?;
        let solution = solver.solve(&roster.model, config);
        let assignment = if solution.is_solution_found() {
            Some(roster.decode(&solution.values)?)
        } else {
            None
        };
        Ok((assignment, solution))
    }

    fn capacity(&self, employee: usize, shifts: &[usize]) -> usize {
        let dates: BTreeSet<NaiveDate> = shifts
            .iter()
            .filter(|&&s| self.table.contains(s, employee))
            .map(|&s| self.period.shifts[s].date)
            .collect();
        let spaced = spaced_days(&dates);
        let role = &self.request.employees[employee].role;
        match self.request.config.role_caps.cap_for(role) {
            Some(cap) => spaced.min(cap as usize),
            None => spaced,
        }
    }
}

/// Largest number of dates that can be picked with no two consecutive.
fn spaced_days(dates: &BTreeSet<NaiveDate>) -> usize {
    let mut count = 0;
    let mut last: Option<NaiveDate> = None;
    for &date in dates {
        if last.map_or(true, |l| (date - l).num_days() >= 2) {
            count += 1;
            last = Some(date);
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RoleCapConfig, RosterConfig, ShiftLayout};
    use crate::cp::{BranchAndBoundSolver, CpConstraint, SolveStatus};
    use crate::eligibility::EligibilityEvaluator;
    use crate::models::{Employee, Holiday, Role, Team};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Mon 2026-01-05 .. Wed 2026-01-07, two Type C teams, one Type O team.
    fn three_day_request() -> RosterRequest {
        RosterRequest::new(d(2026, 1, 5), d(2026, 1, 7))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_c("Green"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("b1", "Blue"))
            .with_employee(Employee::new("g1", "Green"))
            .with_employee(Employee::new("o1", "Black"))
            .with_employee(Employee::new("o2", "Black"))
    }

    fn with_model<T>(request: &RosterRequest, f: impl FnOnce(&RosterCpBuilder<'_>) -> T) -> T {
        let period = request.period();
        let table = EligibilityEvaluator::new(&request.config).table(request, &period);
        let builder = RosterCpBuilder::new(request, &period, &table);
        f(&builder)
    }

    fn labels(model: &CpModel) -> Vec<String> {
        model.constraints().iter().map(|c| c.label().to_string()).collect()
    }

    #[test]
    fn test_variables_and_coverage() {
        let request = three_day_request();
        let roster = with_model(&request, |b| b.build().unwrap());
        // 3 Type C shifts × 2 + 3 Type O shifts × 2.
        assert_eq!(roster.model.var_count(), 12);
        assert_eq!(roster.model.var_name(VarId(0)), Some("b1@2026-01-05 Type C"));
        assert_eq!(roster.var_for(0, 1), Some(VarId(1)));
        assert_eq!(roster.var_for(0, 2), None);

        let groups = roster
            .model
            .constraints()
            .iter()
            .filter(|c| matches!(c, CpConstraint::ExactlyOne { .. }))
            .count();
        assert_eq!(groups, 6);
        assert_eq!(roster.model.objective().loads.len(), 4);
    }

    #[test]
    fn test_rest_and_rotation_constraints() {
        let request = three_day_request();
        let roster = with_model(&request, |b| b.build().unwrap());
        let labels = labels(&roster.model);

        assert!(labels.contains(&"b1 rest after 2026-01-05".to_string()));
        assert!(labels.contains(&"o2 rest after 2026-01-06".to_string()));
        assert!(!labels.iter().any(|l| l.contains("rest after 2026-01-07")));
        // One shift per employee per day: no multi-shift days without Org.
        assert!(!labels.iter().any(|l| l.contains("one shift on")));

        assert!(labels.contains(&"Blue rotation 2026-01-05 Type C / 2026-01-06 Type C".to_string()));
        assert!(labels.contains(&"Green rotation 2026-01-06 Type C / 2026-01-07 Type C".to_string()));
        // Black is the only Type O team: no rotation for Type O.
        assert!(!labels.iter().any(|l| l.starts_with("Black rotation")));
    }

    #[test]
    fn test_rotation_kept_when_one_team_is_available() {
        // Green's only member is off Tue and Wed, leaving Blue on both days.
        let mut request = three_day_request().with_employee(Employee::new("b2", "Blue"));
        request.employees[1] =
            Employee::new("g1", "Green").with_blackouts([d(2026, 1, 6), d(2026, 1, 7)]);
        let roster = with_model(&request, |b| b.build().unwrap());
        let labels = labels(&roster.model);
        assert!(labels.contains(&"Blue rotation 2026-01-06 Type C / 2026-01-07 Type C".to_string()));
    }

    #[test]
    fn test_org_shift_adds_one_per_day() {
        let request = three_day_request()
            .with_config(RosterConfig::default().with_layout(ShiftLayout::default().with_org()));
        let roster = with_model(&request, |b| b.build().unwrap());
        let labels = labels(&roster.model);
        assert!(labels.contains(&"b1 one shift on 2026-01-05".to_string()));
        // Org is open to both categories, so it rotates between teams.
        assert!(labels.iter().any(|l| l.starts_with("Black rotation") && l.contains("Org")));
    }

    #[test]
    fn test_role_cap_constraint() {
        let caps = RoleCapConfig::new().with_cap(Role::WeekendOnly, 1);
        let request = three_day_request()
            .with_employee(Employee::new("b2", "Blue").with_role(Role::WeekendOnly))
            .with_config(RosterConfig::default().with_role_caps(caps));
        let roster = with_model(&request, |b| b.build().unwrap());
        let cap = roster
            .model
            .constraints()
            .iter()
            .find(|c| c.label() == "b2 cap Weekend-Only")
            .unwrap();
        assert!(matches!(cap, CpConstraint::AtMost { limit: 1, .. }));
        assert_eq!(cap.vars().len(), 3);
    }

    #[test]
    fn test_bonus_and_loads() {
        let ph = d(2026, 1, 6);
        let mut request = three_day_request().with_holiday(Holiday::new(ph, "Holiday"));
        request.employees[0] = Employee::new("b1", "Blue").with_ph_bid(ph).with_ytd_points(2.5);
        let roster = with_model(&request, |b| b.build().unwrap());

        let bonus = &roster.model.objective().bonus;
        assert_eq!(bonus.len(), 1);
        assert_eq!(roster.model.var_name(bonus[0]), Some("b1@2026-01-06 Type C"));

        let load = &roster.model.objective().loads[0];
        assert_eq!(load.label, "b1");
        assert_eq!(load.base, 25);
        let weights: Vec<i64> = load.terms.iter().map(|&(_, w)| w).collect();
        assert_eq!(weights, vec![10, 20, 10]);
    }

    #[test]
    fn test_solve_and_decode() {
        let request = three_day_request();
        let (assignment, solution) = with_model(&request, |b| {
            b.solve(&BranchAndBoundSolver::new(), &SolverConfig::unbounded())
                .unwrap()
        });
        assert_eq!(solution.status, SolveStatus::Optimal);
        let assignment = assignment.unwrap();
        assert_eq!(assignment.len(), 6);
        // Type C alternates Blue / Green; Type O alternates o1 / o2.
        assert_ne!(assignment.assignee(0), assignment.assignee(2));
        assert_ne!(assignment.assignee(2), assignment.assignee(4));
        assert_ne!(assignment.assignee(1), assignment.assignee(3));
        assert_ne!(assignment.assignee(3), assignment.assignee(5));
    }

    #[test]
    fn test_decode_rejects_incomplete() {
        let request = three_day_request();
        let roster = with_model(&request, |b| b.build().unwrap());
        let values = vec![false; roster.model.var_count()];
        assert!(matches!(
            roster.decode(&values),
            Err(ModelError::IncompleteSolution { .. })
        ));
    }

    #[test]
    fn test_precheck_category_capacity() {
        // One Type C employee cannot cover three consecutive days.
        let request = RosterRequest::new(d(2026, 1, 5), d(2026, 1, 7))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("b1", "Blue"))
            .with_employee(Employee::new("o1", "Black"))
            .with_employee(Employee::new("o2", "Black"));
        let err = with_model(&request, |b| b.precheck()).unwrap_err();
        assert_eq!(err.location.as_deref(), Some("Type C"));
    }

    #[test]
    fn test_precheck_daily_staff() {
        // Org + Type C on one day, one Type C employee and no one else.
        let day = d(2026, 1, 5);
        let layout = ShiftLayout::default().with_day(
            crate::models::DayType::Weekday,
            vec![ShiftCategory::Org, ShiftCategory::TypeC],
        );
        let request = RosterRequest::new(day, day)
            .with_team(Team::type_c("Blue"))
            .with_employee(Employee::new("b1", "Blue"))
            .with_config(RosterConfig::default().with_layout(layout));
        let err = with_model(&request, |b| b.precheck()).unwrap_err();
        assert_eq!(err.location.as_deref(), Some("2026-01-05"));
    }

    #[test]
    fn test_precheck_role_caps() {
        let caps = RoleCapConfig::new().with_cap(Role::Standard, 1);
        let request = three_day_request().with_config(RosterConfig::default().with_role_caps(caps));
        // Type C: 3 shifts, 2 employees capped at 1.
        let err = with_model(&request, |b| b.precheck()).unwrap_err();
        assert_eq!(err.location.as_deref(), Some("Type C"));
        assert!(with_model(&three_day_request(), |b| b.precheck()).is_ok());
    }

    #[test]
    fn test_spaced_days() {
        let dates: BTreeSet<NaiveDate> = (5..=11).map(|day| d(2026, 1, day)).collect();
        assert_eq!(spaced_days(&dates), 4);
        let dates: BTreeSet<NaiveDate> = [5, 6, 8, 9].iter().map(|&day| d(2026, 1, day)).collect();
        assert_eq!(spaced_days(&dates), 2);
        assert_eq!(spaced_days(&BTreeSet::new()), 0);
    }
}
