//! Roster optimization facade.
//!
//! # Pipeline
//!
//! 1. Validate the request (`ConfigurationError` on failure).
//! 2. Evaluate eligibility and reject unfillable shifts (`ConfigurationError`).
//! 3. Capacity pre-checks (`InfeasibleModelError`).
//! 4. Build the CP model and search within the budget.
//! 5. Project the best assignment into a [`Schedule`].
//!
//! A solve is synchronous and keeps no state between calls.

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, warn};

use super::RosterRequest;
use crate::cp::{BranchAndBoundSolver, CpSolver, ModelError, RosterCpBuilder, SolveStatus};
use crate::eligibility::EligibilityEvaluator;
use crate::error::{ConfigurationError, InfeasibleModelError, RosterError};
use crate::models::Schedule;
use crate::projection::project_schedule;
use crate::validation::{validate_coverage, validate_request};

/// Result of a successful solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RosterOutcome {
    /// The fairest roster, proven optimal.
    Optimal(Schedule),
    /// The best roster found before the budget ran out.
    Feasible(Schedule),
    /// The budget ran out before any roster was found.
    TimedOutNoSolution,
}

impl RosterOutcome {
    /// Outcome tag.
    pub fn status(&self) -> SolveStatus {
        match self {
            RosterOutcome::Optimal(_) => SolveStatus::Optimal,
            RosterOutcome::Feasible(_) => SolveStatus::Feasible,
            RosterOutcome::TimedOutNoSolution => SolveStatus::TimedOutNoSolution,
        }
    }

    /// The schedule, if one was found.
    pub fn schedule(&self) -> Option<&Schedule> {
        match self {
            RosterOutcome::Optimal(s) | RosterOutcome::Feasible(s) => Some(s),
            RosterOutcome::TimedOutNoSolution => None,
        }
    }

    /// Consumes the outcome, returning the schedule if one was found.
    pub fn into_schedule(self) -> Option<Schedule> {
        match self {
            RosterOutcome::Optimal(s) | RosterOutcome::Feasible(s) => Some(s),
            RosterOutcome::TimedOutNoSolution => None,
        }
    }
}

/// Roster optimizer.
///
/// Generic over the search backend; defaults to [`BranchAndBoundSolver`].
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use u_roster::models::{Employee, Team};
/// use u_roster::scheduler::{RosterRequest, RosterScheduler};
///
/// let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// let request = RosterRequest::new(day, day.succ_opt().unwrap())
///     .with_team(Team::type_c("Blue"))
///     .with_team(Team::type_o("Black"))
///     .with_employees(vec![
///         Employee::new("c1", "Blue"),
///         Employee::new("c2", "Blue"),
///         Employee::new("o1", "Black"),
///         Employee::new("o2", "Black"),
///     ]);
///
/// let outcome = RosterScheduler::new().solve(&request).unwrap();
/// let schedule = outcome.schedule().unwrap();
/// assert_eq!(schedule.assignment_count(), 4);
/// assert_eq!(schedule.spread(), 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RosterScheduler<S: CpSolver = BranchAndBoundSolver> {
    solver: S,
}

impl RosterScheduler {
    /// Creates a scheduler with the default solver.
    pub fn new() -> Self {
        Self {
            solver: BranchAndBoundSolver::new(),
        }
    }
}

impl<S: CpSolver> RosterScheduler<S> {
    /// Creates a scheduler with a custom search backend.
    pub fn with_solver(solver: S) -> Self {
        Self { solver }
    }

    /// Solves a roster request.
    ///
    /// # Errors
    /// - [`RosterError::Configuration`] for invalid input or unfillable shifts.
    /// - [`RosterError::Infeasible`] when no roster satisfies the hard rules.
    /// - [`RosterError::Model`] if the solver returns an inconsistent assignment.
    pub fn solve(&self, request: &RosterRequest) -> Result<RosterOutcome, RosterError> {
        let started = Instant::now();

        validate_request(request).map_err(|errors| {
            warn!(errors = errors.len(), "roster request rejected");
            ConfigurationError::new(errors)
        })?;

        let period = request.period();
        let table = EligibilityEvaluator::new(&request.config).table(request, &period);
        validate_coverage(&period, &table).map_err(|errors| {
            warn!(unfillable = errors.len(), "roster has unfillable shifts");
            ConfigurationError::new(errors)
        })?;

        let builder = RosterCpBuilder::new(request, &period, &table);
        builder.precheck().inspect_err(|err| {
            warn!(location = ?err.location, "roster capacity check failed");
        })?;

        let (assignment, solution) =
            builder.solve(&self.solver, &request.config.solver_config())?;

        let outcome = match (solution.status, assignment) {
            (SolveStatus::Optimal, Some(assignment)) => {
                RosterOutcome::Optimal(project_schedule(request, &period, &assignment))
            }
            (SolveStatus::Feasible, Some(assignment)) => {
                warn!(nodes = solution.nodes, "search budget exhausted before optimality proof");
                RosterOutcome::Feasible(project_schedule(request, &period, &assignment))
            }
            (SolveStatus::TimedOutNoSolution, _) => {
                warn!(nodes = solution.nodes, "search budget exhausted without a roster");
                RosterOutcome::TimedOutNoSolution
            }
            (SolveStatus::Infeasible, _) => {
                warn!(conflict = ?solution.conflict, "roster is infeasible");
                return Err(InfeasibleModelError::new(
                    solution.conflict,
                    "no roster satisfies coverage, rest, cap, and rotation rules",
                )
                .into());
            }
            (_, None) => {
                return Err(ModelError::IncompleteSolution {
                    label: "roster".into(),
                }
                .into())
            }
        };

        info!(
            status = ?outcome.status(),
            shifts = period.shift_count(),
            nodes = solution.nodes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            spread = outcome.schedule().map(Schedule::spread),
            "roster solved"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RosterConfig, POINT_SCALE};
    use crate::cp::{Assignment, CpModel, CpSolution, SolverConfig};
    use crate::models::{Employee, Holiday, ShiftCategory, Team};
    use crate::projection::updated_employees;
    use crate::scheduler::{audit_schedule, RosterKpi};
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Mon 2026-01-05 .. Sun 2026-01-11, public holiday on Fri 2026-01-09.
    fn week_request() -> RosterRequest {
        let ph = d(2026, 1, 9);
        RosterRequest::new(d(2026, 1, 5), d(2026, 1, 11))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("c1", "Blue").with_ph_bid(ph))
            .with_employee(Employee::new("c2", "Blue").with_ytd_points(2.0))
            .with_employee(Employee::new("o1", "Black"))
            .with_employee(Employee::new("o2", "Black").with_ytd_points(2.0))
            .with_holiday(Holiday::new(ph, "Founders Day"))
            .with_config(RosterConfig::default().unbounded())
    }

    #[test]
    fn test_end_to_end_week() {
        let request = week_request();
        let outcome = RosterScheduler::new().solve(&request).unwrap();
        assert_eq!(outcome.status(), SolveStatus::Optimal);
        let schedule = outcome.schedule().unwrap();

        // The bidder works the holiday.
        assert_eq!(schedule.assignee(d(2026, 1, 9), ShiftCategory::TypeC), Some("c1"));
        assert_eq!(schedule.bids_honored(), 1);

        // One Type C and one Type O every day.
        for day in 5..=11 {
            let on_day = schedule.assignments_on(d(2026, 1, day));
            assert_eq!(on_day.len(), 2);
            assert!(on_day.iter().any(|a| a.category == ShiftCategory::TypeC));
            assert!(on_day.iter().any(|a| a.category == ShiftCategory::TypeO));
        }

        // No consecutive days, and every hard rule holds.
        assert!(audit_schedule(&request, schedule).is_empty());

        // 5.5 points for every employee.
        assert!(schedule.spread() <= 1.0);
        assert!(schedule.spread().abs() < 1e-10);
        let c1 = schedule.summary_for("c1").unwrap();
        assert!((c1.total_points - 5.5).abs() < 1e-10);
        assert_eq!(c1.last_ph_date, Some(d(2026, 1, 9)));
    }

    #[test]
    fn test_determinism() {
        let request = week_request();
        let a = RosterScheduler::new().solve(&request).unwrap();
        let b = RosterScheduler::new().solve(&request).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    /// Every assignment that picks one eligible employee per shift.
    fn enumerate(choices: &[Vec<usize>], f: &mut impl FnMut(&[usize])) {
        fn go(choices: &[Vec<usize>], prefix: &mut Vec<usize>, f: &mut impl FnMut(&[usize])) {
            if prefix.len() == choices.len() {
                f(prefix);
                return;
            }
            for &e in &choices[prefix.len()] {
                prefix.push(e);
                go(choices, prefix, f);
                prefix.pop();
            }
        }
        go(choices, &mut Vec::new(), f);
    }

    /// Smallest spread (in point units) over every roster that passes the audit.
    fn exhaustive_min_spread(request: &RosterRequest) -> Option<i64> {
        let period = request.period();
        let table = EligibilityEvaluator::new(&request.config).table(request, &period);
        let choices: Vec<Vec<usize>> = (0..period.shift_count())
            .map(|s| table.eligible(s).to_vec())
            .collect();

        let mut best: Option<i64> = None;
        enumerate(&choices, &mut |picks| {
            let schedule = project_schedule(request, &period, &Assignment::new(picks.to_vec()));
            if audit_schedule(request, &schedule).is_empty() {
                let spread = (schedule.spread() * POINT_SCALE).round() as i64;
                best = Some(best.map_or(spread, |s| s.min(spread)));
            }
        });
        best
    }

    #[test]
    fn test_optimal_against_exhaustive_search() {
        // 4 employees × 7 days, two Type C teams so rotation applies.
        let request = RosterRequest::new(d(2026, 1, 5), d(2026, 1, 11))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_c("Green"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("b1", "Blue").with_ytd_points(1.0))
            .with_employee(Employee::new("g1", "Green").with_blackout(d(2026, 1, 7)))
            .with_employee(Employee::new("o1", "Black").with_ytd_points(0.5))
            .with_employee(Employee::new("o2", "Black").with_ytd_points(3.0))
            .with_config(RosterConfig::default().unbounded());

        let outcome = RosterScheduler::new().solve(&request).unwrap();
        assert_eq!(outcome.status(), SolveStatus::Optimal);
        let best = outcome.schedule().unwrap();
        assert!(audit_schedule(&request, best).is_empty());

        let found = (best.spread() * POINT_SCALE).round() as i64;
        assert_eq!(Some(found), exhaustive_min_spread(&request));
    }

    #[test]
    fn test_end_to_end_week_without_history() {
        // Zero YTD everywhere: each pair must alternate, so one side of a
        // category earns 5.5 points (Mon/Wed/Fri/Sun) and the other 3.5.
        let mut request = week_request();
        for employee in &mut request.employees {
            employee.ytd_points = 0.0;
        }
        let outcome = RosterScheduler::new().solve(&request).unwrap();
        assert_eq!(outcome.status(), SolveStatus::Optimal);
        let schedule = outcome.schedule().unwrap();

        assert!(audit_schedule(&request, schedule).is_empty());
        assert_eq!(schedule.assignee(d(2026, 1, 9), ShiftCategory::TypeC), Some("c1"));
        assert!((schedule.spread() - 2.0).abs() < 1e-10);
        let found = (schedule.spread() * POINT_SCALE).round() as i64;
        assert_eq!(Some(found), exhaustive_min_spread(&request));
    }

    #[test]
    fn test_rotation_holds_when_one_team_is_available() {
        // Green's only member is off Tue and Wed; Blue cannot cover both.
        let request = RosterRequest::new(d(2026, 1, 5), d(2026, 1, 7))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_c("Green"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("b1", "Blue"))
            .with_employee(Employee::new("b2", "Blue"))
            .with_employee(
                Employee::new("g1", "Green").with_blackouts([d(2026, 1, 6), d(2026, 1, 7)]),
            )
            .with_employee(Employee::new("o1", "Black"))
            .with_employee(Employee::new("o2", "Black"))
            .with_config(RosterConfig::default().unbounded());
        assert_eq!(exhaustive_min_spread(&request), None);
        match RosterScheduler::new().solve(&request) {
            Err(RosterError::Infeasible(err)) => assert!(err.location.is_some()),
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_unfillable_shift_is_configuration_error() {
        // The only Type C team is blacked out on the only day.
        let day = d(2026, 1, 5);
        let request = RosterRequest::new(day, day)
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("c1", "Blue").with_blackout(day))
            .with_employee(Employee::new("c2", "Blue").with_blackout(day))
            .with_employee(Employee::new("o1", "Black"));

        match RosterScheduler::new().solve(&request) {
            Err(RosterError::Configuration(err)) => {
                assert_eq!(err.errors.len(), 1);
                assert_eq!(err.errors[0].kind, ValidationErrorKind::UnfillableShift);
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_request_is_configuration_error() {
        let day = d(2026, 1, 5);
        let request = RosterRequest::new(day, day);
        assert!(matches!(
            RosterScheduler::new().solve(&request),
            Err(RosterError::Configuration(_))
        ));
    }

    #[test]
    fn test_capacity_infeasibility() {
        // A single Type C employee cannot cover three consecutive days.
        let request = RosterRequest::new(d(2026, 1, 5), d(2026, 1, 7))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_o("Black"))
            .with_employee(Employee::new("c1", "Blue"))
            .with_employee(Employee::new("o1", "Black"))
            .with_employee(Employee::new("o2", "Black"));
        match RosterScheduler::new().solve(&request) {
            Err(RosterError::Infeasible(err)) => {
                assert_eq!(err.location.as_deref(), Some("Type C"));
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_search_infeasibility_names_shift() {
        // g1 is the only Type C cover on Monday and Tuesday.
        let request = RosterRequest::new(d(2026, 1, 5), d(2026, 1, 7))
            .with_team(Team::type_c("Blue"))
            .with_team(Team::type_c("Green"))
            .with_team(Team::type_o("Black"))
            .with_employee(
                Employee::new("b1", "Blue").with_blackouts([d(2026, 1, 5), d(2026, 1, 6)]),
            )
            .with_employee(Employee::new("g1", "Green"))
            .with_employee(Employee::new("o1", "Black"))
            .with_employee(Employee::new("o2", "Black"))
            .with_config(RosterConfig::default().unbounded());
        match RosterScheduler::new().solve(&request) {
            Err(RosterError::Infeasible(err)) => {
                assert_eq!(err.location.as_deref(), Some("2026-01-06 Type C"));
            }
            other => panic!("expected infeasible, got {other:?}"),
        }
    }

    #[test]
    fn test_node_budget_without_roster() {
        let request = week_request().with_config(RosterConfig::default().unbounded().with_node_limit(1));
        let outcome = RosterScheduler::new().solve(&request).unwrap();
        assert_eq!(outcome, RosterOutcome::TimedOutNoSolution);
        assert!(outcome.schedule().is_none());
    }

    /// Delegates to branch and bound but never claims a proof.
    struct Unproven;

    impl CpSolver for Unproven {
        fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
            let mut solution = BranchAndBoundSolver::new().solve(model, config);
            if solution.status == SolveStatus::Optimal {
                solution.status = SolveStatus::Feasible;
            }
            solution
        }
    }

    #[test]
    fn test_custom_solver_feasible() {
        let request = week_request();
        let outcome = RosterScheduler::with_solver(Unproven).solve(&request).unwrap();
        assert_eq!(outcome.status(), SolveStatus::Feasible);
        let schedule = outcome.into_schedule().unwrap();
        assert!(audit_schedule(&request, &schedule).is_empty());
    }

    #[test]
    fn test_parallel_solves() {
        let requests = vec![week_request(), week_request(), week_request()];
        let scheduler = RosterScheduler::new();
        let scheduler = &scheduler;
        let outcomes: Vec<RosterOutcome> = std::thread::scope(|scope| {
            let handles: Vec<_> = requests
                .iter()
                .map(|r| scope.spawn(move || scheduler.solve(r).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(outcomes.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_roll_forward() {
        let request = week_request();
        let schedule = RosterScheduler::new()
            .solve(&request)
            .unwrap()
            .into_schedule()
            .unwrap();
        let next = updated_employees(&request, &schedule);
        assert!(next.iter().all(|e| (e.ytd_points - 5.5).abs() < 1e-10));

        let kpi = RosterKpi::calculate(&schedule, &request);
        assert_eq!(kpi.ph_bids_honored, 1);
        assert!(kpi.meets_thresholds(0.0, 1.0));
    }
}
