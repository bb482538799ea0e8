//! Structural eligibility of (employee, shift) pairs.
//!
//! Eligibility is decided per pair, independently of every other
//! assignment. A pair is admissible when all of these hold:
//!
//! 1. The employee's team category matches the shift category, or the
//!    shift is an `Org` shift.
//! 2. The employee's role cap is not zero.
//! 3. The shift date is not a blackout date.
//! 4. For a public-holiday shift, the employee is not immune, unless the
//!    employee bid for that date.
//!
//! Ineligible pairs get no decision variable in the CP model.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RosterConfig;
use crate::models::{Employee, RosterPeriod, Shift, TeamCategory};
use crate::scheduler::RosterRequest;

/// Why a pair is not admissible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IneligibleReason {
    /// Team category does not serve the shift category.
    CategoryMismatch,
    /// The role cap is zero.
    ZeroCap,
    /// The date is a blackout date.
    Blackout,
    /// Public-holiday immunity is active and no bid was placed.
    PhImmunity,
}

/// Result of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Eligibility {
    Eligible,
    Ineligible(IneligibleReason),
}

impl Eligibility {
    /// Whether the pair is admissible.
    #[inline]
    pub fn is_eligible(self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Evaluates eligibility rules under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityEvaluator<'a> {
    config: &'a RosterConfig,
}

impl<'a> EligibilityEvaluator<'a> {
    /// Creates an evaluator.
    pub fn new(config: &'a RosterConfig) -> Self {
        Self { config }
    }

    /// Checks one pair. The first failing rule is reported.
    pub fn check(&self, employee: &Employee, team: TeamCategory, shift: &Shift) -> Eligibility {
        if !shift.category.accepts(team) {
            return Eligibility::Ineligible(IneligibleReason::CategoryMismatch);
        }
        if self.config.role_caps.cap_for(&employee.role) == Some(0) {
            return Eligibility::Ineligible(IneligibleReason::ZeroCap);
        }
        if employee.is_blacked_out(shift.date) {
            return Eligibility::Ineligible(IneligibleReason::Blackout);
        }
        if shift.is_public_holiday()
            && !employee.has_bid(shift.date)
            && employee.is_immune(shift.date, self.config.ph_immunity_years)
        {
            return Eligibility::Ineligible(IneligibleReason::PhImmunity);
        }
        Eligibility::Eligible
    }

    /// Shorthand for `check(..).is_eligible()`.
    #[inline]
    pub fn is_eligible(&self, employee: &Employee, team: TeamCategory, shift: &Shift) -> bool {
        self.check(employee, team, shift).is_eligible()
    }

    /// Evaluates every pair of a request.
    ///
    /// Employees whose team is unknown are skipped (input validation
    /// reports them).
    pub fn table(&self, request: &RosterRequest, period: &RosterPeriod) -> EligibilityTable {
        let mut order: Vec<usize> = (0..request.employees.len()).collect();
        order.sort_by(|&a, &b| {
            request.employees[a]
                .id
                .cmp(&request.employees[b].id)
                .then(a.cmp(&b))
        });

        let categories: Vec<Option<TeamCategory>> = request
            .employees
            .iter()
            .map(|e| request.team(&e.team).map(|t| t.category))
            .collect();

        let mut by_shift = Vec::with_capacity(period.shift_count());
        let mut per_employee = vec![0; request.employees.len()];
        for shift in &period.shifts {
            let eligible: Vec<usize> = order
                .iter()
                .copied()
                .filter(|&e| {
                    categories[e]
                        .is_some_and(|team| self.is_eligible(&request.employees[e], team, shift))
                })
                .collect();
            for &e in &eligible {
                per_employee[e] += 1;
            }
            by_shift.push(eligible);
        }

        let table = EligibilityTable {
            by_shift,
            per_employee,
        };
        debug!(
            shifts = period.shift_count(),
            pairs = table.pair_count(),
            "eligibility evaluated"
        );
        table
    }
}

/// Eligible employees per shift.
///
/// Shift and employee indices refer to [`RosterPeriod::shifts`] and
/// [`RosterRequest::employees`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EligibilityTable {
    by_shift: Vec<Vec<usize>>,
    per_employee: Vec<usize>,
}

impl EligibilityTable {
    /// Eligible employee indices of a shift, ordered by employee id.
    pub fn eligible(&self, shift: usize) -> &[usize] {
        self.by_shift.get(shift).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether employee `employee` may cover shift `shift`.
    pub fn contains(&self, shift: usize, employee: usize) -> bool {
        self.eligible(shift).contains(&employee)
    }

    /// Shifts without any eligible employee.
    pub fn unfillable(&self) -> Vec<usize> {
        self.by_shift
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_empty())
            .map(|(s, _)| s)
            .collect()
    }

    /// Number of shifts an employee is eligible for.
    pub fn shift_count_for(&self, employee: usize) -> usize {
        self.per_employee.get(employee).copied().unwrap_or(0)
    }

    /// Total number of eligible pairs.
    pub fn pair_count(&self) -> usize {
        self.by_shift.iter().map(Vec::len).sum()
    }
}
