//! Roster quality metrics (KPIs).
//!
//! Computes fairness and preference indicators from a projected schedule
//! and its request.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Spread | max total points − min total points |
//! | Team spread | Spread restricted to one team |
//! | Mean total | Average total points per employee |
//! | Shifts by category | Shifts worked per employee per category |
//! | Bid honor rate | Honored PH bids / PH bids inside the period |
//!
//! # Reference
//! Burke et al. (2004), "The State of the Art of Nurse Rostering", §2.3: Fairness

use std::collections::BTreeMap;

use super::RosterRequest;
use crate::models::{Schedule, ShiftCategory};

/// Roster performance indicators.
///
/// All point values are in points (not internal units).
#[derive(Debug, Clone)]
pub struct RosterKpi {
    /// Fairness spread across all employees.
    pub spread: f64,
    /// Lowest total points.
    pub min_total: f64,
    /// Highest total points.
    pub max_total: f64,
    /// Mean total points.
    pub mean_total: f64,
    /// Spread within each team.
    pub spread_by_team: BTreeMap<String, f64>,
    /// Shifts worked per employee, per category.
    pub shifts_by_employee: BTreeMap<String, BTreeMap<ShiftCategory, usize>>,
    /// Bids placed on public holidays inside the period.
    pub ph_bids_requested: usize,
    /// Public-holiday shifts given to a bidder.
    pub ph_bids_honored: usize,
    /// `ph_bids_honored / ph_bids_requested` (1.0 when nothing was requested).
    pub bid_honor_rate: f64,
}

impl RosterKpi {
    /// Computes KPIs from a schedule and its request.
    ///
    /// # Arguments
    /// * `schedule` - The projected schedule.
    /// * `request` - The request it was solved from (teams and bids).
    pub fn calculate(schedule: &Schedule, request: &RosterRequest) -> Self {
        let totals: Vec<f64> = schedule.summaries.iter().map(|s| s.total_points).collect();
        let min_total = schedule.min_total().unwrap_or(0.0);
        let max_total = schedule.max_total().unwrap_or(0.0);
        let mean_total = if totals.is_empty() {
            0.0
        } else {
            totals.iter().sum::<f64>() / totals.len() as f64
        };

        let mut team_totals: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for summary in &schedule.summaries {
            let entry = team_totals
                .entry(summary.team.clone())
                .or_insert((f64::INFINITY, f64::NEG_INFINITY));
            entry.0 = entry.0.min(summary.total_points);
            entry.1 = entry.1.max(summary.total_points);
        }
        let spread_by_team = team_totals
            .into_iter()
            .map(|(team, (min, max))| (team, max - min))
            .collect();

        let mut shifts_by_employee: BTreeMap<String, BTreeMap<ShiftCategory, usize>> = request
            .employees
            .iter()
            .map(|e| (e.id.clone(), BTreeMap::new()))
            .collect();
        for assignment in &schedule.assignments {
            *shifts_by_employee
                .entry(assignment.employee_id.clone())
                .or_default()
                .entry(assignment.category)
                .or_default() += 1;
        }

        let period = request.period();
        let ph_bids_requested = request
            .employees
            .iter()
            .map(|e| e.ph_bids.iter().filter(|d| period.is_public_holiday(**d)).count())
            .sum();
        let ph_bids_honored = schedule.bids_honored();
        let bid_honor_rate = if ph_bids_requested == 0 {
            1.0
        } else {
            ph_bids_honored as f64 / ph_bids_requested as f64
        };

        Self {
            spread: max_total - min_total,
            min_total,
            max_total,
            mean_total,
            spread_by_team,
            shifts_by_employee,
            ph_bids_requested,
            ph_bids_honored,
            bid_honor_rate,
        }
    }

    /// Shifts worked by one employee in one category.
    pub fn shifts_for(&self, employee_id: &str, category: ShiftCategory) -> usize {
        self.shifts_by_employee
            .get(employee_id)
            .and_then(|m| m.get(&category))
            .copied()
            .unwrap_or(0)
    }

    /// Whether the roster meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_spread: f64, min_bid_honor_rate: f64) -> bool {
        self.spread <= max_spread && self.bid_honor_rate >= min_bid_honor_rate
    }
}
