//! Roster optimization and evaluation.
//!
//! Provides the request container, the optimizing scheduler facade, roster
//! quality metrics, and a rule audit for finished schedules.
//!
//! # Algorithm
//!
//! `RosterScheduler` validates the request, prunes ineligible pairs, builds
//! a boolean CP model, and runs an exact branch-and-bound search that
//! minimizes the spread of total points, breaking ties by honored
//! public-holiday bids.
//!
//! # KPI
//!
//! `RosterKpi` computes fairness spread (overall and per team), point
//! totals, per-category shift counts, and the bid honor rate.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications, methods and models"

mod audit;
mod kpi;
mod request;
mod roster;

pub use audit::audit_schedule;
pub use kpi::RosterKpi;
pub use request::RosterRequest;
pub use roster::{RosterOutcome, RosterScheduler};
