//! Fair duty rostering for the U-Engine ecosystem.
//!
//! Assigns personnel to daily duty shifts so that every shift is covered,
//! eligibility and labour rules hold, and accumulated workload points are
//! spread as evenly as possible.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Employee`, `Team`, `Shift`, `Holiday`,
//!   `RosterPeriod`, `Schedule`
//! - **`config`**: Point values, role caps, shift layout, immunity window, budget
//! - **`eligibility`**: Per-pair admissibility (category, blackout, PH immunity)
//! - **`validation`**: Input integrity checks (duplicate IDs, team refs, caps, coverage)
//! - **`cp`**: Boolean CP model, branch-and-bound search, roster model builder
//! - **`scheduler`**: `RosterScheduler` facade, KPIs, schedule audit
//! - **`projection`**: Assignment → `Schedule` with updated point totals
//! - **`generator`**: Seeded sample employee databases
//! - **`error`**: `RosterError` and its typed causes
//!
//! # Architecture
//!
//! Domain models and eligibility feed the CP builder; the builder's model
//! is solved by any `CpSolver`; the projector turns the solution into a
//! `Schedule`. A solve is a pure function of its `RosterRequest`.
//!
//! # References
//!
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of applications, methods and models"
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"

pub mod config;
pub mod cp;
pub mod eligibility;
pub mod error;
pub mod generator;
pub mod models;
pub mod projection;
pub mod scheduler;
pub mod validation;

pub use error::{ConfigurationError, InfeasibleModelError, RosterError};
pub use scheduler::{RosterOutcome, RosterRequest, RosterScheduler};
