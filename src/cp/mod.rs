//! CP-based roster formulation.
//!
//! A small boolean constraint-programming layer plus the roster-specific
//! builder that translates employees, shifts, and eligibility into it.
//!
//! - [`CpModel`]: boolean variables, `ExactlyOne` groups, `AtMost`
//!   constraints, and a spread-minimizing objective.
//! - [`CpSolver`]: the search capability. Any backend that honors the
//!   model semantics and the budget can replace [`BranchAndBoundSolver`].
//! - [`RosterCpBuilder`]: emits the coverage, one-per-day, rest, role cap,
//!   and team rotation constraints, then decodes a solution back into an
//!   [`Assignment`].
//!
//! # Reference
//! - Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

mod builder;
mod model;
mod solver;

pub use builder::{Assignment, RosterCpBuilder, RosterModel};
pub use model::{
    CpConstraint, CpModel, LoadExpr, ModelError, ObjectiveValue, SpreadObjective, VarId,
};
pub use solver::{BranchAndBoundSolver, CpSolution, CpSolver, SolveStatus, SolverConfig};
