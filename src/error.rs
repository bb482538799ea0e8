//! Typed failures of a roster solve.
//!
//! A budget running out is not an error: it is reported through
//! [`crate::scheduler::RosterOutcome`].

use crate::cp::ModelError;
use crate::validation::ValidationError;

/// Any failure returned by [`crate::scheduler::RosterScheduler::solve`].
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Infeasible(#[from] InfeasibleModelError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Structurally invalid input, detected before the search starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid roster configuration: {}", summarize(.errors))]
pub struct ConfigurationError {
    /// Every problem found.
    pub errors: Vec<ValidationError>,
}

impl ConfigurationError {
    pub fn new(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

/// Well-formed input whose hard constraints admit no roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("roster is infeasible{}: {message}", location_suffix(.location))]
pub struct InfeasibleModelError {
    /// Shift, date, category, or cap the conflict was traced to.
    pub location: Option<String>,
    pub message: String,
}

impl InfeasibleModelError {
    pub fn new(location: Option<String>, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

fn location_suffix(location: &Option<String>) -> String {
    location
        .as_deref()
        .map(|l| format!(" at {l}"))
        .unwrap_or_default()
}
