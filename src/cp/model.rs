//! Boolean constraint model.
//!
//! A small CP vocabulary sufficient for assignment problems:
//! - boolean decision variables,
//! - `ExactlyOne` groups (the branching structure; groups must be disjoint),
//! - `AtMost` cardinality constraints,
//! - a [`SpreadObjective`]: minimize max − min over non-negative load
//!   expressions, then maximize the number of true bonus variables.
//!
//! Variables that belong to no `ExactlyOne` group are fixed to false by
//! the solver.

use serde::{Deserialize, Serialize};

/// Handle of a boolean variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

impl VarId {
    /// Position of the variable in the model.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A hard constraint over boolean variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpConstraint {
    /// Exactly one of `vars` is true.
    ExactlyOne { label: String, vars: Vec<VarId> },
    /// At most `limit` of `vars` are true.
    AtMost {
        label: String,
        vars: Vec<VarId>,
        limit: u32,
    },
}

impl CpConstraint {
    /// Diagnostic label.
    pub fn label(&self) -> &str {
        match self {
            CpConstraint::ExactlyOne { label, .. } | CpConstraint::AtMost { label, .. } => label,
        }
    }

    /// Variables in the constraint.
    pub fn vars(&self) -> &[VarId] {
        match self {
            CpConstraint::ExactlyOne { vars, .. } | CpConstraint::AtMost { vars, .. } => vars,
        }
    }

    /// Whether `values` satisfy the constraint.
    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        let count = self
            .vars()
            .iter()
            .filter(|v| values.get(v.index()).copied().unwrap_or(false))
            .count();
        match self {
            CpConstraint::ExactlyOne { .. } => count == 1,
            CpConstraint::AtMost { limit, .. } => count <= *limit as usize,
        }
    }
}

/// `base + Σ weight · var` with non-negative weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadExpr {
    pub label: String,
    pub base: i64,
    pub terms: Vec<(VarId, i64)>,
}

impl LoadExpr {
    /// Evaluates the expression.
    pub fn value(&self, values: &[bool]) -> i64 {
        self.base
            + self
                .terms
                .iter()
                .filter(|(v, _)| values.get(v.index()).copied().unwrap_or(false))
                .map(|(_, w)| w)
                .sum::<i64>()
    }
}

/// Lexicographic fairness objective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpreadObjective {
    /// Loads whose spread (max − min) is minimized.
    pub loads: Vec<LoadExpr>,
    /// Variables whose true count is maximized as a tie-break.
    pub bonus: Vec<VarId>,
}

/// Objective value of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveValue {
    /// max − min over loads (0 without loads).
    pub spread: i64,
    /// Number of true bonus variables.
    pub bonus: i64,
}

/// Errors raised while assembling a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("constraint '{label}' references unknown variable #{var}")]
    UnknownVariable { label: String, var: usize },
    #[error("variable '{var}' already belongs to an exactly-one group (adding '{label}')")]
    OverlappingGroup { label: String, var: String },
    #[error("load '{label}' has a negative weight")]
    NegativeWeight { label: String },
    #[error("solver returned an incomplete assignment for '{label}'")]
    IncompleteSolution { label: String },
}

/// A boolean CP model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpModel {
    name: String,
    var_names: Vec<String>,
    grouped: Vec<bool>,
    constraints: Vec<CpConstraint>,
    objective: SpreadObjective,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creates a boolean variable.
    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.var_names.push(name.into());
        self.grouped.push(false);
        VarId(self.var_names.len() - 1)
    }

    /// Number of variables.
    pub fn var_count(&self) -> usize {
        self.var_names.len()
    }

    /// Variable name.
    pub fn var_name(&self, var: VarId) -> Option<&str> {
        self.var_names.get(var.index()).map(String::as_str)
    }

    /// Adds an exactly-one group.
    ///
    /// Fails if a variable already belongs to another group.
    pub fn add_exactly_one(
        &mut self,
        label: impl Into<String>,
        vars: Vec<VarId>,
    ) -> Result<(), ModelError> {
        let label = label.into();
        let vars = self.checked_vars(&label, vars)?;
        if let Some(v) = vars.iter().find(|v| self.grouped[v.index()]) {
            return Err(ModelError::OverlappingGroup {
                label,
                var: self.var_names[v.index()].clone(),
            });
        }
        for v in &vars {
            self.grouped[v.index()] = true;
        }
        self.constraints.push(CpConstraint::ExactlyOne { label, vars });
        Ok(())
    }

    /// Adds an at-most-`limit` constraint.
    pub fn add_at_most(
        &mut self,
        label: impl Into<String>,
        vars: Vec<VarId>,
        limit: u32,
    ) -> Result<(), ModelError> {
        let label = label.into();
        let vars = self.checked_vars(&label, vars)?;
        self.constraints.push(CpConstraint::AtMost { label, vars, limit });
        Ok(())
    }

    /// Adds a load expression to the spread objective.
    pub fn add_load(
        &mut self,
        label: impl Into<String>,
        base: i64,
        terms: Vec<(VarId, i64)>,
    ) -> Result<(), ModelError> {
        let label = label.into();
        if terms.iter().any(|(_, w)| *w < 0) {
            return Err(ModelError::NegativeWeight { label });
        }
        if let Some((v, _)) = terms.iter().find(|(v, _)| v.index() >= self.var_count()) {
            return Err(ModelError::UnknownVariable { label, var: v.index() });
        }
        self.objective.loads.push(LoadExpr { label, base, terms });
        Ok(())
    }

    /// Marks a variable as a tie-break bonus.
    pub fn add_bonus(&mut self, var: VarId) -> Result<(), ModelError> {
        if var.index() >= self.var_count() {
            return Err(ModelError::UnknownVariable {
                label: "bonus".into(),
                var: var.index(),
            });
        }
        if !self.objective.bonus.contains(&var) {
            self.objective.bonus.push(var);
        }
        Ok(())
    }

    /// All constraints.
    pub fn constraints(&self) -> &[CpConstraint] {
        &self.constraints
    }

    /// Number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// The objective.
    pub fn objective(&self) -> &SpreadObjective {
        &self.objective
    }

    /// Whether `values` satisfy every constraint.
    pub fn is_feasible(&self, values: &[bool]) -> bool {
        values.len() == self.var_count() && self.constraints.iter().all(|c| c.is_satisfied(values))
    }

    /// Objective value of `values`.
    pub fn evaluate(&self, values: &[bool]) -> ObjectiveValue {
        let loads: Vec<i64> = self.objective.loads.iter().map(|l| l.value(values)).collect();
        let spread = match (loads.iter().max(), loads.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };
        let bonus = self
            .objective
            .bonus
            .iter()
            .filter(|v| values.get(v.index()).copied().unwrap_or(false))
            .count() as i64;
        ObjectiveValue { spread, bonus }
    }

    /// Upper bound on the number of bonus variables that can be true.
    ///
    /// Bonus variables sharing an exactly-one group count once.
    pub fn max_bonus(&self) -> i64 {
        let mut counted = vec![false; self.constraints.len()];
        let mut total = 0;
        for var in &self.objective.bonus {
            let group = self.constraints.iter().position(|c| {
                matches!(c, CpConstraint::ExactlyOne { vars, .. } if vars.contains(var))
            });
            match group {
                Some(g) if counted[g] => {}
                Some(g) => {
                    counted[g] = true;
                    total += 1;
                }
                None => total += 1,
            }
        }
        total
    }

    /// Weight that keeps the bonus term below one unit of spread.
    #[inline]
    pub fn tie_weight(&self) -> i64 {
        self.max_bonus() + 1
    }

    /// Single comparable score: lower is better.
    pub fn score(&self, value: ObjectiveValue) -> i64 {
        value.spread * self.tie_weight() - value.bonus
    }

    fn checked_vars(&self, label: &str, mut vars: Vec<VarId>) -> Result<Vec<VarId>, ModelError> {
        if let Some(v) = vars.iter().find(|v| v.index() >= self.var_count()) {
            return Err(ModelError::UnknownVariable {
                label: label.to_string(),
                var: v.index(),
            });
        }
        vars.sort();
        vars.dedup();
        Ok(vars)
    }
}
