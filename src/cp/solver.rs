//! Branch-and-bound search for boolean CP models.
//!
//! # Algorithm
//!
//! Depth-first search over the `ExactlyOne` groups of a [`CpModel`]:
//!
//! 1. **Fail-first**: branch on the open group with the fewest live
//!    candidates (ties: lowest group index).
//! 2. **Value ordering**: least-loaded candidate first, bonus variables
//!    before others at equal load, then variable index.
//! 3. **Forward checking**: when an `AtMost` constraint becomes full, all
//!    its variables are blocked; an open group left without live
//!    candidates fails immediately.
//! 4. **Bounding**: a node is pruned when
//!    `max(current load) − min(current load + reachable load)` combined
//!    with the open bonus count cannot beat the incumbent.
//! 5. **Early proof**: the search stops as soon as the incumbent reaches a
//!    global lower bound (root bound, and a parity bound when every
//!    group's weight is uniform so the total load is fixed).
//!
//! The search is deterministic: the same model and node budget always
//! produce the same result. A wall-clock budget is checked every 256
//! nodes.
//!
//! # Reference
//! - Land & Doig (1960), "An Automatic Method of Solving Discrete Programming Problems"
//! - Haralick & Elliott (1980), "Increasing Tree Search Efficiency for CSPs"

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

use super::model::{CpConstraint, CpModel, ObjectiveValue};

/// Search budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock limit (`None` = unlimited).
    pub time_limit: Option<Duration>,
    /// Maximum number of search nodes (`None` = unlimited).
    pub node_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit: Some(Duration::from_secs(10)),
            node_limit: None,
        }
    }
}

impl SolverConfig {
    /// No budget: the search always runs to completion.
    pub fn unbounded() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
        }
    }

    /// Sets the wall-clock limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }
}

/// Outcome category of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Best solution found and proven optimal.
    Optimal,
    /// Solution found, budget ran out before the proof.
    Feasible,
    /// Search space exhausted without a solution.
    Infeasible,
    /// Budget ran out before any solution was found.
    TimedOutNoSolution,
}

/// Result of a search.
#[derive(Debug, Clone)]
pub struct CpSolution {
    pub status: SolveStatus,
    /// Variable values of the best solution (empty if none).
    pub values: Vec<bool>,
    /// Objective value of the best solution.
    pub objective: Option<ObjectiveValue>,
    /// Search nodes visited.
    pub nodes: u64,
    /// Wall-clock time spent.
    pub elapsed: Duration,
    /// Label of the constraint most often responsible for failures.
    pub conflict: Option<String>,
}

impl CpSolution {
    /// Whether a solution is available.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// A search backend for [`CpModel`]s.
pub trait CpSolver: Send + Sync {
    /// Solves the model within the budget.
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution;
}

/// Exact depth-first branch-and-bound solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct BranchAndBoundSolver;

impl BranchAndBoundSolver {
    /// Creates the solver.
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for BranchAndBoundSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();
        let mut search = Search::new(model, config, started);
        let status = search.run();

        let (values, objective) = match search.best.take() {
            Some(best) => {
                let objective = model.evaluate(&best.values);
                (best.values, Some(objective))
            }
            None => (Vec::new(), None),
        };
        let conflict = if status == SolveStatus::Infeasible {
            search.conflict_label()
        } else {
            None
        };

        CpSolution {
            status,
            values,
            objective,
            nodes: search.nodes,
            elapsed: started.elapsed(),
            conflict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct Incumbent {
    score: i64,
    values: Vec<bool>,
}

struct Search<'m> {
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
    started: Instant,

    groups: Vec<Vec<usize>>,
    group_labels: Vec<&'m str>,
    var_group: Vec<Option<usize>>,
    limits: Vec<u32>,
    members: Vec<Vec<usize>>,
    var_at_most: Vec<Vec<usize>>,
    var_loads: Vec<Vec<(usize, i64)>>,
    is_bonus: Vec<bool>,
    tie_weight: i64,
    max_bonus: i64,
    fixed_total: Option<i64>,

    values: Vec<bool>,
    choice: Vec<Option<usize>>,
    counts: Vec<u32>,
    blocked: Vec<u32>,
    alive: Vec<usize>,
    loads: Vec<i64>,
    honored: i64,
    wiped: Option<usize>,
    conflicts: Vec<u64>,

    potential: Vec<i64>,
    group_best: Vec<i64>,
    touched: Vec<usize>,

    best: Option<Incumbent>,
    global_bound: i64,
    nodes: u64,
    out_of_budget: bool,
}

impl<'m> Search<'m> {
    fn new(model: &'m CpModel, config: &SolverConfig, started: Instant) -> Self {
        let n = model.var_count();
        let mut groups = Vec::new();
        let mut group_labels = Vec::new();
        let mut var_group = vec![None; n];
        let mut limits = Vec::new();
        let mut members = Vec::new();
        let mut var_at_most = vec![Vec::new(); n];

        for constraint in model.constraints() {
            match constraint {
                CpConstraint::ExactlyOne { label, vars } => {
                    let g = groups.len();
                    for v in vars {
                        var_group[v.index()] = Some(g);
                    }
                    groups.push(vars.iter().map(|v| v.index()).collect::<Vec<_>>());
                    group_labels.push(label.as_str());
                }
                CpConstraint::AtMost { vars, limit, .. } => {
                    let c = limits.len();
                    for v in vars {
                        var_at_most[v.index()].push(c);
                    }
                    members.push(vars.iter().map(|v| v.index()).collect::<Vec<_>>());
                    limits.push(*limit);
                }
            }
        }

        let objective = model.objective();
        let mut var_loads = vec![Vec::new(); n];
        let mut bases = Vec::with_capacity(objective.loads.len());
        for (l, load) in objective.loads.iter().enumerate() {
            bases.push(load.base);
            for &(v, w) in &load.terms {
                var_loads[v.index()].push((l, w));
            }
        }
        let mut is_bonus = vec![false; n];
        for v in &objective.bonus {
            is_bonus[v.index()] = true;
        }

        let fixed_total = fixed_total(&groups, &var_loads, &bases);
        let alive = groups.iter().map(Vec::len).collect();
        let group_count = groups.len();
        let load_count = bases.len();
        let max_bonus = model.max_bonus();

        Self {
            time_limit: config.time_limit,
            node_limit: config.node_limit,
            started,
            groups,
            group_labels,
            var_group,
            counts: vec![0; limits.len()],
            limits,
            members,
            var_at_most,
            var_loads,
            is_bonus,
            tie_weight: max_bonus + 1,
            max_bonus,
            fixed_total,
            values: vec![false; n],
            choice: vec![None; group_count],
            blocked: vec![0; n],
            alive,
            loads: bases,
            honored: 0,
            wiped: None,
            conflicts: vec![0; group_count],
            potential: vec![0; load_count],
            group_best: vec![-1; load_count],
            touched: Vec::new(),
            best: None,
            global_bound: i64::MIN,
            nodes: 0,
            out_of_budget: false,
        }
    }

    fn run(&mut self) -> SolveStatus {
        for c in 0..self.limits.len() {
            if self.limits[c] == 0 {
                for i in 0..self.members[c].len() {
                    let u = self.members[c][i];
                    self.block(u);
                }
            }
        }
        self.wiped = None;

        let (spread_lb, bonus_ub) = self.bounds();
        let parity = match self.fixed_total {
            Some(total) if !self.loads.is_empty() => {
                i64::from(total.rem_euclid(self.loads.len() as i64) != 0)
            }
            _ => 0,
        };
        self.global_bound =
            spread_lb.max(parity) * self.tie_weight - bonus_ub.min(self.max_bonus);

        self.search();

        match (self.best.is_some(), self.out_of_budget) {
            (true, false) => SolveStatus::Optimal,
            (true, true) => SolveStatus::Feasible,
            (false, false) => SolveStatus::Infeasible,
            (false, true) => SolveStatus::TimedOutNoSolution,
        }
    }

    fn search(&mut self) -> Flow {
        self.nodes += 1;
        if self.budget_exhausted() {
            self.out_of_budget = true;
            return Flow::Stop;
        }

        if let Some(best_score) = self.best.as_ref().map(|b| b.score) {
            let (spread_lb, bonus_ub) = self.bounds();
            if spread_lb * self.tie_weight - bonus_ub >= best_score {
                return Flow::Continue;
            }
        }

        let Some(g) = self.select_group() else {
            return self.record_solution();
        };
        if self.alive[g] == 0 {
            self.conflicts[g] += 1;
            return Flow::Continue;
        }

        for v in self.ordered_candidates(g) {
            let flow = match self.assign(g, v) {
                Some(wiped) => {
                    self.conflicts[wiped] += 1;
                    Flow::Continue
                }
                None => self.search(),
            };
            self.unassign(g, v);
            if flow == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn budget_exhausted(&self) -> bool {
        if let Some(limit) = self.node_limit {
            if self.nodes > limit {
                return true;
            }
        }
        if let Some(limit) = self.time_limit {
            if self.nodes & 0xff == 0 && self.started.elapsed() >= limit {
                return true;
            }
        }
        false
    }

    fn select_group(&self) -> Option<usize> {
        (0..self.groups.len())
            .filter(|&g| self.choice[g].is_none())
            .min_by_key(|&g| (self.alive[g], g))
    }

    fn ordered_candidates(&self, g: usize) -> Vec<usize> {
        let mut keyed: Vec<(i64, bool, usize)> = self.groups[g]
            .iter()
            .filter(|&&v| self.blocked[v] == 0)
            .map(|&v| {
                let projected = self.var_loads[v]
                    .iter()
                    .map(|&(l, w)| self.loads[l] + w)
                    .max()
                    .unwrap_or(0);
                (projected, !self.is_bonus[v], v)
            })
            .collect();
        keyed.sort_unstable();
        keyed.into_iter().map(|(_, _, v)| v).collect()
    }

    fn record_solution(&mut self) -> Flow {
        let spread = match (self.loads.iter().max(), self.loads.iter().min()) {
            (Some(max), Some(min)) => max - min,
            _ => 0,
        };
        let score = spread * self.tie_weight - self.honored;
        if self.best.as_ref().map_or(true, |b| score < b.score) {
            trace!(score, nodes = self.nodes, "new incumbent");
            self.best = Some(Incumbent {
                score,
                values: self.values.clone(),
            });
        }
        if score <= self.global_bound {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }

    /// Lower bound on the spread and upper bound on honored bonuses
    /// reachable from the current node.
    fn bounds(&mut self) -> (i64, i64) {
        self.potential.iter_mut().for_each(|p| *p = 0);
        let mut open_bonus = 0;

        for g in 0..self.groups.len() {
            if self.choice[g].is_some() {
                continue;
            }
            let mut has_bonus = false;
            for &v in &self.groups[g] {
                if self.blocked[v] > 0 {
                    continue;
                }
                has_bonus |= self.is_bonus[v];
                for &(l, w) in &self.var_loads[v] {
                    if self.group_best[l] < 0 {
                        self.touched.push(l);
                    }
                    if w > self.group_best[l] {
                        self.group_best[l] = w;
                    }
                }
            }
            if has_bonus {
                open_bonus += 1;
            }
            for &l in &self.touched {
                self.potential[l] += self.group_best[l];
                self.group_best[l] = -1;
            }
            self.touched.clear();
        }

        let max_now = self.loads.iter().copied().max();
        let min_reachable = self
            .loads
            .iter()
            .zip(&self.potential)
            .map(|(load, pot)| load + pot)
            .min();
        let spread_lb = match (max_now, min_reachable) {
            (Some(max), Some(min)) => (max - min).max(0),
            _ => 0,
        };
        (spread_lb, self.honored + open_bonus)
    }

    /// Sets `v` true as the choice of group `g`. Returns an open group
    /// left without live candidates, if any.
    fn assign(&mut self, g: usize, v: usize) -> Option<usize> {
        self.wiped = None;
        self.choice[g] = Some(v);
        self.values[v] = true;
        for &(l, w) in &self.var_loads[v] {
            self.loads[l] += w;
        }
        if self.is_bonus[v] {
            self.honored += 1;
        }
        for i in 0..self.var_at_most[v].len() {
            let c = self.var_at_most[v][i];
            self.counts[c] += 1;
            if self.counts[c] == self.limits[c] {
                for j in 0..self.members[c].len() {
                    let u = self.members[c][j];
                    self.block(u);
                }
            }
        }
        self.wiped
    }

    fn unassign(&mut self, g: usize, v: usize) {
        for i in (0..self.var_at_most[v].len()).rev() {
            let c = self.var_at_most[v][i];
            if self.counts[c] == self.limits[c] {
                for j in 0..self.members[c].len() {
                    let u = self.members[c][j];
                    self.unblock(u);
                }
            }
            self.counts[c] -= 1;
        }
        if self.is_bonus[v] {
            self.honored -= 1;
        }
        for &(l, w) in &self.var_loads[v] {
            self.loads[l] -= w;
        }
        self.values[v] = false;
        self.choice[g] = None;
    }

    fn block(&mut self, u: usize) {
        self.blocked[u] += 1;
        if self.blocked[u] == 1 {
            if let Some(h) = self.var_group[u] {
                self.alive[h] -= 1;
                if self.alive[h] == 0 && self.choice[h].is_none() && self.wiped.is_none() {
                    self.wiped = Some(h);
                }
            }
        }
    }

    fn unblock(&mut self, u: usize) {
        self.blocked[u] -= 1;
        if self.blocked[u] == 0 {
            if let Some(h) = self.var_group[u] {
                self.alive[h] += 1;
            }
        }
    }

    fn conflict_label(&self) -> Option<String> {
        (0..self.groups.len())
            .filter(|&g| self.conflicts[g] > 0)
            .max_by_key(|&g| (self.conflicts[g], std::cmp::Reverse(g)))
            .map(|g| self.group_labels[g].to_string())
    }
}

/// Total load when every variable of a group adds the same weight to
/// exactly one load; `None` otherwise.
fn fixed_total(groups: &[Vec<usize>], var_loads: &[Vec<(usize, i64)>], bases: &[i64]) -> Option<i64> {
    let mut total: i64 = bases.iter().sum();
    for group in groups {
        let mut weight = None;
        for &v in group {
            let [(_, w)] = var_loads[v].as_slice() else {
                return None;
            };
            match weight {
                None => weight = Some(*w),
                Some(existing) if existing != *w => return None,
                Some(_) => {}
            }
        }
        total += weight.unwrap_or(0);
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::model::VarId;

    /// Two loads A/B, group g0 weight 1, group g1 weight 3.
    fn small_model() -> CpModel {
        let mut m = CpModel::new("small");
        let a0 = m.new_bool_var("a0");
        let b0 = m.new_bool_var("b0");
        let a1 = m.new_bool_var("a1");
        let b1 = m.new_bool_var("b1");
        m.add_exactly_one("g0", vec![a0, b0]).unwrap();
        m.add_exactly_one("g1", vec![a1, b1]).unwrap();
        m.add_load("A", 0, vec![(a0, 1), (a1, 3)]).unwrap();
        m.add_load("B", 0, vec![(b0, 1), (b1, 3)]).unwrap();
        m
    }

    fn brute_force_best(model: &CpModel) -> Option<i64> {
        let n = model.var_count();
        let mut best = None;
        for mask in 0u64..(1u64 << n) {
            let values: Vec<bool> = (0..n).map(|i| mask & (1 << i) != 0).collect();
            if model.is_feasible(&values) {
                let score = model.score(model.evaluate(&values));
                best = Some(best.map_or(score, |b: i64| b.min(score)));
            }
        }
        best
    }

    #[test]
    fn test_solve_optimal() {
        let model = small_model();
        let solution = BranchAndBoundSolver::new().solve(&model, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(solution.is_solution_found());
        assert!(model.is_feasible(&solution.values));
        assert_eq!(solution.objective.unwrap().spread, 2);
        assert_eq!(Some(model.score(solution.objective.unwrap())), brute_force_best(&model));
    }

    #[test]
    fn test_base_loads_shift_the_optimum() {
        let mut m = CpModel::new("based");
        let a0 = m.new_bool_var("a0");
        let b0 = m.new_bool_var("b0");
        m.add_exactly_one("g0", vec![a0, b0]).unwrap();
        m.add_load("A", 5, vec![(a0, 2)]).unwrap();
        m.add_load("B", 0, vec![(b0, 2)]).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values, vec![false, true]);
        assert_eq!(solution.objective.unwrap().spread, 3);
    }

    #[test]
    fn test_at_most_respected() {
        let mut m = CpModel::new("cap");
        let vars: Vec<VarId> = (0..6).map(|i| m.new_bool_var(format!("x{i}"))).collect();
        // Three groups, each {A_i, B_i}; A may take at most one.
        for g in 0..3 {
            m.add_exactly_one(format!("g{g}"), vec![vars[2 * g], vars[2 * g + 1]])
                .unwrap();
        }
        m.add_at_most("cap A", vec![vars[0], vars[2], vars[4]], 1).unwrap();
        m.add_load("A", 0, vec![(vars[0], 1), (vars[2], 1), (vars[4], 1)]).unwrap();
        m.add_load("B", 10, vec![(vars[1], 1), (vars[3], 1), (vars[5], 1)]).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(m.is_feasible(&solution.values));
        let a_count = [0, 2, 4].iter().filter(|&&i| solution.values[i]).count();
        assert_eq!(a_count, 1);
        assert_eq!(Some(m.score(solution.objective.unwrap())), brute_force_best(&m));
    }

    #[test]
    fn test_bonus_breaks_ties() {
        let mut m = CpModel::new("bonus");
        let a0 = m.new_bool_var("a0");
        let b0 = m.new_bool_var("b0");
        m.add_exactly_one("g0", vec![a0, b0]).unwrap();
        m.add_load("A", 0, vec![(a0, 1)]).unwrap();
        m.add_load("B", 0, vec![(b0, 1)]).unwrap();
        m.add_bonus(b0).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values, vec![false, true]);
        assert_eq!(solution.objective.unwrap().bonus, 1);
    }

    #[test]
    fn test_bonus_never_overrides_spread() {
        let mut m = CpModel::new("bonus-vs-spread");
        let a0 = m.new_bool_var("a0");
        let b0 = m.new_bool_var("b0");
        m.add_exactly_one("g0", vec![a0, b0]).unwrap();
        // B already ahead: giving B the shift widens the spread.
        m.add_load("A", 0, vec![(a0, 1)]).unwrap();
        m.add_load("B", 1, vec![(b0, 1)]).unwrap();
        m.add_bonus(b0).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.values, vec![true, false]);
        assert_eq!(solution.objective.unwrap().spread, 0);
    }

    #[test]
    fn test_infeasible_reports_conflict() {
        let mut m = CpModel::new("infeasible");
        let a0 = m.new_bool_var("a0");
        let a1 = m.new_bool_var("a1");
        m.add_exactly_one("day 1", vec![a0]).unwrap();
        m.add_exactly_one("day 2", vec![a1]).unwrap();
        m.add_at_most("rest", vec![a0, a1], 1).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Infeasible);
        assert!(!solution.is_solution_found());
        assert!(solution.values.is_empty());
        assert!(solution.conflict.is_some());
    }

    #[test]
    fn test_zero_limit_blocks_variables() {
        let mut m = CpModel::new("zero");
        let a0 = m.new_bool_var("a0");
        let b0 = m.new_bool_var("b0");
        m.add_exactly_one("g0", vec![a0, b0]).unwrap();
        m.add_at_most("no A", vec![a0], 0).unwrap();
        m.add_load("A", 0, vec![(a0, 1)]).unwrap();
        m.add_load("B", 5, vec![(b0, 1)]).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.values, vec![false, true]);
    }

    #[test]
    fn test_node_budget_without_solution() {
        let model = small_model();
        let config = SolverConfig::unbounded().with_node_limit(1);
        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolveStatus::TimedOutNoSolution);
        assert!(solution.objective.is_none());
    }

    #[test]
    fn test_node_budget_with_incumbent() {
        // Nodes: root, g0 chosen, g1 chosen (first solution), then the
        // fourth node exceeds the budget before the proof completes.
        let model = small_model();
        let config = SolverConfig::unbounded().with_node_limit(3);
        let solution = BranchAndBoundSolver::new().solve(&model, &config);
        assert_eq!(solution.status, SolveStatus::Feasible);
        assert!(model.is_feasible(&solution.values));
    }

    #[test]
    fn test_parity_bound_stops_early() {
        // Four unit groups over two loads: total 4 is even, so spread 0 is
        // provable without exhausting the tree.
        let mut m = CpModel::new("parity");
        let mut a_terms = Vec::new();
        let mut b_terms = Vec::new();
        for g in 0..4 {
            let a = m.new_bool_var(format!("a{g}"));
            let b = m.new_bool_var(format!("b{g}"));
            m.add_exactly_one(format!("g{g}"), vec![a, b]).unwrap();
            a_terms.push((a, 1));
            b_terms.push((b, 1));
        }
        m.add_load("A", 0, a_terms).unwrap();
        m.add_load("B", 0, b_terms).unwrap();

        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::unbounded());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert_eq!(solution.objective.unwrap().spread, 0);
        assert!(solution.nodes <= 5);
    }

    #[test]
    fn test_empty_model() {
        let m = CpModel::new("empty");
        let solution = BranchAndBoundSolver::new().solve(&m, &SolverConfig::default());
        assert_eq!(solution.status, SolveStatus::Optimal);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let model = small_model();
        let a = BranchAndBoundSolver::new().solve(&model, &SolverConfig::unbounded());
        let b = BranchAndBoundSolver::new().solve(&model, &SolverConfig::unbounded());
        assert_eq!(a.values, b.values);
        assert_eq!(a.nodes, b.nodes);
    }
}
