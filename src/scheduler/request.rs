//! Input container for one roster optimization run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::RosterConfig;
use crate::models::{Employee, Holiday, RosterPeriod, ShiftCategory, Team};

/// Everything a solve needs: personnel, teams, holidays, the period, and
/// the configuration.
///
/// The request is a snapshot. Solving never mutates it, so one request can
/// be solved from several threads at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRequest {
    /// Personnel to roster.
    pub employees: Vec<Employee>,
    /// Teams referenced by `Employee::team`.
    pub teams: Vec<Team>,
    /// Holiday calendar (dates outside the period are ignored).
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    /// First roster date (inclusive).
    pub start: NaiveDate,
    /// Last roster date (inclusive).
    pub end: NaiveDate,
    /// Points, caps, layout, immunity window, and budget.
    #[serde(default)]
    pub config: RosterConfig,
}

impl RosterRequest {
    /// Creates an empty request for `[start, end]`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            employees: Vec::new(),
            teams: Vec::new(),
            holidays: Vec::new(),
            start,
            end,
            config: RosterConfig::default(),
        }
    }

    /// Adds an employee.
    pub fn with_employee(mut self, employee: Employee) -> Self {
        self.employees.push(employee);
        self
    }

    /// Adds several employees.
    pub fn with_employees(mut self, employees: impl IntoIterator<Item = Employee>) -> Self {
        self.employees.extend(employees);
        self
    }

    /// Adds a team.
    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    /// Adds several teams.
    pub fn with_teams(mut self, teams: impl IntoIterator<Item = Team>) -> Self {
        self.teams.extend(teams);
        self
    }

    /// Adds a holiday.
    pub fn with_holiday(mut self, holiday: Holiday) -> Self {
        self.holidays.push(holiday);
        self
    }

    /// Adds several holidays.
    pub fn with_holidays(mut self, holidays: impl IntoIterator<Item = Holiday>) -> Self {
        self.holidays.extend(holidays);
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: RosterConfig) -> Self {
        self.config = config;
        self
    }

    /// Looks up a team by name.
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    /// Looks up an employee by id.
    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    /// Whether shifts of `category` must rotate between teams.
    ///
    /// True when more than one staffed team serves the category. Blackouts
    /// and immunity do not count: a category with two teams still rotates
    /// on days when only one of them is available.
    pub fn rotates(&self, category: ShiftCategory) -> bool {
        let teams: BTreeSet<&str> = self
            .employees
            .iter()
            .filter(|e| {
                self.team(&e.team)
                    .is_some_and(|t| category.accepts(t.category))
            })
            .map(|e| e.team.as_str())
            .collect();
        teams.len() > 1
    }

    /// Resolves the shifts of the period.
    pub fn period(&self) -> RosterPeriod {
        RosterPeriod::resolve(self.start, self.end, &self.holidays, &self.config.layout)
    }
}
