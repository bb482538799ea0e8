//! Seeded sample-data generator.
//!
//! Produces a random but reproducible employee database and holiday
//! calendar for demos, benchmarks, and tests. The same seed always yields
//! the same request.
//!
//! # Defaults
//!
//! | Setting | Value |
//! |---------|-------|
//! | Teams | Type O: Black 30, White 6, Grey 7, Red 9; Type C: Blue 8, Yellow 7, Orange 20, Green 9, Purple 8, Violet 7 |
//! | Roles | 70% Standard, 30% Weekend-Only |
//! | YTD points | uniform integer in 0..=20 |
//! | Blackouts | 0..=5 dates in 2026 |
//! | PH bids | 35% of employees bid on 1..=3 holidays |
//! | Last PH worked | 60% of employees, uniform in 2023..=2025 |

use chrono::{Days, NaiveDate};
use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::models::{Employee, Holiday, Role, Team, TeamCategory};
use crate::scheduler::RosterRequest;

const FIRST_NAMES: [&str; 40] = [
    "Alex", "Alicia", "Ben", "Bianca", "Caleb", "Chloe", "Darren", "Diana", "Ethan", "Eva",
    "Felix", "Fiona", "Gavin", "Grace", "Hassan", "Hannah", "Ivan", "Ivy", "Jason", "Jasmine",
    "Kevin", "Kylie", "Liam", "Luna", "Marcus", "Mia", "Noah", "Nina", "Oscar", "Olivia",
    "Peter", "Priya", "Quinn", "Rachel", "Sam", "Sofia", "Tristan", "Tara", "Wes", "Zoe",
];

const LAST_NAMES: [&str; 20] = [
    "Tan", "Lim", "Ng", "Lee", "Wong", "Goh", "Teo", "Ong", "Chua", "Koh", "Chan", "Low", "Yeo",
    "Toh", "Seah", "Lau", "Ho", "Nair", "Singh", "Kaur",
];

/// Name, category, and head count of a generated team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    pub name: String,
    pub category: TeamCategory,
    pub size: usize,
}

impl TeamSpec {
    pub fn new(name: impl Into<String>, category: TeamCategory, size: usize) -> Self {
        Self {
            name: name.into(),
            category,
            size,
        }
    }
}

/// Random employee database generator.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_roster::generator::SampleGenerator;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// let end = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
/// let request = SampleGenerator::new().with_seed(7).generate(start, end);
/// assert_eq!(request.employees.len(), 111);
/// assert_eq!(request.teams.len(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    seed: u64,
    teams: Vec<TeamSpec>,
    ytd_min: u32,
    ytd_max: u32,
    blackout_window: (NaiveDate, NaiveDate),
    max_blackout_dates: usize,
    bid_probability: f64,
    weekend_only_share: f64,
    last_ph_probability: f64,
    last_ph_window: (NaiveDate, NaiveDate),
    holidays: Vec<Holiday>,
}

impl Default for SampleGenerator {
    fn default() -> Self {
        let teams = [
            ("Black", TeamCategory::TypeO, 30),
            ("White", TeamCategory::TypeO, 6),
            ("Grey", TeamCategory::TypeO, 7),
            ("Red", TeamCategory::TypeO, 9),
            ("Blue", TeamCategory::TypeC, 8),
            ("Yellow", TeamCategory::TypeC, 7),
            ("Orange", TeamCategory::TypeC, 20),
            ("Green", TeamCategory::TypeC, 9),
            ("Purple", TeamCategory::TypeC, 8),
            ("Violet", TeamCategory::TypeC, 7),
        ]
        .into_iter()
        .map(|(name, category, size)| TeamSpec::new(name, category, size))
        .collect();

        let holidays = [
            ((1, 1), "New Year's Day"),
            ((2, 17), "Lunar New Year"),
            ((4, 3), "Good Friday"),
            ((5, 1), "Labour Day"),
            ((8, 9), "National Day"),
            ((12, 25), "Christmas Day"),
        ]
        .into_iter()
        .filter_map(|((m, d), name)| {
            NaiveDate::from_ymd_opt(2026, m, d).map(|date| Holiday::new(date, name))
        })
        .collect();

        Self {
            seed: 42,
            teams,
            ytd_min: 0,
            ytd_max: 20,
            blackout_window: (ymd(2026, 1, 1), ymd(2026, 12, 31)),
            max_blackout_dates: 5,
            bid_probability: 0.35,
            weekend_only_share: 0.30,
            last_ph_probability: 0.6,
            last_ph_window: (ymd(2023, 1, 1), ymd(2025, 12, 31)),
            holidays,
        }
    }
}

impl SampleGenerator {
    /// Creates a generator with the default database shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the team list.
    pub fn with_teams(mut self, teams: Vec<TeamSpec>) -> Self {
        self.teams = teams;
        self
    }

    /// Sets the YTD point range (inclusive).
    pub fn with_ytd_range(mut self, min: u32, max: u32) -> Self {
        self.ytd_min = min.min(max);
        self.ytd_max = max.max(min);
        self
    }

    /// Sets the window blackout dates are drawn from, and their maximum count.
    pub fn with_blackouts(mut self, start: NaiveDate, end: NaiveDate, max_dates: usize) -> Self {
        self.blackout_window = (start, end);
        self.max_blackout_dates = max_dates;
        self
    }

    /// Sets the probability that an employee bids on public holidays.
    pub fn with_bid_probability(mut self, p: f64) -> Self {
        self.bid_probability = p;
        self
    }

    /// Replaces the holiday calendar.
    pub fn with_holidays(mut self, holidays: Vec<Holiday>) -> Self {
        self.holidays = holidays;
        self
    }

    /// Holiday calendar used for bids and requests.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// Generates the teams and their members.
    pub fn generate_employees(&self) -> (Vec<Team>, Vec<Employee>) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut used = HashSet::new();
        let mut teams = Vec::with_capacity(self.teams.len());
        let mut employees = Vec::new();

        for spec in &self.teams {
            teams.push(Team::new(spec.name.clone(), spec.category));
            for _ in 0..spec.size {
                let name = unique_name(&mut rng, &mut used);
                employees.push(self.random_employee(&mut rng, name, &spec.name));
            }
        }

        debug!(
            seed = self.seed,
            teams = teams.len(),
            employees = employees.len(),
            "sample database generated"
        );
        (teams, employees)
    }

    /// Generates a complete request for `[start, end]` with default configuration.
    pub fn generate(&self, start: NaiveDate, end: NaiveDate) -> RosterRequest {
        let (teams, employees) = self.generate_employees();
        RosterRequest::new(start, end)
            .with_teams(teams)
            .with_employees(employees)
            .with_holidays(self.holidays.iter().cloned())
    }

    fn random_employee(&self, rng: &mut StdRng, name: String, team: &str) -> Employee {
        let role = if rng.random_bool(probability(self.weekend_only_share)) {
            Role::WeekendOnly
        } else {
            Role::Standard
        };
        let ytd = rng.random_range(self.ytd_min..=self.ytd_max);

        let count = rng.random_range(0..=self.max_blackout_dates);
        let (start, end) = self.blackout_window;
        let blackouts: BTreeSet<NaiveDate> = (0..count)
            .filter_map(|_| random_date(rng, start, end))
            .collect();

        let mut employee = Employee::new(name, team)
            .with_role(role)
            .with_ytd_points(f64::from(ytd))
            .with_blackouts(blackouts);

        if !self.holidays.is_empty() && rng.random_bool(probability(self.bid_probability)) {
            let k = rng.random_range(1..=self.holidays.len().min(3));
            for holiday in self.holidays.choose_multiple(rng, k) {
                employee = employee.with_ph_bid(holiday.date);
            }
        }

        if rng.random_bool(probability(self.last_ph_probability)) {
            let (start, end) = self.last_ph_window;
            if let Some(date) = random_date(rng, start, end) {
                employee = employee.with_last_ph_date(date);
            }
        }

        employee
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

fn random_date(rng: &mut StdRng, start: NaiveDate, end: NaiveDate) -> Option<NaiveDate> {
    let span = (end - start).num_days();
    if span < 0 {
        return None;
    }
    let offset = rng.random_range(0..=span as u64);
    start.checked_add_days(Days::new(offset))
}

fn unique_name(rng: &mut StdRng, used: &mut HashSet<String>) -> String {
    let pick = |rng: &mut StdRng| {
        let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Alex");
        let last = LAST_NAMES.choose(rng).copied().unwrap_or("Tan");
        format!("{first} {last}")
    };
    for _ in 0..2000 {
        let name = pick(rng);
        if used.insert(name.clone()) {
            return name;
        }
    }
    let base = pick(rng);
    let mut i = 2;
    while used.contains(&format!("{base} {i}")) {
        i += 1;
    }
    let name = format!("{base} {i}");
    used.insert(name.clone());
    name
}
