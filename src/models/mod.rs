//! Roster domain models.
//!
//! Immutable value types describing one optimization run: who can be
//! assigned (`Employee`, `Team`), what must be covered (`Shift`,
//! `RosterPeriod`, `Holiday`), and the projected result (`Schedule`).
//!
//! # Domain Mappings
//!
//! | u-roster | Hospital | Emergency services | Operations |
//! |----------|----------|--------------------|------------|
//! | Employee | Nurse/Doctor | Officer | Engineer |
//! | Team | Ward | Watch | Squad |
//! | Shift | On-call slot | Duty watch | Pager rotation |
//! | Schedule | Duty roster | Watch bill | On-call calendar |

mod employee;
mod holiday;
mod period;
mod schedule;
mod shift;
mod team;

pub use employee::{Employee, Role};
pub use holiday::Holiday;
pub use period::RosterPeriod;
pub use schedule::{EmployeeSummary, Schedule, ShiftAssignment, Violation, ViolationType};
pub use shift::{DayType, Shift, ShiftCategory};
pub use team::{Team, TeamCategory};
