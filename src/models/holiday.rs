//! Public holiday model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A named public holiday.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Holiday {
    /// Holiday date.
    pub date: NaiveDate,
    /// Holiday name (e.g. "Labour Day").
    #[serde(default)]
    pub name: String,
}

impl Holiday {
    /// Creates a holiday.
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}
