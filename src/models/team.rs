//! Team model.
//!
//! Every employee belongs to exactly one team. A team's category decides
//! which team-specific shifts its members may cover; `Org` shifts are open
//! to all teams.

use serde::{Deserialize, Serialize};

use super::ShiftCategory;

/// Duty category of a team. Fixed for the roster period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TeamCategory {
    /// Covers `Type C` shifts.
    #[serde(rename = "Type C")]
    TypeC,
    /// Covers `Type O` shifts.
    #[serde(rename = "Type O")]
    TypeO,
}

impl TeamCategory {
    /// The team-specific shift category served by this team category.
    pub fn shift_category(self) -> ShiftCategory {
        match self {
            TeamCategory::TypeC => ShiftCategory::TypeC,
            TeamCategory::TypeO => ShiftCategory::TypeO,
        }
    }
}

/// A named team with a fixed duty category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique team name.
    pub name: String,
    /// Duty category.
    pub category: TeamCategory,
}

impl Team {
    /// Creates a team.
    pub fn new(name: impl Into<String>, category: TeamCategory) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    /// Creates a `Type C` team.
    pub fn type_c(name: impl Into<String>) -> Self {
        Self::new(name, TeamCategory::TypeC)
    }

    /// Creates a `Type O` team.
    pub fn type_o(name: impl Into<String>) -> Self {
        Self::new(name, TeamCategory::TypeO)
    }

    /// Whether members of this team may cover a shift of `category`.
    #[inline]
    pub fn serves(&self, category: ShiftCategory) -> bool {
        category.accepts(self.category)
    }
}
