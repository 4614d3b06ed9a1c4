//! Expense type enumeration.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Category of a cost claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    /// Transport to and between field sites.
    Travel,
    /// Meals while on assignment.
    Food,
    /// Airtime and data bundles.
    Communication,
    /// Overnight stays.
    Accommodation,
    /// Survey materials and consumables.
    Materials,
    /// Anything that fits no other category.
    Other,
}

impl ExpenseType {
    /// Stable lowercase name used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Travel => "travel",
            Self::Food => "food",
            Self::Communication => "communication",
            Self::Accommodation => "accommodation",
            Self::Materials => "materials",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExpenseType {
    type Err = UnknownExpenseTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "travel" => Ok(Self::Travel),
            "food" => Ok(Self::Food),
            "communication" => Ok(Self::Communication),
            "accommodation" => Ok(Self::Accommodation),
            "materials" => Ok(Self::Materials),
            "other" => Ok(Self::Other),
            value => Err(UnknownExpenseTypeError {
                value: value.to_owned(),
            }),
        }
    }
}

/// Error for unrecognised expense type names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown expense type: {value}")]
pub struct UnknownExpenseTypeError {
    /// The rejected raw value.
    pub value: String,
}
