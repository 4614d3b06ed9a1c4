//! Assignment lifecycle states and the legal transitions between them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of an assignment.
///
/// The machine starts at `Pending`; `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Created but field work has not started.
    Pending,
    /// Field work in progress; the resource is booked.
    Active,
    /// Work closed out by an operator.
    Completed,
    /// Abandoned before or during field work.
    Cancelled,
}

impl AssignmentStatus {
    /// Whether no further transitions are allowed from this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether the state counts towards a resource's booked capacity.
    #[must_use]
    pub const fn is_booking(self) -> bool {
        matches!(self, Self::Pending | Self::Active)
    }

    /// Whether moving to `next` is a legal transition.
    ///
    /// Legal moves: pending to active or cancelled, active to completed or
    /// cancelled. Completion ahead of or behind the interview target is
    /// allowed; targets are advisory.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Active | Self::Cancelled)
                | (Self::Active, Self::Completed | Self::Cancelled)
        )
    }

    /// Stable lowercase name used on the wire and in storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Error for unrecognised status names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown assignment status: {value}")]
pub struct UnknownStatusError {
    /// The rejected raw value.
    pub value: String,
}
