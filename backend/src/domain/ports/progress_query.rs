//! Driving port for assignment progress aggregation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AssignmentStatus, Error};

/// Request for an assignment's progress figures.
#[derive(Debug, Clone, Copy)]
pub struct ProgressRequest {
    /// Assignment being measured.
    pub assignment_id: Uuid,
}

/// Progress figures derived from the attendance ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    /// Assignment the figures belong to.
    pub assignment_id: Uuid,
    /// Current lifecycle state.
    pub status: AssignmentStatus,
    /// Advisory interview target.
    pub target_interviews: i32,
    /// Interviews summed over the attendance ledger.
    pub completed_interviews: i64,
    /// Whole-number completion percentage; may exceed 100.
    pub completion_percentage: i64,
    /// Working days recorded in the ledger.
    pub days_worked: i64,
    /// Planned working days.
    pub total_days: i32,
}

/// Driving port for progress reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressQuery: Send + Sync {
    /// Derive an assignment's progress from the attendance ledger.
    async fn progress(&self, request: ProgressRequest) -> Result<ProgressResponse, Error>;
}

/// Fixture query implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProgressQuery;

#[async_trait]
impl ProgressQuery for FixtureProgressQuery {
    async fn progress(&self, request: ProgressRequest) -> Result<ProgressResponse, Error> {
        Err(Error::not_found(format!(
            "assignment {} not found",
            request.assignment_id
        )))
    }
}
