//! Driving port for assignment reads.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{AssignmentStatus, Error};

use super::assignment_command::AssignmentPayload;

/// Request to fetch one assignment by identifier.
#[derive(Debug, Clone, Copy)]
pub struct GetAssignmentRequest {
    /// Assignment to fetch.
    pub assignment_id: Uuid,
}

/// Request to list assignments with optional filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListAssignmentsRequest {
    /// Restrict to one lifecycle state.
    pub status: Option<AssignmentStatus>,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one field resource.
    pub resource_id: Option<Uuid>,
    /// Page size; defaults to the service cap.
    pub limit: Option<i64>,
    /// Rows to skip before the page.
    pub offset: Option<i64>,
}

/// Response carrying a page of assignments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAssignmentsResponse {
    /// Assignments in the page, newest first.
    pub assignments: Vec<AssignmentPayload>,
}

/// Driving port for assignment reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentQuery: Send + Sync {
    /// Fetch one assignment, or `NotFound`.
    async fn get(&self, request: GetAssignmentRequest) -> Result<AssignmentPayload, Error>;

    /// List assignments matching the filters, newest first.
    async fn list(&self, request: ListAssignmentsRequest) -> Result<ListAssignmentsResponse, Error>;
}

/// Fixture query implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssignmentQuery;

#[async_trait]
impl AssignmentQuery for FixtureAssignmentQuery {
    async fn get(&self, request: GetAssignmentRequest) -> Result<AssignmentPayload, Error> {
        Err(Error::not_found(format!(
            "assignment {} not found",
            request.assignment_id
        )))
    }

    async fn list(
        &self,
        _request: ListAssignmentsRequest,
    ) -> Result<ListAssignmentsResponse, Error> {
        Ok(ListAssignmentsResponse {
            assignments: Vec::new(),
        })
    }
}
