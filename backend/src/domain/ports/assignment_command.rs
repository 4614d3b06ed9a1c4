//! Driving port for assignment mutations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ActorContext, Assignment, AssignmentFieldUpdate, AssignmentStatus, Error};

/// Serializable assignment payload for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    /// Assignment identifier.
    pub id: Uuid,
    /// Project the resource is committed to.
    pub project_id: Uuid,
    /// Committed field resource.
    pub resource_id: Uuid,
    /// Current lifecycle state.
    pub status: AssignmentStatus,
    /// First day of the commitment.
    pub start_date: NaiveDate,
    /// Last day of the commitment.
    pub end_date: NaiveDate,
    /// Districts covered by the assignment.
    pub assigned_districts: Vec<String>,
    /// Villages covered by the assignment.
    pub assigned_villages: Vec<String>,
    /// Advisory interview target.
    pub target_interviews: i32,
    /// Planned working days.
    pub total_days: i32,
    /// Optional daily pay rate.
    pub daily_rate: Option<Decimal>,
    /// Operator instructions.
    pub instructions: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Assignment> for AssignmentPayload {
    fn from(value: Assignment) -> Self {
        Self {
            id: value.id(),
            project_id: value.project_id(),
            resource_id: value.resource_id(),
            status: value.status(),
            start_date: value.start_date(),
            end_date: value.end_date(),
            assigned_districts: value.assigned_districts().to_vec(),
            assigned_villages: value.assigned_villages().to_vec(),
            target_interviews: value.target_interviews(),
            total_days: value.total_days(),
            daily_rate: value.daily_rate(),
            instructions: value.instructions().map(str::to_owned),
            notes: value.notes().map(str::to_owned),
            created_at: value.created_at(),
            updated_at: value.updated_at(),
        }
    }
}

/// Request to create an assignment in `pending` state.
#[derive(Debug, Clone)]
pub struct CreateAssignmentRequest {
    /// Authenticated actor performing the create.
    pub actor: ActorContext,
    /// Project the resource is committed to.
    pub project_id: Uuid,
    /// Field resource being committed.
    pub resource_id: Uuid,
    /// First day of the commitment.
    pub start_date: NaiveDate,
    /// Last day of the commitment.
    pub end_date: NaiveDate,
    /// Districts covered by the assignment.
    pub assigned_districts: Vec<String>,
    /// Villages covered by the assignment.
    pub assigned_villages: Vec<String>,
    /// Advisory interview target; strictly positive.
    pub target_interviews: i32,
    /// Planned working days; strictly positive.
    pub total_days: i32,
    /// Optional non-negative daily pay rate.
    pub daily_rate: Option<Decimal>,
    /// Operator instructions.
    pub instructions: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// Request to partially update an assignment.
#[derive(Debug, Clone)]
pub struct UpdateAssignmentRequest {
    /// Authenticated actor performing the update.
    pub actor: ActorContext,
    /// Assignment to update.
    pub assignment_id: Uuid,
    /// Fields to change.
    pub update: AssignmentFieldUpdate,
}

/// Request to delete an assignment without dependents.
#[derive(Debug, Clone)]
pub struct DeleteAssignmentRequest {
    /// Authenticated actor performing the delete.
    pub actor: ActorContext,
    /// Assignment to delete.
    pub assignment_id: Uuid,
}

/// Request to move an assignment along the state machine.
#[derive(Debug, Clone)]
pub struct TransitionAssignmentRequest {
    /// Authenticated actor performing the transition.
    pub actor: ActorContext,
    /// Assignment to transition.
    pub assignment_id: Uuid,
    /// Requested next state.
    pub next_status: AssignmentStatus,
}

/// Response carrying one assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentResponse {
    /// The affected assignment.
    pub assignment: AssignmentPayload,
}

/// Driving port for assignment mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentCommand: Send + Sync {
    /// Create a pending assignment, enforcing the no-overlap rule.
    async fn create(&self, request: CreateAssignmentRequest) -> Result<AssignmentResponse, Error>;

    /// Partially update an assignment, honouring the pending-only rule.
    async fn update(&self, request: UpdateAssignmentRequest) -> Result<AssignmentResponse, Error>;

    /// Delete an assignment with no attendance or expense records.
    async fn delete(&self, request: DeleteAssignmentRequest) -> Result<(), Error>;

    /// Transition the assignment along the state machine, flipping
    /// resource availability on moves into or out of `active`.
    async fn transition(
        &self,
        request: TransitionAssignmentRequest,
    ) -> Result<AssignmentResponse, Error>;
}

/// Fixture command implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAssignmentCommand;

#[async_trait]
impl AssignmentCommand for FixtureAssignmentCommand {
    async fn create(&self, _request: CreateAssignmentRequest) -> Result<AssignmentResponse, Error> {
        Err(Error::service_unavailable("assignment store not configured"))
    }

    async fn update(&self, _request: UpdateAssignmentRequest) -> Result<AssignmentResponse, Error> {
        Err(Error::service_unavailable("assignment store not configured"))
    }

    async fn delete(&self, _request: DeleteAssignmentRequest) -> Result<(), Error> {
        Err(Error::service_unavailable("assignment store not configured"))
    }

    async fn transition(
        &self,
        _request: TransitionAssignmentRequest,
    ) -> Result<AssignmentResponse, Error> {
        Err(Error::service_unavailable("assignment store not configured"))
    }
}
