//! Assignment domain service.
//!
//! Implements the assignment command and query driving ports: booking
//! creation with the no-overlap rule, partial updates with the
//! pending-only field freeze, dependent-guarded deletion and the
//! lifecycle state machine with availability flips around `active`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AccessPolicy, AssignmentCommand, AssignmentFilter, AssignmentPayload, AssignmentQuery,
    AssignmentRepository, AssignmentRepositoryError, AssignmentResponse, AvailabilityCoordinator,
    CreateAssignmentRequest, DeleteAssignmentRequest, GetAssignmentRequest,
    ListAssignmentsRequest, ListAssignmentsResponse, PolicyScope, TransitionAssignmentRequest,
    UpdateAssignmentRequest,
};
use crate::domain::{
    ActorContext, Assignment, AssignmentDraft, AssignmentStatus, Error,
};

/// Ceiling applied to caller-supplied page sizes.
pub(crate) const MAX_PAGE_SIZE: i64 = 200;
/// Page size used when the caller supplies none.
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 50;
/// Budget for one access policy round trip.
pub(crate) const POLICY_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Check the access policy within [`POLICY_TIMEOUT`].
///
/// The policy lives in an external collaborator subsystem; a slow or
/// unreachable policy must not hang mutating requests.
pub(crate) async fn authorize(
    policy: &dyn AccessPolicy,
    actor: &ActorContext,
    scope: PolicyScope,
) -> Result<(), Error> {
    let decision = tokio::time::timeout(POLICY_TIMEOUT, policy.is_permitted(actor, scope))
        .await
        .map_err(|_elapsed| Error::dependency_timeout("access policy check timed out"))?
        .map_err(|err| Error::service_unavailable(format!("access policy unavailable: {err}")))?;
    if decision {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "actor {} is not permitted for this scope",
            actor.actor_id
        )))
    }
}

fn map_repository_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        AssignmentRepositoryError::Query { message } => {
            Error::internal(format!("assignment repository error: {message}"))
        }
        AssignmentRepositoryError::StatusConflict {
            assignment_id,
            actual,
        } => Error::invalid_transition(format!(
            "assignment {assignment_id} changed concurrently, status is now {actual}"
        )),
    }
}

fn not_found(assignment_id: Uuid) -> Error {
    Error::not_found(format!("assignment {assignment_id} not found"))
}

/// Assignment service implementing the command and query driving ports.
#[derive(Clone)]
pub struct AssignmentService<R> {
    assignments: Arc<R>,
    availability: Arc<dyn AvailabilityCoordinator>,
    policy: Arc<dyn AccessPolicy>,
    clock: Arc<dyn Clock>,
}

impl<R> AssignmentService<R> {
    /// Create the service over its driven ports.
    pub fn new(
        assignments: Arc<R>,
        availability: Arc<dyn AvailabilityCoordinator>,
        policy: Arc<dyn AccessPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            assignments,
            availability,
            policy,
            clock,
        }
    }
}

impl<R> AssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn load(&self, assignment_id: Uuid) -> Result<Assignment, Error> {
        self.assignments
            .find_by_id(assignment_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(assignment_id))
    }

    /// Undo a committed status write after the availability flip failed.
    ///
    /// Best effort: if the revert itself fails the pair stays drifted
    /// until the availability reconcile pass repairs it.
    async fn revert_status(
        &self,
        assignment_id: Uuid,
        applied: AssignmentStatus,
        previous: AssignmentStatus,
    ) {
        match self
            .assignments
            .set_status(assignment_id, applied, previous, self.clock.utc())
            .await
        {
            Ok(Some(_)) => {
                tracing::warn!(
                    %assignment_id,
                    from = %applied,
                    to = %previous,
                    "availability flip failed, status reverted"
                );
            }
            Ok(None) => {
                tracing::error!(
                    %assignment_id,
                    "availability flip failed and the assignment vanished before revert"
                );
            }
            Err(error) => {
                tracing::error!(
                    %assignment_id,
                    %error,
                    "availability flip failed and the status revert failed, awaiting reconcile"
                );
            }
        }
    }

    /// Reject the booking when another pending or active assignment for
    /// the resource overlaps the period. `exclude` skips the assignment
    /// being updated.
    async fn ensure_no_overlap(
        &self,
        resource_id: Uuid,
        start_date: chrono::NaiveDate,
        end_date: chrono::NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<(), Error> {
        let conflicts = self
            .assignments
            .find_overlapping(resource_id, start_date, end_date)
            .await
            .map_err(map_repository_error)?;
        let conflict = conflicts
            .into_iter()
            .find(|existing| Some(existing.id()) != exclude);
        if let Some(existing) = conflict {
            return Err(Error::resource_unavailable(format!(
                "resource {resource_id} already has assignment {} from {} to {}",
                existing.id(),
                existing.start_date(),
                existing.end_date(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl<R> AssignmentCommand for AssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn create(&self, request: CreateAssignmentRequest) -> Result<AssignmentResponse, Error> {
        authorize(
            self.policy.as_ref(),
            &request.actor,
            PolicyScope::project(request.project_id),
        )
        .await?;

        let now = self.clock.utc();
        let assignment = Assignment::new(AssignmentDraft {
            id: Uuid::new_v4(),
            project_id: request.project_id,
            resource_id: request.resource_id,
            status: AssignmentStatus::Pending,
            start_date: request.start_date,
            end_date: request.end_date,
            assigned_districts: request.assigned_districts,
            assigned_villages: request.assigned_villages,
            target_interviews: request.target_interviews,
            total_days: request.total_days,
            daily_rate: request.daily_rate,
            instructions: request.instructions,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(format!("invalid assignment: {err}")))?;

        self.ensure_no_overlap(
            assignment.resource_id(),
            assignment.start_date(),
            assignment.end_date(),
            None,
        )
        .await?;

        self.assignments
            .insert(&assignment)
            .await
            .map_err(map_repository_error)?;

        tracing::info!(
            assignment_id = %assignment.id(),
            resource_id = %assignment.resource_id(),
            "assignment created"
        );
        Ok(AssignmentResponse {
            assignment: AssignmentPayload::from(assignment),
        })
    }

    async fn update(&self, request: UpdateAssignmentRequest) -> Result<AssignmentResponse, Error> {
        let current = self.load(request.assignment_id).await?;
        authorize(
            self.policy.as_ref(),
            &request.actor,
            PolicyScope::project(current.project_id()),
        )
        .await?;

        if request.update.touches_pending_only_fields()
            && current.status() != AssignmentStatus::Pending
        {
            return Err(Error::immutable_state(format!(
                "assignment {} is {}; dates, targets and rate are editable only while pending",
                current.id(),
                current.status(),
            )));
        }

        let dates_changed =
            request.update.start_date.is_some() || request.update.end_date.is_some();
        let updated = current
            .apply_update(request.update, self.clock.utc())
            .map_err(|err| Error::invalid_request(format!("invalid assignment update: {err}")))?;

        if dates_changed {
            self.ensure_no_overlap(
                updated.resource_id(),
                updated.start_date(),
                updated.end_date(),
                Some(updated.id()),
            )
            .await?;
        }

        self.assignments
            .update(&updated)
            .await
            .map_err(map_repository_error)?;

        Ok(AssignmentResponse {
            assignment: AssignmentPayload::from(updated),
        })
    }

    async fn delete(&self, request: DeleteAssignmentRequest) -> Result<(), Error> {
        let current = self.load(request.assignment_id).await?;
        authorize(
            self.policy.as_ref(),
            &request.actor,
            PolicyScope::project(current.project_id()),
        )
        .await?;

        let has_dependents = self
            .assignments
            .has_dependents(current.id())
            .await
            .map_err(map_repository_error)?;
        if has_dependents {
            return Err(Error::has_dependents(format!(
                "assignment {} has attendance or expense records and cannot be deleted",
                current.id(),
            )));
        }

        let removed = self
            .assignments
            .delete(current.id())
            .await
            .map_err(map_repository_error)?;
        if !removed {
            return Err(not_found(current.id()));
        }

        if current.status() == AssignmentStatus::Active {
            self.availability
                .on_assignment_deactivated(current.resource_id())
                .await?;
        }
        tracing::info!(assignment_id = %current.id(), "assignment deleted");
        Ok(())
    }

    async fn transition(
        &self,
        request: TransitionAssignmentRequest,
    ) -> Result<AssignmentResponse, Error> {
        let current = self.load(request.assignment_id).await?;
        authorize(
            self.policy.as_ref(),
            &request.actor,
            PolicyScope::project(current.project_id()),
        )
        .await?;

        let from = current.status();
        let next = request.next_status;
        if !from.can_transition_to(next) {
            return Err(Error::invalid_transition(format!(
                "assignment {} cannot move from {from} to {next}",
                current.id(),
            )));
        }

        if next == AssignmentStatus::Active {
            let available = self
                .availability
                .is_available(current.resource_id())
                .await?;
            if !available {
                return Err(Error::resource_unavailable(format!(
                    "resource {} is not available for activation",
                    current.resource_id(),
                )));
            }
        }

        let updated = self
            .assignments
            .set_status(current.id(), from, next, self.clock.utc())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(current.id()))?;

        // The flag flip lands after the status write. A failed flip
        // reverts the status so a retry sees the pre-transition state;
        // a crash in between is repaired by the reconcile pass.
        if next == AssignmentStatus::Active {
            if let Err(error) = self
                .availability
                .on_assignment_activated(updated.resource_id())
                .await
            {
                self.revert_status(updated.id(), next, from).await;
                return Err(error);
            }
        } else if from == AssignmentStatus::Active {
            if let Err(error) = self
                .availability
                .on_assignment_deactivated(updated.resource_id())
                .await
            {
                self.revert_status(updated.id(), next, from).await;
                return Err(error);
            }
        }

        tracing::info!(
            assignment_id = %updated.id(),
            from = %from,
            to = %next,
            "assignment transitioned"
        );
        Ok(AssignmentResponse {
            assignment: AssignmentPayload::from(updated),
        })
    }
}

#[async_trait]
impl<R> AssignmentQuery for AssignmentService<R>
where
    R: AssignmentRepository,
{
    async fn get(&self, request: GetAssignmentRequest) -> Result<AssignmentPayload, Error> {
        let assignment = self.load(request.assignment_id).await?;
        Ok(AssignmentPayload::from(assignment))
    }

    async fn list(
        &self,
        request: ListAssignmentsRequest,
    ) -> Result<ListAssignmentsResponse, Error> {
        let (limit, offset) = clamp_page(request.limit, request.offset);
        let filter = AssignmentFilter {
            status: request.status,
            project_id: request.project_id,
            resource_id: request.resource_id,
            limit,
            offset,
        };
        let assignments = self
            .assignments
            .list(&filter)
            .await
            .map_err(map_repository_error)?;
        Ok(ListAssignmentsResponse {
            assignments: assignments
                .into_iter()
                .map(AssignmentPayload::from)
                .collect(),
        })
    }
}

#[cfg(test)]
#[path = "assignment_service_tests.rs"]
mod tests;
