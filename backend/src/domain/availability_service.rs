//! Field resource availability service.
//!
//! Implements the availability driving ports and the coordinator hook
//! the assignment service calls around `active` transitions. The stored
//! flag is derived from the booking ledger; the reconcile pass re-derives
//! it for the whole tracked fleet to repair drift left by a crash between
//! a status write and its flag flip.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    AccessPolicy, AssignmentRepository, AssignmentRepositoryError, AvailabilityCommand,
    AvailabilityCoordinator, AvailabilityPayload, AvailabilityQuery, GetAvailabilityRequest,
    PolicyScope, ReconcileResponse, ResourceRepository, ResourceRepositoryError,
    SetAvailabilityRequest,
};
use crate::domain::Error;

use super::assignment_service::authorize;

fn map_resource_error(error: ResourceRepositoryError) -> Error {
    match error {
        ResourceRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("resource repository unavailable: {message}"))
        }
        ResourceRepositoryError::Query { message } => {
            Error::internal(format!("resource repository error: {message}"))
        }
    }
}

fn map_assignment_error(error: AssignmentRepositoryError) -> Error {
    match error {
        AssignmentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("assignment repository unavailable: {message}"))
        }
        other => Error::internal(format!("assignment repository error: {other}")),
    }
}

/// Availability service implementing query, command and coordinator ports.
#[derive(Clone)]
pub struct AvailabilityService<A, R> {
    assignments: Arc<A>,
    resources: Arc<R>,
    policy: Arc<dyn AccessPolicy>,
    clock: Arc<dyn Clock>,
}

impl<A, R> AvailabilityService<A, R> {
    /// Create the service over its driven ports.
    pub fn new(
        assignments: Arc<A>,
        resources: Arc<R>,
        policy: Arc<dyn AccessPolicy>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            assignments,
            resources,
            policy,
            clock,
        }
    }
}

impl<A, R> AvailabilityService<A, R>
where
    A: AssignmentRepository,
    R: ResourceRepository,
{
    async fn stored_flag(&self, resource_id: Uuid) -> Result<bool, Error> {
        Ok(self
            .resources
            .get_availability(resource_id)
            .await
            .map_err(map_resource_error)?
            .unwrap_or(true))
    }

    async fn derive_flag(&self, resource_id: Uuid) -> Result<bool, Error> {
        let active = self
            .assignments
            .count_active_for_resource(resource_id)
            .await
            .map_err(map_assignment_error)?;
        Ok(active == 0)
    }
}

#[async_trait]
impl<A, R> AvailabilityQuery for AvailabilityService<A, R>
where
    A: AssignmentRepository,
    R: ResourceRepository,
{
    async fn get(&self, request: GetAvailabilityRequest) -> Result<AvailabilityPayload, Error> {
        Ok(AvailabilityPayload {
            resource_id: request.resource_id,
            available: self.stored_flag(request.resource_id).await?,
        })
    }
}

#[async_trait]
impl<A, R> AvailabilityCommand for AvailabilityService<A, R>
where
    A: AssignmentRepository,
    R: ResourceRepository,
{
    async fn set(&self, request: SetAvailabilityRequest) -> Result<AvailabilityPayload, Error> {
        authorize(
            self.policy.as_ref(),
            &request.actor,
            PolicyScope::resource(request.resource_id),
        )
        .await?;

        self.resources
            .set_availability(request.resource_id, request.available, self.clock.utc())
            .await
            .map_err(map_resource_error)?;

        tracing::info!(
            resource_id = %request.resource_id,
            available = request.available,
            "availability overridden"
        );
        Ok(AvailabilityPayload {
            resource_id: request.resource_id,
            available: request.available,
        })
    }

    async fn reconcile(&self) -> Result<ReconcileResponse, Error> {
        let mut fleet: BTreeSet<Uuid> = self
            .resources
            .list_tracked_resources()
            .await
            .map_err(map_resource_error)?
            .into_iter()
            .collect();
        fleet.extend(
            self.assignments
                .resources_with_active_assignments()
                .await
                .map_err(map_assignment_error)?,
        );

        let mut corrected = Vec::new();
        for resource_id in fleet {
            let stored = self.stored_flag(resource_id).await?;
            let expected = self.derive_flag(resource_id).await?;
            if stored != expected {
                self.resources
                    .set_availability(resource_id, expected, self.clock.utc())
                    .await
                    .map_err(map_resource_error)?;
                tracing::warn!(
                    resource_id = %resource_id,
                    available = expected,
                    "availability flag corrected during reconcile"
                );
                corrected.push(AvailabilityPayload {
                    resource_id,
                    available: expected,
                });
            }
        }
        Ok(ReconcileResponse { corrected })
    }
}

#[async_trait]
impl<A, R> AvailabilityCoordinator for AvailabilityService<A, R>
where
    A: AssignmentRepository,
    R: ResourceRepository,
{
    async fn is_available(&self, resource_id: Uuid) -> Result<bool, Error> {
        self.stored_flag(resource_id).await
    }

    async fn on_assignment_activated(&self, resource_id: Uuid) -> Result<(), Error> {
        self.resources
            .set_availability(resource_id, false, self.clock.utc())
            .await
            .map_err(map_resource_error)
    }

    async fn on_assignment_deactivated(&self, resource_id: Uuid) -> Result<(), Error> {
        let available = self.derive_flag(resource_id).await?;
        self.resources
            .set_availability(resource_id, available, self.clock.utc())
            .await
            .map_err(map_resource_error)
    }
}

#[cfg(test)]
#[path = "availability_service_tests.rs"]
mod tests;
