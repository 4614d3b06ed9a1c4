//! Driving ports for field resource availability.
//!
//! Two surfaces share this module: the public command/query pair used by
//! the HTTP layer, and the [`AvailabilityCoordinator`] hook the assignment
//! service calls when a booking moves into or out of `active`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ActorContext, Error};

/// One resource's availability flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityPayload {
    /// Field resource the flag belongs to.
    pub resource_id: Uuid,
    /// Whether the resource can take new work.
    pub available: bool,
}

/// Request to read one resource's availability.
#[derive(Debug, Clone, Copy)]
pub struct GetAvailabilityRequest {
    /// Field resource being queried.
    pub resource_id: Uuid,
}

/// Request to set one resource's availability by hand.
#[derive(Debug, Clone)]
pub struct SetAvailabilityRequest {
    /// Authenticated actor setting the flag.
    pub actor: ActorContext,
    /// Field resource being updated.
    pub resource_id: Uuid,
    /// New availability flag.
    pub available: bool,
}

/// Response carrying the reconciliation outcome for the tracked fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    /// Resources whose stored flag disagreed with the booking ledger.
    pub corrected: Vec<AvailabilityPayload>,
}

/// Driving port for availability reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityQuery: Send + Sync {
    /// Report whether the resource can take new work.
    ///
    /// Resources with no stored flag are reported available.
    async fn get(&self, request: GetAvailabilityRequest) -> Result<AvailabilityPayload, Error>;
}

/// Driving port for availability mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityCommand: Send + Sync {
    /// Set the resource's flag by hand, overriding the derived value
    /// until the next booking transition or reconcile pass.
    async fn set(&self, request: SetAvailabilityRequest) -> Result<AvailabilityPayload, Error>;

    /// Re-derive every tracked resource's flag from the booking ledger,
    /// correcting drift left by a crash between a status write and its
    /// availability flip.
    async fn reconcile(&self) -> Result<ReconcileResponse, Error>;
}

/// Hook the assignment service calls around `active` transitions.
///
/// The status write and the flag flip are separate stores; a crash
/// between them is repaired by [`AvailabilityCommand::reconcile`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailabilityCoordinator: Send + Sync {
    /// Whether the resource can take new work right now.
    async fn is_available(&self, resource_id: Uuid) -> Result<bool, Error>;

    /// Mark the resource busy after a booking became `active`.
    async fn on_assignment_activated(&self, resource_id: Uuid) -> Result<(), Error>;

    /// Re-derive the resource's flag after a booking left `active`;
    /// the resource becomes free only when no active booking remains.
    async fn on_assignment_deactivated(&self, resource_id: Uuid) -> Result<(), Error>;
}

/// Fixture query reporting every resource as available.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAvailabilityQuery;

#[async_trait]
impl AvailabilityQuery for FixtureAvailabilityQuery {
    async fn get(&self, request: GetAvailabilityRequest) -> Result<AvailabilityPayload, Error> {
        Ok(AvailabilityPayload {
            resource_id: request.resource_id,
            available: true,
        })
    }
}

/// Fixture command implementation used before a store is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAvailabilityCommand;

#[async_trait]
impl AvailabilityCommand for FixtureAvailabilityCommand {
    async fn set(&self, _request: SetAvailabilityRequest) -> Result<AvailabilityPayload, Error> {
        Err(Error::service_unavailable("resource store not configured"))
    }

    async fn reconcile(&self) -> Result<ReconcileResponse, Error> {
        Ok(ReconcileResponse {
            corrected: Vec::new(),
        })
    }
}
