//! Port for the external role/permission collaborator.
//!
//! Every mutating operation asks this port whether the authenticated actor
//! may act on the targeted project or resource. Calls are wrapped in a
//! timeout by the services; an expired budget surfaces as
//! [`ErrorCode::DependencyTimeout`](crate::domain::ErrorCode::DependencyTimeout)
//! and is the only failure eligible for a single automatic retry by callers.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ActorContext;

use super::define_port_error;

define_port_error! {
    /// Errors raised by access policy adapters.
    pub enum AccessPolicyError {
        /// The collaborator could not be reached.
        Unavailable {
            /// Adapter-specific detail.
            message: String
        } =>
            "access policy unavailable: {message}",
    }
}

/// Subject of an authorization check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyScope {
    /// Project the operation touches, if any.
    pub project_id: Option<Uuid>,
    /// Field resource the operation touches, if any.
    pub resource_id: Option<Uuid>,
}

impl PolicyScope {
    /// Scope covering one project.
    #[must_use]
    pub const fn project(project_id: Uuid) -> Self {
        Self {
            project_id: Some(project_id),
            resource_id: None,
        }
    }

    /// Scope covering one field resource.
    #[must_use]
    pub const fn resource(resource_id: Uuid) -> Self {
        Self {
            project_id: None,
            resource_id: Some(resource_id),
        }
    }
}

/// Port answering whether an actor may act within a scope.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Whether the actor is permitted to act within the scope.
    async fn is_permitted(
        &self,
        actor: &ActorContext,
        scope: PolicyScope,
    ) -> Result<bool, AccessPolicyError>;
}

/// Fixture policy that permits every actor; used until the external
/// role/permission subsystem is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllAccessPolicy;

#[async_trait]
impl AccessPolicy for AllowAllAccessPolicy {
    async fn is_permitted(
        &self,
        _actor: &ActorContext,
        _scope: PolicyScope,
    ) -> Result<bool, AccessPolicyError> {
        Ok(true)
    }
}
