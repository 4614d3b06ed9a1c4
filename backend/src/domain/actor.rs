//! Actor identity carried by every mutating operation.
//!
//! Credential issuing and verification belong to an external identity
//! subsystem; the domain only sees an opaque operator identifier extracted
//! by the inbound adapter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of an authenticated operator or field resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(Uuid);

/// Validation errors for [`ActorId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorIdValidationError {
    /// The supplied identifier was not a valid UUID.
    #[error("actor id must be a valid UUID: {value}")]
    InvalidUuid {
        /// The rejected raw value.
        value: String,
    },
}

impl ActorId {
    /// Parse an actor id from its string form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ActorIdValidationError> {
        let raw = raw.as_ref();
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| ActorIdValidationError::InvalidUuid {
                value: raw.to_owned(),
            })
    }

    /// Wrap an already-validated UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a random actor id, used by fixtures and tests.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated actor context accepted by every mutating domain operation.
///
/// Authorization itself is answered by the [`AccessPolicy`] port; the context
/// only asserts that an identity was established by the inbound adapter.
///
/// [`AccessPolicy`]: crate::domain::ports::AccessPolicy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    /// The authenticated operator.
    pub actor_id: ActorId,
}

impl ActorContext {
    /// Build a context for the given actor.
    #[must_use]
    pub const fn new(actor_id: ActorId) -> Self {
        Self { actor_id }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use super::*;

    #[test]
    fn parses_valid_uuid() {
        let id = ActorId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn rejects_invalid_uuid() {
        let err = ActorId::new("not-a-uuid").expect_err("invalid uuid");
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn serialises_as_plain_string() {
        let id = ActorId::from_uuid(Uuid::nil());
        let json = serde_json::to_string(&id).expect("serialise");
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
