//! Port for the local projection of field-resource availability.
//!
//! The resource entity itself lives in an external directory; this port only
//! persists the availability flag owned by the operations ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::define_port_error;

define_port_error! {
    /// Errors raised by resource repository adapters.
    pub enum ResourceRepositoryError {
        /// Repository connection could not be established.
        Connection {
            /// Adapter-specific detail.
            message: String
        } =>
            "resource repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query {
            /// Adapter-specific detail.
            message: String
        } =>
            "resource repository query failed: {message}",
    }
}

/// Port for reading and writing resource availability flags.
///
/// A resource without a stored row is treated as available: the flag only
/// becomes load-bearing once an assignment has touched it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Read the availability flag; `None` when no row exists yet.
    async fn get_availability(
        &self,
        resource_id: Uuid,
    ) -> Result<Option<bool>, ResourceRepositoryError>;

    /// Upsert the availability flag.
    async fn set_availability(
        &self,
        resource_id: Uuid,
        available: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), ResourceRepositoryError>;

    /// All resource ids with a stored availability row.
    async fn list_tracked_resources(&self) -> Result<Vec<Uuid>, ResourceRepositoryError>;
}

/// Fixture implementation for wiring without a database.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureResourceRepository;

#[async_trait]
impl ResourceRepository for FixtureResourceRepository {
    async fn get_availability(
        &self,
        _resource_id: Uuid,
    ) -> Result<Option<bool>, ResourceRepositoryError> {
        Ok(None)
    }

    async fn set_availability(
        &self,
        _resource_id: Uuid,
        _available: bool,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), ResourceRepositoryError> {
        Ok(())
    }

    async fn list_tracked_resources(&self) -> Result<Vec<Uuid>, ResourceRepositoryError> {
        Ok(Vec::new())
    }
}
