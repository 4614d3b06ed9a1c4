//! PostgreSQL-backed `ResourceRepository` implementation using Diesel ORM.
//!
//! Stores only the availability flag projection; the resource entity itself
//! lives in an external directory. Writes are upserts keyed on the external
//! resource identifier.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ResourceRepository, ResourceRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::NewFieldResourceRow;
use super::pool::{DbPool, PoolError};
use super::schema::field_resources;

/// Diesel-backed implementation of the resource repository port.
#[derive(Clone)]
pub struct DieselResourceRepository {
    pool: DbPool,
}

impl DieselResourceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> ResourceRepositoryError {
    map_basic_pool_error(error, |message| {
        ResourceRepositoryError::connection(message)
    })
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> ResourceRepositoryError {
    map_basic_diesel_error(
        error,
        ResourceRepositoryError::query,
        ResourceRepositoryError::connection,
    )
}

#[async_trait]
impl ResourceRepository for DieselResourceRepository {
    async fn get_availability(
        &self,
        resource_id: Uuid,
    ) -> Result<Option<bool>, ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        field_resources::table
            .filter(field_resources::resource_id.eq(resource_id))
            .select(field_resources::available)
            .first::<bool>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn set_availability(
        &self,
        resource_id: Uuid,
        available: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<(), ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewFieldResourceRow {
            resource_id,
            available,
            updated_at,
        };

        diesel::insert_into(field_resources::table)
            .values(&row)
            .on_conflict(field_resources::resource_id)
            .do_update()
            .set((
                field_resources::available.eq(available),
                field_resources::updated_at.eq(updated_at),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_tracked_resources(&self) -> Result<Vec<Uuid>, ResourceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        field_resources::table
            .select(field_resources::resource_id)
            .order(field_resources::resource_id.asc())
            .load::<Uuid>(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}
