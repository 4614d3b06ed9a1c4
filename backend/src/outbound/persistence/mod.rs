//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the domain repository
//! ports backed by PostgreSQL via Diesel with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Concurrency via constraints**: The ledger uniqueness rules (one open
//!   attendance session, one record per day, single approval stamp, status
//!   compare-and-set) are enforced by database constraints and filtered
//!   writes, then mapped back to the dedicated port error variants.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, PoolConfig, DieselAssignmentRepository};
//!
//! let config = PoolConfig::new("postgres://localhost/field_ops");
//! let pool = DbPool::new(config).await?;
//! let repo = DieselAssignmentRepository::new(pool);
//! ```

mod diesel_assignment_repository;
mod diesel_attendance_repository;
mod diesel_basic_error_mapping;
mod diesel_expense_repository;
mod diesel_resource_repository;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use diesel_attendance_repository::DieselAttendanceRepository;
pub use diesel_expense_repository::DieselExpenseRepository;
pub use diesel_resource_repository::DieselResourceRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
