//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic:
//! the ledger rules (open-session uniqueness, status compare-and-set,
//! approval idempotency) are expressed here only as the storage mechanics
//! that make the domain contracts hold under concurrency.

pub mod persistence;
