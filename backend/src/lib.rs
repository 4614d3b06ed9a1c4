//! Field operations backend: assignment lifecycle, attendance and expense
//! ledgers, progress aggregation and resource availability.
//!
//! The crate is laid out hexagonally: `domain` holds entities, ports and
//! services; `inbound` adapts HTTP onto the driving ports; `outbound` adapts
//! the driven ports onto PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
