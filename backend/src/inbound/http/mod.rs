//! HTTP inbound adapter exposing REST endpoints.

pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod availability;
pub mod error;
pub mod expenses;
pub mod health;
pub mod progress;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
