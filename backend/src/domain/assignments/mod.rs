//! Assignment aggregate: entity, lifecycle states and validation.

mod assignment;
mod status;
mod validation;

pub use assignment::{Assignment, AssignmentDraft, AssignmentFieldUpdate};
pub use status::{AssignmentStatus, UnknownStatusError};
pub use validation::AssignmentValidationError;
