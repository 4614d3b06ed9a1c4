//! Validation errors for assignment construction and field updates.

use chrono::NaiveDate;

/// Invariant violations raised by [`Assignment::new`](super::Assignment::new)
/// and by field updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentValidationError {
    /// `end_date` precedes `start_date`.
    #[error("end_date {end_date} must not precede start_date {start_date}")]
    EndBeforeStart {
        /// Supplied period start.
        start_date: NaiveDate,
        /// Supplied period end.
        end_date: NaiveDate,
    },
    /// `target_interviews` must be strictly positive.
    #[error("target_interviews must be positive, got {value}")]
    NonPositiveTarget {
        /// Supplied target.
        value: i32,
    },
    /// `total_days` must be strictly positive.
    #[error("total_days must be positive, got {value}")]
    NonPositiveTotalDays {
        /// Supplied day count.
        value: i32,
    },
    /// `daily_rate`, when present, must not be negative.
    #[error("daily_rate must not be negative, got {value}")]
    NegativeDailyRate {
        /// Supplied rate rendered as text.
        value: String,
    },
}
