//! Validation errors for attendance record construction.

/// Invariant violations raised by
/// [`AttendanceRecord::new`](super::AttendanceRecord::new).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceValidationError {
    /// `check_out_time` precedes `check_in_time`.
    #[error("check_out_time must not precede check_in_time")]
    CheckOutBeforeCheckIn,
    /// A check-out exists without a corresponding check-in.
    #[error("check_out_time requires a check_in_time")]
    CheckOutWithoutCheckIn,
    /// `interviews_conducted` must not be negative.
    #[error("interviews_conducted must not be negative, got {value}")]
    NegativeInterviews {
        /// Supplied tally.
        value: i32,
    },
    /// `travel_distance_km`, when present, must not be negative.
    #[error("travel_distance_km must not be negative, got {value}")]
    NegativeTravelDistance {
        /// Supplied distance rendered as text.
        value: String,
    },
}
