//! Attendance record entity: one working day for one assignment.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::AttendanceValidationError;

/// Geographic point captured at check-in or check-out.
///
/// Coordinates are stored exactly as supplied; the field devices report
/// whatever their GPS produced and no plausibility bounds are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

/// One side of a session: the moment and place work started or stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionMark {
    /// Wall-clock instant of the mark.
    pub time: DateTime<Utc>,
    /// Free-text place description ("Village X health post").
    pub location: Option<String>,
    /// Optional device coordinates.
    pub coordinates: Option<GeoPoint>,
}

/// Input payload for [`AttendanceRecord::new`].
#[derive(Debug, Clone)]
pub struct AttendanceDraft {
    /// Record identifier.
    pub id: Uuid,
    /// Owning assignment.
    pub assignment_id: Uuid,
    /// Working day the record covers.
    pub date: NaiveDate,
    /// Check-in mark, absent for skeleton manual entries.
    pub check_in: Option<SessionMark>,
    /// Check-out mark, present only after checkout.
    pub check_out: Option<SessionMark>,
    /// Interviews tallied for the day; non-negative.
    pub interviews_conducted: i32,
    /// Free-text villages visited.
    pub villages_visited: Vec<String>,
    /// Optional non-negative distance travelled.
    pub travel_distance_km: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A validated attendance record.
///
/// A record with a check-in and no check-out is the assignment's single
/// "open session"; uniqueness of the open session and of (assignment, date)
/// is enforced by the attendance repository, not here.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub(super) id: Uuid,
    pub(super) assignment_id: Uuid,
    pub(super) date: NaiveDate,
    pub(super) check_in: Option<SessionMark>,
    pub(super) check_out: Option<SessionMark>,
    pub(super) interviews_conducted: i32,
    pub(super) villages_visited: Vec<String>,
    pub(super) travel_distance_km: Option<Decimal>,
    pub(super) notes: Option<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

fn validate_draft(draft: &AttendanceDraft) -> Result<(), AttendanceValidationError> {
    match (&draft.check_in, &draft.check_out) {
        (None, Some(_)) => return Err(AttendanceValidationError::CheckOutWithoutCheckIn),
        (Some(check_in), Some(check_out)) if check_out.time < check_in.time => {
            return Err(AttendanceValidationError::CheckOutBeforeCheckIn);
        }
        _ => {}
    }
    if draft.interviews_conducted < 0 {
        return Err(AttendanceValidationError::NegativeInterviews {
            value: draft.interviews_conducted,
        });
    }
    if let Some(distance) = draft.travel_distance_km
        && distance.is_sign_negative()
        && !distance.is_zero()
    {
        return Err(AttendanceValidationError::NegativeTravelDistance {
            value: distance.to_string(),
        });
    }
    Ok(())
}

impl AttendanceRecord {
    /// Creates a validated attendance record from a draft.
    pub fn new(draft: AttendanceDraft) -> Result<Self, AttendanceValidationError> {
        validate_draft(&draft)?;
        let AttendanceDraft {
            id,
            assignment_id,
            date,
            check_in,
            check_out,
            interviews_conducted,
            villages_visited,
            travel_distance_km,
            notes,
            created_at,
            updated_at,
        } = draft;
        Ok(Self {
            id,
            assignment_id,
            date,
            check_in,
            check_out,
            interviews_conducted,
            villages_visited,
            travel_distance_km,
            notes,
            created_at,
            updated_at,
        })
    }

    /// Fills the check-out side of an open session.
    pub fn close(
        &self,
        check_out: SessionMark,
        interviews_conducted: i32,
        villages_visited: Option<Vec<String>>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, AttendanceValidationError> {
        let mut draft = self.to_draft();
        draft.check_out = Some(check_out);
        draft.interviews_conducted = interviews_conducted;
        if let Some(villages) = villages_visited {
            draft.villages_visited = villages;
        }
        if notes.is_some() {
            draft.notes = notes;
        }
        draft.updated_at = now;
        Self::new(draft)
    }

    fn to_draft(&self) -> AttendanceDraft {
        AttendanceDraft {
            id: self.id,
            assignment_id: self.assignment_id,
            date: self.date,
            check_in: self.check_in.clone(),
            check_out: self.check_out.clone(),
            interviews_conducted: self.interviews_conducted,
            villages_visited: self.villages_visited.clone(),
            travel_distance_km: self.travel_distance_km,
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether the record is an open session (checked in, not checked out).
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_none()
    }

    /// Returns the record id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning assignment id.
    #[must_use]
    pub const fn assignment_id(&self) -> Uuid {
        self.assignment_id
    }

    /// Returns the working day.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the check-in mark, if recorded.
    #[must_use]
    pub const fn check_in(&self) -> Option<&SessionMark> {
        self.check_in.as_ref()
    }

    /// Returns the check-out mark, if recorded.
    #[must_use]
    pub const fn check_out(&self) -> Option<&SessionMark> {
        self.check_out.as_ref()
    }

    /// Returns the interview tally for the day.
    #[must_use]
    pub const fn interviews_conducted(&self) -> i32 {
        self.interviews_conducted
    }

    /// Returns the villages visited.
    #[must_use]
    pub fn villages_visited(&self) -> &[String] {
        self.villages_visited.as_slice()
    }

    /// Returns the distance travelled, if recorded.
    #[must_use]
    pub const fn travel_distance_km(&self) -> Option<Decimal> {
        self.travel_distance_km
    }

    /// Returns the free-form notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
