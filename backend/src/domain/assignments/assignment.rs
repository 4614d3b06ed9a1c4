//! Assignment entity: one bounded-time commitment of a field resource to a
//! project.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{AssignmentStatus, AssignmentValidationError};

/// Input payload for [`Assignment::new`].
#[derive(Debug, Clone)]
pub struct AssignmentDraft {
    /// Assignment identifier.
    pub id: Uuid,
    /// Project the resource is committed to.
    pub project_id: Uuid,
    /// Field resource being committed.
    pub resource_id: Uuid,
    /// Current lifecycle state.
    pub status: AssignmentStatus,
    /// First day of the commitment.
    pub start_date: NaiveDate,
    /// Last day of the commitment.
    pub end_date: NaiveDate,
    /// Free-text district names covered by the assignment.
    pub assigned_districts: Vec<String>,
    /// Free-text village names covered by the assignment.
    pub assigned_villages: Vec<String>,
    /// Advisory interview target; strictly positive.
    pub target_interviews: i32,
    /// Planned working days; strictly positive.
    pub total_days: i32,
    /// Optional non-negative daily pay rate.
    pub daily_rate: Option<Decimal>,
    /// Operator instructions handed to the resource.
    pub instructions: Option<String>,
    /// Free-form notes, editable in every state.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to a pending assignment (dates, targets, rate) or
/// to notes and instructions in any state.
#[derive(Debug, Clone, Default)]
pub struct AssignmentFieldUpdate {
    /// Replacement period start.
    pub start_date: Option<NaiveDate>,
    /// Replacement period end.
    pub end_date: Option<NaiveDate>,
    /// Replacement district list.
    pub assigned_districts: Option<Vec<String>>,
    /// Replacement village list.
    pub assigned_villages: Option<Vec<String>>,
    /// Replacement interview target.
    pub target_interviews: Option<i32>,
    /// Replacement planned day count.
    pub total_days: Option<i32>,
    /// Replacement daily rate (double-optional: outer None leaves it alone).
    pub daily_rate: Option<Option<Decimal>>,
    /// Replacement instructions.
    pub instructions: Option<Option<String>>,
    /// Replacement notes.
    pub notes: Option<Option<String>>,
}

impl AssignmentFieldUpdate {
    /// Whether the update touches fields that are frozen outside `pending`.
    #[must_use]
    pub const fn touches_pending_only_fields(&self) -> bool {
        self.start_date.is_some()
            || self.end_date.is_some()
            || self.assigned_districts.is_some()
            || self.assigned_villages.is_some()
            || self.target_interviews.is_some()
            || self.total_days.is_some()
            || self.daily_rate.is_some()
    }
}

/// A validated assignment.
///
/// Construction through [`Assignment::new`] guarantees the value invariants:
/// `end_date >= start_date`, `target_interviews > 0`, `total_days > 0` and a
/// non-negative `daily_rate` when present. No-overlap against other
/// assignments is a repository-level rule and is enforced by the assignment
/// service on create and activation.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub(super) id: Uuid,
    pub(super) project_id: Uuid,
    pub(super) resource_id: Uuid,
    pub(super) status: AssignmentStatus,
    pub(super) start_date: NaiveDate,
    pub(super) end_date: NaiveDate,
    pub(super) assigned_districts: Vec<String>,
    pub(super) assigned_villages: Vec<String>,
    pub(super) target_interviews: i32,
    pub(super) total_days: i32,
    pub(super) daily_rate: Option<Decimal>,
    pub(super) instructions: Option<String>,
    pub(super) notes: Option<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

fn validate_draft(draft: &AssignmentDraft) -> Result<(), AssignmentValidationError> {
    if draft.end_date < draft.start_date {
        return Err(AssignmentValidationError::EndBeforeStart {
            start_date: draft.start_date,
            end_date: draft.end_date,
        });
    }
    if draft.target_interviews <= 0 {
        return Err(AssignmentValidationError::NonPositiveTarget {
            value: draft.target_interviews,
        });
    }
    if draft.total_days <= 0 {
        return Err(AssignmentValidationError::NonPositiveTotalDays {
            value: draft.total_days,
        });
    }
    if let Some(rate) = draft.daily_rate
        && rate.is_sign_negative()
        && !rate.is_zero()
    {
        return Err(AssignmentValidationError::NegativeDailyRate {
            value: rate.to_string(),
        });
    }
    Ok(())
}

impl Assignment {
    /// Creates a validated assignment from a draft.
    pub fn new(draft: AssignmentDraft) -> Result<Self, AssignmentValidationError> {
        validate_draft(&draft)?;
        let AssignmentDraft {
            id,
            project_id,
            resource_id,
            status,
            start_date,
            end_date,
            assigned_districts,
            assigned_villages,
            target_interviews,
            total_days,
            daily_rate,
            instructions,
            notes,
            created_at,
            updated_at,
        } = draft;
        Ok(Self {
            id,
            project_id,
            resource_id,
            status,
            start_date,
            end_date,
            assigned_districts,
            assigned_villages,
            target_interviews,
            total_days,
            daily_rate,
            instructions,
            notes,
            created_at,
            updated_at,
        })
    }

    /// Applies a field update, revalidating the combined state.
    ///
    /// Callers are responsible for the state-dependent rules (pending-only
    /// fields); this method only re-checks the value invariants.
    pub fn apply_update(
        &self,
        update: AssignmentFieldUpdate,
        now: DateTime<Utc>,
    ) -> Result<Self, AssignmentValidationError> {
        let mut draft = self.to_draft();
        if let Some(start_date) = update.start_date {
            draft.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            draft.end_date = end_date;
        }
        if let Some(districts) = update.assigned_districts {
            draft.assigned_districts = districts;
        }
        if let Some(villages) = update.assigned_villages {
            draft.assigned_villages = villages;
        }
        if let Some(target) = update.target_interviews {
            draft.target_interviews = target;
        }
        if let Some(days) = update.total_days {
            draft.total_days = days;
        }
        if let Some(rate) = update.daily_rate {
            draft.daily_rate = rate;
        }
        if let Some(instructions) = update.instructions {
            draft.instructions = instructions;
        }
        if let Some(notes) = update.notes {
            draft.notes = notes;
        }
        draft.updated_at = now;
        Self::new(draft)
    }

    /// Returns a copy of this assignment with the given status.
    #[must_use]
    pub fn with_status(&self, status: AssignmentStatus, now: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        next.status = status;
        next.updated_at = now;
        next
    }

    fn to_draft(&self) -> AssignmentDraft {
        AssignmentDraft {
            id: self.id,
            project_id: self.project_id,
            resource_id: self.resource_id,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            assigned_districts: self.assigned_districts.clone(),
            assigned_villages: self.assigned_villages.clone(),
            target_interviews: self.target_interviews,
            total_days: self.total_days,
            daily_rate: self.daily_rate,
            instructions: self.instructions.clone(),
            notes: self.notes.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether the commitment period overlaps `[start, end]`.
    #[must_use]
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    /// Returns the assignment id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the project id.
    #[must_use]
    pub const fn project_id(&self) -> Uuid {
        self.project_id
    }

    /// Returns the committed resource id.
    #[must_use]
    pub const fn resource_id(&self) -> Uuid {
        self.resource_id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn status(&self) -> AssignmentStatus {
        self.status
    }

    /// Returns the period start.
    #[must_use]
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Returns the period end.
    #[must_use]
    pub const fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Returns the assigned districts.
    #[must_use]
    pub fn assigned_districts(&self) -> &[String] {
        self.assigned_districts.as_slice()
    }

    /// Returns the assigned villages.
    #[must_use]
    pub fn assigned_villages(&self) -> &[String] {
        self.assigned_villages.as_slice()
    }

    /// Returns the advisory interview target.
    #[must_use]
    pub const fn target_interviews(&self) -> i32 {
        self.target_interviews
    }

    /// Returns the planned working day count.
    #[must_use]
    pub const fn total_days(&self) -> i32 {
        self.total_days
    }

    /// Returns the optional daily rate.
    #[must_use]
    pub const fn daily_rate(&self) -> Option<Decimal> {
        self.daily_rate
    }

    /// Returns the operator instructions.
    #[must_use]
    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
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
