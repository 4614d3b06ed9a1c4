//! In-memory repository adapters for integration tests.
//!
//! These adapters honour the same contracts as the Diesel-backed ones: the
//! attendance uniqueness rules, the status compare-and-set and the
//! idempotent approval stamp. All four share one [`MemoryStore`] so
//! cross-ledger checks (dependants, availability derivation) see the same
//! data, exactly as the shared database does.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::ports::{
    AssignmentFilter, AssignmentRepository, AssignmentRepositoryError, AttendanceFilter,
    AttendanceRepository, AttendanceRepositoryError, AttendanceTally, ExpenseFilter,
    ExpenseRepository, ExpenseRepositoryError, ExpenseTotals, ResourceRepository,
    ResourceRepositoryError,
};
use crate::domain::{
    ActorId, Approval, Assignment, AssignmentStatus, AttendanceRecord, Expense, ExpenseDraft,
};

/// Shared backing store for the in-memory adapters.
#[derive(Default)]
pub struct MemoryStore {
    assignments: Mutex<HashMap<Uuid, Assignment>>,
    attendance: Mutex<HashMap<Uuid, AttendanceRecord>>,
    expenses: Mutex<HashMap<Uuid, Expense>>,
    availability: Mutex<HashMap<Uuid, bool>>,
}

impl MemoryStore {
    /// Create a store shared between the four adapters.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("memory store mutex poisoned"),
    }
}

fn paginate<T>(mut items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    let offset = usize::try_from(offset.max(0)).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let limit = if limit == 0 { usize::MAX } else { limit };
    if offset >= items.len() {
        return Vec::new();
    }
    items.drain(..offset);
    items.truncate(limit);
    items
}

/// In-memory assignment repository.
#[derive(Clone)]
pub struct MemoryAssignmentRepository {
    store: Arc<MemoryStore>,
}

impl MemoryAssignmentRepository {
    /// Create an adapter over the shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AssignmentRepository for MemoryAssignmentRepository {
    async fn insert(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        lock(&self.store.assignments).insert(assignment.id(), assignment.clone());
        Ok(())
    }

    async fn update(&self, assignment: &Assignment) -> Result<(), AssignmentRepositoryError> {
        lock(&self.store.assignments).insert(assignment.id(), assignment.clone());
        Ok(())
    }

    async fn set_status(
        &self,
        assignment_id: Uuid,
        expected: AssignmentStatus,
        next: AssignmentStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        let mut rows = lock(&self.store.assignments);
        let Some(current) = rows.get(&assignment_id) else {
            return Ok(None);
        };
        if current.status() != expected {
            return Err(AssignmentRepositoryError::status_conflict(
                assignment_id,
                current.status(),
            ));
        }
        let updated = current.with_status(next, updated_at);
        rows.insert(assignment_id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, assignment_id: Uuid) -> Result<bool, AssignmentRepositoryError> {
        Ok(lock(&self.store.assignments).remove(&assignment_id).is_some())
    }

    async fn find_by_id(
        &self,
        assignment_id: Uuid,
    ) -> Result<Option<Assignment>, AssignmentRepositoryError> {
        Ok(lock(&self.store.assignments).get(&assignment_id).cloned())
    }

    async fn list(
        &self,
        filter: &AssignmentFilter,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let rows = lock(&self.store.assignments);
        let mut matching: Vec<Assignment> = rows
            .values()
            .filter(|assignment| {
                filter.status.is_none_or(|status| assignment.status() == status)
                    && filter.project_id.is_none_or(|id| assignment.project_id() == id)
                    && filter.resource_id.is_none_or(|id| assignment.resource_id() == id)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then(b.id().cmp(&a.id()))
        });
        Ok(paginate(matching, filter.limit, filter.offset))
    }

    async fn find_overlapping(
        &self,
        resource_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Assignment>, AssignmentRepositoryError> {
        let rows = lock(&self.store.assignments);
        Ok(rows
            .values()
            .filter(|assignment| {
                assignment.resource_id() == resource_id
                    && assignment.status().is_booking()
                    && assignment.overlaps(start_date, end_date)
            })
            .cloned()
            .collect())
    }

    async fn count_active_for_resource(
        &self,
        resource_id: Uuid,
    ) -> Result<i64, AssignmentRepositoryError> {
        let rows = lock(&self.store.assignments);
        let active = rows
            .values()
            .filter(|assignment| {
                assignment.resource_id() == resource_id
                    && assignment.status() == AssignmentStatus::Active
            })
            .count();
        Ok(i64::try_from(active).unwrap_or(i64::MAX))
    }

    async fn resources_with_active_assignments(
        &self,
    ) -> Result<Vec<Uuid>, AssignmentRepositoryError> {
        let rows = lock(&self.store.assignments);
        let mut ids: Vec<Uuid> = rows
            .values()
            .filter(|assignment| assignment.status() == AssignmentStatus::Active)
            .map(Assignment::resource_id)
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    async fn has_dependents(
        &self,
        assignment_id: Uuid,
    ) -> Result<bool, AssignmentRepositoryError> {
        let has_attendance = lock(&self.store.attendance)
            .values()
            .any(|record| record.assignment_id() == assignment_id);
        if has_attendance {
            return Ok(true);
        }
        Ok(lock(&self.store.expenses)
            .values()
            .any(|expense| expense.assignment_id() == assignment_id))
    }
}

/// In-memory attendance repository enforcing the ledger uniqueness rules.
#[derive(Clone)]
pub struct MemoryAttendanceRepository {
    store: Arc<MemoryStore>,
}

impl MemoryAttendanceRepository {
    /// Create an adapter over the shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AttendanceRepository for MemoryAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut rows = lock(&self.store.attendance);
        if record.is_open()
            && rows
                .values()
                .any(|existing| existing.assignment_id() == record.assignment_id() && existing.is_open())
        {
            return Err(AttendanceRepositoryError::open_session_exists(
                record.assignment_id(),
            ));
        }
        if rows.values().any(|existing| {
            existing.assignment_id() == record.assignment_id() && existing.date() == record.date()
        }) {
            return Err(AttendanceRepositoryError::duplicate_date(
                record.assignment_id(),
                record.date(),
            ));
        }
        rows.insert(record.id(), record.clone());
        Ok(())
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        lock(&self.store.attendance).insert(record.id(), record.clone());
        Ok(())
    }

    async fn find_open(
        &self,
        assignment_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        Ok(lock(&self.store.attendance)
            .values()
            .find(|record| record.assignment_id() == assignment_id && record.is_open())
            .cloned())
    }

    async fn find_by_date(
        &self,
        assignment_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        Ok(lock(&self.store.attendance)
            .values()
            .find(|record| record.assignment_id() == assignment_id && record.date() == date)
            .cloned())
    }

    async fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let resource_assignments: Option<Vec<Uuid>> = filter.resource_id.map(|resource_id| {
            lock(&self.store.assignments)
                .values()
                .filter(|assignment| assignment.resource_id() == resource_id)
                .map(Assignment::id)
                .collect()
        });
        let rows = lock(&self.store.attendance);
        let mut matching: Vec<AttendanceRecord> = rows
            .values()
            .filter(|record| {
                filter
                    .assignment_id
                    .is_none_or(|id| record.assignment_id() == id)
                    && resource_assignments
                        .as_ref()
                        .is_none_or(|ids| ids.contains(&record.assignment_id()))
                    && filter.from.is_none_or(|from| record.date() >= from)
                    && filter.to.is_none_or(|to| record.date() <= to)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date().cmp(&a.date()).then(b.id().cmp(&a.id())));
        Ok(paginate(matching, filter.limit, filter.offset))
    }

    async fn tally(
        &self,
        assignment_id: Uuid,
    ) -> Result<AttendanceTally, AttendanceRepositoryError> {
        let rows = lock(&self.store.attendance);
        let mut tally = AttendanceTally::default();
        for record in rows.values() {
            if record.assignment_id() == assignment_id {
                tally.interviews += i64::from(record.interviews_conducted());
                tally.days += 1;
            }
        }
        Ok(tally)
    }
}

/// In-memory expense repository with an idempotent approval stamp.
#[derive(Clone)]
pub struct MemoryExpenseRepository {
    store: Arc<MemoryStore>,
}

impl MemoryExpenseRepository {
    /// Create an adapter over the shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

fn with_approval(expense: &Expense, approval: Approval) -> Expense {
    let draft = ExpenseDraft {
        id: expense.id(),
        assignment_id: expense.assignment_id(),
        expense_type: expense.expense_type(),
        date: expense.date(),
        amount: expense.amount(),
        description: expense.description().to_owned(),
        receipt_ref: expense.receipt_ref().map(str::to_owned),
        approval: Some(approval),
        created_at: expense.created_at(),
    };
    match Expense::new(draft) {
        Ok(approved) => approved,
        Err(_) => panic!("stored expense must stay valid"),
    }
}

fn matches_filter(expense: &Expense, filter: &ExpenseFilter) -> bool {
    filter
        .assignment_id
        .is_none_or(|id| expense.assignment_id() == id)
        && filter
            .expense_type
            .is_none_or(|kind| expense.expense_type() == kind)
        && filter
            .approved
            .is_none_or(|approved| expense.is_approved() == approved)
        && filter.from.is_none_or(|from| expense.date() >= from)
        && filter.to.is_none_or(|to| expense.date() <= to)
}

#[async_trait]
impl ExpenseRepository for MemoryExpenseRepository {
    async fn insert(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        lock(&self.store.expenses).insert(expense.id(), expense.clone());
        Ok(())
    }

    async fn update(&self, expense: &Expense) -> Result<(), ExpenseRepositoryError> {
        lock(&self.store.expenses).insert(expense.id(), expense.clone());
        Ok(())
    }

    async fn delete(&self, expense_id: Uuid) -> Result<bool, ExpenseRepositoryError> {
        Ok(lock(&self.store.expenses).remove(&expense_id).is_some())
    }

    async fn find_by_id(
        &self,
        expense_id: Uuid,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        Ok(lock(&self.store.expenses).get(&expense_id).cloned())
    }

    async fn approve(
        &self,
        expense_id: Uuid,
        approved_by: ActorId,
        approved_at: DateTime<Utc>,
    ) -> Result<Option<Expense>, ExpenseRepositoryError> {
        let mut rows = lock(&self.store.expenses);
        let Some(current) = rows.get(&expense_id) else {
            return Ok(None);
        };
        if current.is_approved() {
            return Ok(Some(current.clone()));
        }
        let approved = with_approval(
            current,
            Approval {
                approved_by,
                approved_at,
            },
        );
        rows.insert(expense_id, approved.clone());
        Ok(Some(approved))
    }

    async fn list(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, ExpenseRepositoryError> {
        let rows = lock(&self.store.expenses);
        let mut matching: Vec<Expense> = rows
            .values()
            .filter(|expense| matches_filter(expense, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.date().cmp(&a.date()).then(b.id().cmp(&a.id())));
        Ok(paginate(matching, filter.limit, filter.offset))
    }

    async fn aggregate(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<ExpenseTotals, ExpenseRepositoryError> {
        let rows = lock(&self.store.expenses);
        let mut totals = ExpenseTotals::default();
        for expense in rows.values().filter(|expense| matches_filter(expense, filter)) {
            totals.total += expense.amount();
            if expense.is_approved() {
                totals.approved += expense.amount();
            } else {
                totals.pending += expense.amount();
            }
            totals.count += 1;
        }
        Ok(totals)
    }
}

/// In-memory resource availability projection.
#[derive(Clone)]
pub struct MemoryResourceRepository {
    store: Arc<MemoryStore>,
}

impl MemoryResourceRepository {
    /// Create an adapter over the shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ResourceRepository for MemoryResourceRepository {
    async fn get_availability(
        &self,
        resource_id: Uuid,
    ) -> Result<Option<bool>, ResourceRepositoryError> {
        Ok(lock(&self.store.availability).get(&resource_id).copied())
    }

    async fn set_availability(
        &self,
        resource_id: Uuid,
        available: bool,
        _updated_at: DateTime<Utc>,
    ) -> Result<(), ResourceRepositoryError> {
        lock(&self.store.availability).insert(resource_id, available);
        Ok(())
    }

    async fn list_tracked_resources(&self) -> Result<Vec<Uuid>, ResourceRepositoryError> {
        let mut ids: Vec<Uuid> = lock(&self.store.availability).keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
