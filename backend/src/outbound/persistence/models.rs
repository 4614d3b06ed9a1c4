//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{assignments, attendance_records, expenses, field_resources};

// ---------------------------------------------------------------------------
// Assignment models
// ---------------------------------------------------------------------------

/// Row struct for reading from the assignments table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AssignmentRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub resource_id: Uuid,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assigned_districts: Vec<String>,
    pub assigned_villages: Vec<String>,
    pub target_interviews: i32,
    pub total_days: i32,
    pub daily_rate: Option<Decimal>,
    pub instructions: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating assignment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignments)]
pub(crate) struct NewAssignmentRow<'a> {
    pub id: Uuid,
    pub project_id: Uuid,
    pub resource_id: Uuid,
    pub status: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assigned_districts: &'a [String],
    pub assigned_villages: &'a [String],
    pub target_interviews: i32,
    pub total_days: i32,
    pub daily_rate: Option<Decimal>,
    pub instructions: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for overwriting assignment records.
///
/// Every column is set unconditionally; partial-update semantics are the
/// domain's concern and arrive here as a fully merged entity.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssignmentUpdate<'a> {
    pub status: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub assigned_districts: &'a [String],
    pub assigned_villages: &'a [String],
    pub target_interviews: i32,
    pub total_days: i32,
    pub daily_rate: Option<Decimal>,
    pub instructions: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Attendance models
// ---------------------------------------------------------------------------

/// Row struct for reading from the attendance_records table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attendance_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttendanceRow {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_in_location: Option<String>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_out_location: Option<String>,
    pub check_out_lat: Option<f64>,
    pub check_out_lng: Option<f64>,
    pub interviews_conducted: i32,
    pub villages_visited: Vec<String>,
    pub travel_distance_km: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating attendance records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = attendance_records)]
pub(crate) struct NewAttendanceRow<'a> {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub date: NaiveDate,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_in_location: Option<&'a str>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_out_location: Option<&'a str>,
    pub check_out_lat: Option<f64>,
    pub check_out_lng: Option<f64>,
    pub interviews_conducted: i32,
    pub villages_visited: &'a [String],
    pub travel_distance_km: Option<Decimal>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changeset struct for overwriting attendance records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = attendance_records)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AttendanceUpdate<'a> {
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_in_location: Option<&'a str>,
    pub check_in_lat: Option<f64>,
    pub check_in_lng: Option<f64>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub check_out_location: Option<&'a str>,
    pub check_out_lat: Option<f64>,
    pub check_out_lng: Option<f64>,
    pub interviews_conducted: i32,
    pub villages_visited: &'a [String],
    pub travel_distance_km: Option<Decimal>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Expense models
// ---------------------------------------------------------------------------

/// Row struct for reading from the expenses table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = expenses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ExpenseRow {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub expense_type: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    pub receipt_ref: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating expense records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = expenses)]
pub(crate) struct NewExpenseRow<'a> {
    pub id: Uuid,
    pub assignment_id: Uuid,
    pub expense_type: &'a str,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: &'a str,
    pub receipt_ref: Option<&'a str>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Changeset struct for overwriting the editable expense columns.
///
/// Approval columns are deliberately absent: the stamp is written only by
/// the filtered approval update, never by a field edit.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = expenses)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ExpenseUpdate<'a> {
    pub expense_type: &'a str,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: &'a str,
    pub receipt_ref: Option<&'a str>,
}

// ---------------------------------------------------------------------------
// Field resource models
// ---------------------------------------------------------------------------

/// Row struct for reading from the field_resources table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = field_resources)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FieldResourceRow {
    pub resource_id: Uuid,
    pub available: bool,
    #[expect(dead_code, reason = "schema field read for audit tooling only")]
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for upserting availability flags.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = field_resources)]
pub(crate) struct NewFieldResourceRow {
    pub resource_id: Uuid,
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}
