//! PostgreSQL-backed `AttendanceRepository` implementation using Diesel ORM.
//!
//! The two ledger uniqueness rules are enforced by the database: a unique
//! constraint on `(assignment_id, date)` and a partial unique index on the
//! open-session shape. Violations are mapped back to the dedicated port
//! error variants by constraint name, so racing check-ins surface as domain
//! conflicts rather than opaque database errors.

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    AttendanceFilter, AttendanceRepository, AttendanceRepositoryError, AttendanceTally,
};
use crate::domain::{AttendanceDraft, AttendanceRecord, GeoPoint, SessionMark};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AttendanceRow, AttendanceUpdate, NewAttendanceRow};
use super::pool::{DbPool, PoolError};
use super::schema::{assignments, attendance_records};

/// Unique constraint backing the one-record-per-day rule.
const DATE_CONSTRAINT: &str = "attendance_records_assignment_id_date_key";

/// Partial unique index backing the single-open-session rule.
const OPEN_SESSION_INDEX: &str = "attendance_records_open_session_idx";

/// Diesel-backed implementation of the attendance repository port.
#[derive(Clone)]
pub struct DieselAttendanceRepository {
    pool: DbPool,
}

impl DieselAttendanceRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> AttendanceRepositoryError {
    map_basic_pool_error(error, |message| {
        AttendanceRepositoryError::connection(message)
    })
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> AttendanceRepositoryError {
    map_basic_diesel_error(
        error,
        AttendanceRepositoryError::query,
        AttendanceRepositoryError::connection,
    )
}

/// Map insert failures, folding unique violations into the ledger rules.
fn map_insert_error(
    error: diesel::result::Error,
    assignment_id: Uuid,
    date: NaiveDate,
) -> AttendanceRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) = &error {
        return match info.constraint_name() {
            Some(OPEN_SESSION_INDEX) => {
                AttendanceRepositoryError::open_session_exists(assignment_id)
            }
            Some(DATE_CONSTRAINT) => {
                AttendanceRepositoryError::duplicate_date(assignment_id, date)
            }
            _ => AttendanceRepositoryError::query("unexpected unique violation"),
        };
    }
    map_diesel_error(error)
}

type MarkColumns<'a> = (
    Option<chrono::DateTime<chrono::Utc>>,
    Option<&'a str>,
    Option<f64>,
    Option<f64>,
);

/// Split an optional session mark into its column representation.
fn mark_columns(mark: Option<&SessionMark>) -> MarkColumns<'_> {
    match mark {
        None => (None, None, None, None),
        Some(mark) => (
            Some(mark.time),
            mark.location.as_deref(),
            mark.coordinates.map(|point| point.lat),
            mark.coordinates.map(|point| point.lng),
        ),
    }
}

/// Rebuild a session mark from its column representation.
fn columns_to_mark(
    time: Option<chrono::DateTime<chrono::Utc>>,
    location: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Option<SessionMark> {
    time.map(|time| SessionMark {
        time,
        location,
        coordinates: lat.zip(lng).map(|(lat, lng)| GeoPoint { lat, lng }),
    })
}

/// Convert a database row into a validated domain attendance record.
fn row_to_record(row: AttendanceRow) -> Result<AttendanceRecord, AttendanceRepositoryError> {
    let AttendanceRow {
        id,
        assignment_id,
        date,
        check_in_time,
        check_in_location,
        check_in_lat,
        check_in_lng,
        check_out_time,
        check_out_location,
        check_out_lat,
        check_out_lng,
        interviews_conducted,
        villages_visited,
        travel_distance_km,
        notes,
        created_at,
        updated_at,
    } = row;

    let check_in = columns_to_mark(check_in_time, check_in_location, check_in_lat, check_in_lng);
    let check_out = columns_to_mark(
        check_out_time,
        check_out_location,
        check_out_lat,
        check_out_lng,
    );

    AttendanceRecord::new(AttendanceDraft {
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
    .map_err(|err| AttendanceRepositoryError::query(err.to_string()))
}

#[async_trait]
impl AttendanceRepository for DieselAttendanceRepository {
    async fn insert(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (check_in_time, check_in_location, check_in_lat, check_in_lng) =
            mark_columns(record.check_in());
        let (check_out_time, check_out_location, check_out_lat, check_out_lng) =
            mark_columns(record.check_out());

        let new_row = NewAttendanceRow {
            id: record.id(),
            assignment_id: record.assignment_id(),
            date: record.date(),
            check_in_time,
            check_in_location,
            check_in_lat,
            check_in_lng,
            check_out_time,
            check_out_location,
            check_out_lat,
            check_out_lng,
            interviews_conducted: record.interviews_conducted(),
            villages_visited: record.villages_visited(),
            travel_distance_km: record.travel_distance_km(),
            notes: record.notes(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        };

        diesel::insert_into(attendance_records::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_insert_error(err, record.assignment_id(), record.date()))
    }

    async fn update(&self, record: &AttendanceRecord) -> Result<(), AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (check_in_time, check_in_location, check_in_lat, check_in_lng) =
            mark_columns(record.check_in());
        let (check_out_time, check_out_location, check_out_lat, check_out_lng) =
            mark_columns(record.check_out());

        let changeset = AttendanceUpdate {
            check_in_time,
            check_in_location,
            check_in_lat,
            check_in_lng,
            check_out_time,
            check_out_location,
            check_out_lat,
            check_out_lng,
            interviews_conducted: record.interviews_conducted(),
            villages_visited: record.villages_visited(),
            travel_distance_km: record.travel_distance_km(),
            notes: record.notes(),
            updated_at: record.updated_at(),
        };

        diesel::update(attendance_records::table.filter(attendance_records::id.eq(record.id())))
            .set(&changeset)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_open(
        &self,
        assignment_id: Uuid,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = attendance_records::table
            .filter(
                attendance_records::assignment_id
                    .eq(assignment_id)
                    .and(attendance_records::check_in_time.is_not_null())
                    .and(attendance_records::check_out_time.is_null()),
            )
            .select(AttendanceRow::as_select())
            .first::<AttendanceRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn find_by_date(
        &self,
        assignment_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = attendance_records::table
            .filter(
                attendance_records::assignment_id
                    .eq(assignment_id)
                    .and(attendance_records::date.eq(date)),
            )
            .select(AttendanceRow::as_select())
            .first::<AttendanceRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = attendance_records::table.into_boxed();
        if let Some(assignment_id) = filter.assignment_id {
            query = query.filter(attendance_records::assignment_id.eq(assignment_id));
        }
        if let Some(resource_id) = filter.resource_id {
            query = query.filter(
                attendance_records::assignment_id.eq_any(
                    assignments::table
                        .filter(assignments::resource_id.eq(resource_id))
                        .select(assignments::id),
                ),
            );
        }
        if let Some(from) = filter.from {
            query = query.filter(attendance_records::date.ge(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(attendance_records::date.le(to));
        }

        let rows: Vec<AttendanceRow> = query
            .order((attendance_records::date.desc(), attendance_records::id.desc()))
            .limit(filter.limit)
            .offset(filter.offset)
            .select(AttendanceRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_record).collect()
    }

    async fn tally(
        &self,
        assignment_id: Uuid,
    ) -> Result<AttendanceTally, AttendanceRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let (interviews, days): (Option<i64>, i64) = attendance_records::table
            .filter(attendance_records::assignment_id.eq(assignment_id))
            .select((
                diesel::dsl::sum(attendance_records::interviews_conducted),
                diesel::dsl::count_star(),
            ))
            .first(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(AttendanceTally {
            interviews: interviews.unwrap_or(0),
            days,
        })
    }
}
