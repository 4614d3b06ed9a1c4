//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.
//!
//! # Maintenance
//!
//! When migrations change the schema, this file should be regenerated or
//! manually updated to reflect those changes. The `diesel print-schema`
//! command can generate these definitions from a live database.

diesel::table! {
    /// Assignment ledger table.
    ///
    /// One row per bounded-time commitment of a field resource to a project.
    /// Lifecycle state is stored as its lowercase wire name; transitions are
    /// written with a compare-and-set on the previous state.
    assignments (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Project the resource is committed to.
        project_id -> Uuid,
        /// Field resource being committed.
        resource_id -> Uuid,
        /// Lifecycle state (`pending`, `active`, `completed`, `cancelled`).
        status -> Varchar,
        /// First day of the commitment.
        start_date -> Date,
        /// Last day of the commitment (inclusive).
        end_date -> Date,
        /// Free-text district names covered by the assignment.
        assigned_districts -> Array<Text>,
        /// Free-text village names covered by the assignment.
        assigned_villages -> Array<Text>,
        /// Advisory interview target.
        target_interviews -> Int4,
        /// Planned working days.
        total_days -> Int4,
        /// Optional daily pay rate.
        daily_rate -> Nullable<Numeric>,
        /// Operator instructions handed to the resource.
        instructions -> Nullable<Text>,
        /// Free-form notes, editable in every state.
        notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Attendance ledger table: one row per assignment working day.
    ///
    /// Two uniqueness rules back the check-in contract: a plain unique
    /// constraint on `(assignment_id, date)` and a partial unique index on
    /// `assignment_id` where `check_in_time` is set and `check_out_time`
    /// is not (the "open session" index). Racing check-ins lose on one of
    /// the two.
    attendance_records (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning assignment.
        assignment_id -> Uuid,
        /// Working day the record covers.
        date -> Date,
        /// Check-in instant, absent for skeleton manual entries.
        check_in_time -> Nullable<Timestamptz>,
        /// Free-text check-in place description.
        check_in_location -> Nullable<Text>,
        /// Check-in latitude, stored exactly as reported.
        check_in_lat -> Nullable<Float8>,
        /// Check-in longitude, stored exactly as reported.
        check_in_lng -> Nullable<Float8>,
        /// Check-out instant, present only after checkout.
        check_out_time -> Nullable<Timestamptz>,
        /// Free-text check-out place description.
        check_out_location -> Nullable<Text>,
        /// Check-out latitude.
        check_out_lat -> Nullable<Float8>,
        /// Check-out longitude.
        check_out_lng -> Nullable<Float8>,
        /// Interviews tallied for the day.
        interviews_conducted -> Int4,
        /// Free-text villages visited.
        villages_visited -> Array<Text>,
        /// Distance travelled during the day, if recorded.
        travel_distance_km -> Nullable<Numeric>,
        /// Free-form notes.
        notes -> Nullable<Text>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(attendance_records -> assignments (assignment_id));

diesel::table! {
    /// Expense ledger table: one row per cost claim.
    ///
    /// Approval is the nullable `(approved_by, approved_at)` pair; the two
    /// columns are always set together by a filtered update so the stamp is
    /// written at most once.
    expenses (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning assignment.
        assignment_id -> Uuid,
        /// Cost category as its lowercase wire name.
        expense_type -> Varchar,
        /// Day the cost was incurred.
        date -> Date,
        /// Claimed amount.
        amount -> Numeric,
        /// What the money was spent on.
        description -> Text,
        /// Optional attachment reference for the receipt.
        receipt_ref -> Nullable<Varchar>,
        /// Approving operator, null while pending.
        approved_by -> Nullable<Uuid>,
        /// Approval instant, null while pending.
        approved_at -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Local projection of field-resource availability.
    ///
    /// The resource entity lives in an external directory; this table holds
    /// only the availability flag owned by the operations ledger. A resource
    /// without a row is treated as available.
    field_resources (resource_id) {
        /// Primary key: the external directory's resource identifier.
        resource_id -> Uuid,
        /// Whether the resource can accept new bookings.
        available -> Bool,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(expenses -> assignments (assignment_id));

diesel::allow_tables_to_appear_in_same_query!(
    assignments,
    attendance_records,
    expenses,
    field_resources,
);
