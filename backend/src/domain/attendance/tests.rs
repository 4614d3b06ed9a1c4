//! Regression coverage for the attendance aggregate.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;

fn sample_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date")
}

fn open_draft() -> AttendanceDraft {
    let now = Utc::now();
    AttendanceDraft {
        id: Uuid::new_v4(),
        assignment_id: Uuid::new_v4(),
        date: sample_date(),
        check_in: Some(SessionMark {
            time: now,
            location: Some("Village X".to_owned()),
            coordinates: Some(GeoPoint {
                lat: -13.98,
                lng: 33.78,
            }),
        }),
        check_out: None,
        interviews_conducted: 0,
        villages_visited: Vec::new(),
        travel_distance_km: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn open_session_is_open() {
    let record = AttendanceRecord::new(open_draft()).expect("valid record");
    assert!(record.is_open());
}

#[test]
fn close_fills_out_fields() {
    let record = AttendanceRecord::new(open_draft()).expect("valid record");
    let check_in_time = record.check_in().expect("check-in present").time;
    let closed = record
        .close(
            SessionMark {
                time: check_in_time + Duration::hours(8),
                location: Some("Village Y".to_owned()),
                coordinates: None,
            },
            4,
            Some(vec!["Village Y".to_owned()]),
            Some("rains in the afternoon".to_owned()),
            Utc::now(),
        )
        .expect("close succeeds");
    assert!(!closed.is_open());
    assert_eq!(closed.interviews_conducted(), 4);
    assert_eq!(closed.villages_visited(), ["Village Y".to_owned()]);
}

#[test]
fn close_rejects_checkout_before_checkin() {
    let record = AttendanceRecord::new(open_draft()).expect("valid record");
    let check_in_time = record.check_in().expect("check-in present").time;
    let err = record
        .close(
            SessionMark {
                time: check_in_time - Duration::minutes(5),
                location: None,
                coordinates: None,
            },
            0,
            None,
            None,
            Utc::now(),
        )
        .expect_err("out before in");
    assert_eq!(err, AttendanceValidationError::CheckOutBeforeCheckIn);
}

#[test]
fn rejects_checkout_without_checkin() {
    let mut draft = open_draft();
    draft.check_out = draft.check_in.take();
    let err = AttendanceRecord::new(draft).expect_err("orphan checkout");
    assert_eq!(err, AttendanceValidationError::CheckOutWithoutCheckIn);
}

#[test]
fn rejects_negative_interviews() {
    let mut draft = open_draft();
    draft.interviews_conducted = -1;
    let err = AttendanceRecord::new(draft).expect_err("negative tally");
    assert!(matches!(
        err,
        AttendanceValidationError::NegativeInterviews { value: -1 }
    ));
}

#[test]
fn rejects_negative_travel_distance() {
    let mut draft = open_draft();
    draft.travel_distance_km = Some(Decimal::new(-5, 1));
    let err = AttendanceRecord::new(draft).expect_err("negative distance");
    assert!(matches!(
        err,
        AttendanceValidationError::NegativeTravelDistance { .. }
    ));
}

#[test]
fn implausible_coordinates_are_stored_as_is() {
    let mut draft = open_draft();
    draft.check_in = Some(SessionMark {
        time: Utc::now(),
        location: None,
        coordinates: Some(GeoPoint {
            lat: 9999.0,
            lng: -9999.0,
        }),
    });
    let record = AttendanceRecord::new(draft).expect("coordinates are never bounds-checked");
    let point = record
        .check_in()
        .and_then(|mark| mark.coordinates)
        .expect("coordinates kept");
    assert_eq!(point.lat, 9999.0);
}

#[test]
fn manual_entry_without_marks_is_valid() {
    let mut draft = open_draft();
    draft.check_in = None;
    draft.interviews_conducted = 7;
    let record = AttendanceRecord::new(draft).expect("bare tally record");
    assert!(!record.is_open());
}
