use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use mockall::predicate;
use slotwise_core::{
    clock::Clock,
    errors::BookingError,
    models::slot::{SlotSet, TimeRange},
    scheduling::{self, conflicts::annotate_slots, slots::generate_day_slots},
};
use slotwise_db::models::{DbAppointment, DbBlackoutPeriod, DbDayHours, DbProvider};
use uuid::Uuid;

use crate::test_utils::TestContext;
use slotwise_api::middleware::error_handling::AppError;

// Mirrors the handler's slot assembly against the mock repositories: template
// row, candidate generation, then conflict annotation over the day's span.
async fn assemble_day_slots_wrapper(
    ctx: &TestContext,
    provider: &DbProvider,
    service_minutes: u32,
    date: NaiveDate,
    slot_minutes: u32,
) -> Result<SlotSet, AppError> {
    let tz = scheduling::resolve_timezone(&provider.timezone)?;
    let day_of_week = date.weekday().num_days_from_sunday() as i16;

    let hours = ctx
        .availability_repo
        .get_day_hours(provider.id, day_of_week)
        .await?;

    let Some(hours) = hours else {
        return Ok(SlotSet::empty(
            provider.id,
            date,
            &provider.timezone,
            slot_minutes,
        ));
    };

    let now = ctx.clock.now();
    let candidates = generate_day_slots(&hours.into_day_hours(), date, tz, slot_minutes, now);

    let (span_start, span_end) = match (candidates.first(), candidates.last()) {
        (Some(first), Some(last)) => (first.start_time, last.end_time),
        _ => {
            return Ok(SlotSet::empty(
                provider.id,
                date,
                &provider.timezone,
                slot_minutes,
            ));
        }
    };

    let appointments: Vec<TimeRange> = ctx
        .appointment_repo
        .list_blocking_between(provider.id, span_start, span_end)
        .await?
        .into_iter()
        .map(|row| TimeRange::new(row.start_time, row.end_time))
        .collect();

    let blackouts: Vec<TimeRange> = ctx
        .blackout_repo
        .list_blackouts_between(provider.id, span_start, span_end)
        .await?
        .into_iter()
        .map(|row| TimeRange::new(row.start_time, row.end_time))
        .collect();

    Ok(annotate_slots(
        provider.id,
        date,
        &provider.timezone,
        slot_minutes,
        candidates,
        &appointments,
        &blackouts,
        service_minutes,
    ))
}

fn test_provider(timezone: &str) -> DbProvider {
    DbProvider {
        id: Uuid::new_v4(),
        display_name: "Dr. Alvarez".to_string(),
        timezone: timezone.to_string(),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn hours_row(provider_id: Uuid, day_of_week: i16, start: (u32, u32), end: (u32, u32)) -> DbDayHours {
    DbDayHours {
        provider_id,
        day_of_week,
        start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        is_available: true,
    }
}

fn blocking_row(provider_id: Uuid, start: chrono::DateTime<Utc>, end: chrono::DateTime<Utc>) -> DbAppointment {
    DbAppointment {
        id: Uuid::new_v4(),
        client_id: Uuid::new_v4(),
        provider_id,
        service_id: Uuid::new_v4(),
        start_time: start,
        end_time: end,
        timezone: "America/New_York".to_string(),
        status: "scheduled".to_string(),
        cancellation_reason: None,
        created_at: Utc::now(),
    }
}

// Monday in the pinned test clock's week
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

#[tokio::test]
async fn test_closed_day_yields_empty_set_without_conflict_lookups() {
    let mut ctx = TestContext::new();
    let provider = test_provider("America/New_York");
    let provider_id = provider.id;

    // No template row for Monday; the conflict repositories must not be hit
    ctx.availability_repo
        .expect_get_day_hours()
        .with(predicate::eq(provider_id), predicate::eq(1))
        .times(1)
        .returning(|_, _| Ok(None));

    let set = assemble_day_slots_wrapper(&ctx, &provider, 30, monday(), 15)
        .await
        .expect("assembly failed");

    assert_eq!(set.provider_id, provider_id);
    assert_eq!(set.date, monday());
    assert_eq!(set.total, 0);
    assert_eq!(set.available, 0);
    assert!(set.slots.is_empty());
}

#[tokio::test]
async fn test_booked_window_marks_overlapping_slots() {
    let mut ctx = TestContext::new();
    let provider = test_provider("America/New_York");
    let provider_id = provider.id;

    // 09:00-11:00 local on an EDT day: 13:00Z through 15:00Z
    ctx.availability_repo
        .expect_get_day_hours()
        .times(1)
        .returning(move |_, _| Ok(Some(hours_row(provider_id, 1, (9, 0), (11, 0)))));

    let span_start = Utc.with_ymd_and_hms(2024, 6, 3, 13, 0, 0).unwrap();
    let span_end = Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap();
    let booked_start = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
    let booked_end = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();

    ctx.appointment_repo
        .expect_list_blocking_between()
        .withf(move |id, from, to| *id == provider_id && *from == span_start && *to == span_end)
        .times(1)
        .returning(move |id, _, _| Ok(vec![blocking_row(id, booked_start, booked_end)]));

    ctx.blackout_repo
        .expect_list_blackouts_between()
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));

    let set = assemble_day_slots_wrapper(&ctx, &provider, 15, monday(), 15)
        .await
        .expect("assembly failed");

    // Eight 15-minute slots; the 09:30 and 09:45 slots sit under the booking
    assert_eq!(set.total, 8);
    assert_eq!(set.booked, 2);
    assert_eq!(set.available, 6);
    assert!(!set.slot_at("09:30").unwrap().is_available);
    assert!(set.slot_at("09:30").unwrap().is_booked);
    assert!(!set.slot_at("09:45").unwrap().is_available);
    assert!(set.slot_at("10:00").unwrap().is_available);
}

#[tokio::test]
async fn test_blackout_marks_slots_outside_hours() {
    let mut ctx = TestContext::new();
    let provider = test_provider("America/New_York");
    let provider_id = provider.id;

    ctx.availability_repo
        .expect_get_day_hours()
        .times(1)
        .returning(move |_, _| Ok(Some(hours_row(provider_id, 1, (9, 0), (11, 0)))));

    ctx.appointment_repo
        .expect_list_blocking_between()
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));

    // 10:00-10:30 local
    let blackout_start = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
    let blackout_end = Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap();
    ctx.blackout_repo
        .expect_list_blackouts_between()
        .times(1)
        .returning(move |id, _, _| {
            Ok(vec![DbBlackoutPeriod {
                id: Uuid::new_v4(),
                provider_id: id,
                start_time: blackout_start,
                end_time: blackout_end,
                reason: Some("lunch".to_string()),
                origin: "provider".to_string(),
                created_at: Utc::now(),
            }])
        });

    let set = assemble_day_slots_wrapper(&ctx, &provider, 15, monday(), 15)
        .await
        .expect("assembly failed");

    assert_eq!(set.total, 8);
    assert_eq!(set.outside_hours, 2);
    assert_eq!(set.booked, 0);
    assert_eq!(set.available, 6);
    assert!(set.slot_at("10:00").unwrap().is_outside_hours);
    assert!(set.slot_at("10:15").unwrap().is_outside_hours);
}

#[tokio::test]
async fn test_longer_service_needs_a_free_run() {
    let mut ctx = TestContext::new();
    let provider = test_provider("America/New_York");
    let provider_id = provider.id;

    ctx.availability_repo
        .expect_get_day_hours()
        .times(1)
        .returning(move |_, _| Ok(Some(hours_row(provider_id, 1, (9, 0), (11, 0)))));
    ctx.appointment_repo
        .expect_list_blocking_between()
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));
    ctx.blackout_repo
        .expect_list_blackouts_between()
        .times(1)
        .returning(|_, _, _| Ok(Vec::new()));

    // 30-minute service on a 15-minute grid: the final candidate has no
    // successor and cannot start a run
    let set = assemble_day_slots_wrapper(&ctx, &provider, 30, monday(), 15)
        .await
        .expect("assembly failed");

    assert_eq!(set.total, 8);
    assert_eq!(set.available, 7);
    assert!(!set.slot_at("10:45").unwrap().is_available);
    assert!(!set.slot_at("10:45").unwrap().is_booked);
}

#[tokio::test]
async fn test_repeated_query_returns_identical_sets() {
    let mut ctx = TestContext::new();
    let provider = test_provider("America/New_York");
    let provider_id = provider.id;

    // Each pass performs its own three lookups
    ctx.availability_repo
        .expect_get_day_hours()
        .times(2)
        .returning(move |_, _| Ok(Some(hours_row(provider_id, 1, (9, 0), (11, 0)))));

    let booked_start = Utc.with_ymd_and_hms(2024, 6, 3, 13, 30, 0).unwrap();
    let booked_end = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
    ctx.appointment_repo
        .expect_list_blocking_between()
        .times(2)
        .returning(move |id, _, _| Ok(vec![blocking_row(id, booked_start, booked_end)]));

    ctx.blackout_repo
        .expect_list_blackouts_between()
        .times(2)
        .returning(|_, _, _| Ok(Vec::new()));

    let first = assemble_day_slots_wrapper(&ctx, &provider, 15, monday(), 15)
        .await
        .expect("first assembly failed");
    let second = assemble_day_slots_wrapper(&ctx, &provider, 15, monday(), 15)
        .await
        .expect("second assembly failed");

    // The mock mints fresh row ids on every read; the sets only carry the
    // booked ranges, so the two passes must agree on every slot
    assert_eq!(first.total, 8);
    assert_eq!(first.booked, 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unresolvable_timezone_is_rejected_before_any_lookup() {
    let ctx = TestContext::new();
    let provider = test_provider("America/Nowhere");

    let result = assemble_day_slots_wrapper(&ctx, &provider, 15, monday(), 15).await;

    match result.unwrap_err().0 {
        BookingError::TimezoneResolution(message) => {
            assert!(message.contains("America/Nowhere"));
        }
        e => panic!("Expected TimezoneResolution error, got: {:?}", e),
    }
}
