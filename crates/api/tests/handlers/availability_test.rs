use axum::http::StatusCode;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use mockall::predicate;
use slotwise_core::{
    errors::BookingError,
    models::availability::{DayHours, WeeklyHoursResponse},
    models::blackout::{BlackoutOrigin, BlackoutPeriod},
    models::policy::BookingPolicy,
};
use slotwise_db::models::{DbBlackoutPeriod, DbBookingPolicy, DbDayHours, DbProvider};
use uuid::Uuid;

use crate::test_utils::TestContext;
use slotwise_api::middleware::error_handling::AppError;

fn test_provider() -> DbProvider {
    DbProvider {
        id: Uuid::new_v4(),
        display_name: "Dr. Alvarez".to_string(),
        timezone: "America/New_York".to_string(),
        is_active: true,
        created_at: Utc::now(),
    }
}

fn expect_provider(ctx: &mut TestContext, provider: &DbProvider) {
    let clone = provider.clone();
    ctx.provider_repo
        .expect_get_provider_by_id()
        .with(predicate::eq(provider.id))
        .times(1)
        .returning(move |_| Ok(Some(clone.clone())));
}

fn week_with(mutate: impl FnOnce(&mut Vec<DayHours>)) -> Vec<DayHours> {
    let mut days = DayHours::default_week();
    mutate(&mut days);
    days
}

fn blackout_row(provider_id: Uuid, origin: &str) -> DbBlackoutPeriod {
    DbBlackoutPeriod {
        id: Uuid::new_v4(),
        provider_id,
        start_time: Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap(),
        reason: Some("dentist".to_string()),
        origin: origin.to_string(),
        created_at: Utc::now(),
    }
}

// Mirrors the weekly hours replacement handler: provider lookup, the
// complete-week validation ladder, then the transactional swap.
async fn replace_weekly_hours_wrapper(
    ctx: &TestContext,
    provider_id: Uuid,
    days: Vec<DayHours>,
) -> Result<WeeklyHoursResponse, AppError> {
    let provider = ctx
        .provider_repo
        .get_provider_by_id(provider_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Provider with ID {} not found", provider_id))
        })?;

    if days.len() != 7 {
        return Err(AppError(BookingError::Validation(format!(
            "weekly hours must cover exactly 7 days, got {}",
            days.len()
        ))));
    }

    let mut seen = [false; 7];
    for day in &days {
        let index = usize::try_from(day.day_of_week)
            .ok()
            .filter(|i| *i < 7)
            .ok_or_else(|| {
                BookingError::Validation(format!(
                    "day_of_week must be between 0 and 6, got {}",
                    day.day_of_week
                ))
            })?;
        if seen[index] {
            return Err(AppError(BookingError::Validation(format!(
                "day_of_week {} appears more than once",
                day.day_of_week
            ))));
        }
        seen[index] = true;

        if day.start_time >= day.end_time {
            return Err(AppError(BookingError::Validation(format!(
                "start_time must be before end_time on day {}",
                day.day_of_week
            ))));
        }
    }

    let stored = ctx
        .availability_repo
        .replace_weekly_hours(provider.id, days)
        .await?;

    Ok(WeeklyHoursResponse {
        provider_id: provider.id,
        days: stored.into_iter().map(|day| day.into_day_hours()).collect(),
    })
}

async fn effective_policy_wrapper(
    ctx: &TestContext,
    provider_id: Uuid,
) -> Result<BookingPolicy, AppError> {
    let provider = ctx
        .provider_repo
        .get_provider_by_id(provider_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Provider with ID {} not found", provider_id))
        })?;

    let policy = ctx
        .policy_repo
        .get_policy(provider.id)
        .await?
        .map(|row| row.into_policy())
        .unwrap_or_else(|| BookingPolicy::defaults_for(provider.id));

    Ok(policy)
}

async fn upsert_policy_wrapper(
    ctx: &TestContext,
    provider_id: Uuid,
    is_active: bool,
    max_daily_appointments: i32,
    buffer_minutes: i32,
) -> Result<BookingPolicy, AppError> {
    let provider = ctx
        .provider_repo
        .get_provider_by_id(provider_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Provider with ID {} not found", provider_id))
        })?;

    if max_daily_appointments < 1 {
        return Err(AppError(BookingError::Validation(format!(
            "max_daily_appointments must be at least 1, got {}",
            max_daily_appointments
        ))));
    }
    if buffer_minutes < 0 {
        return Err(AppError(BookingError::Validation(format!(
            "buffer_minutes must not be negative, got {}",
            buffer_minutes
        ))));
    }

    let policy = ctx
        .policy_repo
        .upsert_policy(provider.id, is_active, max_daily_appointments, buffer_minutes)
        .await?;

    Ok(policy.into_policy())
}

async fn create_blackout_wrapper(
    ctx: &TestContext,
    provider_id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    reason: Option<&'static str>,
) -> Result<BlackoutPeriod, AppError> {
    let provider = ctx
        .provider_repo
        .get_provider_by_id(provider_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Provider with ID {} not found", provider_id))
        })?;

    if start_time >= end_time {
        return Err(AppError(BookingError::Validation(
            "start_time must be before end_time".to_string(),
        )));
    }

    let row = ctx
        .blackout_repo
        .create_blackout(
            provider.id,
            start_time,
            end_time,
            reason,
            BlackoutOrigin::Provider,
        )
        .await?;

    Ok(row.into_blackout()?)
}

async fn delete_blackout_wrapper(
    ctx: &TestContext,
    provider_id: Uuid,
    blackout_id: Uuid,
) -> Result<StatusCode, AppError> {
    let provider = ctx
        .provider_repo
        .get_provider_by_id(provider_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Provider with ID {} not found", provider_id))
        })?;

    let row = ctx
        .blackout_repo
        .get_blackout_by_id(blackout_id)
        .await?
        .ok_or_else(|| {
            BookingError::NotFound(format!("Blackout with ID {} not found", blackout_id))
        })?;

    if row.provider_id != provider.id {
        return Err(AppError(BookingError::NotFound(format!(
            "Blackout with ID {} not found for provider {}",
            blackout_id, provider.id
        ))));
    }

    let blackout = row.into_blackout()?;
    if blackout.origin == BlackoutOrigin::System {
        return Err(AppError(BookingError::PolicyViolation(format!(
            "Blackout {} is a system buffer and cannot be deleted",
            blackout_id
        ))));
    }

    ctx.blackout_repo.delete_blackout(blackout_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[tokio::test]
async fn test_replace_hours_unknown_provider() {
    let mut ctx = TestContext::new();
    let provider_id = Uuid::new_v4();

    ctx.provider_repo
        .expect_get_provider_by_id()
        .with(predicate::eq(provider_id))
        .times(1)
        .returning(|_| Ok(None));

    let result = replace_weekly_hours_wrapper(&ctx, provider_id, DayHours::default_week()).await;

    match result.unwrap_err().0 {
        BookingError::NotFound(_) => {}
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_replace_hours_requires_seven_days() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let days = week_with(|days| {
        days.pop();
    });
    let result = replace_weekly_hours_wrapper(&ctx, provider.id, days).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("exactly 7 days, got 6"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_replace_hours_rejects_duplicate_day() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let days = week_with(|days| {
        days[6].day_of_week = 0;
    });
    let result = replace_weekly_hours_wrapper(&ctx, provider.id, days).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("appears more than once"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_replace_hours_rejects_out_of_range_day() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let days = week_with(|days| {
        days[6].day_of_week = 7;
    });
    let result = replace_weekly_hours_wrapper(&ctx, provider.id, days).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("between 0 and 6, got 7"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_replace_hours_rejects_negative_day() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let days = week_with(|days| {
        days[0].day_of_week = -1;
    });
    let result = replace_weekly_hours_wrapper(&ctx, provider.id, days).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("between 0 and 6"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_replace_hours_rejects_inverted_window() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    // A malformed window is rejected even on a closed day
    let days = week_with(|days| {
        days[0].start_time = NaiveTime::from_hms_opt(17, 0, 0).unwrap();
        days[0].end_time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    });
    let result = replace_weekly_hours_wrapper(&ctx, provider.id, days).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("start_time must be before end_time on day 0"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_replace_hours_stores_and_echoes_the_week() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    let provider_id = provider.id;
    expect_provider(&mut ctx, &provider);

    // Open Saturday with shorter hours
    let days = week_with(|days| {
        days[6].is_available = true;
        days[6].start_time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        days[6].end_time = NaiveTime::from_hms_opt(14, 0, 0).unwrap();
    });

    let expected = days.clone();
    ctx.availability_repo
        .expect_replace_weekly_hours()
        .withf(move |id, submitted| *id == provider_id && *submitted == expected)
        .times(1)
        .returning(move |id, submitted| {
            Ok(submitted
                .into_iter()
                .map(|day| DbDayHours {
                    provider_id: id,
                    day_of_week: day.day_of_week,
                    start_time: day.start_time,
                    end_time: day.end_time,
                    is_available: day.is_available,
                })
                .collect())
        });

    let response = replace_weekly_hours_wrapper(&ctx, provider.id, days.clone())
        .await
        .expect("replacement failed");

    assert_eq!(response.provider_id, provider_id);
    assert_eq!(response.days, days);
    assert!(response.days[6].is_available);
}

#[tokio::test]
async fn test_policy_defaults_when_no_row_exists() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    ctx.policy_repo
        .expect_get_policy()
        .with(predicate::eq(provider.id))
        .times(1)
        .returning(|_| Ok(None));

    let policy = effective_policy_wrapper(&ctx, provider.id)
        .await
        .expect("policy read failed");

    assert_eq!(policy, BookingPolicy::defaults_for(provider.id));
}

#[tokio::test]
async fn test_policy_prefers_the_stored_row() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let provider_id = provider.id;
    ctx.policy_repo
        .expect_get_policy()
        .times(1)
        .returning(move |_| {
            Ok(Some(DbBookingPolicy {
                provider_id,
                is_active: false,
                max_daily_appointments: 4,
                buffer_minutes: 0,
            }))
        });

    let policy = effective_policy_wrapper(&ctx, provider.id)
        .await
        .expect("policy read failed");

    assert!(!policy.is_active);
    assert_eq!(policy.max_daily_appointments, 4);
    assert_eq!(policy.buffer_minutes, 0);
}

#[tokio::test]
async fn test_upsert_policy_rejects_zero_daily_cap() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let result = upsert_policy_wrapper(&ctx, provider.id, true, 0, 15).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("max_daily_appointments must be at least 1"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_upsert_policy_rejects_negative_buffer() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let result = upsert_policy_wrapper(&ctx, provider.id, true, 10, -5).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("buffer_minutes must not be negative, got -5"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_upsert_policy_forwards_the_new_settings() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    let provider_id = provider.id;
    expect_provider(&mut ctx, &provider);

    ctx.policy_repo
        .expect_upsert_policy()
        .with(
            predicate::eq(provider_id),
            predicate::eq(false),
            predicate::eq(8),
            predicate::eq(20),
        )
        .times(1)
        .returning(|provider_id, is_active, max_daily_appointments, buffer_minutes| {
            Ok(DbBookingPolicy {
                provider_id,
                is_active,
                max_daily_appointments,
                buffer_minutes,
            })
        });

    let policy = upsert_policy_wrapper(&ctx, provider.id, false, 8, 20)
        .await
        .expect("upsert failed");

    assert!(!policy.is_active);
    assert_eq!(policy.max_daily_appointments, 8);
    assert_eq!(policy.buffer_minutes, 20);
}

#[tokio::test]
async fn test_create_blackout_rejects_inverted_window() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let start = Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
    let result = create_blackout_wrapper(&ctx, provider.id, start, end, None).await;

    match result.unwrap_err().0 {
        BookingError::Validation(message) => {
            assert!(message.contains("start_time must be before end_time"));
        }
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_blackout_is_provider_origin() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    let provider_id = provider.id;
    expect_provider(&mut ctx, &provider);

    let start = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 6, 3, 15, 0, 0).unwrap();

    ctx.blackout_repo
        .expect_create_blackout()
        .withf(move |id, s, e, reason, origin| {
            *id == provider_id
                && *s == start
                && *e == end
                && *reason == Some("dentist")
                && *origin == BlackoutOrigin::Provider
        })
        .times(1)
        .returning(|provider_id, start_time, end_time, reason, origin| {
            Ok(DbBlackoutPeriod {
                id: Uuid::new_v4(),
                provider_id,
                start_time,
                end_time,
                reason: reason.map(|r| r.to_string()),
                origin: origin.as_str().to_string(),
                created_at: Utc::now(),
            })
        });

    let blackout = create_blackout_wrapper(&ctx, provider.id, start, end, Some("dentist"))
        .await
        .expect("creation failed");

    assert_eq!(blackout.origin, BlackoutOrigin::Provider);
    assert_eq!(blackout.reason.as_deref(), Some("dentist"));
    assert_eq!(blackout.start_time, start);
}

#[tokio::test]
async fn test_delete_blackout_missing_row() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let blackout_id = Uuid::new_v4();
    ctx.blackout_repo
        .expect_get_blackout_by_id()
        .with(predicate::eq(blackout_id))
        .times(1)
        .returning(|_| Ok(None));

    let result = delete_blackout_wrapper(&ctx, provider.id, blackout_id).await;

    match result.unwrap_err().0 {
        BookingError::NotFound(_) => {}
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_delete_blackout_of_another_provider_is_hidden() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let foreign = blackout_row(Uuid::new_v4(), "provider");
    let blackout_id = foreign.id;
    ctx.blackout_repo
        .expect_get_blackout_by_id()
        .times(1)
        .returning(move |_| Ok(Some(foreign.clone())));

    let result = delete_blackout_wrapper(&ctx, provider.id, blackout_id).await;

    match result.unwrap_err().0 {
        BookingError::NotFound(message) => {
            assert!(message.contains("not found for provider"));
        }
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_delete_system_buffer_is_refused() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let buffer = blackout_row(provider.id, "system");
    let blackout_id = buffer.id;
    ctx.blackout_repo
        .expect_get_blackout_by_id()
        .times(1)
        .returning(move |_| Ok(Some(buffer.clone())));

    let result = delete_blackout_wrapper(&ctx, provider.id, blackout_id).await;

    match result.unwrap_err().0 {
        BookingError::PolicyViolation(message) => {
            assert!(message.contains("system buffer"));
        }
        e => panic!("Expected PolicyViolation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_delete_provider_blackout_succeeds() {
    let mut ctx = TestContext::new();
    let provider = test_provider();
    expect_provider(&mut ctx, &provider);

    let row = blackout_row(provider.id, "provider");
    let blackout_id = row.id;
    ctx.blackout_repo
        .expect_get_blackout_by_id()
        .times(1)
        .returning(move |_| Ok(Some(row.clone())));
    ctx.blackout_repo
        .expect_delete_blackout()
        .with(predicate::eq(blackout_id))
        .times(1)
        .returning(|_| Ok(true));

    let status = delete_blackout_wrapper(&ctx, provider.id, blackout_id)
        .await
        .expect("deletion failed");

    assert_eq!(status, StatusCode::NO_CONTENT);
}
