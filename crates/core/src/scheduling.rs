//! Pure scheduling logic: candidate slot generation, conflict annotation and
//! the timezone arithmetic both depend on.

pub mod conflicts;
pub mod slots;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{BookingError, BookingResult};

/// Resolve an IANA timezone name to a [`Tz`].
pub fn resolve_timezone(timezone: &str) -> BookingResult<Tz> {
    timezone.parse::<Tz>().map_err(|_| {
        BookingError::TimezoneResolution(format!("'{timezone}' is not a known IANA timezone"))
    })
}

/// Parse a calendar date in the wire format `YYYY-MM-DD`.
pub fn parse_date(date: &str) -> BookingResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| BookingError::Validation(format!("'{date}' is not a valid YYYY-MM-DD date")))
}

/// Parse a wall-clock time in the wire format `HH:MM`.
pub fn parse_local_time(time: &str) -> BookingResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| BookingError::Validation(format!("'{time}' is not a valid HH:MM time")))
}

/// Slot granularity must fit within a single day.
pub fn validate_slot_minutes(slot_minutes: u32) -> BookingResult<()> {
    if (1..=1440).contains(&slot_minutes) {
        Ok(())
    } else {
        Err(BookingError::Validation(format!(
            "slot_minutes must be between 1 and 1440, got {slot_minutes}"
        )))
    }
}

/// UTC bounds of a provider-local calendar day: `[start of day, start of next day)`.
///
/// Used for daily appointment caps, so "per day" always means the provider's
/// wall-clock day rather than the UTC day.
pub fn local_day_bounds(tz: Tz, date: NaiveDate) -> BookingResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = first_instant_of(tz, date)?;
    let next = date
        .succ_opt()
        .ok_or_else(|| BookingError::Validation(format!("date {date} is out of range")))?;
    let end = first_instant_of(tz, next)?;
    Ok((start, end))
}

/// First valid instant of a local calendar day.
///
/// Midnight does not exist on spring-forward days in some zones (e.g.
/// America/Santiago), so slide forward in 30-minute steps until the wall
/// time resolves.
fn first_instant_of(tz: Tz, date: NaiveDate) -> BookingResult<DateTime<Utc>> {
    let mut local = NaiveTime::MIN;
    for _ in 0..6 {
        if let Some(resolved) = tz.from_local_datetime(&date.and_time(local)).earliest() {
            return Ok(resolved.with_timezone(&Utc));
        }
        local = local + Duration::minutes(30);
    }
    Err(BookingError::TimezoneResolution(format!(
        "no representable start of day for {date} in {tz}"
    )))
}
