use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::availability::DayHours;
use crate::models::slot::CandidateSlot;

/// Generate candidate slots for one provider-local calendar day.
///
/// The working window is stepped through at `slot_minutes` granularity and
/// the boundary is end-inclusive: the last slot may end exactly at
/// `end_time`. Wall times that do not exist on `date` (spring-forward gaps)
/// are skipped, ambiguous wall times (fall-back overlaps) resolve to their
/// first occurrence, and only slots starting strictly after `now` are kept.
///
/// Slot width is fixed in absolute time: `end_time` is always exactly
/// `slot_minutes` after `start_time`, even when a DST shift falls inside
/// the slot.
pub fn generate_day_slots(
    hours: &DayHours,
    date: NaiveDate,
    tz: Tz,
    slot_minutes: u32,
    now: DateTime<Utc>,
) -> Vec<CandidateSlot> {
    if !hours.is_available || slot_minutes == 0 {
        return Vec::new();
    }

    let step = Duration::minutes(i64::from(slot_minutes));
    let mut slots = Vec::new();
    let mut cursor = hours.start_time;

    loop {
        // overflowing_add_signed reports wrap-around past midnight; a slot
        // that would cross it falls outside the day and ends the walk.
        let (slot_end, wrapped) = cursor.overflowing_add_signed(step);
        if wrapped != 0 || slot_end > hours.end_time {
            break;
        }

        if let Some(start) = tz.from_local_datetime(&date.and_time(cursor)).earliest() {
            let start_time = start.with_timezone(&Utc);
            if start_time > now {
                slots.push(CandidateSlot {
                    date,
                    local_time: cursor.format("%H:%M").to_string(),
                    start_time,
                    end_time: start_time + step,
                });
            }
        }

        cursor = slot_end;
    }

    slots
}
