use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SLOT_MINUTES: u32 = 15;

/// Half-open UTC interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// True when the two half-open intervals share any instant.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

/// A raw slot produced by the generator, before conflicts are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub date: NaiveDate,
    /// Wall-clock start in the provider's timezone, "HH:MM".
    pub local_time: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// A slot annotated with booking state for one provider day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlot {
    pub date: NaiveDate,
    pub local_time: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Bookable: free of conflicts and with enough free contiguous slots
    /// after it to fit the requested service.
    pub is_available: bool,
    /// Intersects an appointment that currently blocks its window.
    pub is_booked: bool,
    /// Intersects a blackout period.
    pub is_outside_hours: bool,
}

/// The full annotated slot picture for one provider, service and date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSet {
    pub provider_id: Uuid,
    pub date: NaiveDate,
    pub timezone: String,
    pub slot_minutes: u32,
    pub slots: Vec<DaySlot>,
    pub total: usize,
    pub available: usize,
    pub booked: usize,
    pub outside_hours: usize,
}

impl SlotSet {
    /// Empty set for a closed or fully elapsed day.
    pub fn empty(provider_id: Uuid, date: NaiveDate, timezone: &str, slot_minutes: u32) -> Self {
        Self {
            provider_id,
            date,
            timezone: timezone.to_string(),
            slot_minutes,
            slots: Vec::new(),
            total: 0,
            available: 0,
            booked: 0,
            outside_hours: 0,
        }
    }

    /// Look up a slot by its wall-clock label, e.g. "09:15".
    pub fn slot_at(&self, local_time: &str) -> Option<&DaySlot> {
        self.slots.iter().find(|slot| slot.local_time == local_time)
    }
}
