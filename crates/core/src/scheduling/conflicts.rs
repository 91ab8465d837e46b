use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::slot::{CandidateSlot, DaySlot, SlotSet, TimeRange};

/// Annotate candidate slots against existing bookings and blackout periods
/// and compute availability for a service of `service_minutes`.
///
/// Conflicts use intersection semantics: any shared instant between a slot
/// and a busy interval marks the slot, so a booking or blackout that merely
/// straddles a slot boundary still takes the slot out of play.
///
/// A candidate is bookable only when it is conflict-free itself and the
/// `ceil(service_minutes / slot_minutes)` candidates starting at it form an
/// unbroken run: each one free and contiguous in absolute time with its
/// predecessor. The contiguity check is what keeps a service from spanning
/// the repeated hour of a fall-back transition, where neighbouring wall
/// times sit a full hour apart.
pub fn annotate_slots(
    provider_id: Uuid,
    date: NaiveDate,
    timezone: &str,
    slot_minutes: u32,
    candidates: Vec<CandidateSlot>,
    appointments: &[TimeRange],
    blackouts: &[TimeRange],
    service_minutes: u32,
) -> SlotSet {
    let slots_needed = if slot_minutes == 0 {
        1
    } else {
        service_minutes.div_ceil(slot_minutes).max(1) as usize
    };

    let booked: Vec<bool> = candidates
        .iter()
        .map(|slot| {
            appointments
                .iter()
                .any(|busy| busy.overlaps(slot.start_time, slot.end_time))
        })
        .collect();
    let blacked: Vec<bool> = candidates
        .iter()
        .map(|slot| {
            blackouts
                .iter()
                .any(|busy| busy.overlaps(slot.start_time, slot.end_time))
        })
        .collect();
    let free = |i: usize| !booked[i] && !blacked[i];

    let mut slots = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let mut is_available = free(i);
        for offset in 1..slots_needed {
            if !is_available {
                break;
            }
            let j = i + offset;
            is_available = match candidates.get(j) {
                Some(next) => candidates[j - 1].end_time == next.start_time && free(j),
                None => false,
            };
        }
        slots.push(DaySlot {
            date: candidate.date,
            local_time: candidate.local_time.clone(),
            start_time: candidate.start_time,
            end_time: candidate.end_time,
            is_available,
            is_booked: booked[i],
            is_outside_hours: blacked[i],
        });
    }

    let total = slots.len();
    let available = slots.iter().filter(|slot| slot.is_available).count();
    let booked_total = slots.iter().filter(|slot| slot.is_booked).count();
    let outside_hours = slots.iter().filter(|slot| slot.is_outside_hours).count();

    SlotSet {
        provider_id,
        date,
        timezone: timezone.to_string(),
        slot_minutes,
        slots,
        total,
        available,
        booked: booked_total,
        outside_hours,
    }
}
