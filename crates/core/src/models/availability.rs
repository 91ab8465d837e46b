use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recurring working hours for one weekday.
///
/// `day_of_week` runs 0..=6 with 0 = Sunday, matching
/// `chrono::Weekday::num_days_from_sunday`. Rows always carry a valid
/// `start_time < end_time` window even when `is_available` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl DayHours {
    /// Default week installed at provider onboarding: Monday through Friday
    /// 09:00-17:00, weekend closed.
    pub fn default_week() -> Vec<DayHours> {
        (0..7)
            .map(|day_of_week| DayHours {
                day_of_week,
                start_time: nine_to_five().0,
                end_time: nine_to_five().1,
                is_available: !matches!(day_of_week, 0 | 6),
            })
            .collect()
    }
}

fn nine_to_five() -> (NaiveTime, NaiveTime) {
    (
        NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceWeeklyHoursRequest {
    pub days: Vec<DayHours>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHoursResponse {
    pub provider_id: Uuid,
    pub days: Vec<DayHours>,
}
