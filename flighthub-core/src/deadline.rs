use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// How long a deferred payment stays open.
///
/// Evaluated once when the pending payment is created; the resulting
/// absolute timestamp is what gets stored and checked later.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentDeadline {
    Hours { hours: u32 },
    WorkingDays { days: u32 },
}

impl Default for PaymentDeadline {
    fn default() -> Self {
        PaymentDeadline::WorkingDays { days: 4 }
    }
}

impl PaymentDeadline {
    pub fn deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            PaymentDeadline::Hours { hours } => now + Duration::hours(i64::from(hours)),
            PaymentDeadline::WorkingDays { days } => add_working_days(now, days),
        }
    }
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

/// Steps forward one calendar day at a time, counting only Monday-Friday.
/// Time of day is preserved.
fn add_working_days(start: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    let mut current = start;
    let mut remaining = days;
    while remaining > 0 {
        current += Duration::days(1);
        if !is_weekend(current.weekday()) {
            remaining -= 1;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hours_policy() {
        let now = Utc.with_ymd_and_hms(2024, 12, 10, 9, 0, 0).unwrap();
        let deadline = PaymentDeadline::Hours { hours: 24 }.deadline_from(now);
        assert_eq!(deadline, Utc.with_ymd_and_hms(2024, 12, 11, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_working_days_skip_weekend() {
        // Thursday + 4 working days = next Wednesday
        let thursday = Utc.with_ymd_and_hms(2024, 12, 12, 15, 30, 0).unwrap();
        let deadline = PaymentDeadline::WorkingDays { days: 4 }.deadline_from(thursday);
        assert_eq!(deadline, Utc.with_ymd_and_hms(2024, 12, 18, 15, 30, 0).unwrap());
    }

    #[test]
    fn test_working_days_from_saturday() {
        let saturday = Utc.with_ymd_and_hms(2024, 12, 14, 10, 0, 0).unwrap();
        let deadline = PaymentDeadline::WorkingDays { days: 1 }.deadline_from(saturday);
        assert_eq!(deadline.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_policy_parses_from_config_shape() {
        let policy: PaymentDeadline = serde_json::from_str(r#"{"kind":"hours","hours":24}"#).unwrap();
        assert_eq!(policy, PaymentDeadline::Hours { hours: 24 });
        assert_eq!(PaymentDeadline::default(), PaymentDeadline::WorkingDays { days: 4 });
    }
}
