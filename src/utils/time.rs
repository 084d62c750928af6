use chrono::{DateTime, Duration, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// The `days` calendar days ending at `end`, oldest first.
pub fn trailing_days(end: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..i64::from(days))
        .rev()
        .map(|back| end - Duration::days(back))
        .collect()
}

/// True when `previous` falls on an earlier UTC calendar day than `now`.
pub fn is_earlier_day(previous: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    previous.date_naive() < now.date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn trailing_days_are_ascending_and_inclusive() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let days = trailing_days(end, 3);
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                end,
            ]
        );
        assert!(trailing_days(end, 0).is_empty());
    }

    #[test]
    fn same_day_is_not_earlier() {
        let morning = Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 5, 1, 23, 0, 0).unwrap();
        let next = Utc.with_ymd_and_hms(2024, 5, 2, 0, 5, 0).unwrap();
        assert!(!is_earlier_day(morning, night));
        assert!(is_earlier_day(night, next));
    }
}
