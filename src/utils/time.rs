use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Turns a manual entry (a day plus wall clock start and end) into a start instant and a
/// duration in seconds. An end earlier than the start means the work ran past midnight.
/// Returns `None` when the start or end doesn't exist in the time zone.
pub fn span_from_clock_times<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
) -> Option<(DateTime<Utc>, u64)> {
    let start = tz.from_local_datetime(&date.and_time(start)).earliest()?;
    let mut end = tz.from_local_datetime(&date.and_time(end)).earliest()?;
    if end < start {
        end += Duration::days(1);
    }
    let duration = (end - start.clone()).num_seconds().max(0) as u64;
    Some((start.with_timezone(&Utc), duration))
}

/// Durations are edited in whole minutes but stored in seconds. `None` on overflow.
pub fn minutes_to_seconds(minutes: u64) -> Option<u64> {
    minutes.checked_mul(60)
}

/// `3h 5m`, used by reports.
pub fn format_duration(seconds: u64) -> String {
    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
}

/// Like [format_duration] but drops the hours when there are none.
pub fn format_duration_short(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Stopwatch style `HH:MM:SS`.
pub fn format_elapsed(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    use super::*;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2024, 4, 5).unwrap();

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn span_same_day() {
        let (start, duration) =
            span_from_clock_times(&Utc, TEST_DATE, time(9, 0), time(10, 30)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 4, 5, 9, 0, 0).unwrap());
        assert_eq!(duration, 90 * 60);
    }

    #[test]
    fn span_past_midnight() {
        let (start, duration) =
            span_from_clock_times(&Utc, TEST_DATE, time(23, 0), time(1, 0)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 4, 5, 23, 0, 0).unwrap());
        assert_eq!(duration, 2 * 3600);
    }

    #[test]
    fn span_empty() {
        let (_, duration) = span_from_clock_times(&Utc, TEST_DATE, time(9, 0), time(9, 0)).unwrap();
        assert_eq!(duration, 0);
    }

    #[test]
    fn durations_are_formatted() {
        assert_eq!(format_duration(3 * 3600 + 5 * 60 + 59), "3h 5m");
        assert_eq!(format_duration(59), "0h 0m");
        assert_eq!(format_duration_short(45 * 60), "45m");
        assert_eq!(format_duration_short(3600 + 60), "1h 1m");
        assert_eq!(format_elapsed(3600 + 2 * 60 + 3), "01:02:03");
        assert_eq!(minutes_to_seconds(90), Some(5400));
        assert_eq!(minutes_to_seconds(u64::MAX / 10), None);
    }
}
