use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use now::DateTimeNow;
use std::fmt::Display;

/// Number of weeks offered when picking a week to look at.
pub const SELECTABLE_WEEKS: usize = 12;

/// A calendar week, from the first instant of its first day to the last instant of its
/// seventh day. Both ends are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWindow<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl<Tz: TimeZone> WeekWindow<Tz> {
    /// Week starting on Monday that contains `reference`.
    pub fn containing(reference: &DateTime<Tz>) -> Self {
        Self::containing_with_start(reference, Weekday::Mon)
    }

    pub fn containing_with_start(reference: &DateTime<Tz>, week_start: Weekday) -> Self {
        let days_back = (reference.weekday().num_days_from_monday() + 7
            - week_start.num_days_from_monday())
            % 7;
        let start = (reference.clone() - Duration::days(days_back as i64)).beginning_of_day();
        let end = (start.clone() + Duration::days(6)).end_of_day();
        Self { start, end }
    }

    pub fn previous(&self) -> Self {
        // Stepping back from noon keeps DST shifts from changing the day.
        let reference = self.start.clone() - Duration::days(7) + Duration::hours(12);
        Self::containing_with_start(&reference, self.start.weekday())
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start.with_timezone(&Utc) <= *instant && *instant <= self.end.with_timezone(&Utc)
    }
}

impl<Tz: TimeZone> WeekWindow<Tz>
where
    Tz::Offset: Display,
{
    /// `Mar 4 - Mar 10, 2024`. The year is only shown once, for the end of the week.
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%b %-d"),
            self.end.format("%b %-d, %Y")
        )
    }
}

/// The week containing `reference` followed by the `SELECTABLE_WEEKS - 1` weeks before it.
pub fn selectable_weeks<Tz: TimeZone>(reference: &DateTime<Tz>) -> Vec<WeekWindow<Tz>> {
    let mut weeks = Vec::with_capacity(SELECTABLE_WEEKS);
    let mut current = WeekWindow::containing(reference);
    for _ in 0..SELECTABLE_WEEKS {
        let previous = current.previous();
        weeks.push(current);
        current = previous;
    }
    weeks
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Utc, Weekday};

    use super::*;

    #[test]
    fn monday_start_window() {
        // Friday
        let reference = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let week = WeekWindow::containing(&reference);

        assert_eq!(week.start, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
        assert_eq!(
            week.end.date_naive(),
            Utc.with_ymd_and_hms(2024, 4, 7, 0, 0, 0).unwrap().date_naive()
        );
        assert!(week.contains(&Utc.with_ymd_and_hms(2024, 4, 7, 23, 59, 59).unwrap()));
        assert!(!week.contains(&Utc.with_ymd_and_hms(2024, 4, 8, 0, 0, 0).unwrap()));
        assert!(!week.contains(&Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap()));
    }

    #[test]
    fn window_on_week_boundaries() {
        let monday = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        assert_eq!(WeekWindow::containing(&monday).start, monday);

        let sunday = Utc.with_ymd_and_hms(2024, 4, 7, 23, 0, 0).unwrap();
        assert_eq!(WeekWindow::containing(&sunday).start, monday);
    }

    #[test]
    fn sunday_start_window() {
        let reference = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let week = WeekWindow::containing_with_start(&reference, Weekday::Sun);

        assert_eq!(week.start, Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap());
        assert_eq!(week.end.weekday(), Weekday::Sat);
        assert_eq!(week.label(), "Mar 31 - Apr 6, 2024");
    }

    #[test]
    fn twelve_weeks_most_recent_first() {
        let reference = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let weeks = selectable_weeks(&reference);

        assert_eq!(weeks.len(), 12);
        assert_eq!(weeks[0], WeekWindow::containing(&reference));
        assert_eq!(weeks[1].start, Utc.with_ymd_and_hms(2024, 3, 25, 0, 0, 0).unwrap());
        assert_eq!(weeks[11].start, Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert!(weeks.iter().all(|week| week.start.weekday() == Weekday::Mon));
    }
}
