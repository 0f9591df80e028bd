use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Months, NaiveDate, NaiveTime, TimeZone, Weekday};

use crate::report::week::WeekWindow;

const LABEL_DATE_FORMAT: &str = "%b %d, %Y";

/// Reads a label produced by [WeekWindow::label] back into a window in `tz`. The year is taken
/// from the end of the label; a start later than the end belongs to the previous year.
///
/// Both ends are midnight at the start of their day, so the last day of the label only
/// contributes entries started exactly at its midnight.
pub fn parse_week_label<Tz: TimeZone>(label: &str, tz: &Tz) -> Result<WeekWindow<Tz>> {
    let (start, end) = label
        .split_once(" - ")
        .ok_or_else(|| anyhow!("Week label {label:?} should look like \"Mar 4 - Mar 10, 2024\""))?;
    let (_, year) = end
        .split_once(", ")
        .ok_or_else(|| anyhow!("Week label {label:?} is missing a year"))?;

    let end_date = NaiveDate::parse_from_str(end.trim(), LABEL_DATE_FORMAT)?;
    let start = format!("{}, {}", start.trim(), year.trim());
    let mut start_date = NaiveDate::parse_from_str(&start, LABEL_DATE_FORMAT)?;
    if start_date > end_date {
        start_date = start_date
            .checked_sub_months(Months::new(12))
            .ok_or_else(|| anyhow!("Week label {label:?} is out of range"))?;
    }

    let start = local_midnight(tz, start_date)?;
    let end = local_midnight(tz, end_date)?;
    Ok(WeekWindow { start, end })
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Tz>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| anyhow!("{date} has no midnight in this time zone"))
}

/// Sunday-start weeks from three months before `now` up to the week of `now`, most recent
/// first. These are the weeks offered for export.
pub fn available_export_weeks<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<WeekWindow<Tz>> {
    let oldest = now
        .clone()
        .checked_sub_months(Months::new(3))
        .unwrap_or_else(|| now.clone());
    let oldest = WeekWindow::containing_with_start(&oldest, Weekday::Sun).start;

    let mut weeks = vec![];
    let mut current = WeekWindow::containing_with_start(now, Weekday::Sun);
    while current.start >= oldest {
        let previous = current.previous();
        weeks.push(current);
        current = previous;
    }
    weeks
}

/// Labels of [available_export_weeks].
pub fn available_export_labels<Tz: TimeZone>(now: &DateTime<Tz>) -> Vec<String>
where
    Tz::Offset: Display,
{
    available_export_weeks(now).iter().map(WeekWindow::label).collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, FixedOffset, TimeZone, Utc, Weekday};

    use super::*;

    #[test]
    fn parse_label() -> Result<()> {
        let week = parse_week_label("Mar 31 - Apr 6, 2024", &Utc)?;

        assert_eq!(week.start, Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap());
        assert_eq!(week.end, Utc.with_ymd_and_hms(2024, 4, 6, 0, 0, 0).unwrap());
        assert!(week.contains(&Utc.with_ymd_and_hms(2024, 4, 6, 0, 0, 0).unwrap()));
        assert!(!week.contains(&Utc.with_ymd_and_hms(2024, 4, 6, 0, 0, 1).unwrap()));
        Ok(())
    }

    #[test]
    fn parse_label_across_new_year() -> Result<()> {
        let week = parse_week_label("Dec 29 - Jan 4, 2025", &Utc)?;

        assert_eq!(week.start, Utc.with_ymd_and_hms(2024, 12, 29, 0, 0, 0).unwrap());
        assert_eq!(week.end.year(), 2025);
        Ok(())
    }

    #[test]
    fn parse_label_in_zone() -> Result<()> {
        let zone = FixedOffset::east_opt(3600).unwrap();
        let week = parse_week_label("Mar 31 - Apr 6, 2024", &zone)?;

        assert_eq!(
            week.start.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2024, 3, 30, 23, 0, 0).unwrap()
        );
        Ok(())
    }

    #[test]
    fn parse_label_rejects_garbage() {
        assert!(parse_week_label("last week", &Utc).is_err());
        assert!(parse_week_label("Mar 31 - Apr 6", &Utc).is_err());
        assert!(parse_week_label("Foo 31 - Apr 6, 2024", &Utc).is_err());
    }

    #[test]
    fn labels_parse_back() -> Result<()> {
        let now = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        for week in available_export_weeks(&now) {
            let parsed = parse_week_label(&week.label(), &Utc)?;
            assert_eq!(parsed.start, week.start);
            assert_eq!(parsed.label(), week.label());
        }
        Ok(())
    }

    #[test]
    fn export_weeks_cover_three_months() {
        let now = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let weeks = available_export_weeks(&now);

        assert_eq!(weeks[0].label(), "Mar 31 - Apr 6, 2024");
        // Jan 5 2024 falls into the week starting Dec 31 2023.
        assert_eq!(weeks.last().unwrap().label(), "Dec 31 - Jan 6, 2024");
        assert!(weeks.iter().all(|week| week.start.weekday() == Weekday::Sun));
        assert_eq!(available_export_labels(&now).len(), weeks.len());
    }
}
