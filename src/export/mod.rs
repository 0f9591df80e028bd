//! CSV summaries of a single week. The week is picked by its label, the same text the user sees
//! when choosing what to export.

pub mod label;

use std::{
    fmt::Write,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::TimeZone;
use tracing::info;

use crate::storage::entities::{Project, TimeEntry, DELETED_PROJECT_NAME};

use label::parse_week_label;

const CSV_HEADER: &str = "Project,Total Hours,Total Minutes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

impl CsvExport {
    /// Saves the export into `dir` under its own file name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.content)?;
        info!("Exported {} bytes to {path:?}", self.content.len());
        Ok(path)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct HoursAndMinutes {
    hours: u64,
    minutes: u64,
}

impl HoursAndMinutes {
    /// Whole hours and the remaining minutes, rounded, of a duration in seconds.
    fn of_entry(seconds: u64) -> Self {
        let minutes = seconds as f64 / 60.;
        Self {
            hours: (minutes / 60.).floor() as u64,
            minutes: (minutes % 60.).round() as u64,
        }
    }

    fn add(&mut self, other: HoursAndMinutes) {
        self.hours += other.hours;
        self.minutes += other.minutes;
    }

    fn carry(&mut self) {
        self.hours += self.minutes / 60;
        self.minutes %= 60;
    }
}

/// Builds the CSV for the week named by `week_label`, interpreted in `tz`. Rows follow the order
/// in which projects first appear among the week's entries.
pub fn export_week_csv<Tz: TimeZone>(
    entries: &[TimeEntry],
    projects: &[Project],
    week_label: &str,
    tz: &Tz,
) -> Result<CsvExport> {
    let week = parse_week_label(week_label, tz)?;

    let mut aggregates = Vec::<(&str, HoursAndMinutes)>::new();
    let mut total = HoursAndMinutes::default();

    for entry in entries.iter().filter(|e| week.contains(&e.start_time)) {
        let amount = HoursAndMinutes::of_entry(entry.duration);
        let position = match aggregates
            .iter()
            .position(|(id, _)| *id == entry.project_id.as_str())
        {
            Some(position) => position,
            None => {
                aggregates.push((entry.project_id.as_str(), HoursAndMinutes::default()));
                aggregates.len() - 1
            }
        };
        let aggregate = &mut aggregates[position].1;
        aggregate.add(amount);
        aggregate.carry();
        total.add(amount);
    }
    total.carry();

    let mut content = String::new();
    writeln!(content, "{CSV_HEADER}")?;
    for (project_id, aggregate) in &aggregates {
        let name = projects
            .iter()
            .find(|p| p.id == *project_id)
            .map_or(DELETED_PROJECT_NAME, |p| p.name.as_str());
        writeln!(
            content,
            "{},{},{}",
            escape_csv_value(name),
            aggregate.hours,
            aggregate.minutes
        )?;
    }
    writeln!(content, "Total,{},{}", total.hours, total.minutes)?;

    Ok(CsvExport {
        file_name: export_file_name(week_label),
        content,
    })
}

/// Quotes values holding a comma, quote or newline, doubling inner quotes.
pub fn escape_csv_value(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// `timetracker_<label>.csv` with everything but ASCII letters and digits replaced by `_`.
pub fn export_file_name(week_label: &str) -> String {
    let sanitized = week_label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();
    format!("timetracker_{sanitized}.csv")
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::tempdir;

    use super::*;
    use crate::storage::entities::{Project, TimeEntry};

    const WEEK: &str = "Mar 31 - Apr 6, 2024";

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn minutes_carry_into_hours() -> Result<()> {
        let alpha = Project::new("Alpha", "#000000", at(3, 1, 0));
        let entries = vec![
            TimeEntry::new(&alpha, at(4, 1, 9), 90 * 60, at(4, 1, 9)),
            TimeEntry::new(&alpha, at(4, 2, 9), 40 * 60, at(4, 2, 9)),
        ];

        let export = export_week_csv(&entries, &[alpha], WEEK, &Utc)?;

        assert_eq!(
            export.content,
            "Project,Total Hours,Total Minutes\nAlpha,2,10\nTotal,2,10\n"
        );
        Ok(())
    }

    #[test]
    fn rows_per_project_in_first_seen_order() -> Result<()> {
        let zulu = Project::new("Zulu", "#000000", at(3, 1, 0));
        let alpha = Project::new("Alpha", "#000000", at(3, 1, 0));
        let gone = Project::new("Gone", "#000000", at(3, 1, 0));
        let entries = vec![
            TimeEntry::new(&zulu, at(3, 31, 0), 30 * 60, at(3, 31, 0)),
            TimeEntry::new(&gone, at(4, 3, 12), 45 * 60, at(4, 3, 12)),
            TimeEntry::new(&alpha, at(4, 6, 0), 3 * 3600, at(4, 6, 0)),
            // outside of the labelled range
            TimeEntry::new(&alpha, at(4, 6, 15), 3600, at(4, 6, 15)),
            TimeEntry::new(&zulu, at(3, 30, 23), 3600, at(3, 30, 23)),
        ];

        let export = export_week_csv(&entries, &[zulu, alpha], WEEK, &Utc)?;

        assert_eq!(
            export.content,
            "Project,Total Hours,Total Minutes\n\
             Zulu,0,30\n\
             Deleted Project,0,45\n\
             Alpha,3,0\n\
             Total,4,15\n"
        );
        Ok(())
    }

    #[test]
    fn last_day_ends_at_its_midnight() -> Result<()> {
        let alpha = Project::new("Alpha", "#000000", at(3, 1, 0));
        let entries = vec![TimeEntry::new(&alpha, at(4, 6, 15), 3600, at(4, 6, 15))];

        let export = export_week_csv(&entries, &[alpha], WEEK, &Utc)?;

        assert_eq!(export.content, "Project,Total Hours,Total Minutes\nTotal,0,0\n");
        Ok(())
    }

    #[test]
    fn minutes_are_rounded_per_entry() -> Result<()> {
        let alpha = Project::new("Alpha", "#000000", at(3, 1, 0));
        let entries = vec![
            // 29.5 minutes rounds up, 10 seconds rounds down
            TimeEntry::new(&alpha, at(4, 1, 9), 29 * 60 + 30, at(4, 1, 9)),
            TimeEntry::new(&alpha, at(4, 1, 10), 10, at(4, 1, 10)),
        ];

        let export = export_week_csv(&entries, &[alpha], WEEK, &Utc)?;

        assert!(export.content.contains("Alpha,0,30\n"));
        assert!(export.content.ends_with("Total,0,30\n"));
        Ok(())
    }

    #[test]
    fn empty_week_has_total_only() -> Result<()> {
        let export = export_week_csv(&[], &[], WEEK, &Utc)?;
        assert_eq!(export.content, "Project,Total Hours,Total Minutes\nTotal,0,0\n");
        Ok(())
    }

    #[test]
    fn names_are_escaped() -> Result<()> {
        let project = Project::new("Acme, \"Big\" Co", "#000000", at(3, 1, 0));
        let entries = vec![TimeEntry::new(&project, at(4, 1, 9), 3600, at(4, 1, 9))];

        let export = export_week_csv(&entries, &[project], WEEK, &Utc)?;

        assert!(export.content.contains("\"Acme, \"\"Big\"\" Co\",1,0\n"));
        assert_eq!(escape_csv_value("plain"), "plain");
        assert_eq!(escape_csv_value("two\nlines"), "\"two\nlines\"");
        Ok(())
    }

    #[test]
    fn file_name_is_sanitized() {
        assert_eq!(export_file_name(WEEK), "timetracker_Mar_31___Apr_6__2024.csv");
    }

    #[test]
    fn export_is_written() -> Result<()> {
        let dir = tempdir()?;
        let export = export_week_csv(&[], &[], WEEK, &Utc)?;

        let path = export.write_to(dir.path())?;

        assert_eq!(path.file_name().unwrap(), export.file_name.as_str());
        assert_eq!(std::fs::read_to_string(path)?, export.content);
        Ok(())
    }

    #[test]
    fn bad_label_is_an_error() {
        assert!(export_week_csv(&[], &[], "this week", &Utc).is_err());
    }
}
