//! Weekly summaries of completed entries. Everything in here is a pure function of the entries
//! and projects handed in.

pub mod week;

use std::{cmp::Ordering, collections::HashMap};

use chrono::{DateTime, TimeZone};
use tracing::trace;

use crate::storage::entities::{Project, TimeEntry};

use week::WeekWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTotal {
    pub project_id: String,
    /// Falls back to [Project::unknown] when the project was deleted.
    pub project: Project,
    pub resolved: bool,
    /// Seconds.
    pub total: u64,
    pub entries: Vec<TimeEntry>,
}

#[derive(Debug, Clone)]
pub struct WeeklyReport<Tz: TimeZone> {
    pub week: WeekWindow<Tz>,
    pub totals: Vec<ProjectTotal>,
}

impl<Tz: TimeZone> WeeklyReport<Tz> {
    /// Seconds over all projects.
    pub fn total(&self) -> u64 {
        self.totals.iter().map(|v| v.total).sum()
    }
}

/// Entries whose start falls inside the week, in their original order.
pub fn entries_in_week<'a, Tz: TimeZone>(
    entries: &'a [TimeEntry],
    week: &WeekWindow<Tz>,
) -> Vec<&'a TimeEntry> {
    entries
        .iter()
        .filter(|entry| week.contains(&entry.start_time))
        .collect()
}

/// Groups the entries of the Monday-start week containing `reference` by project and sums their
/// durations. Groups are sorted by project name, deleted projects first.
pub fn weekly_report<Tz: TimeZone>(
    entries: &[TimeEntry],
    projects: &[Project],
    reference: &DateTime<Tz>,
) -> WeeklyReport<Tz> {
    let week = WeekWindow::containing(reference);
    let mut groups = HashMap::<&str, (u64, Vec<TimeEntry>)>::new();

    for entry in entries_in_week(entries, &week) {
        let (total, grouped) = groups.entry(entry.project_id.as_str()).or_default();
        *total += entry.duration;
        grouped.push(entry.clone());
    }

    let mut totals = groups
        .into_iter()
        .map(|(project_id, (total, entries))| {
            let project = projects.iter().find(|p| p.id == project_id);
            ProjectTotal {
                project_id: project_id.to_owned(),
                resolved: project.is_some(),
                project: project
                    .cloned()
                    .unwrap_or_else(|| Project::unknown(project_id)),
                total,
                entries,
            }
        })
        .collect::<Vec<_>>();

    totals.sort_by(|a, b| {
        compare_names(sort_name(a), sort_name(b)).then_with(|| a.project_id.cmp(&b.project_id))
    });
    trace!("Grouped week into {} projects", totals.len());

    WeeklyReport { week, totals }
}

/// Alphabetical ignoring case; names differing only in case put lowercase first.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn sort_name(total: &ProjectTotal) -> &str {
    if total.resolved {
        &total.project.name
    } else {
        ""
    }
}
