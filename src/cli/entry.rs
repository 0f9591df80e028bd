use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Args as ClapArgs, Subcommand};

use crate::{
    report::{entries_in_week, week::WeekWindow},
    storage::entities::{Project, TimeEntry},
    tracker::NewTimeEntry,
    utils::time::{
        format_duration_short, format_elapsed, minutes_to_seconds, span_from_clock_times,
    },
};

use super::{
    dates::{parse_clock_time, parse_date, DateStyle},
    output::{entry_project_name, local, swatch},
    resolve_project, Tracker,
};

const ENTRY_TIME_FORMAT: &str = "%b %-d, %-I:%M %p";
/// A year. Anything longer is a typo.
const MAX_ENTRY_MINUTES: u64 = 366 * 24 * 60;

#[derive(ClapArgs, Debug)]
pub struct LogCommand {
    #[arg(short, long, help = "Project id or name")]
    project: String,
    #[arg(short, long, help = "Day of the entry. Today by default")]
    date: Option<String>,
    #[arg(long, help = "Start as HH:MM")]
    from: String,
    #[arg(long, help = "End as HH:MM. An end before the start means the next day")]
    to: String,
}

#[derive(Subcommand, Debug)]
pub enum EntryCommand {
    #[command(about = "List entries of a week, newest first")]
    List {
        #[arg(short, long, help = "Any day of the week to show. Current week by default")]
        week: Option<String>,
    },
    #[command(about = "Change the duration or project of an entry")]
    Edit {
        id: String,
        #[arg(
            short,
            long,
            help = "New duration in minutes",
            value_parser = clap::value_parser!(u64).range(..=MAX_ENTRY_MINUTES)
        )]
        minutes: Option<u64>,
        #[arg(short, long, help = "Project id or name to move the entry to")]
        project: Option<String>,
    },
    #[command(about = "Delete an entry")]
    Delete { id: String },
}

pub fn process_start(tracker: &mut Tracker, project: &str) -> Result<()> {
    let project = resolve_project(tracker, project)?.id.clone();
    if let Some(active) = tracker.active_entry() {
        println!(
            "Warning: discarding running timer for {} ({} not saved)",
            active.project_name,
            format_elapsed(tracker.active_elapsed().unwrap_or_default())
        );
    }
    if let Some(entry) = tracker.start_timer(&project) {
        println!(
            "Started {} {} at {}",
            swatch(&entry.project_color),
            entry.project_name,
            local(entry.start_time).format("%-I:%M %p")
        );
    }
    Ok(())
}

pub fn process_stop(tracker: &mut Tracker) {
    match tracker.stop_timer() {
        Some(entry) => println!(
            "Stopped {} after {}",
            entry.project_name,
            format_elapsed(entry.duration)
        ),
        None => println!("No timer is running"),
    }
}

pub fn process_status(tracker: &Tracker) {
    match (tracker.active_entry(), tracker.active_elapsed()) {
        (Some(entry), Some(elapsed)) => println!(
            "{} {} {} since {}",
            swatch(&entry.project_color),
            entry.project_name,
            format_elapsed(elapsed),
            local(entry.start_time).format(ENTRY_TIME_FORMAT)
        ),
        _ => println!("No timer is running"),
    }
}

pub fn process_log_command(
    tracker: &mut Tracker,
    command: LogCommand,
    date_style: DateStyle,
) -> Result<()> {
    let project = resolve_project(tracker, &command.project)?.id.clone();
    let date = match command.date {
        Some(date) => parse_date(&date, date_style)?.date_naive(),
        None => Local::now().date_naive(),
    };
    let from = parse_clock_time(&command.from)?;
    let to = parse_clock_time(&command.to)?;

    let (start_time, duration) = span_from_clock_times(&Local, date, from, to)
        .ok_or_else(|| anyhow!("{date} {from} - {to} doesn't exist in the local time zone"))?;

    match tracker.add_time_entry(NewTimeEntry {
        project_id: project,
        start_time,
        duration,
    }) {
        Some(entry) => println!(
            "Logged {} for {} ({})",
            format_duration_short(entry.duration),
            entry.project_name,
            entry.id
        ),
        None => println!("Project was not found"),
    }
    Ok(())
}

pub fn process_entry_command(
    tracker: &mut Tracker,
    command: EntryCommand,
    date_style: DateStyle,
) -> Result<()> {
    match command {
        EntryCommand::List { week } => {
            let reference = match week {
                Some(week) => parse_date(&week, date_style)?,
                None => Local::now(),
            };
            let week = WeekWindow::containing(&reference);
            println!("Week of {}", week.label());

            if let (Some(active), Some(elapsed)) =
                (tracker.active_entry(), tracker.active_elapsed())
            {
                print_entry(active, tracker.projects(), elapsed, " (running)");
            }
            let mut entries = entries_in_week(tracker.time_entries(), &week);
            if entries.is_empty() && tracker.active_entry().is_none() {
                println!("No entries");
            }
            entries.sort_by(|a, b| b.start_time.cmp(&a.start_time));
            for entry in entries {
                print_entry(entry, tracker.projects(), entry.duration, "");
            }
        }
        EntryCommand::Edit {
            id,
            minutes,
            project,
        } => {
            let entry = tracker
                .find_time_entry(&id)
                .cloned()
                .ok_or_else(|| anyhow!("No entry with id {id:?}"))?;
            let entry = match project {
                Some(project) => move_to_project(entry, resolve_project(tracker, &project)?),
                None => entry,
            };
            let entry = match minutes {
                Some(minutes) => entry.with_duration(
                    minutes_to_seconds(minutes)
                        .ok_or_else(|| anyhow!("{minutes} minutes is too long for an entry"))?,
                ),
                None => entry,
            };
            tracker.update_time_entry(entry.clone());
            print_entry(&entry, tracker.projects(), entry.duration, "");
        }
        EntryCommand::Delete { id } => match tracker.delete_time_entry(&id) {
            Some(entry) => println!("Deleted entry of {}", entry.project_name),
            None => println!("No entry with id {id:?}"),
        },
    }
    Ok(())
}

fn move_to_project(entry: TimeEntry, project: &Project) -> TimeEntry {
    TimeEntry {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        project_color: project.color.clone(),
        ..entry
    }
}

fn print_entry(entry: &TimeEntry, projects: &[Project], duration: u64, suffix: &str) {
    println!(
        "{}\t{} {}\t{}\t{}{suffix}",
        entry.id,
        swatch(&entry.project_color),
        entry_project_name(entry, projects),
        local(entry.start_time).format(ENTRY_TIME_FORMAT),
        format_duration_short(duration),
    );
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn moving_entry_copies_project_fields() {
        let alpha = Project::new("Alpha", "#111111", Utc::now());
        let beta = Project::new("Beta", "#222222", Utc::now());
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let entry = TimeEntry::new(&alpha, start, 600, start);

        let moved = move_to_project(entry.clone(), &beta);

        assert_eq!(moved.id, entry.id);
        assert_eq!(moved.project_id, beta.id);
        assert_eq!(moved.project_name, "Beta");
        assert_eq!(moved.project_color, "#222222");
        assert_eq!(moved.start_time, start);
        assert_eq!(moved.duration, 600);
    }
}
