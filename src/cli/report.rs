use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::Args as ClapArgs;

use crate::{
    export::{export_week_csv, label::available_export_labels},
    report::{
        weekly_report,
        week::{selectable_weeks, WeekWindow},
        WeeklyReport,
    },
    utils::time::format_duration,
};

use super::{
    dates::{parse_date, DateStyle},
    output::{entry_project_name, local, swatch},
    Tracker,
};

#[derive(ClapArgs, Debug)]
pub struct ReportCommand {
    #[arg(short, long, help = "Any day of the week to report. Current week by default")]
    week: Option<String>,
    #[arg(short, long, help = "Show the entries of every project")]
    entries: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ExportCommand {
    #[arg(help = "Week label as shown by --list, like \"Mar 9 - Mar 15, 2025\"")]
    label: Option<String>,
    #[arg(short, long, help = "List the weeks that can be exported")]
    list: bool,
    #[arg(short, long, help = "Directory to save into. Current directory by default")]
    out: Option<PathBuf>,
}

pub fn process_report_command(
    tracker: &Tracker,
    command: ReportCommand,
    date_style: DateStyle,
) -> Result<()> {
    let reference = match command.week {
        Some(week) => parse_date(&week, date_style)?,
        None => Local::now(),
    };
    let report = weekly_report(tracker.time_entries(), tracker.projects(), &reference);
    print_report(tracker, &report, command.entries);
    Ok(())
}

fn print_report(tracker: &Tracker, report: &WeeklyReport<Local>, show_entries: bool) {
    println!("Week of {}", report.week.label());
    if report.totals.is_empty() {
        println!("No time tracked this week");
        return;
    }

    for total in &report.totals {
        println!(
            "{} {:<24} {:>10}",
            swatch(&total.project.color),
            total.project.name,
            format_duration(total.total)
        );
        if !show_entries {
            continue;
        }
        for entry in &total.entries {
            println!(
                "    {}  {}  {}",
                local(entry.start_time).format("%a %b %-d, %-I:%M %p"),
                format_duration(entry.duration),
                entry_project_name(entry, tracker.projects())
            );
        }
    }
    println!("  {:<24} {:>10}", "Total", format_duration(report.total()));
}

pub fn process_weeks() {
    for week in selectable_weeks(&Local::now()) {
        print_week(&week);
    }
}

fn print_week(week: &WeekWindow<Local>) {
    println!("Week of {}", week.start.format("%b %-d, %Y"));
}

pub fn process_export_command(tracker: &Tracker, command: ExportCommand) -> Result<()> {
    let label = match (command.label, command.list) {
        (Some(label), false) => label,
        _ => {
            for label in available_export_labels(&Local::now()) {
                println!("{label}");
            }
            return Ok(());
        }
    };

    let export = export_week_csv(tracker.time_entries(), tracker.projects(), &label, &Local)?;
    let dir = match command.out {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let path = export.write_to(&dir)?;
    println!("Saved {}", path.display());
    Ok(())
}
