pub mod dates;
pub mod entry;
pub mod output;
pub mod project;
pub mod report;
pub mod settings;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use dates::DateStyle;
use entry::{EntryCommand, LogCommand};
use project::ProjectCommand;
use report::{ExportCommand, ReportCommand};
use settings::SettingsCommand;
use tracing::level_filters::LevelFilter;

use crate::{
    storage::{
        entities::Project,
        key_value::{FileStore, KeyValueStore},
    },
    tracker::TimeTracker,
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
    webhook::http::HttpNotifier,
};

type Tracker = TimeTracker<FileStore>;

#[derive(Parser, Debug)]
#[command(name = "timetracker", version, long_about = None)]
#[command(about = "Track time spent on projects", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Start a timer for a project. A running timer is replaced and its time is lost")]
    Start {
        #[arg(help = "Project id or name")]
        project: String,
    },
    #[command(about = "Stop the running timer and save its entry")]
    Stop {},
    #[command(about = "Show the running timer")]
    Status {},
    #[command(about = "Add a finished entry by hand")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "List, edit or delete entries")]
    Entry {
        #[command(subcommand)]
        command: EntryCommand,
    },
    #[command(about = "Show time per project for a week")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "List the weeks available for reports")]
    Weeks {},
    #[command(about = "Export a week into a csv file")]
    Export {
        #[command(flatten)]
        command: ExportCommand,
    },
    #[command(about = "Show or change settings, including the webhook url")]
    Settings {
        #[command(flatten)]
        command: SettingsCommand,
    },
    #[command(about = "Delete all projects and entries")]
    Reset {
        #[arg(long, help = "Actually delete everything")]
        confirm: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let notifier = HttpNotifier::new();
    let store = FileStore::new(app_dir.join("store"))?;
    let mut tracker = TimeTracker::load(store, Box::new(notifier.clone()), Box::new(DefaultClock));

    let result = match args.commands {
        Commands::Project { command } => project::process_project_command(&mut tracker, command),
        Commands::Start { project } => entry::process_start(&mut tracker, &project),
        Commands::Stop {} => {
            entry::process_stop(&mut tracker);
            Ok(())
        }
        Commands::Status {} => {
            entry::process_status(&tracker);
            Ok(())
        }
        Commands::Log { command } => {
            entry::process_log_command(&mut tracker, command, args.date_style)
        }
        Commands::Entry { command } => {
            entry::process_entry_command(&mut tracker, command, args.date_style)
        }
        Commands::Report { command } => {
            report::process_report_command(&tracker, command, args.date_style)
        }
        Commands::Weeks {} => {
            report::process_weeks();
            Ok(())
        }
        Commands::Export { command } => report::process_export_command(&tracker, command),
        Commands::Settings { command } => {
            settings::process_settings_command(&mut tracker, command);
            Ok(())
        }
        Commands::Reset { confirm } => {
            settings::process_reset(&mut tracker, confirm);
            Ok(())
        }
    };

    // Webhooks are sent in the background; the process must not exit under them.
    notifier.drain().await;
    result
}

/// Looks a project up by id first, then by exact name.
fn resolve_project<'a, S: KeyValueStore>(
    tracker: &'a TimeTracker<S>,
    key: &str,
) -> Result<&'a Project> {
    tracker
        .find_project(key)
        .or_else(|| tracker.projects().iter().find(|p| p.name == key))
        .ok_or_else(|| anyhow!("No project with id or name {key:?}"))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::{storage::key_value::MemoryStore, webhook::MockNotifier};

    #[test]
    fn args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_nested_commands() {
        let args = Args::try_parse_from([
            "timetracker",
            "project",
            "delete",
            "Alpha",
            "--with-entries",
        ])
        .unwrap();
        assert!(matches!(
            args.commands,
            Commands::Project {
                command: ProjectCommand::Delete { with_entries: true, .. }
            }
        ));

        let args = Args::try_parse_from(["timetracker", "--log", "stop"]).unwrap();
        assert!(args.log);
        assert!(matches!(args.commands, Commands::Stop {}));
    }

    #[test]
    fn entry_minutes_are_bounded() {
        let args = Args::try_parse_from(["timetracker", "entry", "edit", "abc", "--minutes", "90"]);
        assert!(matches!(
            args.unwrap().commands,
            Commands::Entry {
                command: EntryCommand::Edit {
                    minutes: Some(90),
                    ..
                }
            }
        ));

        let too_long = ["timetracker", "entry", "edit", "abc", "--minutes", "1000000000000000"];
        assert!(Args::try_parse_from(too_long).is_err());
    }

    #[test]
    fn resolves_projects_by_id_or_name() {
        let mut tracker = TimeTracker::load(
            MemoryStore::new(),
            Box::new(MockNotifier::new()),
            Box::new(DefaultClock),
        );
        let alpha = tracker.add_project("Alpha", "#111111");

        assert_eq!(resolve_project(&tracker, &alpha.id).unwrap(), &alpha);
        assert_eq!(resolve_project(&tracker, "Alpha").unwrap(), &alpha);
        assert!(resolve_project(&tracker, "Beta").is_err());
    }
}
