use anyhow::Result;
use clap::{CommandFactory, Subcommand};

use crate::storage::entities::{random_color, Project};

use super::{
    output::{parse_hex_color, print_project},
    resolve_project, Args, Tracker,
};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(about = "Create a project")]
    Add {
        name: String,
        #[arg(long, help = "Color as #rrggbb. Random by default")]
        color: Option<String>,
    },
    #[command(about = "List projects")]
    List {},
    #[command(about = "Rename or recolor a project. Its entries are updated as well")]
    Update {
        #[arg(help = "Project id or name")]
        project: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, help = "Color as #rrggbb")]
        color: Option<String>,
    },
    #[command(about = "Delete a project. Its entries are kept unless --with-entries is given")]
    Delete {
        #[arg(help = "Project id or name")]
        project: String,
        #[arg(long, help = "Delete the project and all its time entries")]
        with_entries: bool,
    },
}

pub fn process_project_command(tracker: &mut Tracker, command: ProjectCommand) -> Result<()> {
    match command {
        ProjectCommand::Add { name, color } => {
            let name = validate_name(&name)?;
            let color = match color {
                Some(color) => validate_color(color)?,
                None => random_color(),
            };
            let project = tracker.add_project(name, color);
            print_project(&project);
        }
        ProjectCommand::List {} => {
            if tracker.projects().is_empty() {
                println!("No projects yet");
            }
            for project in tracker.projects() {
                print_project(project);
            }
        }
        ProjectCommand::Update {
            project,
            name,
            color,
        } => {
            let current = resolve_project(tracker, &project)?;
            let updated = Project {
                name: match name {
                    Some(name) => validate_name(&name)?,
                    None => current.name.clone(),
                },
                color: match color {
                    Some(color) => validate_color(color)?,
                    None => current.color.clone(),
                },
                ..current.clone()
            };
            tracker.update_project(updated.clone());
            print_project(&updated);
        }
        ProjectCommand::Delete {
            project,
            with_entries,
        } => {
            let project = resolve_project(tracker, &project)?.clone();
            if with_entries {
                let removed = tracker.delete_project_with_entries(&project.id);
                println!("Deleted {} and {removed} entries", project.name);
            } else {
                tracker.delete_project(&project.id);
                println!("Deleted {}, its entries were kept", project.name);
            }
        }
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                "Project name can't be empty",
            )
            .into());
    }
    Ok(name.to_owned())
}

fn validate_color(color: String) -> Result<String> {
    if parse_hex_color(&color).is_none() {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Color {color:?} should look like #1a2b3c"),
            )
            .into());
    }
    Ok(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  Alpha ").unwrap(), "Alpha");
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn colors_are_checked() {
        assert_eq!(validate_color("#a1b2c3".into()).unwrap(), "#a1b2c3");
        assert!(validate_color("red".into()).is_err());
    }
}
