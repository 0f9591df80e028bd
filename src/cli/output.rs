use ansi_term::Colour;
use chrono::{DateTime, Local, Utc};

use crate::storage::entities::{Project, TimeEntry, DELETED_PROJECT_NAME};

/// Colored dot for a `#rrggbb` color. Anything else gets a plain dot.
pub fn swatch(color: &str) -> String {
    match parse_hex_color(color) {
        Some((r, g, b)) => Colour::RGB(r, g, b).paint("●").to_string(),
        None => "●".into(),
    }
}

pub fn parse_hex_color(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn local(time: DateTime<Utc>) -> DateTime<Local> {
    time.with_timezone(&Local)
}

pub fn print_project(project: &Project) {
    println!("{}\t{} {}", project.id, swatch(&project.color), project.name);
}

/// Entries keep a copy of their project's name; once the project is gone they are shown as
/// deleted.
pub fn entry_project_name<'a>(entry: &'a TimeEntry, projects: &[Project]) -> &'a str {
    if projects.iter().any(|p| p.id == entry.project_id) {
        &entry.project_name
    } else {
        DELETED_PROJECT_NAME
    }
}
