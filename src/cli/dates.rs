use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveTime};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses things like "yesterday", "last monday" or "15/03/2025" relative to now.
pub fn parse_date(value: &str, date_style: DateStyle) -> Result<DateTime<Local>> {
    match parse_date_string(value, Local::now(), date_style.into()) {
        Ok(v) => Ok(v.with_timezone(&Local)),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {value:?}: {e}"),
            )
            .into()),
    }
}

/// Wall clock time as `HH:MM`.
pub fn parse_clock_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
        Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate time {value:?}, expected HH:MM: {e}"),
            )
            .into()
    })
}
