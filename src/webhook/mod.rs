//! Outbound notifications about time entries. The tracker only talks to [Notifier]; delivery is
//! handled by [http::HttpNotifier] in the background and never reports back.

pub mod http;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::storage::entities::{Project, TimeEntry};

pub const TIME_ENTRY_UPDATE_EVENT: &str = "time_entry_update";

/// Receives envelopes after an entry was created, completed or updated. Implementations must not
/// block and can't fail from the caller's point of view.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    fn notify(&self, url: &str, envelope: WebhookEnvelope);
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct WebhookEnvelope {
    pub data: WebhookEntryData,
    /// Moment of dispatch, `2024-04-05T12:00:00.000Z`.
    pub timestamp: String,
    pub event: String,
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEntryData {
    pub unique_id: String,
    pub project_name: String,
    pub project_id: String,
    /// `HH:MM:SS`
    pub start_time: String,
    /// `HH:MM:SS`, start plus duration.
    pub end_time: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub duration: u64,
    pub created_at: DateTime<Utc>,
}

impl WebhookEnvelope {
    /// Times and the date are rendered in `tz`, the zone the user works in. `None` if the entry
    /// has no representable end.
    pub fn for_entry<Tz: TimeZone>(
        entry: &TimeEntry,
        project: &Project,
        dispatched_at: DateTime<Utc>,
        tz: &Tz,
    ) -> Option<Self>
    where
        Tz::Offset: Display,
    {
        let start = entry.start_time.with_timezone(tz);
        let end = entry.end()?.with_timezone(tz);

        Some(Self {
            data: WebhookEntryData {
                unique_id: entry.id.clone(),
                project_name: project.name.clone(),
                project_id: project.id.clone(),
                start_time: start.format("%H:%M:%S").to_string(),
                end_time: end.format("%H:%M:%S").to_string(),
                date: start.format("%Y-%m-%d").to_string(),
                duration: entry.duration,
                created_at: entry.created_at,
            },
            timestamp: dispatched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            event: TIME_ENTRY_UPDATE_EVENT.into(),
        })
    }
}
