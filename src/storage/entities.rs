use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DELETED_PROJECT_NAME: &str = "Deleted Project";
pub const UNKNOWN_PROJECT_NAME: &str = "Unknown Project";
pub const UNKNOWN_PROJECT_COLOR: &str = "#CBD5E1";

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            color: color.into(),
            created_at,
        }
    }

    /// Stand-in shown for entries whose project no longer exists.
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: UNKNOWN_PROJECT_NAME.into(),
            color: UNKNOWN_PROJECT_COLOR.into(),
            created_at: DateTime::<Utc>::default(),
        }
    }
}

/// A tracked interval. `project_name` and `project_color` are a snapshot of the project and are
/// only rewritten when the project itself gets updated.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: String,
    pub project_id: String,
    pub project_name: String,
    pub project_color: String,
    pub start_time: DateTime<Utc>,
    /// Seconds.
    pub duration: u64,
    // Older records were written without it.
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl TimeEntry {
    pub fn new(
        project: &Project,
        start_time: DateTime<Utc>,
        duration: u64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: new_id(),
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            project_color: project.color.clone(),
            start_time,
            duration,
            created_at,
        }
    }

    /// `None` when the duration is too large to land on a representable instant.
    pub fn end(&self) -> Option<DateTime<Utc>> {
        let duration = TimeDelta::try_seconds(i64::try_from(self.duration).ok()?)?;
        self.start_time.checked_add_signed(duration)
    }

    pub fn with_duration(self, duration: u64) -> Self {
        Self { duration, ..self }
    }

    pub fn with_start(self, start_time: DateTime<Utc>) -> Self {
        Self { start_time, ..self }
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub name: String,
    pub email: String,
    pub webhook_url: String,
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Random `#rrggbb` color for new projects.
pub fn random_color() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    format!("#{:02x}{:02x}{:02x}", bytes[0], bytes[1], bytes[2])
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn entry_uses_camel_case_keys() -> anyhow::Result<()> {
        let created = Utc.with_ymd_and_hms(2024, 4, 1, 8, 0, 0).unwrap();
        let project = Project::new("Alpha", "#112233", created);
        let entry = TimeEntry::new(
            &project,
            Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap(),
            90,
            Utc.with_ymd_and_hms(2024, 4, 5, 12, 1, 30).unwrap(),
        );

        let value = serde_json::to_value(&entry)?;
        assert_eq!(value["projectId"], project.id.as_str());
        assert_eq!(value["projectName"], "Alpha");
        assert_eq!(value["projectColor"], "#112233");
        assert_eq!(value["startTime"], "2024-04-05T12:00:00Z");
        assert_eq!(value["duration"], 90);
        Ok(())
    }

    #[test]
    fn entry_without_created_at_loads() -> anyhow::Result<()> {
        let entry: TimeEntry = serde_json::from_str(
            r##"{"id":"a","projectId":"p","projectName":"Alpha","projectColor":"#000000",
                "startTime":"2024-04-05T12:00:00.000Z","duration":60}"##,
        )?;
        assert_eq!(entry.project_color, "#000000");
        assert_eq!(entry.created_at, DateTime::<Utc>::default());
        assert_eq!(entry.end(), Some(Utc.with_ymd_and_hms(2024, 4, 5, 12, 1, 0).unwrap()));
        Ok(())
    }

    #[test]
    fn huge_duration_has_no_end() {
        let start = Utc.with_ymd_and_hms(2024, 4, 5, 12, 0, 0).unwrap();
        let project = Project::new("Alpha", "#112233", start);
        let entry = TimeEntry::new(&project, start, 60_000_000_000_000_000, start);

        assert_eq!(entry.end(), None);
        assert_eq!(entry.clone().with_duration(u64::MAX).end(), None);
    }

    #[test]
    fn settings_fill_missing_fields() -> anyhow::Result<()> {
        let settings: UserSettings =
            serde_json::from_str(r#"{"webhookUrl":"http://localhost/hook"}"#)?;
        assert_eq!(settings.webhook_url, "http://localhost/hook");
        assert!(settings.name.is_empty());
        Ok(())
    }

    #[test]
    fn random_color_is_hex() {
        let color = random_color();
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
