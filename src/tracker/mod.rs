//! [TimeTracker] owns projects, completed entries and the single running entry. Its methods are
//! the only way to change them, and each one mirrors what it changed into the
//! [KeyValueStore] right away. Entry changes are announced through the [Notifier].

use chrono::{DateTime, Local, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    storage::{
        entities::{Project, TimeEntry, UserSettings},
        key_value::KeyValueStore,
        StoreKey,
    },
    utils::clock::Clock,
    webhook::{Notifier, WebhookEnvelope},
};

/// A completed entry entered by hand instead of through the timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeEntry {
    pub project_id: String,
    pub start_time: DateTime<Utc>,
    /// Seconds.
    pub duration: u64,
}

pub struct TimeTracker<S: KeyValueStore> {
    store: S,
    notifier: Box<dyn Notifier>,
    clock: Box<dyn Clock>,
    projects: Vec<Project>,
    time_entries: Vec<TimeEntry>,
    active_entry: Option<TimeEntry>,
}

impl<S: KeyValueStore> TimeTracker<S> {
    /// Restores state from `store`. Missing or unreadable collections start out empty.
    pub fn load(store: S, notifier: Box<dyn Notifier>, clock: Box<dyn Clock>) -> Self {
        let projects = load_value(&store, StoreKey::Projects).unwrap_or_default();
        let time_entries = load_value(&store, StoreKey::TimeEntries).unwrap_or_default();
        let active_entry = load_value(&store, StoreKey::ActiveEntry);

        Self {
            store,
            notifier,
            clock,
            projects,
            time_entries,
            active_entry,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn time_entries(&self) -> &[TimeEntry] {
        &self.time_entries
    }

    pub fn active_entry(&self) -> Option<&TimeEntry> {
        self.active_entry.as_ref()
    }

    pub fn find_project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn find_time_entry(&self, id: &str) -> Option<&TimeEntry> {
        self.time_entries.iter().find(|e| e.id == id)
    }

    /// Seconds the running entry has been going for.
    pub fn active_elapsed(&self) -> Option<u64> {
        self.active_entry
            .as_ref()
            .map(|entry| elapsed_seconds(entry.start_time, self.clock.time()))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn add_project(&mut self, name: impl Into<String>, color: impl Into<String>) -> Project {
        let project = Project::new(name, color, self.clock.time());
        info!("Adding project {} ({})", project.name, project.id);
        self.projects.push(project.clone());
        self.persist(StoreKey::Projects);
        project
    }

    /// Replaces the project with the same id and rewrites the name and color copied into its
    /// entries, the running one included. Returns `false` if there was no such project.
    pub fn update_project(&mut self, project: Project) -> bool {
        let Some(existing) = self.projects.iter_mut().find(|p| p.id == project.id) else {
            debug!("No project {} to update", project.id);
            return false;
        };
        *existing = project.clone();

        let mut rewritten = 0;
        for entry in self
            .time_entries
            .iter_mut()
            .chain(self.active_entry.as_mut())
            .filter(|entry| entry.project_id == project.id)
        {
            entry.project_name = project.name.clone();
            entry.project_color = project.color.clone();
            rewritten += 1;
        }
        info!("Updated project {}, rewrote {rewritten} entries", project.id);

        self.persist(StoreKey::Projects);
        self.persist(StoreKey::TimeEntries);
        self.persist(StoreKey::ActiveEntry);
        true
    }

    /// Removes only the project. Its entries stay and show up as belonging to a deleted project.
    pub fn delete_project(&mut self, id: &str) -> Option<Project> {
        let position = self.projects.iter().position(|p| p.id == id)?;
        let project = self.projects.remove(position);
        info!("Deleted project {id}");
        self.persist(StoreKey::Projects);
        Some(project)
    }

    /// Removes the project together with all of its entries. A running entry for the project is
    /// thrown away without being completed. Returns the number of completed entries removed.
    pub fn delete_project_with_entries(&mut self, id: &str) -> usize {
        let before = self.time_entries.len();
        self.time_entries.retain(|entry| entry.project_id != id);
        let removed = before - self.time_entries.len();
        self.projects.retain(|p| p.id != id);

        info!("Deleted project {id} with {removed} entries");
        self.persist(StoreKey::Projects);
        self.persist(StoreKey::TimeEntries);

        if self
            .active_entry
            .as_ref()
            .is_some_and(|entry| entry.project_id == id)
        {
            info!("Discarding running entry of deleted project {id}");
            self.active_entry = None;
            self.persist(StoreKey::ActiveEntry);
        }
        removed
    }

    /// Starts a new running entry for the project. Does nothing if the project doesn't exist.
    ///
    /// A running entry is replaced, not completed: its time is lost.
    pub fn start_timer(&mut self, project_id: &str) -> Option<TimeEntry> {
        let Some(project) = self.find_project(project_id) else {
            debug!("Can't start timer for missing project {project_id}");
            return None;
        };
        let now = self.clock.time();
        let entry = TimeEntry::new(project, now, 0, now);

        if let Some(previous) = &self.active_entry {
            warn!(
                "Starting a timer discards running entry {} of {} started at {}",
                previous.id, previous.project_name, previous.start_time
            );
        }
        info!("Started timer {} for {}", entry.id, entry.project_name);

        self.active_entry = Some(entry.clone());
        self.persist(StoreKey::ActiveEntry);
        Some(entry)
    }

    /// Completes the running entry with the whole seconds elapsed since it started.
    pub fn stop_timer(&mut self) -> Option<TimeEntry> {
        let active = self.active_entry.take()?;
        let duration = elapsed_seconds(active.start_time, self.clock.time());
        let completed = active.with_duration(duration);
        info!("Stopped timer {} after {duration}s", completed.id);

        self.time_entries.push(completed.clone());
        self.persist(StoreKey::TimeEntries);
        self.persist(StoreKey::ActiveEntry);
        self.dispatch(&completed);
        Some(completed)
    }

    /// Adds a completed entry directly. Does nothing if the project doesn't exist.
    pub fn add_time_entry(&mut self, new_entry: NewTimeEntry) -> Option<TimeEntry> {
        let Some(project) = self.find_project(&new_entry.project_id) else {
            debug!("Can't add entry for missing project {}", new_entry.project_id);
            return None;
        };
        let entry = TimeEntry::new(
            project,
            new_entry.start_time,
            new_entry.duration,
            self.clock.time(),
        );
        info!("Added entry {} of {}s", entry.id, entry.duration);

        self.time_entries.push(entry.clone());
        self.persist(StoreKey::TimeEntries);
        self.dispatch(&entry);
        Some(entry)
    }

    /// Replaces the completed entry with the same id as a whole. Returns `false` if there was no
    /// such entry.
    pub fn update_time_entry(&mut self, entry: TimeEntry) -> bool {
        let Some(existing) = self.time_entries.iter_mut().find(|e| e.id == entry.id) else {
            debug!("No entry {} to update", entry.id);
            return false;
        };
        *existing = entry.clone();
        info!("Updated entry {}", entry.id);

        self.persist(StoreKey::TimeEntries);
        self.dispatch(&entry);
        true
    }

    pub fn delete_time_entry(&mut self, id: &str) -> Option<TimeEntry> {
        let position = self.time_entries.iter().position(|e| e.id == id)?;
        let entry = self.time_entries.remove(position);
        info!("Deleted entry {id}");
        self.persist(StoreKey::TimeEntries);
        Some(entry)
    }

    /// Forgets every project and entry. Settings are kept.
    pub fn delete_all_data(&mut self) {
        self.projects.clear();
        self.time_entries.clear();
        self.active_entry = None;
        warn!("Deleting all projects and entries");

        for key in [StoreKey::Projects, StoreKey::TimeEntries, StoreKey::ActiveEntry] {
            if let Err(e) = self.store.remove(key) {
                error!("Error removing {}: {e:?}", key.as_str());
            }
        }
    }

    pub fn settings(&self) -> UserSettings {
        load_value(&self.store, StoreKey::UserSettings).unwrap_or_default()
    }

    pub fn update_settings(&mut self, settings: &UserSettings) {
        if let Err(e) = save_value(&mut self.store, StoreKey::UserSettings, settings) {
            error!("Error saving settings: {e:?}");
        }
    }

    /// Mirrors one collection into the store. Failures are logged and the in-memory state is
    /// kept as is.
    fn persist(&mut self, key: StoreKey) {
        let result = match key {
            StoreKey::Projects => save_value(&mut self.store, key, &self.projects),
            StoreKey::TimeEntries => save_value(&mut self.store, key, &self.time_entries),
            StoreKey::ActiveEntry => match &self.active_entry {
                Some(entry) => save_value(&mut self.store, key, entry),
                None => self.store.remove(key),
            },
            // Not held in memory, written directly by update_settings.
            StoreKey::UserSettings => Ok(()),
        };
        if let Err(e) = result {
            error!("Error saving {}: {e:?}", key.as_str());
        }
    }

    /// Hands the entry to the notifier if a webhook is configured and the project still exists.
    fn dispatch(&self, entry: &TimeEntry) {
        let settings = self.settings();
        if settings.webhook_url.is_empty() {
            return;
        }
        let Some(project) = self.find_project(&entry.project_id) else {
            debug!("Skipping webhook for entry {} of missing project", entry.id);
            return;
        };
        let Some(envelope) =
            WebhookEnvelope::for_entry(entry, project, self.clock.time(), &Local)
        else {
            warn!(
                "Skipping webhook for entry {}, duration {}s is out of range",
                entry.id, entry.duration
            );
            return;
        };
        self.notifier.notify(&settings.webhook_url, envelope);
    }
}

fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - start).num_seconds().max(0) as u64
}

fn load_value<T: DeserializeOwned>(store: &impl KeyValueStore, key: StoreKey) -> Option<T> {
    let raw = match store.get(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!("Error loading {}: {e:?}", key.as_str());
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Discarding malformed {}: {e}", key.as_str());
            None
        }
    }
}

fn save_value<T: Serialize + ?Sized>(
    store: &mut impl KeyValueStore,
    key: StoreKey,
    value: &T,
) -> anyhow::Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}
