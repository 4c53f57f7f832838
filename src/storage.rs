use crate::model::{Category, CategoryId, Planner, Task};
use crate::theme::BackgroundTheme;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::warn;

// The four persisted keys, one file each. A failure on one never blocks the
// others.
const CATEGORIES_KEY: &str = "categories.yml";
const TASKS_KEY: &str = "tasks.yml";
const DARK_MODE_KEY: &str = "dark-mode.yml";
const BACKGROUND_THEME_KEY: &str = "background-theme";

#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Storage rooted at the per-user data directory.
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "taskdeck").context("locating data directory")?;
        Ok(Storage::at(dirs.data_dir()))
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Storage { dir: dir.into() }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Reads the snapshot. Each key loads independently: an absent key keeps
    /// the first-run default and a corrupt key is logged and skipped, so a
    /// bad tasks file cannot take the theme down with it. Never fails.
    pub fn load(&self) -> Planner {
        let mut planner = Planner::first_run();
        if let Some(categories) = self.read_key::<Vec<Category>>(CATEGORIES_KEY) {
            planner.categories = categories;
        }
        if let Some(tasks) = self.read_key::<HashMap<CategoryId, Vec<Task>>>(TASKS_KEY) {
            planner.tasks = tasks;
        }
        if let Some(dark_mode) = self.read_key::<bool>(DARK_MODE_KEY) {
            planner.dark_mode = dark_mode;
        }
        if let Some(raw) = self.read_string(BACKGROUND_THEME_KEY) {
            planner.background_theme = BackgroundTheme::parse(&raw);
        }
        planner.reconcile();
        planner
    }

    /// Writes all four keys. Fire-and-forget: failures are logged and the
    /// application keeps running on its in-memory state, so a full disk or
    /// read-only data dir never turns fatal.
    pub fn save(&self, planner: &Planner) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), %err, "could not create data directory, skipping save");
            return;
        }
        self.write_key(CATEGORIES_KEY, &planner.categories);
        self.write_key(TASKS_KEY, &planner.tasks);
        self.write_key(DARK_MODE_KEY, &planner.dark_mode);
        if let Err(err) = fs::write(
            self.dir.join(BACKGROUND_THEME_KEY),
            planner.background_theme.as_str(),
        ) {
            warn!(key = BACKGROUND_THEME_KEY, %err, "failed to write key");
        }
    }

    fn read_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read_string(key)?;
        match serde_yaml::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, %err, "failed to parse key, keeping default");
                None
            }
        }
    }

    fn read_string(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.dir.join(key)) {
            Ok(raw) => Some(raw),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                warn!(key, %err, "failed to read key, keeping default");
                None
            }
        }
    }

    fn write_key<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_yaml::to_string(value) {
            Ok(s) => s,
            Err(err) => {
                warn!(key, %err, "failed to serialize key");
                return;
            }
        };
        if let Err(err) = fs::write(self.dir.join(key), serialized) {
            warn!(key, %err, "failed to write key");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskDraft;
    use chrono::{Duration, Utc};
    use tempfile::tempdir;

    fn sample_planner() -> Planner {
        let mut planner = Planner::first_run();
        let fitness = planner.add_category("Fitness").unwrap();
        planner
            .add_task(
                "cat",
                TaskDraft {
                    title: "Read Ch.1".into(),
                    deadline: Some(Utc::now().date_naive() + Duration::days(2)),
                    ..TaskDraft::default()
                },
            )
            .unwrap();
        planner
            .add_task(
                &fitness,
                TaskDraft {
                    title: "Run 5k".into(),
                    deadline: Some(Utc::now().date_naive() + Duration::days(4)),
                    ..TaskDraft::default()
                },
            )
            .unwrap();
        planner.dark_mode = true;
        planner.background_theme = BackgroundTheme::GradientOcean;
        planner
    }

    #[test]
    fn save_load_round_trips_all_four_keys() {
        let temp = tempdir().unwrap();
        let storage = Storage::at(temp.path());
        let planner = sample_planner();
        storage.save(&planner);

        let loaded = storage.load();
        assert_eq!(loaded.categories.len(), planner.categories.len());
        for (a, b) in loaded.categories.iter().zip(&planner.categories) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.name, b.name);
            assert_eq!(a.task_count, b.task_count);
        }
        assert_eq!(loaded.tasks.len(), planner.tasks.len());
        let original = &planner.category_tasks("cat")[0];
        let restored = &loaded.category_tasks("cat")[0];
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.title, original.title);
        assert_eq!(restored.deadline, original.deadline);
        assert_eq!(restored.status, original.status);
        assert_eq!(restored.priority, original.priority);
        assert_eq!(restored.recurring, original.recurring);
        assert_eq!(restored.created_at, original.created_at);
        assert!(loaded.dark_mode);
        assert_eq!(loaded.background_theme, BackgroundTheme::GradientOcean);
    }

    #[test]
    fn missing_keys_fall_back_to_first_run_defaults() {
        let temp = tempdir().unwrap();
        let storage = Storage::at(temp.path());
        let loaded = storage.load();
        assert_eq!(loaded.categories.len(), 3);
        assert!(!loaded.dark_mode);
        assert_eq!(loaded.background_theme, BackgroundTheme::default());
        assert_eq!(loaded.active_category.as_deref(), Some("cat"));
    }

    #[test]
    fn corrupt_key_does_not_abort_the_others() {
        let temp = tempdir().unwrap();
        let storage = Storage::at(temp.path());
        let planner = sample_planner();
        storage.save(&planner);
        fs::write(temp.path().join(TASKS_KEY), "{ this is not yaml").unwrap();

        let loaded = storage.load();
        // tasks fell back, everything else survived
        assert!(loaded.category_tasks("cat").is_empty());
        assert_eq!(loaded.categories.len(), 4);
        assert!(loaded.dark_mode);
        assert_eq!(loaded.background_theme, BackgroundTheme::GradientOcean);
    }

    #[test]
    fn unknown_background_theme_loads_as_default() {
        let temp = tempdir().unwrap();
        let storage = Storage::at(temp.path());
        fs::create_dir_all(temp.path()).unwrap();
        fs::write(temp.path().join(BACKGROUND_THEME_KEY), "gradient-plaid").unwrap();
        let loaded = storage.load();
        assert_eq!(loaded.background_theme, BackgroundTheme::default());
    }

    #[test]
    fn counts_are_recomputed_on_load() {
        let temp = tempdir().unwrap();
        let storage = Storage::at(temp.path());
        let mut planner = sample_planner();
        // stale counts on disk must not survive a load
        planner.categories[0].task_count = 99;
        storage.save(&planner);
        let loaded = storage.load();
        assert_eq!(loaded.category("cat").unwrap().task_count, 1);
    }
}
