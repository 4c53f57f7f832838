use crate::theme::BackgroundTheme;
use chrono::{DateTime, NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type CategoryId = String;
pub type TaskId = String;

/// Built-in categories present on first run. They can be renamed but the
/// store refuses to delete them.
pub const RESERVED_CATEGORIES: [&str; 3] = ["cat", "placements", "data-analytics"];

pub fn is_reserved(category_id: &str) -> bool {
    RESERVED_CATEGORIES.contains(&category_id)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Derived: always the length of this category's task list. Recomputed
    /// by the store after every task mutation, never set directly.
    pub task_count: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub deadline: NaiveDate,
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub recurring: Recurrence,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Done,
}

impl Status {
    pub fn toggled(self) -> Self {
        match self {
            Status::Pending => Status::Done,
            Status::Done => Status::Pending,
        }
    }

    /// Pending sorts before done when everything else ties.
    pub fn display_rank(self) -> u8 {
        match self {
            Status::Pending => 0,
            Status::Done => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Done => "Done",
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

// Stored values that are not high/medium/low fall back to medium instead of
// failing the whole tasks key.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        })
    }
}

impl Priority {
    /// High outranks medium outranks low in display order.
    pub fn weight(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

/// Inert metadata: stored and displayed, never expanded into future task
/// instances.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn label(self) -> &'static str {
        match self {
            Recurrence::None => "No Repeat",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
        }
    }
}

/// Field values for a task about to be created. Validation happens in
/// [`Planner::add_task`], so the deadline stays optional here.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub deadline: Option<NaiveDate>,
    pub status: Status,
    pub priority: Priority,
    pub recurring: Recurrence,
}

#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    #[error("task title must not be empty")]
    EmptyTitle,
    #[error("task deadline is required")]
    MissingDeadline,
    #[error("deadline {0} is in the past")]
    PastDeadline(NaiveDate),
    #[error("category name must not be empty")]
    EmptyCategoryName,
    #[error("category not found: {0}")]
    CategoryNotFound(String),
    #[error("category {0} is built in and cannot be deleted")]
    ReservedCategory(String),
}

/// The whole application state: ordered categories, the category -> task
/// mapping, and the two theme fields. The active category is session state
/// and is never persisted.
#[derive(Debug, Clone)]
pub struct Planner {
    pub categories: Vec<Category>,
    pub tasks: HashMap<CategoryId, Vec<Task>>,
    pub dark_mode: bool,
    pub background_theme: BackgroundTheme,
    pub active_category: Option<CategoryId>,
}

impl Default for Planner {
    fn default() -> Self {
        Planner::first_run()
    }
}

impl Planner {
    /// State before anything has been persisted: the three built-in
    /// categories, each with an empty task list.
    pub fn first_run() -> Self {
        let categories = vec![
            Category {
                id: "cat".into(),
                name: "CAT Preparation".into(),
                task_count: 0,
            },
            Category {
                id: "placements".into(),
                name: "Placements".into(),
                task_count: 0,
            },
            Category {
                id: "data-analytics".into(),
                name: "Data Analytics".into(),
                task_count: 0,
            },
        ];
        let tasks = categories
            .iter()
            .map(|c| (c.id.clone(), Vec::new()))
            .collect();
        Planner {
            categories,
            tasks,
            dark_mode: false,
            background_theme: BackgroundTheme::default(),
            active_category: Some("cat".into()),
        }
    }

    pub fn category(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    /// Tasks of one category in insertion order. Missing categories read as
    /// empty rather than panicking on stale ids.
    pub fn category_tasks(&self, category_id: &str) -> &[Task] {
        self.tasks
            .get(category_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn active_tasks(&self) -> &[Task] {
        match &self.active_category {
            Some(id) => self.category_tasks(id),
            None => &[],
        }
    }

    /// Selects the active category; ignored if the id does not exist.
    pub fn select_category(&mut self, category_id: &str) -> bool {
        if self.category(category_id).is_some() {
            self.active_category = Some(category_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn add_task(
        &mut self,
        category_id: &str,
        draft: TaskDraft,
    ) -> Result<TaskId, PlannerError> {
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(PlannerError::EmptyTitle);
        }
        let deadline = draft.deadline.ok_or(PlannerError::MissingDeadline)?;
        let today = Utc::now().date_naive();
        if deadline < today {
            return Err(PlannerError::PastDeadline(deadline));
        }
        if self.category(category_id).is_none() {
            return Err(PlannerError::CategoryNotFound(category_id.to_string()));
        }
        let id = self.generate_task_id();
        let task = Task {
            id: id.clone(),
            title: title.to_string(),
            deadline,
            status: draft.status,
            priority: draft.priority,
            recurring: draft.recurring,
            created_at: Utc::now(),
        };
        self.tasks
            .entry(category_id.to_string())
            .or_default()
            .push(task);
        self.recompute_counts();
        Ok(id)
    }

    /// Flips pending/done. Returns false when the id is not in the category,
    /// which is benign (stale UI reference), not an error.
    pub fn toggle_task(&mut self, category_id: &str, task_id: &str) -> bool {
        let Some(list) = self.tasks.get_mut(category_id) else {
            return false;
        };
        match list.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.status = task.status.toggled();
                true
            }
            None => false,
        }
    }

    /// Removes the task unconditionally; confirming destructive intent is
    /// the presentation layer's job. Unknown ids are a no-op.
    pub fn delete_task(&mut self, category_id: &str, task_id: &str) -> bool {
        let Some(list) = self.tasks.get_mut(category_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|t| t.id != task_id);
        let removed = list.len() != before;
        if removed {
            self.recompute_counts();
        }
        removed
    }

    /// Creates the category and its empty task list atomically.
    pub fn add_category(&mut self, name: &str) -> Result<CategoryId, PlannerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlannerError::EmptyCategoryName);
        }
        let id = self.generate_category_id();
        self.categories.push(Category {
            id: id.clone(),
            name: name.to_string(),
            task_count: 0,
        });
        self.tasks.insert(id.clone(), Vec::new());
        Ok(id)
    }

    /// Renames a category, built-ins included. An unknown id is a silent
    /// no-op.
    pub fn rename_category(
        &mut self,
        category_id: &str,
        new_name: &str,
    ) -> Result<(), PlannerError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(PlannerError::EmptyCategoryName);
        }
        if let Some(category) = self.categories.iter_mut().find(|c| c.id == category_id) {
            category.name = new_name.to_string();
        }
        Ok(())
    }

    /// Removes a category and its entire task list. Built-in categories are
    /// refused here in the store rather than only hidden by the UI. If the
    /// active category was deleted, the first remaining category becomes
    /// active.
    pub fn delete_category(&mut self, category_id: &str) -> Result<(), PlannerError> {
        if is_reserved(category_id) {
            return Err(PlannerError::ReservedCategory(category_id.to_string()));
        }
        if self.category(category_id).is_none() {
            return Ok(());
        }
        self.categories.retain(|c| c.id != category_id);
        self.tasks.remove(category_id);
        if self.active_category.as_deref() == Some(category_id) {
            self.active_category = self.categories.first().map(|c| c.id.clone());
        }
        self.recompute_counts();
        Ok(())
    }

    /// Sets every category's count to the length of its task list.
    /// Idempotent; called after every operation that adds or removes a task.
    pub fn recompute_counts(&mut self) {
        for category in &mut self.categories {
            category.task_count = self.tasks.get(&category.id).map(Vec::len).unwrap_or(0);
        }
    }

    /// Restores the category-ids == task-map-keys invariant after loading
    /// snapshots written by older or partially corrupt state.
    pub fn reconcile(&mut self) {
        for category in &self.categories {
            self.tasks.entry(category.id.clone()).or_default();
        }
        let known: Vec<CategoryId> = self.categories.iter().map(|c| c.id.clone()).collect();
        self.tasks.retain(|id, _| known.contains(id));
        match &self.active_category {
            Some(id) if self.tasks.contains_key(id) => {}
            _ => self.active_category = self.categories.first().map(|c| c.id.clone()),
        }
        self.recompute_counts();
    }

    pub fn pending_count(&self, category_id: &str) -> usize {
        self.category_tasks(category_id)
            .iter()
            .filter(|t| t.status == Status::Pending)
            .count()
    }

    fn generate_task_id(&self) -> TaskId {
        loop {
            let id = format!("task_{}_{}", Utc::now().timestamp_millis(), alnum(9));
            let taken = self.tasks.values().flatten().any(|t| t.id == id);
            if !taken {
                return id;
            }
        }
    }

    fn generate_category_id(&self) -> CategoryId {
        loop {
            let id = format!("category_{}_{}", Utc::now().timestamp_millis(), alnum(9));
            if self.category(&id).is_none() && !is_reserved(&id) {
                return id;
            }
        }
    }
}

fn alnum(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(title: &str, days_ahead: i64) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            deadline: Some(Utc::now().date_naive() + Duration::days(days_ahead)),
            ..TaskDraft::default()
        }
    }

    #[test]
    fn first_run_has_reserved_categories_with_empty_lists() {
        let planner = Planner::first_run();
        assert_eq!(planner.categories.len(), 3);
        for id in RESERVED_CATEGORIES {
            assert!(planner.category(id).is_some());
            assert!(planner.category_tasks(id).is_empty());
        }
        assert_eq!(planner.active_category.as_deref(), Some("cat"));
    }

    #[test]
    fn add_category_creates_empty_task_list() {
        let mut planner = Planner::first_run();
        let id = planner.add_category("Fitness").unwrap();
        let category = planner.category(&id).unwrap();
        assert_eq!(category.name, "Fitness");
        assert_eq!(category.task_count, 0);
        assert!(planner.category_tasks(&id).is_empty());
        assert!(planner.tasks.contains_key(&id));
    }

    #[test]
    fn add_category_rejects_blank_name() {
        let mut planner = Planner::first_run();
        assert!(matches!(
            planner.add_category("   "),
            Err(PlannerError::EmptyCategoryName)
        ));
        assert_eq!(planner.categories.len(), 3);
    }

    #[test]
    fn add_task_updates_count() {
        let mut planner = Planner::first_run();
        planner.add_task("cat", draft("Read Ch.1", 2)).unwrap();
        assert_eq!(planner.category("cat").unwrap().task_count, 1);
        assert_eq!(planner.category_tasks("cat").len(), 1);
    }

    #[test]
    fn add_task_validation() {
        let mut planner = Planner::first_run();
        assert!(matches!(
            planner.add_task("cat", draft("   ", 1)),
            Err(PlannerError::EmptyTitle)
        ));
        let no_deadline = TaskDraft {
            title: "Something".into(),
            ..TaskDraft::default()
        };
        assert!(matches!(
            planner.add_task("cat", no_deadline),
            Err(PlannerError::MissingDeadline)
        ));
        assert!(matches!(
            planner.add_task("cat", draft("Yesterday", -1)),
            Err(PlannerError::PastDeadline(_))
        ));
        assert!(matches!(
            planner.add_task("nope", draft("Orphan", 1)),
            Err(PlannerError::CategoryNotFound(_))
        ));
        assert_eq!(planner.category("cat").unwrap().task_count, 0);
    }

    #[test]
    fn toggle_twice_returns_to_original_status() {
        let mut planner = Planner::first_run();
        let id = planner.add_task("cat", draft("Flip me", 1)).unwrap();
        assert!(planner.toggle_task("cat", &id));
        assert_eq!(planner.category_tasks("cat")[0].status, Status::Done);
        assert!(planner.toggle_task("cat", &id));
        assert_eq!(planner.category_tasks("cat")[0].status, Status::Pending);
        assert_eq!(planner.category("cat").unwrap().task_count, 1);
    }

    #[test]
    fn toggle_unknown_task_is_noop() {
        let mut planner = Planner::first_run();
        assert!(!planner.toggle_task("cat", "task_0_missing"));
    }

    #[test]
    fn delete_unknown_task_leaves_list_unchanged() {
        let mut planner = Planner::first_run();
        planner.add_task("cat", draft("Keep me", 1)).unwrap();
        assert!(!planner.delete_task("cat", "task_0_missing"));
        assert_eq!(planner.category_tasks("cat").len(), 1);
        assert_eq!(planner.category("cat").unwrap().task_count, 1);
    }

    #[test]
    fn delete_task_updates_count() {
        let mut planner = Planner::first_run();
        let id = planner.add_task("cat", draft("Short lived", 1)).unwrap();
        assert!(planner.delete_task("cat", &id));
        assert_eq!(planner.category("cat").unwrap().task_count, 0);
    }

    #[test]
    fn deleting_active_category_reassigns_to_first_remaining() {
        let mut planner = Planner::first_run();
        let id = planner.add_category("Fitness").unwrap();
        planner.select_category(&id);
        planner.delete_category(&id).unwrap();
        assert_eq!(planner.active_category.as_deref(), Some("cat"));
    }

    #[test]
    fn delete_category_removes_its_tasks() {
        let mut planner = Planner::first_run();
        let id = planner.add_category("Fitness").unwrap();
        planner.add_task(&id, draft("Run", 3)).unwrap();
        planner.delete_category(&id).unwrap();
        assert!(planner.category(&id).is_none());
        assert!(!planner.tasks.contains_key(&id));
    }

    #[test]
    fn reserved_categories_cannot_be_deleted() {
        let mut planner = Planner::first_run();
        for id in RESERVED_CATEGORIES {
            assert!(matches!(
                planner.delete_category(id),
                Err(PlannerError::ReservedCategory(_))
            ));
        }
        assert_eq!(planner.categories.len(), 3);
    }

    #[test]
    fn reserved_categories_can_be_renamed() {
        let mut planner = Planner::first_run();
        planner.rename_category("cat", "Entrance Exams").unwrap();
        assert_eq!(planner.category("cat").unwrap().name, "Entrance Exams");
    }

    #[test]
    fn rename_unknown_category_is_silent() {
        let mut planner = Planner::first_run();
        planner.rename_category("nope", "Anything").unwrap();
        assert_eq!(planner.categories.len(), 3);
        assert!(planner.category("nope").is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut planner = Planner::first_run();
        let a = planner.add_task("cat", draft("One", 1)).unwrap();
        let b = planner.add_task("cat", draft("Two", 1)).unwrap();
        assert_ne!(a, b);
        let c1 = planner.add_category("X").unwrap();
        let c2 = planner.add_category("Y").unwrap();
        assert_ne!(c1, c2);
    }

    #[test]
    fn reconcile_restores_task_lists_for_categories() {
        let mut planner = Planner::first_run();
        planner.tasks.remove("placements");
        planner.tasks.insert("ghost".into(), vec![]);
        planner.reconcile();
        assert!(planner.tasks.contains_key("placements"));
        assert!(!planner.tasks.contains_key("ghost"));
    }

    #[test]
    fn unknown_priority_deserializes_as_medium() {
        let priority: Priority = serde_yaml::from_str("urgent").unwrap();
        assert_eq!(priority, Priority::Medium);
        let high: Priority = serde_yaml::from_str("high").unwrap();
        assert_eq!(high, Priority::High);
    }
}
