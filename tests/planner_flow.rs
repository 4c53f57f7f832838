use chrono::{Duration, Utc};
use taskdeck::model::{PlannerError, Status, TaskDraft};
use taskdeck::rules::sort_for_display;
use taskdeck::storage::Storage;
use taskdeck::theme::BackgroundTheme;
use tempfile::tempdir;

fn draft(title: &str, days_ahead: i64) -> TaskDraft {
    TaskDraft {
        title: title.into(),
        deadline: Some(Utc::now().date_naive() + Duration::days(days_ahead)),
        ..TaskDraft::default()
    }
}

#[test]
fn full_session_survives_a_restart() {
    let temp = tempdir().unwrap();
    let storage = Storage::at(temp.path());

    // first run: the three built-in categories, nothing else
    let mut planner = storage.load();
    assert_eq!(planner.categories.len(), 3);
    assert_eq!(planner.active_category.as_deref(), Some("cat"));

    let errands = planner.add_category("Errands").unwrap();
    let groceries = planner.add_task(&errands, draft("Buy groceries", 1)).unwrap();
    let laundry = planner.add_task(&errands, draft("Do laundry", 3)).unwrap();
    planner.add_task("cat", draft("Mock test", 7)).unwrap();

    assert!(planner.toggle_task(&errands, &groceries));
    planner.dark_mode = true;
    planner.background_theme = BackgroundTheme::GradientForest;
    storage.save(&planner);

    // restart
    let reloaded = storage.load();
    assert_eq!(reloaded.categories.len(), 4);
    assert_eq!(reloaded.category(&errands).unwrap().task_count, 2);
    assert_eq!(reloaded.pending_count(&errands), 1);
    assert_eq!(reloaded.category("cat").unwrap().task_count, 1);
    assert!(reloaded.dark_mode);
    assert_eq!(reloaded.background_theme, BackgroundTheme::GradientForest);

    let restored = reloaded
        .category_tasks(&errands)
        .iter()
        .find(|t| t.id == groceries)
        .unwrap();
    assert_eq!(restored.status, Status::Done);

    // delete flows after the restart
    let mut reloaded = reloaded;
    assert!(reloaded.delete_task(&errands, &laundry));
    assert_eq!(reloaded.category(&errands).unwrap().task_count, 1);
    reloaded.delete_category(&errands).unwrap();
    assert!(reloaded.category(&errands).is_none());
    storage.save(&reloaded);

    let after = storage.load();
    assert_eq!(after.categories.len(), 3);
    assert!(after.category_tasks(&errands).is_empty());
}

#[test]
fn built_in_categories_cannot_be_deleted() {
    let temp = tempdir().unwrap();
    let storage = Storage::at(temp.path());
    let mut planner = storage.load();

    for id in ["cat", "placements", "data-analytics"] {
        let err = planner.delete_category(id).unwrap_err();
        assert!(matches!(err, PlannerError::ReservedCategory(_)));
    }
    storage.save(&planner);
    assert_eq!(storage.load().categories.len(), 3);
}

#[test]
fn display_order_is_stable_across_reloads() {
    let temp = tempdir().unwrap();
    let storage = Storage::at(temp.path());
    let mut planner = storage.load();

    let mut high = draft("Urgent", 1);
    high.priority = taskdeck::model::Priority::High;
    let mut low = draft("Whenever", 1);
    low.priority = taskdeck::model::Priority::Low;
    planner.add_task("cat", low).unwrap();
    planner.add_task("cat", high).unwrap();
    planner.add_task("cat", draft("Soonish", 2)).unwrap();
    storage.save(&planner);

    let reloaded = storage.load();
    let sorted = sort_for_display(reloaded.category_tasks("cat"));
    let titles: Vec<&str> = sorted.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Urgent", "Soonish", "Whenever"]);

    // sorting is a view, storage keeps insertion order
    let stored: Vec<&str> = reloaded
        .category_tasks("cat")
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(stored, vec!["Whenever", "Urgent", "Soonish"]);
}
