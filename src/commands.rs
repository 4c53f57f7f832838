use crate::model::{is_reserved, Planner, Priority, Recurrence, TaskDraft};
use crate::rules::{classify_deadline, sort_for_display};
use crate::storage::Storage;
use crate::theme::{BackgroundTheme, ALL_THEMES};
use crate::ui;
use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, Utc};
use std::io::{self, BufRead, Write};

pub fn list(category: Option<String>) -> Result<()> {
    let (planner, _) = load_planner()?;
    if let Some(ref filter) = category {
        if planner.category(filter).is_none() {
            bail!("category not found: {}", filter);
        }
    }
    let today = Utc::now().date_naive();
    for cat in &planner.categories {
        if let Some(ref filter) = category {
            if &cat.id != filter {
                continue;
            }
        }
        println!(
            "{} [{}] ({} tasks, {} pending)",
            cat.name,
            cat.id,
            cat.task_count,
            planner.pending_count(&cat.id)
        );
        let tasks = sort_for_display(planner.category_tasks(&cat.id));
        if tasks.is_empty() {
            println!("  (empty)");
        }
        for task in &tasks {
            let marker = match task.status {
                crate::model::Status::Done => "x",
                crate::model::Status::Pending => " ",
            };
            let mut line = format!(
                "  [{}] {}  {} priority, {}",
                marker,
                task.title,
                task.priority.label(),
                classify_deadline(task.deadline, today).label()
            );
            if task.recurring != Recurrence::None {
                line.push_str(&format!(", repeats {}", task.recurring.label().to_lowercase()));
            }
            line.push_str(&format!("  ({})", task.id));
            println!("{}", line);
        }
        println!();
    }
    Ok(())
}

pub fn add(
    title: String,
    deadline: String,
    priority: String,
    recurring: String,
    category: Option<String>,
) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    let category_id = category
        .or_else(|| planner.categories.first().map(|c| c.id.clone()))
        .ok_or_else(|| anyhow!("no categories exist"))?;
    let draft = TaskDraft {
        title,
        deadline: Some(parse_deadline(&deadline)?),
        priority: parse_priority(&priority)?,
        recurring: parse_recurrence(&recurring)?,
        ..TaskDraft::default()
    };
    let id = planner.add_task(&category_id, draft)?;
    storage.save(&planner);
    println!("Added task {} to {}", id, category_id);
    Ok(())
}

pub fn toggle(task_id: String, category: Option<String>) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    let category_id = resolve_task_category(&planner, &task_id, category)?;
    if planner.toggle_task(&category_id, &task_id) {
        storage.save(&planner);
        let status = planner
            .category_tasks(&category_id)
            .iter()
            .find(|t| t.id == task_id)
            .map(|t| t.status.label())
            .unwrap_or("?");
        println!("Task {} is now {}", task_id, status.to_lowercase());
    } else {
        println!("Task {} not found, nothing to do", task_id);
    }
    Ok(())
}

pub fn delete(task_id: String, category: Option<String>, yes: bool) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    let category_id = resolve_task_category(&planner, &task_id, category)?;
    if !yes && !confirm(&format!("Delete task {}?", task_id))? {
        println!("Canceled");
        return Ok(());
    }
    if planner.delete_task(&category_id, &task_id) {
        storage.save(&planner);
        println!("Deleted task {}", task_id);
    } else {
        println!("Task {} not found, nothing to do", task_id);
    }
    Ok(())
}

pub fn category_list() -> Result<()> {
    let (planner, _) = load_planner()?;
    for cat in &planner.categories {
        let marker = if is_reserved(&cat.id) { " (built-in)" } else { "" };
        println!("{} [{}] {} tasks{}", cat.name, cat.id, cat.task_count, marker);
    }
    Ok(())
}

pub fn category_add(name: String) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    let id = planner.add_category(&name)?;
    storage.save(&planner);
    println!("Added category {} [{}]", name.trim(), id);
    Ok(())
}

pub fn category_rename(category_id: String, name: String) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    if planner.category(&category_id).is_none() {
        println!("Category {} not found, nothing to do", category_id);
        return Ok(());
    }
    planner.rename_category(&category_id, &name)?;
    storage.save(&planner);
    println!("Renamed category {} to {}", category_id, name.trim());
    Ok(())
}

pub fn category_delete(category_id: String, yes: bool) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    let Some(category) = planner.category(&category_id) else {
        println!("Category {} not found, nothing to do", category_id);
        return Ok(());
    };
    let task_count = category.task_count;
    if !yes
        && !confirm(&format!(
            "Delete category {} and its {} task(s)?",
            category_id, task_count
        ))?
    {
        println!("Canceled");
        return Ok(());
    }
    planner.delete_category(&category_id)?;
    storage.save(&planner);
    println!("Deleted category {}", category_id);
    Ok(())
}

pub fn theme_dark(enabled: bool) -> Result<()> {
    let (mut planner, storage) = load_planner()?;
    planner.dark_mode = enabled;
    storage.save(&planner);
    println!(
        "Dark mode {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

pub fn theme_background(id: String) -> Result<()> {
    let theme = BackgroundTheme::parse(&id);
    if theme.as_str() != id.trim() {
        bail!(
            "unknown theme id: {} (run `taskdeck theme list` for options)",
            id
        );
    }
    let (mut planner, storage) = load_planner()?;
    planner.background_theme = theme;
    storage.save(&planner);
    println!("Background theme set to {} ({})", theme.as_str(), theme.display_name());
    Ok(())
}

pub fn theme_list() -> Result<()> {
    let (planner, _) = load_planner()?;
    for theme in ALL_THEMES {
        let marker = if theme == planner.background_theme {
            " *"
        } else {
            ""
        };
        println!("{:<16} {}{}", theme.as_str(), theme.display_name(), marker);
    }
    Ok(())
}

pub fn tui() -> Result<()> {
    let (planner, storage) = load_planner()?;
    ui::run(planner, storage)
}

fn load_planner() -> Result<(Planner, Storage)> {
    let storage = Storage::open()?;
    let planner = storage.load();
    Ok((planner, storage))
}

/// The category context for a task id: the given one if present, otherwise
/// the first category that contains the task.
fn resolve_task_category(
    planner: &Planner,
    task_id: &str,
    category: Option<String>,
) -> Result<String> {
    if let Some(id) = category {
        if planner.category(&id).is_none() {
            bail!("category not found: {}", id);
        }
        return Ok(id);
    }
    planner
        .categories
        .iter()
        .find(|c| planner.category_tasks(&c.id).iter().any(|t| t.id == task_id))
        .map(|c| c.id.clone())
        .ok_or_else(|| anyhow!("task not found in any category: {}", task_id))
}

fn parse_deadline(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| anyhow!("invalid deadline (use YYYY-MM-DD): {}", raw))
}

fn parse_priority(raw: &str) -> Result<Priority> {
    match raw.trim().to_lowercase().as_str() {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        "low" => Ok(Priority::Low),
        other => Err(anyhow!("invalid priority (high/medium/low): {}", other)),
    }
}

fn parse_recurrence(raw: &str) -> Result<Recurrence> {
    match raw.trim().to_lowercase().as_str() {
        "none" => Ok(Recurrence::None),
        "daily" => Ok(Recurrence::Daily),
        "weekly" => Ok(Recurrence::Weekly),
        "monthly" => Ok(Recurrence::Monthly),
        other => Err(anyhow!(
            "invalid recurrence (none/daily/weekly/monthly): {}",
            other
        )),
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
