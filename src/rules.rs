use crate::model::Task;
use chrono::NaiveDate;
use ratatui::prelude::Color;

/// Display order for a category's tasks: priority first (high before medium
/// before low), earlier deadline next, pending before done last. Stable for
/// ties, never mutates its input, and is recomputed on every render so the
/// stored insertion order stays untouched.
pub fn sort_for_display(tasks: &[Task]) -> Vec<Task> {
    let mut sorted = tasks.to_vec();
    sorted.sort_by(|a, b| {
        b.priority
            .weight()
            .cmp(&a.priority.weight())
            .then(a.deadline.cmp(&b.deadline))
            .then(a.status.display_rank().cmp(&b.status.display_rank()))
    });
    sorted
}

/// Urgency of a deadline relative to `today`, from the whole-day gap between
/// the two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    Overdue,
    DueToday,
    DueTomorrow,
    DueInDays(i64),
    Scheduled(NaiveDate),
}

pub fn classify_deadline(deadline: NaiveDate, today: NaiveDate) -> DeadlineStatus {
    let days = (deadline - today).num_days();
    if days < 0 {
        DeadlineStatus::Overdue
    } else if days == 0 {
        DeadlineStatus::DueToday
    } else if days == 1 {
        DeadlineStatus::DueTomorrow
    } else if days <= 7 {
        DeadlineStatus::DueInDays(days)
    } else {
        DeadlineStatus::Scheduled(deadline)
    }
}

impl DeadlineStatus {
    pub fn label(&self) -> String {
        match self {
            DeadlineStatus::Overdue => "Overdue".into(),
            DeadlineStatus::DueToday => "Due Today".into(),
            DeadlineStatus::DueTomorrow => "Due Tomorrow".into(),
            DeadlineStatus::DueInDays(days) => format!("Due in {} days", days),
            DeadlineStatus::Scheduled(date) => date.format("%b %-d, %Y").to_string(),
        }
    }

    /// Urgency color for the task list: red for overdue through gray for far
    /// future.
    pub fn color(&self) -> Color {
        match self {
            DeadlineStatus::Overdue => Color::Red,
            DeadlineStatus::DueToday => Color::LightRed,
            DeadlineStatus::DueTomorrow => Color::Yellow,
            DeadlineStatus::DueInDays(_) => Color::LightBlue,
            DeadlineStatus::Scheduled(_) => Color::Gray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status, Task};
    use chrono::{Duration, TimeZone, Utc};

    fn task(title: &str, priority: Priority, days_ahead: i64, status: Status) -> Task {
        Task {
            id: format!("task_test_{}", title),
            title: title.to_string(),
            deadline: Utc::now().date_naive() + Duration::days(days_ahead),
            status,
            priority,
            recurring: Default::default(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn priority_dominates_deadline() {
        let tasks = vec![
            task("soon but medium", Priority::Medium, 1, Status::Pending),
            task("late but high", Priority::High, 30, Status::Pending),
        ];
        let sorted = sort_for_display(&tasks);
        assert_eq!(sorted[0].title, "late but high");
    }

    #[test]
    fn same_deadline_orders_high_before_low() {
        let tasks = vec![
            task("low", Priority::Low, 3, Status::Pending),
            task("high", Priority::High, 3, Status::Pending),
        ];
        let sorted = sort_for_display(&tasks);
        assert_eq!(sorted[0].title, "high");
        assert_eq!(sorted[1].title, "low");
    }

    #[test]
    fn earlier_deadline_first_within_priority() {
        let tasks = vec![
            task("later", Priority::Medium, 5, Status::Pending),
            task("sooner", Priority::Medium, 2, Status::Pending),
        ];
        let sorted = sort_for_display(&tasks);
        assert_eq!(sorted[0].title, "sooner");
    }

    #[test]
    fn pending_before_done_on_full_tie() {
        let tasks = vec![
            task("finished", Priority::Medium, 2, Status::Done),
            task("open", Priority::Medium, 2, Status::Pending),
        ];
        let sorted = sort_for_display(&tasks);
        assert_eq!(sorted[0].title, "open");
    }

    #[test]
    fn sort_is_stable_and_idempotent() {
        let tasks = vec![
            task("a", Priority::Medium, 2, Status::Pending),
            task("b", Priority::Medium, 2, Status::Pending),
            task("c", Priority::High, 9, Status::Done),
        ];
        let once = sort_for_display(&tasks);
        let twice = sort_for_display(&once);
        let once_ids: Vec<_> = once.iter().map(|t| t.id.clone()).collect();
        let twice_ids: Vec<_> = twice.iter().map(|t| t.id.clone()).collect();
        assert_eq!(once_ids, twice_ids);
        // ties keep input order
        assert_eq!(once[1].title, "a");
        assert_eq!(once[2].title, "b");
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let tasks = vec![
            task("z", Priority::Low, 1, Status::Pending),
            task("a", Priority::High, 1, Status::Pending),
        ];
        let _ = sort_for_display(&tasks);
        assert_eq!(tasks[0].title, "z");
    }

    #[test]
    fn deadline_classes() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let day = |d: i64| today + Duration::days(d);
        assert_eq!(classify_deadline(day(-1), today), DeadlineStatus::Overdue);
        assert_eq!(classify_deadline(day(0), today), DeadlineStatus::DueToday);
        assert_eq!(
            classify_deadline(day(1), today),
            DeadlineStatus::DueTomorrow
        );
        assert_eq!(
            classify_deadline(day(2), today),
            DeadlineStatus::DueInDays(2)
        );
        assert_eq!(
            classify_deadline(day(7), today),
            DeadlineStatus::DueInDays(7)
        );
        assert_eq!(
            classify_deadline(day(8), today),
            DeadlineStatus::Scheduled(day(8))
        );
    }

    #[test]
    fn deadline_labels() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(
            classify_deadline(today + Duration::days(2), today).label(),
            "Due in 2 days"
        );
        assert_eq!(
            classify_deadline(NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(), today).label(),
            "Apr 5, 2025"
        );
    }
}
