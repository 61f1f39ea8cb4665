//! Row presentation for task and category lists.
//!
//! Pure functions from a snapshot slice to display rows. Derived fields
//! (urgency band, formatted date) are computed from the raw due date at
//! render time against a caller-supplied "now" — never stored.

use super::state::Snapshot;
use crate::models::{Category, Task};
use chrono::{DateTime, Duration, Utc};

/// How urgently a task's due date should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyBand {
    /// Due date is in the past.
    Overdue,
    /// Due within the next 24 hours.
    DueSoon,
    Normal,
}

/// Band a task by its due date. Completed tasks and tasks without a due
/// date are never flagged.
pub fn urgency_band(task: &Task, now: DateTime<Utc>) -> UrgencyBand {
    if task.is_completed {
        return UrgencyBand::Normal;
    }
    match task.due_date {
        Some(due) if due < now => UrgencyBand::Overdue,
        Some(due) if due - now <= Duration::hours(24) => UrgencyBand::DueSoon,
        _ => UrgencyBand::Normal,
    }
}

pub fn format_due_date(due: DateTime<Utc>) -> String {
    due.format("%Y-%m-%d %H:%M").to_string()
}

// ── Rows ───────────────────────────────────────────────────────

/// One renderable task line.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: u64,
    pub completed: bool,
    pub description: String,
    pub due_date: Option<String>,
    pub urgency: UrgencyBand,
    /// Name of the referenced category, if it resolves.
    pub category: Option<String>,
}

/// One renderable category line.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: u64,
    pub name: String,
    pub color: String,
}

/// Project the tasks slice of a snapshot into rows, in snapshot order.
pub fn task_rows(snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<TaskRow> {
    snapshot
        .tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id,
            completed: task.is_completed,
            description: task.description.clone(),
            due_date: task.due_date.map(format_due_date),
            urgency: urgency_band(task, now),
            category: task
                .category_id
                .and_then(|id| category_name(&snapshot.categories, id)),
        })
        .collect()
}

pub fn category_rows(snapshot: &Snapshot) -> Vec<CategoryRow> {
    snapshot
        .categories
        .iter()
        .map(|category| CategoryRow {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
        })
        .collect()
}

fn category_name(categories: &[Category], id: u64) -> Option<String> {
    categories.iter().find(|c| c.id == id).map(|c| c.name.clone())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 12, 0, 0).unwrap()
    }

    fn task_due(due: Option<DateTime<Utc>>) -> Task {
        Task {
            id: 1,
            description: "x".into(),
            is_completed: false,
            due_date: due,
            category_id: None,
        }
    }

    #[test]
    fn banding_boundaries() {
        let now = now();

        // past due
        let overdue = task_due(Some(now - Duration::minutes(1)));
        assert_eq!(urgency_band(&overdue, now), UrgencyBand::Overdue);

        // inside the 24h window
        let soon = task_due(Some(now + Duration::hours(23)));
        assert_eq!(urgency_band(&soon, now), UrgencyBand::DueSoon);

        // exactly 24h out still warns
        let edge = task_due(Some(now + Duration::hours(24)));
        assert_eq!(urgency_band(&edge, now), UrgencyBand::DueSoon);

        // beyond the window
        let later = task_due(Some(now + Duration::hours(25)));
        assert_eq!(urgency_band(&later, now), UrgencyBand::Normal);

        // no due date
        assert_eq!(urgency_band(&task_due(None), now), UrgencyBand::Normal);
    }

    #[test]
    fn completed_tasks_are_never_flagged() {
        let mut task = task_due(Some(now() - Duration::days(3)));
        task.is_completed = true;
        assert_eq!(urgency_band(&task, now()), UrgencyBand::Normal);
    }

    #[test]
    fn rows_resolve_category_names() {
        let snapshot = Snapshot {
            tasks: vec![
                Task {
                    id: 1,
                    description: "pay rent".into(),
                    is_completed: false,
                    due_date: Some(now() + Duration::hours(3)),
                    category_id: Some(2),
                },
                Task {
                    id: 2,
                    description: "dangling reference".into(),
                    is_completed: false,
                    due_date: None,
                    category_id: Some(99),
                },
            ],
            categories: vec![Category {
                id: 2,
                name: "Personal".into(),
                color: "#2ecc71".into(),
                created_at: now(),
            }],
            ..Snapshot::default()
        };

        let rows = task_rows(&snapshot, now());
        assert_eq!(rows[0].category.as_deref(), Some("Personal"));
        assert_eq!(rows[0].urgency, UrgencyBand::DueSoon);
        assert_eq!(rows[0].due_date.as_deref(), Some("2026-06-15 15:00"));
        assert_eq!(rows[1].category, None);
    }
}
