//! The client state snapshot and the reducer that folds actions into it.
//!
//! `reduce` is a total pure function: same inputs, same output, no side
//! effects. Request actions don't touch state (they exist for the
//! effect layer), so folding them is identity. All mutation of the
//! snapshot in the whole client goes through here.

use super::action::Action;
use crate::models::{Category, Task};

/// The client's cached view of the server, plus request bookkeeping.
///
/// Invariants: `in_progress` is true exactly between a `Started` and its
/// matching success/failure; `tasks` never holds two entries with the
/// same id.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub categories: Vec<Category>,
    pub in_progress: bool,
    pub error: Option<String>,
    pub new_task_description: String,
}

pub fn reduce(state: &Snapshot, action: &Action) -> Snapshot {
    match action {
        Action::SetNewTaskDescription(description) => Snapshot {
            new_task_description: description.clone(),
            ..state.clone()
        },

        Action::DismissError => Snapshot {
            error: None,
            ..state.clone()
        },

        Action::Started(_) => Snapshot {
            in_progress: true,
            error: None,
            ..state.clone()
        },

        Action::Failed { message, .. } => Snapshot {
            in_progress: false,
            error: Some(message.clone()),
            ..state.clone()
        },

        // ── Task merges ────────────────────────────────────────

        Action::ListTasksSuccess { tasks } => settled(Snapshot {
            tasks: tasks.clone(),
            ..state.clone()
        }),

        Action::AddTaskSuccess { task } => {
            let mut next = state.clone();
            // Guard the unique-id invariant against a replayed reply.
            if !next.tasks.iter().any(|t| t.id == task.id) {
                next.tasks.push(Task {
                    id: task.id,
                    description: task.description.clone(),
                    is_completed: false,
                    due_date: None,
                    category_id: None,
                });
            }
            settled(next)
        }

        Action::DeleteTaskSuccess { id } => {
            let mut next = state.clone();
            next.tasks.retain(|t| t.id != *id);
            settled(next)
        }

        Action::SetDueDateSuccess { task } | Action::ToggleCompleteSuccess { task } => {
            let mut next = state.clone();
            if let Some(slot) = next.tasks.iter_mut().find(|t| t.id == task.id) {
                *slot = task.clone();
            }
            settled(next)
        }

        // ── Category merges ────────────────────────────────────

        Action::FetchCategoriesSuccess { categories } => settled(Snapshot {
            categories: categories.clone(),
            ..state.clone()
        }),

        Action::CreateCategorySuccess { category } => {
            let mut next = state.clone();
            if !next.categories.iter().any(|c| c.id == category.id) {
                next.categories.push(category.clone());
            }
            settled(next)
        }

        Action::UpdateCategorySuccess { category } => {
            let mut next = state.clone();
            if let Some(slot) = next.categories.iter_mut().find(|c| c.id == category.id) {
                *slot = category.clone();
            }
            settled(next)
        }

        Action::DeleteCategorySuccess { id } => {
            let mut next = state.clone();
            next.categories.retain(|c| c.id != *id);
            settled(next)
        }

        // Requests carry no state change — the effect layer owns them.
        Action::ListTasks
        | Action::AddTask { .. }
        | Action::DeleteTask { .. }
        | Action::SetDueDate { .. }
        | Action::ToggleComplete { .. }
        | Action::FetchCategories
        | Action::CreateCategory { .. }
        | Action::UpdateCategory { .. }
        | Action::DeleteCategory { .. } => state.clone(),
    }
}

/// Every success settles the in-flight request the same way.
fn settled(snapshot: Snapshot) -> Snapshot {
    Snapshot {
        in_progress: false,
        error: None,
        ..snapshot
    }
}

// ── Tests ──────────────────────────────────────────────────────
