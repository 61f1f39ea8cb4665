//! Action descriptors for the client state engine.
//!
//! One closed sum type covers every state transition: the request
//! variants are consumed by the effect layer, the outcome variants are
//! produced by it, and a couple of synchronous variants touch the
//! snapshot directly. The reducer matches exhaustively, so adding a
//! variant is a compile error until every consumer handles it.

use crate::models::{Category, CategoryInput, CreatedTask, Task};
use chrono::{DateTime, Utc};

/// Tags one logical remote operation. Carried by `Started` and `Failed`
/// so the snapshot can tell which call a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    ListTasks,
    AddTask,
    DeleteTask,
    SetDueDate,
    ToggleComplete,
    FetchCategories,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // Synchronous: no effect, folded directly.
    SetNewTaskDescription(String),
    DismissError,

    // Requests: input to the effect layer, identity for the reducer.
    ListTasks,
    AddTask { description: String },
    DeleteTask { id: u64 },
    SetDueDate { id: u64, due_date: Option<DateTime<Utc>> },
    ToggleComplete { id: u64 },
    FetchCategories,
    CreateCategory { input: CategoryInput },
    UpdateCategory { id: u64, input: CategoryInput },
    DeleteCategory { id: u64 },

    // Outcomes: emitted by the effect layer, one triad per request.
    Started(Op),
    ListTasksSuccess { tasks: Vec<Task> },
    AddTaskSuccess { task: CreatedTask },
    DeleteTaskSuccess { id: u64 },
    SetDueDateSuccess { task: Task },
    ToggleCompleteSuccess { task: Task },
    FetchCategoriesSuccess { categories: Vec<Category> },
    CreateCategorySuccess { category: Category },
    UpdateCategorySuccess { category: Category },
    DeleteCategorySuccess { id: u64 },
    Failed { op: Op, message: String },
}
