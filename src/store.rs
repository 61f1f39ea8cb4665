//! Entity storage over redb.
//!
//! One file, three tables: tasks and categories as postcard rows keyed by
//! id, plus a meta table holding the id counters. redb iterates u64 keys
//! in ascending order, which is exactly the list order the API promises.

use crate::models::{Category, CategoryInput, Task};
use chrono::{DateTime, TimeZone, Utc};
use redb::{Database, ReadableTable, TableDefinition};
use std::sync::Arc;

const TASKS: TableDefinition<u64, &[u8]> = TableDefinition::new("tasks");
const CATEGORIES: TableDefinition<u64, &[u8]> = TableDefinition::new("categories");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const NEXT_TASK_ID: &str = "next_task_id";
const NEXT_CATEGORY_ID: &str = "next_category_id";

/// Thin handle to the redb file. Cloneable (Arc inside).
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    /// Open (or create) the store at the given path.
    /// Creates tables if they don't exist.
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(TASKS)?;
            let _ = txn.open_table(CATEGORIES)?;
            let _ = txn.open_table(META)?;
        }
        txn.commit()?;

        Ok(Store { db: Arc::new(db) })
    }

    // ── Tasks ──────────────────────────────────────────────────

    /// All tasks, ordered by id ascending.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TASKS)?;

        let mut tasks = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            tasks.push(decode::<Task>(value.value())?);
        }
        Ok(tasks)
    }

    pub fn get_task(&self, id: u64) -> Result<Option<Task>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(TASKS)?;
        match table.get(id)? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    /// Insert a new task with a freshly assigned id.
    pub fn add_task(&self, description: String) -> Result<Task, StoreError> {
        let txn = self.db.begin_write()?;
        let task;
        {
            let mut meta = txn.open_table(META)?;
            let id = next_id(&mut meta, NEXT_TASK_ID)?;

            task = Task {
                id,
                description,
                is_completed: false,
                due_date: None,
                category_id: None,
            };

            let mut tasks = txn.open_table(TASKS)?;
            tasks.insert(id, encode(&task)?.as_slice())?;
        }
        txn.commit()?;
        Ok(task)
    }

    /// Remove a task. Returns false if it wasn't there.
    pub fn delete_task(&self, id: u64) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let deleted;
        {
            let mut tasks = txn.open_table(TASKS)?;
            deleted = tasks.remove(id)?.is_some();
        }
        txn.commit()?;
        Ok(deleted)
    }

    /// Set (or clear) a task's due date. Returns the updated task,
    /// or None if the id is unknown.
    pub fn set_due_date(
        &self,
        id: u64,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<Option<Task>, StoreError> {
        self.update_task(id, |task| task.due_date = due_date)
    }

    /// Flip a task's completion flag. Returns the updated task,
    /// or None if the id is unknown.
    pub fn toggle_complete(&self, id: u64) -> Result<Option<Task>, StoreError> {
        self.update_task(id, |task| task.is_completed = !task.is_completed)
    }

    fn update_task(
        &self,
        id: u64,
        mutate: impl FnOnce(&mut Task),
    ) -> Result<Option<Task>, StoreError> {
        let txn = self.db.begin_write()?;
        let updated;
        {
            let mut tasks = txn.open_table(TASKS)?;
            let mut task: Task = match tasks.get(id)? {
                Some(data) => decode(data.value())?,
                None => return Ok(None),
            };
            mutate(&mut task);
            tasks.insert(id, encode(&task)?.as_slice())?;
            updated = task;
        }
        txn.commit()?;
        Ok(Some(updated))
    }

    // ── Categories ─────────────────────────────────────────────

    /// All categories, ordered by id ascending.
    pub fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(CATEGORIES)?;

        let mut categories = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            categories.push(decode::<Category>(value.value())?);
        }
        Ok(categories)
    }

    pub fn create_category(&self, input: &CategoryInput) -> Result<Category, StoreError> {
        let txn = self.db.begin_write()?;
        let category;
        {
            let mut meta = txn.open_table(META)?;
            let id = next_id(&mut meta, NEXT_CATEGORY_ID)?;

            category = Category {
                id,
                name: input.name.clone(),
                color: input.color.clone(),
                created_at: Utc::now(),
            };

            let mut categories = txn.open_table(CATEGORIES)?;
            categories.insert(id, encode(&category)?.as_slice())?;
        }
        txn.commit()?;
        Ok(category)
    }

    /// Replace a category's name and color. Returns the updated record,
    /// or None if the id is unknown.
    pub fn update_category(
        &self,
        id: u64,
        input: &CategoryInput,
    ) -> Result<Option<Category>, StoreError> {
        let txn = self.db.begin_write()?;
        let updated;
        {
            let mut categories = txn.open_table(CATEGORIES)?;
            let mut category: Category = match categories.get(id)? {
                Some(data) => decode(data.value())?,
                None => return Ok(None),
            };
            category.name = input.name.clone();
            category.color = input.color.clone();
            categories.insert(id, encode(&category)?.as_slice())?;
            updated = category;
        }
        txn.commit()?;
        Ok(Some(updated))
    }

    /// Remove a category and clear `category_id` on every task that
    /// referenced it. Tasks themselves are never deleted. Returns false
    /// if the category wasn't there.
    pub fn delete_category(&self, id: u64) -> Result<bool, StoreError> {
        let txn = self.db.begin_write()?;
        let deleted;
        {
            let mut categories = txn.open_table(CATEGORIES)?;
            deleted = categories.remove(id)?.is_some();

            if deleted {
                let mut tasks = txn.open_table(TASKS)?;
                let orphaned: Vec<Task> = {
                    let mut found = Vec::new();
                    for entry in tasks.iter()? {
                        let (_, value) = entry?;
                        let task: Task = decode(value.value())?;
                        if task.category_id == Some(id) {
                            found.push(task);
                        }
                    }
                    found
                };
                for mut task in orphaned {
                    task.category_id = None;
                    tasks.insert(task.id, encode(&task)?.as_slice())?;
                }
            }
        }
        txn.commit()?;
        Ok(deleted)
    }

    /// Seed the four default categories if the table is empty.
    /// Returns how many were created.
    pub fn ensure_default_categories(&self) -> Result<usize, StoreError> {
        if !self.list_categories()?.is_empty() {
            return Ok(0);
        }

        let defaults = [
            ("Work", "#3498db"),
            ("Personal", "#2ecc71"),
            ("Shopping", "#e74c3c"),
            ("Health", "#9b59b6"),
        ];
        let seeded_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let txn = self.db.begin_write()?;
        {
            let mut meta = txn.open_table(META)?;
            let mut categories = txn.open_table(CATEGORIES)?;
            for (name, color) in defaults {
                let id = next_id(&mut meta, NEXT_CATEGORY_ID)?;
                let category = Category {
                    id,
                    name: name.to_string(),
                    color: color.to_string(),
                    created_at: seeded_at,
                };
                categories.insert(id, encode(&category)?.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(defaults.len())
    }
}

// ── Row codec + id counters ────────────────────────────────────

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
    postcard::to_allocvec(value).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Bump and return the counter stored under `key`. Ids start at 1 and
/// never restart, even after deletes — the counter outlives the rows.
fn next_id(
    meta: &mut redb::Table<&str, u64>,
    key: &str,
) -> Result<u64, StoreError> {
    let next = match meta.get(key)? {
        Some(value) => value.value(),
        None => 1,
    };
    meta.insert(key, next + 1)?;
    Ok(next)
}

// ── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum StoreError {
    Redb(String),
    Decode(String),
    Encode(String),
}

// redb 2.x has many error types. Blanket them all into StoreError::Redb.
macro_rules! from_redb {
    ($($t:ty),*) => {
        $(impl From<$t> for StoreError {
            fn from(e: $t) -> Self { StoreError::Redb(e.to_string()) }
        })*
    };
}

from_redb!(
    redb::Error,
    redb::DatabaseError,
    redb::TableError,
    redb::TransactionError,
    redb::StorageError,
    redb::CommitError
);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Redb(e) => write!(f, "redb: {e}"),
            StoreError::Decode(e) => write!(f, "decode: {e}"),
            StoreError::Encode(e) => write!(f, "encode: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Create a temp store that auto-cleans.
    fn temp_store(name: &str) -> (Store, String) {
        let path = format!("/tmp/taskdeck_test_{name}_{}.redb", std::process::id());
        let _ = fs::remove_file(&path); // clean up any leftover
        let store = Store::open(&path).unwrap();
        (store, path)
    }

    fn cleanup(path: &str) {
        let _ = fs::remove_file(path);
    }

    #[test]
    fn open_empty_store() {
        let (store, path) = temp_store("empty");
        assert!(store.list_tasks().unwrap().is_empty());
        assert!(store.list_categories().unwrap().is_empty());
        cleanup(&path);
    }

    #[test]
    fn seed_once_and_reload() {
        let (store, path) = temp_store("seed");
        assert_eq!(store.ensure_default_categories().unwrap(), 4);

        // Reopen — data should be there, seeding should be a no-op
        drop(store);
        let store = Store::open(&path).unwrap();
        assert_eq!(store.ensure_default_categories().unwrap(), 0);

        let categories = store.list_categories().unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[0].name, "Work");
        assert_eq!(categories[0].color, "#3498db");
        assert_eq!(categories[3].name, "Health");

        cleanup(&path);
    }

    #[test]
    fn ids_are_monotonic_across_deletes_and_reboots() {
        let (store, path) = temp_store("ids");

        let a = store.add_task("first".into()).unwrap();
        let b = store.add_task("second".into()).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        assert!(store.delete_task(b.id).unwrap());
        drop(store);

        // Reopen — the counter must not reuse the deleted id
        let store = Store::open(&path).unwrap();
        let c = store.add_task("third".into()).unwrap();
        assert_eq!(c.id, 3);

        let ids: Vec<u64> = store.list_tasks().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);

        cleanup(&path);
    }

    #[test]
    fn toggle_and_due_date_round_trip() {
        let (store, path) = temp_store("update");

        let task = store.add_task("call dentist".into()).unwrap();
        assert!(!task.is_completed);

        let toggled = store.toggle_complete(task.id).unwrap().unwrap();
        assert!(toggled.is_completed);
        let toggled = store.toggle_complete(task.id).unwrap().unwrap();
        assert!(!toggled.is_completed);

        let due = Utc.with_ymd_and_hms(2026, 9, 1, 12, 0, 0).unwrap();
        let updated = store.set_due_date(task.id, Some(due)).unwrap().unwrap();
        assert_eq!(updated.due_date, Some(due));
        let updated = store.set_due_date(task.id, None).unwrap().unwrap();
        assert_eq!(updated.due_date, None);

        cleanup(&path);
    }

    #[test]
    fn updates_on_unknown_id_return_none() {
        let (store, path) = temp_store("missing");
        assert!(store.toggle_complete(99).unwrap().is_none());
        assert!(store.set_due_date(99, None).unwrap().is_none());
        assert!(!store.delete_task(99).unwrap());
        assert!(!store.delete_category(99).unwrap());
        cleanup(&path);
    }

    #[test]
    fn deleting_category_clears_task_references() {
        let (store, path) = temp_store("fk");
        store.ensure_default_categories().unwrap();

        let task = store.add_task("buy groceries".into()).unwrap();
        // Point the task at the Shopping category (id 3)
        let txn_task = store
            .update_task(task.id, |t| t.category_id = Some(3))
            .unwrap()
            .unwrap();
        assert_eq!(txn_task.category_id, Some(3));

        assert!(store.delete_category(3).unwrap());

        let task = store.get_task(task.id).unwrap().unwrap();
        assert_eq!(task.category_id, None);
        assert_eq!(store.list_categories().unwrap().len(), 3);

        cleanup(&path);
    }
}
