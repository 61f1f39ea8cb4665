use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Entities ───────────────────────────────────────────────────

/// A to-do item. Identity is server-assigned and monotonic.
///
/// `category_id` is a nullable reference — deleting a category clears it
/// on every task that pointed at it, it never deletes the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub is_completed: bool,
    // No skip on the optionals: rows are postcard-encoded in the store,
    // and postcard requires every field present. JSON gets explicit nulls.
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category_id: Option<u64>,
}

/// A task category. Color is a `#RRGGBB` string shown next to the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

// ── API request/response types ─────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
}

/// Reply to `POST /api/tasks` — just the assigned id echoed with the
/// description, the client fills in the rest of the record itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: u64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDueDateRequest {
    pub due_date: Option<DateTime<Utc>>,
}

/// Body of `POST /api/categories` and `PUT /api/categories/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub color: String,
}

pub const CATEGORY_NAME_MAX: usize = 100;

impl CategoryInput {
    /// Validate name and color bounds. Color must be `#RRGGBB`.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("category name must not be empty");
        }
        if self.name.len() > CATEGORY_NAME_MAX {
            return Err("category name too long");
        }
        let bytes = self.color.as_bytes();
        if bytes.len() != 7 || bytes[0] != b'#' {
            return Err("color must be #RRGGBB");
        }
        if !bytes[1..].iter().all(|b| b.is_ascii_hexdigit()) {
            return Err("color must be #RRGGBB");
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_json_uses_boundary_field_names() {
        let task = Task {
            id: 3,
            description: "Water plants".into(),
            is_completed: true,
            due_date: None,
            category_id: Some(1),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["isCompleted"], true);
        assert_eq!(json["categoryId"], 1);
        assert!(json["dueDate"].is_null());
    }

    #[test]
    fn category_input_validation() {
        let ok = CategoryInput { name: "Work".into(), color: "#3498db".into() };
        assert!(ok.validate().is_ok());

        let empty = CategoryInput { name: "".into(), color: "#3498db".into() };
        assert!(empty.validate().is_err());

        let long = CategoryInput { name: "x".repeat(101), color: "#3498db".into() };
        assert!(long.validate().is_err());

        for bad in ["3498db", "#3498d", "#3498dbff", "#3498dg"] {
            let input = CategoryInput { name: "Work".into(), color: bad.into() };
            assert!(input.validate().is_err(), "accepted {bad}");
        }
    }
}
