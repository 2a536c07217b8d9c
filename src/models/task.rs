use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// What needs doing. Non-empty.
    pub description: String,
    /// Whether the task is done. Defaults to false on creation.
    pub completed: bool,
    /// Identifier of the owning user. Set server-side at creation from the
    /// authenticated identity and immutable afterwards.
    pub owner_id: i32,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
///
/// There is no owner field here: whatever the client sends for ownership is
/// ignored and the authenticated user id is used instead.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 1000 characters.
    #[validate(length(min = 1, max = 1000))]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

/// The explicit schema of task fields a client may change.
///
/// Any key other than `description`/`completed` (e.g. `owner_id`,
/// `created_at`) fails deserialization, rejecting the whole update before any
/// mutation is applied.
#[derive(Debug, Deserialize, Validate, Default)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.completed.is_none()
    }
}

impl Task {
    /// Creates a new `Task` from `TaskInput` and the authenticated owner's id.
    /// Sets `created_at`/`updated_at` to the current time and `id` to a new UUID.
    pub fn new(input: TaskInput, owner_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description: input.description,
            completed: input.completed,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let input = TaskInput {
            description: "Buy milk".to_string(),
            completed: false,
        };

        let task = Task::new(input, 1);
        assert_eq!(task.description, "Buy milk");
        assert_eq!(task.owner_id, 1);
        assert!(!task.completed);
    }

    #[test]
    fn test_task_input_validation() {
        let valid_input = TaskInput {
            description: "Valid task".to_string(),
            completed: true,
        };
        assert!(valid_input.validate().is_ok());

        let invalid_input = TaskInput {
            description: "".to_string(), // Empty description
            completed: false,
        };
        assert!(invalid_input.validate().is_err());

        let long_description = "a".repeat(1001);
        let invalid_input = TaskInput {
            description: long_description,
            completed: false,
        };
        assert!(invalid_input.validate().is_err());
    }

    #[test]
    fn test_task_input_completed_defaults_false() {
        let parsed: TaskInput =
            serde_json::from_value(serde_json::json!({ "description": "Walk the dog" })).unwrap();
        assert!(!parsed.completed);
    }

    #[test]
    fn test_task_input_ignores_client_supplied_owner() {
        // Create is lenient about extra keys; ownership comes from the
        // authenticated identity regardless of what the client claims.
        let parsed: TaskInput = serde_json::from_value(serde_json::json!({
            "description": "Walk the dog",
            "owner_id": 999
        }))
        .unwrap();
        let task = Task::new(parsed, 42);
        assert_eq!(task.owner_id, 42);
    }

    #[test]
    fn test_task_update_rejects_unknown_fields() {
        let payload = serde_json::json!({ "completed": true, "owner_id": 9 });
        let parsed: Result<TaskUpdate, _> = serde_json::from_value(payload);
        assert!(parsed.is_err());

        let payload = serde_json::json!({ "created_at": "2024-01-01T00:00:00Z" });
        let parsed: Result<TaskUpdate, _> = serde_json::from_value(payload);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_task_update_partial_payload_is_ok() {
        let parsed: TaskUpdate =
            serde_json::from_value(serde_json::json!({ "completed": true })).unwrap();
        assert_eq!(parsed.completed, Some(true));
        assert!(parsed.description.is_none());
        assert!(!parsed.is_empty());
    }
}
