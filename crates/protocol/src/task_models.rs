//! Task models dispatched to agents.
//!
//! A `Task` is an ephemeral, typed instruction: it is built by a caller,
//! passed by value into an agent's handler and not retained afterwards.
//!
//! Tasks arriving from outside the process (JSON on stdin, an IPC channel)
//! are first decoded as a [`RawTask`] and then converted, so an unrecognized
//! `type` tag surfaces as a [`TaskError`] naming the tag instead of a
//! generic deserialization failure.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::todo_models::TodoPatch;

/// The closed set of tasks a todo agent understands.
///
/// Uses adjacently tagged serialization:
/// ```json
/// {
///   "type": "update",
///   "data": { "id": "3f2b...", "patch": { "completed": true } }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Task {
    /// Create a new todo with the given title.
    Create { title: String },

    /// Shallow-merge `patch` into the todo with the given id.
    Update { id: String, patch: TodoPatch },

    /// Remove the todo with the given id.
    Delete { id: String },
}

impl Task {
    /// The wire tag of this task.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// An undecoded task as it crosses a serialization boundary.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct RawTask {
    #[serde(rename = "type")]
    pub task_type: String,

    #[serde(default)]
    pub data: serde_json::Value,
}

impl RawTask {
    pub fn new(task_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            task_type: task_type.into(),
            data,
        }
    }
}

/// Errors produced when turning a [`RawTask`] into a [`Task`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// The `type` tag is not one of the known task types.
    #[error("Unknown task type: {0}")]
    UnknownType(String),

    /// The tag is known but `data` does not have the expected shape.
    #[error("Invalid data for task type '{task_type}': {reason}")]
    InvalidData { task_type: String, reason: String },
}

impl TryFrom<RawTask> for Task {
    type Error = TaskError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        if !matches!(raw.task_type.as_str(), "create" | "update" | "delete") {
            return Err(TaskError::UnknownType(raw.task_type));
        }

        let task_type = raw.task_type.clone();
        let tagged = serde_json::json!({ "type": raw.task_type, "data": raw.data });
        serde_json::from_value(tagged).map_err(|e| TaskError::InvalidData {
            task_type,
            reason: e.to_string(),
        })
    }
}
