//! Todo entity models.
//!
//! A `Todo` is owned by exactly one todo agent and is never shared between
//! agents. Callers only ever see clones of it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single todo item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct Todo {
    /// Opaque identifier, unique within the owning agent.
    pub id: String,

    /// Short title.
    pub title: String,

    /// Whether the todo has been completed.
    #[serde(default)]
    pub completed: bool,
}

impl Todo {
    /// Create a pending todo with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
        }
    }

    /// Shallow-merge a patch into this todo. Fields absent from the patch
    /// are left untouched.
    pub fn apply(&mut self, patch: &TodoPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// A partial update to a `Todo`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
pub struct TodoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TodoPatch {
    /// A patch that only marks the todo as completed.
    pub fn completed() -> Self {
        Self {
            title: None,
            completed: Some(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_partial_patch() {
        let mut todo = Todo::new("1", "buy milk");
        todo.apply(&TodoPatch::completed());

        assert_eq!(todo.title, "buy milk");
        assert!(todo.completed);
    }

    #[test]
    fn test_apply_title_only() {
        let mut todo = Todo::new("1", "buy milk");
        todo.apply(&TodoPatch {
            title: Some("buy oat milk".to_string()),
            completed: None,
        });

        assert_eq!(todo.title, "buy oat milk");
        assert!(!todo.completed);
    }
}
