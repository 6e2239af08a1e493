//! Agent definition models for `.agent-kit/agents/*.md`.
//!
//! This module defines the structure of agent definition files.
//! Agents are defined as Markdown files with YAML front matter.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Represents an agent's definition as loaded from disk.
///
/// Agents are defined in `.agent-kit/agents/*.md` files with YAML front matter
/// containing metadata. For todo agents the file body may hold a checklist of
/// todos the agent starts out with.
///
/// # Example
///
/// ```markdown
/// ---
/// name: groceries
/// kind: todo
/// description: Weekly shopping list
/// ---
///
/// - [ ] buy milk
/// - [x] buy bread
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct AgentDefinition {
    /// Unique identifier for this agent.
    ///
    /// Used as the registry key in the agent manager and to route tasks.
    pub name: String,

    /// Which concrete agent to build (e.g., "todo", "heartbeat").
    pub kind: String,

    /// Human-readable description of the agent's purpose.
    #[serde(default)]
    pub description: Option<String>,

    /// Tick period in milliseconds for agents that run on an interval.
    #[serde(default)]
    pub interval_ms: Option<u64>,

    /// Todos parsed from the checklist in the Markdown body.
    ///
    /// Not part of the front matter, so it is skipped during serialization.
    #[serde(skip)]
    pub seed_todos: Vec<SeedTodo>,
}

impl AgentDefinition {
    /// Create a definition with only the required fields set.
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            description: None,
            interval_ms: None,
            seed_todos: Vec::new(),
        }
    }
}

/// A todo declared up front in an agent definition.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct SeedTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}
