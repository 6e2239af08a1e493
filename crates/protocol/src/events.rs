//! Lifecycle and domain events.
//!
//! Two event streams exist, each owned by its emitter and never shared
//! across instances:
//! - `AgentEvent`: published by a single agent (lifecycle transitions and
//!   the agent's own domain events)
//! - `ManagerEvent`: published by the agent manager (registry changes and
//!   aggregate group lifecycle)
//!
//! Subscribers select events by their wire name (see [`event_names`]).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::todo_models::Todo;

/// Wire names of every event, as used for subscription.
pub mod event_names {
    pub const STARTED: &str = "started";
    pub const STOPPED: &str = "stopped";
    pub const TODO_CREATED: &str = "todoCreated";
    pub const TODO_UPDATED: &str = "todoUpdated";
    pub const TODO_DELETED: &str = "todoDeleted";
    pub const HEARTBEAT: &str = "heartbeat";

    pub const AGENT_REGISTERED: &str = "agentRegistered";
    pub const AGENT_UNREGISTERED: &str = "agentUnregistered";
    pub const AGENT_STARTED: &str = "agentStarted";
    pub const AGENT_STOPPED: &str = "agentStopped";
    pub const ALL_AGENTS_STARTED: &str = "allAgentsStarted";
    pub const ALL_AGENTS_STOPPED: &str = "allAgentsStopped";
}

/// Events published by an individual agent.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "todoCreated",
///   "payload": { "todo": { "id": "...", "title": "buy milk", "completed": false } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum AgentEvent {
    /// The agent transitioned from stopped to started.
    Started { agent: String },

    /// The agent transitioned from started to stopped.
    Stopped { agent: String },

    /// A todo agent created a todo.
    TodoCreated { todo: Todo },

    /// A todo agent merged a patch into one of its todos.
    TodoUpdated { todo: Todo },

    /// A todo agent removed a todo.
    TodoDeleted { todo: Todo },

    /// A heartbeat agent's interval fired.
    Heartbeat { agent: String, tick: u64 },
}

impl AgentEvent {
    /// The wire name subscribers use to select this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => event_names::STARTED,
            Self::Stopped { .. } => event_names::STOPPED,
            Self::TodoCreated { .. } => event_names::TODO_CREATED,
            Self::TodoUpdated { .. } => event_names::TODO_UPDATED,
            Self::TodoDeleted { .. } => event_names::TODO_DELETED,
            Self::Heartbeat { .. } => event_names::HEARTBEAT,
        }
    }
}

/// Events published by the agent manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ManagerEvent {
    /// An agent was added to (or overwrote an entry in) the registry.
    AgentRegistered { agent: String },

    /// An agent was removed from the registry.
    AgentUnregistered { agent: String },

    /// The manager started this agent as part of a group operation.
    AgentStarted { agent: String },

    /// The manager stopped this agent as part of a group operation.
    AgentStopped { agent: String },

    /// Every agent that was stopped has been started.
    AllAgentsStarted,

    /// Every agent that was started has been stopped.
    AllAgentsStopped,
}

impl ManagerEvent {
    /// The wire name subscribers use to select this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AgentRegistered { .. } => event_names::AGENT_REGISTERED,
            Self::AgentUnregistered { .. } => event_names::AGENT_UNREGISTERED,
            Self::AgentStarted { .. } => event_names::AGENT_STARTED,
            Self::AgentStopped { .. } => event_names::AGENT_STOPPED,
            Self::AllAgentsStarted => event_names::ALL_AGENTS_STARTED,
            Self::AllAgentsStopped => event_names::ALL_AGENTS_STOPPED,
        }
    }
}
