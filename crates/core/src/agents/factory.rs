//! Agent factory for creating agent instances from definitions.

use crate::agents::adapters::{HeartbeatAgent, MockAgent, TodoAgent};
use crate::agents::agent_type::AgentKind;
use crate::agents::base::{Agent, AgentError};
use ak_protocol::AgentDefinition;
use std::sync::Arc;
use tracing::debug;

/// Factory for creating agent instances based on their definition.
pub struct AgentFactory;

impl AgentFactory {
    /// Create an agent instance from a definition.
    ///
    /// The `kind` field selects the implementation:
    /// - `todo` → [`TodoAgent`], preloaded with the definition's seed todos
    /// - `heartbeat` → [`HeartbeatAgent`], ticking every `interval_ms`
    /// - `mock` → [`MockAgent`]
    ///
    /// # Errors
    ///
    /// `AgentError::UnknownKind` if `kind` names no implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ak_core::agents::AgentFactory;
    /// use ak_protocol::AgentDefinition;
    ///
    /// let definition = AgentDefinition::new("todo-1", "todo");
    /// let agent = AgentFactory::create(&definition).unwrap();
    /// assert_eq!(agent.name(), "todo-1");
    /// ```
    pub fn create(definition: &AgentDefinition) -> Result<Arc<dyn Agent>, AgentError> {
        let kind = AgentKind::from_kind_name(&definition.kind)?;
        debug!(agent = %definition.name, kind = %kind, "Creating agent");

        let agent: Arc<dyn Agent> = match kind {
            AgentKind::Todo => Arc::new(TodoAgent::from_definition(definition)),
            AgentKind::Heartbeat => Arc::new(HeartbeatAgent::from_definition(definition)),
            AgentKind::Mock => Arc::new(MockAgent::from_definition(definition)),
        };
        Ok(agent)
    }

    /// Create a todo agent, keeping its concrete type so tasks can be routed
    /// to it.
    ///
    /// # Errors
    ///
    /// `AgentError::UnknownKind` for an unknown kind and
    /// `AgentError::NotATodoAgent` for any other known kind.
    pub fn create_todo(definition: &AgentDefinition) -> Result<Arc<TodoAgent>, AgentError> {
        match AgentKind::from_kind_name(&definition.kind)? {
            AgentKind::Todo => Ok(Arc::new(TodoAgent::from_definition(definition))),
            _ => Err(AgentError::NotATodoAgent(definition.name.clone())),
        }
    }
}
