//! Agent abstraction and management.
//!
//! This module provides the `Agent` trait with its lifecycle discipline,
//! the per-agent event bus and timer set, the concrete agents, and the
//! `AgentManager` that coordinates them as a group.

pub mod adapters;
pub mod agent_type;
pub mod base;
pub mod events;
pub mod factory;
pub mod manager;
pub mod timers;

pub use adapters::{HeartbeatAgent, MockAgent, TaskOutcome, TodoAgent};
pub use agent_type::AgentKind;
pub use base::{Agent, AgentCore, AgentError, LifecycleState};
pub use events::{BusEvent, EventBus, SubscriptionId};
pub use factory::AgentFactory;
pub use manager::{AgentManager, ManagerError};
pub use timers::{TimerId, TimerSet};
