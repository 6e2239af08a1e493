//! # ak-core
//!
//! Agent lifecycle and task-dispatch runtime for agent-kit.
//!
//! This crate provides:
//! - Configuration loading from the `.agent-kit/` directory
//! - The `Agent` trait with idempotent start/stop, owned timers and events
//! - Group coordination of agents through `AgentManager`
//! - Typed task dispatch into `TodoAgent`
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and management
//! - [`agents`]: Agent trait, concrete agents and the manager

pub mod agents;
pub mod config;
