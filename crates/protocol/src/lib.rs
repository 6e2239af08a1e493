//! # ak-protocol
//!
//! Core protocol definitions and data models for agent-kit.
//!
//! This crate defines all shared data structures used for:
//! - Configuration file parsing (TOML runtime config, Markdown agent definitions)
//! - Tasks dispatched to agents and the todo entities they manage
//! - Lifecycle and domain events published by agents and the manager
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent definition structures
//! - [`config_models`]: Runtime configuration from config.toml
//! - [`task_models`]: Typed and raw task values
//! - [`todo_models`]: The todo entity and its patch type
//! - [`events`]: Agent-level and manager-level events
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, thiserror and ts-rs
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other agent-kit crates

pub mod agent_models;
pub mod config_models;
pub mod events;
pub mod task_models;
pub mod todo_models;

// Re-export all public types for convenience
pub use agent_models::*;
pub use config_models::*;
pub use events::*;
pub use task_models::*;
pub use todo_models::*;
