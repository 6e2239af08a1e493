//! Configuration loading and management.
//!
//! This module loads runtime settings and agent definitions from the
//! `.agent-kit/` directory structure.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::AppConfig;
