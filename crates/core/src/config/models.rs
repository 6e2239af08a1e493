//! Configuration models that aggregate all settings.

use ak_protocol::{AgentDefinition, RuntimeConfig};

/// Unified application configuration loaded from the `.agent-kit/` directory.
///
/// - `config.toml`: runtime settings
/// - `agents/*.md`: agent definitions, in file-name order
///
/// # Example
///
/// ```rust,no_run
/// use ak_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agents", config.agents.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Runtime settings from `config.toml`.
    pub runtime: RuntimeConfig,

    /// All agent definitions loaded from `agents/*.md`.
    pub agents: Vec<AgentDefinition>,
}

impl AppConfig {
    pub fn agent(&self, name: &str) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| a.name == name)
    }
}
