//! Configuration file loader for the `.agent-kit/` directory structure.
//!
//! This module loads:
//! - `config.toml`: runtime settings
//! - `agents/*.md`: agent definitions with YAML front matter and an optional
//!   checklist of seed todos in the Markdown body

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use ak_protocol::{AgentDefinition, RuntimeConfig, SeedTodo};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Name of the configuration directory under the project root.
pub const CONFIG_DIR: &str = ".agent-kit";

/// Loads all configuration from the `.agent-kit/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.agent-kit/` folder
///
/// # Returns
///
/// An `AppConfig` with everything that was found. Missing directories or
/// files yield defaults rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML or Markdown front matter)
/// - An agent definition has an empty `name` or `kind`
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
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let ak_dir = root.join(CONFIG_DIR);

    if !ak_dir.exists() {
        debug!(path = %ak_dir.display(), "No config directory; using defaults");
        return Ok(AppConfig::default());
    }

    let runtime = load_runtime_config(&ak_dir)?;
    let agents = load_agents(&ak_dir)?;

    debug!(agents = agents.len(), "Configuration loaded");
    Ok(AppConfig { runtime, agents })
}

/// Loads runtime settings from `config.toml`.
fn load_runtime_config(ak_dir: &Path) -> ConfigResult<RuntimeConfig> {
    let config_path = ak_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(RuntimeConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Loads all agent definitions from `agents/*.md`, sorted by file name.
fn load_agents(ak_dir: &Path) -> ConfigResult<Vec<AgentDefinition>> {
    let agents_dir = ak_dir.join("agents");

    if !agents_dir.exists() {
        return Ok(Vec::new());
    }

    let mut agents = Vec::new();

    for entry in WalkDir::new(&agents_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: agents_dir.clone(),
            source,
        })?;

        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        agents.push(parse_agent_definition(path, &content)?);
    }

    Ok(agents)
}

fn parse_agent_definition(path: &Path, content: &str) -> ConfigResult<AgentDefinition> {
    let matter = Matter::<YAML>::new();
    let result = matter.parse(content);

    let mut agent: AgentDefinition = result
        .data
        .ok_or_else(|| ConfigError::MarkdownParse {
            path: path.to_path_buf(),
            reason: "Missing YAML front matter".to_string(),
        })?
        .deserialize()
        .map_err(|e| ConfigError::MarkdownParse {
            path: path.to_path_buf(),
            reason: format!("Failed to deserialize front matter: {}", e),
        })?;

    if agent.name.trim().is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: "Agent name must not be empty".to_string(),
        });
    }
    if agent.kind.trim().is_empty() {
        return Err(ConfigError::InvalidConfig {
            path: path.to_path_buf(),
            reason: format!("Agent '{}' has an empty kind", agent.name),
        });
    }

    agent.seed_todos = parse_checklist(&result.content);
    Ok(agent)
}

/// Extracts `- [ ] title` / `- [x] title` items from a Markdown body.
///
/// `*` bullets are accepted too. Other lines are ignored.
pub fn parse_checklist(body: &str) -> Vec<SeedTodo> {
    body.lines()
        .filter_map(|line| {
            let item = line
                .trim_start()
                .strip_prefix("- ")
                .or_else(|| line.trim_start().strip_prefix("* "))?;

            let (completed, title) = if let Some(rest) = item.strip_prefix("[ ]") {
                (false, rest)
            } else if let Some(rest) = item
                .strip_prefix("[x]")
                .or_else(|| item.strip_prefix("[X]"))
            {
                (true, rest)
            } else {
                return None;
            };

            let title = title.trim();
            if title.is_empty() {
                return None;
            }
            Some(SeedTodo {
                title: title.to_string(),
                completed,
            })
        })
        .collect()
}
