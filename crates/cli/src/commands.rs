//! Subcommand implementations.

use ak_core::agents::{AgentError, AgentFactory, AgentKind, AgentManager, TaskOutcome, TodoAgent};
use ak_core::config::AppConfig;
use ak_protocol::{AgentDefinition, RawTask};
use clap::Args;
use color_eyre::eyre::eyre;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Project root containing `.agent-kit/`
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project root containing `.agent-kit/`
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

/// One line of input: a task addressed to a named agent.
#[derive(Deserialize, Debug)]
struct TaskEnvelope {
    agent: String,
    #[serde(flatten)]
    task: RawTask,
}

/// One line of output.
#[derive(Serialize, Debug)]
struct TaskReply<'a> {
    agent: &'a str,
    #[serde(flatten)]
    outcome: TaskOutcome,
}

impl RunArgs {
    pub async fn execute(self, config: &AppConfig) -> color_eyre::Result<()> {
        let manager = AgentManager::with_config(&config.runtime);
        info!(policy = ?manager.duplicate_policy(), "Registering agents");
        let todo_agents = register_agents(&manager, &config.agents)?;

        manager.start_all_agents().await?;
        info!(agents = manager.len(), "All agents started; reading tasks from stdin");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    warn!("Interrupted");
                    None
                }
            };
            let Some(line) = line else { break };

            if line.trim().is_empty() {
                continue;
            }
            match dispatch(&manager, &todo_agents, &line) {
                Ok(reply) => println!("{reply}"),
                Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
            }
        }

        manager.destroy().await?;
        Ok(())
    }
}

/// Build and register every configured agent.
///
/// Returns the todo agents that are still registered once all definitions
/// are in, so a name later taken over by another agent routes nowhere.
fn register_agents(
    manager: &AgentManager,
    definitions: &[AgentDefinition],
) -> color_eyre::Result<HashMap<String, Arc<TodoAgent>>> {
    let mut todo_agents: HashMap<String, Arc<TodoAgent>> = HashMap::new();

    for definition in definitions {
        if AgentKind::from_kind_name(&definition.kind)? == AgentKind::Todo {
            let agent = AgentFactory::create_todo(definition)?;
            manager.register_agent(agent.clone())?;
            todo_agents.insert(definition.name.clone(), agent);
        } else {
            manager.register_agent(AgentFactory::create(definition)?)?;
            todo_agents.remove(&definition.name);
        }
    }

    Ok(todo_agents)
}

fn dispatch(
    manager: &AgentManager,
    todo_agents: &HashMap<String, Arc<TodoAgent>>,
    line: &str,
) -> color_eyre::Result<String> {
    let envelope: TaskEnvelope =
        serde_json::from_str(line).map_err(|e| eyre!("Invalid task line: {e}"))?;

    let agent = match todo_agents.get(&envelope.agent) {
        Some(agent) => agent,
        None if manager.has_agent(&envelope.agent) => {
            return Err(AgentError::NotATodoAgent(envelope.agent).into());
        }
        None => return Err(eyre!("No agent named '{}'", envelope.agent)),
    };

    let outcome = agent.handle_raw_task(envelope.task)?;
    let reply = TaskReply {
        agent: &envelope.agent,
        outcome,
    };
    Ok(serde_json::to_string(&reply)?)
}

impl ListArgs {
    pub fn execute(self, config: &AppConfig) -> color_eyre::Result<()> {
        if config.agents.is_empty() {
            println!("{}", "No agents configured".dimmed());
            return Ok(());
        }

        for agent in &config.agents {
            let mut line = format!("{} ({})", agent.name.bold(), agent.kind.cyan());
            if let Some(description) = &agent.description {
                line.push_str(&format!(" - {description}"));
            }
            if !agent.seed_todos.is_empty() {
                line.push_str(&format!(" [{} todos]", agent.seed_todos.len()));
            }
            println!("{line}");
        }
        Ok(())
    }
}
