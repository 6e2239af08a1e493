//! Agent manager for orchestrating multiple agents.
//!
//! The `AgentManager` is responsible for:
//! - Registering agents under their unique names
//! - Looking up agents by name
//! - Starting and stopping every registered agent as a group
//! - Publishing registry and aggregate lifecycle events
//!
//! The manager never owns an agent's lifecycle state; it only calls
//! `start`/`stop` and reads `is_started`.

use crate::agents::base::{Agent, AgentError};
use crate::agents::events::{EventBus, SubscriptionId};
use ak_protocol::{DuplicatePolicy, ManagerEvent, RuntimeConfig};
use futures::future::try_join_all;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManagerError {
    #[error("Agent '{0}' is already registered")]
    DuplicateAgent(String),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("Lifecycle task for agent '{agent}' did not complete: {reason}")]
    Join { agent: String, reason: String },
}

/// Which group transition to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupOp {
    Start,
    Stop,
}

/// Manages all registered agents and provides group lifecycle operations.
///
/// The registry keeps insertion order, which is also the order in which
/// group operations initiate their per-agent calls.
pub struct AgentManager {
    agents: RwLock<Vec<(String, Arc<dyn Agent>)>>,
    events: EventBus<ManagerEvent>,
    duplicate_policy: DuplicatePolicy,
}

impl AgentManager {
    /// Create an empty manager that overwrites on duplicate names.
    pub fn new() -> Self {
        Self::with_duplicate_policy(DuplicatePolicy::default())
    }

    pub fn with_config(config: &RuntimeConfig) -> Self {
        Self::with_duplicate_policy(config.duplicate_registration)
    }

    pub fn with_duplicate_policy(duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            agents: RwLock::new(Vec::new()),
            events: EventBus::new(),
            duplicate_policy,
        }
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    /// Register an agent under its name. Does not start it.
    ///
    /// # Returns
    ///
    /// The agent previously registered under the same name, if any. The
    /// replaced agent is not stopped; if it is still running the caller
    /// is the only one left holding a reference to it.
    ///
    /// # Errors
    ///
    /// `ManagerError::DuplicateAgent` when the name is taken and the
    /// manager was configured with `DuplicatePolicy::Reject`.
    pub fn register_agent(
        &self,
        agent: Arc<dyn Agent>,
    ) -> Result<Option<Arc<dyn Agent>>, ManagerError> {
        let name = agent.name().to_string();

        let replaced = {
            let mut agents = self.agents.write();
            match agents.iter().position(|(n, _)| *n == name) {
                Some(_) if self.duplicate_policy == DuplicatePolicy::Reject => {
                    return Err(ManagerError::DuplicateAgent(name));
                }
                Some(index) => Some(std::mem::replace(&mut agents[index].1, agent)),
                None => {
                    agents.push((name.clone(), agent));
                    None
                }
            }
        };

        match &replaced {
            Some(old) => warn!(
                agent = %name,
                replaced_was_started = old.is_started(),
                "Agent name already registered; replacing previous agent"
            ),
            None => info!(agent = %name, "Agent registered"),
        }

        self.events.publish(&ManagerEvent::AgentRegistered { agent: name });
        Ok(replaced)
    }

    /// Remove an agent from the registry. Does not stop it.
    ///
    /// Returns the removed agent, or `None` (and emits nothing) if no agent
    /// was registered under `name`.
    pub fn unregister_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        let removed = {
            let mut agents = self.agents.write();
            let index = agents.iter().position(|(n, _)| n == name)?;
            agents.remove(index).1
        };

        info!(agent = %name, still_started = removed.is_started(), "Agent unregistered");
        self.events.publish(&ManagerEvent::AgentUnregistered {
            agent: name.to_string(),
        });
        Some(removed)
    }

    /// Get an agent by name.
    pub fn get_agent(&self, name: &str) -> Option<Arc<dyn Agent>> {
        self.agents
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, agent)| Arc::clone(agent))
    }

    /// All registered agents, in registration order.
    pub fn get_all_agents(&self) -> Vec<Arc<dyn Agent>> {
        self.agents
            .read()
            .iter()
            .map(|(_, agent)| Arc::clone(agent))
            .collect()
    }

    /// Registered agents that are currently started.
    pub fn get_started_agents(&self) -> Vec<Arc<dyn Agent>> {
        self.get_all_agents()
            .into_iter()
            .filter(|agent| agent.is_started())
            .collect()
    }

    /// List all registered agent names.
    pub fn agent_names(&self) -> Vec<String> {
        self.agents.read().iter().map(|(n, _)| n.clone()).collect()
    }

    /// Check if an agent with the given name is registered.
    pub fn has_agent(&self, name: &str) -> bool {
        self.agents.read().iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }

    /// Start every registered agent that is not started.
    ///
    /// The calls run concurrently and this resolves once all of them have
    /// settled. Agents that are already started are not touched.
    ///
    /// # Errors
    ///
    /// Returns the first failure as soon as it happens. Agents that had
    /// already started stay started, and calls still in flight keep
    /// running to completion.
    pub async fn start_all_agents(&self) -> Result<(), ManagerError> {
        self.run_group(GroupOp::Start).await?;
        self.events.publish(&ManagerEvent::AllAgentsStarted);
        Ok(())
    }

    /// Stop every registered agent that is started.
    ///
    /// Mirrors [`AgentManager::start_all_agents`], including its failure
    /// semantics.
    pub async fn stop_all_agents(&self) -> Result<(), ManagerError> {
        self.run_group(GroupOp::Stop).await?;
        self.events.publish(&ManagerEvent::AllAgentsStopped);
        Ok(())
    }

    async fn run_group(&self, op: GroupOp) -> Result<(), ManagerError> {
        let targets: Vec<Arc<dyn Agent>> = self
            .get_all_agents()
            .into_iter()
            .filter(|agent| match op {
                GroupOp::Start => !agent.is_started(),
                GroupOp::Stop => agent.is_started(),
            })
            .collect();

        info!(operation = ?op, count = targets.len(), "Running group operation");

        let calls = targets.into_iter().map(|agent| {
            let name = agent.name().to_string();
            let handle = tokio::spawn(async move {
                match op {
                    GroupOp::Start => agent.start().await,
                    GroupOp::Stop => agent.stop().await,
                }
            });

            async move {
                handle.await.map_err(|e| ManagerError::Join {
                    agent: name.clone(),
                    reason: e.to_string(),
                })??;

                let event = match op {
                    GroupOp::Start => ManagerEvent::AgentStarted { agent: name },
                    GroupOp::Stop => ManagerEvent::AgentStopped { agent: name },
                };
                self.events.publish(&event);
                Ok::<(), ManagerError>(())
            }
        });

        try_join_all(calls).await.map(|_| ())
    }

    /// Subscribe to a manager-level event by name.
    pub fn on<F>(&self, event_name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&ManagerEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(event_name, handler)
    }

    pub fn off(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Stop every agent, clear the registry, then release every manager
    /// subscription, in that order.
    ///
    /// The registry and subscriptions are cleared even if stopping fails;
    /// the stop error is returned afterwards.
    pub async fn destroy(&self) -> Result<(), ManagerError> {
        let stopped = self.stop_all_agents().await;
        if let Err(e) = &stopped {
            warn!(error = %e, "Failed to stop every agent while destroying manager");
        }

        let count = {
            let mut agents = self.agents.write();
            let count = agents.len();
            agents.clear();
            count
        };
        self.events.clear();

        info!(agents = count, "Agent manager destroyed");
        stopped
    }
}

impl Default for AgentManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::adapters::MockAgent;
    use ak_protocol::event_names;
    use parking_lot::Mutex;

    fn recorder(manager: &AgentManager, event_name: &str) -> Arc<Mutex<Vec<ManagerEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.on(event_name, move |e| sink.lock().push(e.clone()));
        seen
    }

    #[test]
    fn test_agent_manager_new() {
        let manager = AgentManager::new();
        assert!(manager.is_empty());
        assert_eq!(manager.duplicate_policy(), DuplicatePolicy::Replace);
    }

    #[test]
    fn test_register_and_get_agent() {
        let manager = AgentManager::new();
        let agent: Arc<dyn Agent> = Arc::new(MockAgent::new("agent1"));
        let registered = recorder(&manager, event_names::AGENT_REGISTERED);

        assert!(manager.register_agent(Arc::clone(&agent)).unwrap().is_none());

        let found = manager.get_agent("agent1").unwrap();
        assert!(Arc::ptr_eq(&found, &agent));
        assert!(manager.has_agent("agent1"));
        assert!(manager.get_agent("nonexistent").is_none());
        assert_eq!(
            *registered.lock(),
            vec![ManagerEvent::AgentRegistered {
                agent: "agent1".to_string()
            }]
        );
    }

    #[test]
    fn test_registration_order_is_kept() {
        let manager = AgentManager::new();
        for name in ["c", "a", "b"] {
            manager.register_agent(Arc::new(MockAgent::new(name))).unwrap();
        }

        assert_eq!(manager.agent_names(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_replaces_in_place() {
        let manager = AgentManager::new();
        manager.register_agent(Arc::new(MockAgent::new("a"))).unwrap();
        manager.register_agent(Arc::new(MockAgent::new("b"))).unwrap();

        let second: Arc<dyn Agent> = Arc::new(MockAgent::new("a"));
        let replaced = manager.register_agent(Arc::clone(&second)).unwrap();

        assert!(replaced.is_some());
        assert_eq!(manager.len(), 2);
        assert_eq!(manager.agent_names(), vec!["a", "b"]);
        assert!(Arc::ptr_eq(&manager.get_agent("a").unwrap(), &second));
    }

    #[test]
    fn test_duplicate_rejected() {
        let manager = AgentManager::with_duplicate_policy(DuplicatePolicy::Reject);
        let first: Arc<dyn Agent> = Arc::new(MockAgent::new("a"));
        manager.register_agent(Arc::clone(&first)).unwrap();

        let result = manager.register_agent(Arc::new(MockAgent::new("a")));

        assert!(matches!(result, Err(ManagerError::DuplicateAgent(ref name)) if name == "a"));
        assert!(Arc::ptr_eq(&manager.get_agent("a").unwrap(), &first));
    }

    #[test]
    fn test_unregister_missing_emits_nothing() {
        let manager = AgentManager::new();
        let unregistered = recorder(&manager, event_names::AGENT_UNREGISTERED);

        assert!(manager.unregister_agent("ghost").is_none());
        assert!(unregistered.lock().is_empty());
    }

    #[tokio::test]
    async fn test_start_all_emits_per_agent_and_aggregate_events() {
        let manager = AgentManager::new();
        manager.register_agent(Arc::new(MockAgent::new("a"))).unwrap();
        manager.register_agent(Arc::new(MockAgent::new("b"))).unwrap();
        let per_agent = recorder(&manager, event_names::AGENT_STARTED);
        let all = recorder(&manager, event_names::ALL_AGENTS_STARTED);

        manager.start_all_agents().await.unwrap();

        assert_eq!(per_agent.lock().len(), 2);
        assert_eq!(*all.lock(), vec![ManagerEvent::AllAgentsStarted]);
        assert_eq!(manager.get_started_agents().len(), 2);
    }

    #[tokio::test]
    async fn test_start_all_on_empty_manager() {
        let manager = AgentManager::new();
        let all = recorder(&manager, event_names::ALL_AGENTS_STARTED);

        manager.start_all_agents().await.unwrap();
        assert_eq!(all.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_destroy_clears_registry_and_subscriptions() {
        let manager = AgentManager::new();
        let agent = Arc::new(MockAgent::new("a"));
        manager.register_agent(agent.clone()).unwrap();
        manager.start_all_agents().await.unwrap();
        let registered = recorder(&manager, event_names::AGENT_REGISTERED);

        manager.destroy().await.unwrap();

        assert!(!agent.is_started());
        assert!(manager.is_empty());

        manager.register_agent(Arc::new(MockAgent::new("b"))).unwrap();
        assert!(registered.lock().is_empty());
    }
}
