//! Event recorders and assertion helpers.

use ak_core::agents::{Agent, AgentManager};
use ak_protocol::{AgentEvent, ManagerEvent};
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared log of received events.
pub type EventLog<E> = Arc<Mutex<Vec<E>>>;

/// Record every `event_name` event an agent publishes.
#[allow(dead_code)]
pub fn record_agent_events(agent: &dyn Agent, event_name: &str) -> EventLog<AgentEvent> {
    let log: EventLog<AgentEvent> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    agent.on(
        event_name,
        Box::new(move |e: &AgentEvent| sink.lock().push(e.clone())),
    );
    log
}

/// Record every `event_name` event a manager publishes.
#[allow(dead_code)]
pub fn record_manager_events(manager: &AgentManager, event_name: &str) -> EventLog<ManagerEvent> {
    let log: EventLog<ManagerEvent> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    manager.on(event_name, move |e| sink.lock().push(e.clone()));
    log
}

/// Names of the agents mentioned by per-agent manager events, sorted.
#[allow(dead_code)]
pub fn agent_names(events: &[ManagerEvent]) -> Vec<String> {
    let mut names: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            ManagerEvent::AgentRegistered { agent }
            | ManagerEvent::AgentUnregistered { agent }
            | ManagerEvent::AgentStarted { agent }
            | ManagerEvent::AgentStopped { agent } => Some(agent.clone()),
            ManagerEvent::AllAgentsStarted | ManagerEvent::AllAgentsStopped => None,
        })
        .collect();
    names.sort();
    names
}

/// Assert that exactly `expected` events were recorded.
#[allow(dead_code)]
pub fn assert_event_count<E: std::fmt::Debug>(log: &EventLog<E>, expected: usize) {
    let events = log.lock();
    assert_eq!(
        events.len(),
        expected,
        "Expected {} events, got: {:?}",
        expected,
        *events
    );
}
