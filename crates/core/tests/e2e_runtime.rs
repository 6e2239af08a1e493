//! End-to-end test: load a project, build agents, run them as a group.

mod common;

use ak_core::agents::{AgentFactory, AgentManager, TodoAgent};
use ak_core::config::load_config;
use ak_protocol::{event_names, AgentEvent, RawTask};
use common::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_project_runtime() {
    let project = create_test_project().expect("Failed to create test project");
    let config = load_config(project.path())
        .await
        .expect("Failed to load config");

    assert_eq!(config.runtime.log_level, "debug");
    assert_eq!(config.agents.len(), 3);

    let manager = AgentManager::with_config(&config.runtime);
    let mut todo_agents: HashMap<String, Arc<TodoAgent>> = HashMap::new();

    for definition in &config.agents {
        if definition.kind == "todo" {
            let agent = AgentFactory::create_todo(definition).expect("todo agent");
            todo_agents.insert(definition.name.clone(), agent.clone());
            manager.register_agent(agent).unwrap();
        } else {
            manager
                .register_agent(AgentFactory::create(definition).expect("agent"))
                .unwrap();
        }
    }

    assert_eq!(manager.agent_names(), vec!["todo-1", "pulse", "mock"]);

    manager.start_all_agents().await.unwrap();
    assert_eq!(manager.get_started_agents().len(), 3);

    let pulse = manager.get_agent("pulse").unwrap();
    let beats = record_agent_events(pulse.as_ref(), event_names::HEARTBEAT);

    let todo = &todo_agents["todo-1"];
    assert_eq!(todo.get_all_todos().len(), 2, "seed todos are loaded");
    assert_eq!(todo.get_completed_todos()[0].title, "bread");

    todo.handle_raw_task(RawTask::new("create", json!({ "title": "eggs" })))
        .unwrap();
    assert_eq!(todo.get_pending_todos().len(), 2);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_event_count(&beats, 2);

    manager.destroy().await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(manager.is_empty());
    assert_event_count(&beats, 2);
    assert_eq!(todo.get_all_todos().len(), 3);
    assert!(matches!(
        beats.lock()[1],
        AgentEvent::Heartbeat { tick: 2, .. }
    ));
}
