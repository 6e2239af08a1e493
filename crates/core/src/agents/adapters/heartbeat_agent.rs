//! Heartbeat agent: publishes a `heartbeat` event on a fixed interval while
//! started.

use crate::agents::base::{Agent, AgentCore, AgentError};
use ak_protocol::{AgentDefinition, AgentEvent};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

pub struct HeartbeatAgent {
    core: AgentCore,
    interval: Duration,
    ticks: Arc<AtomicU64>,
}

impl HeartbeatAgent {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            core: AgentCore::new(name, None),
            interval,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_definition(definition: &AgentDefinition) -> Self {
        let interval = definition
            .interval_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_INTERVAL);

        Self {
            core: AgentCore::new(definition.name.clone(), definition.description.clone()),
            interval,
            ticks: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Total ticks since construction. Not reset by stop.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for HeartbeatAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn on_start(&self) -> Result<(), AgentError> {
        let ticks = Arc::clone(&self.ticks);
        let events = self.core.emitter();
        let agent = self.name().to_string();

        let id = self.core.set_interval(self.interval, move || {
            let tick = ticks.fetch_add(1, Ordering::SeqCst) + 1;
            events.publish(&AgentEvent::Heartbeat {
                agent: agent.clone(),
                tick,
            });
        })?;

        debug!(agent = %self.name(), timer = ?id, interval = ?self.interval, "Heartbeat scheduled");
        Ok(())
    }
}
