//! Mock agent implementation for testing.

use crate::agents::base::{Agent, AgentCore, AgentError};
use ak_protocol::AgentDefinition;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// An agent whose hooks only count invocations, optionally after a delay or
/// with a forced failure.
pub struct MockAgent {
    core: AgentCore,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    delay: Option<Duration>,
    fail_start: bool,
    fail_stop: bool,
}

impl MockAgent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            core: AgentCore::new(name, None),
            start_calls: AtomicUsize::new(0),
            stop_calls: AtomicUsize::new(0),
            delay: None,
            fail_start: false,
            fail_stop: false,
        }
    }

    pub fn success(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail_start: true,
            ..Self::new(name)
        }
    }

    pub fn from_definition(definition: &AgentDefinition) -> Self {
        Self {
            core: AgentCore::new(definition.name.clone(), definition.description.clone()),
            ..Self::new(definition.name.clone())
        }
    }

    /// Sleep for `delay` inside both hooks.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Agent for MockAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn on_start(&self) -> Result<(), AgentError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.fail_start {
            return Err(AgentError::StartFailed {
                agent: self.name().to_string(),
                reason: "Mock failure".to_string(),
            });
        }
        Ok(())
    }

    async fn on_stop(&self) -> Result<(), AgentError> {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        if self.fail_stop {
            return Err(AgentError::StopFailed {
                agent: self.name().to_string(),
                reason: "Mock failure".to_string(),
            });
        }
        Ok(())
    }
}
