//! Base Agent trait and supporting types.
//!
//! Every concrete agent embeds an [`AgentCore`] and implements [`Agent`].
//! The trait's provided `start`/`stop` methods own the lifecycle discipline:
//! idempotent transitions, timer cleanup and event-subscription release.
//! Concrete agents customize behaviour through the `on_start`/`on_stop` hooks.

use crate::agents::events::{EventBus, SubscriptionId};
use crate::agents::timers::{TimerId, TimerSet};
use ak_protocol::event_names;
use ak_protocol::{AgentEvent, TaskError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Agent '{0}' is not started")]
    NotStarted(String),
    #[error("Failed to start agent '{agent}': {reason}")]
    StartFailed { agent: String, reason: String },
    #[error("Failed to stop agent '{agent}': {reason}")]
    StopFailed { agent: String, reason: String },
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("Unknown agent kind: {0}")]
    UnknownKind(String),
    #[error("Agent '{0}' is not a todo agent")]
    NotATodoAgent(String),
    #[error("No async runtime available to schedule timers")]
    NoRuntime,
}

/// Lifecycle of an agent.
///
/// `Stopped -> Starting -> Started -> Stopping -> Stopped`, repeatable.
/// The intermediate states cover the time spent inside the async hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Stopped,
    Starting,
    Started,
    Stopping,
}

/// Lifecycle state plus the direction of the transition in flight, if any.
///
/// `settling` stays set from `begin` until the transition guard drops, which
/// is after the lifecycle event has been published.
#[derive(Debug, Clone, Copy)]
struct Lifecycle {
    state: LifecycleState,
    settling: Option<LifecycleState>,
}

/// Outcome of trying to begin a transition.
enum Gate<'a> {
    Proceed(Transition<'a>),
    /// Another transition toward the given resting state is in flight.
    Busy(LifecycleState),
    /// Nothing in flight and the agent is not in the required state.
    Skip(LifecycleState),
}

/// State shared by every agent: identity, lifecycle flag, owned timers and
/// the agent's own event bus.
pub struct AgentCore {
    name: String,
    description: Option<String>,
    lifecycle: Mutex<Lifecycle>,
    settled: Notify,
    timers: TimerSet,
    events: Arc<EventBus<AgentEvent>>,
}

impl AgentCore {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            lifecycle: Mutex::new(Lifecycle {
                state: LifecycleState::Stopped,
                settling: None,
            }),
            settled: Notify::new(),
            timers: TimerSet::new(),
            events: Arc::new(EventBus::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.lock().state
    }

    pub fn is_started(&self) -> bool {
        self.state() == LifecycleState::Started
    }

    /// Publish an event on this agent's bus.
    pub fn emit(&self, event: AgentEvent) -> usize {
        self.events.publish(&event)
    }

    /// A handle to this agent's bus for callbacks that outlive a borrow,
    /// such as timer callbacks.
    pub fn emitter(&self) -> Arc<EventBus<AgentEvent>> {
        Arc::clone(&self.events)
    }

    pub fn events(&self) -> &EventBus<AgentEvent> {
        &self.events
    }

    /// Schedule `callback` once after `delay`. The timer is owned by this
    /// agent and cancelled when it stops.
    ///
    /// # Errors
    ///
    /// `AgentError::NotStarted` unless the agent is starting or started.
    pub fn set_timeout<F>(&self, delay: Duration, callback: F) -> Result<TimerId, AgentError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.ensure_active()?;
        self.timers.set_timeout(delay, callback)
    }

    /// Schedule `callback` every `period`. The timer is owned by this agent
    /// and cancelled when it stops.
    ///
    /// # Errors
    ///
    /// `AgentError::NotStarted` unless the agent is starting or started.
    pub fn set_interval<F>(&self, period: Duration, callback: F) -> Result<TimerId, AgentError>
    where
        F: FnMut() + Send + 'static,
    {
        self.ensure_active()?;
        self.timers.set_interval(period, callback)
    }

    pub fn clear_timer(&self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    fn ensure_active(&self) -> Result<(), AgentError> {
        match self.state() {
            LifecycleState::Starting | LifecycleState::Started => Ok(()),
            LifecycleState::Stopped | LifecycleState::Stopping => {
                Err(AgentError::NotStarted(self.name.clone()))
            }
        }
    }

    /// Move from `from` into `via`, heading for `target`, unless another
    /// transition is in flight or the agent is not in `from`.
    fn begin(&self, from: LifecycleState, via: LifecycleState, target: LifecycleState) -> Gate<'_> {
        let mut lifecycle = self.lifecycle.lock();
        if let Some(heading) = lifecycle.settling {
            return Gate::Busy(heading);
        }
        if lifecycle.state != from {
            return Gate::Skip(lifecycle.state);
        }
        lifecycle.state = via;
        lifecycle.settling = Some(target);
        Gate::Proceed(Transition {
            core: self,
            rollback: from,
            committed: false,
        })
    }

    /// Wait until the transition in flight, if any, has finished.
    async fn settled(&self) {
        let notified = self.settled.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.lifecycle.lock().settling.is_none() {
            return;
        }
        notified.await;
    }
}

impl std::fmt::Debug for AgentCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCore")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("state", &self.state())
            .field("timers", &self.timers)
            .field("events", &self.events)
            .finish()
    }
}

/// An in-flight lifecycle transition.
///
/// Rolls the state back if dropped without `commit`, which covers both a
/// failed hook and a caller that abandons the `start`/`stop` future.
/// Dropping it, committed or not, wakes callers waiting in `settled`.
struct Transition<'a> {
    core: &'a AgentCore,
    rollback: LifecycleState,
    committed: bool,
}

impl Transition<'_> {
    fn commit(&mut self, to: LifecycleState) {
        self.core.lifecycle.lock().state = to;
        self.committed = true;
    }
}

impl Drop for Transition<'_> {
    fn drop(&mut self) {
        if !self.committed && self.rollback == LifecycleState::Stopped {
            // Timers scheduled by a failed on_start must not outlive it.
            self.core.timers.cancel_all();
        }
        {
            let mut lifecycle = self.core.lifecycle.lock();
            if !self.committed {
                lifecycle.state = self.rollback;
            }
            lifecycle.settling = None;
        }
        self.core.settled.notify_waiters();
    }
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn core(&self) -> &AgentCore;

    fn name(&self) -> &str {
        self.core().name()
    }

    fn description(&self) -> Option<&str> {
        self.core().description()
    }

    fn is_started(&self) -> bool {
        self.core().is_started()
    }

    /// Called while the agent is `Starting`. Timers scheduled here are owned
    /// by the agent.
    async fn on_start(&self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Called while the agent is `Stopping`, before timers are cancelled.
    async fn on_stop(&self) -> Result<(), AgentError> {
        Ok(())
    }

    /// Start the agent.
    ///
    /// Calling this on an agent that is started or starting logs a warning
    /// and returns `Ok(())` without running the hook or emitting `started`.
    /// Calling it while a stop is in flight waits for the stop to finish and
    /// then starts the agent.
    ///
    /// Must not be awaited from the agent's own hooks.
    async fn start(&self) -> Result<(), AgentError> {
        let core = self.core();
        let mut transition = loop {
            match core.begin(
                LifecycleState::Stopped,
                LifecycleState::Starting,
                LifecycleState::Started,
            ) {
                Gate::Proceed(transition) => break transition,
                Gate::Busy(LifecycleState::Stopped) => {
                    debug!(agent = %core.name(), "Waiting for stop to finish before starting");
                    core.settled().await;
                }
                Gate::Busy(_) => {
                    warn!(agent = %core.name(), state = ?core.state(), "Agent is already starting");
                    return Ok(());
                }
                Gate::Skip(state) => {
                    warn!(agent = %core.name(), state = ?state, "Agent already started");
                    return Ok(());
                }
            }
        };

        self.on_start().await?;

        transition.commit(LifecycleState::Started);
        info!(agent = %core.name(), "Agent started");
        core.emit(AgentEvent::Started {
            agent: core.name().to_string(),
        });
        Ok(())
    }

    /// Stop the agent.
    ///
    /// Cancels every owned timer and releases every subscription on this
    /// agent. Listeners on `stopped` receive the event once, after the other
    /// subscriptions are gone, and are released right after. Stopping an
    /// agent that is not started is a silent no-op.
    ///
    /// A start or stop already in flight is awaited first, so once this
    /// returns `Ok` the agent is stopped and its timers are cancelled.
    ///
    /// Must not be awaited from the agent's own hooks.
    async fn stop(&self) -> Result<(), AgentError> {
        let core = self.core();
        let mut transition = loop {
            match core.begin(
                LifecycleState::Started,
                LifecycleState::Stopping,
                LifecycleState::Stopped,
            ) {
                Gate::Proceed(transition) => break transition,
                Gate::Busy(heading) => {
                    debug!(agent = %core.name(), heading = ?heading, "Waiting for transition to finish before stopping");
                    core.settled().await;
                }
                Gate::Skip(state) => {
                    debug!(agent = %core.name(), state = ?state, "Agent not started; ignoring stop()");
                    return Ok(());
                }
            }
        };

        self.on_stop().await?;

        let cancelled = core.timers.cancel_all();
        core.events.clear_except(event_names::STOPPED);
        transition.commit(LifecycleState::Stopped);

        info!(agent = %core.name(), cancelled_timers = cancelled, "Agent stopped");
        core.emit(AgentEvent::Stopped {
            agent: core.name().to_string(),
        });
        core.events.clear();
        Ok(())
    }

    /// Subscribe to one of this agent's events by name.
    fn on(
        &self,
        event_name: &str,
        handler: Box<dyn Fn(&AgentEvent) + Send + Sync>,
    ) -> SubscriptionId {
        self.core().events().subscribe(event_name, handler)
    }

    fn off(&self, id: SubscriptionId) -> bool {
        self.core().events().unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TestAgent {
        core: AgentCore,
        fail_start: bool,
    }

    impl TestAgent {
        fn new(name: &str) -> Self {
            Self {
                core: AgentCore::new(name, None),
                fail_start: false,
            }
        }
    }

    #[async_trait]
    impl Agent for TestAgent {
        fn core(&self) -> &AgentCore {
            &self.core
        }

        async fn on_start(&self) -> Result<(), AgentError> {
            self.core.set_interval(Duration::from_millis(10), || {})?;
            if self.fail_start {
                return Err(AgentError::StartFailed {
                    agent: self.name().to_string(),
                    reason: "test".to_string(),
                });
            }
            Ok(())
        }
    }

    fn count_events(agent: &dyn Agent, event_name: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        agent.on(
            event_name,
            Box::new(move |_: &AgentEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );
        count
    }

    #[tokio::test]
    async fn test_initial_state() {
        let agent = TestAgent::new("a");
        assert!(!agent.is_started());
        assert_eq!(agent.core().state(), LifecycleState::Stopped);
        assert_eq!(agent.name(), "a");
        assert_eq!(agent.description(), None);
    }

    #[tokio::test]
    async fn test_start_stop_cycle_is_repeatable() {
        let agent = TestAgent::new("a");

        for _ in 0..3 {
            agent.start().await.unwrap();
            assert!(agent.is_started());
            assert_eq!(agent.core().pending_timers(), 1);

            agent.stop().await.unwrap();
            assert!(!agent.is_started());
            assert_eq!(agent.core().pending_timers(), 0);
        }
    }

    #[tokio::test]
    async fn test_failed_start_rolls_back() {
        let mut agent = TestAgent::new("a");
        agent.fail_start = true;
        let started = count_events(&agent, event_names::STARTED);

        let result = agent.start().await;

        assert!(matches!(result, Err(AgentError::StartFailed { .. })));
        assert!(!agent.is_started());
        assert_eq!(agent.core().state(), LifecycleState::Stopped);
        assert_eq!(agent.core().pending_timers(), 0);
        assert_eq!(started.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_releases_subscriptions_after_stopped_event() {
        let agent = TestAgent::new("a");
        agent.start().await.unwrap();

        let stopped = count_events(&agent, event_names::STOPPED);
        let _started = count_events(&agent, event_names::STARTED);

        let seen_started_listeners = Arc::new(AtomicUsize::new(usize::MAX));
        let seen = Arc::clone(&seen_started_listeners);
        let bus = agent.core().emitter();
        agent.on(
            event_names::STOPPED,
            Box::new(move |_: &AgentEvent| {
                seen.store(bus.handler_count(event_names::STARTED), Ordering::SeqCst);
            }),
        );

        agent.stop().await.unwrap();

        assert_eq!(stopped.load(Ordering::SeqCst), 1);
        assert_eq!(seen_started_listeners.load(Ordering::SeqCst), 0);
        assert!(agent.core().events().is_empty());
    }

    #[tokio::test]
    async fn test_timers_rejected_while_stopped() {
        let agent = TestAgent::new("a");
        let result = agent.core().set_timeout(Duration::from_millis(1), || {});
        assert_eq!(result, Err(AgentError::NotStarted("a".to_string())));
    }

    #[tokio::test]
    async fn test_off_removes_listener() {
        let agent = TestAgent::new("a");
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let id = agent.on(
            event_names::STARTED,
            Box::new(move |_: &AgentEvent| {
                c.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert!(agent.off(id));
        agent.start().await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
