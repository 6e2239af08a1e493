//! Concrete agent implementations.

pub mod heartbeat_agent;
pub mod mock_agent;
pub mod todo_agent;

pub use heartbeat_agent::HeartbeatAgent;
pub use mock_agent::MockAgent;
pub use todo_agent::{TaskOutcome, TodoAgent};
