//! Common test utilities shared by the integration suites.
//!
//! - Test fixtures (sample `.agent-kit/` projects)
//! - Event recorders and assertions

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
