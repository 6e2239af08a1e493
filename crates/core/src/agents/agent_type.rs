//! Agent kind enumeration for determining which implementation to build.

use crate::agents::base::AgentError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Todo,
    Heartbeat,
    Mock,
}

impl AgentKind {
    /// Parse the `kind` field of an agent definition.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use ak_core::agents::AgentKind;
    ///
    /// assert_eq!(AgentKind::from_kind_name("todo").unwrap(), AgentKind::Todo);
    /// assert_eq!(AgentKind::from_kind_name("Heartbeat").unwrap(), AgentKind::Heartbeat);
    /// assert!(AgentKind::from_kind_name("unknown").is_err());
    /// ```
    pub fn from_kind_name(kind: &str) -> Result<Self, AgentError> {
        match kind.trim().to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "heartbeat" => Ok(Self::Heartbeat),
            "mock" => Ok(Self::Mock),
            _ => Err(AgentError::UnknownKind(kind.to_string())),
        }
    }

    /// Get the canonical lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Heartbeat => "heartbeat",
            Self::Mock => "mock",
        }
    }
}

impl FromStr for AgentKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_kind_name(s)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
