//! Error taxonomy for the engine, mirroring the structured error kinds used at
//! the tool boundary plus the per-concern failure modes of planning,
//! validation, routing and configuration. Every variant here is actually
//! constructed somewhere in the crate -- `ToolOutcome` (registry.rs) carries
//! tool-boundary failures instead, since those must flow through the event
//! bus as data rather than as a Rust-level `Result`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of error kinds a tool call (or any boundary operation) can
/// report. `Timeout` never reaches a tool result directly -- it is reserved
/// for the LLM adapter boundary -- but lives in the same enum so every
/// component speaks one taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    PreconditionFailed,
    Conflict,
    InvalidArgument,
    Timeout,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::PreconditionFailed => "precondition_failed",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    /// Planning produced a cyclic dependency graph: the workflow fails
    /// distinctly here rather than falling through to the router's generic
    /// dependency-deadlock blocker.
    #[error("planning failed: {0}")]
    Planning(String),

    /// The task validator's augmentation pass left the dependency graph
    /// cyclic, or a validator rule itself could not be constructed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The router observed a state that should never happen (the ready set
    /// is empty while a task is in progress).
    #[error("routing invariant violated: {0}")]
    InvariantViolation(String),

    #[error("executor error: {0}")]
    Executor(String),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_renders_snake_case() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not_found");
        assert_eq!(ErrorKind::PreconditionFailed.to_string(), "precondition_failed");
        assert_eq!(serde_json::to_string(&ErrorKind::Conflict).unwrap(), "\"conflict\"");
    }
}
