//! Agentic Workflow Engine: a small multi-agent orchestration core.
//!
//! A [`Request`](model::Request) is planned into a task graph by the
//! Orchestrator, checked by the [`TaskValidator`](validator::TaskValidator),
//! and then driven to completion by the [`Router`](router::Router) handing
//! control to one of two role-specialized agents a step at a time. Every
//! step is observable on the workflow's [`EventBus`](events::EventBus).
//!
//! [`WorkflowEngine`](executor::WorkflowEngine) is the entry point: call
//! [`WorkflowEngine::start`](executor::WorkflowEngine::start) with a
//! [`Request`](model::Request) to get back a workflow id and a live event
//! subscription.

pub mod agents;
pub mod audit;
pub mod backends;
pub mod config;
pub mod error;
pub mod events;
pub mod executor;
pub mod llm;
pub mod metrics;
pub mod model;
pub mod registry;
pub mod router;
pub mod validator;

pub use backends::ToolBackends;
pub use config::EngineConfig;
pub use error::{EngineError, ErrorKind};
pub use events::{Event, EventBus, EventSubscription, EventType};
pub use executor::{CancellationToken, WorkflowEngine};
pub use llm::{FixtureLlmAdapter, LlmAdapter};
pub use metrics::OrchestrationMetrics;
pub use model::{AgentId, Request, Task, TaskStatus, WorkflowState, WorkflowStatus};
pub use registry::ToolOutcome;
