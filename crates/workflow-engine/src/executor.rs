//! The Executor Loop and the `WorkflowEngine` that exposes the Workflow
//! API: `start(request) -> (workflow_id, event_subscription)` and
//! `cancel(workflow_id)`.
//!
//! Each workflow runs on its own `tokio::task`: the executor owns the
//! `WorkflowState` exclusively for the task's lifetime, and no other task
//! ever touches it. Multiple workflows run fully independently, sharing
//! only the process-wide `ToolBackends`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use uuid::Uuid;

use crate::agents::{Agent, AdvisorAgent, AgentRuntime, OperationsAgent, OrchestratorAgent};
use crate::backends::ToolBackends;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{EventBus, EventSubscription, EventType};
use crate::llm::{LlmAdapter, TimeoutLlmAdapter};
use crate::metrics::OrchestrationMetrics;
use crate::model::{find_cycle, AgentId, Request, WorkflowState, WorkflowStatus};
use crate::registry::ToolRegistry;
use crate::router::{RouteDecision, Router};
use crate::validator::TaskValidator;

/// A cooperative cancellation flag, checked by the executor at its
/// suspension points. Cheap to clone; every clone observes the same
/// underlying flag.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The top-level handle a caller uses to submit requests and manage
/// in-flight workflows.
#[derive(Clone)]
pub struct WorkflowEngine {
    config: EngineConfig,
    backends: ToolBackends,
    llm: Arc<dyn LlmAdapter>,
    metrics: OrchestrationMetrics,
    cancellations: Arc<Mutex<HashMap<Uuid, CancellationToken>>>,
}

impl WorkflowEngine {
    /// Wraps `llm` in a `TimeoutLlmAdapter` bound to
    /// `config.execution.llm_timeout_seconds`, so every inference made
    /// through this engine -- regardless of which concrete adapter was
    /// injected -- falls back to `Decision::fallback()` rather than
    /// stalling a workflow indefinitely.
    pub fn new(config: EngineConfig, backends: ToolBackends, llm: Arc<dyn LlmAdapter>) -> Self {
        let timeout = Duration::from_secs(config.execution.llm_timeout_seconds);
        let llm: Arc<dyn LlmAdapter> = Arc::new(TimeoutLlmAdapter::new(llm, timeout));
        Self {
            config,
            backends,
            llm,
            metrics: OrchestrationMetrics::new(),
            cancellations: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn metrics(&self) -> OrchestrationMetrics {
        self.metrics.clone()
    }

    /// Create a workflow for `request` and start driving it to completion
    /// in the background. Returns its id and a subscription to its event
    /// stream, both valid immediately.
    pub fn start(&self, request: Request) -> (Uuid, EventSubscription) {
        let state = WorkflowState::new(request);
        let workflow_id = state.workflow_id;
        let event_bus = EventBus::new(workflow_id, self.config.event_bus.subscriber_buffer_size);
        let subscription = event_bus.subscribe(self.config.event_bus.drop_log_events_under_backpressure);

        let token = CancellationToken::new();
        self.cancellations.lock().insert(workflow_id, token.clone());

        let executor = Executor {
            config: self.config.clone(),
            backends: self.backends.clone(),
            llm: self.llm.clone(),
            metrics: self.metrics.clone(),
        };
        let cancellations = self.cancellations.clone();
        tokio::spawn(async move {
            executor.drive(state, event_bus, token).await;
            cancellations.lock().remove(&workflow_id);
        });

        (workflow_id, subscription)
    }

    /// Request cancellation. Takes effect at the executor's next
    /// suspension point; in-flight tool calls may still complete but
    /// their results are discarded.
    pub fn cancel(&self, workflow_id: Uuid) {
        if let Some(token) = self.cancellations.lock().get(&workflow_id) {
            token.cancel();
        }
    }
}

struct Executor {
    config: EngineConfig,
    backends: ToolBackends,
    llm: Arc<dyn LlmAdapter>,
    metrics: OrchestrationMetrics,
}

impl Executor {
    /// Drive `state` to a terminal status, publishing every step to
    /// `event_bus`, and close the bus on exit.
    async fn drive(&self, mut state: WorkflowState, event_bus: EventBus, cancellation: CancellationToken) {
        self.metrics.workflow_started();
        event_bus.publish(EventType::WorkflowStart, None, json!({"request": state.request})).await;

        let registry = Arc::new(ToolRegistry::new(self.backends.clone(), event_bus.clone(), self.metrics.clone()));
        let runtime = AgentRuntime { llm: self.llm.clone(), registry: registry.clone(), event_bus: event_bus.clone() };

        let orchestrator = OrchestratorAgent::new(event_bus.clone());
        orchestrator.plan(&mut state).await;

        // A cyclic plan must fail planning outright, not fall through to
        // the router's generic dependency-deadlock blocker mid-execution.
        if let Some(cycle) = find_cycle(&state.tasks) {
            let err = EngineError::Planning(format!("planner produced a cyclic dependency graph: {}", cycle.join(" -> ")));
            self.fail_distinctly(&event_bus, &mut state, err).await;
        } else {
            TaskValidator::new().apply(&state.request.request_type.clone(), &mut state.tasks);

            if let Some(cycle) = find_cycle(&state.tasks) {
                let err =
                    EngineError::Validation(format!("validator augmentation produced a cyclic dependency graph: {}", cycle.join(" -> ")));
                self.fail_distinctly(&event_bus, &mut state, err).await;
            } else {
                for task_id in state.tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>() {
                    publish_task_snapshot(&event_bus, &state, &task_id).await;
                }

                let mut agents: HashMap<AgentId, Arc<dyn Agent>> = HashMap::new();
                agents.insert(AgentId::OperationsAgent, Arc::new(OperationsAgent::new(runtime.clone())));
                agents.insert(AgentId::AdvisorAgent, Arc::new(AdvisorAgent::new(runtime.clone())));

                // Planning counts as the first step.
                let mut steps: usize = 1;

                loop {
                    if cancellation.is_cancelled() {
                        state.status = WorkflowStatus::Failed;
                        state.add_blocker("cancelled", "executor");
                        break;
                    }
                    if steps >= self.config.execution.max_steps {
                        state.add_blocker("step budget exhausted before the workflow reached a terminal state", "executor");
                        state.status = WorkflowStatus::Failed;
                        break;
                    }

                    let decision = match Router::route(&mut state) {
                        Ok(decision) => decision,
                        Err(violation) => {
                            event_bus
                                .publish(EventType::Error, None, json!({"message": violation.to_string(), "recoverable": false}))
                                .await;
                            state.status = WorkflowStatus::Failed;
                            state.add_blocker(violation.to_string(), "router");
                            break;
                        }
                    };

                    let agent_id = match decision {
                        RouteDecision::Done => break,
                        RouteDecision::Next(agent_id) => agent_id,
                    };

                    event_bus
                        .publish(EventType::Routing, None, json!({"next": agent_id.to_string()}))
                        .await;

                    let agent = agents.get(&agent_id).expect("every AgentId has a registered agent").clone();
                    if let Err(err) = agent.step(&mut state).await {
                        event_bus
                            .publish(EventType::Error, Some(agent_id.to_string()), json!({"message": err.to_string(), "recoverable": false}))
                            .await;
                        state.add_blocker(err.to_string(), agent_id.to_string());
                        state.status = WorkflowStatus::Failed;
                        break;
                    }
                    steps += 1;
                }
            }
        }

        match state.status {
            WorkflowStatus::Completed => self.metrics.workflow_completed(),
            WorkflowStatus::Blocked => self.metrics.workflow_blocked(),
            WorkflowStatus::Failed => self.metrics.workflow_failed(),
            _ => {}
        }

        let tasks_completed = state.tasks.iter().filter(|t| t.status == crate::model::TaskStatus::Completed).count();
        event_bus
            .publish(
                EventType::WorkflowComplete,
                None,
                json!({
                    "status": state.status,
                    "outcome": state.outcome,
                    "tasks_completed": tasks_completed,
                    "total_tasks": state.tasks.len(),
                    "blockers": state.blockers,
                }),
            )
            .await;
        event_bus.close();
    }

    /// Fail `state` distinctly on `err`, publishing a non-recoverable
    /// `Error` event and a matching blocker instead of letting the
    /// condition surface later as a generic router blocker.
    async fn fail_distinctly(&self, event_bus: &EventBus, state: &mut WorkflowState, err: EngineError) {
        event_bus
            .publish(EventType::Error, None, json!({"message": err.to_string(), "recoverable": false}))
            .await;
        state.add_blocker(err.to_string(), "executor");
        state.status = WorkflowStatus::Failed;
    }
}

async fn publish_task_snapshot(event_bus: &EventBus, state: &WorkflowState, task_id: &str) {
    if let Some(task) = state.task(task_id) {
        event_bus
            .publish(
                EventType::TaskUpdate,
                Some("validator".to_string()),
                json!({
                    "task_id": task.id,
                    "status": task.status,
                    "owner": task.owner,
                    "description": task.description,
                    "result": task.result,
                    "dependencies": task.dependencies,
                    "client_id": state.request.client_id,
                }),
            )
            .await;
    }
}
