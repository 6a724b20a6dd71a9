//! Agents: role-specialized decision units that share one contract --
//! `step(state)` mutates at most one task per call, consults the LLM
//! Adapter, invokes at most one tool, and applies the error-propagation
//! rule. `orchestrator` is the one exception: it runs once, before the
//! task graph exists, and so has its own planning entry point instead of
//! `step`.

pub mod advisor;
pub mod operations;
pub mod orchestrator;

pub use advisor::AdvisorAgent;
pub use operations::OperationsAgent;
pub use orchestrator::OrchestratorAgent;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::EngineError;
use crate::events::{EventBus, EventType};
use crate::llm::{Decision, DecisionStatus, LlmAdapter, ToolCall};
use crate::model::{AgentId, TaskStatus, WorkflowState};
use crate::registry::ToolRegistry;

/// Shared dependencies every task-owning agent needs.
#[derive(Clone)]
pub struct AgentRuntime {
    pub llm: Arc<dyn LlmAdapter>,
    pub registry: Arc<ToolRegistry>,
    pub event_bus: EventBus,
}

#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> AgentId;
    async fn step(&self, state: &mut WorkflowState) -> Result<(), EngineError>;
}

/// Picks the first `pending` task this agent owns with every dependency
/// `completed` -- the same readiness test the router uses, but scoped to a
/// single owner.
fn select_ready_task_id(state: &WorkflowState, owner: AgentId) -> Option<String> {
    let by_id: std::collections::HashMap<String, &crate::model::Task> = state.tasks.iter().map(|t| (t.id.clone(), t)).collect();
    state.tasks.iter().find(|t| t.owner == owner && t.is_ready(&by_id)).map(|t| t.id.clone())
}

/// A hook that lets an agent rewrite a tool call immediately before it is
/// sent to the registry -- used by the Advisor's state-verification rule
/// to downgrade a premature "your account is ready" notification.
pub type ToolCallGuard = fn(&WorkflowState, &mut ToolCall);

/// The shared body of `step()`: select a task, transition it to
/// `in_progress`, consult the LLM, invoke at most one tool, and apply the
/// error-propagation rule. `prompt` is the role-specific prompt text;
/// `authorized_tools` enforces each agent's tool allowlist.
pub async fn run_step(
    runtime: &AgentRuntime,
    owner: AgentId,
    prompt: &str,
    authorized_tools: &[&str],
    guard: Option<ToolCallGuard>,
    state: &mut WorkflowState,
) -> Result<(), EngineError> {
    let Some(task_id) = select_ready_task_id(state, owner) else {
        return Err(EngineError::Executor(format!("{owner} has no ready task to act on")));
    };

    state
        .mark_task(&task_id, TaskStatus::InProgress)
        .map_err(|e| EngineError::Executor(e.to_string()))?;
    publish_task_update(runtime, state, &task_id).await;

    let task_description = state.task(&task_id).map(|t| t.description.clone()).unwrap_or_default();
    let full_prompt = format!("{prompt}\n\nCurrent task: {task_description}");

    runtime
        .event_bus
        .publish(EventType::LlmCall, Some(owner.to_string()), json!({"agent": owner.to_string(), "phase": "begin"}))
        .await;
    let started = std::time::Instant::now();
    let decision = runtime.llm.infer(owner, &full_prompt, state).await;
    runtime
        .event_bus
        .publish(
            EventType::LlmCall,
            Some(owner.to_string()),
            json!({"agent": owner.to_string(), "phase": "end", "latency_ms": started.elapsed().as_millis() as u64, "cached": false}),
        )
        .await;

    if decision.tool_calls.len() > 1 {
        runtime
            .event_bus
            .publish(
                EventType::Log,
                Some(owner.to_string()),
                json!({"warning": "LLM proposed multiple tool calls; only the first is invoked", "count": decision.tool_calls.len()}),
            )
            .await;
    }

    match decision.tool_calls.first().cloned() {
        Some(mut tool_call) => {
            if let Some(guard) = guard {
                guard(state, &mut tool_call);
            }
            apply_tool_decision(runtime, owner, &task_id, authorized_tools, tool_call, &decision, state).await
        }
        None => apply_tool_free_decision(owner, &task_id, &decision, state),
    }
}

async fn apply_tool_decision(
    runtime: &AgentRuntime,
    owner: AgentId,
    task_id: &str,
    authorized_tools: &[&str],
    tool_call: ToolCall,
    decision: &Decision,
    state: &mut WorkflowState,
) -> Result<(), EngineError> {
    if !authorized_tools.contains(&tool_call.tool.as_str()) {
        state.append_decision(owner.to_string(), format!("rejected unauthorized tool {}", tool_call.tool), decision.reasoning.clone());
        fail_task_with_blocker(
            state,
            task_id,
            owner,
            format!("{} is not authorized to call tool {}", owner, tool_call.tool),
        )?;
        return Ok(());
    }

    let outcome = runtime.registry.invoke(owner, &tool_call.tool, tool_call.params.clone()).await;

    if outcome.is_semantic_failure() {
        let message = describe_failure(&tool_call.tool, &outcome);
        state.append_decision(owner.to_string(), format!("tool {} reported failure", tool_call.tool), decision.reasoning.clone());
        fail_task_with_blocker(state, task_id, owner, message)?;
        return Ok(());
    }

    let summary = summarize_success(&tool_call.tool, &outcome);
    state
        .mark_task(task_id, TaskStatus::Completed)
        .map_err(|e| EngineError::Executor(e.to_string()))?;
    if let Some(task) = state.task_mut(task_id) {
        task.result = Some(summary.clone());
    }
    if let Some(Value::Object(payload)) = success_payload(&outcome) {
        // `open_account` is the one tool call whose payload is the
        // workflow's business outcome; everything else just enriches
        // `context` (e.g. the client profile `get_client_info` fetched).
        // This records the outcome as soon as the task completes, ahead of
        // the workflow as a whole reaching a terminal state; if a later
        // task still blocks, `WorkflowState::add_blocker` clears `outcome`
        // again so a blocked workflow never reports one.
        if tool_call.tool == "open_account" {
            if let Some(account_number) = payload.get("account_number").cloned() {
                state.set_outcome("account_number", account_number);
            }
            if let Some(status) = payload.get("status").cloned() {
                state.set_outcome("status", status);
            }
        }
        for (key, value) in payload {
            if key == "success" {
                continue;
            }
            state.context.insert(key, value);
        }
    }
    state.append_decision(owner.to_string(), summary, decision.reasoning.clone());
    if let Some(message) = &decision.message_to_client {
        state.append_message(owner.to_string(), "client", message.clone(), "status_update");
    }
    publish_task_update(runtime, state, task_id).await;
    Ok(())
}

fn apply_tool_free_decision(owner: AgentId, task_id: &str, decision: &Decision, state: &mut WorkflowState) -> Result<(), EngineError> {
    match decision.task_status {
        DecisionStatus::Completed => {
            state
                .mark_task(task_id, TaskStatus::Completed)
                .map_err(|e| EngineError::Executor(e.to_string()))?;
            if let Some(task) = state.task_mut(task_id) {
                task.result = Some(decision.reasoning.clone());
            }
            state.append_decision(owner.to_string(), "completed without a tool call", decision.reasoning.clone());
            Ok(())
        }
        DecisionStatus::Failed | DecisionStatus::Pending => {
            state.append_decision(owner.to_string(), "no actionable decision", decision.reasoning.clone());
            fail_task_with_blocker(state, task_id, owner, format!("no actionable decision for task: {}", decision.reasoning))
        }
    }
}

fn fail_task_with_blocker(state: &mut WorkflowState, task_id: &str, owner: AgentId, message: String) -> Result<(), EngineError> {
    state
        .mark_task(task_id, TaskStatus::Failed)
        .map_err(|e| EngineError::Executor(e.to_string()))?;
    if let Some(task) = state.task_mut(task_id) {
        task.result = Some(message.clone());
    }
    state.add_blocker(message, owner.to_string());
    Ok(())
}

async fn publish_task_update(runtime: &AgentRuntime, state: &WorkflowState, task_id: &str) {
    if let Some(task) = state.task(task_id) {
        runtime
            .event_bus
            .publish(
                EventType::TaskUpdate,
                Some(task.owner.to_string()),
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

fn describe_failure(tool: &str, outcome: &crate::registry::ToolOutcome) -> String {
    match outcome {
        crate::registry::ToolOutcome::Fail { message, .. } => message.clone(),
        crate::registry::ToolOutcome::Ok { payload } => {
            if payload.get("eligible").and_then(Value::as_bool) == Some(false) {
                payload.get("reason").and_then(Value::as_str).map(str::to_string).unwrap_or_else(|| format!("{tool} reported ineligible"))
            } else if payload.get("valid").and_then(Value::as_bool) == Some(false) {
                let errors = payload.get("errors").cloned().unwrap_or_default();
                format!("{tool} reported invalid document: {errors}")
            } else {
                format!("{tool} reported a semantic failure")
            }
        }
    }
}

fn summarize_success(tool: &str, outcome: &crate::registry::ToolOutcome) -> String {
    if let crate::registry::ToolOutcome::Ok { payload } = outcome {
        if let Some(account_number) = payload.get("account_number").and_then(Value::as_str) {
            return format!("{tool} succeeded: opened account {account_number}");
        }
    }
    format!("{tool} completed successfully")
}

fn success_payload(outcome: &crate::registry::ToolOutcome) -> Option<Value> {
    match outcome {
        crate::registry::ToolOutcome::Ok { payload } => Some(payload.clone()),
        crate::registry::ToolOutcome::Fail { .. } => None,
    }
}
