//! The LLM Adapter boundary: a narrow seat for an inherently adversarial
//! oracle. Every structural guarantee elsewhere in this crate (validator,
//! error propagation, exactly-one-task, exactly-one-tool, state
//! verification) exists because whatever sits behind this trait may return
//! a syntactically valid but semantically wrong decision.
//!
//! This crate ships a deterministic, keyword-driven `FixtureLlmAdapter`
//! rather than a network client: the planner's choice between templates and
//! a real model is left open (DESIGN.md), and a real network call has no
//! place in a backend that must stay reproducible for the example
//! scenarios. Swapping in a networked adapter means implementing
//! `LlmAdapter` against a real provider; nothing else in the crate changes.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::{AgentId, Task, TaskStatus, WorkflowState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    pub params: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Completed,
    Failed,
    Pending,
}

impl From<DecisionStatus> for TaskStatus {
    fn from(value: DecisionStatus) -> Self {
        match value {
            DecisionStatus::Completed => TaskStatus::Completed,
            DecisionStatus::Failed => TaskStatus::Failed,
            DecisionStatus::Pending => TaskStatus::Pending,
        }
    }
}

/// The structured decision an agent turn receives from the adapter. A real
/// provider may propose several tool calls in one turn; the agent invokes
/// only the first and emits a warning for the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
    pub task_status: DecisionStatus,
    pub message_to_client: Option<String>,
    pub reasoning: String,
}

impl Decision {
    pub fn fallback() -> Self {
        Self {
            tool_calls: Vec::new(),
            task_status: DecisionStatus::Pending,
            message_to_client: None,
            reasoning: "LLM adapter timed out or returned an unparseable response; deferring".to_string(),
        }
    }
}

/// `infer(role, prompt, context_digest) -> Decision | TimeoutFallback`. The
/// timeout/fallback behavior lives in `TimeoutLlmAdapter` so any inner
/// implementation automatically gets it.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn infer(&self, role: AgentId, prompt: &str, state: &WorkflowState) -> Decision;
}

#[async_trait]
impl LlmAdapter for std::sync::Arc<dyn LlmAdapter> {
    async fn infer(&self, role: AgentId, prompt: &str, state: &WorkflowState) -> Decision {
        (**self).infer(role, prompt, state).await
    }
}

/// Wraps any `LlmAdapter` with a deadline: on expiry, returns the
/// conservative fallback decision rather than propagating an error, so
/// callers never need special-case timeout handling.
pub struct TimeoutLlmAdapter<A: LlmAdapter> {
    inner: A,
    timeout: Duration,
}

impl<A: LlmAdapter> TimeoutLlmAdapter<A> {
    pub fn new(inner: A, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<A: LlmAdapter> LlmAdapter for TimeoutLlmAdapter<A> {
    async fn infer(&self, role: AgentId, prompt: &str, state: &WorkflowState) -> Decision {
        match tokio::time::timeout(self.timeout, self.inner.infer(role, prompt, state)).await {
            Ok(decision) => decision,
            Err(_) => {
                tracing::warn!(agent = %role, "LLM adapter call timed out, returning fallback decision");
                Decision::fallback()
            }
        }
    }
}

/// Optional response cache keyed by `(role, prompt_hash)`. Caching is
/// purely a cost optimization and must never change which decision a
/// given prompt produces.
pub struct CachingLlmAdapter<A: LlmAdapter> {
    inner: A,
    cache: Mutex<HashMap<(AgentId, u64), Decision>>,
}

impl<A: LlmAdapter> CachingLlmAdapter<A> {
    pub fn new(inner: A) -> Self {
        Self { inner, cache: Mutex::new(HashMap::new()) }
    }

    fn prompt_hash(prompt: &str) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        prompt.hash(&mut hasher);
        hasher.finish()
    }
}

#[async_trait]
impl<A: LlmAdapter> LlmAdapter for CachingLlmAdapter<A> {
    async fn infer(&self, role: AgentId, prompt: &str, state: &WorkflowState) -> Decision {
        let key = (role, Self::prompt_hash(prompt));
        if let Some(cached) = self.cache.lock().get(&key).cloned() {
            return cached;
        }
        let decision = self.inner.infer(role, prompt, state).await;
        self.cache.lock().insert(key, decision.clone());
        decision
    }
}

/// A deterministic stand-in for a real model: infers the right tool from
/// the task's description (the Orchestrator is instructed to describe
/// outcomes, never tools, so this mapping is exactly the job a real LLM
/// would do) and builds parameters from the current request/context.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLlmAdapter;

impl FixtureLlmAdapter {
    fn current_task<'a>(&self, role: AgentId, state: &'a WorkflowState) -> Option<&'a Task> {
        state.tasks.iter().find(|t| t.owner == role && t.status == TaskStatus::InProgress)
    }

    fn account_type(&self, state: &WorkflowState) -> String {
        let cleaned = state.request.request_type.trim_start_matches("open_").trim_start_matches("create_");
        cleaned.to_uppercase()
    }

    fn doc_type_from(&self, description: &str) -> String {
        let lower = description.to_lowercase();
        if lower.contains("tax") {
            "tax_return".to_string()
        } else if lower.contains("id") || lower.contains("identity") {
            "identity_document".to_string()
        } else {
            "application_form".to_string()
        }
    }

    fn build(&self, state: &WorkflowState, task: &Task) -> Decision {
        let lower = task.description.to_lowercase();
        let client_id = state.request.client_id.clone();

        let tool_call = if lower.contains("eligib") {
            Some(ToolCall {
                tool: "check_eligibility".to_string(),
                params: json!({"client_id": client_id, "product_type": self.account_type(state).to_lowercase()}),
            })
        } else if lower.contains("validate") && lower.contains("document") {
            Some(ToolCall {
                tool: "validate_document".to_string(),
                params: json!({"client_id": client_id, "doc_type": self.doc_type_from(&lower)}),
            })
        } else if (lower.contains("open") || lower.contains("create")) && lower.contains("account") {
            Some(ToolCall {
                tool: "open_account".to_string(),
                params: json!({"client_id": client_id, "account_type": self.account_type(state)}),
            })
        } else if lower.contains("retrieve") || (lower.contains("get") && lower.contains("document")) {
            Some(ToolCall {
                tool: "get_document".to_string(),
                params: json!({"client_id": client_id, "doc_type": self.doc_type_from(&lower)}),
            })
        } else if lower.contains("update") && lower.contains("document") {
            Some(ToolCall {
                tool: "update_document".to_string(),
                params: json!({"client_id": client_id, "doc_type": self.doc_type_from(&lower), "data": {"reviewed": true}}),
            })
        } else if (lower.contains("create") || lower.contains("collect") || lower.contains("prepare")) && (lower.contains("form") || lower.contains("application") || lower.contains("document")) {
            Some(ToolCall {
                tool: "create_document".to_string(),
                params: json!({
                    "client_id": client_id,
                    "doc_type": self.doc_type_from(&lower),
                    "data": {"submitted_by": "advisor_agent"},
                }),
            })
        } else if lower.contains("notif") || lower.contains("send") {
            Some(ToolCall {
                tool: "send_notification".to_string(),
                params: json!({
                    "client_id": client_id,
                    "type": "status_update",
                    "content": format!("Update on your {} request: {}", state.request.request_type, task.description),
                }),
            })
        } else {
            Some(ToolCall {
                tool: "get_client_info".to_string(),
                params: json!({"client_id": client_id}),
            })
        };

        Decision {
            tool_calls: tool_call.into_iter().collect(),
            task_status: DecisionStatus::Pending,
            message_to_client: None,
            reasoning: format!("selected a tool for task '{}' by matching its description", task.description),
        }
    }
}

#[async_trait]
impl LlmAdapter for FixtureLlmAdapter {
    async fn infer(&self, role: AgentId, _prompt: &str, state: &WorkflowState) -> Decision {
        match self.current_task(role, state) {
            Some(task) => self.build(state, task),
            None => Decision::fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn state_with_in_progress(owner: AgentId, description: &str) -> WorkflowState {
        let mut state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        let mut task = Task::new("task_1", description, owner);
        task.status = TaskStatus::InProgress;
        state.tasks.push(task);
        state
    }

    #[tokio::test]
    async fn fixture_adapter_maps_eligibility_description_to_tool() {
        let adapter = FixtureLlmAdapter;
        let state = state_with_in_progress(AgentId::OperationsAgent, "verify client eligibility for Roth IRA");
        let decision = adapter.infer(AgentId::OperationsAgent, "", &state).await;
        assert_eq!(decision.tool_calls.len(), 1);
        assert_eq!(decision.tool_calls[0].tool, "check_eligibility");
    }

    #[tokio::test]
    async fn fixture_adapter_maps_account_description_with_uppercased_type() {
        let adapter = FixtureLlmAdapter;
        let state = state_with_in_progress(AgentId::OperationsAgent, "open the account for the client");
        let decision = adapter.infer(AgentId::OperationsAgent, "", &state).await;
        assert_eq!(decision.tool_calls[0].tool, "open_account");
        assert_eq!(decision.tool_calls[0].params["account_type"], "ROTH_IRA");
    }

    #[tokio::test]
    async fn no_in_progress_task_yields_fallback() {
        let adapter = FixtureLlmAdapter;
        let state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        let decision = adapter.infer(AgentId::OperationsAgent, "", &state).await;
        assert!(decision.tool_calls.is_empty());
        assert_eq!(decision.task_status, DecisionStatus::Pending);
    }

    struct SlowAdapter;
    #[async_trait]
    impl LlmAdapter for SlowAdapter {
        async fn infer(&self, _role: AgentId, _prompt: &str, _state: &WorkflowState) -> Decision {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Decision { tool_calls: vec![], task_status: DecisionStatus::Completed, message_to_client: None, reasoning: "slow".into() }
        }
    }

    #[tokio::test]
    async fn timeout_adapter_falls_back_on_expiry() {
        let adapter = TimeoutLlmAdapter::new(SlowAdapter, Duration::from_millis(5));
        let state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        let decision = adapter.infer(AgentId::OperationsAgent, "", &state).await;
        assert_eq!(decision.task_status, DecisionStatus::Pending);
    }

    struct CountingAdapter {
        calls: Arc<AtomicUsize>,
    }
    #[async_trait]
    impl LlmAdapter for CountingAdapter {
        async fn infer(&self, _role: AgentId, _prompt: &str, _state: &WorkflowState) -> Decision {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Decision { tool_calls: vec![], task_status: DecisionStatus::Completed, message_to_client: None, reasoning: "counted".into() }
        }
    }

    #[tokio::test]
    async fn caching_adapter_only_calls_inner_once_per_prompt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let adapter = CachingLlmAdapter::new(CountingAdapter { calls: calls.clone() });
        let state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        adapter.infer(AgentId::OperationsAgent, "same prompt", &state).await;
        adapter.infer(AgentId::OperationsAgent, "same prompt", &state).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
