//! The Advisor Agent: owns client-facing tasks -- form creation,
//! notifications, status updates.

use async_trait::async_trait;
use serde_json::Value;

use super::{run_step, Agent, AgentRuntime};
use crate::error::EngineError;
use crate::llm::ToolCall;
use crate::model::{AgentId, WorkflowState};

const AUTHORIZED_TOOLS: &[&str] = &["create_document", "update_document", "send_notification", "get_client_info"];

const PROMPT: &str = "You are the advisor agent for a financial services workflow engine. \
You handle client-facing communication: forms, status updates, and notifications. Choose exactly \
one tool call that advances the current task, or report that the task is blocked.";

const TERMINAL_CLAIM_MARKERS: &[&str] = &["created", "opened", "ready", "complete", "approved"];

/// State-verification rule: before a notification claims a terminal
/// outcome, verify that outcome actually exists in `state.outcome`;
/// otherwise downgrade the phrasing to "in progress".
fn verify_terminal_claim(state: &WorkflowState, call: &mut ToolCall) {
    if call.tool != "send_notification" {
        return;
    }
    let Some(content) = call.params.get("content").and_then(Value::as_str).map(str::to_string) else {
        return;
    };
    let claims_terminal_outcome = TERMINAL_CLAIM_MARKERS.iter().any(|marker| content.to_lowercase().contains(marker));
    if claims_terminal_outcome && state.outcome.is_empty() {
        if let Some(obj) = call.params.as_object_mut() {
            obj.insert(
                "content".to_string(),
                Value::String(format!("Your request is in progress; we will notify you once it completes. ({content})")),
            );
        }
    }
}

pub struct AdvisorAgent {
    runtime: AgentRuntime,
}

impl AdvisorAgent {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Agent for AdvisorAgent {
    fn id(&self) -> AgentId {
        AgentId::AdvisorAgent
    }

    async fn step(&self, state: &mut WorkflowState) -> Result<(), EngineError> {
        run_step(&self.runtime, AgentId::AdvisorAgent, PROMPT, AUTHORIZED_TOOLS, Some(verify_terminal_claim), state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn downgrades_premature_terminal_claim() {
        let state = WorkflowState::new(crate::model::Request::new("open_roth_ira", "C1"));
        let mut call = ToolCall {
            tool: "send_notification".to_string(),
            params: json!({"client_id": "C1", "type": "status_update", "content": "Your account has been created"}),
        };
        verify_terminal_claim(&state, &mut call);
        let content = call.params["content"].as_str().unwrap();
        assert!(content.contains("in progress"));
    }

    #[test]
    fn leaves_claim_untouched_once_outcome_exists() {
        let mut state = WorkflowState::new(crate::model::Request::new("open_roth_ira", "C1"));
        state.set_outcome("account_number", json!("ROTH_IRA-1000"));
        let mut call = ToolCall {
            tool: "send_notification".to_string(),
            params: json!({"client_id": "C1", "type": "status_update", "content": "Your account has been created"}),
        };
        verify_terminal_claim(&state, &mut call);
        assert_eq!(call.params["content"].as_str().unwrap(), "Your account has been created");
    }
}
