//! The Orchestrator Agent: runs exactly once per workflow, before any other
//! agent, to produce the task graph. Task descriptions name the outcome
//! ("verify eligibility"), never the tool -- tool selection is an
//! execution-time decision made by the owning agent.
//!
//! Planning deterministically vs. delegating to an LLM is an open design
//! choice as long as the Validator still runs; this implementation plans
//! deterministically (see DESIGN.md) so the example scenarios are
//! reproducible without depending on whatever sits behind `LlmAdapter`.

use serde_json::json;

use crate::events::{EventBus, EventType};
use crate::model::{AgentId, Priority, Request, Task, WorkflowState, WorkflowStatus};

pub struct OrchestratorAgent {
    event_bus: EventBus,
}

impl OrchestratorAgent {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Build the initial task graph for `state.request` and install it.
    /// The Validator runs separately, immediately afterward, as the next
    /// step of the executor loop.
    pub async fn plan(&self, state: &mut WorkflowState) {
        let tasks = Self::template_for(&state.request);
        state.tasks = tasks;
        state.status = WorkflowStatus::InProgress;
        // The orchestrator is not one of the two routable agents, so its
        // decisions are recorded under a literal role name rather than an
        // `AgentId` variant.
        state.append_decision(
            "orchestrator",
            "planned task graph",
            format!("generated {} tasks for request type {}", state.tasks.len(), state.request.request_type),
        );

        for task in &state.tasks {
            self.event_bus
                .publish(
                    EventType::TaskUpdate,
                    Some("orchestrator".to_string()),
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

    fn account_type(request: &Request) -> String {
        request.request_type.trim_start_matches("open_").trim_start_matches("create_").to_uppercase()
    }

    fn template_for(request: &Request) -> Vec<Task> {
        let lower = request.request_type.to_lowercase();
        if lower.contains("ira") || lower.contains("account") {
            let account_type = Self::account_type(request);
            vec![
                Task::new("task_1", format!("Verify client eligibility for a {account_type} account"), AgentId::OperationsAgent)
                    .with_priority(Priority::High),
                Task::new("task_2", "Validate the client's tax return documents", AgentId::OperationsAgent)
                    .with_dependencies(["task_1".to_string()]),
                Task::new("task_3", "Prepare the account opening application form for the client", AgentId::AdvisorAgent)
                    .with_dependencies(["task_1".to_string()]),
                Task::new("task_4", format!("Open {account_type} account for the client"), AgentId::OperationsAgent)
                    .with_dependencies(["task_2".to_string(), "task_3".to_string()])
                    .with_priority(Priority::High),
                Task::new("task_5", "Send account opening confirmation notification to the client", AgentId::AdvisorAgent)
                    .with_dependencies(["task_4".to_string()]),
            ]
        } else {
            vec![
                Task::new("task_1", "Gather client information relevant to the request", AgentId::OperationsAgent),
                Task::new("task_2", "Send a status update notification to the client", AgentId::AdvisorAgent)
                    .with_dependencies(["task_1".to_string()]),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskStatus;
    use uuid::Uuid;

    #[tokio::test]
    async fn ira_requests_plan_a_full_five_task_graph_with_account_creation() {
        let bus = EventBus::new(Uuid::new_v4(), 16);
        let orchestrator = OrchestratorAgent::new(bus);
        let mut state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        orchestrator.plan(&mut state).await;

        assert_eq!(state.tasks.len(), 5);
        assert!(state.tasks.iter().any(|t| t.owner == AgentId::OperationsAgent && t.description.to_lowercase().contains("open")));
        assert!(state.tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert_eq!(state.status, WorkflowStatus::InProgress);
    }

    #[tokio::test]
    async fn unrecognized_requests_get_a_minimal_generic_plan() {
        let bus = EventBus::new(Uuid::new_v4(), 16);
        let orchestrator = OrchestratorAgent::new(bus);
        let mut state = WorkflowState::new(Request::new("schedule_review", "C1"));
        orchestrator.plan(&mut state).await;
        assert_eq!(state.tasks.len(), 2);
    }
}
