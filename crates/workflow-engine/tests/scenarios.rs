//! Cross-module scenario tests exercising the full executor loop against
//! the documented example fixtures (happy path, duplicate account,
//! ineligibility, invalid documents, validator injection, concurrency).

use std::sync::Arc;

use serde_json::json;
use workflow_engine::agents::{Agent, AgentRuntime, OperationsAgent};
use workflow_engine::backends::ToolBackends;
use workflow_engine::events::EventType;
use workflow_engine::llm::FixtureLlmAdapter;
use workflow_engine::model::{AgentId, Priority, Request, Task, WorkflowState, WorkflowStatus};
use workflow_engine::registry::ToolRegistry;
use workflow_engine::router::{RouteDecision, Router};
use workflow_engine::validator::TaskValidator;
use workflow_engine::{EngineConfig, EventBus, WorkflowEngine};

async fn drain_to_completion(mut subscription: workflow_engine::EventSubscription) -> serde_json::Value {
    while let Some(event) = subscription.receiver.recv().await {
        if event.event_type == EventType::WorkflowComplete {
            return event.payload;
        }
    }
    panic!("event stream ended without a workflow_complete event");
}

#[tokio::test]
async fn s1_happy_path_opens_an_account_and_completes() {
    let backends = ToolBackends::with_example_fixtures().await;
    let engine = WorkflowEngine::new(EngineConfig::default(), backends, Arc::new(FixtureLlmAdapter));
    let (_, subscription) = engine.start(Request::new("open_roth_ira", "C1"));
    let outcome = drain_to_completion(subscription).await;

    assert_eq!(outcome["status"], json!("completed"));
    assert!(outcome["outcome"]["account_number"].as_str().unwrap().starts_with("ROTH_IRA-"));
    assert_eq!(outcome["total_tasks"], json!(5));
}

#[tokio::test]
async fn s2_duplicate_account_blocks_with_a_conflict_blocker() {
    let backends = ToolBackends::with_example_fixtures().await;
    let engine = WorkflowEngine::new(EngineConfig::default(), backends, Arc::new(FixtureLlmAdapter));
    let (_, subscription) = engine.start(Request::new("open_roth_ira", "C2"));
    let outcome = drain_to_completion(subscription).await;

    assert_eq!(outcome["status"], json!("blocked"));
    let blockers = outcome["blockers"].as_array().unwrap();
    assert!(blockers.iter().any(|b| b["description"].as_str().unwrap().contains("ROTH_IRA-1001")));
}

#[tokio::test]
async fn s3_ineligible_client_blocks_on_income_limit() {
    let backends = ToolBackends::with_example_fixtures().await;
    let engine = WorkflowEngine::new(EngineConfig::default(), backends, Arc::new(FixtureLlmAdapter));
    let (_, subscription) = engine.start(Request::new("open_roth_ira", "C3"));
    let outcome = drain_to_completion(subscription).await;

    assert_eq!(outcome["status"], json!("blocked"));
    let blockers = outcome["blockers"].as_array().unwrap();
    assert!(blockers.iter().any(|b| b["description"].as_str().unwrap().contains("exceeds")));
}

#[tokio::test]
async fn s4_invalid_documents_block_before_account_creation() {
    let backends = ToolBackends::with_example_fixtures().await;
    let engine = WorkflowEngine::new(EngineConfig::default(), backends, Arc::new(FixtureLlmAdapter));
    let (_, subscription) = engine.start(Request::new("open_roth_ira", "C4"));
    let outcome = drain_to_completion(subscription).await;

    assert_eq!(outcome["status"], json!("blocked"));
    assert_eq!(outcome["outcome"], json!({}));
    let blockers = outcome["blockers"].as_array().unwrap();
    assert!(blockers.iter().any(|b| b["description"].as_str().unwrap().contains("signature missing")));
}

/// S5: a planner that forgets the account-creation task still ends up with
/// one, inserted by the validator, before the executor ever gets to route
/// through it -- exercised here below the `WorkflowEngine` surface since
/// the shipping Orchestrator's own template never produces an incomplete
/// plan for an `_ira` request.
#[tokio::test]
async fn s5_validator_repairs_a_plan_missing_account_creation() {
    let mut tasks = vec![
        Task::new("task_1", "verify client eligibility", AgentId::OperationsAgent),
        Task::new("task_2", "validate the client's tax return documents", AgentId::OperationsAgent)
            .with_dependencies(["task_1".to_string()]),
        Task::new("task_3", "send account opening confirmation notification to the client", AgentId::AdvisorAgent)
            .with_dependencies(["task_2".to_string()])
            .with_priority(Priority::Normal),
    ];
    TaskValidator::new().apply("open_roth_ira", &mut tasks);
    assert_eq!(tasks.len(), 4, "validator should have inserted the missing account-creation task");

    let backends = ToolBackends::with_example_fixtures().await;
    let event_bus = EventBus::new(uuid::Uuid::new_v4(), 32);
    let registry = Arc::new(ToolRegistry::new(backends, event_bus.clone(), workflow_engine::OrchestrationMetrics::new()));
    let runtime = AgentRuntime { llm: Arc::new(FixtureLlmAdapter), registry, event_bus };
    let operations = OperationsAgent::new(runtime);

    let mut state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
    state.tasks = tasks;
    state.status = WorkflowStatus::InProgress;

    for _ in 0..10 {
        match Router::route(&mut state).unwrap() {
            RouteDecision::Done => break,
            RouteDecision::Next(AgentId::OperationsAgent) => operations.step(&mut state).await.unwrap(),
            RouteDecision::Next(AgentId::AdvisorAgent) => {
                // No advisor in this pared-down scenario; the notification
                // task simply never becomes ready without one, which is
                // fine -- this test only cares that account creation runs.
                break;
            }
        }
    }

    assert!(state.outcome.contains_key("account_number"));
}

#[tokio::test]
async fn s6_concurrent_workflows_do_not_interfere() {
    let backends = ToolBackends::with_example_fixtures().await;
    let engine = WorkflowEngine::new(EngineConfig::default(), backends, Arc::new(FixtureLlmAdapter));

    let (_, sub5) = engine.start(Request::new("open_roth_ira", "C5"));
    let (_, sub6) = engine.start(Request::new("open_roth_ira", "C6"));

    let (outcome5, outcome6) = tokio::join!(drain_to_completion(sub5), drain_to_completion(sub6));

    assert_eq!(outcome5["status"], json!("completed"));
    assert_eq!(outcome6["status"], json!("completed"));
    assert_ne!(outcome5["outcome"]["account_number"], outcome6["outcome"]["account_number"]);
}
