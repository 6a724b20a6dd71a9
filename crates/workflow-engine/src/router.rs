//! The Supervisor / Router: a pure function that decides which agent runs
//! next, or that the workflow is done. Holds no state of its own -- every
//! decision is computed fresh from the `WorkflowState` it is handed.

use crate::error::EngineError;
use crate::model::{AgentId, TaskStatus, WorkflowState, WorkflowStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Next(AgentId),
    Done,
}

pub struct Router;

impl Router {
    /// Raises `EngineError::InvariantViolation` when the ready set is empty
    /// while a task is in progress -- at most one task is ever
    /// `in_progress` at a time, so that combination can never happen.
    /// Reaching it is a logic bug in the executor or an agent, not a
    /// recoverable routing outcome.
    pub fn route(state: &mut WorkflowState) -> Result<RouteDecision, EngineError> {
        // 1. Already terminal.
        if matches!(state.status, WorkflowStatus::Completed | WorkflowStatus::Failed | WorkflowStatus::Blocked) {
            return Ok(RouteDecision::Done);
        }

        // 2. Every task reached a terminal state: finalize.
        if state.all_tasks_terminal() {
            let all_completed = state.tasks.iter().all(|t| t.status == TaskStatus::Completed || t.status == TaskStatus::Skipped);
            state.status = if !state.outcome.is_empty() || all_completed {
                WorkflowStatus::Completed
            } else {
                WorkflowStatus::Failed
            };
            return Ok(RouteDecision::Done);
        }

        // 3. Compute the ready set: pending tasks whose dependencies are
        // all completed.
        let by_id: std::collections::HashMap<String, &crate::model::Task> = state.tasks.iter().map(|t| (t.id.clone(), t)).collect();
        let mut ready: Vec<&crate::model::Task> = state.tasks.iter().filter(|t| t.is_ready(&by_id)).collect();

        // 4. Ready set empty but something is mid-flight: should never
        // happen under single-threaded-per-workflow execution.
        if ready.is_empty() && state.in_progress_count() > 0 {
            return Err(EngineError::InvariantViolation(
                "ready set is empty while a task is in_progress".to_string(),
            ));
        }

        // 5. Ready set empty, nothing in flight, but pending tasks remain:
        // a dependency deadlock (e.g. a cycle the planner should have
        // rejected, or a dependency on a failed/skipped task).
        if ready.is_empty() {
            state.add_blocker("dependency deadlock: no task is ready and none is in progress", "router");
            return Ok(RouteDecision::Done);
        }

        // 6. Highest priority first, tie-break by lowest id.
        ready.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        let chosen = ready[0];
        Ok(RouteDecision::Next(chosen.owner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Request, Task};

    fn state_with(tasks: Vec<Task>) -> WorkflowState {
        let mut state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        state.tasks = tasks;
        state.status = WorkflowStatus::InProgress;
        state
    }

    #[test]
    fn routes_to_owner_of_highest_priority_ready_task() {
        let mut state = state_with(vec![
            Task::new("task_1", "a", AgentId::OperationsAgent).with_priority(Priority::Low),
            Task::new("task_2", "b", AgentId::AdvisorAgent).with_priority(Priority::High),
        ]);
        let decision = Router::route(&mut state).unwrap();
        assert_eq!(decision, RouteDecision::Next(AgentId::AdvisorAgent));
    }

    #[test]
    fn tie_breaks_by_lowest_id() {
        let mut state = state_with(vec![
            Task::new("task_2", "b", AgentId::AdvisorAgent),
            Task::new("task_1", "a", AgentId::OperationsAgent),
        ]);
        let decision = Router::route(&mut state).unwrap();
        assert_eq!(decision, RouteDecision::Next(AgentId::OperationsAgent));
    }

    #[test]
    fn all_tasks_terminal_with_outcome_completes() {
        let mut t = Task::new("task_1", "a", AgentId::OperationsAgent);
        t.status = TaskStatus::Completed;
        let mut state = state_with(vec![t]);
        state.set_outcome("account_number", serde_json::json!("ROTH_IRA-1000"));
        let decision = Router::route(&mut state).unwrap();
        assert_eq!(decision, RouteDecision::Done);
        assert_eq!(state.status, WorkflowStatus::Completed);
    }

    #[test]
    fn all_tasks_terminal_without_outcome_or_all_completed_fails() {
        let mut t = Task::new("task_1", "a", AgentId::OperationsAgent);
        t.status = TaskStatus::Failed;
        let mut state = state_with(vec![t]);
        let decision = Router::route(&mut state).unwrap();
        assert_eq!(decision, RouteDecision::Done);
        assert_eq!(state.status, WorkflowStatus::Failed);
    }

    #[test]
    fn dependency_deadlock_blocks() {
        let t = Task::new("task_1", "a", AgentId::OperationsAgent).with_dependencies(["task_missing".to_string()]);
        let mut state = state_with(vec![t]);
        let decision = Router::route(&mut state).unwrap();
        assert_eq!(decision, RouteDecision::Done);
        assert_eq!(state.status, WorkflowStatus::Blocked);
    }

    #[test]
    fn ready_empty_with_in_progress_task_is_an_invariant_violation() {
        let mut t1 = Task::new("task_1", "a", AgentId::OperationsAgent);
        t1.status = TaskStatus::InProgress;
        let t2 = Task::new("task_2", "b", AgentId::AdvisorAgent).with_dependencies(["task_1".to_string()]);
        let mut state = state_with(vec![t1, t2]);
        assert!(Router::route(&mut state).is_err());
    }

    #[test]
    fn already_terminal_status_is_done_immediately() {
        let mut state = state_with(vec![Task::new("task_1", "a", AgentId::OperationsAgent)]);
        state.status = WorkflowStatus::Blocked;
        let decision = Router::route(&mut state).unwrap();
        assert_eq!(decision, RouteDecision::Done);
    }
}
