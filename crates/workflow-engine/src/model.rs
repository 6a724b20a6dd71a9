//! The shared data model: requests, the workflow state document, tasks, and
//! the append-only audit trail (messages, decisions, blockers) that make up
//! a single workflow.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Role-specialized agents the supervisor can route control to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentId {
    OperationsAgent,
    AdvisorAgent,
}

impl AgentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::OperationsAgent => "operations_agent",
            AgentId::AdvisorAgent => "advisor_agent",
        }
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    InProgress,
    Blocked,
    Completed,
    Failed,
}

/// A single unit of work, owned by one agent and gated by dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub owner: AgentId,
    pub status: TaskStatus,
    pub dependencies: HashSet<String>,
    pub priority: Priority,
    pub result: Option<String>,
}

/// Error returned when a caller attempts a transition the task lifecycle
/// forbids. Reaching this is a logic bug, not a recoverable runtime
/// condition -- every code path that calls `transition` already knows the
/// task's current status.
#[derive(Debug, Clone, thiserror::Error)]
#[error("illegal task transition: {from:?} -> {to:?} on task {task_id}")]
pub struct IllegalTransition {
    pub task_id: String,
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl Task {
    pub fn new(id: impl Into<String>, description: impl Into<String>, owner: AgentId) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            owner,
            status: TaskStatus::Pending,
            dependencies: HashSet::new(),
            priority: Priority::Normal,
            result: None,
        }
    }

    pub fn with_dependencies(mut self, deps: impl IntoIterator<Item = String>) -> Self {
        self.dependencies = deps.into_iter().collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// A task is ready once it is `pending` and every dependency has
    /// reached `completed`.
    pub fn is_ready(&self, tasks_by_id: &HashMap<String, &Task>) -> bool {
        self.status == TaskStatus::Pending
            && self.dependencies.iter().all(|dep| {
                tasks_by_id
                    .get(dep.as_str())
                    .map(|t| t.status == TaskStatus::Completed)
                    .unwrap_or(false)
            })
    }

    /// Apply the task lifecycle's allowed transition table; rejects anything else.
    pub fn transition(&mut self, new_status: TaskStatus) -> Result<(), IllegalTransition> {
        let allowed = matches!(
            (self.status, new_status),
            (TaskStatus::Pending, TaskStatus::InProgress)
                | (TaskStatus::InProgress, TaskStatus::Completed)
                | (TaskStatus::InProgress, TaskStatus::Failed)
                | (TaskStatus::Pending, TaskStatus::Skipped)
        );
        if !allowed {
            return Err(IllegalTransition {
                task_id: self.id.clone(),
                from: self.status,
                to: new_status,
            });
        }
        self.status = new_status;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Visiting,
    Done,
}

/// Three-color DFS over the dependency graph (an edge runs from a task to
/// each of its dependencies). Returns the task ids forming a cycle, in
/// traversal order, or `None` if the graph is acyclic. Used right after
/// planning and again after validator augmentation, since either step
/// could in principle introduce a cycle.
pub fn find_cycle(tasks: &[Task]) -> Option<Vec<String>> {
    let by_id: HashMap<&str, &Task> = tasks.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut state: HashMap<&str, VisitState> = HashMap::new();

    for task in tasks {
        if state.contains_key(task.id.as_str()) {
            continue;
        }
        let mut path = Vec::new();
        if let Some(cycle) = visit(task.id.as_str(), &by_id, &mut state, &mut path) {
            return Some(cycle);
        }
    }
    None
}

fn visit<'a>(
    id: &'a str,
    by_id: &HashMap<&'a str, &'a Task>,
    state: &mut HashMap<&'a str, VisitState>,
    path: &mut Vec<String>,
) -> Option<Vec<String>> {
    state.insert(id, VisitState::Visiting);
    path.push(id.to_string());

    if let Some(task) = by_id.get(id) {
        for dep in &task.dependencies {
            match state.get(dep.as_str()) {
                Some(VisitState::Visiting) => {
                    let start = path.iter().position(|t| t == dep).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(dep.clone());
                    return Some(cycle);
                }
                Some(VisitState::Done) => continue,
                None => {
                    if let Some(cycle) = visit(dep.as_str(), by_id, state, path) {
                        return Some(cycle);
                    }
                }
            }
        }
    }

    path.pop();
    state.insert(id, VisitState::Done);
    None
}

/// Observational inter-agent note. Never gates execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub from_agent: String,
    pub to_agent: String,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
}

/// Audit record produced by each agent turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub agent: String,
    pub timestamp: DateTime<Utc>,
    pub decision: String,
    pub reasoning: String,
}

/// A recorded impediment. Any unresolved blocker forces the workflow into
/// `blocked`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blocker {
    pub description: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub resolved: bool,
}

/// The free-form business request that kicks off a workflow. Immutable once
/// created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub request_type: String,
    pub client_id: String,
    pub client_name: Option<String>,
    pub initiator: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Request {
    pub fn new(request_type: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            request_type: request_type.into(),
            client_id: client_id.into(),
            client_name: None,
            initiator: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn with_initiator(mut self, initiator: impl Into<String>) -> Self {
        self.initiator = Some(initiator.into());
        self
    }
}

/// The single shared document mutated by the executor loop. Exactly one
/// instance per workflow, owned exclusively by that workflow's executor task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub workflow_id: Uuid,
    pub request: Request,
    pub status: WorkflowStatus,
    pub context: HashMap<String, Value>,
    pub tasks: Vec<Task>,
    pub messages: Vec<Message>,
    pub decisions: Vec<Decision>,
    pub blockers: Vec<Blocker>,
    pub next_actions: Vec<String>,
    pub outcome: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(request: Request) -> Self {
        let now = Utc::now();
        Self {
            workflow_id: Uuid::new_v4(),
            request,
            status: WorkflowStatus::Pending,
            context: HashMap::new(),
            tasks: Vec::new(),
            messages: Vec::new(),
            decisions: Vec::new(),
            blockers: Vec::new(),
            next_actions: Vec::new(),
            outcome: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Deep copy for observability -- callers get a snapshot that cannot
    /// alias the executor's live state.
    pub fn snapshot(&self) -> WorkflowState {
        self.clone()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn has_unresolved_blockers(&self) -> bool {
        self.blockers.iter().any(|b| !b.resolved)
    }

    pub fn all_tasks_terminal(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.status.is_terminal())
    }

    pub fn in_progress_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status == TaskStatus::InProgress).count()
    }

    /// Transition a task and keep `updated_at` current. Does not by itself
    /// enforce the exactly-one-task-per-step rule -- that lives at the
    /// agent boundary, since it is a per-turn property, not a per-mutation
    /// one.
    pub fn mark_task(&mut self, id: &str, new_status: TaskStatus) -> Result<(), IllegalTransition> {
        let task = self.task_mut(id).ok_or_else(|| IllegalTransition {
            task_id: id.to_string(),
            from: TaskStatus::Pending,
            to: new_status,
        })?;
        task.transition(new_status)?;
        self.touch();
        Ok(())
    }

    pub fn add_blocker(&mut self, description: impl Into<String>, created_by: impl Into<String>) {
        self.blockers.push(Blocker {
            description: description.into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
            resolved: false,
        });
        self.status = WorkflowStatus::Blocked;
        self.next_actions.clear();
        // A blocked workflow never reports a business outcome, even if an
        // earlier task (e.g. account creation) already recorded one before
        // a later task blocked.
        self.outcome.clear();
        self.touch();
    }

    pub fn append_message(
        &mut self,
        from_agent: impl Into<String>,
        to_agent: impl Into<String>,
        content: impl Into<String>,
        message_type: impl Into<String>,
    ) {
        self.messages.push(Message {
            from_agent: from_agent.into(),
            to_agent: to_agent.into(),
            timestamp: Utc::now(),
            content: content.into(),
            message_type: message_type.into(),
        });
        self.touch();
    }

    pub fn append_decision(&mut self, agent: impl Into<String>, decision: impl Into<String>, reasoning: impl Into<String>) {
        self.decisions.push(Decision {
            agent: agent.into(),
            timestamp: Utc::now(),
            decision: decision.into(),
            reasoning: reasoning.into(),
        });
        self.touch();
    }

    pub fn set_outcome(&mut self, key: impl Into<String>, value: Value) {
        self.outcome.insert(key.into(), value);
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_transitions_follow_invariant_4() {
        let mut t = Task::new("task_1", "check eligibility", AgentId::OperationsAgent);
        assert!(t.transition(TaskStatus::InProgress).is_ok());
        assert!(t.transition(TaskStatus::Completed).is_ok());
        // completed -> in_progress is not a legal transition.
        assert!(t.transition(TaskStatus::InProgress).is_err());
    }

    #[test]
    fn pending_can_skip_directly() {
        let mut t = Task::new("task_2", "optional step", AgentId::AdvisorAgent);
        assert!(t.transition(TaskStatus::Skipped).is_ok());
    }

    #[test]
    fn acyclic_plan_has_no_cycle() {
        let tasks = vec![
            Task::new("task_1", "a", AgentId::OperationsAgent),
            Task::new("task_2", "b", AgentId::AdvisorAgent).with_dependencies(["task_1".to_string()]),
            Task::new("task_3", "c", AgentId::OperationsAgent).with_dependencies(["task_2".to_string()]),
        ];
        assert!(find_cycle(&tasks).is_none());
    }

    #[test]
    fn direct_cycle_is_detected() {
        let tasks = vec![
            Task::new("task_1", "a", AgentId::OperationsAgent).with_dependencies(["task_2".to_string()]),
            Task::new("task_2", "b", AgentId::AdvisorAgent).with_dependencies(["task_1".to_string()]),
        ];
        assert!(find_cycle(&tasks).is_some());
    }

    #[test]
    fn longer_cycle_is_detected() {
        let tasks = vec![
            Task::new("task_1", "a", AgentId::OperationsAgent).with_dependencies(["task_3".to_string()]),
            Task::new("task_2", "b", AgentId::AdvisorAgent).with_dependencies(["task_1".to_string()]),
            Task::new("task_3", "c", AgentId::OperationsAgent).with_dependencies(["task_2".to_string()]),
        ];
        let cycle = find_cycle(&tasks).unwrap();
        assert!(cycle.len() >= 3);
    }

    #[test]
    fn blocker_forces_blocked_status_and_clears_next_actions() {
        let mut state = WorkflowState::new(Request::new("open_roth_ira", "C1"));
        state.next_actions.push("operations_agent".to_string());
        state.add_blocker("ineligible", "operations_agent");
        assert_eq!(state.status, WorkflowStatus::Blocked);
        assert!(state.next_actions.is_empty());
        assert!(state.has_unresolved_blockers());
    }
}
