//! The Task Validator: a pure, post-planning structural safety net. It
//! never chooses a tool -- it only asserts that certain task
//! *descriptions*, owned by certain roles, exist for certain request
//! families, and inserts a synthetic task when one is missing.

use regex::Regex;

use crate::model::{AgentId, Priority, Task};

/// One "for request family F, pattern P must appear owned by role R" rule.
/// The engine ships with a single rule (account creation for IRA/account
/// requests); more can be added without touching the apply loop.
pub struct ValidatorRule {
    pub request_family: fn(&str) -> bool,
    pub description_pattern: Regex,
    pub owner: AgentId,
    pub synthetic_description: fn(&str) -> String,
}

pub struct TaskValidator {
    rules: Vec<ValidatorRule>,
}

impl Default for TaskValidator {
    fn default() -> Self {
        Self { rules: vec![account_creation_rule()] }
    }
}

fn account_creation_rule() -> ValidatorRule {
    ValidatorRule {
        request_family: |request_type: &str| {
            let lower = request_type.to_lowercase();
            lower.contains("ira") || lower.contains("account")
        },
        // Fixed literal, not user input: covered by this module's own
        // tests, so it can never fail to compile at runtime.
        description_pattern: Regex::new(r"(?i)(open|create).*account").unwrap(),
        owner: AgentId::OperationsAgent,
        synthetic_description: |request_type: &str| {
            let account_type = infer_account_type(request_type);
            format!("Create {account_type} account for the client")
        },
    }
}

/// Best-effort mapping from a request type like `open_roth_ira` to the
/// account type a synthetic task should name, e.g. `Roth IRA`.
fn infer_account_type(request_type: &str) -> String {
    let cleaned = request_type.trim_start_matches("open_").trim_start_matches("create_");
    cleaned
        .split('_')
        .map(|word| {
            let upper_words = ["ira", "llc", "401k"];
            if upper_words.contains(&word.to_lowercase().as_str()) {
                word.to_uppercase()
            } else {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl TaskValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every rule to `tasks`, mutating in place. Idempotent: a second
    /// call against an already-augmented task list is a no-op because the
    /// inserted task satisfies the rule's own pattern check.
    pub fn apply(&self, request_type: &str, tasks: &mut Vec<Task>) {
        for rule in &self.rules {
            if !(rule.request_family)(request_type) {
                continue;
            }
            let satisfied = tasks
                .iter()
                .any(|t| t.owner == rule.owner && rule.description_pattern.is_match(&t.description));
            if satisfied {
                continue;
            }
            self.insert_synthetic_task(rule, request_type, tasks);
        }
    }

    fn insert_synthetic_task(&self, rule: &ValidatorRule, request_type: &str, tasks: &mut Vec<Task>) {
        let last_operations_idx = tasks.iter().rposition(|t| t.owner == rule.owner);
        let first_advisor_notification_idx = tasks
            .iter()
            .position(|t| t.owner != rule.owner && t.description.to_lowercase().contains("notif"));

        let insert_at = match (last_operations_idx, first_advisor_notification_idx) {
            (Some(ops_idx), Some(notif_idx)) => ops_idx.saturating_add(1).min(notif_idx),
            (Some(ops_idx), None) => ops_idx + 1,
            (None, Some(notif_idx)) => notif_idx,
            (None, None) => tasks.len(),
        };

        let old_last_operations_id = last_operations_idx.map(|idx| tasks[idx].id.clone());

        // A placeholder id that cannot collide with any existing task id --
        // `renumber` below assigns the real, final `task_N` id based on
        // position, so this value only needs to be unique for the
        // dependency rewrite that happens before renumbering.
        let synthetic_id = "__synthetic_account_task__".to_string();
        let mut synthetic = Task::new(synthetic_id.clone(), (rule.synthetic_description)(request_type), rule.owner)
            .with_priority(Priority::High);
        if let Some(ref dep) = old_last_operations_id {
            synthetic = synthetic.with_dependencies([dep.clone()]);
        }
        tasks.insert(insert_at, synthetic);

        // Rewrite dependencies that pointed at the old last-operations task
        // so later tasks now wait on the synthetic one instead, then
        // renumber every id sequentially.
        if let Some(old_id) = old_last_operations_id {
            for (idx, task) in tasks.iter_mut().enumerate() {
                if idx == insert_at {
                    continue;
                }
                if task.dependencies.remove(&old_id) {
                    task.dependencies.insert(synthetic_id.clone());
                }
            }
        }

        renumber(tasks);
    }
}

/// Renumber every task id sequentially as `task_1`..`task_N`, rewriting
/// every dependency reference to match, while preserving task order.
fn renumber(tasks: &mut [Task]) {
    let remap: std::collections::HashMap<String, String> =
        tasks.iter().enumerate().map(|(i, t)| (t.id.clone(), format!("task_{}", i + 1))).collect();

    for task in tasks.iter_mut() {
        let new_deps = task.dependencies.iter().map(|d| remap.get(d).cloned().unwrap_or_else(|| d.clone())).collect();
        task.dependencies = new_deps;
    }
    // Positional, not keyed by `remap`'s (unordered) iteration -- each task's
    // new id is exactly `remap` says for *its own* old id, applied in the
    // same order the map was built from (tasks' current vector order).
    for (i, task) in tasks.iter_mut().enumerate() {
        task.id = format!("task_{}", i + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_missing_account_task() -> Vec<Task> {
        vec![
            Task::new("task_1", "verify client eligibility", AgentId::OperationsAgent),
            Task::new("task_2", "collect and validate documents", AgentId::OperationsAgent).with_dependencies(["task_1".to_string()]),
            Task::new("task_3", "send confirmation notification to client", AgentId::AdvisorAgent)
                .with_dependencies(["task_2".to_string()]),
        ]
    }

    #[test]
    fn injects_account_task_for_ira_requests_when_missing() {
        let validator = TaskValidator::new();
        let mut tasks = plan_missing_account_task();
        validator.apply("open_roth_ira", &mut tasks);

        assert_eq!(tasks.len(), 4);
        let inserted = &tasks[2];
        assert_eq!(inserted.owner, AgentId::OperationsAgent);
        assert!(Regex::new(r"(?i)(open|create).*account").unwrap().is_match(&inserted.description));
        assert!(inserted.description.contains("Roth"));

        // The notification task, now renumbered, depends on the inserted task.
        let notif = tasks.last().unwrap();
        assert!(notif.dependencies.contains(&inserted.id));
        assert!(!notif.dependencies.contains("task_2"));
    }

    #[test]
    fn leaves_already_satisfied_plans_untouched() {
        let validator = TaskValidator::new();
        let mut tasks = vec![
            Task::new("task_1", "verify client eligibility", AgentId::OperationsAgent),
            Task::new("task_2", "open Roth IRA account for the client", AgentId::OperationsAgent)
                .with_dependencies(["task_1".to_string()]),
        ];
        let before = tasks.clone();
        validator.apply("open_roth_ira", &mut tasks);
        assert_eq!(tasks.len(), before.len());
    }

    #[test]
    fn is_idempotent() {
        let validator = TaskValidator::new();
        let mut tasks = plan_missing_account_task();
        validator.apply("open_roth_ira", &mut tasks);
        let once = tasks.clone();
        validator.apply("open_roth_ira", &mut tasks);
        assert_eq!(tasks.len(), once.len());
        for (a, b) in tasks.iter().zip(once.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.description, b.description);
        }
    }

    #[test]
    fn non_account_requests_are_not_touched() {
        let validator = TaskValidator::new();
        let mut tasks = vec![Task::new("task_1", "schedule a portfolio review call", AgentId::AdvisorAgent)];
        let before = tasks.clone();
        validator.apply("schedule_review", &mut tasks);
        assert_eq!(tasks.len(), before.len());
    }
}
