//! The Tool Registry: resolves a tool name and parameters to a typed
//! result, and is the single boundary responsible for the crate's most
//! important correctness rule -- an internal backend failure must surface
//! as `ToolOutcome::Fail`, never as a success envelope with an error
//! wedged inside its payload.

use serde_json::{json, Value};

use crate::backends::ToolBackends;
use crate::error::ErrorKind;
use crate::events::{EventBus, EventType};
use crate::metrics::OrchestrationMetrics;
use crate::model::AgentId;

/// The tagged union every tool call resolves to. There is deliberately no
/// `Result<ToolOutcome, E>` wrapper around this -- an unknown tool name is
/// itself represented as `Fail { kind: NotFound, .. }`, not a Rust-level
/// error, because every caller (the agents) already treats `Fail` as the
/// thing to branch on.
#[derive(Debug, Clone)]
pub enum ToolOutcome {
    Ok { payload: Value },
    Fail { kind: ErrorKind, message: String },
}

impl ToolOutcome {
    pub fn ok(payload: Value) -> Self {
        ToolOutcome::Ok { payload }
    }

    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        ToolOutcome::Fail { kind, message: message.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ToolOutcome::Ok { .. })
    }

    /// Semantic-falsity check used by the error-propagation rule: an `Ok`
    /// payload can still mean failure (`eligible: false`, `valid: false`).
    pub fn is_semantic_failure(&self) -> bool {
        match self {
            ToolOutcome::Fail { .. } => true,
            ToolOutcome::Ok { payload } => {
                payload.get("eligible").and_then(Value::as_bool) == Some(false)
                    || payload.get("valid").and_then(Value::as_bool) == Some(false)
            }
        }
    }

    fn kind_str(&self) -> &'static str {
        match self {
            ToolOutcome::Ok { .. } => "ok",
            ToolOutcome::Fail { .. } => "fail",
        }
    }

    fn event_payload(&self) -> Value {
        match self {
            ToolOutcome::Ok { payload } => json!({"kind": "ok", "payload": payload}),
            ToolOutcome::Fail { kind, message } => json!({"kind": "fail", "error_kind": kind.to_string(), "message": message}),
        }
    }
}

/// Resolves tool name + parameters against the injected `ToolBackends` and
/// publishes a `tool_execution` event per call.
#[derive(Clone)]
pub struct ToolRegistry {
    backends: ToolBackends,
    event_bus: EventBus,
    metrics: OrchestrationMetrics,
}

impl ToolRegistry {
    pub fn new(backends: ToolBackends, event_bus: EventBus, metrics: OrchestrationMetrics) -> Self {
        Self { backends, event_bus, metrics }
    }

    pub async fn invoke(&self, agent: AgentId, name: &str, params: Value) -> ToolOutcome {
        self.metrics.tool_call();
        self.event_bus
            .publish(
                EventType::Log,
                Some(agent.to_string()),
                json!({"phase": "requested", "tool": name, "params": params}),
            )
            .await;

        let raw = self.dispatch(name, &params).await;
        let outcome = self.seal_errors(raw);

        self.event_bus
            .publish(
                EventType::ToolExecution,
                Some(agent.to_string()),
                json!({
                    "agent": agent.to_string(),
                    "tool": name,
                    "params": params,
                    "result": outcome.event_payload(),
                    "result_kind": outcome.kind_str(),
                }),
            )
            .await;

        outcome
    }

    /// Re-tags any backend response that smuggles an error inside an `Ok`
    /// payload (the legacy shape this engine's predecessor used) into a
    /// proper `Fail`. This is the enforcement point for the registry's
    /// error-propagation guarantee.
    fn seal_errors(&self, outcome: ToolOutcome) -> ToolOutcome {
        if let ToolOutcome::Ok { payload } = &outcome {
            if let Some(message) = payload.get("error").and_then(Value::as_str) {
                return ToolOutcome::fail(ErrorKind::Conflict, message.to_string());
            }
        }
        outcome
    }

    async fn dispatch(&self, name: &str, params: &Value) -> ToolOutcome {
        match name {
            "get_client_info" => self.get_client_info(params).await,
            "check_eligibility" => self.check_eligibility(params).await,
            "get_document" => self.get_document(params).await,
            "validate_document" => self.validate_document(params).await,
            "create_document" => self.create_document(params).await,
            "update_document" => self.update_document(params).await,
            "open_account" => self.open_account(params).await,
            "send_notification" => self.send_notification(params).await,
            other => ToolOutcome::fail(ErrorKind::NotFound, format!("unknown tool: {other}")),
        }
    }

    async fn get_client_info(&self, params: &Value) -> ToolOutcome {
        let Some(client_id) = params.get("client_id").and_then(Value::as_str) else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "client_id is required");
        };
        match self.backends.crm.get(client_id).await {
            Some(client) => ToolOutcome::ok(json!({"success": true, "client": client})),
            None => ToolOutcome::fail(ErrorKind::NotFound, format!("unknown client: {client_id}")),
        }
    }

    async fn check_eligibility(&self, params: &Value) -> ToolOutcome {
        let Some(client_id) = params.get("client_id").and_then(Value::as_str) else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "client_id is required");
        };
        let product_type = params.get("product_type").and_then(Value::as_str).unwrap_or("roth_ira");
        let Some(client) = self.backends.crm.get(client_id).await else {
            return ToolOutcome::fail(ErrorKind::NotFound, format!("unknown client: {client_id}"));
        };

        let (eligible, reason) = if product_type.eq_ignore_ascii_case("roth_ira") {
            if client.income > crate::backends::CrmBackend::roth_ira_income_limit() {
                (false, format!("income {} exceeds Roth IRA contribution limit", client.income))
            } else if client.age < 18 {
                (false, "client is under the minimum account-holder age".to_string())
            } else {
                (true, "client meets income and age requirements".to_string())
            }
        } else {
            (true, "no product-specific restriction modeled".to_string())
        };

        ToolOutcome::ok(json!({"success": true, "eligible": eligible, "reason": reason}))
    }

    async fn get_document(&self, params: &Value) -> ToolOutcome {
        let (client_id, doc_type) = match doc_params(params) {
            Ok(v) => v,
            Err(e) => return e,
        };
        match self.backends.documents.get(client_id, doc_type).await {
            Some(doc) => ToolOutcome::ok(json!({"success": true, "document": doc})),
            None => ToolOutcome::fail(ErrorKind::NotFound, format!("no {doc_type} on file for {client_id}")),
        }
    }

    async fn validate_document(&self, params: &Value) -> ToolOutcome {
        let (client_id, doc_type) = match doc_params(params) {
            Ok(v) => v,
            Err(e) => return e,
        };
        match self.backends.documents.validate(client_id, doc_type).await {
            Some((valid, errors)) => ToolOutcome::ok(json!({"success": true, "valid": valid, "errors": errors})),
            None => ToolOutcome::fail(ErrorKind::NotFound, format!("no {doc_type} on file for {client_id}")),
        }
    }

    async fn create_document(&self, params: &Value) -> ToolOutcome {
        let (client_id, doc_type) = match doc_params(params) {
            Ok(v) => v,
            Err(e) => return e,
        };
        let Some(data) = params.get("data").and_then(Value::as_object).cloned() else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "data must be an object");
        };
        let doc = self.backends.documents.create(client_id, doc_type, data).await;
        ToolOutcome::ok(json!({"success": true, "document": doc}))
    }

    async fn update_document(&self, params: &Value) -> ToolOutcome {
        let (client_id, doc_type) = match doc_params(params) {
            Ok(v) => v,
            Err(e) => return e,
        };
        let Some(data) = params.get("data").and_then(Value::as_object).cloned() else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "data must be an object");
        };
        match self.backends.documents.update(client_id, doc_type, data).await {
            Some(doc) => ToolOutcome::ok(json!({"success": true, "document": doc})),
            None => ToolOutcome::fail(ErrorKind::NotFound, format!("no {doc_type} on file for {client_id}")),
        }
    }

    async fn open_account(&self, params: &Value) -> ToolOutcome {
        let Some(client_id) = params.get("client_id").and_then(Value::as_str) else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "client_id is required");
        };
        let Some(account_type) = params.get("account_type").and_then(Value::as_str) else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "account_type is required");
        };
        if self.backends.crm.get(client_id).await.is_none() {
            return ToolOutcome::fail(ErrorKind::NotFound, format!("unknown client: {client_id}"));
        }
        match self.backends.accounts.open_account(client_id, account_type) {
            Ok(account) => ToolOutcome::ok(json!({
                "success": true,
                "account_number": account.account_number,
                "status": account.status,
                "created_at": account.created_at,
            })),
            Err(dup) => ToolOutcome::fail(
                ErrorKind::Conflict,
                format!("Client already has a {account_type} account: {}", dup.existing_account_number),
            ),
        }
    }

    async fn send_notification(&self, params: &Value) -> ToolOutcome {
        let Some(client_id) = params.get("client_id").and_then(Value::as_str) else {
            return ToolOutcome::fail(ErrorKind::InvalidArgument, "client_id is required");
        };
        if self.backends.crm.get(client_id).await.is_none() {
            return ToolOutcome::fail(ErrorKind::NotFound, format!("unknown client: {client_id}"));
        }
        let notification_type = params.get("type").and_then(Value::as_str).unwrap_or("update");
        let content = params.get("content").and_then(Value::as_str).unwrap_or("");
        self.backends.notifications.send(&self.event_bus, client_id, notification_type, content).await;
        ToolOutcome::ok(json!({"sent": true}))
    }
}

fn doc_params<'a>(params: &'a Value) -> Result<(&'a str, &'a str), ToolOutcome> {
    let client_id = params
        .get("client_id")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolOutcome::fail(ErrorKind::InvalidArgument, "client_id is required"))?;
    let doc_type = params
        .get("doc_type")
        .and_then(Value::as_str)
        .ok_or_else(|| ToolOutcome::fail(ErrorKind::InvalidArgument, "doc_type is required"))?;
    Ok((client_id, doc_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn registry_with_fixtures() -> ToolRegistry {
        let backends = ToolBackends::with_example_fixtures().await;
        ToolRegistry::new(backends, EventBus::new(Uuid::new_v4(), 16), OrchestrationMetrics::new())
    }

    #[tokio::test]
    async fn invoke_increments_the_tool_call_counter() {
        let backends = ToolBackends::with_example_fixtures().await;
        let metrics = OrchestrationMetrics::new();
        let registry = ToolRegistry::new(backends, EventBus::new(Uuid::new_v4(), 16), metrics.clone());
        registry.invoke(AgentId::OperationsAgent, "get_client_info", json!({"client_id": "C1"})).await;
        registry.invoke(AgentId::OperationsAgent, "delete_everything", json!({})).await;
        let snapshot = metrics.snapshot();
        assert!(matches!(snapshot.get("tool_calls_total"), Some(crate::metrics::MetricValue::Counter(2))));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_structured_not_found_failure() {
        let registry = registry_with_fixtures().await;
        let outcome = registry.invoke(AgentId::OperationsAgent, "delete_everything", json!({})).await;
        assert!(matches!(outcome, ToolOutcome::Fail { kind: ErrorKind::NotFound, .. }));
    }

    #[tokio::test]
    async fn duplicate_open_account_surfaces_as_conflict_not_nested_ok_error() {
        let registry = registry_with_fixtures().await;
        let outcome = registry
            .invoke(AgentId::OperationsAgent, "open_account", json!({"client_id": "C2", "account_type": "ROTH_IRA"}))
            .await;
        match outcome {
            ToolOutcome::Fail { kind: ErrorKind::Conflict, message } => {
                assert!(message.contains("ROTH_IRA-1001"));
            }
            other => panic!("expected Fail{{conflict}}, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ineligible_client_is_ok_with_semantic_false() {
        let registry = registry_with_fixtures().await;
        let outcome = registry
            .invoke(AgentId::OperationsAgent, "check_eligibility", json!({"client_id": "C3", "product_type": "roth_ira"}))
            .await;
        assert!(outcome.is_ok());
        assert!(outcome.is_semantic_failure());
    }

    #[tokio::test]
    async fn seal_errors_converts_smuggled_error_payloads() {
        let registry = registry_with_fixtures().await;
        let smuggled = ToolOutcome::ok(json!({"success": true, "error": "Client already has a ROTH_IRA account: ROTH_IRA-1001"}));
        let sealed = registry.seal_errors(smuggled);
        assert!(matches!(sealed, ToolOutcome::Fail { kind: ErrorKind::Conflict, .. }));
    }
}
