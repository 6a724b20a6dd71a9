//! The Operations Agent: owns backend-facing tasks -- eligibility,
//! document validation, account creation, document retrieval.

use async_trait::async_trait;

use super::{run_step, Agent, AgentRuntime};
use crate::error::EngineError;
use crate::model::{AgentId, WorkflowState};

const AUTHORIZED_TOOLS: &[&str] = &["check_eligibility", "validate_document", "get_document", "open_account", "get_client_info"];

const PROMPT: &str = "You are the operations agent for a financial services workflow engine. \
You handle backend verification and account provisioning. Choose exactly one tool call that \
advances the current task, or report that the task is blocked.";

pub struct OperationsAgent {
    runtime: AgentRuntime,
}

impl OperationsAgent {
    pub fn new(runtime: AgentRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Agent for OperationsAgent {
    fn id(&self) -> AgentId {
        AgentId::OperationsAgent
    }

    async fn step(&self, state: &mut WorkflowState) -> Result<(), EngineError> {
        run_step(&self.runtime, AgentId::OperationsAgent, PROMPT, AUTHORIZED_TOOLS, None, state).await
    }
}
