use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub task: String,
    pub context: Option<String>,
    pub user_id: String,
    pub priority: Option<String>,
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationResponse {
    pub id: String,
    pub status: String,
    pub result: Option<serde_json::Value>,
    pub reasoning: Option<String>,
    pub confidence: f64,
    pub agents_used: Vec<String>,
    pub processing_time: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub status: String,
    pub last_used: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeRequest {
    pub query: String,
    pub context: Option<String>,
    pub user_id: String,
    pub knowledge_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeResponse {
    pub knowledge: Vec<serde_json::Value>,
    pub sources: Vec<String>,
    pub confidence: f64,
    pub processing_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentPipelineRequest {
    pub task: String,
    pub requirements: Vec<String>,
    pub user_id: String,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentPipelineResponse {
    pub pipeline_id: String,
    pub steps: Vec<PipelineStep>,
    pub estimated_duration: f64,
    pub status: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStep {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: String,
    pub dependencies: Vec<String>,
    pub estimated_duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveReasoningRequest {
    pub problem: String,
    pub context: Option<String>,
    pub reasoning_type: Option<String>,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CognitiveReasoningResponse {
    pub reasoning: String,
    pub conclusion: String,
    pub confidence: f64,
    pub steps: Vec<ReasoningStep>,
    pub processing_time: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: u32,
    pub description: String,
    pub result: String,
    pub confidence: f64,
}

pub struct DSPyOrchestrator {
    orchestrations: Arc<RwLock<HashMap<String, OrchestrationResponse>>>,
    agents: Arc<RwLock<HashMap<String, AgentInfo>>>,
}

impl DSPyOrchestrator {
    pub fn new() -> Self {
        let mut agents = HashMap::new();
        
        // Initialize default agents
        agents.insert("planner".to_string(), AgentInfo {
            id: "planner".to_string(),
            name: "Strategic Planner".to_string(),
            description: "Creates strategic plans and roadmaps".to_string(),
            capabilities: vec!["planning".to_string(), "strategy".to_string()],
            status: "active".to_string(),
            last_used: Some(chrono::Utc::now()),
        });
        
        agents.insert("synthesizer".to_string(), AgentInfo {
            id: "synthesizer".to_string(),
            name: "Information Synthesizer".to_string(),
            description: "Synthesizes information from multiple sources".to_string(),
            capabilities: vec!["synthesis".to_string(), "analysis".to_string()],
            status: "active".to_string(),
            last_used: Some(chrono::Utc::now()),
        });
        
        agents.insert("devils_advocate".to_string(), AgentInfo {
            id: "devils_advocate".to_string(),
            name: "Devil's Advocate".to_string(),
            description: "Challenges assumptions and provides critical analysis".to_string(),
            capabilities: vec!["critical_thinking".to_string(), "challenge".to_string()],
            status: "active".to_string(),
            last_used: Some(chrono::Utc::now()),
        });
        
        Self {
            orchestrations: Arc::new(RwLock::new(HashMap::new())),
            agents: Arc::new(RwLock::new(agents)),
        }
    }

    pub async fn orchestrate(&self, request: OrchestrationRequest) -> Result<OrchestrationResponse, Box<dyn std::error::Error>> {
        let start_time = std::time::Instant::now();
        let orchestration_id = uuid::Uuid::new_v4().to_string();
        
        // Simulate orchestration process
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;
        
        let agents_used = vec!["planner".to_string(), "synthesizer".to_string(), "devils_advocate".to_string()];
        
        let reasoning = format!(
            "Analyzing task: '{}'. Context: {}. Using agents: {}. Processing with strategic planning, information synthesis, and critical analysis.",
            request.task,
            request.context.as_deref().unwrap_or("No context provided"),
            agents_used.join(", ")
        );
        
        let result = serde_json::json!({
            "task": request.task,
            "analysis": "Task has been processed through our cognitive reasoning chain",
            "recommendations": [
                "Consider multiple perspectives",
                "Validate assumptions",
                "Plan for contingencies"
            ],
            "confidence": 0.85
        });
        
        let mut metadata = HashMap::new();
        metadata.insert("processing_mode".to_string(), serde_json::Value::String("cognitive_chain".to_string()));
        metadata.insert("agents_count".to_string(), serde_json::Value::Number(serde_json::Number::from(agents_used.len())));
        
        let orchestration_response = OrchestrationResponse {
            id: orchestration_id.clone(),
            status: "completed".to_string(),
            result: Some(result),
            reasoning: Some(reasoning),
            confidence: 0.85,
            agents_used,
            processing_time: start_time.elapsed().as_secs_f64(),
            created_at: chrono::Utc::now(),
            metadata,
        };
        
        // Store the orchestration
        let orchestrations = self.orchestrations.clone();
        let response_clone = orchestration_response.clone();
        tokio::spawn(async move {
            let mut orchestrations_guard = orchestrations.write().await;
            orchestrations_guard.insert(orchestration_id, response_clone);
        });
        
        Ok(orchestration_response)
    }

    pub async fn get_agents(&self) -> Result<Vec<AgentInfo>, Box<dyn std::error::Error>> {
        let agents = self.agents.read().await;
        Ok(agents.values().cloned().collect())
    }

    pub async fn extract_knowledge(&self, request: KnowledgeRequest) -> Result<KnowledgeResponse, Box<dyn std::error::Error>> {
        let start_time = std::time::Instant::now();
        
        // Simulate knowledge extraction
        tokio::time::sleep(tokio::time::Duration::from_millis(150)).await;
        
        let knowledge = vec![
            serde_json::json!({
                "title": "Knowledge about the query",
                "content": format!("Based on the query '{}', here's relevant knowledge extracted from our knowledge base.", request.query),
                "confidence": 0.8,
                "source": "internal_kb"
            })
        ];
        
        let sources = vec!["internal_knowledge_base".to_string(), "context_analysis".to_string()];
        
        Ok(KnowledgeResponse {
            knowledge,
            sources,
            confidence: 0.8,
            processing_time: start_time.elapsed().as_secs_f64(),
        })
    }

    pub async fn create_development_pipeline(&self, request: DevelopmentPipelineRequest) -> Result<DevelopmentPipelineResponse, Box<dyn std::error::Error>> {
        let pipeline_id = uuid::Uuid::new_v4().to_string();
        
        let steps = vec![
            PipelineStep {
                id: "step_1".to_string(),
                name: "Analysis".to_string(),
                description: "Analyze requirements and constraints".to_string(),
                status: "pending".to_string(),
                dependencies: vec![],
                estimated_duration: 1.0,
            },
            PipelineStep {
                id: "step_2".to_string(),
                name: "Design".to_string(),
                description: "Create system design and architecture".to_string(),
                status: "pending".to_string(),
                dependencies: vec!["step_1".to_string()],
                estimated_duration: 2.0,
            },
            PipelineStep {
                id: "step_3".to_string(),
                name: "Implementation".to_string(),
                description: "Implement the solution".to_string(),
                status: "pending".to_string(),
                dependencies: vec!["step_2".to_string()],
                estimated_duration: 4.0,
            },
            PipelineStep {
                id: "step_4".to_string(),
                name: "Testing".to_string(),
                description: "Test and validate the implementation".to_string(),
                status: "pending".to_string(),
                dependencies: vec!["step_3".to_string()],
                estimated_duration: 1.5,
            },
        ];
        
        let estimated_duration: f64 = steps.iter().map(|s| s.estimated_duration).sum();
        
        Ok(DevelopmentPipelineResponse {
            pipeline_id,
            steps,
            estimated_duration,
            status: "created".to_string(),
            created_at: chrono::Utc::now(),
        })
    }

    pub async fn perform_cognitive_reasoning(&self, request: CognitiveReasoningRequest) -> Result<CognitiveReasoningResponse, Box<dyn std::error::Error>> {
        let start_time = std::time::Instant::now();
        
        // Simulate cognitive reasoning
        tokio::time::sleep(tokio::time::Duration::from_millis(300)).await;
        
        let steps = vec![
            ReasoningStep {
                step: 1,
                description: "Problem Analysis".to_string(),
                result: format!("Analyzed problem: {}", request.problem),
                confidence: 0.9,
            },
            ReasoningStep {
                step: 2,
                description: "Context Evaluation".to_string(),
                result: "Evaluated context and constraints".to_string(),
                confidence: 0.8,
            },
            ReasoningStep {
                step: 3,
                description: "Solution Generation".to_string(),
                result: "Generated potential solutions".to_string(),
                confidence: 0.85,
            },
            ReasoningStep {
                step: 4,
                description: "Validation".to_string(),
                result: "Validated solution against requirements".to_string(),
                confidence: 0.9,
            },
        ];
        
        let reasoning = format!(
            "Performed cognitive reasoning on problem: '{}'. Applied systematic analysis, context evaluation, solution generation, and validation steps.",
            request.problem
        );
        
        let conclusion = "Based on the cognitive reasoning process, a comprehensive solution has been developed that addresses the core problem while considering all relevant factors and constraints.";
        
        Ok(CognitiveReasoningResponse {
            reasoning,
            conclusion: conclusion.to_string(),
            confidence: 0.87,
            steps,
            processing_time: start_time.elapsed().as_secs_f64(),
        })
    }

    pub async fn get_orchestration(&self, orchestration_id: &str) -> Option<OrchestrationResponse> {
        let orchestrations = self.orchestrations.read().await;
        orchestrations.get(orchestration_id).cloned()
    }

    pub async fn get_health_status(&self) -> HashMap<String, serde_json::Value> {
        let mut status = HashMap::new();
        status.insert("status".to_string(), serde_json::Value::String("healthy".to_string()));
        status.insert("service".to_string(), serde_json::Value::String("dspy-rust-service".to_string()));
        status.insert("rust_native".to_string(), serde_json::Value::Bool(true));
        
        let orchestrations = self.orchestrations.read().await;
        status.insert("active_orchestrations".to_string(), serde_json::Value::Number(serde_json::Number::from(orchestrations.len())));
        
        let agents = self.agents.read().await;
        status.insert("available_agents".to_string(), serde_json::Value::Number(serde_json::Number::from(agents.len())));
        
        status
    }
}