//! Hierarchical Workflow Orchestration System
//!
//! This module provides sophisticated workflow management for coordinating
//! multiple agents in complex, hierarchical task structures.

use crate::{
    OrchestrationError, Agent, AgentConfig,
    agent::AgentType,
    mcts::MCTSPlanner
};
use chrono::{DateTime, Utc};
use petgraph::{Graph, Directed, graph::NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque, HashSet};
use std::sync::Arc;
use tokio::sync::{RwLock, mpsc, Semaphore};
use uuid::Uuid;
use std::time::Duration;
use priority_queue::PriorityQueue;

/// Advanced workflow orchestrator with hierarchical agent management
#[derive(Clone)]
pub struct WorkflowOrchestrator {
    pub id: Uuid,
    pub config: OrchestratorConfig,
    pub agents: Arc<RwLock<HashMap<Uuid, Arc<Agent>>>>,
    pub workflows: Arc<RwLock<HashMap<Uuid, WorkflowInstance>>>,
    pub execution_engine: Arc<ExecutionEngine>,
    pub planner: Arc<MCTSPlanner>,
    pub resource_manager: Arc<ResourceManager>,
    pub dependency_resolver: Arc<DependencyResolver>,
    pub event_bus: Arc<EventBus>,
    pub metrics_collector: Arc<WorkflowMetricsCollector>,
}

/// Configuration for the workflow orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    pub max_concurrent_workflows: usize,
    pub max_agents_per_workflow: usize,
    pub default_timeout_seconds: u64,
    pub resource_limits: GlobalResourceLimits,
    pub auto_scaling: AutoScalingConfig,
    pub recovery_strategy: RecoveryStrategy,
}

/// Global resource limits across all workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalResourceLimits {
    pub max_total_agents: usize,
    pub max_cpu_cores: f64,
    pub max_memory_gb: f64,
    pub max_network_bandwidth_gbps: f64,
}

/// Auto-scaling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoScalingConfig {
    pub enabled: bool,
    pub scale_up_threshold: f64,
    pub scale_down_threshold: f64,
    pub min_agents: usize,
    pub max_agents: usize,
    pub scale_factor: f64,
}

/// Recovery strategies for failed workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecoveryStrategy {
    Restart,
    Fallback { fallback_workflow_id: Uuid },
    Manual,
    Graceful { save_state: bool },
}

/// Workflow definition with hierarchical structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub version: String,
    pub nodes: HashMap<String, WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
    pub input_schema: serde_json::Value,
    pub output_schema: serde_json::Value,
    pub constraints: Vec<WorkflowConstraint>,
    pub metadata: HashMap<String, String>,
}

/// Individual node in the workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowNode {
    pub id: String,
    pub name: String,
    pub node_type: WorkflowNodeType,
    pub agent_requirements: AgentRequirements,
    pub input_mapping: HashMap<String, String>,
    pub output_mapping: HashMap<String, String>,
    pub timeout_seconds: Option<u64>,
    pub retry_policy: RetryPolicy,
    pub conditions: Vec<ExecutionCondition>,
}

/// Types of workflow nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowNodeType {
    Task {
        task_definition: String,
        parallel_execution: bool,
    },
    Decision {
        condition: String,
        branches: Vec<String>,
    },
    Loop {
        condition: String,
        max_iterations: usize,
    },
    Fork {
        parallel_branches: Vec<String>,
    },
    Join {
        wait_for_all: bool,
    },
    SubWorkflow {
        workflow_id: Uuid,
        input_mapping: HashMap<String, String>,
    },
    AgentSpawn {
        agent_config: AgentConfig,
        lifecycle_management: LifecycleManagement,
    },
    ResourceAllocation {
        resource_type: String,
        amount: u64,
    },
}

/// Agent requirements for workflow nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRequirements {
    pub agent_type: Option<AgentType>,
    pub capabilities: Vec<String>,
    pub min_performance_score: f64,
    pub preferred_agents: Vec<Uuid>,
    pub exclusion_list: Vec<Uuid>,
    pub resource_requirements: ResourceRequirements,
}

/// Resource requirements for agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequirements {
    pub cpu_cores: f64,
    pub memory_mb: usize,
    pub network_bandwidth_mbps: u64,
    pub storage_mb: usize,
    pub gpu_units: Option<u32>,
}

/// Lifecycle management for spawned agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleManagement {
    pub auto_terminate: bool,
    pub terminate_after_idle_seconds: u64,
    pub cleanup_resources: bool,
    pub save_state_on_termination: bool,
}

/// Retry policy for failed nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
    pub retry_on_errors: Vec<String>,
}

/// Execution conditions for nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionCondition {
    pub condition_type: ConditionType,
    pub expression: String,
    pub required: bool,
}

/// Types of execution conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConditionType {
    ResourceAvailable,
    AgentReady,
    DataAvailable,
    TimeWindow,
    CustomExpression,
}

/// Edge connecting workflow nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEdge {
    pub from_node: String,
    pub to_node: String,
    pub condition: Option<String>,
    pub data_mapping: HashMap<String, String>,
    pub priority: u8,
}

/// Constraints on workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConstraint {
    pub constraint_type: WorkflowConstraintType,
    pub severity: ConstraintSeverity,
    pub description: String,
}

/// Types of workflow constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowConstraintType {
    Deadline { deadline: DateTime<Utc> },
    ResourceBudget { max_cost: f64 },
    QualityThreshold { min_score: f64 },
    DependencyOrder { before: Vec<String>, after: Vec<String> },
    ConcurrencyLimit { max_parallel: usize },
}

/// Severity levels for constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConstraintSeverity {
    Critical,  // Must be satisfied
    High,      // Important but not blocking
    Medium,    // Preferred
    Low,       // Advisory
}

/// Instance of a running workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: Uuid,
    pub workflow_graph: WorkflowGraph,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub input_data: serde_json::Value,
    pub output_data: Option<serde_json::Value>,
    pub execution_plan: ExecutionPlan,
    pub runtime_state: RuntimeState,
    pub assigned_agents: HashMap<String, Uuid>, // node_id -> agent_id
    pub performance_metrics: WorkflowPerformanceMetrics,
}

/// Status of workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowStatus {
    Created,
    Planning,
    Scheduled,
    Running { current_nodes: Vec<String> },
    Paused { reason: String },
    Completed { success: bool },
    Failed { error: String },
    Cancelled { reason: String },
}

/// Execution plan for a workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub execution_order: Vec<Vec<String>>, // Layers of nodes that can execute in parallel
    pub critical_path: Vec<String>,
    pub estimated_duration: Duration,
    pub resource_allocation: HashMap<String, ResourceAllocation>,
    pub agent_assignments: HashMap<String, AgentAssignment>,
    pub checkpoint_nodes: Vec<String>,
}

/// Resource allocation for workflow nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAllocation {
    pub cpu_cores: f64,
    pub memory_mb: usize,
    pub network_bandwidth_mbps: u64,
    pub storage_mb: usize,
    pub estimated_cost: f64,
}

/// Agent assignment information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub agent_id: Option<Uuid>,
    pub requirements: AgentRequirements,
    pub fallback_agents: Vec<Uuid>,
    pub assignment_score: f64,
}

/// Runtime state of workflow execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeState {
    pub completed_nodes: HashSet<String>,
    pub failed_nodes: HashMap<String, String>, // node_id -> error
    pub running_nodes: HashSet<String>,
    pub pending_nodes: HashSet<String>,
    pub node_outputs: HashMap<String, serde_json::Value>,
    pub execution_context: HashMap<String, serde_json::Value>,
    pub checkpoints: Vec<WorkflowCheckpoint>,
}

/// Workflow checkpoint for recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowCheckpoint {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub node_id: String,
    pub state_snapshot: serde_json::Value,
    pub recovery_point: bool,
}

/// Performance metrics for workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowPerformanceMetrics {
    pub total_execution_time: Duration,
    pub agent_utilization: HashMap<Uuid, f64>,
    pub resource_efficiency: f64,
    pub throughput_nodes_per_second: f64,
    pub error_rate: f64,
    pub quality_score: f64,
    pub cost_efficiency: f64,
}

/// Execution engine for running workflows
pub struct ExecutionEngine {
    pub max_concurrent_executions: usize,
    pub execution_semaphore: Semaphore,
    pub task_queue: Arc<RwLock<PriorityQueue<ExecutionTask, u8>>>,
    pub running_tasks: Arc<RwLock<HashMap<Uuid, ExecutionTask>>>,
}

/// Individual execution task
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutionTask {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub node_id: String,
    pub agent_id: Uuid,
    pub task_definition: String,
    pub priority: u8,
    pub timeout: Duration,
    pub created_at: DateTime<Utc>,
}

/// Resource manager for workflow orchestration
pub struct ResourceManager {
    pub total_resources: GlobalResourceLimits,
    pub allocated_resources: Arc<RwLock<AllocatedResources>>,
    pub reservation_queue: Arc<RwLock<VecDeque<ResourceReservation>>>,
}

/// Currently allocated resources
#[derive(Debug, Clone)]
pub struct AllocatedResources {
    pub cpu_cores_used: f64,
    pub memory_gb_used: f64,
    pub network_bandwidth_used: f64,
    pub agents_active: usize,
}

/// Resource reservation request
#[derive(Debug, Clone)]
pub struct ResourceReservation {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub node_id: String,
    pub requirements: ResourceRequirements,
    pub requested_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub priority: u8,
}

/// Dependency resolution system
pub struct DependencyResolver {
    pub dependency_graph: Arc<RwLock<Graph<String, (), Directed>>>,
    pub node_indices: Arc<RwLock<HashMap<String, NodeIndex>>>,
}

/// Event bus for workflow communication
pub struct EventBus {
    pub subscribers: Arc<RwLock<HashMap<String, Vec<mpsc::UnboundedSender<WorkflowEvent>>>>>,
}

/// Workflow events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkflowEvent {
    WorkflowCreated { workflow_id: Uuid },
    WorkflowStarted { workflow_id: Uuid },
    WorkflowCompleted { workflow_id: Uuid, success: bool },
    NodeStarted { workflow_id: Uuid, node_id: String },
    NodeCompleted { workflow_id: Uuid, node_id: String, success: bool },
    AgentAssigned { workflow_id: Uuid, node_id: String, agent_id: Uuid },
    ResourceAllocated { workflow_id: Uuid, node_id: String, resources: ResourceAllocation },
    Error { workflow_id: Uuid, node_id: Option<String>, error: String },
}

/// Metrics collection for workflows
pub struct WorkflowMetricsCollector {
    pub workflow_metrics: Arc<RwLock<HashMap<Uuid, WorkflowPerformanceMetrics>>>,
    pub global_metrics: Arc<RwLock<GlobalMetrics>>,
}

/// Global orchestration metrics
#[derive(Debug, Clone)]
pub struct GlobalMetrics {
    pub total_workflows_executed: u64,
    pub successful_workflows: u64,
    pub failed_workflows: u64,
    pub average_workflow_duration: Duration,
    pub resource_utilization: f64,
    pub agent_performance: HashMap<Uuid, f64>,
}

impl WorkflowOrchestrator {
    /// Create a new workflow orchestrator
    pub async fn new(config: OrchestratorConfig) -> Result<Self, OrchestrationError> {
        let id = Uuid::new_v4();
        let planner = Arc::new(MCTSPlanner::new(crate::MCTSConfig::default()));

        Ok(Self {
            id,
            config: config.clone(),
            agents: Arc::new(RwLock::new(HashMap::new())),
            workflows: Arc::new(RwLock::new(HashMap::new())),
            execution_engine: Arc::new(ExecutionEngine::new(config.max_concurrent_workflows)),
            planner,
            resource_manager: Arc::new(ResourceManager::new(config.resource_limits)),
            dependency_resolver: Arc::new(DependencyResolver::new()),
            event_bus: Arc::new(EventBus::new()),
            metrics_collector: Arc::new(WorkflowMetricsCollector::new()),
        })
    }

    /// Create and deploy a new workflow
    pub async fn deploy_workflow(
        &self,
        workflow_graph: WorkflowGraph,
        input_data: serde_json::Value,
    ) -> Result<Uuid, OrchestrationError> {
        let workflow_id = Uuid::new_v4();

        // Validate workflow
        self.validate_workflow(&workflow_graph).await?;

        // Create execution plan
        let execution_plan = self.create_execution_plan(&workflow_graph).await?;

        // Allocate resources
        self.reserve_workflow_resources(workflow_id, &execution_plan).await?;

        // Create workflow instance
        let workflow_instance = WorkflowInstance {
            id: workflow_id,
            workflow_graph,
            status: WorkflowStatus::Created,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            input_data,
            output_data: None,
            execution_plan,
            runtime_state: RuntimeState {
                completed_nodes: HashSet::new(),
                failed_nodes: HashMap::new(),
                running_nodes: HashSet::new(),
                pending_nodes: HashSet::new(),
                node_outputs: HashMap::new(),
                execution_context: HashMap::new(),
                checkpoints: Vec::new(),
            },
            assigned_agents: HashMap::new(),
            performance_metrics: WorkflowPerformanceMetrics {
                total_execution_time: Duration::from_secs(0),
                agent_utilization: HashMap::new(),
                resource_efficiency: 0.0,
                throughput_nodes_per_second: 0.0,
                error_rate: 0.0,
                quality_score: 0.0,
                cost_efficiency: 0.0,
            },
        };

        // Store workflow
        self.workflows.write().await.insert(workflow_id, workflow_instance);

        // Emit event
        self.event_bus.emit(WorkflowEvent::WorkflowCreated { workflow_id }).await?;

        tracing::info!(
            orchestrator_id = %self.id,
            workflow_id = %workflow_id,
            "Workflow deployed successfully"
        );

        Ok(workflow_id)
    }

    /// Start executing a workflow
    pub async fn start_workflow(&self, workflow_id: Uuid) -> Result<(), OrchestrationError> {
        let mut workflows = self.workflows.write().await;
        let workflow = workflows.get_mut(&workflow_id)
            .ok_or_else(|| OrchestrationError::WorkflowError(format!("Workflow not found: {}", workflow_id)))?;

        workflow.status = WorkflowStatus::Running { current_nodes: Vec::new() };
        workflow.started_at = Some(Utc::now());

        // Initialize pending nodes
        let initial_nodes: Vec<String> = workflow.workflow_graph.nodes
            .keys()
            .filter(|node_id| {
                !workflow.workflow_graph.edges.iter()
                    .any(|edge| edge.to_node == **node_id)
            })
            .cloned()
            .collect();

        workflow.runtime_state.pending_nodes.extend(initial_nodes.clone());

        drop(workflows);

        // Emit event
        self.event_bus.emit(WorkflowEvent::WorkflowStarted { workflow_id }).await?;

        // Start execution
        self.execute_workflow_nodes(workflow_id, initial_nodes).await?;

        tracing::info!(
            orchestrator_id = %self.id,
            workflow_id = %workflow_id,
            "Workflow execution started"
        );

        Ok(())
    }

    /// Execute specific workflow nodes
    async fn execute_workflow_nodes(
        &self,
        workflow_id: Uuid,
        node_ids: Vec<String>,
    ) -> Result<(), OrchestrationError> {
        for node_id in node_ids {
            let execution_task = self.prepare_execution_task(workflow_id, &node_id).await?;
            self.execution_engine.schedule_task(execution_task).await?;
        }
        Ok(())
    }

    /// Prepare an execution task for a workflow node
    async fn prepare_execution_task(
        &self,
        workflow_id: Uuid,
        node_id: &str,
    ) -> Result<ExecutionTask, OrchestrationError> {
        let workflows = self.workflows.read().await;
        let workflow = workflows.get(&workflow_id)
            .ok_or_else(|| OrchestrationError::WorkflowError(format!("Workflow not found: {}", workflow_id)))?;

        let node = workflow.workflow_graph.nodes.get(node_id)
            .ok_or_else(|| OrchestrationError::WorkflowError(format!("Node not found: {}", node_id)))?;

        // Assign agent for this node
        let agent_id = self.assign_agent_to_node(workflow_id, node_id, &node.agent_requirements).await?;

        let task_definition = match &node.node_type {
            WorkflowNodeType::Task { task_definition, .. } => task_definition.clone(),
            _ => format!("Execute node: {}", node_id),
        };

        let timeout = Duration::from_secs(
            node.timeout_seconds.unwrap_or(self.config.default_timeout_seconds)
        );

        Ok(ExecutionTask {
            id: Uuid::new_v4(),
            workflow_id,
            node_id: node_id.to_string(),
            agent_id,
            task_definition,
            priority: 5, // Default priority
            timeout,
            created_at: Utc::now(),
        })
    }

    /// Assign an agent to a workflow node
    async fn assign_agent_to_node(
        &self,
        workflow_id: Uuid,
        node_id: &str,
        requirements: &AgentRequirements,
    ) -> Result<Uuid, OrchestrationError> {
        let agents = self.agents.read().await;

        // Find suitable agents
        let mut suitable_agents: Vec<(Uuid, f64)> = Vec::new();

        for (agent_id, agent) in agents.iter() {
            if self.is_agent_suitable(agent, requirements).await? {
                let score = self.calculate_assignment_score(agent, requirements).await?;
                suitable_agents.push((*agent_id, score));
            }
        }

        // Sort by score (highest first)
        suitable_agents.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        let best_agent_id = suitable_agents
            .first()
            .map(|(agent_id, _)| *agent_id)
            .ok_or_else(|| OrchestrationError::WorkflowError(
                format!("No suitable agent found for node: {}", node_id)
            ))?;

        // Update workflow with assignment
        {
            let mut workflows = self.workflows.write().await;
            if let Some(workflow) = workflows.get_mut(&workflow_id) {
                workflow.assigned_agents.insert(node_id.to_string(), best_agent_id);
            }
        }

        // Emit event
        self.event_bus.emit(WorkflowEvent::AgentAssigned {
            workflow_id,
            node_id: node_id.to_string(),
            agent_id: best_agent_id,
        }).await?;

        Ok(best_agent_id)
    }

    /// Check if an agent is suitable for the requirements
    async fn is_agent_suitable(
        &self,
        agent: &Arc<Agent>,
        requirements: &AgentRequirements,
    ) -> Result<bool, OrchestrationError> {
        // Check agent type
        if let Some(required_type) = &requirements.agent_type {
            if std::mem::discriminant(&agent.config.agent_type) != std::mem::discriminant(required_type) {
                return Ok(false);
            }
        }

        // Check capabilities (simplified)
        for required_capability in &requirements.capabilities {
            let has_capability = agent.capabilities.iter().any(|cap| {
                match cap {
                    crate::agent::AgentCapability::TextProcessing { .. } =>
                        required_capability == "text_processing",
                    crate::agent::AgentCapability::CodeGeneration { .. } =>
                        required_capability == "code_generation",
                    crate::agent::AgentCapability::DataAnalysis { .. } =>
                        required_capability == "data_analysis",
                    _ => false,
                }
            });

            if !has_capability {
                return Ok(false);
            }
        }

        // Check performance score
        let performance_snapshot = agent.get_performance_snapshot().await;
        let success_rate = performance_snapshot.success_rate;

        if success_rate < requirements.min_performance_score {
            return Ok(false);
        }

        // Check exclusion list
        if requirements.exclusion_list.contains(&agent.id()) {
            return Ok(false);
        }

        Ok(true)
    }

    /// Calculate assignment score for agent-node pairing
    async fn calculate_assignment_score(
        &self,
        agent: &Arc<Agent>,
        requirements: &AgentRequirements,
    ) -> Result<f64, OrchestrationError> {
        let mut score = 0.0;

        // Performance score
        let performance_snapshot = agent.get_performance_snapshot().await;
        score += performance_snapshot.success_rate * 30.0;
        score += performance_snapshot.average_quality_score * 20.0;

        // Resource efficiency
        score += performance_snapshot.resource_efficiency * 15.0;

        // Preferred agent bonus
        if requirements.preferred_agents.contains(&agent.id()) {
            score += 20.0;
        }

        // Agent type match bonus
        if let Some(required_type) = &requirements.agent_type {
            if std::mem::discriminant(&agent.config.agent_type) == std::mem::discriminant(required_type) {
                score += 15.0;
            }
        }

        Ok(score)
    }

    /// Validate a workflow before deployment
    async fn validate_workflow(&self, workflow: &WorkflowGraph) -> Result<(), OrchestrationError> {
        // Check for cycles
        if self.has_cycles(workflow)? {
            return Err(OrchestrationError::WorkflowError(
                "Workflow contains cycles".to_string()
            ));
        }

        // Validate node references
        for edge in &workflow.edges {
            if !workflow.nodes.contains_key(&edge.from_node) {
                return Err(OrchestrationError::WorkflowError(
                    format!("Edge references unknown node: {}", edge.from_node)
                ));
            }
            if !workflow.nodes.contains_key(&edge.to_node) {
                return Err(OrchestrationError::WorkflowError(
                    format!("Edge references unknown node: {}", edge.to_node)
                ));
            }
        }

        // Validate resource requirements
        let total_cpu: f64 = workflow.nodes.values()
            .map(|node| node.agent_requirements.resource_requirements.cpu_cores)
            .sum();

        if total_cpu > self.config.resource_limits.max_cpu_cores {
            return Err(OrchestrationError::WorkflowError(
                format!("Workflow requires {} CPU cores, but only {} available",
                       total_cpu, self.config.resource_limits.max_cpu_cores)
            ));
        }

        Ok(())
    }

    /// Check if workflow has cycles
    fn has_cycles(&self, workflow: &WorkflowGraph) -> Result<bool, OrchestrationError> {
        let mut graph = Graph::new();
        let mut node_indices = HashMap::new();

        // Add nodes
        for node_id in workflow.nodes.keys() {
            let index = graph.add_node(node_id.clone());
            node_indices.insert(node_id.clone(), index);
        }

        // Add edges
        for edge in &workflow.edges {
            if let (Some(&from_idx), Some(&to_idx)) = (
                node_indices.get(&edge.from_node),
                node_indices.get(&edge.to_node)
            ) {
                graph.add_edge(from_idx, to_idx, ());
            }
        }

        // Check for cycles using DFS
        Ok(petgraph::algo::is_cyclic_directed(&graph))
    }

    /// Create execution plan for a workflow
    async fn create_execution_plan(&self, workflow: &WorkflowGraph) -> Result<ExecutionPlan, OrchestrationError> {
        // Topological sort to determine execution order
        let execution_order = self.calculate_execution_order(workflow)?;

        // Calculate critical path
        let critical_path = self.calculate_critical_path(workflow).await?;

        // Estimate duration
        let estimated_duration = self.estimate_workflow_duration(workflow).await?;

        // Calculate resource allocation
        let resource_allocation = self.calculate_resource_allocation(workflow).await?;

        // Prepare agent assignments (placeholder)
        let agent_assignments = HashMap::new();

        // Identify checkpoint nodes
        let checkpoint_nodes = workflow.nodes.iter()
            .filter(|(_, node)| {
                matches!(node.node_type, WorkflowNodeType::Join { .. })
            })
            .map(|(id, _)| id.clone())
            .collect();

        Ok(ExecutionPlan {
            execution_order,
            critical_path,
            estimated_duration,
            resource_allocation,
            agent_assignments,
            checkpoint_nodes,
        })
    }

    /// Calculate execution order using topological sort
    fn calculate_execution_order(&self, workflow: &WorkflowGraph) -> Result<Vec<Vec<String>>, OrchestrationError> {
        let mut in_degree: HashMap<String, usize> = HashMap::new();
        let mut adj_list: HashMap<String, Vec<String>> = HashMap::new();

        // Initialize
        for node_id in workflow.nodes.keys() {
            in_degree.insert(node_id.clone(), 0);
            adj_list.insert(node_id.clone(), Vec::new());
        }

        // Calculate in-degrees
        for edge in &workflow.edges {
            *in_degree.get_mut(&edge.to_node).unwrap() += 1;
            adj_list.get_mut(&edge.from_node).unwrap().push(edge.to_node.clone());
        }

        // Topological sort with levels (for parallel execution)
        let mut result = Vec::new();
        let mut queue: VecDeque<String> = in_degree.iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(node, _)| node.clone())
            .collect();

        while !queue.is_empty() {
            let mut current_level = Vec::new();
            let level_size = queue.len();

            for _ in 0..level_size {
                if let Some(node) = queue.pop_front() {
                    current_level.push(node.clone());

                    for neighbor in &adj_list[&node] {
                        let degree = in_degree.get_mut(neighbor).unwrap();
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(neighbor.clone());
                        }
                    }
                }
            }

            if !current_level.is_empty() {
                result.push(current_level);
            }
        }

        Ok(result)
    }

    /// Calculate the critical path through the workflow
    async fn calculate_critical_path(&self, workflow: &WorkflowGraph) -> Result<Vec<String>, OrchestrationError> {
        // Simplified critical path calculation
        // In a real implementation, this would use network analysis algorithms

        let mut path = Vec::new();
        let mut visited = HashSet::new();

        // Find starting nodes
        let start_nodes: Vec<&String> = workflow.nodes.keys()
            .filter(|node_id| {
                !workflow.edges.iter().any(|edge| edge.to_node == **node_id)
            })
            .collect();

        if let Some(start_node) = start_nodes.first() {
            self.dfs_longest_path(workflow, start_node, &mut path, &mut visited);
        }

        Ok(path)
    }

    /// DFS helper for finding longest path
    fn dfs_longest_path(
        &self,
        workflow: &WorkflowGraph,
        current: &str,
        path: &mut Vec<String>,
        visited: &mut HashSet<String>,
    ) {
        visited.insert(current.to_string());
        path.push(current.to_string());

        // Find next nodes
        let next_nodes: Vec<&String> = workflow.edges.iter()
            .filter(|edge| edge.from_node == current)
            .map(|edge| &edge.to_node)
            .collect();

        for next_node in next_nodes {
            if !visited.contains(next_node) {
                self.dfs_longest_path(workflow, next_node, path, visited);
            }
        }
    }

    /// Estimate total workflow duration
    async fn estimate_workflow_duration(&self, workflow: &WorkflowGraph) -> Result<Duration, OrchestrationError> {
        // Simplified estimation - sum of all node timeouts
        let total_seconds: u64 = workflow.nodes.values()
            .map(|node| node.timeout_seconds.unwrap_or(self.config.default_timeout_seconds))
            .sum();

        Ok(Duration::from_secs(total_seconds))
    }

    /// Calculate resource allocation for workflow
    async fn calculate_resource_allocation(&self, workflow: &WorkflowGraph) -> Result<HashMap<String, ResourceAllocation>, OrchestrationError> {
        let mut allocations = HashMap::new();

        for (node_id, node) in &workflow.nodes {
            let requirements = &node.agent_requirements.resource_requirements;

            let allocation = ResourceAllocation {
                cpu_cores: requirements.cpu_cores,
                memory_mb: requirements.memory_mb,
                network_bandwidth_mbps: requirements.network_bandwidth_mbps,
                storage_mb: requirements.storage_mb,
                estimated_cost: self.calculate_node_cost(requirements),
            };

            allocations.insert(node_id.clone(), allocation);
        }

        Ok(allocations)
    }

    /// Calculate estimated cost for node resources
    fn calculate_node_cost(&self, requirements: &ResourceRequirements) -> f64 {
        // Simplified cost calculation
        requirements.cpu_cores * 0.10 +
        (requirements.memory_mb as f64 / 1024.0) * 0.05 +
        (requirements.network_bandwidth_mbps as f64 / 1000.0) * 0.02 +
        (requirements.storage_mb as f64 / 1024.0) * 0.01
    }

    /// Reserve resources for workflow execution
    async fn reserve_workflow_resources(
        &self,
        workflow_id: Uuid,
        execution_plan: &ExecutionPlan,
    ) -> Result<(), OrchestrationError> {
        self.resource_manager.reserve_resources(workflow_id, execution_plan).await
    }

    /// Get workflow status
    pub async fn get_workflow_status(&self, workflow_id: Uuid) -> Result<WorkflowStatus, OrchestrationError> {
        let workflows = self.workflows.read().await;
        let workflow = workflows.get(&workflow_id)
            .ok_or_else(|| OrchestrationError::WorkflowError(format!("Workflow not found: {}", workflow_id)))?;

        Ok(workflow.status.clone())
    }

    /// Get orchestration metrics
    pub async fn get_metrics(&self) -> Result<GlobalMetrics, OrchestrationError> {
        Ok(self.metrics_collector.global_metrics.read().await.clone())
    }
}

// Implementation of supporting structures

impl ExecutionEngine {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            max_concurrent_executions: max_concurrent,
            execution_semaphore: Semaphore::new(max_concurrent),
            task_queue: Arc::new(RwLock::new(PriorityQueue::new())),
            running_tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn schedule_task(&self, task: ExecutionTask) -> Result<(), OrchestrationError> {
        let priority = task.priority;
        self.task_queue.write().await.push(task, priority);
        Ok(())
    }
}

impl ResourceManager {
    pub fn new(limits: GlobalResourceLimits) -> Self {
        Self {
            total_resources: limits,
            allocated_resources: Arc::new(RwLock::new(AllocatedResources {
                cpu_cores_used: 0.0,
                memory_gb_used: 0.0,
                network_bandwidth_used: 0.0,
                agents_active: 0,
            })),
            reservation_queue: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub async fn reserve_resources(
        &self,
        workflow_id: Uuid,
        execution_plan: &ExecutionPlan,
    ) -> Result<(), OrchestrationError> {
        // Simplified resource reservation
        let mut allocated = self.allocated_resources.write().await;

        let total_cpu: f64 = execution_plan.resource_allocation.values()
            .map(|alloc| alloc.cpu_cores)
            .sum();

        if allocated.cpu_cores_used + total_cpu > self.total_resources.max_cpu_cores {
            return Err(OrchestrationError::ResourceExhausted(
                "Insufficient CPU cores".to_string()
            ));
        }

        allocated.cpu_cores_used += total_cpu;

        tracing::info!(
            workflow_id = %workflow_id,
            cpu_reserved = %total_cpu,
            total_cpu_used = %allocated.cpu_cores_used,
            "Resources reserved for workflow"
        );

        Ok(())
    }
}

impl DependencyResolver {
    pub fn new() -> Self {
        Self {
            dependency_graph: Arc::new(RwLock::new(Graph::new())),
            node_indices: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn emit(&self, event: WorkflowEvent) -> Result<(), OrchestrationError> {
        let event_type = match &event {
            WorkflowEvent::WorkflowCreated { .. } => "workflow_created",
            WorkflowEvent::WorkflowStarted { .. } => "workflow_started",
            WorkflowEvent::WorkflowCompleted { .. } => "workflow_completed",
            WorkflowEvent::NodeStarted { .. } => "node_started",
            WorkflowEvent::NodeCompleted { .. } => "node_completed",
            WorkflowEvent::AgentAssigned { .. } => "agent_assigned",
            WorkflowEvent::ResourceAllocated { .. } => "resource_allocated",
            WorkflowEvent::Error { .. } => "error",
        };

        let subscribers = self.subscribers.read().await;
        if let Some(event_subscribers) = subscribers.get(event_type) {
            for sender in event_subscribers {
                if let Err(e) = sender.send(event.clone()) {
                    tracing::warn!("Failed to send event to subscriber: {}", e);
                }
            }
        }

        Ok(())
    }
}

impl WorkflowMetricsCollector {
    pub fn new() -> Self {
        Self {
            workflow_metrics: Arc::new(RwLock::new(HashMap::new())),
            global_metrics: Arc::new(RwLock::new(GlobalMetrics {
                total_workflows_executed: 0,
                successful_workflows: 0,
                failed_workflows: 0,
                average_workflow_duration: Duration::from_secs(0),
                resource_utilization: 0.0,
                agent_performance: HashMap::new(),
            })),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_workflows: 10,
            max_agents_per_workflow: 20,
            default_timeout_seconds: 300,
            resource_limits: GlobalResourceLimits {
                max_total_agents: 100,
                max_cpu_cores: 16.0,
                max_memory_gb: 64.0,
                max_network_bandwidth_gbps: 10.0,
            },
            auto_scaling: AutoScalingConfig {
                enabled: true,
                scale_up_threshold: 0.8,
                scale_down_threshold: 0.3,
                min_agents: 2,
                max_agents: 50,
                scale_factor: 1.5,
            },
            recovery_strategy: RecoveryStrategy::Restart,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
            max_delay_ms: 30000,
            retry_on_errors: vec![
                "timeout".to_string(),
                "network_error".to_string(),
                "resource_unavailable".to_string(),
            ],
        }
    }
}
