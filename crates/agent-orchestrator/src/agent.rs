//! Advanced Agent System with Dynamic Capabilities and Lifecycle Management

use crate::{OrchestrationError, mcts::{AgentState, AgentAction, MCTSPlanner}};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;
use std::time::Duration;

/// Advanced AI agent with dynamic capabilities and self-management
#[derive(Debug)]
pub struct Agent {
    pub id: Uuid,
    pub config: AgentConfig,
    pub state: Arc<RwLock<AgentState>>,
    pub capabilities: Vec<AgentCapability>,
    pub memory: Arc<InMemoryAgentMemory>,
    pub planner: Option<MCTSPlanner>,
    pub message_tx: mpsc::UnboundedSender<AgentMessage>,
    pub message_rx: Arc<RwLock<Option<mpsc::UnboundedReceiver<AgentMessage>>>>,
    pub performance_tracker: Arc<RwLock<PerformanceTracker>>,
    pub lifecycle_manager: Arc<LifecycleManager>,
}

/// Configuration for agent initialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    pub agent_type: AgentType,
    pub max_concurrent_tasks: usize,
    pub memory_limit_mb: usize,
    pub timeout_seconds: u64,
    pub learning_enabled: bool,
    pub autonomy_level: AutonomyLevel,
    pub specialization: Vec<String>,
    pub collaboration_enabled: bool,
    pub resource_limits: ResourceLimits,
}

/// Types of agents with different specializations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentType {
    Coordinator,      // Orchestrates other agents
    Worker,          // Executes specific tasks
    Specialist,      // Domain-specific expertise
    Monitor,         // System monitoring and health
    Optimizer,       // Performance optimization
    Learner,         // Continuous learning and adaptation
    Hybrid,          // Multiple capabilities
}

/// Agent autonomy levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AutonomyLevel {
    Supervised,      // Requires explicit approval
    Guided,          // Operates with oversight
    SemiAutonomous,  // Independent within constraints
    Autonomous,      // Fully independent operation
}

/// Agent capabilities defining what an agent can do
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentCapability {
    TextProcessing { max_tokens: usize },
    CodeGeneration { languages: Vec<String> },
    DataAnalysis { max_dataset_size: usize },
    ImageProcessing { formats: Vec<String> },
    AudioProcessing { max_duration_seconds: u64 },
    NetworkCommunication { protocols: Vec<String> },
    FileOperations { allowed_paths: Vec<String> },
    DatabaseOperations { connection_strings: Vec<String> },
    APIIntegration { endpoints: Vec<String> },
    MachineLearning { model_types: Vec<String> },
    Monitoring { metrics: Vec<String> },
    Optimization { strategies: Vec<String> },
    Collaboration { agent_types: Vec<AgentType> },
    SelfModification { allowed_changes: Vec<String> },
}

/// Resource limits for agent operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_cpu_percent: f64,
    pub max_memory_mb: usize,
    pub max_network_bandwidth_mbps: u64,
    pub max_file_operations_per_second: u32,
    pub max_api_requests_per_minute: u32,
}

// Removed AgentMemory trait to simplify implementation
// Using concrete InMemoryAgentMemory instead

/// Memory usage statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub total_keys: usize,
    pub memory_used_bytes: usize,
    pub cache_hit_rate: f64,
    pub compression_ratio: f64,
}

/// Messages for inter-agent communication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentMessage {
    TaskRequest {
        id: Uuid,
        task: String,
        priority: u8,
        deadline: Option<DateTime<Utc>>,
        sender_id: Uuid,
    },
    TaskResponse {
        request_id: Uuid,
        result: TaskResult,
        sender_id: Uuid,
    },
    Collaboration {
        id: Uuid,
        action: AgentAction,
        data: HashMap<String, serde_json::Value>,
        sender_id: Uuid,
    },
    ResourceRequest {
        id: Uuid,
        resource_type: String,
        amount: u64,
        sender_id: Uuid,
    },
    ResourceResponse {
        request_id: Uuid,
        granted: bool,
        amount_granted: u64,
        sender_id: Uuid,
    },
    StatusUpdate {
        agent_id: Uuid,
        status: AgentStatus,
        performance_metrics: PerformanceSnapshot,
        timestamp: DateTime<Utc>,
    },
    Shutdown {
        reason: String,
        sender_id: Uuid,
    },
}

/// Result of task execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub output: String,
    pub execution_time_ms: u64,
    pub resources_used: ResourceUsage,
    pub quality_score: f64,
    pub error_message: Option<String>,
}

/// Resource usage tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub cpu_time_ms: u64,
    pub memory_peak_mb: usize,
    pub network_bytes: u64,
    pub file_operations: u32,
    pub api_requests: u32,
}

/// Agent status enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentStatus {
    Initializing,
    Idle,
    Busy { current_task: String },
    Collaborating { with_agents: Vec<Uuid> },
    Learning { progress: f64 },
    Optimizing { target: String },
    Error { message: String },
    ShuttingDown,
    Offline,
}

/// Performance tracking for agents
#[derive(Debug, Clone)]
pub struct PerformanceTracker {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub average_execution_time: Duration,
    pub quality_scores: Vec<f64>,
    pub resource_efficiency: f64,
    pub learning_progress: f64,
    pub collaboration_success_rate: f64,
}

/// Performance snapshot for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub tasks_completed: u64,
    pub tasks_failed: u64,
    pub success_rate: f64,
    pub average_execution_time_ms: u64,
    pub average_quality_score: f64,
    pub resource_efficiency: f64,
    pub learning_progress: f64,
    pub timestamp: DateTime<Utc>,
}

/// Lifecycle management for agents
#[derive(Debug)]
pub struct LifecycleManager {
    pub created_at: DateTime<Utc>,
    pub last_activity: Arc<RwLock<DateTime<Utc>>>,
    pub restart_count: Arc<RwLock<u32>>,
    pub health_check_interval: Duration,
    pub auto_restart_enabled: bool,
    pub max_restarts: u32,
}

/// In-memory implementation of AgentMemory
#[derive(Debug)]
pub struct InMemoryAgentMemory {
    storage: Arc<RwLock<HashMap<String, (serde_json::Value, Option<DateTime<Utc>>)>>>,
    max_size: usize,
    cache_hits: Arc<RwLock<u64>>,
    cache_misses: Arc<RwLock<u64>>,
}

impl Agent {
    /// Create a new agent with the specified configuration
    pub async fn new(config: AgentConfig) -> Result<Self, OrchestrationError> {
        let id = Uuid::new_v4();
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let initial_state = AgentState {
            context: format!("Agent {} initialized", config.name),
            available_actions: Vec::new(),
            resources: crate::mcts::ResourceState {
                cpu_available: 100.0,
                memory_available: (config.memory_limit_mb * 1024 * 1024) as u64,
                network_bandwidth: 100 * 1024 * 1024, // 100 MB/s
                active_connections: 0,
                cache_usage: 0.0,
            },
            objectives: Vec::new(),
            constraints: Vec::new(),
            performance_history: Vec::new(),
        };

        let capabilities = Self::initialize_capabilities(&config);
        let memory = Arc::new(InMemoryAgentMemory::new(config.memory_limit_mb * 1024 * 1024));

        let planner = if matches!(config.agent_type, AgentType::Coordinator | AgentType::Hybrid) {
            Some(MCTSPlanner::new(crate::MCTSConfig::default()))
        } else {
            None
        };

        let performance_tracker = Arc::new(RwLock::new(PerformanceTracker {
            tasks_completed: 0,
            tasks_failed: 0,
            average_execution_time: Duration::from_millis(0),
            quality_scores: Vec::new(),
            resource_efficiency: 1.0,
            learning_progress: 0.0,
            collaboration_success_rate: 1.0,
        }));

        let lifecycle_manager = Arc::new(LifecycleManager {
            created_at: Utc::now(),
            last_activity: Arc::new(RwLock::new(Utc::now())),
            restart_count: Arc::new(RwLock::new(0)),
            health_check_interval: Duration::from_secs(30),
            auto_restart_enabled: true,
            max_restarts: 5,
        });

        let agent = Self {
            id,
            config,
            state: Arc::new(RwLock::new(initial_state)),
            capabilities,
            memory,
            planner,
            message_tx,
            message_rx: Arc::new(RwLock::new(Some(message_rx))),
            performance_tracker,
            lifecycle_manager,
        };

        // Start background tasks
        agent.start_background_tasks().await?;

        tracing::info!(
            agent_id = %agent.id,
            agent_name = %agent.config.name,
            agent_type = ?agent.config.agent_type,
            "Agent created successfully"
        );

        Ok(agent)
    }

    /// Initialize capabilities based on agent configuration
    fn initialize_capabilities(config: &AgentConfig) -> Vec<AgentCapability> {
        let mut capabilities = Vec::new();

        match config.agent_type {
            AgentType::Coordinator => {
                capabilities.push(AgentCapability::Collaboration {
                    agent_types: vec![AgentType::Worker, AgentType::Specialist],
                });
                capabilities.push(AgentCapability::Monitoring {
                    metrics: vec!["performance".to_string(), "health".to_string()],
                });
            },
            AgentType::Worker => {
                capabilities.push(AgentCapability::TextProcessing { max_tokens: 4096 });
                capabilities.push(AgentCapability::FileOperations {
                    allowed_paths: vec!["/tmp".to_string(), "/workspace".to_string()],
                });
            },
            AgentType::Specialist => {
                for specialization in &config.specialization {
                    match specialization.as_str() {
                        "code" => capabilities.push(AgentCapability::CodeGeneration {
                            languages: vec!["rust".to_string(), "python".to_string(), "javascript".to_string()],
                        }),
                        "data" => capabilities.push(AgentCapability::DataAnalysis {
                            max_dataset_size: 1024 * 1024 * 100, // 100MB
                        }),
                        "ml" => capabilities.push(AgentCapability::MachineLearning {
                            model_types: vec!["neural_network".to_string(), "decision_tree".to_string()],
                        }),
                        _ => {}
                    }
                }
            },
            AgentType::Monitor => {
                capabilities.push(AgentCapability::Monitoring {
                    metrics: vec![
                        "cpu".to_string(),
                        "memory".to_string(),
                        "network".to_string(),
                        "performance".to_string(),
                    ],
                });
            },
            AgentType::Optimizer => {
                capabilities.push(AgentCapability::Optimization {
                    strategies: vec![
                        "resource_allocation".to_string(),
                        "performance_tuning".to_string(),
                        "cache_optimization".to_string(),
                    ],
                });
            },
            AgentType::Learner => {
                capabilities.push(AgentCapability::MachineLearning {
                    model_types: vec!["adaptive".to_string(), "reinforcement".to_string()],
                });
                capabilities.push(AgentCapability::SelfModification {
                    allowed_changes: vec!["parameters".to_string(), "strategies".to_string()],
                });
            },
            AgentType::Hybrid => {
                // Hybrid agents get basic capabilities from each type
                capabilities.push(AgentCapability::TextProcessing { max_tokens: 2048 });
                capabilities.push(AgentCapability::Monitoring {
                    metrics: vec!["performance".to_string()],
                });
                capabilities.push(AgentCapability::Optimization {
                    strategies: vec!["basic".to_string()],
                });
            },
        }

        // Add common capabilities
        capabilities.push(AgentCapability::NetworkCommunication {
            protocols: vec!["http".to_string(), "websocket".to_string()],
        });

        capabilities
    }

    /// Start background tasks for the agent
    async fn start_background_tasks(&self) -> Result<(), OrchestrationError> {
        // Start message processing task
        let message_rx = {
            let mut rx_option = self.message_rx.write().await;
            rx_option.take()
        };

        if let Some(mut rx) = message_rx {
            let agent_id = self.id;
            let performance_tracker = Arc::clone(&self.performance_tracker);
            let lifecycle_manager = Arc::clone(&self.lifecycle_manager);

            tokio::spawn(async move {
                while let Some(message) = rx.recv().await {
                    if let Err(e) = Self::handle_message(
                        agent_id,
                        message,
                        Arc::clone(&performance_tracker),
                        Arc::clone(&lifecycle_manager),
                    ).await {
                        tracing::error!(
                            agent_id = %agent_id,
                            error = %e,
                            "Failed to handle message"
                        );
                    }
                }
            });
        }

        // Start health check task
        let lifecycle_manager = Arc::clone(&self.lifecycle_manager);
        let agent_id = self.id;
        let performance_tracker = Arc::clone(&self.performance_tracker);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(lifecycle_manager.health_check_interval);

            loop {
                interval.tick().await;

                if let Err(e) = Self::perform_health_check(
                    agent_id,
                    Arc::clone(&lifecycle_manager),
                    Arc::clone(&performance_tracker),
                ).await {
                    tracing::warn!(
                        agent_id = %agent_id,
                        error = %e,
                        "Health check failed"
                    );
                }
            }
        });

        Ok(())
    }

    /// Handle incoming messages
    async fn handle_message(
        agent_id: Uuid,
        message: AgentMessage,
        performance_tracker: Arc<RwLock<PerformanceTracker>>,
        lifecycle_manager: Arc<LifecycleManager>,
    ) -> Result<(), OrchestrationError> {
        // Update last activity
        *lifecycle_manager.last_activity.write().await = Utc::now();

        match message {
            AgentMessage::TaskRequest { id, task, priority, deadline: _deadline, sender_id } => {
                tracing::info!(
                    agent_id = %agent_id,
                    task_id = %id,
                    task = %task,
                    priority = %priority,
                    sender_id = %sender_id,
                    "Received task request"
                );

                // Execute task (simplified implementation)
                let start_time = std::time::Instant::now();
                let result = Self::execute_task(&task, priority).await;
                let execution_time = start_time.elapsed();

                // Update performance tracker
                {
                    let mut tracker = performance_tracker.write().await;
                    if result.success {
                        tracker.tasks_completed += 1;
                    } else {
                        tracker.tasks_failed += 1;
                    }

                    // Update average execution time
                    let total_tasks = tracker.tasks_completed + tracker.tasks_failed;
                    if total_tasks > 0 {
                        tracker.average_execution_time =
                            (tracker.average_execution_time * (total_tasks - 1) as u32 + execution_time) / total_tasks as u32;
                    }

                    tracker.quality_scores.push(result.quality_score);
                    if tracker.quality_scores.len() > 100 {
                        tracker.quality_scores.remove(0); // Keep only recent scores
                    }
                }

                tracing::info!(
                    agent_id = %agent_id,
                    task_id = %id,
                    success = %result.success,
                    execution_time_ms = %result.execution_time_ms,
                    quality_score = %result.quality_score,
                    "Task execution completed"
                );
            },

            AgentMessage::Collaboration { id, action, data: _data, sender_id } => {
                tracing::info!(
                    agent_id = %agent_id,
                    collaboration_id = %id,
                    action = ?action,
                    sender_id = %sender_id,
                    "Received collaboration request"
                );

                // Handle collaboration (simplified)
                // In a real implementation, this would coordinate with other agents
            },

            AgentMessage::StatusUpdate { agent_id: sender_agent_id, status, performance_metrics: _performance_metrics, timestamp } => {
                tracing::debug!(
                    agent_id = %agent_id,
                    sender_agent_id = %sender_agent_id,
                    status = ?status,
                    timestamp = %timestamp,
                    "Received status update"
                );
            },

            AgentMessage::Shutdown { reason, sender_id } => {
                tracing::info!(
                    agent_id = %agent_id,
                    reason = %reason,
                    sender_id = %sender_id,
                    "Received shutdown request"
                );
                // Handle graceful shutdown
            },

            _ => {
                tracing::debug!(
                    agent_id = %agent_id,
                    message = ?message,
                    "Received other message type"
                );
            }
        }

        Ok(())
    }

    /// Execute a task (simplified implementation)
    async fn execute_task(task: &str, priority: u8) -> TaskResult {
        // Simulate task execution
        let execution_time = std::time::Duration::from_millis((priority as u64 + 1) * 100);
        tokio::time::sleep(execution_time).await;

        let success = rand::random::<f64>() > 0.1; // 90% success rate
        let quality_score = if success {
            0.7 + rand::random::<f64>() * 0.3 // 0.7-1.0 for successful tasks
        } else {
            rand::random::<f64>() * 0.5 // 0.0-0.5 for failed tasks
        };

        TaskResult {
            success,
            output: if success {
                format!("Task '{}' completed successfully", task)
            } else {
                format!("Task '{}' failed", task)
            },
            execution_time_ms: execution_time.as_millis() as u64,
            resources_used: ResourceUsage {
                cpu_time_ms: execution_time.as_millis() as u64,
                memory_peak_mb: (priority as usize + 1) * 10,
                network_bytes: if priority > 5 { 1024 * 1024 } else { 1024 },
                file_operations: priority as u32,
                api_requests: if priority > 7 { priority as u32 } else { 0 },
            },
            quality_score,
            error_message: if success { None } else { Some("Simulated failure".to_string()) },
        }
    }

    /// Perform health check
    async fn perform_health_check(
        agent_id: Uuid,
        lifecycle_manager: Arc<LifecycleManager>,
        performance_tracker: Arc<RwLock<PerformanceTracker>>,
    ) -> Result<(), OrchestrationError> {
        let last_activity = *lifecycle_manager.last_activity.read().await;
        let time_since_activity = Utc::now() - last_activity;

        // Check if agent is responsive
        if time_since_activity > chrono::Duration::seconds(300) { // 5 minutes
            tracing::warn!(
                agent_id = %agent_id,
                time_since_activity = %time_since_activity.num_seconds(),
                "Agent appears unresponsive"
            );

            // Implement restart logic if needed
            if lifecycle_manager.auto_restart_enabled {
                let restart_count = *lifecycle_manager.restart_count.read().await;
                if restart_count < lifecycle_manager.max_restarts {
                    tracing::info!(
                        agent_id = %agent_id,
                        restart_count = %restart_count,
                        "Attempting agent restart"
                    );

                    *lifecycle_manager.restart_count.write().await += 1;
                    *lifecycle_manager.last_activity.write().await = Utc::now();
                }
            }
        }

        // Check performance metrics
        let tracker = performance_tracker.read().await;
        let total_tasks = tracker.tasks_completed + tracker.tasks_failed;

        if total_tasks > 0 {
            let success_rate = tracker.tasks_completed as f64 / total_tasks as f64;
            if success_rate < 0.5 {
                tracing::warn!(
                    agent_id = %agent_id,
                    success_rate = %success_rate,
                    "Agent performance below threshold"
                );
            }
        }

        tracing::debug!(
            agent_id = %agent_id,
            tasks_completed = %tracker.tasks_completed,
            tasks_failed = %tracker.tasks_failed,
            "Health check completed"
        );

        Ok(())
    }

    /// Get current performance snapshot
    pub async fn get_performance_snapshot(&self) -> PerformanceSnapshot {
        let tracker = self.performance_tracker.read().await;
        let total_tasks = tracker.tasks_completed + tracker.tasks_failed;

        PerformanceSnapshot {
            tasks_completed: tracker.tasks_completed,
            tasks_failed: tracker.tasks_failed,
            success_rate: if total_tasks > 0 {
                tracker.tasks_completed as f64 / total_tasks as f64
            } else {
                1.0
            },
            average_execution_time_ms: tracker.average_execution_time.as_millis() as u64,
            average_quality_score: if !tracker.quality_scores.is_empty() {
                tracker.quality_scores.iter().sum::<f64>() / tracker.quality_scores.len() as f64
            } else {
                0.0
            },
            resource_efficiency: tracker.resource_efficiency,
            learning_progress: tracker.learning_progress,
            timestamp: Utc::now(),
        }
    }

    /// Send message to agent
    pub fn send_message(&self, message: AgentMessage) -> Result<(), OrchestrationError> {
        self.message_tx
            .send(message)
            .map_err(|e| OrchestrationError::AgentError(format!("Failed to send message: {}", e)))?;
        Ok(())
    }

    /// Get agent ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Check if agent has capability
    pub fn has_capability(&self, capability: &AgentCapability) -> bool {
        self.capabilities.iter().any(|cap| {
            std::mem::discriminant(cap) == std::mem::discriminant(capability)
        })
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "DefaultAgent".to_string(),
            agent_type: AgentType::Worker,
            max_concurrent_tasks: 5,
            memory_limit_mb: 256,
            timeout_seconds: 300,
            learning_enabled: true,
            autonomy_level: AutonomyLevel::Guided,
            specialization: Vec::new(),
            collaboration_enabled: true,
            resource_limits: ResourceLimits {
                max_cpu_percent: 50.0,
                max_memory_mb: 256,
                max_network_bandwidth_mbps: 100,
                max_file_operations_per_second: 10,
                max_api_requests_per_minute: 60,
            },
        }
    }
}

impl InMemoryAgentMemory {
    pub fn new(max_size: usize) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            max_size,
            cache_hits: Arc::new(RwLock::new(0)),
            cache_misses: Arc::new(RwLock::new(0)),
        }
    }
}

impl InMemoryAgentMemory {
    pub async fn store(&self, key: String, value: serde_json::Value, ttl: Option<Duration>) -> Result<(), OrchestrationError> {
        let mut storage = self.storage.write().await;

        // Check size limits
        if storage.len() >= self.max_size {
            // Remove oldest entry (simple LRU)
            if let Some((oldest_key, _)) = storage.iter().next() {
                let oldest_key = oldest_key.clone();
                storage.remove(&oldest_key);
            }
        }

        let expiry = ttl.map(|duration| Utc::now() + chrono::Duration::from_std(duration).unwrap_or_default());
        storage.insert(key, (value, expiry));

        Ok(())
    }

    pub async fn retrieve(&self, key: &str) -> Result<Option<serde_json::Value>, OrchestrationError> {
        let mut storage = self.storage.write().await;

        if let Some((value, expiry)) = storage.get(key) {
            // Check if expired
            if let Some(expiry_time) = expiry {
                if Utc::now() > *expiry_time {
                    storage.remove(key);
                    *self.cache_misses.write().await += 1;
                    return Ok(None);
                }
            }

            *self.cache_hits.write().await += 1;
            Ok(Some(value.clone()))
        } else {
            *self.cache_misses.write().await += 1;
            Ok(None)
        }
    }

    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, OrchestrationError> {
        let storage = self.storage.read().await;
        let keys: Vec<String> = storage
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        Ok(keys)
    }

    pub async fn delete(&self, key: &str) -> Result<(), OrchestrationError> {
        let mut storage = self.storage.write().await;
        storage.remove(key);
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), OrchestrationError> {
        let mut storage = self.storage.write().await;
        storage.clear();
        Ok(())
    }

    pub async fn get_memory_usage(&self) -> Result<MemoryUsage, OrchestrationError> {
        let storage = self.storage.read().await;
        let cache_hits = *self.cache_hits.read().await;
        let cache_misses = *self.cache_misses.read().await;

        let cache_hit_rate = if cache_hits + cache_misses > 0 {
            cache_hits as f64 / (cache_hits + cache_misses) as f64
        } else {
            0.0
        };

        // Estimate memory usage (simplified)
        let memory_used_bytes = storage.len() * 1024; // Rough estimate

        Ok(MemoryUsage {
            total_keys: storage.len(),
            memory_used_bytes,
            cache_hit_rate,
            compression_ratio: 1.0, // No compression in this simple implementation
        })
    }
}
