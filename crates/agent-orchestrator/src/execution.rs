//! Execution Engine and Resource Management
//!
//! This module provides execution capabilities for orchestration
//! including task execution and resource management.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Semaphore;
use uuid::Uuid;

/// Execution engine for running tasks and workflows
#[derive(Debug)]
pub struct ExecutionEngine {
    pub max_concurrent_tasks: usize,
    pub semaphore: Semaphore,
    pub running_tasks: HashMap<Uuid, TaskExecution>,
    pub resource_manager: ResourceManager,
}

/// Task executor for individual task execution
#[derive(Debug)]
pub struct TaskExecutor {
    pub id: Uuid,
    pub task_id: Uuid,
    pub agent_id: Uuid,
    pub status: ExecutionStatus,
}

/// Resource manager for execution resources
#[derive(Debug)]
pub struct ResourceManager {
    pub allocated_resources: AllocatedResources,
    pub resource_limits: ResourceLimits,
}

/// Task execution details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExecution {
    pub task_id: Uuid,
    pub agent_id: Uuid,
    pub status: ExecutionStatus,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Execution status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed { error: String },
    Cancelled,
}

/// Allocated resources tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatedResources {
    pub cpu_cores: f64,
    pub memory_mb: usize,
    pub network_bandwidth_mbps: u64,
    pub active_tasks: usize,
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_cpu_cores: f64,
    pub max_memory_mb: usize,
    pub max_network_bandwidth_mbps: u64,
    pub max_concurrent_tasks: usize,
}

impl ExecutionEngine {
    pub fn new(max_concurrent_tasks: usize) -> Self {
        Self {
            max_concurrent_tasks,
            semaphore: Semaphore::new(max_concurrent_tasks),
            running_tasks: HashMap::new(),
            resource_manager: ResourceManager::new(),
        }
    }
}

impl ResourceManager {
    pub fn new() -> Self {
        Self {
            allocated_resources: AllocatedResources {
                cpu_cores: 0.0,
                memory_mb: 0,
                network_bandwidth_mbps: 0,
                active_tasks: 0,
            },
            resource_limits: ResourceLimits {
                max_cpu_cores: 16.0,
                max_memory_mb: 32768,
                max_network_bandwidth_mbps: 1000,
                max_concurrent_tasks: 100,
            },
        }
    }
}