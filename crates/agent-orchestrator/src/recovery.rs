//! Recovery and Error Handling System
//!
//! This module provides recovery capabilities for orchestration
//! including circuit breakers and error recovery.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Recovery manager for handling failures and recovery
#[derive(Debug)]
pub struct RecoveryManager {
    pub circuit_breakers: std::collections::HashMap<String, CircuitBreaker>,
    pub error_recovery: ErrorRecovery,
    pub recovery_strategies: Vec<RecoveryStrategy>,
}

/// Circuit breaker for failure isolation
#[derive(Debug)]
pub struct CircuitBreaker {
    pub name: String,
    pub state: CircuitBreakerState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub timeout: Duration,
    pub last_failure_time: Option<Instant>,
}

/// Circuit breaker states
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Error recovery system
#[derive(Debug)]
pub struct ErrorRecovery {
    pub retry_policies: std::collections::HashMap<String, RetryPolicy>,
    pub fallback_strategies: std::collections::HashMap<String, FallbackStrategy>,
}

/// Recovery strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecoveryStrategy {
    Retry { max_attempts: u32, delay: Duration },
    Fallback { fallback_action: String },
    Ignore,
    Escalate { escalation_target: String },
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
    pub retry_on_errors: Vec<String>,
}

/// Fallback strategy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FallbackStrategy {
    DefaultValue { value: String },
    AlternativeService { service_id: Uuid },
    CachedResponse,
    Graceful { message: String },
}

impl RecoveryManager {
    pub fn new() -> Self {
        Self {
            circuit_breakers: std::collections::HashMap::new(),
            error_recovery: ErrorRecovery::new(),
            recovery_strategies: vec![
                RecoveryStrategy::Retry {
                    max_attempts: 3,
                    delay: Duration::from_millis(1000),
                },
                RecoveryStrategy::Fallback {
                    fallback_action: "default".to_string(),
                },
            ],
        }
    }
}

impl CircuitBreaker {
    pub fn new(name: String, failure_threshold: u32, timeout: Duration) -> Self {
        Self {
            name,
            state: CircuitBreakerState::Closed,
            failure_count: 0,
            failure_threshold,
            timeout,
            last_failure_time: None,
        }
    }

    pub fn can_execute(&self) -> bool {
        match self.state {
            CircuitBreakerState::Closed => true,
            CircuitBreakerState::Open => {
                if let Some(last_failure) = self.last_failure_time {
                    Instant::now().duration_since(last_failure) >= self.timeout
                } else {
                    false
                }
            }
            CircuitBreakerState::HalfOpen => true,
        }
    }
}

impl ErrorRecovery {
    pub fn new() -> Self {
        Self {
            retry_policies: std::collections::HashMap::new(),
            fallback_strategies: std::collections::HashMap::new(),
        }
    }
}