//! Simplified Multi-Hop Orchestration System
//!
//! This module provides a simplified version of multi-hop orchestration
//! that compiles without complex async trait issues.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};
use anyhow::Result;
use tracing::{info, debug, warn, error};

/// Simplified multi-hop orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleMultiHopConfig {
    /// Maximum number of hops in a single orchestration
    pub max_hops: usize,
    /// Timeout for each hop
    pub hop_timeout: Duration,
    /// Maximum total orchestration time
    pub total_timeout: Duration,
    /// Enable adaptive routing
    pub adaptive_routing: bool,
}

impl Default for SimpleMultiHopConfig {
    fn default() -> Self {
        Self {
            max_hops: 5,
            hop_timeout: Duration::from_secs(30),
            total_timeout: Duration::from_secs(300),
            adaptive_routing: true,
        }
    }
}

/// Simplified hop execution result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleHopResult {
    /// Hop identifier
    pub hop_id: String,
    /// Execution status
    pub status: SimpleHopStatus,
    /// Result data
    pub data: serde_json::Value,
    /// Execution time
    pub execution_time: Duration,
    /// Quality score (0.0 to 1.0)
    pub quality_score: f64,
    /// Next hop suggestions
    pub next_hops: Vec<String>,
}

/// Simplified hop execution status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SimpleHopStatus {
    Success,
    PartialSuccess,
    Failure,
    Timeout,
    Skipped,
}

/// Simplified multi-hop orchestration context
#[derive(Debug, Clone, Serialize)]
pub struct SimpleOrchestrationContext {
    /// Current hop index
    pub current_hop: usize,
    /// Total hops executed
    pub total_hops: usize,
    /// Start time
    #[serde(skip_serializing)]
    pub start_time: Instant,
    /// Accumulated results
    pub results: Vec<SimpleHopResult>,
    /// Context data
    pub context_data: HashMap<String, serde_json::Value>,
    /// Performance metrics
    pub metrics: SimpleOrchestrationMetrics,
}

/// Simplified orchestration performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleOrchestrationMetrics {
    /// Total execution time
    pub total_time: Duration,
    /// Average hop time
    pub avg_hop_time: Duration,
    /// Success rate
    pub success_rate: f64,
    /// Quality score
    pub quality_score: f64,
    /// Resource utilization
    pub resource_utilization: f64,
}

impl Default for SimpleOrchestrationMetrics {
    fn default() -> Self {
        Self {
            total_time: Duration::ZERO,
            avg_hop_time: Duration::ZERO,
            success_rate: 0.0,
            quality_score: 0.0,
            resource_utilization: 0.0,
        }
    }
}

/// Simplified hop executor
pub struct SimpleHopExecutor {
    /// Hop identifier
    pub id: String,
    /// Hop name
    pub name: String,
    /// Hop description
    pub description: String,
    /// Expected execution time
    pub expected_time: Duration,
    /// Quality threshold
    pub quality_threshold: f64,
}

impl SimpleHopExecutor {
    /// Create a new simple hop executor
    pub fn new(id: String, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
            expected_time: Duration::from_millis(100),
            quality_threshold: 0.8,
        }
    }

    /// Execute a hop
    pub async fn execute(&self, context: &SimpleOrchestrationContext) -> Result<SimpleHopResult> {
        let start_time = Instant::now();

        // Simulate hop execution
        tokio::time::sleep(self.expected_time).await;

        let execution_time = start_time.elapsed();
        let quality_score = if execution_time <= self.expected_time * 2 {
            0.9
        } else {
            0.7
        };

        Ok(SimpleHopResult {
            hop_id: self.id.clone(),
            status: if quality_score >= self.quality_threshold {
                SimpleHopStatus::Success
            } else {
                SimpleHopStatus::PartialSuccess
            },
            data: serde_json::json!({
                "executed": true,
                "hop_id": self.id,
                "context_hop": context.current_hop
            }),
            execution_time,
            quality_score,
            next_hops: vec![format!("next_hop_{}", context.current_hop + 1)],
        })
    }
}

/// Simplified multi-hop orchestrator
pub struct SimpleMultiHopOrchestrator {
    config: SimpleMultiHopConfig,
    hop_registry: Arc<RwLock<HashMap<String, SimpleHopExecutor>>>,
    performance_tracker: Arc<RwLock<SimplePerformanceTracker>>,
}

/// Simplified performance tracker
pub struct SimplePerformanceTracker {
    /// Historical performance data
    performance_history: Vec<SimpleOrchestrationMetrics>,
    /// Hop performance data
    hop_performance: HashMap<String, Vec<SimpleHopResult>>,
}

impl SimplePerformanceTracker {
    fn new() -> Self {
        Self {
            performance_history: Vec::new(),
            hop_performance: HashMap::new(),
        }
    }

    fn update_hop_performance(&mut self, hop_result: &SimpleHopResult) {
        self.hop_performance
            .entry(hop_result.hop_id.clone())
            .or_insert_with(Vec::new)
            .push(hop_result.clone());
    }

    fn get_hop_stats(&self, hop_id: &str) -> Option<SimpleHopStats> {
        let entries = self.hop_performance.get(hop_id)?;
        if entries.is_empty() {
            return None;
        }

        let mut total_time = Duration::ZERO;
        let mut total_quality = 0.0;
        let mut success_count = 0usize;
        for r in entries {
            total_time += r.execution_time;
            total_quality += r.quality_score;
            if matches!(r.status, SimpleHopStatus::Success) {
                success_count += 1;
            }
        }

        let n = entries.len() as u32;
        Some(SimpleHopStats {
            avg_time: if n > 0 { Duration::from_millis(total_time.as_millis() as u64 / n as u64) } else { Duration::ZERO },
            avg_quality: if n > 0 { total_quality / n as f64 } else { 0.0 },
            success_rate: if n > 0 { success_count as f64 / n as f64 } else { 0.0 },
        })
    }
}

/// Aggregated simple hop statistics
pub struct SimpleHopStats {
    pub avg_time: Duration,
    pub avg_quality: f64,
    pub success_rate: f64,
}

impl SimpleMultiHopOrchestrator {
    /// Create a new simplified multi-hop orchestrator
    pub fn new(config: SimpleMultiHopConfig) -> Self {
        Self {
            config,
            hop_registry: Arc::new(RwLock::new(HashMap::new())),
            performance_tracker: Arc::new(RwLock::new(SimplePerformanceTracker::new())),
        }
    }

    /// Register a hop executor
    pub async fn register_hop(&self, executor: SimpleHopExecutor) {
        let mut registry = self.hop_registry.write().await;
        registry.insert(executor.id.clone(), executor);
    }

    /// Execute simplified multi-hop orchestration
    pub async fn execute_orchestration(
        &self,
        initial_context: SimpleOrchestrationContext,
        target_goals: Vec<String>,
    ) -> Result<SimpleOrchestrationResult> {
        let start_time = Instant::now();
        let mut context = initial_context;
        let mut current_hops = target_goals.clone();
        let mut results = Vec::new();

        info!("Starting simplified multi-hop orchestration with {} target goals", target_goals.len());

        // Main orchestration loop
        while context.current_hop < self.config.max_hops
            && start_time.elapsed() < self.config.total_timeout
            && !current_hops.is_empty() {

            // Select next hop
            let next_hop = self.select_next_hop(&context, &current_hops).await?;

            // Execute hop
            let hop_result = self.execute_hop(&context, &next_hop).await?;

            // Update context
            context.current_hop += 1;
            context.total_hops += 1;
            context.results.push(hop_result.clone());
            results.push(hop_result.clone());

            // Update performance tracker
            self.update_performance_tracker(&hop_result).await;

            // Update current hops based on results
            current_hops = self.update_target_hops(&context, &current_hops).await?;

            debug!("Completed hop {}/{}", context.current_hop, self.config.max_hops);
        }

        // Calculate final metrics
        let final_metrics = self.calculate_final_metrics(&context).await?;
        let overall_success = results.iter().all(|r| matches!(r.status, SimpleHopStatus::Success));

        Ok(SimpleOrchestrationResult {
            context,
            results,
            metrics: final_metrics,
            success: overall_success,
        })
    }

    /// Select next hop
    async fn select_next_hop(
        &self,
        context: &SimpleOrchestrationContext,
        available_hops: &[String],
    ) -> Result<String> {
        if !self.config.adaptive_routing {
            // Simple round-robin selection
            return Ok(available_hops[context.current_hop % available_hops.len()].clone());
        }

        // Use performance-based selection
        let registry = self.hop_registry.read().await;
        let mut best_hop = available_hops[0].clone();
        let mut best_score = 0.0;

        for hop_id in available_hops {
            if let Some(executor) = registry.get(hop_id) {
                let score = self.calculate_hop_score(executor, context).await?;
                if score > best_score {
                    best_score = score;
                    best_hop = hop_id.clone();
                }
            }
        }

        Ok(best_hop)
    }

    /// Calculate hop score for selection
    async fn calculate_hop_score(
        &self,
        executor: &SimpleHopExecutor,
        _context: &SimpleOrchestrationContext,
    ) -> Result<f64> {
        // Base score from static expectations
        let base_time_score = 1.0 / ((executor.expected_time.as_millis() as f64 / 1000.0).max(0.001));
        let base_quality_score = executor.quality_threshold;

        // Incorporate historical performance if available
        let tracker = self.performance_tracker.read().await;
        let hist = tracker.get_hop_stats(&executor.id);

        let (hist_success, hist_quality, hist_time_score) = if let Some(s) = hist {
            let success = s.success_rate; // 0..1
            let quality = s.avg_quality; // 0..1
            let time_score = if s.avg_time.as_millis() > 0 {
                1.0 / ((s.avg_time.as_millis() as f64 / 1000.0).max(0.001))
            } else { 1.0 };
            (success, quality, time_score)
        } else {
            (0.5, base_quality_score, base_time_score)
        };

        // Weighted combination emphasizing observed performance
        let score = 0.25 * base_time_score
            + 0.25 * base_quality_score
            + 0.25 * hist_quality
            + 0.25 * (0.5 * hist_success + 0.5 * hist_time_score);

        Ok(score)
    }

    /// Execute a single hop
    async fn execute_hop(
        &self,
        context: &SimpleOrchestrationContext,
        hop_id: &str,
    ) -> Result<SimpleHopResult> {
        let registry = self.hop_registry.read().await;
        let executor = registry.get(hop_id)
            .ok_or_else(|| anyhow::anyhow!("Hop executor not found: {}", hop_id))?;

        // Enforce per-hop timeout
        let _start_time = Instant::now();
        match tokio::time::timeout(self.config.hop_timeout, executor.execute(context)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => {
                Ok(SimpleHopResult {
                    hop_id: hop_id.to_string(),
                    status: SimpleHopStatus::Timeout,
                    data: serde_json::json!({
                        "executed": false,
                        "timeout": true,
                        "hop_id": hop_id,
                        "context_hop": context.current_hop
                    }),
                    execution_time: self.config.hop_timeout,
                    quality_score: 0.0,
                    next_hops: Vec::new(),
                })
            }
        }
    }

    /// Update performance tracker
    async fn update_performance_tracker(&self, hop_result: &SimpleHopResult) {
        let mut tracker = self.performance_tracker.write().await;
        tracker.update_hop_performance(hop_result);
    }

    /// Update target hops based on results
    async fn update_target_hops(
        &self,
        context: &SimpleOrchestrationContext,
        current_hops: &[String],
    ) -> Result<Vec<String>> {
        // Analyze results and determine next hops
        let mut next_hops = Vec::new();

        for result in &context.results {
            next_hops.extend(result.next_hops.clone());
        }

        // Remove duplicates and limit to available hops
        next_hops.sort();
        next_hops.dedup();

        // Filter by available hop registry
        let registry = self.hop_registry.read().await;
        next_hops.retain(|hop_id| registry.contains_key(hop_id));

        Ok(next_hops)
    }

    /// Calculate final metrics
    async fn calculate_final_metrics(&self, context: &SimpleOrchestrationContext) -> Result<SimpleOrchestrationMetrics> {
        let total_time = context.start_time.elapsed();
        let avg_hop_time = if context.total_hops > 0 {
            Duration::from_millis(total_time.as_millis() as u64 / context.total_hops as u64)
        } else {
            Duration::ZERO
        };

        let success_count = context.results.iter()
            .filter(|r| matches!(r.status, SimpleHopStatus::Success))
            .count();
        let success_rate = if context.total_hops > 0 {
            success_count as f64 / context.total_hops as f64
        } else {
            0.0
        };

        let avg_quality = if !context.results.is_empty() {
            context.results.iter()
                .map(|r| r.quality_score)
                .sum::<f64>() / context.results.len() as f64
        } else {
            0.0
        };

        Ok(SimpleOrchestrationMetrics {
            total_time,
            avg_hop_time,
            success_rate,
            quality_score: avg_quality,
            resource_utilization: 0.0, // TODO: Calculate actual resource utilization
        })
    }
}

/// Simplified final orchestration result
#[derive(Debug, Clone, Serialize)]
pub struct SimpleOrchestrationResult {
    /// Final context
    pub context: SimpleOrchestrationContext,
    /// All hop results
    pub results: Vec<SimpleHopResult>,
    /// Final metrics
    pub metrics: SimpleOrchestrationMetrics,
    /// Overall success
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_multi_hop_orchestration() {
        let config = SimpleMultiHopConfig::default();
        let orchestrator = SimpleMultiHopOrchestrator::new(config);

        // Register some hop executors
        let hop1 = SimpleHopExecutor::new(
            "hop_1".to_string(),
            "Data Processing".to_string(),
            "Process input data".to_string(),
        );
        let hop2 = SimpleHopExecutor::new(
            "hop_2".to_string(),
            "Analysis".to_string(),
            "Analyze processed data".to_string(),
        );

        orchestrator.register_hop(hop1).await;
        orchestrator.register_hop(hop2).await;

        let context = SimpleOrchestrationContext {
            current_hop: 0,
            total_hops: 0,
            start_time: Instant::now(),
            results: Vec::new(),
            context_data: HashMap::new(),
            metrics: SimpleOrchestrationMetrics::default(),
        };

        let target_goals = vec!["hop_1".to_string(), "hop_2".to_string()];

        let result = orchestrator.execute_orchestration(context, target_goals).await;
        assert!(result.is_ok());

        let orchestration_result = result.unwrap();
        assert!(orchestration_result.results.len() > 0);
        assert!(orchestration_result.metrics.success_rate >= 0.0);
    }
}
