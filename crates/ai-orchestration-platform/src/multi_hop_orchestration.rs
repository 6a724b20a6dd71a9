//! Enhanced Multi-Hop Orchestration System
//!
//! This module implements advanced multi-hop orchestration capabilities based on
//! the latest research in AI orchestration, including:
//! - Multi-hop reasoning with evolutionary algorithms
//! - Adaptive loop mechanisms with performance optimization
//! - Intelligent agent coordination with dynamic routing
//! - Self-improving orchestration patterns

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use serde::Serialize;
use anyhow::Result;
use tracing::{info, debug};
use rand::Rng;

/// Multi-hop orchestration configuration
#[derive(Debug, Clone, Serialize)]
pub struct MultiHopConfig {
    /// Maximum number of hops in a single orchestration
    pub max_hops: usize,
    /// Timeout for each hop
    pub hop_timeout: Duration,
    /// Maximum total orchestration time
    pub total_timeout: Duration,
    /// Enable adaptive routing
    pub adaptive_routing: bool,
    /// Enable evolutionary optimization
    pub evolutionary_optimization: bool,
    /// Learning rate for adaptation
    pub learning_rate: f64,
    /// Exploration vs exploitation balance
    pub exploration_factor: f64,
}

impl Default for MultiHopConfig {
    fn default() -> Self {
        Self {
            max_hops: 10,
            hop_timeout: Duration::from_secs(30),
            total_timeout: Duration::from_secs(300),
            adaptive_routing: true,
            evolutionary_optimization: true,
            learning_rate: 0.1,
            exploration_factor: 0.2,
        }
    }
}

/// Hop execution result
#[derive(Debug, Clone, Serialize)]
pub struct HopResult {
    /// Hop identifier
    pub hop_id: String,
    /// Execution status
    pub status: HopStatus,
    /// Result data
    pub data: serde_json::Value,
    /// Execution time
    pub execution_time: Duration,
    /// Quality score (0.0 to 1.0)
    pub quality_score: f64,
    /// Next hop suggestions
    pub next_hops: Vec<String>,
    /// Metadata
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Hop execution status
#[derive(Debug, Clone, Serialize)]
pub enum HopStatus {
    Success,
    PartialSuccess,
    Failure,
    Timeout,
    Skipped,
}

/// Multi-hop orchestration context
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationContext {
    /// Current hop index
    pub current_hop: usize,
    /// Total hops executed
    pub total_hops: usize,
    /// Start time
    #[serde(skip_serializing)]
    pub start_time: Instant,
    /// Accumulated results
    pub results: Vec<HopResult>,
    /// Context data
    pub context_data: HashMap<String, serde_json::Value>,
    /// Performance metrics
    pub metrics: OrchestrationMetrics,
}

/// Orchestration performance metrics
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationMetrics {
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
    /// Adaptation score
    pub adaptation_score: f64,
}

/// Multi-hop orchestration engine
pub struct MultiHopOrchestrator {
    config: MultiHopConfig,
    hop_registry: Arc<RwLock<HashMap<String, Box<dyn HopExecutor + Send + Sync>>>>,
    performance_tracker: Arc<RwLock<PerformanceTracker>>,
    evolutionary_optimizer: Arc<RwLock<EvolutionaryOptimizer>>,
    adaptive_router: Arc<RwLock<AdaptiveRouter>>,
}

/// Trait for hop execution
#[async_trait::async_trait]
pub trait HopExecutor: Send + Sync {
    /// Execute a hop
    async fn execute(&self, context: &OrchestrationContext) -> Result<HopResult>;

    /// Get hop metadata
    fn get_metadata(&self) -> HopMetadata;

    /// Check if hop is applicable
    fn is_applicable(&self, context: &OrchestrationContext) -> bool;
}

/// Hop metadata
#[derive(Debug, Clone, Serialize)]
pub struct HopMetadata {
    /// Hop identifier
    pub id: String,
    /// Hop name
    pub name: String,
    /// Hop description
    pub description: String,
    /// Required capabilities
    pub required_capabilities: Vec<String>,
    /// Expected execution time
    pub expected_time: Duration,
    /// Quality threshold
    pub quality_threshold: f64,
}

/// Performance tracker for orchestration optimization
pub struct PerformanceTracker {
    /// Historical performance data
    performance_history: Vec<OrchestrationMetrics>,
    /// Hop performance data
    hop_performance: HashMap<String, Vec<HopResult>>,
    /// Learning parameters
    learning_params: LearningParameters,
}

/// Learning parameters for adaptation
#[derive(Debug, Clone)]
pub struct LearningParameters {
    /// Learning rate
    pub learning_rate: f64,
    /// Memory decay factor
    pub memory_decay: f64,
    /// Exploration factor
    pub exploration_factor: f64,
    /// Adaptation threshold
    pub adaptation_threshold: f64,
}

/// Evolutionary optimizer for orchestration patterns
pub struct EvolutionaryOptimizer {
    /// Population of orchestration patterns
    population: Vec<OrchestrationPattern>,
    /// Generation counter
    generation: usize,
    /// Mutation rate
    mutation_rate: f64,
    /// Crossover rate
    crossover_rate: f64,
    /// Selection pressure
    selection_pressure: f64,
}

/// Orchestration pattern for evolutionary optimization
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationPattern {
    /// Pattern identifier
    pub id: String,
    /// Hop sequence
    pub hop_sequence: Vec<String>,
    /// Execution parameters
    pub parameters: HashMap<String, f64>,
    /// Fitness score
    pub fitness: f64,
    /// Generation created
    pub generation: usize,
}

/// Adaptive router for intelligent hop selection
pub struct AdaptiveRouter {
    /// Routing policies
    routing_policies: HashMap<String, RoutingPolicy>,
    /// Context-aware routing
    context_aware_routing: bool,
    /// Learning enabled
    learning_enabled: bool,
}

/// Routing policy for adaptive routing
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    /// Policy name
    pub name: String,
    /// Selection criteria
    pub criteria: Vec<SelectionCriterion>,
    /// Weight
    pub weight: f64,
    /// Performance threshold
    pub performance_threshold: f64,
}

/// Selection criterion for routing
#[derive(Debug, Clone)]
pub enum SelectionCriterion {
    /// Performance-based selection
    Performance(f64),
    /// Quality-based selection
    Quality(f64),
    /// Resource-based selection
    Resource(f64),
    /// Context-based selection
    Context(String),
    /// Time-based selection
    Time(Duration),
}

impl MultiHopOrchestrator {
    /// Create a new multi-hop orchestrator
    pub fn new(config: MultiHopConfig) -> Self {
        Self {
            config,
            hop_registry: Arc::new(RwLock::new(HashMap::new())),
            performance_tracker: Arc::new(RwLock::new(PerformanceTracker::new())),
            evolutionary_optimizer: Arc::new(RwLock::new(EvolutionaryOptimizer::new())),
            adaptive_router: Arc::new(RwLock::new(AdaptiveRouter::new())),
        }
    }

    /// Register a hop executor
    pub async fn register_hop(&self, id: String, executor: Box<dyn HopExecutor + Send + Sync>) {
        let mut registry = self.hop_registry.write().await;
        registry.insert(id, executor);
    }

    /// Execute multi-hop orchestration
    pub async fn execute_orchestration(
        &self,
        initial_context: OrchestrationContext,
        target_goals: Vec<String>,
    ) -> Result<OrchestrationResult> {
        let start_time = Instant::now();
        let mut context = initial_context;
        let mut current_hops = target_goals.clone();
        let mut results = Vec::new();

        info!("Starting multi-hop orchestration with {} target goals", target_goals.len());

        // Main orchestration loop
        while context.current_hop < self.config.max_hops
            && start_time.elapsed() < self.config.total_timeout
            && !current_hops.is_empty() {

            // Select next hop using adaptive routing
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

            // Evolve orchestration pattern if enabled
            if self.config.evolutionary_optimization {
                self.evolve_orchestration_pattern(&context).await?;
            }

            // Update current hops based on results
            current_hops = self.update_target_hops(&context, &current_hops).await?;

            debug!("Completed hop {}/{}", context.current_hop, self.config.max_hops);
        }

        // Calculate final metrics
        let final_metrics = self.calculate_final_metrics(&context).await?;

        let overall_success = results.iter().all(|r| matches!(r.status, HopStatus::Success));

        Ok(OrchestrationResult {
            context,
            results,
            metrics: final_metrics,
            success: overall_success,
        })
    }

    /// Select next hop using adaptive routing
    async fn select_next_hop(
        &self,
        context: &OrchestrationContext,
        available_hops: &[String],
    ) -> Result<String> {
        if !self.config.adaptive_routing {
            // Simple round-robin selection
            return Ok(available_hops[context.current_hop % available_hops.len()].clone());
        }

        // Exploration vs exploitation
        let mut rng = rand::thread_rng();
        if rng.gen::<f64>() < self.config.exploration_factor {
            // Explore randomly among available hops
            let idx = rng.gen_range(0..available_hops.len());
            return Ok(available_hops[idx].clone());
        }

        // Performance-aware selection using tracker and hop metadata
        let registry = self.hop_registry.read().await;
        let mut best_hop = available_hops[0].clone();
        let mut best_score = f64::MIN;

        for hop_id in available_hops {
            if let Some(executor) = registry.get(hop_id) {
                // Skip if not applicable
                if !executor.is_applicable(context) { continue; }
                let meta = executor.get_metadata();
                let score = self.calculate_hop_score(&meta).await?;
                if score > best_score {
                    best_score = score;
                    best_hop = hop_id.clone();
                }
            }
        }

        Ok(best_hop)
    }

    /// Execute a single hop
    async fn execute_hop(
        &self,
        context: &OrchestrationContext,
        hop_id: &str,
    ) -> Result<HopResult> {
        let registry = self.hop_registry.read().await;
        let executor = registry.get(hop_id)
            .ok_or_else(|| anyhow::anyhow!("Hop executor not found: {}", hop_id))?;

        let start_time = Instant::now();
        // Enforce per-hop timeout
        let result = match tokio::time::timeout(self.config.hop_timeout, executor.execute(context)).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(e),
            Err(_elapsed) => {
                return Ok(HopResult {
                    hop_id: hop_id.to_string(),
                    status: HopStatus::Timeout,
                    data: serde_json::json!({
                        "executed": false,
                        "timeout": true,
                        "hop_id": hop_id,
                        "context_hop": context.current_hop
                    }),
                    execution_time: self.config.hop_timeout,
                    quality_score: 0.0,
                    next_hops: Vec::new(),
                    metadata: HashMap::new(),
                });
            }
        };
        let execution_time = start_time.elapsed();

        Ok(HopResult {
            hop_id: hop_id.to_string(),
            execution_time,
            ..result
        })
    }

    /// Calculate hop score for selection using metadata and history
    async fn calculate_hop_score(&self, meta: &HopMetadata) -> Result<f64> {
        // Base expectations
        let base_time_score = 1.0 / ((meta.expected_time.as_millis() as f64 / 1000.0).max(0.001));
        let base_quality_score = meta.quality_threshold;

        // Historical stats
        let tracker = self.performance_tracker.read().await;
        let hist = tracker.get_hop_stats(&meta.id);
        let (hist_success, hist_quality, hist_time_score) = if let Some(s) = hist {
            let success = s.success_rate;
            let quality = s.avg_quality;
            let time_score = if s.avg_time.as_millis() > 0 {
                1.0 / ((s.avg_time.as_millis() as f64 / 1000.0).max(0.001))
            } else { 1.0 };
            (success, quality, time_score)
        } else {
            (0.5, base_quality_score, base_time_score)
        };

        let score = 0.25 * base_time_score
            + 0.25 * base_quality_score
            + 0.25 * hist_quality
            + 0.25 * (0.5 * hist_success + 0.5 * hist_time_score);

        Ok(score)
    }

    /// Update performance tracker
    async fn update_performance_tracker(&self, hop_result: &HopResult) {
        let mut tracker = self.performance_tracker.write().await;
        tracker.update_hop_performance(hop_result);
    }

    /// Evolve orchestration pattern
    async fn evolve_orchestration_pattern(&self, context: &OrchestrationContext) -> Result<()> {
        let mut optimizer = self.evolutionary_optimizer.write().await;
        optimizer.evolve_pattern(context).await?;
        Ok(())
    }

    /// Update target hops based on results
    async fn update_target_hops(
        &self,
        context: &OrchestrationContext,
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
    async fn calculate_final_metrics(&self, context: &OrchestrationContext) -> Result<OrchestrationMetrics> {
        let total_time = context.start_time.elapsed();
        let avg_hop_time = if context.total_hops > 0 {
            Duration::from_millis(total_time.as_millis() as u64 / context.total_hops as u64)
        } else {
            Duration::ZERO
        };

        let success_count = context.results.iter()
            .filter(|r| matches!(r.status, HopStatus::Success))
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

        Ok(OrchestrationMetrics {
            total_time,
            avg_hop_time,
            success_rate,
            quality_score: avg_quality,
            resource_utilization: 0.0, // TODO: Calculate actual resource utilization
            adaptation_score: 0.0, // TODO: Calculate adaptation score
        })
    }
}

impl PerformanceTracker {
    fn new() -> Self {
        Self {
            performance_history: Vec::new(),
            hop_performance: HashMap::new(),
            learning_params: LearningParameters {
                learning_rate: 0.1,
                memory_decay: 0.95,
                exploration_factor: 0.2,
                adaptation_threshold: 0.7,
            },
        }
    }

    fn update_hop_performance(&mut self, hop_result: &HopResult) {
        self.hop_performance
            .entry(hop_result.hop_id.clone())
            .or_insert_with(Vec::new)
            .push(hop_result.clone());
    }

    fn get_hop_stats(&self, hop_id: &str) -> Option<HopStats> {
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
            if matches!(r.status, HopStatus::Success) {
                success_count += 1;
            }
        }

        let n = entries.len() as u32;
        Some(HopStats {
            avg_time: if n > 0 { Duration::from_millis(total_time.as_millis() as u64 / n as u64) } else { Duration::ZERO },
            avg_quality: if n > 0 { total_quality / n as f64 } else { 0.0 },
            success_rate: if n > 0 { success_count as f64 / n as f64 } else { 0.0 },
        })
    }
}

/// Aggregated hop statistics for routing
pub struct HopStats {
    pub avg_time: Duration,
    pub avg_quality: f64,
    pub success_rate: f64,
}

impl EvolutionaryOptimizer {
    fn new() -> Self {
        Self {
            population: Vec::new(),
            generation: 0,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            selection_pressure: 2.0,
        }
    }

    async fn evolve_pattern(&mut self, context: &OrchestrationContext) -> Result<()> {
        // Implement evolutionary optimization logic
        // This would include mutation, crossover, and selection operations
        debug!("Evolving orchestration pattern for generation {}", self.generation);
        self.generation += 1;
        Ok(())
    }
}

impl AdaptiveRouter {
    fn new() -> Self {
        Self {
            routing_policies: HashMap::new(),
            context_aware_routing: true,
            learning_enabled: true,
        }
    }

    async fn select_hop(
        &self,
        context: &OrchestrationContext,
        available_hops: &[String],
    ) -> Result<String> {
        // Implement adaptive routing logic
        // This would analyze context and select the most appropriate hop
        Ok(available_hops[0].clone()) // Placeholder
    }
}

/// Final orchestration result
#[derive(Debug, Clone, Serialize)]
pub struct OrchestrationResult {
    /// Final context
    pub context: OrchestrationContext,
    /// All hop results
    pub results: Vec<HopResult>,
    /// Final metrics
    pub metrics: OrchestrationMetrics,
    /// Overall success
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_multi_hop_orchestration() {
        let config = MultiHopConfig::default();
        let orchestrator = MultiHopOrchestrator::new(config);

        let context = OrchestrationContext {
            current_hop: 0,
            total_hops: 0,
            start_time: Instant::now(),
            results: Vec::new(),
            context_data: HashMap::new(),
            metrics: OrchestrationMetrics {
                total_time: Duration::ZERO,
                avg_hop_time: Duration::ZERO,
                success_rate: 0.0,
                quality_score: 0.0,
                resource_utilization: 0.0,
                adaptation_score: 0.0,
            },
        };

        let target_goals = vec!["test_hop_1".to_string(), "test_hop_2".to_string()];

        // This would require implementing test hop executors
        // let result = orchestrator.execute_orchestration(context, target_goals).await;
        // assert!(result.is_ok());
    }
}
