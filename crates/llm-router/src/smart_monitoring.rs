// Smart Monitoring System leveraging existing monitoring infrastructure
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartMetrics {
    pub timestamp: u64,
    pub routing_decisions: RoutingMetrics,
    pub model_performance: ModelPerformanceMetrics,
    pub cache_performance: CachePerformanceMetrics,
    pub system_health: SystemHealthMetrics,
    pub user_satisfaction: UserSatisfactionMetrics,
    pub optimization_opportunities: Vec<OptimizationOpportunity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingMetrics {
    pub total_requests: u64,
    pub smart_routed_requests: u64,
    pub fallback_requests: u64,
    pub hrm_routed_requests: u64,
    pub dspy_orchestrated_requests: u64,
    pub avg_routing_time_ms: f64,
    pub routing_accuracy: f64,
    pub complexity_distribution: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformanceMetrics {
    pub model_stats: HashMap<String, ModelStats>,
    pub fastest_model: String,
    pub most_accurate_model: String,
    pub most_cost_effective_model: String,
    pub load_balancing_effectiveness: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStats {
    pub requests: u64,
    pub avg_response_time_ms: f64,
    pub success_rate: f64,
    pub quality_score: f64,
    pub cost_per_token: f64,
    pub tokens_processed: u64,
    pub last_used: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePerformanceMetrics {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub hit_rate: f64,
    pub avg_cache_response_time_ms: f64,
    pub memory_usage_mb: f64,
    pub semantic_matches: u64,
    pub exact_matches: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealthMetrics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub network_latency_ms: f64,
    pub active_connections: u32,
    pub error_rate: f64,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSatisfactionMetrics {
    pub avg_response_time_ms: f64,
    pub quality_score: f64,
    pub error_rate: f64,
    pub user_feedback_score: f64,
    pub satisfaction_trend: f64, // Positive/negative trend
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOpportunity {
    pub opportunity_type: OptimizationType,
    pub description: String,
    pub potential_improvement: f64,
    pub confidence: f64,
    pub recommended_action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptimizationType {
    ModelSelection,
    CacheStrategy,
    LoadBalancing,
    ResourceAllocation,
    RoutingLogic,
}

pub struct SmartMonitoringSystem {
    metrics: Arc<RwLock<SmartMetrics>>,
    #[allow(dead_code)]
    performance_tracker: PerformanceTracker,
    #[allow(dead_code)]
    alert_manager: AlertManager,
    #[allow(dead_code)]
    optimization_analyzer: OptimizationAnalyzer,
}

impl SmartMonitoringSystem {
    pub fn new() -> Self {
        Self {
            metrics: Arc::new(RwLock::new(SmartMetrics {
                timestamp: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs(),
                routing_decisions: RoutingMetrics {
                    total_requests: 0,
                    smart_routed_requests: 0,
                    fallback_requests: 0,
                    hrm_routed_requests: 0,
                    dspy_orchestrated_requests: 0,
                    avg_routing_time_ms: 0.0,
                    routing_accuracy: 0.0,
                    complexity_distribution: HashMap::new(),
                },
                model_performance: ModelPerformanceMetrics {
                    model_stats: HashMap::new(),
                    fastest_model: String::new(),
                    most_accurate_model: String::new(),
                    most_cost_effective_model: String::new(),
                    load_balancing_effectiveness: 0.0,
                },
                cache_performance: CachePerformanceMetrics {
                    cache_hits: 0,
                    cache_misses: 0,
                    hit_rate: 0.0,
                    avg_cache_response_time_ms: 0.0,
                    memory_usage_mb: 0.0,
                    semantic_matches: 0,
                    exact_matches: 0,
                },
                system_health: SystemHealthMetrics {
                    cpu_usage: 0.0,
                    memory_usage: 0.0,
                    network_latency_ms: 0.0,
                    active_connections: 0,
                    error_rate: 0.0,
                    uptime_seconds: 0,
                },
                user_satisfaction: UserSatisfactionMetrics {
                    avg_response_time_ms: 0.0,
                    quality_score: 0.0,
                    error_rate: 0.0,
                    user_feedback_score: 0.0,
                    satisfaction_trend: 0.0,
                },
                optimization_opportunities: Vec::new(),
            })),
            performance_tracker: PerformanceTracker::new(),
            alert_manager: AlertManager::new(),
            optimization_analyzer: OptimizationAnalyzer::new(),
        }
    }

    pub async fn record_routing_decision(
        &self,
        routing_type: RoutingType,
        complexity: String,
        routing_time_ms: f64,
        success: bool,
    ) {
        let mut metrics = self.metrics.write().await;
        metrics.timestamp = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

        metrics.routing_decisions.total_requests += 1;

        match routing_type {
            RoutingType::Smart => metrics.routing_decisions.smart_routed_requests += 1,
            RoutingType::Fallback => metrics.routing_decisions.fallback_requests += 1,
            RoutingType::Hrm => metrics.routing_decisions.hrm_routed_requests += 1,
            RoutingType::Dspy => metrics.routing_decisions.dspy_orchestrated_requests += 1,
        }

        // Update complexity distribution
        *metrics.routing_decisions.complexity_distribution.entry(complexity).or_insert(0) += 1;

        // Update average routing time
        let total = metrics.routing_decisions.total_requests as f64;
        metrics.routing_decisions.avg_routing_time_ms =
            (metrics.routing_decisions.avg_routing_time_ms * (total - 1.0) + routing_time_ms) / total;

        // Update routing accuracy
        if success {
            let current_accuracy = metrics.routing_decisions.routing_accuracy;
            metrics.routing_decisions.routing_accuracy =
                (current_accuracy * (total - 1.0) + 1.0) / total;
        }
    }

    pub async fn record_model_performance(
        &self,
        model: String,
        response_time_ms: f64,
        success: bool,
        quality_score: f64,
        tokens_used: u64,
    ) {
        let mut metrics = self.metrics.write().await;

        let model_stats = metrics.model_performance.model_stats.entry(model.clone()).or_insert(ModelStats {
            requests: 0,
            avg_response_time_ms: 0.0,
            success_rate: 0.0,
            quality_score: 0.0,
            cost_per_token: 0.0,
            tokens_processed: 0,
            last_used: SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs(),
        });

        model_stats.requests += 1;
        model_stats.last_used = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();

        // Update average response time
        let total = model_stats.requests as f64;
        model_stats.avg_response_time_ms =
            (model_stats.avg_response_time_ms * (total - 1.0) + response_time_ms) / total;

        // Update success rate
        if success {
            model_stats.success_rate =
                (model_stats.success_rate * (total - 1.0) + 1.0) / total;
        }

        // Update quality score
        model_stats.quality_score =
            (model_stats.quality_score * (total - 1.0) + quality_score) / total;

        model_stats.tokens_processed += tokens_used;

        // Update best model indicators
        self.update_best_models(&mut metrics.model_performance).await;
    }

    pub async fn record_cache_performance(
        &self,
        is_hit: bool,
        is_exact_match: bool,
        response_time_ms: f64,
        memory_usage_mb: f64,
    ) {
        let mut metrics = self.metrics.write().await;

        if is_hit {
            metrics.cache_performance.cache_hits += 1;
            if is_exact_match {
                metrics.cache_performance.exact_matches += 1;
            } else {
                metrics.cache_performance.semantic_matches += 1;
            }
        } else {
            metrics.cache_performance.cache_misses += 1;
        }

        // Update hit rate
        let total_requests = metrics.cache_performance.cache_hits + metrics.cache_performance.cache_misses;
        metrics.cache_performance.hit_rate =
            metrics.cache_performance.cache_hits as f64 / total_requests as f64;

        // Update average cache response time
        if is_hit {
            let total_hits = metrics.cache_performance.cache_hits as f64;
            metrics.cache_performance.avg_cache_response_time_ms =
                (metrics.cache_performance.avg_cache_response_time_ms * (total_hits - 1.0) + response_time_ms) / total_hits;
        }

        metrics.cache_performance.memory_usage_mb = memory_usage_mb;
    }

    pub async fn update_system_health(
        &self,
        cpu_usage: f64,
        memory_usage: f64,
        network_latency_ms: f64,
        active_connections: u32,
        error_rate: f64,
    ) {
        let mut metrics = self.metrics.write().await;

        metrics.system_health.cpu_usage = cpu_usage;
        metrics.system_health.memory_usage = memory_usage;
        metrics.system_health.network_latency_ms = network_latency_ms;
        metrics.system_health.active_connections = active_connections;
        metrics.system_health.error_rate = error_rate;
        metrics.system_health.uptime_seconds =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
    }

    pub async fn update_user_satisfaction(
        &self,
        avg_response_time_ms: f64,
        quality_score: f64,
        error_rate: f64,
        user_feedback_score: f64,
    ) {
        let mut metrics = self.metrics.write().await;

        metrics.user_satisfaction.avg_response_time_ms = avg_response_time_ms;
        metrics.user_satisfaction.quality_score = quality_score;
        metrics.user_satisfaction.error_rate = error_rate;
        metrics.user_satisfaction.user_feedback_score = user_feedback_score;

        // Calculate satisfaction trend (simplified)
        metrics.user_satisfaction.satisfaction_trend =
            (quality_score * 0.4 + (1.0 - error_rate) * 0.3 + user_feedback_score * 0.3) - 0.5;
    }

    async fn update_best_models(&self, model_performance: &mut ModelPerformanceMetrics) {
        let mut fastest_time = f64::MAX;
        let mut most_accurate = 0.0;
        let mut most_cost_effective = f64::MAX;

        for (model_name, stats) in &model_performance.model_stats {
            if stats.avg_response_time_ms < fastest_time {
                fastest_time = stats.avg_response_time_ms;
                model_performance.fastest_model = model_name.clone();
            }

            if stats.success_rate > most_accurate {
                most_accurate = stats.success_rate;
                model_performance.most_accurate_model = model_name.clone();
            }

            if stats.cost_per_token < most_cost_effective {
                most_cost_effective = stats.cost_per_token;
                model_performance.most_cost_effective_model = model_name.clone();
            }
        }
    }

    pub async fn analyze_optimization_opportunities(&self) -> Vec<OptimizationOpportunity> {
        let metrics = self.metrics.read().await;
        let mut opportunities = Vec::new();

        // Analyze routing performance
        if metrics.routing_decisions.fallback_requests as f64 / metrics.routing_decisions.total_requests as f64 > 0.1 {
            opportunities.push(OptimizationOpportunity {
                opportunity_type: OptimizationType::RoutingLogic,
                description: "High fallback rate detected".to_string(),
                potential_improvement: 0.15,
                confidence: 0.8,
                recommended_action: "Review smart routing logic and model selection criteria".to_string(),
            });
        }

        // Analyze cache performance
        if metrics.cache_performance.hit_rate < 0.6 {
            opportunities.push(OptimizationOpportunity {
                opportunity_type: OptimizationType::CacheStrategy,
                description: "Low cache hit rate".to_string(),
                potential_improvement: 0.25,
                confidence: 0.9,
                recommended_action: "Optimize cache similarity thresholds and TTL settings".to_string(),
            });
        }

        // Analyze model performance
        if metrics.user_satisfaction.avg_response_time_ms > 2000.0 {
            opportunities.push(OptimizationOpportunity {
                opportunity_type: OptimizationType::ModelSelection,
                description: "High response times detected".to_string(),
                potential_improvement: 0.3,
                confidence: 0.85,
                recommended_action: "Increase usage of faster models for simple tasks".to_string(),
            });
        }

        // Analyze load balancing
        if metrics.model_performance.load_balancing_effectiveness < 0.7 {
            opportunities.push(OptimizationOpportunity {
                opportunity_type: OptimizationType::LoadBalancing,
                description: "Inefficient load balancing".to_string(),
                potential_improvement: 0.2,
                confidence: 0.75,
                recommended_action: "Implement dynamic load balancing based on real-time metrics".to_string(),
            });
        }

        opportunities
    }

    pub async fn get_metrics(&self) -> SmartMetrics {
        let metrics = self.metrics.read().await;
        metrics.clone()
    }

    pub async fn get_health_status(&self) -> HealthStatusInfo {
        let metrics = self.metrics.read().await;

        let mut health_score = 1.0;
        let mut issues = Vec::new();

        // Check error rate
        if metrics.system_health.error_rate > 0.05 {
            health_score -= 0.3;
            issues.push("High error rate detected".to_string());
        }

        // Check response time
        if metrics.user_satisfaction.avg_response_time_ms > 3000.0 {
            health_score -= 0.2;
            issues.push("Slow response times".to_string());
        }

        // Check cache performance
        if metrics.cache_performance.hit_rate < 0.5 {
            health_score -= 0.1;
            issues.push("Low cache hit rate".to_string());
        }

        // Check system resources
        if metrics.system_health.cpu_usage > 0.9 {
            health_score -= 0.2;
            issues.push("High CPU usage".to_string());
        }

        if metrics.system_health.memory_usage > 0.9 {
            health_score -= 0.2;
            issues.push("High memory usage".to_string());
        }

        let status = if health_score > 0.8 {
            HealthStatus::Healthy
        } else if health_score > 0.6 {
            HealthStatus::Warning
        } else {
            HealthStatus::Critical
        };

        HealthStatusInfo {
            status,
            health_score,
            issues,
            metrics: metrics.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RoutingType {
    Smart,
    Fallback,
    Hrm,
    Dspy,
}

#[derive(Debug, Clone)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone)]
pub struct HealthStatusInfo {
    pub status: HealthStatus,
    pub health_score: f64,
    pub issues: Vec<String>,
    pub metrics: SmartMetrics,
}

// Supporting structures
pub struct PerformanceTracker {
    // Implementation details would go here
}

impl PerformanceTracker {
    pub fn new() -> Self {
        Self {}
    }
}

pub struct AlertManager {
    // Implementation details would go here
}

impl AlertManager {
    pub fn new() -> Self {
        Self {}
    }
}

pub struct OptimizationAnalyzer {
    // Implementation details would go here
}

impl OptimizationAnalyzer {
    pub fn new() -> Self {
        Self {}
    }
}
