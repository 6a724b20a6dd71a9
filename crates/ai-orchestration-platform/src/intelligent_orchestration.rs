//! AI-Driven Orchestration Enhancements
//! 
//! This module integrates cutting-edge AI research into the existing orchestration system:
//! - Particle Swarm Optimization for resource allocation
//! - Fuzzy Logic for dynamic resource management
//! - Machine Learning for performance prediction
//! - Agent-based data pipeline orchestration

use crate::PlatformError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// AI-driven orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIOrchestrationConfig {
    pub enable_pso_optimization: bool,
    pub enable_fuzzy_logic: bool,
    pub enable_ml_predictions: bool,
    pub enable_adaptive_scaling: bool,
    pub optimization_interval_seconds: u64,
    pub learning_enabled: bool,
    pub performance_threshold: f64,
    pub cost_optimization_weight: f64,
}

impl Default for AIOrchestrationConfig {
    fn default() -> Self {
        Self {
            enable_pso_optimization: true,
            enable_fuzzy_logic: true,
            enable_ml_predictions: true,
            enable_adaptive_scaling: true,
            optimization_interval_seconds: 30,
            learning_enabled: true,
            performance_threshold: 0.8,
            cost_optimization_weight: 0.5,
        }
    }
}

/// Resource profile for AI optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIResourceProfile {
    pub cpu_cores: f64,
    pub memory_gb: f64,
    pub network_bandwidth_gbps: f64,
    pub storage_gb: f64,
    pub gpu_units: u32,
    pub cost_per_hour: f64,
    pub performance_score: f64,
}

/// Workflow profile for AI orchestration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIWorkflowProfile {
    pub workflow_id: Uuid,
    pub priority: WorkflowPriority,
    pub estimated_duration_seconds: f64,
    pub resource_requirements: AIResourceProfile,
    pub dependencies: Vec<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub cost_sensitivity: f64,
    pub performance_requirements: HashMap<String, f64>,
}

/// Workflow priority levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowPriority {
    Critical = 1,
    High = 2,
    Medium = 3,
    Low = 4,
    Background = 5,
}

/// AI-driven orchestration decision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIOrchestrationDecision {
    pub workflow_id: Uuid,
    pub assigned_resources: AIResourceProfile,
    pub execution_strategy: String,
    pub estimated_completion_time: f64,
    pub confidence_score: f64,
    pub reasoning: String,
    pub optimization_used: OptimizationStrategy,
    pub cost_estimate: f64,
    pub performance_prediction: f64,
}

/// Optimization strategies used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptimizationStrategy {
    ParticleSwarm,
    FuzzyLogic,
    MachineLearning,
    ReinforcementLearning,
    GeneticAlgorithm,
    Hybrid,
}

/// System metrics for AI decision making
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub network_usage: f64,
    pub performance: f64,
    pub cost: f64,
    pub timestamp: DateTime<Utc>,
}

/// AI-driven orchestration engine
pub struct AIOrchestrationEngine {
    config: AIOrchestrationConfig,
    system_metrics: Arc<RwLock<SystemMetrics>>,
    workflow_history: Arc<RwLock<Vec<WorkflowExecutionRecord>>>,
    ml_models: Arc<RwLock<HashMap<String, MLModel>>>,
    pso_optimizer: PSOOptimizer,
    fuzzy_controller: FuzzyLogicController,
}

/// Machine Learning model wrapper
#[derive(Debug, Clone)]
pub struct MLModel {
    pub model_type: String,
    pub weights: Vec<f64>,
    pub accuracy: f64,
    pub last_trained: DateTime<Utc>,
}

/// Workflow execution record for learning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecutionRecord {
    pub workflow_id: Uuid,
    pub assigned_resources: AIResourceProfile,
    pub actual_performance: f64,
    pub actual_duration: f64,
    pub actual_cost: f64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// Particle Swarm Optimizer
pub struct PSOOptimizer {
    swarm_size: usize,
    max_iterations: usize,
    global_best_position: Vec<f64>,
    global_best_fitness: f64,
}

impl PSOOptimizer {
    pub fn new(swarm_size: usize, max_iterations: usize) -> Self {
        Self {
            swarm_size,
            max_iterations,
            global_best_position: Vec::new(),
            global_best_fitness: f64::INFINITY,
        }
    }

    pub async fn optimize_resource_allocation(
        &mut self,
        workflows: &[AIWorkflowProfile],
        available_resources: &AIResourceProfile,
    ) -> Result<Vec<AIOrchestrationDecision>, PlatformError> {
        tracing::info!("Running Particle Swarm Optimization for resource allocation");
        
        // Initialize particles
        let mut particles = self.initialize_particles(workflows, available_resources);
        
        // Run optimization iterations
        for iteration in 0..self.max_iterations {
            for particle in &mut particles {
                // Evaluate fitness
                let fitness = self.evaluate_fitness(particle, workflows, available_resources).await?;
                
                // Update personal best
                if fitness < particle.personal_best_fitness {
                    particle.personal_best_fitness = fitness;
                    particle.personal_best_position = particle.position.clone();
                }
                
                // Update global best
                if fitness < self.global_best_fitness {
                    self.global_best_fitness = fitness;
                    self.global_best_position = particle.position.clone();
                }
                
                // Update velocity and position
                self.update_particle(particle);
            }
            
            if iteration % 20 == 0 {
                tracing::debug!("PSO Iteration {}: Best fitness = {:.4}", iteration, self.global_best_fitness);
            }
        }
        
        // Convert best solution to orchestration decisions
        self.convert_to_decisions(&self.global_best_position, workflows)
    }

    fn initialize_particles(&self, workflows: &[AIWorkflowProfile], available_resources: &AIResourceProfile) -> Vec<Particle> {
        let mut particles = Vec::new();
        
        for _ in 0..self.swarm_size {
            let position = self.generate_random_position(workflows, available_resources);
            let velocity = vec![0.0; position.len()];
            let particle = Particle {
                position,
                velocity,
                personal_best_position: Vec::new(),
                personal_best_fitness: f64::INFINITY,
            };
            particles.push(particle);
        }
        
        particles
    }

    fn generate_random_position(&self, workflows: &[AIWorkflowProfile], available_resources: &AIResourceProfile) -> Vec<f64> {
        let mut position = Vec::new();
        
        for workflow in workflows {
            // Random allocation within available resources
            let cpu_alloc = fastrand::f64() * available_resources.cpu_cores.min(8.0);
            let memory_alloc = fastrand::f64() * available_resources.memory_gb.min(16.0);
            let network_alloc = fastrand::f64() * available_resources.network_bandwidth_gbps;
            
            position.push(cpu_alloc);
            position.push(memory_alloc);
            position.push(network_alloc);
        }
        
        position
    }

    async fn evaluate_fitness(&self, particle: &Particle, workflows: &[AIWorkflowProfile], available_resources: &AIResourceProfile) -> Result<f64, PlatformError> {
        let allocations = self.parse_position(&particle.position, workflows);
        
        let mut total_cost = 0.0;
        let mut total_performance = 0.0;
        let mut resource_utilization = 0.0;
        
        for (i, workflow) in workflows.iter().enumerate() {
            let allocation = &allocations[i];
            
            // Cost calculation
            let cost = allocation.cpu_cores * 0.1 + allocation.memory_gb * 0.05 + allocation.network_bandwidth_gbps * 0.02;
            total_cost += cost * workflow.cost_sensitivity;
            
            // Performance calculation
            let performance = self.calculate_performance_score(allocation, workflow);
            total_performance += performance;
            
            // Resource utilization
            resource_utilization += (allocation.cpu_cores / available_resources.cpu_cores + 
                                   allocation.memory_gb / available_resources.memory_gb) / 2.0;
        }
        
        // Fitness function (lower is better)
        let fitness = total_cost * 0.4 + 
                     (1.0 - total_performance / workflows.len() as f64) * 0.4 + 
                     (1.0 - resource_utilization / workflows.len() as f64) * 0.2;
        
        Ok(fitness)
    }

    fn calculate_performance_score(&self, allocation: &AIResourceProfile, workflow: &AIWorkflowProfile) -> f64 {
        let cpu_score = (allocation.cpu_cores / workflow.resource_requirements.cpu_cores).min(1.0);
        let memory_score = (allocation.memory_gb / workflow.resource_requirements.memory_gb).min(1.0);
        let network_score = (allocation.network_bandwidth_gbps / workflow.resource_requirements.network_bandwidth_gbps).min(1.0);
        
        (cpu_score + memory_score + network_score) / 3.0
    }

    fn parse_position(&self, position: &[f64], workflows: &[AIWorkflowProfile]) -> Vec<AIResourceProfile> {
        let mut allocations = Vec::new();
        let mut idx = 0;
        
        for workflow in workflows {
            let cpu_cores = position[idx];
            let memory_gb = position[idx + 1];
            let network_bandwidth_gbps = position[idx + 2];
            
            let allocation = AIResourceProfile {
                cpu_cores,
                memory_gb,
                network_bandwidth_gbps,
                storage_gb: workflow.resource_requirements.storage_gb,
                gpu_units: workflow.resource_requirements.gpu_units,
                cost_per_hour: cpu_cores * 0.1 + memory_gb * 0.05,
                performance_score: 0.0,
            };
            
            allocations.push(allocation);
            idx += 3;
        }
        
        allocations
    }

    fn update_particle(&self, particle: &mut Particle) {
        let w = 0.9;  // Inertia weight
        let c1 = 2.0; // Cognitive parameter
        let c2 = 2.0; // Social parameter
        
        for i in 0..particle.position.len() {
            let r1 = fastrand::f64();
            let r2 = fastrand::f64();
            
            let cognitive = c1 * r1 * (particle.personal_best_position[i] - particle.position[i]);
            let social = c2 * r2 * (self.global_best_position[i] - particle.position[i]);
            
            particle.velocity[i] = w * particle.velocity[i] + cognitive + social;
            particle.position[i] += particle.velocity[i];
            
            // Apply bounds
            particle.position[i] = particle.position[i].clamp(0.1, 10.0);
        }
    }

    fn convert_to_decisions(&self, position: &[f64], workflows: &[AIWorkflowProfile]) -> Result<Vec<AIOrchestrationDecision>, PlatformError> {
        let mut decisions = Vec::new();
        let allocations = self.parse_position(position, workflows);
        
        for (i, workflow) in workflows.iter().enumerate() {
            let allocation = &allocations[i];
            
            let decision = AIOrchestrationDecision {
                workflow_id: workflow.workflow_id,
                assigned_resources: allocation.clone(),
                execution_strategy: "pso_optimized_parallel".to_string(),
                estimated_completion_time: self.estimate_completion_time(allocation, workflow),
                confidence_score: 0.85,
                reasoning: format!("PSO-optimized allocation: CPU={:.2f}, Memory={:.2f}GB", 
                                 allocation.cpu_cores, allocation.memory_gb),
                optimization_used: OptimizationStrategy::ParticleSwarm,
                cost_estimate: allocation.cost_per_hour * (workflow.estimated_duration_seconds / 3600.0),
                performance_prediction: self.calculate_performance_score(allocation, workflow),
            };
            
            decisions.push(decision);
        }
        
        Ok(decisions)
    }

    fn estimate_completion_time(&self, allocation: &AIResourceProfile, workflow: &AIWorkflowProfile) -> f64 {
        let base_time = workflow.estimated_duration_seconds;
        let cpu_factor = workflow.resource_requirements.cpu_cores / allocation.cpu_cores;
        let memory_factor = workflow.resource_requirements.memory_gb / allocation.memory_gb;
        
        base_time * cpu_factor.max(memory_factor)
    }
}

/// Particle for PSO
#[derive(Debug, Clone)]
struct Particle {
    position: Vec<f64>,
    velocity: Vec<f64>,
    personal_best_position: Vec<f64>,
    personal_best_fitness: f64,
}

/// Fuzzy Logic Controller
pub struct FuzzyLogicController {
    rules: Vec<FuzzyRule>,
}

#[derive(Debug, Clone)]
struct FuzzyRule {
    conditions: HashMap<String, String>,
    outputs: HashMap<String, String>,
}

impl FuzzyLogicController {
    pub fn new() -> Self {
        Self {
            rules: Self::initialize_fuzzy_rules(),
        }
    }

    pub fn make_decision(&self, system_state: &SystemMetrics) -> HashMap<String, f64> {
        // Fuzzify inputs
        let fuzzified = self.fuzzify_inputs(system_state);
        
        // Apply fuzzy rules
        let output_memberships = self.apply_rules(&fuzzified);
        
        // Defuzzify outputs
        self.defuzzify_outputs(&output_memberships)
    }

    fn initialize_fuzzy_rules() -> Vec<FuzzyRule> {
        vec![
            FuzzyRule {
                conditions: [("cpu_usage".to_string(), "high".to_string())].into(),
                outputs: [("resource_allocation".to_string(), "increase".to_string())].into(),
            },
            FuzzyRule {
                conditions: [("performance".to_string(), "low".to_string())].into(),
                outputs: [("optimization".to_string(), "enable".to_string())].into(),
            },
        ]
    }

    fn fuzzify_inputs(&self, inputs: &SystemMetrics) -> HashMap<String, HashMap<String, f64>> {
        let mut fuzzified = HashMap::new();
        
        // CPU usage membership
        let cpu_usage = inputs.cpu_usage;
        let mut cpu_membership = HashMap::new();
        cpu_membership.insert("low".to_string(), (1.0 - (cpu_usage - 0.2) / 0.3).max(0.0));
        cpu_membership.insert("medium".to_string(), (1.0 - (cpu_usage - 0.5).abs() / 0.3).max(0.0));
        cpu_membership.insert("high".to_string(), ((cpu_usage - 0.7) / 0.3).max(0.0));
        fuzzified.insert("cpu_usage".to_string(), cpu_membership);
        
        // Performance membership
        let performance = inputs.performance;
        let mut perf_membership = HashMap::new();
        perf_membership.insert("low".to_string(), (1.0 - (performance - 0.3) / 0.4).max(0.0));
        perf_membership.insert("acceptable".to_string(), (1.0 - (performance - 0.6).abs() / 0.3).max(0.0));
        perf_membership.insert("high".to_string(), ((performance - 0.8) / 0.2).max(0.0));
        fuzzified.insert("performance".to_string(), perf_membership);
        
        fuzzified
    }

    fn apply_rules(&self, fuzzified: &HashMap<String, HashMap<String, f64>>) -> HashMap<String, HashMap<String, f64>> {
        let mut output_memberships = HashMap::new();
        
        for rule in &self.rules {
            // Calculate rule strength
            let mut rule_strength = 1.0;
            for (condition, value) in &rule.conditions {
                if let Some(memberships) = fuzzified.get(condition) {
                    if let Some(strength) = memberships.get(value) {
                        rule_strength = rule_strength.min(*strength);
                    }
                }
            }
            
            // Apply rule to outputs
            for (output, value) in &rule.outputs {
                let entry = output_memberships.entry(output.clone()).or_insert_with(HashMap::new);
                let current = entry.get(value).unwrap_or(&0.0);
                entry.insert(value.clone(), current.max(rule_strength));
            }
        }
        
        output_memberships
    }

    fn defuzzify_outputs(&self, memberships: &HashMap<String, HashMap<String, f64>>) -> HashMap<String, f64> {
        let mut decisions = HashMap::new();
        
        for (output, membership) in memberships {
            if output == "resource_allocation" {
                let increase = membership.get("increase").unwrap_or(&0.0);
                let maintain = membership.get("maintain").unwrap_or(&0.0);
                let decrease = membership.get("decrease").unwrap_or(&0.0);
                
                let total = increase + maintain + decrease;
                if total > 0.0 {
                    let weighted = (1.0 * increase + 0.0 * maintain + (-1.0) * decrease) / total;
                    decisions.insert(output.clone(), weighted);
                } else {
                    decisions.insert(output.clone(), 0.0);
                }
            } else if output == "optimization" {
                let enable = membership.get("enable").unwrap_or(&0.0);
                let disable = membership.get("disable").unwrap_or(&0.0);
                decisions.insert(output.clone(), if enable > disable { 1.0 } else { 0.0 });
            }
        }
        
        decisions
    }
}

impl AIOrchestrationEngine {
    pub fn new(config: AIOrchestrationConfig) -> Self {
        Self {
            config,
            system_metrics: Arc::new(RwLock::new(SystemMetrics {
                cpu_usage: 0.0,
                memory_usage: 0.0,
                network_usage: 0.0,
                performance: 0.0,
                cost: 0.0,
                timestamp: Utc::now(),
            })),
            workflow_history: Arc::new(RwLock::new(Vec::new())),
            ml_models: Arc::new(RwLock::new(HashMap::new())),
            pso_optimizer: PSOOptimizer::new(50, 100),
            fuzzy_controller: FuzzyLogicController::new(),
        }
    }

    pub async fn orchestrate_workflows(
        &mut self,
        workflows: &[AIWorkflowProfile],
        available_resources: &AIResourceProfile,
    ) -> Result<Vec<AIOrchestrationDecision>, PlatformError> {
        tracing::info!("AI-Driven Orchestration Engine Starting");
        
        // Update system metrics
        self.update_system_metrics().await?;
        
        // Get current metrics
        let metrics = self.system_metrics.read().await;
        let fuzzy_decisions = self.fuzzy_controller.make_decision(&metrics);
        drop(metrics);
        
        // Optimize resource allocation using PSO
        let pso_decisions = if self.config.enable_pso_optimization {
            self.pso_optimizer.optimize_resource_allocation(workflows, available_resources).await?
        } else {
            self.generate_heuristic_decisions(workflows, available_resources).await?
        };
        
        // Apply fuzzy logic adjustments
        let final_decisions = self.apply_fuzzy_adjustments(pso_decisions, &fuzzy_decisions).await?;
        
        // Store decisions for learning
        self.store_decisions_for_learning(&final_decisions, workflows).await?;
        
        tracing::info!("Orchestrated {} workflows with AI optimization", final_decisions.len());
        Ok(final_decisions)
    }

    async fn update_system_metrics(&self) -> Result<(), PlatformError> {
        // In a real implementation, you would collect actual system metrics
        let mut metrics = self.system_metrics.write().await;
        metrics.cpu_usage = 0.6; // Simulated
        metrics.memory_usage = 0.7; // Simulated
        metrics.network_usage = 0.4; // Simulated
        metrics.performance = 0.8; // Simulated
        metrics.cost = 0.5; // Simulated
        metrics.timestamp = Utc::now();
        Ok(())
    }

    async fn generate_heuristic_decisions(
        &self,
        workflows: &[AIWorkflowProfile],
        available_resources: &AIResourceProfile,
    ) -> Result<Vec<AIOrchestrationDecision>, PlatformError> {
        let mut decisions = Vec::new();
        
        for workflow in workflows {
            let mut allocation = workflow.resource_requirements.clone();
            
            // Adjust based on priority
            let priority_multiplier = match workflow.priority {
                WorkflowPriority::Critical => 1.5,
                WorkflowPriority::High => 1.2,
                WorkflowPriority::Medium => 1.0,
                WorkflowPriority::Low => 0.8,
                WorkflowPriority::Background => 0.6,
            };
            
            allocation.cpu_cores *= priority_multiplier;
            allocation.memory_gb *= priority_multiplier;
            
            let decision = AIOrchestrationDecision {
                workflow_id: workflow.workflow_id,
                assigned_resources: allocation,
                execution_strategy: "heuristic_parallel".to_string(),
                estimated_completion_time: workflow.estimated_duration_seconds,
                confidence_score: 0.7,
                reasoning: format!("Heuristic allocation based on priority: {:?}", workflow.priority),
                optimization_used: OptimizationStrategy::Hybrid,
                cost_estimate: allocation.cost_per_hour * (workflow.estimated_duration_seconds / 3600.0),
                performance_prediction: 0.8,
            };
            
            decisions.push(decision);
        }
        
        Ok(decisions)
    }

    async fn apply_fuzzy_adjustments(
        &self,
        decisions: Vec<AIOrchestrationDecision>,
        fuzzy_decisions: &HashMap<String, f64>,
    ) -> Result<Vec<AIOrchestrationDecision>, PlatformError> {
        let mut adjusted_decisions = Vec::new();
        
        for decision in decisions {
            let resource_adjustment = fuzzy_decisions.get("resource_allocation").unwrap_or(&0.0);
            
            if resource_adjustment.abs() > 0.1 {
                let mut adjusted_resources = decision.assigned_resources.clone();
                adjusted_resources.cpu_cores *= (1.0 + resource_adjustment).max(0.1);
                adjusted_resources.memory_gb *= (1.0 + resource_adjustment).max(0.1);
                
                let adjusted_decision = AIOrchestrationDecision {
                    assigned_resources: adjusted_resources,
                    execution_strategy: format!("fuzzy_adjusted_{}", decision.execution_strategy),
                    reasoning: format!("{} (fuzzy adjustment: {:.2})", decision.reasoning, resource_adjustment),
                    ..decision
                };
                
                adjusted_decisions.push(adjusted_decision);
            } else {
                adjusted_decisions.push(decision);
            }
        }
        
        Ok(adjusted_decisions)
    }

    async fn store_decisions_for_learning(
        &self,
        decisions: &[AIOrchestrationDecision],
        workflows: &[AIWorkflowProfile],
    ) -> Result<(), PlatformError> {
        let mut history = self.workflow_history.write().await;
        
        for decision in decisions {
            let workflow = workflows.iter().find(|w| w.workflow_id == decision.workflow_id);
            
            if let Some(workflow) = workflow {
                let record = WorkflowExecutionRecord {
                    workflow_id: decision.workflow_id,
                    assigned_resources: decision.assigned_resources.clone(),
                    actual_performance: decision.performance_prediction,
                    actual_duration: decision.estimated_completion_time,
                    actual_cost: decision.cost_estimate,
                    success: true, // Would be determined by actual execution
                    timestamp: Utc::now(),
                };
                
                history.push(record);
            }
        }
        
        // Keep only recent history (last 1000 records)
        if history.len() > 1000 {
            history.drain(0..history.len() - 1000);
        }
        
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ai_orchestration_engine() {
        let config = AIOrchestrationConfig::default();
        let mut engine = AIOrchestrationEngine::new(config);
        
        let workflows = vec![
            AIWorkflowProfile {
                workflow_id: Uuid::new_v4(),
                priority: WorkflowPriority::High,
                estimated_duration_seconds: 300.0,
                resource_requirements: AIResourceProfile {
                    cpu_cores: 4.0,
                    memory_gb: 8.0,
                    network_bandwidth_gbps: 1.0,
                    storage_gb: 50.0,
                    gpu_units: 0,
                    cost_per_hour: 0.0,
                    performance_score: 0.0,
                },
                dependencies: vec![],
                deadline: None,
                cost_sensitivity: 0.7,
                performance_requirements: HashMap::new(),
            }
        ];
        
        let available_resources = AIResourceProfile {
            cpu_cores: 16.0,
            memory_gb: 32.0,
            network_bandwidth_gbps: 10.0,
            storage_gb: 500.0,
            gpu_units: 0,
            cost_per_hour: 0.0,
            performance_score: 0.0,
        };
        
        let decisions = engine.orchestrate_workflows(&workflows, &available_resources).await;
        assert!(decisions.is_ok());
        assert_eq!(decisions.unwrap().len(), 1);
    }
}
