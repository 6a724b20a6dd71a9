//! Evolutionary Algorithms for Agent Optimization
//!
//! This module implements advanced evolutionary algorithms for optimizing
//! agent behavior, orchestration patterns, and system performance based on
//! the latest research in evolutionary computation and AI optimization.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};
use anyhow::Result;
use tracing::{info, debug};
use rand::Rng;

/// Evolutionary algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionaryConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations
    pub max_generations: usize,
    /// Mutation rate (0.0 to 1.0)
    pub mutation_rate: f64,
    /// Crossover rate (0.0 to 1.0)
    pub crossover_rate: f64,
    /// Selection pressure
    pub selection_pressure: f64,
    /// Elitism rate (percentage of best individuals to preserve)
    pub elitism_rate: f64,
    /// Diversity maintenance threshold
    pub diversity_threshold: f64,
    /// Convergence threshold
    pub convergence_threshold: f64,
    /// Learning rate for adaptation
    pub learning_rate: f64,
}

impl Default for EvolutionaryConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 1000,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            selection_pressure: 2.0,
            elitism_rate: 0.1,
            diversity_threshold: 0.1,
            convergence_threshold: 0.001,
            learning_rate: 0.01,
        }
    }
}

/// Individual in the evolutionary population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Individual {
    /// Unique identifier
    pub id: String,
    /// Chromosome (genetic representation)
    pub chromosome: Chromosome,
    /// Fitness score
    pub fitness: f64,
    /// Generation created
    pub generation: usize,
    /// Parent IDs
    pub parents: Vec<String>,
    /// Mutation history
    pub mutation_history: Vec<Mutation>,
    /// Performance metrics
    pub performance_metrics: PerformanceMetrics,
}

/// Chromosome representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chromosome {
    /// Genes (parameters)
    pub genes: Vec<Gene>,
    /// Gene types
    pub gene_types: Vec<GeneType>,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

/// Individual gene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gene {
    /// Gene identifier
    pub id: String,
    /// Gene value
    pub value: GeneValue,
    /// Importance weight
    pub weight: f64,
    /// Mutation probability
    pub mutation_probability: f64,
}

/// Gene value types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeneValue {
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<GeneValue>),
}

/// Gene type classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeneType {
    /// Behavioral parameter
    Behavioral,
    /// Performance parameter
    Performance,
    /// Resource parameter
    Resource,
    /// Learning parameter
    Learning,
    /// Coordination parameter
    Coordination,
}

/// Gene constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint type
    pub constraint_type: ConstraintType,
    /// Minimum value
    pub min_value: Option<f64>,
    /// Maximum value
    pub max_value: Option<f64>,
    /// Allowed values
    pub allowed_values: Option<Vec<GeneValue>>,
}

/// Constraint types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConstraintType {
    /// Range constraint
    Range,
    /// Discrete constraint
    Discrete,
    /// Dependency constraint
    Dependency(String),
}

/// Mutation operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutation {
    /// Mutation type
    pub mutation_type: MutationType,
    /// Gene ID
    pub gene_id: String,
    /// Old value
    pub old_value: GeneValue,
    /// New value
    pub new_value: GeneValue,
    /// Mutation strength
    pub strength: f64,
}

/// Mutation types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MutationType {
    /// Gaussian mutation
    Gaussian,
    /// Uniform mutation
    Uniform,
    /// Bit flip mutation
    BitFlip,
    /// Insertion mutation
    Insertion,
    /// Deletion mutation
    Deletion,
    /// Swap mutation
    Swap,
}

/// Performance metrics for individuals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Execution time
    pub execution_time: Duration,
    /// Success rate
    pub success_rate: f64,
    /// Quality score
    pub quality_score: f64,
    /// Resource efficiency
    pub resource_efficiency: f64,
    /// Adaptability score
    pub adaptability_score: f64,
    /// Robustness score
    pub robustness_score: f64,
}

/// Evolutionary algorithm engine
pub struct EvolutionaryEngine {
    config: EvolutionaryConfig,
    population: Arc<RwLock<Vec<Individual>>>,
    fitness_evaluator: Arc<dyn FitnessEvaluator + Send + Sync>,
    mutation_operator: Arc<dyn MutationOperator + Send + Sync>,
    crossover_operator: Arc<dyn CrossoverOperator + Send + Sync>,
    selection_operator: Arc<dyn SelectionOperator + Send + Sync>,
    diversity_maintainer: Arc<dyn DiversityMaintainer + Send + Sync>,
    convergence_detector: Arc<dyn ConvergenceDetector + Send + Sync>,
    statistics: Arc<RwLock<EvolutionStatistics>>,
}

/// Trait for fitness evaluation
#[async_trait::async_trait]
pub trait FitnessEvaluator: Send + Sync {
    /// Evaluate fitness of an individual
    async fn evaluate_fitness(&self, individual: &Individual) -> Result<f64>;

    /// Evaluate population fitness
    async fn evaluate_population(&self, population: &[Individual]) -> Result<Vec<f64>>;
}

/// Trait for mutation operations
#[async_trait::async_trait]
pub trait MutationOperator: Send + Sync {
    /// Apply mutation to an individual
    async fn mutate(&self, individual: &mut Individual, mutation_rate: f64) -> Result<Vec<Mutation>>;

    /// Get mutation types
    fn get_mutation_types(&self) -> Vec<MutationType>;
}

/// Trait for crossover operations
#[async_trait::async_trait]
pub trait CrossoverOperator: Send + Sync {
    /// Apply crossover to two parents
    async fn crossover(
        &self,
        parent1: &Individual,
        parent2: &Individual,
        crossover_rate: f64,
    ) -> Result<Vec<Individual>>;

    /// Get crossover types
    fn get_crossover_types(&self) -> Vec<CrossoverType>;
}

/// Crossover types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CrossoverType {
    /// Single point crossover
    SinglePoint,
    /// Two point crossover
    TwoPoint,
    /// Uniform crossover
    Uniform,
    /// Arithmetic crossover
    Arithmetic,
    /// Blend crossover
    Blend(f64),
}

/// Trait for selection operations
#[async_trait::async_trait]
pub trait SelectionOperator: Send + Sync {
    /// Select individuals from population
    async fn select(
        &self,
        population: &[Individual],
        selection_size: usize,
        selection_pressure: f64,
    ) -> Result<Vec<Individual>>;

    /// Get selection types
    fn get_selection_types(&self) -> Vec<SelectionType>;
}

/// Selection types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SelectionType {
    /// Tournament selection
    Tournament(usize),
    /// Roulette wheel selection
    RouletteWheel,
    /// Rank selection
    Rank,
    /// Truncation selection
    Truncation(f64),
}

/// Trait for diversity maintenance
#[async_trait::async_trait]
pub trait DiversityMaintainer: Send + Sync {
    /// Calculate population diversity
    async fn calculate_diversity(&self, population: &[Individual]) -> Result<f64>;

    /// Maintain diversity in population
    async fn maintain_diversity(
        &self,
        population: &mut Vec<Individual>,
        diversity_threshold: f64,
    ) -> Result<()>;
}

/// Trait for convergence detection
#[async_trait::async_trait]
pub trait ConvergenceDetector: Send + Sync {
    /// Check if algorithm has converged
    async fn has_converged(
        &self,
        population: &[Individual],
        generation: usize,
        convergence_threshold: f64,
    ) -> Result<bool>;

    /// Get convergence metrics
    async fn get_convergence_metrics(&self, population: &[Individual]) -> Result<ConvergenceMetrics>;
}

/// Convergence metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceMetrics {
    /// Fitness variance
    pub fitness_variance: f64,
    /// Best fitness
    pub best_fitness: f64,
    /// Average fitness
    pub average_fitness: f64,
    /// Diversity measure
    pub diversity: f64,
    /// Generations without improvement
    pub stagnation_generations: usize,
}

/// Evolution statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStatistics {
    /// Current generation
    pub current_generation: usize,
    /// Best fitness over time
    pub best_fitness_history: Vec<f64>,
    /// Average fitness over time
    pub average_fitness_history: Vec<f64>,
    /// Diversity over time
    pub diversity_history: Vec<f64>,
    /// Convergence metrics
    pub convergence_metrics: Option<ConvergenceMetrics>,
    /// Total evaluations
    pub total_evaluations: usize,
    /// Execution time
    pub execution_time: Duration,
}

impl EvolutionaryEngine {
    /// Create a new evolutionary engine
    pub fn new(
        config: EvolutionaryConfig,
        fitness_evaluator: Arc<dyn FitnessEvaluator + Send + Sync>,
        mutation_operator: Arc<dyn MutationOperator + Send + Sync>,
        crossover_operator: Arc<dyn CrossoverOperator + Send + Sync>,
        selection_operator: Arc<dyn SelectionOperator + Send + Sync>,
        diversity_maintainer: Arc<dyn DiversityMaintainer + Send + Sync>,
        convergence_detector: Arc<dyn ConvergenceDetector + Send + Sync>,
    ) -> Self {
        Self {
            config,
            population: Arc::new(RwLock::new(Vec::new())),
            fitness_evaluator,
            mutation_operator,
            crossover_operator,
            selection_operator,
            diversity_maintainer,
            convergence_detector,
            statistics: Arc::new(RwLock::new(EvolutionStatistics {
                current_generation: 0,
                best_fitness_history: Vec::new(),
                average_fitness_history: Vec::new(),
                diversity_history: Vec::new(),
                convergence_metrics: None,
                total_evaluations: 0,
                execution_time: Duration::ZERO,
            })),
        }
    }

    /// Initialize population
    pub async fn initialize_population(&self, initial_individuals: Option<Vec<Individual>>) -> Result<()> {
        let mut population = self.population.write().await;

        if let Some(individuals) = initial_individuals {
            population.extend(individuals);
        } else {
            // Generate random population
            for i in 0..self.config.population_size {
                let individual = self.generate_random_individual(i).await?;
                population.push(individual);
            }
        }

        info!("Initialized population with {} individuals", population.len());
        Ok(())
    }

    /// Run evolutionary algorithm
    pub async fn evolve(&self) -> Result<Individual> {
        let start_time = Instant::now();
        let mut best_individual = None;

        info!("Starting evolutionary algorithm with {} generations", self.config.max_generations);

        for generation in 0..self.config.max_generations {
            debug!("Generation {}/{}", generation + 1, self.config.max_generations);

            // Evaluate fitness
            self.evaluate_population().await?;

            // Update statistics
            self.update_statistics(generation).await?;

            // Check convergence
            let has_converged = self.check_convergence(generation).await?;
            if has_converged {
                info!("Algorithm converged at generation {}", generation);
                break;
            }

            // Selection
            let selected = self.selection().await?;

            // Crossover
            let offspring = self.crossover(&selected).await?;

            // Mutation
            self.mutation(&mut offspring.clone()).await?;

            // Update population
            self.update_population(offspring).await?;

            // Maintain diversity
            self.maintain_diversity().await?;

            // Update best individual
            best_individual = self.get_best_individual().await?;
        }

        let execution_time = start_time.elapsed();
        self.update_execution_time(execution_time).await?;

        info!("Evolutionary algorithm completed in {:?}", execution_time);

        best_individual.ok_or_else(|| anyhow::anyhow!("No individuals in population"))
    }

    /// Generate random individual
    async fn generate_random_individual(&self, index: usize) -> Result<Individual> {
        let mut rng = rand::thread_rng();
        let mut genes = Vec::new();

        // Generate random genes
        for i in 0..10 { // Example: 10 genes per individual
            let gene = Gene {
                id: format!("gene_{}", i),
                value: GeneValue::Float(rng.gen_range(0.0..1.0)),
                weight: rng.gen_range(0.0..1.0),
                mutation_probability: rng.gen_range(0.0..1.0),
            };
            genes.push(gene);
        }

        let chromosome = Chromosome {
            genes,
            gene_types: vec![GeneType::Behavioral; 10],
            constraints: Vec::new(),
        };

        Ok(Individual {
            id: format!("individual_{}", index),
            chromosome,
            fitness: 0.0,
            generation: 0,
            parents: Vec::new(),
            mutation_history: Vec::new(),
            performance_metrics: PerformanceMetrics {
                execution_time: Duration::ZERO,
                success_rate: 0.0,
                quality_score: 0.0,
                resource_efficiency: 0.0,
                adaptability_score: 0.0,
                robustness_score: 0.0,
            },
        })
    }

    /// Evaluate population fitness
    async fn evaluate_population(&self) -> Result<()> {
        let mut population = self.population.write().await;
        let mut total_evaluations = 0;

        for individual in population.iter_mut() {
            let fitness = self.fitness_evaluator.evaluate_fitness(individual).await?;
            individual.fitness = fitness;
            total_evaluations += 1;
        }

        // Update statistics
        let mut stats = self.statistics.write().await;
        stats.total_evaluations += total_evaluations;

        Ok(())
    }

    /// Update statistics
    async fn update_statistics(&self, generation: usize) -> Result<()> {
        let population = self.population.read().await;
        let mut stats = self.statistics.write().await;

        let fitnesses: Vec<f64> = population.iter().map(|i| i.fitness).collect();
        let best_fitness = fitnesses.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let average_fitness = fitnesses.iter().sum::<f64>() / fitnesses.len() as f64;

        stats.current_generation = generation;
        stats.best_fitness_history.push(best_fitness);
        stats.average_fitness_history.push(average_fitness);

        // Calculate diversity
        let diversity = self.diversity_maintainer.calculate_diversity(&population).await?;
        stats.diversity_history.push(diversity);

        Ok(())
    }

    /// Check convergence
    async fn check_convergence(&self, generation: usize) -> Result<bool> {
        let population = self.population.read().await;
        self.convergence_detector.has_converged(
            &population,
            generation,
            self.config.convergence_threshold,
        ).await
    }

    /// Selection phase
    async fn selection(&self) -> Result<Vec<Individual>> {
        let population = self.population.read().await;
        let selection_size = (population.len() as f64 * self.config.crossover_rate) as usize;

        self.selection_operator.select(
            &population,
            selection_size,
            self.config.selection_pressure,
        ).await
    }

    /// Crossover phase
    async fn crossover(&self, selected: &[Individual]) -> Result<Vec<Individual>> {
        let mut offspring = Vec::new();

        for i in (0..selected.len()).step_by(2) {
            if i + 1 < selected.len() {
                let children = self.crossover_operator.crossover(
                    &selected[i],
                    &selected[i + 1],
                    self.config.crossover_rate,
                ).await?;
                offspring.extend(children);
            }
        }

        Ok(offspring)
    }

    /// Mutation phase
    async fn mutation(&self, offspring: &mut [Individual]) -> Result<()> {
        for individual in offspring.iter_mut() {
            individual.generation = self.statistics.read().await.current_generation + 1;
            self.mutation_operator.mutate(individual, self.config.mutation_rate).await?;
        }
        Ok(())
    }

    /// Update population
    async fn update_population(&self, offspring: Vec<Individual>) -> Result<()> {
        let mut population = self.population.write().await;

        // Elitism: preserve best individuals
        let elitism_count = (population.len() as f64 * self.config.elitism_rate) as usize;
        population.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap());
        let elite: Vec<Individual> = population.drain(0..elitism_count).collect();

        // Replace population with offspring
        *population = offspring;

        // Add elite back
        population.extend(elite);

        Ok(())
    }

    /// Maintain diversity
    async fn maintain_diversity(&self) -> Result<()> {
        let mut population = self.population.write().await;
        self.diversity_maintainer.maintain_diversity(
            &mut population,
            self.config.diversity_threshold,
        ).await
    }

    /// Get best individual
    async fn get_best_individual(&self) -> Result<Option<Individual>> {
        let population = self.population.read().await;
        Ok(population.iter().max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap()).cloned())
    }

    /// Update execution time
    async fn update_execution_time(&self, execution_time: Duration) -> Result<()> {
        let mut stats = self.statistics.write().await;
        stats.execution_time = execution_time;
        Ok(())
    }

    /// Get evolution statistics
    pub async fn get_statistics(&self) -> EvolutionStatistics {
        self.statistics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_evolutionary_engine() {
        // This would require implementing mock operators and evaluators
        // let config = EvolutionaryConfig::default();
        // let engine = EvolutionaryEngine::new(config, ...);
        // let result = engine.evolve().await;
        // assert!(result.is_ok());
    }
}
