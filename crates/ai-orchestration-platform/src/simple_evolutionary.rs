//! Simplified Evolutionary Algorithms for Agent Optimization
//!
//! This module provides a simplified version of evolutionary algorithms
//! that compiles without async trait issues.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};
use anyhow::Result;
use tracing::{info, debug, warn, error};

/// Simplified evolutionary algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleEvolutionaryConfig {
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
}

impl Default for SimpleEvolutionaryConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 100,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            selection_pressure: 2.0,
            elitism_rate: 0.1,
        }
    }
}

/// Simplified individual in the evolutionary population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleIndividual {
    /// Unique identifier
    pub id: String,
    /// Parameters (simplified chromosome)
    pub parameters: HashMap<String, f64>,
    /// Fitness score
    pub fitness: f64,
    /// Generation created
    pub generation: usize,
    /// Performance metrics
    pub performance_metrics: SimplePerformanceMetrics,
}

/// Simplified performance metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplePerformanceMetrics {
    /// Execution time
    pub execution_time: Duration,
    /// Success rate
    pub success_rate: f64,
    /// Quality score
    pub quality_score: f64,
    /// Resource efficiency
    pub resource_efficiency: f64,
}

/// Simplified evolutionary engine
pub struct SimpleEvolutionaryEngine {
    config: SimpleEvolutionaryConfig,
    population: Arc<RwLock<Vec<SimpleIndividual>>>,
    statistics: Arc<RwLock<SimpleEvolutionStatistics>>,
}

/// Simplified evolution statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleEvolutionStatistics {
    /// Current generation
    pub current_generation: usize,
    /// Best fitness over time
    pub best_fitness_history: Vec<f64>,
    /// Average fitness over time
    pub average_fitness_history: Vec<f64>,
    /// Total evaluations
    pub total_evaluations: usize,
    /// Execution time
    pub execution_time: Duration,
}

impl SimpleEvolutionaryEngine {
    /// Create a new simplified evolutionary engine
    pub fn new(config: SimpleEvolutionaryConfig) -> Self {
        Self {
            config,
            population: Arc::new(RwLock::new(Vec::new())),
            statistics: Arc::new(RwLock::new(SimpleEvolutionStatistics {
                current_generation: 0,
                best_fitness_history: Vec::new(),
                average_fitness_history: Vec::new(),
                total_evaluations: 0,
                execution_time: Duration::ZERO,
            })),
        }
    }

    /// Initialize population
    pub async fn initialize_population(&self, initial_individuals: Option<Vec<SimpleIndividual>>) -> Result<()> {
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

    /// Run simplified evolutionary algorithm
    pub async fn evolve(&self) -> Result<SimpleIndividual> {
        let start_time = Instant::now();
        let mut best_individual = None;

        info!("Starting simplified evolutionary algorithm with {} generations", self.config.max_generations);

        for generation in 0..self.config.max_generations {
            debug!("Generation {}/{}", generation + 1, self.config.max_generations);

            // Evaluate fitness
            self.evaluate_population().await?;

            // Update statistics
            self.update_statistics(generation).await?;

            // Selection
            let selected = self.selection().await?;

            // Crossover
            let offspring = self.crossover(&selected).await?;

            // Mutation
            self.mutation(&mut offspring.clone()).await?;

            // Update population
            self.update_population(offspring).await?;

            // Update best individual
            best_individual = self.get_best_individual().await?;
        }

        let execution_time = start_time.elapsed();
        self.update_execution_time(execution_time).await?;

        info!("Simplified evolutionary algorithm completed in {:?}", execution_time);

        best_individual.ok_or_else(|| anyhow::anyhow!("No individuals in population"))
    }

    /// Generate random individual
    async fn generate_random_individual(&self, index: usize) -> Result<SimpleIndividual> {
        let mut parameters = HashMap::new();

        // Generate random parameters
        for i in 0..5 { // Example: 5 parameters per individual
            parameters.insert(format!("param_{}", i), (index + i) as f64 * 0.1);
        }

        Ok(SimpleIndividual {
            id: format!("individual_{}", index),
            parameters,
            fitness: 0.0,
            generation: 0,
            performance_metrics: SimplePerformanceMetrics {
                execution_time: Duration::ZERO,
                success_rate: 0.0,
                quality_score: 0.0,
                resource_efficiency: 0.0,
            },
        })
    }

    /// Evaluate population fitness
    async fn evaluate_population(&self) -> Result<()> {
        let mut population = self.population.write().await;
        let mut total_evaluations = 0;

        for individual in population.iter_mut() {
            let fitness = self.evaluate_fitness(individual).await?;
            individual.fitness = fitness;
            total_evaluations += 1;
        }

        // Update statistics
        let mut stats = self.statistics.write().await;
        stats.total_evaluations += total_evaluations;

        Ok(())
    }

    /// Simple fitness evaluation
    async fn evaluate_fitness(&self, individual: &SimpleIndividual) -> Result<f64> {
        // Simple fitness evaluation based on parameters
        let mut fitness = 0.0;
        for (_, value) in &individual.parameters {
            fitness += value * 0.2; // Simple linear combination
        }

        // Add some randomness to make it interesting
        fitness += (individual.id.len() as f64) * 0.01;

        Ok(fitness.min(1.0)) // Cap at 1.0
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

        Ok(())
    }

    /// Selection phase
    async fn selection(&self) -> Result<Vec<SimpleIndividual>> {
        let population = self.population.read().await;
        let selection_size = (population.len() as f64 * self.config.crossover_rate) as usize;

        // Simple tournament selection
        let mut selected = Vec::new();
        for _ in 0..selection_size {
            if let Some(individual) = population.iter().max_by(|a, b| a.fitness.partial_cmp(&b.fitness).unwrap()) {
                selected.push(individual.clone());
            }
        }

        Ok(selected)
    }

    /// Crossover phase
    async fn crossover(&self, selected: &[SimpleIndividual]) -> Result<Vec<SimpleIndividual>> {
        let mut offspring = Vec::new();

        for i in (0..selected.len()).step_by(2) {
            if i + 1 < selected.len() {
                let child = self.create_child(&selected[i], &selected[i + 1]).await?;
                offspring.push(child);
            }
        }

        Ok(offspring)
    }

    /// Create child from two parents
    async fn create_child(&self, parent1: &SimpleIndividual, parent2: &SimpleIndividual) -> Result<SimpleIndividual> {
        let mut child_parameters = HashMap::new();

        // Simple crossover: take average of parameters
        for (key, value1) in &parent1.parameters {
            if let Some(value2) = parent2.parameters.get(key) {
                child_parameters.insert(key.clone(), (value1 + value2) / 2.0);
            } else {
                child_parameters.insert(key.clone(), *value1);
            }
        }

        Ok(SimpleIndividual {
            id: format!("child_{}_{}", parent1.id, parent2.id),
            parameters: child_parameters,
            fitness: 0.0,
            generation: parent1.generation + 1,
            performance_metrics: SimplePerformanceMetrics {
                execution_time: Duration::ZERO,
                success_rate: 0.0,
                quality_score: 0.0,
                resource_efficiency: 0.0,
            },
        })
    }

    /// Mutation phase
    async fn mutation(&self, offspring: &mut [SimpleIndividual]) -> Result<()> {
        for individual in offspring.iter_mut() {
            individual.generation = self.statistics.read().await.current_generation + 1;

            // Simple mutation: add small random value to parameters
            for (_, value) in individual.parameters.iter_mut() {
                if rand::random::<f64>() < self.config.mutation_rate {
                    *value += (rand::random::<f64>() - 0.5) * 0.1; // Small random change
                }
            }
        }
        Ok(())
    }

    /// Update population
    async fn update_population(&self, offspring: Vec<SimpleIndividual>) -> Result<()> {
        let mut population = self.population.write().await;

        // Elitism: preserve best individuals
        let elitism_count = (population.len() as f64 * self.config.elitism_rate) as usize;
        population.sort_by(|a, b| b.fitness.partial_cmp(&a.fitness).unwrap());
        let elite: Vec<SimpleIndividual> = population.drain(0..elitism_count).collect();

        // Replace population with offspring
        *population = offspring;

        // Add elite back
        population.extend(elite);

        Ok(())
    }

    /// Get best individual
    async fn get_best_individual(&self) -> Result<Option<SimpleIndividual>> {
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
    pub async fn get_statistics(&self) -> SimpleEvolutionStatistics {
        self.statistics.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_evolutionary_engine() {
        let config = SimpleEvolutionaryConfig::default();
        let engine = SimpleEvolutionaryEngine::new(config);

        // Initialize population
        engine.initialize_population(None).await.unwrap();

        // Run evolution
        let result = engine.evolve().await;
        assert!(result.is_ok());

        let best_individual = result.unwrap();
        assert!(best_individual.fitness > 0.0);

        // Check statistics
        let stats = engine.get_statistics().await;
        assert_eq!(stats.current_generation, 99); // 0-indexed
        assert_eq!(stats.best_fitness_history.len(), 100);
    }
}
