//! Solution generator for ReVeal Evolution Service

use crate::{error::*, types::*};
use serde::{Deserialize, Serialize};

/// Generation strategy types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GenerationStrategy {
    Adaptive,
    Conservative,
    Aggressive,
    Balanced,
}

/// Solution generator
pub struct SolutionGenerator {
    pub strategy: GenerationStrategy,
    temperature: f64,
    max_tokens: usize,
}

impl SolutionGenerator {
    pub fn new(strategy: GenerationStrategy, temperature: f64, max_tokens: usize) -> Self {
        Self {
            strategy,
            temperature,
            max_tokens,
        }
    }
    
    pub async fn generate(&self, problem: &str, context: &EvolutionContext, feedback: Option<&str>) -> EvolutionResult<String> {
        // Placeholder generation - would implement actual generation logic
        let base_solution = format!(
            "// Generated solution for: {}\n// Strategy: {:?}\n// Context: {}\nfunction solution() {{\n    // Implementation here\n    return 'placeholder';\n}}",
            problem,
            self.strategy,
            context.task_type
        );
        
        let enhanced_solution = if let Some(fb) = feedback {
            format!("{}\n// Improved based on feedback: {}", base_solution, fb)
        } else {
            base_solution
        };
        
        Ok(enhanced_solution)
    }
}

impl Default for SolutionGenerator {
    fn default() -> Self {
        Self::new(GenerationStrategy::Adaptive, 0.7, 2048)
    }
}