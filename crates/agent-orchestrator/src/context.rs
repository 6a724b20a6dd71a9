//! Context Management System
//!
//! This module provides context management capabilities for agents
//! including context windows and optimization.

use crate::OrchestrationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Context manager for agent context handling
#[derive(Debug)]
pub struct ContextManager {
    pub contexts: HashMap<Uuid, ContextWindow>,
    pub optimizer: ContextOptimizer,
}

/// Context window for agent operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextWindow {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub content: String,
    pub size: usize,
    pub max_size: usize,
    pub optimization_enabled: bool,
}

/// Context optimization system
#[derive(Debug)]
pub struct ContextOptimizer {
    pub compression_threshold: usize,
    pub summarization_enabled: bool,
    pub priority_preservation: bool,
}

impl ContextManager {
    pub fn new() -> Self {
        Self {
            contexts: HashMap::new(),
            optimizer: ContextOptimizer::new(),
        }
    }

    pub async fn create_context_window(
        &mut self,
        agent_id: Uuid,
        max_size: usize,
    ) -> Result<Uuid, OrchestrationError> {
        let id = Uuid::new_v4();
        let window = ContextWindow {
            id,
            agent_id,
            content: String::new(),
            size: 0,
            max_size,
            optimization_enabled: true,
        };
        
        self.contexts.insert(id, window);
        Ok(id)
    }
}

impl ContextOptimizer {
    pub fn new() -> Self {
        Self {
            compression_threshold: 16384,
            summarization_enabled: true,
            priority_preservation: true,
        }
    }
}