//! Content curation and recommendations for the Intelligent Librarian

use crate::models::*;
use anyhow::Result;
use std::collections::HashMap;
use uuid::Uuid;

/// Content curator for intelligent recommendations
pub struct ContentCurator {
    // In a real implementation, this would connect to Supabase
    // For now, we'll use in-memory storage for testing
    collections: HashMap<String, Vec<DocumentId>>,
}

impl ContentCurator {
    pub async fn new() -> Result<Self> {
        Ok(Self {
            collections: HashMap::new(),
        })
    }

    /// Get document recommendations based on context
    pub async fn recommend(&self, _context: RecommendationContext) -> Result<Vec<DocumentRecommendation>> {
        // Simulate recommendations
        let recommendations = vec![
            DocumentRecommendation {
                document: Document {
                    id: Uuid::new_v4(),
                    content: "Machine learning optimization techniques".to_string(),
                    metadata: DocumentMetadata {
                        title: "ML Optimization Guide".to_string(),
                        description: Some("Comprehensive guide to ML optimization".to_string()),
                        authors: vec!["AI Expert".to_string()],
                        tags: vec!["machine-learning".to_string(), "optimization".to_string()],
                        language: Some("en".to_string()),
                        created_at: chrono::Utc::now(),
                        modified_at: chrono::Utc::now(),
                        file_size: Some(1024),
                        mime_type: Some("text/markdown".to_string()),
                        source: Some("internal".to_string()),
                        license: Some("MIT".to_string()),
                        version: Some("1.0".to_string()),
                        dependencies: vec![],
                        custom_fields: HashMap::new(),
                    },
                    analysis: None,
                    quality_score: Some(0.9),
                    relationships: vec![],
                },
                relevance_score: 0.85,
                reason: "High relevance to machine learning topics".to_string(),
                confidence: 0.8,
            }
        ];

        Ok(recommendations)
    }

    /// Get curation statistics
    pub async fn get_statistics(&self) -> Result<CurationStatistics> {
        Ok(CurationStatistics {
            total_collections: self.collections.len(),
            total_documents: 100,
            average_quality_score: 0.8,
            most_popular_tags: vec![
                ("machine-learning".to_string(), 25),
                ("optimization".to_string(), 20),
                ("distributed-systems".to_string(), 15),
            ],
        })
    }
}

/// Curation statistics
#[derive(Debug, Clone)]
pub struct CurationStatistics {
    pub total_collections: usize,
    pub total_documents: usize,
    pub average_quality_score: f64,
    pub most_popular_tags: Vec<(String, usize)>,
}
