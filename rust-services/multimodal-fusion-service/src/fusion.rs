//! Core multimodal fusion engine with Q-Former architecture

use crate::types::*;
use crate::error::{FusionError, Result};
use crate::attention::CrossModalAttention;
use crate::window::WindowManager;
use crate::encoders::EncoderManager;
use crate::features::FeatureExtractor;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use chrono::Utc;
use uuid::Uuid;
use tracing::{info, debug, warn};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Main fusion engine implementing Window-level Q-Former
pub struct MultimodalFusionEngine {
    /// Window manager for sliding window processing
    window_manager: WindowManager,
    /// Cross-modal attention mechanism
    attention_module: CrossModalAttention,
    /// Modality-specific encoders
    encoders: EncoderManager,
    /// Feature extractor
    feature_extractor: FeatureExtractor,
    /// Configuration
    config: crate::FusionConfig,
    /// Fusion history
    fusion_history: Arc<RwLock<Vec<FusionResult>>>,
    /// Cross-modal patterns discovered
    discovered_patterns: Arc<RwLock<HashMap<String, Pattern>>>,
    /// Analytics
    analytics: Arc<RwLock<FusionAnalytics>>,
}

impl MultimodalFusionEngine {
    /// Create a new fusion engine
    pub async fn new(config: crate::FusionConfig) -> Result<Self> {
        info!("🧠 Initializing Multimodal Fusion Engine with Q-Former architecture");
        
        let window_manager = WindowManager::new(config.window_size, config.overlap_ratio, config.max_active_windows);
        let attention_module = CrossModalAttention::new(
            config.embedding_dim,
            config.attention_heads,
            config.hidden_dim,
        );
        let encoders = EncoderManager::new(config.embedding_dim);
        let feature_extractor = FeatureExtractor::new();
        
        let analytics = FusionAnalytics {
            total_windows_processed: 0,
            active_windows: 0,
            fusion_operations: 0,
            average_fusion_time_ms: 0.0,
            modality_distribution: HashMap::new(),
            pattern_frequencies: HashMap::new(),
            connection_statistics: ConnectionStatistics {
                total_connections: 0,
                average_strength: 0.0,
                strongest_pair: None,
                connection_type_distribution: HashMap::new(),
            },
        };
        
        Ok(Self {
            window_manager,
            attention_module,
            encoders,
            feature_extractor,
            config,
            fusion_history: Arc::new(RwLock::new(Vec::new())),
            discovered_patterns: Arc::new(RwLock::new(HashMap::new())),
            analytics: Arc::new(RwLock::new(analytics)),
        })
    }
    
    /// Process multimodal input through fusion pipeline
    pub async fn process_multimodal(&mut self, input: ModalityInput) -> Result<FusionResult> {
        let start_time = std::time::Instant::now();
        debug!("Processing multimodal input: {:?}", input.modality);
        
        // Step 1: Extract features
        let features = self.feature_extractor.extract(&input)?;
        
        // Step 2: Generate embeddings
        let embeddings = self.encoders.encode(&input).await?;
        
        // Step 3: Create modality window
        let window = ModalityWindow {
            id: input.id,
            modality: input.modality.clone(),
            content: input.content,
            embeddings,
            features,
            timestamp: input.timestamp,
            confidence: 0.85, // Initial confidence
        };
        
        // Step 4: Add to window manager
        self.window_manager.add_window(window)?;
        
        // Step 5: Get active windows for fusion
        let active_windows = self.window_manager.get_active_windows();
        
        // Step 6: Perform cross-modal attention
        let active_windows_vec: Vec<_> = active_windows.iter().cloned().collect();
        let attention_result = self.compute_cross_modal_attention(&active_windows_vec)?;
        
        // Step 7: Progressive fusion
        let unified_representation = self.progressive_fusion(&active_windows_vec, &attention_result)?;
        
        // Step 8: Discover cross-modal connections
        let connections = self.discover_connections(&active_windows_vec, &attention_result)?;
        
        // Step 9: Identify emergent patterns
        let patterns = self.identify_patterns(&unified_representation, &connections).await?;
        
        // Step 10: Generate reasoning
        let reasoning = self.generate_reasoning(&unified_representation, &patterns);
        
        let processing_time = start_time.elapsed().as_millis() as u64;
        
        // Create fusion result
        let result = FusionResult {
            id: Uuid::new_v4(),
            unified_representation,
            cross_modal_connections: connections,
            emergent_patterns: patterns,
            confidence: self.calculate_confidence(&active_windows_vec),
            reasoning,
            processing_time_ms: processing_time,
        };
        
        // Update analytics
        self.update_analytics(&result, &input.modality).await;
        
        // Store in history
        self.fusion_history.write().await.push(result.clone());
        
        info!("✅ Fusion completed in {}ms with confidence {:.2}", 
              processing_time, result.confidence);
        
        Ok(result)
    }
    
    /// Compute cross-modal attention between windows
    fn compute_cross_modal_attention(
        &self,
        windows: &[ModalityWindow],
    ) -> Result<AttentionResult> {
        if windows.is_empty() {
            return Err(FusionError::invalid_input("No windows to process"));
        }
        
        // Prepare embeddings matrix
        let embedding_dim = self.config.embedding_dim;
        let num_windows = windows.len();
        
        let mut embeddings_matrix = DMatrix::zeros(embedding_dim, num_windows);
        
        for (i, window) in windows.iter().enumerate() {
            for (j, &value) in window.embeddings.iter().enumerate() {
                if j < embedding_dim {
                    embeddings_matrix[(j, i)] = value as f64;
                }
            }
        }
        
        // Compute attention using parallel processing
        let attention_weights = self.attention_module.compute_attention(&embeddings_matrix)?;
        
        Ok(AttentionResult {
            weights: attention_weights,
            window_ids: windows.iter().map(|w| w.id).collect(),
        })
    }
    
    /// Perform progressive fusion of multimodal features
    fn progressive_fusion(
        &self,
        windows: &[ModalityWindow],
        attention: &AttentionResult,
    ) -> Result<UnifiedRepresentation> {
        debug!("Performing progressive fusion on {} windows", windows.len());
        
        let embedding_dim = self.config.embedding_dim;
        
        // Initialize unified embeddings
        let mut unified_embeddings = vec![0.0f32; embedding_dim];
        
        // Aggregate embeddings weighted by attention
        for (window_idx, window) in windows.iter().enumerate() {
            let attention_weight = attention.get_weight(window_idx);
            
            for (i, &embedding_value) in window.embeddings.iter().enumerate() {
                if i < embedding_dim {
                    unified_embeddings[i] += embedding_value * attention_weight;
                }
            }
        }
        
        // Normalize
        let norm: f32 = unified_embeddings.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for embedding in &mut unified_embeddings {
                *embedding /= norm;
            }
        }
        
        // Calculate modality contributions
        let mut modality_contributions = HashMap::new();
        for window in windows {
            let contribution = modality_contributions
                .entry(window.modality.clone())
                .or_insert(0.0f32);
            *contribution += window.confidence;
        }
        
        // Normalize contributions
        let total_contribution: f32 = modality_contributions.values().sum();
        if total_contribution > 0.0 {
            for contribution in modality_contributions.values_mut() {
                *contribution /= total_contribution;
            }
        }
        
        // Extract semantic features using parallel processing
        let semantic_features = self.extract_semantic_features(windows)?;
        
        Ok(UnifiedRepresentation {
            embeddings: unified_embeddings,
            attention_weights: attention.weights.clone(),
            modality_contributions,
            semantic_features,
        })
    }
    
    /// Discover cross-modal connections
    fn discover_connections(
        &self,
        windows: &[ModalityWindow],
        attention: &AttentionResult,
    ) -> Result<Vec<CrossModalConnection>> {
        let mut connections = Vec::new();
        
        // Analyze pairwise connections
        let mut pairs = Vec::new();
        for (i, window1) in windows.iter().enumerate() {
            for (j, window2) in windows[i+1..].iter().enumerate() {
                if window1.modality != window2.modality {
                    pairs.push((i, i + j + 1, window1, window2));
                }
            }
        }
        
        for (idx1, idx2, window1, window2) in pairs {
            let strength = self.calculate_connection_strength(
                window1,
                window2,
                attention.get_pairwise_weight(idx1, idx2),
            );
            
            if strength > 0.3 {  // Threshold for significant connections
                let connection_type = self.determine_connection_type(window1, window2);
                
                connections.push(CrossModalConnection {
                    source_modality: window1.modality.clone(),
                    target_modality: window2.modality.clone(),
                    connection_type,
                    strength,
                    features: self.extract_connection_features(window1, window2),
                });
            }
        }
        
        Ok(connections)
    }
    
    /// Identify emergent patterns from fusion
    async fn identify_patterns(
        &self,
        unified: &UnifiedRepresentation,
        connections: &[CrossModalConnection],
    ) -> Result<Vec<Pattern>> {
        let mut patterns = Vec::new();
        
        // Check for synchronization patterns
        if let Some(sync_pattern) = self.detect_synchronization_pattern(connections) {
            patterns.push(sync_pattern);
        }
        
        // Check for correlation patterns
        if let Some(corr_pattern) = self.detect_correlation_pattern(unified) {
            patterns.push(corr_pattern);
        }
        
        // Check for anomaly patterns
        if let Some(anomaly) = self.detect_anomaly_pattern(unified, connections).await {
            patterns.push(anomaly);
        }
        
        Ok(patterns)
    }
    
    /// Generate reasoning explanations
    fn generate_reasoning(
        &self,
        unified: &UnifiedRepresentation,
        patterns: &[Pattern],
    ) -> Vec<String> {
        let mut reasoning = Vec::new();
        
        // Explain modality contributions
        for (modality, contribution) in &unified.modality_contributions {
            if *contribution > 0.2 {
                reasoning.push(format!(
                    "{:?} modality contributes {:.1}% to unified understanding",
                    modality,
                    contribution * 100.0
                ));
            }
        }
        
        // Explain discovered patterns
        for pattern in patterns {
            reasoning.push(format!(
                "Discovered {:?} pattern across {:?} with {:.1}% confidence",
                pattern.pattern_type,
                pattern.modalities,
                pattern.confidence * 100.0
            ));
        }
        
        reasoning
    }
    
    /// Calculate overall confidence score
    fn calculate_confidence(&self, windows: &[ModalityWindow]) -> f32 {
        if windows.is_empty() {
            return 0.0;
        }
        
        let avg_confidence: f32 = windows.iter()
            .map(|w| w.confidence)
            .sum::<f32>() / windows.len() as f32;
        
        // Adjust based on number of modalities
        let modality_diversity = windows.iter()
            .map(|w| &w.modality)
            .collect::<std::collections::HashSet<_>>()
            .len() as f32;
        
        let diversity_bonus = (modality_diversity / 5.0).min(0.2);
        
        (avg_confidence + diversity_bonus).min(1.0)
    }
    
    /// Extract semantic features from windows
    fn extract_semantic_features(
        &self,
        windows: &[ModalityWindow],
    ) -> Result<HashMap<String, Vec<f32>>> {
        let mut semantic_features = HashMap::new();
        
        // Aggregate features by type
        for window in windows {
            for (feature_name, feature) in &window.features {
                let entry = semantic_features
                    .entry(feature_name.clone())
                    .or_insert_with(Vec::new);
                entry.extend(&feature.values);
            }
        }
        
        // Normalize feature vectors
        for features in semantic_features.values_mut() {
            let norm: f32 = features.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm > 0.0 {
                for feature in features.iter_mut() {
                    *feature /= norm;
                }
            }
        }
        
        Ok(semantic_features)
    }
    
    /// Calculate connection strength between two windows
    fn calculate_connection_strength(
        &self,
        window1: &ModalityWindow,
        window2: &ModalityWindow,
        attention_weight: f32,
    ) -> f32 {
        // Cosine similarity between embeddings
        let dot_product: f32 = window1.embeddings.iter()
            .zip(window2.embeddings.iter())
            .map(|(a, b)| a * b)
            .sum();
        
        let norm1: f32 = window1.embeddings.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm2: f32 = window2.embeddings.iter().map(|x| x * x).sum::<f32>().sqrt();
        
        let cosine_sim = if norm1 > 0.0 && norm2 > 0.0 {
            dot_product / (norm1 * norm2)
        } else {
            0.0
        };
        
        // Combine with attention weight
        (cosine_sim * 0.7 + attention_weight * 0.3).max(0.0).min(1.0)
    }
    
    /// Determine the type of connection between modalities
    fn determine_connection_type(
        &self,
        window1: &ModalityWindow,
        window2: &ModalityWindow,
    ) -> ConnectionType {
        // Simplified heuristic - in production, use ML model
        let time_diff = (window1.timestamp - window2.timestamp).num_milliseconds().abs();
        
        if time_diff < 100 {
            ConnectionType::Temporal
        } else if window1.modality == Modality::Text && window2.modality == Modality::Vision {
            ConnectionType::Semantic
        } else if window1.modality == Modality::Audio && window2.modality == Modality::Vision {
            ConnectionType::Spatial
        } else {
            ConnectionType::Complementary
        }
    }
    
    /// Extract features that characterize a connection
    fn extract_connection_features(
        &self,
        window1: &ModalityWindow,
        window2: &ModalityWindow,
    ) -> Vec<String> {
        let mut features = Vec::new();
        
        // Get overlapping feature names
        for feature_name in window1.features.keys() {
            if window2.features.contains_key(feature_name) {
                features.push(feature_name.clone());
            }
        }
        
        features
    }
    
    /// Detect synchronization patterns
    fn detect_synchronization_pattern(
        &self,
        connections: &[CrossModalConnection],
    ) -> Option<Pattern> {
        let temporal_connections: Vec<_> = connections.iter()
            .filter(|c| matches!(c.connection_type, ConnectionType::Temporal))
            .collect();
        
        if temporal_connections.len() >= 2 {
            let modalities: Vec<_> = temporal_connections.iter()
                .flat_map(|c| vec![c.source_modality.clone(), c.target_modality.clone()])
                .collect::<std::collections::HashSet<_>>()
                .into_iter()
                .collect();
            
            Some(Pattern {
                id: Uuid::new_v4().to_string(),
                pattern_type: PatternType::Synchronization,
                modalities,
                confidence: 0.75,
                description: "Synchronized activity detected across modalities".to_string(),
            })
        } else {
            None
        }
    }
    
    /// Detect correlation patterns
    fn detect_correlation_pattern(
        &self,
        unified: &UnifiedRepresentation,
    ) -> Option<Pattern> {
        // Check if multiple modalities contribute significantly
        let significant_modalities: Vec<_> = unified.modality_contributions.iter()
            .filter(|(_, &contribution)| contribution > 0.3)
            .map(|(modality, _)| modality.clone())
            .collect();
        
        if significant_modalities.len() >= 2 {
            Some(Pattern {
                id: Uuid::new_v4().to_string(),
                pattern_type: PatternType::Correlation,
                modalities: significant_modalities,
                confidence: 0.65,
                description: "Strong correlation detected between modalities".to_string(),
            })
        } else {
            None
        }
    }
    
    /// Detect anomaly patterns
    async fn detect_anomaly_pattern(
        &self,
        unified: &UnifiedRepresentation,
        connections: &[CrossModalConnection],
    ) -> Option<Pattern> {
        // Check for unusual connection patterns
        let contradictory_connections: Vec<_> = connections.iter()
            .filter(|c| matches!(c.connection_type, ConnectionType::Contradictory))
            .collect();
        
        if !contradictory_connections.is_empty() {
            let modalities: Vec<_> = contradictory_connections.iter()
                .flat_map(|c| vec![c.source_modality.clone(), c.target_modality.clone()])
                .collect::<std::collections::HashSet<_>>()
                .into_iter()
                .collect();
            
            Some(Pattern {
                id: Uuid::new_v4().to_string(),
                pattern_type: PatternType::Anomaly,
                modalities,
                confidence: 0.8,
                description: "Anomalous pattern detected - contradictory signals".to_string(),
            })
        } else {
            None
        }
    }
    
    /// Update analytics
    async fn update_analytics(&self, result: &FusionResult, modality: &Modality) {
        let mut analytics = self.analytics.write().await;
        
        analytics.total_windows_processed += 1;
        analytics.fusion_operations += 1;
        
        // Update modality distribution
        *analytics.modality_distribution.entry(modality.clone()).or_insert(0) += 1;
        
        // Update pattern frequencies
        for pattern in &result.emergent_patterns {
            *analytics.pattern_frequencies.entry(pattern.pattern_type.clone()).or_insert(0) += 1;
        }
        
        // Update connection statistics
        analytics.connection_statistics.total_connections += result.cross_modal_connections.len() as u64;
        
        for connection in &result.cross_modal_connections {
            *analytics.connection_statistics
                .connection_type_distribution
                .entry(connection.connection_type.clone())
                .or_insert(0) += 1;
        }
        
        // Update average fusion time
        let total_ops = analytics.fusion_operations as f64;
        analytics.average_fusion_time_ms = 
            (analytics.average_fusion_time_ms * (total_ops - 1.0) + result.processing_time_ms as f64) / total_ops;
    }
    
    /// Perform cross-modal query
    pub async fn query_cross_modal(&self, query: CrossModalQuery) -> Result<QueryResult> {
        // Implementation for cross-modal queries
        // This would use the trained Q-Former to answer queries
        
        Ok(QueryResult {
            query_id: Uuid::new_v4(),
            results: vec![],
            confidence: 0.0,
            explanations: vec!["Query processing not yet implemented".to_string()],
        })
    }
    
    /// Get analytics
    pub async fn get_analytics(&self) -> FusionAnalytics {
        self.analytics.read().await.clone()
    }
    
    /// Health check
    pub async fn health_check(&self) -> HealthStatus {
        let active_windows = self.window_manager.get_active_windows().len();
        
        HealthStatus {
            healthy: true,
            status: "operational".to_string(),
            active_encoders: self.encoders.get_active_encoders(),
            memory_usage_mb: 0, // Would calculate actual memory usage
            processing_queue_size: active_windows,
        }
    }
}

/// Result from attention computation
struct AttentionResult {
    weights: Vec<Vec<f32>>,
    window_ids: Vec<Uuid>,
}

impl AttentionResult {
    fn get_weight(&self, idx: usize) -> f32 {
        if idx < self.weights.len() && !self.weights[idx].is_empty() {
            self.weights[idx].iter().sum::<f32>() / self.weights[idx].len() as f32
        } else {
            0.0
        }
    }
    
    fn get_pairwise_weight(&self, idx1: usize, idx2: usize) -> f32 {
        if idx1 < self.weights.len() && idx2 < self.weights[idx1].len() {
            self.weights[idx1][idx2]
        } else {
            0.0
        }
    }
}