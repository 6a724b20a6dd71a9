//! Advanced Streaming Response System for LLM Router
//!
//! This module provides sophisticated streaming capabilities with real-time
//! response processing, intelligent buffering, and adaptive quality control.

use crate::{RouterError, models::{Message, Response}, providers::ProviderType};
use futures::{Stream, StreamExt, stream::BoxStream};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock, broadcast};
use tokio_stream::wrappers::{ReceiverStream, BroadcastStream};
use uuid::Uuid;

/// Advanced streaming response manager with quality control
pub struct StreamingManager {
    pub active_streams: Arc<RwLock<HashMap<Uuid, ActiveStream>>>,
    pub stream_metrics: Arc<RwLock<StreamMetrics>>,
    pub quality_controller: Arc<QualityController>,
    pub buffer_manager: Arc<BufferManager>,
    pub event_broadcaster: broadcast::Sender<StreamEvent>,
}

/// Active streaming session
pub struct ActiveStream {
    pub id: Uuid,
    pub provider: ProviderType,
    pub model: String,
    pub created_at: Instant,
    pub messages_sent: usize,
    pub tokens_streamed: usize,
    pub quality_score: f64,
    pub latency_ms: u64,
    pub status: StreamStatus,
    pub sender: mpsc::UnboundedSender<StreamChunk>,
    pub metadata: StreamMetadata,
}

/// Stream status enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamStatus {
    Initializing,
    Active { bytes_sent: usize },
    Buffering { buffer_size: usize },
    Throttled { reason: String },
    Completing,
    Completed { total_tokens: usize },
    Error { error: String },
}

/// Streaming metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamMetadata {
    pub request_id: Uuid,
    pub user_id: Option<String>,
    pub priority: StreamPriority,
    pub quality_requirements: QualityRequirements,
    pub timeout_seconds: u64,
    pub compression_enabled: bool,
    pub encryption_enabled: bool,
}

/// Stream priority levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamPriority {
    Low,
    Normal,
    High,
    Critical,
}

/// Quality requirements for streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRequirements {
    pub max_latency_ms: u64,
    pub min_throughput_tokens_per_second: f64,
    pub max_error_rate: f64,
    pub require_coherence_check: bool,
    pub require_safety_filter: bool,
}

/// Individual chunk in a stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub id: Uuid,
    pub stream_id: Uuid,
    pub sequence: usize,
    pub content: ChunkContent,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub metadata: ChunkMetadata,
}

/// Content types for stream chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChunkContent {
    Text { content: String },
    Delta { delta: String, cumulative: String },
    ToolCall { name: String, arguments: serde_json::Value },
    Metadata { key: String, value: serde_json::Value },
    Error { error: String, recoverable: bool },
    Complete { final_response: String, token_count: usize },
}

/// Metadata for individual chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub tokens_in_chunk: usize,
    pub cumulative_tokens: usize,
    pub quality_score: f64,
    pub processing_time_ms: u64,
    pub compressed: bool,
    pub encrypted: bool,
}

/// Stream events for monitoring and debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StreamEvent {
    StreamStarted { stream_id: Uuid, provider: String, model: String },
    ChunkReceived { stream_id: Uuid, chunk_id: Uuid, size: usize },
    QualityThresholdExceeded { stream_id: Uuid, metric: String, value: f64 },
    StreamBuffering { stream_id: Uuid, buffer_size: usize },
    StreamCompleted { stream_id: Uuid, total_tokens: usize, duration_ms: u64 },
    StreamError { stream_id: Uuid, error: String },
}

/// Comprehensive stream metrics
#[derive(Debug, Clone)]
pub struct StreamMetrics {
    pub active_streams: usize,
    pub total_streams_created: u64,
    pub total_tokens_streamed: u64,
    pub average_latency_ms: f64,
    pub average_throughput: f64,
    pub error_rate: f64,
    pub provider_performance: HashMap<ProviderType, ProviderStreamMetrics>,
}

/// Provider-specific streaming metrics
#[derive(Debug, Clone)]
pub struct ProviderStreamMetrics {
    pub streams_handled: u64,
    pub average_latency_ms: f64,
    pub tokens_per_second: f64,
    pub error_rate: f64,
    pub quality_score: f64,
}

/// Quality control system for streams
pub struct QualityController {
    pub thresholds: QualityThresholds,
    pub safety_filter: Arc<SafetyFilter>,
    pub coherence_checker: Arc<CoherenceChecker>,
    pub performance_monitor: Arc<PerformanceMonitor>,
}

/// Quality thresholds for different metrics
#[derive(Debug, Clone)]
pub struct QualityThresholds {
    pub max_latency_ms: u64,
    pub min_throughput_tokens_per_second: f64,
    pub max_error_rate: f64,
    pub min_coherence_score: f64,
    pub max_toxicity_score: f64,
}

/// Safety filtering system
pub struct SafetyFilter {
    pub toxicity_classifier: Arc<ToxicityClassifier>,
    pub content_policy: Arc<ContentPolicy>,
    pub rate_limiter: Arc<RwLock<RateLimiter>>,
}

/// Coherence checking for stream content
pub struct CoherenceChecker {
    pub context_window: usize,
    pub coherence_model: Arc<CoherenceModel>,
    pub topic_tracker: Arc<TopicTracker>,
}

/// Performance monitoring for streams
pub struct PerformanceMonitor {
    pub latency_tracker: Arc<RwLock<LatencyTracker>>,
    pub throughput_tracker: Arc<RwLock<ThroughputTracker>>,
    pub resource_monitor: Arc<ResourceMonitor>,
}

/// Buffer management for optimal streaming
pub struct BufferManager {
    pub adaptive_buffers: Arc<RwLock<HashMap<Uuid, AdaptiveBuffer>>>,
    pub global_buffer_pool: Arc<RwLock<BufferPool>>,
    pub compression_engine: Arc<CompressionEngine>,
}

/// Adaptive buffer for individual streams
pub struct AdaptiveBuffer {
    pub stream_id: Uuid,
    pub buffer: VecDeque<StreamChunk>,
    pub target_size: usize,
    pub current_size: usize,
    pub flush_threshold: usize,
    pub last_flush: Instant,
    pub adaptive_sizing: bool,
}

/// Global buffer pool for resource management
pub struct BufferPool {
    pub total_capacity: usize,
    pub used_capacity: usize,
    pub reserved_buffers: HashMap<StreamPriority, usize>,
    pub allocation_strategy: AllocationStrategy,
}

/// Buffer allocation strategies
#[derive(Debug, Clone)]
pub enum AllocationStrategy {
    FirstFit,
    BestFit,
    Priority,
    Adaptive { history_window: usize },
}

/// Streaming response wrapper
pub struct StreamingResponse {
    pub id: Uuid,
    pub stream: BoxStream<'static, Result<StreamChunk, RouterError>>,
    pub metadata: StreamMetadata,
}

impl StreamingManager {
    /// Create a new streaming manager
    pub fn new() -> Self {
        let (event_broadcaster, _) = broadcast::channel(1000);
        
        Self {
            active_streams: Arc::new(RwLock::new(HashMap::new())),
            stream_metrics: Arc::new(RwLock::new(StreamMetrics::new())),
            quality_controller: Arc::new(QualityController::new()),
            buffer_manager: Arc::new(BufferManager::new()),
            event_broadcaster,
        }
    }

    /// Create a new streaming response
    pub async fn create_stream(
        &self,
        provider: ProviderType,
        model: String,
        messages: Vec<Message>,
        metadata: StreamMetadata,
    ) -> Result<StreamingResponse, RouterError> {
        let stream_id = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded_channel();

        // Create active stream tracking
        let active_stream = ActiveStream {
            id: stream_id,
            provider: provider.clone(),
            model: model.clone(),
            created_at: Instant::now(),
            messages_sent: 0,
            tokens_streamed: 0,
            quality_score: 1.0,
            latency_ms: 0,
            status: StreamStatus::Initializing,
            sender,
            metadata: metadata.clone(),
        };

        // Register stream
        self.active_streams.write().await.insert(stream_id, active_stream);

        // Create adaptive buffer
        self.buffer_manager.create_buffer(stream_id, &metadata).await?;

        // Emit event
        self.emit_event(StreamEvent::StreamStarted {
            stream_id,
            provider: format!("{:?}", provider),
            model: model.clone(),
        }).await;

        // Start stream processing
        self.start_stream_processing(stream_id, provider, model, messages).await?;

        // Create response stream
        let receiver_stream = ReceiverStream::new(receiver);
        let processed_stream = self.create_processed_stream(stream_id, receiver_stream).await;

        Ok(StreamingResponse {
            id: stream_id,
            stream: Box::pin(processed_stream),
            metadata,
        })
    }

    /// Start processing a stream
    async fn start_stream_processing(
        &self,
        stream_id: Uuid,
        provider: ProviderType,
        model: String,
        messages: Vec<Message>,
    ) -> Result<(), RouterError> {
        let active_streams = Arc::clone(&self.active_streams);
        let quality_controller = Arc::clone(&self.quality_controller);
        let buffer_manager = Arc::clone(&self.buffer_manager);
        let event_broadcaster = self.event_broadcaster.clone();

        tokio::spawn(async move {
            if let Err(e) = Self::process_stream_internal(
                stream_id,
                provider,
                model,
                messages,
                active_streams,
                quality_controller,
                buffer_manager,
                event_broadcaster,
            ).await {
                tracing::error!(
                    stream_id = %stream_id,
                    error = %e,
                    "Stream processing failed"
                );
            }
        });

        Ok(())
    }

    /// Internal stream processing logic
    async fn process_stream_internal(
        stream_id: Uuid,
        provider: ProviderType,
        model: String,
        messages: Vec<Message>,
        active_streams: Arc<RwLock<HashMap<Uuid, ActiveStream>>>,
        quality_controller: Arc<QualityController>,
        buffer_manager: Arc<BufferManager>,
        event_broadcaster: broadcast::Sender<StreamEvent>,
    ) -> Result<(), RouterError> {
        // Simulate streaming response (in real implementation, this would call the actual provider)
        let mut sequence = 0;
        let total_chunks = 10; // Simulate 10 chunks
        
        for i in 0..total_chunks {
            let chunk_content = format!("This is chunk {} of the streaming response. ", i + 1);
            
            // Create chunk
            let chunk = StreamChunk {
                id: Uuid::new_v4(),
                stream_id,
                sequence,
                content: ChunkContent::Delta {
                    delta: chunk_content.clone(),
                    cumulative: format!("Response so far: {}", chunk_content),
                },
                timestamp: chrono::Utc::now(),
                metadata: ChunkMetadata {
                    tokens_in_chunk: chunk_content.split_whitespace().count(),
                    cumulative_tokens: sequence * 10, // Rough estimate
                    quality_score: 0.95,
                    processing_time_ms: 50,
                    compressed: false,
                    encrypted: false,
                },
            };

            // Quality check
            if !quality_controller.check_chunk_quality(&chunk).await? {
                tracing::warn!(
                    stream_id = %stream_id,
                    chunk_id = %chunk.id,
                    "Chunk failed quality check"
                );
                continue;
            }

            // Send chunk through buffer
            buffer_manager.process_chunk(stream_id, chunk.clone()).await?;

            // Update stream metrics
            {
                let mut streams = active_streams.write().await;
                if let Some(stream) = streams.get_mut(&stream_id) {
                    stream.messages_sent += 1;
                    stream.tokens_streamed += chunk.metadata.tokens_in_chunk;
                    
                    if let Err(e) = stream.sender.send(chunk.clone()) {
                        tracing::error!(
                            stream_id = %stream_id,
                            error = %e,
                            "Failed to send chunk to stream"
                        );
                        break;
                    }
                }
            }

            // Emit event
            let _ = event_broadcaster.send(StreamEvent::ChunkReceived {
                stream_id,
                chunk_id: chunk.id,
                size: chunk_content.len(),
            });

            sequence += 1;

            // Simulate processing delay
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        // Send completion chunk
        let completion_chunk = StreamChunk {
            id: Uuid::new_v4(),
            stream_id,
            sequence,
            content: ChunkContent::Complete {
                final_response: "Complete streaming response".to_string(),
                token_count: sequence * 10,
            },
            timestamp: chrono::Utc::now(),
            metadata: ChunkMetadata {
                tokens_in_chunk: 0,
                cumulative_tokens: sequence * 10,
                quality_score: 1.0,
                processing_time_ms: 10,
                compressed: false,
                encrypted: false,
            },
        };

        // Send completion chunk
        {
            let mut streams = active_streams.write().await;
            if let Some(stream) = streams.get_mut(&stream_id) {
                stream.status = StreamStatus::Completed {
                    total_tokens: sequence * 10,
                };
                let _ = stream.sender.send(completion_chunk);
            }
        }

        // Emit completion event
        let _ = event_broadcaster.send(StreamEvent::StreamCompleted {
            stream_id,
            total_tokens: sequence * 10,
            duration_ms: 1000, // Simulate 1 second duration
        });

        Ok(())
    }

    /// Create processed stream with quality control and buffering
    async fn create_processed_stream(
        &self,
        stream_id: Uuid,
        receiver_stream: ReceiverStream<StreamChunk>,
    ) -> impl Stream<Item = Result<StreamChunk, RouterError>> {
        let active_streams = Arc::clone(&self.active_streams);
        let quality_controller = Arc::clone(&self.quality_controller);
        let buffer_manager = Arc::clone(&self.buffer_manager);

        receiver_stream.then(move |chunk| {
            let active_streams = Arc::clone(&active_streams);
            let quality_controller = Arc::clone(&quality_controller);
            let buffer_manager = Arc::clone(&buffer_manager);

            async move {
                // Additional processing can be added here
                // Such as final quality checks, encryption, compression, etc.
                
                // For now, just pass through
                Ok(chunk)
            }
        })
    }

    /// Emit stream event
    async fn emit_event(&self, event: StreamEvent) {
        if let Err(e) = self.event_broadcaster.send(event) {
            tracing::debug!("No subscribers for stream event: {}", e);
        }
    }

    /// Get stream metrics
    pub async fn get_metrics(&self) -> StreamMetrics {
        self.stream_metrics.read().await.clone()
    }

    /// Subscribe to stream events
    pub fn subscribe_to_events(&self) -> BroadcastStream<StreamEvent> {
        BroadcastStream::new(self.event_broadcaster.subscribe())
    }
}

impl QualityController {
    pub fn new() -> Self {
        Self {
            thresholds: QualityThresholds {
                max_latency_ms: 5000,
                min_throughput_tokens_per_second: 10.0,
                max_error_rate: 0.05,
                min_coherence_score: 0.7,
                max_toxicity_score: 0.1,
            },
            safety_filter: Arc::new(SafetyFilter::new()),
            coherence_checker: Arc::new(CoherenceChecker::new()),
            performance_monitor: Arc::new(PerformanceMonitor::new()),
        }
    }

    pub async fn check_chunk_quality(&self, chunk: &StreamChunk) -> Result<bool, RouterError> {
        // Latency check
        if chunk.metadata.processing_time_ms > self.thresholds.max_latency_ms {
            return Ok(false);
        }

        // Quality score check
        if chunk.metadata.quality_score < self.thresholds.min_coherence_score {
            return Ok(false);
        }

        // Safety check
        if !self.safety_filter.check_content_safety(chunk).await? {
            return Ok(false);
        }

        // Coherence check (for text content)
        if let ChunkContent::Text { content } = &chunk.content {
            if !self.coherence_checker.check_coherence(content).await? {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

impl BufferManager {
    pub fn new() -> Self {
        Self {
            adaptive_buffers: Arc::new(RwLock::new(HashMap::new())),
            global_buffer_pool: Arc::new(RwLock::new(BufferPool::new())),
            compression_engine: Arc::new(CompressionEngine::new()),
        }
    }

    pub async fn create_buffer(&self, stream_id: Uuid, metadata: &StreamMetadata) -> Result<(), RouterError> {
        let target_size = match metadata.priority {
            StreamPriority::Critical => 1000,
            StreamPriority::High => 500,
            StreamPriority::Normal => 200,
            StreamPriority::Low => 100,
        };

        let buffer = AdaptiveBuffer {
            stream_id,
            buffer: VecDeque::new(),
            target_size,
            current_size: 0,
            flush_threshold: target_size / 2,
            last_flush: Instant::now(),
            adaptive_sizing: true,
        };

        self.adaptive_buffers.write().await.insert(stream_id, buffer);
        Ok(())
    }

    pub async fn process_chunk(&self, stream_id: Uuid, chunk: StreamChunk) -> Result<(), RouterError> {
        let mut buffers = self.adaptive_buffers.write().await;
        if let Some(buffer) = buffers.get_mut(&stream_id) {
            buffer.buffer.push_back(chunk);
            buffer.current_size += 1;

            // Check if we need to flush
            if buffer.current_size >= buffer.flush_threshold ||
               buffer.last_flush.elapsed() > Duration::from_millis(100) {
                self.flush_buffer(buffer).await?;
            }
        }
        Ok(())
    }

    async fn flush_buffer(&self, buffer: &mut AdaptiveBuffer) -> Result<(), RouterError> {
        // In a real implementation, this would optimize the buffer contents
        // For now, just reset
        buffer.current_size = 0;
        buffer.last_flush = Instant::now();
        Ok(())
    }
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            total_capacity: 10000,
            used_capacity: 0,
            reserved_buffers: HashMap::new(),
            allocation_strategy: AllocationStrategy::Priority,
        }
    }
}

impl StreamMetrics {
    pub fn new() -> Self {
        Self {
            active_streams: 0,
            total_streams_created: 0,
            total_tokens_streamed: 0,
            average_latency_ms: 0.0,
            average_throughput: 0.0,
            error_rate: 0.0,
            provider_performance: HashMap::new(),
        }
    }
}

// Placeholder implementations for complex subsystems

pub struct ToxicityClassifier;
impl ToxicityClassifier {
    pub fn new() -> Self { Self }
    pub async fn classify(&self, _text: &str) -> Result<f64, RouterError> {
        Ok(0.02) // Simulate low toxicity
    }
}

pub struct ContentPolicy;
impl ContentPolicy {
    pub fn new() -> Self { Self }
    pub async fn check_policy(&self, _text: &str) -> Result<bool, RouterError> {
        Ok(true) // Simulate policy compliance
    }
}

pub struct RateLimiter {
    pub requests_per_second: f64,
    pub last_request: Instant,
}

impl RateLimiter {
    pub fn new(rps: f64) -> Self {
        Self {
            requests_per_second: rps,
            last_request: Instant::now(),
        }
    }
}

impl SafetyFilter {
    pub fn new() -> Self {
        Self {
            toxicity_classifier: Arc::new(ToxicityClassifier::new()),
            content_policy: Arc::new(ContentPolicy::new()),
            rate_limiter: Arc::new(RwLock::new(RateLimiter::new(100.0))),
        }
    }

    pub async fn check_content_safety(&self, chunk: &StreamChunk) -> Result<bool, RouterError> {
        match &chunk.content {
            ChunkContent::Text { content } | ChunkContent::Delta { delta: content, .. } => {
                let toxicity_score = self.toxicity_classifier.classify(content).await?;
                if toxicity_score > 0.1 {
                    return Ok(false);
                }
                
                self.content_policy.check_policy(content).await
            },
            _ => Ok(true),
        }
    }
}

pub struct CoherenceModel;
impl CoherenceModel {
    pub fn new() -> Self { Self }
    pub async fn check_coherence(&self, _text: &str) -> Result<f64, RouterError> {
        Ok(0.85) // Simulate high coherence
    }
}

pub struct TopicTracker;
impl TopicTracker {
    pub fn new() -> Self { Self }
}

impl CoherenceChecker {
    pub fn new() -> Self {
        Self {
            context_window: 1000,
            coherence_model: Arc::new(CoherenceModel::new()),
            topic_tracker: Arc::new(TopicTracker::new()),
        }
    }

    pub async fn check_coherence(&self, text: &str) -> Result<bool, RouterError> {
        let score = self.coherence_model.check_coherence(text).await?;
        Ok(score > 0.7)
    }
}

pub struct LatencyTracker {
    pub measurements: VecDeque<u64>,
    pub max_samples: usize,
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self {
            measurements: VecDeque::new(),
            max_samples: 1000,
        }
    }

    pub fn record(&mut self, latency_ms: u64) {
        self.measurements.push_back(latency_ms);
        if self.measurements.len() > self.max_samples {
            self.measurements.pop_front();
        }
    }

    pub fn average(&self) -> f64 {
        if self.measurements.is_empty() {
            0.0
        } else {
            self.measurements.iter().sum::<u64>() as f64 / self.measurements.len() as f64
        }
    }
}

pub struct ThroughputTracker {
    pub token_counts: VecDeque<(Instant, usize)>,
    pub window_duration: Duration,
}

impl ThroughputTracker {
    pub fn new() -> Self {
        Self {
            token_counts: VecDeque::new(),
            window_duration: Duration::from_secs(60),
        }
    }

    pub fn record_tokens(&mut self, token_count: usize) {
        let now = Instant::now();
        self.token_counts.push_back((now, token_count));
        
        // Remove old entries
        while let Some(&(timestamp, _)) = self.token_counts.front() {
            if now.duration_since(timestamp) > self.window_duration {
                self.token_counts.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn tokens_per_second(&self) -> f64 {
        if self.token_counts.len() < 2 {
            return 0.0;
        }

        let total_tokens: usize = self.token_counts.iter().map(|(_, count)| count).sum();
        let duration = self.token_counts.back().unwrap().0
            .duration_since(self.token_counts.front().unwrap().0);
        
        total_tokens as f64 / duration.as_secs_f64()
    }
}

pub struct ResourceMonitor;
impl ResourceMonitor {
    pub fn new() -> Self { Self }
    pub async fn get_cpu_usage(&self) -> f64 { 45.0 }
    pub async fn get_memory_usage(&self) -> f64 { 60.0 }
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            latency_tracker: Arc::new(RwLock::new(LatencyTracker::new())),
            throughput_tracker: Arc::new(RwLock::new(ThroughputTracker::new())),
            resource_monitor: Arc::new(ResourceMonitor::new()),
        }
    }
}

pub struct CompressionEngine;
impl CompressionEngine {
    pub fn new() -> Self { Self }
    pub async fn compress(&self, data: &[u8]) -> Result<Vec<u8>, RouterError> {
        Ok(data.to_vec()) // Placeholder - no compression
    }
}

impl Default for QualityRequirements {
    fn default() -> Self {
        Self {
            max_latency_ms: 5000,
            min_throughput_tokens_per_second: 10.0,
            max_error_rate: 0.05,
            require_coherence_check: true,
            require_safety_filter: true,
        }
    }
}