//! Advanced Context Management System for LLM Router
//!
//! This module provides sophisticated context window management, intelligent
//! compression, semantic search, and adaptive context optimization.

use crate::{RouterError, models::Message};
use chrono::{DateTime, Utc};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque, BTreeMap};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use std::time::{Duration, Instant};

/// Advanced context manager with intelligent optimization
pub struct ContextManager {
    pub context_windows: Arc<RwLock<HashMap<Uuid, ContextWindow>>>,
    pub global_context: Arc<RwLock<GlobalContext>>,
    pub compression_engine: Arc<ContextCompression>,
    pub semantic_search: Arc<SemanticSearch>,
    pub optimization_engine: Arc<ContextOptimizer>,
    pub memory_manager: Arc<ContextMemoryManager>,
    pub analytics: Arc<ContextAnalytics>,
}

/// Context window for a specific conversation or session
pub struct ContextWindow {
    pub id: Uuid,
    pub session_id: String,
    pub messages: VecDeque<ContextMessage>,
    pub total_tokens: usize,
    pub max_tokens: usize,
    pub compression_ratio: f64,
    pub last_access: Instant,
    pub priority: ContextPriority,
    pub metadata: ContextMetadata,
    pub semantic_index: SemanticIndex,
    pub optimization_state: OptimizationState,
}

/// Enhanced message with context information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMessage {
    pub id: Uuid,
    pub content: String,
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
    pub tokens: usize,
    pub importance_score: f64,
    pub semantic_embedding: Option<Vec<f32>>,
    pub compression_level: CompressionLevel,
    pub relationships: Vec<MessageRelationship>,
    pub metadata: MessageMetadata,
}

/// Message roles in conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool { tool_name: String },
    Context { context_type: String },
}

/// Context priority levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ContextPriority {
    Critical,   // Must be preserved
    High,       // Important for context
    Normal,     // Standard priority
    Low,        // Can be compressed/removed
    Archive,    // Long-term storage only
}

/// Compression levels for messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompressionLevel {
    None,
    Light,      // Basic summarization
    Medium,     // Semantic compression
    Heavy,      // Aggressive compression
    Archive,    // Minimal essential information
}

/// Relationships between messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRelationship {
    pub relationship_type: RelationshipType,
    pub target_message_id: Uuid,
    pub strength: f64,
    pub created_at: DateTime<Utc>,
}

/// Types of message relationships
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelationshipType {
    Response,       // Direct response to message
    Reference,      // References another message
    Follow,         // Follows up on a topic
    Clarification,  // Clarifies a previous message
    Summary,        // Summarizes multiple messages
    Topic,          // Same topic discussion
}

/// Metadata for context messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageMetadata {
    pub source: String,
    pub confidence: f64,
    pub processing_time_ms: u64,
    pub model_used: Option<String>,
    pub quality_score: f64,
    pub tags: Vec<String>,
    pub language: Option<String>,
}

/// Context window metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextMetadata {
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub access_count: u64,
    pub compression_history: Vec<CompressionEvent>,
    pub optimization_history: Vec<OptimizationEvent>,
    pub performance_metrics: ContextPerformanceMetrics,
}

/// Compression event tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionEvent {
    pub timestamp: DateTime<Utc>,
    pub compression_type: CompressionType,
    pub tokens_before: usize,
    pub tokens_after: usize,
    pub quality_impact: f64,
}

/// Types of compression operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompressionType {
    Summarization,
    SemanticCompression,
    TokenPruning,
    MessageMerging,
    ArchivalCompression,
}

/// Optimization event tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationEvent {
    pub timestamp: DateTime<Utc>,
    pub optimization_type: OptimizationType,
    pub performance_impact: f64,
    pub resource_savings: ResourceSavings,
}

/// Types of context optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OptimizationType {
    WindowResize,
    MessageReordering,
    PriorityAdjustment,
    CacheOptimization,
    IndexRebuild,
}

/// Resource savings from optimization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceSavings {
    pub memory_saved_mb: f64,
    pub processing_time_saved_ms: u64,
    pub bandwidth_saved_bytes: u64,
    pub cost_saved: f64,
}

/// Performance metrics for context windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPerformanceMetrics {
    pub average_access_time_ms: f64,
    pub cache_hit_rate: f64,
    pub compression_efficiency: f64,
    pub semantic_search_accuracy: f64,
    pub memory_utilization: f64,
}

/// Global context across all sessions
pub struct GlobalContext {
    pub shared_knowledge: Arc<RwLock<SharedKnowledgeBase>>,
    pub conversation_patterns: Arc<ConversationPatterns>,
    pub topic_model: Arc<TopicModel>,
    pub user_preferences: Arc<RwLock<HashMap<String, UserPreferences>>>,
    pub system_context: SystemContext,
}

/// Shared knowledge base across conversations
pub struct SharedKnowledgeBase {
    pub facts: HashMap<String, KnowledgeFact>,
    pub entities: HashMap<String, Entity>,
    pub relationships: Vec<EntityRelationship>,
    pub version: u64,
    pub last_updated: DateTime<Utc>,
}

/// Individual knowledge fact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFact {
    pub id: Uuid,
    pub content: String,
    pub confidence: f64,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub access_count: u64,
    pub embedding: Option<Vec<f32>>,
}

/// Entity in the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    pub entity_type: EntityType,
    pub attributes: HashMap<String, serde_json::Value>,
    pub mentions: Vec<EntityMention>,
    pub embedding: Option<Vec<f32>>,
}

/// Types of entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityType {
    Person,
    Organization,
    Location,
    Product,
    Concept,
    Event,
    Custom { type_name: String },
}

/// Entity mention in context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub context_id: Uuid,
    pub message_id: Uuid,
    pub position: usize,
    pub confidence: f64,
    pub mention_type: MentionType,
}

/// Types of entity mentions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MentionType {
    Explicit,
    Implicit,
    Reference,
    Alias,
}

/// Relationship between entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRelationship {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub predicate: String,
    pub object_id: Uuid,
    pub confidence: f64,
    pub source_contexts: Vec<Uuid>,
}

/// Conversation pattern analysis
pub struct ConversationPatterns {
    pub common_flows: Vec<ConversationFlow>,
    pub topic_transitions: HashMap<String, Vec<TopicTransition>>,
    pub user_behavior_patterns: HashMap<String, BehaviorPattern>,
}

/// Common conversation flow
#[derive(Debug, Clone)]
pub struct ConversationFlow {
    pub id: Uuid,
    pub name: String,
    pub steps: Vec<FlowStep>,
    pub frequency: f64,
    pub success_rate: f64,
}

/// Individual step in conversation flow
#[derive(Debug, Clone)]
pub struct FlowStep {
    pub step_type: StepType,
    pub expected_duration: Duration,
    pub success_probability: f64,
    pub next_steps: Vec<Uuid>,
}

/// Types of conversation steps
#[derive(Debug, Clone)]
pub enum StepType {
    Question,
    Clarification,
    Information,
    Action,
    Summary,
    Transition,
}

/// Topic transition information
#[derive(Debug, Clone)]
pub struct TopicTransition {
    pub from_topic: String,
    pub to_topic: String,
    pub probability: f64,
    pub typical_trigger: String,
}

/// User behavior pattern
#[derive(Debug, Clone)]
pub struct BehaviorPattern {
    pub user_id: String,
    pub common_topics: Vec<String>,
    pub interaction_style: InteractionStyle,
    pub preferred_response_length: ResponseLengthPreference,
    pub time_patterns: TimePattern,
}

/// User interaction styles
#[derive(Debug, Clone)]
pub enum InteractionStyle {
    Direct,
    Conversational,
    Technical,
    Exploratory,
    TaskOriented,
}

/// Response length preferences
#[derive(Debug, Clone)]
pub enum ResponseLengthPreference {
    Brief,
    Moderate,
    Detailed,
    Comprehensive,
    Adaptive,
}

/// Time-based usage patterns
#[derive(Debug, Clone)]
pub struct TimePattern {
    pub active_hours: Vec<u8>, // Hours of day (0-23)
    pub session_duration_avg: Duration,
    pub response_time_expectation: Duration,
}

/// Topic modeling system
pub struct TopicModel {
    pub topics: HashMap<String, Topic>,
    pub topic_hierarchies: Vec<TopicHierarchy>,
    pub topic_evolution: TopicEvolution,
}

/// Individual topic
#[derive(Debug, Clone)]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub keywords: Vec<String>,
    pub frequency: f64,
    pub recent_activity: f64,
    pub related_topics: Vec<String>,
    pub embedding: Vec<f32>,
}

/// Topic hierarchy
#[derive(Debug, Clone)]
pub struct TopicHierarchy {
    pub parent_topic: String,
    pub child_topics: Vec<String>,
    pub hierarchy_type: HierarchyType,
}

/// Types of topic hierarchies
#[derive(Debug, Clone)]
pub enum HierarchyType {
    Taxonomic,
    Temporal,
    Causal,
    Semantic,
}

/// Topic evolution tracking
pub struct TopicEvolution {
    pub topic_lifecycle: HashMap<String, Vec<TopicEvent>>,
    pub emergence_patterns: Vec<EmergencePattern>,
    pub trend_analysis: TrendAnalysis,
}

/// Topic lifecycle events
#[derive(Debug, Clone)]
pub struct TopicEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: TopicEventType,
    pub intensity: f64,
}

/// Types of topic events
#[derive(Debug, Clone)]
pub enum TopicEventType {
    Emergence,
    Peak,
    Decline,
    Revival,
    Merge,
    Split,
}

/// Pattern of topic emergence
#[derive(Debug, Clone)]
pub struct EmergencePattern {
    pub trigger_conditions: Vec<String>,
    pub typical_duration: Duration,
    pub growth_rate: f64,
    pub peak_indicators: Vec<String>,
}

/// Trend analysis results
pub struct TrendAnalysis {
    pub trending_topics: Vec<TrendingTopic>,
    pub declining_topics: Vec<String>,
    pub stable_topics: Vec<String>,
    pub cyclical_patterns: Vec<CyclicalPattern>,
}

/// Trending topic information
#[derive(Debug, Clone)]
pub struct TrendingTopic {
    pub topic: String,
    pub growth_rate: f64,
    pub momentum: f64,
    pub predicted_peak: DateTime<Utc>,
}

/// Cyclical pattern in topics
#[derive(Debug, Clone)]
pub struct CyclicalPattern {
    pub topic: String,
    pub cycle_duration: Duration,
    pub peak_times: Vec<DateTime<Utc>>,
    pub amplitude: f64,
}

/// User-specific preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    pub preferred_context_length: usize,
    pub compression_tolerance: f64,
    pub response_style: ResponseStyle,
    pub privacy_settings: PrivacySettings,
    pub optimization_preferences: OptimizationPreferences,
}

/// Response style preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResponseStyle {
    Concise,
    Balanced,
    Detailed,
    Interactive,
    Custom { parameters: HashMap<String, f64> },
}

/// Privacy settings for context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub allow_cross_session_context: bool,
    pub allow_personalization: bool,
    pub data_retention_days: u32,
    pub allow_analytics: bool,
    pub encryption_required: bool,
}

/// User optimization preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationPreferences {
    pub prioritize_speed: bool,
    pub prioritize_accuracy: bool,
    pub allow_aggressive_compression: bool,
    pub cache_strategy: CacheStrategy,
}

/// Caching strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CacheStrategy {
    Conservative,
    Balanced,
    Aggressive,
    Custom { parameters: HashMap<String, f64> },
}

/// System-wide context
#[derive(Debug, Clone)]
pub struct SystemContext {
    pub current_time: DateTime<Utc>,
    pub system_load: f64,
    pub available_models: Vec<String>,
    pub resource_limits: ResourceLimits,
    pub configuration: SystemConfiguration,
}

/// Resource limits for context management
#[derive(Debug, Clone)]
pub struct ResourceLimits {
    pub max_total_tokens: usize,
    pub max_concurrent_contexts: usize,
    pub max_memory_mb: usize,
    pub max_cpu_percent: f64,
}

/// System configuration
#[derive(Debug, Clone)]
pub struct SystemConfiguration {
    pub default_context_window: usize,
    pub compression_threshold: f64,
    pub optimization_interval: Duration,
    pub analytics_enabled: bool,
}

/// Context compression engine
pub struct ContextCompression {
    pub summarization_model: Arc<SummarizationModel>,
    pub semantic_compressor: Arc<SemanticCompressor>,
    pub compression_strategies: Vec<CompressionStrategy>,
    pub quality_evaluator: Arc<CompressionQualityEvaluator>,
}

/// Summarization model for context compression
pub struct SummarizationModel {
    pub model_name: String,
    pub compression_ratios: HashMap<CompressionLevel, f64>,
    pub quality_thresholds: HashMap<CompressionLevel, f64>,
}

/// Semantic-aware compression
pub struct SemanticCompressor {
    pub embedding_model: Arc<EmbeddingModel>,
    pub cluster_analyzer: Arc<ClusterAnalyzer>,
    pub importance_scorer: Arc<ImportanceScorer>,
}

/// Compression strategies
#[derive(Debug, Clone)]
pub struct CompressionStrategy {
    pub name: String,
    pub strategy_type: CompressionStrategyType,
    pub trigger_conditions: TriggerConditions,
    pub expected_ratio: f64,
    pub quality_impact: f64,
}

/// Types of compression strategies
#[derive(Debug, Clone)]
pub enum CompressionStrategyType {
    TokenPruning { keep_ratio: f64 },
    Summarization { target_length: usize },
    SemanticClustering { num_clusters: usize },
    ImportanceBased { threshold: f64 },
    HybridApproach { strategies: Vec<String> },
}

/// Conditions that trigger compression
#[derive(Debug, Clone)]
pub struct TriggerConditions {
    pub token_threshold: Option<usize>,
    pub memory_threshold: Option<f64>,
    pub time_since_access: Option<Duration>,
    pub priority_threshold: Option<ContextPriority>,
}

/// Semantic search system
pub struct SemanticSearch {
    pub embedding_engine: Arc<EmbeddingEngine>,
    pub vector_index: Arc<RwLock<VectorIndex>>,
    pub search_cache: Arc<RwLock<LruCache<String, SearchResults>>>,
    pub query_optimizer: Arc<QueryOptimizer>,
}

/// Embedding generation engine
pub struct EmbeddingEngine {
    pub model_name: String,
    pub dimension: usize,
    pub batch_size: usize,
    pub cache: Arc<RwLock<LruCache<String, Vec<f32>>>>,
}

/// Vector index for semantic search
pub struct VectorIndex {
    pub vectors: HashMap<Uuid, IndexedVector>,
    pub metadata_index: BTreeMap<String, Vec<Uuid>>,
    pub similarity_threshold: f64,
}

/// Indexed vector with metadata
#[derive(Debug, Clone)]
pub struct IndexedVector {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub metadata: VectorMetadata,
    pub created_at: DateTime<Utc>,
}

/// Metadata for indexed vectors
#[derive(Debug, Clone)]
pub struct VectorMetadata {
    pub context_id: Uuid,
    pub message_id: Option<Uuid>,
    pub content_type: ContentType,
    pub importance: f64,
    pub tags: Vec<String>,
}

/// Types of content for vectors
#[derive(Debug, Clone)]
pub enum ContentType {
    Message,
    Summary,
    Entity,
    Topic,
    Relationship,
}

/// Search results from semantic search
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_matches: usize,
    pub search_time_ms: u64,
    pub cached: bool,
}

/// Individual search result
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: Uuid,
    pub content: String,
    pub similarity_score: f64,
    pub context_id: Uuid,
    pub relevance_factors: Vec<RelevanceFactor>,
}

/// Factors contributing to relevance
#[derive(Debug, Clone)]
pub enum RelevanceFactor {
    SemanticSimilarity { score: f64 },
    TemporalProximity { days_ago: f64 },
    ImportanceScore { score: f64 },
    UserPreference { preference_type: String, score: f64 },
    ContextRelevance { context_type: String, score: f64 },
}

/// Query optimization for semantic search
pub struct QueryOptimizer {
    pub query_expansion: Arc<QueryExpansion>,
    pub intent_classifier: Arc<IntentClassifier>,
    pub filter_optimizer: Arc<FilterOptimizer>,
}

/// Context optimization engine
pub struct ContextOptimizer {
    pub optimization_strategies: Vec<OptimizationStrategy>,
    pub performance_monitor: Arc<PerformanceMonitor>,
    pub resource_optimizer: Arc<ResourceOptimizer>,
    pub learning_engine: Arc<LearningEngine>,
}

/// Optimization strategy
#[derive(Debug, Clone)]
pub struct OptimizationStrategy {
    pub name: String,
    pub strategy_type: OptimizationStrategyType,
    pub trigger_conditions: Vec<OptimizationTrigger>,
    pub expected_improvement: PerformanceImprovement,
}

/// Types of optimization strategies
#[derive(Debug, Clone)]
pub enum OptimizationStrategyType {
    WindowSizing { dynamic: bool },
    MessagePrioritization,
    CacheOptimization,
    IndexOptimization,
    CompressionTuning,
    PrefetchStrategy,
}

/// Triggers for optimization
#[derive(Debug, Clone)]
pub enum OptimizationTrigger {
    PerformanceThreshold { metric: String, threshold: f64 },
    ResourceUsage { resource: String, threshold: f64 },
    UserFeedback { feedback_type: String },
    TimeInterval { interval: Duration },
    EventBased { event_type: String },
}

/// Expected performance improvement
#[derive(Debug, Clone)]
pub struct PerformanceImprovement {
    pub latency_reduction_percent: f64,
    pub memory_savings_percent: f64,
    pub accuracy_improvement_percent: f64,
    pub user_satisfaction_improvement: f64,
}

/// Context memory manager
pub struct ContextMemoryManager {
    pub memory_pools: HashMap<String, MemoryPool>,
    pub allocation_strategy: AllocationStrategy,
    pub garbage_collector: Arc<ContextGarbageCollector>,
    pub memory_monitor: Arc<MemoryMonitor>,
}

/// Memory pool for contexts
pub struct MemoryPool {
    pub pool_type: PoolType,
    pub total_size: usize,
    pub used_size: usize,
    pub allocated_contexts: HashMap<Uuid, MemoryAllocation>,
    pub fragmentation_level: f64,
}

/// Types of memory pools
#[derive(Debug, Clone)]
pub enum PoolType {
    HighPriority,
    Normal,
    Compressed,
    Archive,
    Temporary,
}

/// Memory allocation for context
#[derive(Debug, Clone)]
pub struct MemoryAllocation {
    pub context_id: Uuid,
    pub size_bytes: usize,
    pub allocated_at: Instant,
    pub last_access: Instant,
    pub access_count: u64,
}

/// Allocation strategies for memory
#[derive(Debug, Clone)]
pub enum AllocationStrategy {
    FirstFit,
    BestFit,
    WorstFit,
    BuddySystem,
    Slab,
}

/// Garbage collection for contexts
pub struct ContextGarbageCollector {
    pub collection_strategies: Vec<CollectionStrategy>,
    pub collection_schedule: CollectionSchedule,
    pub performance_impact_limit: f64,
}

/// Garbage collection strategies
#[derive(Debug, Clone)]
pub struct CollectionStrategy {
    pub strategy_type: CollectionType,
    pub trigger_conditions: CollectionTrigger,
    pub aggressiveness: f64,
}

/// Types of garbage collection
#[derive(Debug, Clone)]
pub enum CollectionType {
    MarkAndSweep,
    ReferenceCount,
    Generational,
    Incremental,
    Concurrent,
}

/// Triggers for garbage collection
#[derive(Debug, Clone)]
pub enum CollectionTrigger {
    MemoryThreshold { threshold: f64 },
    TimeInterval { interval: Duration },
    IdleTime { min_idle: Duration },
    FragmentationLevel { threshold: f64 },
}

/// Garbage collection schedule
#[derive(Debug, Clone)]
pub struct CollectionSchedule {
    pub minor_collection_interval: Duration,
    pub major_collection_interval: Duration,
    pub off_peak_hours: Vec<u8>,
    pub adaptive_scheduling: bool,
}

/// Memory monitoring
pub struct MemoryMonitor {
    pub metrics: Arc<RwLock<MemoryMetrics>>,
    pub alerts: Arc<RwLock<Vec<MemoryAlert>>>,
    pub historical_data: Arc<RwLock<VecDeque<MemorySnapshot>>>,
}

/// Memory usage metrics
#[derive(Debug, Clone)]
pub struct MemoryMetrics {
    pub total_allocated: usize,
    pub peak_usage: usize,
    pub fragmentation_ratio: f64,
    pub allocation_rate: f64,
    pub deallocation_rate: f64,
    pub cache_hit_ratio: f64,
}

/// Memory alerts
#[derive(Debug, Clone)]
pub struct MemoryAlert {
    pub alert_type: MemoryAlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub context_id: Option<Uuid>,
}

/// Types of memory alerts
#[derive(Debug, Clone)]
pub enum MemoryAlertType {
    HighUsage,
    MemoryLeak,
    Fragmentation,
    AllocationFailure,
    PerformanceDegradation,
}

/// Alert severity levels
#[derive(Debug, Clone)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
    Emergency,
}

/// Snapshot of memory state
#[derive(Debug, Clone)]
pub struct MemorySnapshot {
    pub timestamp: DateTime<Utc>,
    pub metrics: MemoryMetrics,
    pub active_contexts: usize,
    pub largest_context_size: usize,
    pub system_memory_available: usize,
}

/// Context analytics system
pub struct ContextAnalytics {
    pub usage_analyzer: Arc<UsageAnalyzer>,
    pub performance_analyzer: Arc<PerformanceAnalyzer>,
    pub pattern_detector: Arc<PatternDetector>,
    pub insight_generator: Arc<InsightGenerator>,
}

/// Usage pattern analysis
pub struct UsageAnalyzer {
    pub session_analytics: HashMap<String, SessionAnalytics>,
    pub global_usage_patterns: GlobalUsagePatterns,
    pub trend_detector: Arc<TrendDetector>,
}

/// Analytics for individual sessions
#[derive(Debug, Clone)]
pub struct SessionAnalytics {
    pub session_id: String,
    pub total_messages: usize,
    pub average_message_length: f64,
    pub session_duration: Duration,
    pub topics_discussed: Vec<String>,
    pub context_efficiency: f64,
    pub user_satisfaction: Option<f64>,
}

/// Global usage patterns across all contexts
#[derive(Debug, Clone)]
pub struct GlobalUsagePatterns {
    pub peak_usage_hours: Vec<u8>,
    pub common_conversation_flows: Vec<String>,
    pub popular_topics: Vec<String>,
    pub average_session_length: Duration,
    pub context_window_utilization: f64,
}

/// Trend detection system
pub struct TrendDetector {
    pub trend_models: HashMap<String, TrendModel>,
    pub anomaly_detector: Arc<AnomalyDetector>,
    pub forecast_engine: Arc<ForecastEngine>,
}

/// Trend model for specific metrics
#[derive(Debug, Clone)]
pub struct TrendModel {
    pub metric_name: String,
    pub trend_direction: TrendDirection,
    pub trend_strength: f64,
    pub seasonal_patterns: Vec<SeasonalPattern>,
    pub confidence_level: f64,
}

/// Direction of trends
#[derive(Debug, Clone)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Cyclical,
    Volatile,
}

/// Seasonal patterns in data
#[derive(Debug, Clone)]
pub struct SeasonalPattern {
    pub pattern_type: SeasonalType,
    pub amplitude: f64,
    pub phase_offset: f64,
    pub confidence: f64,
}

/// Types of seasonal patterns
#[derive(Debug, Clone)]
pub enum SeasonalType {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// State of context optimization
#[derive(Debug, Clone)]
pub struct OptimizationState {
    pub last_optimization: DateTime<Utc>,
    pub optimization_count: u32,
    pub current_efficiency: f64,
    pub pending_optimizations: Vec<String>,
    pub optimization_history: Vec<OptimizationEvent>,
}

/// Semantic index for context
pub struct SemanticIndex {
    pub message_embeddings: HashMap<Uuid, Vec<f32>>,
    pub topic_embeddings: HashMap<String, Vec<f32>>,
    pub entity_embeddings: HashMap<String, Vec<f32>>,
    pub similarity_cache: LruCache<String, f64>,
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextManager {
    /// Create a new context manager
    pub fn new() -> Self {
        Self {
            context_windows: Arc::new(RwLock::new(HashMap::new())),
            global_context: Arc::new(RwLock::new(GlobalContext::new())),
            compression_engine: Arc::new(ContextCompression::new()),
            semantic_search: Arc::new(SemanticSearch::new()),
            optimization_engine: Arc::new(ContextOptimizer::new()),
            memory_manager: Arc::new(ContextMemoryManager::new()),
            analytics: Arc::new(ContextAnalytics::new()),
        }
    }

    /// Create a new context window
    pub async fn create_context_window(
        &self,
        session_id: String,
        max_tokens: usize,
        priority: ContextPriority,
    ) -> Result<Uuid, RouterError> {
        let context_id = Uuid::new_v4();

        let context_window = ContextWindow {
            id: context_id,
            session_id: session_id.clone(),
            messages: VecDeque::new(),
            total_tokens: 0,
            max_tokens,
            compression_ratio: 1.0,
            last_access: Instant::now(),
            priority: priority.clone(),
            metadata: ContextMetadata {
                created_at: Utc::now(),
                last_modified: Utc::now(),
                access_count: 0,
                compression_history: Vec::new(),
                optimization_history: Vec::new(),
                performance_metrics: ContextPerformanceMetrics {
                    average_access_time_ms: 0.0,
                    cache_hit_rate: 1.0,
                    compression_efficiency: 1.0,
                    semantic_search_accuracy: 1.0,
                    memory_utilization: 0.0,
                },
            },
            semantic_index: SemanticIndex {
                message_embeddings: HashMap::new(),
                topic_embeddings: HashMap::new(),
                entity_embeddings: HashMap::new(),
                similarity_cache: LruCache::new(NonZeroUsize::new(1000).unwrap()),
            },
            optimization_state: OptimizationState {
                last_optimization: Utc::now(),
                optimization_count: 0,
                current_efficiency: 1.0,
                pending_optimizations: Vec::new(),
                optimization_history: Vec::new(),
            },
        };

        // Allocate memory for context
        self.memory_manager.allocate_context(context_id, max_tokens).await?;

        // Store context window
        self.context_windows.write().await.insert(context_id, context_window);

        tracing::info!(
            context_id = %context_id,
            session_id = %session_id,
            max_tokens = %max_tokens,
            priority = ?priority,
            "Context window created"
        );

        Ok(context_id)
    }

    /// Add message to context window
    pub async fn add_message(
        &self,
        context_id: Uuid,
        message: Message,
    ) -> Result<(), RouterError> {
        let mut contexts = self.context_windows.write().await;
        let context = contexts.get_mut(&context_id)
            .ok_or_else(|| RouterError::ContextError("Context not found".to_string()))?;

        // Create context message
        let context_message = ContextMessage {
            id: Uuid::new_v4(),
            content: message.content.clone(),
            role: self.convert_message_role(&message.role),
            timestamp: Utc::now(),
            tokens: self.estimate_tokens(&message.content),
            importance_score: self.calculate_importance_score(&message).await?,
            semantic_embedding: None, // Will be computed asynchronously
            compression_level: CompressionLevel::None,
            relationships: Vec::new(),
            metadata: MessageMetadata {
                source: "user_input".to_string(),
                confidence: 1.0,
                processing_time_ms: 0,
                model_used: None,
                quality_score: 1.0,
                tags: Vec::new(),
                language: None,
            },
        };

        // Check if context window is full
        let new_total_tokens = context.total_tokens + context_message.tokens;
        if new_total_tokens > context.max_tokens {
            // Trigger compression or cleanup
            self.optimize_context_window(context_id).await?;
        }

        // Add message
        context.messages.push_back(context_message.clone());
        context.total_tokens += context_message.tokens;
        context.last_access = Instant::now();
        context.metadata.last_modified = Utc::now();
        context.metadata.access_count += 1;

        // Generate semantic embedding asynchronously
        let semantic_search = Arc::clone(&self.semantic_search);
        let context_message_id = context_message.id;
        let content = message.content.clone();

        tokio::spawn(async move {
            if let Ok(_embedding) = semantic_search.generate_embedding(&content).await {
                // In a real implementation, we'd update the message with the embedding
                tracing::debug!("Generated embedding for message {}", context_message_id);
            }
        });

        Ok(())
    }

    /// Get context window messages
    pub async fn get_context(&self, context_id: Uuid) -> Result<Vec<ContextMessage>, RouterError> {
        let mut contexts = self.context_windows.write().await;
        let context = contexts.get_mut(&context_id)
            .ok_or_else(|| RouterError::ContextError("Context not found".to_string()))?;

        context.last_access = Instant::now();
        context.metadata.access_count += 1;

        Ok(context.messages.iter().cloned().collect())
    }

    /// Search context semantically
    pub async fn semantic_search(
        &self,
        context_id: Uuid,
        query: &str,
        max_results: usize,
    ) -> Result<SearchResults, RouterError> {
        self.semantic_search.search(context_id, query, max_results).await
    }

    /// Optimize context window
    pub async fn optimize_context_window(&self, context_id: Uuid) -> Result<(), RouterError> {
        self.optimization_engine.optimize_context(context_id).await
    }

    /// Get context analytics
    pub async fn get_analytics(&self, context_id: Uuid) -> Result<SessionAnalytics, RouterError> {
        self.analytics.get_session_analytics(context_id).await
    }

    /// Helper method to estimate tokens in text
    fn estimate_tokens(&self, text: &str) -> usize {
        // Simple estimation: approximately 4 characters per token
        (text.len() as f64 / 4.0).ceil() as usize
    }

    /// Convert message role
    fn convert_message_role(&self, role: &MessageRole) -> MessageRole {
        // For now, just return the role as-is since it's already a MessageRole
        role.clone()
    }

    /// Calculate importance score for message
    async fn calculate_importance_score(&self, message: &Message) -> Result<f64, RouterError> {
        // Simple importance scoring based on content length and complexity
        let length_score = (message.content.len() as f64 / 1000.0).min(1.0);
        let word_count = message.content.split_whitespace().count() as f64;
        let complexity_score = (word_count / 100.0).min(1.0);

        Ok((length_score + complexity_score) / 2.0)
    }
}

// Placeholder implementations for complex subsystems

impl GlobalContext {
    fn new() -> Self {
        Self {
            shared_knowledge: Arc::new(RwLock::new(SharedKnowledgeBase {
                facts: HashMap::new(),
                entities: HashMap::new(),
                relationships: Vec::new(),
                version: 1,
                last_updated: Utc::now(),
            })),
            conversation_patterns: Arc::new(ConversationPatterns {
                common_flows: Vec::new(),
                topic_transitions: HashMap::new(),
                user_behavior_patterns: HashMap::new(),
            }),
            topic_model: Arc::new(TopicModel {
                topics: HashMap::new(),
                topic_hierarchies: Vec::new(),
                topic_evolution: TopicEvolution {
                    topic_lifecycle: HashMap::new(),
                    emergence_patterns: Vec::new(),
                    trend_analysis: TrendAnalysis {
                        trending_topics: Vec::new(),
                        declining_topics: Vec::new(),
                        stable_topics: Vec::new(),
                        cyclical_patterns: Vec::new(),
                    },
                },
            }),
            user_preferences: Arc::new(RwLock::new(HashMap::new())),
            system_context: SystemContext {
                current_time: Utc::now(),
                system_load: 0.5,
                available_models: vec!["gpt-3.5-turbo".to_string(), "gpt-4".to_string()],
                resource_limits: ResourceLimits {
                    max_total_tokens: 1000000,
                    max_concurrent_contexts: 1000,
                    max_memory_mb: 4096,
                    max_cpu_percent: 80.0,
                },
                configuration: SystemConfiguration {
                    default_context_window: 4096,
                    compression_threshold: 0.8,
                    optimization_interval: Duration::from_secs(300),
                    analytics_enabled: true,
                },
            },
        }
    }
}

impl ContextCompression {
    fn new() -> Self {
        Self {
            summarization_model: Arc::new(SummarizationModel {
                model_name: "summarizer-v1".to_string(),
                compression_ratios: HashMap::new(),
                quality_thresholds: HashMap::new(),
            }),
            semantic_compressor: Arc::new(SemanticCompressor {
                embedding_model: Arc::new(EmbeddingModel {
                    model_name: "all-MiniLM-L6-v2".to_string(),
                    dimension: 384,
                }),
                cluster_analyzer: Arc::new(ClusterAnalyzer {}),
                importance_scorer: Arc::new(ImportanceScorer {}),
            }),
            compression_strategies: Vec::new(),
            quality_evaluator: Arc::new(CompressionQualityEvaluator {}),
        }
    }
}

impl SemanticSearch {
    fn new() -> Self {
        Self {
            embedding_engine: Arc::new(EmbeddingEngine {
                model_name: "all-MiniLM-L6-v2".to_string(),
                dimension: 384,
                batch_size: 32,
                cache: Arc::new(RwLock::new(LruCache::new(NonZeroUsize::new(10000).unwrap()))),
            }),
            vector_index: Arc::new(RwLock::new(VectorIndex {
                vectors: HashMap::new(),
                metadata_index: BTreeMap::new(),
                similarity_threshold: 0.7,
            })),
            search_cache: Arc::new(RwLock::new(LruCache::new(NonZeroUsize::new(1000).unwrap()))),
            query_optimizer: Arc::new(QueryOptimizer {
                query_expansion: Arc::new(QueryExpansion {}),
                intent_classifier: Arc::new(IntentClassifier {}),
                filter_optimizer: Arc::new(FilterOptimizer {}),
            }),
        }
    }

    async fn generate_embedding(&self, _text: &str) -> Result<Vec<f32>, RouterError> {
        // Placeholder: return dummy embedding
        Ok(vec![0.1; self.embedding_engine.dimension])
    }

    async fn search(
        &self,
        _context_id: Uuid,
        query: &str,
        _max_results: usize,
    ) -> Result<SearchResults, RouterError> {
        // Placeholder implementation
        Ok(SearchResults {
            query: query.to_string(),
            results: Vec::new(),
            total_matches: 0,
            search_time_ms: 10,
            cached: false,
        })
    }
}

impl ContextOptimizer {
    fn new() -> Self {
        Self {
            optimization_strategies: Vec::new(),
            performance_monitor: Arc::new(PerformanceMonitor {}),
            resource_optimizer: Arc::new(ResourceOptimizer {}),
            learning_engine: Arc::new(LearningEngine {}),
        }
    }

    async fn optimize_context(&self, context_id: Uuid) -> Result<(), RouterError> {
        tracing::info!(context_id = %context_id, "Optimizing context window");
        // Placeholder: actual optimization logic would go here
        Ok(())
    }
}

impl ContextMemoryManager {
    fn new() -> Self {
        Self {
            memory_pools: HashMap::new(),
            allocation_strategy: AllocationStrategy::BestFit,
            garbage_collector: Arc::new(ContextGarbageCollector {
                collection_strategies: Vec::new(),
                collection_schedule: CollectionSchedule {
                    minor_collection_interval: Duration::from_secs(60),
                    major_collection_interval: Duration::from_secs(300),
                    off_peak_hours: vec![2, 3, 4, 5],
                    adaptive_scheduling: true,
                },
                performance_impact_limit: 0.05,
            }),
            memory_monitor: Arc::new(MemoryMonitor {
                metrics: Arc::new(RwLock::new(MemoryMetrics {
                    total_allocated: 0,
                    peak_usage: 0,
                    fragmentation_ratio: 0.0,
                    allocation_rate: 0.0,
                    deallocation_rate: 0.0,
                    cache_hit_ratio: 1.0,
                })),
                alerts: Arc::new(RwLock::new(Vec::new())),
                historical_data: Arc::new(RwLock::new(VecDeque::new())),
            }),
        }
    }

    async fn allocate_context(&self, context_id: Uuid, size_tokens: usize) -> Result<(), RouterError> {
        tracing::debug!(context_id = %context_id, size_tokens = %size_tokens, "Allocating memory for context");
        // Placeholder: actual memory allocation logic would go here
        Ok(())
    }
}

impl ContextAnalytics {
    fn new() -> Self {
        Self {
            usage_analyzer: Arc::new(UsageAnalyzer {
                session_analytics: HashMap::new(),
                global_usage_patterns: GlobalUsagePatterns {
                    peak_usage_hours: vec![9, 10, 11, 14, 15, 16],
                    common_conversation_flows: Vec::new(),
                    popular_topics: Vec::new(),
                    average_session_length: Duration::from_secs(300),
                    context_window_utilization: 0.75,
                },
                trend_detector: Arc::new(TrendDetector {
                    trend_models: HashMap::new(),
                    anomaly_detector: Arc::new(AnomalyDetector {}),
                    forecast_engine: Arc::new(ForecastEngine {}),
                }),
            }),
            performance_analyzer: Arc::new(PerformanceAnalyzer {}),
            pattern_detector: Arc::new(PatternDetector {}),
            insight_generator: Arc::new(InsightGenerator {}),
        }
    }

    async fn get_session_analytics(&self, context_id: Uuid) -> Result<SessionAnalytics, RouterError> {
        // Placeholder implementation
        Ok(SessionAnalytics {
            session_id: context_id.to_string(),
            total_messages: 10,
            average_message_length: 50.0,
            session_duration: Duration::from_secs(300),
            topics_discussed: vec!["general".to_string()],
            context_efficiency: 0.85,
            user_satisfaction: Some(0.9),
        })
    }
}

// Placeholder structs for complex components

pub struct EmbeddingModel {
    pub model_name: String,
    pub dimension: usize,
}

pub struct ClusterAnalyzer;
pub struct ImportanceScorer;
pub struct CompressionQualityEvaluator;
pub struct QueryExpansion;
pub struct IntentClassifier;
pub struct FilterOptimizer;
pub struct PerformanceMonitor;
pub struct ResourceOptimizer;
pub struct LearningEngine;
pub struct PerformanceAnalyzer;
pub struct PatternDetector;
pub struct InsightGenerator;
pub struct AnomalyDetector;
pub struct ForecastEngine;
