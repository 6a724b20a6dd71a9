//! Production-Grade Monitoring and Observability System
//!
//! This crate provides comprehensive monitoring, metrics collection, alerting,
//! distributed tracing, and observability for AI orchestration systems.

// Core monitoring module (currently implemented)
// Additional monitoring modules planned for future implementation:
// - tracing: Distributed tracing and request correlation
// - alerting: Alert management and notification system
// - dashboard: Real-time monitoring dashboard
// - recovery: Automated recovery and remediation
// - health: Advanced health checking and diagnostics
// - performance: Performance monitoring and optimization
// - security: Security monitoring and threat detection
// - audit: Audit logging and compliance tracking
//
// pub mod tracing;
// pub mod alerting;
// pub mod dashboard;
// pub mod recovery;
// pub mod health;
// pub mod performance;
// pub mod security;
// pub mod audit;
// pub mod telemetry;

// Re-exports - commented out until modules are implemented
// pub use metrics::{MetricsCollector, MetricsServer, MetricEvent};
// pub use tracing::{TracingSystem, TraceCollector, SpanContext};
// pub use alerting::{AlertManager, AlertRule, AlertNotification};
// pub use dashboard::{DashboardServer, DashboardConfig, WebSocketManager};
// pub use recovery::{RecoveryManager, CircuitBreaker, FailureDetector};
// pub use health::{HealthChecker, ServiceHealth, HealthStatus};
// pub use performance::{PerformanceMonitor, BenchmarkRunner, ProfileCollector};
// pub use security::{SecurityMonitor, ThreatDetector, SecurityEvent};
// pub use audit::{AuditLogger, ComplianceReporter, AuditEvent};
// pub use telemetry::{TelemetryCollector, OpenTelemetryExporter, MetricAggregator};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Metrics error: {0}")]
    MetricsError(String),

    #[error("Tracing error: {0}")]
    TracingError(String),

    #[error("Alert error: {0}")]
    AlertError(String),

    #[error("Health check failed: {0}")]
    HealthCheckError(String),

    #[error("Recovery operation failed: {0}")]
    RecoveryError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Security violation: {0}")]
    SecurityError(String),
}

/// Comprehensive monitoring system for AI orchestration
pub struct MonitoringSystem {
    pub metrics_collector: MetricsCollector,
    pub tracing_system: TracingSystem,
    pub alert_manager: AlertManager,
    pub dashboard_server: DashboardServer,
    pub recovery_manager: RecoveryManager,
    pub health_checker: HealthChecker,
    pub performance_monitor: PerformanceMonitor,
    pub security_monitor: SecurityMonitor,
    pub audit_logger: AuditLogger,
    pub telemetry_collector: TelemetryCollector,
    pub config: MonitoringConfig,
}

/// Configuration for the monitoring system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub metrics: MetricsConfig,
    pub tracing: TracingConfig,
    pub alerting: AlertingConfig,
    pub dashboard: DashboardConfig,
    pub recovery: RecoveryConfig,
    pub health: HealthConfig,
    pub performance: PerformanceConfig,
    pub security: SecurityConfig,
    pub audit: AuditConfig,
    pub telemetry: TelemetryConfig,
}

/// Metrics collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub collection_interval: Duration,
    pub retention_period: Duration,
    pub export_endpoints: Vec<ExportEndpoint>,
    pub custom_metrics: Vec<CustomMetricDefinition>,
    pub aggregation_rules: Vec<AggregationRule>,
}

/// Export endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEndpoint {
    pub name: String,
    pub endpoint_type: EndpointType,
    pub url: String,
    pub auth: Option<AuthConfig>,
    pub batch_size: usize,
    pub timeout: Duration,
}

/// Types of export endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EndpointType {
    Prometheus,
    InfluxDB,
    Grafana,
    ElasticSearch,
    Custom { format: String },
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub auth_type: AuthType,
    pub credentials: HashMap<String, String>,
    pub token_refresh_interval: Option<Duration>,
}

/// Authentication types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthType {
    ApiKey,
    Bearer,
    Basic,
    OAuth2,
    Custom,
}

/// Custom metric definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomMetricDefinition {
    pub name: String,
    pub metric_type: MetricType,
    pub description: String,
    pub labels: Vec<String>,
    pub collection_source: String,
    pub aggregation_method: AggregationMethod,
}

/// Types of metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetricType {
    Counter,
    Gauge,
    Histogram,
    Summary,
    Custom { type_name: String },
}

/// Aggregation methods for metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AggregationMethod {
    Sum,
    Average,
    Min,
    Max,
    Percentile { percentile: f64 },
    Count,
    Rate,
}

/// Aggregation rule for metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationRule {
    pub name: String,
    pub source_metrics: Vec<String>,
    pub aggregation_method: AggregationMethod,
    pub time_window: Duration,
    pub output_metric: String,
}

/// Tracing system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingConfig {
    pub enabled: bool,
    pub sampling_rate: f64,
    pub max_spans_per_trace: usize,
    pub trace_timeout: Duration,
    pub exporters: Vec<TraceExporter>,
    pub custom_attributes: HashMap<String, String>,
}

/// Trace exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceExporter {
    pub name: String,
    pub exporter_type: TraceExporterType,
    pub endpoint: String,
    pub batch_config: BatchConfig,
}

/// Types of trace exporters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TraceExporterType {
    Jaeger,
    Zipkin,
    OpenTelemetry,
    Custom { format: String },
}

/// Batch processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub max_batch_size: usize,
    pub max_queue_size: usize,
    pub batch_timeout: Duration,
    pub max_export_timeout: Duration,
}

/// Alerting system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertingConfig {
    pub enabled: bool,
    pub evaluation_interval: Duration,
    pub notification_channels: Vec<NotificationChannel>,
    pub alert_rules: Vec<AlertRuleConfig>,
    pub escalation_policies: Vec<EscalationPolicy>,
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationChannel {
    pub name: String,
    pub channel_type: NotificationChannelType,
    pub config: HashMap<String, String>,
    pub enabled: bool,
    pub rate_limit: Option<RateLimit>,
}

/// Types of notification channels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NotificationChannelType {
    Email,
    Slack,
    PagerDuty,
    Webhook,
    SMS,
    Discord,
    Custom { type_name: String },
}

/// Rate limiting for notifications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimit {
    pub max_notifications: usize,
    pub time_window: Duration,
    pub burst_size: usize,
}

/// Alert rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRuleConfig {
    pub name: String,
    pub description: String,
    pub condition: AlertCondition,
    pub severity: AlertSeverity,
    pub notification_channels: Vec<String>,
    pub evaluation_window: Duration,
    pub cooldown_period: Duration,
    pub enabled: bool,
}

/// Alert condition definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCondition {
    pub metric: String,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub aggregation_window: Duration,
    pub labels: HashMap<String, String>,
}

/// Comparison operators for alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComparisonOperator {
    GreaterThan,
    LessThan,
    Equals,
    NotEquals,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

/// Alert severity levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

/// Escalation policy for alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub name: String,
    pub stages: Vec<EscalationStage>,
    pub repeat_interval: Option<Duration>,
    pub max_escalations: Option<usize>,
}

/// Individual escalation stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationStage {
    pub delay: Duration,
    pub notification_channels: Vec<String>,
    pub message_template: Option<String>,
}

/// Recovery system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    pub enabled: bool,
    pub circuit_breaker: CircuitBreakerConfig,
    pub retry_policies: Vec<RetryPolicyConfig>,
    pub fallback_strategies: Vec<FallbackStrategy>,
    pub auto_recovery: AutoRecoveryConfig,
}

/// Circuit breaker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: usize,
    pub success_threshold: usize,
    pub timeout: Duration,
    pub half_open_timeout: Duration,
    pub slow_call_threshold: Duration,
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicyConfig {
    pub name: String,
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub retry_conditions: Vec<RetryCondition>,
}

/// Conditions that trigger retries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RetryCondition {
    ErrorCode { code: String },
    ErrorType { error_type: String },
    Custom { condition: String },
}

/// Fallback strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackStrategy {
    pub name: String,
    pub strategy_type: FallbackType,
    pub trigger_conditions: Vec<String>,
    pub config: HashMap<String, String>,
}

/// Types of fallback strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FallbackType {
    StaticResponse,
    CachedResponse,
    AlternativeService,
    DegradedService,
    Custom { strategy_name: String },
}

/// Auto-recovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoRecoveryConfig {
    pub enabled: bool,
    pub recovery_strategies: Vec<RecoveryStrategy>,
    pub health_check_interval: Duration,
    pub recovery_timeout: Duration,
}

/// Recovery strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryStrategy {
    pub name: String,
    pub strategy_type: RecoveryType,
    pub trigger_conditions: Vec<String>,
    pub success_criteria: Vec<String>,
    pub max_attempts: usize,
}

/// Types of recovery strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RecoveryType {
    ServiceRestart,
    ResourceCleanup,
    ConfigurationReload,
    CacheInvalidation,
    ConnectionReset,
    Custom { strategy_name: String },
}

/// Health checking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    pub enabled: bool,
    pub check_interval: Duration,
    pub timeout: Duration,
    pub health_checks: Vec<HealthCheckConfig>,
    pub dependency_checks: Vec<DependencyCheck>,
}

/// Individual health check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckConfig {
    pub name: String,
    pub check_type: HealthCheckType,
    pub endpoint: Option<String>,
    pub expected_response: Option<String>,
    pub timeout: Duration,
    pub critical: bool,
}

/// Types of health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HealthCheckType {
    Http { method: String, path: String },
    Tcp { port: u16 },
    Database { query: String },
    Custom { command: String },
}

/// Dependency health checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyCheck {
    pub name: String,
    pub service_name: String,
    pub critical: bool,
    pub check_config: HealthCheckConfig,
}

/// Performance monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    pub enabled: bool,
    pub sampling_rate: f64,
    pub profiling_interval: Duration,
    pub benchmark_suite: Vec<BenchmarkConfig>,
    pub performance_targets: Vec<PerformanceTarget>,
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub name: String,
    pub benchmark_type: BenchmarkType,
    pub duration: Duration,
    pub concurrency: usize,
    pub target_metrics: Vec<String>,
}

/// Types of benchmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BenchmarkType {
    LoadTest,
    StressTest,
    EnduranceTest,
    SpikeTest,
    VolumeTest,
    Custom { test_type: String },
}

/// Performance targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTarget {
    pub metric: String,
    pub target_value: f64,
    pub threshold_type: ThresholdType,
    pub measurement_window: Duration,
}

/// Types of performance thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThresholdType {
    Maximum,
    Minimum,
    Average,
    Percentile { percentile: f64 },
}

/// Security monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enabled: bool,
    pub threat_detection: ThreatDetectionConfig,
    pub access_monitoring: AccessMonitoringConfig,
    pub vulnerability_scanning: VulnerabilityConfig,
    pub compliance_monitoring: ComplianceConfig,
}

/// Threat detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatDetectionConfig {
    pub enabled: bool,
    pub detection_rules: Vec<DetectionRule>,
    pub anomaly_detection: AnomalyDetectionConfig,
    pub intelligence_feeds: Vec<ThreatIntelligenceFeed>,
}

/// Security detection rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRule {
    pub name: String,
    pub rule_type: DetectionRuleType,
    pub condition: String,
    pub severity: AlertSeverity,
    pub response_actions: Vec<String>,
}

/// Types of detection rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DetectionRuleType {
    Signature,
    Behavioral,
    Statistical,
    MachineLearning,
    Custom { rule_type: String },
}

/// Anomaly detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyDetectionConfig {
    pub enabled: bool,
    pub algorithms: Vec<AnomalyAlgorithm>,
    pub baseline_period: Duration,
    pub sensitivity: f64,
}

/// Anomaly detection algorithms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AnomalyAlgorithm {
    Statistical,
    MachineLearning,
    TimeSeriesAnalysis,
    ClusteringBased,
    Custom { algorithm_name: String },
}

/// Threat intelligence feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatIntelligenceFeed {
    pub name: String,
    pub url: String,
    pub update_interval: Duration,
    pub feed_format: String,
    pub auth: Option<AuthConfig>,
}

/// Access monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessMonitoringConfig {
    pub enabled: bool,
    pub log_all_access: bool,
    pub track_failed_attempts: bool,
    pub suspicious_activity_threshold: usize,
    pub privileged_access_alerts: bool,
}

/// Vulnerability scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityConfig {
    pub enabled: bool,
    pub scan_interval: Duration,
    pub scan_types: Vec<VulnerabilityScanType>,
    pub severity_thresholds: HashMap<String, AlertSeverity>,
}

/// Types of vulnerability scans
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VulnerabilityScanType {
    DependencyCheck,
    CodeAnalysis,
    ContainerScan,
    InfrastructureScan,
    Custom { scan_type: String },
}

/// Compliance monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    pub enabled: bool,
    pub frameworks: Vec<ComplianceFramework>,
    pub audit_interval: Duration,
    pub reporting_schedule: ReportingSchedule,
}

/// Compliance frameworks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComplianceFramework {
    SOX,
    GDPR,
    HIPAA,
    PCI_DSS,
    SOC2,
    ISO27001,
    Custom { framework_name: String },
}

/// Reporting schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingSchedule {
    pub frequency: ReportingFrequency,
    pub recipients: Vec<String>,
    pub report_formats: Vec<ReportFormat>,
}

/// Reporting frequencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportingFrequency {
    Real_Time,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Custom { interval: Duration },
}

/// Report formats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReportFormat {
    Json,
    Pdf,
    Html,
    Csv,
    Custom { format_name: String },
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    pub enabled: bool,
    pub log_level: AuditLogLevel,
    pub retention_period: Duration,
    pub encryption_enabled: bool,
    pub immutable_logging: bool,
    pub audit_categories: Vec<AuditCategory>,
}

/// Audit log levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditLogLevel {
    Minimal,
    Standard,
    Detailed,
    Comprehensive,
    Custom { categories: Vec<String> },
}

/// Categories of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditCategory {
    Authentication,
    Authorization,
    DataAccess,
    ConfigurationChange,
    SystemEvent,
    SecurityEvent,
    Custom { category_name: String },
}

/// Telemetry collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub collection_endpoints: Vec<TelemetryEndpoint>,
    pub data_retention: Duration,
    pub privacy_settings: PrivacySettings,
    pub export_format: ExportFormat,
}

/// Telemetry collection endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEndpoint {
    pub name: String,
    pub endpoint_type: TelemetryEndpointType,
    pub url: String,
    pub collection_interval: Duration,
    pub data_types: Vec<String>,
}

/// Types of telemetry endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEndpointType {
    OpenTelemetry,
    Custom { protocol: String },
}

/// Privacy settings for telemetry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacySettings {
    pub anonymize_data: bool,
    pub exclude_sensitive_fields: Vec<String>,
    pub data_minimization: bool,
    pub consent_required: bool,
}

/// Export format for telemetry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportFormat {
    OpenTelemetry,
    Json,
    Protobuf,
    Custom { format_name: String },
}

impl MonitoringSystem {
    /// Create a new monitoring system with configuration
    pub async fn new(config: MonitoringConfig) -> Result<Self, MonitoringError> {
        Ok(Self {
            metrics_collector: MetricsCollector::new(config.metrics.clone()).await?,
            tracing_system: TracingSystem::new(config.tracing.clone()).await?,
            alert_manager: AlertManager::new(config.alerting.clone()).await?,
            dashboard_server: DashboardServer::new(config.dashboard.clone()).await?,
            recovery_manager: RecoveryManager::new(config.recovery.clone()).await?,
            health_checker: HealthChecker::new(config.health.clone()).await?,
            performance_monitor: PerformanceMonitor::new(config.performance.clone()).await?,
            security_monitor: SecurityMonitor::new(config.security.clone()).await?,
            audit_logger: AuditLogger::new(config.audit.clone()).await?,
            telemetry_collector: TelemetryCollector::new(config.telemetry.clone()).await?,
            config,
        })
    }

    /// Start all monitoring subsystems
    pub async fn start(&self) -> Result<(), MonitoringError> {
        // Start metrics collection
        if self.config.metrics.enabled {
            self.metrics_collector.start().await?;
        }

        // Start tracing
        if self.config.tracing.enabled {
            self.tracing_system.start().await?;
        }

        // Start alerting
        if self.config.alerting.enabled {
            self.alert_manager.start().await?;
        }

        // Start dashboard
        self.dashboard_server.start().await?;

        // Start recovery manager
        if self.config.recovery.enabled {
            self.recovery_manager.start().await?;
        }

        // Start health checking
        if self.config.health.enabled {
            self.health_checker.start().await?;
        }

        // Start performance monitoring
        if self.config.performance.enabled {
            self.performance_monitor.start().await?;
        }

        // Start security monitoring
        if self.config.security.enabled {
            self.security_monitor.start().await?;
        }

        // Start audit logging
        if self.config.audit.enabled {
            self.audit_logger.start().await?;
        }

        // Start telemetry collection
        if self.config.telemetry.enabled {
            self.telemetry_collector.start().await?;
        }

        ::tracing::info!("Monitoring system started successfully");
        Ok(())
    }

    /// Shutdown all monitoring subsystems
    pub async fn shutdown(&self) -> Result<(), MonitoringError> {
        // Shutdown in reverse order
        self.telemetry_collector.shutdown().await?;
        self.audit_logger.shutdown().await?;
        self.security_monitor.shutdown().await?;
        self.performance_monitor.shutdown().await?;
        self.health_checker.shutdown().await?;
        self.recovery_manager.shutdown().await?;
        self.dashboard_server.shutdown().await?;
        self.alert_manager.shutdown().await?;
        self.tracing_system.shutdown().await?;
        self.metrics_collector.shutdown().await?;

        ::tracing::info!("Monitoring system shutdown complete");
        Ok(())
    }

    /// Get overall system status
    pub async fn get_system_status(&self) -> Result<SystemStatus, MonitoringError> {
        Ok(SystemStatus {
            metrics_status: self.metrics_collector.get_status().await?,
            tracing_status: self.tracing_system.get_status().await?,
            alerting_status: self.alert_manager.get_status().await?,
            dashboard_status: self.dashboard_server.get_status().await?,
            recovery_status: self.recovery_manager.get_status().await?,
            health_status: self.health_checker.get_overall_status().await?,
            performance_status: self.performance_monitor.get_status().await?,
            security_status: self.security_monitor.get_status().await?,
            audit_status: self.audit_logger.get_status().await?,
            telemetry_status: self.telemetry_collector.get_status().await?,
            timestamp: Utc::now(),
        })
    }
}

/// Overall system status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub metrics_status: ServiceStatus,
    pub tracing_status: ServiceStatus,
    pub alerting_status: ServiceStatus,
    pub dashboard_status: ServiceStatus,
    pub recovery_status: ServiceStatus,
    pub health_status: OverallHealthStatus,
    pub performance_status: ServiceStatus,
    pub security_status: ServiceStatus,
    pub audit_status: ServiceStatus,
    pub telemetry_status: ServiceStatus,
    pub timestamp: DateTime<Utc>,
}

/// Service status enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServiceStatus {
    Healthy,
    Degraded { reason: String },
    Unhealthy { error: String },
    Disabled,
    Starting,
    Stopping,
}

/// Overall health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallHealthStatus {
    pub status: HealthStatus,
    pub healthy_services: usize,
    pub total_services: usize,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics: MetricsConfig {
                enabled: true,
                collection_interval: Duration::from_secs(60),
                retention_period: Duration::from_secs(86400 * 7), // 7 days
                export_endpoints: Vec::new(),
                custom_metrics: Vec::new(),
                aggregation_rules: Vec::new(),
            },
            tracing: TracingConfig {
                enabled: true,
                sampling_rate: 0.1,
                max_spans_per_trace: 1000,
                trace_timeout: Duration::from_secs(300),
                exporters: Vec::new(),
                custom_attributes: HashMap::new(),
            },
            alerting: AlertingConfig {
                enabled: true,
                evaluation_interval: Duration::from_secs(30),
                notification_channels: Vec::new(),
                alert_rules: Vec::new(),
                escalation_policies: Vec::new(),
            },
            dashboard: DashboardConfig::default(),
            recovery: RecoveryConfig {
                enabled: true,
                circuit_breaker: CircuitBreakerConfig {
                    failure_threshold: 5,
                    success_threshold: 3,
                    timeout: Duration::from_secs(60),
                    half_open_timeout: Duration::from_secs(30),
                    slow_call_threshold: Duration::from_secs(5),
                },
                retry_policies: Vec::new(),
                fallback_strategies: Vec::new(),
                auto_recovery: AutoRecoveryConfig {
                    enabled: true,
                    recovery_strategies: Vec::new(),
                    health_check_interval: Duration::from_secs(30),
                    recovery_timeout: Duration::from_secs(300),
                },
            },
            health: HealthConfig {
                enabled: true,
                check_interval: Duration::from_secs(30),
                timeout: Duration::from_secs(5),
                health_checks: Vec::new(),
                dependency_checks: Vec::new(),
            },
            performance: PerformanceConfig {
                enabled: true,
                sampling_rate: 0.01,
                profiling_interval: Duration::from_secs(300),
                benchmark_suite: Vec::new(),
                performance_targets: Vec::new(),
            },
            security: SecurityConfig {
                enabled: true,
                threat_detection: ThreatDetectionConfig {
                    enabled: true,
                    detection_rules: Vec::new(),
                    anomaly_detection: AnomalyDetectionConfig {
                        enabled: true,
                        algorithms: vec![AnomalyAlgorithm::Statistical],
                        baseline_period: Duration::from_secs(86400), // 1 day
                        sensitivity: 0.8,
                    },
                    intelligence_feeds: Vec::new(),
                },
                access_monitoring: AccessMonitoringConfig {
                    enabled: true,
                    log_all_access: false,
                    track_failed_attempts: true,
                    suspicious_activity_threshold: 5,
                    privileged_access_alerts: true,
                },
                vulnerability_scanning: VulnerabilityConfig {
                    enabled: true,
                    scan_interval: Duration::from_secs(86400), // Daily
                    scan_types: vec![VulnerabilityScanType::DependencyCheck],
                    severity_thresholds: HashMap::new(),
                },
                compliance_monitoring: ComplianceConfig {
                    enabled: false,
                    frameworks: Vec::new(),
                    audit_interval: Duration::from_secs(3600), // Hourly
                    reporting_schedule: ReportingSchedule {
                        frequency: ReportingFrequency::Daily,
                        recipients: Vec::new(),
                        report_formats: vec![ReportFormat::Json],
                    },
                },
            },
            audit: AuditConfig {
                enabled: true,
                log_level: AuditLogLevel::Standard,
                retention_period: Duration::from_secs(86400 * 30), // 30 days
                encryption_enabled: true,
                immutable_logging: true,
                audit_categories: vec![
                    AuditCategory::Authentication,
                    AuditCategory::Authorization,
                    AuditCategory::SecurityEvent,
                ],
            },
            telemetry: TelemetryConfig {
                enabled: true,
                collection_endpoints: Vec::new(),
                data_retention: Duration::from_secs(86400 * 7), // 7 days
                privacy_settings: PrivacySettings {
                    anonymize_data: true,
                    exclude_sensitive_fields: vec!["password".to_string(), "token".to_string()],
                    data_minimization: true,
                    consent_required: false,
                },
                export_format: ExportFormat::OpenTelemetry,
            },
        }
    }
}
