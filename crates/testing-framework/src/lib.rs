//! Advanced Testing Framework for AI Orchestration Systems
//!
//! This crate provides comprehensive testing capabilities including stress testing,
//! synthetic workload generation, performance benchmarking, and chaos engineering.

// Advanced testing modules planned for future implementation:
// - stress: Load and stress testing capabilities
// - synthetic: Synthetic workload generation
// - benchmark: Performance benchmarking tools
// - chaos: Chaos engineering and fault injection
//
// pub mod stress;
// pub mod synthetic;
// pub mod benchmark;
// pub mod chaos;
// pub mod load;
// pub mod regression;
// pub mod integration;
// pub mod property;
// pub mod fuzzing;
// pub mod performance;
// pub mod reporting;

// Re-exports - commented out until modules are implemented
// pub use stress::{StressTester, StressTestConfig, StressTestResult};
// pub use synthetic::{SyntheticWorkloadGenerator, WorkloadPattern, WorkloadConfig};
// pub use benchmark::{BenchmarkRunner, BenchmarkSuite, BenchmarkResult};
// pub use chaos::{ChaosEngine, ChaosExperiment, ChaosResult};
// pub use load::{LoadTester, LoadTestConfig, LoadPattern};
// pub use regression::{RegressionTester, RegressionSuite, RegressionResult};
// pub use integration::{IntegrationTester, IntegrationTestSuite, IntegrationResult};
// pub use property::{PropertyTester, PropertyTestConfig, PropertyResult};
// pub use fuzzing::{FuzzTester, FuzzingConfig, FuzzResult};
// pub use performance::{PerformanceTester, PerformanceProfile, PerformanceMetrics};
// pub use reporting::{TestReporter, TestReport, ReportFormat};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TestingError {
    #[error("Test execution failed: {0}")]
    ExecutionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resource exhausted: {0}")]
    ResourceError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout error: {0}")]
    TimeoutError(String),

    #[error("Assertion failed: {0}")]
    AssertionError(String),

    #[error("Setup error: {0}")]
    SetupError(String),

    #[error("Teardown error: {0}")]
    TeardownError(String),
}

/// Comprehensive testing framework
pub struct TestingFramework {
    pub stress_tester: StressTester,
    pub synthetic_generator: SyntheticWorkloadGenerator,
    pub benchmark_runner: BenchmarkRunner,
    pub chaos_engine: ChaosEngine,
    pub load_tester: LoadTester,
    pub regression_tester: RegressionTester,
    pub integration_tester: IntegrationTester,
    pub property_tester: PropertyTester,
    pub fuzz_tester: FuzzTester,
    pub performance_tester: PerformanceTester,
    pub reporter: TestReporter,
    pub config: TestingConfig,
}

/// Configuration for the testing framework
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestingConfig {
    pub stress_testing: StressTestingConfig,
    pub synthetic_workloads: SyntheticWorkloadConfig,
    pub benchmarking: BenchmarkingConfig,
    pub chaos_engineering: ChaosEngineeringConfig,
    pub load_testing: LoadTestingConfig,
    pub regression_testing: RegressionTestingConfig,
    pub integration_testing: IntegrationTestingConfig,
    pub property_testing: PropertyTestingConfig,
    pub fuzz_testing: FuzzTestingConfig,
    pub performance_testing: PerformanceTestingConfig,
    pub reporting: ReportingConfig,
}

/// Stress testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestingConfig {
    pub enabled: bool,
    pub max_concurrent_users: usize,
    pub ramp_up_duration: Duration,
    pub test_duration: Duration,
    pub resource_limits: ResourceLimits,
    pub failure_thresholds: FailureThresholds,
    pub scenarios: Vec<StressScenario>,
}

/// Resource limits for testing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLimits {
    pub max_cpu_percent: f64,
    pub max_memory_mb: usize,
    pub max_network_mbps: u64,
    pub max_disk_io_mbps: u64,
}

/// Failure thresholds for testing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureThresholds {
    pub max_error_rate: f64,
    pub max_response_time_ms: u64,
    pub min_throughput_rps: f64,
    pub max_resource_usage: f64,
}

/// Stress testing scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    pub scenario_type: StressScenarioType,
    pub target_system: String,
    pub load_pattern: LoadPattern,
    pub duration: Duration,
    pub success_criteria: Vec<SuccessCriterion>,
}

/// Types of stress testing scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StressScenarioType {
    CpuIntensive,
    MemoryIntensive,
    NetworkIntensive,
    IoIntensive,
    ConcurrencyStress,
    ResourceExhaustion,
    Custom { scenario_type: String },
}

/// Success criteria for tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessCriterion {
    pub metric: String,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub measurement_window: Duration,
}

/// Comparison operators for success criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ComparisonOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equals,
    NotEquals,
}

/// Synthetic workload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticWorkloadConfig {
    pub enabled: bool,
    pub workload_patterns: Vec<WorkloadPatternConfig>,
    pub data_generators: Vec<DataGeneratorConfig>,
    pub user_behavior_models: Vec<UserBehaviorModel>,
    pub scaling_factors: ScalingFactors,
}

/// Workload pattern configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadPatternConfig {
    pub name: String,
    pub pattern_type: WorkloadPatternType,
    pub parameters: HashMap<String, f64>,
    pub duration: Duration,
    pub scaling_factor: f64,
}

/// Types of workload patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WorkloadPatternType {
    Constant,
    Linear,
    Exponential,
    Logarithmic,
    Sine,
    Sawtooth,
    Random,
    Realistic { model_name: String },
    Custom { pattern_name: String },
}

/// Data generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataGeneratorConfig {
    pub name: String,
    pub generator_type: DataGeneratorType,
    pub schema: DataSchema,
    pub generation_rate: f64,
    pub data_size_range: (usize, usize),
}

/// Types of data generators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataGeneratorType {
    Random,
    Sequential,
    Template,
    Realistic,
    Custom { generator_name: String },
}

/// Data schema definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSchema {
    pub fields: Vec<SchemaField>,
    pub constraints: Vec<DataConstraint>,
    pub relationships: Vec<DataRelationship>,
}

/// Schema field definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub nullable: bool,
    pub default_value: Option<serde_json::Value>,
    pub validation_rules: Vec<ValidationRule>,
}

/// Field types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldType {
    String { max_length: Option<usize> },
    Integer { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64> },
    Boolean,
    DateTime,
    Uuid,
    Json,
    Custom { type_name: String },
}

/// Validation rules for fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValidationRule {
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    Range { min: f64, max: f64 },
    OneOf(Vec<serde_json::Value>),
    Custom { rule_name: String, parameters: HashMap<String, String> },
}

/// Data constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DataConstraint {
    Unique { fields: Vec<String> },
    ForeignKey { field: String, reference_table: String, reference_field: String },
    Check { expression: String },
    Custom { constraint_name: String, definition: String },
}

/// Data relationships
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataRelationship {
    pub relationship_type: RelationshipType,
    pub source_field: String,
    pub target_table: String,
    pub target_field: String,
    pub cardinality: Cardinality,
}

/// Types of relationships
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// Cardinality constraints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Cardinality {
    Required,
    Optional,
    Multiple { min: usize, max: Option<usize> },
}

/// User behavior model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserBehaviorModel {
    pub name: String,
    pub behavior_type: BehaviorType,
    pub actions: Vec<UserAction>,
    pub transitions: Vec<ActionTransition>,
    pub session_characteristics: SessionCharacteristics,
}

/// Types of user behaviors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BehaviorType {
    Sequential,
    ProbabilisticFiniteAutomaton,
    MarkovChain,
    Custom { model_type: String },
}

/// User action definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAction {
    pub name: String,
    pub action_type: ActionType,
    pub parameters: HashMap<String, serde_json::Value>,
    pub expected_duration: Duration,
    pub success_probability: f64,
}

/// Types of user actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ActionType {
    HttpRequest,
    DatabaseQuery,
    FileOperation,
    Computation,
    Wait,
    Custom { action_type: String },
}

/// Action transition probabilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTransition {
    pub from_action: String,
    pub to_action: String,
    pub probability: f64,
    pub conditions: Vec<TransitionCondition>,
}

/// Conditions for action transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransitionCondition {
    TimeElapsed { min_seconds: u64 },
    ActionResult { expected_result: String },
    ResourceState { resource: String, condition: String },
    Custom { condition_name: String, parameters: HashMap<String, String> },
}

/// Session characteristics for user behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionCharacteristics {
    pub average_session_duration: Duration,
    pub session_duration_variance: f64,
    pub think_time_distribution: ThinkTimeDistribution,
    pub abandonment_rate: f64,
}

/// Think time distribution models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ThinkTimeDistribution {
    Constant { duration: Duration },
    Uniform { min: Duration, max: Duration },
    Normal { mean: Duration, std_dev: Duration },
    Exponential { lambda: f64 },
    Custom { distribution_name: String, parameters: HashMap<String, f64> },
}

/// Scaling factors for workloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingFactors {
    pub concurrent_users: f64,
    pub request_rate: f64,
    pub data_volume: f64,
    pub complexity_multiplier: f64,
}

/// Benchmarking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkingConfig {
    pub enabled: bool,
    pub benchmark_suites: Vec<BenchmarkSuiteConfig>,
    pub baseline_comparisons: Vec<BaselineConfig>,
    pub performance_targets: Vec<PerformanceTarget>,
    pub regression_detection: RegressionDetectionConfig,
}

/// Benchmark suite configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSuiteConfig {
    pub name: String,
    pub suite_type: BenchmarkSuiteType,
    pub benchmarks: Vec<BenchmarkConfig>,
    pub setup_actions: Vec<SetupAction>,
    pub teardown_actions: Vec<TeardownAction>,
}

/// Types of benchmark suites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BenchmarkSuiteType {
    Microbenchmark,
    MacroBenchmark,
    EndToEnd,
    Regression,
    Performance,
    Custom { suite_type: String },
}

/// Individual benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    pub name: String,
    pub benchmark_type: BenchmarkType,
    pub iterations: usize,
    pub warmup_iterations: usize,
    pub measurement_time: Duration,
    pub target_function: String,
    pub parameters: HashMap<String, serde_json::Value>,
}

/// Types of benchmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BenchmarkType {
    Latency,
    Throughput,
    Concurrency,
    Memory,
    Cpu,
    Custom { benchmark_type: String },
}

/// Setup actions for benchmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupAction {
    pub name: String,
    pub action_type: SetupActionType,
    pub parameters: HashMap<String, String>,
    pub timeout: Duration,
}

/// Types of setup actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SetupActionType {
    StartService,
    CreateDatabase,
    LoadData,
    ConfigureSystem,
    Custom { action_type: String },
}

/// Teardown actions for benchmarks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeardownAction {
    pub name: String,
    pub action_type: TeardownActionType,
    pub parameters: HashMap<String, String>,
    pub timeout: Duration,
}

/// Types of teardown actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TeardownActionType {
    StopService,
    CleanupData,
    ResetConfiguration,
    Custom { action_type: String },
}

/// Baseline configuration for comparisons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    pub name: String,
    pub baseline_type: BaselineType,
    pub source: BaselineSource,
    pub comparison_metrics: Vec<String>,
    pub tolerance_thresholds: HashMap<String, f64>,
}

/// Types of baselines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BaselineType {
    Historical,
    Control,
    Theoretical,
    Custom { baseline_type: String },
}

/// Sources of baseline data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BaselineSource {
    File { path: String },
    Database { query: String },
    Api { endpoint: String },
    Generated { generator: String },
}

/// Performance targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTarget {
    pub metric: String,
    pub target_value: f64,
    pub tolerance: f64,
    pub measurement_method: MeasurementMethod,
}

/// Methods for measuring performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MeasurementMethod {
    Average,
    Median,
    Percentile { percentile: f64 },
    Maximum,
    Minimum,
    Custom { method_name: String },
}

/// Regression detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionDetectionConfig {
    pub enabled: bool,
    pub detection_methods: Vec<RegressionDetectionMethod>,
    pub sensitivity: f64,
    pub historical_window: Duration,
}

/// Methods for detecting performance regressions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RegressionDetectionMethod {
    StatisticalTest { test_type: String, confidence_level: f64 },
    ThresholdBased { threshold_percent: f64 },
    TrendAnalysis { trend_window: usize },
    MachineLearning { model_type: String },
    Custom { method_name: String, parameters: HashMap<String, f64> },
}

/// Chaos engineering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosEngineeringConfig {
    pub enabled: bool,
    pub experiments: Vec<ChaosExperimentConfig>,
    pub safety_checks: Vec<SafetyCheck>,
    pub rollback_conditions: Vec<RollbackCondition>,
}

/// Chaos experiment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosExperimentConfig {
    pub name: String,
    pub experiment_type: ChaosExperimentType,
    pub target: ChaosTarget,
    pub duration: Duration,
    pub intensity: f64,
    pub hypothesis: String,
    pub success_criteria: Vec<SuccessCriterion>,
}

/// Types of chaos experiments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChaosExperimentType {
    ServiceFailure,
    NetworkPartition,
    ResourceExhaustion,
    Latency,
    PacketLoss,
    DiskFull,
    Custom { experiment_type: String },
}

/// Targets for chaos experiments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaosTarget {
    pub target_type: TargetType,
    pub identifier: String,
    pub selection_criteria: SelectionCriteria,
}

/// Types of chaos targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TargetType {
    Service,
    Container,
    Host,
    Network,
    Database,
    Custom { target_type: String },
}

/// Criteria for selecting chaos targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub labels: HashMap<String, String>,
    pub percentage: Option<f64>,
    pub random_selection: bool,
}

/// Safety checks for chaos experiments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyCheck {
    pub name: String,
    pub check_type: SafetyCheckType,
    pub threshold: f64,
    pub evaluation_interval: Duration,
}

/// Types of safety checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SafetyCheckType {
    HealthCheck,
    ErrorRate,
    ResponseTime,
    ResourceUsage,
    Custom { check_type: String },
}

/// Conditions for rolling back chaos experiments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackCondition {
    pub condition_type: RollbackConditionType,
    pub threshold: f64,
    pub evaluation_window: Duration,
}

/// Types of rollback conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RollbackConditionType {
    ErrorRateExceeded,
    ResponseTimeExceeded,
    HealthCheckFailed,
    ResourceExhausted,
    Custom { condition_type: String },
}

/// Load testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestingConfig {
    pub enabled: bool,
    pub test_scenarios: Vec<LoadTestScenario>,
    pub ramp_strategies: Vec<RampStrategy>,
    pub monitoring_config: MonitoringConfig,
}

/// Load test scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestScenario {
    pub name: String,
    pub scenario_type: LoadTestType,
    pub virtual_users: usize,
    pub ramp_up_time: Duration,
    pub test_duration: Duration,
    pub think_time: Duration,
    pub actions: Vec<LoadTestAction>,
}

/// Types of load tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoadTestType {
    Load,
    Stress,
    Spike,
    Volume,
    Endurance,
    Custom { test_type: String },
}

/// Load test actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestAction {
    pub name: String,
    pub action_type: LoadActionType,
    pub weight: f64,
    pub parameters: HashMap<String, serde_json::Value>,
    pub validation: Vec<ValidationRule>,
}

/// Types of load test actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LoadActionType {
    HttpRequest,
    DatabaseOperation,
    MessageQueue,
    FileOperation,
    Custom { action_type: String },
}

/// Ramp strategies for load tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RampStrategy {
    pub name: String,
    pub strategy_type: RampStrategyType,
    pub parameters: HashMap<String, f64>,
}

/// Types of ramp strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RampStrategyType {
    Linear,
    Exponential,
    Step,
    Custom { strategy_type: String },
}

/// Monitoring configuration for tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub metrics: Vec<MonitoredMetric>,
    pub alerts: Vec<AlertConfig>,
    pub dashboards: Vec<DashboardConfig>,
}

/// Monitored metric configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredMetric {
    pub name: String,
    pub metric_type: MonitoredMetricType,
    pub collection_interval: Duration,
    pub aggregation: AggregationType,
}

/// Types of monitored metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MonitoredMetricType {
    ResponseTime,
    Throughput,
    ErrorRate,
    ResourceUsage,
    Custom { metric_type: String },
}

/// Types of aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AggregationType {
    Sum,
    Average,
    Min,
    Max,
    Count,
    Percentile { percentile: f64 },
}

/// Alert configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    pub name: String,
    pub condition: AlertCondition,
    pub action: AlertAction,
}

/// Alert conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertCondition {
    pub metric: String,
    pub operator: ComparisonOperator,
    pub threshold: f64,
    pub duration: Duration,
}

/// Alert actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertAction {
    StopTest,
    SendNotification { channel: String },
    Custom { action: String },
}

/// Dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub name: String,
    pub panels: Vec<DashboardPanel>,
    pub refresh_interval: Duration,
}

/// Dashboard panel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardPanel {
    pub title: String,
    pub panel_type: PanelType,
    pub metrics: Vec<String>,
    pub time_range: Duration,
}

/// Types of dashboard panels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PanelType {
    Graph,
    Table,
    SingleStat,
    Heatmap,
    Custom { panel_type: String },
}

// Additional configuration structs for other testing types would be defined here...
// For brevity, I'll define simplified versions

/// Regression testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTestingConfig {
    pub enabled: bool,
    pub test_suites: Vec<String>,
    pub baseline_version: String,
    pub comparison_metrics: Vec<String>,
}

/// Integration testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationTestingConfig {
    pub enabled: bool,
    pub test_environments: Vec<TestEnvironment>,
    pub service_dependencies: Vec<ServiceDependency>,
}

/// Test environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEnvironment {
    pub name: String,
    pub environment_type: EnvironmentType,
    pub configuration: HashMap<String, String>,
}

/// Types of test environments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EnvironmentType {
    Local,
    Docker,
    Kubernetes,
    Cloud,
    Custom { environment_type: String },
}

/// Service dependency configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDependency {
    pub service_name: String,
    pub dependency_type: DependencyType,
    pub required: bool,
    pub mock_available: bool,
}

/// Types of service dependencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DependencyType {
    Database,
    ApiService,
    MessageQueue,
    Cache,
    Custom { dependency_type: String },
}

/// Property testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyTestingConfig {
    pub enabled: bool,
    pub test_cases: usize,
    pub shrinking_enabled: bool,
    pub max_shrink_iterations: usize,
}

/// Fuzz testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzTestingConfig {
    pub enabled: bool,
    pub fuzzing_strategies: Vec<FuzzingStrategy>,
    pub max_iterations: usize,
    pub timeout_per_iteration: Duration,
}

/// Fuzzing strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzingStrategy {
    pub name: String,
    pub strategy_type: FuzzingStrategyType,
    pub target_functions: Vec<String>,
    pub input_generators: Vec<InputGenerator>,
}

/// Types of fuzzing strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FuzzingStrategyType {
    Random,
    Mutation,
    Generation,
    Hybrid,
    Custom { strategy_type: String },
}

/// Input generators for fuzzing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputGenerator {
    pub name: String,
    pub generator_type: InputGeneratorType,
    pub parameters: HashMap<String, serde_json::Value>,
}

/// Types of input generators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputGeneratorType {
    Random,
    CorpusBased,
    Grammar,
    Custom { generator_type: String },
}

/// Performance testing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTestingConfig {
    pub enabled: bool,
    pub profiling_enabled: bool,
    pub memory_tracking: bool,
    pub cpu_profiling: bool,
    pub performance_budgets: Vec<PerformanceBudget>,
}

/// Performance budget definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceBudget {
    pub metric: String,
    pub budget: f64,
    pub enforcement: BudgetEnforcement,
}

/// Budget enforcement strategies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BudgetEnforcement {
    Warning,
    Error,
    Block,
    Custom { enforcement_type: String },
}

/// Reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    pub enabled: bool,
    pub output_formats: Vec<OutputFormat>,
    pub output_directory: String,
    pub include_charts: bool,
    pub include_raw_data: bool,
}

/// Output formats for reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Html,
    Json,
    Xml,
    Pdf,
    Csv,
    Custom { format_type: String },
}

impl TestingFramework {
    /// Create a new testing framework with configuration
    pub async fn new(config: TestingConfig) -> Result<Self, TestingError> {
        Ok(Self {
            stress_tester: StressTester::new(config.stress_testing.clone()).await?,
            synthetic_generator: SyntheticWorkloadGenerator::new(config.synthetic_workloads.clone()).await?,
            benchmark_runner: BenchmarkRunner::new(config.benchmarking.clone()).await?,
            chaos_engine: ChaosEngine::new(config.chaos_engineering.clone()).await?,
            load_tester: LoadTester::new(config.load_testing.clone()).await?,
            regression_tester: RegressionTester::new(config.regression_testing.clone()).await?,
            integration_tester: IntegrationTester::new(config.integration_testing.clone()).await?,
            property_tester: PropertyTester::new(config.property_testing.clone()).await?,
            fuzz_tester: FuzzTester::new(config.fuzz_testing.clone()).await?,
            performance_tester: PerformanceTester::new(config.performance_testing.clone()).await?,
            reporter: TestReporter::new(config.reporting.clone()).await?,
            config,
        })
    }

    /// Run all enabled test suites
    pub async fn run_all_tests(&self) -> Result<ComprehensiveTestResult, TestingError> {
        let mut results = ComprehensiveTestResult {
            stress_results: None,
            synthetic_results: None,
            benchmark_results: None,
            chaos_results: None,
            load_results: None,
            regression_results: None,
            integration_results: None,
            property_results: None,
            fuzz_results: None,
            performance_results: None,
            overall_status: TestStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            duration: Duration::from_secs(0),
        };

        let start_time = std::time::Instant::now();

        // Run stress tests
        if self.config.stress_testing.enabled {
            results.stress_results = Some(self.stress_tester.run_tests().await?);
        }

        // Run synthetic workload tests
        if self.config.synthetic_workloads.enabled {
            results.synthetic_results = Some(self.synthetic_generator.run_tests().await?);
        }

        // Run benchmarks
        if self.config.benchmarking.enabled {
            results.benchmark_results = Some(self.benchmark_runner.run_benchmarks().await?);
        }

        // Run chaos experiments
        if self.config.chaos_engineering.enabled {
            results.chaos_results = Some(self.chaos_engine.run_experiments().await?);
        }

        // Run load tests
        if self.config.load_testing.enabled {
            results.load_results = Some(self.load_tester.run_tests().await?);
        }

        // Run regression tests
        if self.config.regression_testing.enabled {
            results.regression_results = Some(self.regression_tester.run_tests().await?);
        }

        // Run integration tests
        if self.config.integration_testing.enabled {
            results.integration_results = Some(self.integration_tester.run_tests().await?);
        }

        // Run property tests
        if self.config.property_testing.enabled {
            results.property_results = Some(self.property_tester.run_tests().await?);
        }

        // Run fuzz tests
        if self.config.fuzz_testing.enabled {
            results.fuzz_results = Some(self.fuzz_tester.run_tests().await?);
        }

        // Run performance tests
        if self.config.performance_testing.enabled {
            results.performance_results = Some(self.performance_tester.run_tests().await?);
        }

        results.end_time = Some(Utc::now());
        results.duration = start_time.elapsed();
        results.overall_status = TestStatus::Completed;

        // Generate comprehensive report
        self.reporter.generate_comprehensive_report(&results).await?;

        Ok(results)
    }
}

/// Comprehensive test results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComprehensiveTestResult {
    pub stress_results: Option<StressTestResult>,
    pub synthetic_results: Option<SyntheticWorkloadResult>,
    pub benchmark_results: Option<BenchmarkResult>,
    pub chaos_results: Option<ChaosResult>,
    pub load_results: Option<LoadTestResult>,
    pub regression_results: Option<RegressionResult>,
    pub integration_results: Option<IntegrationResult>,
    pub property_results: Option<PropertyResult>,
    pub fuzz_results: Option<FuzzResult>,
    pub performance_results: Option<PerformanceTestResult>,
    pub overall_status: TestStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Duration,
}

/// Test status enumeration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

// Placeholder result types - these would be fully implemented in their respective modules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntheticWorkloadResult {
    pub workload_name: String,
    pub success: bool,
    pub duration: Duration,
    pub metrics: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadTestResult {
    pub scenario_name: String,
    pub success: bool,
    pub virtual_users: usize,
    pub duration: Duration,
    pub throughput: f64,
    pub error_rate: f64,
    pub response_times: ResponseTimeStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceTestResult {
    pub test_name: String,
    pub success: bool,
    pub duration: Duration,
    pub performance_metrics: HashMap<String, f64>,
}

impl Default for TestingConfig {
    fn default() -> Self {
        Self {
            stress_testing: StressTestingConfig {
                enabled: true,
                max_concurrent_users: 1000,
                ramp_up_duration: Duration::from_secs(300), // 5 minutes
                test_duration: Duration::from_secs(1800),   // 30 minutes
                resource_limits: ResourceLimits {
                    max_cpu_percent: 80.0,
                    max_memory_mb: 8192,
                    max_network_mbps: 1000,
                    max_disk_io_mbps: 500,
                },
                failure_thresholds: FailureThresholds {
                    max_error_rate: 0.05,        // 5%
                    max_response_time_ms: 5000,  // 5 seconds
                    min_throughput_rps: 10.0,    // 10 requests per second
                    max_resource_usage: 0.9,     // 90%
                },
                scenarios: Vec::new(),
            },
            synthetic_workloads: SyntheticWorkloadConfig {
                enabled: true,
                workload_patterns: Vec::new(),
                data_generators: Vec::new(),
                user_behavior_models: Vec::new(),
                scaling_factors: ScalingFactors {
                    concurrent_users: 1.0,
                    request_rate: 1.0,
                    data_volume: 1.0,
                    complexity_multiplier: 1.0,
                },
            },
            benchmarking: BenchmarkingConfig {
                enabled: true,
                benchmark_suites: Vec::new(),
                baseline_comparisons: Vec::new(),
                performance_targets: Vec::new(),
                regression_detection: RegressionDetectionConfig {
                    enabled: true,
                    detection_methods: vec![
                        RegressionDetectionMethod::ThresholdBased { threshold_percent: 10.0 }
                    ],
                    sensitivity: 0.8,
                    historical_window: Duration::from_secs(86400 * 7), // 7 days
                },
            },
            chaos_engineering: ChaosEngineeringConfig {
                enabled: false, // Disabled by default for safety
                experiments: Vec::new(),
                safety_checks: Vec::new(),
                rollback_conditions: Vec::new(),
            },
            load_testing: LoadTestingConfig {
                enabled: true,
                test_scenarios: Vec::new(),
                ramp_strategies: Vec::new(),
                monitoring_config: MonitoringConfig {
                    metrics: Vec::new(),
                    alerts: Vec::new(),
                    dashboards: Vec::new(),
                },
            },
            regression_testing: RegressionTestingConfig {
                enabled: true,
                test_suites: Vec::new(),
                baseline_version: "main".to_string(),
                comparison_metrics: vec![
                    "response_time".to_string(),
                    "throughput".to_string(),
                    "error_rate".to_string(),
                ],
            },
            integration_testing: IntegrationTestingConfig {
                enabled: true,
                test_environments: Vec::new(),
                service_dependencies: Vec::new(),
            },
            property_testing: PropertyTestingConfig {
                enabled: true,
                test_cases: 1000,
                shrinking_enabled: true,
                max_shrink_iterations: 100,
            },
            fuzz_testing: FuzzTestingConfig {
                enabled: true,
                fuzzing_strategies: Vec::new(),
                max_iterations: 10000,
                timeout_per_iteration: Duration::from_secs(30),
            },
            performance_testing: PerformanceTestingConfig {
                enabled: true,
                profiling_enabled: true,
                memory_tracking: true,
                cpu_profiling: true,
                performance_budgets: Vec::new(),
            },
            reporting: ReportingConfig {
                enabled: true,
                output_formats: vec![OutputFormat::Html, OutputFormat::Json],
                output_directory: "./test_reports".to_string(),
                include_charts: true,
                include_raw_data: true,
            },
        }
    }
}
