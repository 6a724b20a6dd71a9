//! Orchestration Monitoring and Metrics Collection
//!
//! This module provides monitoring capabilities for orchestration systems
//! including metrics collection and alert management.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Orchestration monitor for system health and performance
#[derive(Debug)]
pub struct OrchestrationMonitor {
    pub config: MonitoringConfig,
    pub metrics_collector: MetricsCollector,
    pub alert_manager: AlertManager,
}

/// Configuration for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub metrics_enabled: bool,
    pub tracing_enabled: bool,
    pub alerts_enabled: bool,
    pub dashboard_port: Option<u16>,
    pub export_interval_seconds: u64,
}

/// Metrics collection system
#[derive(Debug)]
pub struct MetricsCollector {
    pub metrics: HashMap<String, MetricValue>,
    pub collection_interval: Duration,
}

/// Alert management system
#[derive(Debug)]
pub struct AlertManager {
    pub alerts: Vec<Alert>,
    pub alert_rules: Vec<AlertRule>,
}

/// Metric values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetricValue {
    Counter(u64),
    Gauge(f64),
    Histogram(Vec<f64>),
}

/// Alert definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub severity: AlertSeverity,
    pub message: String,
    pub metric_name: String,
    pub threshold: f64,
}

/// Alert severity levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// Alert rule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRule {
    pub metric_name: String,
    pub threshold: f64,
    pub severity: AlertSeverity,
    pub condition: AlertCondition,
}

/// Alert conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlertCondition {
    GreaterThan,
    LessThan,
    Equal,
}

impl OrchestrationMonitor {
    pub fn new(config: MonitoringConfig) -> Self {
        Self {
            config,
            metrics_collector: MetricsCollector::new(),
            alert_manager: AlertManager::new(),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            metrics: HashMap::new(),
            collection_interval: Duration::from_secs(60),
        }
    }
}

impl AlertManager {
    pub fn new() -> Self {
        Self {
            alerts: Vec::new(),
            alert_rules: Vec::new(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            tracing_enabled: true,
            alerts_enabled: true,
            dashboard_port: Some(9090),
            export_interval_seconds: 60,
        }
    }
}