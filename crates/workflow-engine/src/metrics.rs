//! A minimal in-process metrics snapshot. There is no Prometheus/
//! OpenTelemetry wiring here, but the counters use the same
//! `HashMap<String, MetricValue>` shape as
//! `agent_orchestrator::monitor::MetricsCollector` so a real exporter
//! could be bolted on without reshaping this type.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MetricValue {
    Counter(u64),
}

#[derive(Debug, Clone, Default)]
pub struct OrchestrationMetrics {
    inner: Arc<Mutex<HashMap<String, MetricValue>>>,
}

impl OrchestrationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn incr(&self, name: &str) {
        let mut guard = self.inner.lock();
        match guard.get_mut(name) {
            Some(MetricValue::Counter(n)) => *n += 1,
            None => {
                guard.insert(name.to_string(), MetricValue::Counter(1));
            }
        }
    }

    pub fn workflow_started(&self) {
        self.incr("workflows_started");
    }

    pub fn workflow_completed(&self) {
        self.incr("workflows_completed");
    }

    pub fn workflow_blocked(&self) {
        self.incr("workflows_blocked");
    }

    pub fn workflow_failed(&self) {
        self.incr("workflows_failed");
    }

    pub fn tool_call(&self) {
        self.incr("tool_calls_total");
    }

    pub fn snapshot(&self) -> HashMap<String, MetricValue> {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let metrics = OrchestrationMetrics::new();
        metrics.workflow_started();
        metrics.workflow_started();
        metrics.workflow_completed();
        let snapshot = metrics.snapshot();
        assert!(matches!(snapshot.get("workflows_started"), Some(MetricValue::Counter(2))));
        assert!(matches!(snapshot.get("workflows_completed"), Some(MetricValue::Counter(1))));
    }
}
