//! Engine configuration: a serde-backed config struct loadable from a TOML
//! file or defaulted, mirroring this workspace's nested `Config`/`*Config`
//! sections.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Bounds both recursion and runaway LLM behavior. Step count is
    /// counted in agent invocations; planning counts as one.
    pub max_steps: usize,
    /// Deadline applied to every LLM adapter call; the engine wraps the
    /// injected adapter in a `TimeoutLlmAdapter` using this value.
    pub llm_timeout_seconds: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_steps: 50, llm_timeout_seconds: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventBusConfig {
    pub subscriber_buffer_size: usize,
    pub drop_log_events_under_backpressure: bool,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { subscriber_buffer_size: 256, drop_log_events_under_backpressure: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub execution: ExecutorConfig,
    #[serde(default)]
    pub event_bus: EventBusConfig,
}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|err| EngineError::Config(format!("failed to read {}: {err}", path.display())))?;
        let config: EngineConfig =
            toml::from_str(&contents).map_err(|err| EngineError::Config(format!("failed to parse {}: {err}", path.display())))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_satisfy_the_step_budget_note() {
        // max_steps must exceed N_tasks * small_constant; the example
        // workflows have <= 6 tasks.
        let config = EngineConfig::default();
        assert!(config.execution.max_steps > 6 * 2);
    }

    #[test]
    fn loads_partial_toml_with_defaults_for_missing_sections() {
        let dir = std::env::temp_dir().join(format!("workflow-engine-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.toml");
        std::fs::write(&path, "[execution]\nmax_steps = 10\nllm_timeout_seconds = 5\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.execution.max_steps, 10);
        assert_eq!(config.event_bus.subscriber_buffer_size, 256);
        std::fs::remove_dir_all(&dir).ok();
    }
}
