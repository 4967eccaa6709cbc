//! Execution settings threaded explicitly into the configuration builder.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub executor: ExecutionSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Path of the machine definition to run.
    #[serde(default)]
    pub definition_file: Option<PathBuf>,
}

/// Settings that affect how a machine is built and executed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// Pause between two steps of `Executor::run`, in milliseconds. Must not be negative.
    #[serde(default)]
    pub execution_delay_ms: i64,
    /// Overrides the initial tape of the definition when present.
    #[serde(default)]
    pub initial_tape: Option<Vec<String>>,
    #[serde(default)]
    pub initial_index: i64,
    /// Maximum number of steps `Executor::run` performs before giving up.
    #[serde(default)]
    pub max_steps: Option<u64>,
}

impl ExecutionSettings {
    pub fn with_delay(mut self, delay_ms: i64) -> Self {
        self.execution_delay_ms = delay_ms;
        self
    }

    pub fn with_tape<S: Into<String>>(mut self, tape: Vec<S>, index: i64) -> Self {
        self.initial_tape = Some(tape.into_iter().map(Into::into).collect());
        self.initial_index = index;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_settings() {
        let json = r#"{
            "general": { "definition_file": "machines/busy-beaver-2.json" },
            "executor": { "execution_delay_ms": 250, "initial_tape": ["1", "1"], "max_steps": 50 }
        }"#;

        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(
            settings.general.definition_file,
            Some(PathBuf::from("machines/busy-beaver-2.json"))
        );
        assert_eq!(settings.executor.execution_delay_ms, 250);
        assert_eq!(
            settings.executor.initial_tape,
            Some(vec!["1".to_string(), "1".to_string()])
        );
        assert_eq!(settings.executor.initial_index, 0);
        assert_eq!(settings.executor.max_steps, Some(50));
    }

    #[test]
    fn test_builder_methods() {
        let settings = ExecutionSettings::default()
            .with_delay(10)
            .with_tape(vec!["a", "b"], 1)
            .with_max_steps(3);

        assert_eq!(settings.execution_delay_ms, 10);
        assert_eq!(
            settings.initial_tape,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(settings.initial_index, 1);
        assert_eq!(settings.max_steps, Some(3));
    }
}
