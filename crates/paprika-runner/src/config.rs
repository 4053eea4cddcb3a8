//! Runner configuration.
//!
//! The runner reads the same `paprika-config.yaml` the simulation uses. The
//! file location comes from `PAPRIKA_CONFIG`; a missing file is not an
//! error, the documented defaults apply instead. Session overrides from the
//! environment are applied either way.

use std::path::{Path, PathBuf};

use paprika_core::AgentConfig;

use crate::error::RunnerError;

/// Environment variable naming the configuration file.
pub const ENV_CONFIG_PATH: &str = "PAPRIKA_CONFIG";

/// Configuration file used when `PAPRIKA_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "paprika-config.yaml";

/// Complete runner configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Where the configuration was looked for.
    pub path: PathBuf,
    /// Whether the file existed and was parsed.
    pub from_file: bool,
    /// The agent configuration, environment overrides applied.
    pub agent: AgentConfig,
}

impl RunnerConfig {
    /// Load configuration using the process environment.
    ///
    /// Variables:
    /// - `PAPRIKA_CONFIG` -- configuration file (default `paprika-config.yaml`)
    /// - `PAPRIKA_SERVER_URL` -- planner endpoint base URL
    /// - `PAPRIKA_AUTO_RECONNECT` -- reconnect after a dropped connection
    pub fn from_env() -> Result<Self, RunnerError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
        Self::load(&path)
    }

    /// Load configuration from `path`, falling back to defaults if the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self, RunnerError> {
        if path.exists() {
            return Ok(Self {
                path: path.to_path_buf(),
                from_file: true,
                agent: AgentConfig::from_file(path)?,
            });
        }
        let mut agent = AgentConfig::default();
        agent.session.apply_env_overrides();
        Ok(Self {
            path: path.to_path_buf(),
            from_file: false,
            agent,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = RunnerConfig::load(Path::new("does/not/exist.yaml")).unwrap();
        assert!(!config.from_file);
        assert_eq!(config.agent.tick.interval_ms, 50);
        assert_eq!(config.agent.executor.step_timeout_ms, 30_000);
    }

    #[test]
    fn file_is_parsed_when_present() {
        let path = std::env::temp_dir().join(format!(
            "paprika-runner-config-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "tick:\n  interval_ms: 20\nperception:\n  day: 3\n").unwrap();
        let config = RunnerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(config.from_file);
        assert_eq!(config.agent.tick.interval_ms, 20);
        assert_eq!(config.agent.perception.day, 3);
        assert_eq!(config.agent.executor.step_pacing_ms, 500);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let path = std::env::temp_dir().join(format!(
            "paprika-runner-bad-{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "tick: [unclosed\n").unwrap();
        let result = RunnerConfig::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(RunnerError::Config(_))));
    }
}
