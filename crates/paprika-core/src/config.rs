//! Configuration loading and typed config structures for the Paprika agent.
//!
//! The canonical configuration lives in `paprika-config.yaml`. Every field
//! has a default, so an empty document (or a document naming only the
//! values to change) yields a complete [`AgentConfig`].

use core::time::Duration;
use std::path::Path;

use paprika_agents::{ActionSettings, ProbeConfig};
use serde::Deserialize;

/// Environment variable overriding `session.server_url`.
pub const ENV_SERVER_URL: &str = "PAPRIKA_SERVER_URL";

/// Environment variable overriding `session.auto_reconnect`.
pub const ENV_AUTO_RECONNECT: &str = "PAPRIKA_AUTO_RECONNECT";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgentConfig {
    /// Simulation tick settings.
    #[serde(default)]
    pub tick: TickConfig,

    /// Plan executor settings.
    #[serde(default)]
    pub executor: ExecutorConfig,

    /// Planner connection settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Action handler tunables.
    #[serde(default)]
    pub actions: ActionSettings,

    /// Occupancy probe used by the resource arbiter.
    #[serde(default)]
    pub arbiter: ProbeConfig,

    /// Perception snapshot settings.
    #[serde(default)]
    pub perception: PerceptionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// World settings.
    #[serde(default)]
    pub world: WorldConfig,
}

impl AgentConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the session:
    /// - `PAPRIKA_SERVER_URL` overrides `session.server_url`
    /// - `PAPRIKA_AUTO_RECONNECT` overrides `session.auto_reconnect`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.session.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Simulation tick configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TickConfig {
    /// Real-time milliseconds per tick.
    #[serde(default = "default_tick_interval_ms")]
    pub interval_ms: u64,
}

impl TickConfig {
    /// The tick interval.
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Plan executor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum time one step may hold the busy flag before the executor
    /// forces it idle and moves on.
    #[serde(default = "default_step_timeout_ms")]
    pub step_timeout_ms: u64,

    /// Pause after every step before the next one is dispatched.
    #[serde(default = "default_step_pacing_ms")]
    pub step_pacing_ms: u64,
}

impl ExecutorConfig {
    /// The per-step timeout.
    pub const fn step_timeout(&self) -> Duration {
        Duration::from_millis(self.step_timeout_ms)
    }

    /// The pause between steps.
    pub const fn step_pacing(&self) -> Duration {
        Duration::from_millis(self.step_pacing_ms)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            step_timeout_ms: default_step_timeout_ms(),
            step_pacing_ms: default_step_pacing_ms(),
        }
    }
}

/// Planner connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionConfig {
    /// WebSocket base URL; the session id is appended as a path segment.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Minimum time between perception snapshots.
    #[serde(default = "default_perception_interval_ms")]
    pub perception_interval_ms: u64,

    /// Whether to reconnect after the connection drops.
    #[serde(default = "default_true")]
    pub auto_reconnect: bool,

    /// First reconnect delay.
    #[serde(default = "default_reconnect_initial_backoff_ms")]
    pub reconnect_initial_backoff_ms: u64,

    /// Upper bound for the reconnect delay.
    #[serde(default = "default_reconnect_max_backoff_ms")]
    pub reconnect_max_backoff_ms: u64,

    /// A connection that stays up this long resets the backoff.
    #[serde(default = "default_stable_connection_ms")]
    pub stable_connection_ms: u64,
}

impl SessionConfig {
    /// Apply `PAPRIKA_SERVER_URL` and `PAPRIKA_AUTO_RECONNECT` from the
    /// process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// An auto-reconnect value that is not a recognizable boolean is
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_SERVER_URL) {
            self.server_url = url;
        }
        if let Some(flag) = lookup(ENV_AUTO_RECONNECT).as_deref().and_then(parse_flag) {
            self.auto_reconnect = flag;
        }
    }

    /// Minimum time between perception snapshots.
    pub const fn perception_interval(&self) -> Duration {
        Duration::from_millis(self.perception_interval_ms)
    }

    /// First reconnect delay.
    pub const fn reconnect_initial_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_initial_backoff_ms)
    }

    /// Upper bound for the reconnect delay.
    pub const fn reconnect_max_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_max_backoff_ms)
    }

    /// Uptime after which the backoff resets.
    pub const fn stable_connection(&self) -> Duration {
        Duration::from_millis(self.stable_connection_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            perception_interval_ms: default_perception_interval_ms(),
            auto_reconnect: true,
            reconnect_initial_backoff_ms: default_reconnect_initial_backoff_ms(),
            reconnect_max_backoff_ms: default_reconnect_max_backoff_ms(),
            stable_connection_ms: default_stable_connection_ms(),
        }
    }
}

/// Perception snapshot configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerceptionConfig {
    /// Radius around the agent in which interactables are sensed.
    #[serde(default = "default_vision_radius")]
    pub vision_radius: f32,

    /// Scenario mode tag sent with every snapshot.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Simulated day number.
    #[serde(default = "default_day")]
    pub day: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            vision_radius: default_vision_radius(),
            mode: default_mode(),
            day: default_day(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// World configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for wander destinations.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_step_timeout_ms() -> u64 {
    30_000
}

const fn default_step_pacing_ms() -> u64 {
    500
}

fn default_server_url() -> String {
    "ws://127.0.0.1:8000/api/ws/agent".to_owned()
}

const fn default_perception_interval_ms() -> u64 {
    1_000
}

const fn default_true() -> bool {
    true
}

const fn default_reconnect_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_reconnect_max_backoff_ms() -> u64 {
    30_000
}

const fn default_stable_connection_ms() -> u64 {
    60_000
}

const fn default_vision_radius() -> f32 {
    5.0
}

fn default_mode() -> String {
    "reality".to_owned()
}

const fn default_day() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_seed() -> u64 {
    42
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AgentConfig::parse("").unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.tick.interval(), Duration::from_millis(50));
        assert_eq!(config.executor.step_timeout(), Duration::from_secs(30));
        assert_eq!(config.executor.step_pacing(), Duration::from_millis(500));
        assert_eq!(config.session.server_url, "ws://127.0.0.1:8000/api/ws/agent");
        assert!(config.session.auto_reconnect);
        assert_eq!(config.perception.mode, "reality");
        assert_eq!(config.world.seed, 42);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let yaml = r"
executor:
  step_timeout_ms: 5000
actions:
  cook_timeout_ms: 45000
arbiter:
  probe_radius: 0.25
logging:
  json: true
";
        let config = AgentConfig::parse(yaml).unwrap();
        assert_eq!(config.executor.step_timeout(), Duration::from_secs(5));
        assert_eq!(config.executor.step_pacing_ms, 500);
        assert_eq!(config.actions.cook_timeout(), Duration::from_secs(45));
        assert_eq!(config.actions.chop_timeout_ms, 10_000);
        assert_eq!(config.arbiter, ProbeConfig {
            probe_height: 0.6,
            probe_radius: 0.25,
        });
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = AgentConfig::parse("executor: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = AgentConfig::from_file(Path::new("/nonexistent/paprika-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn overrides_replace_session_values() {
        let env: BTreeMap<&str, &str> = [
            (ENV_SERVER_URL, "ws://planner:9000/ws"),
            (ENV_AUTO_RECONNECT, "false"),
        ]
        .into_iter()
        .collect();
        let mut session = SessionConfig::default();
        session.apply_overrides(|key| env.get(key).map(|v| (*v).to_owned()));
        assert_eq!(session.server_url, "ws://planner:9000/ws");
        assert!(!session.auto_reconnect);
    }

    #[test]
    fn unrecognized_reconnect_flag_is_ignored() {
        let mut session = SessionConfig::default();
        session.apply_overrides(|key| (key == ENV_AUTO_RECONNECT).then(|| "maybe".to_owned()));
        assert!(session.auto_reconnect);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = AgentConfig::parse(include_str!("../../../paprika-config.yaml")).unwrap();
        assert_eq!(config, AgentConfig::default());
    }
}
