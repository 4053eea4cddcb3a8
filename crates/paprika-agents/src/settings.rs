//! Tunables shared by every action handler.
//!
//! Deserialized from the `actions` section of the agent configuration.
//! Timeouts are stored in milliseconds to keep the YAML readable.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Action handler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSettings {
    /// Maximum edge distance for pickup and put down.
    pub interaction_distance: f32,
    /// Maximum centre distance for chop and cook.
    pub process_interaction_distance: f32,
    /// Navigate handler timeout.
    pub navigate_timeout_ms: u64,
    /// Wander handler timeout.
    pub wander_timeout_ms: u64,
    /// Radius of the wander disc around the current position.
    pub wander_radius: f32,
    /// Attempts to find walkable ground for a wander destination.
    pub wander_attempts: u32,
    /// Search radius when snapping a destination onto walkable ground.
    pub ground_snap_radius: f32,
    /// Chop handler timeout.
    pub chop_timeout_ms: u64,
    /// Cook handler timeout.
    pub cook_timeout_ms: u64,
}

impl Default for ActionSettings {
    fn default() -> Self {
        Self {
            interaction_distance: 2.0,
            process_interaction_distance: 2.5,
            navigate_timeout_ms: 20_000,
            wander_timeout_ms: 10_000,
            wander_radius: 3.0,
            wander_attempts: 10,
            ground_snap_radius: 1.0,
            chop_timeout_ms: 10_000,
            cook_timeout_ms: 20_000,
        }
    }
}

impl ActionSettings {
    /// Navigate timeout as a [`Duration`].
    pub const fn navigate_timeout(&self) -> Duration {
        Duration::from_millis(self.navigate_timeout_ms)
    }

    /// Wander timeout as a [`Duration`].
    pub const fn wander_timeout(&self) -> Duration {
        Duration::from_millis(self.wander_timeout_ms)
    }

    /// Chop timeout as a [`Duration`].
    pub const fn chop_timeout(&self) -> Duration {
        Duration::from_millis(self.chop_timeout_ms)
    }

    /// Cook timeout as a [`Duration`].
    pub const fn cook_timeout(&self) -> Duration {
        Duration::from_millis(self.cook_timeout_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: ActionSettings = serde_json::from_str(r#"{"cook_timeout_ms": 45000}"#).unwrap();
        assert_eq!(settings.cook_timeout(), Duration::from_secs(45));
        assert_eq!(settings.navigate_timeout(), Duration::from_secs(20));
        assert_eq!(settings.wander_attempts, 10);
    }
}
