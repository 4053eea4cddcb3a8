//! Perception payload sent to the planner.
//!
//! The perception is the **only** information the planner receives about the
//! kitchen. It is sent at most once per perception interval and never while a
//! plan is outstanding, so the planner always sees a settled world.

use serde::{Deserialize, Serialize};

/// Outcome of the previous action, as remembered by the agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// No action has completed yet.
    #[default]
    None,
    /// The last action reported success.
    Success,
    /// The last action reported failure.
    Failure,
}

impl ActionStatus {
    /// Wire representation (`"none"`, `"success"`, `"failure"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl core::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A world-space position on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate.
    pub x: f32,
    /// Y (up) coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

/// One sensed entity near the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    /// Entity name, usable as an action target.
    pub id: String,
    /// Coarse entity kind (`Prop`, `Supply`, `Surface`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Entity position.
    pub position: Position,
    /// Distance from the agent.
    pub distance: f32,
    /// Station condition (`empty`, `holding:onion`, `ready`, ...).
    pub state: String,
}

/// The complete snapshot delivered to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    /// Hour of day.
    pub time_hour: u32,
    /// Day counter.
    pub day: u32,
    /// Scenario mode tag (`reality`, `dream`).
    pub mode: String,
    /// Room or zone the agent was last seen in.
    pub location_id: String,
    /// Whether the human operator is within sensing range.
    pub player_nearby: bool,
    /// Sensed entities.
    pub nearby_objects: Vec<WorldObject>,
    /// Current hand contents.
    pub held_item: Option<String>,
    /// Outcome of the last completed action.
    pub last_action_status: ActionStatus,
    /// Diagnostic message of the last completed action.
    pub last_action_error: Option<String>,
}
