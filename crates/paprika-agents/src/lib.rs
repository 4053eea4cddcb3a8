//! Agent state, target arbitration, action handlers and dispatch for the
//! Paprika kitchen agent.
//!
//! Everything here operates on in-memory state only. The core crate owns
//! the tick loop and plan execution; this crate supplies the pieces each
//! tick works with.
//!
//! # Modules
//!
//! - [`actions`] -- Tick-driven action handlers ([`ActionHandler`],
//!   [`ActionTask`]) and the in-flight wrapper that reports outcomes.
//! - [`arbiter`] -- Target resolution with occupancy checks
//!   ([`ResourceArbiter`]).
//! - [`error`] -- Registry and resolution errors.
//! - [`registry`] -- Name to handler dispatch ([`ActionRegistry`]).
//! - [`settings`] -- Handler tunables ([`ActionSettings`]).
//! - [`state`] -- The agent state store ([`AgentState`]).

pub mod actions;
pub mod arbiter;
pub mod error;
pub mod registry;
pub mod settings;
pub mod state;

// Re-export primary types at crate root for convenience.
pub use actions::{
    ActionHandler, ActionName, ActionTask, AgentContext, Deadline, Frame, HandlerStatus,
    InFlightAction,
};
pub use arbiter::{OccupancyRule, ProbeConfig, ResolvedTarget, ResourceArbiter};
pub use error::{RegistryError, ResolveError, UnknownAction};
pub use registry::ActionRegistry;
pub use settings::ActionSettings;
pub use state::{ActionTicket, AgentState, UNKNOWN_LOCATION};
