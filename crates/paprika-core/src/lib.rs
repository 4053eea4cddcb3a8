//! Simulation clock, plan execution and perception for the Paprika agent.
//!
//! This crate turns the pieces in `paprika-agents` into a running agent:
//! it owns the logical clock, executes plans one step at a time under a
//! per-step timeout, and builds the perception snapshots sent to the
//! planner. It performs no network I/O.
//!
//! # Modules
//!
//! - [`agent`] -- The [`Agent`] aggregate and its per-tick update.
//! - [`clock`] -- Logical [`SimClock`] driving every timeout.
//! - [`config`] -- Configuration loading from `paprika-config.yaml` into
//!   strongly-typed structs ([`AgentConfig`]).
//! - [`error`] -- Crate-level [`CoreError`].
//! - [`executor`] -- The [`PlanExecutor`] and its [`PlanReport`].
//! - [`perception`] -- [`PerceptionBuilder`] for outbound snapshots.
//! - [`simulation`] -- Single-agent [`Simulation`] loop.

pub mod agent;
pub mod clock;
pub mod config;
pub mod error;
pub mod executor;
pub mod perception;
pub mod simulation;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, DEFAULT_AGENT_NAME};
pub use clock::{ClockError, SimClock};
pub use config::{
    AgentConfig, ConfigError, ExecutorConfig, LoggingConfig, PerceptionConfig, SessionConfig,
    TickConfig, WorldConfig,
};
pub use error::CoreError;
pub use executor::{
    LogThoughts, PlanError, PlanExecutor, PlanReport, StepOutcome, StepRecord, ThoughtSink,
};
pub use perception::{PerceptionBuilder, wall_clock_hour};
pub use simulation::Simulation;
