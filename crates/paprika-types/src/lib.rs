//! Shared type definitions for the Paprika kitchen agent.
//!
//! This crate is the single source of truth for everything that crosses the
//! wire between the agent and the remote planning service. It performs no
//! I/O; the runner serializes these types as JSON text frames.
//!
//! # Modules
//!
//! - [`args`] -- Weakly-typed action arguments ([`ArgValue`], [`ActionArgs`])
//!   with explicit, uniform validation.
//! - [`ids`] -- Type-safe UUID wrapper for planner session identifiers.
//! - [`perception`] -- Outbound perception snapshot sent to the planner.
//! - [`plan`] -- Inbound plan response and its ordered action steps.

pub mod args;
pub mod ids;
pub mod perception;
pub mod plan;

// Re-export all public types at crate root for convenience.
pub use args::{ActionArgs, ArgError, ArgValue};
pub use ids::SessionId;
pub use perception::{ActionStatus, Perception, Position, WorldObject};
pub use plan::{ActionStep, Plan, PlanResponse};
