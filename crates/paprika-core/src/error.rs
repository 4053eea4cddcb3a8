//! Error type for the `paprika-core` crate.
//!
//! Wraps the per-module errors so callers that drive a whole simulation
//! can propagate any of them with `?`.

use paprika_agents::RegistryError;
use paprika_world::WorldError;

use crate::clock::ClockError;
use crate::config::ConfigError;
use crate::executor::PlanError;

/// Errors surfaced while building or driving a simulation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The simulation clock could not advance.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The world index rejected an operation.
    #[error(transparent)]
    World(#[from] WorldError),

    /// The action registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A plan was rejected.
    #[error(transparent)]
    Plan(#[from] PlanError),
}
