//! Error types for the `paprika-agents` crate.
//!
//! These are programming and lookup errors. Failed actions are not Rust
//! errors: they end as [`HandlerStatus::Failed`] and land in the agent
//! state as the last outcome.
//!
//! [`HandlerStatus::Failed`]: crate::actions::HandlerStatus::Failed

use crate::actions::ActionName;

/// Errors raised while building the action registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A second handler claimed an action name that is already registered.
    #[error("duplicate handler for action '{name}'")]
    DuplicateHandler {
        /// The contested action name.
        name: ActionName,
    },
}

/// Why the arbiter could not produce a usable target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Neither an exact name nor any prefix match exists.
    #[error("Target '{identifier}' not found")]
    NotFound {
        /// The identifier the planner asked for.
        identifier: String,
    },

    /// Prefix matches exist but every one of them is occupied.
    #[error("All {candidates} '{identifier}' targets are occupied")]
    AllOccupied {
        /// The identifier the planner asked for.
        identifier: String,
        /// How many candidates were probed.
        candidates: usize,
    },
}

/// An action name that does not map to any known action kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);
