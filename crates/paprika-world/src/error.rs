//! Error types for the `paprika-world` crate.

/// Errors that can occur while building or mutating the world index.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// An entity with the same name already exists. Names are the world's
    /// identity key, so they must be unique.
    #[error("duplicate entity name: {0}")]
    DuplicateEntity(String),

    /// No entity with the given name exists.
    #[error("entity not found: {0}")]
    UnknownEntity(String),

    /// An entity declared a parent that has not been inserted yet.
    #[error("entity {child} declares unknown parent {parent}")]
    UnknownParent {
        /// The entity being inserted.
        child: String,
        /// The missing parent name.
        parent: String,
    },
}
