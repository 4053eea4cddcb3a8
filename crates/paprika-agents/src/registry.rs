//! Action dispatch registry.
//!
//! Built once when the agent is constructed. Each handler declares the
//! [`ActionName`] it serves; a second claim on the same name is rejected
//! rather than silently replacing the first.

use std::collections::BTreeMap;

use paprika_types::ActionArgs;
use tracing::{info, warn};

use crate::actions::chop::ChopHandler;
use crate::actions::cook::CookHandler;
use crate::actions::navigate::NavigateHandler;
use crate::actions::pickup::PickupHandler;
use crate::actions::put_down::PutDownHandler;
use crate::actions::wander::WanderHandler;
use crate::actions::{ActionHandler, ActionName, ActionTask};
use crate::error::RegistryError;

/// Maps action names to their handlers.
#[derive(Default)]
pub struct ActionRegistry {
    handlers: BTreeMap<ActionName, Box<dyn ActionHandler>>,
}

impl core::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ActionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in kitchen handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateHandler`] if two built-in handlers
    /// claim the same name.
    pub fn with_default_handlers() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Box::new(NavigateHandler))?;
        registry.register(Box::new(WanderHandler))?;
        registry.register(Box::new(PickupHandler))?;
        registry.register(Box::new(PutDownHandler))?;
        registry.register(Box::new(ChopHandler))?;
        registry.register(Box::new(CookHandler))?;
        Ok(registry)
    }

    /// Add a handler under the name it declares.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateHandler`] if the name is taken.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) -> Result<(), RegistryError> {
        let name = handler.name();
        if self.handlers.contains_key(&name) {
            return Err(RegistryError::DuplicateHandler { name });
        }
        self.handlers.insert(name, handler);
        info!(action = %name, "registered action handler");
        Ok(())
    }

    /// Whether a handler serves `name`.
    pub fn contains(&self, name: ActionName) -> bool {
        self.handlers.contains_key(&name)
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<ActionName> {
        self.handlers.keys().copied().collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Start the handler for `function`.
    ///
    /// Returns `None` (after a warning) when no handler serves the name.
    /// The caller does not block on this: a step that was never started
    /// simply never reports.
    pub fn dispatch(
        &self,
        function: &str,
        args: &ActionArgs,
    ) -> Option<(ActionName, Box<dyn ActionTask>)> {
        let handler = function
            .parse::<ActionName>()
            .ok()
            .and_then(|name| self.handlers.get(&name));
        let Some(handler) = handler else {
            warn!(function, "no handler registered for action");
            return None;
        };
        let name = handler.name();
        info!(action = %name, "dispatching action");
        Some((name, handler.execute(args)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::actions::HandlerStatus;

    #[test]
    fn default_registry_covers_every_action() {
        let registry = ActionRegistry::with_default_handlers().unwrap();
        assert_eq!(registry.len(), ActionName::ALL.len());
        for name in ActionName::ALL {
            assert!(registry.contains(name), "missing {name}");
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = ActionRegistry::with_default_handlers().unwrap();
        let err = registry.register(Box::new(ChopHandler)).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateHandler {
                name: ActionName::Chop
            }
        );
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn unknown_function_dispatches_nothing() {
        let registry = ActionRegistry::with_default_handlers().unwrap();
        assert!(registry.dispatch("juggle", &ActionArgs::new()).is_none());
        assert!(registry.dispatch("", &ActionArgs::new()).is_none());
    }

    #[test]
    fn empty_registry_dispatches_nothing() {
        let registry = ActionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.dispatch("chop", &ActionArgs::new()).is_none());
    }

    #[test]
    fn dispatch_returns_the_matching_task() {
        use paprika_world::{Vec3, World};

        use crate::actions::testing::Fixture;

        let registry = ActionRegistry::with_default_handlers().unwrap();
        let (name, mut task) = registry
            .dispatch("put_down", &ActionArgs::new().with("id", "Counter"))
            .unwrap();
        assert_eq!(name, ActionName::PutDown);

        let mut fx = Fixture::new(World::new(), Vec3::ZERO);
        assert_eq!(
            fx.step(task.as_mut()),
            HandlerStatus::failed("Hand is empty")
        );
    }
}
