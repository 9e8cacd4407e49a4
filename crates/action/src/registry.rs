use std::collections::HashMap;
use std::sync::Arc;

use crate::action::{Action, ActionExt};
use crate::enqueue::Job;
use crate::error::{ActionError, ConfigurationError};
use crate::result::ActionResult;

/// Actions by contract name, for replaying enqueued [`Job`]s.
///
/// Actions are stored as `Arc<dyn Action>` so a worker can share one
/// registry across threads.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use axn::{ActionExt, ActionRegistry, Contract, Field, MemoryQueue, fields, from_fn};
///
/// let contract = Contract::builder("Noop").expects(Field::new("id"))?.build();
/// let noop = Arc::new(from_fn(contract, |_| Ok(())));
///
/// let mut registry = ActionRegistry::new();
/// registry.register(noop.clone());
///
/// let queue = MemoryQueue::new();
/// noop.enqueue(&queue, fields! { "id": 7 })?;
///
/// let job = queue.pop().expect("queued");
/// assert!(registry.perform(&job)?.is_ok());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under its contract name, replacing any previous one.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        let name = action.contract().name().to_owned();
        self.actions.insert(name, action);
    }

    /// Look up an action by contract name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(name)
    }

    /// Check whether an action is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Remove an action by name. Returns the removed action, if any.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.remove(name)
    }

    /// Replay `job` through `call`, or `call_strict` for strict jobs.
    pub fn perform(&self, job: &Job) -> Result<ActionResult, ActionError> {
        let action = self.get(&job.action).ok_or_else(|| ConfigurationError::UnknownAction {
            action: job.action.clone(),
        })?;
        tracing::debug!(target: "axn", action = %job.action, strict = job.strict, "performing job");

        if job.strict {
            action.call_strict(job.fields.clone())
        } else {
            action.call(job.fields.clone())
        }
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("count", &self.actions.len())
            .field("names", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::from_fn;
    use crate::contract::Contract;
    use crate::context::Fields;

    fn make_action(name: &str) -> Arc<dyn Action> {
        Arc::new(from_fn(Contract::builder(name).build(), |_| Ok(())))
    }

    fn job(action: &str, strict: bool) -> Job {
        Job {
            action: action.into(),
            fields: Fields::new(),
            strict,
        }
    }

    #[test]
    fn empty_registry() {
        let reg = ActionRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(reg.get("anything").is_none());
    }

    #[test]
    fn register_and_overwrite() {
        let mut reg = ActionRegistry::new();
        reg.register(make_action("Send"));
        reg.register(make_action("Send"));

        assert_eq!(reg.len(), 1);
        assert!(reg.contains("Send"));
        assert!(!reg.contains("Other"));
    }

    #[test]
    fn unregister() {
        let mut reg = ActionRegistry::new();
        reg.register(make_action("Temp"));

        assert!(reg.unregister("Temp").is_some());
        assert!(reg.is_empty());
        assert!(reg.unregister("Temp").is_none());
    }

    #[test]
    fn perform_unknown_action() {
        let reg = ActionRegistry::new();
        let err = reg.perform(&job("Missing", false)).unwrap_err();
        assert!(matches!(
            err,
            ActionError::Configuration(ConfigurationError::UnknownAction { ref action }) if action == "Missing"
        ));
    }

    #[test]
    fn perform_strict_raises_failure() {
        let mut reg = ActionRegistry::new();
        reg.register(Arc::new(from_fn(Contract::builder("Refuse").build(), |ctx| {
            Err(ctx.fail_with("no"))
        })));

        assert!(reg.perform(&job("Refuse", false)).expect("call").is_failure());
        assert!(reg.perform(&job("Refuse", true)).unwrap_err().is_failure());
    }

    #[test]
    fn debug_format() {
        let mut reg = ActionRegistry::new();
        reg.register(make_action("Test"));
        let debug = format!("{reg:?}");
        assert!(debug.contains("ActionRegistry"));
        assert!(debug.contains("count: 1"));
    }
}
