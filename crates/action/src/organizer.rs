//! Sequential composition of actions.

use std::fmt;
use std::sync::Arc;

use crate::action::{Action, ActionExt};
use crate::contract::Contract;
use crate::error::Halt;
use crate::execution::Execution;
use crate::field::Direction;

/// Runs actions in order over one shared field map.
///
/// Each step is called with the fields accumulated so far, and the fields a
/// successful step set are merged back in. The first failing step fails
/// the organizer with its error (behind `prefix`, when set); an error from a
/// step is attached as the organizer's exception. Finally the organizer
/// exposes whichever of its own outbound fields the steps produced.
///
/// Organizers are actions themselves, so they nest.
///
/// ```
/// use std::sync::Arc;
/// use axn::{Action, ActionExt, Contract, Field, Organizer, fields, from_fn};
///
/// let slug = from_fn(
///     Contract::builder("Slug")
///         .expects(Field::new("title"))?
///         .exposes(Field::new("slug"))?
///         .build(),
///     |ctx| {
///         let title: String = ctx.get_as("title")?;
///         ctx.expose("slug", title.to_lowercase().replace(' ', "-"))?;
///         Ok(())
///     },
/// );
/// let path = from_fn(
///     Contract::builder("Path")
///         .expects(Field::new("slug"))?
///         .exposes(Field::new("path"))?
///         .build(),
///     |ctx| {
///         let slug: String = ctx.get_as("slug")?;
///         ctx.expose("path", format!("/posts/{slug}"))?;
///         Ok(())
///     },
/// );
///
/// let publish = Organizer::new(
///     Contract::builder("Publish")
///         .expects(Field::new("title"))?
///         .exposes(Field::new("path"))?
///         .build(),
///     vec![Arc::new(slug) as Arc<dyn Action>, Arc::new(path)],
/// );
///
/// let result = publish.call(fields! { "title": "Hello World" })?;
/// assert_eq!(result.get_as::<String>("path")?, "/posts/hello-world");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Organizer {
    contract: Arc<Contract>,
    steps: Vec<Arc<dyn Action>>,
    prefix: Option<String>,
}

impl Organizer {
    /// Organize `steps` under `contract`.
    pub fn new(contract: Arc<Contract>, steps: Vec<Arc<dyn Action>>) -> Self {
        Self {
            contract,
            steps,
            prefix: None,
        }
    }

    /// Prefix step errors with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// The steps, in order.
    pub fn steps(&self) -> &[Arc<dyn Action>] {
        &self.steps
    }
}

impl Action for Organizer {
    fn contract(&self) -> Arc<Contract> {
        Arc::clone(&self.contract)
    }

    fn run(&self, ctx: &mut Execution<'_>) -> Result<(), Halt> {
        let mut fields = ctx.raw_fields().clone();

        for step in &self.steps {
            let result = ctx.hoist_errors(self.prefix.as_deref(), |_| step.call(fields.clone()))?;
            fields.extend(result.exposed().into_iter().filter(|(_, value)| !value.is_null()));
        }

        for field in self.contract.fields(Direction::Outbound) {
            if let Some(value) = fields.get(field.name()) {
                ctx.expose(field.name(), value.clone())?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Organizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Organizer")
            .field("contract", &self.contract.name())
            .field(
                "steps",
                &self
                    .steps
                    .iter()
                    .map(|step| step.contract().name().to_owned())
                    .collect::<Vec<_>>(),
            )
            .field("prefix", &self.prefix)
            .finish()
    }
}
