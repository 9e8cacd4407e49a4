//! Contract declaration and the immutable, shared contract.
//!
//! A [`Contract`] lists an action's inbound (`expects`) and outbound
//! (`exposes`) fields, its message templates and exception rescues. It is
//! built once, then shared through `Arc` and never mutated; derived contracts
//! start from a value copy of their parent ([`Contract::extend`]).

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::config::{self, Config};
use crate::error::ConfigurationError;
use crate::field::{Direction, Field};
use crate::messages::{MessageTemplate, Messages, Rescue};

/// The declared shape of an action.
///
/// # Examples
///
/// ```
/// use axn::{Contract, Direction, Field, ValueType};
///
/// let contract = Contract::builder("Greet")
///     .expects(Field::new("name").type_of(ValueType::String))?
///     .exposes(Field::new("greeting"))?
///     .build();
///
/// assert!(contract.can_read(Direction::Inbound, "greeting"));
/// assert!(!contract.can_read(Direction::Outbound, "name"));
/// # Ok::<(), axn::ConfigurationError>(())
/// ```
#[derive(Clone)]
pub struct Contract {
    name: String,
    inbound: IndexMap<String, Field>,
    outbound: IndexMap<String, Field>,
    /// Inbound facade allow-list: inbound names, then outbound names.
    readable: IndexSet<String>,
    messages: Messages,
    rescues: Vec<Rescue>,
    config: Option<Arc<Config>>,
}

impl Contract {
    /// Start declaring a contract.
    pub fn builder(name: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            name: name.into(),
            inbound: IndexMap::new(),
            outbound: IndexMap::new(),
            messages: Messages::default(),
            rescues: Vec::new(),
            config: None,
        }
    }

    /// Start declaring a contract that inherits everything `parent` declares.
    ///
    /// `parent` is copied; nothing declared on the builder reaches it.
    pub fn extend(parent: &Self, name: impl Into<String>) -> ContractBuilder {
        ContractBuilder {
            name: name.into(),
            inbound: parent.inbound.clone(),
            outbound: parent.outbound.clone(),
            messages: parent.messages.clone(),
            rescues: parent.rescues.clone(),
            config: parent.config.clone(),
        }
    }

    /// Contract name, used as the log prefix and job key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared fields of one direction, in declaration order.
    pub fn fields(&self, direction: Direction) -> impl Iterator<Item = &Field> {
        self.direction(direction).values()
    }

    /// Inbound fields.
    pub fn inbound(&self) -> impl Iterator<Item = &Field> {
        self.inbound.values()
    }

    /// Outbound fields.
    pub fn outbound(&self) -> impl Iterator<Item = &Field> {
        self.outbound.values()
    }

    /// A declared field.
    pub fn field(&self, direction: Direction, name: &str) -> Option<&Field> {
        self.direction(direction).get(name)
    }

    /// Whether `name` is declared in `direction`.
    pub fn declares(&self, direction: Direction, name: &str) -> bool {
        self.direction(direction).contains_key(name)
    }

    /// Whether the facade for `direction` may read `name`.
    ///
    /// The inbound facade also reads outbound fields.
    pub fn can_read(&self, direction: Direction, name: &str) -> bool {
        match direction {
            Direction::Inbound => self.readable.contains(name),
            Direction::Outbound => self.outbound.contains_key(name),
        }
    }

    /// Whether `name` is sensitive in either direction.
    pub fn is_sensitive(&self, name: &str) -> bool {
        [&self.inbound, &self.outbound]
            .into_iter()
            .filter_map(|fields| fields.get(name))
            .any(Field::is_sensitive)
    }

    /// Message templates.
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Exception rescues in declaration order.
    pub fn rescues(&self) -> &[Rescue] {
        &self.rescues
    }

    /// The pinned config, or the global one.
    pub fn config(&self) -> Arc<Config> {
        self.config.clone().unwrap_or_else(config::config)
    }

    fn direction(&self, direction: Direction) -> &IndexMap<String, Field> {
        match direction {
            Direction::Inbound => &self.inbound,
            Direction::Outbound => &self.outbound,
        }
    }
}

impl fmt::Debug for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contract")
            .field("name", &self.name)
            .field("expects", &self.inbound.keys().collect::<Vec<_>>())
            .field("exposes", &self.outbound.keys().collect::<Vec<_>>())
            .field("rescues", &self.rescues.len())
            .field("pinned_config", &self.config.is_some())
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Contract`].
///
/// Field declarations return `Result` so duplicates are reported where they
/// are declared.
#[derive(Clone)]
pub struct ContractBuilder {
    name: String,
    inbound: IndexMap<String, Field>,
    outbound: IndexMap<String, Field>,
    messages: Messages,
    rescues: Vec<Rescue>,
    config: Option<Arc<Config>>,
}

impl ContractBuilder {
    /// Declare an inbound field.
    pub fn expects(self, field: Field) -> Result<Self, ConfigurationError> {
        self.declare(Direction::Inbound, field)
    }

    /// Declare an outbound field.
    pub fn exposes(self, field: Field) -> Result<Self, ConfigurationError> {
        self.declare(Direction::Outbound, field)
    }

    /// Declare several inbound fields sharing one template.
    pub fn expects_all<I, S>(self, names: I, template: Field) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        names
            .into_iter()
            .try_fold(self, |builder, name| builder.expects(template.renamed(name)))
    }

    /// Declare several outbound fields sharing one template.
    pub fn exposes_all<I, S>(self, names: I, template: Field) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        names
            .into_iter()
            .try_fold(self, |builder, name| builder.exposes(template.renamed(name)))
    }

    /// Set message templates. Templates set here replace inherited ones;
    /// unset ones are kept.
    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = self.messages.merged(messages);
        self
    }

    /// Use `message` as the error for exceptions of type `E`.
    pub fn rescue<E>(mut self, message: impl Into<MessageTemplate>) -> Self
    where
        E: StdError + 'static,
    {
        self.rescues.push(Rescue::new::<E>(message));
        self
    }

    /// Pin a config to this contract instead of the global one.
    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    /// Finish the declaration.
    pub fn build(self) -> Arc<Contract> {
        let readable = self
            .inbound
            .keys()
            .chain(self.outbound.keys())
            .cloned()
            .collect();

        Arc::new(Contract {
            name: self.name,
            inbound: self.inbound,
            outbound: self.outbound,
            readable,
            messages: self.messages,
            rescues: self.rescues,
            config: self.config,
        })
    }

    fn declare(mut self, direction: Direction, field: Field) -> Result<Self, ConfigurationError> {
        if direction == Direction::Outbound && field.preprocessor().is_some() {
            return Err(ConfigurationError::invalid_dsl(format!(
                "{}: preprocess is only supported on expected fields (found on exposed field '{}')",
                self.name,
                field.name()
            )));
        }

        let fields = match direction {
            Direction::Inbound => &mut self.inbound,
            Direction::Outbound => &mut self.outbound,
        };
        if fields.contains_key(field.name()) {
            return Err(ConfigurationError::DuplicateField {
                contract: self.name,
                direction,
                field: field.name().to_owned(),
            });
        }

        fields.insert(field.name().to_owned(), field);
        Ok(self)
    }
}

impl fmt::Debug for ContractBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractBuilder")
            .field("name", &self.name)
            .field("expects", &self.inbound.keys().collect::<Vec<_>>())
            .field("exposes", &self.outbound.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use axn_validator::ValueType;
    use pretty_assertions::assert_eq;

    fn names<'a>(fields: impl Iterator<Item = &'a Field>) -> Vec<&'a str> {
        fields.map(Field::name).collect()
    }

    #[test]
    fn declaration_order_is_kept() {
        let contract = Contract::builder("Ordered")
            .expects(Field::new("b"))
            .and_then(|b| b.expects(Field::new("a")))
            .and_then(|b| b.exposes(Field::new("z")))
            .expect("valid contract")
            .build();

        assert_eq!(names(contract.inbound()), vec!["b", "a"]);
        assert_eq!(names(contract.outbound()), vec!["z"]);
    }

    #[test]
    fn duplicate_in_same_direction_fails() {
        let err = Contract::builder("Dup")
            .expects(Field::new("foo"))
            .and_then(|b| b.expects(Field::new("foo")))
            .unwrap_err();

        assert_eq!(
            err,
            ConfigurationError::DuplicateField {
                contract: "Dup".into(),
                direction: Direction::Inbound,
                field: "foo".into(),
            }
        );
    }

    #[test]
    fn same_name_in_both_directions_is_fine() {
        let contract = Contract::builder("Both")
            .expects(Field::new("foo"))
            .and_then(|b| b.exposes(Field::new("foo")))
            .expect("valid contract")
            .build();

        assert!(contract.declares(Direction::Inbound, "foo"));
        assert!(contract.declares(Direction::Outbound, "foo"));
    }

    #[test]
    fn expects_all_shares_template() {
        let contract = Contract::builder("Many")
            .expects_all(["a", "b"], Field::new("_").type_of(ValueType::String))
            .expect("valid contract")
            .build();

        assert_eq!(names(contract.inbound()), vec!["a", "b"]);
        let b = contract.field(Direction::Inbound, "b").expect("declared");
        assert_eq!(b.rules().rules().len(), 1);
    }

    #[test]
    fn preprocess_on_outbound_is_invalid() {
        let err = Contract::builder("Bad")
            .exposes(Field::new("out").preprocess(Ok))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDsl(_)));
    }

    #[test]
    fn readable_sets() {
        let contract = Contract::builder("Read")
            .expects(Field::new("input"))
            .and_then(|b| b.exposes(Field::new("output")))
            .expect("valid contract")
            .build();

        assert!(contract.can_read(Direction::Inbound, "input"));
        assert!(contract.can_read(Direction::Inbound, "output"));
        assert!(contract.can_read(Direction::Outbound, "output"));
        assert!(!contract.can_read(Direction::Outbound, "input"));
        assert!(!contract.can_read(Direction::Inbound, "other"));
    }

    #[test]
    fn extend_copies_and_leaves_parent_alone() {
        let parent = Contract::builder("Parent")
            .expects(Field::new("shared"))
            .expect("valid contract")
            .rescue::<io::Error>("io broke")
            .build();

        let child = Contract::extend(&parent, "Child")
            .expects(Field::new("extra"))
            .expect("valid contract")
            .build();

        assert_eq!(names(child.inbound()), vec!["shared", "extra"]);
        assert_eq!(child.rescues().len(), 1);
        assert_eq!(names(parent.inbound()), vec!["shared"]);
    }

    #[test]
    fn extend_rejects_redeclaring_parent_field() {
        let parent = Contract::builder("Parent")
            .expects(Field::new("shared"))
            .expect("valid contract")
            .build();

        let err = Contract::extend(&parent, "Child")
            .expects(Field::new("shared"))
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateField { .. }));
    }

    #[test]
    fn sensitivity_in_either_direction() {
        let contract = Contract::builder("Secret")
            .expects(Field::new("token").sensitive())
            .and_then(|b| b.exposes(Field::new("token")))
            .expect("valid contract")
            .build();
        assert!(contract.is_sensitive("token"));
        assert!(!contract.is_sensitive("other"));
    }

    #[test]
    fn pinned_config_wins() {
        let pinned = Arc::new(Config::new().with_global_debug_logging(true));
        let contract = Contract::builder("Pinned").config(pinned).build();
        assert!(contract.config().global_debug_logging());
    }
}
