//! Restricted read views over an invocation's fields.
//!
//! Each facade reads through the allow-list its contract computed at build
//! time; anything else is a [`ContractViolation::MethodNotAllowed`].

use std::any::type_name;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::context::Fields;
use crate::contract::Contract;
use crate::error::ContractViolation;
use crate::field::Direction;
use crate::snapshot;

static NULL: Value = Value::Null;

/// Read `name` through the facade for `direction`.
pub(crate) fn read<'a>(
    contract: &Contract,
    direction: Direction,
    fields: &'a Fields,
    name: &str,
) -> Result<&'a Value, ContractViolation> {
    if !contract.can_read(direction, name) {
        return Err(ContractViolation::not_allowed(direction, name, contract.name()));
    }
    Ok(fields.get(name).unwrap_or(&NULL))
}

/// Read `name` through the facade for `direction` and deserialize it.
pub(crate) fn read_as<T: DeserializeOwned>(
    contract: &Contract,
    direction: Direction,
    fields: &Fields,
    name: &str,
) -> Result<T, ContractViolation> {
    let value = read(contract, direction, fields, name)?;
    T::deserialize(value).map_err(|err| ContractViolation::UnreadableField {
        field: name.to_owned(),
        expected: type_name::<T>(),
        message: err.to_string(),
    })
}

/// The logic body's view: inbound fields plus outbound ones.
#[derive(Clone, Copy)]
pub struct InboundFacade<'a> {
    contract: &'a Contract,
    fields: &'a Fields,
}

impl<'a> InboundFacade<'a> {
    pub(crate) fn new(contract: &'a Contract, fields: &'a Fields) -> Self {
        Self { contract, fields }
    }

    /// A declared field; `null` when unset.
    pub fn get(&self, name: &str) -> Result<&'a Value, ContractViolation> {
        read(self.contract, Direction::Inbound, self.fields, name)
    }

    /// A declared field, deserialized.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, ContractViolation> {
        read_as(self.contract, Direction::Inbound, self.fields, name)
    }

    /// Name of the contract.
    pub fn contract_name(&self) -> &'a str {
        self.contract.name()
    }

    /// `#<InboundFacade name: value, ...>` with sensitive values filtered.
    pub fn inspect(&self) -> String {
        snapshot::inspect("InboundFacade", None, self.contract, Direction::Inbound, self.fields)
    }
}

impl fmt::Debug for InboundFacade<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fixture() -> (std::sync::Arc<Contract>, Fields) {
        let contract = Contract::builder("Lookup")
            .expects(Field::new("foo"))
            .and_then(|b| b.expects(Field::new("ssn").sensitive()))
            .and_then(|b| b.exposes(Field::new("bar")))
            .expect("valid contract")
            .build();
        let mut fields = Fields::new();
        fields.insert("foo".into(), json!(11));
        fields.insert("ssn".into(), json!("123"));
        fields.insert("hidden".into(), json!(true));
        (contract, fields)
    }

    #[test]
    fn reads_declared_fields() {
        let (contract, fields) = fixture();
        let facade = InboundFacade::new(&contract, &fields);
        assert_eq!(facade.get("foo"), Ok(&json!(11)));
        assert_eq!(facade.get("bar"), Ok(&Value::Null));
        assert_eq!(facade.get_as::<u32>("foo"), Ok(11));
    }

    #[test]
    fn rejects_undeclared_fields() {
        let (contract, fields) = fixture();
        let facade = InboundFacade::new(&contract, &fields);
        let err = facade.get("hidden").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'hidden' is not available on InboundFacade: Lookup may be missing a line like `expects hidden`"
        );
    }

    #[test]
    fn typed_read_reports_mismatch() {
        let (contract, fields) = fixture();
        let facade = InboundFacade::new(&contract, &fields);
        let err = facade.get_as::<String>("foo").unwrap_err();
        assert!(matches!(err, ContractViolation::UnreadableField { ref field, .. } if field == "foo"));
    }

    #[test]
    fn inspect_filters() {
        let (contract, fields) = fixture();
        let facade = InboundFacade::new(&contract, &fields);
        assert_eq!(facade.inspect(), "#<InboundFacade foo: 11, ssn: [FILTERED]>");
    }
}
