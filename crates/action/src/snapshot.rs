//! Field snapshots for logs, hooks and `inspect`.
//!
//! Every snapshot leaving the crate is built here, so sensitive values are
//! replaced with [`FILTERED`] in exactly one place.

use std::fmt::Write as _;

use serde_json::Value;

use crate::context::Fields;
use crate::contract::Contract;
use crate::field::Direction;

/// Placeholder for sensitive values.
pub const FILTERED: &str = "[FILTERED]";

const INSPECT_LIMIT: usize = 50;

fn names(contract: &Contract, direction: Option<Direction>) -> Box<dyn Iterator<Item = &str> + '_> {
    match direction {
        Some(direction) => Box::new(contract.fields(direction).map(|f| f.name())),
        None => Box::new(
            contract
                .inbound()
                .chain(contract.outbound().filter(|f| !contract.declares(Direction::Inbound, f.name())))
                .map(|f| f.name()),
        ),
    }
}

/// Declared fields present in `values`, sensitive ones filtered.
///
/// `None` covers both directions.
pub(crate) fn filtered(contract: &Contract, direction: Option<Direction>, values: &Fields) -> Fields {
    names(contract, direction)
        .filter_map(|name| {
            let value = values.get(name)?;
            let value = if contract.is_sensitive(name) && !value.is_null() {
                Value::String(FILTERED.to_owned())
            } else {
                value.clone()
            };
            Some((name.to_owned(), value))
        })
        .collect()
}

/// Declared fields of `direction`, unfiltered. Absent fields read as null.
pub(crate) fn declared(contract: &Contract, direction: Direction, values: &Fields) -> Fields {
    contract
        .fields(direction)
        .map(|field| {
            let value = values.get(field.name()).cloned().unwrap_or(Value::Null);
            (field.name().to_owned(), value)
        })
        .collect()
}

/// JSON rendering for log lines; `None` when there is nothing to show.
pub(crate) fn render(snapshot: &Fields) -> Option<String> {
    if snapshot.is_empty() {
        return None;
    }
    serde_json::to_string(snapshot).ok()
}

fn inspect_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > INSPECT_LIMIT => {
            let cut: String = s.chars().take(INSPECT_LIMIT).collect();
            Value::String(format!("{cut}...")).to_string()
        }
        other => other.to_string(),
    }
}

/// `#<Label status key: value, ...>` over every declared field of
/// `direction`. Unset fields show as `null`; set sensitive ones as
/// [`FILTERED`].
pub(crate) fn inspect(
    label: &str,
    status: Option<&str>,
    contract: &Contract,
    direction: Direction,
    values: &Fields,
) -> String {
    let mut out = format!("#<{label}");
    if let Some(status) = status {
        let _ = write!(out, " {status}");
    }
    let body = contract
        .fields(direction)
        .map(|field| {
            let shown = match values.get(field.name()) {
                None | Some(Value::Null) => "null".to_owned(),
                Some(_) if contract.is_sensitive(field.name()) => FILTERED.to_owned(),
                Some(value) => inspect_value(value),
            };
            format!("{}: {shown}", field.name())
        })
        .collect::<Vec<_>>()
        .join(", ");
    if !body.is_empty() {
        let _ = write!(out, " {body}");
    }
    out.push('>');
    out
}
