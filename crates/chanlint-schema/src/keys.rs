//! Key/type tables for entries and releases.

use serde_json::{Map, Value};

use chanlint_core::Location;

use crate::checker::Checker;

/// JSON value types that appear in key tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueType {
    Str,
    Bool,
    Array,
    Null,
}

impl ValueType {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => Some(Self::Str),
            Value::Bool(_) => Some(Self::Bool),
            Value::Array(_) => Some(Self::Array),
            Value::Null => Some(Self::Null),
            Value::Number(_) | Value::Object(_) => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Str => "a string",
            Self::Bool => "a boolean",
            Self::Array => "an array",
            Self::Null => "null",
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::String(_) => "string",
        Value::Bool(_) => "boolean",
        Value::Array(_) => "array",
        Value::Null => "null",
        Value::Number(_) => "number",
        Value::Object(_) => "object",
    }
}

pub(crate) type KeyTable = &'static [(&'static str, &'static [ValueType])];

/// Check every key of `obj` against `table`: unknown keys and values of the
/// wrong type are errors. Returns the keys that passed, in document order.
///
/// An array is accepted for a key that allows both arrays and scalars only
/// if every element is one of the allowed scalar types.
pub(crate) fn check_table<'v>(
    ck: &mut Checker<'_>,
    loc: &Location,
    obj: &'v Map<String, Value>,
    table: KeyTable,
) -> Vec<(&'v str, &'v Value)> {
    let mut passed = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        let here = loc.key(key);
        let Some((_, allowed)) = table.iter().find(|(k, _)| *k == key.as_str()) else {
            ck.error(&here, format!("unknown key \"{key}\""));
            continue;
        };
        if check_type(ck, &here, key, value, allowed) {
            passed.push((key.as_str(), value));
        }
    }
    passed
}

fn check_type(
    ck: &mut Checker<'_>,
    here: &Location,
    key: &str,
    value: &Value,
    allowed: &[ValueType],
) -> bool {
    let actual = ValueType::of(value);
    if !actual.is_some_and(|t| allowed.contains(&t)) {
        let expected: Vec<&str> = allowed.iter().map(|t| t.name()).collect();
        ck.error(
            here,
            format!(
                "\"{key}\" must be {}, found {}",
                expected.join(" or "),
                json_type_name(value)
            ),
        );
        return false;
    }

    let scalars: Vec<ValueType> = allowed
        .iter()
        .copied()
        .filter(|t| *t != ValueType::Array)
        .collect();
    if let (Value::Array(items), false) = (value, scalars.is_empty()) {
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            if !ValueType::of(item).is_some_and(|t| scalars.contains(&t)) {
                let expected: Vec<&str> = scalars.iter().map(|t| t.name()).collect();
                ck.error(
                    &here.index(i),
                    format!(
                        "elements of \"{key}\" must be {}, found {}",
                        expected.join(" or "),
                        json_type_name(item)
                    ),
                );
                ok = false;
            }
        }
        return ok;
    }
    true
}

/// Check that every element of an array-only key is a string.
pub(crate) fn check_string_items<'v>(
    ck: &mut Checker<'_>,
    here: &Location,
    key: &str,
    items: &'v [Value],
) -> Vec<(usize, &'v str)> {
    let mut strings = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) => strings.push((i, s)),
            None => ck.error(
                &here.index(i),
                format!(
                    "elements of \"{key}\" must be strings, found {}",
                    json_type_name(item)
                ),
            ),
        }
    }
    strings
}
