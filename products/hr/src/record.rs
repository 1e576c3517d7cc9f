//! Record constructor: turns raw form values into an [`Employee`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    employee::{Employee, EmployeeField},
    reference::SelectOption,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("missing required field `{0}`")]
    MissingField(EmployeeField),
}

impl RecordError {
    pub fn field(&self) -> EmployeeField {
        match self {
            RecordError::MissingField(field) => *field,
        }
    }
}

/// Raw field values keyed by field name.
///
/// Unknown names are dropped on insert. Because values are keyed, the order
/// in which they were supplied never affects the resulting record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldValues {
    values: BTreeMap<EmployeeField, String>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: EmployeeField, value: impl Into<String>) -> &mut Self {
        self.values.insert(field, value.into());
        self
    }

    pub fn with(mut self, field: EmployeeField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Store the `value` of a select-menu option, never its label.
    pub fn with_option(self, field: EmployeeField, option: &SelectOption) -> Self {
        self.with(field, option.value.clone())
    }

    /// Insert by field name. Returns `false` when the name is not an employee field.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> bool {
        match name.parse::<EmployeeField>() {
            Ok(field) => {
                self.values.insert(field, value.into());
                true
            }
            Err(err) => {
                debug!(%err, "ignoring form value");
                false
            }
        }
    }

    pub fn get(&self, field: EmployeeField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldValues
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = FieldValues::new();
        for (name, value) in iter {
            values.insert(name.as_ref(), value);
        }
        values
    }
}

impl<'de> Deserialize<'de> for FieldValues {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = HashMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| scalar_text(value).map(|text| (name, text)))
            .collect())
    }
}

/// Flatten a JSON form value to text. Option objects contribute their `value`;
/// `null`, arrays and option objects without a value count as absent.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(mut map) => map.remove("value").and_then(scalar_text),
        Value::Null | Value::Array(_) => None,
    }
}

/// Build an employee from whatever values are present. Never fails; absent
/// fields become empty strings and present ones are copied verbatim.
pub fn construct(values: &FieldValues) -> Employee {
    let mut employee = Employee::default();
    for (field, value) in &values.values {
        *employee.slot_mut(*field) = value.clone();
    }
    employee
}

/// Like [`construct`], but rejects the first absent or blank field in form order.
pub fn construct_strict(values: &FieldValues) -> Result<Employee, RecordError> {
    if let Some(field) = EmployeeField::ALL
        .into_iter()
        .find(|field| values.get(*field).is_none_or(|value| value.trim().is_empty()))
    {
        return Err(RecordError::MissingField(field));
    }
    Ok(construct(values))
}
