use crate::error::{ImpexError, Result};
use crate::types::{EntryValues, Value};

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::List(items.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Option<&str>>> for Value {
    fn from(items: Vec<Option<&str>>) -> Self {
        Value::List(items.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

impl From<Vec<Value>> for EntryValues {
    fn from(values: Vec<Value>) -> Self {
        EntryValues::Positional(values)
    }
}

impl From<Vec<&str>> for EntryValues {
    fn from(values: Vec<&str>) -> Self {
        EntryValues::Positional(values.into_iter().map(Value::from).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for EntryValues {
    fn from(pairs: Vec<(K, V)>) -> Self {
        EntryValues::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl EntryValues {
    /// Convert a dynamic row (array or object) read from a model file.
    ///
    /// Scalars become text, `null` becomes a null value and arrays become
    /// list values. A bare scalar row or deeper nesting is rejected.
    pub fn from_json(type_name: &str, row: &serde_json::Value) -> Result<Self> {
        match row {
            serde_json::Value::Array(items) => items
                .iter()
                .map(|v| cell_from_json(type_name, v))
                .collect::<Result<Vec<_>>>()
                .map(EntryValues::Positional),
            serde_json::Value::Object(map) => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), cell_from_json(type_name, v)?)))
                .collect::<Result<Vec<_>>>()
                .map(EntryValues::Named),
            other => Err(ImpexError::shape(
                type_name,
                format!(
                    "expected a list of values or a map of attribute names, got {}",
                    json_kind(other)
                ),
            )),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EntryValues::Positional(v) => v.len(),
            EntryValues::Named(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn cell_from_json(type_name: &str, v: &serde_json::Value) -> Result<Value> {
    match v {
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::Null => Ok(None),
                other => scalar_text(other).map(Some).ok_or_else(|| {
                    ImpexError::shape(
                        type_name,
                        format!("list values must be scalars, got {}", json_kind(other)),
                    )
                }),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        serde_json::Value::Null => Ok(Value::Null),
        other => scalar_text(other).map(Value::Text).ok_or_else(|| {
            ImpexError::shape(
                type_name,
                format!("values must be scalars or lists, got {}", json_kind(other)),
            )
        }),
    }
}

fn scalar_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a map",
    }
}
