use serde::{Deserialize, Serialize};

use crate::catalogs::LIST_SEPARATOR;

// ---------------------------------------------------------------------------
// Attribute declarations
// ---------------------------------------------------------------------------

/// One `key=value` pair from a `[...]` qualifier block.
///
/// `value` keeps the text exactly as declared (quotes included) so the header
/// can be reproduced; use [`Qualifier::unquoted`] for comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    pub key: String,
    pub value: String,
}

impl Qualifier {
    pub fn unquoted(&self) -> &str {
        let v = self.value.as_str();
        for quote in ['\'', '"'] {
            if v.len() >= 2 && v.starts_with(quote) && v.ends_with(quote) {
                return &v[1..v.len() - 1];
            }
        }
        v
    }
}

/// A parsed attribute declaration, one output column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// The token as the caller wrote it (`"name[lang=en]"`, `"$catalogVersion"`).
    #[serde(rename = "rawName")]
    pub raw_name: String,
    #[serde(rename = "baseName")]
    pub base_name: String,
    #[serde(rename = "nestedAttribute")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_attribute: Option<String>,
    pub qualifiers: Vec<Qualifier>,
    #[serde(rename = "isMacro")]
    pub is_macro: bool,
    /// Name of the macro this column was expanded from, without the `$`.
    #[serde(rename = "macroName")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macro_name: Option<String>,
    /// Full declaration emitted in the header. Equal to `raw_name` for plain
    /// attributes, the expanded text for macros.
    pub declaration: String,
}

impl AttributeSpec {
    /// Unquoted value of a qualifier.
    pub fn qualifier(&self, key: &str) -> Option<&str> {
        self.qualifiers
            .iter()
            .find(|q| q.key == key)
            .map(Qualifier::unquoted)
    }

    pub fn is_unique(&self) -> bool {
        self.qualifier("unique")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn default_value(&self) -> Option<&str> {
        self.qualifier("default")
    }

    /// Name under which the dynamic accessor exposes this column.
    pub fn accessor_name(&self) -> &str {
        self.macro_name.as_deref().unwrap_or(&self.base_name)
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Raw value stored for one column of an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    /// List-typed column; `None` elements are dropped when rendered.
    List(Vec<Option<String>>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Text form used by accessors and the record line.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::List(items) => items
                .iter()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        }
    }
}

/// Input accepted when building an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValues {
    /// One value per column, in declaration order.
    Positional(Vec<Value>),
    /// Attribute name (resolved fuzzily) to value; omitted columns stay null.
    Named(Vec<(String, Value)>),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Header mode of a type block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Insert,
    Update,
    #[default]
    InsertUpdate,
    Remove,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::Insert => "INSERT",
            ImportMode::Update => "UPDATE",
            ImportMode::InsertUpdate => "INSERT_UPDATE",
            ImportMode::Remove => "REMOVE",
        }
    }
}

/// Outcome of fuzzy attribute matching. Indices point into the type's specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(usize),
    /// Declarations of every column the query matched.
    Ambiguous(Vec<String>),
    NotFound,
}

/// One rendered output file of an [`crate::ImpexResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpexFile {
    pub name: String,
    pub content: String,
}
