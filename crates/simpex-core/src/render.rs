//! Line layout of the import text.
//!
//! ```text
//! INSERT_UPDATE Product;code[unique=true];name[lang=en]
//! ;555;myproduct
//! #%afterEach: impex.getLastImportedItem()...
//! ```

use std::borrow::Cow;

use crate::catalogs::{AFTER_EACH_PREFIX, FIELD_SEPARATOR};
use crate::entry::TypeEntry;
use crate::schema::TypeSchema;
use crate::types::ImportMode;

pub fn header_line(mode: ImportMode, schema: &TypeSchema) -> String {
    let mut line = format!("{} {}", mode.as_str(), schema.name());
    for spec in schema.specs() {
        line.push_str(FIELD_SEPARATOR);
        line.push_str(&escape_field(&spec.declaration));
    }
    line
}

/// Record lines start with an empty field, the header's type column.
pub fn record_line(entry: &TypeEntry) -> String {
    let mut line = String::new();
    for field in entry.fields() {
        line.push_str(FIELD_SEPARATOR);
        line.push_str(&escape_field(&field));
    }
    line
}

pub fn after_each_line(statement: &str) -> String {
    if statement.starts_with("#%") {
        statement.to_string()
    } else {
        format!("{AFTER_EACH_PREFIX}{statement}")
    }
}

/// Quote a field holding the separator, a double quote or a line break.
pub fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(FIELD_SEPARATOR) || field.contains(['"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
