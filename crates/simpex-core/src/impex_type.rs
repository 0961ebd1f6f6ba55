use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::debug;

use crate::entry::TypeEntry;
use crate::error::{ImpexError, Result};
use crate::macros::MacroTable;
use crate::render;
use crate::schema::TypeSchema;
use crate::types::*;

/// A named block of the import: declared columns, records and after-each
/// statements.
#[derive(Debug)]
pub struct ImpexType {
    schema: Rc<TypeSchema>,
    mode: ImportMode,
    entries: Vec<TypeEntry>,
    after_each: Vec<String>,
}

impl ImpexType {
    /// Declare a type without macros.
    pub fn new<S: AsRef<str>>(name: &str, declarations: &[S]) -> Result<Self> {
        Self::with_macros(name, declarations, &MacroTable::new())
    }

    /// Declare a type whose `$name` tokens expand through `macros`.
    pub fn with_macros<S: AsRef<str>>(
        name: &str,
        declarations: &[S],
        macros: &MacroTable,
    ) -> Result<Self> {
        let schema = TypeSchema::build(name, declarations, macros)?;
        debug!(type_name = %schema.name(), columns = schema.len(), "declared type");
        Ok(ImpexType {
            schema: Rc::new(schema),
            mode: ImportMode::default(),
            entries: Vec::new(),
            after_each: Vec::new(),
        })
    }

    pub fn with_mode(mut self, mode: ImportMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    pub fn schema(&self) -> &Rc<TypeSchema> {
        &self.schema
    }

    pub fn attribute_specs(&self) -> &[AttributeSpec] {
        self.schema.specs()
    }

    pub fn entries(&self) -> &[TypeEntry] {
        &self.entries
    }

    pub fn after_each(&self) -> &[String] {
        &self.after_each
    }

    /// Append a statement emitted after the record block.
    pub fn push_after_each(&mut self, statement: impl Into<String>) {
        self.after_each.push(statement.into());
    }

    pub fn resolve(&self, query: &str) -> Resolution {
        self.schema.resolve(query)
    }

    /// Validate values into an entry without registering it.
    pub fn build_entry(&self, values: impl Into<EntryValues>) -> Result<TypeEntry> {
        TypeEntry::build(self, values)
    }

    /// Append an entry built against this type.
    pub fn register(&mut self, entry: TypeEntry) -> Result<&TypeEntry> {
        if !entry.belongs_to(&self.schema) {
            return Err(ImpexError::shape(
                self.name(),
                format!("entry was built for type '{}'", entry.type_name()),
            ));
        }
        self.entries.push(entry);
        debug!(type_name = %self.name(), entries = self.entries.len(), "registered entry");
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Build and register in one step. Nothing is registered on error.
    pub fn add_entry(&mut self, values: impl Into<EntryValues>) -> Result<&TypeEntry> {
        let entry = self.build_entry(values)?;
        self.register(entry)
    }

    /// Entries whose rendered value for `attr` equals `value`.
    pub fn find_by(&self, attr: &str, value: &str) -> Result<Vec<&TypeEntry>> {
        let idx = self.schema.index_of(attr)?;
        Ok(self
            .entries
            .iter()
            .filter(|e| e.values()[idx].render() == value)
            .collect())
    }

    /// Remove every entry `find_by` would return; returns how many were removed.
    pub fn unregister_by(&mut self, attr: &str, value: &str) -> Result<usize> {
        let idx = self.schema.index_of(attr)?;
        let before = self.entries.len();
        self.entries.retain(|e| e.values()[idx].render() != value);
        let removed = before - self.entries.len();
        debug!(type_name = %self.name(), attr, value, removed, "unregistered entries");
        Ok(removed)
    }

    /// Entry positions grouped by the values of the `unique=true` columns.
    /// Empty when the type declares no unique column.
    pub fn unique_index(&self) -> BTreeMap<Vec<String>, Vec<usize>> {
        let mut index: BTreeMap<Vec<String>, Vec<usize>> = BTreeMap::new();
        if self.schema.unique_indices().is_empty() {
            return index;
        }
        for (pos, entry) in self.entries.iter().enumerate() {
            index.entry(entry.unique_key()).or_default().push(pos);
        }
        index
    }

    /// Unique keys shared by more than one entry.
    pub fn duplicate_keys(&self) -> Vec<Vec<String>> {
        self.unique_index()
            .into_iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(key, _)| key)
            .collect()
    }

    pub fn header_line(&self) -> String {
        render::header_line(self.mode, &self.schema)
    }

    pub fn record_lines(&self) -> Vec<String> {
        self.entries.iter().map(render::record_line).collect()
    }

    pub fn after_each_lines(&self) -> Vec<String> {
        self.after_each
            .iter()
            .map(|s| render::after_each_line(s))
            .collect()
    }

    /// Header, records and after-each statements as one block.
    pub fn render(&self) -> String {
        let mut lines = vec![self.header_line()];
        lines.extend(self.record_lines());
        lines.extend(self.after_each_lines());
        lines.join("\n")
    }
}
