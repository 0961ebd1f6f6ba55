use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::attribute::{parse_declaration, split_top_level};
use crate::error::{ImpexError, Result};
use crate::types::AttributeSpec;

static RE_MACRO_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z_]\w*)$").unwrap());

/// Named declaration fragments referenced as `$name` in attribute lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    definitions: BTreeMap<String, String>,
}

impl MacroTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name=declaration` definitions separated by `;` or line breaks.
    ///
    /// Names may carry a leading `$`. Only the first `=` separates name and
    /// body, so bodies can hold qualifiers such as `[default='a:b']`.
    pub fn parse(source: &str) -> Result<Self> {
        let mut table = Self::new();
        for definition in split_top_level(source, |c| c == ';' || c == '\n', source)? {
            if definition.starts_with('#') {
                continue;
            }
            let (name, body) = definition.split_once('=').ok_or_else(|| {
                ImpexError::syntax(definition, "macro definition must be name=declaration")
            })?;
            table.define(name, body)?;
        }
        Ok(table)
    }

    /// Add or replace a definition.
    pub fn define(&mut self, name: &str, body: &str) -> Result<()> {
        let name = name.trim();
        let caps = RE_MACRO_NAME
            .captures(name)
            .ok_or_else(|| ImpexError::syntax(name, "invalid macro name"))?;
        let body = body.trim();
        if body.is_empty() {
            return Err(ImpexError::syntax(name, "macro body is empty"));
        }
        self.definitions.insert(caps[1].to_string(), body.to_string());
        Ok(())
    }

    /// Body of a macro, looked up without the `$`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.definitions
            .get(name.trim_start_matches('$'))
            .map(String::as_str)
    }

    /// Take over every definition of `other`, replacing same-named ones.
    pub fn merge(&mut self, other: MacroTable) {
        self.definitions.extend(other.definitions);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.definitions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand one declaration token against this table.
    pub fn expand(&self, token: &str) -> Result<Vec<AttributeSpec>> {
        parse_declaration(token, self)
    }
}

impl TryFrom<BTreeMap<String, String>> for MacroTable {
    type Error = ImpexError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self> {
        let mut table = Self::new();
        for (name, body) in &map {
            table.define(name, body)?;
        }
        Ok(table)
    }
}
