//! Column layout of a type and the fuzzy matcher behind every name lookup.
//!
//! Matching runs in phases and stops at the first phase that finds anything:
//!
//! 1. exact match on the token as written or the full declaration
//! 2. for qualified queries (`name[lang=de]`), columns with the same base name
//!    whose qualifiers include every queried qualifier
//! 3. for bare queries, columns whose base name or macro name equals the query
//!
//! More than one hit in a phase is ambiguous; no hit in any phase is not found.

use std::collections::HashMap;

use tracing::trace;

use crate::attribute::parse_declaration;
use crate::catalogs::CATALOG_VERSION_MACRO;
use crate::error::{ImpexError, Result};
use crate::macros::MacroTable;
use crate::types::*;

#[derive(Debug)]
pub struct TypeSchema {
    name: String,
    specs: Vec<AttributeSpec>,
    /// Accessor name (base or macro name) to its precomputed resolution.
    accessors: HashMap<String, Resolution>,
}

impl TypeSchema {
    pub(crate) fn build<S: AsRef<str>>(
        name: &str,
        declarations: &[S],
        macros: &MacroTable,
    ) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ImpexError::shape(name, "type name is empty"));
        }

        let mut specs = Vec::new();
        for token in declarations {
            specs.extend(parse_declaration(token.as_ref(), macros)?);
        }
        if specs.is_empty() {
            return Err(ImpexError::shape(
                name,
                "a type needs at least one attribute",
            ));
        }
        let catalog_columns = specs
            .iter()
            .filter(|s| s.macro_name.as_deref() == Some(CATALOG_VERSION_MACRO))
            .count();
        if catalog_columns > 2 {
            return Err(ImpexError::shape(
                name,
                format!(
                    "${CATALOG_VERSION_MACRO} expands to {catalog_columns} columns, \
                     expected one or a catalog/version pair"
                ),
            ));
        }

        let mut schema = TypeSchema {
            name: name.to_string(),
            specs,
            accessors: HashMap::new(),
        };
        let accessors: HashMap<String, Resolution> = schema
            .specs
            .iter()
            .flat_map(|s| std::iter::once(s.base_name.as_str()).chain(s.macro_name.as_deref()))
            .map(|n| (n.to_string(), schema.resolve(n)))
            .collect();
        schema.accessors = accessors;
        Ok(schema)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn specs(&self) -> &[AttributeSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn resolve(&self, query: &str) -> Resolution {
        let query = query.trim();
        let outcome = self.match_exact(query).unwrap_or_else(|| {
            match crate::attribute::parse_plain(query) {
                Ok(wanted)
                    if wanted.nested_attribute.is_some() || !wanted.qualifiers.is_empty() =>
                {
                    self.collect(|s| qualifies(s, &wanted))
                }
                _ => self.collect(|s| {
                    s.base_name == query || s.macro_name.as_deref() == Some(query)
                }),
            }
        });
        trace!(type_name = %self.name, query, ?outcome, "resolved attribute");
        outcome
    }

    /// Column index for `query`, or the matching error.
    pub fn index_of(&self, query: &str) -> Result<usize> {
        self.into_index(query, self.resolve(query))
    }

    /// Column index through the accessor dispatch table.
    pub fn accessor(&self, name: &str) -> Result<usize> {
        match self.accessors.get(name) {
            Some(resolution) => self.into_index(name, resolution.clone()),
            None => Err(ImpexError::UnresolvedName {
                type_name: self.name.clone(),
                query: name.to_string(),
            }),
        }
    }

    /// Names exposed as dynamic accessors.
    pub fn accessor_names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }

    /// Columns expanded from the `$catalogVersion` macro: none, one holding
    /// `catalog:version`, or a catalog/version pair.
    pub fn catalog_version_columns(&self) -> Vec<usize> {
        self.specs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.macro_name.as_deref() == Some(CATALOG_VERSION_MACRO))
            .map(|(i, _)| i)
            .collect()
    }

    /// Columns declared with `unique=true`, in column order.
    pub fn unique_indices(&self) -> Vec<usize> {
        self.specs
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_unique())
            .map(|(i, _)| i)
            .collect()
    }

    fn match_exact(&self, query: &str) -> Option<Resolution> {
        match self.collect(|s| s.raw_name == query || s.declaration == query) {
            Resolution::NotFound => None,
            found => Some(found),
        }
    }

    fn collect<F>(&self, pred: F) -> Resolution
    where
        F: Fn(&AttributeSpec) -> bool,
    {
        let hits: Vec<usize> = self
            .specs
            .iter()
            .enumerate()
            .filter(|(_, s)| pred(s))
            .map(|(i, _)| i)
            .collect();
        match hits.as_slice() {
            [] => Resolution::NotFound,
            [single] => Resolution::Resolved(*single),
            many => Resolution::Ambiguous(
                many.iter()
                    .map(|&i| self.specs[i].declaration.clone())
                    .collect(),
            ),
        }
    }

    fn into_index(&self, query: &str, resolution: Resolution) -> Result<usize> {
        match resolution {
            Resolution::Resolved(i) => Ok(i),
            Resolution::Ambiguous(candidates) => Err(ImpexError::AmbiguousName {
                type_name: self.name.clone(),
                query: query.to_string(),
                candidates,
            }),
            Resolution::NotFound => Err(ImpexError::UnresolvedName {
                type_name: self.name.clone(),
                query: query.to_string(),
            }),
        }
    }
}

/// Whether `spec` carries every part the qualified query names.
fn qualifies(spec: &AttributeSpec, wanted: &AttributeSpec) -> bool {
    let same_name = spec.base_name == wanted.base_name
        || spec.macro_name.as_deref() == Some(wanted.base_name.as_str());
    if !same_name {
        return false;
    }
    if wanted.nested_attribute.is_some() && spec.nested_attribute != wanted.nested_attribute {
        return false;
    }
    wanted
        .qualifiers
        .iter()
        .all(|q| spec.qualifier(&q.key) == Some(q.unquoted()))
}
