use std::rc::Rc;

use crate::catalogs::CATALOG_VERSION_SEPARATOR;
use crate::error::{ImpexError, Result};
use crate::impex_type::ImpexType;
use crate::schema::TypeSchema;
use crate::types::{EntryValues, Value};

/// One record of a type, holding a value per declared column.
///
/// Entries are built against a type with [`TypeEntry::build`] and only become
/// part of it through [`ImpexType::register`].
#[derive(Debug, Clone)]
pub struct TypeEntry {
    schema: Rc<TypeSchema>,
    values: Vec<Value>,
}

impl TypeEntry {
    /// Validate `values` against the columns of `ty`.
    pub fn build(ty: &ImpexType, values: impl Into<EntryValues>) -> Result<Self> {
        let schema = ty.schema();
        let values = match values.into() {
            EntryValues::Positional(values) => {
                if values.len() != schema.len() {
                    return Err(ImpexError::shape(
                        schema.name(),
                        format!(
                            "expected {} values, given {}",
                            schema.len(),
                            values.len()
                        ),
                    ));
                }
                values
            }
            EntryValues::Named(pairs) => {
                let mut values = vec![Value::Null; schema.len()];
                let mut assigned = vec![false; schema.len()];
                for (name, value) in pairs {
                    let idx = schema
                        .index_of(&name)
                        .map_err(|e| ImpexError::shape(schema.name(), e.to_string()))?;
                    if assigned[idx] {
                        return Err(ImpexError::shape(
                            schema.name(),
                            format!(
                                "'{}' is given more than once",
                                schema.specs()[idx].declaration
                            ),
                        ));
                    }
                    assigned[idx] = true;
                    values[idx] = value;
                }
                values
            }
        };

        Ok(TypeEntry {
            schema: Rc::clone(schema),
            values,
        })
    }

    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &TypeSchema {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Stored value of the column `name` resolves to.
    pub fn value(&self, name: &str) -> Result<&Value> {
        let idx = self.schema.index_of(name)?;
        Ok(&self.values[idx])
    }

    /// Rendered value of the column `name` resolves to.
    pub fn get(&self, name: &str) -> Result<String> {
        self.value(name).map(Value::render)
    }

    /// Read a column through the accessor table (base name or macro name).
    pub fn attr(&self, name: &str) -> Result<String> {
        let idx = self.schema.accessor(name)?;
        Ok(self.values[idx].render())
    }

    /// `<value>:<catalogId>:<version>` for the column `name` resolves to.
    ///
    /// A single catalog-version column holds `catalog:version` and is split at
    /// its first `:`; everything after it is the version. A catalog/version
    /// column pair is read column by column. When the columns are empty, the
    /// first `default` qualifier of the expansion is used instead.
    pub fn cat_ver_specific(&self, name: &str) -> Result<String> {
        let columns = self.schema.catalog_version_columns();
        if columns.is_empty() {
            return Err(ImpexError::MissingCatalogVersion {
                type_name: self.schema.name().to_string(),
            });
        }
        let value = self.get(name)?;
        let sep = CATALOG_VERSION_SEPARATOR;

        let parts: Vec<String> = columns.iter().map(|&i| self.values[i].render()).collect();
        let mut catalog_version = match parts.as_slice() {
            [single] => single.clone(),
            [catalog, version] if !catalog.is_empty() || !version.is_empty() => {
                format!("{catalog}{sep}{version}")
            }
            _ => String::new(),
        };
        if catalog_version.is_empty() {
            let default = columns
                .iter()
                .find_map(|&i| self.schema.specs()[i].default_value());
            if let Some(default) = default {
                catalog_version = default.to_string();
            }
        }

        let formatted = catalog_version
            .split_once(sep)
            .filter(|(catalog, version)| !catalog.is_empty() && !version.is_empty())
            .map(|(catalog, version)| format!("{value}{sep}{catalog}{sep}{version}"));
        formatted.ok_or_else(|| ImpexError::MalformedCatalogVersion {
            type_name: self.schema.name().to_string(),
            value: catalog_version.clone(),
        })
    }

    /// Rendered values of the `unique=true` columns.
    pub fn unique_key(&self) -> Vec<String> {
        self.schema
            .unique_indices()
            .into_iter()
            .map(|i| self.values[i].render())
            .collect()
    }

    /// Rendered values in column order.
    pub fn fields(&self) -> Vec<String> {
        self.values.iter().map(Value::render).collect()
    }

    pub(crate) fn belongs_to(&self, schema: &Rc<TypeSchema>) -> bool {
        Rc::ptr_eq(&self.schema, schema)
    }
}
