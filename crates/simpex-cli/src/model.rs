use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use simpex_core::{EntryValues, ImpexResult, ImpexType, ImportMode, MacroTable};

use crate::reader::ModelFile;

/// Top-level layout of a `*.simpex.yaml` file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDocument {
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
    /// `$name=declaration;...` form, applied before `macros`.
    pub macro_source: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDef {
    pub name: String,
    #[serde(default)]
    pub mode: ImportMode,
    pub attributes: Vec<String>,
    /// Rows stay dynamic so list/map/other shapes are judged by the core.
    #[serde(default)]
    pub entries: Vec<serde_json::Value>,
    #[serde(default)]
    pub after_each: Vec<String>,
}

/// Build every type of every file, in file order, into one result.
pub fn build_result(
    files: &[ModelFile],
    shared: &MacroTable,
    destination: &str,
) -> Result<ImpexResult, String> {
    let mut result = ImpexResult::new(destination);

    for file in files {
        let doc: ModelDocument = serde_yaml::from_str(&file.content)
            .map_err(|e| format!("{}: invalid model: {e}", file.path))?;
        let macros = file_macros(&doc, shared).map_err(|e| format!("{}: {e}", file.path))?;

        for def in &doc.types {
            let ty = build_type(def, &macros).map_err(|e| format!("{}: {e}", file.path))?;
            debug!(
                file = %file.path,
                type_name = %ty.name(),
                entries = ty.entries().len(),
                "built type"
            );
            result.push(ty);
        }
    }

    Ok(result)
}

fn file_macros(doc: &ModelDocument, shared: &MacroTable) -> Result<MacroTable, String> {
    let mut macros = shared.clone();
    if let Some(ref source) = doc.macro_source {
        macros.merge(MacroTable::parse(source).map_err(|e| e.to_string())?);
    }
    macros.merge(MacroTable::try_from(doc.macros.clone()).map_err(|e| e.to_string())?);
    Ok(macros)
}

fn build_type(def: &TypeDef, macros: &MacroTable) -> Result<ImpexType, String> {
    let mut ty = ImpexType::with_macros(&def.name, &def.attributes, macros)
        .map_err(|e| e.to_string())?
        .with_mode(def.mode);

    for (i, row) in def.entries.iter().enumerate() {
        EntryValues::from_json(&def.name, row)
            .and_then(|values| ty.add_entry(values).map(|_| ()))
            .map_err(|e| format!("{} entry {}: {e}", def.name, i + 1))?;
    }
    for statement in &def.after_each {
        ty.push_after_each(statement.clone());
    }
    Ok(ty)
}
