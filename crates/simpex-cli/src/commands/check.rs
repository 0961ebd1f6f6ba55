use std::path::Path;

use simpex_core::ImpexType;

use crate::build_project;

pub fn run_check(input_path: &Path, format: &str) -> Result<String, String> {
    let project = build_project(input_path, None)?;
    let types = project.result.types();

    if format == "json" {
        let summary: Vec<serde_json::Value> = types
            .iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name(),
                    "mode": t.mode(),
                    "columns": t.attribute_specs(),
                    "entries": t.entries().len(),
                    "afterEach": t.after_each().len(),
                    "duplicateKeys": t.duplicate_keys(),
                })
            })
            .collect();
        let output = serde_json::json!({
            "project": project.name,
            "types": summary,
        });
        return serde_json::to_string_pretty(&output)
            .map_err(|e| format!("JSON serialization error: {e}"));
    }

    let mut lines: Vec<String> = types.iter().flat_map(describe).collect();
    let entry_count: usize = types.iter().map(|t| t.entries().len()).sum();
    let type_word = if types.len() == 1 { "type" } else { "types" };
    let entry_word = if entry_count == 1 { "entry" } else { "entries" };
    lines.push(format!(
        "{} {type_word}, {entry_count} {entry_word}.",
        types.len()
    ));
    Ok(lines.join("\n"))
}

fn describe(ty: &ImpexType) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {}: {} columns, {} entries",
        ty.mode().as_str(),
        ty.name(),
        ty.attribute_specs().len(),
        ty.entries().len()
    )];
    for key in ty.duplicate_keys() {
        lines.push(format!(
            "  warning: unique key [{}] used by more than one entry",
            key.join(", ")
        ));
    }
    lines
}
