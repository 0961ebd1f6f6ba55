use std::path::Path;

use crate::build_project;

pub fn run_headers(input_path: &Path) -> Result<String, String> {
    let project = build_project(input_path, None)?;
    Ok(project
        .result
        .types()
        .iter()
        .map(|t| t.header_line())
        .collect::<Vec<_>>()
        .join("\n"))
}
