use std::path::Path;

use crate::build_project;
use crate::writer::write_result;

pub fn run_generate(
    input_path: &Path,
    output: Option<&Path>,
    single_file: bool,
) -> Result<String, String> {
    let project = build_project(input_path, output)?;
    let single = single_file.then_some(project.name.as_str());
    let written = write_result(&project.output_dir, &project.result, single)?;

    let mut lines: Vec<String> = written
        .iter()
        .map(|p| format!("Written {}", p.display()))
        .collect();
    let file_word = if written.len() == 1 { "file" } else { "files" };
    lines.push(format!(
        "{} {file_word}, {} types.",
        written.len(),
        project.result.types().len()
    ));
    Ok(lines.join("\n"))
}
