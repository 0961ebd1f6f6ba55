use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use simpex_core::catalogs::FILE_EXTENSION;
use simpex_core::ImpexResult;

/// Write `result` below `dir`: one file per type, or `<name>.impex` holding
/// everything when `single_file` is set. Returns the written paths.
pub fn write_result(
    dir: &Path,
    result: &ImpexResult,
    single_file: Option<&str>,
) -> Result<Vec<PathBuf>, String> {
    fs::create_dir_all(dir)
        .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;

    let outputs: Vec<(String, String)> = match single_file {
        Some(name) => vec![(format!("{name}.{FILE_EXTENSION}"), result.render())],
        None => result
            .files()
            .into_iter()
            .map(|f| (f.name, f.content))
            .collect(),
    };

    let mut written = Vec::new();
    for (name, content) in outputs {
        let path = dir.join(name);
        fs::write(&path, format!("{content}\n"))
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        info!(path = %path.display(), "wrote impex file");
        written.push(path);
    }
    Ok(written)
}
