use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "simpex.config.yaml";

/// A model file with its path and content.
pub struct ModelFile {
    pub path: String,
    pub content: String,
}

/// Project configuration from simpex.config.yaml.
#[derive(Debug, Default, Deserialize)]
pub struct SimpexConfig {
    pub name: Option<String>,
    /// Output directory, relative to the config file.
    pub output: Option<PathBuf>,
    pub sources: Option<Vec<String>>,
    /// Macros shared by every model file of the project.
    #[serde(default)]
    pub macros: BTreeMap<String, String>,
}

/// Read model files from a path (file or directory).
pub fn read_model_files(input_path: &Path) -> Result<Vec<ModelFile>, String> {
    if !input_path.exists() {
        return Err(format!("Path does not exist: {}", input_path.display()));
    }

    if input_path.is_file() {
        let content = fs::read_to_string(input_path)
            .map_err(|e| format!("Failed to read {}: {}", input_path.display(), e))?;
        return Ok(vec![ModelFile {
            path: input_path.to_string_lossy().to_string(),
            content,
        }]);
    }

    if input_path.is_dir() {
        let config_path = input_path.join(CONFIG_FILE);
        if config_path.exists() {
            return read_from_config(&config_path, input_path);
        }
        return scan_directory(input_path);
    }

    Err(format!(
        "Path is neither a file nor a directory: {}",
        input_path.display()
    ))
}

/// Read project config if the input is a directory holding simpex.config.yaml.
pub fn read_project_config(input_path: &Path) -> Result<Option<SimpexConfig>, String> {
    if !input_path.is_dir() {
        return Ok(None);
    }
    let config_path = input_path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    load_config(&config_path).map(Some)
}

fn load_config(config_path: &Path) -> Result<SimpexConfig, String> {
    let content =
        fs::read_to_string(config_path).map_err(|e| format!("Failed to read config: {}", e))?;
    serde_yaml::from_str(&content).map_err(|e| format!("Invalid YAML config: {}", e))
}

fn scan_directory(dir_path: &Path) -> Result<Vec<ModelFile>, String> {
    let mut paths: Vec<PathBuf> = Vec::new();

    for pattern in ["**/*.simpex.yaml", "**/*.simpex.yml"] {
        let pattern_str = dir_path.join(pattern).to_string_lossy().replace('\\', "/");
        let entries =
            glob::glob(&pattern_str).map_err(|e| format!("Invalid glob pattern: {}", e))?;

        for entry in entries {
            match entry {
                Ok(path) => {
                    if !paths.contains(&path) {
                        paths.push(path);
                    }
                }
                Err(e) => {
                    return Err(format!("Glob error: {}", e));
                }
            }
        }
    }

    paths.sort();
    read_paths(paths)
}

fn read_from_config(config_path: &Path, base_dir: &Path) -> Result<Vec<ModelFile>, String> {
    let config = load_config(config_path)?;

    let source_patterns = match config.sources {
        Some(ref s) if !s.is_empty() => s.clone(),
        _ => return scan_directory(base_dir),
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in &source_patterns {
        let pattern_str = base_dir.join(pattern).to_string_lossy().replace('\\', "/");
        let entries = glob::glob(&pattern_str)
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

        let mut matched: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => {
                    if !paths.contains(&path) && !matched.contains(&path) {
                        matched.push(path);
                    }
                }
                Err(e) => return Err(format!("Glob error: {}", e)),
            }
        }
        // Source order decides type order, so sort within a pattern only
        matched.sort();
        paths.extend(matched);
    }

    read_paths(paths)
}

fn read_paths(paths: Vec<PathBuf>) -> Result<Vec<ModelFile>, String> {
    let mut files = Vec::new();
    for path in paths {
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        files.push(ModelFile {
            path: path.to_string_lossy().to_string(),
            content,
        });
    }
    Ok(files)
}
