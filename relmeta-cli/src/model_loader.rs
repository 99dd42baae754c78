//! Model loader
//!
//! Reads content-type definitions from `*.json` files under a directory,
//! recursively. A file holds either one model object or an array of models.
//! Files are visited in path order so the compiled output never depends on
//! the file system's directory ordering.

use anyhow::{bail, Context};
use relmeta::{parse_model, parse_models, Model};
use std::fs;
use std::path::{Path, PathBuf};

const SKIPPED_DIRS: [&str; 4] = ["target", ".git", "node_modules", ".venv"];

/// Models read from one file
#[derive(Debug)]
pub struct ModelFile {
    pub path: PathBuf,
    pub models: Vec<Model>,
}

/// Load every model under `path`, which may also be a single JSON file.
pub fn load_models(path: &Path) -> anyhow::Result<Vec<Model>> {
    Ok(load_model_files(path)?
        .into_iter()
        .flat_map(|file| file.models)
        .collect())
}

/// Load models grouped by the file they came from.
pub fn load_model_files(path: &Path) -> anyhow::Result<Vec<ModelFile>> {
    if !path.exists() {
        bail!("Models path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    if path.is_file() {
        files.push(path.to_path_buf());
    } else {
        collect_json_files(path, &mut files)?;
    }
    files.sort();

    let mut loaded = Vec::with_capacity(files.len());
    for file in files {
        let content = fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let models = parse_file(&content)
            .with_context(|| format!("invalid model file {}", file.display()))?;
        log::debug!("loaded {} model(s) from {}", models.len(), file.display());
        loaded.push(ModelFile { path: file, models });
    }

    Ok(loaded)
}

fn parse_file(content: &str) -> relmeta::Result<Vec<Model>> {
    if content.trim_start().starts_with('[') {
        parse_models(content)
    } else {
        parse_model(content).map(|model| vec![model])
    }
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if path.is_dir() {
            if SKIPPED_DIRS.contains(&name.as_str()) {
                continue;
            }
            collect_json_files(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_accepts_object_or_array() {
        let object = r#"{ "uid": "api::a.a", "singularName": "a", "tableName": "as" }"#;
        assert_eq!(parse_file(object).unwrap().len(), 1);

        let array = format!("  [{object}, {}]", object.replace("api::a.a", "api::b.b"));
        assert_eq!(parse_file(&array).unwrap().len(), 2);
    }
}
