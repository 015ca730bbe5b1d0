use std::fs;
use std::path::{Path, PathBuf};

use crate::cucumber::Feature;
use crate::error::{AppError, AppResult};

use super::write::TRENDS_FILE;

#[derive(Debug)]
pub struct CollectResult {
    pub files: Vec<PathBuf>,
    pub features: Vec<Feature>,
}

/// Loads every cucumber JSON file below `json_dir`, in path order.
#[tracing::instrument(
    name = "pipeline_stage collect",
    skip_all,
    fields(
        pipeline.stage = "collect",
        report.json_dir = %json_dir.display(),
        report.files,
        report.features,
    )
)]
pub fn collect(json_dir: &Path) -> AppResult<CollectResult> {
    let mut files = Vec::new();
    find_result_files(json_dir, &mut files)?;
    files.sort();

    if files.is_empty() {
        return Err(AppError::NoResults(json_dir.to_path_buf()));
    }

    let mut features = Vec::new();
    for file in &files {
        let loaded = read_features(file)?;
        tracing::debug!(file = %file.display(), features = loaded.len(), "Loaded result file");
        features.extend(loaded);
    }

    let span = tracing::Span::current();
    span.record("report.files", files.len());
    span.record("report.features", features.len());

    Ok(CollectResult { files, features })
}

fn find_result_files(dir: &Path, files: &mut Vec<PathBuf>) -> AppResult<()> {
    let entries = fs::read_dir(dir).map_err(AppError::io(dir))?;

    for entry in entries {
        let entry = entry.map_err(AppError::io(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(AppError::io(&path))?;

        if file_type.is_dir() {
            find_result_files(&path, files)?;
        } else if is_result_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_result_file(path: &Path) -> bool {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let is_trends = path.file_name().is_some_and(|name| name == TRENDS_FILE);
    is_json && !is_trends
}

/// Parses one result file. Blank files (an aborted run) hold no features.
pub fn read_features(path: &Path) -> AppResult<Vec<Feature>> {
    let content = fs::read(path).map_err(AppError::io(path))?;

    if content.iter().all(u8::is_ascii_whitespace) {
        tracing::warn!(file = %path.display(), "Skipping empty result file");
        return Ok(Vec::new());
    }

    serde_json::from_slice(&content).map_err(|source| AppError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
