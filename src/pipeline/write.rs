use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::summarize::{Counts, RunSummary};

pub const INDEX_FILE: &str = "index.html";
pub const TRENDS_FILE: &str = "trends.json";
pub const MAX_TREND_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub index_path: PathBuf,
    pub trends_path: PathBuf,
}

impl OutputLocation {
    /// A path ending in `.html`/`.htm` names the report file itself; any
    /// other path is a directory that receives `index.html`.
    pub fn resolve(report_path: &Path) -> Self {
        let is_file = report_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));

        if is_file {
            let dir = report_path
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Self {
                index_path: report_path.to_path_buf(),
                trends_path: dir.join(TRENDS_FILE),
            }
        } else {
            Self {
                index_path: report_path.join(INDEX_FILE),
                trends_path: report_path.join(TRENDS_FILE),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendEntry {
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    pub features: Counts,
    pub scenarios: Counts,
    pub steps: Counts,
    pub duration_ns: u64,
}

impl TrendEntry {
    pub fn new(generated_at: DateTime<Utc>, build: Option<String>, summary: &RunSummary) -> Self {
        Self {
            generated_at,
            build,
            features: summary.feature_counts,
            scenarios: summary.scenario_counts,
            steps: summary.step_counts,
            duration_ns: summary.duration_ns,
        }
    }
}

#[tracing::instrument(
    name = "pipeline_stage write",
    skip_all,
    fields(pipeline.stage = "write", report.index = %location.index_path.display())
)]
pub fn write_report(location: &OutputLocation, html: &str) -> AppResult<()> {
    if let Some(dir) = location.index_path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir).map_err(AppError::io(dir))?;
    }

    fs::write(&location.index_path, html).map_err(AppError::io(&location.index_path))
}

/// Reads the trend history. A missing file starts a new history; an
/// unreadable or malformed one is discarded.
pub fn load_trends(path: &Path) -> Vec<TrendEntry> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Discarding unreadable trend history");
            return Vec::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Discarding malformed trend history");
            Vec::new()
        }
    }
}

/// Appends `entry` and keeps only the newest `limit` entries.
pub fn append_trend(path: &Path, entry: TrendEntry, limit: usize) -> AppResult<Vec<TrendEntry>> {
    let mut entries = load_trends(path);
    entries.push(entry);
    if entries.len() > limit {
        let excess = entries.len() - limit;
        entries.drain(..excess);
    }

    let json = serde_json::to_vec_pretty(&entries)?;
    fs::write(path, json).map_err(AppError::io(path))?;

    tracing::debug!(path = %path.display(), entries = entries.len(), "Trend history updated");

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(seconds: i64) -> TrendEntry {
        TrendEntry {
            generated_at: DateTime::from_timestamp(seconds, 0).unwrap(),
            build: None,
            features: Counts::default(),
            scenarios: Counts {
                passed: 3,
                ..Default::default()
            },
            steps: Counts::default(),
            duration_ns: 0,
        }
    }

    #[test]
    fn test_resolve_directory() {
        let location = OutputLocation::resolve(Path::new("/reports/run"));
        assert_eq!(location.index_path, PathBuf::from("/reports/run/index.html"));
        assert_eq!(location.trends_path, PathBuf::from("/reports/run/trends.json"));
    }

    #[test]
    fn test_resolve_html_file() {
        let location = OutputLocation::resolve(Path::new("/reports/conformance.HTML"));
        assert_eq!(location.index_path, PathBuf::from("/reports/conformance.HTML"));
        assert_eq!(location.trends_path, PathBuf::from("/reports/trends.json"));

        let location = OutputLocation::resolve(Path::new("report.html"));
        assert_eq!(location.trends_path, PathBuf::from("./trends.json"));
    }

    #[test]
    fn test_write_report_creates_directories() {
        let temp = TempDir::new().unwrap();
        let location = OutputLocation::resolve(&temp.path().join("nested").join("out"));

        write_report(&location, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&location.index_path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_append_trend_keeps_newest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(TRENDS_FILE);

        for seconds in 0..5 {
            append_trend(&path, entry(seconds), 3).unwrap();
        }

        let entries = load_trends(&path);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], entry(2));
        assert_eq!(entries[2], entry(4));
    }

    #[test]
    fn test_malformed_history_is_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(TRENDS_FILE);
        fs::write(&path, "not json").unwrap();

        let entries = append_trend(&path, entry(7), MAX_TREND_ENTRIES).unwrap();
        assert_eq!(entries, vec![entry(7)]);
    }
}
