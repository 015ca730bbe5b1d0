use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{Config, INPUT_DIRECTORY, OUTPUT_DIRECTORY};
use crate::error::{AppError, AppResult};
use crate::pipeline::summarize::RunSummary;

pub const PAGE_FOOTER: &str = r#"<p><a href="https://github.com/kubernetes-sigs/ingress-controller-conformance">Kubernetes ingress controller conformance</a></p>"#;

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingress {
    pub controller: String,
    pub version: String,
}

impl Ingress {
    /// Labels that are absent or empty fall back to `N/A`.
    pub fn from_labels(controller: Option<&str>, version: Option<&str>) -> Self {
        let label = |value: Option<&str>| {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or(NOT_AVAILABLE)
                .to_string()
        };

        Self {
            controller: label(controller),
            version: label(version),
        }
    }
}

impl Default for Ingress {
    fn default() -> Self {
        Self::from_labels(None, None)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
}

impl ReportMetadata {
    fn is_empty(&self) -> bool {
        self.build.is_none() && self.release.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub json_dir: String,
    pub report_path: String,
    pub page_footer: String,
    pub ingress: Ingress,
    #[serde(default, skip_serializing_if = "ReportMetadata::is_empty")]
    pub metadata: ReportMetadata,
}

impl ReportRequest {
    pub fn new(json_dir: &str, report_path: &str) -> AppResult<Self> {
        if json_dir.is_empty() {
            return Err(AppError::MissingVariable(INPUT_DIRECTORY));
        }
        if report_path.is_empty() {
            return Err(AppError::MissingVariable(OUTPUT_DIRECTORY));
        }

        Ok(Self {
            json_dir: json_dir.to_string(),
            report_path: report_path.to_string(),
            page_footer: PAGE_FOOTER.to_string(),
            ingress: Ingress::default(),
            metadata: ReportMetadata::default(),
        })
    }

    pub fn with_ingress(mut self, ingress: Ingress) -> Self {
        self.ingress = ingress;
        self
    }

    pub fn with_metadata(mut self, metadata: ReportMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub id: Uuid,
    pub index_path: PathBuf,
    pub trends_path: PathBuf,
    pub summary: RunSummary,
}

/// Turns a validated request into report artifacts.
pub trait ReportGenerator {
    fn generate(&self, request: &ReportRequest) -> AppResult<GeneratedReport>;
}

/// Validates the configuration and hands the resulting request to the
/// generator exactly once.
#[tracing::instrument(
    name = "reports run",
    skip_all,
    fields(report.json_dir, report.path, ingress.controller, ingress.version)
)]
pub fn run<G>(config: &Config, generator: &G) -> AppResult<GeneratedReport>
where
    G: ReportGenerator + ?Sized,
{
    let request = config.report_request()?;

    let span = tracing::Span::current();
    span.record("report.json_dir", request.json_dir.as_str());
    span.record("report.path", request.report_path.as_str());
    span.record("ingress.controller", request.ingress.controller.as_str());
    span.record("ingress.version", request.ingress.version.as_str());

    tracing::info!(
        json_dir = %request.json_dir,
        report_path = %request.report_path,
        "Generating conformance report"
    );

    generator.generate(&request)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingGenerator {
        calls: Mutex<Vec<ReportRequest>>,
        fail: bool,
    }

    impl ReportGenerator for RecordingGenerator {
        fn generate(&self, request: &ReportRequest) -> AppResult<GeneratedReport> {
            self.calls.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(AppError::NoResults(PathBuf::from(&request.json_dir)));
            }
            Ok(GeneratedReport {
                id: Uuid::nil(),
                index_path: PathBuf::from(&request.report_path).join("index.html"),
                trends_path: PathBuf::from(&request.report_path).join("trends.json"),
                summary: RunSummary::default(),
            })
        }
    }

    fn config(vars: &[(&str, &str)]) -> AppResult<Config> {
        Config::from_lookup(|name| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn test_new_rejects_empty_paths() {
        assert!(matches!(
            ReportRequest::new("", "/b"),
            Err(AppError::MissingVariable("INPUT_DIRECTORY"))
        ));
        assert!(matches!(
            ReportRequest::new("/a", ""),
            Err(AppError::MissingVariable("OUTPUT_DIRECTORY"))
        ));
    }

    #[test]
    fn test_ingress_labels() {
        assert_eq!(
            Ingress::from_labels(None, Some("")),
            Ingress {
                controller: "N/A".to_string(),
                version: "N/A".to_string(),
            }
        );
        assert_eq!(
            Ingress::from_labels(Some("contour"), Some("1.27.0")),
            Ingress {
                controller: "contour".to_string(),
                version: "1.27.0".to_string(),
            }
        );
    }

    #[test]
    fn test_run_invokes_generator_once() {
        let generator = RecordingGenerator::default();
        let config = config(&[("INPUT_DIRECTORY", "/a"), ("OUTPUT_DIRECTORY", "/b")]).unwrap();

        let report = run(&config, &generator).unwrap();
        assert_eq!(report.index_path, PathBuf::from("/b/index.html"));

        let calls = generator.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let request = &calls[0];
        assert_eq!(request.json_dir, "/a");
        assert_eq!(request.report_path, "/b");
        assert_eq!(request.ingress.controller, "N/A");
        assert_eq!(request.ingress.version, "N/A");
        assert!(!request.page_footer.is_empty());
    }

    #[test]
    fn test_run_propagates_generator_error() {
        let generator = RecordingGenerator {
            fail: true,
            ..Default::default()
        };
        let config = config(&[("INPUT_DIRECTORY", "/a"), ("OUTPUT_DIRECTORY", "/b")]).unwrap();

        let err = run(&config, &generator).unwrap_err();
        assert!(matches!(err, AppError::NoResults(_)));
        assert_eq!(generator.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config_never_reaches_generator() {
        let generator = RecordingGenerator::default();
        let mut config = config(&[("INPUT_DIRECTORY", "/a"), ("OUTPUT_DIRECTORY", "/b")]).unwrap();
        config.output_directory.clear();

        let err = run(&config, &generator).unwrap_err();
        assert!(err.to_string().contains("OUTPUT_DIRECTORY"));
        assert!(generator.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_request_serializes_with_camel_case_keys() {
        let request = ReportRequest::new("/a", "/b").unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "jsonDir": "/a",
                "reportPath": "/b",
                "pageFooter": PAGE_FOOTER,
                "ingress": { "controller": "N/A", "version": "N/A" },
            })
        );
    }

    #[test]
    fn test_identical_environments_build_identical_requests() {
        let vars = [
            ("INPUT_DIRECTORY", "/a"),
            ("OUTPUT_DIRECTORY", "/b"),
            ("INGRESS_CONTROLLER", "traefik"),
        ];
        let first = RecordingGenerator::default();
        let second = RecordingGenerator::default();
        run(&config(&vars).unwrap(), &first).unwrap();
        run(&config(&vars).unwrap(), &second).unwrap();

        let first = serde_json::to_vec(&first.calls.lock().unwrap()[0]).unwrap();
        let second = serde_json::to_vec(&second.calls.lock().unwrap()[0]).unwrap();
        assert_eq!(first, second);
    }
}
