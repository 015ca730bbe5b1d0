use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use opentelemetry::KeyValue;
use uuid::Uuid;

use crate::cucumber::Status;
use crate::error::AppResult;
use crate::report::{GeneratedReport, ReportGenerator, ReportRequest};
use crate::telemetry::metrics::{
    REPORT_FEATURES, REPORT_GENERATION_DURATION, REPORT_RESULT_FILES, REPORT_SCENARIOS,
};

use super::render::{self, RenderParams};
use super::write::{self, MAX_TREND_ENTRIES, OutputLocation, TrendEntry};
use super::{collect, summarize};

/// Renders cucumber JSON results into a single HTML page plus a trend
/// history next to it.
#[derive(Debug, Clone)]
pub struct HtmlReportGenerator {
    trend_limit: usize,
}

impl HtmlReportGenerator {
    pub fn new() -> Self {
        Self {
            trend_limit: MAX_TREND_ENTRIES,
        }
    }

    pub fn with_trend_limit(mut self, trend_limit: usize) -> Self {
        self.trend_limit = trend_limit;
        self
    }
}

impl Default for HtmlReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for HtmlReportGenerator {
    #[tracing::instrument(
        name = "pipeline report",
        skip_all,
        fields(
            report.id,
            report.status,
            report.features,
            report.duration_ms,
        )
    )]
    fn generate(&self, request: &ReportRequest) -> AppResult<GeneratedReport> {
        let start = Instant::now();
        let id = Uuid::new_v4();
        let generated_at = Utc::now();

        let span = tracing::Span::current();
        span.record("report.id", id.to_string());

        // Stage 1: Load result files
        let collected = collect::collect(Path::new(&request.json_dir))?;

        // Stage 2: Roll up statuses
        let summary = summarize::summarize(&collected.features);

        // Stage 3: Render HTML
        let html = render::render_html(RenderParams {
            request,
            features: &collected.features,
            summary: &summary,
            report_id: id,
            generated_at,
        });

        // Stage 4: Write artifacts
        let location = OutputLocation::resolve(Path::new(&request.report_path));
        write::write_report(&location, &html)?;
        write::append_trend(
            &location.trends_path,
            TrendEntry::new(generated_at, request.metadata.build.clone(), &summary),
            self.trend_limit,
        )?;

        let duration = start.elapsed();
        record_metrics(collected.files.len(), &summary, duration.as_secs_f64());

        span.record("report.status", summary.status.as_str());
        span.record("report.features", summary.features.len());
        span.record("report.duration_ms", duration.as_millis() as u64);

        tracing::info!(
            index = %location.index_path.display(),
            status = %summary.status,
            features = summary.feature_counts.total(),
            scenarios = summary.scenario_counts.total(),
            failed_scenarios = summary.scenario_counts.failed,
            "Report generated"
        );

        Ok(GeneratedReport {
            id,
            index_path: location.index_path,
            trends_path: location.trends_path,
            summary,
        })
    }
}

fn record_metrics(files: usize, summary: &summarize::RunSummary, seconds: f64) {
    REPORT_GENERATION_DURATION.record(
        seconds,
        &[KeyValue::new("report.status", summary.status.as_str())],
    );
    REPORT_RESULT_FILES.record(files as f64, &[]);

    for status in Status::ALL {
        let features = summary.feature_counts.get(status) as u64;
        if features > 0 {
            REPORT_FEATURES.add(features, &[KeyValue::new("status", status.as_str())]);
        }
        let scenarios = summary.scenario_counts.get(status) as u64;
        if scenarios > 0 {
            REPORT_SCENARIOS.add(scenarios, &[KeyValue::new("status", status.as_str())]);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::error::AppError;
    use crate::report::{Ingress, ReportMetadata};
    use tempfile::TempDir;

    const RESULTS: &str = r#"[
      {
        "uri": "features/default_backend.feature",
        "keyword": "Feature",
        "name": "Default backend",
        "elements": [
          {
            "keyword": "Scenario",
            "name": "An Ingress with no rules should send all requests to the default backend",
            "type": "scenario",
            "steps": [
              {"keyword": "Given ", "name": "an Ingress resource named \"default-backend\"", "result": {"status": "passed", "duration": 1000}},
              {"keyword": "Then ", "name": "the response status-code must be 200", "result": {"status": "passed", "duration": 2000}}
            ]
          },
          {
            "keyword": "Scenario",
            "name": "Requests to unknown paths",
            "type": "scenario",
            "steps": [
              {"keyword": "Then ", "name": "the response status-code must be 404", "result": {"status": "failed", "error_message": "got 200"}}
            ]
          }
        ]
      }
    ]"#;

    fn request(input: &Path, output: &Path) -> ReportRequest {
        ReportRequest::new(input.to_str().unwrap(), output.to_str().unwrap())
            .unwrap()
            .with_ingress(Ingress::from_labels(Some("ingress-nginx"), Some("v1.9.4")))
            .with_metadata(ReportMetadata {
                build: Some("77".to_string()),
                release: None,
            })
    }

    #[test]
    fn test_generate_writes_report_and_trend() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("default_backend.feature-report.json"), RESULTS).unwrap();
        let report_dir = output.path().join("site");

        let generator = HtmlReportGenerator::new();
        let report = generator.generate(&request(input.path(), &report_dir)).unwrap();

        assert_eq!(report.index_path, report_dir.join("index.html"));
        assert_eq!(report.summary.status, Status::Failed);
        assert_eq!(report.summary.scenario_counts.passed, 1);
        assert_eq!(report.summary.scenario_counts.failed, 1);

        let html = fs::read_to_string(&report.index_path).unwrap();
        assert!(html.contains("Default backend"));
        assert!(html.contains("<dd>ingress-nginx</dd>"));
        assert!(html.contains("<dd>v1.9.4</dd>"));
        assert!(html.contains("got 200"));
        assert!(html.contains(&request(input.path(), &report_dir).page_footer));

        let trends = write::load_trends(&report.trends_path);
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].build.as_deref(), Some("77"));
        assert_eq!(trends[0].scenarios.failed, 1);
    }

    #[test]
    fn test_repeated_runs_accumulate_trends() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        fs::write(input.path().join("a-report.json"), RESULTS).unwrap();
        let report_file = output.path().join("conformance.html");

        let generator = HtmlReportGenerator::new().with_trend_limit(2);
        for _ in 0..3 {
            generator
                .generate(&request(input.path(), &report_file))
                .unwrap();
        }

        assert!(report_file.exists());
        let trends = write::load_trends(&output.path().join("trends.json"));
        assert_eq!(trends.len(), 2);
    }

    #[test]
    fn test_generate_without_results_writes_nothing() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let report_dir = output.path().join("site");

        let err = HtmlReportGenerator::new()
            .generate(&request(input.path(), &report_dir))
            .unwrap_err();
        assert!(matches!(err, AppError::NoResults(_)));
        assert!(!report_dir.exists());
    }
}
