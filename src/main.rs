use conformance_reports::telemetry::init_telemetry;
use conformance_reports::{Config, HtmlReportGenerator, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let telemetry_guard = init_telemetry(&config)?;

    tracing::info!(
        environment = %config.environment,
        "Starting conformance-reports"
    );

    let generator = HtmlReportGenerator::new();
    let result = run(&config, &generator);

    match &result {
        Ok(report) => tracing::info!(
            report_id = %report.id,
            index = %report.index_path.display(),
            status = %report.summary.status,
            "Report generation complete"
        ),
        Err(e) => tracing::error!(error = %e, "Report generation failed"),
    }

    telemetry_guard.shutdown();

    result?;

    Ok(())
}
