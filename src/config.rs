use std::env::{self, VarError};

use crate::error::{AppError, AppResult};
use crate::report::{Ingress, ReportMetadata, ReportRequest};

pub const INPUT_DIRECTORY: &str = "INPUT_DIRECTORY";
pub const OUTPUT_DIRECTORY: &str = "OUTPUT_DIRECTORY";
pub const INGRESS_CONTROLLER: &str = "INGRESS_CONTROLLER";
pub const CONTROLLER_VERSION: &str = "CONTROLLER_VERSION";
pub const BUILD: &str = "BUILD";
pub const RELEASE: &str = "RELEASE";

#[derive(Debug, Clone)]
pub struct Config {
    pub input_directory: String,
    pub output_directory: String,
    pub ingress_controller: Option<String>,
    pub controller_version: Option<String>,
    pub build: Option<String>,
    pub release: Option<String>,
    pub environment: String,
    pub otel_service_name: String,
    pub otel_exporter_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        Self::from_vars(|name| env::var(name))
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Empty values count as unset. Required variables are checked in
    /// order and the first missing one is reported. A value that is set
    /// but not UTF-8 is rejected as invalid rather than missing.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_vars(|name| lookup(name).ok_or(VarError::NotPresent))
    }

    fn from_vars<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let var = |name: &'static str| -> AppResult<Option<String>> {
            match lookup(name) {
                Ok(value) if !value.is_empty() => Ok(Some(value)),
                Ok(_) | Err(VarError::NotPresent) => Ok(None),
                Err(VarError::NotUnicode(_)) => Err(AppError::InvalidVariable(name)),
            }
        };
        let required = |name: &'static str| -> AppResult<String> {
            var(name)?.ok_or(AppError::MissingVariable(name))
        };

        let input_directory = required(INPUT_DIRECTORY)?;
        let output_directory = required(OUTPUT_DIRECTORY)?;

        Ok(Self {
            input_directory,
            output_directory,
            ingress_controller: var(INGRESS_CONTROLLER)?,
            controller_version: var(CONTROLLER_VERSION)?,
            build: var(BUILD)?,
            release: var(RELEASE)?,
            environment: var("REPORTS_ENVIRONMENT")?.unwrap_or_else(|| "development".to_string()),
            otel_service_name: var("OTEL_SERVICE_NAME")?
                .unwrap_or_else(|| "conformance-reports".to_string()),
            otel_exporter_endpoint: var("OTEL_EXPORTER_OTLP_ENDPOINT")?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn report_request(&self) -> AppResult<ReportRequest> {
        let request = ReportRequest::new(&self.input_directory, &self.output_directory)?
            .with_ingress(Ingress::from_labels(
                self.ingress_controller.as_deref(),
                self.controller_version.as_deref(),
            ))
            .with_metadata(ReportMetadata {
                build: self.build.clone(),
                release: self.release.clone(),
            });

        Ok(request)
    }
}
