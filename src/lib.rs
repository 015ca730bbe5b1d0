pub mod config;
pub mod cucumber;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use pipeline::HtmlReportGenerator;
pub use report::{GeneratedReport, ReportGenerator, ReportRequest, run};
