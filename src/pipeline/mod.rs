pub mod collect;
pub mod orchestrator;
pub mod render;
pub mod summarize;
pub mod write;

pub use orchestrator::HtmlReportGenerator;
