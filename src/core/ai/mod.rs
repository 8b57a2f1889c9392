pub mod ai_service;
pub mod models;
pub mod report_pipeline;

pub use ai_service::{AiProvider, AiService};
pub use models::{AiConfig, AiMessage, AiProviderResponse};
pub use report_pipeline::{ReportGenerator, ReportPipeline};
