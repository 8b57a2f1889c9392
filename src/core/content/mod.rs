pub mod content_mapper;
pub mod report_models;

pub use content_mapper::{deck_content, forecast_content, forecast_tables, persona_slots};
pub use report_models::{MediaplanReport, ReportError};
