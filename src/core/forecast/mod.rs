pub mod forecast_models;

use async_trait::async_trait;

pub use forecast_models::{
    AudienceCatalog, AudienceForecast, AudienceInfo, CohortData, ForecastEntry, Preset,
};

#[derive(Debug, thiserror::Error)]
pub enum ForecastError {
    #[error("Cohort '{0}' not found")]
    CohortNotFound(String),
    #[error("No forecast templates found for cohort '{0}'")]
    NoTemplates(String),
    #[error("Forecast API error: {0}")]
    Api(String),
    #[error("Malformed forecast payload: {0}")]
    Payload(String),
    #[error("Forecast service is not configured")]
    NotConfigured,
}

/// Where cohort lists, audience metadata and forecasts come from.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn list_cohorts(&self) -> Result<Vec<String>, ForecastError>;

    async fn fetch_cohort_data(&self, cohort_name: &str) -> Result<CohortData, ForecastError>;

    /// Forecast numbers only; what the weekly refresh needs.
    async fn fetch_forecast(&self, cohort_name: &str) -> Result<AudienceForecast, ForecastError> {
        Ok(self.fetch_cohort_data(cohort_name).await?.forecast)
    }
}

/// An absent source fails every call, so commands that never touch the
/// forecast service can run without one.
#[async_trait]
impl<F: ForecastSource> ForecastSource for Option<F> {
    async fn list_cohorts(&self) -> Result<Vec<String>, ForecastError> {
        match self {
            Some(source) => source.list_cohorts().await,
            None => Err(ForecastError::NotConfigured),
        }
    }

    async fn fetch_cohort_data(&self, cohort_name: &str) -> Result<CohortData, ForecastError> {
        match self {
            Some(source) => source.fetch_cohort_data(cohort_name).await,
            None => Err(ForecastError::NotConfigured),
        }
    }

    async fn fetch_forecast(&self, cohort_name: &str) -> Result<AudienceForecast, ForecastError> {
        match self {
            Some(source) => source.fetch_forecast(cohort_name).await,
            None => Err(ForecastError::NotConfigured),
        }
    }
}
