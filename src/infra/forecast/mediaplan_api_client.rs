// REST client for the mediaplan forecast service and the audience-info
// service.
//
// Flow for one cohort:
//   GET  {MEDIAPLAN_URL}/get-all-mediaplan-cohorts        -> find by name
//   POST {AUDIENCE_INFO_URL}/getAudienceInfo              -> segment metadata
//   GET  {MEDIAPLAN_URL}/get-mediaplan-cohort-by-id/{id}  -> forecasts
//
// Each entry of `parentTemplatesInfo` carries its forecast as a JSON string in
// `result`; the first word of its `name` is the preset key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::forecast::{
    AudienceCatalog, AudienceForecast, AudienceInfo, CohortData, ForecastEntry, ForecastError,
    ForecastSource,
};

#[derive(Debug, Clone, Deserialize)]
struct CohortSummary {
    name: String,
    #[serde(default)]
    id: Value,
    #[serde(default)]
    abvrs: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CohortDetails {
    #[serde(default)]
    parent_templates_info: HashMap<String, ParentTemplate>,
}

#[derive(Debug, Deserialize)]
struct ParentTemplate {
    #[serde(default)]
    name: String,
    #[serde(default)]
    result: String,
}

#[derive(Debug, Deserialize)]
struct AudienceItem {
    abvr: String,
    #[serde(default)]
    audience_name: String,
    #[serde(default)]
    description: String,
}

pub struct MediaplanApiClient {
    http: Client,
    mediaplan_url: String,
    audience_info_url: Option<String>,
}

impl MediaplanApiClient {
    pub fn new(mediaplan_url: impl Into<String>, audience_info_url: Option<String>) -> Self {
        Self {
            http: Client::new(),
            mediaplan_url: mediaplan_url.into().trim_end_matches('/').to_string(),
            audience_info_url: audience_info_url.map(|url| url.trim_end_matches('/').to_string()),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ForecastError> {
        let response = self.http.get(url).send().await.map_err(api_error)?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ForecastError::Api(format!("GET {} ({}): {}", url, status, body)));
        }
        response
            .json()
            .await
            .map_err(|e| ForecastError::Payload(e.to_string()))
    }

    async fn all_cohorts(&self) -> Result<Vec<CohortSummary>, ForecastError> {
        self.get_json(&format!("{}/get-all-mediaplan-cohorts", self.mediaplan_url))
            .await
    }

    async fn find_cohort(&self, cohort_name: &str) -> Result<CohortSummary, ForecastError> {
        self.all_cohorts()
            .await?
            .into_iter()
            .find(|c| c.name == cohort_name)
            .ok_or_else(|| ForecastError::CohortNotFound(cohort_name.to_string()))
    }

    async fn forecast_for(&self, cohort: &CohortSummary) -> Result<AudienceForecast, ForecastError> {
        let id = match &cohort.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let details: CohortDetails = self
            .get_json(&format!(
                "{}/get-mediaplan-cohort-by-id/{}",
                self.mediaplan_url, id
            ))
            .await?;

        let forecast = parse_templates(&details.parent_templates_info)?;
        if forecast.is_empty() {
            return Err(ForecastError::NoTemplates(cohort.name.clone()));
        }
        tracing::debug!(cohort = %cohort.name, presets = forecast.preset_count(), "Fetched forecast");
        Ok(forecast)
    }

    /// Segment metadata; any failure yields an empty catalogue.
    async fn audience_catalog(&self, abvrs: &Value) -> AudienceCatalog {
        let Some(base) = &self.audience_info_url else {
            return AudienceCatalog::new();
        };

        match self.fetch_audiences(base, abvrs).await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!(error = %e, "Error getting audience data");
                AudienceCatalog::new()
            }
        }
    }

    async fn fetch_audiences(&self, base: &str, abvrs: &Value) -> Result<AudienceCatalog, ForecastError> {
        let request = self.http.post(format!("{}/getAudienceInfo", base));
        let request = match abvrs {
            Value::String(s) => request.body(s.clone()),
            other => request.json(other),
        };

        let response = request.send().await.map_err(api_error)?;
        if !response.status().is_success() {
            return Err(ForecastError::Api(format!(
                "getAudienceInfo returned {}",
                response.status()
            )));
        }
        let items: Vec<AudienceItem> = response
            .json()
            .await
            .map_err(|e| ForecastError::Payload(e.to_string()))?;

        Ok(items
            .into_iter()
            .map(|item| {
                (
                    item.abvr,
                    AudienceInfo {
                        name: item.audience_name,
                        description: item.description,
                    },
                )
            })
            .collect())
    }
}

fn api_error(e: reqwest::Error) -> ForecastError {
    ForecastError::Api(e.to_string())
}

/// Preset key -> geographies from the `parentTemplatesInfo` map. Geographies
/// whose numbers do not parse are dropped.
fn parse_templates(
    templates: &HashMap<String, ParentTemplate>,
) -> Result<AudienceForecast, ForecastError> {
    let mut forecast = AudienceForecast::default();

    for template in templates.values() {
        let Some(preset) = template.name.split_whitespace().next() else {
            continue;
        };

        let raw: HashMap<String, Value> = serde_json::from_str(&template.result).map_err(|e| {
            ForecastError::Payload(format!("preset '{}': {}", preset, e))
        })?;

        let geos: HashMap<String, ForecastEntry> = raw
            .into_iter()
            .filter_map(|(geo, value)| {
                serde_json::from_value::<ForecastEntry>(value)
                    .ok()
                    .map(|entry| (geo, entry))
            })
            .collect();

        forecast.insert(preset, geos);
    }

    Ok(forecast)
}

#[async_trait]
impl ForecastSource for MediaplanApiClient {
    async fn list_cohorts(&self) -> Result<Vec<String>, ForecastError> {
        Ok(self.all_cohorts().await?.into_iter().map(|c| c.name).collect())
    }

    async fn fetch_cohort_data(&self, cohort_name: &str) -> Result<CohortData, ForecastError> {
        let cohort = self.find_cohort(cohort_name).await?;
        let audiences = self.audience_catalog(&cohort.abvrs).await;
        let forecast = self.forecast_for(&cohort).await?;
        Ok(CohortData {
            forecast,
            audiences,
        })
    }

    async fn fetch_forecast(&self, cohort_name: &str) -> Result<AudienceForecast, ForecastError> {
        let cohort = self.find_cohort(cohort_name).await?;
        self.forecast_for(&cohort).await
    }
}
