use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::forecast::CohortData;

/// Outcome of the last generation for a cohort, as kept in the record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaplanRecord {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_slides_url: Option<String>,
}

impl MediaplanRecord {
    pub fn success(cohort_name: &str, url: &str) -> Self {
        Self {
            status: Some("success".to_string()),
            message: Some(format!("Mediaplan generated successfully for {}", cohort_name)),
            google_slides_url: Some(url.to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Some("error".to_string()),
            message: Some(message.into()),
            google_slides_url: None,
        }
    }

    /// The stored deck URL, if any non-blank one was recorded.
    pub fn url(&self) -> Option<&str> {
        self.google_slides_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub cohort_name: String,
    /// Pre-fetched data; fetched from the data source when absent.
    pub data: Option<CohortData>,
}

impl GenerateRequest {
    pub fn new(cohort_name: impl Into<String>) -> Self {
        Self {
            cohort_name: cohort_name.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: CohortData) -> Self {
        self.data = Some(data);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDeck {
    pub task_id: String,
    pub presentation_id: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Running,
    Completed,
    Failed,
}

/// Progress of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskInfo {
    pub task_id: String,
    pub cohort_name: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub message: String,
    pub google_slides_url: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Result of one refresh pass over the stored decks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshSummary {
    pub refreshed: Vec<String>,
    /// Cohorts without a usable deck URL.
    pub skipped: Vec<String>,
    /// Cohort and error message.
    pub failed: Vec<(String, String)>,
}

impl RefreshSummary {
    pub fn total(&self) -> usize {
        self.refreshed.len() + self.skipped.len() + self.failed.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateAllSummary {
    pub generated: Vec<(String, String)>,
    pub failed: Vec<(String, String)>,
}
