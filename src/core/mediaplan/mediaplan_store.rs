use super::mediaplan_models::MediaplanRecord;
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Cohort name -> last generation outcome.
#[async_trait]
pub trait MediaplanStore: Send + Sync {
    async fn get_record(&self, cohort_name: &str) -> Result<Option<MediaplanRecord>, StoreError>;
    async fn save_record(&self, cohort_name: &str, record: MediaplanRecord) -> Result<(), StoreError>;
    /// All records, ordered by cohort name.
    async fn all_records(&self) -> Result<Vec<(String, MediaplanRecord)>, StoreError>;
}
