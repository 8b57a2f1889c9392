use async_trait::async_trait;

use super::slides_models::{Presentation, SlideRequest};

/// Errors raised by the document service.
#[derive(Debug, thiserror::Error)]
pub enum DeckError {
    #[error("Authentication failed: {0}")]
    Auth(String),
    #[error("Slides API error: {0}")]
    Api(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// The document-service capability the reconciliation code needs. Passed in
/// explicitly so tests can use an in-memory fake.
#[async_trait]
pub trait DeckService: Send + Sync {
    /// Fetches the full presentation snapshot.
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, DeckError>;

    /// Applies `requests` atomically, in order.
    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[SlideRequest],
    ) -> Result<(), DeckError>;

    /// Copies a file into `parent_folder_id` under `name`; returns the new id.
    async fn copy_file(
        &self,
        source_id: &str,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, DeckError>;

    async fn file_name(&self, file_id: &str) -> Result<String, DeckError>;

    async fn rename_file(&self, file_id: &str, name: &str) -> Result<(), DeckError>;
}
