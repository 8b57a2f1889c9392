use std::collections::HashSet;

use super::deck_service::{DeckError, DeckService};
use super::slides_models::SlideRequest;

/// Collects the requests of one reconciliation pass and sends them as a single
/// batch: text content first, then tables, then slide deletions.
#[derive(Debug, Default)]
pub struct EditBatch {
    content: Vec<SlideRequest>,
    tables: Vec<SlideRequest>,
    deletions: Vec<SlideRequest>,
    deleted_ids: HashSet<String>,
}

impl EditBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_content(&mut self, requests: impl IntoIterator<Item = SlideRequest>) {
        self.content.extend(requests);
    }

    pub fn add_tables(&mut self, requests: impl IntoIterator<Item = SlideRequest>) {
        self.tables.extend(requests);
    }

    /// Queues object deletions; an object is only ever deleted once.
    pub fn add_deletions(&mut self, requests: impl IntoIterator<Item = SlideRequest>) {
        for request in requests {
            if self.deleted_ids.insert(request.object_id().to_string()) {
                self.deletions.push(request);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.content.len() + self.tables.len() + self.deletions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All requests, in submission order.
    pub fn into_requests(self) -> Vec<SlideRequest> {
        let mut requests = self.content;
        requests.extend(self.tables);
        requests.extend(self.deletions);
        requests
    }

    /// Sends the batch. An empty batch is not sent. Returns the number of
    /// requests submitted; service errors are passed through unchanged.
    pub async fn submit<D: DeckService + ?Sized>(
        self,
        deck: &D,
        presentation_id: &str,
    ) -> Result<usize, DeckError> {
        if self.is_empty() {
            tracing::info!(presentation_id, "No matching tags found, nothing to update");
            return Ok(0);
        }

        let requests = self.into_requests();
        let count = requests.len();
        deck.batch_update(presentation_id, &requests).await?;
        tracing::info!(presentation_id, requests = count, "Batch update applied");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slides::slides_models::{CellLocation, Presentation, TextRange};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingDeck {
        batches: Mutex<Vec<Vec<SlideRequest>>>,
        fail: bool,
    }

    impl RecordingDeck {
        fn new(fail: bool) -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl DeckService for RecordingDeck {
        async fn get_presentation(&self, _id: &str) -> Result<Presentation, DeckError> {
            Ok(Presentation::default())
        }

        async fn batch_update(&self, _id: &str, requests: &[SlideRequest]) -> Result<(), DeckError> {
            if self.fail {
                return Err(DeckError::Api("500 backend error".into()));
            }
            self.batches.lock().unwrap().push(requests.to_vec());
            Ok(())
        }

        async fn copy_file(
            &self,
            _source_id: &str,
            _name: &str,
            _parent: Option<&str>,
        ) -> Result<String, DeckError> {
            Ok("copy".into())
        }

        async fn file_name(&self, _file_id: &str) -> Result<String, DeckError> {
            Ok(String::new())
        }

        async fn rename_file(&self, _file_id: &str, _name: &str) -> Result<(), DeckError> {
            Ok(())
        }
    }

    fn delete_text(id: &str) -> SlideRequest {
        SlideRequest::DeleteText {
            object_id: id.into(),
            cell: None,
            range: TextRange::All,
        }
    }

    fn cell(id: &str) -> SlideRequest {
        SlideRequest::ReplaceTableCellText {
            object_id: id.into(),
            cell: CellLocation {
                row_index: 1,
                column_index: 0,
            },
            clear: Some(TextRange::All),
            text: "x".into(),
        }
    }

    fn delete_object(id: &str) -> SlideRequest {
        SlideRequest::DeleteObject {
            object_id: id.into(),
        }
    }

    #[test]
    fn test_sections_flatten_in_fixed_order() {
        let mut batch = EditBatch::new();
        batch.add_deletions(vec![delete_object("slide_7")]);
        batch.add_tables(vec![cell("table")]);
        batch.add_content(vec![delete_text("shape")]);

        let ids: Vec<String> = batch
            .into_requests()
            .iter()
            .map(|r| r.object_id().to_string())
            .collect();
        assert_eq!(ids, vec!["shape", "table", "slide_7"]);
    }

    #[test]
    fn test_duplicate_deletions_are_dropped() {
        let mut batch = EditBatch::new();
        batch.add_deletions(vec![delete_object("a"), delete_object("b")]);
        batch.add_deletions(vec![delete_object("a")]);
        assert_eq!(batch.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_sends_one_batch() {
        let deck = RecordingDeck::new(false);
        let mut batch = EditBatch::new();
        batch.add_content(vec![delete_text("shape")]);
        batch.add_deletions(vec![delete_object("slide")]);

        let sent = batch.submit(&deck, "deck").await.unwrap();
        assert_eq!(sent, 2);
        assert_eq!(deck.batches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_not_sent() {
        let deck = RecordingDeck::new(true);
        let sent = EditBatch::new().submit(&deck, "deck").await.unwrap();
        assert_eq!(sent, 0);
    }

    #[tokio::test]
    async fn test_service_failure_is_surfaced() {
        let deck = RecordingDeck::new(true);
        let mut batch = EditBatch::new();
        batch.add_content(vec![delete_text("shape")]);

        let err = batch.submit(&deck, "deck").await.unwrap_err();
        assert!(matches!(err, DeckError::Api(_)));
    }
}
