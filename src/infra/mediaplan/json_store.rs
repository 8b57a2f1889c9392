use crate::core::mediaplan::{MediaplanRecord, MediaplanStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;

/// Records kept in one JSON object keyed by cohort name, the same file the
/// scheduler reads. Cached in memory and rewritten on every save.
pub struct JsonMediaplanStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, MediaplanRecord>>,
}

impl JsonMediaplanStore {
    /// Loads the file if it exists; a missing file starts an empty store.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), records = records.len(), "Loaded mediaplan records");

        Ok(Self {
            path,
            cache: RwLock::new(records),
        })
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let json = {
            let cache = self.cache.read().await;
            serde_json::to_string_pretty(&*cache)?
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaplanStore for JsonMediaplanStore {
    async fn get_record(&self, cohort_name: &str) -> Result<Option<MediaplanRecord>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache.get(cohort_name).cloned())
    }

    async fn save_record(&self, cohort_name: &str, record: MediaplanRecord) -> Result<(), StoreError> {
        let mut cache = self.cache.write().await;
        cache.insert(cohort_name.to_string(), record);
        drop(cache); // Release lock before persisting
        self.persist().await
    }

    async fn all_records(&self) -> Result<Vec<(String, MediaplanRecord)>, StoreError> {
        let cache = self.cache.read().await;
        Ok(cache
            .iter()
            .map(|(name, record)| (name.clone(), record.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("mediaplan_responses.json");

        let store = JsonMediaplanStore::open(&path).await.unwrap();
        store
            .save_record(
                "Food Lovers",
                MediaplanRecord::success("Food Lovers", "https://drive.google.com/file/d/abc"),
            )
            .await
            .unwrap();
        store
            .save_record("Gamers", MediaplanRecord::error("quota exceeded"))
            .await
            .unwrap();

        let reopened = JsonMediaplanStore::open(&path).await.unwrap();
        let records = reopened.all_records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].0, "Food Lovers");
        assert_eq!(
            records[0].1.url(),
            Some("https://drive.google.com/file/d/abc")
        );
        assert!(reopened.get_record("Gamers").await.unwrap().unwrap().url().is_none());
    }

    #[tokio::test]
    async fn test_reads_existing_response_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mediaplan_responses.json");
        std::fs::write(
            &path,
            r#"{
                "College Students": {
                    "status": "success",
                    "message": "Mediaplan generated successfully for College Students",
                    "google_slides_url": "https://docs.google.com/presentation/d/xyz"
                },
                "Travellers": {"status": "error", "message": "boom"}
            }"#,
        )
        .unwrap();

        let store = JsonMediaplanStore::open(&path).await.unwrap();
        let record = store.get_record("College Students").await.unwrap().unwrap();
        assert_eq!(record.url(), Some("https://docs.google.com/presentation/d/xyz"));
        assert!(store.get_record("Travellers").await.unwrap().unwrap().url().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            JsonMediaplanStore::open(&path).await,
            Err(StoreError::Serialization(_))
        ));
    }
}
