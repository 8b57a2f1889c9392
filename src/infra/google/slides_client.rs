use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use super::google_auth::AccessTokenProvider;
use crate::core::slides::{DeckError, DeckService, Presentation, SlideRequest};

const SLIDES_API: &str = "https://slides.googleapis.com/v1/presentations";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";

#[derive(Debug, Deserialize)]
struct DriveFile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
}

/// Slides v1 + Drive v3 over HTTPS.
pub struct GoogleDeckClient<A: AccessTokenProvider> {
    http: Client,
    auth: A,
}

impl<A: AccessTokenProvider> GoogleDeckClient<A> {
    pub fn new(auth: A) -> Self {
        Self {
            http: Client::new(),
            auth,
        }
    }

    async fn token(&self) -> Result<String, DeckError> {
        self.auth.access_token().await
    }
}

/// `batchUpdate` request body; each edit may expand to several wire requests.
pub fn batch_body(requests: &[SlideRequest]) -> Value {
    let wire: Vec<Value> = requests.iter().flat_map(SlideRequest::to_wire).collect();
    json!({ "requests": wire })
}

async fn check(response: Response, what: &str) -> Result<Response, DeckError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(DeckError::Api(format!("{} failed ({}): {}", what, status, body)))
}

fn transport(e: reqwest::Error) -> DeckError {
    DeckError::Api(e.to_string())
}

fn decode(e: impl std::fmt::Display) -> DeckError {
    DeckError::Decode(e.to_string())
}

#[async_trait]
impl<A: AccessTokenProvider> DeckService for GoogleDeckClient<A> {
    async fn get_presentation(&self, presentation_id: &str) -> Result<Presentation, DeckError> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("{}/{}", SLIDES_API, presentation_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let response = check(response, "presentations.get").await?;
        let presentation: Presentation = response.json().await.map_err(decode)?;
        tracing::debug!(
            presentation_id,
            slides = presentation.slides.len(),
            "Fetched presentation"
        );
        Ok(presentation)
    }

    async fn batch_update(
        &self,
        presentation_id: &str,
        requests: &[SlideRequest],
    ) -> Result<(), DeckError> {
        let token = self.token().await?;
        let response = self
            .http
            .post(format!("{}/{}:batchUpdate", SLIDES_API, presentation_id))
            .bearer_auth(token)
            .json(&batch_body(requests))
            .send()
            .await
            .map_err(transport)?;

        check(response, "presentations.batchUpdate").await?;
        Ok(())
    }

    async fn copy_file(
        &self,
        source_id: &str,
        name: &str,
        parent_folder_id: Option<&str>,
    ) -> Result<String, DeckError> {
        let mut body = json!({ "name": name });
        if let Some(parent) = parent_folder_id {
            body["parents"] = json!([parent]);
        }

        let token = self.token().await?;
        let response = self
            .http
            .post(format!("{}/{}/copy", DRIVE_FILES_API, source_id))
            .query(&[("supportsAllDrives", "true"), ("fields", "id,name")])
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let response = check(response, "files.copy").await?;
        let file: DriveFile = response.json().await.map_err(decode)?;
        if file.id.is_empty() {
            return Err(DeckError::Decode("files.copy returned no id".into()));
        }
        tracing::info!(source_id, copy_id = %file.id, name, "Template copied");
        Ok(file.id)
    }

    async fn file_name(&self, file_id: &str) -> Result<String, DeckError> {
        let token = self.token().await?;
        let response = self
            .http
            .get(format!("{}/{}", DRIVE_FILES_API, file_id))
            .query(&[("supportsAllDrives", "true"), ("fields", "id,name")])
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;

        let response = check(response, "files.get").await?;
        let file: DriveFile = response.json().await.map_err(decode)?;
        Ok(file.name)
    }

    async fn rename_file(&self, file_id: &str, name: &str) -> Result<(), DeckError> {
        let token = self.token().await?;
        let response = self
            .http
            .patch(format!("{}/{}", DRIVE_FILES_API, file_id))
            .query(&[("supportsAllDrives", "true")])
            .bearer_auth(token)
            .json(&json!({ "name": name }))
            .send()
            .await
            .map_err(transport)?;

        check(response, "files.update").await?;
        Ok(())
    }
}
