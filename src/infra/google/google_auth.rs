// =============================================================================
// GOOGLE OAUTH2 ACCESS TOKENS
// =============================================================================
//
// Two ways to obtain a bearer token for the Slides and Drive APIs:
//
// 1. **Service account** (`GOOGLE_SERVICE_ACCOUNT_KEY` / `GOOGLE_SERVICE_ACCOUNT_JSON`):
//    a signed JWT is exchanged for a token. The template and the shared
//    folder must be shared with the service account email.
//
// 2. **Authorized user** (`GOOGLE_TOKEN_FILE`): a `token.json` holding a
//    refresh token from a previous consent flow. The refresh-token grant is
//    used whenever the stored token has expired.
//
// Both cache the token until shortly before it expires.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::core::slides::DeckError;

const SCOPES: &str =
    "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/presentations";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens are renewed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Something that can hand out a valid Google access token.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, DeckError>;
}

#[async_trait]
impl AccessTokenProvider for Box<dyn AccessTokenProvider> {
    async fn access_token(&self) -> Result<String, DeckError> {
        (**self).access_token().await
    }
}

/// Cached access token with expiration.
#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at > SystemTime::now() + EXPIRY_MARGIN
    }
}

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

fn auth_error(e: impl std::fmt::Display) -> DeckError {
    DeckError::Auth(e.to_string())
}

async fn read_cached(cache: &RwLock<Option<CachedToken>>) -> Option<String> {
    let cached = cache.read().await;
    cached
        .as_ref()
        .filter(|token| token.is_fresh())
        .map(|token| token.token.clone())
}

async fn exchange(client: &Client, token_uri: &str, form: &[(&str, &str)]) -> Result<CachedToken, DeckError> {
    let response = client
        .post(token_uri)
        .form(form)
        .send()
        .await
        .map_err(auth_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(DeckError::Auth(format!(
            "Token exchange failed ({}): {}",
            status, text
        )));
    }

    let token: TokenResponse = response.json().await.map_err(auth_error)?;
    Ok(CachedToken {
        token: token.access_token,
        expires_at: SystemTime::now() + Duration::from_secs(token.expires_in),
    })
}

// =============================================================================
// SERVICE ACCOUNT
// =============================================================================

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
}

pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    pub async fn from_file(path: &str) -> Result<Self, DeckError> {
        let content = tokio::fs::read_to_string(path).await.map_err(auth_error)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, DeckError> {
        let credentials: ServiceAccountCredentials =
            serde_json::from_str(json).map_err(auth_error)?;
        Ok(Self {
            credentials,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    async fn fetch_new_token(&self) -> Result<CachedToken, DeckError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(auth_error)?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(auth_error)?;
        let jwt = encode(&header, &claims, &key).map_err(auth_error)?;

        exchange(
            &self.client,
            &self.credentials.token_uri,
            &[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ],
        )
        .await
    }
}

#[async_trait]
impl AccessTokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, DeckError> {
        if let Some(token) = read_cached(&self.cached_token).await {
            return Ok(token);
        }

        let fresh = self.fetch_new_token().await?;
        tracing::debug!(account = %self.credentials.client_email, "Fetched service account token");
        let token = fresh.token.clone();
        *self.cached_token.write().await = Some(fresh);
        Ok(token)
    }
}

// =============================================================================
// AUTHORIZED USER (token.json)
// =============================================================================

/// The `token.json` written by Google's client libraries after consent.
#[derive(Debug, Clone, Deserialize)]
struct AuthorizedUserToken {
    #[serde(default)]
    token: Option<String>,
    refresh_token: String,
    client_id: String,
    client_secret: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
    #[serde(default)]
    expiry: Option<String>,
}

pub struct AuthorizedUserAuth {
    credentials: AuthorizedUserToken,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl AuthorizedUserAuth {
    pub async fn from_file(path: &str) -> Result<Self, DeckError> {
        let content = tokio::fs::read_to_string(path).await.map_err(auth_error)?;
        Self::from_json(&content)
    }

    /// Parses a `token.json`. A stored access token that is still valid is
    /// used until it expires.
    pub fn from_json(json: &str) -> Result<Self, DeckError> {
        let credentials: AuthorizedUserToken = serde_json::from_str(json).map_err(auth_error)?;

        let stored = credentials.token.clone().and_then(|token| {
            let expiry = credentials.expiry.as_deref()?;
            let expires_at = parse_expiry(expiry)?;
            Some(CachedToken { token, expires_at })
        });

        Ok(Self {
            credentials,
            client: Client::new(),
            cached_token: Arc::new(RwLock::new(stored)),
        })
    }
}

/// `2025-07-22T10:33:11.123456Z`; older files omit the zone suffix.
fn parse_expiry(expiry: &str) -> Option<SystemTime> {
    let parsed = DateTime::parse_from_rfc3339(expiry)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(expiry, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.and_utc())
        })
        .ok()?;
    let secs = u64::try_from(parsed.timestamp()).ok()?;
    Some(UNIX_EPOCH + Duration::from_secs(secs))
}

#[async_trait]
impl AccessTokenProvider for AuthorizedUserAuth {
    async fn access_token(&self) -> Result<String, DeckError> {
        if let Some(token) = read_cached(&self.cached_token).await {
            return Ok(token);
        }

        tracing::info!("Refreshing Google user token");
        let fresh = exchange(
            &self.client,
            &self.credentials.token_uri,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", self.credentials.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ],
        )
        .await?;

        let token = fresh.token.clone();
        *self.cached_token.write().await = Some(fresh);
        Ok(token)
    }
}
