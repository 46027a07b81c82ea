//! # Service Account Auth
//!
//! Google bearer tokens from a service-account key file (`credentials.json`).
//!
//! 1. Sign a short-lived RS256 JWT with the key's private key
//! 2. Exchange it at the key's `token_uri` using the `jwt-bearer` grant
//! 3. Cache the access token until one minute before it expires
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use crate::{Result, StoreError};

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Deserialize, Debug, Clone)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).await.map_err(|e| {
            StoreError::Credentials(format!("cannot read {}: {e}", path.display()))
        })?;

        serde_json::from_str(&raw)
            .map_err(|e| StoreError::Credentials(format!("invalid key file: {e}")))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    TOKEN_LIFETIME_SECS
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct TokenSource {
    key: ServiceAccountKey,
    client: Client,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    pub fn new(key: ServiceAccountKey, client: Client) -> Self {
        Self {
            key,
            client,
            cached: RwLock::new(None),
        }
    }

    pub async fn token(&self) -> Result<String> {
        let now = Utc::now();

        if let Some(cached) = self.cached.read().await.as_ref() {
            if is_fresh(cached.expires_at, now) {
                return Ok(cached.token.clone());
            }
        }

        let mut slot = self.cached.write().await;
        if let Some(cached) = slot.as_ref() {
            if is_fresh(cached.expires_at, now) {
                return Ok(cached.token.clone());
            }
        }

        let fresh = self.fetch(now).await?;
        let token = fresh.token.clone();
        *slot = Some(fresh);

        Ok(token)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };

        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;

        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    async fn fetch(&self, now: DateTime<Utc>) -> Result<CachedToken> {
        debug!("Requesting access token for {}", self.key.client_email);

        let assertion = self.assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Credentials(format!(
                "token exchange failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = response.json().await?;
        info!("Obtained access token valid for {}s", token.expires_in);

        Ok(CachedToken {
            token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

fn is_fresh(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at - now > Duration::seconds(REFRESH_MARGIN_SECS)
}
