// =============================================================================
// SERVICE ACCOUNT AUTHENTICATION
// =============================================================================
//
// OAuth2 for server-to-server access: sign a JWT with the service account's
// private key, exchange it at the token endpoint for a bearer token, and cache
// that token until shortly before it expires.
//
// **Setup:**
// 1. Create a service account in Google Cloud Console and enable the Sheets API
// 2. Create a JSON key for it
// 3. Share each spreadsheet with the service account email (Editor access,
//    pivot tables are written back into the spreadsheet)
// 4. Point `GOOGLE_SERVICE_ACCOUNT_KEY` at the key file, or put its content in
//    `GOOGLE_SERVICE_ACCOUNT_JSON`

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use super::sheets_client::SheetsApiError;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Tokens are refreshed once they are this close to expiry.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Service account credentials from the JSON key file.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    /// Used as the JWT issuer.
    client_email: String,

    /// PEM-encoded RSA key.
    private_key: String,

    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// JWT claims for Google OAuth2.
#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    /// At most one hour after `iat`.
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

impl CachedToken {
    fn is_fresh(&self, now: SystemTime) -> bool {
        self.expires_at > now + REFRESH_MARGIN
    }
}

/// Authenticator that handles OAuth2 with service account credentials.
pub struct ServiceAccountAuth {
    credentials: ServiceAccountCredentials,
    client: Client,
    scope: String,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    pub async fn from_file(path: &str) -> Result<Self, SheetsApiError> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            SheetsApiError::Auth(format!("Failed to read service account key {}: {}", path, e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SheetsApiError> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)
            .map_err(|e| SheetsApiError::Auth(format!("Invalid service account JSON: {}", e)))?;
        Ok(Self {
            credentials,
            client: Client::new(),
            scope: SHEETS_SCOPE.to_string(),
            cached_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Returns a valid access token, refreshing it if necessary.
    pub async fn get_access_token(&self) -> Result<String, SheetsApiError> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_fresh(SystemTime::now()) {
                    return Ok(token.token.clone());
                }
            }
        }

        let response = self.fetch_new_token().await?;
        let token = response.access_token.clone();

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(CachedToken {
                token: response.access_token,
                expires_at: SystemTime::now() + Duration::from_secs(response.expires_in),
            });
        }

        Ok(token)
    }

    fn signed_assertion(&self) -> Result<String, SheetsApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| SheetsApiError::Auth(e.to_string()))?
            .as_secs();

        let claims = JwtClaims {
            iss: self.credentials.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.credentials.token_uri.clone(),
            iat: now,
            exp: now + 3600,
        };

        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| SheetsApiError::Auth(format!("Invalid private key: {}", e)))?;
        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| SheetsApiError::Auth(format!("Failed to sign JWT: {}", e)))
    }

    async fn fetch_new_token(&self) -> Result<TokenResponse, SheetsApiError> {
        let jwt = self.signed_assertion()?;

        tracing::debug!(
            client_email = %self.credentials.client_email,
            "Requesting new Google access token"
        );

        let response = self
            .client
            .post(&self.credentials.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", jwt.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(SheetsApiError::Auth(format!(
                "Token exchange failed ({}): {}",
                status, text
            )));
        }

        Ok(response.json().await?)
    }
}
