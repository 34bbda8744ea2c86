// ABOUTME: Google authentication for the course-agent application
// ABOUTME: Supplies bearer tokens from a static token or a service-account key

use crate::config::GoogleConfig;
use crate::errors::{AgentError, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::{debug, info};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Scopes the workflow needs: mail, sharing, documents and presentations
pub const SCOPES: [&str; 4] = [
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/presentations",
];

/// Service account credentials from the JSON key file
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountCredentials {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: u64,
    exp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    token: String,
    expires_at: SystemTime,
}

/// Source of bearer tokens for Google API calls
pub struct GoogleAuth {
    source: TokenSource,
}

enum TokenSource {
    /// Token issued elsewhere, e.g. by an installed-app OAuth flow
    Static(String),
    ServiceAccount {
        credentials: ServiceAccountCredentials,
        subject: Option<String>,
        client: Client,
        cached: Mutex<Option<CachedToken>>,
    },
}

impl GoogleAuth {
    /// Build an authenticator from configuration
    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        if let Some(token) = &config.access_token {
            info!("Using pre-issued Google access token");
            return Ok(Self::with_token(token));
        }

        let json = if let Some(path) = &config.service_account_key {
            fs::read_to_string(path)?
        } else if let Some(json) = &config.service_account_json {
            json.clone()
        } else {
            return Err(AgentError::ConfigError(
                "Set GOOGLE_ACCESS_TOKEN, GOOGLE_SERVICE_ACCOUNT_KEY or GOOGLE_SERVICE_ACCOUNT_JSON"
                    .to_string(),
            ));
        };

        Self::service_account(&json, config.delegated_user.clone())
    }

    /// Use a fixed bearer token
    pub fn with_token(token: &str) -> Self {
        Self {
            source: TokenSource::Static(token.to_string()),
        }
    }

    /// Build a service-account authenticator from key JSON
    pub fn service_account(json: &str, subject: Option<String>) -> Result<Self> {
        let credentials: ServiceAccountCredentials = serde_json::from_str(json)
            .map_err(|e| AgentError::AuthError(format!("Invalid service account key: {}", e)))?;
        info!("Using service account {}", credentials.client_email);
        Ok(Self {
            source: TokenSource::ServiceAccount {
                credentials,
                subject,
                client: Client::new(),
                cached: Mutex::new(None),
            },
        })
    }

    /// Get a valid access token, refreshing if necessary
    pub fn access_token(&self) -> Result<String> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount {
                credentials,
                subject,
                client,
                cached,
            } => {
                let mut cached = cached
                    .lock()
                    .map_err(|_| AgentError::AuthError("token cache poisoned".to_string()))?;
                if let Some(token) = cached.as_ref() {
                    if token.expires_at > SystemTime::now() + Duration::from_secs(60) {
                        return Ok(token.token.clone());
                    }
                }

                let (token, lifetime) = fetch_token(client, credentials, subject.as_deref())?;
                *cached = Some(CachedToken {
                    token: token.clone(),
                    expires_at: SystemTime::now() + lifetime,
                });
                Ok(token)
            }
        }
    }
}

fn fetch_token(
    client: &Client,
    credentials: &ServiceAccountCredentials,
    subject: Option<&str>,
) -> Result<(String, Duration)> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AgentError::AuthError(e.to_string()))?
        .as_secs();

    let claims = JwtClaims {
        iss: credentials.client_email.clone(),
        scope: SCOPES.join(" "),
        aud: credentials.token_uri.clone(),
        iat: now,
        exp: now + 3600,
        sub: subject.map(str::to_string),
    };

    let key = EncodingKey::from_rsa_pem(credentials.private_key.as_bytes())
        .map_err(|e| AgentError::AuthError(format!("Invalid private key: {}", e)))?;
    let jwt = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| AgentError::AuthError(format!("Failed to sign token request: {}", e)))?;

    debug!("Exchanging signed assertion at {}", credentials.token_uri);
    let response = client
        .post(&credentials.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ])
        .send()?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().unwrap_or_default();
        return Err(AgentError::AuthError(format!(
            "Token exchange failed ({}): {}",
            status, text
        )));
    }

    let token: TokenResponse = response.json()?;
    // Refresh five minutes early when the endpoint omits a lifetime
    let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3300));
    Ok((token.access_token, lifetime))
}
