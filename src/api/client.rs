//! HTTP client for the authentication REST API.
//!
//! Implements [`AuthTransport`] over reqwest against the `/api/v1` endpoint
//! family. Success responses carry a JSON envelope with `success: true` and
//! a `user` object; failures carry `error: true` plus a `message`. Any
//! response that does not match the expected shape is reported as
//! [`AuthError::MalformedResponse`] rather than partially decoded.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::auth::Credential;
use crate::error::AuthError;
use crate::models::UserProfile;

use super::{AuthOutcome, AuthTransport};

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for the authentication service.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a new transport against the given service base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    async fn send_authenticated(
        &self,
        request: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> Result<Envelope, AuthError> {
        let response = request
            .header(header::AUTHORIZATION, credential.as_str())
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "request failed to reach server");
                AuthError::NetworkUnreachable
            })?;
        Self::decode_response(response).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Envelope, AuthError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "request failed to reach server");
            AuthError::NetworkUnreachable
        })?;
        Self::decode_response(response).await
    }

    /// Check the HTTP status and decode the response envelope.
    async fn decode_response(response: reqwest::Response) -> Result<Envelope, AuthError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|_| AuthError::MalformedResponse)?;
        debug!(status = %status, "response received");
        decode_envelope(status, &body)
    }
}

impl AuthTransport for HttpTransport {
    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<AuthOutcome, AuthError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
            "email": email,
        });

        let envelope = self
            .send(self.client.post(self.url("register")).json(&body))
            .await?;
        envelope.into_outcome()
    }

    async fn login(&self, username: &str, password: &str) -> Result<AuthOutcome, AuthError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let envelope = self
            .send(self.client.post(self.url("login")).json(&body))
            .await?;
        envelope.into_outcome()
    }

    async fn fetch_profile(&self, credential: &Credential) -> Result<UserProfile, AuthError> {
        let envelope = self
            .send_authenticated(self.client.get(self.url("me")), credential)
            .await?;
        envelope.into_profile()
    }

    async fn update_profile(
        &self,
        edits: &HashMap<String, String>,
        credential: &Credential,
    ) -> Result<UserProfile, AuthError> {
        let envelope = self
            .send_authenticated(self.client.post(self.url("update")).json(edits), credential)
            .await?;
        envelope.into_profile()
    }

    /// Best-effort session teardown. Spawned so the caller's local logout is
    /// never blocked on the network; failures are logged and dropped.
    fn logout(&self, credential: Credential) {
        let client = self.client.clone();
        let url = self.url("logout");
        tokio::spawn(async move {
            let result = client
                .post(&url)
                .header(header::AUTHORIZATION, credential.as_str())
                .send()
                .await;
            match result {
                Ok(response) => debug!(status = %response.status(), "logout notification sent"),
                Err(e) => debug!(error = %e, "logout notification failed"),
            }
        });
    }
}

// Wire types - internal only, domain code uses UserProfile

#[derive(Debug, Deserialize)]
struct Envelope {
    success: Option<bool>,
    error: Option<serde_json::Value>,
    message: Option<String>,
    user: Option<WireUser>,
    #[serde(rename = "sessionStart")]
    session_start: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: i64,
    username: String,
    email: String,
    name: Option<String>,
    #[serde(rename = "deviceToken")]
    device_token: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl Envelope {
    /// The server signals failure with `error: true` (or a bare error string)
    /// plus an optional message.
    fn error_message(&self) -> Option<&str> {
        match &self.error {
            Some(serde_json::Value::Bool(true)) => Some(self.message.as_deref().unwrap_or("")),
            Some(serde_json::Value::String(msg)) => Some(msg),
            _ => None,
        }
    }

    /// Session start timestamp, if the server sent a parsable one.
    /// Display-only, so an unparsable value is dropped rather than fatal.
    fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_start
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn into_profile(self) -> Result<UserProfile, AuthError> {
        let started_at = self.session_started_at();
        let user = self.user.ok_or(AuthError::MalformedResponse)?;
        Ok(UserProfile {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.name,
            device_token: user.device_token,
            session_started_at: started_at,
        })
    }

    /// Build the register/login outcome: profile plus the credential encoded
    /// from the `api_key`/`api_secret` pair in the user object.
    fn into_outcome(self) -> Result<AuthOutcome, AuthError> {
        let credential = {
            let user = self.user.as_ref().ok_or(AuthError::MalformedResponse)?;
            match (&user.api_key, &user.api_secret) {
                (Some(key), Some(secret)) => Credential::from_key_pair(key, secret),
                _ => return Err(AuthError::MalformedResponse),
            }
        };
        let profile = self.into_profile()?;
        Ok(AuthOutcome {
            profile,
            credential,
        })
    }
}

/// Map an HTTP status plus body into the decoded envelope or an error kind.
fn decode_envelope(status: StatusCode, body: &str) -> Result<Envelope, AuthError> {
    if status == StatusCode::UNAUTHORIZED {
        return Err(AuthError::CredentialRejected);
    }

    if !status.is_success() {
        // Non-200 may still carry a structured error with a message
        if let Ok(envelope) = serde_json::from_str::<Envelope>(body) {
            if let Some(message) = envelope.error_message() {
                return Err(AuthError::server_rejected(message));
            }
        }
        return Err(AuthError::MalformedResponse);
    }

    let envelope: Envelope =
        serde_json::from_str(body).map_err(|_| AuthError::MalformedResponse)?;

    if let Some(message) = envelope.error_message() {
        return Err(AuthError::server_rejected(message));
    }

    // An explicit `success: false` is a rejection even without a message;
    // only a missing flag counts as a shape mismatch.
    match envelope.success {
        Some(true) => Ok(envelope),
        Some(false) => Err(AuthError::server_rejected("")),
        None => Err(AuthError::MalformedResponse),
    }
}
