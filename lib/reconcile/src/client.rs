//! HTTP client for the ticketing API's register and login endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::TicketingError;
use crate::types::{LoginRequest, RawGrant, RegisterRequest, TicketingSession};

/// Timeout applied to each outbound ticketing call. Login fallbacks run
/// sequentially, so a slow upstream bounds the whole chain at six of
/// these.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Conflict markers in upstream error messages. Status 409 is the
/// primary signal; these substrings are a fragile fallback kept because
/// the upstream API is not confirmed to always return a structured
/// status for conflicts.
const CONFLICT_MARKERS: &[&str] = &["already exists", "existe déjà"];

/// The seam between the reconciliation engine and the ticketing API.
///
/// A successful return is guaranteed to carry an access token; a
/// response without one surfaces as `MalformedResponse`.
#[async_trait]
pub trait TicketingApi: Send + Sync {
    /// Creates a ticketing account.
    async fn register(&self, request: &RegisterRequest) -> Result<TicketingSession, TicketingError>;

    /// Logs in with email and password.
    async fn login(&self, request: &LoginRequest) -> Result<TicketingSession, TicketingError>;
}

/// Error body shape used by the ticketing API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Reqwest-backed ticketing client.
#[derive(Clone)]
pub struct TicketingClient {
    register_url: String,
    login_url: String,
    http: reqwest::Client,
}

impl TicketingClient {
    /// Creates a client for the given base URL and endpoint paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        register_path: &str,
        login_path: &str,
    ) -> Result<Self, TicketingError> {
        let base = base_url.trim_end_matches('/');
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| {
                TicketingError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            register_url: format!("{base}{register_path}"),
            login_url: format!("{base}{login_path}"),
            http,
        })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<TicketingSession, TicketingError> {
        let response = self
            .http
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| TicketingError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let raw: RawGrant = response.json().await.map_err(|_| {
                TicketingError::MalformedResponse {
                    missing: "response body",
                }
            })?;
            return raw.verify();
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        let message = body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.to_string());

        if status == reqwest::StatusCode::CONFLICT || is_conflict_message(&message) {
            Err(TicketingError::Conflict { message })
        } else {
            Err(TicketingError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn is_conflict_message(message: &str) -> bool {
    CONFLICT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

#[async_trait]
impl TicketingApi for TicketingClient {
    async fn register(&self, request: &RegisterRequest) -> Result<TicketingSession, TicketingError> {
        tracing::debug!(username = %request.username, "registering ticketing account");
        self.post_json(&self.register_url, request).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<TicketingSession, TicketingError> {
        tracing::debug!(identity = %request.identity, "ticketing login attempt");
        self.post_json(&self.login_url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_join_without_double_slash() {
        let client = TicketingClient::new(
            "https://tickets.example.com/",
            "/auth/register",
            "/auth/login",
        )
        .expect("client");

        assert_eq!(
            client.register_url,
            "https://tickets.example.com/auth/register"
        );
        assert_eq!(client.login_url, "https://tickets.example.com/auth/login");
    }

    #[test]
    fn conflict_markers_match_both_languages() {
        assert!(is_conflict_message("user already exists"));
        assert!(is_conflict_message("cet utilisateur existe déjà"));
        assert!(!is_conflict_message("invalid credentials"));
    }
}
