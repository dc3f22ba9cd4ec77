//! Route handlers for the authentication bridge.
//!
//! Every endpoint answers JSON with a `success` boolean and a
//! human-readable `message` (the redirect target answers HTML). Errors
//! are converted at this boundary; nothing upstream of a handler leaks
//! a raw failure to the client.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use passerelle_flow::{AuthSession, PendingHandoff, RedirectData};
use passerelle_google::{GoogleAuthError, GoogleIdentity};
use passerelle_reconcile::ReconcileError;

use super::AppState;
use crate::pages;

/// Response for `/auth/google/url`.
#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
    pub state: String,
}

/// Body of `/auth/google/complete`.
///
/// Fields are optional so that a missing one produces the documented
/// 400 response instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    #[serde(rename = "authCode")]
    pub auth_code: Option<String>,
    pub state: Option<String>,
}

/// Query parameters of the OAuth redirect.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Negative answer of `/auth/check-session` when nothing is pending.
#[derive(Debug, Serialize)]
struct NoSessionResponse {
    success: bool,
    #[serde(rename = "authCode")]
    auth_code: Option<String>,
    state: Option<String>,
    message: &'static str,
}

impl NoSessionResponse {
    fn empty() -> Self {
        Self {
            success: false,
            auth_code: None,
            state: None,
            message: "No authentication session found",
        }
    }
}

/// Issues an authorization URL and a fresh state token.
///
/// Starting a new flow discards any unconsumed handoff so a user
/// switching Google accounts cannot be handed the previous attempt.
pub async fn auth_url(State(state): State<Arc<AppState>>) -> Json<AuthUrlResponse> {
    if state.mailbox.clear() {
        tracing::info!("cleared previous handoff before new authentication");
    }

    let csrf_state = state.ledger.issue();
    let auth_url = state.google.authorization_url(&csrf_state);

    tracing::info!("issued Google authorization URL");
    Json(AuthUrlResponse {
        auth_url,
        state: csrf_state,
    })
}

/// Synchronous completion for clients that obtained the code themselves.
///
/// Validates the CSRF state, exchanges the code for a Google identity,
/// reconciles it into a ticketing session and returns the result. The
/// session is also published to the mailbox so a concurrent poller sees
/// the same outcome.
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<AuthSession>, ApiError> {
    let (Some(auth_code), Some(csrf_state)) = (body.auth_code, body.state) else {
        return Err(ApiError::MissingParameters);
    };

    if !state.ledger.validate(&csrf_state) {
        return Err(ApiError::InvalidState);
    }

    let identity = state.google.exchange(&auth_code).await?;
    let session = reconcile(&state, &identity).await?;

    state
        .mailbox
        .publish(PendingHandoff::Session(session.clone()));

    Ok(Json(session))
}

/// OAuth redirect target; the browser lands here after Google consent.
///
/// Stages the raw code and state in the mailbox for the polling client
/// and indexes them under a session key shown on the success page for
/// manual recovery.
pub async fn oauth_success(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuccessQuery>,
) -> Html<String> {
    if let Some(error) = query.error {
        tracing::warn!(%error, description = ?query.error_description, "Google OAuth redirect carried an error");
        return pages::oauth_error_page(&error, query.error_description.as_deref());
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        tracing::warn!("OAuth redirect without code or state");
        return pages::missing_code_page();
    };

    if state.mailbox.clear() {
        tracing::info!("cleared previous handoff to prevent account conflicts");
    }

    let data = RedirectData::new(code, csrf_state);
    let session_key = state.handoffs.insert(data.clone());
    state.mailbox.publish(PendingHandoff::Redirect(data));

    tracing::info!(%session_key, "staged OAuth redirect for mobile pickup");
    pages::success_page(&session_key)
}

/// Poll endpoint for the mobile client.
///
/// Drains the mailbox. Raw redirect data is exchanged and reconciled on
/// the spot; an already-reconciled session is returned as-is. An empty
/// mailbox is a 200 with `success: false`.
pub async fn check_session(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    match state.mailbox.take() {
        None => {
            tracing::debug!("poll found no pending authentication");
            Ok(Json(NoSessionResponse::empty()).into_response())
        }
        Some(PendingHandoff::Session(session)) => {
            tracing::info!("delivering reconciled session to poller");
            Ok(Json(session).into_response())
        }
        Some(PendingHandoff::Redirect(data)) => {
            tracing::info!("poll found raw OAuth data, processing");
            let identity = state.google.exchange(&data.code).await?;
            let session = reconcile(&state, &identity).await?;
            Ok(Json(session).into_response())
        }
    }
}

/// Answer of the manual session lookup.
#[derive(Debug, Serialize)]
pub struct ManualLookupResponse {
    pub success: bool,
    #[serde(rename = "authCode")]
    pub auth_code: String,
    pub state: String,
}

/// Manual session lookup used during development when polling fails.
pub async fn check_by_key(
    State(state): State<Arc<AppState>>,
    Path(session_key): Path<String>,
) -> Result<Json<ManualLookupResponse>, ApiError> {
    let data = state
        .handoffs
        .take(&session_key)
        .ok_or(ApiError::SessionNotFound)?;

    Ok(Json(ManualLookupResponse {
        success: true,
        auth_code: data.code,
        state: data.state,
    }))
}

/// Response of the clear-session endpoints.
#[derive(Debug, Serialize)]
pub struct ClearSessionResponse {
    pub success: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleared_states: Option<usize>,
    pub timestamp: chrono::DateTime<Utc>,
}

fn clear_all(state: &AppState) -> usize {
    if state.mailbox.clear() {
        tracing::info!("discarded pending handoff");
    }
    state.handoffs.clear();
    let cleared = state.ledger.clear();
    tracing::info!(cleared_states = cleared, "authentication session cleared");
    cleared
}

/// Resets the ledger and mailbox (logout / account switching).
pub async fn clear_session(State(state): State<Arc<AppState>>) -> Json<ClearSessionResponse> {
    clear_all(&state);
    Json(ClearSessionResponse {
        success: true,
        message: "Authentication session cleared successfully",
        cleared_states: None,
        timestamp: Utc::now(),
    })
}

/// Convenience GET variant used before starting a new flow; reports how
/// many states were dropped.
pub async fn pre_clear_session(State(state): State<Arc<AppState>>) -> Json<ClearSessionResponse> {
    let cleared = clear_all(&state);
    Json(ClearSessionResponse {
        success: true,
        message: "Previous authentication session cleared - ready for new authentication",
        cleared_states: Some(cleared),
        timestamp: Utc::now(),
    })
}

/// Liveness probe with an endpoint map for client discovery.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "passerelle",
        "timestamp": Utc::now(),
        "endpoints": {
            "auth_url": "/auth/google/url",
            "complete_auth": "/auth/google/complete",
            "check_session": "/auth/check-session",
            "clear_session": "/auth/clear-session",
        },
    }))
}

async fn reconcile(state: &AppState, identity: &GoogleIdentity) -> Result<AuthSession, ApiError> {
    state
        .engine
        .reconcile(identity)
        .await
        .map_err(ApiError::from)
}

/// Client-facing errors of the authentication endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// Required request fields were absent.
    MissingParameters,
    /// The CSRF state token was absent, consumed or expired.
    InvalidState,
    /// Google rejected the code-for-token exchange.
    GoogleAuth { description: String },
    /// Manual session lookup found nothing.
    SessionNotFound,
    /// Upstream or internal failure; details are logged, not returned.
    Upstream(String),
}

impl From<GoogleAuthError> for ApiError {
    fn from(error: GoogleAuthError) -> Self {
        match error {
            GoogleAuthError::TokenExchange { description } => Self::GoogleAuth { description },
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<ReconcileError> for ApiError {
    fn from(error: ReconcileError) -> Self {
        Self::Upstream(error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::MissingParameters => (
                StatusCode::BAD_REQUEST,
                "Missing required parameters".to_string(),
                "authCode and state are required".to_string(),
            ),
            Self::InvalidState => (
                StatusCode::BAD_REQUEST,
                "Invalid state token".to_string(),
                "State token is invalid or expired".to_string(),
            ),
            Self::GoogleAuth { description } => (
                StatusCode::BAD_REQUEST,
                "Google authentication failed".to_string(),
                description,
            ),
            Self::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "Session not found".to_string(),
                "Session not found or expired".to_string(),
            ),
            Self::Upstream(details) => {
                tracing::error!(%details, "authentication failed upstream");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "An unexpected error occurred during authentication".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": error,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
