//! Terminal session artifacts delivered to the client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much access the reconciled session carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// The ticketing API issued real tokens.
    Full,
    /// Only the Google identity is known; no ticketing session exists.
    Limited,
}

/// The authenticated user as presented to the client.
///
/// Google profile fields are always present; ticketing-account fields
/// are filled in only when reconciliation reached a full session. The
/// ticketing user id is passed through untyped because the upstream API
/// does not commit to a shape for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Ticketing-account id, when a ticketing session was established.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub email: String,
    pub name: String,
    /// Ticketing username (email local part, possibly disambiguated).
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_email: Option<bool>,
    pub google_id: String,
    /// Always `"google"`.
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Whether the client may call the ticketing API with the returned
    /// tokens.
    pub has_api_access: bool,
}

impl SessionUser {
    /// Builds a user carrying only the Google identity, no ticketing
    /// account fields.
    #[must_use]
    pub fn google_only(
        email: String,
        name: String,
        username: String,
        picture: Option<String>,
        verified_email: Option<bool>,
        google_id: String,
    ) -> Self {
        Self {
            id: None,
            email,
            name,
            username,
            picture,
            verified_email,
            google_id,
            provider: "google".to_string(),
            admin: None,
            admin_level: None,
            company: None,
            has_api_access: false,
        }
    }
}

/// The terminal successful outcome of an authentication flow.
///
/// This is what occupies the handoff mailbox for a polling client, or
/// what the synchronous completion endpoint returns directly. A limited
/// session is still a success from the caller's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub success: bool,
    pub user: SessionUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub mode: SessionMode,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl AuthSession {
    /// Builds a full session backed by ticketing-API tokens.
    #[must_use]
    pub fn full(
        mut user: SessionUser,
        access_token: String,
        refresh_token: Option<String>,
        message: String,
    ) -> Self {
        user.has_api_access = true;
        Self {
            success: true,
            user,
            access_token: Some(access_token),
            refresh_token,
            mode: SessionMode::Full,
            message,
            timestamp: Utc::now(),
        }
    }

    /// Builds a Google-identity-only session with no tokens.
    #[must_use]
    pub fn limited(mut user: SessionUser, message: String) -> Self {
        user.has_api_access = false;
        Self {
            success: true,
            user,
            access_token: None,
            refresh_token: None,
            mode: SessionMode::Limited,
            message,
            timestamp: Utc::now(),
        }
    }

    /// Returns true if the session carries ticketing-API tokens.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.mode == SessionMode::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> SessionUser {
        SessionUser::google_only(
            "jean.dupont@example.com".to_string(),
            "Jean Dupont".to_string(),
            "jean.dupont".to_string(),
            Some("https://lh3.example.com/photo.jpg".to_string()),
            Some(true),
            "109876".to_string(),
        )
    }

    #[test]
    fn full_session_grants_api_access() {
        let session = AuthSession::full(
            user(),
            "access-123".to_string(),
            Some("refresh-456".to_string()),
            "registered".to_string(),
        );

        assert!(session.success);
        assert!(session.is_full());
        assert!(session.user.has_api_access);
        assert_eq!(session.access_token.as_deref(), Some("access-123"));
        assert_eq!(session.refresh_token.as_deref(), Some("refresh-456"));
    }

    #[test]
    fn limited_session_is_success_without_tokens() {
        let session = AuthSession::limited(user(), "limited mode".to_string());

        assert!(session.success);
        assert!(!session.is_full());
        assert!(!session.user.has_api_access);
        assert!(session.access_token.is_none());
        assert!(session.refresh_token.is_none());
    }

    #[test]
    fn limited_session_serializes_without_token_fields() {
        let session = AuthSession::limited(user(), "limited mode".to_string());
        let json = serde_json::to_value(&session).expect("serialize");

        assert_eq!(json["success"], true);
        assert_eq!(json["mode"], "limited");
        assert_eq!(json["user"]["provider"], "google");
        assert_eq!(json["user"]["has_api_access"], false);
        assert!(json.get("access_token").is_none());
        assert!(json.get("refresh_token").is_none());
        assert!(json["user"].get("id").is_none());
    }

    #[test]
    fn session_mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SessionMode::Full).expect("serialize"),
            "\"full\""
        );
        assert_eq!(
            serde_json::to_string(&SessionMode::Limited).expect("serialize"),
            "\"limited\""
        );
    }
}
