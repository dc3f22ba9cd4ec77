//! Wire types for the ticketing API.
//!
//! Upstream responses are modeled with explicit optional fields and
//! verified before use, so an absent field becomes a named
//! `MalformedResponse` error instead of a null leaking into a session.

use serde::{Deserialize, Serialize};

use crate::error::TicketingError;

/// Payload for the ticketing register endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub google_id: String,
    pub provider: String,
}

/// Payload for the ticketing login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Email address; the ticketing API calls this field `identity`.
    pub identity: String,
    pub password: String,
}

/// Profile fields of a ticketing account.
///
/// The id is passed through untyped because the upstream API does not
/// commit to a shape for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketingUser {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub admin: Option<bool>,
    #[serde(default)]
    pub admin_level: Option<i64>,
    #[serde(default)]
    pub company: Option<String>,
}

/// Raw success body from register/login, before verification.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawGrant {
    #[serde(default)]
    pub user: Option<TicketingUser>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl RawGrant {
    /// Checks the required fields, producing a usable session grant.
    pub(crate) fn verify(self) -> Result<TicketingSession, TicketingError> {
        let access_token = self.access_token.ok_or(TicketingError::MalformedResponse {
            missing: "access_token",
        })?;
        Ok(TicketingSession {
            user: self.user,
            access_token,
            refresh_token: self.refresh_token,
        })
    }
}

/// A verified ticketing-API session grant.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketingSession {
    /// Account profile; individual fields may still be absent.
    pub user: Option<TicketingUser>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_without_access_token_is_malformed() {
        let raw: RawGrant =
            serde_json::from_str(r#"{"user":{"id":42}}"#).expect("deserialize");
        assert_eq!(
            raw.verify(),
            Err(TicketingError::MalformedResponse {
                missing: "access_token"
            })
        );
    }

    #[test]
    fn grant_verifies_with_partial_user() {
        let raw: RawGrant = serde_json::from_str(
            r#"{"user":{"id":"rec_9f2","admin":true},"access_token":"at","refresh_token":"rt"}"#,
        )
        .expect("deserialize");

        let session = raw.verify().expect("verified");
        assert_eq!(session.access_token, "at");
        assert_eq!(session.refresh_token.as_deref(), Some("rt"));
        let user = session.user.expect("user");
        assert_eq!(user.id, Some(serde_json::json!("rec_9f2")));
        assert_eq!(user.admin, Some(true));
        assert!(user.admin_level.is_none());
    }

    #[test]
    fn grant_user_is_optional() {
        let raw: RawGrant =
            serde_json::from_str(r#"{"access_token":"at"}"#).expect("deserialize");
        let session = raw.verify().expect("verified");
        assert!(session.user.is_none());
    }
}
