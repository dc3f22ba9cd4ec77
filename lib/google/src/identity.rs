//! Normalized Google account profile.

use serde::{Deserialize, Serialize};

/// A Google identity as returned by the userinfo endpoint, normalized
/// for downstream reconciliation. Immutable once fetched; derived per
/// authentication attempt, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleIdentity {
    /// Google subject id (stable per account).
    pub id: String,
    pub email: String,
    /// Display name; falls back to the email local part when Google
    /// returns no name.
    pub name: String,
    pub picture: Option<String>,
    pub verified_email: Option<bool>,
}

impl GoogleIdentity {
    /// Returns the part of the email address before the `@`.
    #[must_use]
    pub fn email_local_part(&self) -> &str {
        self.email.split('@').next().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_part_stops_at_first_at_sign() {
        let identity = GoogleIdentity {
            id: "109876".to_string(),
            email: "jean.dupont@example.com".to_string(),
            name: "Jean Dupont".to_string(),
            picture: None,
            verified_email: Some(true),
        };
        assert_eq!(identity.email_local_part(), "jean.dupont");
    }
}
