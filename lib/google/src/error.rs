//! Error types for the Google identity exchange.

use std::fmt;

/// Failures while turning an authorization code into a Google identity.
#[derive(Debug)]
pub enum GoogleAuthError {
    /// Client construction failed (invalid redirect URI, HTTP client).
    Configuration(String),
    /// The code-for-token exchange was rejected. Carries the upstream
    /// error description so the client sees why (expired code, redirect
    /// mismatch, reuse).
    TokenExchange { description: String },
    /// The userinfo call failed or returned an unusable profile.
    Userinfo(String),
}

impl fmt::Display for GoogleAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Google OAuth configuration error: {msg}"),
            Self::TokenExchange { description } => {
                write!(f, "Google token exchange failed: {description}")
            }
            Self::Userinfo(msg) => write!(f, "Google userinfo request failed: {msg}"),
        }
    }
}

impl std::error::Error for GoogleAuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_exchange_display_carries_upstream_description() {
        let err = GoogleAuthError::TokenExchange {
            description: "invalid_grant: code already redeemed".to_string(),
        };
        assert!(err.to_string().contains("code already redeemed"));
    }
}
