//! The account-reconciliation state machine.
//!
//! Given a Google identity, the engine derives ticketing credentials
//! and walks a fixed fallback chain until it reaches a terminal state:
//! a full session, a hard registration failure, or a limited session.
//! Steps are strictly sequential; each transition depends on the
//! previous upstream response, and candidates are tried against a
//! rate-limited login endpoint, so nothing runs speculatively in
//! parallel.

use passerelle_flow::{AuthSession, SessionUser};
use passerelle_google::GoogleIdentity;

use crate::client::TicketingApi;
use crate::credentials;
use crate::error::{ReconcileError, TicketingError};
use crate::types::{LoginRequest, RegisterRequest, TicketingSession};

/// Drives the fallback chain against a [`TicketingApi`].
pub struct ReconciliationEngine<A> {
    api: A,
}

impl<A: TicketingApi> ReconciliationEngine<A> {
    /// Creates an engine over the given ticketing API.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Reconciles a Google identity into a session.
    ///
    /// Every call reaches exactly one terminal state. `Err` is returned
    /// only for a non-conflict failure of the initial registration; all
    /// later failures degrade toward a limited session, which is a
    /// successful outcome from the caller's perspective.
    pub async fn reconcile(
        &self,
        identity: &GoogleIdentity,
    ) -> Result<AuthSession, ReconcileError> {
        let username = credentials::derive_username(identity);
        let password = credentials::primary_password(identity);

        // Register with the primary derived credentials.
        let register = RegisterRequest {
            name: identity.name.clone(),
            email: identity.email.clone(),
            username: username.clone(),
            password: password.clone(),
            google_id: identity.id.clone(),
            provider: "google".to_string(),
        };

        match self.api.register(&register).await {
            Ok(grant) => {
                tracing::info!(email = %identity.email, "new Google user registered");
                return Ok(full_session(
                    identity,
                    username,
                    grant,
                    "New Google user registered with full ticketing API access".to_string(),
                ));
            }
            Err(TicketingError::Conflict { message }) => {
                tracing::info!(email = %identity.email, %message, "account exists, trying stored credentials");
            }
            Err(other) => {
                tracing::error!(email = %identity.email, error = %other, "ticketing registration failed");
                return Err(ReconcileError::Registration(other));
            }
        }

        // Log in with the primary derived password.
        match self.try_login(identity, &password).await {
            Some(grant) => {
                tracing::info!(email = %identity.email, "existing user authenticated with primary pattern");
                return Ok(full_session(
                    identity,
                    username,
                    grant,
                    "Existing Google user authenticated with stored credentials".to_string(),
                ));
            }
            None => {
                tracing::warn!(email = %identity.email, "primary derived password rejected, trying alternatives");
            }
        }

        // Historical derivation patterns, fixed order, first hit wins.
        let alternatives = credentials::alternative_passwords(identity);
        let pattern_count = alternatives.len();
        for (index, candidate) in alternatives.iter().enumerate() {
            let pattern = index + 1;
            tracing::debug!(pattern, total = pattern_count, "trying alternative password pattern");
            if let Some(grant) = self.try_login(identity, candidate).await {
                tracing::info!(email = %identity.email, pattern, "alternative password pattern matched");
                return Ok(full_session(
                    identity,
                    username,
                    grant,
                    format!(
                        "Existing Google user authenticated with alternative password pattern {pattern}"
                    ),
                ));
            }
        }

        // Every guess failed: the collision is unresolvable, so create a
        // parallel account under a disambiguated username rather than
        // keep claiming the existing one.
        let retry_username = credentials::unique_username(identity);
        let retry = RegisterRequest {
            username: retry_username.clone(),
            password: credentials::unique_password(),
            ..register
        };

        match self.api.register(&retry).await {
            Ok(grant) => {
                tracing::info!(email = %identity.email, username = %retry_username, "registered parallel account with unique credentials");
                Ok(full_session(
                    identity,
                    retry_username,
                    grant,
                    "Google user registered with unique credentials".to_string(),
                ))
            }
            Err(error) => {
                tracing::warn!(email = %identity.email, %error, "all ticketing attempts exhausted, falling back to limited mode");
                Ok(AuthSession::limited(
                    google_only_user(identity, username),
                    "Google user authenticated in limited mode - unable to link with existing account"
                        .to_string(),
                ))
            }
        }
    }

    /// Attempts one credential login; any failure means "next candidate".
    async fn try_login(&self, identity: &GoogleIdentity, password: &str) -> Option<TicketingSession> {
        let request = LoginRequest {
            identity: identity.email.clone(),
            password: password.to_string(),
        };
        match self.api.login(&request).await {
            Ok(grant) => Some(grant),
            Err(error) => {
                tracing::debug!(error = %error, "login attempt failed");
                None
            }
        }
    }
}

fn google_only_user(identity: &GoogleIdentity, username: String) -> SessionUser {
    SessionUser::google_only(
        identity.email.clone(),
        identity.name.clone(),
        username,
        identity.picture.clone(),
        identity.verified_email,
        identity.id.clone(),
    )
}

fn full_session(
    identity: &GoogleIdentity,
    username: String,
    grant: TicketingSession,
    message: String,
) -> AuthSession {
    let mut user = google_only_user(identity, username);
    if let Some(account) = grant.user {
        user.id = account.id;
        user.admin = account.admin;
        user.admin_level = account.admin_level;
        user.company = account.company;
    }
    AuthSession::full(user, grant.access_token, grant.refresh_token, message)
}
