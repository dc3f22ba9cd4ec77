//! OAuth2 client for the Google authorization-code grant.
//!
//! Builds the consent URL handed to the mobile client and performs the
//! two-step exchange: code for access token against Google's token
//! endpoint, then access token for profile against the v2 userinfo
//! endpoint. The flow carries no PKCE verifier because the code is
//! redeemed out of band of the request context that initiated the flow.

use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RequestTokenError,
    Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use std::time::Duration;

use crate::error::GoogleAuthError;
use crate::identity::GoogleIdentity;

/// Google OAuth authorization URL.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google OAuth token URL.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google userinfo endpoint.
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested for the bridge: email and basic profile.
const GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

/// Timeout applied to each outbound call to Google.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw userinfo payload from Google.
#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    id: String,
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    #[serde(default)]
    verified_email: Option<bool>,
}

/// Client for the Google side of the bridge.
#[derive(Clone)]
pub struct GoogleAuthClient {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http: reqwest::Client,
}

impl GoogleAuthClient {
    /// Creates a client for the given OAuth application credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI is not a valid URL or the
    /// HTTP client cannot be constructed.
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    ) -> Result<Self, GoogleAuthError> {
        let _ = RedirectUrl::new(redirect_uri.clone())
            .map_err(|e| GoogleAuthError::Configuration(format!("invalid redirect URI: {e}")))?;

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| {
                GoogleAuthError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_uri,
            http,
        })
    }

    /// Returns the redirect URI this client was configured with.
    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Builds the consent URL for a state token minted by the ledger.
    ///
    /// Asks Google for offline access and forces the account chooser so
    /// a user switching accounts is not silently re-logged into the
    /// previous one.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri.clone()).expect("valid redirect URL"),
            );

        let state = state.to_string();
        let mut auth_request = client.authorize_url(move || CsrfToken::new(state));

        for scope in GOOGLE_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        auth_request = auth_request
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "select_account")
            .add_extra_param("include_granted_scopes", "true");

        let (auth_url, _csrf_token) = auth_request.url();
        auth_url.to_string()
    }

    /// Exchanges an authorization code for a normalized Google identity.
    ///
    /// Step one redeems the code at the token endpoint; step two fetches
    /// the profile with the resulting access token. No retries: codes
    /// are single-use, so a failed exchange cannot succeed later.
    pub async fn exchange(&self, code: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).expect("valid token URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_uri.clone()).expect("valid redirect URL"),
            );

        let token_response = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(resp) => {
                    let description = resp
                        .error_description()
                        .cloned()
                        .unwrap_or_else(|| resp.error().to_string());
                    GoogleAuthError::TokenExchange { description }
                }
                other => GoogleAuthError::TokenExchange {
                    description: other.to_string(),
                },
            })?;

        let access_token = token_response.access_token().secret().clone();
        tracing::debug!("Google access token received, fetching profile");

        let profile: UserinfoResponse = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&access_token)
            .send()
            .await
            .map_err(|e| GoogleAuthError::Userinfo(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| GoogleAuthError::Userinfo(format!("upstream status: {e}")))?
            .json()
            .await
            .map_err(|e| GoogleAuthError::Userinfo(format!("malformed profile: {e}")))?;

        let name = profile.name.clone().unwrap_or_else(|| {
            profile
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });

        tracing::info!(email = %profile.email, "Google identity retrieved");

        Ok(GoogleIdentity {
            id: profile.id,
            email: profile.email,
            name,
            picture: profile.picture,
            verified_email: profile.verified_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleAuthClient {
        GoogleAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "https://bridge.example.com/auth/google/success".to_string(),
        )
        .expect("valid client")
    }

    #[test]
    fn rejects_invalid_redirect_uri() {
        let result = GoogleAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "not a url".to_string(),
        );
        assert!(matches!(result, Err(GoogleAuthError::Configuration(_))));
    }

    #[test]
    fn authorization_url_carries_state_and_scopes() {
        let url = client().authorization_url("state-token-123");

        assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
        assert!(url.contains("state=state-token-123"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("userinfo.email"));
        assert!(url.contains("userinfo.profile"));
    }

    #[test]
    fn authorization_url_forces_account_selection() {
        let url = client().authorization_url("s");
        assert!(url.contains("prompt=select_account"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("include_granted_scopes=true"));
    }

    #[test]
    fn userinfo_name_is_optional() {
        let profile: UserinfoResponse = serde_json::from_str(
            r#"{"id":"109876","email":"jean.dupont@example.com","verified_email":true}"#,
        )
        .expect("deserialize");
        assert!(profile.name.is_none());
        assert_eq!(profile.email, "jean.dupont@example.com");
    }
}
