//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded from environment variables via
//! the `config` crate. Variable names are the flat upper-case form of
//! the field names (`GOOGLE_CLIENT_ID`, `TICKETING_API_BASE_URL`, ...).

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Google OAuth application client id.
    pub google_client_id: String,

    /// Google OAuth application client secret.
    pub google_client_secret: String,

    /// Redirect URI used when running in development.
    #[serde(default)]
    pub development_redirect_uri: Option<String>,

    /// Redirect URI used when running in production.
    #[serde(default)]
    pub production_redirect_uri: Option<String>,

    /// Deployment environment; anything other than "production" selects
    /// the development redirect URI.
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Base URL of the ticketing API.
    pub ticketing_api_base_url: String,

    /// Path of the ticketing register endpoint.
    #[serde(default = "default_register_endpoint")]
    pub ticketing_register_endpoint: String,

    /// Path of the ticketing login endpoint.
    #[serde(default = "default_login_endpoint")]
    pub ticketing_login_endpoint: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_register_endpoint() -> String {
    "/auth/register".to_string()
}

fn default_login_endpoint() -> String {
    "/auth/login".to_string()
}

fn default_port() -> u16 {
    3001
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns true unless running in production.
    #[must_use]
    pub fn is_development(&self) -> bool {
        self.environment != "production"
    }

    /// Returns the redirect URI for the current environment, if set.
    #[must_use]
    pub fn redirect_uri(&self) -> Option<&str> {
        if self.is_development() {
            self.development_redirect_uri.as_deref()
        } else {
            self.production_redirect_uri.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            google_client_id: "client-id".to_string(),
            google_client_secret: "client-secret".to_string(),
            development_redirect_uri: Some("http://localhost:3001/auth/google/success".to_string()),
            production_redirect_uri: Some("https://bridge.example.com/auth/google/success".to_string()),
            environment: default_environment(),
            ticketing_api_base_url: "https://tickets.example.com".to_string(),
            ticketing_register_endpoint: default_register_endpoint(),
            ticketing_login_endpoint: default_login_endpoint(),
            port: default_port(),
        }
    }

    #[test]
    fn defaults_are_development_friendly() {
        let config = config();
        assert!(config.is_development());
        assert_eq!(config.ticketing_register_endpoint, "/auth/register");
        assert_eq!(config.ticketing_login_endpoint, "/auth/login");
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn environment_selects_redirect_uri() {
        let mut config = config();
        assert_eq!(
            config.redirect_uri(),
            Some("http://localhost:3001/auth/google/success")
        );

        config.environment = "production".to_string();
        assert_eq!(
            config.redirect_uri(),
            Some("https://bridge.example.com/auth/google/success")
        );
    }

    #[test]
    fn missing_redirect_uri_is_none() {
        let mut config = config();
        config.development_redirect_uri = None;
        assert_eq!(config.redirect_uri(), None);
    }
}
