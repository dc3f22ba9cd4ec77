use axum::{
    Router,
    routing::{get, post},
};
use passerelle_google::GoogleAuthClient;
use passerelle_reconcile::TicketingClient;
use passerelle_server::{
    auth::{self, AppState},
    config::ServerConfig,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");

    let redirect_uri = config
        .redirect_uri()
        .expect("no redirect URI configured for the current environment")
        .to_string();

    let google = GoogleAuthClient::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        redirect_uri.clone(),
    )
    .expect("failed to create Google OAuth client");

    let ticketing = TicketingClient::new(
        &config.ticketing_api_base_url,
        &config.ticketing_register_endpoint,
        &config.ticketing_login_endpoint,
    )
    .expect("failed to create ticketing API client");

    let state = Arc::new(AppState::new(google, ticketing));

    // The mobile app calls from an unrelated origin; the bridge is a
    // public, token-free API surface, so CORS is wide open.
    let app = Router::new()
        .route("/auth/google/url", get(auth::routes::auth_url))
        .route("/auth/google/complete", post(auth::routes::complete))
        .route("/auth/google/success", get(auth::routes::oauth_success))
        .route("/auth/check-session", get(auth::routes::check_session))
        .route("/auth/check/{session_key}", get(auth::routes::check_by_key))
        .route(
            "/auth/clear-session",
            post(auth::routes::clear_session).get(auth::routes::pre_clear_session),
        )
        .route("/health", get(auth::routes::health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind to address");

    tracing::info!(
        port = config.port,
        environment = %config.environment,
        %redirect_uri,
        "passerelle listening"
    );
    tracing::info!("health check: /health, auth URL endpoint: /auth/google/url");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
