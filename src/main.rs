// Trip Health API v0.1
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod routes;
mod scoring;
mod services;

use config::AppConfig;
use routes::health_score::AppState;
use services::advice::AdviceClient;
use services::aqi::AqiClient;
use services::geocode::GeocodeClient;
use services::traffic::TrafficClient;

/// Trip Health API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Trip Health API",
        version = "0.1.0",
        description = "Urban travel health scoring API. Geocodes a place name, \
            fetches real-time air quality and traffic congestion data, blends \
            them into a weighted 0-100 health score with a qualitative travel \
            suitability classification, and can ask a chat-completion model \
            for tailored advice.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Health score", description = "Travel health score computation"),
    ),
    paths(
        routes::health::health_check,
        routes::health_score::get_health_score,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::health_score::HealthScoreResponse,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trip_health_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    if config.credentials().is_err() {
        tracing::warn!(
            "One or more provider credentials are missing \
             (AQICN_TOKEN, TOMTOM_API_KEY, OPENAI_API_KEY); \
             the scoring endpoint will return configuration errors"
        );
    }

    // Build provider clients and shared application state
    let app_state = AppState {
        geocode: GeocodeClient::new(&config.geocoder_user_agent),
        aqi: AqiClient::new(),
        traffic: TrafficClient::new(),
        advice: AdviceClient::new(&config.advice_model),
        config: config.clone(),
    };

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .route(
            "/api/v1/health-score",
            get(routes::health_score::get_health_score),
        )
        .with_state(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
