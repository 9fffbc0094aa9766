// Weather Dashboard API v0.1
use axum::http::Method;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;
use routes::AppState;
use services::history::HistoryStore;
use services::weather::WeatherClient;

/// Weather Dashboard API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather Dashboard API",
        version = "0.1.0",
        description = "Looks up current weather and a 5-day forecast for a city via \
            OpenWeather, and keeps a persisted history of searched cities.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Weather", description = "City weather lookup"),
        (name = "History", description = "Search history management"),
    ),
    paths(
        routes::health::health_check,
        routes::health::routes_check,
        routes::weather::get_weather,
        routes::weather::list_history,
        routes::weather::delete_history,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::MessageResponse,
            routes::weather::WeatherRequest,
            services::weather::WeatherResult,
            services::weather::WeatherReading,
            services::weather::Coordinates,
            services::history::City,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "weather_dashboard_api=debug,tower_http=debug".into());

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_json);

    // Create OpenWeather client (exits on a missing API key)
    let weather_client = WeatherClient::new(
        &config.api_key,
        &config.api_base_url,
        Duration::from_secs(config.http_timeout_secs),
    )
    .unwrap_or_else(|e| {
        tracing::error!("{}", e);
        std::process::exit(1)
    });

    let history = HistoryStore::open(&config.history_file)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(
                "Failed to initialize search history at {}: {}",
                config.history_file.display(),
                e
            );
            std::process::exit(1)
        });

    tracing::info!("Search history stored at {}", history.path().display());

    let app_state = AppState {
        weather_client,
        history: Arc::new(history),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let app = routes::router(
        app_state,
        &config.client_dist_dir,
        config.expose_error_detail(),
    )
    .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    .layer(TraceLayer::new_for_http())
    .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!("Environment: {}", config.environment.as_str());
    tracing::info!(
        "Static files being served from {}",
        config.client_dist_dir.display()
    );
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
