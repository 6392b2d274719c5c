//! MathAgent API Gateway
//!
//! The HTTP surface over the resolution pipeline.
//! Handles:
//! - Query resolution and feedback endpoints
//! - Startup wiring (collaborators, knowledge seeding, feedback store)
//! - Observability (logging, metrics, request ids)

mod feedback;
mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use feedback::FeedbackStore;
use mathagent_common::{
    config::{AppConfig, ObservabilityConfig},
    metrics,
    providers::{create_embedder, create_generative_model, create_search_provider},
};
use mathagent_engine::{knowledge, Pipeline};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<Pipeline>,
    pub store: FeedbackStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config.observability);
    info!("Starting MathAgent API Gateway v{}", mathagent_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port > 0 {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(SocketAddr::from((
                [0, 0, 0, 0],
                config.observability.metrics_port,
            )))
            .install()?;
        info!(port = config.observability.metrics_port, "Metrics exporter started");
    }

    // Wire the collaborators
    let embedder = create_embedder(&config.embedding)?;
    let search = create_search_provider(&config.search)?;
    let model = create_generative_model(&config.generation)?;

    // Build the pipeline and seed the knowledge index
    let pipeline = Arc::new(Pipeline::new(&config, embedder.clone(), search, model));
    knowledge::seed_index(pipeline.index().as_ref(), &embedder).await?;

    // Connect the feedback store
    info!("Connecting to feedback store...");
    let store = FeedbackStore::new(&config.database).await?;

    let state = AppState {
        config: config.clone(),
        pipeline,
        store,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        .route("/query", post(handlers::query::resolve_query))
        .route("/feedback", post(handlers::feedback::submit_feedback))
        .route(
            "/query/{id}/feedback",
            get(handlers::feedback::get_feedback),
        );

    // Compose the app
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
