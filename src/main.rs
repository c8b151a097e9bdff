mod agents;
mod config;
mod enrich;
mod report;
mod routes;
mod state;
mod storage;
mod submission;
mod templates;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

// Multipart bodies carry poster, certificates and photo sets.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relatoria=info,tower_http=info".into()),
        )
        .init();

    let config = config::Config::from_env()?;
    let config = Arc::new(config);

    crate::storage::ensure_upload_dir(&config.upload_folder)?;

    let state = Arc::new(state::AppState::new(config.clone()));

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/submit", post(routes::submit_report))
        .route("/report/:report_id", get(routes::view_report))
        .route("/download/:report_id", get(routes::download_report))
        .route("/download_all/:report_id", get(routes::download_bundle))
        .route("/api/report/:report_id", get(routes::report_status))
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(&config.upload_folder),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Relatoria listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
