pub mod handlers;
mod types;

pub use types::{ConfidenceScores, EndpointDoc, ErrorResponse, InfoResponse, PredictResponse};

use crate::{Result, config::Config, model::ModelService};
use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use handlers::AppState;
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::info))
        .route("/predict", post(handlers::predict))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // The model must load before the listener is bound
    let model_path = std::env::var("MODEL_PATH").unwrap_or_else(|_| config.model.path.clone());
    let model = ModelService::load(&model_path).await?;

    let app = router(AppState { model });

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
