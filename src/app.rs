use crate::config::Config;
use crate::error::MediaError;
use crate::gateway::MediaGateway;
use crate::models::{
    GetMediaByIdRequest, GetMediaByIdResponse, SearchByNameRequest, SearchMovieByNameResponse,
    SearchSerieByNameResponse,
};
use crate::movie::MovieClient;
use crate::series::SeriesClient;
use anyhow::{Context, Result};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use reqwest::Client;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

const MAX_BODY_BYTES: usize = 64 * 1024;

/// Builds both adapters from `config` around one shared HTTP client.
pub fn build_gateway(config: &Config) -> Result<MediaGateway> {
    let user_agent = format!("media-search-engine/{}", env!("CARGO_PKG_VERSION"));
    let client = Client::builder()
        .user_agent(user_agent)
        .build()
        .context("Failed to build upstream HTTP client")?;
    let movies = MovieClient::new(client.clone(), config.movies.clone());
    let series = SeriesClient::new(client, config.series.clone());
    Ok(MediaGateway::new(Arc::new(movies), Arc::new(series)))
}

pub async fn run_server(config: Config) -> Result<()> {
    let gateway = build_gateway(&config)?;
    let app = build_router(gateway);

    info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(gateway: MediaGateway) -> Router {
    Router::new()
        .route("/GetMediaById", post(get_media_by_id))
        .route("/SearchMovieByName", post(search_movie_by_name))
        .route("/SearchSerieByName", post(search_serie_by_name))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(gateway)
}

async fn health() -> &'static str {
    "OK"
}

async fn get_media_by_id(
    State(gateway): State<MediaGateway>,
    Json(req): Json<GetMediaByIdRequest>,
) -> Result<Json<GetMediaByIdResponse>, MediaError> {
    gateway
        .get_media_by_id(&req.media_type, &req.media_id)
        .await
        .map(Json)
}

async fn search_movie_by_name(
    State(gateway): State<MediaGateway>,
    Json(req): Json<SearchByNameRequest>,
) -> Result<Json<SearchMovieByNameResponse>, MediaError> {
    gateway.search_movie_by_name(&req.name).await.map(Json)
}

async fn search_serie_by_name(
    State(gateway): State<MediaGateway>,
    Json(req): Json<SearchByNameRequest>,
) -> Result<Json<SearchSerieByNameResponse>, MediaError> {
    gateway.search_serie_by_name(&req.name).await.map(Json)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
