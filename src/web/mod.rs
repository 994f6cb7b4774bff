//! HTTP front end

use std::num::NonZeroU16;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::{Json, Router};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use crate::constants::{GENERATED_IMAGES_PATH, MAX_DRAWING_BYTES};
use crate::error::{DoodleError, RequestFailed};
use crate::pipeline::{ArtResponse, DrawingRequest, Pipeline};

mod views;

use views::IndexTemplate;

#[derive(Clone)]
pub(crate) struct AppState {
    pipeline: Arc<Pipeline>,
}

impl AppState {
    fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

async fn index_handler() -> IndexTemplate {
    IndexTemplate {
        generate_path: "/generate",
    }
}

async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<DrawingRequest>, JsonRejection>,
) -> Result<Json<ArtResponse>, RequestFailed> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected generate request: {}", rejection.body_text());
        DoodleError::MalformedInput(rejection.body_text())
    })?;
    let response = state.pipeline.handle(&request.image).await?;
    Ok(Json(response))
}

async fn styles_handler() -> impl IntoResponse {
    const STYLES: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/styles.css"));
    ([(CONTENT_TYPE, "text/css")], STYLES)
}

fn create_router(state: AppState) -> Router {
    let artifacts = ServeDir::new(state.pipeline.synthesizer().output_dir());
    Router::new()
        .route("/", axum::routing::get(index_handler))
        .route("/static/styles.css", axum::routing::get(styles_handler))
        .route(
            "/generate",
            axum::routing::post(generate_handler).layer(DefaultBodyLimit::max(MAX_DRAWING_BYTES)),
        )
        .nest_service(GENERATED_IMAGES_PATH, artifacts)
        .with_state(state)
}

/// Binds the listener and serves until the process is stopped.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    pipeline: Pipeline,
) -> Result<(), anyhow::Error> {
    let app = create_router(AppState::new(pipeline));

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app).await {
        error!("Server error: {}", err);
    }
    Ok(())
}
