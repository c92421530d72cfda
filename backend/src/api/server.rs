//! HTTP server for the rowscope API.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/analyze`    | Upload files + plan, get the report  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |
//!
//! `/api/analyze` takes multipart form data: one or more `file` fields,
//! loaded in the order they appear, and an optional `plan` field holding an
//! [`AnalysisPlan`] as JSON.

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, AnalyzeResponse, HealthResponse};
use crate::analysis::Analysis;
use crate::config::ServerConfig;
use crate::error::{AnalysisError, ServerError};
use crate::transform::plan::AnalysisPlan;

type ApiError = (StatusCode, Json<Value>);

/// Build the router
pub fn router(config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let app = router(&config);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    eprintln!("🚀 rowscope server running on http://localhost:{}", config.port);
    eprintln!("   POST /api/analyze - Upload files and a plan");
    eprintln!("   GET  /api/logs    - SSE log stream");
    eprintln!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Cannot bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}

/// Analyze endpoint
async fn analyze(mut multipart: Multipart) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut plan = AnalysisPlan::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("upload-{}", files.len() + 1));
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?;
                files.push((file_name, bytes.to_vec()));
            }
            "plan" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?;
                plan = AnalysisPlan::from_json(&text).map_err(|e| {
                    bad_request(&ServerError::BadRequest(e.to_string()).to_string())
                })?;
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(bad_request("No file provided"));
    }

    log_info(format!("📄 New analysis: {} file(s)", files.len()));

    let mut analysis = Analysis::new();
    let load = analysis.load_sources(&files);

    if load.sources.is_empty() {
        let err = ServerError::from(AnalysisError::AllSourcesFailed(files.len()));
        log_error(err.to_string());
        return Err(bad_request(&err.to_string()));
    }

    let report = analysis.run_plan(&plan);
    Ok(Json(AnalyzeResponse::new(load, report)))
}
