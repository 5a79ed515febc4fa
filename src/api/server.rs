//! HTTP server for the salesheet API.
//!
//! Serves transformed report tables to grid frontends. Store reports are
//! built on demand from per-store CSV extracts in the data directory;
//! uploads are transformed in place with the same config.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                        |
//! |--------|-----------------------|------------------------------------|
//! | GET    | `/health`             | Health check                       |
//! | GET    | `/api/stores`         | Store mapping for this machine     |
//! | GET    | `/api/report/{store}` | Transformed report for one store   |
//! | POST   | `/api/upload`         | Transform an uploaded CSV          |
//! | GET    | `/api/logs`           | SSE stream for pipeline logs       |

use axum::{
    extract::{Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::types::{error_response, ReportResponse};
use crate::config::{machine_name, ConfigStore};
use crate::engine::build_report;
use crate::error::ReportError;
use crate::provider::parse_store_bytes;
use crate::report::report_for_store;

/// Shared server context: where config and store extracts live.
#[derive(Clone)]
pub struct ServerState {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

type HandlerError = (StatusCode, Json<Value>);

/// Start the HTTP server.
pub async fn start_server(
    port: u16,
    config_dir: PathBuf,
    data_dir: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let state = Arc::new(ServerState {
        config_dir,
        data_dir,
    });

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/stores", get(list_stores))
        .route("/api/report/{store}", get(store_report))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("salesheet server running on http://localhost:{}", port);
    println!("   GET  /api/stores         - store mapping for this machine");
    println!("   GET  /api/report/{{store}} - transformed report");
    println!("   POST /api/upload         - transform an uploaded CSV");
    println!("   GET  /api/logs           - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salesheet",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "stores": "GET /api/stores",
            "report": "GET /api/report/{store}",
            "upload": "POST /api/upload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// Store mapping and run counters for the invoking machine.
async fn list_stores(State(state): State<Arc<ServerState>>) -> Json<Value> {
    let config = ConfigStore::with_dir(&state.config_dir);
    let machine = machine_name();
    let entry = config.config.machines.get(&machine);

    Json(json!({
        "machine": machine,
        "stores": config.stores_for(&machine),
        "timesRan": entry.map(|e| e.times_ran).unwrap_or(0),
        "lastRan": entry.and_then(|e| e.last_ran.clone()),
    }))
}

/// Transformed report for one configured store.
async fn store_report(
    State(state): State<Arc<ServerState>>,
    Path(store): Path<String>,
) -> Result<Json<ReportResponse>, HandlerError> {
    if store.is_empty()
        || !store
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(error_response("Invalid store name")),
        ));
    }

    log_info(format!("Building report for store {}", store));
    let config = ConfigStore::with_dir(&state.config_dir);
    let table = report_for_store(&config, &state.data_dir, &store).map_err(|e| {
        let status = match e {
            ReportError::UnknownStore(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(error_response(&e.to_string())))
    })?;
    log_success(format!(
        "Report ready: {} rows, {} columns",
        table.rows.len(),
        table.columns.len()
    ));

    Ok(Json(ReportResponse::from_table(store, &table)))
}

/// Transform an uploaded CSV with the server's config.
async fn upload_csv(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Result<Json<ReportResponse>, HandlerError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response(&format!("Multipart error: {}", e))),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(error_response(&format!("Read error: {}", e))),
                        )
                    })?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(error_response("No file provided")),
        )
    })?;

    let store = file_name
        .as_deref()
        .and_then(|name| name.strip_suffix(".csv"))
        .unwrap_or("upload")
        .to_string();

    log_info(format!("Upload: {} ({} bytes)", store, bytes.len()));
    let raw = parse_store_bytes(&bytes).map_err(|e| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(error_response(&e.to_string())),
        )
    })?;

    let config = ConfigStore::with_dir(&state.config_dir);
    let table = build_report(raw, config.start_date(), &config.week_mapping());
    log_success(format!("Report ready: {} rows", table.rows.len()));

    Ok(Json(ReportResponse::from_table(store, &table)))
}

/// SSE endpoint for real-time log streaming.
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
