//! HTTP Server for the paygrid API.
//!
//! Exposes a single grid session to a browser front end. Requests are
//! serialized through the session lock, so grid events are processed one at
//! a time.
//!
//! # API Endpoints
//!
//! | Method | Path                     | Description                           |
//! |--------|--------------------------|---------------------------------------|
//! | GET    | `/health`                | Health check                          |
//! | GET    | `/api/grid`              | Current rows, invalid cells, messages |
//! | POST   | `/api/rows`              | Append an empty row                   |
//! | DELETE | `/api/rows/{row}`        | Remove a row (never the last one)     |
//! | PUT    | `/api/cells/{row}/{col}` | Write a cell and complete the edit    |
//! | POST   | `/api/paste`             | Merge a pasted block                  |
//! | POST   | `/api/export`            | Download the load file                |
//! | GET    | `/api/logs`              | SSE stream for real-time logs         |

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{delete, get, post, put},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_warning, LOG_BROADCASTER};
use super::types::{
    error_response, validation_error_response, CellUpdate, ExportRequest, GridSnapshot,
    PasteRequest, PasteResponse, RowResponse,
};
use crate::error::{ExportError, GridError, PipelineError, ServerError, ServerResult};
use crate::grid::GridSession;
use crate::models::{Column, COLUMN_COUNT};

/// Shared server state: the one session all requests act on.
#[derive(Clone, Default)]
pub struct AppState {
    pub session: Arc<Mutex<GridSession>>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Build the router over `state`.
pub fn router(state: AppState) -> Router {
    // Permissive CORS so a locally served front end can reach the API
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/grid", get(get_grid))
        .route("/api/rows", post(add_row))
        .route("/api/rows/{row}", delete(remove_row))
        .route("/api/cells/{row}/{col}", put(update_cell))
        .route("/api/paste", post(paste))
        .route("/api/export", post(export_grid))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> ServerResult<()> {
    let app = router(AppState::new());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Paygrid server running on http://localhost:{}", port);
    println!("   GET  /api/grid   - Current grid");
    println!("   POST /api/paste  - Paste a block");
    println!("   POST /api/export - Download load file");
    println!("   GET  /api/logs   - SSE log stream");
    println!();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(PipelineError::from)?;
    axum::serve(listener, app).await.map_err(PipelineError::from)?;

    Ok(())
}

// =============================================================================
// Error mapping
// =============================================================================

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServerError::Pipeline(PipelineError::Grid(e))
            | ServerError::Pipeline(PipelineError::Export(ExportError::Grid(e))) => {
                (grid_status(&e), error_response(&e.to_string()))
            }
            ServerError::Pipeline(PipelineError::Export(ExportError::Validation { messages })) => {
                (StatusCode::UNPROCESSABLE_ENTITY, validation_error_response(&messages))
            }
            ServerError::Pipeline(PipelineError::Export(e @ ExportError::FilenameRequired)) => {
                (StatusCode::BAD_REQUEST, error_response(&e.to_string()))
            }
            ServerError::BadRequest(msg) => {
                log_warning(format!("Rejected request: {}", msg));
                (StatusCode::BAD_REQUEST, error_response(&msg))
            }
            other => {
                log_error(other.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, error_response(&other.to_string()))
            }
        };
        (status, Json(body)).into_response()
    }
}

fn grid_status(e: &GridError) -> StatusCode {
    match e {
        GridError::LastRow => StatusCode::CONFLICT,
        GridError::RowOutOfBounds { .. } | GridError::ColumnOutOfBounds(_) => StatusCode::NOT_FOUND,
    }
}

/// Unwrap a JSON body, turning extractor rejections into [`ServerError::BadRequest`].
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ServerResult<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ServerError::BadRequest(rejection.body_text()))
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "paygrid",
        "version": env!("CARGO_PKG_VERSION"),
        "columns": COLUMN_COUNT,
    }))
}

async fn get_grid(State(state): State<AppState>) -> Json<GridSnapshot> {
    let session = state.session.lock().await;
    Json(GridSnapshot::from(&*session))
}

async fn add_row(State(state): State<AppState>) -> Json<RowResponse> {
    let mut session = state.session.lock().await;
    let row = session.add_row();
    Json(RowResponse { row, grid: GridSnapshot::from(&*session) })
}

async fn remove_row(
    State(state): State<AppState>,
    Path(row): Path<usize>,
) -> ServerResult<Json<GridSnapshot>> {
    let mut session = state.session.lock().await;
    session.remove_row(row)?;
    Ok(Json(GridSnapshot::from(&*session)))
}

/// Write the text, then run the edit-completed event (validate + prune).
async fn update_cell(
    State(state): State<AppState>,
    Path((row, col)): Path<(usize, usize)>,
    body: Result<Json<CellUpdate>, JsonRejection>,
) -> ServerResult<Json<GridSnapshot>> {
    let body = json_body(body)?;
    let column = Column::try_from(col)?;
    let mut session = state.session.lock().await;
    session.set_cell(row, column, body.text)?;
    session.edit_completed(row, column)?;
    Ok(Json(GridSnapshot::from(&*session)))
}

async fn paste(
    State(state): State<AppState>,
    body: Result<Json<PasteRequest>, JsonRejection>,
) -> ServerResult<Json<PasteResponse>> {
    let body = json_body(body)?;
    let mut session = state.session.lock().await;
    let outcome = session.paste(&body.text, body.row, body.col)?;

    log_info(format!(
        "📋 Pasted {} cell(s) at ({}, {}), {} row(s) added",
        outcome.affected.len(),
        body.row,
        body.col,
        outcome.rows_appended
    ));

    Ok(Json(PasteResponse { outcome, grid: GridSnapshot::from(&*session) }))
}

/// Export endpoint. Acts as the file sink: the content is sent as a download.
async fn export_grid(
    State(state): State<AppState>,
    body: Result<Json<ExportRequest>, JsonRejection>,
) -> ServerResult<Response> {
    let body = json_body(body)?;
    let mut session = state.session.lock().await;
    let output = session.export(&body.filename)?;

    let disposition = header_value(format!(
        "attachment; filename=\"{}\"",
        output.filename.replace('"', "")
    ))?;
    let content_type = header_value(format!("{}; charset=utf-8", output.media_type))?;

    Ok((
        [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
        output.content,
    )
        .into_response())
}

fn header_value(value: String) -> ServerResult<HeaderValue> {
    HeaderValue::try_from(value).map_err(|e| ServerError::Internal(format!("Invalid header value: {}", e)))
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
