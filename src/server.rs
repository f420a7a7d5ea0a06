//! Upload server
//!
//! Serves an upload form at `GET /` and scans the workbook posted to
//! `POST /`, answering with the HTML report.

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::pipeline::{Pipeline, RunReport, TracingObserver};
use crate::report;
use crate::source::RowSource;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

/// Name of the multipart field carrying the workbook
pub const UPLOAD_FIELD: &str = "excel_file";

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    config: Arc<PipelineConfig>,
}

/// An uploaded workbook
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

/// Build the router
pub fn router(config: PipelineConfig) -> Router {
    Router::new()
        .route("/", get(index).post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            config: Arc::new(config),
        })
}

/// Bind `addr` and serve until the process exits
pub async fn serve(addr: SocketAddr, config: PipelineConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Editorial Scan listening on http://{}", addr);
    axum::serve(listener, router(config)).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(report::upload_form(
        &state.config.reference_column,
        &state.config.label_column,
    ))
}

#[instrument(skip_all)]
async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return (
                StatusCode::BAD_REQUEST,
                "Please upload a valid Excel file (.xlsx).",
            )
                .into_response()
        }
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    match scan_upload(&state.config, upload).await {
        Ok(report) => Html(report::render_html(&report)).into_response(),
        Err(Error::Source(e)) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        Err(e) => {
            error!("Scan failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn read_upload(multipart: &mut Multipart) -> std::result::Result<Option<Upload>, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(|e| e.to_string())?;
        if bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Upload {
            file_name,
            bytes: bytes.to_vec(),
        }));
    }
    Ok(None)
}

async fn scan_upload(config: &PipelineConfig, upload: Upload) -> Result<RunReport> {
    // calamine picks the reader from the extension
    let extension = upload
        .file_name
        .as_deref()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .unwrap_or("xlsx")
        .to_string();

    let source = {
        let mut file = tempfile::Builder::new()
            .prefix("edscan-upload-")
            .suffix(&format!(".{extension}"))
            .tempfile()?;
        file.write_all(&upload.bytes)?;
        file.flush()?;
        RowSource::open(file.path(), config)?
    };
    info!("Scanning upload with {} rows", source.len());

    // Each scan downloads into its own directory
    let (_work_dir, config) = request_scope(config)?;
    let pipeline = Pipeline::new(config)?;
    Ok(pipeline.run(source.rows(), &mut TracingObserver).await)
}

/// A private work directory under the configured one, and a config using it.
/// The directory is deleted when the returned guard drops.
fn request_scope(config: &PipelineConfig) -> std::io::Result<(TempDir, PipelineConfig)> {
    std::fs::create_dir_all(&config.work_dir)?;
    let dir = tempfile::Builder::new()
        .prefix("edscan-scan-")
        .tempdir_in(&config.work_dir)?;
    let scoped = PipelineConfig {
        work_dir: dir.path().to_path_buf(),
        ..config.clone()
    };
    Ok((dir, scoped))
}
