//! Request handlers for the sync endpoints.

use crate::body::body_reader;
use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::host::{AssetSource, HostEvents};
use crate::ingest::ingest_upload;
use crate::state::SyncState;
use axum::body::Body;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use connhub_storage::FileRepository;
use connhub_sync_protocol::{
    boundary_from_content_type, ResourceState, StateQuery, StateResponse, TextAck,
};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// Content type of plain-text responses.
pub const TEXT_PLAIN: &str = "text/plain; charset=UTF-8";

const TEXT_HTML: &str = "text/html; charset=UTF-8";
const IMAGE_ICON: &str = "image/x-icon";
const OCTET_STREAM: &str = "application/octet-stream";

/// Shared state for request handling.
///
/// One context lives for one Running period of the server; a restart builds
/// a fresh one, which is how in-memory state is discarded on stop.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Text and file-list resources.
    pub state: SyncState,
    /// Uploaded file storage.
    pub repository: FileRepository,
    host: Arc<dyn HostEvents>,
    assets: Arc<dyn AssetSource>,
}

impl HandlerContext {
    /// Creates a context with empty state over `config.storage_root`.
    pub fn new(
        config: ServerConfig,
        host: Arc<dyn HostEvents>,
        assets: Arc<dyn AssetSource>,
    ) -> Self {
        let repository = FileRepository::new(&config.storage_root);
        Self {
            config,
            state: SyncState::new(),
            repository,
            host,
            assets,
        }
    }

    /// Sends a log line to the host.
    pub fn log(&self, message: &str) {
        self.host.log(message);
    }

    /// Reports a failed request to the host and hands the error back.
    fn report(&self, action: &str, error: ServerError) -> ServerError {
        if error.is_server_error() {
            warn!(action, error = %error, "request failed");
        } else {
            debug!(action, error = %error, "request rejected");
        }
        self.host.log(&format!("{action} failed: {error}"));
        error
    }
}

type Ctx = State<Arc<HandlerContext>>;

fn plain(body: &'static str) -> Response {
    ([(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

/// `GET /api/state`: returns each resource that is newer than the client's.
pub async fn state(State(ctx): Ctx, RawQuery(query): RawQuery) -> Json<StateResponse> {
    let query = StateQuery::parse(query.as_deref());
    let text = ctx
        .state
        .text_if_newer(query.text_ts)
        .map(|snapshot| (snapshot.content, snapshot.version));
    let files = ctx
        .state
        .files_if_newer(query.files_ts)
        .map(|snapshot| (snapshot.names, snapshot.version));

    Json(StateResponse {
        text: ResourceState::from_snapshot(text),
        files: ResourceState::from_snapshot(files),
    })
}

/// `POST /api/text`: replaces the shared text with the request body.
pub async fn set_text(State(ctx): Ctx, body: Body) -> ServerResult<Json<TextAck>> {
    let limit = ctx.config.max_text_bytes;
    let mut reader = body_reader(body, ctx.config.read_timeout).take(limit as u64 + 1);
    let mut raw = Vec::new();
    if let Err(e) = reader.read_to_end(&mut raw).await {
        return Err(ctx.report("text update", ServerError::InvalidBody(e.to_string())));
    }
    if raw.len() > limit {
        return Err(ctx.report("text update", ServerError::PayloadTooLarge { limit }));
    }

    let content = match String::from_utf8(raw) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    let ts = ctx.state.set_text(content);
    debug!(ts = %ts, "text updated");
    Ok(Json(TextAck { ts }))
}

/// `POST /api/files/upload`: streams a single multipart file part to storage.
pub async fn upload(State(ctx): Ctx, headers: HeaderMap, body: Body) -> ServerResult<Response> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let boundary =
        boundary_from_content_type(content_type).map_err(|e| ctx.report("upload", e.into()))?;

    let mut reader = body_reader(body, ctx.config.read_timeout);
    let ingested = ingest_upload(
        &mut reader,
        &boundary,
        &ctx.repository,
        ctx.config.max_part_header_bytes,
    )
    .await
    .map_err(|e| ctx.report("upload", e))?;

    let version = ctx.state.commit_file(&ingested.name);
    debug!(name = %ingested.name, bytes = ingested.bytes, files_ts = %version, "file committed");
    ctx.log(&format!(
        "received {} ({} bytes)",
        ingested.name, ingested.bytes
    ));

    Ok((
        [
            (header::CONTENT_TYPE, TEXT_PLAIN),
            (header::CONNECTION, "close"),
        ],
        "File uploaded",
    )
        .into_response())
}

/// `GET /api/files/download/{name}`: streams a stored file as an attachment.
pub async fn download(State(ctx): Ctx, Path(name): Path<String>) -> ServerResult<Response> {
    let stored = ctx
        .repository
        .open(&name)
        .await
        .map_err(|e| ctx.report("download", e.into()))?;

    let disposition = HeaderValue::try_from(content_disposition(&name))
        .map_err(|e| ctx.report("download", ServerError::Internal(e.to_string())))?;
    let mut response = Body::from_stream(ReaderStream::new(stored.file)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(OCTET_STREAM));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(stored.len));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// `DELETE /api/files/delete/{name}`: removes a file from the list and storage.
///
/// Succeeds whether or not the file existed.
pub async fn delete(State(ctx): Ctx, Path(name): Path<String>) -> ServerResult<Response> {
    let (listed, version) = ctx.state.remove_file(&name);
    let removed = ctx
        .repository
        .delete(&name)
        .await
        .map_err(|e| ctx.report("delete", e.into()))?;

    debug!(name = %name, listed, removed, files_ts = %version, "file deleted");
    if listed {
        ctx.log(&format!("deleted {name}"));
    }
    Ok(plain("File deleted"))
}

/// `GET /` and `GET /index.html`.
pub async fn index(State(ctx): Ctx) -> ServerResult<Response> {
    asset(&ctx, "index.html", TEXT_HTML)
}

/// `GET /favicon.ico`.
pub async fn favicon(State(ctx): Ctx) -> ServerResult<Response> {
    asset(&ctx, "favicon.ico", IMAGE_ICON)
}

fn asset(ctx: &HandlerContext, name: &str, content_type: &'static str) -> ServerResult<Response> {
    match ctx.assets.read(name) {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response()),
        None => Err(ctx.report("asset", ServerError::NotFound(name.to_string()))),
    }
}

/// Fallback for unknown paths.
pub async fn not_found(State(ctx): Ctx, uri: Uri) -> ServerError {
    ctx.report("route", ServerError::NotFound(uri.path().to_string()))
}

/// Fallback for known paths requested with the wrong method.
pub async fn method_not_allowed(State(ctx): Ctx, method: Method, uri: Uri) -> ServerError {
    debug!(method = %method, path = uri.path(), "method not allowed");
    ctx.report("route", ServerError::MethodNotAllowed)
}

/// Builds the `Content-Disposition` value for a download.
///
/// The name is percent-encoded as UTF-8, spaces as `%20`, and given both as
/// the plain and the RFC 5987 parameter.
pub fn content_disposition(name: &str) -> String {
    let encoded = urlencoding::encode(name);
    format!("attachment; filename=\"{encoded}\"; filename*=UTF-8''{encoded}")
}
