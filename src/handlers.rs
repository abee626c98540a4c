use std::path::Path;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::config::AppState;
use crate::errors::DocError;
use crate::render::{self, RenderDecision};
use crate::resolver::resolve;
use crate::utils::{decode_path, query_flag};

/// Build the application router. Every path and method lands in the same
/// handler; all requests are treated as reads.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(handle).with_state(state)
}

/// Handle one documentation request. Errors surface through
/// `DocError::into_response`, so nothing here can take down the listener.
pub async fn handle(State(state): State<AppState>, uri: Uri) -> Result<Response, DocError> {
    // The raw (still percent-encoded) path; the resolver does the decoding.
    serve_request(&state, uri.path(), uri.query()).await
}

async fn serve_request(
    state: &AppState,
    request_path: &str,
    query: Option<&str>,
) -> Result<Response, DocError> {
    let raw = query_flag(query, "raw");
    let root = &state.config.root;

    let resolved = resolve(root, request_path)?;
    // Decoded form for display and link construction; the renderer re-encodes
    // hrefs itself, so handing it the encoded path would double-encode them.
    let url_path = decode_path(request_path).ok_or(DocError::PathEscape)?;
    let meta = tokio::fs::metadata(&resolved).await?;
    log::debug!(
        "request '{}' resolved to {:?} (dir: {})",
        request_path,
        resolved,
        meta.is_dir()
    );

    match render::decide(&resolved, &url_path, meta.is_dir(), raw).await? {
        RenderDecision::MarkdownPage { path, title } => {
            let page = render::markdown_page(&path, &title).await?;
            log::info!("rendered markdown for '{}'", request_path);
            Ok(Html(page).into_response())
        }
        RenderDecision::Listing { dir, url_path } => {
            let page = render::directory_listing(root, &dir, &url_path).await?;
            log::info!("listed directory for '{}'", request_path);
            Ok(Html(page).into_response())
        }
        RenderDecision::StreamRaw { path, content_type } => {
            log::info!("streaming '{}' as {}", request_path, content_type);
            stream_file(&path, content_type).await
        }
    }
}

/// Stream a file without buffering it whole. If the client disconnects the
/// body stream is dropped, which closes the file handle.
async fn stream_file(path: &Path, content_type: &'static str) -> Result<Response, DocError> {
    let file = tokio::fs::File::open(path).await?;
    let body = Body::from_stream(ReaderStream::new(file));
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .map_err(|e| DocError::Render(e.to_string()))
}
