//! Content serving routes / 内容服务路由
//!
//! `/contents/{id}[/{part}]` streams the document bytes with a negotiated
//! Content-Type; `/text/{id}[/{part}]` streams the extracted text view.
//! Identifiers are URL-safe base64; both segments decode strictly.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::state::AppState;
use docsearch_gateway::error::GatewayError;
use docsearch_gateway::ident;
use docsearch_gateway::resolver;
use docsearch_gateway::stream::{text_stream, FileChunkStream, DEFAULT_CHUNK_SIZE};
use docsearch_gateway::utils::negotiate_mime;

/// GET /contents/:id - 按定位符流式返回文档内容
pub async fn contents(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    serve_contents(&state, &id, "", &headers)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// GET /contents/:id/:part - 流式返回容器文档的内部部件
pub async fn contents_part(
    State(state): State<Arc<AppState>>,
    Path((id, part)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    serve_contents(&state, &id, &part, &headers)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// GET /text/:id - 流式返回文档的文本视图
pub async fn text(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    serve_text(&state, &id, "")
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

/// GET /text/:id/:part
pub async fn text_part(
    State(state): State<Arc<AppState>>,
    Path((id, part)): Path<(String, String)>,
) -> Response {
    serve_text(&state, &id, &part)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

async fn serve_contents(
    state: &AppState,
    id: &str,
    part_id: &str,
    headers: &HeaderMap,
) -> Result<Response, GatewayError> {
    let locator = ident::decode_locator(id)?;
    let ipath = ident::decode_part(part_id)?;

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok());
    let offered = doc_mimetype(state, &locator, &ipath).await?;
    let mime = negotiate_mime(accept, &offered);

    let served = resolver::resolve_file(
        state.index.as_ref(),
        state.extractor.as_ref(),
        &locator,
        &ipath,
        &mime,
    )
    .await?;

    // 流持有文件句柄和 spool，响应结束或客户端断开时一并释放
    // The stream owns the handle and the spool; both go when it drops
    let stream = FileChunkStream::open(&served.path, DEFAULT_CHUNK_SIZE, served.spool).await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime)
        .body(Body::from_stream(stream))
        .unwrap())
}

async fn serve_text(state: &AppState, id: &str, part_id: &str) -> Result<Response, GatewayError> {
    let locator = ident::decode_locator(id)?;
    let ipath = ident::decode_part(part_id)?;

    let view = resolver::resolve_text(
        state.index.as_ref(),
        state.extractor.as_ref(),
        &locator,
        &ipath,
    )
    .await?;

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            format!("{}; charset=utf-8", view.mimetype),
        )
        .body(Body::from_stream(text_stream(view.text, DEFAULT_CHUNK_SIZE)))
        .unwrap())
}

/// Document mimetype offered to negotiation / 参与协商的文档 mimetype
///
/// Indexed documents report their own mimetype. A `file://` locator that
/// the index does not know is still servable off the fast path; its type
/// is guessed from the path.
/// 索引外的 file:// 定位符仍可走快速路径，类型按路径猜测。
async fn doc_mimetype(
    state: &AppState,
    locator: &[u8],
    ipath: &str,
) -> Result<String, GatewayError> {
    let doc = state
        .index
        .fetch_doc(locator, ipath)
        .await
        .map_err(GatewayError::IndexUnavailable)?;

    if let Some(doc) = doc {
        return Ok(doc.mimetype);
    }

    if ipath.is_empty() {
        if let Some(path) = resolver::local_path(locator) {
            return Ok(mime_guess::from_path(&path)
                .first_or_octet_stream()
                .to_string());
        }
    }

    Err(GatewayError::ContentNotFound(
        String::from_utf8_lossy(locator).into_owned(),
    ))
}
