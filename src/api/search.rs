use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use crate::state::AppState;
use docsearch_gateway::params::parse_query_request;
use docsearch_gateway::search::run_query;

use super::bad_request;

/// POST /search - 执行搜索并返回分页结果
/// Run a search and return the clamped result window
///
/// 请求体是无类型 JSON，逐字段校验；空请求体和参数错误都是 400。
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Option<Json<Value>>,
) -> Response {
    let Some(Json(body)) = body else {
        return bad_request("empty_body", "request JSON payload is empty");
    };

    let params = match parse_query_request(&body) {
        Ok(params) => params,
        Err(e) => return e.into_response(),
    };

    match run_query(state.index.as_ref(), &params).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}
