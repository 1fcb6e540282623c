//! Request parameter validation / 请求参数校验
//!
//! The /search body arrives as untyped JSON. Field presence and JSON types
//! are checked one by one so the error can name the offending field;
//! a derive-based deserializer would collapse everything into one opaque
//! message. Sign of `skip` is NOT validated here — clamping is the
//! executor's job.
//! /search 请求体是无类型 JSON，逐字段检查存在性和类型，
//! 错误信息里必须带上字段名。skip 的符号在这里不校验。

use serde_json::Value;

use crate::error::GatewayError;
use crate::models::QueryRequest;

/// skip 缺省值 / default skip
const DEFAULT_SKIP: i64 = 0;
/// limit 缺省值，负数表示不限制 / default limit, negative means unbounded
const DEFAULT_LIMIT: i64 = -1;

/// Parse and type-check the /search request body / 解析并检查 /search 请求体
pub fn parse_query_request(body: &Value) -> Result<QueryRequest, GatewayError> {
    let query = match body.get("query") {
        None => return Err(GatewayError::MissingParameter("query")),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(GatewayError::InvalidParameterType("query")),
    };

    let skip = int_param(body, "skip", DEFAULT_SKIP)?;
    let limit = int_param(body, "limit", DEFAULT_LIMIT)?;

    Ok(QueryRequest { query, skip, limit })
}

/// Optional integer field; present-but-not-integer is a client error.
/// JSON 里 1.5、true 和 null 都不是整数。
fn int_param(body: &Value, key: &'static str, default: i64) -> Result<i64, GatewayError> {
    match body.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_i64()
            .ok_or(GatewayError::InvalidParameterType(key)),
    }
}
