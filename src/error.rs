//! Gateway error taxonomy / 网关错误分类
//!
//! Client-side faults (bad parameters, malformed identifiers) map to 400,
//! missing content to 404, collaborator failures to 500. Collaborators
//! (index, extractor) report `anyhow::Error` across the trait boundary and
//! are wrapped here before reaching the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// 缺少必填参数 / Required request parameter is absent
    #[error("Missing {0} parameter")]
    MissingParameter(&'static str),

    /// 参数类型错误 / Parameter present but of the wrong JSON type
    #[error("{0} has incorrect type")]
    InvalidParameterType(&'static str),

    /// 标识符不是合法的 URL-safe base64 / Identifier fails strict decoding
    #[error("invalid {0} identifier")]
    InvalidIdentifier(&'static str),

    /// 索引会话打开失败 / Index session could not be opened
    #[error("search index unavailable: {0:#}")]
    IndexUnavailable(anyhow::Error),

    /// 定位符没有对应内容 / Locator resolves to nothing retrievable
    #[error("content not found: {0}")]
    ContentNotFound(String),

    /// 抽取引擎失败 / Extraction engine reported a failure
    #[error("extraction failed: {0:#}")]
    ExtractionFailed(anyhow::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParameter(_)
            | GatewayError::InvalidParameterType(_)
            | GatewayError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            GatewayError::ContentNotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::IndexUnavailable(_) | GatewayError::ExtractionFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            GatewayError::MissingParameter(_) => "missing_parameter",
            GatewayError::InvalidParameterType(_) => "invalid_parameter_type",
            GatewayError::InvalidIdentifier(_) => "invalid_identifier",
            GatewayError::IndexUnavailable(_) => "index_unavailable",
            GatewayError::ContentNotFound(_) => "content_not_found",
            GatewayError::ExtractionFailed(_) => "extraction_failed",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }
        let body = ErrorBody {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::MissingParameter("query").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidParameterType("skip").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::InvalidIdentifier("id").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::ContentNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatewayError::IndexUnavailable(anyhow::anyhow!("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::ExtractionFailed(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_names_field() {
        assert_eq!(
            GatewayError::MissingParameter("query").to_string(),
            "Missing query parameter"
        );
        assert_eq!(
            GatewayError::InvalidParameterType("limit").to_string(),
            "limit has incorrect type"
        );
    }
}
