//! Transport records / 传输数据结构

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validated search request / 校验后的搜索请求
///
/// `limit < 0` 表示不限制条数 / negative limit means "no cap".
/// Negative skip is accepted here and clamped by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub skip: i64,
    pub limit: i64,
}

/// A positioned highlighted excerpt / 带页码的高亮摘录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    pub page: u32,
    pub term: String,
    pub text: String,
}

/// One formatted search hit / 单条格式化的搜索结果
///
/// Raw index metadata fields are flattened into the record; the derived
/// fields below sit next to them. `binurl` duplicates `id` for
/// compatibility with older clients.
/// 索引元数据字段平铺进记录，派生字段与其并列。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    pub id: String,
    pub part: String,
    pub url: String,
    pub binurl: String,
    pub filename: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub snippets: Vec<Snippet>,
}

/// Aggregated search response / 聚合搜索响应
///
/// Invariants: `0 <= skip <= count`, `0 <= limit <= count - skip`,
/// `documents.len() == limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Index-defined term groups, passed through untouched
    /// 索引定义的词组信息，原样透传
    pub groups: Value,
    pub count: usize,
    pub skip: usize,
    pub limit: usize,
    pub documents: Vec<DocumentRecord>,
}
