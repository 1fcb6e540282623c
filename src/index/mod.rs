//! Search index interface - only exposes query primitives, does not control flow
//! 搜索索引接口 - 只暴露查询原语，不控制流程
//!
//! Architecture principles / 架构原则：
//! - The index only exposes primitive operations: open a query session,
//!   execute, scroll, iterate, excerpt
//! - The gateway core controls pagination, clamping and formatting
//! - Call direction: Core → Index (unidirectional) / 调用方向
//!
//! A query session lives for one request and is released when the handle is
//! dropped; nothing is pooled across requests at this layer.

use async_trait::async_trait;
use std::collections::BTreeMap;

use anyhow::Result;

use crate::models::Snippet;

/// Opaque document handle produced by the index / 索引产出的文档句柄
///
/// `locator` is the binary resource locator (typically a file URL),
/// `ipath` addresses an embedded part inside a container document
/// (empty = the whole resource). `text` is the extracted text with form
/// feeds (`\x0c`) marking page breaks.
#[derive(Debug, Clone, Default)]
pub struct IndexDoc {
    pub locator: Vec<u8>,
    pub ipath: String,
    pub url: String,
    pub filename: String,
    pub mimetype: String,
    pub text: String,
    /// Raw metadata fields, passed through to the transport record
    /// 原始元数据字段，透传到响应记录
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Highlight marker callbacks for excerpt generation / 摘录高亮回调
///
/// The excerpt generator calls `start_match` when it enters a matched term
/// and `end_match` when it leaves it; implementations only supply marker
/// text and hold no state.
pub trait HighlightMethods: Send + Sync {
    fn start_match(&self, term: &str) -> String;
    fn end_match(&self) -> String;
}

/// Search index collaborator / 搜索索引协作方
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Open a query session / 打开查询会话
    ///
    /// Fails when the index cannot be reached; the caller maps that to
    /// `IndexUnavailable`.
    async fn open_query(&self) -> Result<Box<dyn IndexQuery>>;

    /// Look up a document handle by locator and part
    /// 按定位符和内部路径查找文档句柄
    async fn fetch_doc(&self, locator: &[u8], ipath: &str) -> Result<Option<IndexDoc>>;
}

/// One query session over the index / 一次索引查询会话
///
/// Cursor order is the index's result order; `next_doc` after the last
/// result returns `None`. Dropping the handle releases the session.
#[async_trait]
pub trait IndexQuery: Send + Sync {
    /// Execute the query string, returns total match count
    /// 执行查询串，返回命中总数
    async fn execute(&mut self, query: &str) -> Result<usize>;

    /// Move the cursor to an absolute position / 游标移动到绝对位置
    ///
    /// Positions past the end are legal and leave zero documents ahead.
    async fn scroll(&mut self, position: usize) -> Result<()>;

    /// Next document in cursor order / 游标顺序的下一个文档
    async fn next_doc(&mut self) -> Result<Option<IndexDoc>>;

    /// Index-defined term group structure, not interpreted by the core
    /// 索引定义的词组结构，核心不解释
    async fn groups(&self) -> Result<serde_json::Value>;

    /// Contextual abstract around matches, highlighted via `methods`
    /// 命中词上下文摘要，经 `methods` 高亮
    async fn make_abstract(
        &self,
        doc: &IndexDoc,
        methods: &dyn HighlightMethods,
    ) -> Result<String>;

    /// Page-ordered highlighted snippets / 按页排序的高亮摘录
    async fn snippets(
        &self,
        doc: &IndexDoc,
        methods: &dyn HighlightMethods,
    ) -> Result<Vec<Snippet>>;
}

pub mod memory;

pub use memory::MemoryIndex;
