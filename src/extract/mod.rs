//! Content extraction interface / 内容抽取接口
//!
//! The extraction engine turns a document handle into something servable:
//! a file on disk for the binary content routes, or a text view for the
//! text routes. Like the index, it is a collaborator behind a narrow
//! trait; the gateway never interprets document internals itself.
//! 抽取引擎把文档句柄变成可服务的形态：二进制路由落盘为文件，
//! 文本路由给出文本视图。与索引一样，它是窄接口后面的协作方。

use async_trait::async_trait;
use std::path::PathBuf;

use anyhow::Result;

use crate::index::IndexDoc;

/// Text view of an extracted document / 文档抽取出的文本视图
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    /// Mimetype of the extracted view, collaborator-reported
    /// 抽取视图的 mimetype，由协作方报告
    pub mimetype: String,
}

/// Result of materializing a document to a file / 文档落盘的结果
///
/// `spool` owns the temp file when extraction had to write one; dropping it
/// deletes the file. The fast path (already on disk) carries no spool.
#[derive(Debug)]
pub struct ExtractedFile {
    pub path: PathBuf,
    pub spool: Option<tempfile::TempPath>,
}

/// Extraction engine collaborator / 抽取引擎协作方
#[async_trait]
pub trait DocExtractor: Send + Sync {
    /// Materialize `ipath` of `doc` as a file with the target mimetype
    /// 将文档的 `ipath` 部分按目标 mimetype 落盘为文件
    async fn idoc_to_file(
        &self,
        doc: &IndexDoc,
        ipath: &str,
        mimetype: &str,
    ) -> Result<ExtractedFile>;

    /// Extract the text view of `ipath` of `doc` / 抽取文档指定部分的文本视图
    async fn text_extract(&self, doc: &IndexDoc, ipath: &str) -> Result<ExtractedText>;
}

pub mod memory;

pub use memory::MemoryExtractor;
