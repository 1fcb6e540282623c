//! Content resolution / 内容定位
//!
//! Maps a decoded `(locator, part, mimetype)` triple to retrievable
//! content. Locally stored whole files are served straight off the
//! filesystem; anything else goes through the extraction engine.
//! 已解码的 (定位符, 内部路径, mimetype) 映射为可取内容：
//! 本地整文件直接走文件系统，其余交给抽取引擎。

use std::path::PathBuf;

use crate::error::GatewayError;
use crate::extract::{DocExtractor, ExtractedFile, ExtractedText};
use crate::index::SearchIndex;

const FILE_SCHEME: &[u8] = b"file://";

/// Local filesystem path for a `file://` locator / `file://` 定位符的本地路径
///
/// Locators are raw bytes; only UTF-8 paths are served off the fast path,
/// anything else falls through to the extraction engine.
pub fn local_path(locator: &[u8]) -> Option<PathBuf> {
    let rest = locator.strip_prefix(FILE_SCHEME)?;
    let path = std::str::from_utf8(rest).ok()?;
    Some(PathBuf::from(path))
}

/// Resolve a locator to a servable file / 定位符解析为可服务的文件
///
/// Fast path: a `file://` locator with no internal part maps directly to
/// the local path, extraction engine not invoked. General path: look up
/// the document handle and materialize the requested part to a spool file.
pub async fn resolve_file(
    index: &dyn SearchIndex,
    extractor: &dyn DocExtractor,
    locator: &[u8],
    ipath: &str,
    mimetype: &str,
) -> Result<ExtractedFile, GatewayError> {
    if ipath.is_empty() {
        if let Some(path) = local_path(locator) {
            return Ok(ExtractedFile { path, spool: None });
        }
    }

    let doc = fetch_doc(index, locator, ipath).await?;
    extractor
        .idoc_to_file(&doc, ipath, mimetype)
        .await
        .map_err(GatewayError::ExtractionFailed)
}

/// Resolve a locator to its text view / 定位符解析为文本视图
pub async fn resolve_text(
    index: &dyn SearchIndex,
    extractor: &dyn DocExtractor,
    locator: &[u8],
    ipath: &str,
) -> Result<ExtractedText, GatewayError> {
    let doc = fetch_doc(index, locator, ipath).await?;
    extractor
        .text_extract(&doc, ipath)
        .await
        .map_err(GatewayError::ExtractionFailed)
}

async fn fetch_doc(
    index: &dyn SearchIndex,
    locator: &[u8],
    ipath: &str,
) -> Result<crate::index::IndexDoc, GatewayError> {
    index
        .fetch_doc(locator, ipath)
        .await
        .map_err(GatewayError::IndexUnavailable)?
        .ok_or_else(|| GatewayError::ContentNotFound(String::from_utf8_lossy(locator).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::MemoryExtractor;
    use crate::index::memory::{AbstractParams, MemoryIndex};
    use crate::index::IndexDoc;
    use async_trait::async_trait;
    use std::path::Path;

    /// 走到抽取就失败的桩 / stub that fails the test if extraction runs
    struct NeverExtractor;

    #[async_trait]
    impl DocExtractor for NeverExtractor {
        async fn idoc_to_file(
            &self,
            _: &IndexDoc,
            _: &str,
            _: &str,
        ) -> anyhow::Result<ExtractedFile> {
            panic!("extraction engine must not be invoked on the fast path");
        }

        async fn text_extract(&self, _: &IndexDoc, _: &str) -> anyhow::Result<ExtractedText> {
            panic!("extraction engine must not be invoked on the fast path");
        }
    }

    struct BrokenExtractor;

    #[async_trait]
    impl DocExtractor for BrokenExtractor {
        async fn idoc_to_file(
            &self,
            _: &IndexDoc,
            _: &str,
            _: &str,
        ) -> anyhow::Result<ExtractedFile> {
            anyhow::bail!("helper process exited")
        }

        async fn text_extract(&self, _: &IndexDoc, _: &str) -> anyhow::Result<ExtractedText> {
            anyhow::bail!("helper process exited")
        }
    }

    fn part_doc() -> IndexDoc {
        IndexDoc {
            locator: b"file:///mail/box.mbox".to_vec(),
            ipath: "2".to_string(),
            url: "file:///mail/box.mbox".to_string(),
            filename: "box.mbox".to_string(),
            mimetype: "message/rfc822".to_string(),
            text: "attached report".to_string(),
            fields: Default::default(),
        }
    }

    fn index_with(docs: Vec<IndexDoc>) -> MemoryIndex {
        MemoryIndex::new(docs, AbstractParams::default())
    }

    #[tokio::test]
    async fn test_fast_path_strips_scheme_and_skips_extraction() {
        let idx = index_with(vec![]);
        let served = resolve_file(&idx, &NeverExtractor, b"file:///tmp/a.txt", "", "text/plain")
            .await
            .unwrap();
        assert_eq!(served.path, Path::new("/tmp/a.txt"));
        assert!(served.spool.is_none());
    }

    #[tokio::test]
    async fn test_part_requests_leave_the_fast_path() {
        let idx = index_with(vec![part_doc()]);
        let served = resolve_file(
            &idx,
            &MemoryExtractor,
            b"file:///mail/box.mbox",
            "2",
            "text/plain",
        )
        .await
        .unwrap();
        // 有内部路径就必须走抽取，哪怕是 file:// 定位符
        assert!(served.spool.is_some());
        assert_eq!(
            std::fs::read_to_string(&served.path).unwrap(),
            "attached report"
        );
    }

    #[tokio::test]
    async fn test_non_file_locator_uses_extraction() {
        let mut doc = part_doc();
        doc.locator = b"webcache://archive/42".to_vec();
        doc.ipath = String::new();
        let idx = index_with(vec![doc]);
        let served = resolve_file(
            &idx,
            &MemoryExtractor,
            b"webcache://archive/42",
            "",
            "text/plain",
        )
        .await
        .unwrap();
        assert!(served.spool.is_some());
    }

    #[tokio::test]
    async fn test_unknown_locator_is_content_not_found() {
        let idx = index_with(vec![]);
        let err = resolve_text(&idx, &MemoryExtractor, b"file:///gone", "3")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ContentNotFound(_)));
    }

    #[tokio::test]
    async fn test_extraction_failure_is_not_swallowed() {
        let idx = index_with(vec![part_doc()]);
        let err = resolve_file(
            &idx,
            &BrokenExtractor,
            b"file:///mail/box.mbox",
            "2",
            "text/plain",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GatewayError::ExtractionFailed(_)));
    }

    #[tokio::test]
    async fn test_text_view_round_trip() {
        let idx = index_with(vec![part_doc()]);
        let view = resolve_text(&idx, &MemoryExtractor, b"file:///mail/box.mbox", "2")
            .await
            .unwrap();
        assert_eq!(view.text, "attached report");
        assert_eq!(view.mimetype, "message/rfc822");
    }
}
