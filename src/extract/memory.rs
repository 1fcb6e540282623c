//! Extractor over in-memory documents / 内存文档的抽取器
//!
//! The in-memory index already stores extracted text, so "extraction" here
//! is spooling that text into a temp file (binary route) or handing it back
//! (text route). The spool file belongs to the caller via `TempPath` and is
//! deleted when the serving stream drops it.

use async_trait::async_trait;
use tempfile::NamedTempFile;

use anyhow::{Context, Result};

use super::{DocExtractor, ExtractedFile, ExtractedText};
use crate::index::IndexDoc;

pub struct MemoryExtractor;

#[async_trait]
impl DocExtractor for MemoryExtractor {
    async fn idoc_to_file(
        &self,
        doc: &IndexDoc,
        ipath: &str,
        _mimetype: &str,
    ) -> Result<ExtractedFile> {
        anyhow::ensure!(
            doc.ipath == ipath,
            "document carries part {:?}, requested {:?}",
            doc.ipath,
            ipath
        );

        // 落盘到临时文件，TempPath 随流释放时删除文件
        // Spool to a temp file; TempPath deletes it when the stream drops
        let mut file = NamedTempFile::new().context("cannot create spool file")?;
        std::io::Write::write_all(&mut file, doc.text.as_bytes())
            .context("cannot write spool file")?;

        let spool = file.into_temp_path();
        Ok(ExtractedFile {
            path: spool.to_path_buf(),
            spool: Some(spool),
        })
    }

    async fn text_extract(&self, doc: &IndexDoc, ipath: &str) -> Result<ExtractedText> {
        anyhow::ensure!(
            doc.ipath == ipath,
            "document carries part {:?}, requested {:?}",
            doc.ipath,
            ipath
        );
        Ok(ExtractedText {
            text: doc.text.clone(),
            mimetype: doc.mimetype.clone(),
        })
    }
}
