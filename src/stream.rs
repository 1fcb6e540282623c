//! Chunked content streaming / 分块内容流
//!
//! Both variants produce a lazy, single-pass sequence of bounded chunks
//! whose in-order concatenation is identical to the source. Nothing larger
//! than one chunk is held in memory, whatever the size of the resource.
//! 两种变体都产生惰性、单遍、有界分块序列，按序拼接与源完全一致；
//! 无论资源多大，内存里最多只有一个分块。
//!
//! The file variant owns its handle (and, for extracted content, the spool
//! file) and releases both when the stream is exhausted or dropped early —
//! a disconnecting client cleans up the same way a completed download does.

use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::TempPath;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::GatewayError;

/// Default chunk size for file streaming / 文件流的默认分块大小
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Byte-chunk stream over a file / 文件上的字节分块流
///
/// Wraps `ReaderStream` and keeps the optional extraction spool file alive
/// for exactly as long as the stream itself.
#[derive(Debug)]
pub struct FileChunkStream {
    inner: ReaderStream<File>,
    /// Deleted on drop / 随流释放时删除
    _spool: Option<TempPath>,
}

impl FileChunkStream {
    /// Open `path` for streaming / 打开文件准备分块传输
    ///
    /// A missing or unreadable file is the client's `ContentNotFound`:
    /// the locator pointed at nothing retrievable.
    pub async fn open(
        path: &Path,
        chunk_size: usize,
        spool: Option<TempPath>,
    ) -> Result<Self, GatewayError> {
        // 打不开就是定位符指向了取不到的东西 / any open failure means the
        // locator pointed at something unreachable
        let file = File::open(path)
            .await
            .map_err(|_| GatewayError::ContentNotFound(path.display().to_string()))?;

        Ok(Self {
            inner: ReaderStream::with_capacity(file, chunk_size),
            _spool: spool,
        })
    }
}

impl Stream for FileChunkStream {
    type Item = Result<Bytes, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Character-window iterator over a string / 字符串上的字符窗口迭代器
///
/// Windows are non-overlapping, at most `chunk_size` characters each, and
/// never split a code point. Empty input yields zero chunks.
pub struct TextChunks {
    text: String,
    chunk_size: usize,
    pos: usize,
}

impl TextChunks {
    pub fn new(text: String, chunk_size: usize) -> Self {
        assert!(chunk_size >= 1, "chunk size must be at least 1");
        Self {
            text,
            chunk_size,
            pos: 0,
        }
    }
}

impl Iterator for TextChunks {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        let end = rest
            .char_indices()
            .nth(self.chunk_size)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let chunk = Bytes::copy_from_slice(rest[..end].as_bytes());
        self.pos += end;
        Some(chunk)
    }
}

/// Adapt text chunks to a body stream / 把文本分块适配成响应体流
pub fn text_stream(
    text: String,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, std::convert::Infallible>> {
    futures::stream::iter(TextChunks::new(text, chunk_size).map(Ok))
}
