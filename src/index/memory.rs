//! In-memory index backend / 内存索引后端
//!
//! Keeps the whole document set in memory and answers queries by token
//! matching: a document matches when every query term occurs in its text or
//! filename. Result order is insertion order, which is also the cursor
//! order seen by the paginator.
//! 整个文档集驻留内存，按词元匹配：查询中的每个词都出现在正文或文件名中
//! 才算命中。结果顺序即插入顺序，也就是分页器看到的游标顺序。
//!
//! The document set is loaded from a JSON file (`index.data_file`); this
//! backend never builds or maintains an index of its own.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use super::{HighlightMethods, IndexDoc, IndexQuery, SearchIndex};
use crate::models::Snippet;

/// Page separator inside extracted text / 提取文本中的分页符
const PAGE_BREAK: char = '\x0c';

/// Abstract/snippet window parameters / 摘要与摘录窗口参数
#[derive(Debug, Clone, Copy)]
pub struct AbstractParams {
    /// Window size in characters / 窗口长度（字符）
    pub max_chars: usize,
    /// Context words kept on each side of a match / 命中词两侧保留词数
    pub context_words: usize,
}

impl Default for AbstractParams {
    fn default() -> Self {
        Self {
            max_chars: 120,
            context_words: 4,
        }
    }
}

/// One record of the JSON document set / JSON 文档集中的一条记录
#[derive(Debug, Deserialize)]
struct DocumentSource {
    url: String,
    #[serde(default)]
    ipath: String,
    mimetype: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    fields: BTreeMap<String, serde_json::Value>,
}

/// In-memory search index / 内存搜索索引
#[derive(Debug)]
pub struct MemoryIndex {
    docs: Arc<Vec<IndexDoc>>,
    params: AbstractParams,
}

impl MemoryIndex {
    pub fn new(docs: Vec<IndexDoc>, params: AbstractParams) -> Self {
        Self {
            docs: Arc::new(docs),
            params,
        }
    }

    /// Load the document set from a JSON file / 从 JSON 文件加载文档集
    pub fn load(path: &Path, params: AbstractParams) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read index data file {:?}", path))?;
        let sources: Vec<DocumentSource> = serde_json::from_str(&content)
            .with_context(|| format!("index data file {:?} is not valid JSON", path))?;

        let docs = sources.into_iter().map(IndexDoc::from).collect();
        Ok(Self::new(docs, params))
    }

    pub fn doc_count(&self) -> usize {
        self.docs.len()
    }
}

impl From<DocumentSource> for IndexDoc {
    fn from(source: DocumentSource) -> Self {
        let filename = source.filename.unwrap_or_else(|| {
            source
                .url
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        });
        IndexDoc {
            locator: source.url.clone().into_bytes(),
            ipath: source.ipath,
            url: source.url,
            filename,
            mimetype: source.mimetype,
            text: source.text,
            fields: source.fields,
        }
    }
}

#[async_trait]
impl SearchIndex for MemoryIndex {
    async fn open_query(&self) -> Result<Box<dyn IndexQuery>> {
        Ok(Box::new(MemoryQuery {
            docs: self.docs.clone(),
            params: self.params,
            terms: Vec::new(),
            matches: Vec::new(),
            cursor: 0,
        }))
    }

    async fn fetch_doc(&self, locator: &[u8], ipath: &str) -> Result<Option<IndexDoc>> {
        Ok(self
            .docs
            .iter()
            .find(|d| d.locator == locator && d.ipath == ipath)
            .cloned())
    }
}

/// Query session over the in-memory document set / 内存文档集上的查询会话
struct MemoryQuery {
    docs: Arc<Vec<IndexDoc>>,
    params: AbstractParams,
    terms: Vec<String>,
    /// Indices of matching documents, in insertion order / 命中文档下标
    matches: Vec<usize>,
    cursor: usize,
}

#[async_trait]
impl IndexQuery for MemoryQuery {
    async fn execute(&mut self, query: &str) -> Result<usize> {
        self.terms = query_terms(query);
        self.cursor = 0;
        self.matches.clear();

        if self.terms.is_empty() {
            return Ok(0);
        }

        for (idx, doc) in self.docs.iter().enumerate() {
            if doc_matches(doc, &self.terms) {
                self.matches.push(idx);
            }
        }
        Ok(self.matches.len())
    }

    async fn scroll(&mut self, position: usize) -> Result<()> {
        // 越过末尾是合法的，后续 next_doc 返回 None
        self.cursor = position.min(self.matches.len());
        Ok(())
    }

    async fn next_doc(&mut self) -> Result<Option<IndexDoc>> {
        match self.matches.get(self.cursor) {
            Some(&idx) => {
                self.cursor += 1;
                Ok(Some(self.docs[idx].clone()))
            }
            None => Ok(None),
        }
    }

    async fn groups(&self) -> Result<serde_json::Value> {
        // 每个查询词及其展开集合；内存后端不做词形展开
        // Each query term with its expansion set; no stemming here
        let groups: Vec<serde_json::Value> = self
            .terms
            .iter()
            .map(|t| serde_json::json!({ "term": t, "expansions": [t] }))
            .collect();
        Ok(serde_json::Value::Array(groups))
    }

    async fn make_abstract(
        &self,
        doc: &IndexDoc,
        methods: &dyn HighlightMethods,
    ) -> Result<String> {
        Ok(excerpt(&doc.text, &self.terms, self.params, methods))
    }

    async fn snippets(
        &self,
        doc: &IndexDoc,
        methods: &dyn HighlightMethods,
    ) -> Result<Vec<Snippet>> {
        let mut snippets = Vec::new();
        // 逐页扫描，页号从 1 开始 / scan page by page, 1-based page numbers
        for (page_idx, page) in doc.text.split(PAGE_BREAK).enumerate() {
            let tokens = tokenize(page);
            let mut seen: Vec<&str> = Vec::new();
            for token in &tokens {
                if !self.terms.iter().any(|t| t == &token.lower) {
                    continue;
                }
                if seen.contains(&token.lower.as_str()) {
                    // 每页每词只取第一次出现 / first occurrence per term per page
                    continue;
                }
                seen.push(token.lower.as_str());
                snippets.push(Snippet {
                    page: (page_idx + 1) as u32,
                    term: token.lower.clone(),
                    text: excerpt_at(page, &tokens, token.index, &self.terms, self.params, methods),
                });
            }
        }
        Ok(snippets)
    }
}

/// A token with its byte span in the source text / 带字节区间的词元
struct Token {
    start: usize,
    end: usize,
    lower: String,
    index: usize,
}

/// Split text into alphanumeric runs / 按字母数字连续段切分
fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (pos, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            if start.is_none() {
                start = Some(pos);
            }
        } else if let Some(s) = start.take() {
            push_token(&mut tokens, text, s, pos);
        }
    }
    if let Some(s) = start {
        push_token(&mut tokens, text, s, text.len());
    }
    tokens
}

fn push_token(tokens: &mut Vec<Token>, text: &str, start: usize, end: usize) {
    let index = tokens.len();
    tokens.push(Token {
        start,
        end,
        lower: text[start..end].to_lowercase(),
        index,
    });
}

fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for token in tokenize(query) {
        if !terms.contains(&token.lower) {
            terms.push(token.lower);
        }
    }
    terms
}

/// Every term must occur in text or filename / 每个词都要出现在正文或文件名
fn doc_matches(doc: &IndexDoc, terms: &[String]) -> bool {
    let text_tokens = tokenize(&doc.text);
    let name_tokens = tokenize(&doc.filename);
    terms.iter().all(|term| {
        text_tokens.iter().any(|t| &t.lower == term)
            || name_tokens.iter().any(|t| &t.lower == term)
    })
}

/// Abstract anchored at the first match / 以首个命中词为锚点的摘要
fn excerpt(
    text: &str,
    terms: &[String],
    params: AbstractParams,
    methods: &dyn HighlightMethods,
) -> String {
    let tokens = tokenize(text);
    let anchor = tokens
        .iter()
        .find(|t| terms.iter().any(|term| term == &t.lower))
        .map(|t| t.index);

    match anchor {
        Some(idx) => excerpt_at(text, &tokens, idx, terms, params, methods),
        // 无命中词时退化为文本开头 / no match: degrade to the head of the text
        None => {
            let head: String = text.chars().take(params.max_chars).collect();
            if head.len() < text.len() {
                format!("{}...", head)
            } else {
                head
            }
        }
    }
}

/// Build a highlighted window around `anchor` / 围绕锚点构造高亮窗口
///
/// The window starts `context_words` tokens before the anchor and extends
/// forward until the character budget is spent. Inter-token separators come
/// from the source text unchanged; the gateway adds nothing but markers.
fn excerpt_at(
    text: &str,
    tokens: &[Token],
    anchor: usize,
    terms: &[String],
    params: AbstractParams,
    methods: &dyn HighlightMethods,
) -> String {
    if tokens.is_empty() {
        return String::new();
    }

    let first = anchor.saturating_sub(params.context_words);
    let mut out = String::new();
    let mut chars_used = 0usize;
    let mut last = first;

    if first > 0 {
        out.push_str("...");
    }

    for (offset, token) in tokens[first..].iter().enumerate() {
        let word = &text[token.start..token.end];
        let word_chars = word.chars().count();
        if chars_used > 0 && chars_used + word_chars > params.max_chars {
            out.push_str("...");
            return out;
        }

        if offset > 0 {
            // 保留原文的分隔符 / keep the original separator text
            let prev = &tokens[first + offset - 1];
            out.push_str(&text[prev.end..token.start]);
        }

        if terms.iter().any(|t| t == &token.lower) {
            out.push_str(&methods.start_match(&token.lower));
            out.push_str(word);
            out.push_str(&methods.end_match());
        } else {
            out.push_str(word);
        }
        chars_used += word_chars;
        last = first + offset;
    }

    if last + 1 < tokens.len() {
        out.push_str("...");
    }
    out
}
