//! Query execution and pagination / 查询执行与分页
//!
//! Runs a validated query against the index, clamps the requested window
//! against the true match count and materializes exactly the effective
//! window of formatted documents. The query session is released when this
//! function returns, on every exit path.
//! 对索引执行校验后的查询，按真实命中数收敛请求窗口，
//! 物化有效窗口内的格式化文档。查询会话在函数返回时释放。

use serde_json::Map;

use crate::error::GatewayError;
use crate::ident;
use crate::index::{HighlightMethods, IndexDoc, IndexQuery, SearchIndex};
use crate::models::{DocumentRecord, QueryRequest, SearchResponse};

/// Fixed highlight markers supplied to the index's excerpt generator
/// 提供给索引摘录生成器的固定高亮标记
pub struct MarkerHighlighter;

impl HighlightMethods for MarkerHighlighter {
    fn start_match(&self, _term: &str) -> String {
        "<m>".to_string()
    }

    fn end_match(&self) -> String {
        "</m>".to_string()
    }
}

/// Execute a search request end to end / 端到端执行一次搜索请求
///
/// Window semantics / 窗口语义:
/// - effective skip  = clamp(skip, 0, count)
/// - effective limit = limit < 0 ? count - skip : min(limit, count - skip)
///
/// A skip past the end of the result set is not an error; the cursor lands
/// at the end and zero documents follow.
pub async fn run_query(
    index: &dyn SearchIndex,
    params: &QueryRequest,
) -> Result<SearchResponse, GatewayError> {
    let mut query = index
        .open_query()
        .await
        .map_err(GatewayError::IndexUnavailable)?;

    tracing::debug!("query string: {}", params.query);
    let count = query
        .execute(&params.query)
        .await
        .map_err(GatewayError::IndexUnavailable)?;
    tracing::debug!("number of results: {}", count);

    let skip = params.skip.clamp(0, count as i64) as usize;
    query
        .scroll(skip)
        .await
        .map_err(GatewayError::IndexUnavailable)?;

    let limit = if params.limit < 0 {
        count - skip
    } else {
        (params.limit as usize).min(count - skip)
    };

    let mut documents = Vec::with_capacity(limit);
    for _ in 0..limit {
        let doc = query
            .next_doc()
            .await
            .map_err(GatewayError::IndexUnavailable)?;
        match doc {
            Some(doc) => {
                documents.push(format_document(query.as_ref(), &doc, &MarkerHighlighter).await?)
            }
            // 索引给出的 count 可能是估计值 / the reported count may be an estimate
            None => break,
        }
    }

    let groups = query
        .groups()
        .await
        .map_err(GatewayError::IndexUnavailable)?;

    Ok(SearchResponse {
        groups,
        count,
        skip,
        limit,
        documents,
    })
}

/// Map a raw index document to its transport record / 原始文档映射为传输记录
pub async fn format_document(
    query: &dyn IndexQuery,
    doc: &IndexDoc,
    methods: &dyn HighlightMethods,
) -> Result<DocumentRecord, GatewayError> {
    let abstract_text = query
        .make_abstract(doc, methods)
        .await
        .map_err(GatewayError::IndexUnavailable)?;
    let snippets = query
        .snippets(doc, methods)
        .await
        .map_err(GatewayError::IndexUnavailable)?;

    let mut fields: Map<String, serde_json::Value> =
        doc.fields.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    // 派生字段优先于同名元数据 / derived fields win over raw metadata
    for key in [
        "id", "part", "url", "binurl", "filename", "abstract", "snippets",
    ] {
        fields.remove(key);
    }

    let id = ident::encode_locator(&doc.locator);
    Ok(DocumentRecord {
        fields,
        part: ident::encode_part(&doc.ipath),
        url: doc.url.clone(),
        binurl: id.clone(),
        id,
        filename: doc.filename.clone(),
        abstract_text,
        snippets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{AbstractParams, MemoryIndex};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    fn report_index(n: usize) -> MemoryIndex {
        let docs = (0..n)
            .map(|i| {
                let url = format!("file:///docs/report-{:02}.txt", i);
                let mut fields = BTreeMap::new();
                fields.insert("order".to_string(), serde_json::Value::from(i));
                IndexDoc {
                    locator: url.clone().into_bytes(),
                    ipath: String::new(),
                    filename: format!("report-{:02}.txt", i),
                    mimetype: "text/plain".to_string(),
                    text: format!("report number {}", i),
                    fields,
                    url,
                }
            })
            .collect();
        MemoryIndex::new(docs, AbstractParams::default())
    }

    fn request(query: &str, skip: i64, limit: i64) -> QueryRequest {
        QueryRequest {
            query: query.to_string(),
            skip,
            limit,
        }
    }

    #[tokio::test]
    async fn test_window_clamps_to_tail() {
        // 25 个命中，skip 20 limit 10 → 窗口只剩 5
        let idx = report_index(25);
        let resp = run_query(&idx, &request("report", 20, 10)).await.unwrap();
        assert_eq!(resp.count, 25);
        assert_eq!(resp.skip, 20);
        assert_eq!(resp.limit, 5);
        assert_eq!(resp.documents.len(), 5);
        assert_eq!(resp.documents[0].filename, "report-20.txt");
        assert_eq!(resp.documents[4].filename, "report-24.txt");
    }

    #[tokio::test]
    async fn test_negative_limit_takes_all_remaining() {
        let idx = report_index(7);
        let resp = run_query(&idx, &request("report", 2, -1)).await.unwrap();
        assert_eq!(resp.skip, 2);
        assert_eq!(resp.limit, 5);
        assert_eq!(resp.documents.len(), 5);
    }

    #[tokio::test]
    async fn test_skip_past_end_is_empty_not_error() {
        let idx = report_index(3);
        let resp = run_query(&idx, &request("report", 100, -1)).await.unwrap();
        assert_eq!(resp.count, 3);
        assert_eq!(resp.skip, 3);
        assert_eq!(resp.limit, 0);
        assert!(resp.documents.is_empty());
    }

    #[tokio::test]
    async fn test_negative_skip_clamped_to_zero() {
        let idx = report_index(3);
        let resp = run_query(&idx, &request("report", -5, 2)).await.unwrap();
        assert_eq!(resp.skip, 0);
        assert_eq!(resp.limit, 2);
        assert_eq!(resp.documents[0].filename, "report-00.txt");
    }

    #[tokio::test]
    async fn test_zero_limit_is_valid() {
        let idx = report_index(3);
        let resp = run_query(&idx, &request("report", 0, 0)).await.unwrap();
        assert_eq!(resp.limit, 0);
        assert!(resp.documents.is_empty());
    }

    #[tokio::test]
    async fn test_window_invariants_hold() {
        let idx = report_index(10);
        for (skip, limit) in [(0, -1), (0, 0), (3, 5), (9, 9), (10, 1), (50, -1), (-2, 4)] {
            let resp = run_query(&idx, &request("report", skip, limit)).await.unwrap();
            assert!(resp.skip <= resp.count);
            assert!(resp.limit <= resp.count - resp.skip);
            assert_eq!(resp.documents.len(), resp.limit);
        }
    }

    #[tokio::test]
    async fn test_formatted_record_fields() {
        let idx = report_index(1);
        let resp = run_query(&idx, &request("report", 0, -1)).await.unwrap();
        let doc = &resp.documents[0];

        assert_eq!(doc.id, doc.binurl);
        assert_eq!(doc.part, "");
        assert_eq!(doc.url, "file:///docs/report-00.txt");
        assert_eq!(
            crate::ident::decode_locator(&doc.id).unwrap(),
            doc.url.as_bytes()
        );
        assert!(doc.abstract_text.contains("<m>report</m>"));
        // 原始元数据平铺保留 / raw metadata survives flattened
        assert_eq!(doc.fields["order"], 0);
    }

    #[tokio::test]
    async fn test_groups_passed_through() {
        let idx = report_index(1);
        let resp = run_query(&idx, &request("report", 0, -1)).await.unwrap();
        assert_eq!(resp.groups[0]["term"], "report");
    }

    struct DownIndex;

    #[async_trait]
    impl SearchIndex for DownIndex {
        async fn open_query(&self) -> anyhow::Result<Box<dyn IndexQuery>> {
            anyhow::bail!("index directory is locked")
        }

        async fn fetch_doc(&self, _: &[u8], _: &str) -> anyhow::Result<Option<IndexDoc>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_unreachable_index_is_index_unavailable() {
        let err = run_query(&DownIndex, &request("report", 0, -1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::IndexUnavailable(_)));
    }
}
