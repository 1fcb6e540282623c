//! HTTP 协商工具函数 / HTTP negotiation helpers

/// One parsed Accept entry / 解析出的一个 Accept 条目
#[derive(Debug, Clone, PartialEq)]
struct AcceptEntry {
    mime: String,
    q: f32,
}

/// Parse an Accept header into entries sorted by descending q
/// 解析 Accept 头，按 q 值降序排列
///
/// Malformed entries are skipped rather than failing the request.
fn parse_accept(header: &str) -> Vec<AcceptEntry> {
    let mut entries: Vec<AcceptEntry> = Vec::new();

    for item in header.split(',') {
        let mut parts = item.split(';');
        let mime = match parts.next() {
            Some(m) => m.trim().to_lowercase(),
            None => continue,
        };
        if mime.is_empty() || !mime.contains('/') {
            continue;
        }

        let mut q = 1.0f32;
        for param in parts {
            let param = param.trim();
            if let Some(value) = param.strip_prefix("q=") {
                q = value.parse().unwrap_or(0.0);
            }
        }
        entries.push(AcceptEntry { mime, q });
    }

    // 稳定排序保持同 q 值条目的书写顺序 / stable sort keeps written order for equal q
    entries.sort_by(|a, b| b.q.partial_cmp(&a.q).unwrap_or(std::cmp::Ordering::Equal));
    entries
}

/// Whether `offered` satisfies the accept pattern / 判断提供的类型是否满足模式
fn accepts(pattern: &str, offered: &str) -> bool {
    if pattern == "*/*" {
        return true;
    }
    if let Some(main) = pattern.strip_suffix("/*") {
        return offered
            .split('/')
            .next()
            .map(|m| m.eq_ignore_ascii_case(main))
            .unwrap_or(false);
    }
    pattern.eq_ignore_ascii_case(offered)
}

/// Negotiate the served content type / 协商实际提供的内容类型
///
/// The document's own mimetype wins whenever the client accepts it; when it
/// doesn't, the highest-q concrete type the client listed becomes the
/// conversion target. Absent or malformed Accept headers fall back to the
/// document mimetype.
/// 客户端接受时文档自身的 mimetype 优先；否则取客户端列出的 q 值最高的
/// 具体类型作为转换目标；Accept 缺失或无法解析时退回文档 mimetype。
pub fn negotiate_mime(accept_header: Option<&str>, doc_mime: &str) -> String {
    let header = match accept_header {
        Some(h) if !h.trim().is_empty() => h,
        _ => return doc_mime.to_string(),
    };

    let entries = parse_accept(header);
    if entries.is_empty() {
        return doc_mime.to_string();
    }

    if entries
        .iter()
        .any(|e| e.q > 0.0 && accepts(&e.mime, doc_mime))
    {
        return doc_mime.to_string();
    }

    entries
        .iter()
        .find(|e| e.q > 0.0 && !e.mime.contains('*'))
        .map(|e| e.mime.clone())
        .unwrap_or_else(|| doc_mime.to_string())
}
