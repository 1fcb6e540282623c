use docsearch_gateway::extract::DocExtractor;
use docsearch_gateway::index::SearchIndex;
use std::sync::Arc;

/// Shared application state / 共享应用状态
///
/// The index and the extractor are immutable collaborators; every request
/// opens its own query session, nothing request-scoped lives here.
pub struct AppState {
    pub index: Arc<dyn SearchIndex>,
    pub extractor: Arc<dyn DocExtractor>,
}
