use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

/// Cap request bodies at `max_bytes`, answering larger ones with 413.
///
/// axum's own 2 MB extractor limit is switched off so `max_bytes` is the only
/// bound, in either direction.
pub fn with_body_limit(router: Router, max_bytes: usize) -> Router {
    router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_bytes))
}
