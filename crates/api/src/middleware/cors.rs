use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Build the CORS layer. Any origin may read; the admin UI writes with PUT/POST.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::PUT, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
