use crate::state::AppState;
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

const METHODS: [Method; 3] = [Method::GET, Method::POST, Method::OPTIONS];

pub fn cors_layer(state: Arc<AppState>) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods(METHODS)
        .allow_headers([header::CONTENT_TYPE])
        // Browsers need this to read the attachment filename.
        .expose_headers([header::CONTENT_DISPOSITION]);

    let Some(origins_str) = &state.config.cors_allowed_origins else {
        // Wildcard – suitable for development; set MDPORT_CORS_ORIGINS in production.
        return base.allow_origin(Any);
    };

    // Parse the comma-separated origin list and build a restrictive layer.
    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();
    if origins.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(origins)
    }
}
