//! Route modules for PDFEdit Server

pub mod form;
pub mod health;
pub mod pdf;
pub mod response;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::state::AppState;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = match config {
        CorsConfig::Any => AllowOrigin::any(),
        CorsConfig::Origins(origins) => AllowOrigin::list(origins.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| tracing::warn!("Ignoring invalid CORS origin {:?}", o))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(response::EXPOSED_HEADERS)
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    let config = state.config();
    let cors = cors_layer(&config.cors);
    let max_upload = config.limits.max_upload_bytes();

    Router::new()
        .merge(health::router())
        .nest("/pdf", pdf::router(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
