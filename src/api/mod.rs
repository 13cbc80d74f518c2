//! REST API module using Axum
//!
//! Provides HTTP endpoints for the Quake-Grade assessment page:
//! - v1 API with a consistent `{data, meta}` / `{error, meta}` envelope
//! - Form page served via `rust-embed` (compiled into the binary)

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::ApiState;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use rust_embed::Embed;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Environment variable with a comma-separated list of allowed CORS origins.
pub const CORS_ORIGINS_ENV: &str = "QUAKE_CORS_ORIGINS";

/// Form page assets compiled from `static/`.
#[derive(Embed)]
#[folder = "static/"]
struct PageAssets;

/// Serve a static asset or fall back to `index.html`.
async fn serve_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    if let Some(content) = PageAssets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            content.data.into_owned(),
        )
            .into_response();
    }

    if let Some(index) = PageAssets::get("index.html") {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            index.data.into_owned(),
        )
            .into_response();
    }

    (StatusCode::OK, "Quake-Grade is running. Form page not bundled.").into_response()
}

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `QUAKE_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development (e.g., `http://localhost:5173`).
fn build_cors_layer() -> CorsLayer {
    match std::env::var(CORS_ORIGINS_ENV) {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE])
        }
        Err(_) => CorsLayer::new()
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    }
}

/// Create the complete application router with API and page serving.
pub fn create_app(state: ApiState) -> Router {
    let cors = build_cors_layer();
    let body_limit = state.config.data.max_upload_bytes();

    Router::new()
        .nest("/api/v1", routes::api_routes(state.clone()))
        .merge(routes::health_routes(state))
        .fallback(serve_asset)
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
