//! sentiment-api library - HTTP adapter for the review sentiment pipeline
//!
//! The pipeline is loaded once at startup and injected into every handler
//! through [`AppState`].

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::{middleware, Router};
use sentiment_core::config::LimitsConfig;
use sentiment_core::SentimentPipeline;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded pipeline (read-only, shared by all requests)
    pub pipeline: Arc<SentimentPipeline>,
    /// Request size limits
    pub limits: LimitsConfig,
    /// Run batch items on the rayon pool
    pub parallel_batch: bool,
}

impl AppState {
    /// Create new application state
    pub fn new(pipeline: Arc<SentimentPipeline>, limits: LimitsConfig) -> Self {
        Self {
            pipeline,
            limits,
            parallel_batch: true,
        }
    }

    pub fn with_parallel_batch(mut self, parallel_batch: bool) -> Self {
        self.parallel_batch = parallel_batch;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let sentiment = Router::new()
        .route("/api/v1/sentiment/analyze", post(api::analyze_sentiment))
        .route(
            "/api/v1/sentiment/analyze/batch",
            post(api::analyze_sentiment_batch),
        )
        .route("/api/v1/sentiment/info", get(api::sentiment_info));

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(sentiment)
        .merge(api::health_routes())
        .route("/api/buildinfo", get(api::get_build_info))
        .fallback(api::not_found)
        .with_state(state)
        .layer(middleware::from_fn(api::method_not_allowed))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for the configured origins; `"*"` allows any origin
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.iter().any(|origin| origin == "*") {
        return Ok(CorsLayer::permissive());
    }

    let allowed = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}
