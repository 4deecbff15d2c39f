//! HTTP API handlers for sentiment-api

pub mod buildinfo;
pub mod health;
pub mod sentiment;
pub mod ui;
pub mod validation;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use sentiment::{analyze_sentiment, analyze_sentiment_batch, sentiment_info};
pub use ui::{serve_app_js, serve_index};

use axum::extract::Request;
use axum::http::{header, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::ApiError;

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for {}", uri.path()))
}

/// Rewrite axum's bare 405 into the JSON error shape, keeping the `Allow` header
pub async fn method_not_allowed(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let response = next.run(request).await;
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut json = ApiError::MethodNotAllowed(format!(
        "Method {} is not allowed for this endpoint",
        method
    ))
    .into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(header::ALLOW, allow);
    }
    json
}
