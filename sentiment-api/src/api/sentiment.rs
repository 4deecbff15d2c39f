//! Sentiment analysis endpoints
//!
//! Inference is CPU-bound, so each request hands the pipeline to
//! `spawn_blocking` instead of running it on the async executor.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use sentiment_core::config::LimitsConfig;
use sentiment_core::{BatchOutcome, PipelineSummary, SentimentLabel};
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinError;
use tracing::{debug, error};

use super::validation::{validate_batch_input, validate_text_input};
use crate::{ApiError, ApiResult, AppState};

/// Characters of review text included in error logs
const LOG_PREVIEW_CHARS: usize = 50;

/// POST /api/v1/sentiment/analyze response
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub sentiment: &'static str,
    pub text: String,
    pub processed: bool,
    pub raw_prediction: i64,
}

/// One entry of a batch response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchItem {
    Success {
        text: String,
        sentiment: &'static str,
        raw_prediction: i64,
    },
    Failure {
        text: String,
        sentiment: &'static str,
        error: &'static str,
    },
}

impl From<BatchOutcome> for BatchItem {
    fn from(outcome: BatchOutcome) -> Self {
        match outcome.result {
            Ok(label) => BatchItem::Success {
                text: outcome.text,
                sentiment: label.as_str(),
                raw_prediction: label.as_raw(),
            },
            Err(e) => {
                error!(
                    "Error analyzing batch item '{}': {}",
                    preview(&outcome.text),
                    e
                );
                BatchItem::Failure {
                    text: outcome.text,
                    sentiment: "error",
                    error: "Analysis failed",
                }
            }
        }
    }
}

/// POST /api/v1/sentiment/analyze/batch response
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
    pub processed_count: usize,
    pub success: bool,
}

/// Endpoint paths advertised by the info endpoint
#[derive(Debug, Serialize)]
pub struct Endpoints {
    pub single_analysis: &'static str,
    pub batch_analysis: &'static str,
    pub service_info: &'static str,
}

/// GET /api/v1/sentiment/info response
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub service: &'static str,
    pub model_loaded: bool,
    pub supported_sentiments: Vec<&'static str>,
    pub limits: LimitsConfig,
    pub endpoints: Endpoints,
    pub model: PipelineSummary,
}

/// First few characters of a review, for log lines
fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().nth(LOG_PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}

/// The blocking task panicked or was cancelled; details stay in the log
fn task_failed(e: JoinError) -> ApiError {
    error!("Sentiment analysis task failed: {}", e);
    ApiError::Analysis(sentiment_core::Error::AnalysisFailure(e.to_string()))
}

/// POST /api/v1/sentiment/analyze
///
/// Body: `{"text": "..."}`. Responds with the label and the text as submitted.
pub async fn analyze_sentiment(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let Json(body) = payload?;
    let text = validate_text_input(&body, &state.limits)?;

    let pipeline = state.pipeline.clone();
    let (text, result) = tokio::task::spawn_blocking(move || {
        let result = pipeline.analyze(&text);
        (text, result)
    })
    .await
    .map_err(task_failed)?;

    let label: SentimentLabel = result.map_err(|e| {
        error!("Error in sentiment analysis for '{}': {}", preview(&text), e);
        ApiError::Analysis(e)
    })?;

    debug!("Analyzed review ({} chars): {}", text.chars().count(), label);

    Ok(Json(AnalyzeResponse {
        sentiment: label.as_str(),
        text,
        processed: true,
        raw_prediction: label.as_raw(),
    }))
}

/// POST /api/v1/sentiment/analyze/batch
///
/// Body: `{"texts": [...]}`. Results keep input order; a failing item is
/// reported in place and does not fail the request.
pub async fn analyze_sentiment_batch(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<BatchResponse>> {
    let Json(body) = payload?;
    let texts = validate_batch_input(&body, &state.limits)?;

    let pipeline = state.pipeline.clone();
    let parallel = state.parallel_batch;
    let outcomes = tokio::task::spawn_blocking(move || {
        if parallel {
            pipeline.analyze_batch_parallel(&texts)
        } else {
            pipeline.analyze_batch(&texts)
        }
    })
    .await
    .map_err(task_failed)?;

    let results: Vec<BatchItem> = outcomes.into_iter().map(BatchItem::from).collect();
    debug!("Analyzed batch of {} reviews", results.len());

    Ok(Json(BatchResponse {
        processed_count: results.len(),
        results,
        success: true,
    }))
}

/// GET /api/v1/sentiment/info
pub async fn sentiment_info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        service: "sentiment_analysis",
        model_loaded: state.pipeline.is_loaded(),
        supported_sentiments: SentimentLabel::SUPPORTED
            .iter()
            .map(|label| label.as_str())
            .collect(),
        limits: state.limits,
        endpoints: Endpoints {
            single_analysis: "/api/v1/sentiment/analyze",
            batch_analysis: "/api/v1/sentiment/analyze/batch",
            service_info: "/api/v1/sentiment/info",
        },
        model: state.pipeline.summary(),
    })
}
