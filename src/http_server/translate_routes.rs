//! Translation Routes
//!
//! `POST /translate` returns the plan for a question, `POST /explain` the
//! full explain output. An unmatched question is a normal 200 response with
//! `matched: false`; the caller replies with `reply_on_miss`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ApiResult;
use crate::observability::{observe_translation, MetricsRegistry};
use crate::responder::DEFAULT_SENTINEL;
use crate::translator::{ExplainTranslation, QueryPlan, Translator};

/// State shared by every handler
#[derive(Debug)]
pub struct AppState {
    pub translator: Translator,
    pub metrics: Arc<MetricsRegistry>,
    pub sentinel: String,
}

impl AppState {
    pub fn new(translator: Translator, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            translator,
            metrics,
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Translator::default(), Arc::new(MetricsRegistry::new()))
    }
}

/// Request body; a missing `text` is treated as an empty question
#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub request_id: String,
    pub matched: bool,
    pub plan: Option<QueryPlan>,
    pub reply_on_miss: String,
}

#[derive(Debug, Serialize)]
pub struct ExplainResponse {
    pub request_id: String,
    #[serde(flatten)]
    pub explain: ExplainTranslation,
    /// Human-readable form of the same explain output
    pub rendered: String,
}

pub fn translate_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/translate", post(translate_handler))
        .route("/explain", post(explain_handler))
        .with_state(state)
}

async fn translate_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> ApiResult<Json<TranslateResponse>> {
    let Json(request) = body?;
    let request_id = Uuid::new_v4().to_string();

    let translation = state.translator.translate_detailed(request.text.as_deref());
    observe_translation(&state.metrics, &request_id, &translation);

    Ok(Json(TranslateResponse {
        request_id,
        matched: translation.plan.is_some(),
        plan: translation.plan,
        reply_on_miss: state.sentinel.clone(),
    }))
}

async fn explain_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TranslateRequest>, JsonRejection>,
) -> ApiResult<Json<ExplainResponse>> {
    let Json(request) = body?;
    let explain = state.translator.explain(request.text.as_deref());
    let rendered = explain.to_string();

    Ok(Json(ExplainResponse {
        request_id: Uuid::new_v4().to_string(),
        explain,
        rendered,
    }))
}
