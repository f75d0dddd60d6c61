//! HTTP surface: `/predict`, `/recommend` and `/health`.

use crate::core::predictor::Predictor;
use crate::core::recommend::RecommendationService;
use crate::domain::model::{PredictionResult, Recommendation, RecommendationRequest};
use crate::utils::error::PredictError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Everything a handler needs, built once at startup and never mutated.
pub struct AppState {
    pub predictor: Predictor,
    pub recommender: Option<Arc<RecommendationService>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(predictor: Predictor, recommender: Option<RecommendationService>) -> Self {
        Self {
            predictor,
            recommender: recommender.map(Arc::new),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;

/// Error body returned to callers: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub PredictError);

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            tracing::debug!("Rejected request: {}", self.0);
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!("Request failed: {}", self.0);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub model: String,
}

/// POST /predict
pub async fn predict(
    State(state): State<SharedState>,
    Json(payload): Json<Value>,
) -> Result<Json<PredictionResult>, ApiError> {
    let result = state.predictor.predict_payload(&payload)?;
    tracing::debug!("Predicted {}", result.prediction);
    Ok(Json(result))
}

/// POST /recommend, routed only when a recommender is configured.
pub async fn recommend(
    State(recommender): State<Arc<RecommendationService>>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<Recommendation>, ApiError> {
    let recommendation = recommender.recommend(&request).await?;
    tracing::debug!("Recommended {}", recommendation.crop);
    Ok(Json(recommendation))
}

/// GET /health
pub async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.predictor.model().algorithm().to_string(),
    })
}

pub fn router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health_check));

    if let Some(recommender) = state.recommender.clone() {
        app = app.merge(
            Router::new()
                .route("/recommend", post(recommend))
                .with_state::<SharedState>(recommender),
        );
    }

    app.with_state(state).layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
