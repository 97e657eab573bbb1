//! HTTP API для дашборда: разбор, кодирование, запрос на предсказание

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::PipelineError;
use crate::pipeline::FeaturePipeline;
use crate::preprocessing::{FeatureEngineer, FittedOneHotEncoder};
use crate::query::LaptopQuery;
use crate::types::{EngineeredLaptop, LaptopFeatures, RawLaptop};

/// Кодировщик неизменяем после обучения, поэтому делится без блокировок
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FeaturePipeline>,
    pub encoder: Arc<FittedOneHotEncoder>,
}

impl AppState {
    pub fn new(pipeline: FeaturePipeline, encoder: FittedOneHotEncoder) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            encoder: Arc::new(encoder),
        }
    }
}

pub struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::Row { .. } | PipelineError::InvalidQuery(_) | PipelineError::EmptyTable => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!("Request failed: {}", self.0);
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EncodedResponse {
    pub feature_names: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub features: LaptopFeatures,
    pub feature_names: Vec<String>,
    pub model_input: Vec<f64>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/engineer", post(engineer))
        .route("/api/encode", post(encode))
        .route("/api/query", post(query))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Laptop Price ML API (Rust)",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn engineer(
    State(state): State<AppState>,
    Json(raws): Json<Vec<RawLaptop>>,
) -> Result<Json<Vec<EngineeredLaptop>>, ApiError> {
    tracing::info!("Engineer request: {} rows", raws.len());
    Ok(Json(state.pipeline.engineer(&raws)?))
}

async fn encode(
    State(state): State<AppState>,
    Json(rows): Json<Vec<LaptopFeatures>>,
) -> Json<EncodedResponse> {
    tracing::info!("Encode request: {} rows", rows.len());
    let encoded = state.encoder.transform(&rows);
    Json(EncodedResponse {
        feature_names: state.encoder.feature_names(),
        rows: encoded.rows().into_iter().map(|row| row.to_vec()).collect(),
    })
}

async fn query(
    State(state): State<AppState>,
    Json(query): Json<LaptopQuery>,
) -> Result<Json<QueryResponse>, ApiError> {
    tracing::info!("Query request: {} {}", query.company, query.type_name);
    let features = query.into_features()?;
    let model_input = FeatureEngineer::model_row(&features, &state.encoder).to_vec();

    Ok(Json(QueryResponse {
        feature_names: FeatureEngineer::model_feature_names(&state.encoder),
        features,
        model_input,
    }))
}
