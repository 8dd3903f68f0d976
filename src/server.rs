use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::api::{
    ApiError, ApiHealth, ApiModelInfo, ApiPredictionRequest, ApiPredictionResponse,
};
use view_forecast::config::ForecastConfig;
use view_forecast::model::ModelHandle;
use view_forecast::{forecast, ForecastError};

#[derive(Clone)]
struct AppState {
    model: Arc<ModelHandle>,
    config: Arc<ForecastConfig>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub async fn serve(config: ForecastConfig, host: String, port: u16) -> view_forecast::Result<()> {
    let model = match view_forecast::model::ModelContext::load(&config) {
        Ok(context) => ModelHandle::with_context(context),
        Err(err) => {
            warn!(error = %err, "starting without a model, predictions will return 503");
            ModelHandle::empty()
        }
    };

    let state = AppState {
        model: Arc::new(model),
        config: Arc::new(config),
    };

    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/model-info", get(model_info))
        .route("/api/predict", post(predict_handler))
        .route("/api/reload", post(reload_handler))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|err| ForecastError::Config(format!("invalid bind address: {}", err)))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| ForecastError::Config(format!("failed to bind server: {}", err)))?;
    info!(%addr, "forecast server listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| ForecastError::Config(format!("server error: {}", err)))?;

    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "healthy",
        model_loaded: state.model.is_loaded().await,
    })
}

async fn model_info(State(state): State<AppState>) -> ApiResult<ApiModelInfo> {
    let context = state.model.current().await.map_err(error_response)?;
    let metadata = context.metadata();
    Ok(Json(ApiModelInfo {
        model_name: metadata.model_name.clone(),
        training_date: metadata
            .training_date
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        feature_count: context.schema().len(),
        schema_fingerprint: context.schema().fingerprint(),
        backend: context.backend().label(),
    }))
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiPredictionRequest>,
) -> ApiResult<ApiPredictionResponse> {
    let context = state.model.current().await.map_err(error_response)?;
    let record = request.into_record().map_err(error_response)?;
    let result = forecast(&context, &record, &state.config.inference)
        .await
        .map_err(error_response)?;
    Ok(Json(ApiPredictionResponse::from(result)))
}

async fn reload_handler(State(state): State<AppState>) -> ApiResult<ApiModelInfo> {
    state
        .model
        .reload(&state.config)
        .await
        .map_err(error_response)?;
    model_info(State(state)).await
}

fn error_response(err: ForecastError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    }
    (status, Json(ApiError::new(err.to_string())))
}

fn status_for(err: &ForecastError) -> StatusCode {
    match err {
        ForecastError::ScorerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ForecastError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ForecastError::Scorer(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
