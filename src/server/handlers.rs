use super::types::{ErrorResponse, InfoResponse, PredictResponse};
use crate::{
    Error, Result,
    model::{FeatureRecord, ModelService},
};
use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use serde_json::Value;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub model: ModelService,
}

pub async fn info() -> Json<InfoResponse> {
    Json(InfoResponse::new())
}

pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    match score(&state.model, &body) {
        Ok(response) => {
            info!("Sending response: {}", response);
            Ok(Json(response))
        }
        Err(e) => {
            warn!("Rejected prediction request: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            ))
        }
    }
}

/// Content-Type is not inspected; only the body has to be a JSON object.
fn score(model: &ModelService, body: &[u8]) -> Result<PredictResponse> {
    let object = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => object,
        _ => return Err(Error::InvalidRequest),
    };

    let record = FeatureRecord::try_from(&object)?;
    let prediction = model.predict(&record)?;

    Ok(PredictResponse::from(&prediction))
}
