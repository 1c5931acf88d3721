use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/completions", get(list_completions).post(record_completion))
}

pub async fn record_completion(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RecordCompletionRequest>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::CREATED,
        services.store.record_completion(body.units_completed, body.bom_id),
    )
}

pub async fn list_completions(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.store.completions().map(dto::items))
}
