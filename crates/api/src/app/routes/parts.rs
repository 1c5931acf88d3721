use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockroom_infra::StoreResult;
use stockroom_inventory::{Part, PartId, PartPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_parts).post(create_part))
        .route("/:id", get(get_part).patch(update_part).delete(delete_part))
        .route("/:id/adjust", post(adjust_stock))
}

fn part_response(status: StatusCode, result: StoreResult<Part>) -> axum::response::Response {
    errors::respond(status, result.map(|p| dto::part_to_json(&p)))
}

pub async fn list_parts(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let result = services
        .store
        .list_parts()
        .map(|parts| dto::items(parts.iter().map(dto::part_to_json).collect::<Vec<_>>()));
    errors::respond(StatusCode::OK, result)
}

pub async fn create_part(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreatePartRequest>,
) -> axum::response::Response {
    part_response(
        StatusCode::CREATED,
        services.store.create_part(body.details, body.current_stock),
    )
}

pub async fn get_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id, "part") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    part_response(StatusCode::OK, services.store.part(id))
}

pub async fn update_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<PartPatch>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id, "part") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    part_response(StatusCode::OK, services.store.update_part(id, patch))
}

pub async fn delete_part(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id, "part") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.delete_part(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn adjust_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::AdjustStockRequest>,
) -> axum::response::Response {
    let id: PartId = match errors::parse_id(&id, "part") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    part_response(StatusCode::OK, services.store.adjust_stock(id, body.delta, body.note))
}
