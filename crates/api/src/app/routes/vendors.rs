use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_vendors::{VendorId, VendorPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_vendors).post(register_vendor))
        .route("/:id", get(get_vendor).patch(update_vendor).delete(delete_vendor))
}

pub async fn list_vendors(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.store.list_vendors().map(dto::items))
}

pub async fn register_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterVendorRequest>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, services.store.register_vendor(body.name, body.contact))
}

pub async fn get_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id, "vendor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.vendor(id))
}

pub async fn update_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<VendorPatch>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id, "vendor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.update_vendor(id, patch))
}

pub async fn delete_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: VendorId = match errors::parse_id(&id, "vendor") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.delete_vendor(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
