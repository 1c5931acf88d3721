use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_dispatch::{DispatchId, HeaderPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_dispatches).post(record_dispatch))
        .route("/:id", get(get_dispatch).patch(update_dispatch).delete(delete_dispatch))
}

pub async fn list_dispatches(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.store.list_dispatches().map(dto::items))
}

/// POST /dispatches
///
/// Takes every line out of stock; 422 if any part would go negative.
pub async fn record_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RecordDispatchRequest>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::CREATED,
        services.store.record_dispatch(body.header, body.lines),
    )
}

pub async fn get_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DispatchId = match errors::parse_id(&id, "dispatch") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.dispatch(id))
}

pub async fn update_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<HeaderPatch>,
) -> axum::response::Response {
    let id: DispatchId = match errors::parse_id(&id, "dispatch") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.update_dispatch(id, patch))
}

pub async fn delete_dispatch(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: DispatchId = match errors::parse_id(&id, "dispatch") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.delete_dispatch(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
