use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockroom_inventory::BomId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_boms).post(create_bom))
        .route("/:id", get(get_bom).put(update_bom).delete(delete_bom))
        .route("/:id/buildable", get(buildable_units))
        .route("/:id/lines", get(dispatch_lines))
}

fn bom_id(raw: &str) -> Result<BomId, axum::response::Response> {
    errors::parse_id(raw, "BOM")
}

pub async fn list_boms(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.store.list_boms().map(dto::items))
}

pub async fn create_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateBomRequest>,
) -> axum::response::Response {
    errors::respond(
        StatusCode::CREATED,
        services.store.create_bom(body.name, body.category, body.lines),
    )
}

pub async fn get_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match bom_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.bom(id))
}

pub async fn update_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateBomRequest>,
) -> axum::response::Response {
    let id = match bom_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.update_bom(id, body.name, body.lines))
}

pub async fn delete_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match bom_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.delete_bom(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn buildable_units(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match bom_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = services.store.buildable_units(id).map(|units| {
        serde_json::json!({
            "bom_id": id,
            "buildable_units": units,
        })
    });
    errors::respond(StatusCode::OK, result)
}

/// GET /boms/:id/lines?units=N
///
/// Dispatch lines for N finished units, ready to post to `/dispatches`.
pub async fn dispatch_lines(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::UnitsQuery>,
) -> axum::response::Response {
    let id = match bom_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.store.lines_from_bom(id, query.units).map(dto::items),
    )
}
