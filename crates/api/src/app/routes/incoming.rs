//! Incoming articles and their verification workflow.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockroom_infra::Verification;
use stockroom_receiving::{ArticleId, ArticlePatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_articles).post(register_article))
        .route("/:id", get(get_article).patch(update_article).delete(delete_article))
        .route("/:id/count", post(record_count))
        .route("/:id/qc", post(complete_qc))
        .route("/:id/verify", post(verify_article))
        .route("/:id/approve", post(approve_article))
}

fn article_id(raw: &str) -> Result<ArticleId, axum::response::Response> {
    errors::parse_id(raw, "article")
}

pub async fn list_articles(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.store.list_articles().map(dto::items))
}

pub async fn register_article(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterArticleRequest>,
) -> axum::response::Response {
    errors::respond(StatusCode::CREATED, services.store.register_article(body.into()))
}

pub async fn get_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.article(id))
}

pub async fn update_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<ArticlePatch>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.update_article(id, patch))
}

pub async fn delete_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.store.delete_article(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn record_count(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::RecordCountRequest>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.store.record_count(id, body.final_accepted_quantity),
    )
}

pub async fn complete_qc(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::CompleteQcRequest>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(
        StatusCode::OK,
        services.store.complete_qc(id, body.remarks, body.checklist_url),
    )
}

/// POST /incoming/:id/verify
///
/// The combined verification form: `counted` and `qc_complete` checkboxes
/// with the fields each one unlocks.
pub async fn verify_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(form): Json<Verification>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    errors::respond(StatusCode::OK, services.store.verify_article(id, form))
}

/// POST /incoming/:id/approve
///
/// Responds with the approved article and, when stock moved, the updated part.
pub async fn approve_article(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match article_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let result = services.store.approve_article(id).map(|outcome| {
        serde_json::json!({
            "article": outcome.article,
            "part": outcome.part.as_ref().map(dto::part_to_json),
        })
    });
    errors::respond(StatusCode::OK, result)
}
