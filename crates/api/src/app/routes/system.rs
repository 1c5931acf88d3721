use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};

use crate::app::dto::{self, DEFAULT_JOURNAL_LIMIT};
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /events?after=N&limit=M
///
/// Committed journal entries after sequence `after`, oldest first.
pub async fn journal(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::JournalQuery>,
) -> axum::response::Response {
    let limit = query.limit.unwrap_or(DEFAULT_JOURNAL_LIMIT);
    match services.store.journal(query.after, limit) {
        Ok(entries) => {
            let next = entries.last().map(|e| e.sequence_number()).unwrap_or(query.after);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "items": entries,
                    "next_after": next,
                })),
            )
                .into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
