use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Query},
    http::StatusCode,
    routing::get,
};

use stockroom_infra::reports::DateRange;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/outbound", get(outbound_report))
        .route("/inbound", get(inbound_report))
}

/// GET /reports/outbound, defaulting to the last seven days.
pub async fn outbound_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    match query.resolve(DateRange::last_week) {
        Ok(range) => errors::respond(StatusCode::OK, services.store.outbound_report(range)),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// GET /reports/inbound, defaulting to the current month.
pub async fn inbound_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ReportQuery>,
) -> axum::response::Response {
    match query.resolve(DateRange::month_to_date) {
        Ok(range) => errors::respond(StatusCode::OK, services.store.inbound_report(range)),
        Err(e) => errors::domain_error_to_response(e),
    }
}
