use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn get_dashboard(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    errors::respond(StatusCode::OK, services.store.dashboard())
}
