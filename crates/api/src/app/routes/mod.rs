use axum::{Router, routing::get};

pub mod boms;
pub mod dashboard;
pub mod dispatches;
pub mod event_stream;
pub mod incoming;
pub mod parts;
pub mod production;
pub mod reports;
pub mod system;
pub mod vendors;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/events", get(system::journal))
        .route("/stream", get(event_stream::stream_events))
        .route("/dashboard", get(dashboard::get_dashboard))
        .nest("/vendors", vendors::router())
        .nest("/parts", parts::router())
        .nest("/incoming", incoming::router())
        .nest("/dispatches", dispatches::router())
        .nest("/boms", boms::router())
        .nest("/production", production::router())
        .nest("/reports", reports::router())
}
