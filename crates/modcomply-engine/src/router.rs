//! Axum router wiring.

use axum::{routing::get, Router};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .route("/v1/modules", get(api::list_modules))
        .route("/v1/modules/:module/allowed/:identity", get(api::is_user_allowed))
        .route("/v1/modules/:module/events", get(api::module_events))
        .route("/v1/check", get(api::check_transfer))
        .with_state(state)
}
