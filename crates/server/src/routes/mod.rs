pub mod api;
pub mod assessment;
pub mod intake;
pub mod ops;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Page routes that need a session but never call the model
pub fn intake_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(intake::show))
        .route("/start", post(intake::start))
        .route("/back", post(intake::back))
        .route("/doctors", post(assessment::doctors))
}
