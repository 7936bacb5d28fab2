pub mod admin;
pub mod cv;
pub mod health;
pub mod views;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_handler))
        // Visit tracking & analytics
        .route("/api/views/track", post(views::handle_track_view))
        .route("/api/views", get(views::handle_list_views))
        .route("/api/views/stats", get(views::handle_view_stats))
        .route("/api/views/export", get(views::handle_export_views))
        // CV document
        .route(
            "/api/cv",
            get(cv::handle_get_cv).put(cv::handle_update_cv),
        )
        // Admin sign-in
        .route("/api/admin/authenticate", post(admin::handle_authenticate))
        .with_state(state)
}
