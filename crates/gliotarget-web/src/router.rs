//! Axum router: maps all URL paths to handlers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;
use crate::state::{AppState, SharedState};
use crate::handlers::{
    dashboard::{dashboard, api_stats},
    targets::{targets_page, api_targets, api_target_detail},
    candidates::{candidates_page, api_candidates, api_candidate_detail, api_candidate_search},
    interactions::{interactions_page, api_interactions, api_interaction_detail, api_interaction_orphans},
    upload::{upload_submit, api_load},
    viewer::{viewer_page, structure_submit, api_structure, api_structure_upload},
};

/// Datasets and structure files arrive as request bodies.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",             get(dashboard))
        .route("/targets",      get(targets_page))
        .route("/candidates",   get(candidates_page))
        .route("/interactions", get(interactions_page))
        .route("/viewer",       get(viewer_page).post(structure_submit))
        .route("/upload",       post(upload_submit))

        // API endpoints
        .route("/api/stats",                 get(api_stats))
        .route("/api/targets",               get(api_targets))
        .route("/api/targets/{id}",          get(api_target_detail))
        .route("/api/candidates",            get(api_candidates))
        .route("/api/candidates/search",     get(api_candidate_search))
        .route("/api/candidates/{id}",       get(api_candidate_detail))
        .route("/api/interactions",          get(api_interactions))
        .route("/api/interactions/orphans",  get(api_interaction_orphans))
        .route("/api/interactions/{id}",     get(api_interaction_detail))
        .route("/api/load/{table}",          post(api_load))
        .route("/api/structure",             get(api_structure).post(api_structure_upload))

        // Middleware
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
