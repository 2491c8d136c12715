//! Landing page and store statistics.

use axum::{extract::State, response::Html, Json};
use gliotarget_common::ApiError;
use gliotarget_db::{DatabaseStats, NoticeLevel};
use serde::Serialize;

use crate::render;
use crate::state::SharedState;

#[derive(Serialize)]
struct DashboardPage {
    stats: Option<DatabaseStats>,
    store: String,
}

pub async fn dashboard(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let (stats, notices) = state
        .with_session(|s| {
            let stats = match s.db().stats() {
                Ok(stats) => Some(stats),
                Err(e) => {
                    tracing::error!("Error reading store statistics: {}", e);
                    s.notify(NoticeLevel::Error, format!("Error fetching data: {}", e));
                    None
                }
            };
            (stats, s.take_notices())
        })
        .await?;

    let store = state
        .db
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "in-memory".to_string());

    render::page(&state.templates, "dashboard.html", "/", notices, DashboardPage { stats, store })
}

/// GET /api/stats
pub async fn api_stats(State(state): State<SharedState>) -> Result<Json<DatabaseStats>, ApiError> {
    state.with_db(|db| db.stats()).await.map(Json)
}
