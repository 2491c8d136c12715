//! EGFR target section: full table plus a single-record detail view.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use gliotarget_common::ApiError;
use gliotarget_db::{Predicate, Record, TableName, Target, TargetRepository};
use serde::{Deserialize, Serialize};

use crate::render::{self, TableView};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct TargetParams {
    pub id: Option<i64>,
}

#[derive(Serialize)]
struct TargetsPage {
    table: TableView,
    ids: Vec<i64>,
    selected: Option<i64>,
    detail: Option<Vec<(String, String)>>,
}

pub async fn targets_page(
    State(state): State<SharedState>,
    Query(params): Query<TargetParams>,
) -> Result<Html<String>, ApiError> {
    let (body, notices) = state
        .with_session(move |s| {
            let all = s.fetch(TableName::Targets, &Predicate::All);
            let detail = params
                .id
                .and_then(|id| s.lookup(TableName::Targets, id).rows.first().map(render::detail_view));
            let body = TargetsPage {
                ids: all.ids(),
                table: TableView::from_records(&all.rows),
                selected: params.id,
                detail,
            };
            (body, s.take_notices())
        })
        .await?;

    render::page(&state.templates, "targets.html", "/targets", notices, body)
}

/// GET /api/targets?id=
pub async fn api_targets(
    State(state): State<SharedState>,
    Query(params): Query<TargetParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let predicate = params.id.map(Predicate::Id).unwrap_or(Predicate::All);
    state
        .with_db(move |db| db.read(TableName::Targets, &predicate))
        .await
        .map(Json)
}

/// GET /api/targets/{id}
pub async fn api_target_detail(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Target>, ApiError> {
    state
        .with_db(move |db| TargetRepository::new(db).get(id))
        .await
        .map(Json)
}
