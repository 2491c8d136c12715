//! Aptamer candidate section: table, detail view and substring search.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use gliotarget_common::ApiError;
use gliotarget_db::{Candidate, CandidateRepository, Predicate, Record, SearchField, TableName};
use serde::{Deserialize, Serialize};

use crate::render::{self, TableView};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct CandidateParams {
    pub id: Option<i64>,
    pub field: Option<SearchField>,
    /// Present (even empty) when the search form was submitted.
    pub q: Option<String>,
}

#[derive(Serialize)]
struct CandidatesPage {
    table: TableView,
    ids: Vec<i64>,
    selected: Option<i64>,
    detail: Option<Vec<(String, String)>>,
    fields: Vec<&'static str>,
    field: &'static str,
    q: Option<String>,
    results: Option<TableView>,
}

pub async fn candidates_page(
    State(state): State<SharedState>,
    Query(params): Query<CandidateParams>,
) -> Result<Html<String>, ApiError> {
    let field = params.field.unwrap_or(SearchField::AptamerId);
    let (body, notices) = state
        .with_session(move |s| {
            let all = s.fetch(TableName::Candidates, &Predicate::All);
            let detail = params
                .id
                .and_then(|id| s.lookup(TableName::Candidates, id).rows.first().map(render::detail_view));
            let results = params
                .q
                .as_deref()
                .map(|term| TableView::from_records(&s.search(field, term).rows));
            let body = CandidatesPage {
                ids: all.ids(),
                table: TableView::from_records(&all.rows),
                selected: params.id,
                detail,
                fields: SearchField::ALL.iter().map(|f| f.column()).collect(),
                field: field.column(),
                q: params.q,
                results,
            };
            (body, s.take_notices())
        })
        .await?;

    render::page(&state.templates, "candidates.html", "/candidates", notices, body)
}

/// GET /api/candidates?id=
pub async fn api_candidates(
    State(state): State<SharedState>,
    Query(params): Query<CandidateParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let predicate = params.id.map(Predicate::Id).unwrap_or(Predicate::All);
    state
        .with_db(move |db| db.read(TableName::Candidates, &predicate))
        .await
        .map(Json)
}

/// GET /api/candidates/{id}
pub async fn api_candidate_detail(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Candidate>, ApiError> {
    state
        .with_db(move |db| CandidateRepository::new(db).get(id))
        .await
        .map(Json)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub field: SearchField,
    #[serde(default)]
    pub q: String,
}

/// GET /api/candidates/search?field=&q=
pub async fn api_candidate_search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    state
        .with_db(move |db| CandidateRepository::new(db).search(params.field, &params.q))
        .await
        .map(Json)
}
