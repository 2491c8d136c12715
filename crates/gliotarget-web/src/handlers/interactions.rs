//! Interaction section: full table plus a filter by candidate or target.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use gliotarget_common::ApiError;
use gliotarget_db::{
    Interaction, InteractionFilter, InteractionRepository, NoticeLevel, Predicate, Record, TableName,
};
use serde::{Deserialize, Serialize};

use crate::render::{self, TableView};
use crate::state::SharedState;

#[derive(Debug, Deserialize, Default)]
pub struct InteractionParams {
    /// all | candidate | target
    pub by: Option<String>,
    pub id: Option<i64>,
}

impl InteractionParams {
    fn filter(&self) -> gliotarget_db::Result<InteractionFilter> {
        InteractionFilter::from_parts(self.by.as_deref().unwrap_or("all"), self.id)
    }

    /// The filter kind when `by` names one but no id was picked yet.
    fn pending_kind(&self) -> Option<&'static str> {
        if self.id.is_some() {
            return None;
        }
        match self.by.as_deref().map(str::trim) {
            Some("candidate" | "aptamer") => Some("candidate"),
            Some("target" | "egfr") => Some("target"),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct InteractionsPage {
    table: TableView,
    by: &'static str,
    selected: Option<i64>,
    candidate_ids: Vec<i64>,
    target_ids: Vec<i64>,
    filtered: Option<TableView>,
}

pub async fn interactions_page(
    State(state): State<SharedState>,
    Query(params): Query<InteractionParams>,
) -> Result<Html<String>, ApiError> {
    let (body, notices) = state
        .with_session(move |s| {
            let all = s.fetch(TableName::Interactions, &Predicate::All);
            let (by, filtered) = match params.pending_kind() {
                // Kind chosen, id not yet: show the picker only.
                Some(by) => (by, None),
                None => {
                    let filter = params.filter().unwrap_or_else(|e| {
                        s.notify(NoticeLevel::Warning, e.to_string());
                        InteractionFilter::All
                    });
                    match filter {
                        InteractionFilter::All => ("all", None),
                        InteractionFilter::Candidate(_) => ("candidate", Some(filter)),
                        InteractionFilter::Target(_) => ("target", Some(filter)),
                    }
                }
            };
            let filtered = filtered.map(|f| {
                let fetched = s.fetch(TableName::Interactions, &f.predicate());
                TableView::from_records(&fetched.rows)
            });
            let body = InteractionsPage {
                table: TableView::from_records(&all.rows),
                by,
                selected: params.id,
                candidate_ids: s.ids(TableName::Candidates),
                target_ids: s.ids(TableName::Targets),
                filtered,
            };
            (body, s.take_notices())
        })
        .await?;

    render::page(&state.templates, "interactions.html", "/interactions", notices, body)
}

/// GET /api/interactions?by=&id=
pub async fn api_interactions(
    State(state): State<SharedState>,
    Query(params): Query<InteractionParams>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let filter = params.filter()?;
    state
        .with_db(move |db| InteractionRepository::new(db).filter(filter))
        .await
        .map(Json)
}

/// GET /api/interactions/{id}
pub async fn api_interaction_detail(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Json<Interaction>, ApiError> {
    state
        .with_db(move |db| InteractionRepository::new(db).get(id))
        .await
        .map(Json)
}

/// GET /api/interactions/orphans
pub async fn api_interaction_orphans(
    State(state): State<SharedState>,
) -> Result<Json<Vec<Record>>, ApiError> {
    state
        .with_db(|db| InteractionRepository::new(db).orphans())
        .await
        .map(Json)
}
