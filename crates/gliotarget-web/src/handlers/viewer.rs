//! Structure viewer. Files are passed through untouched; rendering is a
//! placeholder.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use gliotarget_common::ApiError;
use gliotarget_db::StructureUpload;
use serde::{Deserialize, Serialize};

use crate::render;
use crate::state::SharedState;

/// Lines of an uploaded file shown under the placeholder.
const PREVIEW_LINES: usize = 12;

#[derive(Debug, Deserialize, Default)]
pub struct ViewerParams {
    pub structure: Option<String>,
}

#[derive(Serialize)]
struct CatalogView {
    name: String,
    path: String,
    available: bool,
    bytes: Option<u64>,
}

#[derive(Serialize)]
struct UploadView {
    name: String,
    bytes: usize,
    preview: String,
}

#[derive(Serialize)]
struct ViewerPage {
    structures: Vec<String>,
    selected: Option<CatalogView>,
    upload: Option<UploadView>,
}

pub async fn viewer_page(
    State(state): State<SharedState>,
    Query(params): Query<ViewerParams>,
) -> Result<Html<String>, ApiError> {
    let catalog = &state.config.viewer;
    let entry = match params.structure.as_deref() {
        Some(name) => catalog.find(name),
        None => catalog.structures.first(),
    };

    let selected = match entry {
        Some(entry) => {
            let meta = tokio::fs::metadata(&entry.path).await.ok();
            if meta.is_none() {
                tracing::debug!("Structure file {} not present", entry.path.display());
            }
            Some(CatalogView {
                name: entry.name.clone(),
                path: entry.path.display().to_string(),
                available: meta.is_some(),
                bytes: meta.map(|m| m.len()),
            })
        }
        None => None,
    };

    let (upload, notices) = state
        .with_session(|s| {
            let upload = s.structure().map(|u| UploadView {
                name: u.name.clone(),
                bytes: u.len(),
                preview: u.as_text().lines().take(PREVIEW_LINES).collect::<Vec<_>>().join("\n"),
            });
            (upload, s.take_notices())
        })
        .await?;

    let body = ViewerPage {
        structures: catalog.structures.iter().map(|s| s.name.clone()).collect(),
        selected,
        upload,
    };
    render::page(&state.templates, "viewer.html", "/viewer", notices, body)
}

#[derive(Debug, Deserialize)]
pub struct StructureForm {
    pub name: String,
    pub data: String,
}

/// POST /viewer
pub async fn structure_submit(
    State(state): State<SharedState>,
    Form(form): Form<StructureForm>,
) -> Result<Redirect, ApiError> {
    state
        .with_session(move |s| s.store_structure(StructureUpload::new(form.name, form.data.into_bytes())))
        .await?;
    Ok(Redirect::to("/viewer"))
}

#[derive(Debug, Deserialize, Default)]
pub struct StructureParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StructureReceipt {
    pub name: String,
    pub bytes: usize,
}

/// POST /api/structure?name=
pub async fn api_structure_upload(
    State(state): State<SharedState>,
    Query(params): Query<StructureParams>,
    body: Bytes,
) -> Result<Json<StructureReceipt>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("structure file is empty".to_string()));
    }
    let upload = StructureUpload::new(params.name.unwrap_or_else(|| "upload.pdb".to_string()), body.to_vec());
    let receipt = StructureReceipt { name: upload.name.clone(), bytes: upload.len() };
    state.with_session(move |s| s.store_structure(upload)).await?;
    Ok(Json(receipt))
}

/// GET /api/structure
pub async fn api_structure(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let bytes = state
        .with_session(|s| s.structure().map(|u| u.bytes.clone()))
        .await?
        .ok_or_else(|| ApiError::NotFound("no structure uploaded".to_string()))?;
    Ok(([(header::CONTENT_TYPE, "chemical/x-pdb")], bytes))
}
