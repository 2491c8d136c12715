//! Bulk loads: the sidebar form and the raw-body API.

use axum::{
    extract::{Path, Query, State},
    response::Redirect,
    Form, Json,
};
use gliotarget_common::ApiError;
use gliotarget_db::{Delimiter, LoadReport, NoticeLevel, TableName};
use serde::Deserialize;

use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct UploadForm {
    pub table: TableName,
    /// `auto`, `comma` or `tab`.
    #[serde(default)]
    pub delimiter: Option<String>,
    pub data: String,
}

/// Parse a delimiter choice; `auto` or nothing means sniff the header.
fn delimiter_choice(raw: Option<&str>) -> gliotarget_db::Result<Option<Delimiter>> {
    match raw.map(str::trim) {
        None | Some("") | Some("auto") => Ok(None),
        Some(other) => other.parse().map(Some),
    }
}

/// POST /upload
///
/// Always redirects to the loaded section; the outcome travels as notices.
pub async fn upload_submit(
    State(state): State<SharedState>,
    Form(form): Form<UploadForm>,
) -> Result<Redirect, ApiError> {
    let table = form.table;
    state
        .with_session(move |s| match delimiter_choice(form.delimiter.as_deref()) {
            Ok(delimiter) => {
                s.load(table, &form.data, delimiter);
            }
            Err(e) => s.notify(NoticeLevel::Error, format!("Error loading data: {}", e)),
        })
        .await?;

    Ok(Redirect::to(&format!("/{}", table.slug())))
}

#[derive(Debug, Deserialize, Default)]
pub struct LoadParams {
    pub delimiter: Option<String>,
}

/// POST /api/load/{table}?delimiter=
pub async fn api_load(
    State(state): State<SharedState>,
    Path(table): Path<String>,
    Query(params): Query<LoadParams>,
    body: String,
) -> Result<Json<LoadReport>, ApiError> {
    let table: TableName = table.parse()?;
    let delimiter = delimiter_choice(params.delimiter.as_deref())?
        .unwrap_or_else(|| Delimiter::sniff(&body));
    state
        .with_db(move |db| db.bulk_load(table, &body, delimiter))
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_choice() {
        assert_eq!(delimiter_choice(None).unwrap(), None);
        assert_eq!(delimiter_choice(Some("auto")).unwrap(), None);
        assert_eq!(delimiter_choice(Some("tab")).unwrap(), Some(Delimiter::Tab));
        assert_eq!(delimiter_choice(Some("comma")).unwrap(), Some(Delimiter::Comma));
        assert!(delimiter_choice(Some("pipe")).is_err());
    }
}
