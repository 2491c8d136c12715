//! Template environment and view models shared by the page handlers.

use axum::response::Html;
use gliotarget_common::ApiError;
use gliotarget_db::{Notice, Record, TableName};
use minijinja::Environment;
use serde::Serialize;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("table.html", include_str!("../templates/table.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("targets.html", include_str!("../templates/targets.html")),
    ("candidates.html", include_str!("../templates/candidates.html")),
    ("interactions.html", include_str!("../templates/interactions.html")),
    ("viewer.html", include_str!("../templates/viewer.html")),
];

/// Build the template environment. `.html` templates are autoescaped.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        env.add_template(name, source)?;
    }
    Ok(env)
}

/// Render `name` with the layout context plus the handler's `body` fields.
pub fn page<T: Serialize>(
    env: &Environment<'_>,
    name: &str,
    active: &'static str,
    notices: Vec<Notice>,
    body: T,
) -> Result<Html<String>, ApiError> {
    let template = env
        .get_template(name)
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let ctx = PageContext {
        base: Base { nav: NAV, active, notices, load_targets: load_targets() },
        body,
    };
    template
        .render(&ctx)
        .map(Html)
        .map_err(|e| ApiError::Internal(format!("rendering {}: {}", name, e)))
}

#[derive(Serialize)]
struct PageContext<T> {
    #[serde(flatten)]
    base: Base,
    #[serde(flatten)]
    body: T,
}

/// Values every page gets from the layout.
#[derive(Serialize)]
struct Base {
    nav: &'static [NavEntry],
    active: &'static str,
    notices: Vec<Notice>,
    load_targets: Vec<(&'static str, &'static str)>,
}

/// Rows flattened to display strings.
#[derive(Debug, Default, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_records(records: &[Record]) -> Self {
        let columns = records
            .first()
            .map(|r| r.columns().map(String::from).collect())
            .unwrap_or_default();
        let rows = records
            .iter()
            .map(|r| r.values().map(|v| v.to_string()).collect())
            .collect();
        Self { columns, rows }
    }
}

/// One record as `(column, value)` pairs.
pub fn detail_view(record: &Record) -> Vec<(String, String)> {
    record.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Sidebar entries and the upload form's table choices.
#[derive(Debug, Serialize)]
pub struct NavEntry {
    pub href: &'static str,
    pub title: &'static str,
}

pub const NAV: &[NavEntry] = &[
    NavEntry { href: "/targets", title: "EGFR Data" },
    NavEntry { href: "/candidates", title: "Aptamer Data" },
    NavEntry { href: "/interactions", title: "Interaction Data" },
    NavEntry { href: "/viewer", title: "3D Viewer" },
];

pub fn load_targets() -> Vec<(&'static str, &'static str)> {
    TableName::ALL.iter().map(|t| (t.slug(), t.sql_name())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gliotarget_db::Value;

    #[test]
    fn test_environment_compiles_all_templates() {
        let env = environment().unwrap();
        for (name, _) in TEMPLATES {
            assert!(env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_table_view_renders_nulls_empty() {
        let mut r = Record::new();
        r.push("id", Value::Integer(1));
        r.push("notes", Value::Null);
        let view = TableView::from_records(&[r]);
        assert_eq!(view.columns, vec!["id", "notes"]);
        assert_eq!(view.rows, vec![vec!["1".to_string(), String::new()]]);
    }

    #[test]
    fn test_page_escapes_record_values() {
        let env = environment().unwrap();
        let mut r = Record::new();
        r.push("id", Value::Integer(1));
        r.push("gene_name", Value::from("<script>alert(1)</script>"));
        let body = serde_json::json!({
            "table": TableView::from_records(&[r]),
            "ids": [1],
            "selected": null,
            "detail": null,
        });
        let html = page(&env, "targets.html", "/targets", vec![], body).unwrap().0;
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
    }
}
