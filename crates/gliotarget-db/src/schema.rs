//! Schema definitions for the SQLite tables.
//!
//! The three tables are fixed; their column lists drive both the idempotent
//! `CREATE TABLE IF NOT EXISTS` at startup and the typing of bulk loads.

use crate::error::DbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const TABLE_TARGETS: &str = "egfr";
pub const TABLE_CANDIDATES: &str = "aptamers";
pub const TABLE_INTERACTIONS: &str = "interactions";

/// Name of the auto-assigned identifier column present in every table.
pub const ID_COLUMN: &str = "id";

// =============================================================================
// Column definitions
// =============================================================================

/// Storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// A declared column of one of the fixed tables.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    pub required: bool,
    /// Declared (but unenforced) reference as `(table, column)`.
    pub references: Option<(&'static str, &'static str)>,
}

const fn col(name: &'static str, ty: ColumnType) -> ColumnDef {
    ColumnDef { name, ty, required: false, references: None }
}

const TARGET_COLUMNS: &[ColumnDef] = &[
    col("id", ColumnType::Integer),
    col("gene_name", ColumnType::Text),
    col("uniprot_accession", ColumnType::Text),
    col("sequence", ColumnType::Text),
    col("domain_structure", ColumnType::Text),
];

const CANDIDATE_COLUMNS: &[ColumnDef] = &[
    col("id", ColumnType::Integer),
    col("aptamer_id", ColumnType::Text),
    col("sequence", ColumnType::Text),
    col("modified_sequence", ColumnType::Text),
    col("length", ColumnType::Integer),
    col("target", ColumnType::Text),
    col("binding_affinity", ColumnType::Real),
    col("modifications", ColumnType::Text),
    col("stability_data", ColumnType::Text),
    col("delivery_methods", ColumnType::Text),
    col("toxicity_data", ColumnType::Text),
    col("citations", ColumnType::Text),
    col("notes", ColumnType::Text),
];

const INTERACTION_COLUMNS: &[ColumnDef] = &[
    col("id", ColumnType::Integer),
    ColumnDef {
        name: "aptamer_id",
        ty: ColumnType::Integer,
        required: false,
        references: Some((TABLE_CANDIDATES, ID_COLUMN)),
    },
    ColumnDef {
        name: "egfr_id",
        ty: ColumnType::Integer,
        required: false,
        references: Some((TABLE_TARGETS, ID_COLUMN)),
    },
    ColumnDef {
        name: "interaction_type",
        ty: ColumnType::Text,
        required: true,
        references: None,
    },
    col("distance", ColumnType::Real),
    col("angle", ColumnType::Real),
    col("interacting_atoms", ColumnType::Text),
    col("interacting_residues", ColumnType::Text),
];

// =============================================================================
// Table allow-list
// =============================================================================

/// The fixed set of tables the gateway reads from and loads into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableName {
    #[serde(alias = "egfr")]
    Targets,
    #[serde(alias = "aptamers")]
    Candidates,
    Interactions,
}

impl TableName {
    pub const ALL: [TableName; 3] = [
        TableName::Targets,
        TableName::Candidates,
        TableName::Interactions,
    ];

    /// Name of the table in the SQLite store.
    pub fn sql_name(self) -> &'static str {
        match self {
            TableName::Targets => TABLE_TARGETS,
            TableName::Candidates => TABLE_CANDIDATES,
            TableName::Interactions => TABLE_INTERACTIONS,
        }
    }

    /// Name used in URLs and forms.
    pub fn slug(self) -> &'static str {
        match self {
            TableName::Targets => "targets",
            TableName::Candidates => "candidates",
            TableName::Interactions => "interactions",
        }
    }

    /// Singular display label.
    pub fn label(self) -> &'static str {
        match self {
            TableName::Targets => "EGFR",
            TableName::Candidates => "Aptamer",
            TableName::Interactions => "Interaction",
        }
    }

    pub fn columns(self) -> &'static [ColumnDef] {
        match self {
            TableName::Targets => TARGET_COLUMNS,
            TableName::Candidates => CANDIDATE_COLUMNS,
            TableName::Interactions => INTERACTION_COLUMNS,
        }
    }

    pub fn column(self, name: &str) -> Option<&'static ColumnDef> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Idempotent creation statement for the declared schema.
    pub fn create_if_missing_sql(self) -> String {
        let defs: Vec<String> = self
            .columns()
            .iter()
            .map(|c| column_sql(c.name, c.ty, Some(c)))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(self.sql_name()),
            defs.join(", ")
        )
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for TableName {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "targets" | "target" | "egfr" => Ok(TableName::Targets),
            "candidates" | "candidate" | "aptamers" | "aptamer" => Ok(TableName::Candidates),
            "interactions" | "interaction" => Ok(TableName::Interactions),
            _ => Err(DbError::UnknownTable(s.to_string())),
        }
    }
}

// =============================================================================
// SQL fragments
// =============================================================================

/// Column definition fragment. `declared` carries the fixed-schema constraints
/// when the column is one of the table's known columns.
pub(crate) fn column_sql(name: &str, ty: ColumnType, declared: Option<&ColumnDef>) -> String {
    let mut def = format!("{} {}", quote_ident(name), ty.sql());
    if name == ID_COLUMN {
        def.push_str(" PRIMARY KEY");
    }
    if let Some(declared) = declared {
        if declared.required {
            def.push_str(" NOT NULL");
        }
        if let Some((table, column)) = declared.references {
            def.push_str(&format!(" REFERENCES {}({})", quote_ident(table), quote_ident(column)));
        }
    }
    def
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column names accepted from loaded data: ASCII letters, digits and
/// underscores, not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_parsing_accepts_slugs_and_sql_names() {
        assert_eq!("targets".parse::<TableName>().unwrap(), TableName::Targets);
        assert_eq!("EGFR".parse::<TableName>().unwrap(), TableName::Targets);
        assert_eq!(" aptamers ".parse::<TableName>().unwrap(), TableName::Candidates);
        assert_eq!("interactions".parse::<TableName>().unwrap(), TableName::Interactions);
        assert!(matches!(
            "sqlite_master".parse::<TableName>(),
            Err(DbError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_interaction_schema_declares_references() {
        let sql = TableName::Interactions.create_if_missing_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"interactions\""));
        assert!(sql.contains("\"aptamer_id\" INTEGER REFERENCES \"aptamers\"(\"id\")"));
        assert!(sql.contains("\"egfr_id\" INTEGER REFERENCES \"egfr\"(\"id\")"));
        assert!(sql.contains("\"interaction_type\" TEXT NOT NULL"));
        assert!(sql.contains("\"id\" INTEGER PRIMARY KEY"));
    }

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("gene_name"));
        assert!(is_valid_identifier("_x1"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1col"));
        assert!(!is_valid_identifier("name; DROP TABLE egfr"));
        assert!(!is_valid_identifier("gene name"));
    }
}
