//! Row values and records returned by reads.
//!
//! Bulk loads may reshape a table, so reads return [`Record`]s: ordered
//! column/value pairs. The typed [`Target`], [`Candidate`] and
//! [`Interaction`] views are built from records on demand.

use crate::error::{DbError, Result};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Value
// =============================================================================

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(r) if r.fract() == 0.0 => Some(*r as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Text rendering of any non-null value.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

// =============================================================================
// Record
// =============================================================================

/// One row, with columns in table order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// The row identifier, when the table has one.
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(Value::as_i64)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn from_row(row: &rusqlite::Row<'_>, names: &[String]) -> rusqlite::Result<Self> {
        let mut record = Record::new();
        for (i, name) in names.iter().enumerate() {
            record.push(name.clone(), Value::from(row.get_ref(i)?));
        }
        Ok(record)
    }

    fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(Value::to_text)
    }

    fn integer(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(Value::as_i64)
    }

    fn real(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }

    fn required_id(&self) -> Result<i64> {
        self.id().ok_or_else(|| DbError::MissingColumn("id".to_string()))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Typed views
// =============================================================================

/// EGFR protein record (`egfr` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: i64,
    pub gene_name: Option<String>,
    pub uniprot_accession: Option<String>,
    pub sequence: Option<String>,
    pub domain_structure: Option<String>,
}

impl TryFrom<&Record> for Target {
    type Error = DbError;

    fn try_from(r: &Record) -> Result<Self> {
        Ok(Self {
            id: r.required_id()?,
            gene_name: r.text("gene_name"),
            uniprot_accession: r.text("uniprot_accession"),
            sequence: r.text("sequence"),
            domain_structure: r.text("domain_structure"),
        })
    }
}

/// Aptamer candidate record (`aptamers` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: i64,
    /// External candidate identifier; not unique.
    pub aptamer_id: Option<String>,
    pub sequence: Option<String>,
    pub modified_sequence: Option<String>,
    pub length: Option<i64>,
    pub target: Option<String>,
    pub binding_affinity: Option<f64>,
    pub modifications: Option<String>,
    pub stability_data: Option<String>,
    pub delivery_methods: Option<String>,
    pub toxicity_data: Option<String>,
    pub citations: Option<String>,
    pub notes: Option<String>,
}

impl TryFrom<&Record> for Candidate {
    type Error = DbError;

    fn try_from(r: &Record) -> Result<Self> {
        Ok(Self {
            id: r.required_id()?,
            aptamer_id: r.text("aptamer_id"),
            sequence: r.text("sequence"),
            modified_sequence: r.text("modified_sequence"),
            length: r.integer("length"),
            target: r.text("target"),
            binding_affinity: r.real("binding_affinity"),
            modifications: r.text("modifications"),
            stability_data: r.text("stability_data"),
            delivery_methods: r.text("delivery_methods"),
            toxicity_data: r.text("toxicity_data"),
            citations: r.text("citations"),
            notes: r.text("notes"),
        })
    }
}

/// Modeled binding between one candidate and one target (`interactions` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    /// References `aptamers.id`.
    pub aptamer_id: Option<i64>,
    /// References `egfr.id`.
    pub egfr_id: Option<i64>,
    pub interaction_type: String,
    pub distance: Option<f64>,
    pub angle: Option<f64>,
    pub interacting_atoms: Option<String>,
    pub interacting_residues: Option<String>,
}

impl TryFrom<&Record> for Interaction {
    type Error = DbError;

    fn try_from(r: &Record) -> Result<Self> {
        Ok(Self {
            id: r.required_id()?,
            aptamer_id: r.integer("aptamer_id"),
            egfr_id: r.integer("egfr_id"),
            interaction_type: r
                .text("interaction_type")
                .ok_or_else(|| DbError::MissingColumn("interaction_type".to_string()))?,
            distance: r.real("distance"),
            angle: r.real("angle"),
            interacting_atoms: r.text("interacting_atoms"),
            interacting_residues: r.text("interacting_residues"),
        })
    }
}
