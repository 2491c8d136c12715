//! Bulk loads from delimited text.
//!
//! A load parses the whole input first, then drops and recreates the
//! destination table in one transaction. The new table takes the shape of
//! the loaded header: known columns keep their declared type and
//! constraints, unknown columns get a type inferred from their values.

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::record::Value;
use crate::schema::{column_sql, is_valid_identifier, quote_ident, ColumnType, TableName, ID_COLUMN};
use chrono::{DateTime, Utc};
use rusqlite::params_from_iter;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{info, warn};

/// Field separator of the loaded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    pub fn byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }

    /// Pick the delimiter from the header line: tab if it contains one.
    pub fn sniff(text: &str) -> Self {
        let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        if header.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }
}

impl FromStr for Delimiter {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" | "csv" | "," => Ok(Delimiter::Comma),
            "tab" | "tsv" | "\\t" => Ok(Delimiter::Tab),
            other => Err(DbError::InvalidQuery(format!("unknown delimiter {:?}", other))),
        }
    }
}

/// Parsed, typed contents of a load.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub types: Vec<ColumnType>,
    pub rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Parse delimited text with a header row for `table`.
    ///
    /// Fails on a missing or invalid header, a row with the wrong number of
    /// fields, a value that does not fit a declared numeric column, or an
    /// empty value in a required column.
    pub fn parse(text: &str, delimiter: Delimiter, table: TableName) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let columns = parse_header(reader.headers().map_err(malformed)?)?;

        let mut raw: Vec<(u64, csv::StringRecord)> = Vec::new();
        for result in reader.records() {
            let record = result.map_err(malformed)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            raw.push((line, record));
        }

        let types: Vec<ColumnType> = columns
            .iter()
            .enumerate()
            .map(|(i, name)| match table.column(name) {
                Some(def) => def.ty,
                None => infer_type(raw.iter().map(|(_, r)| r.get(i).unwrap_or(""))),
            })
            .collect();

        let mut rows = Vec::with_capacity(raw.len());
        for (line, record) in &raw {
            let mut row = Vec::with_capacity(columns.len());
            for (i, cell) in record.iter().enumerate() {
                let column = &columns[i];
                let value = convert(cell, types[i]).ok_or_else(|| DbError::MalformedInput {
                    line: *line,
                    message: format!(
                        "column {}: cannot parse {:?} as {}",
                        column,
                        cell,
                        types[i].sql().to_lowercase()
                    ),
                })?;
                let required = table.column(column).map(|d| d.required).unwrap_or(false);
                if required && value.is_null() {
                    return Err(DbError::MalformedInput {
                        line: *line,
                        message: format!("column {} is required", column),
                    });
                }
                row.push(value);
            }
            rows.push(row);
        }

        Ok(Self { columns, types, rows })
    }

    fn has_id(&self) -> bool {
        self.columns.iter().any(|c| c == ID_COLUMN)
    }

    /// Creation statement for a table shaped like this dataset.
    pub(crate) fn create_sql(&self, table: TableName) -> String {
        let mut defs = Vec::with_capacity(self.columns.len() + 1);
        if !self.has_id() {
            defs.push(column_sql(ID_COLUMN, ColumnType::Integer, None));
        }
        for (name, ty) in self.columns.iter().zip(&self.types) {
            defs.push(column_sql(name, *ty, table.column(name)));
        }
        format!("CREATE TABLE {} ({})", quote_ident(table.sql_name()), defs.join(", "))
    }

    pub(crate) fn insert_sql(&self, table: TableName) -> String {
        let names: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        let slots: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table.sql_name()),
            names.join(", "),
            slots.join(", ")
        )
    }
}

fn parse_header(header: &csv::StringRecord) -> Result<Vec<String>> {
    let columns: Vec<String> = header.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(DbError::MalformedInput {
            line: 1,
            message: "missing header row".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for column in &columns {
        if !is_valid_identifier(column) {
            return Err(DbError::InvalidColumn(column.clone()));
        }
        if !seen.insert(column.as_str()) {
            return Err(DbError::MalformedInput {
                line: 1,
                message: format!("duplicate column {}", column),
            });
        }
    }
    Ok(columns)
}

fn malformed(err: csv::Error) -> DbError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths { pos, expected_len, len } => DbError::MalformedInput {
            line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
            message: format!("expected {} fields, found {}", expected_len, len),
        },
        _ => DbError::Csv(err),
    }
}

fn infer_type<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> ColumnType {
    let present = cells.filter(|c| !c.is_empty());
    if present.clone().next().is_none() {
        ColumnType::Text
    } else if present.clone().all(|c| c.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present.clone().all(|c| parse_real(c).is_some()) {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

/// SQLite stores a bound NaN as NULL, so only finite reals load as numbers.
fn parse_real(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn convert(cell: &str, ty: ColumnType) -> Option<Value> {
    if cell.is_empty() {
        return Some(Value::Null);
    }
    match ty {
        ColumnType::Integer => cell.parse().ok().map(Value::Integer),
        ColumnType::Real => parse_real(cell).map(Value::Real),
        ColumnType::Text => Some(Value::Text(cell.to_string())),
    }
}

/// Summary of a completed bulk load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: TableName,
    pub columns: Vec<String>,
    pub rows: usize,
    /// Interaction rows whose references do not resolve; only computed for
    /// interaction loads.
    pub dangling_references: Option<u64>,
    pub loaded_at: DateTime<Utc>,
}

impl Database {
    /// Replace the entire contents of `table` with the parsed `text`.
    pub fn bulk_load(&self, table: TableName, text: &str, delimiter: Delimiter) -> Result<LoadReport> {
        let dataset = Dataset::parse(text, delimiter, table)?;
        self.replace_table(table, &dataset)
    }

    /// Drop `table` and recreate it holding exactly `dataset`.
    pub fn replace_table(&self, table: TableName, dataset: &Dataset) -> Result<LoadReport> {
        let create = dataset.create_sql(table);
        let insert = dataset.insert_sql(table);

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(table.sql_name())), [])?;
            tx.execute(&create, [])?;
            {
                let mut stmt = tx.prepare(&insert)?;
                for row in &dataset.rows {
                    stmt.execute(params_from_iter(row.iter()))?;
                }
            }
            tx.commit()?;
            Ok(())
        })?;

        info!(
            table = table.sql_name(),
            rows = dataset.rows.len(),
            columns = dataset.columns.len(),
            "Bulk load replaced table"
        );

        let dangling_references = if table == TableName::Interactions {
            match self.count_dangling_references() {
                Ok(0) => Some(0),
                Ok(n) => {
                    warn!("{} interaction rows reference missing aptamers or EGFR records", n);
                    Some(n)
                }
                Err(e) => {
                    warn!("Could not check interaction references: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(LoadReport {
            table,
            columns: dataset.columns.clone(),
            rows: dataset.rows.len(),
            dangling_references,
            loaded_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(Delimiter::sniff("id\tgene_name\n1\tEGFR"), Delimiter::Tab);
        assert_eq!(Delimiter::sniff("id,gene_name\n1,EGFR"), Delimiter::Comma);
        assert_eq!(Delimiter::sniff("\n\nid\tx"), Delimiter::Tab);
        assert_eq!("tsv".parse::<Delimiter>().unwrap(), Delimiter::Tab);
        assert!("pipe".parse::<Delimiter>().is_err());
    }

    #[test]
    fn test_parse_types_known_and_inferred_columns() {
        let text = "id,aptamer_id,binding_affinity,score,label\n\
                    1,AS-IV,12.5,3,x\n\
                    2,AS-VI,,4.5,\n";
        let ds = Dataset::parse(text, Delimiter::Comma, TableName::Candidates).unwrap();
        assert_eq!(ds.columns, vec!["id", "aptamer_id", "binding_affinity", "score", "label"]);
        assert_eq!(
            ds.types,
            vec![
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::Real,
                ColumnType::Real,
                ColumnType::Text,
            ]
        );
        assert_eq!(ds.rows[1][2], Value::Null);
        assert_eq!(ds.rows[1][3], Value::Real(4.5));
        assert_eq!(ds.rows[0][1], Value::from("AS-IV"));
    }

    #[test]
    fn test_non_finite_reals() {
        // Unknown column: stays text so nothing is silently nulled.
        let text = "id,aptamer_id,score\n1,AS-IV,NaN\n2,AS-VI,inf\n";
        let ds = Dataset::parse(text, Delimiter::Comma, TableName::Candidates).unwrap();
        assert_eq!(ds.types[2], ColumnType::Text);
        assert_eq!(ds.rows[0][2], Value::from("NaN"));

        // Declared real column: rejected.
        let text = "id,binding_affinity\n1,NaN\n";
        let err = Dataset::parse(text, Delimiter::Comma, TableName::Candidates).unwrap_err();
        assert!(matches!(err, DbError::MalformedInput { line: 2, .. }), "{err}");
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        let text = "id,gene_name\n1,EGFR\n2,EGFR,extra\n";
        let err = Dataset::parse(text, Delimiter::Comma, TableName::Targets).unwrap_err();
        assert!(matches!(err, DbError::MalformedInput { .. }), "{err}");
    }

    #[test]
    fn test_parse_rejects_unparseable_declared_number() {
        let text = "id\taptamer_id\tegfr_id\tinteraction_type\n1\tabc\t1\thydrogen bond\n";
        let err = Dataset::parse(text, Delimiter::Tab, TableName::Interactions).unwrap_err();
        match err {
            DbError::MalformedInput { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("aptamer_id"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_missing_required_value() {
        let text = "id,interaction_type\n1,\n";
        let err = Dataset::parse(text, Delimiter::Comma, TableName::Interactions).unwrap_err();
        assert!(matches!(err, DbError::MalformedInput { .. }));
    }

    #[test]
    fn test_parse_rejects_bad_header() {
        let err = Dataset::parse("id,\"x; DROP\"\n1,2\n", Delimiter::Comma, TableName::Targets)
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidColumn(_)));

        let err = Dataset::parse("id,ID\n1,2\n", Delimiter::Comma, TableName::Targets).unwrap_err();
        assert!(matches!(err, DbError::MalformedInput { line: 1, .. }));
    }

    #[test]
    fn test_create_sql_adds_id_when_absent() {
        let ds = Dataset::parse("gene_name\nEGFR\n", Delimiter::Comma, TableName::Targets).unwrap();
        assert_eq!(
            ds.create_sql(TableName::Targets),
            "CREATE TABLE \"egfr\" (\"id\" INTEGER PRIMARY KEY, \"gene_name\" TEXT)"
        );
        assert_eq!(
            ds.insert_sql(TableName::Targets),
            "INSERT INTO \"egfr\" (\"gene_name\") VALUES (?1)"
        );
    }

    #[test]
    fn test_failed_insert_leaves_previous_contents() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.bulk_load(TableName::Targets, "id,gene_name\n1,EGFR\n", Delimiter::Comma)
            .unwrap();

        // Duplicate primary key aborts the transaction.
        let err = db
            .bulk_load(TableName::Targets, "id,gene_name\n5,A\n5,B\n", Delimiter::Comma)
            .unwrap_err();
        assert!(matches!(err, DbError::Sqlite(_)));
        assert_eq!(db.ids(TableName::Targets).unwrap(), vec![1]);
    }
}
