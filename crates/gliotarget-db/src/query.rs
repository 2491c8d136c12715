//! Filtered reads.
//!
//! Callers never hand the gateway a column name. Each [`Predicate`] and
//! [`SearchField`] maps to a fixed query template; only values are bound.

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::record::Record;
use crate::schema::{quote_ident, TableName};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candidate fields open to substring search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    #[serde(alias = "candidate_id")]
    AptamerId,
    Sequence,
    Target,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::AptamerId, SearchField::Sequence, SearchField::Target];

    pub fn column(self) -> &'static str {
        match self {
            SearchField::AptamerId => "aptamer_id",
            SearchField::Sequence => "sequence",
            SearchField::Target => "target",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SearchField {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "aptamer_id" | "candidate_id" => Ok(SearchField::AptamerId),
            "sequence" => Ok(SearchField::Sequence),
            "target" => Ok(SearchField::Target),
            other => Err(DbError::InvalidQuery(format!("field {:?} is not searchable", other))),
        }
    }
}

/// Row filter for [`Database::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    /// Exact match on the row identifier.
    Id(i64),
    /// Interactions whose `aptamer_id` equals the candidate identifier.
    CandidateRef(i64),
    /// Interactions whose `egfr_id` equals the target identifier.
    TargetRef(i64),
    /// Case-sensitive substring match on a candidate field. An empty term
    /// matches every row.
    Contains(SearchField, String),
}

impl Predicate {
    /// Fixed template and bound values for this predicate on `table`.
    fn template(&self, table: TableName) -> Result<(String, Vec<crate::record::Value>)> {
        let from = quote_ident(table.sql_name());
        let (clause, values) = match (self, table) {
            (Predicate::All, _) => (None, vec![]),
            (Predicate::Contains(_, term), TableName::Candidates) if term.is_empty() => (None, vec![]),
            (Predicate::Id(id), _) => (Some("id = ?1".to_string()), vec![(*id).into()]),
            (Predicate::CandidateRef(id), TableName::Interactions) => {
                (Some("aptamer_id = ?1".to_string()), vec![(*id).into()])
            }
            (Predicate::TargetRef(id), TableName::Interactions) => {
                (Some("egfr_id = ?1".to_string()), vec![(*id).into()])
            }
            (Predicate::Contains(field, term), TableName::Candidates) => (
                Some(format!("instr({}, ?1) > 0", quote_ident(field.column()))),
                vec![term.as_str().into()],
            ),
            (predicate, table) => {
                return Err(DbError::InvalidQuery(format!(
                    "{:?} does not apply to {}",
                    predicate, table
                )))
            }
        };

        let sql = match clause {
            Some(clause) => format!("SELECT * FROM {} WHERE {} ORDER BY id", from, clause),
            None => format!("SELECT * FROM {} ORDER BY id", from),
        };
        Ok((sql, values))
    }
}

impl Database {
    /// Read the rows of `table` matching `predicate`, ordered by identifier.
    pub fn read(&self, table: TableName, predicate: &Predicate) -> Result<Vec<Record>> {
        let (sql, values) = predicate.template(table)?;
        let params: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        self.select(&sql, &params)
    }

    /// Look up a single row by identifier.
    pub fn find_by_id(&self, table: TableName, id: i64) -> Result<Option<Record>> {
        Ok(self.read(table, &Predicate::Id(id))?.into_iter().next())
    }

    /// Like [`find_by_id`](Self::find_by_id), but a missing row is an error.
    pub fn get(&self, table: TableName, id: i64) -> Result<Record> {
        self.find_by_id(table, id)?
            .ok_or_else(|| DbError::NotFound(format!("{} {}", table.label(), id)))
    }

    /// Candidates whose `field` contains `term` (case-sensitive).
    pub fn search(&self, field: SearchField, term: &str) -> Result<Vec<Record>> {
        self.read(TableName::Candidates, &Predicate::Contains(field, term.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Delimiter;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.bulk_load(
            TableName::Candidates,
            "id,aptamer_id,sequence,target\n\
             1,AS-IV,GGAAACC,EGFR\n\
             2,AS-VI,aaagcu,egfr\n\
             3,AS-VII,CCAAAAU,EGFRvIII\n\
             4,TuTu22,,\n",
            Delimiter::Comma,
        )
        .unwrap();
        db
    }

    #[test]
    fn test_search_is_case_sensitive() {
        let db = seeded();
        let ids: Vec<i64> = db
            .search(SearchField::Sequence, "AAA")
            .unwrap()
            .iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        let ids: Vec<i64> = db
            .search(SearchField::Target, "EGFR")
            .unwrap()
            .iter()
            .filter_map(Record::id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_empty_term_returns_all_rows() {
        let db = seeded();
        assert_eq!(db.search(SearchField::AptamerId, "").unwrap().len(), 4);
    }

    #[test]
    fn test_search_term_is_bound_not_interpolated() {
        let db = seeded();
        let rows = db.search(SearchField::AptamerId, "' OR 1=1 --").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_predicate_table_mismatch() {
        let db = seeded();
        let err = db.read(TableName::Targets, &Predicate::CandidateRef(1)).unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(_)));
        let err = db
            .read(TableName::Interactions, &Predicate::Contains(SearchField::Sequence, "A".into()))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidQuery(_)));
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let db = seeded();
        assert!(db.find_by_id(TableName::Candidates, 99).unwrap().is_none());
        assert!(matches!(
            db.get(TableName::Candidates, 99),
            Err(DbError::NotFound(_))
        ));
        assert_eq!(db.get(TableName::Candidates, 2).unwrap().id(), Some(2));
    }

    #[test]
    fn test_search_field_parsing() {
        assert_eq!("candidate_id".parse::<SearchField>().unwrap(), SearchField::AptamerId);
        assert!("notes".parse::<SearchField>().is_err());
    }
}
