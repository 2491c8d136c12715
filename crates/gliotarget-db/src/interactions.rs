//! Interaction repository.
//!
//! Interactions reference candidates and targets by identifier. The
//! references are declared in the schema but not enforced, so rows may
//! point at records that do not exist; [`InteractionRepository::orphans`]
//! lists them.

use crate::database::Database;
use crate::error::{DbError, Result};
use crate::query::Predicate;
use crate::record::{Interaction, Record};
use crate::schema::TableName;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DANGLING_WHERE: &str = "\
    (i.aptamer_id IS NOT NULL AND NOT EXISTS (SELECT 1 FROM aptamers a WHERE a.id = i.aptamer_id)) \
    OR (i.egfr_id IS NOT NULL AND NOT EXISTS (SELECT 1 FROM egfr e WHERE e.id = i.egfr_id))";

/// How the interaction section narrows its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "id", rename_all = "snake_case")]
pub enum InteractionFilter {
    All,
    Candidate(i64),
    Target(i64),
}

impl InteractionFilter {
    pub fn predicate(self) -> Predicate {
        match self {
            InteractionFilter::All => Predicate::All,
            InteractionFilter::Candidate(id) => Predicate::CandidateRef(id),
            InteractionFilter::Target(id) => Predicate::TargetRef(id),
        }
    }

    /// Build a filter from its form fields (`by` = all | candidate | target).
    pub fn from_parts(by: &str, id: Option<i64>) -> Result<Self> {
        match (by.trim(), id) {
            ("" | "all", _) => Ok(InteractionFilter::All),
            ("candidate" | "aptamer", Some(id)) => Ok(InteractionFilter::Candidate(id)),
            ("target" | "egfr", Some(id)) => Ok(InteractionFilter::Target(id)),
            ("candidate" | "aptamer" | "target" | "egfr", None) => {
                Err(DbError::InvalidQuery(format!("filter by {} needs an id", by)))
            }
            (other, _) => Err(DbError::InvalidQuery(format!("unknown interaction filter {:?}", other))),
        }
    }
}

/// Repository for interaction operations.
#[derive(Clone)]
pub struct InteractionRepository {
    db: Arc<Database>,
}

impl InteractionRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<Record>> {
        self.filter(InteractionFilter::All)
    }

    pub fn filter(&self, filter: InteractionFilter) -> Result<Vec<Record>> {
        self.db.read(TableName::Interactions, &filter.predicate())
    }

    pub fn by_candidate(&self, candidate_id: i64) -> Result<Vec<Record>> {
        self.filter(InteractionFilter::Candidate(candidate_id))
    }

    pub fn by_target(&self, target_id: i64) -> Result<Vec<Record>> {
        self.filter(InteractionFilter::Target(target_id))
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.db.find_by_id(TableName::Interactions, id)
    }

    pub fn get(&self, id: i64) -> Result<Interaction> {
        Interaction::try_from(&self.db.get(TableName::Interactions, id)?)
    }

    /// Interactions whose candidate or target reference does not resolve.
    pub fn orphans(&self) -> Result<Vec<Record>> {
        self.db.select(
            &format!("SELECT i.* FROM interactions i WHERE {} ORDER BY i.id", DANGLING_WHERE),
            &[],
        )
    }

    pub fn count(&self) -> Result<u64> {
        self.db.count(TableName::Interactions)
    }
}

impl Database {
    /// Number of interaction rows with unresolved references.
    pub fn count_dangling_references(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM interactions i WHERE {}", DANGLING_WHERE),
                [],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }
}
