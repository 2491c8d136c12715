//! Target repository.
//!
//! Read access to EGFR protein records.

use crate::database::Database;
use crate::error::Result;
use crate::query::Predicate;
use crate::record::{Record, Target};
use crate::schema::TableName;
use std::sync::Arc;

/// Repository for target operations.
#[derive(Clone)]
pub struct TargetRepository {
    db: Arc<Database>,
}

impl TargetRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// All targets, ordered by identifier.
    pub fn list(&self) -> Result<Vec<Record>> {
        self.db.read(TableName::Targets, &Predicate::All)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.db.find_by_id(TableName::Targets, id)
    }

    /// Typed lookup; a missing row is [`DbError::NotFound`](crate::DbError::NotFound).
    pub fn get(&self, id: i64) -> Result<Target> {
        Target::try_from(&self.db.get(TableName::Targets, id)?)
    }

    pub fn ids(&self) -> Result<Vec<i64>> {
        self.db.ids(TableName::Targets)
    }

    pub fn count(&self) -> Result<u64> {
        self.db.count(TableName::Targets)
    }
}
