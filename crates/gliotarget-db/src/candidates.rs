//! Candidate repository.
//!
//! Read and search access to aptamer candidate records.

use crate::database::Database;
use crate::error::Result;
use crate::query::{Predicate, SearchField};
use crate::record::{Candidate, Record};
use crate::schema::TableName;
use std::sync::Arc;

/// Repository for candidate operations.
#[derive(Clone)]
pub struct CandidateRepository {
    db: Arc<Database>,
}

impl CandidateRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn list(&self) -> Result<Vec<Record>> {
        self.db.read(TableName::Candidates, &Predicate::All)
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.db.find_by_id(TableName::Candidates, id)
    }

    pub fn get(&self, id: i64) -> Result<Candidate> {
        Candidate::try_from(&self.db.get(TableName::Candidates, id)?)
    }

    /// Candidates whose `field` contains `term`.
    pub fn search(&self, field: SearchField, term: &str) -> Result<Vec<Record>> {
        self.db.search(field, term)
    }

    /// Candidates sharing an external identifier; the key is not unique.
    pub fn find_by_aptamer_id(&self, aptamer_id: &str) -> Result<Vec<Candidate>> {
        self.db
            .search(SearchField::AptamerId, aptamer_id)?
            .iter()
            .filter(|r| r.get("aptamer_id").and_then(|v| v.to_text()).as_deref() == Some(aptamer_id))
            .map(Candidate::try_from)
            .collect()
    }

    pub fn ids(&self) -> Result<Vec<i64>> {
        self.db.ids(TableName::Candidates)
    }

    pub fn count(&self) -> Result<u64> {
        self.db.count(TableName::Candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Delimiter;

    #[test]
    fn test_find_by_aptamer_id_matches_exactly() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        db.bulk_load(
            TableName::Candidates,
            "aptamer_id,sequence\nCL4,GCCUUAGUAACGUGCUUUGAUGUCGAUUCGACAGGAGGC\nCL4,GCC\nCL40,AAA\n",
            Delimiter::Comma,
        )
        .unwrap();

        let repo = CandidateRepository::new(db);
        let hits = repo.find_by_aptamer_id("CL4").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|c| c.aptamer_id.as_deref() == Some("CL4")));
        assert_eq!(repo.ids().unwrap(), vec![1, 2, 3]);
    }
}
