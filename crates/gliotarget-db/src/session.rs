//! Session context for the dashboard.
//!
//! The dashboard re-reads the store on every render and never lets a failure
//! escape a render: errors become [`Notice`]s and the read returns an empty
//! [`Fetched`] whose [`Outcome`] says why it is empty. The session also
//! caches the last uploaded structure file.

use crate::database::Database;
use crate::error::DbError;
use crate::loader::{Delimiter, LoadReport};
use crate::query::{Predicate, SearchField};
use crate::record::Record;
use crate::schema::TableName;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-visible message produced while serving a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Why a [`Fetched`] result holds the rows it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Rows,
    Empty,
    /// A specific-identifier lookup matched nothing.
    NotFound,
    /// The read failed; the rows are empty and a notice was recorded.
    Failed,
}

/// Result of a session read.
#[derive(Debug, Clone, Serialize)]
pub struct Fetched {
    pub rows: Vec<Record>,
    pub outcome: Outcome,
}

impl Fetched {
    fn from_rows(rows: Vec<Record>) -> Self {
        let outcome = if rows.is_empty() { Outcome::Empty } else { Outcome::Rows };
        Self { rows, outcome }
    }

    fn failed() -> Self {
        Self { rows: Vec::new(), outcome: Outcome::Failed }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.rows.iter().filter_map(Record::id).collect()
    }
}

/// Raw structure file held for the viewer. The bytes are never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureUpload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl StructureUpload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

/// Explicit per-server state handed to every dashboard read.
pub struct Session {
    db: Arc<Database>,
    notices: Vec<Notice>,
    structure: Option<StructureUpload>,
}

impl Session {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db, notices: Vec::new(), structure: None }
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.db
    }

    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.notices.push(Notice { level, message: message.into() });
    }

    /// Drain the notices recorded since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn fail(&mut self, context: &str, err: &DbError) -> Fetched {
        error!("{}: {}", context, err);
        self.notify(NoticeLevel::Error, format!("{}: {}", context, err));
        Fetched::failed()
    }

    /// Read `table` through `predicate`, recording a notice on failure.
    pub fn fetch(&mut self, table: TableName, predicate: &Predicate) -> Fetched {
        match self.db.read(table, predicate) {
            Ok(rows) => Fetched::from_rows(rows),
            Err(e) => self.fail("Error fetching data", &e),
        }
    }

    /// Look up one row; an absent identifier yields [`Outcome::NotFound`].
    pub fn lookup(&mut self, table: TableName, id: i64) -> Fetched {
        let fetched = self.fetch(table, &Predicate::Id(id));
        if fetched.outcome == Outcome::Empty {
            self.notify(NoticeLevel::Error, format!("{} not found (ID: {}).", table.label(), id));
            return Fetched { rows: Vec::new(), outcome: Outcome::NotFound };
        }
        fetched
    }

    pub fn search(&mut self, field: SearchField, term: &str) -> Fetched {
        let fetched = self.fetch(TableName::Candidates, &Predicate::Contains(field, term.to_string()));
        if fetched.outcome == Outcome::Empty {
            self.notify(NoticeLevel::Info, "No matching aptamers found.");
        }
        fetched
    }

    /// Identifiers of `table`, empty on failure.
    pub fn ids(&mut self, table: TableName) -> Vec<i64> {
        match self.db.ids(table) {
            Ok(ids) => ids,
            Err(e) => {
                self.fail("Error fetching identifiers", &e);
                Vec::new()
            }
        }
    }

    /// Bulk load `text` into `table`. `None` delimiter sniffs the header.
    pub fn load(&mut self, table: TableName, text: &str, delimiter: Option<Delimiter>) -> Option<LoadReport> {
        let delimiter = delimiter.unwrap_or_else(|| Delimiter::sniff(text));
        match self.db.bulk_load(table, text, delimiter) {
            Ok(report) => {
                self.notify(
                    NoticeLevel::Info,
                    format!("Loaded {} rows into {}.", report.rows, table.sql_name()),
                );
                if let Some(n) = report.dangling_references.filter(|n| *n > 0) {
                    self.notify(
                        NoticeLevel::Warning,
                        format!("{} interactions reference missing aptamer or EGFR records.", n),
                    );
                }
                Some(report)
            }
            Err(e) => {
                self.fail("Error loading data", &e);
                None
            }
        }
    }

    pub fn store_structure(&mut self, upload: StructureUpload) {
        if upload.is_empty() {
            warn!("Ignoring empty structure upload {:?}", upload.name);
            self.notify(NoticeLevel::Warning, "Uploaded structure file is empty.");
            return;
        }
        info!("Cached structure {:?} ({} bytes)", upload.name, upload.len());
        self.notify(NoticeLevel::Info, format!("Structure {} uploaded.", upload.name));
        self.structure = Some(upload);
    }

    pub fn structure(&self) -> Option<&StructureUpload> {
        self.structure.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let db = Arc::new(Database::open_in_memory().unwrap());
        db.initialize().unwrap();
        Session::new(db)
    }

    #[test]
    fn test_lookup_missing_is_not_found() {
        let mut s = session();
        s.load(TableName::Targets, "id,gene_name\n1,EGFR\n", None).unwrap();
        s.take_notices();

        let fetched = s.lookup(TableName::Targets, 42);
        assert_eq!(fetched.outcome, Outcome::NotFound);
        assert!(fetched.is_empty());
        let notices = s.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Error);

        assert_eq!(s.lookup(TableName::Targets, 1).outcome, Outcome::Rows);
    }

    #[test]
    fn test_failed_read_is_distinguishable_from_empty() {
        let mut s = session();
        assert_eq!(s.fetch(TableName::Interactions, &Predicate::All).outcome, Outcome::Empty);
        assert!(s.take_notices().is_empty());

        let fetched = s.fetch(TableName::Targets, &Predicate::TargetRef(1));
        assert_eq!(fetched.outcome, Outcome::Failed);
        assert_eq!(s.take_notices()[0].level, NoticeLevel::Error);
    }

    #[test]
    fn test_failed_load_records_notice() {
        let mut s = session();
        assert!(s.load(TableName::Targets, "id,gene_name\n1\n", Some(Delimiter::Comma)).is_none());
        let notices = s.take_notices();
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(notices[0].message.starts_with("Error loading data"));
    }

    #[test]
    fn test_structure_cache_keeps_bytes_verbatim() {
        let mut s = session();
        let pdb = b"HEADER    TRANSFERASE\nATOM      1  N   MET A   1\n".to_vec();
        s.store_structure(StructureUpload::new("egfr.pdb", pdb.clone()));
        assert_eq!(s.structure().unwrap().bytes, pdb);

        s.store_structure(StructureUpload::new("empty.pdb", Vec::new()));
        assert_eq!(s.structure().unwrap().name, "egfr.pdb");
    }
}
