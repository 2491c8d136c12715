//! GlioTarget Database Layer
//!
//! A tabular data gateway over an embedded SQLite store holding EGFR
//! targets, aptamer candidates and their modeled interactions.
//!
//! # Features
//!
//! - Idempotent schema creation for the three fixed tables
//! - Full-table replace loads from comma- or tab-separated text
//! - Filtered reads through closed predicate and search-field enums
//! - A [`Session`] context that turns failures into user-visible notices
//!
//! # Example
//!
//! ```rust,no_run
//! use gliotarget_db::{Database, Delimiter, TableName, Predicate};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("./data.db")?;
//!     db.initialize()?;
//!
//!     db.bulk_load(
//!         TableName::Targets,
//!         "id,gene_name\n1,EGFR\n",
//!         Delimiter::Comma,
//!     )?;
//!     let rows = db.read(TableName::Targets, &Predicate::All)?;
//!     println!("{} targets", rows.len());
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod schema;
pub mod record;
pub mod loader;
pub mod query;
pub mod targets;
pub mod candidates;
pub mod interactions;
pub mod session;

pub use database::{Database, DatabaseStats};
pub use error::{DbError, Result};
pub use schema::{
    TableName, ColumnType, ColumnDef,
    TABLE_TARGETS, TABLE_CANDIDATES, TABLE_INTERACTIONS,
};
pub use record::{Record, Value, Target, Candidate, Interaction};
pub use loader::{Delimiter, Dataset, LoadReport};
pub use query::{Predicate, SearchField};
pub use targets::TargetRepository;
pub use candidates::CandidateRepository;
pub use interactions::{InteractionRepository, InteractionFilter};
pub use session::{Session, Fetched, Outcome, Notice, NoticeLevel, StructureUpload};
