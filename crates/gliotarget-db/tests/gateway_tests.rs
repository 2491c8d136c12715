//! End-to-end checks of the tabular gateway against file-backed and
//! in-memory stores.

use gliotarget_db::{
    Database, DbError, Delimiter, InteractionFilter, InteractionRepository, Predicate,
    SearchField, TableName, TargetRepository, Value,
};
use std::sync::Arc;

const TARGET_CSV: &str = "id,gene_name,uniprot_accession,sequence,domain_structure\n\
    1,EGFR,P00533,MRPSGTAGAALLALLAALCPASRA,\"Extracellular (L1, CR1, L2, CR2); TM; kinase\"\n";

fn memory_db() -> Arc<Database> {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();
    Arc::new(db)
}

#[test]
fn ensure_schema_twice_keeps_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data.db");

    let db = Database::open(&path).unwrap();
    db.initialize().unwrap();
    db.bulk_load(TableName::Targets, TARGET_CSV, Delimiter::Comma).unwrap();
    db.initialize().unwrap();
    db.initialize().unwrap();
    assert_eq!(db.count(TableName::Targets).unwrap(), 1);
    drop(db);

    // Reopening the file sees the same rows.
    let reopened = Database::open(&path).unwrap();
    reopened.initialize().unwrap();
    assert_eq!(reopened.count(TableName::Targets).unwrap(), 1);
    assert_eq!(reopened.path(), Some(path.as_path()));
}

#[test]
fn load_then_read_all_returns_the_row() {
    let db = memory_db();
    let report = db.bulk_load(TableName::Targets, TARGET_CSV, Delimiter::Comma).unwrap();
    assert_eq!(report.rows, 1);
    assert_eq!(report.dangling_references, None);

    let rows = db.read(TableName::Targets, &Predicate::All).unwrap();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.get("id"), Some(&Value::Integer(1)));
    assert_eq!(row.get("gene_name"), Some(&Value::from("EGFR")));
    assert_eq!(row.get("uniprot_accession"), Some(&Value::from("P00533")));
    assert_eq!(row.get("sequence"), Some(&Value::from("MRPSGTAGAALLALLAALCPASRA")));
    assert_eq!(
        row.get("domain_structure"),
        Some(&Value::from("Extracellular (L1, CR1, L2, CR2); TM; kinase"))
    );

    let target = TargetRepository::new(db).get(1).unwrap();
    assert_eq!(target.uniprot_accession.as_deref(), Some("P00533"));
}

#[test]
fn second_load_replaces_instead_of_appending() {
    let db = memory_db();
    db.bulk_load(TableName::Targets, TARGET_CSV, Delimiter::Comma).unwrap();

    let reshaped = "gene_name\tisoform\nEGFRvIII\t3\nHER2\t1\n";
    let report = db.bulk_load(TableName::Targets, reshaped, Delimiter::Tab).unwrap();
    assert_eq!(report.columns, vec!["gene_name", "isoform"]);

    let rows = db.read(TableName::Targets, &Predicate::All).unwrap();
    assert_eq!(rows.len(), 2);
    let names: Vec<_> = rows.iter().filter_map(|r| r.get("gene_name")).cloned().collect();
    assert_eq!(names, vec![Value::from("EGFRvIII"), Value::from("HER2")]);
    // Identifiers were assigned because the new data carried none.
    assert_eq!(db.ids(TableName::Targets).unwrap(), vec![1, 2]);
    assert_eq!(rows[0].get("isoform"), Some(&Value::Integer(3)));
    assert!(rows[0].get("uniprot_accession").is_none());
}

#[test]
fn lookup_of_absent_identifier_is_not_found() {
    let db = memory_db();
    db.bulk_load(TableName::Targets, TARGET_CSV, Delimiter::Comma).unwrap();

    assert!(db.read(TableName::Targets, &Predicate::Id(404)).unwrap().is_empty());
    match db.get(TableName::Targets, 404) {
        Err(DbError::NotFound(what)) => assert_eq!(what, "EGFR 404"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn sequence_search_returns_exact_subset() {
    let db = memory_db();
    db.bulk_load(
        TableName::Candidates,
        "id,aptamer_id,sequence,length,target,binding_affinity\n\
         1,AS-IV,GGGAAACCC,9,EGFR,2.1\n\
         2,AS-VI,GGGCCC,6,EGFR,\n\
         3,AS-VII,AAAAUUU,7,EGFR,10.4\n\
         4,CL4,aaaccc,6,EGFR,\n",
        Delimiter::Comma,
    )
    .unwrap();

    let hits = db.search(SearchField::Sequence, "AAA").unwrap();
    let ids: Vec<i64> = hits.iter().filter_map(|r| r.id()).collect();
    assert_eq!(ids, vec![1, 3]);

    let all = db.search(SearchField::Sequence, "").unwrap();
    assert_eq!(all.len(), 4);
}

#[test]
fn interaction_filter_by_target_and_all() {
    let db = memory_db();
    db.bulk_load(
        TableName::Interactions,
        "id,aptamer_id,egfr_id,interaction_type,distance,angle,interacting_atoms,interacting_residues\n\
         1,1,1,hydrogen bond,2.8,160,N1-O,Lys745\n\
         2,2,1,stacking,3.5,,,Phe723\n\
         3,1,2,salt bridge,4.0,,,Arg841\n",
        Delimiter::Comma,
    )
    .unwrap();

    let repo = InteractionRepository::new(db);
    let by_target = repo.filter(InteractionFilter::Target(1)).unwrap();
    assert_eq!(by_target.len(), 2);
    assert!(by_target
        .iter()
        .all(|r| r.get("egfr_id") == Some(&Value::Integer(1))));

    assert_eq!(repo.filter(InteractionFilter::All).unwrap().len(), 3);
}

#[test]
fn malformed_load_fails_whole_load() {
    let db = memory_db();
    db.bulk_load(TableName::Targets, TARGET_CSV, Delimiter::Comma).unwrap();

    let err = db
        .bulk_load(TableName::Targets, "id,gene_name\n2,A\n3\n", Delimiter::Comma)
        .unwrap_err();
    assert!(matches!(err, DbError::MalformedInput { .. }));
    // Parsing fails before the table is touched.
    assert_eq!(db.ids(TableName::Targets).unwrap(), vec![1]);
}
