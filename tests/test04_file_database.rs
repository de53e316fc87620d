use sqlite_mapper::prelude::*;
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

storable! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Entry: Uuid4 {
        pub body: String => "TEXT NOT NULL",
    }
}

fn registry_at(path: &std::path::Path) -> Result<Registry, SqlMapperError> {
    let mut registry = Registry::with_default_database(Database::open(path)?);
    registry.register::<Entry>()?;
    Ok(registry)
}

#[test]
fn test_writes_outside_transactions_persist_across_reconnect() -> TestResult {
    let dir = tempdir()?;
    let first = dir.path().join("first.db");
    let second = dir.path().join("second.db");

    let mut registry = registry_at(&first)?;
    mapper::create_table::<Entry>(&registry)?;
    let mut entry = Entry::make(|e| e.body = Some("durable".into()));
    mapper::save(&registry, &mut entry)?;
    let id = entry.id.clone().expect("uuid generated");

    registry.default_database_mut().connect(second.as_path())?;
    assert_eq!(registry.default_database().location(), &DbLocation::from(second.as_path()));
    assert!(!mapper::table_exists::<Entry>(&registry)?);

    registry.default_database_mut().connect(first.as_path())?;
    let stored: Entry = mapper::get(&registry, id)?;
    assert_eq!(stored, entry);
    Ok(())
}

#[test]
fn test_committed_and_rolled_back_work_on_disk() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("tx.db");

    {
        let registry = registry_at(&path)?;
        mapper::create_table::<Entry>(&registry)?;
        registry.transaction(|| -> Result<(), SqlMapperError> {
            mapper::save(&registry, &mut Entry::make(|e| e.body = Some("kept".into())))
        })?;
        let discarded: Result<(), Box<dyn std::error::Error>> = registry.transaction(|| {
            mapper::save(&registry, &mut Entry::make(|e| e.body = Some("discarded".into())))?;
            Err("rolled back".into())
        });
        assert!(discarded.is_err());
    }

    let registry = registry_at(&path)?;
    let bodies: Vec<String> = mapper::get_all::<Entry>(&registry)?
        .all()?
        .into_iter()
        .filter_map(|e| e.body)
        .collect();
    assert_eq!(bodies, ["kept"]);
    Ok(())
}

#[test]
fn test_reconnect_resets_nesting() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("nesting.db");
    let mut db = Database::open(path.as_path())?;
    db.execute_batch("CREATE TABLE t(v)")?;

    let leaked = db.savepoint()?;
    db.execute("INSERT INTO t(v) VALUES (?)", &[RowValues::from("uncommitted")])?;
    std::mem::forget(leaked);
    assert_eq!(db.open_transactions(), 1);

    db.connect(path.as_path())?;
    assert_eq!(db.open_transactions(), 0);
    assert_eq!(db.select("SELECT v FROM t", &[])?.len(), 0);

    let fresh = db.savepoint()?;
    assert_eq!(fresh.depth(), 0);
    fresh.release()?;
    Ok(())
}

#[test]
fn test_wal_option_sets_journal_mode() -> TestResult {
    let dir = tempdir()?;
    let db = DatabaseOptions::builder(dir.path().join("wal.db"))
        .wal(true)
        .open()?;

    let mode: String = db
        .connection()
        .pragma_query_value(None, "journal_mode", |row| row.get(0))?;
    assert_eq!(mode.to_lowercase(), "wal");
    Ok(())
}

#[test]
fn test_options_from_json() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("configured.db");
    let document = serde_json::json!({
        "location": path,
        "foreign_keys": false,
        "savepoint_prefix": "app",
    })
    .to_string();

    let options = DatabaseOptions::from_json(&document)?;
    assert_eq!(options.location, DbLocation::File(path.clone()));
    assert!(!options.wal);

    let db = Database::with_options(options)?;
    assert!(!db.pragma_foreign_keys()?);
    let savepoint = db.savepoint()?;
    assert_eq!(savepoint.name(), format!("app_{}_0", db.handle()));
    savepoint.release()?;

    assert!(path.exists());
    Ok(())
}

#[test]
fn test_invalid_savepoint_prefix_is_rejected() {
    let options = DatabaseOptions::builder(DbLocation::Memory)
        .savepoint_prefix("bad prefix; DROP TABLE t")
        .finish();
    assert!(matches!(
        Database::with_options(options),
        Err(SqlMapperError::ConfigError(_))
    ));
}
