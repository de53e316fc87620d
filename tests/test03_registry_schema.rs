mod common;

use common::{A, AB, B, given_a_database};
use sqlite_mapper::DEFAULT_DATABASE;
use sqlite_mapper::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

storable! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Widget: Autoincrement {
        pub label: String => "TEXT NOT NULL",
        pub weight: f64 => "REAL",
    }
}

storable! {
    #[derive(Debug)]
    pub struct Parent: Assigned {
        pub name: String,
    }
}

storable! {
    #[derive(Debug)]
    pub struct Manual: Assigned {
        pub name: String,
    }
}

storable! {
    #[derive(Debug, Clone, PartialEq)]
    pub struct Ledger: Assigned {
        pub memo: String,
    }
}

storable! {
    #[derive(Debug)]
    pub struct Child: Autoincrement {
        pub parent: i64 => "INTEGER REFERENCES parents(id)",
    }
}

#[test]
fn test_table_names() -> TestResult {
    let mut registry = given_a_database()?;
    assert_eq!(registry.meta::<A>()?.table_name(), "aa");
    assert_eq!(registry.meta::<B>()?.table_name(), "b");
    assert_eq!(registry.meta::<AB>()?.table_name(), "x");

    registry.register::<Widget>()?;
    assert_eq!(registry.meta::<Widget>()?.table_name(), "widgets");
    assert_eq!(registry.meta::<Widget>()?.database_name(), DEFAULT_DATABASE);

    registry.set_table_name::<Widget>("gadgets")?;
    registry.set_table_name::<Widget>("things")?;
    assert_eq!(registry.meta::<Widget>()?.table_name(), "things");
    Ok(())
}

#[test]
fn test_composed_fields_are_merged_in_canonical_order() -> TestResult {
    let registry = given_a_database()?;
    let meta = registry.meta::<AB>()?;

    let names: Vec<&str> = meta.fields().iter().map(Field::name).collect();
    assert_eq!(names, ["a", "b", "id", "x"]);
    let non_key: Vec<&str> = meta.non_key_fields().map(Field::name).collect();
    assert_eq!(non_key, ["a", "b", "x"]);

    let id = meta.fields().iter().find(|f| f.name() == "id").expect("id field");
    assert_eq!(id.sql_declaration(), Some("INTEGER PRIMARY KEY"));
    assert_eq!(meta.primary_key(), PrimaryKey::Autoincrement);
    Ok(())
}

#[test]
fn test_register_twice_is_rejected() -> TestResult {
    let mut registry = given_a_database()?;
    assert!(registry.is_registered::<A>());
    assert!(matches!(
        registry.register::<A>(),
        Err(SqlMapperError::AlreadyRegistered("A"))
    ));
    assert!(!registry.is_registered::<Widget>());
    assert!(matches!(
        registry.meta::<Widget>(),
        Err(SqlMapperError::NotRegistered("Widget"))
    ));
    Ok(())
}

#[test]
fn test_create_table_and_table_exists() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Widget>()?;

    assert!(!mapper::table_exists::<Widget>(&registry)?);
    mapper::create_table::<Widget>(&registry)?;
    assert!(mapper::table_exists::<Widget>(&registry)?);

    let err = mapper::create_table::<Widget>(&registry).unwrap_err();
    assert!(!err.is_integrity_error());

    let mut widget = Widget::make(|w| {
        w.label = Some("bolt".into());
        w.weight = Some(1.5);
    });
    mapper::save(&registry, &mut widget)?;
    let stored: Widget = mapper::get(&registry, widget.id.clone().expect("id assigned"))?;
    assert_eq!(stored, widget);
    Ok(())
}

#[test]
fn test_column_declarations_are_enforced() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Widget>()?;
    mapper::create_table::<Widget>(&registry)?;

    let mut unlabeled = Widget::make(|w| w.weight = Some(2.0));
    let err = mapper::save(&registry, &mut unlabeled).unwrap_err();
    assert!(err.is_integrity_error(), "unexpected error: {err:?}");
    assert_eq!(unlabeled.id, None);
    Ok(())
}

#[test]
fn test_table_constraints_are_enforced() -> TestResult {
    let mut registry = Registry::new()?;
    registry
        .register::<Widget>()?
        .constraint("UNIQUE(label)")
        .constraint("CHECK(weight > 0)");
    assert_eq!(
        registry.meta::<Widget>()?.constraints(),
        ["UNIQUE(label)", "CHECK(weight > 0)"]
    );
    mapper::create_table::<Widget>(&registry)?;

    let make = |label: &str, weight: f64| {
        Widget::make(|w| {
            w.label = Some(label.into());
            w.weight = Some(weight);
        })
    };

    mapper::save(&registry, &mut make("nut", 1.0))?;
    assert!(mapper::save(&registry, &mut make("nut", 2.0)).unwrap_err().is_integrity_error());
    assert!(mapper::save(&registry, &mut make("washer", -1.0)).unwrap_err().is_integrity_error());
    assert_eq!(common::count::<Widget>(&registry)?, 1);
    Ok(())
}

#[test]
fn test_databases_are_isolated() -> TestResult {
    let mut registry = Registry::new()?;
    registry.add_database("other", Database::open_in_memory()?);
    registry.register::<Widget>()?;
    mapper::create_table::<Widget>(&registry)?;

    registry.set_database::<Widget>("other")?;
    assert_eq!(registry.meta::<Widget>()?.database_name(), "other");
    assert!(!mapper::table_exists::<Widget>(&registry)?);
    mapper::create_table::<Widget>(&registry)?;
    mapper::save(&registry, &mut Widget::make(|w| w.label = Some("elsewhere".into())))?;
    assert_eq!(common::count::<Widget>(&registry)?, 1);

    registry.set_database::<Widget>(DEFAULT_DATABASE)?;
    assert_eq!(common::count::<Widget>(&registry)?, 0);
    Ok(())
}

#[test]
fn test_transactions_are_per_database() -> TestResult {
    let mut registry = Registry::new()?;
    registry.add_database("other", Database::open_in_memory()?);
    let default = registry.default_database();
    let other = registry.database("other")?;
    assert_ne!(default.handle(), other.handle());

    default.transaction(|| -> Result<(), SqlMapperError> {
        assert_eq!(default.open_transactions(), 1);
        assert_eq!(other.open_transactions(), 0);
        other.transaction(|| -> Result<(), SqlMapperError> {
            assert_eq!(other.open_transactions(), 1);
            Ok(())
        })
    })?;
    Ok(())
}

#[test]
fn test_unknown_database_is_rejected() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Widget>()?;

    assert!(matches!(
        registry.set_database::<Widget>("nowhere"),
        Err(SqlMapperError::ConfigError(_))
    ));
    assert_eq!(registry.meta::<Widget>()?.database_name(), DEFAULT_DATABASE);
    assert!(registry.database("nowhere").is_err());
    Ok(())
}

#[test]
fn test_replacing_default_database() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Widget>()?;
    mapper::create_table::<Widget>(&registry)?;

    let previous = registry.add_database(DEFAULT_DATABASE, Database::open_in_memory()?);
    assert!(previous.is_some());
    assert!(!mapper::table_exists::<Widget>(&registry)?);
    Ok(())
}

#[test]
fn test_foreign_keys_enforced_by_default() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Parent>()?.constraint("PRIMARY KEY(id)");
    registry.register::<Child>()?;
    mapper::create_table::<Parent>(&registry)?;
    mapper::create_table::<Child>(&registry)?;
    let db = registry.default_database();
    assert!(db.pragma_foreign_keys()?);

    let mut parent = Parent::make(|p| {
        p.id = Some(Id::Int(7));
        p.name = Some("root".into());
    });
    mapper::create(&registry, &mut parent)?;
    mapper::save(&registry, &mut Child::make(|c| c.parent = Some(7)))?;

    let mut orphan = Child::make(|c| c.parent = Some(8));
    assert!(mapper::save(&registry, &mut orphan).unwrap_err().is_integrity_error());
    assert!(mapper::delete(&registry, &mut parent).unwrap_err().is_integrity_error());

    db.disable_foreign_keys()?;
    assert!(!db.pragma_foreign_keys()?);
    mapper::save(&registry, &mut orphan)?;

    db.enable_foreign_keys()?;
    assert!(db.pragma_foreign_keys()?);
    Ok(())
}

#[test]
fn test_assigned_key_reads_back_engine_assigned_id() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Manual>()?.table_name("manual");
    registry
        .default_database()
        .execute_batch("CREATE TABLE manual(id INTEGER PRIMARY KEY, name)")?;

    let mut manual = Manual::make(|m| m.name = Some("anonymous".into()));
    mapper::save(&registry, &mut manual)?;
    assert_eq!(manual.id, Some(Id::Int(1)));

    let mut chosen = Manual::make(|m| m.id = Some(Id::Int(50)));
    mapper::create(&registry, &mut chosen)?;
    assert_eq!(chosen.id, Some(Id::Int(50)));

    let mut next = Manual::make(|m| m.name = Some("after 50".into()));
    mapper::save(&registry, &mut next)?;
    assert_eq!(next.id, Some(Id::Int(51)));

    let stored: Manual = mapper::get(&registry, 1)?;
    assert_eq!(stored.name.as_deref(), Some("anonymous"));
    Ok(())
}

#[test]
fn test_assigned_key_on_created_table() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Ledger>()?;
    mapper::create_table::<Ledger>(&registry)?;

    let mut entry = Ledger::make(|l| {
        l.id = Some(Id::from("2024-001"));
        l.memo = Some("opening balance".into());
    });
    mapper::create(&registry, &mut entry)?;
    assert_eq!(entry.id, Some(Id::from("2024-001")));
    let stored: Ledger = mapper::get(&registry, "2024-001")?;
    assert_eq!(stored, entry);

    entry.memo = Some("corrected balance".into());
    mapper::save(&registry, &mut entry)?;
    let stored: Ledger = mapper::get(&registry, "2024-001")?;
    assert_eq!(stored.memo.as_deref(), Some("corrected balance"));
    Ok(())
}

#[test]
fn test_assigned_key_without_id_is_not_stored_as_null() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Ledger>()?;
    mapper::create_table::<Ledger>(&registry)?;
    mapper::create(&registry, &mut Ledger::make(|l| l.id = Some(Id::Int(1))))?;

    let mut unkeyed = Ledger::make(|l| l.memo = Some("no key".into()));
    let err = mapper::save(&registry, &mut unkeyed).unwrap_err();
    assert!(matches!(err, SqlMapperError::ConfigError(_)), "unexpected error: {err:?}");
    assert_eq!(unkeyed.id, None);
    assert_eq!(common::count::<Ledger>(&registry)?, 1);
    assert_eq!(registry.default_database().open_transactions(), 0);
    Ok(())
}

#[test]
fn test_assigned_key_with_table_primary_key_needs_an_id() -> TestResult {
    let mut registry = Registry::new()?;
    registry.register::<Parent>()?.constraint("PRIMARY KEY(id)");
    mapper::create_table::<Parent>(&registry)?;

    let mut parent = Parent::make(|p| p.name = Some("orphaned".into()));
    assert!(matches!(
        mapper::save(&registry, &mut parent),
        Err(SqlMapperError::ConfigError(_))
    ));
    assert_eq!(parent.id, None);
    assert_eq!(common::count::<Parent>(&registry)?, 0);

    parent.id = Some(Id::Int(3));
    mapper::create(&registry, &mut parent)?;
    parent.name = Some("adopted".into());
    mapper::save(&registry, &mut parent)?;
    let stored: Parent = mapper::get(&registry, 3)?;
    assert_eq!(stored.name.as_deref(), Some("adopted"));
    Ok(())
}

#[test]
fn test_configure_handle() -> TestResult {
    let mut registry = Registry::new()?;
    assert!(matches!(
        registry.configure::<Widget>(),
        Err(SqlMapperError::NotRegistered("Widget"))
    ));

    let config = registry.register::<Widget>()?.table_name("parts");
    assert_eq!(config.meta().table_name(), "parts");
    assert!(matches!(
        config.database("nowhere"),
        Err(SqlMapperError::ConfigError(_))
    ));

    registry.add_database("archive", Database::open_in_memory()?);
    let config = registry.configure::<Widget>()?.database("archive")?;
    assert_eq!(config.meta().database_name(), "archive");
    assert_eq!(registry.meta::<Widget>()?.table_name(), "parts");
    Ok(())
}
