use davisbase::{
    storage::{
        catalog::{COLUMNS_CATALOG, Catalog, SchemaProvider, TABLES_CATALOG, is_catalog_table},
        schema::{ColumnSpec, TableSchema},
        storage_manager::StorageManager,
    },
    types::{
        error::DatabaseError,
        value::{DataType, Value},
    },
    utils::mock::TempDatabase,
};

#[test]
fn test_bootstrap_creates_catalog_files() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("catalog_files")?;
    let catalog = Catalog::new(temp_db.config());
    catalog.bootstrap()?;

    assert!(temp_db.path().join("catalog").join("davisbase_tables.tbl").exists());
    assert!(temp_db.path().join("catalog").join("davisbase_columns.tbl").exists());
    assert!(temp_db.path().join("user_data").is_dir());
    Ok(())
}

#[test]
fn test_catalog_describes_itself() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("catalog_self")?;
    let storage = temp_db.create_storage_manager()?;

    let tables = storage.select(TABLES_CATALOG, &["table_name"], None)?;
    assert_eq!(
        tables.rows,
        vec![
            vec![Value::Text("davisbase_tables".to_string())],
            vec![Value::Text("davisbase_columns".to_string())],
        ]
    );

    let columns = storage.select(COLUMNS_CATALOG, &["*"], None)?;
    assert_eq!(columns.row_count(), 8);
    assert_eq!(
        columns.rows[0],
        vec![
            Value::Int(1),
            Value::Text("davisbase_tables".to_string()),
            Value::Text("row_id".to_string()),
            Value::Text("int".to_string()),
            Value::TinyInt(1),
            Value::Text("NO".to_string()),
        ]
    );
    assert_eq!(
        columns.rows[7],
        vec![
            Value::Int(8),
            Value::Text("davisbase_columns".to_string()),
            Value::Text("is_nullable".to_string()),
            Value::Text("text".to_string()),
            Value::TinyInt(6),
            Value::Text("NO".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn test_reopening_does_not_register_twice() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("catalog_reopen")?;
    {
        StorageManager::new(temp_db.config())?;
    }
    let storage = StorageManager::new(temp_db.config())?;

    assert_eq!(storage.select(TABLES_CATALOG, &["*"], None)?.row_count(), 2);
    assert_eq!(storage.select(COLUMNS_CATALOG, &["*"], None)?.row_count(), 8);
    Ok(())
}

#[test]
fn test_schema_round_trips_through_catalog() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("catalog_schema")?;
    let storage = temp_db.create_storage_manager()?;
    let created = storage.create_table(
        "people",
        &[
            ColumnSpec::new("row_id", "INT"),
            ColumnSpec::new("name", "TEXT"),
            ColumnSpec::new("age", "SMALLINT").nullable(),
            ColumnSpec::new("joined", "date").nullable(),
        ],
    )?;

    let resolved = storage.catalog().resolve_schema("people")?;
    assert_eq!(resolved, created);
    assert_eq!(resolved.data_types(), vec![DataType::Text, DataType::SmallInt, DataType::Date]);
    assert!(!resolved.columns[1].nullable);
    assert!(resolved.columns[2].nullable);
    assert_eq!(resolved.columns[3].ordinal_position, 4);
    Ok(())
}

#[test]
fn test_catalog_schemas_are_fixed() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("catalog_fixed")?;
    let catalog = Catalog::new(temp_db.config());
    catalog.bootstrap()?;

    assert_eq!(catalog.resolve_schema("DAVISBASE_TABLES")?, TableSchema::davisbase_tables());
    assert_eq!(catalog.resolve_schema(COLUMNS_CATALOG)?, TableSchema::davisbase_columns());
    assert!(matches!(
        catalog.resolve_schema("ghost"),
        Err(DatabaseError::TableNotFound { .. })
    ));
    Ok(())
}

#[test]
fn test_unregister_removes_all_rows() -> Result<(), DatabaseError> {
    let temp_db = TempDatabase::with_prefix("catalog_unregister")?;
    let catalog = Catalog::new(temp_db.config());
    catalog.bootstrap()?;

    let schema = TableSchema::from_specs(
        "pets",
        &[ColumnSpec::new("row_id", "int"), ColumnSpec::new("kind", "text")],
    )?;
    catalog.register_table(&schema)?;
    assert!(catalog.table_exists("pets")?);

    assert_eq!(catalog.unregister_table("pets")?, 2);
    assert!(!catalog.table_exists("pets")?);
    assert_eq!(catalog.table_names()?, vec!["davisbase_tables", "davisbase_columns"]);
    Ok(())
}

#[test]
fn test_is_catalog_table_ignores_case() {
    assert!(is_catalog_table("davisbase_tables"));
    assert!(is_catalog_table(" DavisBase_Columns "));
    assert!(!is_catalog_table("people"));
}
