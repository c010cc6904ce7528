use davisbase::{
    executor::predicate::Condition,
    storage::schema::ColumnSpec,
    types::{error::DatabaseError, value::{DataType, Value}},
    utils::mock::TempDatabase,
};

#[test]
fn test_create_table_registers_columns() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("create_columns")?;
    let storage = temp_db.create_storage_manager()?;
    let schema = storage.create_table(
        "books",
        &[
            ColumnSpec::new("row_id", "int"),
            ColumnSpec::new("title", "text"),
            ColumnSpec::new("pages", "smallint").nullable(),
        ],
    )?;
    assert_eq!(schema.column_names(), vec!["row_id", "title", "pages"]);
    assert_eq!(schema.columns[2].data_type, DataType::SmallInt);

    let tables = storage.select(
        "davisbase_tables",
        &["row_id", "table_name"],
        Some(&Condition::eq("table_name", "books")),
    )?;
    assert_eq!(tables.rows, vec![vec![Value::Int(3), Value::Text("books".to_string())]]);

    let columns = storage.select(
        "davisbase_columns",
        &["column_name", "data_type", "ordinal_position", "is_nullable"],
        Some(&Condition::eq("table_name", "'books'")),
    )?;
    assert_eq!(
        columns.rows,
        vec![
            vec![
                Value::Text("row_id".to_string()),
                Value::Text("int".to_string()),
                Value::TinyInt(1),
                Value::Text("NO".to_string()),
            ],
            vec![
                Value::Text("title".to_string()),
                Value::Text("text".to_string()),
                Value::TinyInt(2),
                Value::Text("NO".to_string()),
            ],
            vec![
                Value::Text("pages".to_string()),
                Value::Text("smallint".to_string()),
                Value::TinyInt(3),
                Value::Text("YES".to_string()),
            ],
        ]
    );
    Ok(())
}

#[test]
fn test_first_column_must_be_row_id_int() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("create_row_id")?;
    let storage = temp_db.create_storage_manager()?;

    for columns in [
        vec![ColumnSpec::new("id", "int")],
        vec![ColumnSpec::new("row_id", "text")],
        vec![ColumnSpec::new("row_id", "int").nullable()],
        vec![],
    ] {
        assert!(matches!(
            storage.create_table("bad", &columns),
            Err(DatabaseError::SchemaDefinition { .. })
        ));
    }
    assert!(!storage.table_exists("bad")?);
    assert!(!temp_db.table_path("bad").exists());
    Ok(())
}

#[test]
fn test_definition_errors() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("create_errors")?;
    let storage = temp_db.create_storage_manager()?;

    assert!(matches!(
        storage.create_table(
            "dupes",
            &[
                ColumnSpec::new("row_id", "int"),
                ColumnSpec::new("a", "int"),
                ColumnSpec::new("A", "text"),
            ],
        ),
        Err(DatabaseError::SchemaDefinition { .. })
    ));
    assert!(matches!(
        storage.create_table(
            "typo",
            &[ColumnSpec::new("row_id", "int"), ColumnSpec::new("a", "integer")],
        ),
        Err(DatabaseError::UnknownType(_))
    ));

    let too_many: Vec<ColumnSpec> = std::iter::once(ColumnSpec::new("row_id", "int"))
        .chain((1..128).map(|i| ColumnSpec::new(&format!("c{}", i), "tinyint")))
        .collect();
    assert_eq!(too_many.len(), 128);
    assert!(matches!(
        storage.create_table("wide", &too_many),
        Err(DatabaseError::SchemaDefinition { .. })
    ));
    assert!(storage.show_tables()?.is_empty());
    Ok(())
}

#[test]
fn test_multiple_tables_keep_separate_row_ids() -> Result<(), DatabaseError> {
    let mut temp_db = TempDatabase::with_prefix("create_multi")?;
    let storage = temp_db.create_storage_manager()?;
    let columns = [ColumnSpec::new("row_id", "int"), ColumnSpec::new("v", "int")];
    storage.create_table("a", &columns)?;
    storage.create_table("b", &columns)?;

    storage.insert_into_table("a", &["v"], &["1"])?;
    storage.insert_into_table("a", &["v"], &["2"])?;
    assert_eq!(storage.insert_into_table("b", &["v"], &["3"])?, 1);
    assert_eq!(storage.show_tables()?, vec!["a", "b"]);
    Ok(())
}
