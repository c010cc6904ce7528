use std::fs;

use tracing::info;

use crate::{
    config::DatabaseConfig,
    executor::predicate::Condition,
    storage::{
        schema::{ColumnSchema, TableSchema},
        table::Table,
    },
    types::{
        error::{DatabaseError, Result},
        value::Value,
    },
};

pub const TABLES_CATALOG: &str = "davisbase_tables";
pub const COLUMNS_CATALOG: &str = "davisbase_columns";

const CATALOG_TABLE_COLUMNS: [&str; 1] = ["table_name"];
const CATALOG_COLUMN_COLUMNS: [&str; 5] = [
    "table_name",
    "column_name",
    "data_type",
    "ordinal_position",
    "is_nullable",
];

pub fn is_catalog_table(table_name: &str) -> bool {
    let name = table_name.trim();
    name.eq_ignore_ascii_case(TABLES_CATALOG) || name.eq_ignore_ascii_case(COLUMNS_CATALOG)
}

/// Resolves a table name to its column list. The table engine only sees
/// this capability, never the catalog files themselves.
pub trait SchemaProvider {
    fn resolve_schema(&self, table_name: &str) -> Result<TableSchema>;
}

/// The two bootstrap tables describing every other table.
///
/// Nothing is cached: each lookup opens and scans `davisbase_columns`.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: DatabaseConfig,
}

impl Catalog {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Create the data directories and catalog files if they are missing.
    /// A freshly created catalog describes its own two tables.
    pub fn bootstrap(&self) -> Result<()> {
        fs::create_dir_all(self.config.catalog_dir())?;
        fs::create_dir_all(self.config.user_data_dir())?;

        let tables_path = self.config.table_path(TABLES_CATALOG);
        let columns_path = self.config.table_path(COLUMNS_CATALOG);
        let fresh = !tables_path.exists();

        if fresh {
            Table::create_file(&tables_path)?;
        }
        if !columns_path.exists() {
            Table::create_file(&columns_path)?;
        }

        if fresh {
            self.register_table(&TableSchema::davisbase_tables())?;
            self.register_table(&TableSchema::davisbase_columns())?;
            info!(dir = %self.config.catalog_dir().display(), "initialized catalog");
        }
        Ok(())
    }

    pub fn open_table(&self, table_name: &str) -> Result<Table> {
        Table::open(self.config.table_path(table_name), table_name, self)
    }

    /// Append the table's `davisbase_tables` row and one `davisbase_columns`
    /// row per column.
    pub fn register_table(&self, schema: &TableSchema) -> Result<()> {
        let mut tables = self.open_table(TABLES_CATALOG)?;
        tables.insert(&CATALOG_TABLE_COLUMNS, &[schema.table_name.as_str()])?;

        let mut columns = self.open_table(COLUMNS_CATALOG)?;
        for column in &schema.columns {
            let literals = column.to_catalog_literals(&schema.table_name);
            let literals: Vec<&str> = literals.iter().map(String::as_str).collect();
            columns.insert(&CATALOG_COLUMN_COLUMNS, &literals)?;
        }
        Ok(())
    }

    /// Remove every catalog row for `table_name`; returns the number of
    /// column rows removed.
    pub fn unregister_table(&self, table_name: &str) -> Result<usize> {
        let condition = Condition::eq("table_name", table_name);
        let removed = self.open_table(COLUMNS_CATALOG)?.delete_where(Some(&condition))?;
        self.open_table(TABLES_CATALOG)?.delete_where(Some(&condition))?;
        Ok(removed)
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let condition = Condition::eq("table_name", table_name);
        Ok(!self.open_table(TABLES_CATALOG)?.scan(Some(&condition))?.is_empty())
    }

    /// Registered table names in catalog order, catalog tables included.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let records = self.open_table(TABLES_CATALOG)?.scan(None)?;
        Ok(records
            .into_iter()
            .filter_map(|record| match record.row.values.into_iter().next() {
                Some(Value::Text(name)) => Some(name),
                _ => None,
            })
            .collect())
    }
}

impl SchemaProvider for Catalog {
    fn resolve_schema(&self, table_name: &str) -> Result<TableSchema> {
        if table_name.trim().eq_ignore_ascii_case(TABLES_CATALOG) {
            return Ok(TableSchema::davisbase_tables());
        }
        if table_name.trim().eq_ignore_ascii_case(COLUMNS_CATALOG) {
            return Ok(TableSchema::davisbase_columns());
        }

        let condition = Condition::eq("table_name", table_name);
        let records = self.open_table(COLUMNS_CATALOG)?.scan(Some(&condition))?;
        if records.is_empty() {
            return Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            });
        }

        let columns = records
            .iter()
            .map(|record| ColumnSchema::from_catalog_row(&record.row))
            .collect::<Result<Vec<_>>>()?;
        Ok(TableSchema::new(table_name, columns))
    }
}
