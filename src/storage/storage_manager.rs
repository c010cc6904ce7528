use std::{fs, io::ErrorKind, path::Path};

use tracing::{info, warn};

use crate::{
    config::DatabaseConfig,
    executor::{
        predicate::Condition,
        select::{QueryResult, project, resolve_projection},
    },
    storage::{
        catalog::{Catalog, is_catalog_table},
        schema::{ColumnSpec, TableSchema},
        table::Table,
    },
    types::{
        RowId,
        error::{DatabaseError, Result},
    },
};

/// Table-level entry points for a command layer that has already tokenized
/// its input. Every call opens the files it needs and closes them on return.
pub struct StorageManager {
    catalog: Catalog,
}

impl StorageManager {
    /// Open the database described by `config`, creating the catalog on
    /// first use.
    pub fn new(config: DatabaseConfig) -> Result<Self> {
        let catalog = Catalog::new(config);
        catalog.bootstrap()?;
        Ok(Self { catalog })
    }

    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::new(DatabaseConfig::with_root(root))
    }

    pub fn config(&self) -> &DatabaseConfig {
        self.catalog.config()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn create_table(&self, table_name: &str, columns: &[ColumnSpec]) -> Result<TableSchema> {
        let table_name = normalize(table_name);
        if is_catalog_table(&table_name) {
            return Err(DatabaseError::CatalogTable { name: table_name });
        }

        let schema = TableSchema::from_specs(&table_name, columns)?;
        let path = self.config().table_path(&table_name);
        if path.exists() || self.catalog.table_exists(&table_name)? {
            return Err(DatabaseError::TableAlreadyExists { name: table_name });
        }

        Table::create_file(&path)?;
        if let Err(err) = self.catalog.register_table(&schema) {
            self.rollback_create(&table_name, &path);
            return Err(err);
        }
        info!(table = %table_name, columns = schema.columns.len(), "created table");
        Ok(schema)
    }

    // Undo a partially registered table: catalog rows first, then the file.
    fn rollback_create(&self, table_name: &str, path: &Path) {
        if let Err(err) = self.catalog.unregister_table(table_name) {
            warn!(table = %table_name, error = %err, "could not remove catalog rows of failed create");
        }
        if let Err(err) = fs::remove_file(path) {
            warn!(table = %table_name, error = %err, "could not remove table file of failed create");
        }
    }

    pub fn drop_table(&self, table_name: &str) -> Result<()> {
        let table_name = self.writable_table(table_name)?;
        if !self.catalog.table_exists(&table_name)? {
            return Err(DatabaseError::TableNotFound { name: table_name });
        }

        self.catalog.unregister_table(&table_name)?;
        match fs::remove_file(self.config().table_path(&table_name)) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(table = %table_name, "table removed from catalog but its file was already gone");
            }
            Err(err) => return Err(err.into()),
        }
        info!(table = %table_name, "dropped table");
        Ok(())
    }

    pub fn insert_into_table(&self, table_name: &str, columns: &[&str], values: &[&str]) -> Result<RowId> {
        let table_name = self.writable_table(table_name)?;
        self.catalog.open_table(&table_name)?.insert(columns, values)
    }

    /// `UPDATE t SET set_column = set_value [WHERE condition]`; returns the
    /// number of records rewritten.
    pub fn update_table(
        &self,
        table_name: &str,
        set_column: &str,
        set_value: &str,
        condition: Option<&Condition>,
    ) -> Result<usize> {
        let table_name = self.writable_table(table_name)?;
        let mut table = self.catalog.open_table(&table_name)?;
        let updated = table.update_where(&[set_column], &[set_value], condition)?;
        info!(table = %table_name, updated, "updated records");
        Ok(updated)
    }

    /// `DELETE FROM t [WHERE condition]`; returns the number of records removed.
    pub fn delete_from_table(&self, table_name: &str, condition: Option<&Condition>) -> Result<usize> {
        let table_name = self.writable_table(table_name)?;
        let deleted = self.catalog.open_table(&table_name)?.delete_where(condition)?;
        info!(table = %table_name, deleted, "deleted records");
        Ok(deleted)
    }

    /// `SELECT columns FROM t [WHERE condition]`. Catalog tables are readable.
    pub fn select(&self, table_name: &str, columns: &[&str], condition: Option<&Condition>) -> Result<QueryResult> {
        let table_name = normalize(table_name);
        let mut table = self.catalog.open_table(&table_name)?;
        resolve_projection(table.schema(), columns)?;
        let records = table.scan(condition)?;
        project(table.schema(), &records, columns)
    }

    /// User tables, in creation order.
    pub fn show_tables(&self) -> Result<Vec<String>> {
        Ok(self
            .catalog
            .table_names()?
            .into_iter()
            .filter(|name| !is_catalog_table(name))
            .collect())
    }

    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        self.catalog.table_exists(&normalize(table_name))
    }

    fn writable_table(&self, table_name: &str) -> Result<String> {
        let table_name = normalize(table_name);
        if is_catalog_table(&table_name) {
            return Err(DatabaseError::CatalogTable { name: table_name });
        }
        Ok(table_name)
    }
}

fn normalize(table_name: &str) -> String {
    table_name.trim().to_ascii_lowercase()
}
