use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{
    config::DatabaseConfig,
    storage::{
        catalog::SchemaProvider,
        page_store::PageStore,
        schema::{ColumnSpec, TableSchema},
        storage_manager::StorageManager,
        table::Table,
    },
    types::error::{DatabaseError, Result},
};

/// A database rooted in a temporary directory that is removed on drop.
pub struct TempDatabase {
    dir: TempDir,
    pub storage_manager: Option<StorageManager>,
}

impl TempDatabase {
    pub fn new() -> Result<Self> {
        Self::with_prefix("davisbase_test")
    }

    pub fn with_prefix(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        Ok(Self {
            dir,
            storage_manager: None,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> DatabaseConfig {
        DatabaseConfig::with_root(self.dir.path())
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.config().table_path(table_name)
    }

    pub fn create_storage_manager(&mut self) -> Result<&mut StorageManager> {
        let storage_manager = StorageManager::new(self.config())?;
        Ok(self.storage_manager.insert(storage_manager))
    }

    pub fn get_storage_manager(&mut self) -> Option<&mut StorageManager> {
        self.storage_manager.as_mut()
    }
}

/// Schema source backed by a fixed schema, for exercising a table file
/// without a catalog.
pub struct StaticSchemaProvider {
    pub schema: TableSchema,
}

impl SchemaProvider for StaticSchemaProvider {
    fn resolve_schema(&self, table_name: &str) -> Result<TableSchema> {
        if table_name.eq_ignore_ascii_case(&self.schema.table_name) {
            Ok(self.schema.clone())
        } else {
            Err(DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })
        }
    }
}

/// A fresh single-leaf table file at `dir/<name>.tbl` opened with `columns`.
pub fn create_standalone_table(dir: &Path, table_name: &str, columns: &[ColumnSpec]) -> Result<Table> {
    let schema = TableSchema::from_specs(table_name, columns)?;
    let path = dir.join(format!("{}.tbl", table_name));
    let store = PageStore::create(&path)?;
    Ok(Table::with_schema(store, schema))
}
