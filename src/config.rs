use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::catalog::is_catalog_table;

/// Environment variable naming the root data directory.
pub const DATA_DIR_ENV: &str = "DAVISBASE_DATA_DIR";

/// Where table files live on disk.
///
/// Catalog tables and user tables are kept in sibling directories under a
/// common root, one `<table>.<extension>` file per table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub root_dir: PathBuf,
    pub catalog_dir_name: String,
    pub user_data_dir_name: String,
    pub table_file_extension: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("data"),
            catalog_dir_name: "catalog".to_string(),
            user_data_dir_name: "user_data".to_string(),
            table_file_extension: "tbl".to_string(),
        }
    }
}

impl DatabaseConfig {
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root_dir: root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Defaults, with the root taken from `DAVISBASE_DATA_DIR` when set.
    pub fn from_env() -> Self {
        match std::env::var_os(DATA_DIR_ENV) {
            Some(root) if !root.is_empty() => Self::with_root(root),
            _ => Self::default(),
        }
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.root_dir.join(&self.catalog_dir_name)
    }

    pub fn user_data_dir(&self) -> PathBuf {
        self.root_dir.join(&self.user_data_dir_name)
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        let dir = if is_catalog_table(table_name) {
            self.catalog_dir()
        } else {
            self.user_data_dir()
        };
        dir.join(format!(
            "{}.{}",
            table_name.to_ascii_lowercase(),
            self.table_file_extension
        ))
    }
}
