use davisbase::{
    config::DatabaseConfig,
    storage::storage_manager::StorageManager,
    types::error::DatabaseError,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("davisbase=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<(), DatabaseError> {
    init_logging();

    // An explicit path argument wins over DAVISBASE_DATA_DIR.
    let config = match std::env::args_os().nth(1) {
        Some(root) => DatabaseConfig::with_root(root),
        None => DatabaseConfig::from_env(),
    };
    info!(root = %config.root_dir.display(), "opening database");

    let storage = StorageManager::new(config)?;
    let tables = storage.show_tables()?;
    if tables.is_empty() {
        println!("No user tables.");
        return Ok(());
    }

    for table in tables {
        let result = storage.select(&table, &["*"], None)?;
        println!("{} ({} rows): {}", table, result.row_count(), result.column_names.join(", "));
    }
    Ok(())
}
