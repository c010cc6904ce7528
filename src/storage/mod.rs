pub mod catalog;
pub mod page_store;
pub mod schema;
pub mod storage_manager;
pub mod table;
