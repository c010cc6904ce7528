use thiserror::Error;

use crate::types::PageId;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column '{column}' cannot be NULL")]
    NotNullViolation { column: String },

    #[error("Column '{name}' not found in table '{table}'")]
    UnknownColumn { name: String, table: String },

    #[error("Unknown data type '{0}'")]
    UnknownType(String),

    #[error("Unknown type code 0x{0:02X}")]
    UnknownTypeCode(u8),

    #[error("Operator '{op}' is not supported for column '{column}'")]
    UnsupportedOperator { op: String, column: String },

    #[error("Schema definition error: {details}")]
    SchemaDefinition { details: String },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Table '{name}' already exists")]
    TableAlreadyExists { name: String },

    #[error("Catalog table '{name}' cannot be modified")]
    CatalogTable { name: String },

    #[error("Invalid {data_type} value '{value}'")]
    InvalidValue { value: String, data_type: String },

    #[error("Text value of {length} bytes exceeds the {max} byte limit")]
    TextTooLong { length: usize, max: usize },

    #[error("Got {values} values for {columns} columns")]
    ValueCountMismatch { columns: usize, values: usize },

    #[error("Record of {size} bytes can never fit in a page")]
    RecordTooLarge { size: usize },

    #[error("Record handle (page {page_id}, slot {slot}) no longer points at offset {offset}")]
    StaleRecordHandle {
        page_id: PageId,
        slot: usize,
        offset: u16,
    },

    #[error("Column 'row_id' is assigned by the engine and cannot be changed")]
    ImmutableRowId,

    #[error("Page is full (page_id: {page_id})")]
    PageFull { page_id: PageId },

    #[error("Invalid slot index {index} (max: {max})")]
    InvalidSlotIndex { index: usize, max: usize },

    #[error("Serialization/deserialization error: {details}")]
    SerializationError { details: String },

    #[error("Invalid page size: {expected} bytes, got {actual} bytes")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("Invalid page type: {0}")]
    InvalidPageType(u8),

    #[error("Corrupted page: page_id={page_id}, reason={reason}")]
    CorruptedPage { page_id: PageId, reason: String },
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
