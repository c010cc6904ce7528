use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{
    MAX_TEXT_LENGTH,
    error::{DatabaseError, Result},
    row::Row,
    value::{DataType, Value},
};

/// The implicit first column of every table, carried in the cell header.
pub const ROW_ID_COLUMN: &str = "row_id";

const NULLABLE_YES: &str = "YES";
const NULLABLE_NO: &str = "NO";

/// A column as declared by a caller of `create_table`, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: false,
        }
    }

    /// Mark the column as declared with an explicit NULL marker.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Represents a column definition in a table schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    /// 1-based; position 1 is always `row_id`.
    pub ordinal_position: u8,
    pub nullable: bool,
}

impl ColumnSchema {
    pub fn new(name: &str, data_type: DataType, ordinal_position: u8) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            ordinal_position,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn is_nullable_flag(&self) -> &'static str {
        if self.nullable { NULLABLE_YES } else { NULLABLE_NO }
    }

    /// Literals for a `davisbase_columns` insert, in catalog column order.
    pub fn to_catalog_literals(&self, table_name: &str) -> Vec<String> {
        vec![
            table_name.to_string(),
            self.name.clone(),
            self.data_type.to_string(),
            self.ordinal_position.to_string(),
            self.is_nullable_flag().to_string(),
        ]
    }

    /// Create column schema from a decoded `davisbase_columns` row
    pub fn from_catalog_row(row: &Row) -> Result<Self> {
        let corrupted = |reason: &str| DatabaseError::SerializationError {
            details: format!("davisbase_columns row {}: {}", row.row_id, reason),
        };

        let [_, Value::Text(name), Value::Text(type_name), ordinal, Value::Text(nullable)] =
            row.values.as_slice()
        else {
            return Err(corrupted("unexpected column layout"));
        };

        let ordinal_position = match ordinal {
            Value::TinyInt(position) if *position > 0 => *position as u8,
            _ => return Err(corrupted("invalid ordinal position")),
        };

        Ok(Self {
            name: name.clone(),
            data_type: type_name.parse()?,
            ordinal_position,
            nullable: nullable.eq_ignore_ascii_case(NULLABLE_YES),
        })
    }
}

/// Represents a complete table schema with all column definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    /// Ordinal order, `row_id` first.
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(table_name: &str, mut columns: Vec<ColumnSchema>) -> Self {
        columns.sort_by_key(|col| col.ordinal_position);
        Self {
            table_name: table_name.to_string(),
            columns,
        }
    }

    /// Validate a caller's column list and turn it into a schema.
    pub fn from_specs(table_name: &str, specs: &[ColumnSpec]) -> Result<Self> {
        let definition_error = |details: String| DatabaseError::SchemaDefinition { details };

        if table_name.trim().is_empty() {
            return Err(definition_error("table name is empty".to_string()));
        }
        // Names are stored as catalog text values.
        if table_name.len() > MAX_TEXT_LENGTH {
            return Err(definition_error(format!(
                "table name is {} bytes, at most {} are allowed",
                table_name.len(),
                MAX_TEXT_LENGTH
            )));
        }
        let Some(first) = specs.first() else {
            return Err(definition_error(format!(
                "table '{}' must declare at least one column",
                table_name
            )));
        };
        if !first.name.eq_ignore_ascii_case(ROW_ID_COLUMN) || first.nullable {
            return Err(definition_error(
                "first column must be 'row_id INT' and cannot be NULL".to_string(),
            ));
        }
        if specs.len() > i8::MAX as usize {
            return Err(definition_error(format!(
                "table '{}' declares {} columns, at most {} are supported",
                table_name,
                specs.len(),
                i8::MAX
            )));
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            if spec.name.trim().is_empty() {
                return Err(definition_error(format!("column {} has no name", index + 1)));
            }
            if spec.name.len() > MAX_TEXT_LENGTH {
                return Err(definition_error(format!(
                    "column {} name is {} bytes, at most {} are allowed",
                    index + 1,
                    spec.name.len(),
                    MAX_TEXT_LENGTH
                )));
            }
            if !seen.insert(spec.name.to_ascii_lowercase()) {
                return Err(definition_error(format!("duplicate column name: {}", spec.name)));
            }

            let data_type: DataType = spec.data_type.parse()?;
            let mut column = ColumnSchema::new(&spec.name, data_type, (index + 1) as u8);
            if spec.nullable {
                column = column.nullable();
            }
            columns.push(column);
        }

        if columns[0].data_type != DataType::Int {
            return Err(definition_error(
                "first column must be 'row_id INT' and cannot be NULL".to_string(),
            ));
        }

        Ok(Self::new(table_name, columns))
    }

    /// `davisbase_tables(row_id int, table_name text)`
    pub fn davisbase_tables() -> Self {
        Self::new(
            "davisbase_tables",
            vec![
                ColumnSchema::new(ROW_ID_COLUMN, DataType::Int, 1),
                ColumnSchema::new("table_name", DataType::Text, 2),
            ],
        )
    }

    /// `davisbase_columns(row_id int, table_name text, column_name text,
    /// data_type text, ordinal_position tinyint, is_nullable text)`
    pub fn davisbase_columns() -> Self {
        Self::new(
            "davisbase_columns",
            vec![
                ColumnSchema::new(ROW_ID_COLUMN, DataType::Int, 1),
                ColumnSchema::new("table_name", DataType::Text, 2),
                ColumnSchema::new("column_name", DataType::Text, 3),
                ColumnSchema::new("data_type", DataType::Text, 4),
                ColumnSchema::new("ordinal_position", DataType::TinyInt, 5),
                ColumnSchema::new("is_nullable", DataType::Text, 6),
            ],
        )
    }

    /// Get column by name, ignoring case
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|col| col.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Get column index by name, ignoring case; index 0 is `row_id`
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn require_column_index(&self, name: &str) -> Result<usize> {
        self.get_column_index(name)
            .ok_or_else(|| DatabaseError::UnknownColumn {
                name: name.to_string(),
                table: self.table_name.clone(),
            })
    }

    /// Get all column names in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    /// Columns stored in the cell body, i.e. everything but `row_id`.
    pub fn data_columns(&self) -> &[ColumnSchema] {
        self.columns.get(1..).unwrap_or(&[])
    }

    pub fn data_types(&self) -> Vec<DataType> {
        self.data_columns().iter().map(|col| col.data_type).collect()
    }
}
