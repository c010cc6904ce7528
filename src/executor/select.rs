use crate::{
    storage::{schema::TableSchema, table::Record},
    types::{error::Result, value::Value},
};

/// Projected rows of a `select`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one output column, by name (case-insensitive).
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self
            .column_names
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }
}

/// Schema positions for a projection list; `*` selects every column.
pub fn resolve_projection(schema: &TableSchema, columns: &[&str]) -> Result<Vec<usize>> {
    if columns.is_empty() || (columns.len() == 1 && columns[0].trim() == "*") {
        return Ok((0..schema.columns.len()).collect());
    }
    columns
        .iter()
        .map(|column| schema.require_column_index(column))
        .collect()
}

pub fn project(schema: &TableSchema, records: &[Record], columns: &[&str]) -> Result<QueryResult> {
    let indices = resolve_projection(schema, columns)?;
    let column_names = indices
        .iter()
        .map(|&index| schema.columns[index].name.clone())
        .collect();
    let rows = records
        .iter()
        .map(|record| {
            indices
                .iter()
                .map(|&index| {
                    record
                        .row
                        .column_value(index)
                        .map(|value| value.into_owned())
                        .unwrap_or(Value::Null)
                })
                .collect()
        })
        .collect();

    Ok(QueryResult { column_names, rows })
}
