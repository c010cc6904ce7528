use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::types::{
    LEAF_CELL_HEADER_SIZE, RowId,
    error::{DatabaseError, Result},
    value::{DataType, TypeCode, Value},
};

/*
 * Leaf cell layout (big-endian)
 * [len:u16][row_id:u32][column_count:u8][column_count type codes][values]
 *
 * `len` counts every byte above, header included. The row id column is
 * carried in the header and never repeated among the values.
 */

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub row_id: RowId,
    /// Every declared column after `row_id`, in ordinal order.
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(row_id: RowId, values: Vec<Value>) -> Self {
        Self { row_id, values }
    }

    /// Value at a schema position, where position 0 is the row id.
    pub fn column_value(&self, index: usize) -> Option<Cow<'_, Value>> {
        if index == 0 {
            return Some(Cow::Owned(row_id_value(self.row_id)));
        }
        self.values.get(index - 1).map(Cow::Borrowed)
    }

    fn type_codes(&self, data_types: &[DataType]) -> Result<Vec<TypeCode>> {
        if self.values.len() != data_types.len() {
            return Err(DatabaseError::ValueCountMismatch {
                columns: data_types.len(),
                values: self.values.len(),
            });
        }
        self.values
            .iter()
            .zip(data_types)
            .map(|(value, data_type)| value.type_code(*data_type))
            .collect()
    }

    /// Total encoded cell length for these values under `data_types`.
    pub fn cell_size(&self, data_types: &[DataType]) -> Result<usize> {
        let codes = self.type_codes(data_types)?;
        Ok(LEAF_CELL_HEADER_SIZE + codes.len() + codes.iter().map(TypeCode::size).sum::<usize>())
    }

    pub fn to_cell_bytes(&self, data_types: &[DataType]) -> Result<Vec<u8>> {
        let codes = self.type_codes(data_types)?;
        let size = LEAF_CELL_HEADER_SIZE + codes.len() + codes.iter().map(TypeCode::size).sum::<usize>();
        let length = u16::try_from(size).map_err(|_| DatabaseError::RecordTooLarge { size })?;

        let mut buffer = Vec::with_capacity(size);
        buffer.extend_from_slice(&length.to_be_bytes());
        buffer.extend_from_slice(&self.row_id.to_be_bytes());
        buffer.push(codes.len() as u8);
        buffer.extend(codes.iter().map(TypeCode::as_u8));
        for (value, code) in self.values.iter().zip(&codes) {
            value.encode(*code, &mut buffer);
        }

        debug_assert_eq!(buffer.len(), size);
        Ok(buffer)
    }

    pub fn from_cell_bytes(bytes: &[u8], data_types: &[DataType]) -> Result<Self> {
        if bytes.len() < LEAF_CELL_HEADER_SIZE {
            return Err(DatabaseError::SerializationError {
                details: "Incomplete cell header".to_string(),
            });
        }

        let length = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
        if length > bytes.len() || length < LEAF_CELL_HEADER_SIZE {
            return Err(DatabaseError::SerializationError {
                details: format!("Cell length {} does not fit {} available bytes", length, bytes.len()),
            });
        }
        let bytes = &bytes[..length];

        let row_id = Self::peek_row_id(bytes)?;
        let column_count = bytes[6] as usize;
        if column_count != data_types.len() {
            return Err(DatabaseError::SerializationError {
                details: format!(
                    "Cell has {} columns, schema declares {}",
                    column_count,
                    data_types.len()
                ),
            });
        }

        let mut cursor = LEAF_CELL_HEADER_SIZE;
        if cursor + column_count > bytes.len() {
            return Err(DatabaseError::SerializationError {
                details: "Incomplete type codes".to_string(),
            });
        }
        let codes: Vec<TypeCode> = bytes[cursor..cursor + column_count]
            .iter()
            .map(|b| TypeCode::from_u8(*b))
            .collect();
        cursor += column_count;

        let mut values = Vec::with_capacity(column_count);
        for (code, data_type) in codes.iter().zip(data_types) {
            if !code.is_valid_for(*data_type) {
                return Err(DatabaseError::UnknownTypeCode(code.as_u8()));
            }
            values.push(Value::decode(*code, &bytes[cursor..])?);
            cursor += code.size();
        }

        if cursor != length {
            return Err(DatabaseError::SerializationError {
                details: format!("Cell declares {} bytes but encodes {}", length, cursor),
            });
        }

        Ok(Row { row_id, values })
    }

    /// Row id from a leaf cell without decoding the values.
    pub fn peek_row_id(bytes: &[u8]) -> Result<RowId> {
        if bytes.len() < 6 {
            return Err(DatabaseError::SerializationError {
                details: "Incomplete row ID".to_string(),
            });
        }
        Ok(RowId::from_be_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]))
    }
}

/// The row id surfaces as an `int` column.
pub fn row_id_value(row_id: RowId) -> Value {
    match i32::try_from(row_id) {
        Ok(id) => Value::Int(id),
        Err(_) => Value::BigInt(i64::from(row_id)),
    }
}
