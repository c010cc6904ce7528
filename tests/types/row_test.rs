use davisbase::types::{
    error::DatabaseError,
    row::{Row, row_id_value},
    value::{DataType, Value},
};

fn people_types() -> Vec<DataType> {
    vec![DataType::Text, DataType::SmallInt]
}

#[test]
fn test_cell_layout() -> Result<(), DatabaseError> {
    let row = Row::new(1, vec![Value::Text("Bob".to_string()), Value::SmallInt(20)]);
    let bytes = row.to_cell_bytes(&people_types())?;

    assert_eq!(
        bytes,
        vec![
            0x00, 0x0E, // length
            0x00, 0x00, 0x00, 0x01, // row id
            0x02, // column count
            0x0F, 0x05, // type codes
            b'B', b'o', b'b', 0x00, 0x14,
        ]
    );
    assert_eq!(row.cell_size(&people_types())?, bytes.len());
    Ok(())
}

#[test]
fn test_null_values_keep_their_width() -> Result<(), DatabaseError> {
    let types = vec![DataType::Int, DataType::Double];
    let row = Row::new(9, vec![Value::Null, Value::Null]);
    let bytes = row.to_cell_bytes(&types)?;

    assert_eq!(bytes.len(), 7 + 2 + 4 + 8);
    assert_eq!(&bytes[7..9], &[0x02, 0x03]);
    assert_eq!(Row::from_cell_bytes(&bytes, &types)?, row);
    Ok(())
}

#[test]
fn test_decode_ignores_bytes_past_the_cell() -> Result<(), DatabaseError> {
    let row = Row::new(3, vec![Value::Text("Carol".to_string()), Value::SmallInt(18)]);
    let mut bytes = row.to_cell_bytes(&people_types())?;
    bytes.extend_from_slice(&[0xEE; 32]);

    let decoded = Row::from_cell_bytes(&bytes, &people_types())?;
    assert_eq!(decoded, row);
    assert_eq!(Row::peek_row_id(&bytes)?, 3);
    Ok(())
}

#[test]
fn test_column_count_must_match_schema() -> Result<(), DatabaseError> {
    let row = Row::new(1, vec![Value::Text("Bob".to_string()), Value::SmallInt(20)]);
    let bytes = row.to_cell_bytes(&people_types())?;

    assert!(matches!(
        Row::from_cell_bytes(&bytes, &[DataType::Text]),
        Err(DatabaseError::SerializationError { .. })
    ));
    assert!(matches!(
        Row::new(1, vec![Value::Int(1)]).to_cell_bytes(&people_types()),
        Err(DatabaseError::ValueCountMismatch { columns: 2, values: 1 })
    ));
    Ok(())
}

#[test]
fn test_stored_code_must_suit_declared_type() -> Result<(), DatabaseError> {
    let row = Row::new(1, vec![Value::Int(5)]);
    let mut bytes = row.to_cell_bytes(&[DataType::Int])?;
    // Rewrite the INT code as DOUBLE
    bytes[7] = 0x09;

    assert!(matches!(
        Row::from_cell_bytes(&bytes, &[DataType::Int]),
        Err(DatabaseError::UnknownTypeCode(0x09))
    ));
    Ok(())
}

#[test]
fn test_truncated_cell_is_rejected() -> Result<(), DatabaseError> {
    let row = Row::new(1, vec![Value::BigInt(1)]);
    let bytes = row.to_cell_bytes(&[DataType::BigInt])?;

    assert!(matches!(
        Row::from_cell_bytes(&bytes[..10], &[DataType::BigInt]),
        Err(DatabaseError::SerializationError { .. })
    ));
    assert!(Row::peek_row_id(&bytes[..4]).is_err());
    Ok(())
}

#[test]
fn test_row_id_is_column_zero() {
    let row = Row::new(42, vec![Value::Text("Dave".to_string()), Value::Null]);

    assert_eq!(row.column_value(0).map(|v| v.into_owned()), Some(Value::Int(42)));
    assert_eq!(
        row.column_value(1).map(|v| v.into_owned()),
        Some(Value::Text("Dave".to_string()))
    );
    assert_eq!(row.column_value(2).map(|v| v.into_owned()), Some(Value::Null));
    assert!(row.column_value(3).is_none());
}

#[test]
fn test_large_row_ids_surface_as_bigint() {
    assert_eq!(row_id_value(7), Value::Int(7));
    assert_eq!(row_id_value(u32::MAX), Value::BigInt(u32::MAX as i64));
}

#[test]
fn test_width_extremes_survive_a_cell() -> Result<(), DatabaseError> {
    let cases: Vec<(DataType, Vec<Value>)> = vec![
        (DataType::TinyInt, vec![Value::TinyInt(i8::MIN), Value::TinyInt(i8::MAX), Value::TinyInt(-1)]),
        (DataType::SmallInt, vec![Value::SmallInt(i16::MIN), Value::SmallInt(i16::MAX), Value::SmallInt(-1)]),
        (DataType::Int, vec![Value::Int(i32::MIN), Value::Int(i32::MAX), Value::Int(-1)]),
        (DataType::BigInt, vec![Value::BigInt(i64::MIN), Value::BigInt(i64::MAX), Value::BigInt(-1)]),
        (DataType::Real, vec![Value::Real(f32::MIN), Value::Real(f32::MAX), Value::Real(-0.5)]),
        (DataType::Double, vec![Value::Double(f64::MIN), Value::Double(f64::MAX), Value::Double(-0.5)]),
        (DataType::DateTime, vec![Value::DateTime(i64::MIN), Value::DateTime(i64::MAX), Value::DateTime(-86_400)]),
        (DataType::Date, vec![Value::Date(i64::MIN), Value::Date(i64::MAX), Value::Date(-86_400)]),
        (
            DataType::Text,
            vec![
                Value::Text("x".repeat(243)),
                Value::Text("é".repeat(121)),
                Value::Text(String::new()),
            ],
        ),
    ];

    for (data_type, values) in cases {
        for value in values {
            let row = Row::new(u32::MAX, vec![value.clone()]);
            let bytes = row.to_cell_bytes(&[data_type])?;
            let decoded = Row::from_cell_bytes(&bytes, &[data_type])?;
            assert_eq!(decoded, row, "{:?} as {}", value, data_type);
        }
    }
    Ok(())
}

#[test]
fn test_longest_text_cell_layout() -> Result<(), DatabaseError> {
    let types = [DataType::Text];
    let row = Row::new(1, vec![Value::Text("z".repeat(243))]);
    let bytes = row.to_cell_bytes(&types)?;

    assert_eq!(bytes.len(), 7 + 1 + 243);
    assert_eq!(&bytes[0..2], &251u16.to_be_bytes());
    assert_eq!(bytes[7], 0xFF);
    assert_eq!(Row::from_cell_bytes(&bytes, &types)?, row);
    Ok(())
}
