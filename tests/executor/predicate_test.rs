use davisbase::{
    executor::predicate::{ComparisonOp, Condition},
    types::{error::DatabaseError, value::Value},
};

#[test]
fn test_operator_tokens() -> Result<(), DatabaseError> {
    assert_eq!("=".parse::<ComparisonOp>()?, ComparisonOp::Equal);
    assert_eq!("<>".parse::<ComparisonOp>()?, ComparisonOp::NotEqual);
    assert_eq!("<".parse::<ComparisonOp>()?, ComparisonOp::LessThan);
    assert_eq!("<=".parse::<ComparisonOp>()?, ComparisonOp::LessThanOrEqual);
    assert_eq!(">".parse::<ComparisonOp>()?, ComparisonOp::GreaterThan);
    assert_eq!(">=".parse::<ComparisonOp>()?, ComparisonOp::GreaterThanOrEqual);
    assert_eq!(ComparisonOp::NotEqual.to_string(), "<>");
    Ok(())
}

#[test]
fn test_unrecognised_operator_is_kept() -> Result<(), DatabaseError> {
    let condition = Condition::new("name", "LIKE", "'B%'")?;
    assert_eq!(condition.op, ComparisonOp::Unsupported("LIKE".to_string()));
    assert!(!condition.op.is_supported());
    assert_eq!(condition.to_string(), "name LIKE 'B%'");

    assert!(matches!(
        Condition::new("name", " ", "x"),
        Err(DatabaseError::UnsupportedOperator { .. })
    ));
    Ok(())
}

#[test]
fn test_unsupported_operator_on_text_is_false() -> Result<(), DatabaseError> {
    let condition = Condition::new("name", "LIKE", "'bob'")?;
    assert!(!condition.evaluate(&Value::Text("bob".to_string()))?);
    assert!(!condition.evaluate(&Value::Null)?);
    Ok(())
}

#[test]
fn test_unsupported_operator_on_other_types_is_an_error() -> Result<(), DatabaseError> {
    let values = [
        Value::TinyInt(1),
        Value::Int(1),
        Value::BigInt(1),
        Value::Real(1.0),
        Value::Double(1.0),
        Value::DateTime(0),
        Value::Date(0),
    ];
    let condition = Condition::new("age", "LIKE", "1")?;
    for value in &values {
        match condition.evaluate(value) {
            Err(DatabaseError::UnsupportedOperator { op, column }) => {
                assert_eq!(op, "LIKE");
                assert_eq!(column, "age");
            }
            other => panic!("expected UnsupportedOperator for {:?}, got {:?}", value, other),
        }
    }
    Ok(())
}

#[test]
fn test_integer_comparisons() -> Result<(), DatabaseError> {
    let age = Value::SmallInt(20);
    assert!(Condition::eq("age", "20").evaluate(&age)?);
    assert!(!Condition::ne("age", "20").evaluate(&age)?);
    assert!(Condition::gt("age", "15").evaluate(&age)?);
    assert!(Condition::ge("age", "20").evaluate(&age)?);
    assert!(!Condition::lt("age", "20").evaluate(&age)?);
    assert!(Condition::le("age", "20").evaluate(&age)?);
    assert!(Condition::lt("big", "10000000000").evaluate(&Value::BigInt(9_999_999_999))?);
    assert!(Condition::new("id", ">", "-1")?.evaluate(&Value::TinyInt(0))?);
    Ok(())
}

#[test]
fn test_float_comparisons() -> Result<(), DatabaseError> {
    assert!(Condition::eq("price", "1.1").evaluate(&Value::Real(1.1))?);
    assert!(Condition::gt("price", "1").evaluate(&Value::Double(1.5))?);
    assert!(!Condition::lt("price", "1.5").evaluate(&Value::Double(1.5))?);
    Ok(())
}

#[test]
fn test_text_only_supports_equality() -> Result<(), DatabaseError> {
    let name = Value::Text("Bob".to_string());
    assert!(Condition::eq("name", "'bob'").evaluate(&name)?);
    assert!(Condition::eq("name", "BOB").evaluate(&name)?);
    assert!(Condition::ne("name", "'Alice'").evaluate(&name)?);
    assert!(!Condition::gt("name", "'A'").evaluate(&name)?);
    assert!(!Condition::lt("name", "'Z'").evaluate(&name)?);
    Ok(())
}

#[test]
fn test_null_never_matches() -> Result<(), DatabaseError> {
    assert!(!Condition::eq("age", "1").evaluate(&Value::Null)?);
    assert!(!Condition::ne("age", "1").evaluate(&Value::Null)?);
    Ok(())
}

#[test]
fn test_datetime_and_date_comparisons() -> Result<(), DatabaseError> {
    let at = Value::DateTime(1_705_314_600);
    assert!(Condition::eq("at", "'2024-01-15 10:30:00'").evaluate(&at)?);
    assert!(Condition::gt("at", "2024-01-15 10:29:59").evaluate(&at)?);

    let day = Value::Date(1_705_276_800);
    assert!(Condition::le("day", "2024-01-15").evaluate(&day)?);
    assert!(!Condition::lt("day", "2024-01-15").evaluate(&day)?);
    Ok(())
}

#[test]
fn test_bad_literals_are_errors() {
    assert!(matches!(
        Condition::eq("age", "twenty").evaluate(&Value::Int(20)),
        Err(DatabaseError::InvalidValue { .. })
    ));
    assert!(matches!(
        Condition::eq("day", "yesterday").evaluate(&Value::Date(0)),
        Err(DatabaseError::InvalidValue { .. })
    ));
}

#[test]
fn test_display() -> Result<(), DatabaseError> {
    assert_eq!(Condition::new("age", ">=", "18")?.to_string(), "age >= 18");
    Ok(())
}
