use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{
    storage::schema::TableSchema,
    types::{
        error::{DatabaseError, Result},
        value::{Value, parse_date, parse_datetime, unquote},
    },
};

/// Comparison operators for predicates. Any other token is kept as
/// `Unsupported`; whether that is an error depends on the column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Unsupported(String),
}

impl ComparisonOp {
    pub fn as_str(&self) -> &str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "<>",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessThanOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterThanOrEqual => ">=",
            ComparisonOp::Unsupported(op) => op,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, ComparisonOp::Unsupported(_))
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonOp::Equal => ordering == Ordering::Equal,
            ComparisonOp::NotEqual => ordering != Ordering::Equal,
            ComparisonOp::LessThan => ordering == Ordering::Less,
            ComparisonOp::LessThanOrEqual => ordering != Ordering::Greater,
            ComparisonOp::GreaterThan => ordering == Ordering::Greater,
            ComparisonOp::GreaterThanOrEqual => ordering != Ordering::Less,
            ComparisonOp::Unsupported(_) => false,
        }
    }
}

impl FromStr for ComparisonOp {
    type Err = DatabaseError;

    /// Only an empty token is rejected here.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(DatabaseError::UnsupportedOperator {
                op: String::new(),
                column: String::new(),
            }),
            "=" => Ok(ComparisonOp::Equal),
            "<>" => Ok(ComparisonOp::NotEqual),
            "<" => Ok(ComparisonOp::LessThan),
            "<=" => Ok(ComparisonOp::LessThanOrEqual),
            ">" => Ok(ComparisonOp::GreaterThan),
            ">=" => Ok(ComparisonOp::GreaterThanOrEqual),
            other => Ok(ComparisonOp::Unsupported(other.to_string())),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `column op literal` filter. There is no conjunction: every
/// operation takes at most one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column_name: String,
    pub op: ComparisonOp,
    pub literal: String,
}

impl Condition {
    /// Build a condition from already-tokenized text, e.g. `("age", ">", "15")`.
    /// An unrecognised operator is accepted here and rejected by
    /// [`Condition::evaluate`] for non-text columns.
    pub fn new(column_name: &str, op: &str, literal: &str) -> Result<Self> {
        let op = op.parse::<ComparisonOp>().map_err(|err| match err {
            DatabaseError::UnsupportedOperator { op, .. } => DatabaseError::UnsupportedOperator {
                op,
                column: column_name.to_string(),
            },
            other => other,
        })?;
        Ok(Self::with_op(column_name, op, literal))
    }

    pub fn with_op(column_name: &str, op: ComparisonOp, literal: &str) -> Self {
        Self {
            column_name: column_name.to_string(),
            op,
            literal: literal.to_string(),
        }
    }

    /// Create an equality predicate
    pub fn eq(column_name: &str, literal: &str) -> Self {
        Self::with_op(column_name, ComparisonOp::Equal, literal)
    }

    /// Create a not equal predicate
    pub fn ne(column_name: &str, literal: &str) -> Self {
        Self::with_op(column_name, ComparisonOp::NotEqual, literal)
    }

    pub fn lt(column_name: &str, literal: &str) -> Self {
        Self::with_op(column_name, ComparisonOp::LessThan, literal)
    }

    pub fn le(column_name: &str, literal: &str) -> Self {
        Self::with_op(column_name, ComparisonOp::LessThanOrEqual, literal)
    }

    pub fn gt(column_name: &str, literal: &str) -> Self {
        Self::with_op(column_name, ComparisonOp::GreaterThan, literal)
    }

    pub fn ge(column_name: &str, literal: &str) -> Self {
        Self::with_op(column_name, ComparisonOp::GreaterThanOrEqual, literal)
    }

    /// Schema position of the filtered column (0 is `row_id`).
    pub fn column_index(&self, schema: &TableSchema) -> Result<usize> {
        schema.require_column_index(&self.column_name)
    }

    /// Test a decoded column value.
    ///
    /// Integer, floating, datetime and date columns support the six
    /// comparison operators and reject anything else with
    /// `UnsupportedOperator`. Text supports only `=` and `<>`, compared
    /// without regard to case; any other operator on text is false.
    /// NULL never matches.
    pub fn evaluate(&self, value: &Value) -> Result<bool> {
        let literal = self.literal.trim();
        if !self.op.is_supported() && !matches!(value, Value::Null | Value::Text(_)) {
            return Err(DatabaseError::UnsupportedOperator {
                op: self.op.to_string(),
                column: self.column_name.clone(),
            });
        }
        let ordering = match value {
            Value::Null => return Ok(false),
            Value::TinyInt(_) | Value::SmallInt(_) | Value::Int(_) | Value::BigInt(_) => {
                let lhs = integer_of(value);
                let rhs: i64 = unquote(literal).parse().map_err(|_| self.invalid_literal("integer"))?;
                lhs.cmp(&rhs)
            }
            Value::Real(_) | Value::Double(_) => {
                let lhs = float_of(value);
                let rhs: f64 = unquote(literal).parse().map_err(|_| self.invalid_literal("double"))?;
                match lhs.partial_cmp(&rhs) {
                    Some(ordering) => ordering,
                    None => return Ok(self.op == ComparisonOp::NotEqual),
                }
            }
            Value::DateTime(secs) => {
                let rhs = parse_datetime(unquote(literal)).ok_or_else(|| self.invalid_literal("datetime"))?;
                secs.cmp(&rhs)
            }
            Value::Date(secs) => {
                let rhs = parse_date(unquote(literal)).ok_or_else(|| self.invalid_literal("date"))?;
                secs.cmp(&rhs)
            }
            Value::Text(text) => {
                let rhs = literal.trim_matches(|c| c == '\'' || c == '"');
                let equal = text.to_lowercase() == rhs.to_lowercase();
                return Ok(match self.op {
                    ComparisonOp::Equal => equal,
                    ComparisonOp::NotEqual => !equal,
                    _ => false,
                });
            }
        };
        Ok(self.op.accepts(ordering))
    }

    fn invalid_literal(&self, data_type: &str) -> DatabaseError {
        DatabaseError::InvalidValue {
            value: self.literal.clone(),
            data_type: data_type.to_string(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column_name, self.op, self.literal)
    }
}

fn integer_of(value: &Value) -> i64 {
    match value {
        Value::TinyInt(v) => i64::from(*v),
        Value::SmallInt(v) => i64::from(*v),
        Value::Int(v) => i64::from(*v),
        Value::BigInt(v) => *v,
        _ => 0,
    }
}

// Reals widen through their printed form: `1.1f32` compares equal to `1.1`.
fn float_of(value: &Value) -> f64 {
    match value {
        Value::Real(v) => v.to_string().parse().unwrap_or(f64::from(*v)),
        Value::Double(v) => *v,
        _ => 0.0,
    }
}
