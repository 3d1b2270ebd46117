use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Supported column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Null,
    Integer,
    Float,
    String,
}

impl DataType {
    /// SQLite type name used in `CREATE TABLE`
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::Null => "NULL",
            DataType::Integer => "INTEGER",
            DataType::Float => "REAL",
            DataType::String => "TEXT",
        }
    }

    /// Maps a declared SQLite type back to a data type.
    ///
    /// Unknown declarations (BLOB included) are read back as text.
    pub fn from_sql_name(name: &str) -> Self {
        match name.trim().to_uppercase().as_ref() {
            "NULL" => DataType::Null,
            "INT" | "INTEGER" => DataType::Integer,
            "REAL" | "FLOAT" | "DOUBLE" => DataType::Float,
            _ => DataType::String,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Integer | DataType::Float)
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DataType::Null => "null",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::String => "string",
        })
    }
}

/// Runtime value read from or bound to the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Converts raw filter text to the narrowest fitting value.
    ///
    /// Numbers parse as floats, floats without a fractional part narrow to
    /// integers, and anything non-numeric stays text.
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Value::Integer(f as i64)
            }
            Ok(f) => Value::Float(f),
            Err(_) => Value::String(raw.to_string()),
        }
    }

    /// Reconstructs the native type of a stored value from its column type
    pub fn cast(self, datatype: DataType) -> Self {
        match (self, datatype) {
            (Value::Null, _) => Value::Null,
            (Value::Integer(i), DataType::Float) => Value::Float(i as f64),
            (Value::Float(f), DataType::Integer) if f.fract() == 0.0 => Value::Integer(f as i64),
            (Value::String(s), DataType::Float) => match s.trim().parse() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::String(s),
            },
            (v @ (Value::Integer(_) | Value::Float(_)), DataType::String) => {
                Value::String(v.to_string())
            }
            (v, _) => v,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Integer(b as i64),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::from(rusqlite::types::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Float(f) => ToSqlOutput::from(*f),
            Value::String(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Float(f),
            ValueRef::Text(t) | ValueRef::Blob(t) => {
                Value::String(String::from_utf8_lossy(t).into_owned())
            }
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

/// A row is a list of (column name, value) pairs in column order
pub type Row = Vec<(String, Value)>;
