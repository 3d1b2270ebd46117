//! The Iris record type and its CSV/JSON loaders

use std::{
    collections::BTreeMap,
    fmt::Display,
    hash::{Hash, Hasher},
};

use serde::Serialize;
use tracing::warn;

use crate::{
    error::{Error, Result},
    sql::types::{DataType, Row, Value},
};

pub mod store;
pub mod summary;

/// The closed set of Iris fields, in declared order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SepalLength,
    SepalWidth,
    PetalLength,
    PetalWidth,
    Species,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::SepalLength,
        Field::SepalWidth,
        Field::PetalLength,
        Field::PetalWidth,
        Field::Species,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::SepalLength => "sepal_length",
            Field::SepalWidth => "sepal_width",
            Field::PetalLength => "petal_length",
            Field::PetalWidth => "petal_width",
            Field::Species => "species",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn datatype(&self) -> DataType {
        match self {
            Field::Species => DataType::String,
            _ => DataType::Float,
        }
    }

    /// Name of the field's value type as reported by summaries: `float` or `str`
    pub fn type_name(&self) -> &'static str {
        match self.datatype() {
            DataType::String => "str",
            _ => "float",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the Iris dataset
///
/// Every field is always present; absent input fields hold their zero value.
/// Equality and hashing are structural over the sorted field:value mapping,
/// so records can be deduplicated through a `HashSet`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Iris {
    sepal_length: f64,
    sepal_width: f64,
    petal_length: f64,
    petal_width: f64,
    species: String,
}

impl Iris {
    /// Builds a record from field/value pairs.
    ///
    /// Numeric fields accept numbers and numeric text; text fields stringify
    /// whatever they get. Unknown fields are dropped with a warning.
    pub fn from_fields<K, V, I>(fields: I) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut iris = Iris::default();
        let mut dropped = Vec::new();
        for (name, value) in fields {
            match Field::from_name(name.as_ref()) {
                Some(field) => iris.assign(field, value.into())?,
                None => dropped.push(name.as_ref().to_string()),
            }
        }
        if !dropped.is_empty() {
            warn!(
                dropped = %dropped.join(", "),
                allowed = %Field::ALL.map(|f| f.name()).join(", "),
                "ignoring fields not defined for Iris"
            );
        }
        Ok(iris)
    }

    /// Validated assignment; unknown fields are rejected and leave the record unchanged
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let field = Field::from_name(name).ok_or_else(|| {
            Error::Schema(format!(
                "can't assign field '{}' to Iris, allowed fields: {}",
                name,
                Field::ALL.map(|f| f.name()).join(", ")
            ))
        })?;
        self.assign(field, value.into())
    }

    fn assign(&mut self, field: Field, value: Value) -> Result<()> {
        match field {
            Field::SepalLength => self.sepal_length = to_float(field, value)?,
            Field::SepalWidth => self.sepal_width = to_float(field, value)?,
            Field::PetalLength => self.petal_length = to_float(field, value)?,
            Field::PetalWidth => self.petal_width = to_float(field, value)?,
            Field::Species => self.species = to_text(value),
        }
        Ok(())
    }

    pub fn get(&self, field: Field) -> Value {
        match field {
            Field::SepalLength => Value::Float(self.sepal_length),
            Field::SepalWidth => Value::Float(self.sepal_width),
            Field::PetalLength => Value::Float(self.petal_length),
            Field::PetalWidth => Value::Float(self.petal_width),
            Field::Species => Value::String(self.species.clone()),
        }
    }

    pub fn sepal_length(&self) -> f64 {
        self.sepal_length
    }

    pub fn sepal_width(&self) -> f64 {
        self.sepal_width
    }

    pub fn petal_length(&self) -> f64 {
        self.petal_length
    }

    pub fn petal_width(&self) -> f64 {
        self.petal_width
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    /// All fields and values, in declared order
    pub fn as_dict(&self) -> Vec<(&'static str, Value)> {
        Field::ALL.into_iter().map(|f| (f.name(), self.get(f))).collect()
    }

    pub fn to_row(&self) -> Row {
        self.as_dict()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    fn canonical(&self) -> BTreeMap<&'static str, CanonicalValue<'_>> {
        let number = |v: f64| CanonicalValue::Number(v.to_bits());
        BTreeMap::from([
            (Field::SepalLength.name(), number(self.sepal_length)),
            (Field::SepalWidth.name(), number(self.sepal_width)),
            (Field::PetalLength.name(), number(self.petal_length)),
            (Field::PetalWidth.name(), number(self.petal_width)),
            (Field::Species.name(), CanonicalValue::Text(&self.species)),
        ])
    }
}

/// Field value with floats compared by bit pattern, keeping Eq and Hash lawful
#[derive(Debug, PartialEq, Eq, Hash)]
enum CanonicalValue<'a> {
    Number(u64),
    Text(&'a str),
}

impl PartialEq for Iris {
    fn eq(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

impl Eq for Iris {}

impl Hash for Iris {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash(state);
    }
}

/// Numeric field value; NaN and infinities are rejected
fn to_float(field: Field, value: Value) -> Result<f64> {
    let number = match value {
        Value::Null => 0.0,
        Value::Integer(i) => i as f64,
        Value::Float(f) => f,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            Error::Parse(format!("field {} expects a number, got '{}'", field, s))
        })?,
    };
    if !number.is_finite() {
        return Err(Error::Parse(format!(
            "field {} expects a finite number, got {}",
            field, number
        )));
    }
    Ok(number)
}

fn to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Parses CSV text whose first line names the fields
pub fn from_csv(data: &str) -> Result<Vec<Iris>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());
    let headers = reader.headers()?.clone();
    reader
        .records()
        .map(|record| {
            let record = record?;
            Iris::from_fields(headers.iter().zip(record.iter()))
        })
        .collect()
}

/// Parses a JSON array of objects, or a single object
pub fn from_json(data: &str) -> Result<Vec<Iris>> {
    let rows = match serde_json::from_str::<serde_json::Value>(data)? {
        serde_json::Value::Array(rows) => rows,
        single => vec![single],
    };
    rows.into_iter()
        .map(|row| match row {
            serde_json::Value::Object(fields) => Iris::from_fields(fields),
            other => Err(Error::Parse(format!("expected a JSON object per row, got {}", other))),
        })
        .collect()
}
