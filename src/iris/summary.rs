use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::{iris::{Field, Iris}, sql::types::Value};

/// Per-column statistics, keyed by field name
pub type Summary = BTreeMap<String, ColumnSummary>;

/// Statistics of one column. Minimum, maximum and median are only reported
/// for numeric columns with at least one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    #[serde(rename = "type")]
    pub datatype: String,
    pub n_total_values: usize,
    pub n_unique_values: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
}

impl ColumnSummary {
    fn empty(field: Field) -> Self {
        Self {
            datatype: field.type_name().to_string(),
            n_total_values: 0,
            n_unique_values: 0,
            minimum: None,
            maximum: None,
            median: None,
        }
    }
}

/// Summarizes every declared field; an empty slice still reports each field
pub fn summarize(records: &[Iris]) -> Summary {
    Field::ALL
        .into_iter()
        .map(|field| (field.name().to_string(), summarize_field(field, records)))
        .collect()
}

fn summarize_field(field: Field, records: &[Iris]) -> ColumnSummary {
    let mut summary = ColumnSummary::empty(field);
    let values = records
        .iter()
        .map(|r| r.get(field))
        .filter(|v| *v != Value::Null)
        .collect::<Vec<_>>();
    summary.n_total_values = values.len();

    if field.datatype().is_numeric() {
        let mut numbers = values
            .iter()
            .filter_map(|v| match v {
                Value::Float(f) => Some(*f),
                Value::Integer(i) => Some(*i as f64),
                _ => None,
            })
            .collect::<Vec<_>>();
        summary.n_unique_values = numbers.iter().map(|f| f.to_bits()).collect::<HashSet<_>>().len();
        numbers.sort_by(f64::total_cmp);
        summary.minimum = numbers.first().copied();
        summary.maximum = numbers.last().copied();
        summary.median = median(&numbers);
    } else {
        summary.n_unique_values = values.iter().map(|v| v.to_string()).collect::<HashSet<_>>().len();
    }
    summary
}

/// Average of the two central order statistics of sorted values.
///
/// Both indices coincide for odd lengths, giving the plain median.
pub fn median(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    Some((sorted[n / 2] + sorted[n - 1 - n / 2]) / 2.0)
}
