use serde::{Deserialize, Serialize};

use crate::{error::{Error, Result}, sql::types::DataType};

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    /// Validates table schema
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::Internal(format!("table {} has no columns", self.name)));
        }
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(Error::Internal(format!(
                    "duplicate column {} in table {}",
                    column.name, self.name
                )));
            }
        }
        Ok(())
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for this schema
    pub fn create_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.datatype.sql_name()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS {} ({})", self.name, columns)
    }
}

/// Column schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Self { name: name.into(), datatype }
    }
}
